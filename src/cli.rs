use std::path::PathBuf;

use palc::{Parser, Subcommand};

/// CLI arguments
#[derive(Parser)]
#[command(name = "maledict", after_long_help = "Tree-walking interpreter for the Maledict language.")]
pub struct Cli {
	/// Program mode
	#[command(subcommand)]
	pub mode: Mode,
}

/// Program mode
#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Run a source file
	Run { path: PathBuf },
	/// Start the interactive prompt
	Repl,
}
