use maledict::{Maledict, MaledictError, cli::*};
use palc::Parser;

fn main() {
	let maledict = Maledict;

	match Cli::parse().mode {
		Mode::Run { path } => {
			if let Err(e) = maledict.run_file(&path) {
				// Parse diagnostics are already on stderr; everything else
				// is printed here ("doom: ..." or "error: ...").
				if !matches!(e, MaledictError::ParseErrors(_)) {
					eprintln!("{e}");
				}
				std::process::exit(1);
			}
		}
		Mode::Repl => maledict.run_prompt(),
	}
}
