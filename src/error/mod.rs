pub mod eval;
pub mod parser;

pub use eval::{DoomError, Signal};
pub use parser::Diagnostic;

/// Top-level error type for the Maledict interpreter.
#[derive(thiserror::Error, Debug)]
pub enum MaledictError {
	/// Internal error, should never happen
	#[error("error: {0}")]
	Internal(#[from] anyhow::Error),
	/// The parser produced diagnostics; they have already been reported.
	#[error("generated {0} parse errors")]
	ParseErrors(usize),
	#[error(transparent)]
	Doom(#[from] DoomError),
}
