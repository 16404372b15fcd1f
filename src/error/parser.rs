/// A parse diagnostic with its source position. The parser records these
/// and keeps going; it never aborts on bad input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line} col {col}: {message}")]
pub struct Diagnostic {
	pub line:    usize,
	pub col:     usize,
	pub message: String,
}

impl Diagnostic {
	pub fn new(line: usize, col: usize, message: impl Into<String>) -> Self {
		Self { line, col, message: message.into() }
	}
}
