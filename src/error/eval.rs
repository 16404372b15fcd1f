use crate::eval::Value;

/// Control-flow signals raised while walking the tree.
///
/// Only `Doom` is a real error; the other three are non-local exits that
/// the function-call boundary absorbs. Each variant's message is what it
/// means if it escapes all of its absorbers and reaches the top level.
#[derive(thiserror::Error, Debug)]
pub enum Signal {
	/// Fatal runtime error, caught nowhere.
	#[error("doom: {0}")]
	Doom(String),
	/// Early exit from a function body, carrying the return value.
	#[error("return outside function")]
	Return(Value),
	/// The payload of an `err(...)` raised by the `?` operator.
	#[error("unhandled error propagation: {0}")]
	Propagate(Value),
	/// The else-value of a failed guard, returned from the enclosing function.
	#[error("unhandled guard return: {0}")]
	GuardReturn(Value),
}

/// The fatal runtime error surfaced by the evaluator. Internal signals
/// that escape their absorbers are converted into one of these at the
/// top-level boundary.
#[derive(thiserror::Error, Debug)]
#[error("doom: {message}")]
pub struct DoomError {
	pub message: String,
}

impl From<Signal> for DoomError {
	fn from(signal: Signal) -> Self {
		let message = match signal {
			Signal::Doom(message) => message,
			other => other.to_string(),
		};
		DoomError { message }
	}
}
