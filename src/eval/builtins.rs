//! Built-in functions, dispatched by callee name before environment
//! lookup, so a user binding never shadows them.

use crate::{error::Signal, eval::{Evaluator, Value}};

impl Evaluator {
	/// Dispatch a call to a built-in. `None` means the name is not a
	/// built-in and the callee should be resolved normally.
	pub(crate) fn call_builtin(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, Signal>> {
		Some(match name {
			"len" => builtin_len(args),
			"malloc" => Ok(Value::Ptr(0)),
			"free" | "write" => Ok(Value::ok_of(Value::Nil)),
			"read" => Ok(Value::Str(String::new())),
			"read_file" => Ok(builtin_read_file(args)),
			"parse_toml" => Ok(Value::err_str("not implemented")),
			_ => return None,
		})
	}
}

fn builtin_len(args: &[Value]) -> Result<Value, Signal> {
	if args.len() != 1 {
		return Err(Signal::Doom("len() takes exactly 1 argument".into()));
	}
	match &args[0] {
		Value::Array(elements) => Ok(Value::Int(elements.borrow().len() as i64)),
		// Unicode scalar count, not byte length.
		Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
		Value::Map(map) => Ok(Value::Int(map.borrow().len() as i64)),
		_ => Err(Signal::Doom("len() argument must be array, string, or map".into())),
	}
}

fn builtin_read_file(args: &[Value]) -> Value {
	let [Value::Str(path)] = args else {
		return Value::err_str("read_file() takes exactly 1 string argument");
	};
	match std::fs::read_to_string(path) {
		Ok(content) => Value::ok_of(Value::Str(content)),
		Err(e) => Value::err_str(e.to_string()),
	}
}
