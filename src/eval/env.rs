use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::value::Value;

/// Errors from binding lookups and assignments. These surface as dooms
/// (or err values, for `sorry`) with the message text below.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EnvError {
	#[error("undefined variable: {0}")]
	Undefined(String),
	#[error("cannot reassign const: {0}")]
	ConstReassign(String),
	#[error("sorry: {0} not found in current scope")]
	NotInScope(String),
}

/// A named slot in a scope.
#[derive(Debug)]
struct Binding {
	value:    Value,
	is_const: bool,
	forgiven: bool,
}

/// A lexical scope with an optional parent. Scopes are shared (`Rc`)
/// because closures keep their defining scope alive; the binding table is
/// a `RefCell` so the running evaluator can write through the sharing.
#[derive(Debug, Default)]
pub struct Env {
	bindings: RefCell<HashMap<String, Binding>>,
	parent:   Option<Rc<Env>>,
}

impl Env {
	pub fn new(parent: Option<Rc<Env>>) -> Self { Self { bindings: RefCell::new(HashMap::new()), parent } }

	/// Create or shadow a binding in this scope.
	pub fn define(&self, name: &str, value: Value, is_const: bool) {
		self.bindings.borrow_mut().insert(name.to_string(), Binding { value, is_const, forgiven: false });
	}

	/// Look up a binding, walking the parent chain.
	pub fn get(&self, name: &str) -> Option<Value> {
		if let Some(binding) = self.bindings.borrow().get(name) {
			return Some(binding.value.clone());
		}
		self.parent.as_ref()?.get(name)
	}

	/// Update an existing binding, walking the parent chain. Consts
	/// reject assignment until forgiven.
	pub fn set(&self, name: &str, value: Value) -> Result<(), EnvError> {
		if let Some(binding) = self.bindings.borrow_mut().get_mut(name) {
			if binding.is_const && !binding.forgiven {
				return Err(EnvError::ConstReassign(name.to_string()));
			}
			binding.value = value;
			return Ok(());
		}
		match &self.parent {
			Some(parent) => parent.set(name, value),
			None => Err(EnvError::Undefined(name.to_string())),
		}
	}

	/// Flip a binding's forgiven flag. Never ascends the parent chain:
	/// `sorry` must be uttered in the scope that holds the const.
	pub fn forgive(&self, name: &str) -> Result<(), EnvError> {
		match self.bindings.borrow_mut().get_mut(name) {
			Some(binding) => {
				binding.forgiven = true;
				Ok(())
			}
			None => Err(EnvError::NotInScope(name.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn define_get_set() {
		let env = Env::new(None);
		env.define("x", Value::Int(1), false);
		assert!(matches!(env.get("x"), Some(Value::Int(1))));
		env.set("x", Value::Int(2)).unwrap();
		assert!(matches!(env.get("x"), Some(Value::Int(2))));
		assert!(env.get("missing").is_none());
		assert_eq!(env.set("missing", Value::Nil), Err(EnvError::Undefined("missing".into())));
	}

	#[test]
	fn lookup_and_assignment_walk_the_chain() {
		let outer = Rc::new(Env::new(None));
		outer.define("x", Value::Int(1), false);
		let inner = Env::new(Some(outer.clone()));
		assert!(matches!(inner.get("x"), Some(Value::Int(1))));
		inner.set("x", Value::Int(9)).unwrap();
		assert!(matches!(outer.get("x"), Some(Value::Int(9))));
	}

	#[test]
	fn define_shadows_in_current_scope() {
		let outer = Rc::new(Env::new(None));
		outer.define("x", Value::Int(1), false);
		let inner = Env::new(Some(outer.clone()));
		inner.define("x", Value::Int(2), false);
		assert!(matches!(inner.get("x"), Some(Value::Int(2))));
		assert!(matches!(outer.get("x"), Some(Value::Int(1))));
	}

	#[test]
	fn const_rejects_until_forgiven() {
		let env = Env::new(None);
		env.define("c", Value::Int(1), true);
		assert_eq!(env.set("c", Value::Int(2)), Err(EnvError::ConstReassign("c".into())));
		env.forgive("c").unwrap();
		env.set("c", Value::Int(2)).unwrap();
		assert!(matches!(env.get("c"), Some(Value::Int(2))));
	}

	#[test]
	fn forgive_never_ascends() {
		let outer = Rc::new(Env::new(None));
		outer.define("c", Value::Int(1), true);
		let inner = Env::new(Some(outer));
		assert_eq!(inner.forgive("c"), Err(EnvError::NotInScope("c".into())));
	}
}
