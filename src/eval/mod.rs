//! Tree-walking evaluator.
//!
//! Every frame returns `Result<Value, Signal>`: the error channel carries
//! doom (fatal) plus the three non-local exits (return, propagate,
//! guard-return). The function-call boundary is the only absorber — it
//! turns return and guard-return into the call's value and propagate into
//! an `err(...)` result. Doom is caught nowhere; whatever signal escapes
//! the top level is converted into a [`DoomError`].

mod builtins;
mod decree;
mod env;
mod value;

use std::{
	io::Write,
	rc::Rc,
	time::{SystemTime, UNIX_EPOCH},
};

pub use decree::{DecreeConfig, IndexingBase};
pub use env::{Env, EnvError};
pub use value::{FnValue, OrderedMap, Value};

use crate::{
	error::{DoomError, Signal},
	lexer::{Token, TokenKind},
	parser::ast::*,
};

/// Walks a parsed program and produces values plus `speak` output.
pub struct Evaluator {
	env:     Rc<Env>,
	decrees: DecreeConfig,
	output:  Box<dyn Write>,
	/// Wall clock for weekday indexing; injectable so tests can pin it.
	clock:   Box<dyn Fn() -> SystemTime>,
}

impl Default for Evaluator {
	fn default() -> Self { Self::new() }
}

impl Evaluator {
	pub fn new() -> Self {
		Self {
			env:     Rc::new(Env::new(None)),
			decrees: DecreeConfig::default(),
			output:  Box::new(std::io::stdout()),
			clock:   Box::new(SystemTime::now),
		}
	}

	/// Redirect `speak` output, e.g. into a buffer for tests.
	pub fn set_output(&mut self, output: impl Write + 'static) { self.output = Box::new(output); }

	/// Replace the wall clock used by weekday indexing.
	pub fn set_clock(&mut self, clock: impl Fn() -> SystemTime + 'static) { self.clock = Box::new(clock); }

	/// Evaluate a complete program, yielding the last item's value.
	/// Signals that escaped their absorbers surface as dooms here.
	pub fn eval(&mut self, program: &Program) -> Result<Value, DoomError> {
		let mut result = Value::Nil;
		for item in &program.items {
			result = self.eval_item(item).map_err(DoomError::from)?;
		}
		Ok(result)
	}

	fn eval_item(&mut self, item: &Item) -> Result<Value, Signal> {
		match item {
			Item::Fn(decl) => {
				let func = FnValue {
					name:   decl.name.clone(),
					params: decl.params.iter().map(|p| p.name.clone()).collect(),
					body:   Some(Rc::clone(&decl.body)),
					env:    Rc::clone(&self.env),
				};
				self.env.define(&decl.name, Value::Fn(Rc::new(func)), false);
				Ok(Value::Nil)
			}
			Item::Extern(decl) => {
				// Extern stubs have no body; calling one yields nil.
				let stub = FnValue {
					name:   decl.name.clone(),
					params: decl.params.iter().map(|p| p.name.clone()).collect(),
					body:   None,
					env:    Rc::clone(&self.env),
				};
				self.env.define(&decl.name, Value::Fn(Rc::new(stub)), false);
				Ok(Value::Nil)
			}
			Item::Stmt(stmt) => self.eval_stmt(stmt),
		}
	}

	fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Value, Signal> {
		match stmt {
			Stmt::Let { name, value, .. } => {
				let value = self.eval_expr(value)?;
				self.env.define(name, value, false);
				Ok(Value::Nil)
			}
			Stmt::Const { name, value, .. } => {
				let value = self.eval_expr(value)?;
				self.env.define(name, value, true);
				Ok(Value::Nil)
			}
			Stmt::Return { value, .. } => {
				let value = self.eval_expr(value)?;
				Err(Signal::Return(value))
			}
			Stmt::Decree { value, .. } => {
				self.decrees.apply(value);
				Ok(Value::Nil)
			}
			Stmt::Expr(expr) => self.eval_expr(expr),
		}
	}

	fn eval_expr(&mut self, expr: &Expr) -> Result<Value, Signal> {
		match expr {
			Expr::Int { value, .. } => Ok(Value::Int(*value)),
			Expr::Float { value, .. } => Ok(Value::Float(*value)),
			Expr::Str { value, .. } => Ok(Value::Str(value.clone())),
			Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
			Expr::Nil { .. } => Ok(Value::Nil),
			Expr::Ident { name, .. } => {
				self.env.get(name).ok_or_else(|| Signal::Doom(format!("undefined variable: {name}")))
			}
			Expr::Array { elements, .. } => {
				let mut values = Vec::with_capacity(elements.len());
				for element in elements {
					values.push(self.eval_expr(element)?);
				}
				Ok(Value::array(values))
			}
			Expr::Map { pairs, .. } => {
				let mut map = OrderedMap::new();
				for pair in pairs {
					let key = self.eval_expr(&pair.key)?;
					let value = self.eval_expr(&pair.value)?;
					map.set(key.to_string(), value);
				}
				Ok(Value::map(map))
			}
			Expr::Binary { operator, left, right } => self.eval_binary(operator, left, right),
			Expr::Unary { operator, right } => self.eval_unary(operator, right),
			Expr::Assign { name, value, .. } => {
				let value = self.eval_expr(value)?;
				self.env.set(name, value.clone()).map_err(|e| Signal::Doom(e.to_string()))?;
				Ok(value)
			}
			Expr::IndexAssign { target, index, value, .. } => self.eval_index_assign(target, index, value),
			Expr::FieldAssign { target, field, value, .. } => self.eval_field_assign(target, field, value),
			Expr::Call { callee, args, .. } => self.eval_call(callee, args),
			Expr::Index { target, index, .. } => self.eval_index(target, index),
			Expr::Field { target, field, .. } => self.eval_field(target, field),
			Expr::Propagate { inner, .. } => self.eval_propagate(inner),
			Expr::If { condition, then, else_branch, .. } => self.eval_if(condition, then, else_branch.as_deref()),
			Expr::Match { subject, arms, .. } => self.eval_match(subject, arms),
			Expr::Guard { condition, else_body, .. } => self.eval_guard(condition, else_body),
			Expr::Block(block) => self.eval_block(block),
			Expr::Ok { inner, .. } => Ok(Value::ok_of(self.eval_expr(inner)?)),
			Expr::Err { inner, .. } => Ok(Value::err_of(self.eval_expr(inner)?)),
			Expr::As { inner, type_name, .. } => {
				let value = self.eval_expr(inner)?;
				self.eval_as(value, type_name)
			}
			Expr::Speak { value, else_body, .. } => self.eval_speak(value, else_body.as_deref()),
			Expr::Doom { message, .. } => {
				let message = self.eval_expr(message)?;
				Err(Signal::Doom(message.to_string()))
			}
			Expr::Sorry { name, .. } => self.eval_sorry(name),
			Expr::Chant { value, .. } => {
				// The argument runs for effect; a doom inside it propagates.
				self.eval_expr(value)?;
				Ok(Value::ok_of(Value::Nil))
			}
			Expr::Spawn { body, .. } => {
				// Spawn runs its body inline to completion.
				self.eval_block(body)?;
				Ok(Value::Nil)
			}
			Expr::AwaitAll { .. } => Ok(Value::Nil),
			Expr::FnLit { name, params, body, .. } => {
				let func = FnValue {
					name:   name.clone().unwrap_or_default(),
					params: params.iter().map(|p| p.name.clone()).collect(),
					body:   Some(Rc::clone(body)),
					env:    Rc::clone(&self.env),
				};
				Ok(Value::Fn(Rc::new(func)))
			}
		}
	}

	// --- Operators ---

	fn eval_binary(&mut self, operator: &Token, left_expr: &Expr, right_expr: &Expr) -> Result<Value, Signal> {
		let left = self.eval_expr(left_expr)?;

		// `and` / `or` short-circuit and yield an operand, not a bool.
		match operator.kind {
			TokenKind::And => {
				return if left.is_truthy() { self.eval_expr(right_expr) } else { Ok(left) };
			}
			TokenKind::Or => {
				return if left.is_truthy() { Ok(left) } else { self.eval_expr(right_expr) };
			}
			_ => {}
		}

		let right = self.eval_expr(right_expr)?;
		match operator.kind {
			TokenKind::Plus => self.eval_add(left, right),
			TokenKind::Minus | TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
				self.eval_arith(operator, left, right)
			}
			TokenKind::Eq => {
				if self.decrees.ambitious_mode && right.is_truthy() {
					if let Some(result) = self.ambitious_assign(left_expr, &right)? {
						return Ok(result);
					}
				}
				Ok(Value::Bool(left.loose_eq(&right)))
			}
			TokenKind::StrictEq => Ok(Value::Bool(left.strict_eq(&right))),
			TokenKind::NotEq => Ok(Value::Bool(!left.loose_eq(&right))),
			TokenKind::Lt | TokenKind::Gt | TokenKind::Le | TokenKind::Ge => {
				self.eval_compare(operator, left, right)
			}
			_ => Err(Signal::Doom(format!("unknown operator: {}", operator.literal))),
		}
	}

	/// Under `ambitious_mode`, `==` with a truthy right-hand side becomes
	/// an assignment when the left-hand side has an assignable shape.
	/// Returns `None` to fall back to ordinary equality.
	fn ambitious_assign(&mut self, target: &Expr, value: &Value) -> Result<Option<Value>, Signal> {
		match target {
			Expr::Ident { name, .. } => {
				self.env.set(name, value.clone()).map_err(|e| Signal::Doom(e.to_string()))?;
				Ok(Some(value.clone()))
			}
			Expr::Index { target, index, .. } => {
				let collection = self.eval_expr(target)?;
				let index = self.eval_expr(index)?;
				match collection {
					Value::Array(elements) => {
						if let Value::Int(i) = index {
							let idx = self.adjust_index(i);
							let mut elements = elements.borrow_mut();
							// An out-of-range ambitious write is silently dropped.
							if idx >= 0 && (idx as usize) < elements.len() {
								elements[idx as usize] = value.clone();
							}
						}
					}
					Value::Map(map) => map.borrow_mut().set(index.to_string(), value.clone()),
					_ => {}
				}
				Ok(Some(value.clone()))
			}
			Expr::Field { target, field, .. } => {
				let object = self.eval_expr(target)?;
				if let Value::Map(map) = object {
					map.borrow_mut().set(field.clone(), value.clone());
				}
				Ok(Some(value.clone()))
			}
			_ => Ok(None),
		}
	}

	fn eval_add(&mut self, left: Value, right: Value) -> Result<Value, Signal> {
		if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
			return Ok(Value::Str(format!("{left}{right}")));
		}
		if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
			return Ok(Value::Float(to_float(&left) + to_float(&right)));
		}
		if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
			return Ok(Value::Int(a.wrapping_add(*b)));
		}
		Err(Signal::Doom(format!("cannot add {} and {}", left.type_name(), right.type_name())))
	}

	fn eval_arith(&mut self, operator: &Token, left: Value, right: Value) -> Result<Value, Signal> {
		if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
			let (a, b) = (to_float(&left), to_float(&right));
			return match operator.kind {
				TokenKind::Minus => Ok(Value::Float(a - b)),
				TokenKind::Star => Ok(Value::Float(a * b)),
				TokenKind::Slash => {
					if b == 0.0 {
						return Err(Signal::Doom("division by zero".into()));
					}
					Ok(Value::Float(a / b))
				}
				TokenKind::Percent => Err(Signal::Doom("modulo on floats not supported".into())),
				_ => Err(Signal::Doom(format!("unknown operator: {}", operator.literal))),
			};
		}
		if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
			let (a, b) = (*a, *b);
			return match operator.kind {
				TokenKind::Minus => Ok(Value::Int(a.wrapping_sub(b))),
				TokenKind::Star => Ok(Value::Int(a.wrapping_mul(b))),
				TokenKind::Slash => {
					if b == 0 {
						return Err(Signal::Doom("division by zero".into()));
					}
					Ok(Value::Int(a.wrapping_div(b)))
				}
				TokenKind::Percent => {
					if b == 0 {
						return Err(Signal::Doom("division by zero".into()));
					}
					Ok(Value::Int(a.wrapping_rem(b)))
				}
				_ => Err(Signal::Doom(format!("unknown operator: {}", operator.literal))),
			};
		}
		Err(Signal::Doom(format!(
			"cannot perform {} on {} and {}",
			operator.literal,
			left.type_name(),
			right.type_name()
		)))
	}

	fn eval_compare(&mut self, operator: &Token, left: Value, right: Value) -> Result<Value, Signal> {
		if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
			return Ok(Value::Bool(compare(operator.kind, a, b)));
		}
		if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
			if matches!(left, Value::Float(_) | Value::Int(_)) && matches!(right, Value::Float(_) | Value::Int(_))
			{
				let (a, b) = (to_float(&left), to_float(&right));
				return Ok(Value::Bool(compare(operator.kind, &a, &b)));
			}
		}
		if let (Value::Str(a), Value::Str(b)) = (&left, &right) {
			return Ok(Value::Bool(compare(operator.kind, a, b)));
		}
		Err(Signal::Doom(format!("cannot compare {} and {}", left.type_name(), right.type_name())))
	}

	fn eval_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value, Signal> {
		let right = self.eval_expr(right)?;
		match operator.kind {
			TokenKind::Minus => match right {
				Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
				Value::Float(f) => Ok(Value::Float(-f)),
				_ => Err(Signal::Doom("cannot negate non-numeric value".into())),
			},
			TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
			// Address-of yields a null pointer.
			TokenKind::Amp => Ok(Value::Ptr(0)),
			_ => Err(Signal::Doom(format!("unknown unary operator: {}", operator.literal))),
		}
	}

	// --- Assignment targets ---

	fn eval_index_assign(&mut self, target: &Expr, index: &Expr, value: &Expr) -> Result<Value, Signal> {
		let target = self.eval_expr(target)?;
		let index = self.eval_expr(index)?;
		let value = self.eval_expr(value)?;
		match target {
			Value::Array(elements) => {
				let Value::Int(i) = index else {
					return Err(Signal::Doom("array index must be int".into()));
				};
				let idx = self.adjust_index(i);
				let mut elements = elements.borrow_mut();
				if idx < 0 || idx as usize >= elements.len() {
					return Err(Signal::Doom(format!("array index out of bounds: {idx}")));
				}
				elements[idx as usize] = value.clone();
				Ok(value)
			}
			Value::Map(map) => {
				map.borrow_mut().set(index.to_string(), value.clone());
				Ok(value)
			}
			other => Err(Signal::Doom(format!("cannot assign to index of {other}"))),
		}
	}

	fn eval_field_assign(&mut self, target: &Expr, field: &str, value: &Expr) -> Result<Value, Signal> {
		let target = self.eval_expr(target)?;
		let value = self.eval_expr(value)?;
		match target {
			Value::Map(map) => {
				map.borrow_mut().set(field.to_string(), value.clone());
				Ok(value)
			}
			other => Err(Signal::Doom(format!("cannot assign field {field} on {other}"))),
		}
	}

	// --- Calls ---

	fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, Signal> {
		let mut arg_values = Vec::with_capacity(args.len());
		for arg in args {
			arg_values.push(self.eval_expr(arg)?);
		}

		// Builtins resolve by name before any environment lookup.
		if let Expr::Ident { name, .. } = callee {
			if let Some(result) = self.call_builtin(name, &arg_values) {
				return result;
			}
		}

		let callee = self.eval_expr(callee)?;
		match callee {
			Value::Fn(func) => self.call_function(&func, arg_values),
			other => Err(Signal::Doom(format!("cannot call non-function: {other}"))),
		}
	}

	/// Invoke a function value. This is the sole absorber of the
	/// non-doom signals.
	fn call_function(&mut self, func: &FnValue, args: Vec<Value>) -> Result<Value, Signal> {
		let Some(body) = &func.body else {
			return Ok(Value::Nil);
		};

		let call_env = Rc::new(Env::new(Some(Rc::clone(&func.env))));
		for (i, param) in func.params.iter().enumerate() {
			// Missing arguments bind to nil; excess arguments are dropped.
			let value = args.get(i).cloned().unwrap_or(Value::Nil);
			call_env.define(param, value, false);
		}

		let saved = std::mem::replace(&mut self.env, call_env);
		let result = self.eval_block(body);
		self.env = saved;

		match result {
			Ok(value) => Ok(value),
			Err(Signal::Return(value)) => Ok(value),
			Err(Signal::GuardReturn(value)) => Ok(value),
			Err(Signal::Propagate(value)) => Ok(Value::err_of(value)),
			Err(doom) => Err(doom),
		}
	}

	// --- Indexing ---

	fn eval_index(&mut self, target: &Expr, index: &Expr) -> Result<Value, Signal> {
		let target = self.eval_expr(target)?;
		let index = self.eval_expr(index)?;
		match target {
			Value::Array(elements) => {
				let Value::Int(i) = index else {
					return Err(Signal::Doom("array index must be int".into()));
				};
				let idx = self.adjust_index(i);
				let elements = elements.borrow();
				if idx < 0 || idx as usize >= elements.len() {
					return Err(Signal::Doom(format!("array index out of bounds: {idx}")));
				}
				Ok(elements[idx as usize].clone())
			}
			Value::Map(map) => {
				// A missing key reads as nil, not a doom.
				let key = index.to_string();
				Ok(map.borrow().get(&key).cloned().unwrap_or(Value::Nil))
			}
			Value::Str(s) => {
				let Value::Int(i) = index else {
					return Err(Signal::Doom("string index must be int".into()));
				};
				let idx = self.adjust_index(i);
				if idx < 0 {
					return Err(Signal::Doom(format!("string index out of bounds: {idx}")));
				}
				match s.chars().nth(idx as usize) {
					Some(c) => Ok(Value::Str(c.to_string())),
					None => Err(Signal::Doom(format!("string index out of bounds: {idx}"))),
				}
			}
			other => Err(Signal::Doom(format!("cannot index into {other}"))),
		}
	}

	/// Apply the decreed indexing base. The default `weekday` base peeks
	/// at the clock: 1-based Monday through Friday, 0-based on weekends.
	fn adjust_index(&self, idx: i64) -> i64 {
		match self.decrees.indexing_base {
			IndexingBase::Zero => idx,
			IndexingBase::One => idx - 1,
			IndexingBase::Weekday => {
				let secs = (self.clock)().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
				// 1970-01-01 was a Thursday; 0 = Sunday.
				let weekday = (secs / 86_400 + 4) % 7;
				if weekday == 0 || weekday == 6 { idx } else { idx - 1 }
			}
		}
	}

	fn eval_field(&mut self, target: &Expr, field: &str) -> Result<Value, Signal> {
		let target = self.eval_expr(target)?;
		match target {
			Value::Map(map) => Ok(map.borrow().get(field).cloned().unwrap_or(Value::Nil)),
			other => Err(Signal::Doom(format!("cannot access field {field} on {other}"))),
		}
	}

	// --- Control flow ---

	fn eval_propagate(&mut self, inner: &Expr) -> Result<Value, Signal> {
		let inner = self.eval_expr(inner)?;
		match inner {
			Value::Ok(payload) => Ok(*payload),
			Value::Err(payload) => Err(Signal::Propagate(*payload)),
			Value::Nil => Err(Signal::Propagate(Value::Str("nil".into()))),
			// `?` on a plain value passes it through untouched.
			other => Ok(other),
		}
	}

	fn eval_if(
		&mut self,
		condition: &Expr,
		then: &BlockExpr,
		else_branch: Option<&Expr>,
	) -> Result<Value, Signal> {
		let condition = self.eval_expr(condition)?;
		if condition.is_truthy() {
			return self.eval_block(then);
		}
		match else_branch {
			Some(else_expr) => self.eval_expr(else_expr),
			None => Ok(Value::Nil),
		}
	}

	fn eval_match(&mut self, subject: &Expr, arms: &[MatchArm]) -> Result<Value, Signal> {
		let subject = self.eval_expr(subject)?;
		for arm in arms {
			let Some(bindings) = self.match_pattern(&arm.pattern, &subject) else {
				continue;
			};
			let arm_env = Rc::new(Env::new(Some(Rc::clone(&self.env))));
			for (name, value) in bindings {
				arm_env.define(&name, value, false);
			}
			let saved = std::mem::replace(&mut self.env, arm_env);
			let result = self.eval_expr(&arm.body);
			self.env = saved;
			return result;
		}
		Err(Signal::Doom(format!("match exhausted: no arm matched value {subject}")))
	}

	/// Try a pattern against a subject. `Some(bindings)` on a match; an
	/// evaluation error inside a literal or guard makes the arm not match
	/// rather than aborting.
	fn match_pattern(&mut self, pattern: &Pattern, subject: &Value) -> Option<Vec<(String, Value)>> {
		match pattern {
			Pattern::Wildcard { .. } => Some(Vec::new()),
			Pattern::Literal { value, .. } => {
				let literal = self.eval_expr(value).ok()?;
				subject.loose_eq(&literal).then(Vec::new)
			}
			Pattern::Ident { name, .. } => {
				if let Some(inner) = name.strip_prefix("ok(").and_then(|rest| rest.strip_suffix(')')) {
					let Value::Ok(payload) = subject else { return None };
					let mut bindings = Vec::new();
					if !inner.is_empty() {
						bindings.push((inner.to_string(), (**payload).clone()));
					}
					return Some(bindings);
				}
				if let Some(inner) = name.strip_prefix("err(").and_then(|rest| rest.strip_suffix(')')) {
					let Value::Err(payload) = subject else { return None };
					let mut bindings = Vec::new();
					if !inner.is_empty() {
						bindings.push((inner.to_string(), (**payload).clone()));
					}
					return Some(bindings);
				}
				Some(vec![(name.clone(), subject.clone())])
			}
			Pattern::Typed { name, type_name, .. } => {
				matches_type(subject, type_name).then(|| vec![(name.clone(), subject.clone())])
			}
			Pattern::Guarded { inner, guard, .. } => {
				let bindings = self.match_pattern(inner, subject)?;
				let guard_env = Rc::new(Env::new(Some(Rc::clone(&self.env))));
				for (name, value) in &bindings {
					guard_env.define(name, value.clone(), false);
				}
				let saved = std::mem::replace(&mut self.env, guard_env);
				let guard_value = self.eval_expr(guard);
				self.env = saved;
				match guard_value {
					Ok(value) if value.is_truthy() => Some(bindings),
					_ => None,
				}
			}
		}
	}

	fn eval_guard(&mut self, condition: &Expr, else_body: &Expr) -> Result<Value, Signal> {
		let condition = self.eval_expr(condition)?;
		if condition.is_truthy() {
			return Ok(Value::Nil);
		}
		// A doom inside the else body still propagates as a doom.
		let value = self.eval_expr(else_body)?;
		Err(Signal::GuardReturn(value))
	}

	fn eval_block(&mut self, block: &BlockExpr) -> Result<Value, Signal> {
		let child = Rc::new(Env::new(Some(Rc::clone(&self.env))));
		let saved = std::mem::replace(&mut self.env, child);
		let result = self.eval_block_body(block);
		self.env = saved;
		result
	}

	fn eval_block_body(&mut self, block: &BlockExpr) -> Result<Value, Signal> {
		for stmt in &block.stmts {
			self.eval_stmt(stmt)?;
		}
		match &block.final_expr {
			Some(final_expr) => self.eval_expr(final_expr),
			None => Ok(Value::Nil),
		}
	}

	// --- Coercion ---

	fn eval_as(&mut self, value: Value, type_name: &str) -> Result<Value, Signal> {
		match type_name {
			"int" => match value {
				Value::Int(_) => Ok(value),
				Value::Float(f) => Ok(Value::Int(f as i64)),
				Value::Str(s) => match s.trim().parse::<i64>() {
					Ok(n) => Ok(Value::Int(n)),
					Err(_) => self.cast_failure(format!("cannot convert {s:?} to int")),
				},
				Value::Bool(b) => Ok(Value::Int(i64::from(b))),
				other => self.cast_failure(format!("cannot cast {other} to int")),
			},
			"float" => match value {
				Value::Float(_) => Ok(value),
				Value::Int(n) => Ok(Value::Float(n as f64)),
				Value::Str(s) => match s.trim().parse::<f64>() {
					Ok(f) => Ok(Value::Float(f)),
					Err(_) => self.cast_failure(format!("cannot convert {s:?} to float")),
				},
				other => self.cast_failure(format!("cannot cast {other} to float")),
			},
			"str" | "string" => Ok(Value::Str(value.to_string())),
			"bool" => Ok(Value::Bool(value.is_truthy())),
			_ => self.cast_failure(format!("unknown cast target: {type_name}")),
		}
	}

	/// Under `soft_casts` a failed coercion is an err value instead of a doom.
	fn cast_failure(&self, message: String) -> Result<Value, Signal> {
		if self.decrees.soft_casts { Ok(Value::err_str(message)) } else { Err(Signal::Doom(message)) }
	}

	// --- Effects ---

	fn eval_speak(&mut self, value: &Expr, else_body: Option<&Expr>) -> Result<Value, Signal> {
		let value = self.eval_expr(value)?;
		if let Err(write_error) = writeln!(self.output, "{value}") {
			if let Some(else_body) = else_body {
				return self.eval_expr(else_body);
			}
			return Ok(Value::err_str(write_error.to_string()));
		}
		Ok(Value::ok_of(Value::Nil))
	}

	fn eval_sorry(&mut self, name: &str) -> Result<Value, Signal> {
		if self.decrees.no_forgiveness {
			return Ok(Value::err_str("no"));
		}
		match self.env.forgive(name) {
			Ok(()) => Ok(Value::ok_of(Value::Nil)),
			Err(e) => Ok(Value::err_str(e.to_string())),
		}
	}
}

fn to_float(value: &Value) -> f64 {
	match value {
		Value::Float(f) => *f,
		Value::Int(n) => *n as f64,
		_ => 0.0,
	}
}

fn compare<T: PartialOrd>(kind: TokenKind, a: &T, b: &T) -> bool {
	match kind {
		TokenKind::Lt => a < b,
		TokenKind::Gt => a > b,
		TokenKind::Le => a <= b,
		TokenKind::Ge => a >= b,
		_ => false,
	}
}

/// Type-pattern satisfaction; `result` means ok-or-err.
fn matches_type(value: &Value, type_name: &str) -> bool {
	match type_name {
		"str" | "string" => matches!(value, Value::Str(_)),
		"result" => matches!(value, Value::Ok(_) | Value::Err(_)),
		other => value.type_name() == other,
	}
}
