//! Abstract syntax tree for Maledict programs.
//!
//! Three disjoint node families: items (top level), statements (inside
//! blocks) and expressions. Patterns are a fourth, small family used only
//! by match arms. Every node keeps the token that introduced it so the
//! evaluator can point diagnostics at source positions.

use std::rc::Rc;

use crate::lexer::Token;

/// The root node: an ordered list of top-level items.
#[derive(Debug, Default)]
pub struct Program {
	pub items: Vec<Item>,
}

/// Anything that can appear at the top level.
#[derive(Debug)]
pub enum Item {
	Fn(FnDecl),
	Extern(ExternDecl),
	Stmt(Stmt),
}

/// A named function declaration: `fn name(params) { body }`.
#[derive(Debug)]
pub struct FnDecl {
	pub token:  Token,
	pub name:   String,
	pub params: Vec<Param>,
	pub body:   Rc<BlockExpr>,
}

/// An extern declaration: `extern fn name(params);`. Calls to an extern
/// stub always yield nil.
#[derive(Debug)]
pub struct ExternDecl {
	pub token:  Token,
	pub name:   String,
	pub params: Vec<Param>,
}

/// A function parameter. Type annotations are parsed but never enforced.
#[derive(Debug, Clone)]
pub struct Param {
	pub name:            String,
	pub type_annotation: Option<String>,
}

/// A statement inside a block (or at top level, wrapped in an item).
#[derive(Debug)]
pub enum Stmt {
	Let { token: Token, name: String, type_annotation: Option<String>, value: Expr },
	Const { token: Token, name: String, type_annotation: Option<String>, value: Expr },
	Return { token: Token, value: Expr },
	Decree { token: Token, value: String },
	Expr(Expr),
}

/// `{ stmts... [final expression] }` — the trailing expression, when
/// present, is the block's value.
#[derive(Debug)]
pub struct BlockExpr {
	pub token:      Token,
	pub stmts:      Vec<Stmt>,
	pub final_expr: Option<Box<Expr>>,
}

/// One `key: value` entry of a map literal.
#[derive(Debug)]
pub struct MapPair {
	pub key:   Expr,
	pub value: Expr,
}

/// One `pattern => body` arm of a match expression.
#[derive(Debug)]
pub struct MatchArm {
	pub pattern: Pattern,
	pub body:    Expr,
}

#[derive(Debug)]
pub enum Expr {
	Int { token: Token, value: i64 },
	Float { token: Token, value: f64 },
	Str { token: Token, value: String },
	Bool { token: Token, value: bool },
	Nil { token: Token },
	Ident { token: Token, name: String },
	Array { token: Token, elements: Vec<Expr> },
	Map { token: Token, pairs: Vec<MapPair> },
	/// `left op right`; the operator token carries the op kind.
	Binary { operator: Token, left: Box<Expr>, right: Box<Expr> },
	/// Prefix `-`, `!` or `&`.
	Unary { operator: Token, right: Box<Expr> },
	/// `name = value`, lowered from `=` on an identifier.
	Assign { token: Token, name: String, value: Box<Expr> },
	/// `target[index] = value`, lowered from `=` on an index expression.
	IndexAssign { token: Token, target: Box<Expr>, index: Box<Expr>, value: Box<Expr> },
	/// `target.field = value`, lowered from `=` on a dot expression.
	FieldAssign { token: Token, target: Box<Expr>, field: String, value: Box<Expr> },
	Call { token: Token, callee: Box<Expr>, args: Vec<Expr> },
	Index { token: Token, target: Box<Expr>, index: Box<Expr> },
	Field { token: Token, target: Box<Expr>, field: String },
	/// `inner?` — result propagation.
	Propagate { token: Token, inner: Box<Expr> },
	If { token: Token, condition: Box<Expr>, then: Box<BlockExpr>, else_branch: Option<Box<Expr>> },
	Match { token: Token, subject: Box<Expr>, arms: Vec<MatchArm> },
	Guard { token: Token, condition: Box<Expr>, else_body: Box<Expr> },
	Block(BlockExpr),
	Ok { token: Token, inner: Box<Expr> },
	Err { token: Token, inner: Box<Expr> },
	/// `inner as type` — runtime coercion.
	As { token: Token, inner: Box<Expr>, type_name: String },
	Speak { token: Token, value: Box<Expr>, else_body: Option<Box<Expr>> },
	Doom { token: Token, message: Box<Expr> },
	Sorry { token: Token, name: String },
	Chant { token: Token, value: Box<Expr> },
	Spawn { token: Token, body: BlockExpr },
	AwaitAll { token: Token },
	/// `fn [name](params) { body }` in expression position. The optional
	/// name only shows up in stringification.
	FnLit { token: Token, name: Option<String>, params: Vec<Param>, body: Rc<BlockExpr> },
}

#[derive(Debug)]
pub enum Pattern {
	/// `_` — matches anything, binds nothing.
	Wildcard { token: Token },
	/// A literal value compared with plain equality.
	Literal { token: Token, value: Expr },
	/// A binding name. `ok(x)` / `err(x)` destructuring is encoded here as
	/// the literal names `"ok(x)"` and `"err(x)"` (inner name may be empty).
	Ident { token: Token, name: String },
	/// `name: type` — matches when the subject's tag satisfies the type.
	Typed { token: Token, name: String, type_name: String },
	/// `pattern if condition`.
	Guarded { token: Token, inner: Box<Pattern>, guard: Expr },
}
