//! Pratt parser for Maledict.
//!
//! The parser holds two tokens (current and next) plus an unbounded
//! buffer used only for the map-vs-block lookahead. The convention
//! throughout: after any prefix or infix sub-parser returns, the current
//! token is the first token *after* the parsed expression, so the Pratt
//! loop tests the current token for infix operators.
//!
//! Errors never abort: each failure records a [`Diagnostic`] and the
//! parser recovers by skipping past the offending token.

pub mod ast;

use std::{collections::VecDeque, rc::Rc};

use crate::{
	error::Diagnostic,
	lexer::{Lexer, Token, TokenKind},
	parser::ast::*,
};

/// Binding strength for the Pratt loop, weakest first. Kinds that are not
/// operators get [`Precedence::Lowest`] and terminate the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
	Lowest,
	/// `=`
	Assign,
	/// `or`
	Or,
	/// `and`
	And,
	/// `==` `===` `!=`
	Equality,
	/// `<` `>` `<=` `>=`
	Comparison,
	/// `+` `-`
	Sum,
	/// `*` `/` `%`
	Product,
	/// prefix `-` `!` `&`
	Unary,
	/// call, index, dot, `?`, `as`
	Postfix,
}

fn token_precedence(kind: TokenKind) -> Precedence {
	match kind {
		TokenKind::Assign => Precedence::Assign,
		TokenKind::Or => Precedence::Or,
		TokenKind::And => Precedence::And,
		TokenKind::Eq | TokenKind::StrictEq | TokenKind::NotEq => Precedence::Equality,
		TokenKind::Lt | TokenKind::Gt | TokenKind::Le | TokenKind::Ge => Precedence::Comparison,
		TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
		TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
		TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot | TokenKind::Question | TokenKind::As => {
			Precedence::Postfix
		}
		_ => Precedence::Lowest,
	}
}

/// Parser over a token stream.
pub struct Parser<'a> {
	lexer:       Lexer<'a>,
	cur:         Token,
	peek:        Token,
	/// Tokens pulled for lookahead beyond `peek`, consumed before the lexer.
	buffered:    VecDeque<Token>,
	diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
	pub fn new(lexer: Lexer<'a>) -> Self {
		let mut parser = Parser {
			lexer,
			cur: Token::new(TokenKind::Eof, "", 0, 0),
			peek: Token::new(TokenKind::Eof, "", 0, 0),
			buffered: VecDeque::new(),
			diagnostics: Vec::new(),
		};
		parser.next_token();
		parser.next_token();
		parser
	}

	/// Parse the whole program. Always yields a program; syntax problems
	/// end up in the diagnostics list.
	pub fn parse(mut self) -> (Program, Vec<Diagnostic>) {
		let mut program = Program::default();
		while !self.cur_is(TokenKind::Eof) {
			// Stray semicolons at top level are harmless.
			if self.cur_is(TokenKind::Semicolon) {
				self.next_token();
				continue;
			}
			match self.parse_item() {
				Some(item) => program.items.push(item),
				None => self.next_token(),
			}
		}
		(program, self.diagnostics)
	}

	fn diag(&mut self, message: impl Into<String>) {
		self.diagnostics.push(Diagnostic::new(self.cur.line, self.cur.col, message));
	}

	fn next_token(&mut self) {
		let incoming = match self.buffered.pop_front() {
			Some(token) => token,
			None => self.lexer.next_token(),
		};
		self.cur = std::mem::replace(&mut self.peek, incoming);
	}

	/// Token `n` positions ahead of the current one (0 = current,
	/// 1 = next), buffering from the lexer without advancing.
	fn peek_ahead(&mut self, n: usize) -> TokenKind {
		match n {
			0 => self.cur.kind,
			1 => self.peek.kind,
			_ => {
				let idx = n - 2;
				while self.buffered.len() <= idx {
					let token = self.lexer.next_token();
					self.buffered.push_back(token);
				}
				self.buffered[idx].kind
			}
		}
	}

	fn cur_is(&self, kind: TokenKind) -> bool { self.cur.kind == kind }

	fn peek_is(&self, kind: TokenKind) -> bool { self.peek.kind == kind }

	/// Advance when the next token is `kind`; otherwise record a diagnostic.
	fn expect_peek(&mut self, kind: TokenKind) -> bool {
		if self.peek_is(kind) {
			self.next_token();
			return true;
		}
		let message = format!("expected {kind}, got {} ({:?})", self.peek.kind, self.peek.literal);
		self.diag(message);
		false
	}

	// --- Items ---

	fn parse_item(&mut self) -> Option<Item> {
		match self.cur.kind {
			TokenKind::Fn => self.parse_fn_decl().map(Item::Fn),
			TokenKind::Extern => self.parse_extern_decl().map(Item::Extern),
			_ => self.parse_stmt().map(Item::Stmt),
		}
	}

	fn parse_fn_decl(&mut self) -> Option<FnDecl> {
		let token = self.cur.clone();
		if !self.expect_peek(TokenKind::Ident) {
			return None;
		}
		let name = self.cur.literal.clone();
		if !self.expect_peek(TokenKind::LParen) {
			return None;
		}
		let params = self.parse_param_list();
		if !self.cur_is(TokenKind::RParen) {
			let message = format!("expected ), got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past )
		let body = self.parse_block_expr()?;
		Some(FnDecl { token, name, params, body: Rc::new(body) })
	}

	fn parse_extern_decl(&mut self) -> Option<ExternDecl> {
		let token = self.cur.clone();
		if !self.expect_peek(TokenKind::Fn) {
			return None;
		}
		if !self.expect_peek(TokenKind::Ident) {
			return None;
		}
		let name = self.cur.literal.clone();
		if !self.expect_peek(TokenKind::LParen) {
			return None;
		}
		let params = self.parse_param_list();
		if !self.cur_is(TokenKind::RParen) {
			let message = format!("expected ), got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past )
		if self.cur_is(TokenKind::Semicolon) {
			self.next_token();
		}
		Some(ExternDecl { token, name, params })
	}

	/// Parse a parameter list. Called with the current token on `(`;
	/// returns with the current token on `)` when the list is well formed.
	fn parse_param_list(&mut self) -> Vec<Param> {
		let mut params = Vec::new();
		self.next_token(); // move past (
		if self.cur_is(TokenKind::RParen) {
			return params;
		}
		loop {
			if !self.cur_is(TokenKind::Ident) {
				let message = format!("expected parameter name, got {}", self.cur.kind);
				self.diag(message);
				return params;
			}
			let name = self.cur.literal.clone();
			let type_annotation = if self.peek_is(TokenKind::Colon) {
				self.next_token(); // move to :
				self.next_token(); // move to type name
				Some(self.cur.literal.clone())
			} else {
				None
			};
			params.push(Param { name, type_annotation });
			if !self.peek_is(TokenKind::Comma) {
				break;
			}
			self.next_token(); // move to comma
			self.next_token(); // move past comma
		}
		self.next_token(); // advance to )
		params
	}

	// --- Statements ---

	fn parse_stmt(&mut self) -> Option<Stmt> {
		match self.cur.kind {
			TokenKind::Let => self.parse_let_stmt(),
			TokenKind::Const => self.parse_const_stmt(),
			TokenKind::Return => self.parse_return_stmt(),
			TokenKind::Decree => self.parse_decree_stmt(),
			_ => self.parse_expr_stmt(),
		}
	}

	fn parse_let_stmt(&mut self) -> Option<Stmt> {
		let token = self.cur.clone();
		self.next_token(); // move past let
		// `ok` and `err` are legal binding names.
		if !matches!(self.cur.kind, TokenKind::Ident | TokenKind::Ok | TokenKind::Err) {
			let message = format!("expected identifier after let, got {} ({:?})", self.cur.kind, self.cur.literal);
			self.diag(message);
			return None;
		}
		let name = self.cur.literal.clone();
		let type_annotation = if self.peek_is(TokenKind::Colon) {
			self.next_token(); // move to :
			self.next_token(); // move to type name
			Some(self.cur.literal.clone())
		} else {
			None
		};
		if !self.expect_peek(TokenKind::Assign) {
			return None;
		}
		self.next_token(); // move past =
		let value = self.parse_expression(Precedence::Lowest)?;
		if self.cur_is(TokenKind::Semicolon) {
			self.next_token();
		}
		Some(Stmt::Let { token, name, type_annotation, value })
	}

	fn parse_const_stmt(&mut self) -> Option<Stmt> {
		let token = self.cur.clone();
		if !self.expect_peek(TokenKind::Ident) {
			return None;
		}
		let name = self.cur.literal.clone();
		let type_annotation = if self.peek_is(TokenKind::Colon) {
			self.next_token(); // move to :
			self.next_token(); // move to type name
			Some(self.cur.literal.clone())
		} else {
			None
		};
		if !self.expect_peek(TokenKind::Assign) {
			return None;
		}
		self.next_token(); // move past =
		let value = self.parse_expression(Precedence::Lowest)?;
		if self.cur_is(TokenKind::Semicolon) {
			self.next_token();
		}
		Some(Stmt::Const { token, name, type_annotation, value })
	}

	fn parse_return_stmt(&mut self) -> Option<Stmt> {
		let token = self.cur.clone();
		self.next_token(); // move past return
		let value = self.parse_expression(Precedence::Lowest)?;
		if self.cur_is(TokenKind::Semicolon) {
			self.next_token();
		}
		Some(Stmt::Return { token, value })
	}

	fn parse_decree_stmt(&mut self) -> Option<Stmt> {
		let token = self.cur.clone();
		if !self.expect_peek(TokenKind::Str) {
			return None;
		}
		let value = self.cur.literal.clone();
		self.next_token(); // move past string
		if self.cur_is(TokenKind::Semicolon) {
			self.next_token();
		}
		Some(Stmt::Decree { token, value })
	}

	fn parse_expr_stmt(&mut self) -> Option<Stmt> {
		let expr = self.parse_expression(Precedence::Lowest)?;
		if self.cur_is(TokenKind::Semicolon) {
			self.next_token();
		}
		Some(Stmt::Expr(expr))
	}

	// --- Expressions ---

	fn parse_expression(&mut self, prec: Precedence) -> Option<Expr> {
		let mut left = self.parse_prefix()?;
		while token_precedence(self.cur.kind) > prec {
			left = self.parse_infix(left)?;
		}
		Some(left)
	}

	fn parse_prefix(&mut self) -> Option<Expr> {
		match self.cur.kind {
			TokenKind::Int => self.parse_int_lit(),
			TokenKind::Float => self.parse_float_lit(),
			TokenKind::Str => self.parse_string_lit(),
			TokenKind::True | TokenKind::False => self.parse_bool_lit(),
			TokenKind::Nil => self.parse_nil_lit(),
			TokenKind::Ident => self.parse_ident_expr(),
			TokenKind::Minus | TokenKind::Bang | TokenKind::Amp => self.parse_unary_expr(),
			TokenKind::LParen => self.parse_grouped_expr(),
			TokenKind::LBracket => self.parse_array_lit(),
			TokenKind::LBrace => self.parse_block_or_map(),
			TokenKind::If => self.parse_if_expr(),
			TokenKind::Match => self.parse_match_expr(),
			TokenKind::Guard => self.parse_guard_expr(),
			TokenKind::Ok | TokenKind::Err => self.parse_result_ctor(),
			TokenKind::Speak => self.parse_speak_expr(),
			TokenKind::Sorry => self.parse_sorry_expr(),
			TokenKind::Doom => self.parse_doom_expr(),
			TokenKind::Chant => self.parse_chant_expr(),
			TokenKind::Spawn => self.parse_spawn_expr(),
			TokenKind::AwaitAll => self.parse_await_all_expr(),
			TokenKind::Fn => self.parse_fn_lit(),
			_ => {
				let message = format!("unexpected token {} ({:?})", self.cur.kind, self.cur.literal);
				self.diag(message);
				None
			}
		}
	}

	fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
		match self.cur.kind {
			TokenKind::Plus
			| TokenKind::Minus
			| TokenKind::Star
			| TokenKind::Slash
			| TokenKind::Percent
			| TokenKind::Eq
			| TokenKind::StrictEq
			| TokenKind::NotEq
			| TokenKind::Lt
			| TokenKind::Gt
			| TokenKind::Le
			| TokenKind::Ge
			| TokenKind::And
			| TokenKind::Or => self.parse_binary_expr(left),
			TokenKind::Assign => self.parse_assign_expr(left),
			TokenKind::LParen => self.parse_call_expr(left),
			TokenKind::LBracket => self.parse_index_expr(left),
			TokenKind::Dot => self.parse_dot_expr(left),
			TokenKind::Question => self.parse_propagate_expr(left),
			TokenKind::As => self.parse_as_expr(left),
			_ => Some(left),
		}
	}

	// --- Infix parsers: called with the current token on the operator ---

	fn parse_binary_expr(&mut self, left: Expr) -> Option<Expr> {
		let prec = token_precedence(self.cur.kind);
		let operator = self.cur.clone();
		self.next_token(); // move past operator
		let right = self.parse_expression(prec)?;
		Some(Expr::Binary { operator, left: Box::new(left), right: Box::new(right) })
	}

	/// `=` lowers to one of three assignment forms depending on the shape
	/// of the left-hand side.
	fn parse_assign_expr(&mut self, left: Expr) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past =
		let value = Box::new(self.parse_expression(Precedence::Lowest)?);
		match left {
			Expr::Ident { name, .. } => Some(Expr::Assign { token, name, value }),
			Expr::Index { target, index, .. } => Some(Expr::IndexAssign { token, target, index, value }),
			Expr::Field { target, field, .. } => Some(Expr::FieldAssign { token, target, field, value }),
			_ => {
				self.diag("left side of assignment must be an identifier, index expression, or dot expression");
				None
			}
		}
	}

	fn parse_call_expr(&mut self, left: Expr) -> Option<Expr> {
		let token = self.cur.clone();
		let args = self.parse_expr_list(TokenKind::RParen)?;
		Some(Expr::Call { token, callee: Box::new(left), args })
	}

	fn parse_index_expr(&mut self, left: Expr) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past [
		let index = self.parse_expression(Precedence::Lowest)?;
		if !self.cur_is(TokenKind::RBracket) {
			let message = format!("expected ], got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past ]
		Some(Expr::Index { token, target: Box::new(left), index: Box::new(index) })
	}

	fn parse_dot_expr(&mut self, left: Expr) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past .
		if !self.cur_is(TokenKind::Ident) {
			let message = format!("expected identifier after ., got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		let field = self.cur.literal.clone();
		self.next_token(); // move past field name
		Some(Expr::Field { token, target: Box::new(left), field })
	}

	fn parse_propagate_expr(&mut self, left: Expr) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past ?
		Some(Expr::Propagate { token, inner: Box::new(left) })
	}

	fn parse_as_expr(&mut self, left: Expr) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past as
		let type_name = self.cur.literal.clone();
		self.next_token(); // move past type name
		Some(Expr::As { token, inner: Box::new(left), type_name })
	}

	// --- Prefix parsers: all leave the current token just past the expression ---

	fn parse_int_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let cleaned = token.literal.replace('_', "");
		let parsed = if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
			i64::from_str_radix(hex, 16)
		} else {
			cleaned.parse::<i64>()
		};
		let value = match parsed {
			Ok(value) => value,
			Err(e) => {
				let message = format!("could not parse {:?} as integer: {e}", token.literal);
				self.diag(message);
				return None;
			}
		};
		self.next_token();
		Some(Expr::Int { token, value })
	}

	fn parse_float_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let value = match token.literal.replace('_', "").parse::<f64>() {
			Ok(value) => value,
			Err(e) => {
				let message = format!("could not parse {:?} as float: {e}", token.literal);
				self.diag(message);
				return None;
			}
		};
		self.next_token();
		Some(Expr::Float { token, value })
	}

	fn parse_string_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let value = token.literal.clone();
		self.next_token();
		Some(Expr::Str { token, value })
	}

	fn parse_bool_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let value = self.cur_is(TokenKind::True);
		self.next_token();
		Some(Expr::Bool { token, value })
	}

	fn parse_nil_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token();
		Some(Expr::Nil { token })
	}

	fn parse_ident_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let name = token.literal.clone();
		self.next_token();
		Some(Expr::Ident { token, name })
	}

	fn parse_unary_expr(&mut self) -> Option<Expr> {
		let operator = self.cur.clone();
		self.next_token(); // move past operator
		let right = self.parse_expression(Precedence::Unary)?;
		Some(Expr::Unary { operator, right: Box::new(right) })
	}

	fn parse_grouped_expr(&mut self) -> Option<Expr> {
		self.next_token(); // skip (
		let expr = self.parse_expression(Precedence::Lowest)?;
		if !self.cur_is(TokenKind::RParen) {
			let message = format!("expected ), got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // skip )
		Some(expr)
	}

	fn parse_array_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let elements = self.parse_expr_list(TokenKind::RBracket)?;
		Some(Expr::Array { token, elements })
	}

	/// Parse a comma-separated expression list. Called with the current
	/// token on the opening delimiter; returns with the current token
	/// after the closing one. A trailing comma is allowed.
	fn parse_expr_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
		let mut list = Vec::new();
		self.next_token(); // move past opening delimiter
		if self.cur_is(end) {
			self.next_token(); // move past closing delimiter
			return Some(list);
		}
		list.push(self.parse_expression(Precedence::Lowest)?);
		while self.cur_is(TokenKind::Comma) {
			self.next_token(); // skip comma
			if self.cur_is(end) {
				break;
			}
			list.push(self.parse_expression(Precedence::Lowest)?);
		}
		if !self.cur_is(end) {
			let message = format!("expected {end}, got {}", self.cur.kind);
			self.diag(message);
			return Some(list);
		}
		self.next_token(); // move past closing delimiter
		Some(list)
	}

	// --- Block / map ---

	fn parse_block_or_map(&mut self) -> Option<Expr> {
		if self.is_map_literal() {
			self.parse_map_lit()
		} else {
			self.parse_block_expr().map(Expr::Block)
		}
	}

	/// Decide whether `{` opens a map literal: the next token is a string,
	/// or it is a plausible key and the token after it is `:`.
	fn is_map_literal(&mut self) -> bool {
		if self.peek_is(TokenKind::Str) {
			return true;
		}
		match self.peek.kind {
			TokenKind::Ident
			| TokenKind::Ok
			| TokenKind::Err
			| TokenKind::Int
			| TokenKind::Float
			| TokenKind::True
			| TokenKind::False
			| TokenKind::Nil => self.peek_ahead(2) == TokenKind::Colon,
			_ => false,
		}
	}

	fn parse_map_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let mut pairs = Vec::new();
		self.next_token(); // move past {
		while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::Eof) {
			let key = self.parse_expression(Precedence::Lowest)?;
			if !self.cur_is(TokenKind::Colon) {
				let message = format!("expected :, got {}", self.cur.kind);
				self.diag(message);
				return Some(Expr::Map { token, pairs });
			}
			self.next_token(); // move past :
			let value = self.parse_expression(Precedence::Lowest)?;
			pairs.push(MapPair { key, value });
			// Entries separate with commas or semicolons, trailing allowed.
			if self.cur_is(TokenKind::Comma) || self.cur_is(TokenKind::Semicolon) {
				self.next_token();
			}
		}
		if !self.cur_is(TokenKind::RBrace) {
			let message = format!("expected }}, got {}", self.cur.kind);
			self.diag(message);
			return Some(Expr::Map { token, pairs });
		}
		self.next_token(); // move past }
		Some(Expr::Map { token, pairs })
	}

	/// Parse `{ stmts... [final expression] }`. Called with the current
	/// token on `{`; returns with the current token past `}`.
	fn parse_block_expr(&mut self) -> Option<BlockExpr> {
		if !self.cur_is(TokenKind::LBrace) {
			let message = format!("expected {{, got {} ({:?})", self.cur.kind, self.cur.literal);
			self.diag(message);
			return None;
		}
		let token = self.cur.clone();
		let mut stmts = Vec::new();
		let mut final_expr = None;
		self.next_token(); // move past {

		while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::Eof) {
			if matches!(self.cur.kind, TokenKind::Let | TokenKind::Const | TokenKind::Return | TokenKind::Decree)
			{
				if let Some(stmt) = self.parse_stmt() {
					stmts.push(stmt);
				}
				continue;
			}

			let Some(expr) = self.parse_expression(Precedence::Lowest) else {
				self.next_token();
				continue;
			};

			if self.cur_is(TokenKind::Semicolon) {
				stmts.push(Stmt::Expr(expr));
				self.next_token(); // consume ;
			} else if self.cur_is(TokenKind::RBrace) {
				final_expr = Some(Box::new(expr));
			} else {
				stmts.push(Stmt::Expr(expr));
			}
		}

		if !self.cur_is(TokenKind::RBrace) {
			self.diag("expected }");
			return Some(BlockExpr { token, stmts, final_expr });
		}
		self.next_token(); // move past }
		Some(BlockExpr { token, stmts, final_expr })
	}

	// --- Keyword expression parsers ---

	fn parse_if_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past if
		let condition = Box::new(self.parse_expression(Precedence::Lowest)?);
		let then = Box::new(self.parse_block_expr()?);

		let mut else_branch = None;
		if self.cur_is(TokenKind::Else) {
			let else_token = self.cur.clone();
			self.next_token(); // move past else
			else_branch = Some(Box::new(if self.cur_is(TokenKind::If) {
				self.parse_if_expr()?
			} else if self.cur_is(TokenKind::LBrace) {
				Expr::Block(self.parse_block_expr()?)
			} else {
				// Bare expression after else: wrap in an implicit block.
				let else_expr = self.parse_expression(Precedence::Lowest)?;
				Expr::Block(BlockExpr { token: else_token, stmts: Vec::new(), final_expr: Some(Box::new(else_expr)) })
			}));
		}
		Some(Expr::If { token, condition, then, else_branch })
	}

	fn parse_match_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past match
		let subject = Box::new(self.parse_expression(Precedence::Lowest)?);

		if !self.cur_is(TokenKind::LBrace) {
			let message = format!("expected {{ after match subject, got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past {

		let mut arms = Vec::new();
		while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::Eof) {
			// Pattern parsing always makes progress, so a bad arm cannot
			// wedge the loop.
			if let Some(arm) = self.parse_match_arm() {
				arms.push(arm);
			}
		}
		if self.cur_is(TokenKind::RBrace) {
			self.next_token(); // move past }
		}
		Some(Expr::Match { token, subject, arms })
	}

	fn parse_match_arm(&mut self) -> Option<MatchArm> {
		let pattern = self.parse_pattern();

		if !self.cur_is(TokenKind::Arrow) {
			let message = format!("expected =>, got {} ({:?})", self.cur.kind, self.cur.literal);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past =>

		let body = self.parse_expression(Precedence::Lowest)?;

		if self.cur_is(TokenKind::Comma) || self.cur_is(TokenKind::Semicolon) {
			self.next_token();
		}
		Some(MatchArm { pattern, body })
	}

	fn parse_pattern(&mut self) -> Pattern {
		// `_` is the wildcard.
		if self.cur_is(TokenKind::Ident) && self.cur.literal == "_" {
			let token = self.cur.clone();
			self.next_token();
			return self.maybe_guarded(Pattern::Wildcard { token });
		}

		// ok(v) / err(e) destructuring, encoded into the binding name.
		if matches!(self.cur.kind, TokenKind::Ok | TokenKind::Err) && self.peek_is(TokenKind::LParen) {
			let token = self.cur.clone();
			let ctor = self.cur.literal.clone();
			self.next_token(); // skip ok/err
			self.next_token(); // skip (
			let mut inner = String::new();
			if self.cur_is(TokenKind::Ident) {
				inner = self.cur.literal.clone();
				self.next_token();
			}
			if self.cur_is(TokenKind::RParen) {
				self.next_token(); // skip )
			}
			let name = format!("{ctor}({inner})");
			return self.maybe_guarded(Pattern::Ident { token, name });
		}

		// Literal patterns.
		if matches!(
			self.cur.kind,
			TokenKind::Int | TokenKind::Float | TokenKind::Str | TokenKind::True | TokenKind::False | TokenKind::Nil
		) {
			let token = self.cur.clone();
			if let Some(value) = self.parse_prefix() {
				return self.maybe_guarded(Pattern::Literal { token, value });
			}
			return Pattern::Wildcard { token };
		}

		// Negative literal.
		if self.cur_is(TokenKind::Minus) && matches!(self.peek.kind, TokenKind::Int | TokenKind::Float) {
			let token = self.cur.clone();
			if let Some(value) = self.parse_unary_expr() {
				return self.maybe_guarded(Pattern::Literal { token, value });
			}
			return Pattern::Wildcard { token };
		}

		// Binding, or typed binding when a `: type` follows.
		if self.cur_is(TokenKind::Ident) {
			let token = self.cur.clone();
			let name = self.cur.literal.clone();
			self.next_token();
			if self.cur_is(TokenKind::Colon) {
				self.next_token(); // skip :
				let type_name = self.cur.literal.clone();
				self.next_token(); // skip type name
				return self.maybe_guarded(Pattern::Typed { token, name, type_name });
			}
			return self.maybe_guarded(Pattern::Ident { token, name });
		}

		let message = format!("unexpected token in pattern: {} ({:?})", self.cur.kind, self.cur.literal);
		self.diag(message);
		let token = self.cur.clone();
		self.next_token();
		Pattern::Wildcard { token }
	}

	fn maybe_guarded(&mut self, inner: Pattern) -> Pattern {
		if self.cur_is(TokenKind::If) {
			let token = self.cur.clone();
			self.next_token(); // move past if
			if let Some(guard) = self.parse_expression(Precedence::Lowest) {
				return Pattern::Guarded { token, inner: Box::new(inner), guard };
			}
		}
		inner
	}

	fn parse_guard_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past guard
		let condition = Box::new(self.parse_expression(Precedence::Lowest)?);
		if !self.cur_is(TokenKind::Else) {
			let message = format!("expected else after guard condition, got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past else
		let else_body = Box::new(self.parse_expression(Precedence::Lowest)?);
		Some(Expr::Guard { token, condition, else_body })
	}

	/// `ok` / `err` build a result value only when directly followed by
	/// `(`; otherwise they are ordinary identifiers.
	fn parse_result_ctor(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		if !self.peek_is(TokenKind::LParen) {
			let name = token.literal.clone();
			self.next_token();
			return Some(Expr::Ident { token, name });
		}
		let is_ok = self.cur_is(TokenKind::Ok);
		self.next_token(); // move to (
		self.next_token(); // move past (
		let inner = Box::new(self.parse_expression(Precedence::Lowest)?);
		if !self.cur_is(TokenKind::RParen) {
			let ctor = if is_ok { "ok" } else { "err" };
			let message = format!("expected ) in {ctor}(), got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past )
		Some(if is_ok { Expr::Ok { token, inner } } else { Expr::Err { token, inner } })
	}

	fn parse_speak_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past speak
		let value = Box::new(self.parse_expression(Precedence::Lowest)?);
		let mut else_body = None;
		if self.cur_is(TokenKind::Else) {
			self.next_token(); // move past else
			else_body = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
		}
		Some(Expr::Speak { token, value, else_body })
	}

	fn parse_sorry_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		if !self.expect_peek(TokenKind::LParen) {
			return None;
		}
		self.next_token(); // move past (
		if !self.cur_is(TokenKind::Ident) {
			let message = format!("expected identifier in sorry(), got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		let name = self.cur.literal.clone();
		if !self.expect_peek(TokenKind::RParen) {
			return None;
		}
		self.next_token(); // move past )
		Some(Expr::Sorry { token, name })
	}

	fn parse_doom_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		if !self.expect_peek(TokenKind::LParen) {
			return None;
		}
		self.next_token(); // move past (
		let message = Box::new(self.parse_expression(Precedence::Lowest)?);
		if !self.cur_is(TokenKind::RParen) {
			let msg = format!("expected ) in doom(), got {}", self.cur.kind);
			self.diag(msg);
			return None;
		}
		self.next_token(); // move past )
		Some(Expr::Doom { token, message })
	}

	fn parse_chant_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past chant
		let value = Box::new(self.parse_expression(Precedence::Lowest)?);
		Some(Expr::Chant { token, value })
	}

	fn parse_spawn_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		self.next_token(); // move past spawn
		let body = self.parse_block_expr()?;
		Some(Expr::Spawn { token, body })
	}

	fn parse_await_all_expr(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		if self.peek_is(TokenKind::LParen) {
			self.next_token(); // move to (
			if !self.expect_peek(TokenKind::RParen) {
				return None;
			}
			self.next_token(); // move past )
		} else {
			self.next_token(); // move past await_all
		}
		Some(Expr::AwaitAll { token })
	}

	/// `fn` in expression position is a function literal; the name is
	/// optional and purely cosmetic.
	fn parse_fn_lit(&mut self) -> Option<Expr> {
		let token = self.cur.clone();
		let mut name = None;
		if self.peek_is(TokenKind::Ident) {
			self.next_token(); // move to name
			name = Some(self.cur.literal.clone());
		}
		if !self.expect_peek(TokenKind::LParen) {
			return None;
		}
		let params = self.parse_param_list();
		if !self.cur_is(TokenKind::RParen) {
			let message = format!("expected ), got {}", self.cur.kind);
			self.diag(message);
			return None;
		}
		self.next_token(); // move past )
		let body = self.parse_block_expr()?;
		Some(Expr::FnLit { token, name, params, body: Rc::new(body) })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse_ok(input: &str) -> Program {
		let (program, diagnostics) = Parser::new(Lexer::new(input)).parse();
		assert!(diagnostics.is_empty(), "unexpected diagnostics for {input:?}: {diagnostics:?}");
		program
	}

	fn parse_with_errors(input: &str) -> Vec<Diagnostic> {
		let (_, diagnostics) = Parser::new(Lexer::new(input)).parse();
		diagnostics
	}

	fn only_expr(program: &Program) -> &Expr {
		assert_eq!(program.items.len(), 1, "expected a single item in {program:?}");
		match &program.items[0] {
			Item::Stmt(Stmt::Expr(expr)) => expr,
			other => panic!("expected expression statement, got {other:?}"),
		}
	}

	#[test]
	fn let_stmt() {
		let program = parse_ok("let x = 5;");
		match &program.items[0] {
			Item::Stmt(Stmt::Let { name, type_annotation, value, .. }) => {
				assert_eq!(name, "x");
				assert!(type_annotation.is_none());
				assert!(matches!(value, Expr::Int { value: 5, .. }));
			}
			other => panic!("expected let, got {other:?}"),
		}
	}

	#[test]
	fn let_stmt_with_type() {
		let program = parse_ok("let x: int = 5;");
		match &program.items[0] {
			Item::Stmt(Stmt::Let { type_annotation, .. }) => {
				assert_eq!(type_annotation.as_deref(), Some("int"));
			}
			other => panic!("expected let, got {other:?}"),
		}
	}

	#[test]
	fn let_allows_ok_and_err_names() {
		let program = parse_ok("let ok = 1; let err = 2;");
		assert_eq!(program.items.len(), 2);
		assert!(matches!(&program.items[0], Item::Stmt(Stmt::Let { name, .. }) if name == "ok"));
		assert!(matches!(&program.items[1], Item::Stmt(Stmt::Let { name, .. }) if name == "err"));
	}

	#[test]
	fn const_stmt() {
		let program = parse_ok("const y: str = \"hi\";");
		match &program.items[0] {
			Item::Stmt(Stmt::Const { name, type_annotation, value, .. }) => {
				assert_eq!(name, "y");
				assert_eq!(type_annotation.as_deref(), Some("str"));
				assert!(matches!(value, Expr::Str { .. }));
			}
			other => panic!("expected const, got {other:?}"),
		}
	}

	#[test]
	fn return_stmt() {
		let program = parse_ok("return 1 + 2;");
		assert!(matches!(&program.items[0], Item::Stmt(Stmt::Return { value: Expr::Binary { .. }, .. })));
	}

	#[test]
	fn decree_stmt() {
		let program = parse_ok("decree \"zero_indexed\";");
		assert!(matches!(&program.items[0], Item::Stmt(Stmt::Decree { value, .. }) if value == "zero_indexed"));
	}

	#[test]
	fn binary_precedence() {
		let program = parse_ok("1 + 2 * 3;");
		let Expr::Binary { operator, left, right } = only_expr(&program) else { panic!("expected binary") };
		assert_eq!(operator.kind, TokenKind::Plus);
		assert!(matches!(left.as_ref(), Expr::Int { value: 1, .. }));
		let Expr::Binary { operator, .. } = right.as_ref() else { panic!("expected nested binary") };
		assert_eq!(operator.kind, TokenKind::Star);
	}

	#[test]
	fn comparison_binds_tighter_than_logic() {
		let program = parse_ok("a < b and c > d;");
		let Expr::Binary { operator, left, right } = only_expr(&program) else { panic!("expected binary") };
		assert_eq!(operator.kind, TokenKind::And);
		assert!(matches!(left.as_ref(), Expr::Binary { operator, .. } if operator.kind == TokenKind::Lt));
		assert!(matches!(right.as_ref(), Expr::Binary { operator, .. } if operator.kind == TokenKind::Gt));
	}

	#[test]
	fn or_binds_weaker_than_and() {
		let program = parse_ok("a and b or c;");
		let Expr::Binary { operator, left, .. } = only_expr(&program) else { panic!("expected binary") };
		assert_eq!(operator.kind, TokenKind::Or);
		assert!(matches!(left.as_ref(), Expr::Binary { operator, .. } if operator.kind == TokenKind::And));
	}

	#[test]
	fn equality_variants() {
		for (source, kind) in
			[("a == b;", TokenKind::Eq), ("a === b;", TokenKind::StrictEq), ("a != b;", TokenKind::NotEq)]
		{
			let program = parse_ok(source);
			let Expr::Binary { operator, .. } = only_expr(&program) else { panic!("expected binary") };
			assert_eq!(operator.kind, kind);
		}
	}

	#[test]
	fn unary_expr() {
		let program = parse_ok("-x;");
		let Expr::Unary { operator, right } = only_expr(&program) else { panic!("expected unary") };
		assert_eq!(operator.kind, TokenKind::Minus);
		assert!(matches!(right.as_ref(), Expr::Ident { .. }));

		let program = parse_ok("!ready;");
		assert!(matches!(only_expr(&program), Expr::Unary { operator, .. } if operator.kind == TokenKind::Bang));

		let program = parse_ok("&x;");
		assert!(matches!(only_expr(&program), Expr::Unary { operator, .. } if operator.kind == TokenKind::Amp));
	}

	#[test]
	fn grouping_overrides_precedence() {
		let program = parse_ok("(1 + 2) * 3;");
		let Expr::Binary { operator, left, .. } = only_expr(&program) else { panic!("expected binary") };
		assert_eq!(operator.kind, TokenKind::Star);
		assert!(matches!(left.as_ref(), Expr::Binary { operator, .. } if operator.kind == TokenKind::Plus));
	}

	#[test]
	fn if_else_expr() {
		let program = parse_ok("if x { 1 } else { 2 }");
		let Expr::If { condition, then, else_branch, .. } = only_expr(&program) else { panic!("expected if") };
		assert!(matches!(condition.as_ref(), Expr::Ident { .. }));
		assert!(then.final_expr.is_some());
		assert!(matches!(else_branch.as_deref(), Some(Expr::Block(_))));
	}

	#[test]
	fn if_else_if_chain() {
		let program = parse_ok("if a { 1 } else if b { 2 } else { 3 }");
		let Expr::If { else_branch, .. } = only_expr(&program) else { panic!("expected if") };
		assert!(matches!(else_branch.as_deref(), Some(Expr::If { .. })));
	}

	#[test]
	fn bare_else_expression_wraps_in_block() {
		let program = parse_ok("if a { 1 } else 2");
		let Expr::If { else_branch, .. } = only_expr(&program) else { panic!("expected if") };
		let Some(Expr::Block(block)) = else_branch.as_deref() else { panic!("expected implicit block") };
		assert!(block.stmts.is_empty());
		assert!(matches!(block.final_expr.as_deref(), Some(Expr::Int { value: 2, .. })));
	}

	#[test]
	fn match_expr_arms() {
		let program = parse_ok("match x { 1 => \"one\", _ => \"other\", }");
		let Expr::Match { arms, .. } = only_expr(&program) else { panic!("expected match") };
		assert_eq!(arms.len(), 2);
		assert!(matches!(&arms[0].pattern, Pattern::Literal { .. }));
		assert!(matches!(&arms[1].pattern, Pattern::Wildcard { .. }));
	}

	#[test]
	fn match_result_patterns() {
		let program = parse_ok("match r { ok(v) => v, err(e) => e, }");
		let Expr::Match { arms, .. } = only_expr(&program) else { panic!("expected match") };
		assert!(matches!(&arms[0].pattern, Pattern::Ident { name, .. } if name == "ok(v)"));
		assert!(matches!(&arms[1].pattern, Pattern::Ident { name, .. } if name == "err(e)"));
	}

	#[test]
	fn match_empty_result_patterns() {
		let program = parse_ok("match r { ok() => 1, err() => 2, }");
		let Expr::Match { arms, .. } = only_expr(&program) else { panic!("expected match") };
		assert!(matches!(&arms[0].pattern, Pattern::Ident { name, .. } if name == "ok()"));
		assert!(matches!(&arms[1].pattern, Pattern::Ident { name, .. } if name == "err()"));
	}

	#[test]
	fn match_typed_pattern() {
		let program = parse_ok("match x { n: int => n, _ => 0, }");
		let Expr::Match { arms, .. } = only_expr(&program) else { panic!("expected match") };
		assert!(
			matches!(&arms[0].pattern, Pattern::Typed { name, type_name, .. } if name == "n" && type_name == "int")
		);
	}

	#[test]
	fn match_guarded_pattern() {
		let program = parse_ok("match x { n if n > 3 => n, _ => 0, }");
		let Expr::Match { arms, .. } = only_expr(&program) else { panic!("expected match") };
		let Pattern::Guarded { inner, guard, .. } = &arms[0].pattern else { panic!("expected guarded") };
		assert!(matches!(inner.as_ref(), Pattern::Ident { name, .. } if name == "n"));
		assert!(matches!(guard, Expr::Binary { .. }));
	}

	#[test]
	fn match_negative_literal_pattern() {
		let program = parse_ok("match x { -1 => \"neg\", _ => \"other\", }");
		let Expr::Match { arms, .. } = only_expr(&program) else { panic!("expected match") };
		assert!(matches!(&arms[0].pattern, Pattern::Literal { value: Expr::Unary { .. }, .. }));
	}

	#[test]
	fn guard_expr() {
		let program = parse_ok("guard x > 0 else err(\"neg\")");
		let Expr::Guard { condition, else_body, .. } = only_expr(&program) else { panic!("expected guard") };
		assert!(matches!(condition.as_ref(), Expr::Binary { .. }));
		assert!(matches!(else_body.as_ref(), Expr::Err { .. }));
	}

	#[test]
	fn ok_err_constructors_need_parens() {
		let program = parse_ok("ok(1);");
		assert!(matches!(only_expr(&program), Expr::Ok { .. }));

		let program = parse_ok("err(\"bad\");");
		assert!(matches!(only_expr(&program), Expr::Err { .. }));

		// Without parens they are identifiers.
		let program = parse_ok("ok;");
		assert!(matches!(only_expr(&program), Expr::Ident { name, .. } if name == "ok"));
	}

	#[test]
	fn speak_with_and_without_else() {
		let program = parse_ok("speak x else 0;");
		let Expr::Speak { else_body, .. } = only_expr(&program) else { panic!("expected speak") };
		assert!(else_body.is_some());

		let program = parse_ok("speak x;");
		let Expr::Speak { else_body, .. } = only_expr(&program) else { panic!("expected speak") };
		assert!(else_body.is_none());
	}

	#[test]
	fn sorry_doom_chant() {
		let program = parse_ok("sorry(y);");
		assert!(matches!(only_expr(&program), Expr::Sorry { name, .. } if name == "y"));

		let program = parse_ok("doom(\"it ends\");");
		assert!(matches!(only_expr(&program), Expr::Doom { .. }));

		let program = parse_ok("chant x + 1;");
		assert!(matches!(only_expr(&program), Expr::Chant { value, .. } if matches!(value.as_ref(), Expr::Binary { .. })));
	}

	#[test]
	fn propagate_expr() {
		let program = parse_ok("get()?;");
		let Expr::Propagate { inner, .. } = only_expr(&program) else { panic!("expected propagate") };
		assert!(matches!(inner.as_ref(), Expr::Call { .. }));
	}

	#[test]
	fn as_expr() {
		let program = parse_ok("x as int;");
		let Expr::As { type_name, .. } = only_expr(&program) else { panic!("expected as") };
		assert_eq!(type_name, "int");
	}

	#[test]
	fn call_expr_args() {
		let program = parse_ok("add(1, 2 * 3, \"x\",);");
		let Expr::Call { callee, args, .. } = only_expr(&program) else { panic!("expected call") };
		assert!(matches!(callee.as_ref(), Expr::Ident { name, .. } if name == "add"));
		assert_eq!(args.len(), 3);
	}

	#[test]
	fn index_and_dot() {
		let program = parse_ok("xs[0];");
		assert!(matches!(only_expr(&program), Expr::Index { .. }));

		let program = parse_ok("m.field;");
		assert!(matches!(only_expr(&program), Expr::Field { field, .. } if field == "field"));

		let program = parse_ok("m.a.b;");
		let Expr::Field { target, field, .. } = only_expr(&program) else { panic!("expected field") };
		assert_eq!(field, "b");
		assert!(matches!(target.as_ref(), Expr::Field { field, .. } if field == "a"));
	}

	#[test]
	fn array_literal() {
		let program = parse_ok("[1, 2, 3,];");
		let Expr::Array { elements, .. } = only_expr(&program) else { panic!("expected array") };
		assert_eq!(elements.len(), 3);

		let program = parse_ok("[];");
		let Expr::Array { elements, .. } = only_expr(&program) else { panic!("expected array") };
		assert!(elements.is_empty());
	}

	#[test]
	fn map_literal_keys() {
		let program = parse_ok("{\"a\": 1, b: 2; 3: \"c\",}");
		let Expr::Map { pairs, .. } = only_expr(&program) else { panic!("expected map") };
		assert_eq!(pairs.len(), 3);
		assert!(matches!(&pairs[0].key, Expr::Str { .. }));
		assert!(matches!(&pairs[1].key, Expr::Ident { .. }));
		assert!(matches!(&pairs[2].key, Expr::Int { .. }));
	}

	#[test]
	fn map_vs_block_disambiguation() {
		// `{ x: 1 }` is a map, `{ x }` is a block.
		let program = parse_ok("{x: 1}");
		assert!(matches!(only_expr(&program), Expr::Map { .. }));

		let program = parse_ok("{x}");
		assert!(matches!(only_expr(&program), Expr::Block(_)));

		// A leading statement keyword always means a block.
		let program = parse_ok("{ let a = 1; a }");
		let Expr::Block(block) = only_expr(&program) else { panic!("expected block") };
		assert_eq!(block.stmts.len(), 1);
		assert!(block.final_expr.is_some());
	}

	#[test]
	fn block_final_expr() {
		let program = parse_ok("{ 1; 2; 3 }");
		let Expr::Block(block) = only_expr(&program) else { panic!("expected block") };
		assert_eq!(block.stmts.len(), 2);
		assert!(matches!(block.final_expr.as_deref(), Some(Expr::Int { value: 3, .. })));

		let program = parse_ok("{ 1; 2; }");
		let Expr::Block(block) = only_expr(&program) else { panic!("expected block") };
		assert_eq!(block.stmts.len(), 2);
		assert!(block.final_expr.is_none());
	}

	#[test]
	fn fn_decl() {
		let program = parse_ok("fn add(a, b: int) { a + b }");
		let Item::Fn(decl) = &program.items[0] else { panic!("expected fn decl") };
		assert_eq!(decl.name, "add");
		assert_eq!(decl.params.len(), 2);
		assert_eq!(decl.params[0].name, "a");
		assert!(decl.params[0].type_annotation.is_none());
		assert_eq!(decl.params[1].type_annotation.as_deref(), Some("int"));
		assert!(decl.body.final_expr.is_some());
	}

	#[test]
	fn extern_decl() {
		let program = parse_ok("extern fn write_port(port, value);");
		let Item::Extern(decl) = &program.items[0] else { panic!("expected extern decl") };
		assert_eq!(decl.name, "write_port");
		assert_eq!(decl.params.len(), 2);
	}

	#[test]
	fn fn_literal_forms() {
		let program = parse_ok("let f = fn(x) { x * 2 };");
		let Item::Stmt(Stmt::Let { value, .. }) = &program.items[0] else { panic!("expected let") };
		let Expr::FnLit { name, params, .. } = value else { panic!("expected fn literal") };
		assert!(name.is_none());
		assert_eq!(params.len(), 1);

		// Immediately invoked.
		let program = parse_ok("fn(x) { x + 1 }(41);");
		let Expr::Call { callee, args, .. } = only_expr(&program) else { panic!("expected call") };
		assert!(matches!(callee.as_ref(), Expr::FnLit { .. }));
		assert_eq!(args.len(), 1);
	}

	#[test]
	fn spawn_and_await_all() {
		let program = parse_ok("spawn { speak 1; };");
		assert!(matches!(only_expr(&program), Expr::Spawn { .. }));

		let program = parse_ok("await_all;");
		assert!(matches!(only_expr(&program), Expr::AwaitAll { .. }));

		let program = parse_ok("await_all();");
		assert!(matches!(only_expr(&program), Expr::AwaitAll { .. }));
	}

	#[test]
	fn assignment_lowering() {
		let program = parse_ok("x = 1;");
		assert!(matches!(only_expr(&program), Expr::Assign { name, .. } if name == "x"));

		let program = parse_ok("xs[0] = 1;");
		assert!(matches!(only_expr(&program), Expr::IndexAssign { .. }));

		let program = parse_ok("m.key = 1;");
		assert!(matches!(only_expr(&program), Expr::FieldAssign { field, .. } if field == "key"));
	}

	#[test]
	fn invalid_assignment_target() {
		let diagnostics = parse_with_errors("1 + 2 = 3;");
		assert!(!diagnostics.is_empty());
		assert!(diagnostics[0].message.contains("left side of assignment"));
	}

	#[test]
	fn hex_and_separated_int_values() {
		let program = parse_ok("0xFF;");
		assert!(matches!(only_expr(&program), Expr::Int { value: 255, .. }));

		let program = parse_ok("1_000_000;");
		assert!(matches!(only_expr(&program), Expr::Int { value: 1_000_000, .. }));
	}

	#[test]
	fn diagnostics_carry_position_and_recovery_continues() {
		let (program, diagnostics) = Parser::new(Lexer::new("let = 5; speak 1;")).parse();
		assert!(!diagnostics.is_empty());
		let rendered = diagnostics[0].to_string();
		assert!(rendered.starts_with("line 1 col "), "bad prefix: {rendered}");
		// Recovery still picks up the speak statement.
		assert!(program.items.iter().any(|item| matches!(
			item,
			Item::Stmt(Stmt::Expr(Expr::Speak { .. }))
		)));
	}

	#[test]
	fn empty_source_is_empty_program() {
		let program = parse_ok("");
		assert!(program.items.is_empty());
	}

	#[test]
	fn assignment_is_right_associative() {
		let program = parse_ok("a = b = 1;");
		let Expr::Assign { name, value, .. } = only_expr(&program) else { panic!("expected assign") };
		assert_eq!(name, "a");
		assert!(matches!(value.as_ref(), Expr::Assign { name, .. } if name == "b"));
	}
}
