//! Lexer for Maledict source code.
//!
//! Newlines are not tokens, but they are not ignored either: crossing one
//! can synthesize a semicolon. The rule is that a newline ends a statement
//! when the last emitted token could end one (a "semicolon trigger") and
//! the next token could begin one (a statement-starting keyword, or end of
//! input). Everything else about the scanner is conventional
//! longest-match over bytes; the source is UTF-8 and multi-byte sequences
//! only ever appear inside string literals and comments.

mod token;

pub use token::{Token, TokenKind};

/// A scanner over Maledict source code.
pub struct Lexer<'a> {
	/// Raw source bytes.
	input:             &'a [u8],
	/// Byte offset of the character under examination.
	pos:               usize,
	/// Byte offset of the next character.
	read_pos:          usize,
	/// Character under examination, 0 at end of input.
	ch:                u8,
	line:              usize,
	col:               usize,
	/// Kind of the last emitted token, drives semicolon insertion.
	last_kind:         TokenKind,
	/// A synthesized semicolon waiting to be emitted before the next real token.
	pending_semicolon: Option<Token>,
}

impl<'a> Lexer<'a> {
	pub fn new(source: &'a str) -> Self {
		let mut lexer = Self {
			input: source.as_bytes(),
			pos: 0,
			read_pos: 0,
			ch: 0,
			line: 1,
			col: 0,
			// Eof is not a trigger, so leading newlines never insert.
			last_kind: TokenKind::Eof,
			pending_semicolon: None,
		};
		lexer.read_char();
		lexer
	}

	fn read_char(&mut self) {
		self.ch = if self.read_pos >= self.input.len() { 0 } else { self.input[self.read_pos] };
		self.pos = self.read_pos;
		self.read_pos += 1;
		self.col += 1;
	}

	fn peek_char(&self) -> u8 {
		if self.read_pos >= self.input.len() { 0 } else { self.input[self.read_pos] }
	}

	fn peek_char_at(&self, offset: usize) -> u8 {
		let idx = self.read_pos + offset;
		if idx >= self.input.len() { 0 } else { self.input[idx] }
	}

	/// Skip whitespace and comments, leaving newline significance to the
	/// caller: returns true if at least one newline was crossed.
	fn skip_whitespace_and_comments(&mut self) -> bool {
		let mut saw_newline = false;
		loop {
			match self.ch {
				b' ' | b'\t' | b'\r' => self.read_char(),
				b'\n' => {
					saw_newline = true;
					self.line += 1;
					self.col = 0;
					self.read_char();
				}
				b'#' => {
					if self.peek_char() == b'{' {
						self.skip_block_comment();
					} else {
						self.skip_line_comment();
					}
				}
				_ => return saw_newline,
			}
		}
	}

	fn skip_line_comment(&mut self) {
		while self.ch != b'\n' && self.ch != 0 {
			self.read_char();
		}
	}

	/// Block comments `#{ ... }#` nest, but only to depth 2: a third `#{`
	/// is plain comment text.
	fn skip_block_comment(&mut self) {
		self.read_char(); // skip '#'
		self.read_char(); // skip '{'
		let mut depth = 1;
		while depth > 0 && self.ch != 0 {
			if self.ch == b'#' && self.peek_char() == b'{' {
				if depth < 2 {
					depth += 1;
					self.read_char();
					self.read_char();
				} else {
					self.read_char();
				}
			} else if self.ch == b'}' && self.peek_char() == b'#' {
				depth -= 1;
				self.read_char();
				self.read_char();
			} else {
				if self.ch == b'\n' {
					self.line += 1;
					self.col = 0;
				}
				self.read_char();
			}
		}
	}

	/// Produce the next token. Never fails; unrecognizable input becomes an
	/// `Illegal` token.
	pub fn next_token(&mut self) -> Token {
		if let Some(semi) = self.pending_semicolon.take() {
			self.last_kind = semi.kind;
			return semi;
		}

		let saw_newline = self.skip_whitespace_and_comments();

		// Semicolon insertion: a newline was crossed, the last token can
		// end a statement, and what follows starts one (or input ends).
		if saw_newline
			&& self.last_kind.is_semicolon_trigger()
			&& (self.ch == 0 || self.next_token_starts_statement())
		{
			let semi = Token::new(TokenKind::Semicolon, ";", self.line, self.col);
			self.pending_semicolon = Some(semi);
			return self.next_token();
		}

		let line = self.line;
		let col = self.col;

		let token = match self.ch {
			0 => {
				// A trailing semicolon is also synthesized at end of input.
				if self.last_kind.is_semicolon_trigger() {
					Token::new(TokenKind::Semicolon, ";", line, col)
				} else {
					Token::new(TokenKind::Eof, "", line, col)
				}
			}
			b'+' => self.single(TokenKind::Plus, "+", line, col),
			b'-' => self.single(TokenKind::Minus, "-", line, col),
			b'*' => self.single(TokenKind::Star, "*", line, col),
			b'/' => self.single(TokenKind::Slash, "/", line, col),
			b'%' => self.single(TokenKind::Percent, "%", line, col),
			b'&' => self.single(TokenKind::Amp, "&", line, col),
			b'(' => self.single(TokenKind::LParen, "(", line, col),
			b')' => self.single(TokenKind::RParen, ")", line, col),
			b'[' => self.single(TokenKind::LBracket, "[", line, col),
			b']' => self.single(TokenKind::RBracket, "]", line, col),
			b'{' => self.single(TokenKind::LBrace, "{", line, col),
			b'}' => self.single(TokenKind::RBrace, "}", line, col),
			b',' => self.single(TokenKind::Comma, ",", line, col),
			b';' => self.single(TokenKind::Semicolon, ";", line, col),
			b':' => self.single(TokenKind::Colon, ":", line, col),
			b'.' => self.single(TokenKind::Dot, ".", line, col),
			b'?' => self.single(TokenKind::Question, "?", line, col),
			b'=' => {
				if self.peek_char() == b'=' && self.peek_char_at(1) == b'=' {
					self.read_char();
					self.read_char();
					self.single(TokenKind::StrictEq, "===", line, col)
				} else if self.peek_char() == b'=' {
					self.read_char();
					self.single(TokenKind::Eq, "==", line, col)
				} else if self.peek_char() == b'>' {
					self.read_char();
					self.single(TokenKind::Arrow, "=>", line, col)
				} else {
					self.single(TokenKind::Assign, "=", line, col)
				}
			}
			b'!' => {
				if self.peek_char() == b'=' {
					self.read_char();
					self.single(TokenKind::NotEq, "!=", line, col)
				} else {
					self.single(TokenKind::Bang, "!", line, col)
				}
			}
			b'<' => {
				if self.peek_char() == b'=' {
					self.read_char();
					self.single(TokenKind::Le, "<=", line, col)
				} else {
					self.single(TokenKind::Lt, "<", line, col)
				}
			}
			b'>' => {
				if self.peek_char() == b'=' {
					self.read_char();
					self.single(TokenKind::Ge, ">=", line, col)
				} else {
					self.single(TokenKind::Gt, ">", line, col)
				}
			}
			b'"' => {
				let (literal, terminated) = self.read_string();
				let kind = if terminated { TokenKind::Str } else { TokenKind::Illegal };
				Token::new(kind, literal, line, col)
			}
			ch if ch.is_ascii_digit() => {
				let (kind, literal) = self.read_number();
				Token::new(kind, literal, line, col)
			}
			ch if is_letter(ch) => {
				let literal = self.read_identifier();
				let kind = TokenKind::lookup_ident(&literal);
				Token::new(kind, literal, line, col)
			}
			ch => {
				self.read_char();
				Token::new(TokenKind::Illegal, String::from_utf8_lossy(&[ch]).into_owned(), line, col)
			}
		};

		self.last_kind = token.kind;
		token
	}

	/// Drain the input into a token vector ending in `Eof`.
	pub fn tokenize(&mut self) -> Vec<Token> {
		let mut tokens = Vec::new();
		loop {
			let token = self.next_token();
			let done = token.kind == TokenKind::Eof;
			tokens.push(token);
			if done {
				break;
			}
		}
		tokens
	}

	fn single(&mut self, kind: TokenKind, literal: &str, line: usize, col: usize) -> Token {
		self.read_char();
		Token::new(kind, literal, line, col)
	}

	/// Read a string literal past the opening quote. Returns the decoded
	/// text and whether the closing quote was found; an unterminated
	/// string keeps everything accumulated so far.
	fn read_string(&mut self) -> (String, bool) {
		let mut bytes = Vec::new();
		self.read_char(); // skip opening quote
		while self.ch != b'"' && self.ch != 0 {
			if self.ch == b'\\' {
				self.read_char();
				match self.ch {
					b'n' => bytes.push(b'\n'),
					b't' => bytes.push(b'\t'),
					b'0' => bytes.push(0),
					b'"' => bytes.push(b'"'),
					b'\\' => bytes.push(b'\\'),
					// Unknown escape: keep the backslash and the byte.
					other => {
						bytes.push(b'\\');
						bytes.push(other);
					}
				}
			} else {
				if self.ch == b'\n' {
					self.line += 1;
					self.col = 0;
				}
				bytes.push(self.ch);
			}
			self.read_char();
		}
		let terminated = self.ch == b'"';
		if terminated {
			self.read_char(); // skip closing quote
		}
		(String::from_utf8_lossy(&bytes).into_owned(), terminated)
	}

	fn read_number(&mut self) -> (TokenKind, String) {
		let start = self.pos;

		if self.ch == b'0' && (self.peek_char() == b'x' || self.peek_char() == b'X') {
			self.read_char(); // '0'
			self.read_char(); // 'x'
			while self.ch.is_ascii_hexdigit() || self.ch == b'_' {
				self.read_char();
			}
			return (TokenKind::Int, self.slice(start));
		}

		while self.ch.is_ascii_digit() || self.ch == b'_' {
			self.read_char();
		}

		// A dot is a decimal point only when a digit follows.
		if self.ch == b'.' && self.peek_char().is_ascii_digit() {
			self.read_char(); // skip '.'
			while self.ch.is_ascii_digit() || self.ch == b'_' {
				self.read_char();
			}
			return (TokenKind::Float, self.slice(start));
		}

		(TokenKind::Int, self.slice(start))
	}

	fn read_identifier(&mut self) -> String {
		let start = self.pos;
		while is_letter(self.ch) || self.ch.is_ascii_digit() {
			self.read_char();
		}
		self.slice(start)
	}

	fn slice(&self, start: usize) -> String {
		String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
	}

	/// Peek whether the upcoming identifier is a statement-starting
	/// keyword, without consuming anything.
	fn next_token_starts_statement(&self) -> bool {
		if self.ch == 0 {
			return true;
		}
		if !is_letter(self.ch) {
			return false;
		}
		let mut end = self.pos;
		while end < self.input.len() && (is_letter(self.input[end]) || self.input[end].is_ascii_digit()) {
			end += 1;
		}
		let word = String::from_utf8_lossy(&self.input[self.pos..end]).into_owned();
		TokenKind::lookup_ident(&word).starts_statement()
	}
}

fn is_letter(ch: u8) -> bool { ch.is_ascii_alphabetic() || ch == b'_' }

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(input: &str) -> Vec<TokenKind> {
		Lexer::new(input).tokenize().into_iter().map(|t| t.kind).collect()
	}

	fn literals(input: &str) -> Vec<String> {
		Lexer::new(input).tokenize().into_iter().map(|t| t.literal).collect()
	}

	#[test]
	fn simple_tokens() {
		use TokenKind::*;
		assert_eq!(
			kinds("+ - * / % ( ) [ ] { } , ; : . ? & !"),
			vec![
				Plus, Minus, Star, Slash, Percent, LParen, RParen, LBracket, RBracket, LBrace, RBrace,
				Comma, Semicolon, Colon, Dot, Question, Amp, Bang, Eof
			]
		);
	}

	#[test]
	fn keywords() {
		use TokenKind::*;
		assert_eq!(
			kinds("let const fn return if else match guard doom ok err nil true false"),
			vec![
				Let, Const, Fn, Return, If, Else, Match, Guard, Doom, Ok, Err, Nil, True, False,
				// trailing semicolon inserted at EOF after `false`
				Semicolon, Eof
			]
		);
		assert_eq!(
			kinds("ref extern spawn await_all decree chant sorry speak and or as"),
			vec![Ref, Extern, Spawn, AwaitAll, Decree, Chant, Sorry, Speak, And, Or, As, Eof]
		);
	}

	#[test]
	fn integer_literals() {
		let tokens = Lexer::new("0 42 1_000 0xFF 0x1_F 0Xab").tokenize();
		let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
		assert_eq!(
			kinds,
			vec![
				TokenKind::Int,
				TokenKind::Int,
				TokenKind::Int,
				TokenKind::Int,
				TokenKind::Int,
				TokenKind::Int,
				TokenKind::Semicolon,
				TokenKind::Eof
			]
		);
		assert_eq!(tokens[2].literal, "1_000");
		assert_eq!(tokens[3].literal, "0xFF");
	}

	#[test]
	fn float_literals() {
		let tokens = Lexer::new("3.14 0.5 1_0.2_5").tokenize();
		assert_eq!(tokens[0].kind, TokenKind::Float);
		assert_eq!(tokens[1].kind, TokenKind::Float);
		assert_eq!(tokens[2].kind, TokenKind::Float);
		assert_eq!(tokens[2].literal, "1_0.2_5");
	}

	#[test]
	fn dot_without_digit_is_not_a_decimal_point() {
		use TokenKind::*;
		// `1.foo` is an int, a dot, and an identifier.
		assert_eq!(kinds("1.foo"), vec![Int, Dot, Ident, Semicolon, Eof]);
	}

	#[test]
	fn string_literals() {
		let tokens = Lexer::new(r#""hello" "a\nb" "tab\there" "q\"q" "back\\slash" "nul\0" "\x""#).tokenize();
		assert_eq!(tokens[0].literal, "hello");
		assert_eq!(tokens[1].literal, "a\nb");
		assert_eq!(tokens[2].literal, "tab\there");
		assert_eq!(tokens[3].literal, "q\"q");
		assert_eq!(tokens[4].literal, "back\\slash");
		assert_eq!(tokens[5].literal, "nul\0");
		// Unknown escapes keep the backslash.
		assert_eq!(tokens[6].literal, "\\x");
	}

	#[test]
	fn multibyte_string_contents() {
		let tokens = Lexer::new("\"héllo 📻\"").tokenize();
		assert_eq!(tokens[0].kind, TokenKind::Str);
		assert_eq!(tokens[0].literal, "héllo 📻");
	}

	#[test]
	fn unterminated_string_is_illegal() {
		let tokens = Lexer::new("\"oops").tokenize();
		assert_eq!(tokens[0].kind, TokenKind::Illegal);
		assert_eq!(tokens[0].literal, "oops");
	}

	#[test]
	fn line_comments() {
		use TokenKind::*;
		assert_eq!(kinds("1 # the rest is ignored ] } +\n2"), vec![Int, Int, Semicolon, Eof]);
		assert_eq!(kinds("# only a comment"), vec![Eof]);
	}

	#[test]
	fn block_comments() {
		use TokenKind::*;
		assert_eq!(kinds("1 #{ ignored }# 2"), vec![Int, Int, Semicolon, Eof]);
		assert_eq!(kinds("#{ multi\nline }# x"), vec![Ident, Semicolon, Eof]);
		assert_eq!(kinds("#{ nested #{ inner }# outer }# x"), vec![Ident, Semicolon, Eof]);
	}

	#[test]
	fn block_comment_nesting_caps_at_two() {
		use TokenKind::*;
		// The third `#{` is comment text, so the first two `}#` close the
		// comment and `visible` is lexed.
		assert_eq!(kinds("#{ a #{ b #{ c }# d }# visible"), vec![Ident, Semicolon, Eof]);
		// Unterminated block comment swallows the rest of the input.
		assert_eq!(kinds("#{ never closed"), vec![Eof]);
	}

	#[test]
	fn operator_longest_match() {
		use TokenKind::*;
		assert_eq!(kinds("= == === => != ! < <= > >="), vec![
			Assign, Eq, StrictEq, Arrow, NotEq, Bang, Lt, Le, Gt, Ge, Eof
		]);
		assert_eq!(kinds("===="), vec![StrictEq, Assign, Eof]);
	}

	#[test]
	fn semicolon_insertion_before_statement_start() {
		use TokenKind::*;
		assert_eq!(
			kinds("let x = 1\nlet y = 2"),
			vec![Let, Ident, Assign, Int, Semicolon, Let, Ident, Assign, Int, Semicolon, Eof]
		);
	}

	#[test]
	fn semicolon_insertion_at_eof() {
		use TokenKind::*;
		assert_eq!(kinds("speak x"), vec![Speak, Ident, Semicolon, Eof]);
		assert_eq!(kinds("speak x\n"), vec![Speak, Ident, Semicolon, Eof]);
	}

	#[test]
	fn no_insertion_mid_expression() {
		use TokenKind::*;
		// `+` is not a trigger, so the newline is silent.
		assert_eq!(kinds("1 +\n2"), vec![Int, Plus, Int, Semicolon, Eof]);
		// `if` starts a statement but `(` after the newline does not.
		assert_eq!(kinds("let x = y\n(1)"), vec![
			Let, Ident, Assign, Ident, LParen, Int, RParen, Semicolon, Eof
		]);
	}

	#[test]
	fn question_mark_triggers_insertion() {
		use TokenKind::*;
		assert_eq!(kinds("let v = get()?\nreturn v"), vec![
			Let, Ident, Assign, Ident, LParen, RParen, Question, Semicolon, Return, Ident, Semicolon, Eof
		]);
	}

	#[test]
	fn no_consecutive_synthetic_semicolons() {
		let tokens = Lexer::new("let a = 1\n\n\nlet b = 2\n\nspeak a + b\n").tokenize();
		let mut last_was_semi = false;
		for token in &tokens {
			let is_semi = token.kind == TokenKind::Semicolon;
			assert!(!(is_semi && last_was_semi), "consecutive semicolons in {tokens:?}");
			last_was_semi = is_semi;
		}
	}

	#[test]
	fn positions_non_decreasing() {
		let tokens = Lexer::new("let x = 1\nlet y = x + 2\nspeak y\n").tokenize();
		let mut prev = (0usize, 0usize);
		for token in &tokens {
			let cur = (token.line, token.col);
			assert!(cur >= prev, "position went backwards at {token:?}");
			prev = cur;
		}
	}

	#[test]
	fn position_tracking() {
		let tokens = Lexer::new("let x\nspeak").tokenize();
		assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
		assert_eq!(tokens[1].line, 1);
		// `speak` sits on line 2.
		let speak = tokens.iter().find(|t| t.kind == TokenKind::Speak).unwrap();
		assert_eq!(speak.line, 2);
	}

	#[test]
	fn illegal_byte() {
		let tokens = Lexer::new("@").tokenize();
		assert_eq!(tokens[0].kind, TokenKind::Illegal);
		assert_eq!(tokens[0].literal, "@");
	}

	#[test]
	fn empty_source() {
		assert_eq!(kinds(""), vec![TokenKind::Eof]);
		assert_eq!(literals(""), vec![String::new()]);
	}
}
