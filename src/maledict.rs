use std::{fs::read_to_string, io::Write, path::Path};

use anyhow::Context;

use crate::{error::MaledictError, eval::{Evaluator, Value}, lexer::Lexer, parser::Parser};

/// Front door for running Maledict source, from a file or interactively.
pub struct Maledict;

impl Maledict {
	pub fn run_file(&self, path: &Path) -> Result<(), MaledictError> {
		let source = read_to_string(path).context("failed to read source file")?;
		let mut evaluator = Evaluator::new();
		self.run(&source, &mut evaluator).map(|_| ())
	}

	pub fn run_prompt(&self) {
		let stdin = std::io::stdin();
		let mut evaluator = Evaluator::new();
		let mut input = String::new();
		println!("Maledict REPL (type 'exit' or Ctrl+D to quit)");
		loop {
			input.clear();
			print!("maledict> ");
			if let Err(e) = std::io::stdout().flush() {
				eprintln!("failed to flush stdout: {e}");
			}
			match stdin.read_line(&mut input) {
				Ok(0) => {
					println!();
					break;
				}
				Ok(_) => {}
				Err(e) => {
					eprintln!("failed to read line: {e}");
					continue;
				}
			}
			let line = input.trim();
			if line.is_empty() {
				continue;
			}
			if line == "exit" || line == "quit" {
				break;
			}
			match self.run(line, &mut evaluator) {
				// Echo non-nil results for expression feedback.
				Ok(value) if !matches!(value, Value::Nil) => println!("{value}"),
				Ok(_) => {}
				// Parse diagnostics were already printed.
				Err(MaledictError::ParseErrors(_)) => {}
				Err(e) => eprintln!("{e}"),
			}
		}
	}

	fn run(&self, source: &str, evaluator: &mut Evaluator) -> Result<Value, MaledictError> {
		let (program, diagnostics) = Parser::new(Lexer::new(source)).parse();
		if !diagnostics.is_empty() {
			for diagnostic in &diagnostics {
				eprintln!("parse error: {diagnostic}");
			}
			return Err(MaledictError::ParseErrors(diagnostics.len()));
		}
		Ok(evaluator.eval(&program)?)
	}
}
