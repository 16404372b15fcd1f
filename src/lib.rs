//! Tree-walking interpreter for Maledict, a deliberately hostile,
//! expression-oriented scripting language.
//!
//! The pipeline is strictly left to right: source bytes go through the
//! [`lexer`] (which also performs automatic semicolon insertion and strips
//! nested block comments), the [`parser`] (a Pratt parser that
//! disambiguates map literals from blocks with two-token lookahead) and
//! finally the [`eval`] walker, which models dynamically typed values,
//! result-style error propagation via `?`, non-local guard exits and a
//! small set of runtime "decrees" that mutate the language's semantics —
//! most notoriously the default weekday-dependent array indexing base.
//!
//! There is no intermediate representation and no optimization pass: the
//! evaluator walks the AST the parser produced. Fatal runtime errors are
//! "dooms"; everything else rides the result values of the language
//! itself.

pub mod cli;
pub mod error;
pub mod eval;
pub mod lexer;
mod maledict;
pub mod parser;
pub mod utils;

pub use error::{Diagnostic, DoomError, MaledictError};
pub use maledict::Maledict;
