//! C source code parser
//!
//! This module transforms C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split across `declarations`,
//!   `statements`, and `expressions`
//! - [`ast`]: AST node definitions
//! - [`printer`]: canonical source rendering of the AST
//!
//! # Supported C Subset
//!
//! The parser supports a restricted subset of C:
//! - Types: `int`, `char`, `void`, structs, pointers
//! - Statements: declarations, control flow (`if`, `while`), jumps
//!   (`return`, `break`, `continue`, `goto`), labels, compound blocks
//! - Expressions: arithmetic, logical, bitwise, shifts, assignment and
//!   compound assignment, ternary, member access, indexing, calls, `sizeof`
//! - No preprocessor (directives are skipped by the lexer)
//! - No typedefs, unions, enums, arrays in declarators, or initializers
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with two tokens of lookahead and
//! precedence climbing for binary operators. No external parser generator
//! dependencies. Syntax errors are recovered locally: the parser reports
//! through the diagnostics sink, substitutes a placeholder node, and keeps
//! going to the end of the file.

pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod printer;
pub mod statements;

pub use parse::{parse, Parser};
