//! # Introduction
//!
//! cfront is the front end of a compiler for a subset of C: it tokenises a
//! source file, builds an AST with a hand-written recursive descent parser,
//! and runs a single semantic checking pass over the result.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Semantic checker
//!                            ↓
//!                     Canonical printer
//! ```
//!
//! 1. [`parser`] — tokenises the source, builds the AST, and renders it back
//!    as canonical text. Syntax errors are recovered locally; the parser
//!    always reaches the end of the file.
//! 2. [`sema`] — resolves names, computes expression types, and enforces the
//!    static rules of the subset. Checking never aborts on an error.
//! 3. [`diag`] — positions, spans, and the diagnostics sink both passes
//!    report into.
//!
//! ## Supported C subset
//!
//! Types: `int`, `char`, `void`, structs, pointers.
//! Statements: `if/else`, `while`, `break`, `continue`, forward `goto`,
//! labels, `return`, declarations, compound blocks.
//! Expressions: the usual operator set with C precedence, member access,
//! indexing, calls, `sizeof`.

pub mod diag;
pub mod parser;
pub mod sema;
