//! Semantic checking
//!
//! A single pass over the parsed translation unit, run after parsing:
//! - [`types`]: the type model with structural equality and the `Error`
//!   poison type
//! - [`scope`]: scope stack, struct-tag table, and label table
//! - [`check`]: declaration and statement rules, plus the label collection
//!   pass that lets `goto` reference labels defined later
//! - [`expr`]: bottom-up expression typing
//!
//! The checker never mutates the AST and never aborts: every violation is
//! reported into the shared diagnostics sink and the walk continues, so one
//! run surfaces every independent error in the file.

pub mod check;
pub mod expr;
pub mod scope;
pub mod types;

pub use check::check;
