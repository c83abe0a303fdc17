//! Source positions and the diagnostics sink
//!
//! Every token and AST node carries a [`Span`] so that errors can name an
//! accurate line and column. All syntax and semantic errors flow through
//! [`Diagnostics::report`]: reporting never halts the pipeline, it only
//! records the error and bumps the counter. A non-zero counter after the
//! full run is the sole failure signal handed to the process boundary.

use std::fmt;
use thiserror::Error;

/// A single point in the source text (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source region from `begin` to `end`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub begin: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(begin: Pos, end: Pos) -> Self {
        Self { begin, end }
    }

    pub fn at(pos: Pos) -> Self {
        Self { begin: pos, end: pos }
    }

    /// Extend this span so it covers `other` as well.
    pub fn to(self, other: Span) -> Span {
        Span {
            begin: self.begin,
            end: other.end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.begin)
    }
}

/// One reported error, tied to the file and position it was detected at.
#[derive(Debug, Clone, Error)]
#[error("{file}:{span}: error: {message}")]
pub struct Diagnostic {
    pub file: String,
    pub span: Span,
    pub message: String,
}

/// Collector for all errors produced by the lexer, parser, and checker.
///
/// Shared by every pipeline stage; created once per run so that independent
/// runs never contaminate each other.
#[derive(Debug)]
pub struct Diagnostics {
    file: String,
    errors: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            errors: Vec::new(),
        }
    }

    /// Record an error. Never halts; callers substitute a placeholder node
    /// or poison type and continue.
    pub fn report(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(Diagnostic {
            file: self.file.clone(),
            span,
            message: message.into(),
        });
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accumulates() {
        let mut diags = Diagnostics::new("t.c");
        assert!(diags.is_clean());
        diags.report(Span::at(Pos::new(1, 1)), "first");
        diags.report(Span::at(Pos::new(2, 5)), "second");
        assert_eq!(diags.error_count(), 2);
    }

    #[test]
    fn test_diagnostic_display() {
        let mut diags = Diagnostics::new("t.c");
        diags.report(Span::at(Pos::new(3, 7)), "expected ';'");
        let rendered = diags.iter().next().map(|d| d.to_string());
        assert_eq!(rendered.as_deref(), Some("t.c:3:7: error: expected ';'"));
    }
}
