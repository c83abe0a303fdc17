//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! the two-token lookahead buffer, token consumption helpers, error reporting,
//! and the recovery primitive that skips to the next statement boundary.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and the entry point
//! - `declarations`: external declarations, specifiers, declarators
//! - `statements`: statement parsing
//! - `expressions`: expression parsing with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! # Error recovery
//!
//! Syntax errors never abort the parse. Every failure is reported through the
//! diagnostics sink, an `Err` placeholder node is substituted, and the token
//! stream is resynchronized at the next `;` or end of file so the rest of the
//! input still gets parsed.

use crate::diag::{Diagnostics, Span};
use crate::parser::ast::TranslationUnit;
use crate::parser::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for the C subset.
///
/// Holds exactly two tokens of lookahead (`ahead`, `two_ahead`); consuming a
/// token slides the window and pulls one new token from the lexer. There is
/// no backtracking beyond this window.
pub struct Parser {
    lexer: Lexer,
    pub(crate) ahead: Token,
    pub(crate) two_ahead: Token,
    pub(crate) prev_span: Span,
    pub(crate) diags: Diagnostics,
}

/// Parse a whole source file. Returns the translation unit together with
/// every lexical and syntax diagnostic produced along the way.
pub fn parse(file: &str, source: &str) -> (TranslationUnit, Diagnostics) {
    let mut parser = Parser::new(file, source);
    let unit = parser.parse_translation_unit();
    (unit, parser.into_diags())
}

impl Parser {
    pub fn new(file: &str, source: &str) -> Self {
        let mut diags = Diagnostics::new(file);
        let mut lexer = Lexer::new(source);
        let ahead = lexer.next_token(&mut diags);
        let two_ahead = lexer.next_token(&mut diags);
        let prev_span = ahead.span;
        Self {
            lexer,
            ahead,
            two_ahead,
            prev_span,
            diags,
        }
    }

    /// Hand back the accumulated diagnostics once parsing is done.
    pub fn into_diags(self) -> Diagnostics {
        self.diags
    }

    /// Parse the entire program: a list of external declarations.
    pub fn parse_translation_unit(&mut self) -> TranslationUnit {
        let mut decls = Vec::new();

        if self.ahead.kind == TokenKind::Eof {
            self.err("a non-empty file", "program");
            return TranslationUnit { decls };
        }

        while self.ahead.kind != TokenKind::Eof {
            decls.push(self.parse_external_declaration());
        }

        TranslationUnit { decls }
    }

    /// Consume the current token and slide the lookahead window.
    pub(crate) fn bump(&mut self) -> Token {
        let mut result = self.lexer.next_token(&mut self.diags);
        std::mem::swap(&mut result, &mut self.two_ahead);
        std::mem::swap(&mut result, &mut self.ahead);
        self.prev_span = result.span;
        result
    }

    /// Consume the current token if it matches, without reporting otherwise.
    pub(crate) fn accept(&mut self, kind: &TokenKind) -> bool {
        if self.ahead.kind != *kind {
            return false;
        }
        self.bump();
        true
    }

    /// Consume the current token if it matches; report an error otherwise.
    pub(crate) fn expect(&mut self, kind: &TokenKind, ctxt: &str) -> bool {
        if self.ahead.kind == *kind {
            self.bump();
            return true;
        }
        self.err(&kind.to_string(), ctxt);
        false
    }

    /// Consume an identifier token and return its name, reporting an error
    /// if the current token is anything else.
    pub(crate) fn expect_ident(&mut self, ctxt: &str) -> Option<String> {
        if let TokenKind::Ident(_) = self.ahead.kind {
            if let TokenKind::Ident(name) = self.bump().kind {
                return Some(name);
            }
        }
        self.err("identifier", ctxt);
        None
    }

    /// Report "expected {what}, got {current token} while parsing {ctxt}".
    pub(crate) fn err(&mut self, what: &str, ctxt: &str) {
        let message = format!(
            "expected {}, got {} while parsing {}",
            what, self.ahead, ctxt
        );
        self.diags.report(self.ahead.span, message);
    }

    /// Skip tokens up to the next `;` or end of file; optionally consume
    /// the `;` too. The statement-granularity resynchronization point.
    pub(crate) fn eat_rest_of_statement(&mut self, with_semicolon: bool) {
        while self.ahead.kind != TokenKind::Semicolon && self.ahead.kind != TokenKind::Eof {
            self.bump();
        }
        if with_semicolon && self.ahead.kind == TokenKind::Semicolon {
            self.bump();
        }
    }

    /// True when the current token can begin a declaration specifier.
    pub(crate) fn type_follows(&self) -> bool {
        self.ahead.kind.starts_type()
    }

    /// Same check against the second lookahead slot.
    pub(crate) fn type_follows_two_ahead(&self) -> bool {
        self.two_ahead.kind.starts_type()
    }

    /// Span from `begin` through the last consumed token.
    pub(crate) fn span_from(&self, begin: Span) -> Span {
        begin.to(self.prev_span)
    }
}
