//! Statement parsing implementation
//!
//! This module handles parsing of all statement forms:
//!
//! - Local declarations: `int x;`, `struct S s;`
//! - Control flow: `if`, `if`/`else`, `while`
//! - Jump statements: `return`, `break`, `continue`, `goto`
//! - Compound statements: `{ ... }`
//! - Labeled statements: `name: stmt`
//! - Expression and null statements
//!
//! # Grammar
//!
//! ```text
//! statement ::= declaration | labeled_stmt | compound_stmt | null_stmt
//!             | if_stmt | while_stmt | jump_stmt | expr_stmt
//! ```
//!
//! Dispatch is on the lookahead token kind. A labeled statement is told
//! apart from an expression statement starting with an identifier by the
//! second lookahead slot (`identifier ':'`). Two contextual flags restrict
//! what may appear in certain positions: `labeled` forbids a declaration
//! directly under a label, `nonblock` forbids one as the unbraced body of
//! `if` or `while`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl Parser {
    /// Parse one statement. `labeled` and `nonblock` carry the positional
    /// restrictions described in the module docs.
    pub(crate) fn parse_stmt(&mut self, labeled: bool, nonblock: bool) -> Stmt {
        let begin = self.ahead.span;

        match &self.ahead.kind {
            // Local declaration (First: type keyword)
            TokenKind::KwVoid | TokenKind::KwChar | TokenKind::KwInt | TokenKind::KwStruct => {
                if labeled {
                    self.err("statement", "labeled statement");
                    return self.err_stmt(begin, true);
                }
                if nonblock {
                    self.err("statement", "if or while statement");
                    return self.err_stmt(begin, true);
                }
                let Some(decl) = self.parse_specifier_declarator(false) else {
                    return self.err_stmt(begin, true);
                };
                self.expect(&TokenKind::Semicolon, "declaration");
                Stmt {
                    kind: StmtKind::Declaration(decl),
                    span: self.span_from(begin),
                }
            }

            // Labeled statement (First: identifier ':')
            TokenKind::Ident(_) if self.two_ahead.kind == TokenKind::Colon => {
                let label = match self.bump().kind {
                    TokenKind::Ident(name) => name,
                    _ => unreachable!("guarded by the match arm"),
                };
                self.bump(); // the colon
                if self.ahead.kind == TokenKind::RBrace {
                    self.err("expression", "labeled statement");
                    return self.err_stmt(begin, true);
                }
                let stmt = self.parse_stmt(true, false);
                Stmt {
                    kind: StmtKind::Labeled {
                        label,
                        stmt: Box::new(stmt),
                    },
                    span: self.span_from(begin),
                }
            }

            // Compound statement (First: '{')
            TokenKind::LBrace => {
                self.bump();
                let mut items = Vec::new();
                while self.ahead.kind != TokenKind::RBrace && self.ahead.kind != TokenKind::Eof {
                    items.push(self.parse_stmt(false, false));
                }
                self.expect(&TokenKind::RBrace, "compound statement");
                Stmt {
                    kind: StmtKind::Compound(items),
                    span: self.span_from(begin),
                }
            }

            // Null statement (First: ';')
            TokenKind::Semicolon => {
                self.bump();
                Stmt {
                    kind: StmtKind::Null,
                    span: self.span_from(begin),
                }
            }

            // Selection statement (First: 'if')
            TokenKind::KwIf => {
                self.bump();
                self.expect(&TokenKind::LParen, "if statement");
                let cond = self.parse_exp_bottom("if condition");
                self.expect(&TokenKind::RParen, "if statement");
                let then_branch = self.parse_stmt(false, true);
                if self.accept(&TokenKind::KwElse) {
                    let else_branch = self.parse_stmt(false, false);
                    return Stmt {
                        kind: StmtKind::IfElse {
                            cond,
                            then_branch: Box::new(then_branch),
                            else_branch: Box::new(else_branch),
                        },
                        span: self.span_from(begin),
                    };
                }
                Stmt {
                    kind: StmtKind::If {
                        cond,
                        then_branch: Box::new(then_branch),
                    },
                    span: self.span_from(begin),
                }
            }

            // Iteration statement (First: 'while')
            TokenKind::KwWhile => {
                self.bump();
                if !self.expect(&TokenKind::LParen, "while loop") {
                    return self.err_stmt(begin, true);
                }
                let cond = self.parse_exp_bottom("while loop");
                if !self.expect(&TokenKind::RParen, "while loop") {
                    return self.err_stmt(begin, true);
                }
                let body = self.parse_stmt(false, true);
                Stmt {
                    kind: StmtKind::While {
                        cond,
                        body: Box::new(body),
                    },
                    span: self.span_from(begin),
                }
            }

            // Jump statements (First: 'continue', 'break', 'goto', 'return')
            TokenKind::KwContinue => {
                self.bump();
                if !self.expect(&TokenKind::Semicolon, "continue") {
                    return self.err_stmt(begin, true);
                }
                Stmt {
                    kind: StmtKind::Continue,
                    span: self.span_from(begin),
                }
            }
            TokenKind::KwBreak => {
                self.bump();
                if !self.expect(&TokenKind::Semicolon, "break") {
                    return self.err_stmt(begin, true);
                }
                Stmt {
                    kind: StmtKind::Break,
                    span: self.span_from(begin),
                }
            }
            TokenKind::KwGoto => {
                self.bump();
                let Some(label) = self.expect_ident("goto statement") else {
                    return self.err_stmt(begin, true);
                };
                if !self.expect(&TokenKind::Semicolon, "goto statement") {
                    return self.err_stmt(begin, true);
                }
                Stmt {
                    kind: StmtKind::Goto(label),
                    span: self.span_from(begin),
                }
            }
            TokenKind::KwReturn => {
                self.bump();
                if self.ahead.kind == TokenKind::Semicolon {
                    self.bump();
                    return Stmt {
                        kind: StmtKind::EmptyReturn,
                        span: self.span_from(begin),
                    };
                }
                let value = self.parse_exp_bottom("return statement");
                if !self.expect(&TokenKind::Semicolon, "return statement") {
                    return self.err_stmt(begin, true);
                }
                Stmt {
                    kind: StmtKind::Return(value),
                    span: self.span_from(begin),
                }
            }

            // Expression statement: the fallback.
            _ => {
                let expr = self.parse_exp_bottom("expression statement");
                if !self.expect(&TokenKind::Semicolon, "expression statement") {
                    return self.err_stmt(begin, true);
                }
                Stmt {
                    kind: StmtKind::Expr(expr),
                    span: self.span_from(begin),
                }
            }
        }
    }

    /// Build an `ErrStmt` placeholder and resynchronize.
    pub(crate) fn err_stmt(&mut self, begin: crate::diag::Span, with_semicolon: bool) -> Stmt {
        self.eat_rest_of_statement(with_semicolon);
        Stmt {
            kind: StmtKind::Err,
            span: self.span_from(begin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::parse;

    fn parse_body(source: &str) -> (Vec<Stmt>, crate::diag::Diagnostics) {
        let wrapped = format!("int main(void) {{ {} }}", source);
        let (unit, diags) = parse("<test>", &wrapped);
        let ExternalDeclKind::FunctionDef { body, .. } = &unit.decls[0].kind else {
            panic!("expected a function definition");
        };
        let StmtKind::Compound(items) = &body.kind else {
            panic!("expected a compound body");
        };
        (items.clone(), diags)
    }

    #[test]
    fn test_statement_kinds_dispatch() {
        let (items, diags) = parse_body("int x; x = 1; ; while (x) break; return x;");
        assert!(diags.is_clean());
        assert!(matches!(items[0].kind, StmtKind::Declaration(_)));
        assert!(matches!(items[1].kind, StmtKind::Expr(_)));
        assert!(matches!(items[2].kind, StmtKind::Null));
        assert!(matches!(items[3].kind, StmtKind::While { .. }));
        assert!(matches!(items[4].kind, StmtKind::Return(_)));
    }

    #[test]
    fn test_if_else_attaches_to_nearest_if() {
        let (items, diags) = parse_body("if (1) if (2) ; else ;");
        assert!(diags.is_clean());
        let StmtKind::If { then_branch, .. } = &items[0].kind else {
            panic!("expected outer plain if");
        };
        assert!(matches!(then_branch.kind, StmtKind::IfElse { .. }));
    }

    #[test]
    fn test_labeled_statement_needs_two_lookahead() {
        let (items, diags) = parse_body("done: return 0;");
        assert!(diags.is_clean());
        let StmtKind::Labeled { label, stmt } = &items[0].kind else {
            panic!("expected labeled statement");
        };
        assert_eq!(label, "done");
        assert!(matches!(stmt.kind, StmtKind::Return(_)));
    }

    #[test]
    fn test_label_on_declaration_is_an_error() {
        let (items, diags) = parse_body("l: int x;");
        assert!(!diags.is_clean());
        assert!(items
            .iter()
            .any(|s| matches!(s.kind, StmtKind::Labeled { .. }) || matches!(s.kind, StmtKind::Err)));
    }

    #[test]
    fn test_declaration_as_unbraced_loop_body_is_an_error() {
        let (_, diags) = parse_body("while (1) int x;");
        assert!(!diags.is_clean());
    }

    #[test]
    fn test_goto_and_empty_return() {
        let (items, diags) = parse_body("goto out; return; out: ;");
        assert!(diags.is_clean());
        assert!(matches!(items[0].kind, StmtKind::Goto(ref l) if l == "out"));
        assert!(matches!(items[1].kind, StmtKind::EmptyReturn));
    }

    #[test]
    fn test_bad_statement_recovers_at_semicolon() {
        let (items, diags) = parse_body("+ = 3; return 0;");
        assert!(!diags.is_clean());
        assert!(matches!(items.last().unwrap().kind, StmtKind::Return(_)));
    }
}
