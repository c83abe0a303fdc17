//! Expression parsing implementation
//!
//! This module handles parsing of C expressions using precedence climbing
//! for binary and ternary operators and recursive descent for everything
//! else.
//!
//! # Supported Expressions
//!
//! - Literals: integers, characters, strings
//! - Identifiers
//! - Binary operators: arithmetic, comparison, logical, bitwise, shifts,
//!   assignment and compound assignment
//! - Unary prefix operators: `* & ! ~ + - ++ --`
//! - Postfix: `[]`, `.`, `->`, `()` call, `++`, `--`
//! - Ternary: `? :`
//! - `sizeof expr` and `sizeof (type)`
//!
//! # Precedence
//!
//! `parse_exp` first parses a primary/prefix expression, then loops. Postfix
//! forms bind tighter than any binary operator and are folded immediately.
//! Afterwards the lookahead's left binding power is compared against the
//! caller's minimum: below it the loop unwinds, otherwise the operator is
//! consumed and its right-hand side parsed at the operator's right binding
//! power. Left-associative operators carry a right binding power one level
//! above their left one; the right-associative forms (`?:`, assignments)
//! recurse at or below their own level.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::diag::Span;
use crate::parser::ast::*;
use crate::parser::lexer::{Prec, TokenKind};
use crate::parser::parse::Parser;

impl Parser {
    /// Parse a full expression (minimum precedence `Bottom`).
    pub(crate) fn parse_exp_bottom(&mut self, ctxt: &str) -> Expr {
        self.parse_exp(ctxt, Prec::Bottom)
    }

    /// The precedence climb.
    pub(crate) fn parse_exp(&mut self, ctxt: &str, min_prec: Prec) -> Expr {
        let begin = self.ahead.span;
        let mut lhs = self.parse_primary_expr(ctxt);

        loop {
            // Postfix expressions bind strongest; fold them first.
            match self.ahead.kind {
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_exp_bottom("array subscription");
                    self.expect(&TokenKind::RBracket, "array subscription");
                    lhs = Expr {
                        kind: ExprKind::Index {
                            object: Box::new(lhs),
                            index: Box::new(index),
                        },
                        span: self.span_from(begin),
                    };
                    continue;
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    lhs = self.parse_member_access(begin, lhs);
                    continue;
                }
                TokenKind::LParen => {
                    let args = self.parse_expr_list();
                    lhs = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(lhs),
                            args,
                        },
                        span: self.span_from(begin),
                    };
                    continue;
                }
                TokenKind::Inc | TokenKind::Dec => {
                    let op = if self.bump().kind == TokenKind::Inc {
                        PostfixOp::Inc
                    } else {
                        PostfixOp::Dec
                    };
                    lhs = Expr {
                        kind: ExprKind::Postfix {
                            op,
                            operand: Box::new(lhs),
                        },
                        span: self.span_from(begin),
                    };
                    continue;
                }
                _ => {}
            }

            // A lookahead below the caller's minimum unwinds the climb. A
            // non-operator reports Prec::Error, below everything.
            if self.ahead.kind.prec_l() < min_prec {
                break;
            }

            if self.ahead.kind == TokenKind::Question {
                self.bump();
                lhs = self.parse_ternary_tail(begin, lhs);
                continue;
            }

            let op_token = self.bump();
            let rhs = self.parse_exp(
                "right-hand side of a binary expression",
                op_token.kind.prec_r(),
            );
            let Some(op) = BinOp::from_token(&op_token.kind) else {
                // prec_l above Error guarantees an operator token.
                unreachable!("non-operator token in climb loop");
            };
            lhs = Expr {
                kind: ExprKind::Infix {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span: self.span_from(begin),
            };
        }

        lhs
    }

    /// Parse `consequence : alternative` after the `?` was consumed. The
    /// consequence restarts at `Bottom`, the alternative continues at
    /// `Conditional` so that `?:` nests to the right.
    fn parse_ternary_tail(&mut self, begin: Span, cond: Expr) -> Expr {
        if self.ahead.kind == TokenKind::Semicolon || self.ahead.kind == TokenKind::Eof {
            self.err("expression", "consequence of a ternary expression");
            return self.err_exp(begin, false);
        }
        let then_branch = self.parse_exp("consequence of a ternary expression", Prec::Bottom);
        if !self.expect(&TokenKind::Colon, "ternary expression") {
            return self.err_exp(begin, false);
        }
        if self.ahead.kind == TokenKind::Semicolon || self.ahead.kind == TokenKind::Eof {
            self.err("expression", "alternative of a ternary expression");
            return self.err_exp(begin, false);
        }
        let else_branch = self.parse_exp("alternative of a ternary expression", Prec::Conditional);
        Expr {
            kind: ExprKind::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span: self.span_from(begin),
        }
    }

    /// Parse `.member` / `->member` after a postfix object.
    fn parse_member_access(&mut self, begin: Span, object: Expr) -> Expr {
        let op = if self.bump().kind == TokenKind::Dot {
            MemberOp::Dot
        } else {
            MemberOp::Arrow
        };
        let Some(member) = self.expect_ident("member access") else {
            return self.err_exp(begin, false);
        };
        Expr {
            kind: ExprKind::Member {
                op,
                object: Box::new(object),
                member,
            },
            span: self.span_from(begin),
        }
    }

    /// Parse a parenthesized, comma-separated argument list, consuming both
    /// parentheses.
    fn parse_expr_list(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        self.bump(); // opening parenthesis
        if self.ahead.kind != TokenKind::RParen {
            loop {
                args.push(self.parse_exp("expression list", Prec::Bottom));
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "expression list");
        args
    }

    /// Parse a primary or prefix expression: the left-recursion-free start
    /// of every expression.
    fn parse_primary_expr(&mut self, ctxt: &str) -> Expr {
        let begin = self.ahead.span;

        let prefix = match self.ahead.kind {
            TokenKind::Amp => Some(PrefixOp::AddrOf),
            TokenKind::Star => Some(PrefixOp::Deref),
            TokenKind::Not => Some(PrefixOp::Not),
            TokenKind::BitNot => Some(PrefixOp::BitNot),
            TokenKind::Plus => Some(PrefixOp::Plus),
            TokenKind::Minus => Some(PrefixOp::Minus),
            TokenKind::Inc => Some(PrefixOp::Inc),
            TokenKind::Dec => Some(PrefixOp::Dec),
            _ => None,
        };
        if let Some(op) = prefix {
            self.bump();
            // All prefix operators bind at level Unary.
            let operand = self.parse_exp("right-hand side of a unary expression", Prec::Unary);
            return Expr {
                kind: ExprKind::Prefix {
                    op,
                    operand: Box::new(operand),
                },
                span: self.span_from(begin),
            };
        }

        match &self.ahead.kind {
            // `sizeof (type)` vs `sizeof expr`, told apart by the second
            // lookahead slot.
            TokenKind::KwSizeof => {
                self.bump();
                let type_operand = matches!(
                    self.two_ahead.kind,
                    TokenKind::KwVoid | TokenKind::KwChar | TokenKind::KwInt
                );
                if type_operand {
                    if !self.expect(&TokenKind::LParen, "sizeof (type)") {
                        return self.err_exp(begin, false);
                    }
                    let primitive = match self.bump().kind {
                        TokenKind::KwVoid => Primitive::Void,
                        TokenKind::KwChar => Primitive::Char,
                        TokenKind::KwInt => Primitive::Int,
                        _ => unreachable!("guarded by the lookahead check"),
                    };
                    if !self.expect(&TokenKind::RParen, "sizeof (type)") {
                        return self.err_exp(begin, false);
                    }
                    Expr {
                        kind: ExprKind::SizeofType(primitive),
                        span: self.span_from(begin),
                    }
                } else {
                    let operand = self.parse_exp("sizeof unary-expression", Prec::Unary);
                    Expr {
                        kind: ExprKind::SizeofExpr(Box::new(operand)),
                        span: self.span_from(begin),
                    }
                }
            }

            TokenKind::Integer(_) => {
                let TokenKind::Integer(value) = self.bump().kind else {
                    unreachable!("guarded by the match arm");
                };
                Expr {
                    kind: ExprKind::Integer(value),
                    span: self.span_from(begin),
                }
            }
            TokenKind::Character(_) => {
                let TokenKind::Character(raw) = self.bump().kind else {
                    unreachable!("guarded by the match arm");
                };
                Expr {
                    kind: ExprKind::Character(raw),
                    span: self.span_from(begin),
                }
            }
            TokenKind::StrLiteral(_) => {
                let TokenKind::StrLiteral(raw) = self.bump().kind else {
                    unreachable!("guarded by the match arm");
                };
                Expr {
                    kind: ExprKind::Str(raw),
                    span: self.span_from(begin),
                }
            }
            TokenKind::Ident(_) => {
                let TokenKind::Ident(name) = self.bump().kind else {
                    unreachable!("guarded by the match arm");
                };
                Expr {
                    kind: ExprKind::Ident(name),
                    span: self.span_from(begin),
                }
            }

            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_exp_bottom("parenthesized expression");
                if !self.expect(&TokenKind::RParen, "parenthesized expression") {
                    return self.err_exp(begin, false);
                }
                inner
            }

            _ => {
                self.err("expression", ctxt);
                self.err_exp(begin, false)
            }
        }
    }

    /// Build an `ErrExp` placeholder and resynchronize.
    fn err_exp(&mut self, begin: Span, with_semicolon: bool) -> Expr {
        self.eat_rest_of_statement(with_semicolon);
        Expr {
            kind: ExprKind::Err,
            span: self.span_from(begin),
        }
    }
}
