//! Declaration parsing implementation
//!
//! This module handles external declarations, specifiers, and declarators:
//!
//! - External declarations: a specifier/declarator pair, either terminated
//!   by `;` (prototype, variable, struct declaration) or followed by a
//!   compound-statement function body
//! - Specifiers: `void` / `char` / `int` and `struct` with optional tag and
//!   optional brace-delimited member list
//! - Declarators: recursively nested pointer, parenthesized, named, and
//!   parameter-list forms; may be abstract (anonymous) inside parameter lists
//!
//! # Grammar
//!
//! ```text
//! external_declaration ::= specifier_declarator (";" | compound_stmt)
//! specifier_declarator ::= specifier declarator?
//! specifier   ::= "void" | "char" | "int"
//!               | "struct" identifier? ("{" (specifier_declarator ";")* "}")?
//! declarator  ::= "*" declarator
//!               | "(" declarator ")"
//!               | identifier
//!               | declarator "(" parameter_list ")"
//! ```
//!
//! The parenthesized-declarator / parameter-list ambiguity after `(` is
//! resolved with the second lookahead token: inside a parameter list, a type
//! keyword after `(` means the parenthesis opens a nested parameter list of
//! an abstract declarator, not a grouping.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl Parser {
    /// Parse one top-level construct: declaration or function definition.
    pub(crate) fn parse_external_declaration(&mut self) -> ExternalDecl {
        let begin = self.ahead.span;

        let Some(decl) = self.parse_specifier_declarator(false) else {
            self.eat_rest_of_statement(true);
            return ExternalDecl {
                kind: ExternalDeclKind::Err,
                span: self.span_from(begin),
            };
        };

        if self.ahead.kind == TokenKind::LBrace {
            let body = self.parse_stmt(false, false);
            return ExternalDecl {
                kind: ExternalDeclKind::FunctionDef { decl, body },
                span: self.span_from(begin),
            };
        }

        if !self.expect(&TokenKind::Semicolon, "external declaration") {
            self.eat_rest_of_statement(true);
        }
        ExternalDecl {
            kind: ExternalDeclKind::Declaration(decl),
            span: self.span_from(begin),
        }
    }

    /// Parse a specifier with an optional declarator. `None` means the
    /// specifier itself failed; the caller recovers.
    pub(crate) fn parse_specifier_declarator(
        &mut self,
        inside_paramlist: bool,
    ) -> Option<SpecifierDeclarator> {
        let begin = self.ahead.span;
        let specifier = self.parse_specifier()?;
        let declarator = self.parse_declarator(inside_paramlist);
        Some(SpecifierDeclarator {
            specifier,
            declarator,
            span: self.span_from(begin),
        })
    }

    /// Parse a type specifier: a primitive keyword or a struct specifier.
    pub(crate) fn parse_specifier(&mut self) -> Option<Specifier> {
        // Eat away useless declarations consisting of only a semicolon.
        while self.ahead.kind == TokenKind::Semicolon {
            self.bump();
        }

        let begin = self.ahead.span;

        let primitive = match self.ahead.kind {
            TokenKind::KwVoid => Some(Primitive::Void),
            TokenKind::KwChar => Some(Primitive::Char),
            TokenKind::KwInt => Some(Primitive::Int),
            _ => None,
        };
        if let Some(primitive) = primitive {
            self.bump();
            return Some(Specifier {
                kind: SpecifierKind::Primitive(primitive),
                span: self.span_from(begin),
            });
        }

        if self.ahead.kind == TokenKind::KwStruct {
            self.bump();
            return self.parse_struct_specifier(begin);
        }

        self.err("type specifier", "declaration");
        None
    }

    /// Parse the remainder of a struct specifier after the `struct` keyword.
    /// At least one of {tag, member list} must be present.
    fn parse_struct_specifier(&mut self, begin: crate::diag::Span) -> Option<Specifier> {
        let mut tag = None;
        if let TokenKind::Ident(_) = self.ahead.kind {
            if let TokenKind::Ident(name) = self.bump().kind {
                tag = Some(name);
            }
        }

        let mut members = None;
        if tag.is_none() && self.ahead.kind != TokenKind::LBrace {
            self.err("struct declaration list", "struct declaration");
            self.eat_rest_of_statement(false);
            return None;
        } else if self.ahead.kind == TokenKind::LBrace {
            self.bump();
            let mut list = Vec::new();
            if self.ahead.kind != TokenKind::RBrace {
                loop {
                    if self.ahead.kind == TokenKind::Eof {
                        break;
                    }
                    if let Some(member) = self.parse_specifier_declarator(false) {
                        list.push(member);
                    } else {
                        // Resynchronize inside the member list.
                        while !matches!(
                            self.ahead.kind,
                            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                        ) {
                            self.bump();
                        }
                        if self.ahead.kind == TokenKind::RBrace {
                            break;
                        }
                    }
                    self.expect(&TokenKind::Semicolon, "struct declaration");
                    if self.ahead.kind == TokenKind::RBrace {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RBrace, "struct declaration");
            members = Some(list);
        }

        Some(Specifier {
            kind: SpecifierKind::Struct { tag, members },
            span: self.span_from(begin),
        })
    }

    /// Parse a declarator. `None` is valid: it is the fully abstract form
    /// (a parameter declared by its type alone).
    pub(crate) fn parse_declarator(&mut self, inside_paramlist: bool) -> Option<Declarator> {
        let begin = self.ahead.span;

        let mut declarator = match &self.ahead.kind {
            TokenKind::Star => {
                self.bump();
                let inner = self.parse_declarator(false);
                Some(Declarator {
                    kind: DeclaratorKind::Pointer(inner.map(Box::new)),
                    span: self.span_from(begin),
                })
            }
            TokenKind::LParen => {
                self.bump();
                // `(` directly followed by a type keyword inside a parameter
                // list opens the parameter list of an abstract declarator,
                // not a grouping.
                if self.type_follows() && inside_paramlist {
                    let params = self.parse_parameter_list();
                    return Some(Declarator {
                        kind: DeclaratorKind::Function {
                            inner: None,
                            params,
                        },
                        span: self.span_from(begin),
                    });
                }
                let inner = self.parse_declarator(false);
                self.expect(&TokenKind::RParen, "declarator");
                inner
            }
            TokenKind::Ident(_) => {
                if let TokenKind::Ident(name) = self.bump().kind {
                    Some(Declarator {
                        kind: DeclaratorKind::Named(name),
                        span: self.span_from(begin),
                    })
                } else {
                    None
                }
            }
            _ => None,
        };

        if self.ahead.kind == TokenKind::LParen {
            self.bump();
            let params = self.parse_parameter_list();
            declarator = Some(Declarator {
                kind: DeclaratorKind::Function {
                    inner: declarator.map(Box::new),
                    params,
                },
                span: self.span_from(begin),
            });
        }

        declarator
    }

    /// Parse a comma-separated parameter list; the opening `(` has already
    /// been consumed. Consumes through the closing `)`.
    fn parse_parameter_list(&mut self) -> Vec<SpecifierDeclarator> {
        let mut params = Vec::new();
        loop {
            if self.type_follows() {
                if let Some(param) = self.parse_specifier_declarator(true) {
                    params.push(param);
                }
            } else {
                self.err("type specifier", "parameter declaration");
                while self.ahead.kind != TokenKind::Comma
                    && self.ahead.kind != TokenKind::Eof
                    && self.ahead.kind != TokenKind::RParen
                {
                    self.bump();
                }
            }
            if !self.accept(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "parameter list");
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::parse;

    fn parse_clean(source: &str) -> TranslationUnit {
        let (unit, diags) = parse("<test>", source);
        assert!(diags.is_clean(), "unexpected diagnostics for {:?}", source);
        unit
    }

    fn first_decl(unit: &TranslationUnit) -> &SpecifierDeclarator {
        match &unit.decls[0].kind {
            ExternalDeclKind::Declaration(sd) => sd,
            ExternalDeclKind::FunctionDef { decl, .. } => decl,
            ExternalDeclKind::Err => panic!("first declaration failed to parse"),
        }
    }

    #[test]
    fn test_variable_declaration() {
        let unit = parse_clean("int x;");
        let sd = first_decl(&unit);
        assert_eq!(sd.name(), Some("x"));
        assert!(matches!(
            sd.specifier.kind,
            SpecifierKind::Primitive(Primitive::Int)
        ));
    }

    #[test]
    fn test_pointer_declarator_nests() {
        let unit = parse_clean("int **p;");
        let sd = first_decl(&unit);
        assert_eq!(sd.name(), Some("p"));
        let outer = sd.declarator.as_ref().unwrap();
        let DeclaratorKind::Pointer(Some(inner)) = &outer.kind else {
            panic!("expected outer pointer declarator");
        };
        assert!(matches!(inner.kind, DeclaratorKind::Pointer(Some(_))));
    }

    #[test]
    fn test_function_prototype() {
        let unit = parse_clean("int f(int a, char b);");
        let sd = first_decl(&unit);
        assert_eq!(sd.name(), Some("f"));
        let params = sd.params().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name(), Some("a"));
        assert_eq!(params[1].name(), Some("b"));
    }

    #[test]
    fn test_function_definition() {
        let unit = parse_clean("int main(void) { return 0; }");
        assert!(matches!(
            unit.decls[0].kind,
            ExternalDeclKind::FunctionDef { .. }
        ));
    }

    #[test]
    fn test_abstract_parameter() {
        let unit = parse_clean("int f(int *);");
        let sd = first_decl(&unit);
        let params = sd.params().unwrap();
        assert_eq!(params[0].name(), None);
        assert!(matches!(
            params[0].declarator.as_ref().unwrap().kind,
            DeclaratorKind::Pointer(None)
        ));
    }

    #[test]
    fn test_struct_definition_with_members() {
        let unit = parse_clean("struct S { int x; char c; };");
        let sd = first_decl(&unit);
        let SpecifierKind::Struct { tag, members } = &sd.specifier.kind else {
            panic!("expected struct specifier");
        };
        assert_eq!(tag.as_deref(), Some("S"));
        assert_eq!(members.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_struct_reference_without_body() {
        let unit = parse_clean("struct S s;");
        let sd = first_decl(&unit);
        let SpecifierKind::Struct { tag, members } = &sd.specifier.kind else {
            panic!("expected struct specifier");
        };
        assert_eq!(tag.as_deref(), Some("S"));
        assert!(members.is_none());
        assert_eq!(sd.name(), Some("s"));
    }

    #[test]
    fn test_bare_struct_keyword_is_an_error() {
        let (unit, diags) = parse("<test>", "struct;");
        assert!(!diags.is_clean());
        assert!(matches!(unit.decls[0].kind, ExternalDeclKind::Err));
    }

    #[test]
    fn test_missing_semicolon_recovers() {
        let (unit, diags) = parse("<test>", "int x\nint y;");
        assert_eq!(diags.error_count(), 1);
        // Recovery resumes at the `;` after y, keeping one declaration.
        assert!(!unit.decls.is_empty());
    }

    #[test]
    fn test_parenthesized_declarator() {
        let unit = parse_clean("int (*f)(void);");
        let sd = first_decl(&unit);
        assert_eq!(sd.name(), Some("f"));
        let outer = sd.declarator.as_ref().unwrap();
        let DeclaratorKind::Function { inner, .. } = &outer.kind else {
            panic!("expected function declarator");
        };
        assert!(matches!(
            inner.as_ref().unwrap().kind,
            DeclaratorKind::Pointer(Some(_))
        ));
    }
}
