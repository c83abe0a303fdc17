//! AST (Abstract Syntax Tree) definitions
//!
//! Closed sum types for the three node families (declarations, statements,
//! expressions), dispatched by `match` everywhere. Every node carries the
//! [`Span`] of the source text it was parsed from. Nodes own their children
//! exclusively; the tree is immutable once the parser hands it over.
//!
//! Parse failures leave explicit `Err` placeholder variants in the tree so
//! that later passes can walk past the damage without special-casing.

use crate::diag::Span;
use crate::parser::lexer::TokenKind;
use std::fmt;

/// A whole source file: an ordered sequence of external declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub decls: Vec<ExternalDecl>,
}

/// A top-level construct: a declaration, optionally with a function body.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDecl {
    pub kind: ExternalDeclKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDeclKind {
    /// Prototype, variable, or struct declaration terminated by `;`.
    Declaration(SpecifierDeclarator),
    /// Declaration followed by a compound-statement function body.
    FunctionDef {
        decl: SpecifierDeclarator,
        body: Stmt,
    },
    /// Parse-failure placeholder.
    Err,
}

/// A specifier paired with an optional declarator. The unit of declaration:
/// external declarations, locals, struct members, and parameters are all
/// `SpecifierDeclarator`s.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecifierDeclarator {
    pub specifier: Specifier,
    pub declarator: Option<Declarator>,
    pub span: Span,
}

impl SpecifierDeclarator {
    /// The identifier this declaration introduces, if any.
    pub fn name(&self) -> Option<&str> {
        self.declarator.as_ref().and_then(|d| d.name())
    }

    /// Parameter list of the outermost function declarator layer, if any.
    pub fn params(&self) -> Option<&[SpecifierDeclarator]> {
        self.declarator.as_ref().and_then(|d| d.params())
    }
}

/// Base-type grammar element: a primitive keyword or a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Specifier {
    pub kind: SpecifierKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecifierKind {
    Primitive(Primitive),
    /// `struct` with an optional tag and an optional member list. At least
    /// one of the two is present; `members: Some(..)` marks a definition,
    /// `None` a reference to a tag declared elsewhere.
    Struct {
        tag: Option<String>,
        members: Option<Vec<SpecifierDeclarator>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Void,
    Char,
    Int,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Void => write!(f, "void"),
            Primitive::Char => write!(f, "char"),
            Primitive::Int => write!(f, "int"),
        }
    }
}

/// Grammar element that builds a derived type around a specifier's base
/// type. Declarators nest recursively; the declared type is computed by
/// feeding the base type through each layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub kind: DeclaratorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclaratorKind {
    /// Introduces an identifier.
    Named(String),
    /// One level of pointer around the inner declarator. `None` for the
    /// abstract form (`int *` as an unnamed parameter).
    Pointer(Option<Box<Declarator>>),
    /// Parameter list applied to the inner declarator. `None` inner for the
    /// abstract form.
    Function {
        inner: Option<Box<Declarator>>,
        params: Vec<SpecifierDeclarator>,
    },
}

impl Declarator {
    /// The identifier introduced by this declarator, if it is not abstract.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclaratorKind::Named(name) => Some(name),
            DeclaratorKind::Pointer(inner) => inner.as_deref().and_then(|d| d.name()),
            DeclaratorKind::Function { inner, .. } => inner.as_deref().and_then(|d| d.name()),
        }
    }

    /// Parameter list of the outermost function layer, if any.
    pub fn params(&self) -> Option<&[SpecifierDeclarator]> {
        match &self.kind {
            DeclaratorKind::Named(_) => None,
            DeclaratorKind::Pointer(inner) => inner.as_deref().and_then(|d| d.params()),
            DeclaratorKind::Function { params, .. } => Some(params),
        }
    }

    /// True when some layer of this declarator is a parameter list, i.e.
    /// the declaration declares a function.
    pub fn declares_function(&self) -> bool {
        self.params().is_some()
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    EmptyReturn,
    Return(Expr),
    Goto(String),
    Break,
    Continue,
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
    },
    IfElse {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
    },
    /// A lone `;`.
    Null,
    /// A brace-delimited lexical block.
    Compound(Vec<Stmt>),
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
    /// Local variable or struct declaration.
    Declaration(SpecifierDeclarator),
    /// Parse-failure placeholder.
    Err,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Infix {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Prefix {
        op: PrefixOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Member {
        op: MemberOp,
        object: Box<Expr>,
        member: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `sizeof (type)` with a single type keyword.
    SizeofType(Primitive),
    /// `sizeof expr`.
    SizeofExpr(Box<Expr>),
    Ident(String),
    Integer(u64),
    /// Character constant, raw source text including quotes.
    Character(String),
    /// String literal, raw source text including quotes.
    Str(String),
    /// Parse-failure placeholder.
    Err,
}

/// Binary and assignment operators of an `Infix` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogAnd,
    LogOr,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl BinOp {
    /// Map an operator token to its `BinOp`, `None` for non-operators.
    pub fn from_token(kind: &TokenKind) -> Option<BinOp> {
        let op = match kind {
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Shl => BinOp::Shl,
            TokenKind::Shr => BinOp::Shr,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Ge => BinOp::Ge,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::Ne => BinOp::Ne,
            TokenKind::Amp => BinOp::BitAnd,
            TokenKind::Caret => BinOp::BitXor,
            TokenKind::Pipe => BinOp::BitOr,
            TokenKind::AndAnd => BinOp::LogAnd,
            TokenKind::OrOr => BinOp::LogOr,
            TokenKind::Assign => BinOp::Assign,
            TokenKind::PlusAssign => BinOp::AddAssign,
            TokenKind::MinusAssign => BinOp::SubAssign,
            TokenKind::StarAssign => BinOp::MulAssign,
            TokenKind::SlashAssign => BinOp::DivAssign,
            TokenKind::PercentAssign => BinOp::ModAssign,
            TokenKind::AmpAssign => BinOp::AndAssign,
            TokenKind::PipeAssign => BinOp::OrAssign,
            TokenKind::CaretAssign => BinOp::XorAssign,
            TokenKind::ShlAssign => BinOp::ShlAssign,
            TokenKind::ShrAssign => BinOp::ShrAssign,
            _ => return None,
        };
        Some(op)
    }

    /// True for `=` and every compound assignment.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinOp::Assign
                | BinOp::AddAssign
                | BinOp::SubAssign
                | BinOp::MulAssign
                | BinOp::DivAssign
                | BinOp::ModAssign
                | BinOp::AndAssign
                | BinOp::OrAssign
                | BinOp::XorAssign
                | BinOp::ShlAssign
                | BinOp::ShrAssign
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
            BinOp::BitOr => "|",
            BinOp::LogAnd => "&&",
            BinOp::LogOr => "||",
            BinOp::Assign => "=",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
            BinOp::ModAssign => "%=",
            BinOp::AndAssign => "&=",
            BinOp::OrAssign => "|=",
            BinOp::XorAssign => "^=",
            BinOp::ShlAssign => "<<=",
            BinOp::ShrAssign => ">>=",
        };
        write!(f, "{}", s)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Deref,
    AddrOf,
    Plus,
    Minus,
    Not,
    BitNot,
    Inc,
    Dec,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrefixOp::Deref => "*",
            PrefixOp::AddrOf => "&",
            PrefixOp::Plus => "+",
            PrefixOp::Minus => "-",
            PrefixOp::Not => "!",
            PrefixOp::BitNot => "~",
            PrefixOp::Inc => "++",
            PrefixOp::Dec => "--",
        };
        write!(f, "{}", s)
    }
}

/// Postfix `++` / `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixOp::Inc => write!(f, "++"),
            PostfixOp::Dec => write!(f, "--"),
        }
    }
}

/// Member access operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOp {
    Dot,
    Arrow,
}

impl fmt::Display for MemberOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberOp::Dot => write!(f, "."),
            MemberOp::Arrow => write!(f, "->"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{Pos, Span};

    fn span() -> Span {
        Span::at(Pos::new(1, 1))
    }

    #[test]
    fn test_declarator_name_through_layers() {
        // (*f)(void) style nesting: Function around Pointer around Named.
        let named = Declarator {
            kind: DeclaratorKind::Named("f".to_string()),
            span: span(),
        };
        let pointer = Declarator {
            kind: DeclaratorKind::Pointer(Some(Box::new(named))),
            span: span(),
        };
        let function = Declarator {
            kind: DeclaratorKind::Function {
                inner: Some(Box::new(pointer)),
                params: Vec::new(),
            },
            span: span(),
        };
        assert_eq!(function.name(), Some("f"));
        assert!(function.declares_function());
    }

    #[test]
    fn test_abstract_declarator_has_no_name() {
        let abstract_ptr = Declarator {
            kind: DeclaratorKind::Pointer(None),
            span: span(),
        };
        assert_eq!(abstract_ptr.name(), None);
        assert!(!abstract_ptr.declares_function());
    }

    #[test]
    fn test_binop_from_token() {
        assert_eq!(BinOp::from_token(&TokenKind::Plus), Some(BinOp::Add));
        assert_eq!(BinOp::from_token(&TokenKind::ShrAssign), Some(BinOp::ShrAssign));
        assert_eq!(BinOp::from_token(&TokenKind::Semicolon), None);
        assert!(BinOp::ShrAssign.is_assignment());
        assert!(!BinOp::Shr.is_assignment());
    }
}
