//! Declaration and statement checking
//!
//! One walk over the translation unit in lexical order. Declarations are
//! registered into the scope stack as they are met, struct definitions into
//! the file-level tag table, and every statement rule (return type, jump
//! context, scalar conditions) is enforced here. Expression typing lives in
//! [`super::expr`].
//!
//! Before the walk proper, an explicit collection pass gathers every label
//! in the unit into the label table, so `goto` may reference labels defined
//! later in the file.
//!
//! Loop and function context is passed down the walk as an explicit
//! [`StmtCtx`] value; the checker keeps no hidden current-loop or
//! current-function state and is re-entrant across runs.

use crate::diag::Diagnostics;
use crate::parser::ast::*;
use crate::sema::scope::{LabelTable, ScopeStack, StructTable};
use crate::sema::types::Type;

/// Run the semantic checker over a parsed translation unit, reporting every
/// violation into `diags`.
pub fn check(unit: &TranslationUnit, diags: &mut Diagnostics) {
    let mut sema = Sema::new(diags);
    sema.check_unit(unit);
}

/// Statement-walk context, passed explicitly down the traversal.
#[derive(Clone, Copy)]
pub(crate) struct StmtCtx<'t> {
    /// Declared return type of the enclosing function.
    pub func_return: &'t Type,
    /// True inside the body of a `while` loop.
    pub in_loop: bool,
}

/// The semantic checker: scope stack, struct table, label table, and the
/// shared diagnostics sink. Borrows the AST for the duration of one run.
pub struct Sema<'a> {
    pub(crate) scopes: ScopeStack<'a>,
    pub(crate) structs: StructTable<'a>,
    pub(crate) labels: LabelTable<'a>,
    pub(crate) diags: &'a mut Diagnostics,
}

impl<'a> Sema<'a> {
    pub fn new(diags: &'a mut Diagnostics) -> Self {
        Self {
            scopes: ScopeStack::new(),
            structs: StructTable::new(),
            labels: LabelTable::new(),
            diags,
        }
    }

    pub fn check_unit(&mut self, unit: &'a TranslationUnit) {
        // File scope: single and flat for all external declarations.
        self.scopes.push();

        for decl in &unit.decls {
            if let ExternalDeclKind::FunctionDef { body, .. } = &decl.kind {
                self.collect_labels(body);
            }
        }

        for decl in &unit.decls {
            self.check_external_decl(decl);
        }

        self.scopes.pop();
    }

    /// Label collection pass: record every labeled statement in the unit so
    /// forward `goto`s resolve.
    fn collect_labels(&mut self, stmt: &'a Stmt) {
        match &stmt.kind {
            StmtKind::Labeled { label, stmt: inner } => {
                if self.labels.define(label, stmt.span).is_some() {
                    self.diags
                        .report(stmt.span, format!("redefinition of label '{}'", label));
                }
                self.collect_labels(inner);
            }
            StmtKind::Compound(items) => {
                for item in items {
                    self.collect_labels(item);
                }
            }
            StmtKind::While { body, .. } => self.collect_labels(body),
            StmtKind::If { then_branch, .. } => self.collect_labels(then_branch),
            StmtKind::IfElse {
                then_branch,
                else_branch,
                ..
            } => {
                self.collect_labels(then_branch);
                self.collect_labels(else_branch);
            }
            _ => {}
        }
    }

    fn check_external_decl(&mut self, decl: &'a ExternalDecl) {
        match &decl.kind {
            ExternalDeclKind::Declaration(sd) => self.declare(sd),
            ExternalDeclKind::FunctionDef { decl: sd, body } => {
                self.declare(sd);
                self.check_function_def(sd, body);
            }
            ExternalDeclKind::Err => {}
        }
    }

    fn check_function_def(&mut self, sd: &'a SpecifierDeclarator, body: &'a Stmt) {
        let params = sd.params().unwrap_or(&[]);

        // Parameters must be named, except for a sole `void`.
        let sole_void = params.len() == 1
            && params[0].declarator.is_none()
            && matches!(
                params[0].specifier.kind,
                SpecifierKind::Primitive(Primitive::Void)
            );
        if !sole_void {
            for param in params {
                if param.name().is_none() {
                    self.diags
                        .report(param.span, "parameter name omitted".to_string());
                }
            }
        }

        let func_return = match self.type_of(sd) {
            Type::Function(ret) => *ret,
            other => {
                self.diags.report(
                    sd.span,
                    format!("'{}' is not a function type", other),
                );
                Type::Error
            }
        };

        let ctx = StmtCtx {
            func_return: &func_return,
            in_loop: false,
        };

        match &body.kind {
            StmtKind::Compound(items) => {
                // The body scope also holds the parameters.
                self.scopes.push();
                if !sole_void {
                    for param in params {
                        self.declare_in_scope(param);
                    }
                }
                for item in items {
                    self.check_stmt(item, ctx);
                }
                self.scopes.pop();
            }
            _ => self.check_stmt(body, ctx),
        }
    }

    /// Register a declaration: struct definitions into the tag table, the
    /// declared name into the innermost scope, plus the declaration-shape
    /// rules.
    pub(crate) fn declare(&mut self, sd: &'a SpecifierDeclarator) {
        self.process_specifier(&sd.specifier);

        match &sd.specifier.kind {
            SpecifierKind::Primitive(_) if sd.declarator.is_none() => {
                self.diags.report(
                    sd.span,
                    "should declare at least one declarator".to_string(),
                );
            }
            _ => {}
        }

        // A named variable of a bare undefined struct type has no known
        // storage size. Pointers to it are fine.
        if let Some(name) = sd.name() {
            if let Type::Struct { complete: false, .. } = self.type_of(sd) {
                self.diags.report(
                    sd.span,
                    format!("storage size of '{}' unknown", name),
                );
            }
        }

        self.declare_in_scope(sd);
    }

    fn declare_in_scope(&mut self, sd: &'a SpecifierDeclarator) {
        if let Some(name) = sd.name() {
            self.scopes.declare(name, sd);
        }
    }

    /// Walk a specifier for struct definitions, including definitions
    /// nested inside member lists.
    fn process_specifier(&mut self, specifier: &'a Specifier) {
        if let SpecifierKind::Struct { tag, members } = &specifier.kind {
            if let Some(members) = members {
                if let Some(tag) = tag {
                    if !self.structs.define(tag, members) {
                        self.diags.report(
                            specifier.span,
                            format!("Redeclaration of struct {}", tag),
                        );
                    }
                }
                for member in members {
                    self.process_specifier(&member.specifier);
                }
            }
        }
    }

    pub(crate) fn check_stmt(&mut self, stmt: &'a Stmt, ctx: StmtCtx<'_>) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::EmptyReturn => {}
            StmtKind::Return(expr) => {
                let ty = self.check_expr(expr);
                if !ty.is_error() && !ctx.func_return.is_error() && ty != *ctx.func_return {
                    self.diags.report(
                        stmt.span,
                        format!(
                            "mismatching return type: got '{}', expected '{}'",
                            ty, ctx.func_return
                        ),
                    );
                }
            }
            StmtKind::Goto(label) => {
                if !self.labels.is_defined(label) {
                    self.diags.report(
                        stmt.span,
                        format!("label '{}' used but not defined", label),
                    );
                }
            }
            StmtKind::Break => {
                if !ctx.in_loop {
                    self.diags
                        .report(stmt.span, "break statement not within a loop".to_string());
                }
            }
            StmtKind::Continue => {
                if !ctx.in_loop {
                    self.diags.report(
                        stmt.span,
                        "continue statement not within a loop".to_string(),
                    );
                }
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond, "while loop");
                let loop_ctx = StmtCtx {
                    in_loop: true,
                    ..ctx
                };
                self.check_stmt(body, loop_ctx);
            }
            StmtKind::If { cond, then_branch } => {
                self.check_condition(cond, "if statement");
                self.check_stmt(then_branch, ctx);
            }
            StmtKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_condition(cond, "if statement");
                self.check_stmt(then_branch, ctx);
                self.check_stmt(else_branch, ctx);
            }
            StmtKind::Null => {}
            StmtKind::Compound(items) => {
                self.scopes.push();
                for item in items {
                    self.check_stmt(item, ctx);
                }
                self.scopes.pop();
            }
            StmtKind::Labeled { stmt: inner, .. } => self.check_stmt(inner, ctx),
            StmtKind::Declaration(sd) => self.declare(sd),
            StmtKind::Err => {}
        }
    }

    fn check_condition(&mut self, cond: &'a Expr, ctxt: &str) {
        let ty = self.check_expr(cond);
        if !ty.is_error() && !ty.is_scalar() {
            self.diags.report(
                cond.span,
                format!("condition of {} must be scalar, got '{}'", ctxt, ty),
            );
        }
    }

    /// Declared type of a specifier/declarator pair: the specifier's base
    /// type fed through each declarator layer.
    pub(crate) fn type_of(&self, sd: &SpecifierDeclarator) -> Type {
        let base = self.specifier_type(&sd.specifier);
        Self::declarator_type(sd.declarator.as_ref(), base)
    }

    pub(crate) fn specifier_type(&self, specifier: &Specifier) -> Type {
        match &specifier.kind {
            SpecifierKind::Primitive(Primitive::Void) => Type::Void,
            SpecifierKind::Primitive(Primitive::Char) => Type::Char,
            SpecifierKind::Primitive(Primitive::Int) => Type::Int,
            SpecifierKind::Struct { tag, members } => {
                let complete = members.is_some()
                    || tag.as_deref().is_some_and(|t| self.structs.is_defined(t));
                Type::Struct {
                    tag: tag.clone(),
                    complete,
                }
            }
        }
    }

    fn declarator_type(declarator: Option<&Declarator>, base: Type) -> Type {
        let Some(declarator) = declarator else {
            return base;
        };
        match &declarator.kind {
            DeclaratorKind::Named(_) => base,
            DeclaratorKind::Pointer(inner) => {
                Self::declarator_type(inner.as_deref(), Type::pointer_to(base))
            }
            DeclaratorKind::Function { inner, .. } => {
                Type::function_returning(Self::declarator_type(inner.as_deref(), base))
            }
        }
    }
}
