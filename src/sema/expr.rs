//! Expression typing
//!
//! Bottom-up type computation over expression trees. Each rule either
//! resolves a type or reports and yields [`Type::Error`]; an `Error` operand
//! short-circuits every rule without a further report, so one broken
//! subexpression produces exactly one diagnostic.
//!
//! Member access resolves only through a bare identifier object: the
//! declared type of the identifier names the struct tag, and the member is
//! looked up in that tag's definition. A chained access like `a.b.c` cannot
//! resolve `.c` and reports instead.

use crate::diag::Diagnostics;
use crate::parser::ast::*;
use crate::sema::check::Sema;
use crate::sema::types::Type;

/// True for the expression forms that name a storage location.
fn is_modifiable(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Ident(_)
            | ExprKind::Prefix {
                op: PrefixOp::Deref,
                ..
            }
            | ExprKind::Index { .. }
            | ExprKind::Member { .. }
    )
}

impl<'a> Sema<'a> {
    pub(crate) fn check_expr(&mut self, expr: &'a Expr) -> Type {
        match &expr.kind {
            ExprKind::Infix { op, lhs, rhs } => self.check_infix(expr, *op, lhs, rhs),
            ExprKind::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_expr(cond);
                let then_ty = self.check_expr(then_branch);
                let else_ty = self.check_expr(else_branch);
                if then_ty.is_error() || else_ty.is_error() {
                    return Type::Error;
                }
                if then_ty != else_ty {
                    self.diags.report(
                        expr.span,
                        format!(
                            "mismatching branch types in conditional expression: '{}' and '{}'",
                            then_ty, else_ty
                        ),
                    );
                    return Type::Error;
                }
                then_ty
            }
            ExprKind::Prefix { op, operand } => self.check_prefix(expr, *op, operand),
            ExprKind::Postfix { operand, .. } => {
                let ty = self.check_expr(operand);
                if ty.is_error() {
                    return Type::Error;
                }
                if !is_modifiable(operand) || !ty.is_scalar() {
                    self.diags.report(
                        expr.span,
                        "operand of increment or decrement must be a modifiable scalar"
                            .to_string(),
                    );
                    return Type::Error;
                }
                ty
            }
            ExprKind::Member { op, object, member } => {
                self.check_member(expr, *op, object, member)
            }
            ExprKind::Index { object, index } => {
                let object_ty = self.check_expr(object);
                let index_ty = self.check_expr(index);
                if object_ty.is_error() || index_ty.is_error() {
                    return Type::Error;
                }
                if !index_ty.is_arithmetic() {
                    self.diags.report(
                        index.span,
                        format!("array subscript is not arithmetic: '{}'", index_ty),
                    );
                    return Type::Error;
                }
                match &object_ty {
                    Type::Pointer(pointee) => (**pointee).clone(),
                    Type::Array { elem, .. } => (**elem).clone(),
                    _ => {
                        self.diags.report(
                            object.span,
                            format!("subscripted value is not a pointer: '{}'", object_ty),
                        );
                        Type::Error
                    }
                }
            }
            ExprKind::Call { callee, args } => {
                let callee_ty = self.check_expr(callee);
                for arg in args {
                    self.check_expr(arg);
                }
                if callee_ty.is_error() {
                    return Type::Error;
                }
                match callee_ty.return_type() {
                    Some(ret) => ret.clone(),
                    None => {
                        self.diags.report(
                            callee.span,
                            format!("called object is not a function: '{}'", callee_ty),
                        );
                        Type::Error
                    }
                }
            }
            ExprKind::SizeofType(_) => Type::Int,
            ExprKind::SizeofExpr(operand) => {
                self.check_expr(operand);
                Type::Int
            }
            ExprKind::Ident(name) => match self.scopes.lookup(name) {
                Some(sd) => self.type_of(sd),
                None => {
                    self.diags
                        .report(expr.span, format!("'{}' undeclared", name));
                    Type::Error
                }
            },
            ExprKind::Integer(_) => Type::Int,
            ExprKind::Character(_) => Type::Char,
            ExprKind::Str(_) => Type::pointer_to(Type::Char),
            ExprKind::Err => Type::Error,
        }
    }

    fn check_infix(&mut self, expr: &'a Expr, op: BinOp, lhs: &'a Expr, rhs: &'a Expr) -> Type {
        let left = self.check_expr(lhs);
        let right = self.check_expr(rhs);
        if left.is_error() || right.is_error() {
            return Type::Error;
        }

        let diags = &mut *self.diags;
        let invalid = |d: &mut Diagnostics| {
            d.report(
                expr.span,
                format!(
                    "invalid operands to binary {}: '{}' and '{}'",
                    op, left, right
                ),
            );
            Type::Error
        };

        match op {
            BinOp::Lt
            | BinOp::Gt
            | BinOp::Le
            | BinOp::Ge
            | BinOp::Eq
            | BinOp::Ne => {
                if (left.is_arithmetic() && right.is_arithmetic()) || left == right {
                    Type::Int
                } else {
                    invalid(diags)
                }
            }
            BinOp::LogAnd | BinOp::LogOr => {
                if left.is_scalar() && right.is_scalar() {
                    Type::Int
                } else {
                    invalid(diags)
                }
            }
            BinOp::Assign => {
                if !is_modifiable(lhs) {
                    diags.report(
                        lhs.span,
                        "left-hand side of assignment is not assignable".to_string(),
                    );
                    return Type::Error;
                }
                if left != right {
                    diags.report(
                        expr.span,
                        format!(
                            "mismatching types in assignment: '{}' and '{}'",
                            left, right
                        ),
                    );
                    return Type::Error;
                }
                left
            }
            _ if op.is_assignment() => {
                if !is_modifiable(lhs) {
                    diags.report(
                        lhs.span,
                        "left-hand side of assignment is not assignable".to_string(),
                    );
                    return Type::Error;
                }
                if left.is_arithmetic() && right.is_arithmetic() {
                    left
                } else {
                    invalid(diags)
                }
            }
            BinOp::Add => {
                if left.is_arithmetic() && right.is_arithmetic() {
                    Type::Int
                } else if Self::is_pointer_to_complete(&left) && right.is_arithmetic() {
                    left
                } else if left.is_arithmetic() && Self::is_pointer_to_complete(&right) {
                    right
                } else {
                    invalid(diags)
                }
            }
            BinOp::Sub => {
                if left.is_arithmetic() && right.is_arithmetic() {
                    Type::Int
                } else if Self::is_pointer_to_complete(&left)
                    && Self::is_pointer_to_complete(&right)
                    && left == right
                {
                    Type::Int
                } else if Self::is_pointer_to_complete(&left) && right == Type::Int {
                    left
                } else {
                    invalid(diags)
                }
            }
            BinOp::Mul
            | BinOp::Div
            | BinOp::Mod
            | BinOp::Shl
            | BinOp::Shr
            | BinOp::BitAnd
            | BinOp::BitXor
            | BinOp::BitOr => {
                if left.is_arithmetic() && right.is_arithmetic() {
                    Type::Int
                } else {
                    invalid(diags)
                }
            }
            _ => invalid(diags),
        }
    }

    fn check_prefix(&mut self, expr: &'a Expr, op: PrefixOp, operand: &'a Expr) -> Type {
        let ty = self.check_expr(operand);
        if ty.is_error() {
            return Type::Error;
        }
        match op {
            PrefixOp::Deref => match ty.pointee() {
                Some(pointee) => pointee.clone(),
                None => {
                    self.diags.report(
                        expr.span,
                        format!("cannot dereference non-pointer type '{}'", ty),
                    );
                    Type::Error
                }
            },
            PrefixOp::AddrOf => Type::pointer_to(ty),
            PrefixOp::Plus | PrefixOp::Minus => {
                if ty.is_arithmetic() {
                    ty
                } else {
                    self.diags.report(
                        expr.span,
                        format!("operand of unary {} must be arithmetic, got '{}'", op, ty),
                    );
                    Type::Error
                }
            }
            PrefixOp::Not => {
                if ty.is_scalar() {
                    Type::Int
                } else {
                    self.diags.report(
                        expr.span,
                        format!("operand of '!' must be scalar, got '{}'", ty),
                    );
                    Type::Error
                }
            }
            PrefixOp::BitNot => {
                if ty == Type::Int {
                    ty
                } else {
                    self.diags.report(
                        expr.span,
                        format!("operand of '~' must be int, got '{}'", ty),
                    );
                    Type::Error
                }
            }
            PrefixOp::Inc | PrefixOp::Dec => {
                if is_modifiable(operand) && ty.is_scalar() {
                    ty
                } else {
                    self.diags.report(
                        expr.span,
                        "operand of increment or decrement must be a modifiable scalar"
                            .to_string(),
                    );
                    Type::Error
                }
            }
        }
    }

    fn check_member(
        &mut self,
        expr: &'a Expr,
        op: MemberOp,
        object: &'a Expr,
        member: &str,
    ) -> Type {
        let object_ty = self.check_expr(object);
        if object_ty.is_error() {
            return Type::Error;
        }

        // Arrow wants a pointer object, dot a non-pointer one. A mismatch is
        // reported but resolution still proceeds through the struct.
        let struct_ty = match (op, &object_ty) {
            (MemberOp::Arrow, Type::Pointer(pointee)) => (**pointee).clone(),
            (MemberOp::Arrow, _) => {
                self.diags.report(
                    expr.span,
                    format!("member reference type '{}' is not a pointer", object_ty),
                );
                object_ty.clone()
            }
            (MemberOp::Dot, Type::Pointer(pointee)) => {
                self.diags.report(
                    expr.span,
                    format!(
                        "member reference type '{}' is a pointer; did you mean '->'?",
                        object_ty
                    ),
                );
                (**pointee).clone()
            }
            (MemberOp::Dot, _) => object_ty.clone(),
        };

        let Type::Struct { tag: Some(tag), .. } = &struct_ty else {
            self.diags.report(
                expr.span,
                format!("request for member '{}' in non-struct type '{}'", member, struct_ty),
            );
            return Type::Error;
        };

        // Members resolve only when the object is a plain identifier whose
        // declared type names the tag.
        if !matches!(object.kind, ExprKind::Ident(_)) {
            self.diags.report(
                expr.span,
                format!("cannot resolve member '{}' of a non-identifier object", member),
            );
            return Type::Error;
        }

        let Some(members) = self.structs.members_of(tag) else {
            self.diags.report(
                expr.span,
                format!("struct {} is not defined", tag),
            );
            return Type::Error;
        };

        match members.iter().find(|m| m.name() == Some(member)) {
            Some(member_sd) => self.type_of(member_sd),
            None => {
                self.diags.report(
                    expr.span,
                    format!("no member named '{}' in struct {}", member, tag),
                );
                Type::Error
            }
        }
    }

    fn is_pointer_to_complete(ty: &Type) -> bool {
        matches!(ty, Type::Pointer(pointee) if pointee.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::sema::check::check;

    fn check_source(source: &str) -> (usize, Vec<String>) {
        let (unit, mut diags) = parse("<test>", source);
        assert_eq!(diags.error_count(), 0, "parse errors in test input {:?}", source);
        check(&unit, &mut diags);
        let messages = diags.iter().map(|d| d.message.clone()).collect();
        (diags.error_count(), messages)
    }

    #[test]
    fn test_pointer_arithmetic() {
        let (errors, _) = check_source(
            "int f(int *p, int n) { p = (p + n); p = (n + p); n = (p - p); return n; }",
        );
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_pointer_difference_offset_must_be_int() {
        // `+` takes any arithmetic offset, `-` only int.
        let (errors, _) = check_source(
            "int f(int *p, char c) { p = (p + c); return 0; }",
        );
        assert_eq!(errors, 0);

        let (errors, messages) = check_source(
            "int f(int *p, char c) { p - c; return 0; }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("invalid operands to binary -"));

        let (errors, _) = check_source(
            "int f(int *p, int n) { p = (p - n); return 0; }",
        );
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_pointer_to_incomplete_struct_arithmetic_rejected() {
        let (errors, messages) = check_source(
            "struct S; int f(struct S *p, int n) { p + n; return 0; }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("invalid operands to binary +"));
    }

    #[test]
    fn test_multiplication_is_arithmetic_only() {
        let (errors, messages) =
            check_source("int f(int *p) { p * 2; return 0; }");
        assert_eq!(errors, 1);
        assert!(messages[0].contains("invalid operands to binary *"));
    }

    #[test]
    fn test_assignment_requires_identical_types() {
        let (errors, messages) =
            check_source("int f(int *p, int n) { p = n; return 0; }");
        assert_eq!(errors, 1);
        assert!(messages[0].contains("mismatching types in assignment"));
    }

    #[test]
    fn test_assignment_lhs_must_be_assignable() {
        let (errors, messages) =
            check_source("int f(int a, int b) { (a + b) = 1; return 0; }");
        assert_eq!(errors, 1);
        assert!(messages[0].contains("not assignable"));
    }

    #[test]
    fn test_error_type_does_not_cascade() {
        // One diagnostic for the undeclared name, none for its uses.
        let (errors, messages) = check_source(
            "int f(void) { return ((missing + 1) * 2); }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("'missing' undeclared"));
    }

    #[test]
    fn test_logical_operators_take_scalars() {
        let (errors, _) =
            check_source("int f(int *p, int n) { return (p && n); }");
        assert_eq!(errors, 0);

        let (errors, messages) = check_source(
            "struct S { int x; }; int f(void) { struct S s; s || 1; return 0; }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("invalid operands to binary ||"));
    }

    #[test]
    fn test_equality_on_identical_pointers() {
        let (errors, _) =
            check_source("int f(int *p, int *q) { return (p == q); }");
        assert_eq!(errors, 0);

        let (errors, _) =
            check_source("int f(int *p, char *q) { p == q; return 0; }");
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_ternary_branches_must_match() {
        let (errors, messages) = check_source(
            "int f(int c, int *p) { c ? p : 1; return 0; }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("mismatching branch types"));

        let (errors, _) =
            check_source("int f(int c) { return (c ? 1 : 2); }");
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_deref_and_address_of() {
        let (errors, _) = check_source(
            "int f(int x) { int *p; p = (&x); return (*p); }",
        );
        assert_eq!(errors, 0);

        let (errors, messages) =
            check_source("int f(int x) { *x; return 0; }");
        assert_eq!(errors, 1);
        assert!(messages[0].contains("cannot dereference non-pointer type 'int'"));
    }

    #[test]
    fn test_bitwise_not_rejects_char() {
        let (errors, messages) =
            check_source("int f(char c) { ~c; return 0; }");
        assert_eq!(errors, 1);
        assert!(messages[0].contains("operand of '~' must be int"));
    }

    #[test]
    fn test_member_access() {
        let (errors, _) = check_source(
            "struct S { int x; }; int f(void) { struct S s; s.x = 1; return s.x; }",
        );
        assert_eq!(errors, 0);

        let (errors, messages) = check_source(
            "struct S { int x; }; int f(struct S *p) { return p->y; }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("no member named 'y' in struct S"));
    }

    #[test]
    fn test_arrow_on_non_pointer_reports_but_resolves() {
        let (errors, messages) = check_source(
            "struct S { int x; }; int f(void) { struct S s; return s->x; }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("is not a pointer"));
    }

    #[test]
    fn test_chained_member_access_does_not_resolve() {
        let (errors, messages) = check_source(
            "struct T { int z; }; struct S { struct T t; }; int f(void) { struct S s; return s.t.z; }",
        );
        assert_eq!(errors, 1);
        assert!(messages[0].contains("non-identifier object"));
    }

    #[test]
    fn test_call_and_index() {
        let (errors, _) = check_source(
            "int g(int x) { return x; } int f(int *p) { return (g(p[0])); }",
        );
        assert_eq!(errors, 0);

        let (errors, messages) =
            check_source("int f(int x) { x(1); return 0; }");
        assert_eq!(errors, 1);
        assert!(messages[0].contains("called object is not a function"));
    }

    #[test]
    fn test_sizeof_and_literals() {
        let (errors, _) = check_source(
            "int f(void) { int n; char c; char *s; n = (sizeof(int)); n = (sizeof n); c = 'a'; s = \"hi\"; return n; }",
        );
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_compound_assignment() {
        let (errors, _) =
            check_source("int f(int x) { x += 2; x <<= 1; return x; }");
        assert_eq!(errors, 0);

        let (errors, messages) =
            check_source("int f(int *p) { p += 1; return 0; }");
        assert_eq!(errors, 1);
        assert!(messages[0].contains("invalid operands to binary +="));
    }
}
