//! Canonical source rendering of the AST
//!
//! Walks a parsed tree and renders it back as source text: expressions come
//! out fully parenthesized, declarator nesting is made explicit (`(*p)`),
//! compound statements and struct definitions get a fixed brace-and-tab
//! layout. The output is deterministic and re-parses to a structurally
//! identical tree, which is what the round-trip tests lean on.

use crate::parser::ast::*;

/// Render a whole translation unit.
pub fn render_unit(unit: &TranslationUnit) -> String {
    let mut printer = Printer::new();
    printer.unit(unit);
    printer.out
}

/// Render a single expression (diagnostics and tests).
pub fn render_expr(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.expr(expr);
    printer.out
}

/// Render a single statement.
pub fn render_stmt(stmt: &Stmt) -> String {
    let mut printer = Printer::new();
    printer.stmt(stmt);
    printer.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Newline followed by the current indentation.
    fn new_indent(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn unit(&mut self, unit: &TranslationUnit) {
        for (i, decl) in unit.decls.iter().enumerate() {
            self.external_decl(decl);
            self.new_indent();
            if i + 1 < unit.decls.len() {
                self.new_indent();
            }
        }
    }

    fn external_decl(&mut self, decl: &ExternalDecl) {
        match &decl.kind {
            ExternalDeclKind::Declaration(sd) => {
                self.specifier_declarator(sd);
                self.push(";");
            }
            ExternalDeclKind::FunctionDef { decl, body } => {
                self.specifier_declarator(decl);
                self.push("\n");
                self.stmt(body);
            }
            ExternalDeclKind::Err => self.push("<errorDecl>"),
        }
    }

    fn specifier_declarator(&mut self, sd: &SpecifierDeclarator) {
        self.specifier(&sd.specifier);
        if let Some(declarator) = &sd.declarator {
            self.push(" ");
            self.declarator(declarator);
        }
    }

    fn specifier(&mut self, specifier: &Specifier) {
        match &specifier.kind {
            SpecifierKind::Primitive(primitive) => self.push(&primitive.to_string()),
            SpecifierKind::Struct { tag, members } => {
                self.push("struct");
                if let Some(tag) = tag {
                    self.push(" ");
                    self.push(tag);
                }
                if let Some(members) = members {
                    if members.is_empty() {
                        self.push(" {}");
                    } else {
                        self.new_indent();
                        self.push("{");
                        self.indent += 1;
                        self.new_indent();
                        for (i, member) in members.iter().enumerate() {
                            self.specifier_declarator(member);
                            self.push(";");
                            if i + 1 < members.len() {
                                self.new_indent();
                            }
                        }
                        self.indent -= 1;
                        self.new_indent();
                        self.push("}");
                    }
                }
            }
        }
    }

    fn declarator(&mut self, declarator: &Declarator) {
        match &declarator.kind {
            DeclaratorKind::Named(name) => self.push(name),
            DeclaratorKind::Pointer(inner) => {
                self.push("(*");
                if let Some(inner) = inner {
                    self.declarator(inner);
                }
                self.push(")");
            }
            DeclaratorKind::Function { inner, params } => {
                self.push("(");
                if let Some(inner) = inner {
                    self.declarator(inner);
                    self.push("(");
                }
                for (i, param) in params.iter().enumerate() {
                    self.specifier_declarator(param);
                    if i + 1 < params.len() {
                        self.push(", ");
                    }
                }
                if inner.is_some() {
                    self.push(")");
                }
                self.push(")");
            }
        }
    }

    /// A block item on its own line; a label resets to column zero.
    fn block_item(&mut self, stmt: &Stmt) {
        if matches!(stmt.kind, StmtKind::Labeled { .. }) {
            self.out.push('\n');
        } else {
            self.new_indent();
        }
        self.stmt(stmt);
    }

    /// A statement on a fresh line, optionally one level deeper for the
    /// duration of this statement only.
    fn stmt_on_new_line(&mut self, stmt: &Stmt, deeper: bool) {
        if deeper {
            self.indent += 1;
        }
        if matches!(stmt.kind, StmtKind::Labeled { .. }) {
            self.out.push('\n');
            self.stmt(stmt);
        } else {
            self.new_indent();
            self.stmt(stmt);
        }
        if deeper {
            self.indent -= 1;
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.expr(expr);
                self.push(";");
            }
            StmtKind::EmptyReturn => self.push("return;"),
            StmtKind::Return(expr) => {
                self.push("return ");
                self.expr(expr);
                self.push(";");
            }
            StmtKind::Goto(label) => {
                self.push("goto ");
                self.push(label);
                self.push(";");
            }
            StmtKind::Break => self.push("break;"),
            StmtKind::Continue => self.push("continue;"),
            StmtKind::While { cond, body } => {
                self.push("while (");
                self.expr(cond);
                self.push(")");
                if matches!(body.kind, StmtKind::Compound(_)) {
                    self.push(" ");
                    self.stmt(body);
                } else {
                    self.stmt_on_new_line(body, true);
                }
            }
            StmtKind::If { cond, then_branch } => {
                self.push("if (");
                self.expr(cond);
                self.push(")");
                if matches!(then_branch.kind, StmtKind::Compound(_)) {
                    self.push(" ");
                    self.stmt(then_branch);
                } else {
                    self.stmt_on_new_line(then_branch, true);
                }
            }
            StmtKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                self.push("if (");
                self.expr(cond);
                self.push(")");
                if matches!(then_branch.kind, StmtKind::Compound(_)) {
                    self.push(" ");
                    self.stmt(then_branch);
                    self.push(" ");
                } else {
                    self.stmt_on_new_line(then_branch, true);
                    self.new_indent();
                }
                self.push("else");
                let chains = matches!(
                    else_branch.kind,
                    StmtKind::If { .. } | StmtKind::IfElse { .. } | StmtKind::Compound(_)
                );
                if chains {
                    self.push(" ");
                    self.stmt(else_branch);
                } else {
                    self.stmt_on_new_line(else_branch, true);
                }
            }
            StmtKind::Null => self.push(";"),
            StmtKind::Compound(items) => {
                self.push("{");
                self.indent += 1;
                for item in items {
                    self.block_item(item);
                }
                self.indent -= 1;
                self.new_indent();
                self.push("}");
            }
            StmtKind::Labeled { label, stmt } => {
                self.push(label);
                self.push(":");
                self.stmt_on_new_line(stmt, false);
            }
            StmtKind::Declaration(sd) => {
                self.specifier_declarator(sd);
                self.push(";");
            }
            StmtKind::Err => self.push("<errorStmt>"),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Infix { op, lhs, rhs } => {
                self.push("(");
                self.expr(lhs);
                self.push(" ");
                self.push(&op.to_string());
                self.push(" ");
                self.expr(rhs);
                self.push(")");
            }
            ExprKind::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                self.push("(");
                self.expr(cond);
                self.push(" ? ");
                self.expr(then_branch);
                self.push(" : ");
                self.expr(else_branch);
                self.push(")");
            }
            ExprKind::Prefix { op, operand } => {
                self.push("(");
                self.push(&op.to_string());
                self.expr(operand);
                self.push(")");
            }
            ExprKind::Postfix { op, operand } => {
                self.push("(");
                self.expr(operand);
                self.push(&op.to_string());
                self.push(")");
            }
            ExprKind::Member { op, object, member } => {
                self.push("(");
                self.expr(object);
                self.push(&op.to_string());
                self.push(member);
                self.push(")");
            }
            ExprKind::Index { object, index } => {
                self.push("(");
                self.expr(object);
                self.push("[");
                self.expr(index);
                self.push("])");
            }
            ExprKind::Call { callee, args } => {
                self.push("(");
                self.expr(callee);
                self.push("(");
                for (i, arg) in args.iter().enumerate() {
                    self.expr(arg);
                    if i + 1 < args.len() {
                        self.push(", ");
                    }
                }
                self.push("))");
            }
            ExprKind::SizeofType(primitive) => {
                self.push("(sizeof(");
                self.push(&primitive.to_string());
                self.push("))");
            }
            ExprKind::SizeofExpr(operand) => {
                self.push("(sizeof ");
                self.expr(operand);
                self.push(")");
            }
            ExprKind::Ident(name) => self.push(name),
            ExprKind::Integer(value) => self.push(&value.to_string()),
            ExprKind::Character(raw) => self.push(raw),
            ExprKind::Str(raw) => self.push(raw),
            ExprKind::Err => self.push("<errorExp>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::{parse, Parser};

    fn render_source_expr(source: &str) -> String {
        let mut parser = Parser::new("<test>", source);
        let expr = parser.parse_exp_bottom("test expression");
        assert!(parser.into_diags().is_clean());
        render_expr(&expr)
    }

    #[test]
    fn test_precedence_is_visible_in_rendering() {
        assert_eq!(render_source_expr("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(render_source_expr("a = b = 1"), "(a = (b = 1))");
        assert_eq!(
            render_source_expr("a ? b : c ? d : e"),
            "(a ? b : (c ? d : e))"
        );
    }

    #[test]
    fn test_postfix_shapes() {
        assert_eq!(render_source_expr("f(x, 1)"), "(f(x, 1))");
        assert_eq!(render_source_expr("a[i]"), "(a[i])");
        assert_eq!(render_source_expr("p->next"), "(p->next)");
        assert_eq!(render_source_expr("x++"), "(x++)");
        assert_eq!(render_source_expr("sizeof (int)"), "(sizeof(int))");
        assert_eq!(render_source_expr("sizeof x"), "(sizeof x)");
    }

    #[test]
    fn test_statement_rendering() {
        let mut parser = Parser::new("<test>", "while (n) n = n - 1;");
        let stmt = parser.parse_stmt(false, false);
        assert!(parser.into_diags().is_clean());
        assert_eq!(render_stmt(&stmt), "while (n)\n\t(n = (n - 1));");
    }

    #[test]
    fn test_declarator_rendering() {
        let (unit, diags) = parse("<test>", "int *f(void);");
        assert!(diags.is_clean());
        let rendered = render_unit(&unit);
        assert_eq!(rendered, "int (*(f(void)));\n");
    }

    #[test]
    fn test_struct_definition_layout() {
        let (unit, diags) = parse("<test>", "struct S { int x; };");
        assert!(diags.is_clean());
        let rendered = render_unit(&unit);
        assert_eq!(rendered, "struct S\n{\n\tint x;\n};\n");
    }

    #[test]
    fn test_function_body_layout() {
        let (unit, diags) = parse("<test>", "int main(void) { return 0; }");
        assert!(diags.is_clean());
        let rendered = render_unit(&unit);
        assert_eq!(rendered, "int (main(void))\n{\n\treturn 0;\n}\n");
    }
}
