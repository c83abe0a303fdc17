//! Scope stack, struct table, and label table
//!
//! The symbol environment consumed during the semantic walk. All three
//! tables borrow from the AST: a name resolves to the `SpecifierDeclarator`
//! that declared it, a struct tag to the member list of its definition.
//! Everything is created fresh per check run; independent runs share no
//! state.

use crate::diag::Span;
use crate::parser::ast::SpecifierDeclarator;
use rustc_hash::FxHashMap;

/// Stack of lexical scopes, innermost last. Pushed on entering a compound
/// statement, popped on leaving it; strictly nested.
pub struct ScopeStack<'a> {
    scopes: Vec<FxHashMap<&'a str, &'a SpecifierDeclarator>>,
}

impl<'a> ScopeStack<'a> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Register a name in the innermost scope.
    pub fn declare(&mut self, name: &'a str, decl: &'a SpecifierDeclarator) {
        if let Some(innermost) = self.scopes.last_mut() {
            innermost.insert(name, decl);
        }
    }

    /// Resolve a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&'a SpecifierDeclarator> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }
}

impl<'a> Default for ScopeStack<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// File-level struct-tag table: one definition per tag.
pub struct StructTable<'a> {
    defs: FxHashMap<&'a str, &'a [SpecifierDeclarator]>,
}

impl<'a> StructTable<'a> {
    pub fn new() -> Self {
        Self {
            defs: FxHashMap::default(),
        }
    }

    /// Record a definition. Returns false when the tag already has one; the
    /// existing definition is kept.
    pub fn define(&mut self, tag: &'a str, members: &'a [SpecifierDeclarator]) -> bool {
        if self.defs.contains_key(tag) {
            return false;
        }
        self.defs.insert(tag, members);
        true
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.defs.contains_key(tag)
    }

    pub fn members_of(&self, tag: &str) -> Option<&'a [SpecifierDeclarator]> {
        self.defs.get(tag).copied()
    }
}

impl<'a> Default for StructTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Label table for the translation unit, filled by an explicit collection
/// pass before any checking; label names are unique.
pub struct LabelTable<'a> {
    labels: FxHashMap<&'a str, Span>,
}

impl<'a> LabelTable<'a> {
    pub fn new() -> Self {
        Self {
            labels: FxHashMap::default(),
        }
    }

    /// Record a label definition. Returns the span of the earlier definition
    /// when the name is already taken.
    pub fn define(&mut self, label: &'a str, span: Span) -> Option<Span> {
        if let Some(existing) = self.labels.get(label) {
            return Some(*existing);
        }
        self.labels.insert(label, span);
        None
    }

    pub fn is_defined(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }
}

impl<'a> Default for LabelTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{Pos, Span};
    use crate::parser::ast::*;

    fn decl(name: &str) -> SpecifierDeclarator {
        let span = Span::at(Pos::new(1, 1));
        SpecifierDeclarator {
            specifier: Specifier {
                kind: SpecifierKind::Primitive(Primitive::Int),
                span,
            },
            declarator: Some(Declarator {
                kind: DeclaratorKind::Named(name.to_string()),
                span,
            }),
            span,
        }
    }

    #[test]
    fn test_inner_scope_shadows_and_pops() {
        let outer = decl("x");
        let inner = decl("x");
        let mut scopes = ScopeStack::new();
        scopes.push();
        scopes.declare("x", &outer);
        scopes.push();
        scopes.declare("x", &inner);
        assert!(std::ptr::eq(scopes.lookup("x").unwrap(), &inner));
        scopes.pop();
        assert!(std::ptr::eq(scopes.lookup("x").unwrap(), &outer));
        scopes.pop();
        assert!(scopes.lookup("x").is_none());
    }

    #[test]
    fn test_struct_table_keeps_first_definition() {
        let members_a = vec![decl("x")];
        let members_b = vec![decl("y")];
        let mut table = StructTable::new();
        assert!(table.define("S", &members_a));
        assert!(!table.define("S", &members_b));
        let kept = table.members_of("S").unwrap();
        assert_eq!(kept[0].name(), Some("x"));
    }

    #[test]
    fn test_label_table_reports_duplicates() {
        let first = Span::at(Pos::new(1, 1));
        let second = Span::at(Pos::new(5, 1));
        let mut table = LabelTable::new();
        assert!(table.define("out", first).is_none());
        assert_eq!(table.define("out", second), Some(first));
        assert!(table.is_defined("out"));
        assert!(!table.is_defined("elsewhere"));
    }
}
