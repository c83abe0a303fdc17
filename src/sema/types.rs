//! Type model
//!
//! Small tagged values compared by structural equality. The canonical string
//! of a type ("pointer to int", "function returning char") exists only for
//! diagnostics, through `Display`; it is never used for comparison.
//!
//! `Error` is the poison type: it marks an expression whose type could not
//! be resolved after an error was already reported. Every rule that sees an
//! `Error` operand must stay silent and produce `Error` again, so one broken
//! subexpression never cascades into derivative diagnostics.

use std::fmt;

#[derive(Debug, Clone)]
pub enum Type {
    Int,
    Char,
    Pointer(Box<Type>),
    /// Completeness is set once the tag's member list is known; it does not
    /// take part in equality.
    Struct {
        tag: Option<String>,
        complete: bool,
    },
    Array {
        elem: Box<Type>,
        complete: bool,
    },
    Function(Box<Type>),
    Void,
    Error,
}

impl Type {
    pub fn pointer_to(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    pub fn function_returning(ret: Type) -> Type {
        Type::Function(Box::new(ret))
    }

    /// `int` and `char`: mutually compatible in arithmetic operators.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Type::Int | Type::Char)
    }

    /// Arithmetic or pointer: valid in conditions and logical operators.
    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || matches!(self, Type::Pointer(_))
    }

    /// A type whose size is fully known.
    pub fn is_complete(&self) -> bool {
        match self {
            Type::Int | Type::Char | Type::Pointer(_) => true,
            Type::Struct { complete, .. } => *complete,
            Type::Array { complete, .. } => *complete,
            Type::Function(ret) => ret.is_complete(),
            Type::Void | Type::Error => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Type::Function(ret) => Some(ret),
            _ => None,
        }
    }
}

/// Structural equality. Completeness flags are resolution state, not part
/// of a type's identity, so they are ignored.
impl PartialEq for Type {
    fn eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int) => true,
            (Type::Char, Type::Char) => true,
            (Type::Void, Type::Void) => true,
            (Type::Error, Type::Error) => true,
            (Type::Pointer(a), Type::Pointer(b)) => a == b,
            (Type::Struct { tag: a, .. }, Type::Struct { tag: b, .. }) => a == b,
            (Type::Array { elem: a, .. }, Type::Array { elem: b, .. }) => a == b,
            (Type::Function(a), Type::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Char => write!(f, "char"),
            Type::Pointer(pointee) => write!(f, "pointer to {}", pointee),
            Type::Struct { tag: Some(tag), .. } => write!(f, "struct {}", tag),
            Type::Struct { tag: None, .. } => write!(f, "struct"),
            Type::Array { elem, .. } => write!(f, "array of {}", elem),
            Type::Function(ret) => write!(f, "function returning {}", ret),
            Type::Void => write!(f, "void"),
            Type::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality_ignores_completeness() {
        let incomplete = Type::Struct {
            tag: Some("S".to_string()),
            complete: false,
        };
        let complete = Type::Struct {
            tag: Some("S".to_string()),
            complete: true,
        };
        assert_eq!(incomplete, complete);

        let other = Type::Struct {
            tag: Some("T".to_string()),
            complete: true,
        };
        assert_ne!(incomplete, other);
    }

    #[test]
    fn test_pointer_equality_is_structural() {
        let a = Type::pointer_to(Type::pointer_to(Type::Char));
        let b = Type::pointer_to(Type::pointer_to(Type::Char));
        let c = Type::pointer_to(Type::Char);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_scalar_and_arithmetic_classification() {
        assert!(Type::Int.is_arithmetic());
        assert!(Type::Char.is_scalar());
        assert!(Type::pointer_to(Type::Void).is_scalar());
        assert!(!Type::pointer_to(Type::Void).is_arithmetic());
        assert!(!Type::Void.is_scalar());
        assert!(!Type::Error.is_scalar());
    }

    #[test]
    fn test_canonical_strings() {
        assert_eq!(Type::pointer_to(Type::Int).to_string(), "pointer to int");
        assert_eq!(
            Type::function_returning(Type::pointer_to(Type::Char)).to_string(),
            "function returning pointer to char"
        );
        assert_eq!(
            Type::Struct {
                tag: Some("S".to_string()),
                complete: false
            }
            .to_string(),
            "struct S"
        );
    }
}
