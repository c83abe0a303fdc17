// Integration tests for the semantic checker

use cfront::parser::parse;
use cfront::sema::check;

fn check_program(source: &str) -> Vec<String> {
    let (unit, mut diags) = parse("<test>", source);
    assert!(
        diags.is_clean(),
        "unexpected parse errors: {:?}",
        diags.iter().map(|d| d.message.clone()).collect::<Vec<_>>()
    );
    check(&unit, &mut diags);
    diags.iter().map(|d| d.message.clone()).collect()
}

#[test]
fn test_clean_program_has_no_diagnostics() {
    let source = r#"
        struct node {
            int value;
            struct node *next;
        };

        int length(struct node *head) {
            int n;
            n = 0;
            while (head != 0) {
                n = n + 1;
                head = head->next;
            }
            return n;
        }

        int main(void) {
            struct node first;
            first.value = 1;
            first.next = 0;
            return length(&first);
        }
    "#;
    assert!(check_program(source).is_empty());
}

#[test]
fn test_struct_redefinition_is_exactly_one_error() {
    let source = r#"
        struct S { int x; };
        struct S { int y; };
        int f(void) {
            struct S s;
            s.x = 1;
            return s.x;
        }
    "#;
    let messages = check_program(source);
    // The first definition wins; later uses of the struct stay valid.
    assert_eq!(messages, vec!["Redeclaration of struct S".to_string()]);
}

#[test]
fn test_error_type_does_not_cascade() {
    let source = r#"
        int f(void) {
            int n;
            n = (missing + 1) * 2;
            return n;
        }
    "#;
    let messages = check_program(source);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("'missing' undeclared"));
}

#[test]
fn test_scope_discipline() {
    let source = r#"
        int f(void) {
            {
                int x;
                x = 1;
            }
            x = 2;
            return 0;
        }
    "#;
    let messages = check_program(source);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("'x' undeclared"));
}

#[test]
fn test_goto_forward_reference_succeeds() {
    let source = r#"
        int f(int n) {
            if (n < 0)
                goto fail;
            return n;
        fail:
            return -1;
        }
    "#;
    assert!(check_program(source).is_empty());
}

#[test]
fn test_goto_missing_label_is_exactly_one_error() {
    let source = r#"
        int f(void) {
            goto nowhere;
            return 0;
        }
    "#;
    let messages = check_program(source);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("label 'nowhere' used but not defined"));
}

#[test]
fn test_return_type_must_match() {
    let bad = r#"
        int f(void) {
            return "x";
        }
    "#;
    let messages = check_program(bad);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("mismatching return type"));

    let good = r#"
        int f(void) {
            return 1;
        }
    "#;
    assert!(check_program(good).is_empty());
}

#[test]
fn test_break_outside_loop_is_exactly_one_error() {
    let source = r#"
        int f(void) {
            break;
            return 0;
        }
    "#;
    let messages = check_program(source);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("break statement not within a loop"));
}

#[test]
fn test_independent_errors_are_all_reported() {
    let source = r#"
        int f(int *p) {
            int n;
            n = p;
            p * 2;
            continue;
            return n;
        }
    "#;
    let messages = check_program(source);
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("mismatching types in assignment"));
    assert!(messages[1].contains("invalid operands to binary *"));
    assert!(messages[2].contains("continue statement not within a loop"));
}

#[test]
fn test_pointer_arithmetic_rules() {
    let good = r#"
        int f(int *p, int *q, int n) {
            p = p + n;
            p = n + p;
            p = p - n;
            n = p - q;
            return n;
        }
    "#;
    assert!(check_program(good).is_empty());

    let bad = r#"
        int f(int *p, char *q) {
            p - q;
            return 0;
        }
    "#;
    let messages = check_program(bad);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("invalid operands to binary -"));
}

#[test]
fn test_incomplete_struct_storage() {
    let source = r#"
        struct S *p;
        struct S s;
    "#;
    let messages = check_program(source);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("storage size of 's' unknown"));
}
