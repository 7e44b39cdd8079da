use lumenscript::{evaluate, Value};

fn truthy(src: &str) -> bool {
    let value = evaluate("<test>", src).unwrap();
    value.is_truthy()
}

#[test]
fn null_and_zero_are_falsy() {
    assert!(!truthy("null"));
    assert!(!truthy("0"));
    assert!(!truthy("0.0"));
}

#[test]
fn non_zero_numbers_are_truthy() {
    assert!(truthy("1"));
    assert!(truthy("-1"));
    assert!(truthy("0.1"));
}

#[test]
fn empty_string_and_collections_are_falsy() {
    assert!(!truthy("\"\""));
    assert!(!truthy("[]"));
    assert!(!truthy("()"));
    assert!(!truthy("{}"));
}

#[test]
fn nonempty_string_and_collections_are_truthy() {
    assert!(truthy("\"x\""));
    assert!(truthy("[0]"));
    assert!(truthy("(0,)"));
    assert!(truthy("{0: 0}"));
}

#[test]
fn booleans_and_types_are_never_falsy_except_false_itself() {
    assert!(!truthy("false"));
    assert!(truthy("true"));
    assert!(truthy("int"));
}

#[test]
fn if_uses_truthiness_not_equality() {
    assert!(matches!(evaluate("<test>", "if []:\n    1\nelse:\n    2\n").unwrap(), Value::Int(2)));
    assert!(matches!(evaluate("<test>", "if [0]:\n    1\nelse:\n    2\n").unwrap(), Value::Int(1)));
}
