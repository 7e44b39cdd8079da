use lumenscript::{evaluate, Value};

#[test]
fn unary_minus_and_plus() {
    assert!(matches!(evaluate("<test>", "-5").unwrap(), Value::Int(-5)));
    assert!(matches!(evaluate("<test>", "+5").unwrap(), Value::Int(5)));
    assert!(matches!(evaluate("<test>", "--5").unwrap(), Value::Int(5)));
}

#[test]
fn bitwise_not() {
    assert!(matches!(evaluate("<test>", "~5").unwrap(), Value::Int(-6)));
}

#[test]
fn logical_not_on_non_bool_coerces_through_truthiness() {
    assert!(matches!(evaluate("<test>", "not 0").unwrap(), Value::Bool(true)));
    assert!(matches!(evaluate("<test>", "not \"\"").unwrap(), Value::Bool(true)));
    assert!(matches!(evaluate("<test>", "not \"x\"").unwrap(), Value::Bool(false)));
}

#[test]
fn unary_minus_on_a_string_is_type_error() {
    let err = evaluate("<test>", "-\"x\"").unwrap_err();
    assert!(err.to_string().contains("TypeError"));
}

#[test]
fn power_is_right_associative_and_binds_tighter_than_unary_minus_on_the_base() {
    assert_eq!(
        match evaluate("<test>", "2 ** 3 ** 2").unwrap() {
            Value::Int(n) => n,
            other => panic!("expected int, got {other:?}"),
        },
        512
    );
}
