use lumenscript::{evaluate, Value};

#[test]
fn multi_element_tuple_literal() {
    let value = evaluate("<test>", "(1, 2, 3)\n").unwrap();
    match value {
        Value::Tuple(items) => assert_eq!(items.len(), 3),
        other => panic!("expected tuple, got {other:?}"),
    }
}

#[test]
fn single_element_tuple_needs_a_trailing_comma() {
    let value = evaluate("<test>", "(1,)\n").unwrap();
    match value {
        Value::Tuple(items) => {
            assert_eq!(items.len(), 1);
            assert!(matches!(items[0], Value::Int(1)));
        }
        other => panic!("expected tuple, got {other:?}"),
    }
}

#[test]
fn parens_without_a_comma_are_just_grouping() {
    assert!(matches!(evaluate("<test>", "(1)\n").unwrap(), Value::Int(1)));
}

#[test]
fn empty_tuple_is_falsy() {
    assert!(matches!(evaluate("<test>", "()\n").unwrap(), Value::Tuple(t) if t.is_empty()));
}

#[test]
fn tuples_are_immutable() {
    let err = evaluate("<test>", "x = (1, 2)\nx[0] = 9\n").unwrap_err();
    assert!(err.to_string().contains("TypeError"));
}

#[test]
fn tuple_indexing_and_slicing() {
    assert!(matches!(evaluate("<test>", "(1, 2, 3)[1]\n").unwrap(), Value::Int(2)));
    let value = evaluate("<test>", "(1, 2, 3)[0:2]\n").unwrap();
    match value {
        Value::Tuple(items) => assert_eq!(items.len(), 2),
        other => panic!("expected tuple, got {other:?}"),
    }
}
