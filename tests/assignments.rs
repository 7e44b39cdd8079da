use lumenscript::{evaluate, Value};

#[test]
fn simple_assignment_then_read() {
    let value = evaluate("<test>", "x = 42\nx\n").unwrap();
    assert!(matches!(value, Value::Int(42)));
}

#[test]
fn reassignment_returns_most_recent_value() {
    let value = evaluate("<test>", "x = 42\nx = 123\nx\n").unwrap();
    assert!(matches!(value, Value::Int(123)));
}

#[test]
fn augmented_assignment_rewrites_to_binary_op() {
    let value = evaluate("<test>", "x = 42\nx += 123\nx\n").unwrap();
    assert!(matches!(value, Value::Int(165)));
}

#[test]
fn full_augmented_operator_set() {
    let cases = [
        ("x = 10\nx -= 3\nx\n", 7),
        ("x = 10\nx *= 3\nx\n", 30),
        ("x = 10\nx //= 3\nx\n", 3),
        ("x = 10\nx %= 3\nx\n", 1),
        ("x = 10\nx &= 3\nx\n", 2),
        ("x = 10\nx |= 1\nx\n", 11),
        ("x = 10\nx ^= 3\nx\n", 9),
        ("x = 1\nx <<= 3\nx\n", 8),
        ("x = 16\nx >>= 2\nx\n", 4),
        ("x = 2\nx **= 3\nx\n", 8),
    ];
    for (src, expected) in cases {
        let value = evaluate("<test>", src).unwrap();
        assert!(matches!(value, Value::Int(n) if n == expected), "{src} => {value:?}");
    }
}

#[test]
fn chained_assignment_assigns_same_value_to_every_target() {
    let value = evaluate("<test>", "a = b = c = 7\n(a, b, c)\n").unwrap();
    match value {
        Value::Tuple(items) => {
            assert!(items.iter().all(|v| matches!(v, Value::Int(7))));
        }
        other => panic!("expected tuple, got {other:?}"),
    }
}

#[test]
fn list_index_augmented_assignment() {
    let value = evaluate("<test>", "x = [42]\nx[0] += 123\nx[0]\n").unwrap();
    assert!(matches!(value, Value::Int(165)));
}

#[test]
fn dict_item_augmented_assignment() {
    let value = evaluate("<test>", "x = {\"a\": 42}\nx[\"a\"] += 123\nx[\"a\"]\n").unwrap();
    assert!(matches!(value, Value::Int(165)));
}

#[test]
fn assigning_to_a_literal_is_syntax_error() {
    assert!(evaluate("<test>", "1 = 2\n").is_err());
}

#[test]
fn setitem_on_tuple_is_type_error() {
    let err = evaluate("<test>", "x = (1, 2)\nx[0] = 9\n").unwrap_err();
    assert!(err.to_string().contains("TypeError"));
}
