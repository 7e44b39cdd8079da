use lumenscript::{evaluate, Value};

#[test]
fn dict_literal_and_lookup() {
    let value = evaluate("<test>", "{\"a\": 1, \"b\": 2}[\"b\"]\n").unwrap();
    assert!(matches!(value, Value::Int(2)));
}

#[test]
fn missing_key_is_key_error() {
    let err = evaluate("<test>", "{\"a\": 1}[\"missing\"]\n").unwrap_err();
    assert!(err.to_string().contains("KeyError"));
}

#[test]
fn dict_setitem_inserts_or_overwrites() {
    let value = evaluate("<test>", "x = {}\nx[\"a\"] = 1\nx[\"a\"] = 2\nx[\"a\"]\n").unwrap();
    assert!(matches!(value, Value::Int(2)));
}

#[test]
fn numeric_key_subtypes_normalise() {
    // `1`, `1.0` and `true` must address the same entry.
    let value = evaluate("<test>", "x = {1: \"one\"}\nx[1.0]\n").unwrap();
    match value {
        Value::String(s) => assert_eq!(s.as_str(), "one"),
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn empty_dict_is_falsy() {
    assert!(matches!(evaluate("<test>", "{}").unwrap(), Value::Dict(d) if d.borrow().is_empty()));
}

#[test]
fn list_is_an_unhashable_dict_key() {
    let err = evaluate("<test>", "{[1]: 2}\n").unwrap_err();
    assert!(err.to_string().contains("TypeError"));
}

#[test]
fn len_builtin_on_a_dict() {
    assert!(matches!(evaluate("<test>", "len({\"a\": 1, \"b\": 2})").unwrap(), Value::Int(2)));
}
