use lumenscript::{evaluate, Value};

#[test]
fn getattr_with_default_returns_the_default() {
    // Since there are no user-defined classes, `getattr`/`取属性` always
    // misses; passing a default is the only way to get a value back.
    let value = evaluate("<test>", "getattr({\"a\": 1}, \"b\", 99)\n").unwrap();
    assert!(matches!(value, Value::Int(99)));
}

#[test]
fn getattr_without_default_is_attribute_error() {
    let err = evaluate("<test>", "getattr({\"a\": 1}, \"a\")\n").unwrap_err();
    assert!(err.to_string().contains("AttributeError"));
}

#[test]
fn getattr_name_must_be_a_string() {
    let err = evaluate("<test>", "getattr({\"a\": 1}, 1)\n").unwrap_err();
    assert!(err.to_string().contains("TypeError"));
}

#[test]
fn cjk_getattr_synonym() {
    let value = evaluate("<test>", "取属性({\"a\": 1}, \"a\", 7)\n").unwrap();
    assert!(matches!(value, Value::Int(7)));
}

#[test]
fn dotted_attribute_access_is_always_a_runtime_error() {
    // There is no object system, so `.name` on any value fails — the
    // expanded spec resolves this Open Question by making GetAttr/SetAttr
    // unconditionally error rather than silently succeeding on nothing.
    let err = evaluate("<test>", "x = {\"a\": 1}\nx.a\n").unwrap_err();
    assert!(err.to_string().contains("AttributeError"));
}

#[test]
fn setattr_is_always_a_runtime_error() {
    let err = evaluate("<test>", "x = {\"a\": 1}\nx.a = 2\n").unwrap_err();
    assert!(err.to_string().contains("AttributeError"));
}

#[test]
fn slice_with_step() {
    let value = evaluate("<test>", "[0, 1, 2, 3, 4, 5][::2]\n").unwrap();
    match value {
        Value::List(items) => {
            let items = items.borrow();
            assert_eq!(items.len(), 3);
        }
        other => panic!("expected list, got {other:?}"),
    }
}
