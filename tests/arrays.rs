use lumenscript::{evaluate, Value};

#[test]
fn list_literal_and_indexing() {
    let value = evaluate("<test>", "[1, 2, 3][1]\n").unwrap();
    assert!(matches!(value, Value::Int(2)));
}

#[test]
fn list_is_mutable_via_setitem() {
    let value = evaluate("<test>", "x = [1, 2, 3]\nx[0] = 99\nx[0]\n").unwrap();
    assert!(matches!(value, Value::Int(99)));
}

#[test]
fn list_slicing_returns_a_new_list() {
    let value = evaluate("<test>", "[1, 2, 3, 4][1:3]\n").unwrap();
    match value {
        Value::List(items) => {
            let items = items.borrow();
            assert_eq!(items.len(), 2);
            assert!(matches!(items[0], Value::Int(2)));
            assert!(matches!(items[1], Value::Int(3)));
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn empty_list_is_falsy_nonempty_is_truthy() {
    assert!(matches!(evaluate("<test>", "[]").unwrap(), Value::List(l) if l.borrow().is_empty()));
}

#[test]
fn out_of_range_list_index_is_index_error() {
    let err = evaluate("<test>", "[1, 2][5]").unwrap_err();
    assert!(err.to_string().contains("IndexError"));
}

#[test]
fn len_builtin_on_a_list() {
    assert!(matches!(evaluate("<test>", "len([1, 2, 3])").unwrap(), Value::Int(3)));
}

#[test]
fn aliased_lists_share_mutations() {
    // `y = x` aliases the same underlying Rc<RefCell<Vec<Value>>>, matching
    // the reference semantics of mutable collections.
    let value = evaluate("<test>", "x = [1]\ny = x\ny[0] = 2\nx[0]\n").unwrap();
    assert!(matches!(value, Value::Int(2)));
}
