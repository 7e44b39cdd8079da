use lumenscript::{evaluate, evaluate_with_sink, Value};

#[test]
fn print_writes_space_joined_display_strings_to_the_sink() {
    let mut out = String::new();
    evaluate_with_sink("<test>", "print(\"a\", 1, true)\n", &mut |s| out.push_str(s)).unwrap();
    assert_eq!(out, "a 1 true\n");
}

#[test]
fn print_returns_null() {
    assert!(matches!(evaluate("<test>", "print(\"x\")\n").unwrap(), Value::Null));
}

#[test]
fn cjk_print_synonym_behaves_identically() {
    let mut out = String::new();
    evaluate_with_sink("<test>", "打印(\"你好\")\n", &mut |s| out.push_str(s)).unwrap();
    assert_eq!(out, "你好\n");
}

#[test]
fn abs_builtin_and_cjk_synonym() {
    assert!(matches!(evaluate("<test>", "abs(-5)\n").unwrap(), Value::Int(5)));
    assert!(matches!(evaluate("<test>", "绝对值(-5)\n").unwrap(), Value::Int(5)));
}

#[test]
fn abs_on_a_string_is_type_error() {
    let err = evaluate("<test>", "abs(\"x\")\n").unwrap_err();
    assert!(err.to_string().contains("TypeError"));
}

#[test]
fn len_builtin_and_cjk_synonym() {
    assert!(matches!(evaluate("<test>", "len(\"abc\")\n").unwrap(), Value::Int(3)));
    assert!(matches!(evaluate("<test>", "长度(\"abc\")\n").unwrap(), Value::Int(3)));
}

#[test]
fn calling_a_builtin_with_too_few_arguments_is_a_runtime_error() {
    assert!(evaluate("<test>", "len()\n").is_err());
    assert!(evaluate("<test>", "abs()\n").is_err());
}

#[test]
fn type_objects_are_callable_as_constructors() {
    assert!(matches!(evaluate("<test>", "int(\"42\")\n").unwrap(), Value::Int(42)));
    assert!(matches!(evaluate("<test>", "str(42)\n").unwrap(), Value::String(_)));
    assert!(matches!(evaluate("<test>", "bool(0)\n").unwrap(), Value::Bool(false)));
}

#[test]
fn calling_a_non_callable_value_is_a_type_error() {
    let err = evaluate("<test>", "x = 5\nx()\n").unwrap_err();
    assert!(err.to_string().contains("TypeError"));
}
