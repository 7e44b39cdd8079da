use lumenscript::{evaluate, Value};

#[test]
fn cjk_keywords_mix_freely_with_ascii_in_one_source_file() {
    let src = "x = 5\n如果 x 大于 3:\n    打印(\"big\")\n    y = 真\n否则:\n    y = 假\ny\n";
    let mut out = String::new();
    let value =
        lumenscript::evaluate_with_sink("<test>", src, &mut |s| out.push_str(s)).unwrap();
    assert!(matches!(value, Value::Bool(true)));
    assert_eq!(out, "big\n");
}

#[test]
fn cjk_assignment_operator_赋值() {
    let value = evaluate("<test>", "x 赋值 10\nx\n").unwrap();
    assert!(matches!(value, Value::Int(10)));
}

#[test]
fn cjk_equality_operator_为_means_double_equals() {
    assert!(matches!(evaluate("<test>", "10 为 10").unwrap(), Value::Bool(true)));
}

#[test]
fn cjk_del_keyword() {
    let err = evaluate("<test>", "x = 1\n删除 x\nx\n").unwrap_err();
    assert!(err.to_string().contains("NameError"));
}

#[test]
fn cjk_pass_and_not_keywords() {
    assert!(matches!(evaluate("<test>", "非 假").unwrap(), Value::Bool(true)));
}

#[test]
fn cjk_numeric_comparison_operators() {
    assert!(matches!(evaluate("<test>", "3 小于等于 3").unwrap(), Value::Bool(true)));
    assert!(matches!(evaluate("<test>", "3 大于等于 4").unwrap(), Value::Bool(false)));
}

#[test]
fn error_on_cjk_source_renders_caret_without_panicking() {
    // Exercises the caret-rendering path (source_line + column math) against
    // a line carrying multi-byte characters before the offending span.
    let err = evaluate("<test>", "打印（ 1 + ）\n").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("File \"<test>\""));
    assert!(rendered.contains("打印（ 1 + ）"));
}

#[test]
fn cjk_if_example_from_spec_prints_and_returns_null() {
    let mut out = String::new();
    let value = lumenscript::evaluate_with_sink(
        "<test>",
        "若 真 ： 打印（ “你好” ）\n",
        &mut |s| out.push_str(s),
    )
    .unwrap();
    assert!(matches!(value, Value::Null));
    assert_eq!(out, "你好\n");
}
