use lumenscript::{evaluate, Value};

fn string(src: &str) -> String {
    match evaluate("<test>", src).unwrap() {
        Value::String(s) => s.as_str().to_string(),
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn single_and_double_quoted_strings() {
    assert_eq!(string("'hello'"), "hello");
    assert_eq!(string("\"hello\""), "hello");
}

#[test]
fn backtick_strings_do_not_process_escapes() {
    assert_eq!(string("`a\\nb`"), "a\\nb");
}

#[test]
fn backslash_escapes_in_quoted_strings() {
    assert_eq!(string("\"a\\nb\""), "a\nb");
    assert_eq!(string("\"a\\tb\""), "a\tb");
    assert_eq!(string("\"a\\\"b\""), "a\"b");
}

#[test]
fn curly_quotes_are_an_alternate_delimiter() {
    assert_eq!(string("\u{201c}hello\u{201d}"), "hello");
}

#[test]
fn indexing_a_string_yields_a_single_character_string() {
    assert_eq!(string("\"hello\"[1]"), "e");
}

#[test]
fn negative_index_counts_from_the_end() {
    assert_eq!(string("\"hello\"[-1]"), "o");
}

#[test]
fn slicing_a_string() {
    assert_eq!(string("\"hello\"[1:3]"), "el");
    assert_eq!(string("\"hello\"[:2]"), "he");
    assert_eq!(string("\"hello\"[2:]"), "llo");
}

#[test]
fn out_of_range_index_is_index_error() {
    let err = evaluate("<test>", "\"hi\"[10]").unwrap_err();
    assert!(err.to_string().contains("IndexError"));
}

#[test]
fn len_builtin_counts_characters() {
    assert!(matches!(evaluate("<test>", "len(\"hello\")").unwrap(), Value::Int(5)));
}
