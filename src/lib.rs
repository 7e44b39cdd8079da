//! # lumenscript — a small dynamic scripting language core
//!
//! A lexer, a recursive-descent parser, and a tree-walking interpreter for a
//! tiny Python-flavoured expression language that accepts both ASCII and
//! Chinese keyword/operator spellings. The core is a library: it performs no
//! I/O beyond reading the `source_text` handed to it, and it never writes to
//! stdout/stderr on its own.
//!
//! ```
//! let value = lumenscript::evaluate("<script>", "1 + 2 * 3").unwrap();
//! assert_eq!(value.repr_string(), "7");
//! ```
//!
//! `print`/`打印` output is not written anywhere by default — pass a sink
//! with [`evaluate_with_sink`] to capture it, or use [`evaluate_to_stdout`]
//! to have it go to the process's standard output.

mod ast;
mod context;
mod engine;
mod error;
mod immutable_string;
mod parse;
mod position;
mod scope;
mod token;
pub mod value;

pub use ast::{Node, NodeKind, NumberLiteral};
pub use context::Context;
pub use engine::new_global_context;
pub use error::{Error, ErrorKind, TracebackFrame};
pub use immutable_string::ImmutableString;
pub use position::{char_width, str_width, Position};
pub use scope::SymbolTable;
pub use token::{Lexer, Token, TokenKind, TokenValue};
pub use value::{BuiltinFunction, Dict, Key, TypeTag, Value};

/// Lexes, parses, and evaluates a complete source file in one call, against a
/// fresh global context seeded with the built-in type objects, named
/// callables, and the constants `null`/`Inf`/`NaN`.
///
/// Any `print`/`打印` output is discarded. Use [`evaluate_with_sink`] to
/// capture it, or [`evaluate_to_stdout`] to have it written to the process's
/// standard output.
pub fn evaluate(file_name: &str, source_text: &str) -> Result<Value, Box<Error>> {
    evaluate_with_sink(file_name, source_text, &mut |_| {})
}

/// Like [`evaluate`], but `print`/`打印` output is written to `sink` instead
/// of being discarded. `sink` is called once per piece of output text; the
/// core never buffers or flushes on the caller's behalf.
pub fn evaluate_with_sink(
    file_name: &str,
    source_text: &str,
    sink: &mut dyn FnMut(&str),
) -> Result<Value, Box<Error>> {
    let tokens = token::Lexer::new(file_name, source_text).tokenize()?;
    let program = parse::parse(tokens)?;
    let ctx = engine::new_global_context();
    engine::evaluate(&program, &ctx, sink)
}

/// Convenience wrapper for host programs that just want `print`/`打印` output
/// to go to standard output, matching a typical CLI driver's needs. The core
/// itself never does this on its own (see the crate-level docs) — this
/// function is the smallest possible adapter on top of [`evaluate_with_sink`].
pub fn evaluate_to_stdout(file_name: &str, source_text: &str) -> Result<Value, Box<Error>> {
    use std::io::Write;
    evaluate_with_sink(file_name, source_text, &mut |s| {
        print!("{}", s);
        let _ = std::io::stdout().flush();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_evaluates_to_null_with_no_errors() {
        assert!(matches!(evaluate("<t>", ""), Ok(Value::Null)));
    }

    #[test]
    fn evaluate_runs_the_full_pipeline() {
        let value = evaluate("<t>", "1 + 2 * 3").unwrap();
        assert!(matches!(value, Value::Int(7)));
    }

    #[test]
    fn evaluate_with_sink_captures_print_output() {
        let mut out = String::new();
        let value = evaluate_with_sink("<t>", "print(\"hi\")", &mut |s| out.push_str(s)).unwrap();
        assert!(matches!(value, Value::Null));
        assert_eq!(out.trim(), "hi");
    }

    #[test]
    fn plain_evaluate_discards_print_output() {
        // Just needs to not panic or hang; output has nowhere to go.
        assert!(evaluate("<t>", "print(\"swallowed\")").is_ok());
    }

    #[test]
    fn syntax_error_renders_file_and_caret() {
        let err = evaluate("<t>", "1 +").unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("File \"<t>\""));
        assert!(rendered.contains("SyntaxError"));
    }
}
