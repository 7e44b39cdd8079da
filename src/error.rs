//! Module containing error definitions for the lexing, parsing and
//! evaluation process.

use crate::position::{str_width, Position};
use std::error::Error as StdError;
use std::fmt;

/// The closed set of error kinds the core ever raises, one flat enum per
/// diagnostic family rather than a generic/boxed-dyn error story.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Parser or lexer could not consume expected tokens.
    Syntax(String),
    /// Indent/dedent mismatch or missing indented block.
    Indentation(String),
    /// Mixed tabs and spaces in indentation.
    Tab(String),
    /// Atom expected; another token found. Usually rewritten to `Syntax` by
    /// the parser before it escapes to a caller.
    InvalidAtom(String),
    /// Undefined identifier, or `del` on an absent name.
    Name(String),
    /// Operator/subscript/call applied to an unsupported type.
    Type(String),
    /// Missing or unsettable attribute.
    Attribute(String),
    /// Out-of-range sequence index.
    Index(String),
    /// Missing dict key.
    Key(String),
    /// Arithmetic/operator failure (e.g. division by zero).
    Operation(String),
    /// Catch-all wrap for unanticipated native failures surfaced from builtins.
    Runtime(String),
}

impl ErrorKind {
    /// The name this kind renders under, e.g. `TypeError`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Syntax(_) => "SyntaxError",
            Self::Indentation(_) => "IndentationError",
            Self::Tab(_) => "TabError",
            Self::InvalidAtom(_) => "InvalidAtom",
            Self::Name(_) => "NameError",
            Self::Type(_) => "TypeError",
            Self::Attribute(_) => "AttributeError",
            Self::Index(_) => "IndexError",
            Self::Key(_) => "KeyError",
            Self::Operation(_) => "OperationError",
            Self::Runtime(_) => "RuntimeError",
        }
    }

    fn details(&self) -> &str {
        match self {
            Self::Syntax(s)
            | Self::Indentation(s)
            | Self::Tab(s)
            | Self::InvalidAtom(s)
            | Self::Name(s)
            | Self::Type(s)
            | Self::Attribute(s)
            | Self::Index(s)
            | Self::Key(s)
            | Self::Operation(s)
            | Self::Runtime(s) => s,
        }
    }
}

/// A single traceback frame: the display name of a context and the position
/// in its parent where it was entered, oldest-frame-first in [`Error::traceback`].
#[derive(Debug, Clone)]
pub struct TracebackFrame {
    pub display_name: String,
    pub call_position: Position,
}

/// A single diagnostic: a kind, the span it occurred at, and (for runtime
/// errors) the context chain that was active when it was raised.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub pos_start: Position,
    pub pos_end: Position,
    pub traceback: Vec<TracebackFrame>,
}

impl Error {
    /// Builds a lex/parse-phase error: no traceback, since no context chain
    /// exists yet at that stage.
    #[must_use]
    pub fn lex(kind: ErrorKind, pos_start: Position, pos_end: Position) -> Self {
        Self {
            kind,
            pos_start,
            pos_end,
            traceback: Vec::new(),
        }
    }

    /// Builds a runtime error carrying the given traceback, oldest frame first.
    #[must_use]
    pub fn runtime(
        kind: ErrorKind,
        pos_start: Position,
        pos_end: Position,
        traceback: Vec<TracebackFrame>,
    ) -> Self {
        Self {
            kind,
            pos_start,
            pos_end,
            traceback,
        }
    }

    fn render_location(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  File \"{}\", line {}",
            self.pos_start.file_name,
            self.pos_start.line + 1
        )?;
        let line = self.pos_start.source_line();
        writeln!(f, "    {}", line)?;

        // `column` counts characters, not bytes, so slice a char vector
        // rather than the raw `&str` — a byte slice would panic or
        // misalign on any non-ASCII source line.
        let line_chars: Vec<char> = line.chars().collect();
        let start_col = self.pos_start.column.min(line_chars.len());
        let indent = str_width(&line_chars[..start_col].iter().collect::<String>());
        let span_width = if self.pos_end.line == self.pos_start.line {
            let end_col = self.pos_end.column.min(line_chars.len()).max(start_col);
            str_width(&line_chars[start_col..end_col].iter().collect::<String>()).max(1)
        } else {
            1
        };
        writeln!(
            f,
            "    {}{}",
            " ".repeat(indent),
            "^".repeat(span_width)
        )
    }
}

impl StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.traceback.is_empty() {
            writeln!(f, "Traceback (most recent call last):")?;
            for frame in &self.traceback {
                writeln!(
                    f,
                    "  File \"{}\", line {}, in {}",
                    frame.call_position.file_name,
                    frame.call_position.line + 1,
                    frame.display_name
                )?;
            }
        }
        self.render_location(f)?;
        write!(f, "{}: {}", self.kind.name(), self.kind.details())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn pos(index: usize, line: usize, column: usize) -> Position {
        Position {
            index,
            line,
            column,
            file_name: Rc::from("<test>"),
            source_text: Rc::from("1 / 0\n"),
        }
    }

    #[test]
    fn lex_error_renders_file_line_and_caret() {
        let err = Error::lex(
            ErrorKind::Operation("division by zero".into()),
            pos(2, 0, 2),
            pos(3, 0, 3),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("File \"<test>\", line 1"));
        assert!(rendered.contains("1 / 0"));
        assert!(rendered.contains("OperationError: division by zero"));
    }

    #[test]
    fn runtime_error_includes_traceback_header() {
        let err = Error::runtime(
            ErrorKind::Name("x".into()),
            pos(0, 0, 0),
            pos(1, 0, 1),
            vec![TracebackFrame {
                display_name: "<module>".into(),
                call_position: pos(0, 0, 0),
            }],
        );
        let rendered = err.to_string();
        assert!(rendered.starts_with("Traceback (most recent call last):"));
        assert!(rendered.contains("NameError: x"));
    }

    #[test]
    fn caret_rendering_does_not_panic_on_cjk_source() {
        let source: Rc<str> = Rc::from("打印（ 你好 ）\n");
        let start = Position {
            index: 0,
            line: 0,
            column: 0,
            file_name: Rc::from("<test>"),
            source_text: source.clone(),
        };
        let end = Position {
            index: 2,
            line: 0,
            column: 2,
            file_name: Rc::from("<test>"),
            source_text: source,
        };
        let err = Error::lex(ErrorKind::Syntax("bad token".into()), start, end);
        let rendered = err.to_string();
        assert!(rendered.contains("打印（ 你好 ）"));
        assert!(rendered.contains("SyntaxError: bad token"));
    }

    #[test]
    fn error_kind_name_matches_spec_variant_names() {
        assert_eq!(ErrorKind::Syntax(String::new()).name(), "SyntaxError");
        assert_eq!(ErrorKind::Tab(String::new()).name(), "TabError");
        assert_eq!(ErrorKind::Key(String::new()).name(), "KeyError");
    }
}
