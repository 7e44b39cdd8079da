//! Main module defining the lexer: converts source text into a stream of
//! position-tagged [`Token`]s, synthesising `INDENT`/`DEDENT`/`NEWLINE` from
//! layout the way the reference tokenizer does.

use crate::error::{Error, ErrorKind};
use crate::immutable_string::ImmutableString;
use crate::position::Position;
use std::rc::Rc;

/// The closed set of token kinds the lexer ever produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural / layout
    Newline,
    Nl,
    Indent,
    Dedent,
    EndMarker,

    // Literals
    Number,
    String,
    Name,

    // Grouping and separators
    LPar,
    RPar,
    LSqb,
    RSqb,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semi,
    Dot,
    Question,
    At,

    // Arithmetic
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,

    // Bitwise
    Amper,
    Vbar,
    Circumflex,
    Tilde,
    LeftShift,
    RightShift,

    // Logical
    DoubleAmper,
    DoubleVbar,
    Exclamation,

    // Comparison
    Equal,
    EqEqual,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Augmented assignment
    PlusEqual,
    MinusEqual,
    StarEqual,
    DoubleStarEqual,
    SlashEqual,
    DoubleSlashEqual,
    PercentEqual,
    AmperEqual,
    VbarEqual,
    CircumflexEqual,
    LeftShiftEqual,
    RightShiftEqual,
    AtEqual,
}

impl TokenKind {
    /// If this is an augmented-assignment kind (`+=`, `&=`, ...), the plain
    /// operator kind it rewrites to (`+`, `&`, ...).
    #[must_use]
    pub fn unaugmented(self) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match self {
            PlusEqual => Plus,
            MinusEqual => Minus,
            StarEqual => Star,
            DoubleStarEqual => DoubleStar,
            SlashEqual => Slash,
            DoubleSlashEqual => DoubleSlash,
            PercentEqual => Percent,
            AmperEqual => Amper,
            VbarEqual => Vbar,
            CircumflexEqual => Circumflex,
            LeftShiftEqual => LeftShift,
            RightShiftEqual => RightShift,
            AtEqual => At,
            _ => return None,
        })
    }

    #[must_use]
    pub fn is_assignment(self) -> bool {
        self == TokenKind::Equal || self.unaugmented().is_some()
    }

    /// The canonical ASCII spelling of an operator kind, used in diagnostics
    /// (e.g. `TypeError: unsupported operand type(s) for '-': ...`).
    #[must_use]
    pub fn symbol(self) -> &'static str {
        use TokenKind::*;
        match self {
            Newline => "NEWLINE",
            Nl => "NL",
            Indent => "INDENT",
            Dedent => "DEDENT",
            EndMarker => "ENDMARKER",
            Number => "NUMBER",
            String => "STRING",
            Name => "NAME",
            LPar => "(",
            RPar => ")",
            LSqb => "[",
            RSqb => "]",
            LBrace => "{",
            RBrace => "}",
            Comma => ",",
            Colon => ":",
            Semi => ";",
            Dot => ".",
            Question => "?",
            At => "@",
            Plus => "+",
            Minus => "-",
            Star => "*",
            DoubleStar => "**",
            Slash => "/",
            DoubleSlash => "//",
            Percent => "%",
            Amper => "&",
            Vbar => "|",
            Circumflex => "^",
            Tilde => "~",
            LeftShift => "<<",
            RightShift => ">>",
            DoubleAmper => "&&",
            DoubleVbar => "||",
            Exclamation => "!",
            Equal => "=",
            EqEqual => "==",
            NotEqual => "!=",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            DoubleStarEqual => "**=",
            SlashEqual => "/=",
            DoubleSlashEqual => "//=",
            PercentEqual => "%=",
            AmperEqual => "&=",
            VbarEqual => "|=",
            CircumflexEqual => "^=",
            LeftShiftEqual => "<<=",
            RightShiftEqual => ">>=",
            AtEqual => "@=",
        }
    }
}

/// The payload a [`Token`] carries, when its kind needs one.
#[derive(Debug, Clone)]
pub enum TokenValue {
    None,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(ImmutableString),
    /// Indent depth (stack size after the change), carried by `INDENT`/`DEDENT`.
    Depth(usize),
}

/// A single lexical token: a kind, an optional value, and the span it came from.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub pos_start: Position,
    pub pos_end: Position,
}

impl Token {
    fn new(kind: TokenKind, value: TokenValue, pos_start: Position, pos_end: Position) -> Self {
        Self {
            kind,
            value,
            pos_start,
            pos_end,
        }
    }

    /// The token's source text as a `NAME`/keyword value, if it carries one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Str(s) if self.kind == TokenKind::Name => Some(s.as_str()),
            _ => None,
        }
    }
}

const NUMBER_SEPARATOR: char = '_';
/// Full-width punctuation reserved by the grammar; excluded from identifiers
/// even though every one of them is a non-ASCII codepoint.
const RESERVED_PUNCTUATION: &[char] = &['（', '）', '“', '”', '：', '，'];

fn is_identifier_start(c: char) -> bool {
    if RESERVED_PUNCTUATION.contains(&c) {
        return false;
    }
    c.is_ascii_alphabetic() || c == '_' || c == '$' || !c.is_ascii()
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

fn keyword_binding(name: &str) -> Option<(TokenKind, TokenValue)> {
    Some(match name {
        "true" | "真" => (TokenKind::Number, TokenValue::Bool(true)),
        "false" | "假" => (TokenKind::Number, TokenValue::Bool(false)),
        "and" => (TokenKind::DoubleAmper, TokenValue::None),
        "or" => (TokenKind::DoubleVbar, TokenValue::None),
        "not" => (TokenKind::Exclamation, TokenValue::None),
        _ => return None,
    })
}

/// Lexes a whole source file into a token stream ending in exactly one `ENDMARKER`.
pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    indents: Vec<usize>,
    indent_char: Option<char>,
}

impl Lexer {
    #[must_use]
    pub fn new(file_name: &str, source_text: &str) -> Self {
        let file_name: Rc<str> = Rc::from(file_name);
        let source_text: Rc<str> = Rc::from(source_text);
        Self {
            chars: source_text.chars().collect(),
            pos: Position::start(file_name, source_text),
            indents: Vec::new(),
            indent_char: None,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos.index).copied()
    }

    fn lookahead(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos.index + offset).copied()
    }

    fn advance(&mut self) {
        let c = self.current();
        self.pos.advance(c);
    }

    fn error(&self, kind: ErrorKind, start: Position, end: Position) -> Box<Error> {
        Box::new(Error::lex(kind, start, end))
    }

    /// Runs the full tokenizer over the source, returning the token stream.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Box<Error>> {
        let mut tokens = Vec::new();
        let mut bracket_depth: usize = 0;

        while let Some(c) = self.current() {
            if c == '#' {
                self.skip_comment();
                continue;
            }

            // Backslash-newline and newlines nested inside open brackets are
            // layout-invisible: emit `NL` and keep the logical line open,
            // without touching the indent stack.
            if c == '\\' && self.lookahead(1) == Some('\n') {
                let start = self.pos.clone();
                self.advance();
                self.advance();
                tokens.push(Token::new(TokenKind::Nl, TokenValue::None, start, self.pos.clone()));
                continue;
            }
            if c == '\n' && bracket_depth > 0 {
                let start = self.pos.clone();
                self.advance();
                tokens.push(Token::new(TokenKind::Nl, TokenValue::None, start, self.pos.clone()));
                continue;
            }

            if tokens.is_empty() || c == '\n' {
                let layout = self.scan_layout(tokens.is_empty())?;
                if !tokens.is_empty() {
                    tokens.push(Token::new(
                        TokenKind::Newline,
                        TokenValue::None,
                        self.pos.clone(),
                        self.pos.clone(),
                    ));
                }
                if !layout.is_empty() {
                    if tokens.is_empty() {
                        return Err(self.error(
                            ErrorKind::Indentation("unexpected indent".into()),
                            self.pos.clone(),
                            self.pos.clone(),
                        ));
                    }
                    tokens.extend(layout);
                }
                if !tokens.is_empty() && self.is_blank_rest_of_line() {
                    self.advance();
                    continue;
                }
            }

            let c = match self.current() {
                Some(c) => c,
                None => break,
            };

            if c == ' ' {
                self.advance();
                continue;
            }

            if bracket_opens(c).is_some() {
                bracket_depth += 1;
            } else if bracket_closes(c) {
                bracket_depth = bracket_depth.saturating_sub(1);
            }

            let token = if (c.is_ascii_digit() && c != '.')
                || (c == '.' && self.lookahead(1).map_or(false, |d| d.is_ascii_digit()))
            {
                self.scan_number()?
            } else if let Some(tok) = self.scan_operator()? {
                tok
            } else if is_string_delimiter(c) {
                self.scan_string(c)?
            } else if is_identifier_start(c) {
                self.scan_name()
            } else {
                let start = self.pos.clone();
                self.advance();
                return Err(self.error(
                    ErrorKind::Syntax(format!("invalid character '{}' (U+{:04X})", c, c as u32)),
                    start,
                    self.pos.clone(),
                ));
            };
            tokens.push(token);
        }

        while self.indents.pop().is_some() {
            tokens.push(Token::new(
                TokenKind::Dedent,
                TokenValue::Depth(self.indents.len()),
                self.pos.clone(),
                self.pos.clone(),
            ));
        }

        // A NEWLINE immediately before a DEDENT swaps; consecutive NEWLINEs collapse.
        let mut i = 0isize;
        while (i as usize) < tokens.len().saturating_sub(1) {
            let idx = i as usize;
            if tokens[idx].kind == TokenKind::Newline && tokens[idx + 1].kind == TokenKind::Dedent
            {
                tokens.swap(idx, idx + 1);
            } else if tokens[idx].kind == TokenKind::Newline
                && tokens[idx + 1].kind == TokenKind::Newline
            {
                tokens.remove(idx + 1);
                i -= 1;
            }
            i += 1;
        }

        tokens.push(Token::new(
            TokenKind::EndMarker,
            TokenValue::None,
            self.pos.clone(),
            self.pos.clone(),
        ));
        Ok(tokens)
    }

    fn skip_comment(&mut self) {
        self.advance();
        while let Some(c) = self.current() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// True when, from the current `\n`, only spaces/tabs follow before the
    /// next `\n` or EOF — a blank logical line the lexer must not terminate.
    fn is_blank_rest_of_line(&self) -> bool {
        let mut i = 1;
        while matches!(self.lookahead(i), Some(' ') | Some('\t')) {
            i += 1;
        }
        matches!(self.lookahead(i), None | Some('\n'))
    }

    /// Measures the new line's indent and emits the `INDENT`/`DEDENT` tokens
    /// needed to reconcile it with the indent stack.
    fn scan_layout(&mut self, at_start_of_file: bool) -> Result<Vec<Token>, Box<Error>> {
        if !at_start_of_file && self.current() == Some('\n') {
            self.advance();
        }

        let mut width = 0usize;
        let start = self.pos.clone();
        while matches!(self.current(), Some(' ') | Some('\t')) {
            let c = self.current().unwrap();
            match self.indent_char {
                None => self.indent_char = Some(c),
                Some(expected) if expected != c => {
                    return Err(self.error(
                        ErrorKind::Tab(
                            "inconsistent use of tabs and spaces in indentation".into(),
                        ),
                        self.pos.clone(),
                        self.pos.clone(),
                    ))
                }
                _ => {}
            }
            width += 1;
            self.advance();
        }

        let mut out = Vec::new();
        while let Some(&top) = self.indents.last() {
            if width >= top {
                break;
            }
            self.indents.pop();
            out.push(Token::new(
                TokenKind::Dedent,
                TokenValue::Depth(self.indents.len()),
                self.pos.clone(),
                self.pos.clone(),
            ));
        }

        if width > 0 {
            let mut push_indent = !self.indents.contains(&width);
            if self.current() == Some('\n') {
                push_indent = false;
            }
            if self.indents.last().map_or(true, |&top| width > top) {
                self.indents.push(width);
            }
            if push_indent {
                out.push(Token::new(
                    TokenKind::Indent,
                    TokenValue::Depth(self.indents.len()),
                    start,
                    self.pos.clone(),
                ));
            }
        }
        Ok(out)
    }

    fn scan_number(&mut self) -> Result<Token, Box<Error>> {
        let start = self.pos.clone();
        let radix = if self.current() == Some('0') && self.lookahead(1) == Some('b') {
            self.advance();
            self.advance();
            2
        } else if self.current() == Some('0') && self.lookahead(1) == Some('x') {
            self.advance();
            self.advance();
            16
        } else {
            10
        };

        let digit_start = self.pos.clone();
        let mut digits = String::new();
        let mut is_float = false;
        while let Some(c) = self.current() {
            if c == NUMBER_SEPARATOR {
                self.advance();
                continue;
            }
            if c == '.' {
                if radix != 10 {
                    break;
                }
                is_float = true;
                digits.push(c);
                self.advance();
                continue;
            }
            if c.is_ascii_alphanumeric() {
                let valid = match radix {
                    2 => matches!(c, '0' | '1'),
                    16 => c.is_ascii_hexdigit(),
                    _ => c.is_ascii_digit(),
                };
                if !valid {
                    self.advance();
                    return Err(self.error(
                        ErrorKind::Syntax(format!("invalid {} literal", radix_name(radix))),
                        digit_start,
                        self.pos.clone(),
                    ));
                }
                digits.push(c);
                self.advance();
                continue;
            }
            break;
        }

        if digits.is_empty() || digits == "." {
            self.advance();
            return Err(self.error(
                ErrorKind::Syntax(format!("invalid {} literal", radix_name(radix))),
                digit_start,
                self.pos.clone(),
            ));
        }

        let value = if is_float {
            let f: f64 = digits.parse().map_err(|_| {
                self.error(
                    ErrorKind::Syntax("invalid decimal literal".into()),
                    start.clone(),
                    self.pos.clone(),
                )
            })?;
            TokenValue::Float(f)
        } else {
            let n = i64::from_str_radix(&digits, radix).map_err(|_| {
                self.error(
                    ErrorKind::Syntax(format!("invalid {} literal", radix_name(radix))),
                    start.clone(),
                    self.pos.clone(),
                )
            })?;
            TokenValue::Int(n)
        };
        Ok(Token::new(TokenKind::Number, value, start, self.pos.clone()))
    }

    /// Tries to match the longest ASCII/CJK operator prefix at the cursor.
    /// Returns `Ok(None)` when the current character starts no operator, so
    /// the caller can fall back to identifier scanning.
    fn scan_operator(&mut self) -> Result<Option<Token>, Box<Error>> {
        use TokenKind::*;
        let start = self.pos.clone();
        let c = match self.current() {
            Some(c) => c,
            None => return Ok(None),
        };
        let n1 = self.lookahead(1);
        let n2 = self.lookahead(2);
        let n3 = self.lookahead(3);

        let (kind, len): (TokenKind, usize) = match c {
            '+' => match n1 {
                Some('=') => (PlusEqual, 2),
                _ => (Plus, 1),
            },
            '-' => match n1 {
                Some('=') => (MinusEqual, 2),
                _ => (Minus, 1),
            },
            '*' => match (n1, n2) {
                (Some('*'), Some('=')) => (DoubleStarEqual, 3),
                (Some('*'), _) => (DoubleStar, 2),
                (Some('='), _) => (StarEqual, 2),
                _ => (Star, 1),
            },
            '/' => match (n1, n2) {
                (Some('/'), Some('=')) => (DoubleSlashEqual, 3),
                (Some('/'), _) => (DoubleSlash, 2),
                (Some('='), _) => (SlashEqual, 2),
                _ => (Slash, 1),
            },
            '%' => match n1 {
                Some('=') => (PercentEqual, 2),
                _ => (Percent, 1),
            },
            '@' => match n1 {
                Some('=') => (AtEqual, 2),
                _ => (At, 1),
            },
            '&' => match n1 {
                Some('&') => (DoubleAmper, 2),
                Some('=') => (AmperEqual, 2),
                _ => (Amper, 1),
            },
            '|' => match n1 {
                Some('|') => (DoubleVbar, 2),
                Some('=') => (VbarEqual, 2),
                _ => (Vbar, 1),
            },
            '^' => match n1 {
                Some('=') => (CircumflexEqual, 2),
                _ => (Circumflex, 1),
            },
            '~' | '～' => (Tilde, 1),
            '<' => match (n1, n2) {
                (Some('<'), Some('=')) => (LeftShiftEqual, 3),
                (Some('<'), _) => (LeftShift, 2),
                (Some('='), _) => (LessEqual, 2),
                (Some('>'), _) => (NotEqual, 2),
                _ => (Less, 1),
            },
            '>' => match (n1, n2) {
                (Some('>'), Some('=')) => (RightShiftEqual, 3),
                (Some('>'), _) => (RightShift, 2),
                (Some('='), _) => (GreaterEqual, 2),
                _ => (Greater, 1),
            },
            '=' => match n1 {
                Some('=') => (EqEqual, 2),
                _ => (Equal, 1),
            },
            '!' => match n1 {
                Some('=') => (NotEqual, 2),
                _ => (Exclamation, 1),
            },
            '(' | '（' => (LPar, 1),
            ')' | '）' => (RPar, 1),
            '[' => (LSqb, 1),
            ']' => (RSqb, 1),
            '{' => (LBrace, 1),
            '}' => (RBrace, 1),
            ',' | '，' => (Comma, 1),
            ';' => (Semi, 1),
            ':' | '：' => (Colon, 1),
            '?' | '？' => (Question, 1),
            '.' => (Dot, 1),
            '与' => (DoubleAmper, 1),
            '或' => (DoubleVbar, 1),
            '非' => (Exclamation, 1),
            '赋' => match n1 {
                Some('值') => (Equal, 2),
                _ => return Ok(None),
            },
            '为' => (EqEqual, 1),
            '等' => match n1 {
                Some('于') => (EqEqual, 2),
                _ => return Ok(None),
            },
            '不' => match (n1, n2) {
                (Some('为'), _) => (NotEqual, 2),
                (Some('等'), Some('于')) => (NotEqual, 3),
                _ => return Ok(None),
            },
            '小' => match (n1, n2, n3) {
                (Some('于'), Some('等'), Some('于')) => (LessEqual, 4),
                (Some('于'), _, _) => (Less, 2),
                _ => return Ok(None),
            },
            '大' => match (n1, n2, n3) {
                (Some('于'), Some('等'), Some('于')) => (GreaterEqual, 4),
                (Some('于'), _, _) => (Greater, 2),
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };

        for _ in 0..len {
            self.advance();
        }
        Ok(Some(Token::new(
            kind,
            TokenValue::None,
            start,
            self.pos.clone(),
        )))
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, Box<Error>> {
        let start = self.pos.clone();
        let is_cjk = quote == '“' || quote == '”';
        let closes = |c: char| if is_cjk { c == '“' || c == '”' } else { c == quote };
        self.advance();

        let mut out = String::new();
        loop {
            let c = match self.current() {
                Some(c) => c,
                None => {
                    return Err(self.error(
                        ErrorKind::Syntax(format!(
                            "unterminated string literal (expected '{}')",
                            quote
                        )),
                        self.pos.clone(),
                        self.pos.clone(),
                    ))
                }
            };
            if c == '\n' {
                return Err(self.error(
                    ErrorKind::Syntax(format!(
                        "unterminated string literal (expected '{}')",
                        quote
                    )),
                    self.pos.clone(),
                    self.pos.clone(),
                ));
            }
            if closes(c) {
                break;
            }
            if c == '\\' && quote != '`' {
                self.advance();
                let escaped = match self.current() {
                    Some(e) => e,
                    None => {
                        return Err(self.error(
                            ErrorKind::Syntax("unterminated string literal".into()),
                            self.pos.clone(),
                            self.pos.clone(),
                        ))
                    }
                };
                out.push(escape_char(escaped));
                self.advance();
                continue;
            }
            out.push(c);
            self.advance();
        }
        self.advance();
        Ok(Token::new(
            TokenKind::String,
            TokenValue::Str(out.into()),
            start,
            self.pos.clone(),
        ))
    }

    fn scan_name(&mut self) -> Token {
        let start = self.pos.clone();
        let mut name = String::new();
        name.push(self.current().expect("caller checked is_identifier_start"));
        self.advance();
        while let Some(c) = self.current() {
            if !is_identifier_continue(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        if let Some((kind, value)) = keyword_binding(&name) {
            return Token::new(kind, value, start, self.pos.clone());
        }
        Token::new(
            TokenKind::Name,
            TokenValue::Str(name.into()),
            start,
            self.pos.clone(),
        )
    }
}

fn bracket_opens(c: char) -> Option<char> {
    match c {
        '(' | '（' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn bracket_closes(c: char) -> bool {
    matches!(c, ')' | '）' | ']' | '}')
}

fn is_string_delimiter(c: char) -> bool {
    matches!(c, '"' | '\'' | '`' | '“' | '”')
}

fn escape_char(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'a' => '\u{7}',
        'v' => '\u{b}',
        'r' => '\r',
        '\\' => '\\',
        other => other,
    }
}

fn radix_name(radix: u32) -> &'static str {
    match radix {
        2 => "binary",
        16 => "hexadecimal",
        _ => "decimal",
    }
}
