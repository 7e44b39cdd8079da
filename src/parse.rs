//! Recursive-descent parser: turns a token stream into a [`Node`] tree.

use crate::ast::{DictEntry, IfCase, KeywordArg, Node, NodeKind, NumberLiteral};
use crate::error::{Error, ErrorKind};
use crate::immutable_string::ImmutableString;
use crate::position::Position;
use crate::token::{Token, TokenKind, TokenValue};

const IF_WORDS: &[&str] = &["if", "若", "如果"];
const ELIF_WORDS: &[&str] = &["elif", "又若", "又如"];
const ELSE_WORDS: &[&str] = &["else", "否则", "不然"];
const DEL_WORDS: &[&str] = &["del", "删除"];
const PASS_WORDS: &[&str] = &["pass"];
const EXIT_WORDS: &[&str] = &["exit"];

/// Parses a complete token stream (as produced by [`crate::token::Lexer`])
/// into a `Program` node.
pub fn parse(tokens: Vec<Token>) -> Result<Node, Box<Error>> {
    let tokens: Vec<Token> = tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Nl)
        .collect();
    Parser { tokens, pos: 0 }.parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// The token `offset` positions ahead of `current`, clamped to the last token.
    fn peek(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, Box<Error>> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.current().clone();
            Err(Box::new(Error::lex(
                ErrorKind::Syntax(format!("expected {}", what)),
                tok.pos_start,
                tok.pos_end,
            )))
        }
    }

    fn at_keyword(&self, words: &[&str]) -> bool {
        self.current()
            .name()
            .map_or(false, |n| words.contains(&n))
    }

    /// Skips a single `NEWLINE` when the token right after it is one of `words`.
    ///
    /// The lexer's NEWLINE/DEDENT swap leaves exactly such a `NEWLINE` sitting
    /// between an indented block and the `elif`/`else` that dedents back to it;
    /// without this the keyword check below sees `NEWLINE` instead of the keyword.
    fn skip_newline_before_keyword(&mut self, words: &[&str]) {
        if self.check(TokenKind::Newline) && self.peek(1).name().map_or(false, |n| words.contains(&n)) {
            self.advance();
        }
    }

    fn expect_keyword(&mut self, words: &[&str]) -> Result<Token, Box<Error>> {
        if self.at_keyword(words) {
            Ok(self.advance())
        } else {
            let tok = self.current().clone();
            Err(Box::new(Error::lex(
                ErrorKind::Syntax(format!("expected one of {:?}", words)),
                tok.pos_start,
                tok.pos_end,
            )))
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    // ---- program / statement structure ----

    fn parse_program(&mut self) -> Result<Node, Box<Error>> {
        let start = self.current().pos_start.clone();
        self.skip_newlines();
        let mut stmts = Vec::new();
        while !self.check(TokenKind::EndMarker) {
            self.parse_statement_line(&mut stmts)?;
            if self.check(TokenKind::EndMarker) {
                break;
            }
            self.expect(TokenKind::Newline, "newline")?;
            self.skip_newlines();
        }
        let end = self.current().pos_end.clone();
        Ok(Node::new(NodeKind::Program(stmts), start, end))
    }

    fn parse_block_statements(&mut self) -> Result<Vec<Node>, Box<Error>> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.check(TokenKind::Dedent) && !self.check(TokenKind::EndMarker) {
            self.parse_statement_line(&mut stmts)?;
            if self.check(TokenKind::Newline) {
                self.advance();
                self.skip_newlines();
            } else {
                break;
            }
        }
        Ok(stmts)
    }

    /// Parses the body of an `if`/`elif`/`else` arm: either a same-line
    /// `simple_stmts`, or a `NEWLINE INDENT statements DEDENT` group.
    fn parse_block(&mut self) -> Result<Node, Box<Error>> {
        let start = self.current().pos_start.clone();
        if self.check(TokenKind::Newline) {
            self.advance();
            if !self.check(TokenKind::Indent) {
                let tok = self.current().clone();
                return Err(Box::new(Error::lex(
                    ErrorKind::Indentation("expected an indented block".into()),
                    tok.pos_start,
                    tok.pos_end,
                )));
            }
            self.advance();
            let stmts = self.parse_block_statements()?;
            let end = self.current().pos_end.clone();
            if !self.check(TokenKind::Dedent) {
                return Err(Box::new(Error::lex(
                    ErrorKind::Indentation("unexpected indent".into()),
                    self.current().pos_start.clone(),
                    self.current().pos_end.clone(),
                )));
            }
            self.advance();
            Ok(Node::new(NodeKind::Program(stmts), start, end))
        } else {
            let mut stmts = Vec::new();
            self.parse_statement_line(&mut stmts)?;
            let end = stmts
                .last()
                .map_or_else(|| start.clone(), |s| s.pos_end.clone());
            Ok(Node::new(NodeKind::Program(stmts), start, end))
        }
    }

    fn parse_statement_line(&mut self, out: &mut Vec<Node>) -> Result<(), Box<Error>> {
        if self.at_keyword(IF_WORDS) {
            out.push(self.parse_if_stmt()?);
            return Ok(());
        }
        loop {
            out.push(self.parse_simple_stmt()?);
            if self.check(TokenKind::Semi) {
                self.advance();
                if self.check(TokenKind::Newline)
                    || self.check(TokenKind::EndMarker)
                    || self.check(TokenKind::Dedent)
                {
                    break;
                }
                continue;
            }
            break;
        }
        Ok(())
    }

    fn parse_if_stmt(&mut self) -> Result<Node, Box<Error>> {
        let start = self.expect_keyword(IF_WORDS)?.pos_start;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Colon, "':'")?;
        let body = self.parse_block()?;
        let mut end = body.pos_end.clone();
        let mut cases = vec![IfCase { condition, body }];

        self.skip_newline_before_keyword(ELIF_WORDS);
        while self.at_keyword(ELIF_WORDS) {
            self.advance();
            let condition = self.parse_expr()?;
            self.expect(TokenKind::Colon, "':'")?;
            let body = self.parse_block()?;
            end = body.pos_end.clone();
            cases.push(IfCase { condition, body });
            self.skip_newline_before_keyword(ELIF_WORDS);
        }

        self.skip_newline_before_keyword(ELSE_WORDS);
        let else_body = if self.at_keyword(ELSE_WORDS) {
            self.advance();
            self.expect(TokenKind::Colon, "':'")?;
            let body = self.parse_block()?;
            end = body.pos_end.clone();
            Some(Box::new(body))
        } else {
            None
        };

        Ok(Node::new(
            NodeKind::If {
                is_expression: false,
                cases,
                else_body,
            },
            start,
            end,
        ))
    }

    fn parse_del_stmt(&mut self) -> Result<Node, Box<Error>> {
        let start = self.expect_keyword(DEL_WORDS)?.pos_start;
        let first = self.expect(TokenKind::Name, "a name")?;
        let mut end = first.pos_end.clone();
        let mut names = vec![ImmutableString::from(first.name().unwrap())];
        while self.check(TokenKind::Comma) {
            self.advance();
            let tok = self.expect(TokenKind::Name, "a name")?;
            end = tok.pos_end.clone();
            names.push(ImmutableString::from(tok.name().unwrap()));
        }
        Ok(Node::new(NodeKind::VarDelete(names), start, end))
    }

    fn parse_simple_stmt(&mut self) -> Result<Node, Box<Error>> {
        if self.at_keyword(DEL_WORDS) {
            return self.parse_del_stmt();
        }
        if self.at_keyword(PASS_WORDS) {
            let tok = self.advance();
            return Ok(Node::new(NodeKind::Pass, tok.pos_start, tok.pos_end));
        }

        // Bounded, one-point backtracking: try a primary; if followed by an
        // assignment operator, commit to an assignment. Otherwise rewind and
        // parse a plain expression statement.
        let checkpoint = self.pos;
        if let Ok(primary) = self.parse_primary() {
            if self.current().kind.is_assignment() {
                return self.finish_assignment(primary);
            }
        }
        self.pos = checkpoint;
        self.parse_expr()
    }

    fn finish_assignment(&mut self, first_target: Node) -> Result<Node, Box<Error>> {
        let start = first_target.pos_start.clone();
        let op_kind = self.current().kind;

        if op_kind != TokenKind::Equal {
            self.advance();
            let rhs = self.parse_expr()?;
            let op = op_kind.unaugmented().expect("checked is_assignment");
            let read_side = first_target.clone();
            let start2 = first_target.pos_start.clone();
            let end = rhs.pos_end.clone();
            let combined = Node::new(
                NodeKind::BinaryOp(Box::new(read_side), op, Box::new(rhs)),
                start2,
                end.clone(),
            );
            return self.build_assign_node(first_target, combined, start, end);
        }

        let mut targets = vec![first_target];
        loop {
            self.advance(); // consume '='
            let checkpoint = self.pos;
            let mut chained = false;
            if let Ok(next_primary) = self.parse_primary() {
                if self.check(TokenKind::Equal) {
                    targets.push(next_primary);
                    chained = true;
                }
            }
            if !chained {
                self.pos = checkpoint;
                break;
            }
        }
        let rhs = self.parse_expr()?;
        let end = rhs.pos_end.clone();
        let mut value = rhs;
        for target in targets.into_iter().rev() {
            value = self.build_assign_node(target, value, start.clone(), end.clone())?;
        }
        Ok(value)
    }

    fn build_assign_node(
        &self,
        target: Node,
        value: Node,
        start: Position,
        end: Position,
    ) -> Result<Node, Box<Error>> {
        let target_end = target.pos_end.clone();
        let kind = match target.kind {
            NodeKind::VarAccess(name) => NodeKind::VarAssign(name, Box::new(value)),
            NodeKind::GetAttr(obj, attr) => NodeKind::SetAttr(obj, attr, Box::new(value)),
            NodeKind::GetItem(obj, key) => NodeKind::SetItem(obj, key, Box::new(value)),
            _ => {
                return Err(Box::new(Error::lex(
                    ErrorKind::Syntax("cannot assign to this expression".into()),
                    start,
                    target_end,
                )))
            }
        };
        Ok(Node::new(kind, start, end))
    }

    // ---- expression precedence cascade ----

    fn parse_expr(&mut self) -> Result<Node, Box<Error>> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Node, Box<Error>> {
        let first = self.parse_or()?;
        if self.at_keyword(IF_WORDS) {
            self.advance();
            let condition = self.parse_or()?;
            self.expect_keyword(ELSE_WORDS)?;
            let else_body = self.parse_ternary()?;
            let start = first.pos_start.clone();
            let end = else_body.pos_end.clone();
            return Ok(Node::new(
                NodeKind::If {
                    is_expression: true,
                    cases: vec![IfCase {
                        condition,
                        body: first,
                    }],
                    else_body: Some(Box::new(else_body)),
                },
                start,
                end,
            ));
        }
        if self.check(TokenKind::Question) {
            self.advance();
            let then_branch = self.parse_ternary()?;
            self.expect(TokenKind::Colon, "':'")?;
            let else_branch = self.parse_ternary()?;
            let start = first.pos_start.clone();
            let end = else_branch.pos_end.clone();
            return Ok(Node::new(
                NodeKind::If {
                    is_expression: true,
                    cases: vec![IfCase {
                        condition: first,
                        body: then_branch,
                    }],
                    else_body: Some(Box::new(else_branch)),
                },
                start,
                end,
            ));
        }
        Ok(first)
    }

    fn parse_left_assoc(
        &mut self,
        kinds: &[TokenKind],
        next: fn(&mut Self) -> Result<Node, Box<Error>>,
    ) -> Result<Node, Box<Error>> {
        let mut left = next(self)?;
        while kinds.contains(&self.current().kind) {
            let op = self.advance().kind;
            let right = next(self)?;
            let start = left.pos_start.clone();
            let end = right.pos_end.clone();
            left = Node::new(
                NodeKind::BinaryOp(Box::new(left), op, Box::new(right)),
                start,
                end,
            );
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(&[TokenKind::DoubleVbar], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(&[TokenKind::DoubleAmper], Self::parse_not)
    }

    fn parse_not(&mut self) -> Result<Node, Box<Error>> {
        if self.check(TokenKind::Exclamation) {
            let tok = self.advance();
            let operand = self.parse_not()?;
            let end = operand.pos_end.clone();
            return Ok(Node::new(
                NodeKind::UnaryOp(TokenKind::Exclamation, Box::new(operand)),
                tok.pos_start,
                end,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(
            &[
                TokenKind::EqEqual,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
            ],
            Self::parse_bitor,
        )
    }

    fn parse_bitor(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(&[TokenKind::Vbar], Self::parse_bitxor)
    }

    fn parse_bitxor(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(&[TokenKind::Circumflex], Self::parse_bitand)
    }

    fn parse_bitand(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(&[TokenKind::Amper], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(
            &[TokenKind::LeftShift, TokenKind::RightShift],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(
            &[TokenKind::Plus, TokenKind::Minus],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Node, Box<Error>> {
        self.parse_left_assoc(
            &[
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::DoubleSlash,
                TokenKind::Percent,
                TokenKind::At,
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Node, Box<Error>> {
        if matches!(
            self.current().kind,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde
        ) {
            let tok = self.advance();
            let operand = self.parse_unary()?;
            let end = operand.pos_end.clone();
            return Ok(Node::new(
                NodeKind::UnaryOp(tok.kind, Box::new(operand)),
                tok.pos_start,
                end,
            ));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Node, Box<Error>> {
        let base = self.parse_primary()?;
        if self.check(TokenKind::DoubleStar) {
            self.advance();
            // The exponent may itself start with a unary operator (`2 ** -1`),
            // while the base here was only a primary: `-2 ** 2` parses as
            // `-(2 ** 2)`, matching the listed precedence order.
            let exponent = self.parse_unary()?;
            let start = base.pos_start.clone();
            let end = exponent.pos_end.clone();
            return Ok(Node::new(
                NodeKind::BinaryOp(Box::new(base), TokenKind::DoubleStar, Box::new(exponent)),
                start,
                end,
            ));
        }
        Ok(base)
    }

    // ---- primary / atom ----

    fn parse_primary(&mut self) -> Result<Node, Box<Error>> {
        let mut node = self.parse_atom()?;
        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let name_tok = self.expect(TokenKind::Name, "an attribute name")?;
                    let name = ImmutableString::from(name_tok.name().unwrap());
                    let start = node.pos_start.clone();
                    let end = name_tok.pos_end.clone();
                    node = Node::new(NodeKind::GetAttr(Box::new(node), name), start, end);
                }
                TokenKind::LPar => {
                    self.advance();
                    let (args, kwargs) = self.parse_call_args()?;
                    let close = self.expect(TokenKind::RPar, "')'")?;
                    let start = node.pos_start.clone();
                    node = Node::new(
                        NodeKind::Call {
                            callee: Box::new(node),
                            args,
                            kwargs,
                        },
                        start,
                        close.pos_end,
                    );
                }
                TokenKind::LSqb => {
                    self.advance();
                    let key = self.parse_subscript()?;
                    let close = self.expect(TokenKind::RSqb, "']'")?;
                    let start = node.pos_start.clone();
                    node = Node::new(NodeKind::GetItem(Box::new(node), Box::new(key)), start, close.pos_end);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Node>, Vec<KeywordArg>), Box<Error>> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        if self.check(TokenKind::RPar) {
            return Ok((args, kwargs));
        }
        loop {
            if self.check(TokenKind::Name) {
                let checkpoint = self.pos;
                let name_tok = self.advance();
                if self.check(TokenKind::Equal) {
                    self.advance();
                    let value = self.parse_expr()?;
                    kwargs.push(KeywordArg {
                        name: ImmutableString::from(name_tok.name().unwrap()),
                        value,
                    });
                } else {
                    self.pos = checkpoint;
                    let value = self.parse_expr()?;
                    if !kwargs.is_empty() {
                        return Err(Box::new(Error::lex(
                            ErrorKind::Syntax(
                                "positional argument follows keyword argument".into(),
                            ),
                            value.pos_start.clone(),
                            value.pos_end.clone(),
                        )));
                    }
                    args.push(value);
                }
            } else {
                let value = self.parse_expr()?;
                if !kwargs.is_empty() {
                    return Err(Box::new(Error::lex(
                        ErrorKind::Syntax("positional argument follows keyword argument".into()),
                        value.pos_start.clone(),
                        value.pos_end.clone(),
                    )));
                }
                args.push(value);
            }

            if self.check(TokenKind::Comma) {
                self.advance();
                if self.check(TokenKind::RPar) {
                    break;
                }
                continue;
            }
            break;
        }
        Ok((args, kwargs))
    }

    /// Parses the contents of a `[...]` subscript: either a plain index
    /// expression, or `start? : stop? : step?` slice parts.
    fn parse_subscript(&mut self) -> Result<Node, Box<Error>> {
        let start = self.current().pos_start.clone();
        let first = if self.check(TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        if !self.check(TokenKind::Colon) {
            return Ok(*first.expect("checked not at ':'"));
        }
        self.advance();
        let stop = if self.check(TokenKind::Colon) || self.check(TokenKind::RSqb) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let step = if self.check(TokenKind::Colon) {
            self.advance();
            if self.check(TokenKind::RSqb) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            }
        } else {
            None
        };
        let end = self.current().pos_end.clone();
        Ok(Node::new(NodeKind::Slice(first, stop, step), start, end))
    }

    fn parse_atom(&mut self) -> Result<Node, Box<Error>> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let literal = match tok.value {
                    TokenValue::Int(n) => NumberLiteral::Int(n),
                    TokenValue::Float(f) => NumberLiteral::Float(f),
                    TokenValue::Bool(b) => NumberLiteral::Bool(b),
                    _ => unreachable!("lexer only emits NUMBER with Int/Float/Bool value"),
                };
                Ok(Node::new(NodeKind::Number(literal), tok.pos_start, tok.pos_end))
            }
            TokenKind::String => {
                self.advance();
                let s = match tok.value {
                    TokenValue::Str(s) => s,
                    _ => unreachable!("lexer only emits STRING with Str value"),
                };
                Ok(Node::new(NodeKind::String(s), tok.pos_start, tok.pos_end))
            }
            TokenKind::Name => {
                self.advance();
                let name = tok.name().unwrap();
                if EXIT_WORDS.contains(&name) {
                    return Ok(Node::new(NodeKind::Exit, tok.pos_start, tok.pos_end));
                }
                Ok(Node::new(
                    NodeKind::VarAccess(ImmutableString::from(name)),
                    tok.pos_start,
                    tok.pos_end,
                ))
            }
            TokenKind::LPar => {
                self.advance();
                if self.check(TokenKind::RPar) {
                    let close = self.advance();
                    return Ok(Node::new(NodeKind::Tuple(Vec::new()), tok.pos_start, close.pos_end));
                }
                let mut items = vec![self.parse_expr()?];
                let mut trailing_comma = false;
                while self.check(TokenKind::Comma) {
                    self.advance();
                    if self.check(TokenKind::RPar) {
                        trailing_comma = true;
                        break;
                    }
                    items.push(self.parse_expr()?);
                }
                let close = self.expect(TokenKind::RPar, "')'")?;
                if items.len() == 1 && !trailing_comma {
                    let mut single = items.pop().unwrap();
                    single.pos_start = tok.pos_start;
                    single.pos_end = close.pos_end;
                    return Ok(single);
                }
                Ok(Node::new(NodeKind::Tuple(items), tok.pos_start, close.pos_end))
            }
            TokenKind::LSqb => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(TokenKind::RSqb) {
                    items.push(self.parse_expr()?);
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        if self.check(TokenKind::RSqb) {
                            break;
                        }
                        items.push(self.parse_expr()?);
                    }
                }
                let close = self.expect(TokenKind::RSqb, "']'")?;
                Ok(Node::new(NodeKind::List(items), tok.pos_start, close.pos_end))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                if !self.check(TokenKind::RBrace) {
                    entries.push(self.parse_dict_entry()?);
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        if self.check(TokenKind::RBrace) {
                            break;
                        }
                        entries.push(self.parse_dict_entry()?);
                    }
                }
                let close = self.expect(TokenKind::RBrace, "'}'")?;
                Ok(Node::new(NodeKind::Dict(entries), tok.pos_start, close.pos_end))
            }
            _ => Err(Box::new(Error::lex(
                ErrorKind::InvalidAtom(format!(
                    "expected an atom, found {}",
                    tok.kind.symbol()
                )),
                tok.pos_start,
                tok.pos_end,
            ))),
        }
    }

    fn parse_dict_entry(&mut self) -> Result<DictEntry, Box<Error>> {
        let key = self.parse_expr()?;
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.parse_expr()?;
        Ok(DictEntry { key, value })
    }
}
