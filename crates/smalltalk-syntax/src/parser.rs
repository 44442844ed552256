//! The recursive-descent parser (C4): tokens in, a [`Node`] tree out.
//!
//! Precedence is resolved by calling three tiers in a fixed order — unary, then
//! binary, then keyword — each one looping greedily over its own selector kind and
//! handing its arguments down to the tier below it (§4.2). There is no Pratt table and
//! no operator-precedence climbing: Smalltalk's grammar is already unambiguous once the
//! tiers are visited in that order, left-associatively, with no cross-tier
//! parenthesisation.
//!
//! Errors never unwind. A parse function that cannot produce a node returns `None`
//! after recording an [`Error`]; the caller either propagates the `None` with `?` or,
//! at a statement boundary, calls [`Parser::synchronize`] and moves on — a panic-mode
//! parser, where one flag suppresses cascaded diagnostics until the next `.`, rather
//! than unwinding through a `Result` chain.

use crate::ast::{Constant, Node, NodeKind};
use crate::error::{Error, ParseErrorKind};
use crate::lexer::Lexer;
use crate::token::{LiteralValue, Position, Token, TokenKind};
use crate::{Ident, StaticVec};

/// A recursive-descent parser over a single source buffer.
///
/// Holds exactly one token of lookahead (`current`) plus the token just consumed
/// (`previous`). `had_error` and `panic_mode` together implement the error-recovery
/// policy described in the crate's module-level error taxonomy.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    previous: Token<'src>,
    current: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    errors: Vec<Error>,
}

impl<'src> Parser<'src> {
    /// Builds a parser over `source` and primes `current` with the first token.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let lexer = Lexer::new(source);
        let placeholder = Token::new(TokenKind::Eof, "", Position::START);
        let mut parser = Self {
            lexer,
            previous: placeholder.clone(),
            current: placeholder,
            had_error: false,
            panic_mode: false,
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Whether any lexical or syntactic error has been recorded so far.
    #[must_use]
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// The errors recorded so far, in the order they were encountered.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Parses the whole source as a top-level, parameterless [`Block`](NodeKind::Block).
    ///
    /// Always returns a tree, even on error — [`Parser::had_error`] tells the caller
    /// whether it is complete.
    pub fn parse(&mut self) -> Node {
        let span = tracing::debug_span!("parse");
        let _enter = span.enter();

        let statements = self.parse_statements(TokenKind::Eof);
        if !self.had_error && self.current.kind != TokenKind::Eof {
            let found = self.describe_current();
            self.error_at_current(ParseErrorKind::ExpectedToken {
                expected: "end of input",
                found,
            });
        }

        tracing::debug!(
            statement_count = statements.len(),
            had_error = self.had_error,
            "parse finished"
        );
        Node::new(
            Position::START.line,
            Position::START.column,
            NodeKind::Block {
                parameters: StaticVec::new(),
                statements,
            },
        )
    }

    // -- token plumbing -----------------------------------------------------

    /// Advances `current`, silently absorbing any run of lexer `Error` tokens into
    /// recorded [`Error`]s (§7): a lex error is not a grammatical token, so the parser
    /// never sees `TokenKind::Error` in `current` once this returns.
    fn advance(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        loop {
            self.current = self.lexer.next_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let kind = self
                .current
                .error
                .clone()
                .expect("a TokenKind::Error token always carries a LexErrorKind");
            let position = self.current.position;
            self.record_error(ParseErrorKind::Lex(kind), position);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `kind` if it is `current`, otherwise records an error and leaves
    /// `current` untouched so the caller's own recovery (if any) sees the same token.
    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Option<()> {
        if self.check(kind) {
            self.advance();
            return Some(());
        }
        let found = self.describe_current();
        self.error_at_current(ParseErrorKind::ExpectedToken { expected, found });
        None
    }

    fn describe_current(&self) -> String {
        describe(&self.current)
    }

    fn error_at_current(&mut self, kind: ParseErrorKind) {
        let position = self.current.position;
        self.record_error(kind, position);
    }

    /// The shared error sink: sets `had_error`, and records the error unless a prior
    /// error already put the parser in panic mode (suppressing cascaded diagnostics
    /// until the next synchronisation point, per §7).
    fn record_error(&mut self, kind: ParseErrorKind, position: Position) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        tracing::warn!(%position, %kind, "parse error");
        self.errors.push(Error::new(kind, position));
    }

    /// Skips forward to the token after the next `.`, `terminator`, or EOF, and clears
    /// `panic_mode` so subsequent errors are reported again.
    fn synchronize(&mut self, terminator: TokenKind) {
        self.panic_mode = false;
        while !self.check(TokenKind::Eof) && !self.check(terminator) {
            if self.check(TokenKind::Period) {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    // -- statement sequences --------------------------------------------------

    /// Parses statements separated by `.` until `terminator` or EOF, recovering from
    /// any parse failure at the next statement boundary rather than aborting.
    ///
    /// Used both for the top-level program and for block/array-expression bodies,
    /// which share this exact shape (§4.2).
    fn parse_statements(&mut self, terminator: TokenKind) -> Vec<Node> {
        let mut statements = Vec::new();
        loop {
            while self.match_token(TokenKind::Period) {}
            if self.check(terminator) || self.check(TokenKind::Eof) {
                break;
            }

            if let Some(statement) = self.expression() {
                statements.push(statement);
            }
            if self.panic_mode {
                self.synchronize(terminator);
                continue;
            }

            if self.check(terminator) || self.check(TokenKind::Eof) {
                break;
            }
            if !self.match_token(TokenKind::Period) {
                let found = self.describe_current();
                self.error_at_current(ParseErrorKind::ExpectedToken {
                    expected: "'.' between statements",
                    found,
                });
                self.synchronize(terminator);
            }
        }
        statements
    }

    // -- expressions ------------------------------------------------------------

    /// `^expression | assignment`
    fn expression(&mut self) -> Option<Node> {
        if self.check(TokenKind::Caret) {
            let position = self.current.position;
            self.advance();
            let value = self.expression()?;
            return Some(Node::new(
                position.line,
                position.column,
                NodeKind::Return(Box::new(value)),
            ));
        }
        self.assignment()
    }

    /// `identifier ':=' expression | message-expression`
    ///
    /// The one-token lookahead needed to tell an assignment from a message send falls
    /// out naturally here: the identifier is consumed either way, and if it is not
    /// followed by `:=` it simply becomes the receiver the message tiers build on.
    fn assignment(&mut self) -> Option<Node> {
        if self.check(TokenKind::Identifier) {
            let name = self.current.clone();
            self.advance();
            if self.match_token(TokenKind::Assignment) {
                let value = self.expression()?;
                return Some(Node::new(
                    name.position.line,
                    name.position.column,
                    NodeKind::Assignment {
                        variable: Ident::from(name.lexeme),
                        value: Box::new(value),
                    },
                ));
            }
            let receiver = Node::new(
                name.position.line,
                name.position.column,
                NodeKind::Variable {
                    name: Ident::from(name.lexeme),
                    is_pseudo: false,
                },
            );
            return self.message_expression_from(receiver);
        }
        self.message_expression()
    }

    fn message_expression(&mut self) -> Option<Node> {
        let receiver = self.primary()?;
        self.message_expression_from(receiver)
    }

    /// Runs the three precedence tiers, then a possible cascade, over an
    /// already-parsed receiver.
    fn message_expression_from(&mut self, receiver: Node) -> Option<Node> {
        let receiver = self.unary_messages(receiver);
        let receiver = self.binary_messages(receiver)?;
        let receiver = self.keyword_message(receiver)?;
        self.cascade(receiver)
    }

    /// Tier 1: zero or more unary sends, left-associative.
    fn unary_messages(&mut self, mut receiver: Node) -> Node {
        while self.check(TokenKind::Identifier) {
            let selector = self.current.clone();
            self.advance();
            receiver = Node::new(
                receiver.line,
                receiver.column,
                NodeKind::UnaryMessage {
                    receiver: Some(Box::new(receiver)),
                    selector: Ident::from(selector.lexeme),
                },
            );
        }
        receiver
    }

    /// Tier 2: zero or more binary sends, left-associative. Each argument is a
    /// primary plus its own unary chain (§4.2) — never a further binary or keyword
    /// send, which is what keeps this tier unambiguous.
    fn binary_messages(&mut self, mut receiver: Node) -> Option<Node> {
        while self.current.kind.is_binary_selector_start() {
            let selector = self.current.clone();
            self.advance();
            let argument = self.primary()?;
            let argument = self.unary_messages(argument);
            receiver = Node::new(
                receiver.line,
                receiver.column,
                NodeKind::BinaryMessage {
                    receiver: Some(Box::new(receiver)),
                    selector: Ident::from(selector.lexeme),
                    argument: Box::new(argument),
                },
            );
        }
        Some(receiver)
    }

    /// Tier 3: at most one keyword send, whose parts are concatenated into a single
    /// selector. Each argument runs the unary then binary tiers before the next
    /// keyword part is read.
    fn keyword_message(&mut self, receiver: Node) -> Option<Node> {
        if !self.check(TokenKind::Keyword) {
            return Some(receiver);
        }
        let line = receiver.line;
        let column = receiver.column;
        let mut selector = Ident::new();
        let mut arguments = StaticVec::new();
        while self.check(TokenKind::Keyword) {
            selector.push_str(self.current.lexeme);
            self.advance();
            arguments.push(self.keyword_argument()?);
        }
        Some(Node::new(
            line,
            column,
            NodeKind::KeywordMessage {
                receiver: Some(Box::new(receiver)),
                selector,
                arguments,
            },
        ))
    }

    /// A single keyword argument: primary, then its unary chain, then its binary
    /// chain — the same two lower tiers a top-level expression would run.
    fn keyword_argument(&mut self) -> Option<Node> {
        let argument = self.primary()?;
        let argument = self.unary_messages(argument);
        self.binary_messages(argument)
    }

    /// `(';' cascade-message)+`, triggered when a message expression is followed by
    /// `;`. The receiver of the message just parsed becomes the cascade's shared
    /// receiver, and that message itself becomes the first cascade element with its
    /// own `receiver` replaced by `None` (§3.2).
    fn cascade(&mut self, node: Node) -> Option<Node> {
        if !self.check(TokenKind::Semicolon) {
            return Some(node);
        }
        let (cascade_receiver, first_message) = match split_cascade_head(node) {
            Some(pair) => pair,
            None => {
                self.error_at_current(ParseErrorKind::CascadeReceiverNotAMessage);
                return None;
            }
        };
        let mut messages = vec![first_message];
        while self.match_token(TokenKind::Semicolon) {
            messages.push(self.cascade_message()?);
        }
        Some(Node::new(
            cascade_receiver.line,
            cascade_receiver.column,
            NodeKind::Cascade {
                receiver: Box::new(cascade_receiver),
                messages,
            },
        ))
    }

    /// One cascade element: exactly one unary, binary, or keyword send, built with a
    /// `None` receiver standing in for the cascade's shared receiver.
    fn cascade_message(&mut self) -> Option<Node> {
        let position = self.current.position;
        let line = position.line;
        let column = position.column;
        match self.current.kind {
            TokenKind::Keyword => {
                let mut selector = Ident::new();
                let mut arguments = StaticVec::new();
                while self.check(TokenKind::Keyword) {
                    selector.push_str(self.current.lexeme);
                    self.advance();
                    arguments.push(self.keyword_argument()?);
                }
                Some(Node::new(
                    line,
                    column,
                    NodeKind::KeywordMessage {
                        receiver: None,
                        selector,
                        arguments,
                    },
                ))
            }
            kind if kind.is_binary_selector_start() => {
                let selector = self.current.clone();
                self.advance();
                let argument = self.primary()?;
                let argument = self.unary_messages(argument);
                Some(Node::new(
                    line,
                    column,
                    NodeKind::BinaryMessage {
                        receiver: None,
                        selector: Ident::from(selector.lexeme),
                        argument: Box::new(argument),
                    },
                ))
            }
            TokenKind::Identifier => {
                let selector = self.current.clone();
                self.advance();
                Some(Node::new(
                    line,
                    column,
                    NodeKind::UnaryMessage {
                        receiver: None,
                        selector: Ident::from(selector.lexeme),
                    },
                ))
            }
            _ => {
                let found = self.describe_current();
                self.error_at_current(ParseErrorKind::ExpectedCascadeSelector { found });
                None
            }
        }
    }

    // -- primaries ------------------------------------------------------------

    fn primary(&mut self) -> Option<Node> {
        let token = self.current.clone();
        let line = token.position.line;
        let column = token.position.column;
        match token.kind {
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.expression()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Some(expression)
            }
            TokenKind::LeftBracket => self.block(),
            TokenKind::LeftBrace => self.array_expression(),
            TokenKind::HashLeftParen => self.array_literal(line, column),
            TokenKind::Integer => {
                self.advance();
                Some(Node::new(
                    line,
                    column,
                    NodeKind::IntegerLiteral(integer_value(&token)),
                ))
            }
            TokenKind::Float => {
                self.advance();
                Some(Node::new(
                    line,
                    column,
                    NodeKind::FloatLiteral(float_value(&token)),
                ))
            }
            TokenKind::Scaled => {
                self.advance();
                let (value, scale) = scaled_value(&token);
                Some(Node::new(line, column, NodeKind::ScaledLiteral { value, scale }))
            }
            TokenKind::Char => {
                self.advance();
                Some(Node::new(line, column, NodeKind::CharLiteral(char_value(&token))))
            }
            TokenKind::String => {
                self.advance();
                Some(Node::new(
                    line,
                    column,
                    NodeKind::StringLiteral(decode_string(token.lexeme)),
                ))
            }
            TokenKind::Symbol => {
                self.advance();
                Some(Node::new(
                    line,
                    column,
                    NodeKind::SymbolLiteral(decode_symbol(token.lexeme)),
                ))
            }
            TokenKind::Nil => {
                self.advance();
                Some(Node::new(line, column, NodeKind::Constant(Constant::Nil)))
            }
            TokenKind::True => {
                self.advance();
                Some(Node::new(line, column, NodeKind::Constant(Constant::True)))
            }
            TokenKind::False => {
                self.advance();
                Some(Node::new(line, column, NodeKind::Constant(Constant::False)))
            }
            TokenKind::SelfKw | TokenKind::Super | TokenKind::ThisContext => {
                self.advance();
                Some(Node::new(
                    line,
                    column,
                    NodeKind::Variable {
                        name: Ident::from(token.lexeme),
                        is_pseudo: true,
                    },
                ))
            }
            TokenKind::Identifier => {
                self.advance();
                Some(Node::new(
                    line,
                    column,
                    NodeKind::Variable {
                        name: Ident::from(token.lexeme),
                        is_pseudo: false,
                    },
                ))
            }
            _ => {
                let found = self.describe_current();
                self.error_at_current(ParseErrorKind::ExpectedPrimary { found });
                None
            }
        }
    }

    /// `'[' (':' identifier)* '|'? statements ']'`
    fn block(&mut self) -> Option<Node> {
        let position = self.current.position;
        self.advance(); // '['

        let mut parameters = StaticVec::new();
        if self.check(TokenKind::Colon) {
            loop {
                self.advance(); // ':'
                if !self.check(TokenKind::Identifier) {
                    let found = self.describe_current();
                    self.error_at_current(ParseErrorKind::ExpectedToken {
                        expected: "a parameter name after ':'",
                        found,
                    });
                    return None;
                }
                parameters.push(Ident::from(self.current.lexeme));
                self.advance();
                if !self.check(TokenKind::Colon) {
                    break;
                }
            }
            self.expect(TokenKind::Pipe, "'|' after block parameters")?;
        }

        let statements = self.parse_statements(TokenKind::RightBracket);
        self.expect(TokenKind::RightBracket, "']' after block body")?;
        Some(Node::new(
            position.line,
            position.column,
            NodeKind::Block {
                parameters,
                statements,
            },
        ))
    }

    /// `'{' statements '}'` — general expressions, period-separated, evaluated into a
    /// runtime array (§4.2), distinct from the `#( ... )` literal array below.
    fn array_expression(&mut self) -> Option<Node> {
        let position = self.current.position;
        self.advance(); // '{'
        let statements = self.parse_statements(TokenKind::RightBrace);
        self.expect(TokenKind::RightBrace, "'}' after array expression")?;
        Some(Node::new(
            position.line,
            position.column,
            NodeKind::ArrayExpression(statements),
        ))
    }

    /// `'#(' element* ')'` — a literal array. Elements are literals or bare
    /// identifier/keyword/binary-selector runs decoded as symbols (§4.2); nested
    /// `#( ... )` is accepted as a natural extension (§9).
    fn array_literal(&mut self, line: u32, column: u32) -> Option<Node> {
        self.advance(); // '#('
        let mut elements = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.check(TokenKind::Eof) {
            match self.array_literal_element() {
                Some(element) => elements.push(element),
                None => break,
            }
        }
        self.expect(TokenKind::RightParen, "')' after array literal")?;
        Some(Node::new(line, column, NodeKind::ArrayLiteral(elements)))
    }

    fn array_literal_element(&mut self) -> Option<Node> {
        let token = self.current.clone();
        let line = token.position.line;
        let column = token.position.column;
        match token.kind {
            TokenKind::Integer => {
                self.advance();
                Some(Node::new(line, column, NodeKind::IntegerLiteral(integer_value(&token))))
            }
            TokenKind::Float => {
                self.advance();
                Some(Node::new(line, column, NodeKind::FloatLiteral(float_value(&token))))
            }
            TokenKind::Scaled => {
                self.advance();
                let (value, scale) = scaled_value(&token);
                Some(Node::new(line, column, NodeKind::ScaledLiteral { value, scale }))
            }
            TokenKind::Char => {
                self.advance();
                Some(Node::new(line, column, NodeKind::CharLiteral(char_value(&token))))
            }
            TokenKind::String => {
                self.advance();
                Some(Node::new(line, column, NodeKind::StringLiteral(decode_string(token.lexeme))))
            }
            TokenKind::Symbol => {
                self.advance();
                Some(Node::new(line, column, NodeKind::SymbolLiteral(decode_symbol(token.lexeme))))
            }
            TokenKind::Nil => {
                self.advance();
                Some(Node::new(line, column, NodeKind::Constant(Constant::Nil)))
            }
            TokenKind::True => {
                self.advance();
                Some(Node::new(line, column, NodeKind::Constant(Constant::True)))
            }
            TokenKind::False => {
                self.advance();
                Some(Node::new(line, column, NodeKind::Constant(Constant::False)))
            }
            TokenKind::HashLeftParen => self.array_literal(line, column),
            TokenKind::Identifier => {
                self.advance();
                Some(Node::new(line, column, NodeKind::SymbolLiteral(Ident::from(token.lexeme))))
            }
            TokenKind::Keyword => {
                // Adjacent keyword parts (`at:put:`) collapse into one symbol, the
                // same way the keyword-message tier concatenates its selector.
                let mut symbol = Ident::new();
                while self.check(TokenKind::Keyword) {
                    symbol.push_str(self.current.lexeme);
                    self.advance();
                }
                Some(Node::new(line, column, NodeKind::SymbolLiteral(symbol)))
            }
            kind if kind.is_binary_selector_start() => {
                self.advance();
                Some(Node::new(line, column, NodeKind::SymbolLiteral(Ident::from(token.lexeme))))
            }
            _ => {
                let found = self.describe_current();
                self.error_at_current(ParseErrorKind::InvalidArrayLiteralElement { found });
                None
            }
        }
    }
}

/// Splits a just-parsed message node into its receiver and a copy of itself with the
/// receiver blanked out, for use as the first element of a [`Cascade`](NodeKind::Cascade).
fn split_cascade_head(node: Node) -> Option<(Node, Node)> {
    let Node { line, column, kind } = node;
    match kind {
        NodeKind::UnaryMessage {
            receiver: Some(receiver),
            selector,
        } => Some((
            *receiver,
            Node::new(line, column, NodeKind::UnaryMessage { receiver: None, selector }),
        )),
        NodeKind::BinaryMessage {
            receiver: Some(receiver),
            selector,
            argument,
        } => Some((
            *receiver,
            Node::new(
                line,
                column,
                NodeKind::BinaryMessage {
                    receiver: None,
                    selector,
                    argument,
                },
            ),
        )),
        NodeKind::KeywordMessage {
            receiver: Some(receiver),
            selector,
            arguments,
        } => Some((
            *receiver,
            Node::new(
                line,
                column,
                NodeKind::KeywordMessage {
                    receiver: None,
                    selector,
                    arguments,
                },
            ),
        )),
        _ => None,
    }
}

fn describe(token: &Token<'_>) -> String {
    if token.is_eof() {
        "end of input".to_string()
    } else {
        format!("'{}'", token.lexeme)
    }
}

fn integer_value(token: &Token<'_>) -> i64 {
    match token.value {
        Some(LiteralValue::Integer(value)) => value,
        _ => unreachable!("Integer token without LiteralValue::Integer"),
    }
}

fn float_value(token: &Token<'_>) -> f64 {
    match token.value {
        Some(LiteralValue::Float(value)) => value,
        _ => unreachable!("Float token without LiteralValue::Float"),
    }
}

fn scaled_value(token: &Token<'_>) -> (f64, u32) {
    match token.value {
        Some(LiteralValue::Scaled { value, scale }) => (value, scale),
        _ => unreachable!("Scaled token without LiteralValue::Scaled"),
    }
}

fn char_value(token: &Token<'_>) -> u8 {
    match token.value {
        Some(LiteralValue::Char(value)) => value,
        _ => unreachable!("Char token without LiteralValue::Char"),
    }
}

/// Strips the surrounding quotes from a `'...'`-delimited lexeme and collapses `''`
/// escapes into a single `'`.
fn decode_string(lexeme: &str) -> Ident {
    let inner = &lexeme[1..lexeme.len() - 1];
    let mut out = Ident::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.peek() == Some(&'\'') {
            chars.next();
        }
        out.push(c);
    }
    out
}

/// Decodes a `#`-prefixed symbol lexeme: drops the `#`, then applies the same
/// quote-collapsing as [`decode_string`] if it was a `#'...'` quoted symbol.
fn decode_symbol(lexeme: &str) -> Ident {
    let rest = &lexeme[1..];
    if rest.starts_with('\'') {
        decode_string(rest)
    } else {
        Ident::from(rest)
    }
}

