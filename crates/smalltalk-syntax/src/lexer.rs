//! The Smalltalk lexer (C2): a single-pass, byte-at-a-time scanner with no
//! backtracking except a one-character peek.

use crate::error::LexErrorKind;
use crate::token::{LiteralValue, Position, Token, TokenKind};

const BINARY_SYMBOL_CHARS: &[u8] = b"~!@%&*-+=|\\<>,?/";

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn radix_digit_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'a'..=b'z' => Some((b - b'a') as u32 + 10),
        b'A'..=b'Z' => Some((b - b'A') as u32 + 10),
        _ => None,
    }
}

/// Scans `source` one token at a time.
///
/// A `Lexer` borrows its source for its entire lifetime (`'src`); tokens it produces
/// borrow the same buffer for their lexeme, so neither the lexer nor its tokens can
/// outlive the string they were built over.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    line: u32,
    column: u32,
    had_error: bool,
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            had_error: false,
        }
    }

    /// Whether the lexer has emitted at least one `Error` token so far.
    #[must_use]
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn slice(&self, start: usize) -> &'src str {
        // Every lexeme boundary falls on an ASCII byte (the lexical grammar is
        // ASCII-only per §1 non-goals), so byte indices are always char boundaries.
        &self.source[start..self.pos]
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token<'src>> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'"') => {
                    let start = self.pos;
                    let start_pos = self.position_at(start);
                    self.advance(); // opening quote
                    while self.peek() != Some(b'"') && !self.is_at_end() {
                        self.advance();
                    }
                    if self.is_at_end() {
                        self.had_error = true;
                        return Some(Token::error(
                            self.slice(start),
                            start_pos,
                            LexErrorKind::UnterminatedComment,
                        ));
                    }
                    self.advance(); // closing quote
                }
                _ => return None,
            }
        }
    }

    fn position_at(&self, start: usize) -> Position {
        // Column/length are measured in characters; start..pos is ASCII-only so the
        // byte length equals the character length.
        let length = (self.pos.saturating_sub(start)) as u32;
        Position::new(self.line, self.column, length)
    }

    /// Produces the next token. Returns an idempotent `Eof` token once the source is
    /// exhausted: calling this after EOF has been reached never panics and never
    /// advances further.
    pub fn next_token(&mut self) -> Token<'src> {
        if let Some(err) = self.skip_whitespace_and_comments() {
            return err;
        }

        let start = self.pos;
        let start_line = self.line;
        let start_column = self.column;

        if self.is_at_end() {
            return Token::new(
                TokenKind::Eof,
                "",
                Position::new(start_line, start_column, 0),
            );
        }

        let c = self.advance().expect("checked not at end");
        let pos = |this: &Self| Position::new(start_line, start_column, (this.pos - start) as u32);

        if is_ident_start(c) {
            return self.scan_identifier(start, start_line, start_column);
        }

        if c.is_ascii_digit() || (c == b'-' && self.peek().is_some_and(|b| b.is_ascii_digit())) {
            return self.scan_number(start, start_line, start_column);
        }

        match c {
            b'(' => Token::new(TokenKind::LeftParen, self.slice(start), pos(self)),
            b')' => Token::new(TokenKind::RightParen, self.slice(start), pos(self)),
            b'[' => Token::new(TokenKind::LeftBracket, self.slice(start), pos(self)),
            b']' => Token::new(TokenKind::RightBracket, self.slice(start), pos(self)),
            b'{' => Token::new(TokenKind::LeftBrace, self.slice(start), pos(self)),
            b'}' => Token::new(TokenKind::RightBrace, self.slice(start), pos(self)),
            b'^' => Token::new(TokenKind::Caret, self.slice(start), pos(self)),
            b'.' => Token::new(TokenKind::Period, self.slice(start), pos(self)),
            b';' => Token::new(TokenKind::Semicolon, self.slice(start), pos(self)),
            b'|' => Token::new(TokenKind::Pipe, self.slice(start), pos(self)),
            b'#' => self.scan_symbol(start, start_line, start_column),
            b'$' => self.scan_char(start, start_line, start_column),
            b'\'' => self.scan_string(start, start_line, start_column),
            b':' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::new(TokenKind::Assignment, self.slice(start), pos(self))
                } else {
                    Token::new(TokenKind::Colon, self.slice(start), pos(self))
                }
            }
            b',' => Token::new(TokenKind::Comma, self.slice(start), pos(self)),
            b'_' => Token::new(TokenKind::Underscore, self.slice(start), pos(self)),
            b'~' | b'!' | b'@' | b'%' | b'&' | b'*' | b'-' | b'+' | b'=' | b'\\' | b'<' | b'>'
            | b'?' => {
                // A single one of these bytes already selects a kind on its own
                // (`<`, `Less`; `+`, `Plus`; ...); but per the grammar a binary
                // selector may run two characters when the second also belongs to
                // the set, e.g. `<=`, `~=`, `>=`. Collapse that case into one
                // `BinarySelector` token instead of leaving it as two adjacent ones.
                let single_kind = match c {
                    b'~' | b'!' | b'@' | b'%' | b'&' => TokenKind::BinarySelector,
                    b'*' => TokenKind::Star,
                    b'-' => TokenKind::Minus,
                    b'+' => TokenKind::Plus,
                    b'=' => TokenKind::Equal,
                    b'\\' => TokenKind::Backslash,
                    b'<' => TokenKind::Less,
                    b'>' => TokenKind::Greater,
                    b'?' => TokenKind::Question,
                    _ => unreachable!("matched above"),
                };
                if self.peek().is_some_and(|b| BINARY_SYMBOL_CHARS.contains(&b)) {
                    self.advance();
                    Token::new(TokenKind::BinarySelector, self.slice(start), pos(self))
                } else {
                    Token::new(single_kind, self.slice(start), pos(self))
                }
            }
            other => {
                self.had_error = true;
                Token::error(
                    self.slice(start),
                    pos(self),
                    LexErrorKind::UnexpectedCharacter(other as char),
                )
            }
        }
    }

    fn scan_identifier(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }

        // Reclassify as `Keyword` when followed by `:` that is not itself the start
        // of `:=`.
        if self.peek() == Some(b':') && self.peek_at(1) != Some(b'=') {
            self.advance();
            let lexeme = self.slice(start);
            return Token::new(
                TokenKind::Keyword,
                lexeme,
                Position::new(line, column, (self.pos - start) as u32),
            );
        }

        let lexeme = self.slice(start);
        let kind = match lexeme {
            "nil" => TokenKind::Nil,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "self" => TokenKind::SelfKw,
            "super" => TokenKind::Super,
            "thisContext" => TokenKind::ThisContext,
            _ => TokenKind::Identifier,
        };
        Token::new(
            kind,
            lexeme,
            Position::new(line, column, (self.pos - start) as u32),
        )
    }

    fn scan_number(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        let negative = self.bytes[start] == b'-';

        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }

        // Radix literal: `Nr` followed by digits of that radix.
        if self.peek() == Some(b'r') {
            return self.scan_radix(start, line, column, negative);
        }

        // Fractional part, only if `.` is followed by a digit.
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.advance(); // consume '.'
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.advance();
            }

            if self.peek() == Some(b's') {
                return self.finish_scaled(start, line, column);
            }

            if matches!(self.peek(), Some(b'e') | Some(b'd') | Some(b'q')) {
                return self.finish_float_with_exponent(start, line, column);
            }

            return self.finish_float(start, line, column);
        }

        // Exponent with no decimal point.
        if matches!(self.peek(), Some(b'e') | Some(b'd') | Some(b'q')) {
            return self.finish_float_with_exponent(start, line, column);
        }

        let lexeme = self.slice(start);
        let magnitude_start = if negative { 1 } else { 0 };
        let magnitude: i64 = lexeme[magnitude_start..].parse().unwrap_or(0);
        let value = if negative { -magnitude } else { magnitude };
        Token::new(
            TokenKind::Integer,
            lexeme,
            Position::new(line, column, (self.pos - start) as u32),
        )
        .with_value(LiteralValue::Integer(value))
    }

    fn scan_radix(&mut self, start: usize, line: u32, column: u32, negative: bool) -> Token<'src> {
        let digits_start = if negative { start + 1 } else { start };
        let radix: i64 = self.source[digits_start..self.pos].parse().unwrap_or(0);
        self.advance(); // consume 'r'

        if !(2..=36).contains(&radix) {
            self.had_error = true;
            return Token::error(
                self.slice(start),
                Position::new(line, column, (self.pos - start) as u32),
                LexErrorKind::RadixOutOfRange(radix),
            );
        }

        let digits_after_r_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric()) {
            self.advance();
        }

        let radix_u32 = radix as u32;
        let mut magnitude: i64 = 0;
        for &b in &self.bytes[digits_after_r_start..self.pos] {
            let digit = radix_digit_value(b);
            match digit {
                Some(d) if d < radix_u32 => {
                    magnitude = magnitude * radix + i64::from(d);
                }
                _ => {
                    self.had_error = true;
                    return Token::error(
                        self.slice(start),
                        Position::new(line, column, (self.pos - start) as u32),
                        LexErrorKind::DigitOutOfRange {
                            digit: b as char,
                            radix: radix_u32,
                        },
                    );
                }
            }
        }

        let value = if negative { -magnitude } else { magnitude };
        Token::new(
            TokenKind::Integer,
            self.slice(start),
            Position::new(line, column, (self.pos - start) as u32),
        )
        .with_value(LiteralValue::Integer(value))
    }

    fn finish_scaled(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        let mantissa_end = self.pos;
        self.advance(); // consume 's'
        let scale_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        let scale = (self.pos - scale_start) as u32;
        let value: f64 = self.source[start..mantissa_end].parse().unwrap_or(0.0);
        Token::new(
            TokenKind::Scaled,
            self.slice(start),
            Position::new(line, column, (self.pos - start) as u32),
        )
        .with_value(LiteralValue::Scaled { value, scale })
    }

    fn finish_float_with_exponent(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        let mantissa_end = self.pos;
        self.advance(); // consume 'e' | 'd' | 'q'

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.advance();
        }

        if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.had_error = true;
            return Token::error(
                self.slice(start),
                Position::new(line, column, (self.pos - start) as u32),
                LexErrorKind::MissingExponentDigits,
            );
        }

        let exponent_start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }

        let mantissa: f64 = self.source[start..mantissa_end].parse().unwrap_or(0.0);
        let exponent: i32 = self.source[exponent_start..self.pos].parse().unwrap_or(0);
        let sign_byte = self.bytes[mantissa_end + 1];
        let signed_exponent = if sign_byte == b'-' { -exponent } else { exponent };
        let value = mantissa * 10f64.powi(signed_exponent);

        Token::new(
            TokenKind::Float,
            self.slice(start),
            Position::new(line, column, (self.pos - start) as u32),
        )
        .with_value(LiteralValue::Float(value))
    }

    fn finish_float(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        let value: f64 = self.slice(start).parse().unwrap_or(0.0);
        Token::new(
            TokenKind::Float,
            self.slice(start),
            Position::new(line, column, (self.pos - start) as u32),
        )
        .with_value(LiteralValue::Float(value))
    }

    fn scan_string(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        loop {
            match self.peek() {
                None => {
                    self.had_error = true;
                    return Token::error(
                        self.slice(start),
                        Position::new(line, column, (self.pos - start) as u32),
                        LexErrorKind::UnterminatedString,
                    );
                }
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => {
                    self.advance();
                    self.advance();
                }
                Some(b'\'') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        Token::new(
            TokenKind::String,
            self.slice(start),
            Position::new(line, column, (self.pos - start) as u32),
        )
    }

    fn scan_char(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        match self.advance() {
            None => {
                self.had_error = true;
                Token::error(
                    self.slice(start),
                    Position::new(line, column, (self.pos - start) as u32),
                    LexErrorKind::UnterminatedChar,
                )
            }
            Some(byte) => Token::new(
                TokenKind::Char,
                self.slice(start),
                Position::new(line, column, (self.pos - start) as u32),
            )
            .with_value(LiteralValue::Char(byte)),
        }
    }

    fn scan_symbol(&mut self, start: usize, line: u32, column: u32) -> Token<'src> {
        let finish = |this: &Self, kind: TokenKind| {
            Token::new(
                kind,
                this.slice(start),
                Position::new(line, column, (this.pos - start) as u32),
            )
        };

        match self.peek() {
            Some(b'(') => {
                self.advance();
                finish(self, TokenKind::HashLeftParen)
            }
            Some(b'\'') => {
                self.advance(); // opening quote
                loop {
                    match self.peek() {
                        None => {
                            self.had_error = true;
                            return Token::error(
                                self.slice(start),
                                Position::new(line, column, (self.pos - start) as u32),
                                LexErrorKind::UnterminatedQuotedSymbol,
                            );
                        }
                        Some(b'\'') if self.peek_at(1) == Some(b'\'') => {
                            self.advance();
                            self.advance();
                        }
                        Some(b'\'') => {
                            self.advance();
                            break;
                        }
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                finish(self, TokenKind::Symbol)
            }
            Some(b) if is_ident_start(b) => {
                while self.peek().is_some_and(is_ident_continue) {
                    self.advance();
                }
                while self.peek() == Some(b':') {
                    self.advance();
                    if self.peek().is_some_and(is_ident_start) {
                        while self.peek().is_some_and(is_ident_continue) {
                            self.advance();
                        }
                    } else {
                        break;
                    }
                }
                finish(self, TokenKind::Symbol)
            }
            Some(b) if BINARY_SYMBOL_CHARS.contains(&b) => {
                self.advance();
                if self.peek().is_some_and(|b| BINARY_SYMBOL_CHARS.contains(&b)) {
                    self.advance();
                }
                finish(self, TokenKind::Symbol)
            }
            Some(b) => {
                self.had_error = true;
                Token::error(
                    self.slice(start),
                    Position::new(line, column, (self.pos - start) as u32),
                    LexErrorKind::InvalidSymbolStart(b as char),
                )
            }
            None => {
                self.had_error = true;
                Token::error(
                    self.slice(start),
                    Position::new(line, column, (self.pos - start) as u32),
                    LexErrorKind::InvalidSymbolStart('\0'),
                )
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}
