//! Error taxonomy for the lexer and parser (§7).
//!
//! Lexical and syntactic errors never unwind: they are carried as values, either
//! inline in an [`TokenKind::Error`](crate::token::TokenKind::Error) token or as the
//! [`hadError`](crate::parser::Parser::had_error) flag on the parser. This module
//! only defines the *shapes* of those values and their human-readable rendering.

use std::error::Error as StdError;
use std::fmt;

use crate::token::Position;

/// A lexical error kind, produced while scanning a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A `"`-delimited comment was never closed before end of input.
    UnterminatedComment,
    /// A `'`-delimited string was never closed before end of input.
    UnterminatedString,
    /// A `#'`-delimited quoted symbol was never closed before end of input.
    UnterminatedQuotedSymbol,
    /// `$` appeared at end of input with no character to decode.
    UnterminatedChar,
    /// The character following `#` does not start any of the four symbol grammars.
    InvalidSymbolStart(char),
    /// A radix literal's declared radix is not in `[2, 36]`.
    RadixOutOfRange(i64),
    /// A digit in a radix literal is not a valid digit in the declared radix.
    DigitOutOfRange { digit: char, radix: u32 },
    /// An exponent marker (`e`, `d`, `q`) was not followed by at least one digit.
    MissingExponentDigits,
    /// A byte that starts no valid token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedComment => f.write_str("unterminated comment"),
            Self::UnterminatedString => f.write_str("unterminated string"),
            Self::UnterminatedQuotedSymbol => f.write_str("unterminated quoted symbol"),
            Self::UnterminatedChar => f.write_str("'$' at end of input"),
            Self::InvalidSymbolStart(c) => {
                write!(f, "invalid character '{c}' after '#'")
            }
            Self::RadixOutOfRange(r) => write!(f, "radix {r} is out of range [2, 36]"),
            Self::DigitOutOfRange { digit, radix } => {
                write!(f, "digit '{digit}' is out of range for radix {radix}")
            }
            Self::MissingExponentDigits => f.write_str("missing digits after exponent marker"),
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
        }
    }
}

impl StdError for LexErrorKind {}

/// A syntactic error kind, produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The lexer emitted an [`TokenKind::Error`](crate::token::TokenKind::Error); wraps its kind.
    Lex(LexErrorKind),
    /// Input ended where a token was still expected.
    UnexpectedEof,
    /// Expected a specific token (e.g. a closing bracket) but found something else.
    ExpectedToken {
        expected: &'static str,
        found: String,
    },
    /// Expected the start of a primary expression but found something else.
    ExpectedPrimary { found: String },
    /// Expected a message selector after `;` inside a cascade.
    ExpectedCascadeSelector { found: String },
    /// A `;` followed a primary that was never the target of a message send, so there
    /// is no message to split a shared cascade receiver out of.
    CascadeReceiverNotAMessage,
    /// An array literal element was not a literal or bare identifier.
    InvalidArrayLiteralElement { found: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(kind) => write!(f, "{kind}"),
            Self::UnexpectedEof => f.write_str("unexpected end of input"),
            Self::ExpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::ExpectedPrimary { found } => {
                write!(f, "expected an expression, found {found}")
            }
            Self::ExpectedCascadeSelector { found } => {
                write!(f, "expected a message selector after ';', found {found}")
            }
            Self::CascadeReceiverNotAMessage => {
                f.write_str("';' must follow a message send, not a bare primary")
            }
            Self::InvalidArrayLiteralElement { found } => {
                write!(f, "invalid array literal element: {found}")
            }
        }
    }
}

impl StdError for ParseErrorKind {}

/// A fully-positioned error: the kind plus where in the source it occurred.
///
/// A tuple of "what" and "where", displayed together as `[line L, column C] Error:
/// message` (§6.3) by the driver and CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error(pub Box<ParseErrorKind>, pub Position);

impl Error {
    #[must_use]
    pub fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self(Box::new(kind), position)
    }

    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.0
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.1
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] Error: {}", self.1, self.0)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}
