//! Driver (C5): the two small entry points that wire the lexer and parser together.
//!
//! Neither function here does anything the lexer or parser couldn't already do on its
//! own. This module only owns the wiring: read source text, run the front end to
//! completion, hand back whatever tree or tokens were produced together with the
//! `hadError` flag, and never silently swallow it (§4.4). Consumers (the CLI, tests,
//! or a future semantic-analysis pass) call into here rather than driving a
//! [`Parser`] or [`Lexer`] directly.

use crate::ast::Node;
use crate::error::Error;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::token::Token;

/// The result of parsing a complete source buffer: the tree, plus whether parsing
/// was clean.
///
/// `tree` is always populated, even when `had_error` is set — it may just be
/// partial, missing the statements that couldn't be recovered past (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub tree: Node,
    pub had_error: bool,
    pub errors: Vec<Error>,
}

/// Parses `source` into a syntax tree.
///
/// ```
/// use smalltalk_syntax::parse;
///
/// let root = parse("x := 3 + 4 * 5.");
/// assert!(!root.had_error);
/// assert_eq!(root.tree.statements().len(), 1);
/// ```
#[must_use]
pub fn parse(source: &str) -> ParseOutcome {
    let span = tracing::info_span!("smalltalk_syntax::parse", source_len = source.len());
    let _enter = span.enter();

    let mut parser = Parser::new(source);
    let tree = parser.parse();
    let had_error = parser.had_error();
    let errors = parser.errors().to_vec();

    if had_error {
        tracing::warn!(error_count = errors.len(), "parse completed with errors");
    } else {
        tracing::debug!("parse completed cleanly");
    }

    ParseOutcome {
        tree,
        had_error,
        errors,
    }
}

/// Lexes `source` into its full token stream, including the terminal `EOF` (§4.1).
///
/// Unlike [`parse`], lexical errors are not collected separately here: an `Error`
/// token carries its own [`LexErrorKind`](crate::error::LexErrorKind) inline, the way
/// a `--mode tokens` dump wants to see it.
#[must_use]
pub fn parse_tokens(source: &str) -> Vec<Token<'_>> {
    let span = tracing::debug_span!("smalltalk_syntax::parse_tokens", source_len = source.len());
    let _enter = span.enter();

    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tracing::debug!(token_count = tokens.len(), "tokenisation finished");
    tokens
}

