//! # smalltalk-syntax
//!
//! A syntactic front-end for the Smalltalk programming language.
//!
//! This crate does not evaluate anything. Given a source string it can produce:
//!
//! - a stream of classified [`Token`](token::Token)s with source coordinates and decoded
//!   literal values ([`Lexer`](lexer::Lexer)), or
//! - a [`Node`](ast::Node) tree of syntactic constructs (expressions, messages, blocks,
//!   literals) suitable for semantic analysis, compilation, or pretty-printing
//!   ([`Parser`](parser::Parser)).
//!
//! ```
//! use smalltalk_syntax::parse;
//!
//! let root = parse("x := 3 + 4 * 5.");
//! assert!(!root.had_error);
//! assert_eq!(root.tree.statements().len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Node, NodeKind};
pub use driver::{parse, parse_tokens, ParseOutcome};
pub use error::{Error, LexErrorKind, ParseErrorKind};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Position, Token, TokenKind};

/// Small inline-storage vector used throughout the AST for argument lists, block
/// parameters, and literal elements, which are almost always short.
///
/// Most Smalltalk keyword selectors carry one to three arguments, so four inline
/// slots avoid a heap allocation for the overwhelming majority of messages.
pub type StaticVec<T> = smallvec::SmallVec<[T; 4]>;

/// Small-string-optimised owned string used for identifiers, selectors, and decoded
/// string/symbol literal values.
pub type Ident = smartstring::alias::String;
