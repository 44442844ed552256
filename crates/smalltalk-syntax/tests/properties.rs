//! Invariant checks that cut across the lexer/parser/AST boundary: the shapes the
//! rest of the crate (and any future semantic-analysis pass) is allowed to rely on.

use smalltalk_syntax::ast::NodeKind;
use smalltalk_syntax::{parse, parse_tokens, TokenKind};

#[test]
fn every_cascade_message_is_a_message_node_with_no_receiver() {
    let outcome = parse("x foo: 1; bar; + 2.");
    assert!(!outcome.had_error);
    let NodeKind::Cascade { messages, .. } = &outcome.tree.statements()[0].kind else {
        panic!("expected a cascade");
    };
    for message in messages {
        assert!(message.kind.is_message(), "{:?} is not a message node", message.kind);
        let receiver_is_none = match &message.kind {
            NodeKind::UnaryMessage { receiver, .. } => receiver.is_none(),
            NodeKind::BinaryMessage { receiver, .. } => receiver.is_none(),
            NodeKind::KeywordMessage { receiver, .. } => receiver.is_none(),
            _ => false,
        };
        assert!(receiver_is_none);
    }
}

#[test]
fn keyword_message_argument_count_matches_colon_count_in_selector() {
    let outcome = parse("x at: 1 put: 2 ifAbsent: 3.");
    assert!(!outcome.had_error);
    let kind = &outcome.tree.statements()[0].kind;
    assert_eq!(kind.argument_count(), 3);
    let NodeKind::KeywordMessage { selector, .. } = kind else {
        panic!("expected a keyword message");
    };
    assert_eq!(selector.as_str().matches(':').count(), kind.argument_count());
}

#[test]
fn unary_and_binary_argument_counts_are_fixed() {
    let unary = parse("x foo.");
    assert_eq!(unary.tree.statements()[0].kind.argument_count(), 0);

    let binary = parse("x + 1.");
    assert_eq!(binary.tree.statements()[0].kind.argument_count(), 1);
}

#[test]
fn statements_accessor_is_empty_for_non_block_nodes() {
    let outcome = parse("42.");
    let literal = &outcome.tree.statements()[0];
    assert!(literal.statements().is_empty());
}

#[test]
fn parse_tokens_always_ends_with_a_single_eof() {
    for source in ["", "x", "1 + 2.", "\"unterminated"] {
        let tokens = parse_tokens(source);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1,
            "source {source:?} produced more than one Eof token"
        );
    }
}

#[test]
fn parse_tokens_on_empty_source_is_just_eof() {
    let tokens = parse_tokens("");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_eof());
}

#[test]
fn had_error_is_true_iff_the_errors_list_is_non_empty() {
    for source in ["1 + 2.", ")", "'unterminated", "x foo; bar."] {
        let outcome = parse(source);
        assert_eq!(outcome.had_error, !outcome.errors.is_empty());
    }
}

#[test]
fn parser_root_is_always_a_parameterless_block() {
    let outcome = parse("1. 2. 3.");
    match &outcome.tree.kind {
        NodeKind::Block { parameters, .. } => assert!(parameters.is_empty()),
        other => panic!("expected the root to be a Block, got {other:?}"),
    }
}

#[test]
fn reparsing_the_same_source_is_deterministic() {
    let source = "x := OrderedCollection new. x add: 1; add: 2; yourself.";
    let first = parse(source);
    let second = parse(source);
    assert_eq!(first.tree, second.tree);
    assert_eq!(first.had_error, second.had_error);
}
