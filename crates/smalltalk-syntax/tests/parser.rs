//! Parser-level coverage: one statement in, one shape out, for each syntactic
//! production the grammar defines.

use smalltalk_syntax::ast::Constant;
use smalltalk_syntax::{parse, NodeKind};

fn first_statement(source: &str) -> NodeKind {
    let outcome = parse(source);
    assert!(!outcome.had_error, "unexpected errors: {:?}", outcome.errors);
    outcome.tree.statements()[0].kind.clone()
}

#[test]
fn integer_literal() {
    assert!(matches!(first_statement("42."), NodeKind::IntegerLiteral(42)));
}

#[test]
fn negative_integer_literal() {
    assert!(matches!(first_statement("-7."), NodeKind::IntegerLiteral(-7)));
}

#[test]
fn float_literal() {
    match first_statement("3.5.") {
        NodeKind::FloatLiteral(value) => assert!((value - 3.5).abs() < f64::EPSILON),
        other => panic!("expected a float literal, got {other:?}"),
    }
}

#[test]
fn scaled_literal() {
    match first_statement("1.5s2.") {
        NodeKind::ScaledLiteral { value, scale } => {
            assert!((value - 1.5).abs() < f64::EPSILON);
            assert_eq!(scale, 2);
        }
        other => panic!("expected a scaled literal, got {other:?}"),
    }
}

#[test]
fn char_literal() {
    assert!(matches!(first_statement("$x."), NodeKind::CharLiteral(b'x')));
}

#[test]
fn string_literal_strips_quotes() {
    match first_statement("'hello'.") {
        NodeKind::StringLiteral(value) => assert_eq!(value.as_str(), "hello"),
        other => panic!("expected a string literal, got {other:?}"),
    }
}

#[test]
fn string_literal_collapses_doubled_quote() {
    match first_statement("'it''s'.") {
        NodeKind::StringLiteral(value) => assert_eq!(value.as_str(), "it's"),
        other => panic!("expected a string literal, got {other:?}"),
    }
}

#[test]
fn bare_symbol_literal_drops_the_hash() {
    match first_statement("#foo.") {
        NodeKind::SymbolLiteral(value) => assert_eq!(value.as_str(), "foo"),
        other => panic!("expected a symbol literal, got {other:?}"),
    }
}

#[test]
fn keyword_symbol_literal_keeps_every_colon() {
    match first_statement("#at:put:.") {
        NodeKind::SymbolLiteral(value) => assert_eq!(value.as_str(), "at:put:"),
        other => panic!("expected a symbol literal, got {other:?}"),
    }
}

#[test]
fn quoted_symbol_literal_collapses_doubled_quote() {
    match first_statement("#'it''s'.") {
        NodeKind::SymbolLiteral(value) => assert_eq!(value.as_str(), "it's"),
        other => panic!("expected a symbol literal, got {other:?}"),
    }
}

#[test]
fn pseudo_variables_are_flagged() {
    for source in ["self.", "super.", "thisContext."] {
        match first_statement(source) {
            NodeKind::Variable { is_pseudo, .. } => assert!(is_pseudo),
            other => panic!("expected a pseudo-variable, got {other:?}"),
        }
    }
}

#[test]
fn ordinary_identifier_is_not_pseudo() {
    match first_statement("x.") {
        NodeKind::Variable { name, is_pseudo } => {
            assert_eq!(name.as_str(), "x");
            assert!(!is_pseudo);
        }
        other => panic!("expected a variable, got {other:?}"),
    }
}

#[test]
fn constants() {
    assert!(matches!(first_statement("nil."), NodeKind::Constant(Constant::Nil)));
    assert!(matches!(first_statement("true."), NodeKind::Constant(Constant::True)));
    assert!(matches!(first_statement("false."), NodeKind::Constant(Constant::False)));
}

#[test]
fn assignment_captures_variable_and_value() {
    match first_statement("x := 1.") {
        NodeKind::Assignment { variable, value } => {
            assert_eq!(variable.as_str(), "x");
            assert!(matches!(value.kind, NodeKind::IntegerLiteral(1)));
        }
        other => panic!("expected an assignment, got {other:?}"),
    }
}

#[test]
fn chained_assignment_is_right_associative() {
    match first_statement("x := y := 1.") {
        NodeKind::Assignment { variable, value } => {
            assert_eq!(variable.as_str(), "x");
            match value.kind {
                NodeKind::Assignment { variable, .. } => assert_eq!(variable.as_str(), "y"),
                other => panic!("expected a nested assignment, got {other:?}"),
            }
        }
        other => panic!("expected an assignment, got {other:?}"),
    }
}

#[test]
fn return_statement_wraps_its_expression() {
    match first_statement("^42.") {
        NodeKind::Return(value) => assert!(matches!(value.kind, NodeKind::IntegerLiteral(42))),
        other => panic!("expected a return, got {other:?}"),
    }
}

#[test]
fn unary_message_send() {
    match first_statement("x foo.") {
        NodeKind::UnaryMessage { receiver, selector } => {
            assert_eq!(selector.as_str(), "foo");
            assert!(receiver.is_some());
        }
        other => panic!("expected a unary message, got {other:?}"),
    }
}

#[test]
fn unary_messages_chain_left_associatively() {
    // `x foo bar` is `(x foo) bar`, not `x (foo bar)`.
    match first_statement("x foo bar.") {
        NodeKind::UnaryMessage { receiver, selector } => {
            assert_eq!(selector.as_str(), "bar");
            match &receiver.unwrap().kind {
                NodeKind::UnaryMessage { selector, .. } => assert_eq!(selector.as_str(), "foo"),
                other => panic!("expected a nested unary message, got {other:?}"),
            }
        }
        other => panic!("expected a unary message, got {other:?}"),
    }
}

#[test]
fn binary_message_send() {
    match first_statement("1 + 2.") {
        NodeKind::BinaryMessage {
            receiver,
            selector,
            argument,
        } => {
            assert_eq!(selector.as_str(), "+");
            assert!(matches!(receiver.unwrap().kind, NodeKind::IntegerLiteral(1)));
            assert!(matches!(argument.kind, NodeKind::IntegerLiteral(2)));
        }
        other => panic!("expected a binary message, got {other:?}"),
    }
}

#[test]
fn keyword_message_concatenates_every_part_into_one_selector() {
    match first_statement("dict at: 1 put: 2.") {
        NodeKind::KeywordMessage {
            selector,
            arguments,
            ..
        } => {
            assert_eq!(selector.as_str(), "at:put:");
            assert_eq!(arguments.len(), 2);
            assert!(matches!(arguments[0].kind, NodeKind::IntegerLiteral(1)));
            assert!(matches!(arguments[1].kind, NodeKind::IntegerLiteral(2)));
        }
        other => panic!("expected a keyword message, got {other:?}"),
    }
}

#[test]
fn block_with_no_parameters() {
    match first_statement("[1. 2].") {
        NodeKind::Block {
            parameters,
            statements,
        } => {
            assert!(parameters.is_empty());
            assert_eq!(statements.len(), 2);
        }
        other => panic!("expected a block, got {other:?}"),
    }
}

#[test]
fn block_with_parameters() {
    match first_statement("[:a :b | a + b].") {
        NodeKind::Block {
            parameters,
            statements,
        } => {
            let names: Vec<&str> = parameters.iter().map(|p| p.as_str()).collect();
            assert_eq!(names, vec!["a", "b"]);
            assert_eq!(statements.len(), 1);
        }
        other => panic!("expected a block, got {other:?}"),
    }
}

#[test]
fn array_expression_holds_general_statements() {
    match first_statement("{1. x foo. 2 + 3}.") {
        NodeKind::ArrayExpression(statements) => assert_eq!(statements.len(), 3),
        other => panic!("expected an array expression, got {other:?}"),
    }
}

#[test]
fn array_literal_of_plain_literals() {
    match first_statement("#(1 2 3).") {
        NodeKind::ArrayLiteral(elements) => {
            assert_eq!(elements.len(), 3);
            assert!(matches!(elements[0].kind, NodeKind::IntegerLiteral(1)));
            assert!(matches!(elements[2].kind, NodeKind::IntegerLiteral(3)));
        }
        other => panic!("expected an array literal, got {other:?}"),
    }
}

#[test]
fn array_literal_bare_words_become_symbols() {
    match first_statement("#(foo bar: +).") {
        NodeKind::ArrayLiteral(elements) => {
            assert_eq!(elements.len(), 3);
            match &elements[0].kind {
                NodeKind::SymbolLiteral(value) => assert_eq!(value.as_str(), "foo"),
                other => panic!("expected a symbol, got {other:?}"),
            }
            match &elements[1].kind {
                NodeKind::SymbolLiteral(value) => assert_eq!(value.as_str(), "bar:"),
                other => panic!("expected a symbol, got {other:?}"),
            }
            match &elements[2].kind {
                NodeKind::SymbolLiteral(value) => assert_eq!(value.as_str(), "+"),
                other => panic!("expected a symbol, got {other:?}"),
            }
        }
        other => panic!("expected an array literal, got {other:?}"),
    }
}

#[test]
fn array_literal_nests() {
    match first_statement("#(1 #(2 3) 4).") {
        NodeKind::ArrayLiteral(elements) => {
            assert_eq!(elements.len(), 3);
            match &elements[1].kind {
                NodeKind::ArrayLiteral(inner) => assert_eq!(inner.len(), 2),
                other => panic!("expected a nested array literal, got {other:?}"),
            }
        }
        other => panic!("expected an array literal, got {other:?}"),
    }
}

#[test]
fn cascade_shares_one_receiver_across_null_receiver_messages() {
    match first_statement("x foo; bar; baz: 1.") {
        NodeKind::Cascade { receiver, messages } => {
            assert!(matches!(receiver.kind, NodeKind::Variable { .. }));
            assert_eq!(messages.len(), 3);
            for message in &messages {
                match &message.kind {
                    NodeKind::UnaryMessage { receiver, .. } => assert!(receiver.is_none()),
                    NodeKind::KeywordMessage { receiver, .. } => assert!(receiver.is_none()),
                    other => panic!("unexpected cascade element {other:?}"),
                }
            }
        }
        other => panic!("expected a cascade, got {other:?}"),
    }
}

#[test]
fn cascade_first_message_selector_survives_the_split() {
    match first_statement("x foo; bar.") {
        NodeKind::Cascade { messages, .. } => match &messages[0].kind {
            NodeKind::UnaryMessage { selector, .. } => assert_eq!(selector.as_str(), "foo"),
            other => panic!("expected a unary message, got {other:?}"),
        },
        other => panic!("expected a cascade, got {other:?}"),
    }
}

#[test]
fn parenthesised_expression_is_transparent() {
    // `(1 + 2) * 3` must parse the same as `1 + 2 * 3` would if binary were
    // left-associative without parens at all — the parens here only group, they
    // don't introduce their own node kind.
    match first_statement("(1 + 2) * 3.") {
        NodeKind::BinaryMessage { selector, .. } => assert_eq!(selector.as_str(), "*"),
        other => panic!("expected a binary message, got {other:?}"),
    }
}

#[test]
fn multiple_statements_are_separated_by_periods() {
    let outcome = parse("1. 2. 3.");
    assert!(!outcome.had_error);
    assert_eq!(outcome.tree.statements().len(), 3);
}

#[test]
fn trailing_period_is_optional() {
    let outcome = parse("1");
    assert!(!outcome.had_error);
    assert_eq!(outcome.tree.statements().len(), 1);
}

#[test]
fn empty_source_parses_to_zero_statements() {
    let outcome = parse("");
    assert!(!outcome.had_error);
    assert!(outcome.tree.statements().is_empty());
}
