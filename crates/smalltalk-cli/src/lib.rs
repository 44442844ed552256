//! The library half of the CLI: argument model plus the actual run loop. `src/bin`
//! stays a thin shell that only owns process exit codes.

pub mod args;

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use args::Mode;
use smalltalk_syntax::{parse, parse_tokens, Node, NodeKind};

/// Reads `path`, runs the requested front-end pass, and prints the result to stdout.
///
/// Returns `Ok(true)` when lexing/parsing completed with no errors, `Ok(false)` when
/// it completed but `hadError` was set (diagnostics already went to stderr), and
/// `Err` only for the file-read failure itself.
pub fn run(path: &Path, mode: Mode) -> anyhow::Result<bool> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("could not read '{}'", path.display()))?;

    match mode {
        Mode::Tokens => {
            let tokens = parse_tokens(&source);
            for token in &tokens {
                println!("{:?} {:?} {}", token.position, token.kind, token.lexeme);
            }
            Ok(true)
        }
        Mode::Ast => {
            let outcome = parse(&source);
            print!("{}", render(&outcome.tree, 0));
            for error in &outcome.errors {
                eprintln!("{error}");
            }
            Ok(!outcome.had_error)
        }
    }
}

/// A minimal indented debug-rendering of a syntax tree, for `--mode ast`.
///
/// Not meant as a stable machine format — just enough structure for a human (or a
/// test's `assert!(rendered.contains(...))`) to read at a glance.
fn render(node: &Node, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let mut out = String::new();
    let _ = writeln!(out, "{indent}{:?} @ {}:{}", discriminant_name(&node.kind), node.line, node.column);
    for child in children(node) {
        out.push_str(&render(child, depth + 1));
    }
    out
}

fn discriminant_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::IntegerLiteral(_) => "IntegerLiteral",
        NodeKind::FloatLiteral(_) => "FloatLiteral",
        NodeKind::ScaledLiteral { .. } => "ScaledLiteral",
        NodeKind::CharLiteral(_) => "CharLiteral",
        NodeKind::StringLiteral(_) => "StringLiteral",
        NodeKind::SymbolLiteral(_) => "SymbolLiteral",
        NodeKind::ArrayLiteral(_) => "ArrayLiteral",
        NodeKind::ByteArrayLiteral(_) => "ByteArrayLiteral",
        NodeKind::Constant(_) => "Constant",
        NodeKind::Variable { .. } => "Variable",
        NodeKind::Assignment { .. } => "Assignment",
        NodeKind::Return(_) => "Return",
        NodeKind::UnaryMessage { .. } => "UnaryMessage",
        NodeKind::BinaryMessage { .. } => "BinaryMessage",
        NodeKind::KeywordMessage { .. } => "KeywordMessage",
        NodeKind::Cascade { .. } => "Cascade",
        NodeKind::Block { .. } => "Block",
        NodeKind::ArrayExpression(_) => "ArrayExpression",
        NodeKind::Method { .. } => "Method",
    }
}

fn children(node: &Node) -> Vec<&Node> {
    match &node.kind {
        NodeKind::ArrayLiteral(elements) | NodeKind::ArrayExpression(elements) => {
            elements.iter().collect()
        }
        NodeKind::Assignment { value, .. } | NodeKind::Return(value) => vec![value.as_ref()],
        NodeKind::UnaryMessage { receiver, .. } => {
            receiver.iter().map(|r| r.as_ref()).collect()
        }
        NodeKind::BinaryMessage { receiver, argument, .. } => receiver
            .iter()
            .map(|r| r.as_ref())
            .chain(std::iter::once(argument.as_ref()))
            .collect(),
        NodeKind::KeywordMessage { receiver, arguments, .. } => receiver
            .iter()
            .map(|r| r.as_ref())
            .chain(arguments.iter())
            .collect(),
        NodeKind::Cascade { receiver, messages } => {
            std::iter::once(receiver.as_ref()).chain(messages.iter()).collect()
        }
        NodeKind::Block { statements, .. } | NodeKind::Method { statements, .. } => {
            statements.iter().collect()
        }
        _ => Vec::new(),
    }
}
