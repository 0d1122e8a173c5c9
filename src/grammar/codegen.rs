//! Tree-to-text rendering.
//!
//! Terminals print their literal text. The handful of tokens the grammar
//! keeps anonymous (brackets, commas, the parentheses around combinator
//! arguments, the `scale` keyword) are re-inserted from the shape of the
//! surrounding rule.

use crate::grammar::{Symbol, parse};
use crate::tree::{Node, Tree};

/// Render a tree as pattern text.
#[must_use]
pub fn render(tree: &Tree) -> String {
    render_node(tree.root())
}

/// Render a single subtree as pattern text.
#[must_use]
pub fn render_node(node: &Node) -> String {
    let mut tokens = Vec::with_capacity(node.size());
    emit(node, &mut tokens);
    join(&tokens)
}

/// Whether `tree` survives a render/parse round trip unchanged.
#[must_use]
pub fn round_trips(tree: &Tree) -> bool {
    parse(&render(tree)).is_ok_and(|parsed| parsed == *tree)
}

fn emit<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    if let Some(literal) = node.literal() {
        out.push(literal);
        return;
    }
    let children = node.children();
    match node.symbol() {
        Symbol::PlayableTerm => match children {
            [head, left, right] => {
                emit(head, out);
                parenthesized(left, out);
                parenthesized(right, out);
            }
            [prefix, body] => {
                emit(prefix, out);
                parenthesized(body, out);
            }
            _ => children.iter().for_each(|c| emit(c, out)),
        },
        Symbol::ListPlayable => {
            out.push("[");
            for (i, element) in children.iter().enumerate() {
                if i > 0 {
                    out.push(",");
                }
                emit(element, out);
            }
            out.push("]");
        }
        Symbol::ScaleCtor => {
            out.push("(");
            out.push("scale");
            children.iter().for_each(|c| emit(c, out));
            out.push(")");
        }
        _ => children.iter().for_each(|c| emit(c, out)),
    }
}

fn parenthesized<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    out.push("(");
    emit(node, out);
    out.push(")");
}

fn join(tokens: &[&str]) -> String {
    let mut text = String::new();
    let mut prev: Option<&str> = None;
    for &token in tokens {
        if let Some(p) = prev {
            let glued = matches!(p, "(" | "[")
                || matches!(token, ")" | "]" | ",")
                || (p == "s" && token == "(");
            if !glued {
                text.push(' ');
            }
        }
        text.push_str(token);
        prev = Some(token);
    }
    text
}
