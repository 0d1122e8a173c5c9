//! Typed constructors for every grammar shape the engine builds.
//!
//! Each function returns exactly the node layout the parser produces for the
//! corresponding text, so trees assembled here survive a render/parse round
//! trip. Operators never assemble rule nodes by hand.

use crate::grammar::Symbol;
use crate::tree::Node;

/// `n` or `note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFn {
    /// `n`
    N,
    /// `note`
    Note,
}

/// Head of a list combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListHead {
    /// `stack [..]`
    Stack,
    /// `cat [..]`
    Cat,
}

/// Head of a binary combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryHead {
    /// `overlay (a) (b)`
    Overlay,
    /// `append (a) (b)`
    Append,
    /// `fastAppend (a) (b)`
    FastAppend,
    /// `slowAppend (a) (b)`
    SlowAppend,
}

/// Unary prefix transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prefix {
    /// `rev (body)`
    Rev,
    /// `fast k (body)`
    Fast(f64),
    /// `slow k (body)`
    Slow(f64),
    /// `iter k (body)`
    Iter(u32),
}

/// Wrap `text` in double quotes.
#[must_use]
pub fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}

/// Strip surrounding double quotes, if present.
#[must_use]
pub fn unquoted(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn lpar() -> Node {
    Node::terminal(Symbol::LPar, "(")
}

fn rpar() -> Node {
    Node::terminal(Symbol::RPar, ")")
}

/// `int_literal` over an `INT`.
#[must_use]
pub fn int_literal(value: u32) -> Node {
    Node::rule(
        Symbol::IntLiteral,
        vec![Node::terminal(Symbol::Int, value.to_string())],
    )
}

/// `s("sample")`.
#[must_use]
pub fn sound_atom(sample: &str) -> Node {
    Node::rule(
        Symbol::SoundAtom,
        vec![
            Node::terminal(Symbol::S, "s"),
            lpar(),
            Node::rule(
                Symbol::SampleLiteral,
                vec![Node::terminal(Symbol::SampleString, quoted(sample))],
            ),
            rpar(),
        ],
    )
}

fn note_to_cp(func: NoteFn) -> Node {
    let token = match func {
        NoteFn::N => Node::terminal(Symbol::N, "n"),
        NoteFn::Note => Node::terminal(Symbol::Note, "note"),
    };
    Node::rule(Symbol::NoteToCp, vec![token])
}

/// `n "0 4 7"` or `note "0 4 7"`.
#[must_use]
pub fn note_atom(func: NoteFn, pattern: &str) -> Node {
    Node::rule(
        Symbol::NoteAtom,
        vec![
            note_to_cp(func),
            Node::terminal(Symbol::NoteString, quoted(pattern)),
        ],
    )
}

/// `n (scale "major" "0 2 4")`.
#[must_use]
pub fn scale_note_atom(scale: &str, degrees: &str) -> Node {
    let ctor = Node::rule(
        Symbol::ScaleCtor,
        vec![
            Node::rule(
                Symbol::ScaleLiteral,
                vec![Node::terminal(Symbol::ScaleString, quoted(scale))],
            ),
            Node::rule(
                Symbol::DegreeLiteral,
                vec![Node::terminal(Symbol::DegreeString, quoted(degrees))],
            ),
        ],
    );
    Node::rule(Symbol::NoteAtom, vec![note_to_cp(NoteFn::N), ctor])
}

fn infix_hash() -> Node {
    Node::rule(
        Symbol::CpInfixOp,
        vec![Node::terminal(Symbol::OpHash, "#")],
    )
}

/// `base # op1 # op2 ...`.
///
/// When `base` is already a chain the operands are appended to it, keeping
/// the chain flat. Operands must be note or sound atoms.
#[must_use]
pub fn chain(base: Node, operands: Vec<Node>) -> Node {
    debug_assert!(
        operands
            .iter()
            .all(|o| matches!(o.symbol(), Symbol::NoteAtom | Symbol::SoundAtom))
    );
    let mut children = if base.symbol() == Symbol::ControlPattern {
        base.into_children()
    } else {
        vec![base]
    };
    children.reserve(operands.len() * 2);
    for operand in operands {
        children.push(infix_hash());
        children.push(operand);
    }
    Node::rule(Symbol::ControlPattern, children)
}

/// `stack [e1, e2, ...]` or `cat [...]`.
#[must_use]
pub fn lists(head: ListHead, elements: Vec<Node>) -> Node {
    let token = match head {
        ListHead::Stack => Node::terminal(Symbol::Stack, "stack"),
        ListHead::Cat => Node::terminal(Symbol::Cat, "cat"),
    };
    Node::rule(
        Symbol::ListsPlayable,
        vec![token, Node::rule(Symbol::ListPlayable, elements)],
    )
}

/// `head (left) (right)`.
#[must_use]
pub fn binary(head: BinaryHead, left: Node, right: Node) -> Node {
    let token = match head {
        BinaryHead::Overlay => Node::terminal(Symbol::Overlay, "overlay"),
        BinaryHead::Append => Node::terminal(Symbol::Append, "append"),
        BinaryHead::FastAppend => Node::terminal(Symbol::FastAppend, "fastAppend"),
        BinaryHead::SlowAppend => Node::terminal(Symbol::SlowAppend, "slowAppend"),
    };
    Node::rule(
        Symbol::PlayableTerm,
        vec![Node::rule(Symbol::BinaryNamed, vec![token]), left, right],
    )
}

// Whole factors print as integers at any magnitude. `Display` for a
// fractional finite f64 never uses an exponent and always has a dot.
fn time_value(factor: f64) -> Node {
    if factor.fract() == 0.0 {
        Node::terminal(Symbol::TimeInt, format!("{factor:.0}"))
    } else {
        Node::terminal(Symbol::TimeDouble, factor.to_string())
    }
}

/// `prefix (body)`.
#[must_use]
pub fn prefixed(prefix: Prefix, body: Node) -> Node {
    let head = match prefix {
        Prefix::Rev => vec![Node::terminal(Symbol::Rev, "rev")],
        Prefix::Fast(factor) => vec![Node::terminal(Symbol::Fast, "fast"), time_value(factor)],
        Prefix::Slow(factor) => vec![Node::terminal(Symbol::Slow, "slow"), time_value(factor)],
        Prefix::Iter(k) => vec![Node::terminal(Symbol::Iter, "iter"), int_literal(k)],
    };
    Node::rule(
        Symbol::PlayableTerm,
        vec![Node::rule(Symbol::PrefixCp, head), body],
    )
}

/// `struct ("t f ...") (body)`.
#[must_use]
pub fn mask(bits: &str, body: Node) -> Node {
    Node::rule(
        Symbol::MaskPlayable,
        vec![
            Node::terminal(Symbol::Struct, "struct"),
            lpar(),
            Node::rule(
                Symbol::BoolLiteral,
                vec![Node::terminal(Symbol::BoolString, quoted(bits))],
            ),
            rpar(),
            lpar(),
            body,
            rpar(),
        ],
    )
}

/// `euclid (pulses) (steps) (body)`.
#[must_use]
pub fn euclid(pulses: u32, steps: u32, body: Node) -> Node {
    Node::rule(
        Symbol::EuclidPlayable,
        vec![
            Node::terminal(Symbol::Euclid, "euclid"),
            lpar(),
            int_literal(pulses),
            rpar(),
            lpar(),
            int_literal(steps),
            rpar(),
            lpar(),
            body,
            rpar(),
        ],
    )
}

/// `striate (n) (body)`.
#[must_use]
pub fn striate(n: u32, body: Node) -> Node {
    Node::rule(
        Symbol::StriatePlayable,
        vec![
            Node::terminal(Symbol::Striate, "striate"),
            lpar(),
            int_literal(n),
            rpar(),
            lpar(),
            body,
            rpar(),
        ],
    )
}
