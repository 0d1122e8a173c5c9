//! Pattern-text parser.
//!
//! The parser itself is derived by `pest` from `pattern.pest`; this module
//! only turns the resulting pairs into [`Node`]s. Every named rule becomes a
//! rule node and every atomic token becomes a terminal with its exact text,
//! so the tree mirrors the derivation one-to-one.

use crate::error::ParseError;
use crate::grammar::Symbol;
use crate::tree::{Node, Tree};
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar/pattern.pest"]
struct PatternParser;

/// Parse pattern text into a derivation tree.
///
/// Successful parsing is the validity check for trees: a tree is valid when
/// its rendering parses back to it.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] when the text does not match the grammar.
pub fn parse(text: &str) -> Result<Tree, ParseError> {
    let mut pairs = PatternParser::parse(Rule::pattern, text)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;

    let pattern = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("empty input".to_string()))?;

    let expr = pattern
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or_else(|| ParseError::Syntax("missing expression".to_string()))?;

    build(expr).map(Tree::new)
}

fn build(pair: Pair<'_, Rule>) -> Result<Node, ParseError> {
    let symbol = symbol_for(pair.as_rule())?;
    if symbol.is_rule() {
        let mut children = pair
            .into_inner()
            .map(build)
            .collect::<Result<Vec<_>, _>>()?;
        if symbol == Symbol::ControlPattern
            && children.len() == 1
            && let Some(base) = children.pop()
        {
            return Ok(base);
        }
        if children.is_empty() {
            Ok(Node::leaf(symbol))
        } else {
            Ok(Node::rule(symbol, children))
        }
    } else {
        Ok(Node::terminal(symbol, pair.as_str()))
    }
}

fn symbol_for(rule: Rule) -> Result<Symbol, ParseError> {
    let symbol = match rule {
        Rule::control_pattern => Symbol::ControlPattern,
        Rule::cp_infix_op => Symbol::CpInfixOp,
        Rule::playable_term => Symbol::PlayableTerm,
        Rule::binary_named => Symbol::BinaryNamed,
        Rule::prefix_cp => Symbol::PrefixCp,
        Rule::lists_playable => Symbol::ListsPlayable,
        Rule::list_playable => Symbol::ListPlayable,
        Rule::mask_playable => Symbol::MaskPlayable,
        Rule::euclid_playable => Symbol::EuclidPlayable,
        Rule::striate_playable => Symbol::StriatePlayable,
        Rule::sound_atom => Symbol::SoundAtom,
        Rule::sample_literal => Symbol::SampleLiteral,
        Rule::note_atom => Symbol::NoteAtom,
        Rule::note_to_cp => Symbol::NoteToCp,
        Rule::scale_ctor => Symbol::ScaleCtor,
        Rule::scale_literal => Symbol::ScaleLiteral,
        Rule::degree_literal => Symbol::DegreeLiteral,
        Rule::bool_literal => Symbol::BoolLiteral,
        Rule::int_literal => Symbol::IntLiteral,
        Rule::S => Symbol::S,
        Rule::N => Symbol::N,
        Rule::NOTE => Symbol::Note,
        Rule::STACK => Symbol::Stack,
        Rule::CAT => Symbol::Cat,
        Rule::OVERLAY => Symbol::Overlay,
        Rule::APPEND => Symbol::Append,
        Rule::FASTAPPEND => Symbol::FastAppend,
        Rule::SLOWAPPEND => Symbol::SlowAppend,
        Rule::REV => Symbol::Rev,
        Rule::FAST => Symbol::Fast,
        Rule::SLOW => Symbol::Slow,
        Rule::ITER => Symbol::Iter,
        Rule::STRUCT => Symbol::Struct,
        Rule::EUCLID => Symbol::Euclid,
        Rule::STRIATE => Symbol::Striate,
        Rule::LPAR => Symbol::LPar,
        Rule::RPAR => Symbol::RPar,
        Rule::OP_HASH => Symbol::OpHash,
        Rule::TIME_DOUBLE => Symbol::TimeDouble,
        Rule::TIME_INT => Symbol::TimeInt,
        Rule::INT => Symbol::Int,
        Rule::SAMPLE_STRING => Symbol::SampleString,
        Rule::NOTE_STRING => Symbol::NoteString,
        Rule::SCALE_STRING => Symbol::ScaleString,
        Rule::DEGREE_STRING => Symbol::DegreeString,
        Rule::BOOL_STRING => Symbol::BoolString,
        other => return Err(ParseError::UnexpectedRule(format!("{other:?}"))),
    };
    Ok(symbol)
}
