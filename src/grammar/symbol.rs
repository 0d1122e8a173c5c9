//! Grammar symbols.
//!
//! Every node in a pattern tree is labelled by a [`Symbol`]. Rule symbols
//! label internal nodes; terminal symbols label leaves carrying the exact
//! token text that was parsed (or that the renderer will print).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A grammar rule or terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Symbol {
    // === Rules ===
    /// Infix chain: `base # operand # operand ...`.
    ControlPattern,
    /// Named binary combinator or prefix transform applied to a body.
    PlayableTerm,
    /// Head of a binary combinator (`overlay`, `append`, ...).
    BinaryNamed,
    /// Prefix transform (`rev`, `fast 2`, `slow 0.5`, `iter 2`).
    PrefixCp,
    /// The `#` operator node inside a chain.
    CpInfixOp,
    /// `s("bd")`.
    SoundAtom,
    /// Wrapper around the sample-name string.
    SampleLiteral,
    /// `n "0 4"` or `n (scale "major" "0 2")`.
    NoteAtom,
    /// Wrapper around the `n`/`note` keyword.
    NoteToCp,
    /// `(scale "major" "0 2")`.
    ScaleCtor,
    /// Wrapper around the scale-name string.
    ScaleLiteral,
    /// Wrapper around the scale-degree pattern string.
    DegreeLiteral,
    /// `stack [..]` or `cat [..]`.
    ListsPlayable,
    /// The bracketed element list of a list combinator.
    ListPlayable,
    /// `struct ("t f") (body)`.
    MaskPlayable,
    /// Wrapper around the boolean mask string.
    BoolLiteral,
    /// `euclid (pulses) (steps) (body)`.
    EuclidPlayable,
    /// `striate (n) (body)`.
    StriatePlayable,
    /// Wrapper around an integer argument.
    IntLiteral,

    // === Terminals ===
    /// `s`
    S,
    /// `n`
    N,
    /// `note`
    Note,
    /// `(`
    LPar,
    /// `)`
    RPar,
    /// `#`
    OpHash,
    /// `stack`
    Stack,
    /// `cat`
    Cat,
    /// `overlay`
    Overlay,
    /// `append`
    Append,
    /// `fastAppend`
    FastAppend,
    /// `slowAppend`
    SlowAppend,
    /// `rev`
    Rev,
    /// `fast`
    Fast,
    /// `slow`
    Slow,
    /// `iter`
    Iter,
    /// `struct`
    Struct,
    /// `euclid`
    Euclid,
    /// `striate`
    Striate,
    /// Integer rate factor after `fast`/`slow`.
    TimeInt,
    /// Fractional rate factor after `fast`/`slow`.
    TimeDouble,
    /// Integer argument.
    Int,
    /// Quoted sample name, e.g. `"bd"`.
    SampleString,
    /// Quoted semitone pattern, e.g. `"0 4 7"`.
    NoteString,
    /// Quoted scale name, e.g. `"major"`.
    ScaleString,
    /// Quoted scale-degree pattern, e.g. `"0 2 4"`.
    DegreeString,
    /// Quoted boolean mask, e.g. `"t f t t"`.
    BoolString,
}

impl Symbol {
    /// Every symbol, rules first.
    pub const ALL: [Symbol; 46] = [
        Symbol::ControlPattern,
        Symbol::PlayableTerm,
        Symbol::BinaryNamed,
        Symbol::PrefixCp,
        Symbol::CpInfixOp,
        Symbol::SoundAtom,
        Symbol::SampleLiteral,
        Symbol::NoteAtom,
        Symbol::NoteToCp,
        Symbol::ScaleCtor,
        Symbol::ScaleLiteral,
        Symbol::DegreeLiteral,
        Symbol::ListsPlayable,
        Symbol::ListPlayable,
        Symbol::MaskPlayable,
        Symbol::BoolLiteral,
        Symbol::EuclidPlayable,
        Symbol::StriatePlayable,
        Symbol::IntLiteral,
        Symbol::S,
        Symbol::N,
        Symbol::Note,
        Symbol::LPar,
        Symbol::RPar,
        Symbol::OpHash,
        Symbol::Stack,
        Symbol::Cat,
        Symbol::Overlay,
        Symbol::Append,
        Symbol::FastAppend,
        Symbol::SlowAppend,
        Symbol::Rev,
        Symbol::Fast,
        Symbol::Slow,
        Symbol::Iter,
        Symbol::Struct,
        Symbol::Euclid,
        Symbol::Striate,
        Symbol::TimeInt,
        Symbol::TimeDouble,
        Symbol::Int,
        Symbol::SampleString,
        Symbol::NoteString,
        Symbol::ScaleString,
        Symbol::DegreeString,
        Symbol::BoolString,
    ];

    /// Grammar name of the symbol. Rules are `snake_case`, terminals
    /// `SCREAMING_CASE`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Symbol::ControlPattern => "control_pattern",
            Symbol::PlayableTerm => "playable_term",
            Symbol::BinaryNamed => "binary_named",
            Symbol::PrefixCp => "prefix_cp",
            Symbol::CpInfixOp => "cp_infix_op",
            Symbol::SoundAtom => "sound_atom",
            Symbol::SampleLiteral => "sample_literal",
            Symbol::NoteAtom => "note_atom",
            Symbol::NoteToCp => "note_to_cp",
            Symbol::ScaleCtor => "scale_ctor",
            Symbol::ScaleLiteral => "scale_literal",
            Symbol::DegreeLiteral => "degree_literal",
            Symbol::ListsPlayable => "lists_playable",
            Symbol::ListPlayable => "list_playable",
            Symbol::MaskPlayable => "mask_playable",
            Symbol::BoolLiteral => "bool_literal",
            Symbol::EuclidPlayable => "euclid_playable",
            Symbol::StriatePlayable => "striate_playable",
            Symbol::IntLiteral => "int_literal",
            Symbol::S => "S",
            Symbol::N => "N",
            Symbol::Note => "NOTE",
            Symbol::LPar => "LPAR",
            Symbol::RPar => "RPAR",
            Symbol::OpHash => "OP_HASH",
            Symbol::Stack => "STACK",
            Symbol::Cat => "CAT",
            Symbol::Overlay => "OVERLAY",
            Symbol::Append => "APPEND",
            Symbol::FastAppend => "FASTAPPEND",
            Symbol::SlowAppend => "SLOWAPPEND",
            Symbol::Rev => "REV",
            Symbol::Fast => "FAST",
            Symbol::Slow => "SLOW",
            Symbol::Iter => "ITER",
            Symbol::Struct => "STRUCT",
            Symbol::Euclid => "EUCLID",
            Symbol::Striate => "STRIATE",
            Symbol::TimeInt => "TIME_INT",
            Symbol::TimeDouble => "TIME_DOUBLE",
            Symbol::Int => "INT",
            Symbol::SampleString => "SAMPLE_STRING",
            Symbol::NoteString => "NOTE_STRING",
            Symbol::ScaleString => "SCALE_STRING",
            Symbol::DegreeString => "DEGREE_STRING",
            Symbol::BoolString => "BOOL_STRING",
        }
    }

    /// Whether this symbol names a production rule (as opposed to a token).
    #[must_use]
    pub const fn is_rule(self) -> bool {
        matches!(
            self,
            Symbol::ControlPattern
                | Symbol::PlayableTerm
                | Symbol::BinaryNamed
                | Symbol::PrefixCp
                | Symbol::CpInfixOp
                | Symbol::SoundAtom
                | Symbol::SampleLiteral
                | Symbol::NoteAtom
                | Symbol::NoteToCp
                | Symbol::ScaleCtor
                | Symbol::ScaleLiteral
                | Symbol::DegreeLiteral
                | Symbol::ListsPlayable
                | Symbol::ListPlayable
                | Symbol::MaskPlayable
                | Symbol::BoolLiteral
                | Symbol::EuclidPlayable
                | Symbol::StriatePlayable
                | Symbol::IntLiteral
        )
    }

    /// Whether this symbol can stand on its own as a playable pattern.
    ///
    /// Playable symbols fit every slot that takes a pattern, including the
    /// base of an infix chain. `control_pattern` is deliberately excluded:
    /// it may not be the base of another chain.
    #[must_use]
    pub const fn is_playable(self) -> bool {
        matches!(
            self,
            Symbol::PlayableTerm
                | Symbol::SoundAtom
                | Symbol::NoteAtom
                | Symbol::ListsPlayable
                | Symbol::MaskPlayable
                | Symbol::EuclidPlayable
                | Symbol::StriatePlayable
        )
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name any grammar symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grammar symbol: {0}")]
pub struct UnknownSymbol(pub String);

impl FromStr for Symbol {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::ALL
            .iter()
            .copied()
            .find(|sym| sym.name() == s)
            .ok_or_else(|| UnknownSymbol(s.to_string()))
    }
}

impl TryFrom<String> for Symbol {
    type Error = UnknownSymbol;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for &'static str {
    fn from(symbol: Symbol) -> Self {
        symbol.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let names: HashSet<&str> = Symbol::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), Symbol::ALL.len());

        for symbol in Symbol::ALL {
            assert_eq!(symbol.name().parse::<Symbol>().unwrap(), symbol);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "cp_jux_playable".parse::<Symbol>().unwrap_err();
        assert_eq!(err, UnknownSymbol("cp_jux_playable".to_string()));
    }

    #[test]
    fn test_playable_symbols_are_rules() {
        for symbol in Symbol::ALL {
            if symbol.is_playable() {
                assert!(symbol.is_rule(), "{symbol} should be a rule");
            }
        }
        assert!(!Symbol::ControlPattern.is_playable());
        assert!(!Symbol::SampleString.is_rule());
    }

    #[test]
    fn test_serde_uses_grammar_names() {
        let json = serde_json::to_string(&Symbol::OpHash).unwrap();
        assert_eq!(json, "\"OP_HASH\"");
        let back: Symbol = serde_json::from_str("\"lists_playable\"").unwrap();
        assert_eq!(back, Symbol::ListsPlayable);
    }
}
