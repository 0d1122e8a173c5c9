//! Box-drawing pretty printer for trees.

use crate::tree::{Node, Tree};
use std::fmt::Write;

/// Render `tree` one node per line:
///
/// ```text
/// sound_atom
/// ├── S: s
/// ├── LPAR: (
/// ├── sample_literal
/// │   └── SAMPLE_STRING: "bd"
/// └── RPAR: )
/// ```
#[must_use]
pub fn pretty(tree: &Tree) -> String {
    let mut out = String::new();
    write_node(&mut out, tree.root(), "", None);
    out
}

fn write_node(out: &mut String, node: &Node, prefix: &str, is_last: Option<bool>) {
    let branch = match is_last {
        None => "",
        Some(true) => "└── ",
        Some(false) => "├── ",
    };
    match node.literal() {
        Some(literal) => {
            let _ = writeln!(out, "{prefix}{branch}{}: {literal}", node.symbol());
        }
        None => {
            let _ = writeln!(out, "{prefix}{branch}{}", node.symbol());
        }
    }

    let child_prefix = match is_last {
        None => String::new(),
        Some(true) => format!("{prefix}    "),
        Some(false) => format!("{prefix}│   "),
    };
    let count = node.children().len();
    for (i, child) in node.children().iter().enumerate() {
        write_node(out, child, &child_prefix, Some(i + 1 == count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse;

    #[test]
    fn test_pretty_sound_atom() {
        let tree = parse(r#"s("bd")"#).unwrap();
        let text = pretty(&tree);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "sound_atom");
        assert_eq!(lines[1], "├── S: s");
        assert_eq!(lines[3], "├── sample_literal");
        assert_eq!(lines[4], "│   └── SAMPLE_STRING: \"bd\"");
        assert_eq!(lines[5], "└── RPAR: )");
        assert_eq!(lines.len(), tree.size());
    }
}
