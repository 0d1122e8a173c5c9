#![no_main]

use libfuzzer_sys::fuzz_target;
use tidal_gp::grammar::{parse, render, round_trips};

fuzz_target!(|text: &str| {
    // Errors are fine; panics and non-canonical output are not.
    let Ok(tree) = parse(text) else {
        return;
    };
    assert!(round_trips(&tree), "render does not reparse: {}", render(&tree));
    assert_eq!(parse(&render(&tree)).ok().as_ref(), Some(&tree));
});
