//! Fuzz target for the scenario script parser
//!
//! # Strategy
//!
//! - Random bytes: arbitrary UTF-8 fed straight to the parser
//! - Structured lines: known command words followed by random arguments
//!
//! # Invariants
//!
//! - Parsing never panics
//! - A successful parse yields at most one command per source line
//! - Errors report a line number inside the source

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_cli::{CliError, parse_script};

const WORDS: [&str; 15] = [
    "channel", "create", "message", "select", "peer", "online", "offline", "dm", "star", "unstar",
    "disconnect", "connect", "upload", "signout", "show",
];

#[derive(Debug, Arbitrary)]
enum Input {
    Raw(String),
    Lines(Vec<(u8, String)>),
}

fuzz_target!(|input: Input| {
    let source = match input {
        Input::Raw(source) => source,
        Input::Lines(lines) => lines
            .into_iter()
            .map(|(word, args)| format!("{} {args}", WORDS[usize::from(word) % WORDS.len()]))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    let line_count = source.lines().count();

    match parse_script(&source) {
        Ok(commands) => assert!(commands.len() <= line_count),
        Err(CliError::Parse { line, .. }) => assert!(line >= 1 && line <= line_count),
        Err(e) => panic!("unexpected parse failure: {e}"),
    }
});
