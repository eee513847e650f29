//! Shared helpers for the planner integration tests

#![allow(dead_code)]

use pathkit_planner::{CommandLine, Word};

/// Tokenize one line of plain G-Code text such as `"G1 X10 F600"`
pub fn line(line_no: u32, text: &str) -> CommandLine {
    let words = text
        .split_whitespace()
        .map(|token| {
            let (letter, raw) = token.split_at(1);
            let value: f64 = raw.parse().expect("numeric word value");
            let letter = letter.chars().next().expect("word letter");
            Word::with_raw(letter, value, raw)
        })
        .collect();
    CommandLine { line_no, words }
}

/// Tokenize a multi-line program, numbering lines from 1
pub fn program(text: &str) -> Vec<CommandLine> {
    text.lines()
        .enumerate()
        .map(|(i, l)| line(i as u32 + 1, l))
        .collect()
}
