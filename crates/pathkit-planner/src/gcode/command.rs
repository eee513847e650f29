//! Tokenized G-Code input
//!
//! The planner does not read G-Code text. Each source line arrives as a
//! [`CommandLine`]: its line number plus the words an external tokenizer
//! found on it, in source order.

use serde::{Deserialize, Serialize};

/// A single letter/value pair such as `G1`, `X10.5` or `F600`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Upper-case word letter
    pub letter: char,
    /// Numeric value
    pub value: f64,
    /// Value as written in the source, e.g. `"01"` or `"59.1"`
    #[serde(default)]
    pub raw: String,
}

impl Word {
    pub fn new(letter: char, value: f64) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            value,
            raw: format_value(value),
        }
    }

    /// Word that keeps its source spelling
    pub fn with_raw(letter: char, value: f64, raw: impl Into<String>) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            value,
            raw: raw.into(),
        }
    }

    #[inline]
    pub fn value_f32(&self) -> f32 {
        self.value as f32
    }

    /// Canonical code number: `G01` and `G1` both give `"1"`, `G59.1` gives `"59.1"`
    pub fn canonical_code(&self) -> String {
        let value = self
            .raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(self.value);
        canonical_code(value)
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.raw.is_empty() {
            write!(f, "{}{}", self.letter, format_value(self.value))
        } else {
            write!(f, "{}{}", self.letter, self.raw)
        }
    }
}

/// Format a code number with at most one decimal and no trailing `.0`
pub fn canonical_code(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Axis words of one line; `None` for axes the line does not mention
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisWords(pub [Option<f32>; 3]);

impl AxisWords {
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    #[inline]
    pub fn get(&self, axis: usize) -> Option<f32> {
        self.0[axis]
    }
}

/// One tokenized source line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandLine {
    /// 1-based source line number
    pub line_no: u32,
    pub words: Vec<Word>,
}

impl CommandLine {
    /// Build a line from `(letter, value)` pairs
    pub fn from_pairs(line_no: u32, pairs: &[(char, f64)]) -> Self {
        Self {
            line_no,
            words: pairs.iter().map(|&(l, v)| Word::new(l, v)).collect(),
        }
    }

    /// Last word with the given letter (later words win)
    pub fn word(&self, letter: char) -> Option<&Word> {
        let letter = letter.to_ascii_uppercase();
        self.words.iter().rev().find(|w| w.letter == letter)
    }

    pub fn value(&self, letter: char) -> Option<f32> {
        self.word(letter).map(Word::value_f32)
    }

    /// G words in source order
    pub fn g_words(&self) -> impl Iterator<Item = &Word> {
        self.words.iter().filter(|w| w.letter == 'G')
    }

    pub fn axis_words(&self) -> AxisWords {
        AxisWords([self.value('X'), self.value('Y'), self.value('Z')])
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "N{}:", self.line_no)?;
        for word in &self.words {
            write!(f, " {}", word)?;
        }
        Ok(())
    }
}

/// Parse a JSON array of [`CommandLine`] records
pub fn program_from_json(json: &str) -> serde_json::Result<Vec<CommandLine>> {
    serde_json::from_str(json)
}
