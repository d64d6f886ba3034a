//! Verdict extraction from free-text reflections.
//!
//! A verdict is read only from a line consisting of a single `A`, `B` or `C`
//! (any case), optionally padded with spaces or tabs. Letters inside prose
//! never count. The first qualifying line in document order wins.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Standalone verdict line. Only `\n` ends a line; a trailing `\r` is allowed.
    static ref VERDICT_LINE: Regex = Regex::new(r"(?im)^[ \t]*([ABC])[ \t]*\r?$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// `A`: the answer is correct.
    Correct,
    /// `B`: the answer is incorrect.
    Incorrect,
    /// `C`: the model is not sure.
    Uncertain,
    /// No verdict line was found. Not the same as [`Verdict::Uncertain`].
    Unparseable,
}

impl Verdict {
    pub fn from_letter(letter: char) -> Self {
        match letter.to_ascii_uppercase() {
            'A' => Self::Correct,
            'B' => Self::Incorrect,
            'C' => Self::Uncertain,
            _ => Self::Unparseable,
        }
    }

    pub fn letter(&self) -> Option<char> {
        match self {
            Self::Correct => Some('A'),
            Self::Incorrect => Some('B'),
            Self::Uncertain => Some('C'),
            Self::Unparseable => None,
        }
    }

    /// Fixed score mapping. Unparseable verdicts carry no score.
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Correct => Some(1.0),
            Self::Incorrect => Some(0.0),
            Self::Uncertain => Some(0.5),
            Self::Unparseable => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        !matches!(self, Self::Unparseable)
    }
}

/// The uppercased letter of the first standalone verdict line, if any.
pub fn extract_letter(text: &str) -> Option<char> {
    VERDICT_LINE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_uppercase())
}

pub fn extract_verdict(text: &str) -> Verdict {
    extract_letter(text)
        .map(Verdict::from_letter)
        .unwrap_or(Verdict::Unparseable)
}

/// First non-blank line that is not itself the verdict line.
pub fn justification(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| !VERDICT_LINE.is_match(line))
}
