use serde::{Deserialize, Serialize};
use std::fmt;

/// Ternary sentiment class of a word or opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

impl Polarity {
    /// +1, 0 or -1.
    pub fn score(self) -> i32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Neutral => 0,
            Polarity::Negative => -1,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Polarity::Positive => "POSITIVE",
            Polarity::Neutral => "NEUTRAL",
            Polarity::Negative => "NEGATIVE",
        };
        f.write_str(s)
    }
}
