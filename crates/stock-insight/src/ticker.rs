//! Ticker symbols

use crate::error::ResolutionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated, upper-case ticker symbol
///
/// One to five ASCII letters, optionally followed by a single `.` or `-` and a
/// one or two letter share-class suffix (`BRK-B`, `RDS.A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse a ticker from user-facing text
    ///
    /// Surrounding whitespace and a leading `$` are ignored; letters are
    /// upper-cased.
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let trimmed = raw.trim();
        let symbol = trimmed.strip_prefix('$').unwrap_or(trimmed).to_ascii_uppercase();

        if is_valid_symbol(&symbol) {
            Ok(Self(symbol))
        } else {
            Err(ResolutionError::InvalidTicker(raw.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_symbol(symbol: &str) -> bool {
    let (base, suffix) = match symbol.find(['.', '-']) {
        Some(idx) => (&symbol[..idx], Some(&symbol[idx + 1..])),
        None => (symbol, None),
    };

    let letters = |s: &str, max: usize| {
        !s.is_empty() && s.len() <= max && s.chars().all(|c| c.is_ascii_uppercase())
    };

    letters(base, 5) && suffix.is_none_or(|s| letters(s, 2))
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
