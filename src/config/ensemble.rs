use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnsembleFormatError;

/// One `(short, long)` moving-average window pair, `1 <= short < long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowPair {
    short: u32,
    long: u32,
}

impl WindowPair {
    pub fn new(short: u32, long: u32) -> Result<Self, EnsembleFormatError> {
        let token = format!("{short}:{long}");
        if short == 0 || long == 0 {
            return Err(EnsembleFormatError::NonPositiveWindow { token });
        }
        if short >= long {
            return Err(EnsembleFormatError::NotAscending { token, short, long });
        }
        Ok(Self { short, long })
    }

    #[must_use]
    pub fn short(self) -> u32 {
        self.short
    }

    #[must_use]
    pub fn long(self) -> u32 {
        self.long
    }
}

impl fmt::Display for WindowPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.short, self.long)
    }
}

/// Non-empty ordered list of window pairs, serialized as `s1:l1,s2:l2,...`.
///
/// `Display` is the canonical form: no whitespace, no empty tokens and
/// integers re-stringified (`05` becomes `5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnsembleSpec {
    pairs: Vec<WindowPair>,
}

impl EnsembleSpec {
    pub fn new(pairs: Vec<WindowPair>) -> Result<Self, EnsembleFormatError> {
        if pairs.is_empty() {
            return Err(EnsembleFormatError::Empty);
        }
        Ok(Self { pairs })
    }

    /// Parses user input. Tokens are comma separated; blank tokens are
    /// ignored and whitespace around numbers and separators is tolerated.
    pub fn parse(input: &str) -> Result<Self, EnsembleFormatError> {
        let mut pairs = Vec::new();
        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            pairs.push(parse_token(token)?);
        }
        Self::new(pairs)
    }

    #[must_use]
    pub fn pairs(&self) -> &[WindowPair] {
        &self.pairs
    }
}

/// Canonical serialization of `input`, or the parse failure.
pub fn canonicalize(input: &str) -> Result<String, EnsembleFormatError> {
    EnsembleSpec::parse(input).map(|spec| spec.to_string())
}

fn parse_token(token: &str) -> Result<WindowPair, EnsembleFormatError> {
    let malformed = || EnsembleFormatError::MalformedPair {
        token: token.to_owned(),
    };

    let (short_raw, long_raw) = token.split_once(':').ok_or_else(malformed)?;
    let short = parse_window(short_raw.trim(), token)?;
    let long = parse_window(long_raw.trim(), token)?;
    if short == 0 || long == 0 {
        return Err(EnsembleFormatError::NonPositiveWindow {
            token: token.to_owned(),
        });
    }
    if short >= long {
        return Err(EnsembleFormatError::NotAscending {
            token: token.to_owned(),
            short,
            long,
        });
    }
    Ok(WindowPair { short, long })
}

fn parse_window(raw: &str, token: &str) -> Result<u32, EnsembleFormatError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EnsembleFormatError::MalformedPair {
            token: token.to_owned(),
        });
    }
    // All-digit input only fails on overflow, which can never be a usable window.
    raw.parse::<u32>()
        .map_err(|_| EnsembleFormatError::NonPositiveWindow {
            token: token.to_owned(),
        })
}

impl fmt::Display for EnsembleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, pair) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{pair}")?;
        }
        Ok(())
    }
}

impl FromStr for EnsembleSpec {
    type Err = EnsembleFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EnsembleSpec {
    type Error = EnsembleFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EnsembleSpec> for String {
    fn from(spec: EnsembleSpec) -> Self {
        spec.to_string()
    }
}
