//! Inventory codes: an optional non-digit prefix followed by a zero-padded
//! decimal sequence number (`ALM-0042`).
//!
//! Codes order by their embedded sequence number. A code remembers the
//! prefix and padding it was written with so that the successor of an
//! observed code is rendered in the same convention. Padding is
//! presentation only: `ALM-5` and `ALM-0005` are the same code.

use crate::error::{AlmoxError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Widest zero-padding accepted; u64::MAX has 20 digits.
pub const MAX_WIDTH: usize = 20;

static CODE_RE: OnceLock<Regex> = OnceLock::new();

fn code_re() -> &'static Regex {
    CODE_RE.get_or_init(|| Regex::new(r"^([^0-9]*)([0-9]+)$").unwrap())
}

// ---------------------------------------------------------------------------
// Code
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code {
    prefix: String,
    sequence: u64,
    width: usize,
}

impl Code {
    pub fn new(prefix: impl Into<String>, sequence: u64, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            sequence,
            width,
        }
    }

    /// Parse a code as written, keeping its prefix and digit count.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let caps = code_re()
            .captures(trimmed)
            .ok_or_else(|| AlmoxError::InvalidCode(raw.to_string()))?;
        let digits = &caps[2];
        let sequence = digits
            .parse::<u64>()
            .map_err(|_| AlmoxError::InvalidCode(raw.to_string()))?;
        Ok(Self {
            prefix: caps[1].to_string(),
            sequence,
            width: digits.len(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// The code `n` steps after this one, in the same prefix and padding.
    pub fn successor(&self, n: u64) -> Result<Self> {
        let sequence = self
            .sequence
            .checked_add(n)
            .ok_or_else(|| AlmoxError::SequenceExhausted(self.to_string()))?;
        Ok(Self {
            prefix: self.prefix.clone(),
            sequence,
            width: self.width,
        })
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.prefix,
            self.sequence,
            width = self.width
        )
    }
}

impl FromStr for Code {
    type Err = AlmoxError;

    fn from_str(s: &str) -> Result<Self> {
        Code::parse(s)
    }
}

impl TryFrom<String> for Code {
    type Error = AlmoxError;

    fn try_from(value: String) -> Result<Self> {
        Code::parse(&value)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence && self.prefix == other.prefix
    }
}

impl Eq for Code {}

impl Hash for Code {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sequence.hash(state);
        self.prefix.hash(state);
    }
}

/// Sequence first, then prefix. Width never takes part.
impl Ord for Code {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.prefix.cmp(&other.prefix))
    }
}

impl PartialOrd for Code {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// CodeFormat
// ---------------------------------------------------------------------------

/// Convention for the first code of an empty store.
///
/// Once the store holds codes, successors follow the latest observed code
/// instead, so changing the format never renumbers existing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFormat {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_first")]
    pub first: u64,
}

fn default_prefix() -> String {
    "ALM-".to_string()
}

fn default_width() -> usize {
    4
}

fn default_first() -> u64 {
    1
}

impl Default for CodeFormat {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            width: default_width(),
            first: default_first(),
        }
    }
}

impl CodeFormat {
    /// Reject formats whose rendered codes would not parse back.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.chars().any(|c| c.is_ascii_digit()) {
            return Err(AlmoxError::InvalidArgument(format!(
                "code prefix '{}' must not contain digits",
                self.prefix
            )));
        }
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(AlmoxError::InvalidArgument(format!(
                "code width must be between 1 and {MAX_WIDTH}, got {}",
                self.width
            )));
        }
        Ok(())
    }

    pub fn first_code(&self) -> Result<Code> {
        self.validate()?;
        Ok(Code::new(self.prefix.clone(), self.first, self.width))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_prefix_and_padding() {
        let code = Code::parse("ALM-0005").unwrap();
        assert_eq!(code.prefix(), "ALM-");
        assert_eq!(code.sequence(), 5);
        assert_eq!(code.width(), 4);
        assert_eq!(code.to_string(), "ALM-0005");
    }

    #[test]
    fn parse_accepts_bare_numbers() {
        let code = Code::parse("0042").unwrap();
        assert_eq!(code.prefix(), "");
        assert_eq!(code.sequence(), 42);
        assert_eq!(code.to_string(), "0042");
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        for raw in ["", "ALM-", "ALM-12a", "A1-0001", "ALM-٣"] {
            assert!(
                matches!(Code::parse(raw), Err(AlmoxError::InvalidCode(_))),
                "expected InvalidCode for {raw:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_sequence_beyond_u64() {
        assert!(Code::parse("ALM-99999999999999999999999").is_err());
    }

    #[test]
    fn successor_keeps_convention_and_grows_past_width() {
        let code = Code::parse("ALM-9999").unwrap();
        let next = code.successor(1).unwrap();
        assert_eq!(next.to_string(), "ALM-10000");
        assert_eq!(next.width(), 4);
    }

    #[test]
    fn successor_overflow_is_exhausted() {
        let code = Code::new("X-", u64::MAX, 4);
        assert!(matches!(
            code.successor(1),
            Err(AlmoxError::SequenceExhausted(_))
        ));
    }

    #[test]
    fn ordering_follows_sequence_not_text() {
        let a = Code::parse("ALM-9").unwrap();
        let b = Code::parse("ALM-0010").unwrap();
        assert!(a < b);
        assert!("ALM-9" > "ALM-0010");
    }

    #[test]
    fn padding_does_not_change_identity() {
        let short = Code::parse("ALM-5").unwrap();
        let padded = Code::parse("ALM-0005").unwrap();
        assert_eq!(short, padded);
        assert_eq!(short.cmp(&padded), Ordering::Equal);
        assert_ne!(short.to_string(), padded.to_string());

        let other_prefix = Code::parse("EPI-0005").unwrap();
        assert_ne!(padded, other_prefix);
        assert!(padded < other_prefix);
    }

    #[test]
    fn serde_uses_string_form() {
        let code = Code::parse("ALM-0007").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"ALM-0007\"");
        let back: Code = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<Code>("\"nope\"").is_err());
    }

    #[test]
    fn default_format_first_code() {
        let first = CodeFormat::default().first_code().unwrap();
        assert_eq!(first.to_string(), "ALM-0001");
    }

    #[test]
    fn format_with_digit_prefix_is_rejected() {
        let format = CodeFormat {
            prefix: "A1-".into(),
            ..CodeFormat::default()
        };
        assert!(matches!(
            format.first_code(),
            Err(AlmoxError::InvalidArgument(_))
        ));
    }

    #[test]
    fn format_width_bounds() {
        let zero = CodeFormat {
            width: 0,
            ..CodeFormat::default()
        };
        assert!(zero.validate().is_err());
        let wide = CodeFormat {
            width: MAX_WIDTH + 1,
            ..CodeFormat::default()
        };
        assert!(wide.validate().is_err());
    }
}
