//! Numeric cells that may be missing.

use serde::{Deserialize, Deserializer};

/// Cell spellings that mean "no value" in the survey tables.
const MISSING_SENTINELS: &[&str] = &["", "Q", "NA", "N/A", "NaN", "-"];

/// A numeric cell that is either a number or explicitly missing.
///
/// Missing is distinct from zero: sums skip it rather than adding `0.0`.
/// Thousands separators are stripped before parsing (`"1,250"` is `1250.0`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OptionalNumber(pub Option<f64>);

impl OptionalNumber {
    /// Parses a raw cell.
    ///
    /// # Errors
    ///
    /// Returns a message if the cell is neither a sentinel nor a number.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if MISSING_SENTINELS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(raw))
        {
            return Ok(Self(None));
        }
        let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
        cleaned
            .parse::<f64>()
            .map(|v| Self(if v.is_nan() { None } else { Some(v) }))
            .map_err(|_| format!("\"{raw}\" is not a number"))
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }

    /// Adds `other` into `self`, skipping missing operands.
    pub fn accumulate(self, other: Self) -> Self {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Self(Some(a + b)),
            (Some(a), None) | (None, Some(a)) => Self(Some(a)),
            (None, None) => Self(None),
        }
    }

    /// Sum that skips missing values; `None` when every value is missing.
    pub fn sum(values: impl IntoIterator<Item = Self>) -> Self {
        values.into_iter().fold(Self(None), Self::accumulate)
    }
}

impl<'de> Deserialize<'de> for OptionalNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
