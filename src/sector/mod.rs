//! Sector methodologies.

pub mod residential;

use std::fmt;
use std::str::FromStr;

use crate::config::EstimateConfig;
use crate::dataset::{DatasetResolver, Table};
use crate::error::{EstimateError, Result};

/// Sectors the runner can process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    Residential,
}

impl Sector {
    pub const ALL: [Self; 1] = [Self::Residential];

    /// Name used in log lines and output file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
        }
    }

    /// Runs the sector's estimator and returns its output table.
    ///
    /// # Errors
    ///
    /// Propagates the estimator's resolution or methodology error.
    pub fn estimate(self, config: &EstimateConfig, resolver: &dyn DatasetResolver) -> Result<Table> {
        match self {
            Self::Residential => {
                let rows = residential::estimator(config).estimate(resolver)?;
                Ok(residential::to_table(&rows))
            }
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sector| sector.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EstimateError::UnmappedLabel {
                kind: "sector",
                label: s.to_string(),
            })
    }
}
