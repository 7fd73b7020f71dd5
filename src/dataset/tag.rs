//! Canonical dataset identifiers accepted by `--tag`.

use std::fmt;
use std::str::FromStr;

use crate::error::EstimateError;

/// Tag naming one input dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetTag {
    /// Energy use by municipality; its `municipal` column is the authoritative municipality list.
    Eowld,
    CbecsEl,
    CbecsFo,
    CbecsNg,
    CbecsSources,
    MecsFuc,
    MecsEuc,
    MecsFce,
    /// Household fuel consumption averages.
    RecsHfc,
    /// Household fuel expenditure averages.
    RecsHfe,
    /// Structural characteristics (housing-type distribution per state).
    RecsSc,
    /// Housing units in structure, per municipality.
    AcsUis,
    /// House heating fuel, per municipality.
    AcsHf,
    MasssaveCi,
    /// Residential utility program usage per municipality and year.
    MasssaveRes,
}

impl DatasetTag {
    pub const ALL: [Self; 15] = [
        Self::Eowld,
        Self::CbecsEl,
        Self::CbecsFo,
        Self::CbecsNg,
        Self::CbecsSources,
        Self::MecsFuc,
        Self::MecsEuc,
        Self::MecsFce,
        Self::RecsHfc,
        Self::RecsHfe,
        Self::RecsSc,
        Self::AcsUis,
        Self::AcsHf,
        Self::MasssaveCi,
        Self::MasssaveRes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eowld => "eowld",
            Self::CbecsEl => "cbecs_el",
            Self::CbecsFo => "cbecs_fo",
            Self::CbecsNg => "cbecs_ng",
            Self::CbecsSources => "cbecs_sources",
            Self::MecsFuc => "mecs_fuc",
            Self::MecsEuc => "mecs_euc",
            Self::MecsFce => "mecs_fce",
            Self::RecsHfc => "recs_hfc",
            Self::RecsHfe => "recs_hfe",
            Self::RecsSc => "recs_sc",
            Self::AcsUis => "acs_uis",
            Self::AcsHf => "acs_hf",
            Self::MasssaveCi => "masssave_ci",
            Self::MasssaveRes => "masssave_res",
        }
    }
}

impl fmt::Display for DatasetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetTag {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| EstimateError::UnknownTag(s.to_string()))
    }
}
