//! Closed category enumerations and the survey label maps that feed them.
//!
//! Every source table spells housing-unit types and fuels its own way. Labels
//! are normalized here before any join; a label that is not in the relevant
//! map is an error rather than a silently dropped row.

use std::fmt;
use std::str::FromStr;

use crate::error::{EstimateError, Result};

/// Housing-unit-type category.
///
/// Declaration order matches the lexical order of the canonical tags, so the
/// derived `Ord` sorts the same way the tags do in the published output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HuType {
    /// Synthetic aggregate over every real category.
    Total,
    /// Single-family attached.
    U1a,
    /// Single-family detached.
    U1d,
    /// Apartments in 2-4 unit buildings.
    U2_4,
    /// Apartments in buildings with 5 or more units.
    U5ov,
    /// Mobile homes and other.
    UOth,
}

impl HuType {
    /// Real (non-synthetic) categories in canonical order.
    pub const REAL: [Self; 5] = [Self::U1a, Self::U1d, Self::U2_4, Self::U5ov, Self::UOth];

    /// All categories including the synthetic `total`.
    pub const ALL: [Self; 6] = [
        Self::Total,
        Self::U1a,
        Self::U1d,
        Self::U2_4,
        Self::U5ov,
        Self::UOth,
    ];

    /// Canonical tag written to the output table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::U1a => "u1a",
            Self::U1d => "u1d",
            Self::U2_4 => "u2_4",
            Self::U5ov => "u5ov",
            Self::UOth => "u_oth",
        }
    }

    /// Whether this is the synthetic aggregate category.
    pub fn is_total(self) -> bool {
        self == Self::Total
    }

    /// Maps a structural-characteristics (state weighting) label.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::UnmappedLabel`] for any label outside the map.
    pub fn from_structure_label(label: &str) -> Result<Self> {
        lookup(STRUCTURE_LABELS, label, "housing-unit-type")
    }

    /// Maps a household fuel consumption/expenditure table label.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::UnmappedLabel`] for any label outside the map.
    pub fn from_household_label(label: &str) -> Result<Self> {
        lookup(HOUSEHOLD_LABELS, label, "housing-unit-type")
    }
}

impl fmt::Display for HuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HuType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|hu| hu.as_str() == s)
            .ok_or_else(|| EstimateError::UnmappedLabel {
                kind: "housing-unit-type",
                label: s.to_string(),
            })
    }
}

/// Fuel category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fuel {
    Elec,
    Ng,
    Foil,
}

impl Fuel {
    pub const ALL: [Self; 3] = [Self::Elec, Self::Ng, Self::Foil];

    /// Fuels with a ground-truth program series. Fuel oil has none.
    pub const CALIBRATED: [Self; 2] = [Self::Elec, Self::Ng];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elec => "elec",
            Self::Ng => "ng",
            Self::Foil => "foil",
        }
    }

    /// Maps a source-table fuel label. Survey tables spell natural gas `gas`
    /// and fuel oil `oil`; the canonical tags are accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::UnmappedLabel`] for any label outside the map.
    pub fn from_source_label(label: &str) -> Result<Self> {
        lookup(FUEL_LABELS, label, "fuel")
    }
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size per-fuel container indexed by [`Fuel`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerFuel<T> {
    pub elec: T,
    pub ng: T,
    pub foil: T,
}

impl<T: Copy> PerFuel<T> {
    pub fn splat(value: T) -> Self {
        Self {
            elec: value,
            ng: value,
            foil: value,
        }
    }

    pub fn get(&self, fuel: Fuel) -> T {
        match fuel {
            Fuel::Elec => self.elec,
            Fuel::Ng => self.ng,
            Fuel::Foil => self.foil,
        }
    }
}

impl<T> PerFuel<T> {
    pub fn get_mut(&mut self, fuel: Fuel) -> &mut T {
        match fuel {
            Fuel::Elec => &mut self.elec,
            Fuel::Ng => &mut self.ng,
            Fuel::Foil => &mut self.foil,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Fuel, T) -> U) -> PerFuel<U> {
        PerFuel {
            elec: f(Fuel::Elec, self.elec),
            ng: f(Fuel::Ng, self.ng),
            foil: f(Fuel::Foil, self.foil),
        }
    }
}

const STRUCTURE_LABELS: &[(&str, HuType)] = &[
    ("Single Family Attached", HuType::U1a),
    ("Single Family Detached", HuType::U1d),
    ("Apartments in 2-4 Unit Buildings", HuType::U2_4),
    ("Apartments in 5 or more Unit Buildings", HuType::U5ov),
    ("Mobile Homes", HuType::UOth),
];

const HOUSEHOLD_LABELS: &[(&str, HuType)] = &[
    ("Total Households", HuType::Total),
    ("Single-Family Attached", HuType::U1a),
    ("Single-Family Detached", HuType::U1d),
    ("Apartments in 2-4 Unit Buildings", HuType::U2_4),
    ("Apartments in 5 or More Unit Buildings", HuType::U5ov),
    ("Mobile Homes", HuType::UOth),
];

const FUEL_LABELS: &[(&str, Fuel)] = &[
    ("elec", Fuel::Elec),
    ("ng", Fuel::Ng),
    ("gas", Fuel::Ng),
    ("foil", Fuel::Foil),
    ("oil", Fuel::Foil),
];

fn lookup<T: Copy>(map: &[(&str, T)], label: &str, kind: &'static str) -> Result<T> {
    let label = label.trim();
    map.iter()
        .find(|(source, _)| *source == label)
        .map(|(_, value)| *value)
        .ok_or_else(|| EstimateError::UnmappedLabel {
            kind,
            label: label.to_string(),
        })
}
