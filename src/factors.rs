//! Year-indexed conversion and emissions factors.

use std::collections::BTreeMap;

/// Conversion (MMBtu per physical unit) and emissions (CO2 per physical unit)
/// factors that apply to one fuel in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelFactors {
    pub conversion: f64,
    pub emissions: f64,
}

/// Factor lookup for a single fuel.
///
/// A `Constant` applies to every year. A `Yearly` table answers with the
/// entry for the requested year, or with the most recent known year when the
/// requested year is absent. The fallback fires only on a missing key, never
/// on a zero-valued factor.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorSeries {
    Constant(FuelFactors),
    Yearly(BTreeMap<u32, FuelFactors>),
}

impl FactorSeries {
    /// Builds a yearly series. Returns `None` for an empty table.
    pub fn yearly(entries: impl IntoIterator<Item = (u32, FuelFactors)>) -> Option<Self> {
        let table: BTreeMap<u32, FuelFactors> = entries.into_iter().collect();
        if table.is_empty() {
            None
        } else {
            Some(Self::Yearly(table))
        }
    }

    /// Factors for `year`, clamped to the most recent known year when absent.
    pub fn at(&self, year: u32) -> FuelFactors {
        match self {
            Self::Constant(f) => *f,
            Self::Yearly(table) => match table.get(&year) {
                Some(f) => *f,
                // `yearly` rejects empty tables, so a last entry exists.
                None => table
                    .values()
                    .next_back()
                    .copied()
                    .unwrap_or(FuelFactors {
                        conversion: f64::NAN,
                        emissions: f64::NAN,
                    }),
            },
        }
    }

    /// Most recent year covered by a yearly table.
    pub fn latest_year(&self) -> Option<u32> {
        match self {
            Self::Constant(_) => None,
            Self::Yearly(table) => table.keys().next_back().copied(),
        }
    }
}
