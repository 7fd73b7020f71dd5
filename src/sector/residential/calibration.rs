//! Multi-year calibration against observed utility program usage.
//!
//! The uncalibrated model fixes the relative split across housing-unit types;
//! calibration rescales each municipality's electricity and gas so their
//! physical-unit totals match the observed usage of every program year.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::Deserialize;

use super::EstimateRow;
use crate::category::{Fuel, HuType, PerFuel};
use crate::config::CalibrationConfig;
use crate::dataset::{OptionalNumber, Table};
use crate::error::{EstimateError, Result};
use crate::factors::FactorSeries;

const PROGRAM_COLUMNS: &[&str] = &["municipal", "cal_year", "mwh_use", "therm_use"];

/// kWh per MWh; program electricity is reported in MWh.
const KWH_PER_MWH: f64 = 1000.0;

#[derive(Debug, Deserialize)]
struct ProgramRow {
    municipal: String,
    cal_year: u32,
    mwh_use: OptionalNumber,
    therm_use: OptionalNumber,
}

/// Observed electricity (kWh) and gas (therms) usage per municipality and year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    years: BTreeSet<u32>,
    observed: BTreeMap<(String, u32), PerFuel<Option<f64>>>,
}

impl GroundTruth {
    /// Reads the residential program table.
    ///
    /// The first row for a (municipality, year) pair wins when the table
    /// repeats one.
    ///
    /// # Errors
    ///
    /// Schema errors for missing columns or unparsable cells.
    pub fn from_table(table: &Table) -> Result<Self> {
        table.require_columns(PROGRAM_COLUMNS)?;
        let rows: Vec<ProgramRow> = table.deserialize()?;

        let mut truth = Self::default();
        for row in rows {
            truth.years.insert(row.cal_year);
            truth
                .observed
                .entry((row.municipal, row.cal_year))
                .or_insert(PerFuel {
                    elec: row.mwh_use.value().map(|mwh| mwh * KWH_PER_MWH),
                    ng: row.therm_use.value(),
                    foil: None,
                });
        }
        Ok(truth)
    }

    /// Inserts one observation in physical units.
    pub fn insert(&mut self, municipal: impl Into<String>, year: u32, usage: PerFuel<Option<f64>>) {
        self.years.insert(year);
        self.observed.insert((municipal.into(), year), usage);
    }

    /// Every year in the series, ascending.
    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.years.iter().copied()
    }

    pub fn observed(&self, municipal: &str, year: u32, fuel: Fuel) -> Option<f64> {
        self.observed
            .get(&(municipal.to_string(), year))
            .and_then(|usage| usage.get(fuel))
    }
}

/// Factor series for each calibrated fuel.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationFactors {
    elec: FactorSeries,
    ng: FactorSeries,
}

impl CalibrationFactors {
    pub fn new(elec: FactorSeries, ng: FactorSeries) -> Self {
        Self { elec, ng }
    }

    /// # Errors
    ///
    /// Returns a numeric error when the electricity table is empty.
    pub fn from_config(config: &CalibrationConfig) -> Result<Self> {
        let series = |fuel: Fuel| {
            config.series(fuel).ok_or_else(|| {
                EstimateError::numeric(format!("no {fuel} calibration factors configured"))
            })
        };
        Ok(Self {
            elec: series(Fuel::Elec)?,
            ng: series(Fuel::Ng)?,
        })
    }

    /// Each calibrated fuel with its factor series.
    fn calibrated(&self) -> [(Fuel, &FactorSeries); 2] {
        [(Fuel::Elec, &self.elec), (Fuel::Ng, &self.ng)]
    }
}

/// Distinct municipality names in first-appearance order.
///
/// # Errors
///
/// Returns a missing-column error when the table has no `municipal` column.
pub fn municipalities(table: &Table) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    Ok(table
        .column("municipal")?
        .into_iter()
        .filter(|m| seen.insert(*m))
        .map(str::to_string)
        .collect())
}

/// Observed-to-modeled ratio.
///
/// A missing or NaN observation means no adjustment (ratio 1), as does a
/// zero observation against a zero model.
///
/// # Errors
///
/// Returns a numeric error when a non-zero observation meets a zero modeled
/// total.
pub fn calibration_ratio(observed: Option<f64>, modeled: f64) -> Result<f64> {
    match observed {
        None => Ok(1.0),
        Some(o) if o.is_nan() => Ok(1.0),
        Some(o) if modeled != 0.0 => Ok(o / modeled),
        Some(o) if o == 0.0 => Ok(1.0),
        Some(o) => Err(EstimateError::numeric(format!(
            "observed usage {o} against a modeled total of zero"
        ))),
    }
}

/// Physical-unit totals over every row of one municipality, the `total`
/// housing-unit type included.
pub fn modeled_totals<'a>(rows: impl IntoIterator<Item = &'a EstimateRow>) -> PerFuel<f64> {
    let mut totals = PerFuel::splat(0.0);
    for row in rows {
        for fuel in Fuel::ALL {
            *totals.get_mut(fuel) += row.fuels.get(fuel).con_pu;
        }
    }
    totals
}

/// Calibrated copies of one municipality's rows for one year.
///
/// Pure in its inputs: `rows` are the municipality's uncalibrated rows and
/// `totals` their [`modeled_totals`].
///
/// # Errors
///
/// Propagates a [`calibration_ratio`] failure, naming the municipality,
/// year and fuel.
pub fn calibrate_year(
    rows: &[&EstimateRow],
    totals: &PerFuel<f64>,
    truth: &GroundTruth,
    year: u32,
    factors: &CalibrationFactors,
) -> Result<Vec<EstimateRow>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let municipal = first.municipal.as_str();

    let mut ratios = PerFuel::splat(1.0);
    for fuel in Fuel::CALIBRATED {
        let observed = truth.observed(municipal, year, fuel);
        if observed.is_none() {
            warn!("{municipal} {year}: no observed {fuel} usage, ratio 1");
        }
        *ratios.get_mut(fuel) =
            calibration_ratio(observed, totals.get(fuel)).map_err(|e| match e {
                EstimateError::Numeric(m) => {
                    EstimateError::numeric(format!("{municipal} {year} {fuel}: {m}"))
                }
                other => other,
            })?;
    }
    debug!(
        "{municipal} {year}: elec ratio {}, ng ratio {}",
        ratios.elec, ratios.ng
    );

    Ok(rows
        .iter()
        .map(|&row| {
            let mut out = row.clone();
            for (fuel, series) in factors.calibrated() {
                let f = series.at(year);
                let ratio = ratios.get(fuel);
                let estimate = out.fuels.get_mut(fuel);
                estimate.con_pu *= ratio;
                estimate.exp_dollar *= ratio;
                estimate.con_mmbtu = estimate.con_pu * f.conversion;
                estimate.emissions_co2 = estimate.con_pu * f.emissions;
            }
            out.year = Some(year);
            out.recompute_total();
            out
        })
        .collect())
}

/// Calibrates every (municipality, year) pair and sorts the result by
/// municipality, year and housing-unit type.
///
/// Municipalities without uncalibrated rows contribute nothing; rows of
/// municipalities outside `municipalities` are dropped.
///
/// # Errors
///
/// Fails on the first (municipality, year) pair whose ratio cannot be formed.
pub fn calibrate(
    baseline: &[EstimateRow],
    municipalities: &[String],
    truth: &GroundTruth,
    factors: &CalibrationFactors,
) -> Result<Vec<EstimateRow>> {
    let mut by_muni: BTreeMap<&str, Vec<&EstimateRow>> = BTreeMap::new();
    for row in baseline {
        by_muni.entry(row.municipal.as_str()).or_default().push(row);
    }
    let totals: BTreeMap<&str, PerFuel<f64>> = by_muni
        .iter()
        .map(|(m, rows)| (*m, modeled_totals(rows.iter().copied())))
        .collect();

    let index: Vec<(&str, u32)> = municipalities
        .iter()
        .filter(|m| by_muni.contains_key(m.as_str()))
        .flat_map(|m| truth.years().map(move |year| (m.as_str(), year)))
        .collect();

    let mut calibrated = Vec::with_capacity(index.len() * HuType::ALL.len());
    for (m, year) in index {
        calibrated.extend(calibrate_year(&by_muni[m], &totals[m], truth, year, factors)?);
    }

    calibrated.sort_by(|a, b| {
        (&a.municipal, a.year, a.hu_type).cmp(&(&b.municipal, b.year, b.hu_type))
    });
    Ok(calibrated)
}
