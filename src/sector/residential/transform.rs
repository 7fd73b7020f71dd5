//! Pre-calibration residential model.
//!
//! Household counts per municipality and housing-unit type are multiplied by
//! state-adjusted per-household averages and by the share of households that
//! use each fuel.

use std::collections::BTreeMap;

use log::debug;
use serde::Deserialize;

use super::{EstimateRow, FuelEstimate};
use crate::category::{Fuel, HuType, PerFuel};
use crate::config::EstimateConfig;
use crate::dataset::{DatasetTag, Datasets, OptionalNumber, Table};
use crate::error::{EstimateError, Result};

const HOUSING_UNITS_COLUMNS: &[&str] = &[
    "acs_year", "muni_id", "municipal", "hu", "u1a", "u1d", "u2_4", "u5_9", "u10_19", "u20ov",
    "u_oth",
];
const HEATING_FUEL_KEYS: &[&str] = &["acs_year", "muni_id"];
const HOUSEHOLD_COLUMNS: &[&str] = &["geography", "hu_type", "avg_elec", "avg_ng", "avg_foil"];

#[derive(Debug, Deserialize)]
struct HousingUnitsRow {
    acs_year: String,
    muni_id: String,
    municipal: String,
    hu: OptionalNumber,
    u1a: OptionalNumber,
    u1d: OptionalNumber,
    u2_4: OptionalNumber,
    u5_9: OptionalNumber,
    u10_19: OptionalNumber,
    u20ov: OptionalNumber,
    u_oth: OptionalNumber,
}

/// Key of a household-fuel-presence row. The count columns are found by
/// header through [`Fuel::from_source_label`].
#[derive(Debug, Deserialize)]
struct HeatingFuelKey {
    acs_year: String,
    muni_id: String,
}

#[derive(Debug, Deserialize)]
struct HouseholdRow {
    geography: String,
    hu_type: String,
    avg_elec: OptionalNumber,
    avg_ng: OptionalNumber,
    avg_foil: OptionalNumber,
}

/// Household counts of one municipality. `units[Total]` is all households.
#[derive(Debug, Clone, PartialEq)]
pub struct HousingUnits {
    pub muni_id: String,
    pub municipal: String,
    pub units: BTreeMap<HuType, f64>,
}

/// A municipality ready for estimation: counts plus fuel-share fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct Municipality {
    pub housing: HousingUnits,
    /// Fraction of households using each fuel. Electricity is always 1.
    pub fuel_share: PerFuel<f64>,
}

/// Per-household averages by housing-unit type; `None` where the survey has no value.
pub type HouseholdAverages = BTreeMap<HuType, PerFuel<Option<f64>>>;

/// Reads the housing-unit distribution for `vintage`, folding the three
/// 5-or-more-unit columns into `u5ov`.
///
/// # Errors
///
/// Schema errors for missing columns; numeric errors when a count other than
/// the 5-or-more sub-categories is missing.
pub fn housing_units(table: &Table, vintage: &str) -> Result<Vec<HousingUnits>> {
    table.require_columns(HOUSING_UNITS_COLUMNS)?;
    let rows: Vec<HousingUnitsRow> = table.deserialize()?;

    rows.into_iter()
        .filter(|r| r.acs_year == vintage)
        .map(|r| -> Result<HousingUnits> {
            let u5ov = OptionalNumber::sum([r.u5_9, r.u10_19, r.u20ov])
                .value()
                .unwrap_or(0.0);
            let counts = [
                (HuType::Total, r.hu),
                (HuType::U1a, r.u1a),
                (HuType::U1d, r.u1d),
                (HuType::U2_4, r.u2_4),
                (HuType::U5ov, OptionalNumber(Some(u5ov))),
                (HuType::UOth, r.u_oth),
            ];
            let mut units = BTreeMap::new();
            for (hu, count) in counts {
                let count = count.value().ok_or_else(|| {
                    EstimateError::numeric(format!(
                        "{}: no {hu} household count for {}",
                        table.name(),
                        r.municipal
                    ))
                })?;
                units.insert(hu, count);
            }
            Ok(HousingUnits {
                muni_id: r.muni_id,
                municipal: r.municipal,
                units,
            })
        })
        .collect()
}

fn parse_cell(table: &Table, raw: &str, row: usize) -> Result<OptionalNumber> {
    OptionalNumber::parse(raw).map_err(|e| EstimateError::Schema {
        dataset: table.name().to_string(),
        message: format!("row {}: {e}", row + 2),
    })
}

/// Header index of each fuel's count column, `None` where the table has none.
fn fuel_columns(table: &Table) -> Result<PerFuel<Option<usize>>> {
    let mut columns = PerFuel::splat(None);
    for (idx, header) in table.headers().enumerate() {
        let Ok(fuel) = Fuel::from_source_label(header) else {
            continue;
        };
        let slot = columns.get_mut(fuel);
        if slot.is_some() {
            return Err(EstimateError::Schema {
                dataset: table.name().to_string(),
                message: format!("more than one column holds {fuel} counts"),
            });
        }
        *slot = Some(idx);
    }
    Ok(columns)
}

/// Joins heating-fuel counts onto `housing` by `muni_id` (inner join) and
/// derives fuel-share fractions.
///
/// # Errors
///
/// Schema errors for missing columns, two columns naming the same fuel or a
/// municipality listed twice; numeric errors for a missing count or a
/// municipality with no households.
pub fn fuel_shares(
    housing: Vec<HousingUnits>,
    table: &Table,
    vintage: &str,
) -> Result<Vec<Municipality>> {
    table.require_columns(HEATING_FUEL_KEYS)?;
    let columns = fuel_columns(table)?;
    let column_of = |fuel: Fuel, label: &str| {
        columns.get(fuel).ok_or_else(|| EstimateError::MissingColumn {
            dataset: table.name().to_string(),
            column: label.to_string(),
        })
    };
    let gas_idx = column_of(Fuel::Ng, "gas")?;
    let oil_idx = column_of(Fuel::Foil, "oil")?;
    let keys: Vec<HeatingFuelKey> = table.deserialize()?;

    // electricity counts are never read: every household uses it
    let mut by_muni: BTreeMap<String, PerFuel<OptionalNumber>> = BTreeMap::new();
    for (i, (key, record)) in keys.into_iter().zip(table.records()).enumerate() {
        if key.acs_year != vintage {
            continue;
        }
        if by_muni.contains_key(&key.muni_id) {
            return Err(EstimateError::Schema {
                dataset: table.name().to_string(),
                message: format!("muni_id {} listed more than once for {vintage}", key.muni_id),
            });
        }
        let counts = PerFuel {
            elec: OptionalNumber::default(),
            ng: parse_cell(table, record.get(gas_idx).unwrap_or(""), i)?,
            foil: parse_cell(table, record.get(oil_idx).unwrap_or(""), i)?,
        };
        by_muni.insert(key.muni_id, counts);
    }

    let mut municipalities = Vec::with_capacity(housing.len());
    for h in housing {
        let Some(counts) = by_muni.get(&h.muni_id) else {
            debug!("{} has no heating-fuel row, dropped", h.municipal);
            continue;
        };
        let total = h.units.get(&HuType::Total).copied().unwrap_or(0.0);
        if !(total > 0.0) {
            return Err(EstimateError::numeric(format!(
                "{} has no households to divide fuel counts by",
                h.municipal
            )));
        }
        let share = |fuel: Fuel| {
            counts.get(fuel).value().map(|c| c / total).ok_or_else(|| {
                EstimateError::numeric(format!(
                    "{}: no {fuel} household count for {}",
                    table.name(),
                    h.municipal
                ))
            })
        };
        let fuel_share = PerFuel {
            elec: 1.0,
            ng: share(Fuel::Ng)?,
            foil: share(Fuel::Foil)?,
        };
        municipalities.push(Municipality {
            housing: h,
            fuel_share,
        });
    }
    Ok(municipalities)
}

/// State housing-type weights from the structural-characteristics table.
///
/// Each real category's weight is its share of the state column total;
/// `Total` is 1. Placeholder cells are missing, not zero: they are left out
/// of the total and leave the category without a weight.
///
/// # Errors
///
/// Schema errors for missing columns or unmapped labels; a numeric error
/// when the state column has no positive total.
pub fn state_weights(
    table: &Table,
    state_column: &str,
) -> Result<BTreeMap<HuType, Option<f64>>> {
    let label_idx = table.column_index("hu_type")?;
    let value_idx = table.column_index(state_column)?;

    let mut counts: BTreeMap<HuType, OptionalNumber> = BTreeMap::new();
    for (i, record) in table.records().iter().enumerate() {
        let hu = HuType::from_structure_label(record.get(label_idx).unwrap_or(""))?;
        let value = parse_cell(table, record.get(value_idx).unwrap_or(""), i)?;
        let entry = counts.entry(hu).or_default();
        *entry = entry.accumulate(value);
    }

    let total = OptionalNumber::sum(counts.values().copied())
        .value()
        .filter(|t| *t > 0.0)
        .ok_or_else(|| {
            EstimateError::numeric(format!(
                "{}: column {state_column} has no positive total",
                table.name()
            ))
        })?;

    let mut weights: BTreeMap<HuType, Option<f64>> = counts
        .into_iter()
        .map(|(hu, count)| (hu, count.value().map(|c| c / total)))
        .collect();
    weights.insert(HuType::Total, Some(1.0));
    Ok(weights)
}

fn household_rows(
    table: &Table,
    geography: &str,
) -> Result<Vec<(HuType, PerFuel<OptionalNumber>)>> {
    table.require_columns(HOUSEHOLD_COLUMNS)?;
    let rows: Vec<HouseholdRow> = table.deserialize()?;
    rows.into_iter()
        .filter(|r| r.geography.eq_ignore_ascii_case(geography))
        .map(|r| -> Result<(HuType, PerFuel<OptionalNumber>)> {
            let hu = HuType::from_household_label(&r.hu_type)?;
            let values = PerFuel {
                elec: r.avg_elec,
                ng: r.avg_ng,
                foil: r.avg_foil,
            };
            Ok((hu, values))
        })
        .collect()
}

/// Per-household averages for one geography, summing rows whose labels map
/// to the same housing-unit type.
///
/// # Errors
///
/// Schema errors for missing columns, unparsable cells or unmapped labels.
pub fn household_averages(table: &Table, geography: &str) -> Result<HouseholdAverages> {
    let mut grouped: BTreeMap<HuType, PerFuel<OptionalNumber>> = BTreeMap::new();
    for (hu, values) in household_rows(table, geography)? {
        let entry = grouped.entry(hu).or_default();
        for fuel in Fuel::ALL {
            let acc = entry.get_mut(fuel);
            *acc = acc.accumulate(values.get(fuel));
        }
    }
    Ok(grouped
        .into_iter()
        .map(|(hu, values)| (hu, values.map(|_, v| v.value())))
        .collect())
}

/// The authoritative state-level average: the state block's `Total
/// Households` row, or its first row when there is no total.
///
/// # Errors
///
/// Schema errors as for [`household_averages`]; a numeric error when the
/// table has no row for `geography`.
pub fn state_average(table: &Table, geography: &str) -> Result<PerFuel<Option<f64>>> {
    let rows = household_rows(table, geography)?;
    rows.iter()
        .find(|(hu, _)| hu.is_total())
        .or_else(|| rows.first())
        .map(|(_, values)| values.map(|_, v| v.value()))
        .ok_or_else(|| {
            EstimateError::numeric(format!(
                "{}: no rows for geography \"{geography}\"",
                table.name()
            ))
        })
}

/// Per-fuel ratio that scales national averages to the state average.
///
/// The national value of each real category is weighted by its state weight;
/// pairs where either side is missing are skipped. The ratio is the state
/// average divided by that weighted sum.
///
/// # Errors
///
/// Numeric errors when the state average is missing or the weighted national
/// sum is missing or zero.
pub fn adjustment_ratios(
    national: &HouseholdAverages,
    weights: &BTreeMap<HuType, Option<f64>>,
    state: &PerFuel<Option<f64>>,
    dataset: &str,
) -> Result<PerFuel<f64>> {
    let mut ratios = PerFuel::splat(1.0);
    for fuel in Fuel::ALL {
        let weighted = OptionalNumber::sum(HuType::REAL.iter().map(|hu| {
            let value = national.get(hu).and_then(|v| v.get(fuel));
            let weight = weights.get(hu).copied().flatten();
            OptionalNumber(value.zip(weight).map(|(v, w)| v * w))
        }));
        let state_avg = state.get(fuel).ok_or_else(|| {
            EstimateError::numeric(format!("{dataset}: no state {fuel} average"))
        })?;
        let ratio = match weighted.value() {
            Some(w) if w != 0.0 => state_avg / w,
            _ => {
                return Err(EstimateError::numeric(format!(
                    "{dataset}: weighted national {fuel} average is zero or missing"
                )));
            }
        };
        debug!("{dataset}: {fuel} state adjustment ratio {ratio}");
        *ratios.get_mut(fuel) = ratio;
    }
    Ok(ratios)
}

/// Applies per-fuel ratios to every housing-unit type, `Total` included.
pub fn adjust(national: &HouseholdAverages, ratios: &PerFuel<f64>) -> HouseholdAverages {
    national
        .iter()
        .map(|(hu, values)| (*hu, values.map(|fuel, v| v.map(|v| v * ratios.get(fuel)))))
        .collect()
}

/// National averages of `table` rescaled to the state average.
///
/// # Errors
///
/// Anything [`household_averages`], [`state_average`] or
/// [`adjustment_ratios`] reports.
pub fn state_adjusted(
    table: &Table,
    weights: &BTreeMap<HuType, Option<f64>>,
    config: &EstimateConfig,
) -> Result<HouseholdAverages> {
    let national = household_averages(table, &config.survey.national_geography)?;
    let state = state_average(table, &config.survey.state_geography)?;
    let ratios = adjustment_ratios(&national, weights, &state, table.name())?;
    Ok(adjust(&national, &ratios))
}

fn average_for(
    averages: &HouseholdAverages,
    hu: HuType,
    fuel: Fuel,
    tag: DatasetTag,
) -> Result<f64> {
    let values = averages.get(&hu).ok_or_else(|| EstimateError::Schema {
        dataset: tag.to_string(),
        message: format!("no national row for {hu}"),
    })?;
    values
        .get(fuel)
        .ok_or_else(|| EstimateError::numeric(format!("{tag}: no national {fuel} average for {hu}")))
}

/// One uncalibrated row per municipality and housing-unit type.
///
/// # Errors
///
/// Fails when either averages table lacks a housing-unit type or a value.
pub fn estimate_rows(
    municipalities: &[Municipality],
    consumption: &HouseholdAverages,
    expenditure: &HouseholdAverages,
    config: &EstimateConfig,
) -> Result<Vec<EstimateRow>> {
    let conversion = PerFuel::<f64>::from(config.residential.conversion);
    let emissions = PerFuel::<f64>::from(config.residential.emissions);

    let mut rows = Vec::with_capacity(municipalities.len() * HuType::ALL.len());
    for m in municipalities {
        for (&hu_type, &hu) in &m.housing.units {
            let mut fuels = PerFuel::splat(FuelEstimate::default());
            for fuel in Fuel::ALL {
                let share = m.fuel_share.get(fuel);
                let con = average_for(consumption, hu_type, fuel, DatasetTag::RecsHfc)?;
                let exp = average_for(expenditure, hu_type, fuel, DatasetTag::RecsHfe)?;

                let con_mmbtu = hu * con * share;
                let con_pu = con_mmbtu / conversion.get(fuel);
                *fuels.get_mut(fuel) = FuelEstimate {
                    con_pu,
                    con_mmbtu,
                    exp_dollar: hu * exp * share,
                    emissions_co2: con_pu * emissions.get(fuel),
                };
            }
            let mut row = EstimateRow {
                muni_id: m.housing.muni_id.clone(),
                municipal: m.housing.municipal.clone(),
                year: None,
                hu_type,
                hu,
                fuels,
                total_con_mmbtu: 0.0,
            };
            row.recompute_total();
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Runs the whole pre-calibration transform over resolved datasets.
///
/// # Errors
///
/// Propagates any resolution, schema or numeric failure.
pub fn baseline(config: &EstimateConfig, datasets: &Datasets) -> Result<Vec<EstimateRow>> {
    let vintage = config.survey.vintage.as_str();

    let housing = housing_units(datasets.get(DatasetTag::AcsUis)?, vintage)?;
    let municipalities = fuel_shares(housing, datasets.get(DatasetTag::AcsHf)?, vintage)?;
    debug!("{} municipalities with housing and fuel data", municipalities.len());

    let weights = state_weights(
        datasets.get(DatasetTag::RecsSc)?,
        &config.survey.state_weight_column,
    )?;
    let consumption = state_adjusted(datasets.get(DatasetTag::RecsHfc)?, &weights, config)?;
    let expenditure = state_adjusted(datasets.get(DatasetTag::RecsHfe)?, &weights, config)?;

    estimate_rows(&municipalities, &consumption, &expenditure, config)
}
