//! Residential sector: housing-unit based consumption, expenditure and
//! emissions estimates, calibrated to utility program usage.

pub mod calibration;
pub mod transform;

use log::info;

use crate::category::{Fuel, HuType, PerFuel};
use crate::config::EstimateConfig;
use crate::dataset::{DatasetTag, Datasets, Table};
use crate::error::Result;
use crate::estimator::Estimator;

use calibration::{CalibrationFactors, GroundTruth};

/// Datasets the residential methodology reads.
pub const REQUIRED: &[DatasetTag] = &[
    DatasetTag::AcsUis,
    DatasetTag::AcsHf,
    DatasetTag::RecsSc,
    DatasetTag::RecsHfc,
    DatasetTag::RecsHfe,
    DatasetTag::MasssaveRes,
    DatasetTag::Eowld,
];

/// Output column order.
pub const COLUMNS: [&str; 18] = [
    "muni_id",
    "municipal",
    "year",
    "hu_type",
    "hu",
    "elec_con_pu",
    "elec_con_mmbtu",
    "elec_exp_dollar",
    "elec_emissions_co2",
    "ng_con_pu",
    "ng_con_mmbtu",
    "ng_exp_dollar",
    "ng_emissions_co2",
    "foil_con_pu",
    "foil_con_mmbtu",
    "foil_exp_dollar",
    "foil_emissions_co2",
    "total_con_mmbtu",
];

/// One fuel's measures for one row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FuelEstimate {
    /// Consumption in physical units (kWh, therms, gallons).
    pub con_pu: f64,
    pub con_mmbtu: f64,
    pub exp_dollar: f64,
    /// CO2 in pounds.
    pub emissions_co2: f64,
}

/// One municipality, housing-unit type and (after calibration) year.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRow {
    pub muni_id: String,
    pub municipal: String,
    /// `None` before calibration.
    pub year: Option<u32>,
    pub hu_type: HuType,
    /// Household count.
    pub hu: f64,
    pub fuels: PerFuel<FuelEstimate>,
    pub total_con_mmbtu: f64,
}

impl EstimateRow {
    /// Sets `total_con_mmbtu` to the sum of the per-fuel MMBtu values.
    pub fn recompute_total(&mut self) {
        self.total_con_mmbtu = Fuel::ALL.iter().map(|&f| self.fuels.get(f).con_mmbtu).sum();
    }

    /// Cells in [`COLUMNS`] order.
    pub fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(COLUMNS.len());
        record.push(self.muni_id.clone());
        record.push(self.municipal.clone());
        record.push(self.year.map(|y| y.to_string()).unwrap_or_default());
        record.push(self.hu_type.to_string());
        record.push(self.hu.to_string());
        for fuel in Fuel::ALL {
            let f = self.fuels.get(fuel);
            record.extend(
                [f.con_pu, f.con_mmbtu, f.exp_dollar, f.emissions_co2].map(|v| v.to_string()),
            );
        }
        record.push(self.total_con_mmbtu.to_string());
        record
    }
}

/// Transform then calibrate.
///
/// # Errors
///
/// Propagates any schema, label or numeric failure from either phase.
pub fn methodology(config: &EstimateConfig, datasets: &Datasets) -> Result<Vec<EstimateRow>> {
    let rows = transform::baseline(config, datasets)?;

    info!("Calibrating residential sector...");
    let truth = GroundTruth::from_table(datasets.get(DatasetTag::MasssaveRes)?)?;
    let municipalities = calibration::municipalities(datasets.get(DatasetTag::Eowld)?)?;
    let factors = CalibrationFactors::from_config(&config.calibration)?;

    calibration::calibrate(&rows, &municipalities, &truth, &factors)
}

/// Residential estimator bound to `config`.
pub fn estimator(
    config: &EstimateConfig,
) -> Estimator<impl Fn(&Datasets) -> Result<Vec<EstimateRow>> + '_> {
    Estimator::new(REQUIRED, move |datasets: &Datasets| methodology(config, datasets))
}

/// Packs rows into the published table.
pub fn to_table(rows: &[EstimateRow]) -> Table {
    Table::new("residential", COLUMNS, rows.iter().map(EstimateRow::to_record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> EstimateRow {
        let fuel = |mmbtu: f64| FuelEstimate {
            con_pu: mmbtu * 10.0,
            con_mmbtu: mmbtu,
            exp_dollar: 1.5,
            emissions_co2: 2.0,
        };
        EstimateRow {
            muni_id: "35".into(),
            municipal: "Boston".into(),
            year: None,
            hu_type: HuType::U2_4,
            hu: 12.0,
            fuels: PerFuel {
                elec: fuel(1.0),
                ng: fuel(2.5),
                foil: fuel(0.5),
            },
            total_con_mmbtu: 0.0,
        }
    }

    #[test]
    fn total_is_sum_of_fuels() {
        let mut r = row();
        r.recompute_total();
        assert_eq!(r.total_con_mmbtu, 4.0);
    }

    #[test]
    fn record_matches_column_order() {
        let mut r = row();
        r.year = Some(2015);
        r.recompute_total();
        let record = r.to_record();
        assert_eq!(record.len(), COLUMNS.len());
        assert_eq!(record[..5], ["35", "Boston", "2015", "u2_4", "12"]);
        assert_eq!(record[COLUMNS.iter().position(|c| *c == "ng_con_mmbtu").unwrap()], "2.5");
        assert_eq!(record[17], "4");
    }

    #[test]
    fn uncalibrated_year_is_blank() {
        assert_eq!(row().to_record()[2], "");
    }

    #[test]
    fn table_has_header_and_one_record_per_row() {
        let table = to_table(&[row(), row()]);
        assert_eq!(table.headers().collect::<Vec<_>>(), COLUMNS);
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(), "residential");
    }
}
