//! End-to-end residential estimates over the in-memory fixture bundle.

mod common;

use std::collections::BTreeMap;

use approx::assert_relative_eq;

use lead_estimate::category::{Fuel, HuType, PerFuel};
use lead_estimate::config::EstimateConfig;
use lead_estimate::dataset::{DatasetTag, Datasets, Table};
use lead_estimate::error::EstimateError;
use lead_estimate::publish::write_table;
use lead_estimate::sector::Sector;
use lead_estimate::sector::residential::calibration::{
    self, CalibrationFactors, GroundTruth, modeled_totals,
};
use lead_estimate::sector::residential::{self, EstimateRow, transform};

fn datasets() -> Datasets {
    common::FIXTURES
        .iter()
        .map(|&(tag, csv)| (tag, common::table(tag, csv)))
        .collect()
}

fn calibrated() -> Vec<EstimateRow> {
    let config = EstimateConfig::default();
    residential::estimator(&config)
        .estimate(&common::resolver())
        .expect("residential estimate should succeed")
}

fn find<'a>(rows: &'a [EstimateRow], municipal: &str, year: u32, hu: HuType) -> &'a EstimateRow {
    rows.iter()
        .find(|r| r.municipal == municipal && r.year == Some(year) && r.hu_type == hu)
        .expect("row should exist")
}

#[test]
fn one_row_per_town_year_and_housing_type() {
    let rows = calibrated();
    // Alpha and Beta, 6 housing-unit types, years 2014 and 2015; Gamma has no housing data
    assert_eq!(rows.len(), 2 * 6 * 2);
    assert!(rows.iter().all(|r| r.municipal != "Gamma"));
    assert!(rows.iter().all(|r| matches!(r.year, Some(2014 | 2015))));
}

#[test]
fn rows_are_sorted_by_town_year_and_type() {
    let rows = calibrated();
    let keys: Vec<_> = rows
        .iter()
        .map(|r| (r.municipal.clone(), r.year, r.hu_type))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn total_equals_sum_of_fuels() {
    for row in calibrated() {
        let sum: f64 = Fuel::ALL.iter().map(|&f| row.fuels.get(f).con_mmbtu).sum();
        assert_relative_eq!(row.total_con_mmbtu, sum, max_relative = 1e-12);
    }
}

#[test]
fn calibrated_electricity_matches_program_usage() {
    let rows = calibrated();
    let town_year = |year: u32| {
        rows.iter()
            .filter(move |r| r.municipal == "Alpha" && r.year == Some(year))
    };
    // the modeled total spans every housing-unit type, `total` included
    for (year, kwh) in [(2014, 1_000_000.0), (2015, 1_100_000.0)] {
        let modeled: f64 = town_year(year).map(|r| r.fuels.elec.con_pu).sum();
        assert_relative_eq!(modeled, kwh, max_relative = 1e-9);
    }
    let gas_2014: f64 = town_year(2014).map(|r| r.fuels.ng.con_pu).sum();
    assert_relative_eq!(gas_2014, 20_000.0, max_relative = 1e-9);
}

#[test]
fn calibrated_units_use_year_factors() {
    let rows = calibrated();
    let r = find(&rows, "Alpha", 2014, HuType::U1d);
    assert_relative_eq!(r.fuels.elec.con_mmbtu, r.fuels.elec.con_pu * 0.007692, max_relative = 1e-12);
    assert_relative_eq!(r.fuels.elec.emissions_co2, r.fuels.elec.con_pu * 0.941, max_relative = 1e-12);
}

#[test]
fn missing_observation_leaves_fuel_unscaled() {
    let rows = calibrated();
    // Beta reports no gas in 2015 and nothing at all in 2014
    for year in [2014, 2015] {
        let r = find(&rows, "Beta", year, HuType::U1d);
        // 100 households * 60 MMBtu * 150/200 gas share
        assert_relative_eq!(r.fuels.ng.con_mmbtu, 4500.0, max_relative = 1e-12);
        assert_relative_eq!(r.fuels.ng.exp_dollar, 100.0 * 600.0 * 0.75, max_relative = 1e-12);
    }
}

#[test]
fn fuel_oil_is_never_calibrated() {
    let rows = calibrated();
    let r = find(&rows, "Beta", 2015, HuType::U1d);
    // 100 households * (70 * 1.5) MMBtu * 30/200 oil share
    assert_relative_eq!(r.fuels.foil.con_mmbtu, 1575.0, max_relative = 1e-12);
    assert_relative_eq!(r.fuels.foil.con_pu, 1575.0 / 0.139, max_relative = 1e-12);
    assert_relative_eq!(r.fuels.foil.exp_dollar, 100.0 * 3000.0 * 0.15, max_relative = 1e-12);
}

#[test]
fn electricity_reaches_every_household() {
    let config = EstimateConfig::default();
    let rows = transform::baseline(&config, &datasets()).unwrap();
    let r = rows
        .iter()
        .find(|r| r.municipal == "Alpha" && r.hu_type == HuType::U1d)
        .unwrap();
    // 50 households * 10 MMBtu * 12/9 state adjustment, share 1
    assert_relative_eq!(r.fuels.elec.con_mmbtu, 50.0 * 10.0 * 12.0 / 9.0, max_relative = 1e-12);
    assert_eq!(r.year, None);
}

#[test]
fn matching_ground_truth_reproduces_baseline() {
    let config = EstimateConfig::default();
    let baseline = transform::baseline(&config, &datasets()).unwrap();

    let mut by_town: BTreeMap<&str, Vec<&EstimateRow>> = BTreeMap::new();
    for row in &baseline {
        by_town.entry(row.municipal.as_str()).or_default().push(row);
    }
    let mut truth = GroundTruth::default();
    for (town, rows) in &by_town {
        let totals = modeled_totals(rows.iter().copied());
        truth.insert(
            *town,
            2015,
            PerFuel {
                elec: Some(totals.elec),
                ng: Some(totals.ng),
                foil: None,
            },
        );
    }

    let towns: Vec<String> = by_town.keys().map(|t| t.to_string()).collect();
    let factors = CalibrationFactors::from_config(&config.calibration).unwrap();
    let out = calibration::calibrate(&baseline, &towns, &truth, &factors).unwrap();
    assert_eq!(out.len(), baseline.len());

    for after in &out {
        let before = baseline
            .iter()
            .find(|b| b.municipal == after.municipal && b.hu_type == after.hu_type)
            .unwrap();
        for fuel in Fuel::ALL {
            let (b, a) = (before.fuels.get(fuel), after.fuels.get(fuel));
            assert_relative_eq!(a.con_pu, b.con_pu, max_relative = 1e-9);
            assert_relative_eq!(a.con_mmbtu, b.con_mmbtu, max_relative = 1e-9);
            assert_relative_eq!(a.exp_dollar, b.exp_dollar, max_relative = 1e-9);
            assert_relative_eq!(a.emissions_co2, b.emissions_co2, max_relative = 1e-9);
        }
    }
}

#[test]
fn repeated_runs_publish_identical_bytes() {
    let config = EstimateConfig::default();
    let resolver = common::resolver();
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let table = Sector::Residential.estimate(&config, &resolver).unwrap();
        let mut buf = Vec::new();
        write_table(&table, &mut buf).unwrap();
        outputs.push(buf);
    }
    assert_eq!(outputs[0], outputs[1]);
    let text = String::from_utf8(outputs.swap_remove(0)).unwrap();
    assert_eq!(text.lines().next(), Some(residential::COLUMNS.join(",").as_str()));
    assert_eq!(text.lines().count(), 1 + 24);
}

#[test]
fn missing_dataset_fails_the_sector() {
    let mut resolver = common::resolver();
    resolver.remove(&DatasetTag::MasssaveRes);
    let err = Sector::Residential
        .estimate(&EstimateConfig::default(), &resolver)
        .unwrap_err();
    assert!(matches!(
        err,
        EstimateError::Resolution { tag: DatasetTag::MasssaveRes, .. }
    ));
}

#[test]
fn malformed_table_names_the_missing_column() {
    let mut resolver = common::resolver();
    resolver.insert(
        DatasetTag::AcsUis,
        Table::from_reader("acs_uis", "acs_year,muni_id,municipal,hu\n2011-15,1,Alpha,100\n".as_bytes())
            .unwrap(),
    );
    let err = Sector::Residential
        .estimate(&EstimateConfig::default(), &resolver)
        .unwrap_err();
    assert!(matches!(err, EstimateError::MissingColumn { ref column, .. } if column == "u1a"));
}
