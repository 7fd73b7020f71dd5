//! Datasets resolved from disk, estimated and published back to disk.

mod common;

use std::fs;

use lead_estimate::config::EstimateConfig;
use lead_estimate::dataset::{DatasetResolver, DatasetTag, FileResolver, OverrideFile, Table};
use lead_estimate::error::EstimateError;
use lead_estimate::publish::{publish_sector, sector_path};
use lead_estimate::runner::run_sectors;
use lead_estimate::sector::Sector;
use lead_estimate::sector::residential::COLUMNS;

#[test]
fn defaults_are_estimated_and_published() {
    let root = tempfile::tempdir().unwrap();
    let defaults = root.path().join("defaults");
    common::write_defaults(&defaults);

    let resolver = FileResolver::new(Vec::new(), &defaults);
    let runs = run_sectors(&Sector::ALL, &EstimateConfig::default(), &resolver);
    assert_eq!(runs.len(), 1);
    let table = runs[0].outcome.as_ref().expect("residential should succeed");

    let out = root.path().join("output").join("sectors");
    let path = publish_sector(&out, Sector::Residential, table).unwrap();
    assert_eq!(path, sector_path(&out, Sector::Residential));

    let back = Table::from_path("residential", &path).unwrap();
    assert_eq!(back.headers().collect::<Vec<_>>(), COLUMNS);
    assert_eq!(back.len(), 24);
}

#[test]
fn override_replaces_default_for_its_tag() {
    let root = tempfile::tempdir().unwrap();
    let defaults = root.path().join("defaults");
    common::write_defaults(&defaults);

    // Only Alpha listed: Beta drops out of the calibrated output
    let eowld = root.path().join("towns.csv");
    fs::write(&eowld, "municipal\nAlpha\n").unwrap();
    let resolver = FileResolver::new(
        vec![OverrideFile {
            path: eowld,
            tag: DatasetTag::Eowld,
        }],
        &defaults,
    );

    assert_eq!(resolver.resolve(DatasetTag::Eowld).unwrap().len(), 1);
    let table = Sector::Residential
        .estimate(&EstimateConfig::default(), &resolver)
        .unwrap();
    assert_eq!(table.len(), 12);
    assert!(table.column("municipal").unwrap().iter().all(|m| *m == "Alpha"));
}

#[test]
fn missing_default_file_fails_resolution() {
    let root = tempfile::tempdir().unwrap();
    let defaults = root.path().join("defaults");
    common::write_defaults(&defaults);
    fs::remove_file(defaults.join("recs_hfe.csv")).unwrap();

    let resolver = FileResolver::new(Vec::new(), &defaults);
    let runs = run_sectors(&Sector::ALL, &EstimateConfig::default(), &resolver);
    assert!(matches!(
        runs[0].outcome,
        Err(EstimateError::Resolution { tag: DatasetTag::RecsHfe, .. })
    ));
}

#[test]
fn config_file_changes_calibration_factors() {
    let root = tempfile::tempdir().unwrap();
    let defaults = root.path().join("defaults");
    common::write_defaults(&defaults);

    let config_path = root.path().join("run.toml");
    fs::write(
        &config_path,
        "[[calibration.elec]]\nyear = 2014\nconversion = 0.01\nemissions = 1.0\n",
    )
    .unwrap();
    let config = EstimateConfig::from_toml_file(&config_path).unwrap();
    assert!(config.validate().is_empty());

    let resolver = FileResolver::new(Vec::new(), &defaults);
    let table = Sector::Residential.estimate(&config, &resolver).unwrap();

    let pu = table.column("elec_con_pu").unwrap();
    let mmbtu = table.column("elec_con_mmbtu").unwrap();
    for (pu, mmbtu) in pu.iter().zip(&mmbtu) {
        let pu: f64 = pu.parse().unwrap();
        let mmbtu: f64 = mmbtu.parse().unwrap();
        // single-year table: every year clamps to 2014's factor
        approx::assert_relative_eq!(mmbtu, pu * 0.01, max_relative = 1e-12);
    }
}
