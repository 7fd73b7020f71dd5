//! Shared fixtures for integration tests: a two-town dataset bundle.
//!
//! State adjustment ratios baked into the survey tables: consumption elec
//! 12/9, ng 1, foil 1.5; expenditure elec 2, ng 1, foil 2.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lead_estimate::dataset::{DatasetTag, Table};

pub const ACS_UIS: &str = "\
acs_year,muni_id,municipal,hu,u1a,u1d,u2_4,u5_9,u10_19,u20ov,u_oth
2011-15,1,Alpha,100,30,50,10,3,2,,5
2010-14,1,Alpha,90,30,40,10,3,2,,5
2011-15,2,Beta,200,20,100,40,10,10,10,10
";

pub const ACS_HF: &str = "\
acs_year,muni_id,gas,elec,oil
2011-15,1,60,100,10
2011-15,2,150,200,30
";

pub const RECS_SC: &str = "\
hu_type,ma
Single Family Attached,Q
Single Family Detached,\"1,500\"
Apartments in 2-4 Unit Buildings,300
Apartments in 5 or more Unit Buildings,900
Mobile Homes,300
";

pub const RECS_HFC: &str = "\
geography,hu_type,avg_elec,avg_ng,avg_foil
United States,Total Households,9.5,50,60
United States,Single-Family Attached,8,40,50
United States,Single-Family Detached,10,60,70
United States,Apartments in 2-4 Unit Buildings,8,40,50
United States,Apartments in 5 or More Unit Buildings,8,30,40
United States,Mobile Homes,5,20,25
United States,Mobile Homes,3,30,35
Massachusetts,Single-Family Detached,99,99,99
Massachusetts,Total Households,12,48,87
";

pub const RECS_HFE: &str = "\
geography,hu_type,avg_elec,avg_ng,avg_foil
United States,Total Households,\"1,100\",600,\"1,500\"
United States,Single-Family Attached,\"1,000\",600,\"1,500\"
United States,Single-Family Detached,\"1,200\",600,\"1,500\"
United States,Apartments in 2-4 Unit Buildings,900,600,\"1,500\"
United States,Apartments in 5 or More Unit Buildings,800,600,\"1,500\"
United States,Mobile Homes,500,300,750
United States,Mobile Homes,500,300,750
Massachusetts,Total Households,\"2,060\",600,\"3,000\"
";

pub const MASSSAVE_RES: &str = "\
municipal,cal_year,mwh_use,therm_use
Alpha,2014,1000,20000
Alpha,2015,1100,22000
Beta,2015,2000,NA
";

pub const EOWLD: &str = "\
municipal
Alpha
Beta
Gamma
";

pub const FIXTURES: &[(DatasetTag, &str)] = &[
    (DatasetTag::AcsUis, ACS_UIS),
    (DatasetTag::AcsHf, ACS_HF),
    (DatasetTag::RecsSc, RECS_SC),
    (DatasetTag::RecsHfc, RECS_HFC),
    (DatasetTag::RecsHfe, RECS_HFE),
    (DatasetTag::MasssaveRes, MASSSAVE_RES),
    (DatasetTag::Eowld, EOWLD),
];

pub fn table(tag: DatasetTag, csv: &str) -> Table {
    Table::from_reader(tag.as_str(), csv.as_bytes()).expect("fixture CSV should parse")
}

/// In-memory resolver holding every residential fixture.
pub fn resolver() -> BTreeMap<DatasetTag, Table> {
    FIXTURES
        .iter()
        .map(|&(tag, csv)| (tag, table(tag, csv)))
        .collect()
}

/// Writes every fixture as `<dir>/<tag>.csv`.
pub fn write_defaults(dir: &Path) {
    fs::create_dir_all(dir).expect("defaults dir should be creatable");
    for &(tag, csv) in FIXTURES {
        fs::write(dir.join(format!("{tag}.csv")), csv).expect("fixture should be writable");
    }
}
