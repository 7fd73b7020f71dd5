//! TOML-based run configuration: survey vintage, geographies and the
//! conversion/emissions factor tables used by the residential methodology.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::category::{Fuel, PerFuel};
use crate::factors::{FactorSeries, FuelFactors};

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults matching the published methodology. Load from
/// TOML with [`EstimateConfig::from_toml_file`] or use
/// [`EstimateConfig::default`] for the built-in values.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimateConfig {
    /// Directory (relative to `FILES_PATH`) holding `<tag>.csv` defaults.
    #[serde(default = "default_defaults_dir")]
    pub defaults_dir: String,
    /// Survey edition and geography filters.
    #[serde(default)]
    pub survey: SurveyConfig,
    /// Pre-calibration residential factors.
    #[serde(default)]
    pub residential: ResidentialConfig,
    /// Year-indexed calibration factors.
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

fn default_defaults_dir() -> String {
    "defaults".to_string()
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            defaults_dir: default_defaults_dir(),
            survey: SurveyConfig::default(),
            residential: ResidentialConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

/// Survey edition and geography filters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveyConfig {
    /// ACS release retained from the housing and fuel tables (e.g. `"2011-15"`).
    pub vintage: String,
    /// Geography label of the national block, compared case-insensitively.
    pub national_geography: String,
    /// Geography label of the state block, compared case-insensitively.
    pub state_geography: String,
    /// Column of the structural-characteristics table holding the state distribution.
    pub state_weight_column: String,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            vintage: "2011-15".to_string(),
            national_geography: "united states".to_string(),
            state_geography: "massachusetts".to_string(),
            state_weight_column: "ma".to_string(),
        }
    }
}

/// Per-fuel factor triple as written in TOML (`{ elec = .., ng = .., foil = .. }`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FuelValues {
    pub elec: f64,
    pub ng: f64,
    pub foil: f64,
}

impl From<FuelValues> for PerFuel<f64> {
    fn from(v: FuelValues) -> Self {
        Self {
            elec: v.elec,
            ng: v.ng,
            foil: v.foil,
        }
    }
}

/// Pre-calibration residential factors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResidentialConfig {
    /// MMBtu per physical unit (kWh, therm, gallon).
    pub conversion: FuelValues,
    /// CO2 per physical unit.
    pub emissions: FuelValues,
}

impl Default for ResidentialConfig {
    fn default() -> Self {
        Self {
            conversion: FuelValues {
                elec: 0.006707,
                ng: 0.1,
                foil: 0.139,
            },
            emissions: FuelValues {
                elec: 0.857,
                ng: 11.71,
                foil: 22.579,
            },
        }
    }
}

/// One row of the electricity calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YearFactors {
    pub year: u32,
    pub conversion: f64,
    pub emissions: f64,
}

/// Constant factors applied to every calibration year.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantFactors {
    pub conversion: f64,
    pub emissions: f64,
}

/// Calibration factors: electricity varies by year, gas is constant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationConfig {
    pub elec: Vec<YearFactors>,
    pub ng: ConstantFactors,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            elec: vec![
                YearFactors {
                    year: 2013,
                    conversion: 0.006841,
                    emissions: 0.93,
                },
                YearFactors {
                    year: 2014,
                    conversion: 0.007692,
                    emissions: 0.941,
                },
                YearFactors {
                    year: 2015,
                    conversion: 0.006707,
                    emissions: 0.857,
                },
            ],
            ng: ConstantFactors {
                conversion: 0.1,
                emissions: 11.71,
            },
        }
    }
}

impl CalibrationConfig {
    /// Factor series for a calibrated fuel, or `None` for fuel oil.
    pub fn series(&self, fuel: Fuel) -> Option<FactorSeries> {
        match fuel {
            Fuel::Elec => FactorSeries::yearly(self.elec.iter().map(|y| {
                (
                    y.year,
                    FuelFactors {
                        conversion: y.conversion,
                        emissions: y.emissions,
                    },
                )
            })),
            Fuel::Ng => Some(FactorSeries::Constant(FuelFactors {
                conversion: self.ng.conversion,
                emissions: self.ng.emissions,
            })),
            Fuel::Foil => None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"survey.vintage"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl EstimateConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.defaults_dir.trim().is_empty() {
            errors.push(ConfigError {
                field: "defaults_dir".into(),
                message: "must not be empty".into(),
            });
        }

        let s = &self.survey;
        for (field, value) in [
            ("survey.vintage", &s.vintage),
            ("survey.national_geography", &s.national_geography),
            ("survey.state_geography", &s.state_geography),
            ("survey.state_weight_column", &s.state_weight_column),
        ] {
            if value.trim().is_empty() {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }
        if s.national_geography.eq_ignore_ascii_case(&s.state_geography) {
            errors.push(ConfigError {
                field: "survey.state_geography".into(),
                message: "must differ from survey.national_geography".into(),
            });
        }

        let r = &self.residential;
        for fuel in Fuel::ALL {
            let conversion = PerFuel::<f64>::from(r.conversion).get(fuel);
            if !(conversion > 0.0) {
                errors.push(ConfigError {
                    field: format!("residential.conversion.{fuel}"),
                    message: "must be > 0".into(),
                });
            }
            let emissions = PerFuel::<f64>::from(r.emissions).get(fuel);
            if !(emissions >= 0.0) {
                errors.push(ConfigError {
                    field: format!("residential.emissions.{fuel}"),
                    message: "must be >= 0".into(),
                });
            }
        }

        let c = &self.calibration;
        if c.elec.is_empty() {
            errors.push(ConfigError {
                field: "calibration.elec".into(),
                message: "must list at least one year".into(),
            });
        }
        let mut seen = BTreeSet::new();
        for y in &c.elec {
            if !seen.insert(y.year) {
                errors.push(ConfigError {
                    field: "calibration.elec".into(),
                    message: format!("year {} listed more than once", y.year),
                });
            }
            if !(y.conversion > 0.0) {
                errors.push(ConfigError {
                    field: format!("calibration.elec[{}].conversion", y.year),
                    message: "must be > 0".into(),
                });
            }
            if !(y.emissions >= 0.0) {
                errors.push(ConfigError {
                    field: format!("calibration.elec[{}].emissions", y.year),
                    message: "must be >= 0".into(),
                });
            }
        }
        if !(c.ng.conversion > 0.0) {
            errors.push(ConfigError {
                field: "calibration.ng.conversion".into(),
                message: "must be > 0".into(),
            });
        }
        if !(c.ng.emissions >= 0.0) {
            errors.push(ConfigError {
                field: "calibration.ng.emissions".into(),
                message: "must be >= 0".into(),
            });
        }

        errors
    }
}
