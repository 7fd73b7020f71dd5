//! Municipal energy consumption, expenditure and emissions estimates built
//! from public survey data and calibrated to utility program usage.

pub mod category;
pub mod cli;
pub mod config;
/// Input tables, tags and dataset resolution.
pub mod dataset;
pub mod error;
pub mod estimator;
pub mod factors;
pub mod publish;
pub mod runner;
/// Sector methodologies and the sector registry.
pub mod sector;
