//! Sequential sector execution.

use log::{error, info};

use crate::config::EstimateConfig;
use crate::dataset::{DatasetResolver, Table};
use crate::error::Result;
use crate::sector::Sector;

/// Outcome of one sector run.
#[derive(Debug)]
pub struct SectorRun {
    pub sector: Sector,
    pub outcome: Result<Table>,
}

impl SectorRun {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs each sector in order. A failed sector is logged and recorded; the
/// remaining sectors still run.
pub fn run_sectors(
    sectors: &[Sector],
    config: &EstimateConfig,
    resolver: &dyn DatasetResolver,
) -> Vec<SectorRun> {
    sectors
        .iter()
        .map(|&sector| {
            info!("Processing {sector} sector...");
            let outcome = sector.estimate(config, resolver);
            match &outcome {
                Ok(table) => info!("Finished {sector} sector: {} rows", table.len()),
                Err(e) => error!("{sector} sector failed: {e}"),
            }
            SectorRun { sector, outcome }
        })
        .collect()
}
