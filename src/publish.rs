//! CSV publication of sector output tables.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::dataset::Table;
use crate::error::Result;
use crate::sector::Sector;

/// Output file for `sector` inside `dir`: `<sector>-data.csv`.
pub fn sector_path(dir: &Path, sector: Sector) -> PathBuf {
    dir.join(format!("{sector}-data.csv"))
}

/// Writes a table as CSV to any writer.
///
/// Output is deterministic for identical tables.
///
/// # Arguments
///
/// * `table` - Output table, header row first
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns a CSV or IO error if writing fails.
pub fn write_table(table: &Table, writer: impl Write) -> Result<()> {
    table.write_csv(writer)
}

/// Exports a table to a CSV file at the given path.
///
/// # Errors
///
/// Returns an IO error if file creation fails, or any error of [`write_table`].
pub fn export_table(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_table(table, io::BufWriter::new(file))
}

/// Publishes one sector's table into `dir`, creating the directory if needed.
///
/// # Errors
///
/// Returns an IO error if the directory or file cannot be written.
pub fn publish_sector(dir: &Path, sector: Sector, table: &Table) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = sector_path(dir, sector);
    export_table(table, &path)?;
    info!("Published {sector}: {} rows to {}", table.len(), path.display());
    Ok(path)
}
