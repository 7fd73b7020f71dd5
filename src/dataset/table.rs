//! In-memory tabular dataset backed by CSV records.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use csv::{StringRecord, Trim};
use serde::de::DeserializeOwned;

use crate::error::{EstimateError, Result};

/// An ordered set of named columns with one string record per row.
///
/// Cells are kept as text; callers deserialize rows into typed records with
/// [`Table::deserialize`] or read single columns with [`Table::column`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl Table {
    /// Builds a table from already-split headers and rows.
    pub fn new<H, R>(name: impl Into<String>, headers: H, rows: impl IntoIterator<Item = R>) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let headers = headers.into_iter().collect::<StringRecord>();
        let records = rows
            .into_iter()
            .map(|r| r.into_iter().collect::<StringRecord>())
            .collect();
        Self {
            name: name.into(),
            headers,
            records,
        }
    }

    /// Parses CSV text with a header row. Whitespace around cells is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Csv`] if the input is not valid CSV.
    pub fn from_reader(name: impl Into<String>, reader: impl Read) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(false)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            headers,
            records,
        })
    }

    /// Opens and parses a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an IO or CSV error if the file cannot be read or parsed.
    pub fn from_path(name: impl Into<String>, path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(name, io::BufReader::new(file))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    /// Position of a column by exact header name.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::MissingColumn`] if no header matches.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| EstimateError::MissingColumn {
                dataset: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Checks that every listed column is present.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::MissingColumn`] for the first absent column.
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        for column in columns {
            self.column_index(column)?;
        }
        Ok(())
    }

    /// All values of one column, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::MissingColumn`] if the column is absent.
    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(column)?;
        Ok(self
            .records
            .iter()
            .map(|r| r.get(idx).unwrap_or(""))
            .collect())
    }

    /// Deserializes every row into `T` by header name.
    ///
    /// Columns not named by `T` are ignored. Callers should run
    /// [`Table::require_columns`] first so an absent column is reported as
    /// such rather than as a row-level parse failure.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Schema`] naming the first row that fails.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                record
                    .deserialize::<T>(Some(&self.headers))
                    .map_err(|e| EstimateError::Schema {
                        dataset: self.name.clone(),
                        // +2: one-based, after the header line
                        message: format!("row {}: {e}", i + 2),
                    })
            })
            .collect()
    }

    /// Writes the table as CSV (header row first) to any writer.
    ///
    /// # Errors
    ///
    /// Returns a CSV error if writing fails.
    pub fn write_csv(&self, writer: impl Write) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for record in &self.records {
            wtr.write_record(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
