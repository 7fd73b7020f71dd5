//! Error taxonomy shared by the resolver, the scaffold and the sector methodologies.

use thiserror::Error;

use crate::dataset::DatasetTag;

/// Any failure that aborts the sector currently being computed.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("unknown dataset tag: {0}")]
    UnknownTag(String),

    #[error("cannot resolve dataset {tag}: {message}")]
    Resolution { tag: DatasetTag, message: String },

    #[error("dataset {dataset} is missing column: {column}")]
    MissingColumn { dataset: String, column: String },

    #[error("unmapped {kind} label: \"{label}\"")]
    UnmappedLabel { kind: &'static str, label: String },

    #[error("dataset {dataset} is malformed: {message}")]
    Schema { dataset: String, message: String },

    #[error("numeric error: {0}")]
    Numeric(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EstimateError {
    /// Shorthand for a [`EstimateError::Numeric`] with a formatted message.
    pub fn numeric(message: impl Into<String>) -> Self {
        Self::Numeric(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EstimateError>;
