//! Input datasets: tags, tables, missing-aware numbers and resolution.

pub mod resolver;
pub mod table;
pub mod tag;
pub mod value;

use std::collections::BTreeMap;

pub use resolver::{DatasetResolver, FileResolver, OverrideFile};
pub use table::Table;
pub use tag::DatasetTag;
pub use value::OptionalNumber;

use crate::error::{EstimateError, Result};

/// Resolved tables handed to a methodology, keyed by tag.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    tables: BTreeMap<DatasetTag, Table>,
}

impl Datasets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: DatasetTag, table: Table) {
        self.tables.insert(tag, table);
    }

    /// Table for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Resolution`] if the tag was not resolved, which
    /// means the methodology asked for a dataset it did not declare.
    pub fn get(&self, tag: DatasetTag) -> Result<&Table> {
        self.tables
            .get(&tag)
            .ok_or_else(|| EstimateError::Resolution {
                tag,
                message: "dataset was not among the required tags".to_string(),
            })
    }

    pub fn tags(&self) -> impl Iterator<Item = DatasetTag> + '_ {
        self.tables.keys().copied()
    }
}

impl FromIterator<(DatasetTag, Table)> for Datasets {
    fn from_iter<I: IntoIterator<Item = (DatasetTag, Table)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}
