//! Dataset resolution: caller-supplied override files first, built-in defaults second.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

use super::tag::DatasetTag;
use super::table::Table;
use crate::error::{EstimateError, Result};

/// Source of input datasets, keyed by tag.
pub trait DatasetResolver {
    /// Returns the dataset registered under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Resolution`] if no dataset can be produced for
    /// the tag or its file cannot be parsed.
    fn resolve(&self, tag: DatasetTag) -> Result<Table>;
}

/// Already-loaded tables, e.g. assembled in memory by a caller.
impl DatasetResolver for BTreeMap<DatasetTag, Table> {
    fn resolve(&self, tag: DatasetTag) -> Result<Table> {
        self.get(&tag)
            .cloned()
            .ok_or_else(|| EstimateError::Resolution {
                tag,
                message: "no dataset registered".to_string(),
            })
    }
}

/// A file the caller asked to use in place of the default dataset for `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideFile {
    pub path: PathBuf,
    pub tag: DatasetTag,
}

/// Resolves tags from override files, falling back to `<defaults_dir>/<tag>.csv`.
///
/// When several overrides carry the same tag, the one registered last wins.
#[derive(Debug, Clone)]
pub struct FileResolver {
    overrides: Vec<OverrideFile>,
    defaults_dir: PathBuf,
}

impl FileResolver {
    pub fn new(overrides: Vec<OverrideFile>, defaults_dir: impl Into<PathBuf>) -> Self {
        Self {
            overrides,
            defaults_dir: defaults_dir.into(),
        }
    }

    /// Path of the default dataset file for `tag`.
    pub fn default_path(&self, tag: DatasetTag) -> PathBuf {
        self.defaults_dir.join(format!("{tag}.csv"))
    }

    fn override_for(&self, tag: DatasetTag) -> Option<&OverrideFile> {
        self.overrides.iter().rev().find(|o| o.tag == tag)
    }
}

impl DatasetResolver for FileResolver {
    fn resolve(&self, tag: DatasetTag) -> Result<Table> {
        if let Some(file) = self.override_for(tag) {
            debug!("resolving {tag} from override {}", file.path.display());
            return load(tag, &file.path);
        }

        let path = self.default_path(tag);
        if !path.is_file() {
            return Err(EstimateError::Resolution {
                tag,
                message: format!(
                    "no override file given and no default dataset at \"{}\"",
                    path.display()
                ),
            });
        }
        debug!("resolving {tag} from default {}", path.display());
        load(tag, &path)
    }
}

fn load(tag: DatasetTag, path: &Path) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") | None => {}
        Some(other) => {
            return Err(EstimateError::Resolution {
                tag,
                message: format!(
                    "\"{}\": .{other} files are not supported, export the sheet to CSV",
                    path.display()
                ),
            });
        }
    }

    Table::from_path(tag.as_str(), path).map_err(|e| EstimateError::Resolution {
        tag,
        message: format!("\"{}\": {e}", path.display()),
    })
}
