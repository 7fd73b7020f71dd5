//! Scaffold that resolves a methodology's datasets and runs it once.

use log::debug;

use crate::dataset::{DatasetResolver, DatasetTag, Datasets};
use crate::error::Result;

/// A sector methodology bound to the dataset tags it needs.
///
/// Generic over the methodology function for static dispatch. The scaffold
/// has no behaviour of its own beyond resolution: the first failed tag aborts
/// the run and the methodology's result is returned unchanged.
pub struct Estimator<F> {
    required: &'static [DatasetTag],
    methodology: F,
}

impl<F, T> Estimator<F>
where
    F: Fn(&Datasets) -> Result<T>,
{
    /// Creates an estimator from the tags `methodology` reads.
    pub fn new(required: &'static [DatasetTag], methodology: F) -> Self {
        Self {
            required,
            methodology,
        }
    }

    /// Resolves every required tag in order, then calls the methodology.
    ///
    /// # Errors
    ///
    /// Propagates the first resolution failure, or the methodology's error.
    pub fn estimate(&self, resolver: &dyn DatasetResolver) -> Result<T> {
        let mut datasets = Datasets::new();
        for &tag in self.required {
            let table = resolver.resolve(tag)?;
            debug!("resolved {tag}: {} rows", table.len());
            datasets.insert(tag, table);
        }
        (self.methodology)(&datasets)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use super::*;
    use crate::dataset::Table;
    use crate::error::EstimateError;

    /// Records the order of resolution calls.
    struct Recording {
        tables: BTreeMap<DatasetTag, Table>,
        calls: RefCell<Vec<DatasetTag>>,
    }

    impl DatasetResolver for Recording {
        fn resolve(&self, tag: DatasetTag) -> Result<Table> {
            self.calls.borrow_mut().push(tag);
            self.tables.resolve(tag)
        }
    }

    fn recording(tags: &[DatasetTag]) -> Recording {
        Recording {
            tables: tags
                .iter()
                .map(|&t| (t, Table::new(t.as_str(), ["n"], [["1"], ["2"]])))
                .collect(),
            calls: RefCell::new(Vec::new()),
        }
    }

    const REQUIRED: &[DatasetTag] = &[DatasetTag::AcsUis, DatasetTag::AcsHf];

    #[test]
    fn resolves_each_required_tag_once_in_order() {
        let resolver = recording(REQUIRED);
        let estimator =
            Estimator::new(REQUIRED, |d: &Datasets| -> Result<usize> { Ok(d.tags().count()) });
        assert_eq!(estimator.estimate(&resolver).unwrap(), 2);
        assert_eq!(*resolver.calls.borrow(), REQUIRED);
    }

    #[test]
    fn returns_methodology_result_unchanged() {
        let resolver = recording(REQUIRED);
        let estimator = Estimator::new(REQUIRED, |d: &Datasets| -> Result<Table> {
            Ok(d.get(DatasetTag::AcsHf)?.clone())
        });
        let out = estimator.estimate(&resolver).unwrap();
        assert_eq!(out, Table::new("acs_hf", ["n"], [["1"], ["2"]]));
    }

    #[test]
    fn resolution_failure_skips_methodology() {
        let resolver = recording(&[DatasetTag::AcsUis]);
        let ran = RefCell::new(false);
        let estimator = Estimator::new(REQUIRED, |_: &Datasets| -> Result<()> {
            *ran.borrow_mut() = true;
            Ok(())
        });
        let err = estimator.estimate(&resolver).unwrap_err();
        assert!(matches!(err, EstimateError::Resolution { tag: DatasetTag::AcsHf, .. }));
        assert!(!*ran.borrow());
    }

    #[test]
    fn undeclared_tag_is_not_visible_to_methodology() {
        let resolver = recording(&[DatasetTag::AcsUis, DatasetTag::AcsHf, DatasetTag::Eowld]);
        let estimator = Estimator::new(REQUIRED, |d: &Datasets| -> Result<usize> {
            d.get(DatasetTag::Eowld).map(Table::len)
        });
        assert!(estimator.estimate(&resolver).is_err());
    }
}
