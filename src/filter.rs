//! Filter engine: year/journal set membership over a dataset.

use crate::models::{Dataset, FilterSpec, View};
use rayon::prelude::*;

/// Records of `dataset` matching `spec`, in dataset order.
///
/// An empty year or journal set yields an empty view; it is never read as
/// "no filter".
pub fn apply_filter<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> View<'a> {
    if spec.years.is_empty() || spec.journals.is_empty() {
        return View::default();
    }

    View::new(
        dataset
            .records()
            .par_iter()
            .filter(|record| spec.matches(record))
            .collect(),
    )
}

/// The filter shown before the user touches the controls: every year, and
/// the first `journal_limit` journals in sorted order.
pub fn default_filter(dataset: &Dataset, journal_limit: usize) -> FilterSpec {
    FilterSpec::new(
        dataset.available_years(),
        dataset.available_journals().into_iter().take(journal_limit),
    )
}
