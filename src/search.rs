//! Keyword search over the abstracts of a view.

use crate::models::{SearchOutcome, SearchResult, View};
use rayon::prelude::*;

/// Case-insensitive substring search over `abstract`.
///
/// A missing or empty keyword is `NotSearched`, which callers keep apart from
/// a search that happened to match every record.
pub fn search<'a>(view: &View<'a>, keyword: Option<&str>) -> SearchOutcome<'a> {
    let keyword = match keyword {
        Some(k) if !k.is_empty() => k.to_lowercase(),
        _ => return SearchOutcome::NotSearched,
    };

    let records: Vec<_> = view
        .records
        .par_iter()
        .copied()
        .filter(|record| record.abstract_text.to_lowercase().contains(&keyword))
        .collect();

    SearchOutcome::Searched(SearchResult {
        count: records.len(),
        keyword,
        records,
    })
}
