//! CSV export of search results.

use crate::error::{DashboardError, Result};
use crate::models::SearchResult;
use csv::Writer;

pub const EXPORT_PREFIX: &str = "cord19_search_results_";

/// Download name for a keyword; anything outside `[A-Za-z0-9_-]` becomes `_`.
pub fn export_filename(keyword: &str) -> String {
    let safe: String = keyword
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}{}.csv", EXPORT_PREFIX, safe)
}

/// `title,journal,year` rows for every match, in result order.
pub fn export_csv(result: &SearchResult) -> Result<Vec<u8>> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(["title", "journal", "year"])
        .map_err(|e| DashboardError::Export(e.to_string()))?;

    for record in &result.records {
        let year = record.published_year.to_string();
        wtr.write_record([
            record.title.as_str(),
            record.journal.as_deref().unwrap_or(""),
            year.as_str(),
        ])
        .map_err(|e| DashboardError::Export(e.to_string()))?;
    }

    wtr.into_inner().map_err(|e| DashboardError::Export(e.to_string()))
}
