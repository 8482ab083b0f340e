//! Metadata loading and cleaning.
//!
//! Reads the CORD-19 style `metadata.csv`, drops rows without a title or
//! abstract, projects to the columns the dashboard uses and reduces
//! `publish_time` to a year. Rows whose date cannot be parsed are dropped.

use crate::error::{DashboardError, Result};
use crate::models::{Dataset, Record};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder};
use once_cell::sync::OnceCell;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

pub const COL_TITLE: &str = "title";
pub const COL_ABSTRACT: &str = "abstract";
pub const COL_PUBLISH_TIME: &str = "publish_time";
pub const COL_JOURNAL: &str = "journal";
pub const COL_SOURCE: &str = "source_x";

// ============================================================================
// Column Layout
// ============================================================================

struct Columns {
    title: usize,
    abstract_text: usize,
    publish_time: usize,
    journal: Option<usize>,
    source: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &ByteRecord) -> std::result::Result<Self, String> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim() == name)
        };
        let require = |name: &str| find(name).ok_or_else(|| format!("missing column '{}'", name));

        Ok(Self {
            title: require(COL_TITLE)?,
            abstract_text: require(COL_ABSTRACT)?,
            publish_time: require(COL_PUBLISH_TIME)?,
            journal: find(COL_JOURNAL),
            source: find(COL_SOURCE),
        })
    }
}

/// Cell value, or `None` if the cell is missing or blank.
fn cell(row: &ByteRecord, idx: usize) -> Option<String> {
    let raw = row.get(idx)?;
    let value = String::from_utf8_lossy(raw);
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// Date Parsing
// ============================================================================

/// Extract a year from a loosely formatted publication date.
///
/// Accepts full dates, year-month, bare years, timestamps, RFC 3339 and the
/// `2020 Mar 15` style used by PubMed exports.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y %b %d", "%d %b %Y"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.year());
        }
    }

    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.year());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }

    // Year-month and "2020 Mar" have no day component; pin them to the 1st.
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{} 01", s), "%Y %b %d"))
        .ok()
        .map(|d| d.year())
}

// ============================================================================
// Loading
// ============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub dropped_incomplete: usize,
    pub dropped_undated: usize,
    pub kept: usize,
}

/// Load and clean records from any CSV reader.
pub fn load_from_reader<R: Read>(reader: R, origin: &Path) -> Result<(Dataset, LoadStats)> {
    let unavailable = |reason: String| DashboardError::SourceUnavailable {
        path: origin.to_path_buf(),
        reason,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.byte_headers().map_err(|e| unavailable(e.to_string()))?.clone();
    let cols = Columns::from_headers(&headers).map_err(unavailable)?;

    let mut stats = LoadStats::default();
    let mut records = Vec::new();
    let mut row = ByteRecord::new();

    while rdr
        .read_byte_record(&mut row)
        .map_err(|e| unavailable(e.to_string()))?
    {
        stats.rows_read += 1;

        let (title, abstract_text) = match (cell(&row, cols.title), cell(&row, cols.abstract_text)) {
            (Some(t), Some(a)) => (t, a),
            _ => {
                stats.dropped_incomplete += 1;
                continue;
            }
        };

        let published_year = match cell(&row, cols.publish_time).as_deref().and_then(parse_year) {
            Some(y) => y,
            None => {
                stats.dropped_undated += 1;
                continue;
            }
        };

        records.push(Record {
            title,
            abstract_text,
            published_year,
            journal: cols.journal.and_then(|i| cell(&row, i)),
            source: cols.source.and_then(|i| cell(&row, i)).unwrap_or_default(),
        });
    }

    stats.kept = records.len();
    debug!(?stats, "Cleaned metadata rows from {}", origin.display());

    if records.is_empty() {
        return Err(DashboardError::EmptyResult);
    }

    Ok((Dataset::new(records), stats))
}

/// Load and clean records from a CSV file on disk.
pub fn load(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| DashboardError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let (dataset, stats) = load_from_reader(file, path)?;
    info!(
        "Loaded {} records from {} ({} rows read, {} missing title/abstract, {} undated)",
        stats.kept,
        path.display(),
        stats.rows_read,
        stats.dropped_incomplete,
        stats.dropped_undated
    );
    Ok(dataset)
}

// ============================================================================
// Session Cache
// ============================================================================

/// Write-once dataset cell for one source path. The source is read at most
/// once per process; later calls return the same `Arc`.
pub struct DatasetCache {
    path: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Cache that already holds `dataset`; the source is never read.
    pub fn preloaded(path: impl Into<PathBuf>, dataset: Dataset) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::with_value(Arc::new(dataset)),
        }
    }

    /// Return the cached dataset, loading it on first use.
    ///
    /// An `EmptyResult` is cached as an empty dataset so the page can render
    /// "no data" states. `SourceUnavailable` is returned and not cached.
    pub fn get_or_load(&self) -> Result<Arc<Dataset>> {
        self.cell
            .get_or_try_init(|| match load(&self.path) {
                Ok(dataset) => Ok(Arc::new(dataset)),
                Err(DashboardError::EmptyResult) => {
                    warn!("No usable records in {}", self.path.display());
                    Ok(Arc::new(Dataset::default()))
                }
                Err(e) => Err(e),
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
