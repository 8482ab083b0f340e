//! CORD-19 dashboard library - re-exports for testing and external use.
//!
//! The crate is organized leaves first:
//!
//! - `loader`: CSV loading, cleaning and the per-process dataset cache
//! - `filter`: year/journal filtering into views
//! - `aggregate`: per-year counts, top journals, term frequencies
//! - `search`: keyword search over abstracts
//! - `summarize`: summarization backend and its process-wide cache
//! - `pipeline`: explicit interaction state and stage ordering
//! - `export`, `templates`, `handlers`: presentation

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod summarize;
pub mod templates;

// ============================================================================
// Application State
// ============================================================================

/// Shared, read-only state. Both caches are filled at most once.
pub struct AppState {
    pub config: config::Config,
    pub dataset: loader::DatasetCache,
    pub summarizer: summarize::SummarizerCache,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let dataset = loader::DatasetCache::new(config.data.clone());
        let summarizer = summarize::SummarizerCache::new(config.model_config());
        Self::with_parts(config, dataset, summarizer)
    }

    pub fn with_parts(
        config: config::Config,
        dataset: loader::DatasetCache,
        summarizer: summarize::SummarizerCache,
    ) -> Self {
        Self {
            config,
            dataset,
            summarizer,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/export.csv", get(handlers::export))
        .route("/api/summary", get(handlers::api_summary))
        .route("/api/summarize", post(handlers::api_summarize))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Re-export commonly used types
pub use error::{DashboardError, Result};

pub use models::{
    Dataset, FilterSpec, JournalCount, Record, SearchOutcome, SearchResult, TermCount, View,
    YearCount,
};

pub use loader::{load, load_from_reader, parse_year, DatasetCache, LoadStats};

pub use filter::{apply_filter, default_filter};

pub use aggregate::{count_by_year, term_frequencies, top_journals, year_range};

pub use search::search;

pub use summarize::{HttpSummarizer, ModelConfig, Summarizer, SummarizerCache};

pub use pipeline::{DashboardSnapshot, FilterSelection, Interaction, PipelineOptions};

pub use export::{export_csv, export_filename};
