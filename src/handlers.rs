//! HTTP route handlers.
//!
//! Each request is one interaction: the query string is decoded into an
//! explicit [`Interaction`], run through the pipeline, and rendered.

use crate::error::DashboardError;
use crate::export::{export_csv, export_filename};
use crate::models::{FilterSpec, SearchOutcome};
use crate::pipeline::{self, FilterSelection, Interaction};
use crate::templates::{base_html, html_escape, render_dashboard};
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

// ============================================================================
// Query Parameters
// ============================================================================

/// Dashboard form fields. `year` and `journal` repeat once per checked box;
/// `filtered` marks that the filter form was submitted at all, so an empty
/// selection can be told apart from a first visit.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub year: Vec<i32>,
    #[serde(default)]
    pub journal: Vec<String>,
    pub filtered: Option<String>,
    pub q: Option<String>,
    pub paper: Option<String>,
    pub summarize: Option<String>,
}

impl DashboardParams {
    pub fn interaction(&self) -> Interaction {
        let filter = if self.filtered.is_some() {
            FilterSelection::Explicit(FilterSpec::new(
                self.year.iter().copied(),
                self.journal.iter().cloned(),
            ))
        } else {
            FilterSelection::Defaults
        };

        Interaction {
            filter,
            keyword: self.q.clone(),
            selected_title: self.paper.clone().filter(|p| !p.is_empty()),
            summarize: self.summarize.as_deref().is_some_and(|s| !s.is_empty() && s != "0"),
        }
    }
}

fn error_page(err: &DashboardError) -> Response {
    let body = format!(
        r#"<div class="layout"><main class="main"><h1>Dashboard unavailable</h1><p class="error">{}</p></main></div>"#,
        html_escape(&err.to_string())
    );
    (err.status(), Html(base_html("Error", &body))).into_response()
}

// ============================================================================
// Dashboard Page
// ============================================================================

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let dataset = match state.dataset.get_or_load() {
        Ok(d) => d,
        Err(e) => {
            error!("Cannot load dataset: {}", e);
            return error_page(&e);
        }
    };

    let interaction = params.interaction();
    let options = state.config.pipeline_options();
    let snapshot = pipeline::run(&dataset, &interaction, &options);

    let summary = pipeline::summarize_selection(
        &snapshot,
        &interaction,
        &state.summarizer,
        state.config.summary_bounds(),
    )
    .await
    .map(|outcome| {
        outcome.map_err(|e| {
            match e {
                DashboardError::InvalidRequest(_) => error!("Summary request rejected: {}", e),
                _ => warn!("Summary not generated: {}", e),
            }
            e.to_string()
        })
    });

    let keyword = params.q.as_deref().unwrap_or("");
    Html(render_dashboard(&snapshot, keyword, summary.as_ref(), &options)).into_response()
}

// ============================================================================
// CSV Export
// ============================================================================

pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, DashboardError> {
    let dataset = state.dataset.get_or_load()?;
    let interaction = params.interaction();
    let snapshot = pipeline::run(&dataset, &interaction, &state.config.pipeline_options());

    let result = match &snapshot.search {
        SearchOutcome::Searched(result) => result,
        SearchOutcome::NotSearched => {
            return Err(DashboardError::InvalidRequest(
                "export needs a search keyword".to_string(),
            ))
        }
    };

    let body = export_csv(result)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(&result.keyword));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ============================================================================
// JSON API
// ============================================================================

/// Overview numbers and aggregates for the same parameters as the page.
pub async fn api_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<serde_json::Value>, DashboardError> {
    let dataset = state.dataset.get_or_load()?;
    let snapshot = pipeline::run(&dataset, &params.interaction(), &state.config.pipeline_options());

    let search = snapshot.search.result().map(|r| {
        let titles: Vec<&str> = r
            .head(state.config.result_limit)
            .iter()
            .map(|rec| rec.title.as_str())
            .collect();
        serde_json::json!({
            "keyword": r.keyword,
            "count": r.count,
            "titles": titles,
        })
    });
    let year_range = snapshot.year_range.map(|(lo, hi)| [lo, hi]);

    Ok(Json(serde_json::json!({
        "total": snapshot.total(),
        "year_range": year_range,
        "papers_per_year": snapshot.year_counts,
        "top_journals": snapshot.top_journals,
        "search": search,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// Summarize raw text, or the abstract of the first paper with `title`.
pub async fn api_summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<serde_json::Value>, DashboardError> {
    let (default_min, default_max) = state.config.summary_bounds();
    let min = req.min_length.unwrap_or(default_min);
    let max = req.max_length.unwrap_or(default_max);

    let text = match (req.text, req.title) {
        (Some(text), _) => text,
        (None, Some(title)) => {
            let dataset = state.dataset.get_or_load()?;
            dataset
                .records()
                .iter()
                .find(|r| r.title == title)
                .map(|r| r.abstract_text.clone())
                .ok_or_else(|| {
                    DashboardError::InvalidRequest(format!("no paper titled '{}'", title))
                })?
        }
        (None, None) => {
            return Err(DashboardError::InvalidRequest(
                "either text or title is required".to_string(),
            ))
        }
    };

    let summary = state.summarizer.summarize(&text, min, max).await?;
    Ok(Json(serde_json::json!({ "summary": summary })))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let records = state.dataset.get_or_load().map(|d| d.len()).ok();
    Json(serde_json::json!({
        "status": if records.is_some() { "ok" } else { "degraded" },
        "records": records,
        "model": state.summarizer.config().model,
        "summarizer_ready": state.summarizer.is_initialized(),
    }))
}
