//! Error types for the dashboard.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// The metadata source could not be opened or read. Fatal to the session.
    #[error("Data source unavailable ({}): {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    /// No rows survived cleaning.
    #[error("No usable records in data source")]
    EmptyResult,

    /// Bad summarization parameters or an export without a search.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The summarization backend could not be initialized.
    #[error("Summarization unavailable: {0}")]
    SummarizationUnavailable(String),

    /// The summarization backend was reached but the call failed.
    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DashboardError::EmptyResult => StatusCode::NOT_FOUND,
            DashboardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DashboardError::SummarizationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DashboardError::SummarizationFailed(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
