//! Abstractive summarization through an external inference endpoint.
//!
//! The backend is initialized lazily on the first request and reused for the
//! rest of the process. Requests speak the Hugging Face inference API shape:
//! `POST {endpoint}/models/{model}` with `inputs` and generation `parameters`,
//! answered by `[{"summary_text": ...}]`.

use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{info, warn};
use url::Url;

#[cfg(test)]
#[path = "summarize_test.rs"]
mod summarize_test;

pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MIN_LENGTH: usize = 30;
pub const DEFAULT_MAX_LENGTH: usize = 130;

// ============================================================================
// Backend Seam
// ============================================================================

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` to between `min_length` and `max_length` tokens.
    async fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String>;
}

/// Reject requests the backend should never see.
pub fn validate_request(text: &str, min_length: usize, max_length: usize) -> Result<()> {
    if text.trim().is_empty() {
        return Err(DashboardError::InvalidRequest("text is empty".to_string()));
    }
    if min_length == 0 || min_length > max_length {
        return Err(DashboardError::InvalidRequest(format!(
            "length bounds must satisfy 0 < min <= max (got min={}, max={})",
            min_length, max_length
        )));
    }
    Ok(())
}

// ============================================================================
// Model Configuration
// ============================================================================

/// Identity and transport settings of the summarization model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            token: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Cache key: one backend per endpoint/model pair.
    pub fn identity(&self) -> String {
        format!("{}#{}", self.endpoint.trim_end_matches('/'), self.model)
    }

    /// Full inference URL for this model.
    pub fn model_url(&self) -> std::result::Result<Url, String> {
        let mut base = Url::parse(&self.endpoint).map_err(|e| format!("invalid endpoint: {}", e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(format!("unsupported endpoint scheme '{}'", base.scheme()));
        }
        if self.model.trim().is_empty() {
            return Err("model name is empty".to_string());
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&format!("models/{}", self.model))
            .map_err(|e| format!("invalid model path: {}", e))
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }
}

// ============================================================================
// HTTP Backend
// ============================================================================

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

pub struct HttpSummarizer {
    client: reqwest::Client,
    url: Url,
    token: Option<String>,
}

impl HttpSummarizer {
    /// Resolve the model URL and build the HTTP client.
    pub fn connect(config: &ModelConfig) -> Result<Self> {
        let url = config
            .model_url()
            .map_err(DashboardError::SummarizationUnavailable)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("cord19-dashboard/0.1")
            .build()
            .map_err(|e| DashboardError::SummarizationUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            url,
            token: config.token.clone(),
        })
    }
}

/// Pull `summary_text` out of an inference response.
fn parse_summary(json: &serde_json::Value) -> Option<String> {
    let entry = match json {
        serde_json::Value::Array(items) => items.first()?,
        other => other,
    };
    entry
        .get("summary_text")
        .and_then(|s| s.as_str())
        .map(|s| s.trim().to_string())
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String> {
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                min_length,
                max_length,
                do_sample: false,
            },
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::SummarizationFailed(e.to_string()))?;

        let status = response.status();
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DashboardError::SummarizationFailed(format!("{} ({})", e, status)))?;

        if !status.is_success() {
            let detail = json
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("no detail");
            return Err(DashboardError::SummarizationFailed(format!(
                "backend returned {}: {}",
                status, detail
            )));
        }

        parse_summary(&json).ok_or_else(|| {
            DashboardError::SummarizationFailed("response has no summary_text".to_string())
        })
    }
}

// ============================================================================
// Process-wide Backend Cache
// ============================================================================

type Initializer = Box<dyn Fn(&ModelConfig) -> Result<Arc<dyn Summarizer>> + Send + Sync>;

/// Lazily initialized summarizer for one model configuration. A successful
/// initialization is kept for the process lifetime; a failed one is retried
/// on the next request.
pub struct SummarizerCache {
    config: ModelConfig,
    cell: OnceCell<Arc<dyn Summarizer>>,
    init: Initializer,
}

impl SummarizerCache {
    /// Cache backed by [`HttpSummarizer`].
    pub fn new(config: ModelConfig) -> Self {
        Self::with_initializer(config, |config| {
            Ok(Arc::new(HttpSummarizer::connect(config)?) as Arc<dyn Summarizer>)
        })
    }

    pub fn with_initializer<F>(config: ModelConfig, init: F) -> Self
    where
        F: Fn(&ModelConfig) -> Result<Arc<dyn Summarizer>> + Send + Sync + 'static,
    {
        Self {
            config,
            cell: OnceCell::new(),
            init: Box::new(init),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    async fn backend(&self) -> Result<Arc<dyn Summarizer>> {
        self.cell
            .get_or_try_init(|| async {
                let backend = (self.init)(&self.config).map_err(|e| match e {
                    DashboardError::SummarizationUnavailable(_) => e,
                    other => DashboardError::SummarizationUnavailable(other.to_string()),
                })?;
                info!("Summarizer initialized for {}", self.config.identity());
                Ok::<_, DashboardError>(backend)
            })
            .await
            .cloned()
    }

    /// Validate, initialize on first use, then summarize.
    pub async fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String> {
        validate_request(text, min_length, max_length)?;
        let backend = self.backend().await?;

        let started = Instant::now();
        let result = backend.summarize(text, min_length, max_length).await;
        match &result {
            Ok(summary) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = summary.len(),
                "Summary generated"
            ),
            Err(e) => warn!(elapsed_ms = started.elapsed().as_millis() as u64, "{}", e),
        }
        result
    }
}
