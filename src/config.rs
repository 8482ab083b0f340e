//! Command-line and environment configuration.

use crate::error::{DashboardError, Result};
use crate::pipeline::PipelineOptions;
use crate::summarize::{
    ModelConfig, DEFAULT_ENDPOINT, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, DEFAULT_MODEL,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "cord19-dashboard")]
#[command(about = "Interactive dashboard for CORD-19 research metadata")]
#[command(version)]
pub struct Config {
    /// Metadata CSV (title, abstract, publish_time, journal, source_x)
    #[arg(short, long, default_value = "metadata.csv", env = "CORD19_DATA")]
    pub data: PathBuf,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000", env = "CORD19_BIND")]
    pub bind: String,

    /// Base URL of the summarization inference endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "CORD19_SUMMARIZER_ENDPOINT")]
    pub summarizer_endpoint: String,

    /// Summarization model name
    #[arg(long, default_value = DEFAULT_MODEL, env = "CORD19_SUMMARIZER_MODEL")]
    pub summarizer_model: String,

    /// Bearer token for the inference endpoint
    #[arg(long, env = "CORD19_SUMMARIZER_TOKEN", hide_env_values = true)]
    pub summarizer_token: Option<String>,

    #[arg(long, default_value_t = 120, env = "CORD19_SUMMARIZER_TIMEOUT_SECS")]
    pub summarizer_timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH, env = "CORD19_SUMMARY_MIN_LENGTH")]
    pub summary_min_length: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH, env = "CORD19_SUMMARY_MAX_LENGTH")]
    pub summary_max_length: usize,

    /// Journals pre-selected and charted
    #[arg(long, default_value_t = 10, env = "CORD19_TOP_JOURNALS")]
    pub top_journals: usize,

    /// Search results shown in the table and paper selector
    #[arg(long, default_value_t = 20, env = "CORD19_RESULT_LIMIT")]
    pub result_limit: usize,

    /// Terms shown in the abstract word cloud
    #[arg(long, default_value_t = 100, env = "CORD19_CLOUD_TERMS")]
    pub cloud_terms: usize,
}

impl Config {
    /// Reject settings that would make every summary request invalid.
    pub fn validate(&self) -> Result<()> {
        if self.summary_min_length == 0 || self.summary_min_length > self.summary_max_length {
            return Err(DashboardError::InvalidRequest(format!(
                "summary length bounds must satisfy 0 < min <= max (got {}..{})",
                self.summary_min_length, self.summary_max_length
            )));
        }
        Ok(())
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            endpoint: self.summarizer_endpoint.clone(),
            model: self.summarizer_model.clone(),
            token: self.summarizer_token.clone(),
            timeout: Duration::from_secs(self.summarizer_timeout_secs),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            top_journals: self.top_journals,
            result_limit: self.result_limit,
            cloud_terms: self.cloud_terms,
        }
    }

    pub fn summary_bounds(&self) -> (usize, usize) {
        (self.summary_min_length, self.summary_max_length)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from(["cord19-dashboard"])
    }
}
