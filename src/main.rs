//! CORD-19 research dashboard - main entry point.
//!
//! Loads the metadata CSV once, then serves the dashboard page, CSV export
//! and a small JSON API. See the library crate for the pipeline itself.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use cord19_dashboard::{build_router, config::Config, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cord19_dashboard=info,tower_http=info".into()),
        )
        .init();

    let config = Config::parse();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    info!(
        "Starting CORD-19 dashboard v{} (data: {}, model: {})",
        env!("CARGO_PKG_VERSION"),
        config.data.display(),
        config.summarizer_model
    );

    let state = Arc::new(AppState::new(config));

    // A missing source is fatal; an empty one still serves "no data" pages.
    let loader_state = state.clone();
    match tokio::task::spawn_blocking(move || loader_state.dataset.get_or_load()).await {
        Ok(Ok(dataset)) => info!("Dataset ready: {} records", dataset.len()),
        Ok(Err(e)) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("Dataset loader panicked: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let listener = match tokio::net::TcpListener::bind(&state.config.bind).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", state.config.bind, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Dashboard running at http://{}", state.config.bind);

    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
