//! Inbound webhook listener.
//!
//! Receives GitHub issue events and launches one independent full-mode
//! pipeline run per freshly opened issue. The handler answers immediately;
//! the run itself happens in a spawned task. Shared state across
//! concurrent runs is the working directory alone, so deployments that
//! expect overlapping issues should serialize behind a single worker.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::completion::OllamaClient;
use crate::config::Config;
use crate::pipeline::{IssueReport, Pipeline};
use crate::vcs::ProcessRunner;

/// Configuration for the listener.
pub struct ServerConfig {
    pub port: u16,
    pub config: Config,
    pub dev_mode: bool,
}

/// Inbound GitHub webhook payload (subset of fields).
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub action: String,
    pub issue: Option<IssuePayload>,
}

#[derive(Debug, Deserialize)]
pub struct IssuePayload {
    pub title: String,
    pub body: Option<String>,
}

pub struct AppState {
    config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

/// Decide whether a payload triggers a pipeline run. Only the "opened"
/// lifecycle state of an issue event does.
pub fn issue_to_run(payload: &WebhookPayload) -> Option<IssueReport> {
    if payload.action != "opened" {
        return None;
    }
    let issue = payload.issue.as_ref()?;
    Some(IssueReport::new(&issue.title, issue.body.as_deref()))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookPayload>,
) -> impl IntoResponse {
    match issue_to_run(&payload) {
        Some(issue) => {
            info!(title = %issue.title, "new issue event, launching pipeline");
            let config = state.config.clone();
            tokio::spawn(async move {
                let runner = ProcessRunner::new(&config.project_dir);
                let completer = OllamaClient::new(&config.ollama_host, &config.model);
                let pipeline = Pipeline::new(&config.project_dir, &completer, &runner);
                match pipeline.run_full(&issue).await {
                    Ok(report) => {
                        info!(pr_url = %report.pr_url, file = %report.target_file,
                            "pipeline completed");
                    }
                    Err(e) => {
                        error!(title = %issue.title, "pipeline failed: {:#}", anyhow::Error::from(e));
                    }
                }
            });
            (StatusCode::ACCEPTED, Json(serde_json::json!({"status": "accepted"})))
        }
        None => {
            info!(action = %payload.action, "ignoring non-opened issue event");
            (StatusCode::OK, Json(serde_json::json!({"status": "ignored"})))
        }
    }
}

/// Start the listener and block until Ctrl-C.
pub async fn start_server(server: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(server.config));

    let mut app = build_router(state);
    if server.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("0.0.0.0:{}", server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("autopr listener running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
