//! HTTP front controller over a shared [`WordGraph`].
//!
//! Words arrive in any case and are lowercased here before they reach the
//! table. Errors are answered as `{"error": "..."}` with 400 or 404.

use crate::error::{Result, WordHopError};
use crate::word_graph::{ChoiceSet, WordGraph};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Words drawn by `/api/words/random` when no count is given: a start and a
/// target.
pub const DEFAULT_RANDOM_COUNT: usize = 2;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_random_words: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_random_words: 100,
        }
    }
}

#[derive(Clone)]
struct AppState {
    graph: Arc<WordGraph>,
    max_random_words: usize,
}

#[derive(Debug, Deserialize)]
struct RandomQuery {
    count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoicesQuery {
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DistanceQuery {
    to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DistanceResponse {
    pub from: String,
    pub to: String,
    pub distance: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub words: usize,
}

impl IntoResponse for WordHopError {
    fn into_response(self) -> Response {
        let status = match &self {
            WordHopError::NotFound(_) => StatusCode::NOT_FOUND,
            WordHopError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            other => {
                error!("request failed: {other}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn build_router(graph: Arc<WordGraph>, config: &ServerConfig) -> Router {
    let state = AppState {
        graph,
        max_random_words: config.max_random_words,
    };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/words/random", get(random_words))
        .route("/api/words/{word}/choices", get(word_choices))
        .route("/api/words/{word}/distance", get(word_distance))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(graph: Arc<WordGraph>, config: ServerConfig) -> Result<()> {
    let app = build_router(graph, &config);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WordHopError::InvalidRequest(format!("Missing '{name}' query parameter")))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        words: state.graph.table().len(),
    })
}

async fn random_words(
    State(state): State<AppState>,
    Query(q): Query<RandomQuery>,
) -> Result<Json<Vec<String>>> {
    let count = match q.count {
        None => DEFAULT_RANDOM_COUNT,
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            WordHopError::InvalidRequest(format!(
                "'count' must be a non-negative integer, got '{raw}'"
            ))
        })?,
    };
    if count > state.max_random_words {
        return Err(WordHopError::InvalidRequest(format!(
            "'count' must be at most {}",
            state.max_random_words
        )));
    }
    Ok(Json(state.graph.random_words(count)))
}

async fn word_choices(
    State(state): State<AppState>,
    Path(word): Path<String>,
    Query(q): Query<ChoicesQuery>,
) -> Result<Json<ChoiceSet>> {
    let word = word.to_lowercase();
    let target = required(q.target, "target")?;
    debug!("choices for '{word}' toward '{target}'");
    Ok(Json(state.graph.choices_for(&word, &target)?))
}

async fn word_distance(
    State(state): State<AppState>,
    Path(word): Path<String>,
    Query(q): Query<DistanceQuery>,
) -> Result<Json<DistanceResponse>> {
    let from = word.to_lowercase();
    let to = required(q.to, "to")?;
    let distance = state.graph.distance(&from, &to);
    Ok(Json(DistanceResponse { from, to, distance }))
}
