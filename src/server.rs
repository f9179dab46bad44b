//! Navigation and search HTTP server.
//!
//! Exposes the archive to a UI collaborator as a read-only JSON API.
//! The archive is loaded once and shared between handlers behind an `Arc`;
//! no handler mutates it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check (returns version) |
//! | `GET` | `/comics/first` | Earliest comic |
//! | `GET` | `/comics/last` | Latest comic |
//! | `GET` | `/comics/random` | Uniformly random comic |
//! | `GET` | `/comics/{date}` | Comic for an exact date |
//! | `GET` | `/comics/{date}/previous` | Nearest earlier comic, or boundary |
//! | `GET` | `/comics/{date}/next` | Nearest later comic, or boundary |
//! | `GET` | `/search?q=&limit=&order=` | Substring search |
//! | `GET` | `/stats` | Archive statistics |
//!
//! Navigation responses have the shape `{ "item": {...} | null, "boundary": bool }`.
//! Running past either end of the archive is a `200` with `boundary: true`.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "invalid date 'x', expected YYYY-MM-DD" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use comic_archive_core::archive::Archive;
use comic_archive_core::models::SearchResult;
use comic_archive_core::search::{search, SearchOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::navigate::{neighbor, parse_date_arg, Direction, NavigationResponse};
use crate::stats::{compute_stats, ArchiveStats};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    archive: Arc<Archive>,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(archive: Arc<Archive>, config: Arc<Config>) -> Self {
        Self { archive, config }
    }
}

/// Build the router with all routes and permissive CORS.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/comics/first", get(handle_first))
        .route("/comics/last", get(handle_last))
        .route("/comics/random", get(handle_random))
        .route("/comics/{date}", get(handle_get))
        .route("/comics/{date}/previous", get(handle_previous))
        .route("/comics/{date}/next", get(handle_next))
        .route("/search", get(handle_search))
        .route("/stats", get(handle_stats))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind`. Runs until the process is terminated.
pub async fn run_server(config: &Config, archive: Archive) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::new(Arc::new(archive), Arc::new(config.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "comic archive server listening");
    println!("Comic archive server listening on http://{}", bind_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Json<serde_json::Value>, AppError> {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| internal(e.to_string()))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    items: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        items: state.archive.len(),
    })
}

// ============ Navigation ============

async fn handle_first(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let item = state.archive.first().map_err(|e| not_found(e.to_string()))?;
    to_json(&NavigationResponse::found(item))
}

async fn handle_last(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let item = state.archive.last().map_err(|e| not_found(e.to_string()))?;
    to_json(&NavigationResponse::found(item))
}

async fn handle_random(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let item = state.archive.random().map_err(|e| not_found(e.to_string()))?;
    to_json(&NavigationResponse::found(item))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = parse_date_arg(&date).map_err(|e| bad_request(e.to_string()))?;
    let item = state
        .archive
        .get(date)
        .ok_or_else(|| not_found(format!("no comic for {}", date)))?;
    to_json(&NavigationResponse::found(item))
}

async fn handle_previous(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    handle_neighbor(&state, &date, Direction::Previous)
}

async fn handle_next(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    handle_neighbor(&state, &date, Direction::Next)
}

fn handle_neighbor(
    state: &AppState,
    date: &str,
    direction: Direction,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = parse_date_arg(date).map_err(|e| bad_request(e.to_string()))?;
    let found = neighbor(&state.archive, date, direction);
    to_json(&NavigationResponse::from_neighbor(found))
}

// ============ GET /search ============

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
    order: Option<SearchOrder>,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<SearchResult>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.limit == Some(0) {
        return Err(bad_request("limit must be >= 1"));
    }
    let mut opts = state.config.search.options(params.limit);
    if let Some(order) = params.order {
        opts.order = order;
    }
    let results = search(&state.archive, &params.q, &opts);
    Ok(Json(SearchResponse {
        query: params.q,
        results,
    }))
}

// ============ GET /stats ============

async fn handle_stats(State(state): State<AppState>) -> Result<Json<ArchiveStats>, AppError> {
    compute_stats(&state.archive)
        .map(Json)
        .map_err(|e| not_found(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use comic_archive_core::models::RawEntry;
    use serde_json::Value;

    fn entry(key: &str, title: &str, transcript: &str) -> RawEntry {
        RawEntry {
            key: key.to_string(),
            title: Some(title.to_string()),
            transcript: transcript.to_string(),
            ..RawEntry::default()
        }
    }

    async fn spawn_server() -> String {
        let archive = Archive::build(vec![
            entry("1989-04-16", "Pilot", "Dilbert meets Dogbert."),
            entry("1989-04-23", "Sunday", "Dogbert plans world domination."),
            entry("1990-01-01", "New Year", "The boss has a new plan."),
        ])
        .unwrap();
        let state = AppState::new(Arc::new(archive), Arc::new(Config::minimal()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn get_json(url: &str) -> (u16, Value) {
        let resp = reqwest::get(url).await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn health_reports_item_count() {
        let base = spawn_server().await;
        let (status, body) = get_json(&format!("{}/health", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["items"], 3);
    }

    #[tokio::test]
    async fn navigation_and_boundaries() {
        let base = spawn_server().await;

        let (_, first) = get_json(&format!("{}/comics/first", base)).await;
        assert_eq!(first["item"]["date"], "1989-04-16");

        let (_, next) = get_json(&format!("{}/comics/1989-04-16/next", base)).await;
        assert_eq!(next["item"]["date"], "1989-04-23");
        assert_eq!(next["boundary"], false);

        let (status, edge) = get_json(&format!("{}/comics/1989-04-16/previous", base)).await;
        assert_eq!(status, 200);
        assert_eq!(edge["boundary"], true);
        assert!(edge["item"].is_null());

        let (status, end) = get_json(&format!("{}/comics/1990-01-01/next", base)).await;
        assert_eq!(status, 200);
        assert_eq!(end["boundary"], true);
    }

    #[tokio::test]
    async fn get_missing_and_invalid_dates() {
        let base = spawn_server().await;

        let (status, body) = get_json(&format!("{}/comics/1989-04-17", base)).await;
        assert_eq!(status, 404);
        assert_eq!(body["error"]["code"], "not_found");

        let (status, body) = get_json(&format!("{}/comics/someday", base)).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn search_endpoint() {
        let base = spawn_server().await;

        let (_, body) = get_json(&format!("{}/search?q=dogbert", base)).await;
        let dates: Vec<&str> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["1989-04-23", "1989-04-16"]);

        let (_, body) = get_json(&format!("{}/search?q=dogbert&order=oldest_first&limit=1", base)).await;
        assert_eq!(body["results"][0]["date"], "1989-04-16");
        assert_eq!(body["results"].as_array().unwrap().len(), 1);

        let (_, body) = get_json(&format!("{}/search?q=", base)).await;
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_endpoint() {
        let base = spawn_server().await;
        let (_, body) = get_json(&format!("{}/stats", base)).await;
        assert_eq!(body["items"], 3);
        assert_eq!(body["per_year"]["1989"], 2);
    }
}
