//! HTTP JSON API.
//!
//! Serves keyword management, ranking history, and the ranking check
//! trigger to a dashboard front end or a scheduler.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/keywords` | All keywords with their latest ranking |
//! | `POST` | `/api/keywords` | Track a new keyword (`{keyword, target_url}`) |
//! | `DELETE` | `/api/keywords?id=<id>` | Stop tracking a keyword |
//! | `GET`  | `/api/rankings` | Ranking history per keyword |
//! | `GET`/`POST` | `/api/check-rankings` | Run the ranking check now |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Keyword already exists" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unauthorized` (401), `not_found` (404),
//! `internal` (500).
//!
//! # Check trigger
//!
//! When `CRON_SECRET` is set, `/api/check-rankings` requires
//! `Authorization: Bearer <secret>`; other requests get 401 and the check
//! does not run. A completed check always returns 200 with the per-keyword
//! outcomes, even when some keywords failed.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::check::{self, CheckReport};
use crate::config::{self, Config};
use crate::error::Error;
use crate::history;
use crate::keywords;
use crate::models::{Keyword, KeywordSummary, RankingSeries};
use crate::search::{GoogleSearchClient, SearchClient};
use crate::store::{SqliteStore, Store};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub search: Arc<dyn SearchClient>,
    /// Shared secret required by the check trigger, if any.
    pub cron_secret: Option<String>,
}

/// Build the API router over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/keywords",
            get(handle_list_keywords)
                .post(handle_create_keyword)
                .delete(handle_delete_keyword),
        )
        .route("/api/rankings", get(handle_rankings))
        .route("/api/check-rankings", get(handle_check).post(handle_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = SqliteStore::connect(config).await?;
    let search = GoogleSearchClient::from_config(config)?;

    if config::env_secret(config::API_KEY_ENV).is_none()
        || config::env_secret(config::ENGINE_ID_ENV).is_none()
    {
        tracing::warn!(
            "{} / {} not set; ranking checks will fail until they are configured",
            config::API_KEY_ENV,
            config::ENGINE_ID_ENV
        );
    }

    let cron_secret = config::env_secret(config::CRON_SECRET_ENV);
    if cron_secret.is_none() {
        tracing::warn!(
            "{} not set; /api/check-rankings accepts unauthenticated requests",
            config::CRON_SECRET_ENV
        );
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(store),
        search: Arc::new(search),
        cron_secret,
    };

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("rank tracker listening on http://{}", bind_addr);
    println!("Rank tracker API listening on http://{}", bind_addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
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

fn unauthorized() -> AppError {
    AppError {
        status: StatusCode::UNAUTHORIZED,
        code: "unauthorized".to_string(),
        message: "Unauthorized".to_string(),
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

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => bad_request(msg),
            Error::NotFound(msg) => not_found(msg),
            other => {
                tracing::error!(error = %other, "request failed");
                internal(other.to_string())
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /api/keywords ============

#[derive(Serialize)]
struct KeywordListResponse {
    keywords: Vec<KeywordSummary>,
}

async fn handle_list_keywords(
    State(state): State<AppState>,
) -> Result<Json<KeywordListResponse>, AppError> {
    let keywords = keywords::list_keywords(state.store.as_ref()).await?;
    Ok(Json(KeywordListResponse { keywords }))
}

#[derive(Deserialize)]
struct CreateKeywordRequest {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default, alias = "targetUrl")]
    target_url: Option<String>,
}

#[derive(Serialize)]
struct CreateKeywordResponse {
    keyword: Keyword,
}

/// Handler for `POST /api/keywords`.
///
/// Returns `201` with the created keyword, or `400` when a field is
/// missing or the keyword is already tracked.
async fn handle_create_keyword(
    State(state): State<AppState>,
    body: Result<Json<CreateKeywordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateKeywordResponse>), AppError> {
    let Json(req) = body.map_err(|e| bad_request(e.body_text()))?;
    let keyword = keywords::add_keyword(
        state.store.as_ref(),
        req.keyword.as_deref().unwrap_or(""),
        req.target_url.as_deref().unwrap_or(""),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CreateKeywordResponse { keyword })))
}

#[derive(Deserialize)]
struct DeleteKeywordParams {
    id: Option<String>,
}

#[derive(Serialize)]
struct DeleteKeywordResponse {
    success: bool,
}

async fn handle_delete_keyword(
    State(state): State<AppState>,
    Query(params): Query<DeleteKeywordParams>,
) -> Result<Json<DeleteKeywordResponse>, AppError> {
    keywords::remove_keyword(state.store.as_ref(), params.id.as_deref().unwrap_or("")).await?;
    Ok(Json(DeleteKeywordResponse { success: true }))
}

// ============ GET /api/rankings ============

#[derive(Serialize)]
struct RankingsResponse {
    rankings: Vec<RankingSeries>,
}

async fn handle_rankings(State(state): State<AppState>) -> Result<Json<RankingsResponse>, AppError> {
    let rankings = history::ranking_series(state.store.as_ref(), state.config.history.limit).await?;
    Ok(Json(RankingsResponse { rankings }))
}

// ============ /api/check-rankings ============

/// Whether the request carries the configured bearer secret.
fn is_authorized(secret: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| token == secret)
}

/// Handler for `GET|POST /api/check-rankings`.
async fn handle_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CheckReport>, AppError> {
    if !is_authorized(state.cron_secret.as_deref(), &headers) {
        tracing::warn!("rejected unauthorized ranking check");
        return Err(unauthorized());
    }

    let report = check::run_check(
        state.store.as_ref(),
        state.search.as_ref(),
        state.config.check.delay(),
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "ranking check could not start");
        internal(format!("Failed to check rankings: {}", e))
    })?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_no_secret_allows_everything() {
        assert!(is_authorized(None, &HeaderMap::new()));
    }

    #[test]
    fn test_secret_requires_exact_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(!is_authorized(Some("s3cret"), &headers));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"));
        assert!(!is_authorized(Some("s3cret"), &headers));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("s3cret"));
        assert!(!is_authorized(Some("s3cret"), &headers));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert!(is_authorized(Some("s3cret"), &headers));
    }

    #[test]
    fn test_error_kinds_map_to_status() {
        let resp = AppError::from(Error::Validation("x".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = AppError::from(Error::NotFound("x".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = AppError::from(Error::Persistence("x".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
