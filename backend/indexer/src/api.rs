//! REST surface over the indexed event log.
//!
//! | Route                        | Returns                                |
//! |------------------------------|----------------------------------------|
//! | `GET /health`                | liveness probe                         |
//! | `GET /events`                | all indexed events, `?limit=` capped   |
//! | `GET /accounts/:account/events` | events touching one account         |
//! | `GET /summary`               | aggregate sale view from the log       |

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::db;
use crate::errors::Error;
use crate::events::{EventRecord, SaleSummary};

const DEFAULT_PAGE: i64 = 200;
const MAX_PAGE: i64 = 1_000;

/// Assemble the application router with CORS and request tracing.
pub fn router(pool: SqlitePool) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(list_events))
        .route("/accounts/:account/events", get(account_events))
        .route("/summary", get(summary))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

// ── Request / response shapes ────────────────────────────────────────

#[derive(Deserialize)]
struct ListParams {
    limit: Option<i64>,
}

impl ListParams {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE)
    }
}

#[derive(Serialize)]
struct EventList {
    count: usize,
    events: Vec<EventRecord>,
}

/// Query failures map to a plain 500 with the error text; the taxonomy
/// lives in the logs, not the wire format.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn list_events(
    State(pool): State<SqlitePool>,
    Query(params): Query<ListParams>,
) -> Result<Json<EventList>, ApiError> {
    let events = db::recent_events(&pool, params.limit()).await?;
    Ok(Json(EventList {
        count: events.len(),
        events,
    }))
}

async fn account_events(
    State(pool): State<SqlitePool>,
    Path(account): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<EventList>, ApiError> {
    let events = db::events_for_account(&pool, &account, params.limit()).await?;
    Ok(Json(EventList {
        count: events.len(),
        events,
    }))
}

async fn summary(State(pool): State<SqlitePool>) -> Result<Json<SaleSummary>, ApiError> {
    Ok(Json(db::sale_summary(&pool).await?))
}
