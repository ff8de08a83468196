use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::db::{Store, DEFAULT_LATEST_LIMIT};
use crate::errors::{Error, Result};
use crate::metrics::{
    APPEND_LATENCY_SECONDS, QUERIES_TOTAL, QUERY_LATENCY_SECONDS, READINGS_RECEIVED_TOTAL,
    READINGS_REJECTED_TOTAL, READINGS_STORED_TOTAL, STORAGE_FAILURES_TOTAL,
};
use crate::model::{Reading, SeriesResponse, StoredResponse};
use crate::{time, validate};

/// Upper bound on rows returned by a single latest query.
pub const MAX_LATEST_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
struct AppState {
    store: Store,
}

#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Parsed only in latest mode.
    pub limit: Option<String>,
}

/// What a `GET /data` call resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    /// Canonical, inclusive bounds.
    Range { start: String, end: String },
    Latest { limit: u32 },
}

impl QueryRequest {
    /// A range query needs both bounds; anything less falls back to the live tail.
    pub fn from_params(params: &DataParams) -> Result<Self> {
        match (present(&params.start), present(&params.end)) {
            (Some(start), Some(end)) => Ok(Self::Range {
                start: time::normalize(start)?,
                end: time::normalize(end)?,
            }),
            _ => {
                let limit = match present(&params.limit) {
                    Some(raw) => raw
                        .parse::<u32>()
                        .map_err(|_| Error::BadRequest(format!("invalid limit: {raw}")))?,
                    None => DEFAULT_LATEST_LIMIT,
                };
                Ok(Self::Latest {
                    limit: limit.min(MAX_LATEST_LIMIT),
                })
            }
        }
    }

    pub async fn execute(&self, store: &Store) -> Result<Vec<Reading>> {
        match self {
            Self::Range { start, end } => store.query_range(start, end).await,
            Self::Latest { limit } => store.query_latest(*limit).await,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn create_router(store: Store) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/sensordata", post(receive_data))
        .route("/data", get(get_data))
        .route("/health", get(health))
        .with_state(state)
}

async fn receive_data(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<StoredResponse>, ApiError> {
    READINGS_RECEIVED_TOTAL.inc();

    let measurements = validate::parse_payload(&body).inspect_err(|_| {
        READINGS_REJECTED_TOTAL.inc();
    })?;

    let reading = measurements.stamped(time::canonical_now());

    let timer = APPEND_LATENCY_SECONDS.start_timer();
    state
        .store
        .append(&reading)
        .await
        .inspect_err(|_| STORAGE_FAILURES_TOTAL.inc())?;
    timer.observe_duration();

    READINGS_STORED_TOTAL.inc();

    Ok(Json(StoredResponse {
        message: "Data stored".to_string(),
    }))
}

async fn get_data(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> std::result::Result<Json<SeriesResponse>, ApiError> {
    let request = QueryRequest::from_params(&params)?;
    QUERIES_TOTAL.inc();

    let timer = QUERY_LATENCY_SECONDS.start_timer();
    let rows = request
        .execute(&state.store)
        .await
        .inspect_err(|_| STORAGE_FAILURES_TOTAL.inc())?;
    timer.observe_duration();

    debug!(?request, rows = rows.len(), "Served data query");
    Ok(Json(SeriesResponse::from(rows)))
}

async fn health(State(state): State<AppState>) -> std::result::Result<Json<Value>, ApiError> {
    let readings = state.store.count().await?;
    Ok(Json(json!({ "status": "ok", "readings": readings })))
}

/// Maps a service error onto an HTTP status with a `{"error": ...}` body.
pub struct ApiError(Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            warn!("Rejected request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            error!("API error: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}
