use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Liveness and dependency report.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round-trip time of the probe query, when it succeeded.
    pub db_latency_ms: Option<u64>,
    pub cities_loaded: usize,
}

/// GET /health -- 200 when the database answers, 503 otherwise.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let probe = wayside_db::health_check(&state.pool).await;
    let db_latency_ms = probe
        .as_ref()
        .ok()
        .map(|_| u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

    if let Err(err) = &probe {
        tracing::warn!(error = %err, "Database health probe failed");
    }

    let (code, status) = match probe {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy: db_latency_ms.is_some(),
        db_latency_ms,
        cities_loaded: state.cities.len(),
    };
    (code, Json(body))
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
