//! Probe routes: liveness, database readiness, build version.

use crate::state::AppState;
use crate::store;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// 503 while the pool cannot run a trivial statement.
async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match store::ping(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "schema": state.db.schema })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, schema = %state.db.schema, "readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "schema": state.db.schema })),
            )
        }
    }
}

async fn version() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
