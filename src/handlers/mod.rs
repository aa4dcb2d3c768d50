pub mod auth;
pub mod movies;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::manager;
use crate::AppState;

/// GET /api/health - liveness check including a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match manager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "Movieshelf API is running",
                "timestamp": timestamp,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "message": "Database unavailable",
                    "timestamp": timestamp,
                })),
            )
        }
    }
}
