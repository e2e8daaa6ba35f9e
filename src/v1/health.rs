use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: i64,
    pub models_ready: usize,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let models = state.models.read().await;
    let now = Utc::now();
    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: now,
        uptime_secs: (now - state.started_at).num_seconds(),
        models_ready: models.values().filter(|m| m.is_ready()).count(),
    };

    (StatusCode::OK, Json(response))
}
