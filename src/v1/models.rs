use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub name: String,
    pub ready: bool,
}

#[derive(Serialize)]
pub struct ModelListResponse {
    pub models: Vec<ModelStatus>,
}

pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let models = state.models.read().await;
    let mut entries: Vec<ModelStatus> = models
        .values()
        .map(|m| ModelStatus {
            name: m.name().to_string(),
            ready: m.is_ready(),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    (StatusCode::OK, Json(ModelListResponse { models: entries }))
}

pub async fn model_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let model = state.get(&name).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("Model with name {} does not exist.", name),
        )
    })?;

    if !model.is_ready() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Model with name {} is not ready.", name),
        ));
    }

    Ok((StatusCode::OK, Json(ModelStatus { name, ready: true })))
}
