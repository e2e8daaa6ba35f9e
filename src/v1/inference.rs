use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::model::{ServableModel, Verb};
use crate::AppState;

/// Splits `flowers:predict` into the model name and its verb.
fn parse_target(target: &str) -> Option<(&str, Verb)> {
    let (name, verb) = target.rsplit_once(':')?;
    if name.is_empty() {
        return None;
    }
    Some((name, Verb::parse(verb)?))
}

pub fn status_for(err: &ModelError) -> StatusCode {
    match err {
        ModelError::NotConfigured { .. } => StatusCode::NOT_IMPLEMENTED,
        ModelError::Http { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        ModelError::Transport { .. }
        | ModelError::Deserialize(_)
        | ModelError::ClientBuild(_) => StatusCode::BAD_GATEWAY,
        ModelError::InvalidName | ModelError::Load { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn run_pipeline(
    model: &dyn ServableModel,
    verb: Verb,
    request: Value,
) -> ModelResult<Value> {
    let request = model.preprocess(request)?;
    let response = match verb {
        Verb::Predict => model.predict(request).await?,
        Verb::Explain => model.explain(request).await?,
    };
    model.postprocess(response)
}

pub async fn invoke_model(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Json(request): Json<Value>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (name, verb) = parse_target(&target).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("No route for '/v1/models/{}'", target),
        )
    })?;

    let model = state.get(name).await.ok_or_else(|| {
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

    let response = run_pipeline(model.as_ref(), verb, request).await.map_err(|e| {
        tracing::warn!(model = name, %verb, error = %e, "invocation failed");
        (status_for(&e), e.to_string())
    })?;

    Ok((StatusCode::OK, Json(response)))
}
