use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod config;
pub mod error;
pub mod model;
pub mod v1;

pub use error::{ModelError, ModelResult};
pub use model::{InvocableModel, ServableModel, Verb, DEFAULT_TIMEOUT_SECS};

#[derive(Clone)]
pub struct AppState {
    pub models: Arc<RwLock<HashMap<String, Arc<dyn ServableModel>>>>,
    pub started_at: DateTime<Utc>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            models: Arc::new(RwLock::new(HashMap::new())),
            started_at: Utc::now(),
        }
    }
}

impl AppState {
    /// Registers under the model's own name, returning whatever it replaced.
    pub async fn register(
        &self,
        model: Arc<dyn ServableModel>,
    ) -> Option<Arc<dyn ServableModel>> {
        let mut models = self.models.write().await;
        models.insert(model.name().to_string(), model)
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn ServableModel>> {
        self.models.read().await.get(name).cloned()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(v1::health_check))
        .route("/v1/models", get(v1::list_models))
        .route(
            "/v1/models/:target",
            get(v1::model_status).post(v1::invoke_model),
        )
        .with_state(state)
}
