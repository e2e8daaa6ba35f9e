pub mod health;
pub mod models;
pub mod inference;

pub use health::{health_check, HealthResponse};
pub use models::{list_models, model_status, ModelListResponse, ModelStatus};
pub use inference::{invoke_model, run_pipeline, status_for};
