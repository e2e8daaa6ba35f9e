use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use servable_model::{config::ServerArgs, router, AppState, ServableModel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();

    let model = Arc::new(args.build_model()?);
    ServableModel::load(&*model)
        .await
        .with_context(|| format!("failed to load model {}", args.model_name))?;

    let state = AppState::default();
    state.register(model.clone()).await;

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.bind_addr())
        .await
        .with_context(|| format!("failed to bind to {}", args.bind_addr()))?;

    tracing::info!("Model server starting on http://{}", args.bind_addr());
    tracing::info!(
        model = %args.model_name,
        predictor = model.predictor_host().unwrap_or("-"),
        explainer = model.explainer_host().unwrap_or("-"),
        "Serving model"
    );
    tracing::info!("Available endpoints:");
    tracing::info!("  - GET  /health                  - Health check");
    tracing::info!("  - GET  /v1/models               - List models");
    tracing::info!("  - GET  /v1/models/{{name}}        - Model readiness");
    tracing::info!("  - POST /v1/models/{{name}}:predict - Forward to predictor");
    tracing::info!("  - POST /v1/models/{{name}}:explain - Forward to explainer");

    axum::serve(listener, app).await.context("server failed")?;

    Ok(())
}
