use clap::Parser;
use std::net::SocketAddr;

use crate::error::ModelResult;
use crate::model::{InvocableModel, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "model-server",
    about = "Serve one model by forwarding to its predictor and explainer"
)]
pub struct ServerArgs {
    #[arg(long, env = "MODEL_NAME")]
    pub model_name: String,

    /// host[:port] of the predictor
    #[arg(long, env = "PREDICTOR_HOST")]
    pub predictor_host: Option<String>,

    /// host[:port] of the explainer
    #[arg(long, env = "EXPLAINER_HOST")]
    pub explainer_host: Option<String>,

    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub http_port: u16,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Cap on simultaneous outbound calls; unbounded when omitted.
    #[arg(long, env = "MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,
}

impl ServerArgs {
    pub fn build_model(&self) -> ModelResult<InvocableModel> {
        let mut model =
            InvocableModel::new(self.model_name.clone())?.with_timeout_secs(self.timeout_secs);
        model.set_predictor_host(self.predictor_host.clone());
        model.set_explainer_host(self.explainer_host.clone());
        if let Some(limit) = self.max_in_flight {
            model = model.with_max_in_flight(limit);
        }
        Ok(model)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.http_port))
    }
}
