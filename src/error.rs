use thiserror::Error;

use crate::model::Verb;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model name must not be empty")]
    InvalidName,

    /// No downstream host is wired up for this verb. Not retryable until the
    /// model is reconfigured.
    #[error("no {verb} host configured for model '{model}'")]
    NotConfigured { model: String, verb: Verb },

    /// The downstream answered with something other than 200. `body` is the raw
    /// response text.
    #[error("downstream returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode downstream response: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("model '{model}' failed to load: {reason}")]
    Load { model: String, reason: String },
}

impl ModelError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ModelError::Transport { source, .. } if source.is_timeout())
    }
}
