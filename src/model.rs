use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::{ModelError, ModelResult};

/// Matches the route timeout the serving mesh puts in front of models, so the
/// client itself should rarely be the one to give up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Predict,
    Explain,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Predict => "predict",
            Verb::Explain => "explain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "predict" => Some(Verb::Predict),
            "explain" => Some(Verb::Explain),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn endpoint_url(host: &str, model: &str, verb: Verb) -> String {
    format!("http://{}/v1/models/{}:{}", host, model, verb)
}

/// One served model: its name, where its predictor and explainer live, and the
/// outbound client used to reach them.
///
/// Addresses are set while the model is still owned by its loader; once it is
/// shared behind an `Arc` only `load` mutates it.
#[derive(Debug)]
pub struct InvocableModel {
    name: String,
    ready: AtomicBool,
    predictor_host: Option<String>,
    explainer_host: Option<String>,
    timeout_secs: u64,
    max_in_flight: Option<usize>,
    in_flight: Option<Semaphore>,
    http_client: OnceCell<reqwest::Client>,
}

impl InvocableModel {
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::InvalidName);
        }

        Ok(Self {
            name,
            ready: AtomicBool::new(false),
            predictor_host: None,
            explainer_host: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_in_flight: None,
            in_flight: None,
            http_client: OnceCell::new(),
        })
    }

    pub fn with_predictor_host(mut self, host: impl Into<String>) -> Self {
        self.set_predictor_host(Some(host.into()));
        self
    }

    pub fn with_explainer_host(mut self, host: impl Into<String>) -> Self {
        self.set_explainer_host(Some(host.into()));
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Caps simultaneous outbound calls. Without it the model never queues a
    /// call locally. A zero limit is raised to one; limits at or above
    /// `Semaphore::MAX_PERMITS` leave the model unbounded.
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        if limit >= Semaphore::MAX_PERMITS {
            self.max_in_flight = None;
            self.in_flight = None;
        } else {
            let limit = limit.max(1);
            self.max_in_flight = Some(limit);
            self.in_flight = Some(Semaphore::new(limit));
        }
        self
    }

    pub fn set_predictor_host(&mut self, host: Option<String>) {
        self.predictor_host = host;
    }

    pub fn set_explainer_host(&mut self, host: Option<String>) {
        self.explainer_host = host;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// An empty host counts as unset.
    pub fn predictor_host(&self) -> Option<&str> {
        self.predictor_host.as_deref().filter(|h| !h.is_empty())
    }

    pub fn explainer_host(&self) -> Option<&str> {
        self.explainer_host.as_deref().filter(|h| !h.is_empty())
    }

    pub fn max_in_flight(&self) -> Option<usize> {
        self.max_in_flight
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn load(&self) -> bool {
        self.ready.store(true, Ordering::Release);
        self.is_ready()
    }

    pub fn preprocess(&self, request: Value) -> Value {
        request
    }

    pub fn postprocess(&self, response: Value) -> Value {
        response
    }

    pub async fn predict(&self, request: Value) -> ModelResult<Value> {
        self.invoke(Verb::Predict, &request).await
    }

    pub async fn explain(&self, request: Value) -> ModelResult<Value> {
        self.invoke(Verb::Explain, &request).await
    }

    /// Built on first use and shared by every later call on this model.
    pub fn http_client(&self) -> ModelResult<&reqwest::Client> {
        self.http_client.get_or_try_init(|| {
            reqwest::Client::builder()
                .pool_max_idle_per_host(usize::MAX)
                .build()
                .map_err(ModelError::ClientBuild)
        })
    }

    pub fn has_http_client(&self) -> bool {
        self.http_client.get().is_some()
    }

    fn host_for(&self, verb: Verb) -> Option<&str> {
        match verb {
            Verb::Predict => self.predictor_host(),
            Verb::Explain => self.explainer_host(),
        }
    }

    async fn invoke(&self, verb: Verb, request: &Value) -> ModelResult<Value> {
        let host = self.host_for(verb).ok_or_else(|| ModelError::NotConfigured {
            model: self.name.clone(),
            verb,
        })?;
        let url = endpoint_url(host, &self.name, verb);
        let client = self.http_client()?;

        // The semaphore is never closed, so a failed acquire cannot happen.
        let _permit = match &self.in_flight {
            Some(limit) => limit.acquire().await.ok(),
            None => None,
        };

        tracing::debug!(model = %self.name, %verb, %url, "forwarding request");

        let response = client
            .post(&url)
            .timeout(self.timeout())
            .json(request)
            .send()
            .await
            .map_err(|source| ModelError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ModelError::Transport { url, source })?;

        if status != reqwest::StatusCode::OK {
            return Err(ModelError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// What the serving layer calls on a model.
///
/// Implementors embed an [`InvocableModel`] and override only the hooks they
/// need; every default forwards to the embedded model.
#[async_trait]
pub trait ServableModel: Send + Sync {
    fn base(&self) -> &InvocableModel;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn is_ready(&self) -> bool {
        self.base().is_ready()
    }

    async fn load(&self) -> ModelResult<bool> {
        Ok(self.base().load())
    }

    fn preprocess(&self, request: Value) -> ModelResult<Value> {
        Ok(self.base().preprocess(request))
    }

    fn postprocess(&self, response: Value) -> ModelResult<Value> {
        Ok(self.base().postprocess(response))
    }

    async fn predict(&self, request: Value) -> ModelResult<Value> {
        self.base().predict(request).await
    }

    async fn explain(&self, request: Value) -> ModelResult<Value> {
        self.base().explain(request).await
    }
}

impl ServableModel for InvocableModel {
    fn base(&self) -> &InvocableModel {
        self
    }
}
