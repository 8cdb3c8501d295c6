//! Public facade wiring C1–C12 together (spec §6 `Agent`).
//!
//! `Agent` resolves a drafter/verifier [`ProviderClient`] pair from
//! [`CascadeConfig::models`], holds the admission controller and registry,
//! and applies the two deadlines spec §5 calls for (per-model, total
//! request) around whatever [`crate::cascade`]/[`crate::streaming`] do
//! internally. Modelled on the teacher's `RouterState` (`examples/electricessence-claw-router/src/router.rs`)
//! as the one long-lived object a caller builds once and reuses per request,
//! but over injected trait objects instead of HTTP backend adapters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::admission::{AdmissionController, AdmitRejection};
use crate::cascade::{self, CascadeContext};
use crate::config::CascadeConfig;
use crate::error::CascadeError;
use crate::events::{channel, Emitter, TraceEvent};
use crate::provider::{EmbeddingClient, ProviderClient};
use crate::registry::Registry;
use crate::streaming::{self, CascadeOwnedContext, EventStream};
use crate::types::{CascadeResult, Feature, Message, Tier, ToolSpec, UserProfile};

/// `RequestOptions` (spec §6): the closed set of per-request knobs. Unknown
/// fields have no place to land — a caller can only set what this struct
/// declares, which is itself the "unknown options MUST be refused" rule.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub tools: Vec<ToolSpec>,
    pub force_direct: bool,
    /// Reserved for future multi-step tool-calling loops; the current
    /// cascade is single-turn, so any value other than `None`/`1` is
    /// accepted but has no effect yet.
    pub max_steps: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub profile: Option<UserProfile>,
    pub trace: bool,
    pub extra: serde_json::Value,
}

/// Everything `Agent::new` needs beyond the config: concrete provider
/// handles keyed by [`crate::types::ModelDescriptor::key`], and an optional
/// embedding backend for the quality validator's semantic term.
pub struct AgentBuilder {
    config: CascadeConfig,
    clients: HashMap<String, Arc<dyn ProviderClient>>,
    embedder: Option<Arc<dyn EmbeddingClient>>,
    per_model_timeout: Option<Duration>,
    total_timeout: Option<Duration>,
}

impl AgentBuilder {
    pub fn new(config: CascadeConfig) -> Self {
        Self {
            config,
            clients: HashMap::new(),
            embedder: None,
            per_model_timeout: None,
            total_timeout: None,
        }
    }

    pub fn with_client(mut self, model_key: impl Into<String>, client: Arc<dyn ProviderClient>) -> Self {
        self.clients.insert(model_key.into(), client);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingClient>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_per_model_timeout(mut self, timeout: Duration) -> Self {
        self.per_model_timeout = Some(timeout);
        self
    }

    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = Some(timeout);
        self
    }

    /// `NewAgent(CascadeConfig)`. Fails fast (spec §7 `ErrConfig`) if the
    /// config doesn't validate, or if a client is missing for the drafter
    /// or verifier tier.
    pub fn build(self) -> Result<Agent, CascadeError> {
        self.config.validate().map_err(CascadeError::Config)?;

        let drafter_key = self.config.drafter().key();
        let verifier_key = self.config.verifier().key();
        let verifier_client = self
            .clients
            .get(&verifier_key)
            .cloned()
            .ok_or_else(|| CascadeError::Config(anyhow::anyhow!("no provider client registered for verifier `{verifier_key}`")))?;
        let drafter_client = self.clients.get(&drafter_key).cloned();
        if drafter_client.is_none() {
            warn!(model = %drafter_key, "no provider client registered for drafter — cascade requests will fail at dispatch");
        }

        Ok(Agent {
            config: Arc::new(self.config),
            registry: Arc::new(Registry::new()),
            clients: self.clients,
            drafter_client,
            verifier_client,
            embedder: self.embedder,
            admission: Arc::new(AdmissionController::new()),
            per_model_timeout: self.per_model_timeout,
            total_timeout: self.total_timeout,
        })
    }
}

/// The long-lived handle a caller builds once per process (or per tenant)
/// and reuses across requests. Cheap to clone — everything behind an `Arc`.
#[derive(Clone)]
pub struct Agent {
    config: Arc<CascadeConfig>,
    registry: Arc<Registry>,
    clients: HashMap<String, Arc<dyn ProviderClient>>,
    drafter_client: Option<Arc<dyn ProviderClient>>,
    verifier_client: Arc<dyn ProviderClient>,
    embedder: Option<Arc<dyn EmbeddingClient>>,
    admission: Arc<AdmissionController>,
    per_model_timeout: Option<Duration>,
    total_timeout: Option<Duration>,
}

impl Agent {
    pub fn builder(config: CascadeConfig) -> AgentBuilder {
        AgentBuilder::new(config)
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// `Agent.CheckAdmission(profile, estCost)`. Does not record; the
    /// recording happens once the real cost is known, at the end of
    /// [`Self::run`]/[`Self::stream`].
    pub fn check_admission(&self, profile: &UserProfile, tier: Option<&Tier>, est_cost: f64) -> Result<(), CascadeError> {
        self.admission
            .check_admit(profile, tier, est_cost)
            .map_err(|AdmitRejection { retry_after_secs }| CascadeError::RateLimited { retry_after_secs })
    }

    fn resolve_tier<'a>(&'a self, profile: Option<&UserProfile>) -> Option<&'a Tier> {
        profile.and_then(|p| self.config.tiers.get(&p.tier))
    }

    /// `Agent.Run(ctx, messages, requestOptions) → CascadeResult | Error`.
    ///
    /// Admission is checked first (spec §7: `ErrRateLimited` — "no provider
    /// call made"), then the two configured deadlines wrap the cascade
    /// itself (spec §5). The caller's own cancellation token, if any, is
    /// combined with the deadline's token so either can end the request.
    pub async fn run(
        &self,
        user_text: &str,
        messages: &[Message],
        options: &RequestOptions,
        cancel: CancellationToken,
    ) -> Result<CascadeResult, CascadeError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let emitter = Emitter::disabled(request_id);
        self.run_with_emitter(user_text, messages, options, cancel, &emitter).await
    }

    /// Same as [`Self::run`], but emitting through a caller-supplied
    /// [`Emitter`] (built from [`Self::trace_channel`]) when
    /// `requestOptions.trace == true`. Spec §4.11: "no in-process sink is
    /// part of the core" — the core only emits, the caller owns the sink.
    pub async fn run_with_emitter(
        &self,
        user_text: &str,
        messages: &[Message],
        options: &RequestOptions,
        cancel: CancellationToken,
        emitter: &Emitter,
    ) -> Result<CascadeResult, CascadeError> {
        self.admit(options)?;

        let ctx = CascadeContext {
            config: &self.config,
            registry: &self.registry,
            drafter_client: self.drafter_client.clone(),
            verifier_client: self.verifier_client.clone(),
            embedder: self.embedder.clone(),
            emitter,
            cancel: cancel.clone(),
            per_model_timeout: self.per_model_timeout,
        };

        let cascade_options = cascade::RequestOptions {
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            tools: options.tools.clone(),
            force_direct: options.force_direct,
        };

        let total_timeout = self.effective_total_timeout(options);
        let run_fut = cascade::run(&ctx, user_text, messages, &cascade_options);

        let result = match total_timeout {
            Some(d) => match tokio::time::timeout(d, run_fut).await {
                Ok(r) => r,
                Err(_) => {
                    cancel.cancel();
                    Err(CascadeError::Timeout)
                }
            },
            None => run_fut.await,
        };

        if let Ok(result) = &result {
            if let Some(profile) = &options.profile {
                self.admission.record_request(&profile.identity, result.cost.total_cost);
            }
        }
        result
    }

    /// `Agent.Stream(ctx, messages, requestOptions) → sequence<StreamEvent>`.
    ///
    /// Admission is checked up front, same as [`Self::run`]; the per-request
    /// deadline is enforced by racing a cancellation against the emitted
    /// event stream rather than wrapping a single future, since the stream
    /// itself has no single completion point to `timeout()` around.
    pub fn stream(
        &self,
        user_text: &str,
        messages: &[Message],
        options: &RequestOptions,
        cancel: CancellationToken,
    ) -> Result<EventStream, CascadeError> {
        self.admit(options)?;

        if let Some(d) = self.effective_total_timeout(options) {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(d).await;
                cancel.cancel();
            });
        }

        let owned_ctx = CascadeOwnedContext {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            drafter_client: self.drafter_client.clone(),
            verifier_client: self.verifier_client.clone(),
            embedder: self.embedder.clone(),
            cancel,
            per_model_timeout: self.per_model_timeout,
        };

        let stream_options = cascade::RequestOptions {
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            tools: options.tools.clone(),
            force_direct: options.force_direct,
        };

        Ok(streaming::run(owned_ctx, user_text.to_string(), messages.to_vec(), stream_options))
    }

    /// Open a trace sink for a single request, to pass into
    /// [`Self::run_with_emitter`] when `requestOptions.trace == true`.
    pub fn trace_channel(&self) -> (Emitter, tokio::sync::mpsc::UnboundedReceiver<TraceEvent>) {
        let (tx, rx) = channel();
        (Emitter::new(uuid::Uuid::new_v4().to_string(), None, Some(tx)), rx)
    }

    fn admit(&self, options: &RequestOptions) -> Result<(), CascadeError> {
        if !options.tools.is_empty() {
            let tool_capable = self.config.models.iter().any(|m| self.registry.supports(m, Feature::Tools));
            if !tool_capable {
                return Err(CascadeError::UnsupportedFeature(
                    "tools were requested but no configured model supports Feature::Tools".into(),
                ));
            }
        }

        let Some(profile) = &options.profile else { return Ok(()) };
        let tier = self.resolve_tier(Some(profile));
        let estimated_cost = 0.0;
        self.check_admission(profile, tier, estimated_cost)?;
        debug!(identity = %profile.identity, "admitted");
        Ok(())
    }

    fn effective_total_timeout(&self, options: &RequestOptions) -> Option<Duration> {
        options
            .timeout_ms
            .map(Duration::from_millis)
            .or(self.total_timeout)
    }

    #[cfg(test)]
    fn client_for(&self, model_key: &str) -> Option<Arc<dyn ProviderClient>> {
        self.clients.get(model_key).cloned()
    }
}
