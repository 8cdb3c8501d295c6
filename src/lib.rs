//! Two-tier speculative routing engine for LLM inference: draft cheap,
//! verify when the draft doesn't clear the quality bar.
//!
//! [`Agent`] is the entry point — build one with [`Agent::builder`], wire in
//! provider clients with [`AgentBuilder::with_client`], then call
//! [`Agent::run`] or [`Agent::stream`] per request.

mod admission;
mod agent;
mod cascade;
mod classifier;
mod config;
mod cost;
mod error;
mod events;
mod guardrails;
mod prerouter;
mod provider;
mod quality;
mod registry;
mod streaming;
mod tool_risk;
mod types;

pub use agent::{Agent, AgentBuilder, RequestOptions};
pub use config::{
    effective_config, BudgetPolicy, CascadeConfig, EffectiveConfig, PreRouterPolicy,
    ProfileOverride, QualityPolicy, RequestOverride,
};
pub use error::{CascadeError, ProviderErrorKind, Result};
pub use events::{channel as trace_channel, Component, Emitter, TraceEvent};
pub use guardrails::{check as check_guardrails, redact, CheckResult};
pub use provider::{
    ChatOptions, ChatResponse, EmbeddingClient, FinishReason, ProviderClient, ProviderError,
    ProviderEvent, ProviderEventStream,
};
pub use registry::{GenerationOptions, NativeOptions, Registry};
pub use streaming::EventStream;
pub use types::{
    CascadeResult, Complexity, ComplexityVerdict, CostBreakdown, Feature, GuardrailFinding,
    GuardrailKind, Latencies, Message, ModelDescriptor, OptimisationWeights, QualityReason,
    QualityVerdict, RiskTag, Role, RoutingStrategy, StreamEvent, Tier, ToolCall, ToolSpec,
    UsageCounts, UserProfile,
};
