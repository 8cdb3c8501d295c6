//! Shared data model (spec §3).
//!
//! These types are the vocabulary every component (C1–C12) is built from.
//! Kept free of any provider- or transport-specific detail — that detail
//! lives behind [`crate::provider::ProviderClient`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single turn in a conversation. Ordering within a `Vec<Message>` is
/// significant; the core never reorders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Required when `role == Role::Tool` — which call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), tool_calls: Vec::new(), tool_call_id: None }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into(), tool_calls: Vec::new(), tool_call_id: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), tool_calls: Vec::new(), tool_call_id: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool the caller makes available to the model. Risk is derived by C4
/// ([`crate::tool_risk`]), not stored here — a `ToolSpec` is immutable
/// input, the risk tag is a cached judgement about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique within a single request.
    pub name: String,
    pub description: String,
    /// JSON-Schema-like parameter descriptor; opaque to the core.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// A tool invocation emitted by a provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTag {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTag {
    pub fn forces_escalation(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Pricing + capability + (optional) override for one model in a cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub provider: String,
    pub model: String,
    /// USD per 1M input tokens.
    pub input_price_per_m: f64,
    /// USD per 1M output tokens.
    pub output_price_per_m: f64,
    #[serde(default)]
    pub quality_threshold_override: Option<f64>,
    #[serde(default)]
    pub feature_overrides: Option<Vec<Feature>>,
}

impl ModelDescriptor {
    /// Stable string identifying exactly which model answered — used as
    /// `CascadeResult::model_used` (spec §3 invariant: always drafter or
    /// verifier from `CascadeConfig`, never a skipped middle tier).
    pub fn key(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Tools,
    Streaming,
    Reasoning,
    SystemMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Trivial,
    Simple,
    Moderate,
    Hard,
    Expert,
}

impl Complexity {
    pub const ALL: [Complexity; 5] =
        [Self::Trivial, Self::Simple, Self::Moderate, Self::Hard, Self::Expert];
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Trivial => "trivial",
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
            Self::Expert => "expert",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityVerdict {
    pub label: Complexity,
    pub confidence: f64,
}

/// Why a [`QualityVerdict`] passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityReason {
    Ok,
    TooShort,
    Refusal,
    EmptyToolOnlyAllowed,
    LowConfidence,
    SemanticMismatch,
    HeuristicLow,
    HighRiskTool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityVerdict {
    pub passed: bool,
    pub score: f64,
    pub reason: QualityReason,
    pub signals: HashMap<String, f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageCounts {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub draft_cost: f64,
    pub verifier_cost: f64,
    pub total_cost: f64,
    pub counterfactual_verifier_only_cost: f64,
    pub saved_amount: f64,
    pub savings_percent: f64,
    /// True when at least one side of the calculation used the token
    /// estimator rather than provider-reported counts.
    pub estimated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    Direct,
    Cascade,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Latencies {
    pub total_ms: u64,
    pub draft_ms: u64,
    pub verifier_ms: u64,
    pub cascade_overhead_ms: u64,
}

/// The terminal, caller-visible outcome of one cascade run (spec §3/§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeResult {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    pub model_used: String,
    pub routing_strategy: RoutingStrategy,
    pub cascaded: bool,
    pub draft_accepted: bool,
    pub complexity: Option<Complexity>,
    pub quality_verdict: Option<QualityVerdict>,
    pub draft_usage: Option<UsageCounts>,
    pub verifier_usage: Option<UsageCounts>,
    pub cost: CostBreakdown,
    pub latencies: Latencies,
}

/// §3 UserProfile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub identity: String,
    pub tier: String,
    #[serde(default)]
    pub custom_hourly_cap: Option<u32>,
    #[serde(default)]
    pub custom_daily_cap: Option<u32>,
    #[serde(default)]
    pub custom_daily_budget: Option<f64>,
    #[serde(default = "default_true")]
    pub enable_content_moderation: bool,
    #[serde(default = "default_true")]
    pub enable_pii_detection: bool,
    #[serde(default)]
    pub optimisation_weights: Option<OptimisationWeights>,
    #[serde(default)]
    pub latency_cap_ms: Option<u64>,
    #[serde(default)]
    pub preferred_models: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptimisationWeights {
    pub cost: f64,
    pub speed: f64,
    pub quality: f64,
}

/// A named preset; any field `None` means "unlimited" (spec §3 Tier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub requests_per_hour: Option<u32>,
    pub requests_per_day: Option<u32>,
    pub daily_budget: Option<f64>,
    pub min_quality: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailKind {
    Violence,
    Hate,
    SelfHarm,
    Sexual,
    Illegal,
    Pii,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailFinding {
    pub kind: GuardrailKind,
    pub subtype: String,
    pub span: (usize, usize),
}

/// Tagged union of streaming events (spec §3 StreamEvent).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start,
    Chunk { delta: String },
    ToolCall { call: ToolCall },
    DraftDecision { accepted: bool, score: f64, confidence: f64 },
    Switch { from: Option<String>, to: String },
    Complete { result: Box<CascadeResult> },
    Error { kind: String, message: String },
}
