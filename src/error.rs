//! Closed error taxonomy for the cascade engine (spec §7).
//!
//! [`CascadeError`] is the boundary type every public entry point returns.
//! Internal plumbing (config parsing, registry construction) uses `anyhow`
//! with `.context(..)` the way the teacher's `Config::load` does; those
//! errors are folded into [`CascadeError::Config`] at the boundary rather
//! than leaking an open-ended error type to callers.

use thiserror::Error;

use crate::types::GuardrailFinding;

/// Error kind as reported by a [`crate::provider::ProviderClient`] call.
///
/// Mirrors spec §6: "Errors are mapped by kind: auth, quota, rateLimited,
/// timeout, badRequest, serverError, cancelled."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Auth,
    Quota,
    RateLimited,
    Timeout,
    BadRequest,
    ServerError,
    Cancelled,
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Auth => "auth",
            Self::Quota => "quota",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::BadRequest => "bad_request",
            Self::ServerError => "server_error",
            Self::Cancelled => "cancelled",
        })
    }
}

/// The closed error taxonomy from spec §7.
///
/// Every variant names a `kind` string stable enough for callers to match
/// on (see [`CascadeError::kind`]), and — where the spec calls for it —
/// carries the data needed to recover (`retry_after_secs`, `findings`).
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Fatal at construction — caller misconfigured the agent.
    #[error("configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Fatal per request — e.g. tools requested of a model with no tool
    /// support and no fallback tier that has it.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Admission refused the request before any provider call was made.
    #[error("rate limited; retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Guardrails rejected the prompt before any provider call was made.
    #[error("guardrail rejected prompt: {} finding(s)", findings.len())]
    Guardrail { findings: Vec<GuardrailFinding> },

    /// A provider call failed. `model` names which tier failed so the
    /// cascade controller can decide whether to escalate (drafter) or
    /// surface (verifier) per spec §7.
    #[error("provider error ({kind}) from model `{model}`: {message}")]
    Provider {
        kind: ProviderErrorKind,
        model: String,
        message: String,
    },

    /// Either the per-model or total-request deadline elapsed.
    #[error("request timed out")]
    Timeout,

    /// The caller's cancellation token fired.
    #[error("request cancelled")]
    Cancelled,

    /// Admission or the mid-cascade budget check would exceed the
    /// identity's remaining daily budget.
    #[error("budget exceeded")]
    BudgetExceeded,
}

impl CascadeError {
    /// Stable `kind` string, as required by spec §7 ("an error result
    /// carries a stable `kind` string").
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::UnsupportedFeature(_) => "unsupported_feature",
            Self::RateLimited { .. } => "rate_limited",
            Self::Guardrail { .. } => "guardrail",
            Self::Provider { .. } => "provider",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::BudgetExceeded => "budget_exceeded",
        }
    }
}

pub type Result<T> = std::result::Result<T, CascadeError>;
