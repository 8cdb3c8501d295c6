//! Configuration & Profiles (C12).
//!
//! A [`CascadeConfig`] is loaded once per agent instance and validated before
//! the first request — following the teacher's `Config::load`/`validate`
//! split — so a bad model ladder or a dangling profile reference fails at
//! construction, not mid-cascade.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::{Complexity, ModelDescriptor, Tier};

/// Ordered model ladder plus every policy the cascade consults.
///
/// Index 0 is the drafter, the last entry is the verifier. The ordering is
/// the contract: escalation always walks this list strictly forward, never
/// skipping a middle tier.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CascadeConfig {
    pub models: Vec<ModelDescriptor>,
    pub quality_policy: QualityPolicy,
    #[serde(default)]
    pub pre_router_policy: PreRouterPolicy,
    #[serde(default)]
    pub caching: bool,
    #[serde(default)]
    pub budget_policy: BudgetPolicy,
    /// Named tier presets available to [`crate::config::effective_config`].
    #[serde(default)]
    pub tiers: HashMap<String, Tier>,
    /// Named workflow/profile overrides, precedence below requestOverride
    /// and above the tier preset (spec §4.12).
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverride>,
    /// Open Question (semantic-as-hard-reject), see spec §9 OQ1.
    #[serde(default)]
    pub speculative_verify: bool,
}

impl CascadeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&content).context("parsing cascade config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.models.is_empty(), "CascadeConfig must list at least one model");

        for pair in self.models.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            anyhow::ensure!(
                prev.input_price_per_m + prev.output_price_per_m
                    <= next.input_price_per_m + next.output_price_per_m,
                "models must be ordered cheapest-first: `{}` is priced above `{}`",
                prev.key(),
                next.key()
            );
        }

        self.quality_policy.validate()?;

        for (name, profile) in &self.profiles {
            if let Some(tier) = &profile.tier {
                anyhow::ensure!(
                    self.tiers.contains_key(tier),
                    "profile `{}` references unknown tier `{}`",
                    name,
                    tier
                );
            }
            if let Some(allow) = &profile.preferred_models {
                let known: std::collections::HashSet<&str> =
                    self.models.iter().map(|m| m.model.as_str()).collect();
                for model in allow {
                    anyhow::ensure!(
                        known.contains(model.as_str()),
                        "profile `{}` preferred_models references unknown model `{}`",
                        name,
                        model
                    );
                }
            }
        }

        Ok(())
    }

    pub fn drafter(&self) -> &ModelDescriptor {
        &self.models[0]
    }

    pub fn verifier(&self) -> &ModelDescriptor {
        self.models.last().expect("validated non-empty")
    }

    /// The tier immediately after `current` in the ladder, if any.
    pub fn next_after<'a>(&'a self, current: &ModelDescriptor) -> Option<&'a ModelDescriptor> {
        let idx = self.models.iter().position(|m| m.key() == current.key())?;
        self.models.get(idx + 1)
    }
}

/// §3 QualityPolicy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QualityPolicy {
    pub floor_threshold: f64,
    #[serde(default)]
    pub min_length: usize,
    #[serde(default)]
    pub tiered_thresholds: HashMap<Complexity, f64>,
    #[serde(default)]
    pub use_semantic_validation: bool,
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,
    #[serde(default)]
    pub strict_mode: bool,
    /// Open Question (spec §9 OQ1): when true, `semantic < semantic_threshold`
    /// is an unconditional reject. Default false keeps semantic a soft
    /// aggregate term, matching the spec's stated default behaviour.
    #[serde(default)]
    pub strict_semantic_reject: bool,
}

fn default_semantic_threshold() -> f64 {
    0.5
}

impl QualityPolicy {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.floor_threshold),
            "floor_threshold must be in [0,1], got {}",
            self.floor_threshold
        );
        for (label, threshold) in &self.tiered_thresholds {
            anyhow::ensure!(
                (0.0..=1.0).contains(threshold),
                "tiered threshold for {:?} must be in [0,1], got {}",
                label,
                threshold
            );
        }
        Ok(())
    }

    /// `effectiveThreshold(complexity)` per spec §3: strictMode takes the max
    /// of the tiered lookup and the floor; otherwise the tiered lookup wins
    /// when complexity is known, else the floor.
    pub fn effective_threshold(&self, complexity: Option<Complexity>) -> f64 {
        let tiered = complexity.and_then(|c| self.tiered_thresholds.get(&c).copied());
        if self.strict_mode {
            tiered.map(|t| t.max(self.floor_threshold)).unwrap_or(self.floor_threshold)
        } else {
            tiered.unwrap_or(self.floor_threshold)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PreRouterPolicy {
    #[serde(default)]
    pub skip_drafter_for_hard: bool,
    #[serde(default)]
    pub skip_verifier_for_trivial: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BudgetPolicy {
    #[serde(default)]
    pub max_total_cost_per_request: Option<f64>,
}

/// Workflow-level override, one precedence rung below a request override and
/// above the caller's [`crate::types::UserProfile`] (spec §4.12).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileOverride {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub preferred_models: Option<Vec<String>>,
    #[serde(default)]
    pub latency_cap_ms: Option<u64>,
}

/// Caller-supplied override, highest precedence (spec §4.12).
#[derive(Debug, Clone, Default)]
pub struct RequestOverride {
    pub tier: Option<String>,
    pub preferred_models: Option<Vec<String>>,
    pub latency_cap_ms: Option<u64>,
}

/// The result of resolving `effectiveConfig(userProfile, workflowProfile,
/// requestOverride)` — a pure function over already-parsed structs,
/// independent of the TOML layer so it's testable without a filesystem.
#[derive(Debug, Clone, Default)]
pub struct EffectiveConfig {
    pub tier: Option<Tier>,
    pub preferred_models: Option<Vec<String>>,
    pub latency_cap_ms: Option<u64>,
}

/// Precedence: requestOverride > workflowProfile > userProfile > tierPreset >
/// global default. Unknown fields in any layer are ignored; conflicting
/// enumerations (a preset name absent from `config.tiers`) fail fast.
pub fn effective_config(
    config: &CascadeConfig,
    user_profile: Option<&crate::types::UserProfile>,
    workflow_profile: Option<&str>,
    request_override: Option<&RequestOverride>,
) -> anyhow::Result<EffectiveConfig> {
    let mut out = EffectiveConfig::default();

    if let Some(profile) = user_profile {
        out.tier = config.tiers.get(&profile.tier).cloned();
        out.preferred_models = profile.preferred_models.clone();
        out.latency_cap_ms = profile.latency_cap_ms;
        if out.tier.is_none() {
            anyhow::bail!("user profile references unknown tier `{}`", profile.tier);
        }
    }

    if let Some(name) = workflow_profile {
        let profile = config
            .profiles
            .get(name)
            .with_context(|| format!("unknown workflow profile `{name}`"))?;
        if let Some(tier_name) = &profile.tier {
            out.tier = config.tiers.get(tier_name).cloned();
        }
        if profile.preferred_models.is_some() {
            out.preferred_models = profile.preferred_models.clone();
        }
        if profile.latency_cap_ms.is_some() {
            out.latency_cap_ms = profile.latency_cap_ms;
        }
    }

    if let Some(req) = request_override {
        if let Some(tier_name) = &req.tier {
            out.tier = Some(
                config
                    .tiers
                    .get(tier_name)
                    .cloned()
                    .with_context(|| format!("request override references unknown tier `{tier_name}`"))?,
            );
        }
        if req.preferred_models.is_some() {
            out.preferred_models = req.preferred_models.clone();
        }
        if req.latency_cap_ms.is_some() {
            out.latency_cap_ms = req.latency_cap_ms;
        }
    }

    Ok(out)
}
