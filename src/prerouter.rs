//! Pre-Router (C5).
//!
//! Decision table evaluated in order (spec §4.5). A pure function: given
//! the classifier output, tool presence, and configured policy, emits one
//! routing decision and the rationale that produced it.

use crate::config::{CascadeConfig, PreRouterPolicy};
use crate::guardrails::CheckResult;
use crate::types::Complexity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    DirectToDrafter,
    Cascade,
    DirectToVerifier,
    Reject,
}

#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub decision: Decision,
    pub rationale: &'static str,
}

pub struct PreRouterInput<'a> {
    pub force_direct: bool,
    pub complexity: Option<Complexity>,
    pub has_tools: bool,
    pub drafter_supports_tools: bool,
    pub guardrail_result: &'a CheckResult,
}

/// Evaluate the decision table. Each rule is checked in the exact order of
/// spec §4.5; the first match wins.
pub fn route(config: &CascadeConfig, policy: &PreRouterPolicy, input: &PreRouterInput) -> RoutingDecision {
    if input.force_direct {
        return RoutingDecision {
            decision: Decision::DirectToVerifier,
            rationale: "caller set forceDirect",
        };
    }

    if config.models.len() == 1 {
        return RoutingDecision {
            decision: Decision::DirectToDrafter,
            rationale: "only one model configured",
        };
    }

    if !input.guardrail_result.is_safe {
        return RoutingDecision { decision: Decision::Reject, rationale: "guardrails rejected content" };
    }

    if let Some(complexity) = input.complexity {
        if policy.skip_drafter_for_hard && complexity >= Complexity::Hard {
            return RoutingDecision {
                decision: Decision::DirectToVerifier,
                rationale: "policy skips drafter for hard/expert complexity",
            };
        }
        if policy.skip_verifier_for_trivial && complexity == Complexity::Trivial {
            return RoutingDecision {
                decision: Decision::DirectToDrafter,
                rationale: "policy skips verifier for trivial complexity",
            };
        }
    }

    if input.has_tools && !input.drafter_supports_tools {
        return RoutingDecision {
            decision: Decision::DirectToVerifier,
            rationale: "drafter lacks tools feature",
        };
    }

    RoutingDecision { decision: Decision::Cascade, rationale: "no early-exit rule matched" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityPolicy;
    use crate::types::ModelDescriptor;
    use std::collections::HashMap;

    fn descriptor(model: &str) -> ModelDescriptor {
        ModelDescriptor {
            provider: "test".into(),
            model: model.into(),
            input_price_per_m: 0.0,
            output_price_per_m: 0.0,
            quality_threshold_override: None,
            feature_overrides: None,
        }
    }

    fn config(models: usize) -> CascadeConfig {
        let mut descriptors = vec![descriptor("draft")];
        if models > 1 {
            descriptors.push(descriptor("verify"));
        }
        CascadeConfig {
            models: descriptors,
            quality_policy: QualityPolicy {
                floor_threshold: 0.4,
                min_length: 0,
                tiered_thresholds: HashMap::new(),
                use_semantic_validation: false,
                semantic_threshold: 0.5,
                strict_mode: false,
                strict_semantic_reject: false,
            },
            pre_router_policy: PreRouterPolicy::default(),
            caching: false,
            budget_policy: Default::default(),
            tiers: HashMap::new(),
            profiles: HashMap::new(),
            speculative_verify: false,
        }
    }

    fn safe_result() -> CheckResult {
        CheckResult { is_safe: true, findings: vec![] }
    }

    #[test]
    fn force_direct_wins_over_everything() {
        let cfg = config(2);
        let input = PreRouterInput {
            force_direct: true,
            complexity: Some(Complexity::Trivial),
            has_tools: false,
            drafter_supports_tools: true,
            guardrail_result: &safe_result(),
        };
        let decision = route(&cfg, &cfg.pre_router_policy, &input);
        assert_eq!(decision.decision, Decision::DirectToVerifier);
    }

    #[test]
    fn single_model_is_always_direct_to_drafter() {
        let cfg = config(1);
        let input = PreRouterInput {
            force_direct: false,
            complexity: Some(Complexity::Expert),
            has_tools: false,
            drafter_supports_tools: true,
            guardrail_result: &safe_result(),
        };
        let decision = route(&cfg, &cfg.pre_router_policy, &input);
        assert_eq!(decision.decision, Decision::DirectToDrafter);
    }

    #[test]
    fn guardrail_rejection_short_circuits() {
        let cfg = config(2);
        let unsafe_result = CheckResult { is_safe: false, findings: vec![] };
        let input = PreRouterInput {
            force_direct: false,
            complexity: Some(Complexity::Simple),
            has_tools: false,
            drafter_supports_tools: true,
            guardrail_result: &unsafe_result,
        };
        let decision = route(&cfg, &cfg.pre_router_policy, &input);
        assert_eq!(decision.decision, Decision::Reject);
    }

    #[test]
    fn hard_complexity_skips_drafter_when_policy_enabled() {
        let mut cfg = config(2);
        cfg.pre_router_policy.skip_drafter_for_hard = true;
        let input = PreRouterInput {
            force_direct: false,
            complexity: Some(Complexity::Expert),
            has_tools: false,
            drafter_supports_tools: true,
            guardrail_result: &safe_result(),
        };
        let decision = route(&cfg, &cfg.pre_router_policy, &input);
        assert_eq!(decision.decision, Decision::DirectToVerifier);
    }

    #[test]
    fn trivial_complexity_skips_verifier_when_policy_enabled() {
        let mut cfg = config(2);
        cfg.pre_router_policy.skip_verifier_for_trivial = true;
        let input = PreRouterInput {
            force_direct: false,
            complexity: Some(Complexity::Trivial),
            has_tools: false,
            drafter_supports_tools: true,
            guardrail_result: &safe_result(),
        };
        let decision = route(&cfg, &cfg.pre_router_policy, &input);
        assert_eq!(decision.decision, Decision::DirectToDrafter);
    }

    #[test]
    fn tools_unsupported_by_drafter_goes_direct_to_verifier() {
        let cfg = config(2);
        let input = PreRouterInput {
            force_direct: false,
            complexity: Some(Complexity::Simple),
            has_tools: true,
            drafter_supports_tools: false,
            guardrail_result: &safe_result(),
        };
        let decision = route(&cfg, &cfg.pre_router_policy, &input);
        assert_eq!(decision.decision, Decision::DirectToVerifier);
    }

    #[test]
    fn default_case_is_cascade() {
        let cfg = config(2);
        let input = PreRouterInput {
            force_direct: false,
            complexity: Some(Complexity::Moderate),
            has_tools: false,
            drafter_supports_tools: true,
            guardrail_result: &safe_result(),
        };
        let decision = route(&cfg, &cfg.pre_router_policy, &input);
        assert_eq!(decision.decision, Decision::Cascade);
    }
}
