//! Quality Validator (C3).
//!
//! Scores a drafter response and decides whether it ends the cascade,
//! following the six-step procedure of spec §4.3. Pure and deterministic
//! given its inputs plus an optional embedding backend — the same spirit as
//! the teacher's `router::is_sufficient`, but with weighted, traced signals
//! rather than a single length/refusal gate.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::RegexSet;

use crate::config::QualityPolicy;
use crate::types::{Complexity, QualityReason, QualityVerdict, RiskTag, ToolCall};

/// Case-insensitive refusal phrases (spec §4.3 step 2).
static REFUSAL_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\bi can't\b",
        r"(?i)\bi cannot\b",
        r"(?i)\bi cannot assist\b",
        r"(?i)\bas an ai\b",
        r"(?i)\bi'm not able to\b",
        r"(?i)\bi am not able to\b",
        r"(?i)\bi don't have enough information\b",
        r"(?i)\bi do not have enough information\b",
    ])
    .expect("static refusal patterns compile")
});

const DIRECT_ANSWER_LEXEMES: &[&str] = &["yes", "no", "because", "therefore", "the answer is"];
const HEDGING_MARKERS: &[&str] = &["maybe", "perhaps", "i think", "possibly", "it depends", "not sure"];
const HEDGING_BUDGET: usize = 2;

/// Provider-reported signals that feed the confidence term, when available.
#[derive(Debug, Clone, Default)]
pub struct ProviderSignals {
    pub mean_logprob: Option<f64>,
    pub reasoning_tokens: Option<u64>,
}

/// Resolve the optional semantic term (spec §4.3 step 5): cosine similarity
/// between `embed(prompt)` and `embed(response)`, only when the policy asks
/// for it and an embedding backend is configured. Any embedding failure
/// degrades gracefully to `None` rather than failing the request.
pub async fn resolve_semantic_score(
    embedder: Option<&std::sync::Arc<dyn crate::provider::EmbeddingClient>>,
    policy: &QualityPolicy,
    prompt: &str,
    response: &str,
) -> Option<f64> {
    if !policy.use_semantic_validation {
        return None;
    }
    let embedder = embedder?;
    let prompt_vec = embedder.embed(prompt).await.ok()?;
    let response_vec = embedder.embed(response).await.ok()?;
    Some(crate::provider::cosine_similarity(&prompt_vec, &response_vec))
}

/// Weights for the aggregate score (spec §4.3 step 6). Renormalised when
/// the semantic term is absent.
#[derive(Debug, Clone, Copy)]
struct Weights {
    heuristic: f64,
    confidence: f64,
    semantic: f64,
}

const WEIGHTS: Weights = Weights { heuristic: 0.5, confidence: 0.3, semantic: 0.2 };

/// Evaluate a drafter response. `tool_calls` carries risk tags already
/// resolved by C4 ([`crate::tool_risk::classify_all`]); `semantic_score` is
/// `None` when semantic validation is disabled or the embedding call
/// failed (spec §4.3 step 5's "degrade gracefully").
pub fn validate(
    response_text: &str,
    tool_calls: &[(ToolCall, RiskTag)],
    complexity: Option<Complexity>,
    policy: &QualityPolicy,
    signals: Option<&ProviderSignals>,
    semantic_score: Option<f64>,
) -> QualityVerdict {
    let mut trace = HashMap::new();

    // Step 4.4 / 4.3.1: any high/critical tool call forces escalation
    // regardless of everything else below.
    if tool_calls.iter().any(|(_, risk)| risk.forces_escalation()) {
        return QualityVerdict {
            passed: false,
            score: 0.0,
            reason: QualityReason::HighRiskTool,
            signals: trace,
        };
    }

    // Step 1: tool short-circuit. A low/medium risk tool call with
    // otherwise-empty text is accepted immediately.
    let has_low_risk_tool_call =
        tool_calls.iter().any(|(_, risk)| matches!(risk, RiskTag::Low | RiskTag::Medium));
    if has_low_risk_tool_call && response_text.trim().is_empty() {
        return QualityVerdict { passed: true, score: 1.0, reason: QualityReason::Ok, signals: trace };
    }

    // Step 2: hard rejects.
    if response_text.trim().is_empty() && tool_calls.is_empty() {
        return QualityVerdict {
            passed: false,
            score: 0.0,
            reason: QualityReason::TooShort,
            signals: trace,
        };
    }
    if REFUSAL_PATTERNS.is_match(response_text) {
        return QualityVerdict {
            passed: false,
            score: 0.0,
            reason: QualityReason::Refusal,
            signals: trace,
        };
    }

    // Step 3: heuristic score.
    let heuristic = heuristic_score(response_text, policy.min_length);
    trace.insert("heuristic".to_string(), heuristic);

    // Step 4: confidence score.
    let confidence = confidence_score(signals, response_text);
    trace.insert("confidence".to_string(), confidence);

    // Step 5 + 6: optional semantic term, aggregate, threshold compare.
    let (aggregate, weights_used) = aggregate_score(heuristic, confidence, semantic_score);
    trace.insert("aggregate".to_string(), aggregate);
    trace.insert("weight_heuristic".to_string(), weights_used.heuristic);
    trace.insert("weight_confidence".to_string(), weights_used.confidence);
    trace.insert("weight_semantic".to_string(), weights_used.semantic);
    if let Some(s) = semantic_score {
        trace.insert("semantic".to_string(), s);
    }

    let threshold = policy.effective_threshold(complexity);
    let meets_threshold = aggregate >= threshold;
    let meets_semantic = match semantic_score {
        Some(s) if policy.strict_semantic_reject => s >= policy.semantic_threshold,
        _ => true,
    };

    if let Some(s) = semantic_score {
        if s < policy.semantic_threshold && policy.strict_semantic_reject {
            return QualityVerdict {
                passed: false,
                score: aggregate,
                reason: QualityReason::SemanticMismatch,
                signals: trace,
            };
        }
    }

    let passed = meets_threshold && meets_semantic;
    let reason = if passed {
        QualityReason::Ok
    } else if semantic_score.is_some() && semantic_score.unwrap() < policy.semantic_threshold {
        QualityReason::SemanticMismatch
    } else {
        QualityReason::HeuristicLow
    };

    QualityVerdict { passed, score: aggregate, reason, signals: trace }
}

fn heuristic_score(text: &str, min_length: usize) -> f64 {
    let lower = text.to_lowercase();
    let char_len = text.len();
    let length_term = if min_length == 0 {
        1.0
    } else {
        (char_len as f64 / min_length as f64).min(1.0)
    };

    let paragraph_count = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();
    let paragraph_term = (paragraph_count as f64 / 3.0).min(1.0);

    let direct_hits = DIRECT_ANSWER_LEXEMES.iter().filter(|w| lower.contains(*w)).count();
    let direct_term = (direct_hits as f64 / 2.0).min(1.0);

    let hedging_hits = HEDGING_MARKERS.iter().filter(|w| lower.contains(*w)).count();
    let hedging_penalty = (hedging_hits.saturating_sub(HEDGING_BUDGET) as f64 * 0.2).min(1.0);

    (0.4 * length_term + 0.2 * paragraph_term + 0.4 * direct_term - hedging_penalty).clamp(0.0, 1.0)
}

fn confidence_score(signals: Option<&ProviderSignals>, text: &str) -> f64 {
    if let Some(signals) = signals {
        if let Some(logprob) = signals.mean_logprob {
            // mean_logprob is typically in (-inf, 0]; map to [0,1] monotonically.
            return (1.0 + logprob.max(-10.0) / 10.0).clamp(0.0, 1.0);
        }
        if let Some(reasoning_tokens) = signals.reasoning_tokens {
            return (reasoning_tokens as f64 / 500.0).min(1.0);
        }
    }
    // Length-derived prior: longer plausible answers get a slightly higher prior.
    let words = text.split_whitespace().count() as f64;
    (0.4 + (words / 200.0)).min(0.8)
}

fn aggregate_score(heuristic: f64, confidence: f64, semantic: Option<f64>) -> (f64, Weights) {
    match semantic {
        Some(s) => {
            let score = WEIGHTS.heuristic * heuristic + WEIGHTS.confidence * confidence + WEIGHTS.semantic * s;
            (score, WEIGHTS)
        }
        None => {
            let denom = WEIGHTS.heuristic + WEIGHTS.confidence;
            let renormalised = Weights {
                heuristic: WEIGHTS.heuristic / denom,
                confidence: WEIGHTS.confidence / denom,
                semantic: 0.0,
            };
            let score = renormalised.heuristic * heuristic + renormalised.confidence * confidence;
            (score, renormalised)
        }
    }
}
