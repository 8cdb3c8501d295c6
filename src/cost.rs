//! Cost Calculator (C6).
//!
//! Token-based per-role accounting grounded in the cost/savings formulas of
//! `other_examples/0a48675c_nijaru-aircher_..._model_router.rs.rs`
//! (`ModelConfig::estimate_cost`, `ModelUsageStats::cost_savings_percent`):
//! price-per-1M-token multiplication, and savings expressed as a percentage
//! of the counterfactual. Token estimation falls back through two tiers —
//! `tiktoken-rs` first, then the spec's word-count heuristic — rather than
//! failing the request when a provider doesn't report usage.

use crate::types::{CostBreakdown, ModelDescriptor, UsageCounts};

/// Roughly the inverse of 1.3 words/token (spec §4.6 fallback estimator).
const WORDS_PER_TOKEN: f64 = 1.3;

/// Estimate a token count from raw text when a provider does not report
/// usage. Tries `tiktoken-rs`'s `cl100k_base` encoding first (the encoding
/// shared by the GPT-3.5/4 family and a reasonable stand-in for unknown
/// models); falls back to the whitespace-word heuristic if the tokenizer
/// can't be constructed.
pub fn estimate_tokens(text: &str) -> u64 {
    if let Ok(bpe) = tiktoken_rs::cl100k_base() {
        return bpe.encode_with_special_tokens(text).len() as u64;
    }
    let words = text.split_whitespace().count() as f64;
    (words / WORDS_PER_TOKEN).ceil() as u64
}

fn cost_for(usage: UsageCounts, model: &ModelDescriptor) -> f64 {
    let input = usage.prompt_tokens as f64 * model.input_price_per_m * 1e-6;
    let output = usage.completion_tokens as f64 * model.output_price_per_m * 1e-6;
    input + output
}

/// Price a hypothetical (not-yet-made) call, for the between-tiers budget
/// gate (spec §7 `ErrBudgetExceeded`: "the controller aborts between tiers
/// if total cost would exceed the remaining budget") — the caller supplies
/// its own projected token counts rather than a real [`UsageCounts`].
pub fn project_cost(model: &ModelDescriptor, prompt_tokens: u64, completion_tokens: u64) -> f64 {
    cost_for(UsageCounts { prompt_tokens, completion_tokens, reasoning_tokens: None }, model)
}

/// Compute the full [`CostBreakdown`] for a cascade run.
///
/// `draft` is `None` when the request was routed direct-to-verifier (no
/// drafter call made). `verifier` is `None` when the drafter was accepted —
/// in that case no verifier call was made, but the counterfactual still
/// needs the verifier's *pricing* to answer "what would this have cost had
/// the verifier handled it directly" (spec §4.6), so `verifier_model` is
/// taken separately from the verifier's actual usage and is always
/// required, whether or not the verifier tier ran.
pub fn compute_cost(
    draft: Option<(UsageCounts, &ModelDescriptor)>,
    verifier: Option<(UsageCounts, &ModelDescriptor)>,
    verifier_model: &ModelDescriptor,
    estimated: bool,
) -> CostBreakdown {
    let draft_cost = draft.map(|(u, m)| cost_for(u, m)).unwrap_or(0.0);
    let verifier_cost = verifier.map(|(u, m)| cost_for(u, m)).unwrap_or(0.0);
    let total_cost = draft_cost + verifier_cost;

    // Counterfactual: same total tokenisation, priced entirely at the
    // verifier's rate. If only one tier ran, that tier's usage stands in.
    let counterfactual_usage = match (draft, verifier) {
        (Some((d, _)), Some((v, _))) => UsageCounts {
            prompt_tokens: d.prompt_tokens.max(v.prompt_tokens),
            completion_tokens: d.completion_tokens + v.completion_tokens,
            reasoning_tokens: None,
        },
        (Some((d, _)), None) => d,
        (None, Some((v, _))) => v,
        (None, None) => UsageCounts::default(),
    };
    let counterfactual_verifier_only_cost = cost_for(counterfactual_usage, verifier_model);

    let saved_amount = counterfactual_verifier_only_cost - total_cost;
    let savings_percent = if counterfactual_verifier_only_cost > 0.0 {
        100.0 * saved_amount / counterfactual_verifier_only_cost
    } else {
        0.0
    };

    CostBreakdown {
        draft_cost,
        verifier_cost,
        total_cost,
        counterfactual_verifier_only_cost,
        saved_amount,
        savings_percent,
        estimated,
    }
}
