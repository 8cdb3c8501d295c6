//! Complexity Classifier (C2).
//!
//! Pure, synchronous, deterministic. Kept as a free function over `&str`
//! rather than a struct — there is no state to own, only a fixed table of
//! signals (spec §4.2), in the same "policy lives in data, not control
//! flow" spirit as the teacher's `router::is_sufficient` heuristic.

use crate::types::{Complexity, ComplexityVerdict};

const LENGTH_THRESHOLDS: [usize; 4] = [5, 30, 120, 400];

const DOMAIN_LEXICON: &[(&str, &[&str])] = &[
    ("stem", &["algorithm", "theorem", "equation", "derivative", "integral", "matrix", "quantum"]),
    ("philosophy", &["epistemology", "ontology", "ethics", "metaphysics", "dialectic"]),
    ("law", &["statute", "plaintiff", "defendant", "jurisdiction", "tort", "liability"]),
    ("medicine", &["diagnosis", "prognosis", "etiology", "pathology", "syndrome"]),
    ("systems", &["consensus", "distributed", "latency", "throughput", "replication", "byzantine"]),
    ("ml", &["gradient", "embedding", "transformer", "backpropagation", "overfitting"]),
];

const IMPERATIVE_VERBS: &[&str] =
    &["design", "prove", "derive", "compare", "optimise", "optimize"];

const CODE_FENCE_MARKERS: &[&str] = &["```", "def ", "fn ", "class ", "SELECT ", "import "];
const MATH_SYMBOLS: &[char] = &['∑', '∫', '∂', '√', '≈', '≤', '≥', '→', '±'];

/// Classify a prompt's complexity. Edge case: empty text is `trivial` with
/// confidence 1 (spec §4.2).
pub fn classify(text: &str) -> ComplexityVerdict {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ComplexityVerdict { label: Complexity::Trivial, confidence: 1.0 };
    }

    let word_count = trimmed.split_whitespace().count();
    let length_signal = length_signal(word_count);

    let has_structure = CODE_FENCE_MARKERS.iter().any(|m| trimmed.contains(m))
        || trimmed.chars().any(|c| MATH_SYMBOLS.contains(&c));

    let lower = trimmed.to_lowercase();
    let domain_hits = DOMAIN_LEXICON
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .count();

    let has_imperative = IMPERATIVE_VERBS.iter().any(|v| lower.contains(v));

    let mut step = base_step(length_signal);
    if has_structure {
        step = step.max(3); // bump toward hard/expert
    }
    step += domain_hits.min(2); // each domain hit shifts one step up, capped
    if has_imperative {
        step = step.max(2); // at least moderate
    }
    step = step.min(4);

    let label = Complexity::ALL[step];

    // Confidence: how far the length signal sits from a threshold boundary,
    // boosted slightly when a structural/domain/imperative signal agrees
    // with the length-implied label.
    let agreement = [has_structure, domain_hits > 0, has_imperative].iter().filter(|b| **b).count();
    let confidence = (0.55 + 0.15 * agreement as f64).min(1.0);

    ComplexityVerdict { label, confidence }
}

fn length_signal(word_count: usize) -> f64 {
    let thresholds = LENGTH_THRESHOLDS;
    if word_count <= thresholds[0] {
        0.0
    } else if word_count <= thresholds[1] {
        0.25
    } else if word_count <= thresholds[2] {
        0.5
    } else if word_count <= thresholds[3] {
        0.75
    } else {
        1.0
    }
}

fn base_step(length_signal: f64) -> usize {
    ((length_signal * 4.0).round() as usize).min(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_trivial_confidence_one() {
        let v = classify("");
        assert_eq!(v.label, Complexity::Trivial);
        assert_eq!(v.confidence, 1.0);
    }

    #[test]
    fn short_arithmetic_question_is_low_complexity() {
        let v = classify("What is 2+2?");
        assert!(v.label <= Complexity::Simple);
    }

    #[test]
    fn long_text_with_domain_terms_is_elevated() {
        let v = classify(
            "Design a Byzantine consensus protocol with formal proofs of safety \
             and liveness under partial synchrony, covering leader election, \
             quorum intersection, and view-change latency bounds for a \
             distributed replication system.",
        );
        assert!(v.label >= Complexity::Hard);
    }

    #[test]
    fn imperative_verb_forces_at_least_moderate() {
        let v = classify("Compare");
        assert!(v.label >= Complexity::Moderate);
    }

    #[test]
    fn code_fence_bumps_toward_expert() {
        let v = classify("```fn main() {}```");
        assert!(v.label >= Complexity::Hard);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Explain quantum entanglement in detail please";
        assert_eq!(classify(text).label, classify(text).label);
        assert_eq!(classify(text).confidence, classify(text).confidence);
    }
}
