//! Guardrails (C7).
//!
//! Two independent, side-effect-free passes over user-visible prompt text:
//! content moderation (keyword/regex categories) and PII detection with
//! optional redaction. Patterns are lazily-compiled statics (`once_cell` +
//! `regex`), grounded in the same dependency pair attested in
//! `manifests/omnidotdev-synapse-gateway`, `manifests/agourakis82-beagle`,
//! and `manifests/lanegrid-agtrace` — the teacher itself has no
//! text-scanning component, so this crate pair is enrichment from the wider
//! retrieval pack rather than a teacher pattern.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{GuardrailFinding, GuardrailKind, UserProfile};

struct ModerationCategory {
    kind: GuardrailKind,
    keywords: &'static [&'static str],
}

const MODERATION_CATEGORIES: &[ModerationCategory] = &[
    ModerationCategory {
        kind: GuardrailKind::Violence,
        keywords: &["kill them", "mass shooting", "bomb making", "how to make a weapon"],
    },
    ModerationCategory {
        kind: GuardrailKind::Hate,
        keywords: &["racial slur", "ethnic cleansing"],
    },
    ModerationCategory {
        kind: GuardrailKind::SelfHarm,
        keywords: &["kill myself", "end my life", "suicide method"],
    },
    ModerationCategory {
        kind: GuardrailKind::Sexual,
        keywords: &["child sexual", "csam"],
    },
    ModerationCategory {
        kind: GuardrailKind::Illegal,
        keywords: &["launder money", "how to hack into", "synthesize meth"],
    },
];

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+\d{1,3}[\s-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b").unwrap()
});

static SSN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

static CREDIT_CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d[ -]*?){13,16}\b").unwrap());

static IP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap());

/// Result of [`check`]: whether the text is safe to send to a model, plus
/// every finding (moderation categories hit and PII spans detected).
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub is_safe: bool,
    pub findings: Vec<GuardrailFinding>,
}

/// Scan `text` for disallowed content and PII. Side-effect-free: the input
/// is never modified (spec §4.7 — "do not modify the prompt unless the
/// caller explicitly asks for redaction").
pub fn check(text: &str, profile: Option<&UserProfile>) -> CheckResult {
    let mut findings = Vec::new();
    let lower = text.to_lowercase();

    let moderation_enabled = profile.map(|p| p.enable_content_moderation).unwrap_or(true);
    if moderation_enabled {
        for category in MODERATION_CATEGORIES {
            for keyword in category.keywords {
                if let Some(start) = lower.find(keyword) {
                    findings.push(GuardrailFinding {
                        kind: category.kind,
                        subtype: keyword.to_string(),
                        span: (start, start + keyword.len()),
                    });
                }
            }
        }
    }

    let pii_enabled = profile.map(|p| p.enable_pii_detection).unwrap_or(true);
    if pii_enabled {
        findings.extend(pii_findings(text));
    }

    let is_safe = !findings.iter().any(|f| f.kind != GuardrailKind::Pii);
    CheckResult { is_safe, findings }
}

fn pii_findings(text: &str) -> Vec<GuardrailFinding> {
    let mut findings = Vec::new();

    for m in EMAIL_RE.find_iter(text) {
        findings.push(finding(GuardrailKind::Pii, "email", m.start(), m.end()));
    }
    for m in SSN_RE.find_iter(text) {
        findings.push(finding(GuardrailKind::Pii, "ssn", m.start(), m.end()));
    }
    for m in CREDIT_CARD_RE.find_iter(text) {
        let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 13 && luhn_valid(&digits) {
            findings.push(finding(GuardrailKind::Pii, "credit_card", m.start(), m.end()));
        }
    }
    for m in PHONE_RE.find_iter(text) {
        let overlaps_ssn = findings.iter().any(|f| f.subtype == "ssn" && spans_overlap(f.span, (m.start(), m.end())));
        if !overlaps_ssn {
            findings.push(finding(GuardrailKind::Pii, "phone", m.start(), m.end()));
        }
    }
    for m in IP_RE.find_iter(text) {
        findings.push(finding(GuardrailKind::Pii, "ip", m.start(), m.end()));
    }

    findings.sort_by_key(|f| f.span.0);
    findings
}

fn spans_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

fn finding(kind: GuardrailKind, subtype: &str, start: usize, end: usize) -> GuardrailFinding {
    GuardrailFinding { kind, subtype: subtype.to_string(), span: (start, end) }
}

fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;
    for c in digits.chars().rev() {
        let mut d = c.to_digit(10).unwrap();
        if double {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
        double = !double;
    }
    sum % 10 == 0
}

/// Replace each PII span with `[REDACTED:<kind>]`, preserving byte offsets
/// elsewhere in the string (later spans shift, but earlier text is
/// untouched). Idempotent: re-running on already-redacted text finds no new
/// spans because `[REDACTED:...]` matches none of the PII patterns.
pub fn redact(text: &str, profile: Option<&UserProfile>) -> (String, Vec<GuardrailFinding>) {
    let result = check(text, profile);
    let pii: Vec<&GuardrailFinding> = result.findings.iter().filter(|f| f.kind == GuardrailKind::Pii).collect();

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for f in &pii {
        if f.span.0 < cursor {
            continue; // overlapping span already covered by a prior redaction
        }
        out.push_str(&text[cursor..f.span.0]);
        out.push_str(&format!("[REDACTED:{}]", f.subtype));
        cursor = f.span.1;
    }
    out.push_str(&text[cursor..]);

    (out, result.findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderation_hit_marks_unsafe() {
        let result = check("here is how to make a weapon at home", None);
        assert!(!result.is_safe);
        assert!(result.findings.iter().any(|f| f.kind == GuardrailKind::Violence));
    }

    #[test]
    fn pii_alone_does_not_mark_unsafe() {
        let result = check("email me at a@b.com", None);
        assert!(result.is_safe);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].subtype, "email");
    }

    #[test]
    fn scenario_s8_email_and_ssn_redaction() {
        let (redacted, findings) = redact("Email me at a@b.com, SSN 123-45-6789", None);
        assert_eq!(findings.len(), 2);
        assert!(redacted.contains("[REDACTED:email]"));
        assert!(redacted.contains("[REDACTED:ssn]"));
    }

    #[test]
    fn redaction_is_idempotent() {
        let input = "Email me at a@b.com, SSN 123-45-6789";
        let (once, _) = redact(input, None);
        let (twice, _) = redact(&once, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn credit_card_requires_luhn_validity() {
        // Valid Visa test number.
        let (redacted, findings) = redact("card 4111 1111 1111 1111 on file", None);
        assert!(findings.iter().any(|f| f.subtype == "credit_card"));
        assert!(redacted.contains("[REDACTED:credit_card]"));
    }

    #[test]
    fn invalid_card_number_is_not_flagged() {
        let result = check("order number 1234 5678 9012 3456", None);
        assert!(!result.findings.iter().any(|f| f.subtype == "credit_card"));
    }

    #[test]
    fn disabled_pii_detection_skips_scan() {
        let profile = UserProfile {
            identity: "u".into(),
            tier: "default".into(),
            custom_hourly_cap: None,
            custom_daily_cap: None,
            custom_daily_budget: None,
            enable_content_moderation: true,
            enable_pii_detection: false,
            optimisation_weights: None,
            latency_cap_ms: None,
            preferred_models: None,
        };
        let result = check("email me at a@b.com", Some(&profile));
        assert!(result.findings.is_empty());
    }
}
