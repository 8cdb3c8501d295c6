//! Tool Risk Classifier (C4).
//!
//! Tags each [`ToolSpec`] the caller provides from lexical matches against
//! four disjoint keyword sets applied to `name + description` (spec §4.4).
//! Results are cached per request by the caller (typically the cascade
//! controller, once per `Agent::run`/`Agent::stream` call) since a
//! `ToolSpec` list is immutable for the life of one request.

use std::collections::HashMap;

use crate::types::{RiskTag, ToolSpec};

const CRITICAL_KEYWORDS: &[&str] = &["delete", "drop", "destroy", "wipe", "terminate", "revoke"];
const HIGH_KEYWORDS: &[&str] =
    &["transfer", "payment", "pay", "charge", "withdraw", "send_money", "purchase"];
const MEDIUM_KEYWORDS: &[&str] = &["write", "update", "create", "modify", "send", "post"];
const LOW_KEYWORDS: &[&str] = &["get", "read", "search", "list", "lookup", "fetch"];

/// Classify a single tool's risk from its name and description.
///
/// Keyword sets are checked high-to-low so a tool matching both a critical
/// and a low keyword (e.g. "get_and_delete") is tagged at the higher risk.
/// A tool matching none of the sets defaults to `medium` — unclassified
/// write-shaped capability is not assumed safe.
pub fn classify_tool(tool: &ToolSpec) -> RiskTag {
    let haystack = format!("{} {}", tool.name, tool.description).to_lowercase();

    if CRITICAL_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        RiskTag::Critical
    } else if HIGH_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        RiskTag::High
    } else if MEDIUM_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        RiskTag::Medium
    } else if LOW_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        RiskTag::Low
    } else {
        RiskTag::Medium
    }
}

/// Per-request cache keyed by tool name, built once before the first model
/// call (spec §4.4: "Result is cached per request").
pub fn classify_all(tools: &[ToolSpec]) -> HashMap<String, RiskTag> {
    tools.iter().map(|t| (t.name.clone(), classify_tool(t))).collect()
}
