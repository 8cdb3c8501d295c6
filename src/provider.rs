//! Provider and embedding capability contracts (spec §6 inbound interfaces).
//!
//! Object-safe `#[async_trait]` traits, grounded in the `AIProvider` port of
//! `other_examples/aafe0c3e_..._ai_provider.rs.rs` — a small method-set
//! contract (`complete`, `stream_complete`, capability probe) rather than a
//! concrete SDK client, so the cascade controller never depends on OpenAI,
//! Anthropic, or any other vendor crate directly.

use std::collections::HashSet;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::ProviderErrorKind;
use crate::types::{Feature, Message, ToolCall, ToolSpec, UsageCounts};

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub tools: Vec<ToolSpec>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: UsageCounts,
    /// Opaque provider-specific extras (log-probs, reasoning token counts)
    /// the quality validator may consult when present.
    pub mean_logprob: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
#[error("provider error ({kind}): {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

/// One event in a provider's token stream (spec §6 `ProviderEvent`).
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    Delta(String),
    ToolFragment { id: String, name_delta: Option<String>, args_delta: Option<String> },
    Finish { reason: FinishReason, usage: UsageCounts },
    Error { kind: ProviderErrorKind, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

pub type ProviderEventStream = Pin<Box<dyn Stream<Item = ProviderEvent> + Send>>;

/// Abstract `Chat`/`Stream`/`Capabilities` contract (spec §6). Any concrete
/// SDK client satisfies this by implementing the trait; the core never
/// names a vendor.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError>;

    async fn stream(&self, messages: &[Message], options: &ChatOptions) -> ProviderEventStream;

    fn capabilities(&self) -> HashSet<Feature>;
}

/// Abstract embedding backend for the quality validator's optional semantic
/// term (spec §1: "Embed(text) → vector<float> plus a single scalar
/// cosine").
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Cosine similarity between two embedding vectors, clipped to `[0, 1]`
/// (spec §4.3 step 5). Returns `0.0` for mismatched or zero-length vectors
/// rather than panicking — a degenerate embedding should degrade gracefully,
/// not crash the cascade.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    ((dot / (norm_a * norm_b)) as f64).clamp(0.0, 1.0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors_is_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_lengths_is_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn stub_provider_returns_configured_response() {
        use testing::StubProvider;
        let provider = StubProvider::ok("4", UsageCounts { prompt_tokens: 6, completion_tokens: 1, reasoning_tokens: None });
        let response = provider.chat(&[], &ChatOptions::default()).await.unwrap();
        assert_eq!(response.content, "4");
    }
}
