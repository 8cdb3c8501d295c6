//! Provider Capability Registry (C1).
//!
//! A static, immutable-after-construction table: per-model pricing, feature
//! flags, and parameter remapping. The teacher dispatches per-provider
//! adapters from an enum built once at startup ([`BackendClient::new`] in
//! `examples/electricessence-claw-router/src/backends/mod.rs`); this registry plays the same
//! "built once, consulted everywhere" role but over [`ModelDescriptor`]
//! feature sets rather than HTTP adapters, since the wire protocol itself is
//! now behind [`crate::provider::ProviderClient`].

use std::collections::HashSet;

use crate::types::{Feature, ModelDescriptor};

/// Generation options the caller may request, in the core's vocabulary —
/// remapped by [`Registry::remap`] into whatever a model natively expects.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Provider-native options after remapping for a specific model's quirks.
#[derive(Debug, Clone, Default)]
pub struct NativeOptions {
    pub max_tokens: Option<u32>,
    pub max_completion_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_prefix: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error("model `{0}` is a reasoning model and does not accept a temperature override")]
    ReasoningForbidsTemperature(String),
}

/// Looks up feature flags and pricing for a (provider, model) pair and
/// applies the closed set of remapping rules from spec §4.1.
#[derive(Debug, Default)]
pub struct Registry;

impl Registry {
    pub fn new() -> Self {
        Self
    }

    /// `pricing(inputPerMTokens, outputPerMTokens)`. Never blocks; an
    /// unknown model (one absent from the caller's `CascadeConfig`) yields
    /// zero pricing rather than an error — the caller is expected to supply
    /// pricing via [`ModelDescriptor`], this registry only interprets it.
    pub fn pricing(&self, model: &ModelDescriptor) -> (f64, f64) {
        (model.input_price_per_m, model.output_price_per_m)
    }

    /// `features() -> set<Feature>`, honouring per-model overrides.
    pub fn features(&self, model: &ModelDescriptor) -> HashSet<Feature> {
        if let Some(overrides) = &model.feature_overrides {
            overrides.iter().copied().collect()
        } else {
            [Feature::Tools, Feature::Streaming, Feature::SystemMessage].into_iter().collect()
        }
    }

    pub fn supports(&self, model: &ModelDescriptor, feature: Feature) -> bool {
        self.features(model).contains(&feature)
    }

    /// Remap caller-facing [`GenerationOptions`] to the model's native shape.
    ///
    /// - Reasoning models: refuse `temperature != 1`; rename `max_tokens` to
    ///   `max_completion_tokens`; strip any system message into a prefix of
    ///   the first user message (the prefix itself is threaded in by the
    ///   caller via `system_message`, since this function only decides
    ///   *whether* stripping applies).
    pub fn remap(
        &self,
        model: &ModelDescriptor,
        opts: &GenerationOptions,
        system_message: Option<&str>,
    ) -> Result<NativeOptions, RemapError> {
        let is_reasoning = self.supports(model, Feature::Reasoning);

        if is_reasoning {
            if let Some(t) = opts.temperature {
                if (t - 1.0).abs() > f32::EPSILON {
                    return Err(RemapError::ReasoningForbidsTemperature(model.key()));
                }
            }
            return Ok(NativeOptions {
                max_tokens: None,
                max_completion_tokens: opts.max_tokens,
                temperature: None,
                system_prefix: system_message.map(|s| s.to_string()),
            });
        }

        Ok(NativeOptions {
            max_tokens: opts.max_tokens,
            max_completion_tokens: None,
            temperature: opts.temperature,
            system_prefix: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasoning_model() -> ModelDescriptor {
        ModelDescriptor {
            provider: "test".into(),
            model: "o-reasoner".into(),
            input_price_per_m: 1.0,
            output_price_per_m: 2.0,
            quality_threshold_override: None,
            feature_overrides: Some(vec![Feature::Reasoning, Feature::Tools]),
        }
    }

    fn plain_model() -> ModelDescriptor {
        ModelDescriptor {
            provider: "test".into(),
            model: "chat-1".into(),
            input_price_per_m: 0.15,
            output_price_per_m: 0.6,
            quality_threshold_override: None,
            feature_overrides: None,
        }
    }

    #[test]
    fn reasoning_model_rejects_nondefault_temperature() {
        let reg = Registry::new();
        let opts = GenerationOptions { max_tokens: Some(100), temperature: Some(0.2) };
        assert!(reg.remap(&reasoning_model(), &opts, None).is_err());
    }

    #[test]
    fn reasoning_model_renames_max_tokens() {
        let reg = Registry::new();
        let opts = GenerationOptions { max_tokens: Some(100), temperature: None };
        let native = reg.remap(&reasoning_model(), &opts, Some("be terse")).unwrap();
        assert_eq!(native.max_tokens, None);
        assert_eq!(native.max_completion_tokens, Some(100));
        assert_eq!(native.system_prefix.as_deref(), Some("be terse"));
    }

    #[test]
    fn plain_model_passes_options_through() {
        let reg = Registry::new();
        let opts = GenerationOptions { max_tokens: Some(256), temperature: Some(0.7) };
        let native = reg.remap(&plain_model(), &opts, Some("ignored")).unwrap();
        assert_eq!(native.max_tokens, Some(256));
        assert_eq!(native.temperature, Some(0.7));
        assert_eq!(native.system_prefix, None);
    }

    #[test]
    fn unknown_pricing_model_still_resolves_from_descriptor() {
        let reg = Registry::new();
        let (input, output) = reg.pricing(&plain_model());
        assert_eq!((input, output), (0.15, 0.6));
    }

    #[test]
    fn default_features_exclude_reasoning() {
        let reg = Registry::new();
        assert!(!reg.supports(&plain_model(), Feature::Reasoning));
        assert!(reg.supports(&plain_model(), Feature::Tools));
    }
}
