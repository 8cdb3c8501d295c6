//! Cascade Controller (C9) — non-streaming state machine.
//!
//! Implements the `Pre → Drafting → Validating → Escalating → Verifying →
//! Done|Failed` machine of spec §4.9. [`crate::streaming`] runs the same
//! decisions incrementally; both sit on top of the same C1–C8 building
//! blocks so the two engines can never disagree about what "accepted"
//! means.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::CascadeConfig;
use crate::error::{CascadeError, ProviderErrorKind};
use crate::events::{Component, Emitter};
use crate::guardrails;
use crate::provider::{ChatOptions, ChatResponse, EmbeddingClient, ProviderClient};
use crate::quality::{self, ProviderSignals};
use crate::registry::Registry;
use crate::tool_risk;
use crate::types::{
    CascadeResult, Complexity, Latencies, ModelDescriptor, QualityReason,
    QualityVerdict, RiskTag, RoutingStrategy, ToolCall, ToolSpec, UsageCounts,
};
use crate::{classifier, cost, prerouter};

/// Everything a cascade run needs that is not part of the request itself:
/// the config, the registry, resolved provider handles, and the emitter.
/// Borrowed for the lifetime of one `Agent::run`/`Agent::stream` call.
pub struct CascadeContext<'a> {
    pub config: &'a CascadeConfig,
    pub registry: &'a Registry,
    pub drafter_client: Option<Arc<dyn ProviderClient>>,
    pub verifier_client: Arc<dyn ProviderClient>,
    pub embedder: Option<Arc<dyn EmbeddingClient>>,
    pub emitter: &'a Emitter,
    pub cancel: CancellationToken,
    /// Applies to each individual provider call (spec §5: "per-model ...
    /// applies to each provider call"), independent of the caller's overall
    /// request deadline.
    pub per_model_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub tools: Vec<ToolSpec>,
    pub force_direct: bool,
}

/// Run one request to completion. Returns a populated [`CascadeResult`] on
/// success, or a [`CascadeError`] carrying the partial trace consumed so
/// far up to the failure point (spec §7: "the partial CascadeResult
/// populated up to the failure point").
pub async fn run(
    ctx: &CascadeContext<'_>,
    user_text: &str,
    messages: &[crate::types::Message],
    options: &RequestOptions,
) -> Result<CascadeResult, CascadeError> {
    let overall_start = Instant::now();

    // --- Pre state ---------------------------------------------------
    let guardrail_result = guardrails::check(user_text, None);
    ctx.emitter.emit(Component::Guardrails, format!("is_safe={}", guardrail_result.is_safe));
    if !guardrail_result.is_safe {
        return Err(CascadeError::Guardrail { findings: guardrail_result.findings });
    }

    let complexity_verdict = classifier::classify(user_text);
    ctx.emitter.emit(
        Component::Classifier,
        format!("label={} confidence={:.2}", complexity_verdict.label, complexity_verdict.confidence),
    );

    let tool_risk_cache = tool_risk::classify_all(&options.tools);
    let drafter_supports_tools = ctx
        .drafter_client
        .as_ref()
        .map(|_| ctx.registry.supports(ctx.config.drafter(), crate::types::Feature::Tools))
        .unwrap_or(false);

    let decision_input = prerouter::PreRouterInput {
        force_direct: options.force_direct,
        complexity: Some(complexity_verdict.label),
        has_tools: !options.tools.is_empty(),
        drafter_supports_tools,
        guardrail_result: &guardrail_result,
    };
    let decision =
        prerouter::route(ctx.config, &ctx.config.pre_router_policy, &decision_input);
    ctx.emitter.emit(Component::PreRouter, decision.rationale);

    match decision.decision {
        prerouter::Decision::Reject => Err(CascadeError::Guardrail { findings: guardrail_result.findings }),
        prerouter::Decision::DirectToVerifier => {
            run_direct(ctx, messages, options, Some(complexity_verdict.label), overall_start, true).await
        }
        prerouter::Decision::DirectToDrafter => {
            run_direct(ctx, messages, options, Some(complexity_verdict.label), overall_start, false).await
        }
        prerouter::Decision::Cascade => {
            run_cascade(ctx, user_text, messages, options, complexity_verdict.label, &tool_risk_cache, overall_start).await
        }
    }
}

async fn call_model(
    client: &Arc<dyn ProviderClient>,
    messages: &[crate::types::Message],
    options: &RequestOptions,
    per_model_timeout: Option<Duration>,
) -> Result<ChatResponse, CascadeError> {
    let chat_options = ChatOptions {
        max_tokens: options.max_tokens,
        temperature: options.temperature,
        tools: options.tools.clone(),
    };
    let call = client.chat(messages, &chat_options);
    let outcome = match per_model_timeout {
        Some(d) => match tokio::time::timeout(d, call).await {
            Ok(r) => r,
            Err(_) => return Err(CascadeError::Timeout),
        },
        None => call.await,
    };
    outcome.map_err(|e| CascadeError::Provider { kind: e.kind, model: String::new(), message: e.message })
}

fn tag_tool_calls(tool_calls: &[ToolCall], cache: &std::collections::HashMap<String, RiskTag>) -> Vec<(ToolCall, RiskTag)> {
    tool_calls
        .iter()
        .map(|c| (c.clone(), cache.get(&c.name).copied().unwrap_or(RiskTag::Medium)))
        .collect()
}

async fn run_direct(
    ctx: &CascadeContext<'_>,
    messages: &[crate::types::Message],
    options: &RequestOptions,
    complexity: Option<Complexity>,
    overall_start: Instant,
    to_verifier: bool,
) -> Result<CascadeResult, CascadeError> {
    let (client, model) = if to_verifier {
        (ctx.verifier_client.clone(), ctx.config.verifier().clone())
    } else {
        (
            ctx.drafter_client.clone().expect("direct-to-drafter requires a drafter client"),
            ctx.config.drafter().clone(),
        )
    };

    let start = Instant::now();
    let response = call_model(&client, messages, options, ctx.per_model_timeout).await.map_err(|e| with_model(e, &model))?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    ctx.emitter.emit(Component::Cascade, format!("direct call to {} finished", model.key()));

    let (draft_ms, verifier_ms) = if to_verifier { (0, elapsed_ms) } else { (elapsed_ms, 0) };
    let verifier_model = ctx.config.verifier();
    let cost = if to_verifier {
        cost::compute_cost(None, Some((response.usage, &model)), verifier_model, false)
    } else {
        cost::compute_cost(Some((response.usage, &model)), None, verifier_model, false)
    };

    Ok(CascadeResult {
        content: response.content,
        tool_calls: response.tool_calls,
        model_used: model.key(),
        routing_strategy: RoutingStrategy::Direct,
        cascaded: false,
        draft_accepted: !to_verifier,
        complexity,
        quality_verdict: None,
        draft_usage: if to_verifier { None } else { Some(response.usage) },
        verifier_usage: if to_verifier { Some(response.usage) } else { None },
        cost,
        latencies: Latencies {
            total_ms: overall_start.elapsed().as_millis() as u64,
            draft_ms,
            verifier_ms,
            cascade_overhead_ms: 0,
        },
    })
}

async fn run_cascade(
    ctx: &CascadeContext<'_>,
    user_text: &str,
    messages: &[crate::types::Message],
    options: &RequestOptions,
    complexity: Complexity,
    tool_risk_cache: &std::collections::HashMap<String, RiskTag>,
    overall_start: Instant,
) -> Result<CascadeResult, CascadeError> {
    let drafter = ctx.config.drafter().clone();
    let verifier = ctx.config.verifier().clone();
    let drafter_client = ctx.drafter_client.clone().expect("cascade decision requires a drafter client");

    // Open Question OQ2 (spec §9): when enabled, the verifier call is fired
    // off in the background alongside drafting rather than after rejection,
    // trading a wasted verifier call on every accepted draft for a lower
    // tail latency on every rejected one. Discarded (never awaited) if the
    // draft is accepted, so it contributes no cost or usage to the result.
    let speculative_handle = if ctx.config.speculative_verify {
        let verifier_client = ctx.verifier_client.clone();
        let messages_owned = messages.to_vec();
        let options_owned = options.clone();
        let per_model_timeout = ctx.per_model_timeout;
        Some(tokio::spawn(async move {
            call_model(&verifier_client, &messages_owned, &options_owned, per_model_timeout).await
        }))
    } else {
        None
    };

    // --- Drafting ------------------------------------------------------
    let draft_start = Instant::now();
    let draft_result = call_model(&drafter_client, messages, options, ctx.per_model_timeout).await;
    let draft_ms = draft_start.elapsed().as_millis() as u64;

    let (draft_response, draft_failed_silently) = match draft_result {
        Ok(resp) => (resp, false),
        Err(CascadeError::Provider { kind: ProviderErrorKind::Cancelled, .. }) => {
            return Err(CascadeError::Cancelled);
        }
        Err(_) => {
            // Treat as silent rejection per spec §4.9: zero output tokens, escalate.
            ctx.emitter.emit(Component::Drafter, "drafter call failed, escalating");
            (
                ChatResponse {
                    content: String::new(),
                    tool_calls: vec![],
                    usage: UsageCounts::default(),
                    mean_logprob: None,
                },
                true,
            )
        }
    };

    if ctx.cancel.is_cancelled() {
        return Err(CascadeError::Cancelled);
    }

    // --- Validating ------------------------------------------------------
    let tagged_calls = tag_tool_calls(&draft_response.tool_calls, tool_risk_cache);
    let signals = draft_response.mean_logprob.map(|p| ProviderSignals { mean_logprob: Some(p), reasoning_tokens: None });
    let verdict = if draft_failed_silently {
        QualityVerdict { passed: false, score: 0.0, reason: QualityReason::TooShort, signals: Default::default() }
    } else {
        let semantic_score = quality::resolve_semantic_score(
            ctx.embedder.as_ref(),
            &ctx.config.quality_policy,
            user_text,
            &draft_response.content,
        )
        .await;
        quality::validate(
            &draft_response.content,
            &tagged_calls,
            Some(complexity),
            &ctx.config.quality_policy,
            signals.as_ref(),
            semantic_score,
        )
    };
    ctx.emitter.emit(Component::QualityValidator, format!("passed={} reason={:?}", verdict.passed, verdict.reason));

    let forces_escalation = tagged_calls.iter().any(|(_, risk)| risk.forces_escalation());

    if verdict.passed && !forces_escalation {
        if let Some(handle) = speculative_handle {
            handle.abort();
        }
        let draft_cost = cost::compute_cost(Some((draft_response.usage, &drafter)), None, &verifier, false);
        return Ok(CascadeResult {
            content: draft_response.content,
            tool_calls: draft_response.tool_calls,
            model_used: drafter.key(),
            routing_strategy: RoutingStrategy::Cascade,
            cascaded: false,
            draft_accepted: true,
            complexity: Some(complexity),
            quality_verdict: Some(verdict),
            draft_usage: Some(draft_response.usage),
            verifier_usage: None,
            cost: draft_cost,
            latencies: Latencies {
                total_ms: overall_start.elapsed().as_millis() as u64,
                draft_ms,
                verifier_ms: 0,
                cascade_overhead_ms: 0,
            },
        });
    }

    // --- Escalating → Verifying ------------------------------------------
    // Budget gate (spec §7 `ErrBudgetExceeded`): abort between tiers if the
    // draft cost already incurred plus a projection of the verifier call
    // would exceed the configured per-request ceiling. The projection reuses
    // the draft's prompt token count (the same messages go to the verifier)
    // and the caller's `maxTokens` cap, or the draft's own completion count
    // when no cap was set, as the completion-token estimate.
    if let Some(max_total_cost) = ctx.config.budget_policy.max_total_cost_per_request {
        let draft_cost_so_far = cost::project_cost(&drafter, draft_response.usage.prompt_tokens, draft_response.usage.completion_tokens);
        let projected_completion_tokens =
            options.max_tokens.map(|t| t as u64).unwrap_or_else(|| draft_response.usage.completion_tokens.max(1));
        let projected_verifier_cost =
            cost::project_cost(&verifier, draft_response.usage.prompt_tokens, projected_completion_tokens);
        if draft_cost_so_far + projected_verifier_cost > max_total_cost {
            if let Some(handle) = speculative_handle {
                handle.abort();
            }
            ctx.emitter.emit(Component::CostCalculator, "projected cost exceeds per-request budget, aborting");
            return Err(CascadeError::BudgetExceeded);
        }
    }

    ctx.emitter.emit(Component::Cascade, "switch drafter->verifier");
    let verify_start = Instant::now();
    let verify_response = match speculative_handle {
        Some(handle) => handle
            .await
            .map_err(|_| CascadeError::Cancelled)?
            .map_err(|e| with_model(e, &verifier))?,
        None => call_model(&ctx.verifier_client, messages, options, ctx.per_model_timeout)
            .await
            .map_err(|e| with_model(e, &verifier))?,
    };
    let verifier_ms = verify_start.elapsed().as_millis() as u64;
    ctx.emitter.emit(Component::Verifier, "verifier responded");

    let final_cost = cost::compute_cost(
        Some((draft_response.usage, &drafter)),
        Some((verify_response.usage, &verifier)),
        &verifier,
        false,
    );

    Ok(CascadeResult {
        content: verify_response.content,
        tool_calls: verify_response.tool_calls,
        model_used: verifier.key(),
        routing_strategy: RoutingStrategy::Cascade,
        cascaded: true,
        draft_accepted: false,
        complexity: Some(complexity),
        quality_verdict: Some(verdict),
        draft_usage: Some(draft_response.usage),
        verifier_usage: Some(verify_response.usage),
        cost: final_cost,
        latencies: Latencies {
            total_ms: overall_start.elapsed().as_millis() as u64,
            draft_ms,
            verifier_ms,
            cascade_overhead_ms: draft_ms,
        },
    })
}

fn with_model(err: CascadeError, model: &ModelDescriptor) -> CascadeError {
    match err {
        CascadeError::Provider { kind, message, .. } => {
            CascadeError::Provider { kind, model: model.key(), message }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityPolicy;
    use crate::provider::testing::StubProvider;
    use crate::types::{Message, ModelDescriptor};
    use std::collections::HashMap;

    fn model(key: &str, in_price: f64, out_price: f64) -> ModelDescriptor {
        ModelDescriptor {
            provider: "test".into(),
            model: key.into(),
            input_price_per_m: in_price,
            output_price_per_m: out_price,
            quality_threshold_override: None,
            feature_overrides: None,
        }
    }

    fn config() -> CascadeConfig {
        CascadeConfig {
            models: vec![model("draft", 0.15, 0.15), model("verify", 2.5, 10.0)],
            quality_policy: QualityPolicy {
                floor_threshold: 0.1,
                min_length: 0,
                tiered_thresholds: HashMap::new(),
                use_semantic_validation: false,
                semantic_threshold: 0.5,
                strict_mode: false,
                strict_semantic_reject: false,
            },
            pre_router_policy: Default::default(),
            caching: false,
            budget_policy: Default::default(),
            tiers: HashMap::new(),
            profiles: HashMap::new(),
            speculative_verify: false,
        }
    }

    #[tokio::test]
    async fn scenario_s1_trivial_accept() {
        let cfg = config();
        let registry = Registry::new();
        let drafter = Arc::new(StubProvider::ok("4", UsageCounts { prompt_tokens: 6, completion_tokens: 1, reasoning_tokens: None }));
        let verifier = Arc::new(StubProvider::ok("should not be called", UsageCounts::default()));
        let emitter = Emitter::disabled("req-1".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let messages = vec![Message::user("What is 2+2?")];
        let result = run(&ctx, "What is 2+2?", &messages, &RequestOptions::default()).await.unwrap();

        assert_eq!(result.model_used, "test/draft");
        assert!(result.draft_accepted);
        assert_eq!(result.cost.verifier_cost, 0.0);
        assert!(result.cost.savings_percent > 0.0);
    }

    #[tokio::test]
    async fn scenario_s3_drafter_rejected_escalates() {
        let cfg = config();
        let registry = Registry::new();
        let drafter = Arc::new(StubProvider::ok("idk", UsageCounts { prompt_tokens: 20, completion_tokens: 2, reasoning_tokens: None }));
        let verifier = Arc::new(StubProvider::ok(
            "Quantum entanglement is a correlation between particles such that the state of one instantaneously constrains the other.",
            UsageCounts { prompt_tokens: 25, completion_tokens: 60, reasoning_tokens: None },
        ));
        let emitter = Emitter::disabled("req-2".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let messages = vec![Message::user("Explain quantum entanglement in detail")];
        let result = run(&ctx, "Explain quantum entanglement in detail", &messages, &RequestOptions::default())
            .await
            .unwrap();

        assert!(!result.draft_accepted);
        assert_eq!(result.model_used, "test/verify");
        assert!((result.cost.total_cost - (result.cost.draft_cost + result.cost.verifier_cost)).abs() < 1e-12);
    }

    #[tokio::test]
    async fn budget_gate_aborts_before_escalating_when_projected_cost_exceeds_ceiling() {
        let mut cfg = config();
        cfg.budget_policy.max_total_cost_per_request = Some(0.0000001);
        let registry = Registry::new();
        let drafter = Arc::new(StubProvider::ok("idk", UsageCounts { prompt_tokens: 20, completion_tokens: 2, reasoning_tokens: None }));
        let verifier = Arc::new(StubProvider::ok("should not be called", UsageCounts::default()));
        let emitter = Emitter::disabled("req-budget".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let messages = vec![Message::user("Explain quantum entanglement in detail")];
        let result = run(&ctx, "Explain quantum entanglement in detail", &messages, &RequestOptions::default()).await;

        assert!(matches!(result, Err(CascadeError::BudgetExceeded)));
    }

    #[tokio::test]
    async fn scenario_s4_high_risk_tool_forces_escalation() {
        let cfg = config();
        let registry = Registry::new();
        let call = ToolCall { id: "1".into(), name: "delete_user".into(), arguments: serde_json::Value::Null };
        let drafter = Arc::new(
            StubProvider::ok("", UsageCounts { prompt_tokens: 10, completion_tokens: 5, reasoning_tokens: None })
                .with_tool_call(call),
        );
        let verifier = Arc::new(StubProvider::ok("Confirmed deletion after review.", UsageCounts { prompt_tokens: 10, completion_tokens: 5, reasoning_tokens: None }));
        let emitter = Emitter::disabled("req-3".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let tools = vec![ToolSpec {
            name: "delete_user".into(),
            description: "permanently deletes a user account".into(),
            parameters: serde_json::Value::Null,
        }];
        let options = RequestOptions { tools, ..Default::default() };
        let messages = vec![Message::user("please remove this account")];
        let result = run(&ctx, "please remove this account", &messages, &options).await.unwrap();

        assert!(!result.draft_accepted);
        assert_eq!(result.model_used, "test/verify");
    }

    #[tokio::test]
    async fn scenario_s2_expert_bypass_direct_to_verifier() {
        let mut cfg = config();
        cfg.pre_router_policy.skip_drafter_for_hard = true;
        let registry = Registry::new();
        let drafter = Arc::new(StubProvider::ok("should not be called", UsageCounts::default()));
        let verifier = Arc::new(StubProvider::ok(
            "A full Byzantine consensus design with safety and liveness proofs follows.",
            UsageCounts { prompt_tokens: 50, completion_tokens: 300, reasoning_tokens: None },
        ));
        let emitter = Emitter::disabled("req-4".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let text = "Design a Byzantine consensus protocol with proofs of safety and liveness under partial synchrony";
        let messages = vec![Message::user(text)];
        let result = run(&ctx, text, &messages, &RequestOptions::default()).await.unwrap();

        assert_eq!(result.routing_strategy, RoutingStrategy::Direct);
        assert_eq!(result.model_used, "test/verify");
        assert_eq!(result.cost.draft_cost, 0.0);
        assert_eq!(result.latencies.draft_ms, 0);
    }

    #[tokio::test]
    async fn speculative_verify_escalates_using_the_backgrounded_verifier_call() {
        let mut cfg = config();
        cfg.speculative_verify = true;
        let registry = Registry::new();
        let drafter = Arc::new(StubProvider::ok("idk", UsageCounts { prompt_tokens: 20, completion_tokens: 2, reasoning_tokens: None }));
        let verifier = Arc::new(StubProvider::ok(
            "Quantum entanglement is a correlation between particles.",
            UsageCounts { prompt_tokens: 25, completion_tokens: 60, reasoning_tokens: None },
        ));
        let emitter = Emitter::disabled("req-spec-1".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let messages = vec![Message::user("Explain quantum entanglement in detail")];
        let result = run(&ctx, "Explain quantum entanglement in detail", &messages, &RequestOptions::default())
            .await
            .unwrap();

        assert!(!result.draft_accepted);
        assert_eq!(result.model_used, "test/verify");
        assert!(result.cost.verifier_cost > 0.0);
    }

    #[tokio::test]
    async fn speculative_verify_contributes_no_cost_when_the_draft_is_accepted() {
        let mut cfg = config();
        cfg.speculative_verify = true;
        let registry = Registry::new();
        let drafter = Arc::new(StubProvider::ok("4", UsageCounts { prompt_tokens: 6, completion_tokens: 1, reasoning_tokens: None }));
        let verifier = Arc::new(StubProvider::ok("should be aborted", UsageCounts { prompt_tokens: 999, completion_tokens: 999, reasoning_tokens: None }));
        let emitter = Emitter::disabled("req-spec-2".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let messages = vec![Message::user("What is 2+2?")];
        let result = run(&ctx, "What is 2+2?", &messages, &RequestOptions::default()).await.unwrap();

        assert!(result.draft_accepted);
        assert_eq!(result.cost.verifier_cost, 0.0);
    }

    #[tokio::test]
    async fn tier_monotonicity_model_used_is_drafter_or_verifier() {
        let cfg = config();
        let registry = Registry::new();
        let drafter = Arc::new(StubProvider::ok("Yes, because it works.", UsageCounts { prompt_tokens: 10, completion_tokens: 10, reasoning_tokens: None }));
        let verifier = Arc::new(StubProvider::ok("verifier text", UsageCounts::default()));
        let emitter = Emitter::disabled("req-5".into());
        let ctx = CascadeContext {
            config: &cfg,
            registry: &registry,
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            emitter: &emitter,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };
        let messages = vec![Message::user("short question")];
        let result = run(&ctx, "short question", &messages, &RequestOptions::default()).await.unwrap();
        assert!(result.model_used == "test/draft" || result.model_used == "test/verify");
    }
}
