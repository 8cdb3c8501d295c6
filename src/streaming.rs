//! Streaming Engine (C10).
//!
//! Same decisions as [`crate::cascade`], replayed incrementally: drafter
//! chunks are forwarded as they arrive, a `draft-decision` event reports
//! whether the streamed prefix stands, and — on rejection — a `switch`
//! event precedes the verifier's own chunks (spec §4.10). Built as a task
//! pushing onto an unbounded channel, polled via `futures_util::stream::poll_fn`
//! rather than pulling in an extra stream-adapter crate, in the same
//! "generalise what's already a dependency" spirit as the rest of this
//! transformation.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cascade::RequestOptions;
use crate::config::CascadeConfig;
use crate::cost;
use crate::error::{CascadeError, ProviderErrorKind};
use crate::events::Component;
use crate::guardrails;
use crate::provider::{ChatOptions, FinishReason, ProviderEvent};
use crate::quality::{self, ProviderSignals};
use crate::registry::Registry;
use crate::tool_risk;
use crate::types::{
    Complexity, Latencies, Message, QualityReason, QualityVerdict, RiskTag, RoutingStrategy,
    StreamEvent, ToolCall, UsageCounts,
};
use crate::{classifier, prerouter};

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Run a streaming request. Returns immediately with the event stream; the
/// actual work happens in a spawned task feeding an internal channel.
pub fn run(
    ctx: CascadeOwnedContext,
    user_text: String,
    messages: Vec<Message>,
    options: RequestOptions,
) -> EventStream {
    let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
    tokio::spawn(async move {
        drive(ctx, user_text, messages, options, tx).await;
    });

    let mut rx = rx;
    Box::pin(futures_util::stream::poll_fn(move |cx| rx.poll_recv(cx)))
}

/// An owned variant of [`CascadeContext`] — streaming spawns a task that
/// must outlive the borrow a request-scoped context would otherwise need.
#[derive(Clone)]
pub struct CascadeOwnedContext {
    pub config: Arc<CascadeConfig>,
    pub registry: Arc<Registry>,
    pub drafter_client: Option<Arc<dyn crate::provider::ProviderClient>>,
    pub verifier_client: Arc<dyn crate::provider::ProviderClient>,
    pub embedder: Option<Arc<dyn crate::provider::EmbeddingClient>>,
    pub cancel: CancellationToken,
    /// Applied as a per-chunk idle timeout: if a provider's stream stalls
    /// longer than this between events, the call is treated as timed out
    /// (spec §5 "per-model ... applies to each provider call", adapted to a
    /// streaming call's lack of one single completion point).
    pub per_model_timeout: Option<Duration>,
}

async fn drive(
    ctx: CascadeOwnedContext,
    user_text: String,
    messages: Vec<Message>,
    options: RequestOptions,
    tx: mpsc::UnboundedSender<StreamEvent>,
) {
    let overall_start = Instant::now();
    let _ = tx.send(StreamEvent::Start);

    let guardrail_result = guardrails::check(&user_text, None);
    if !guardrail_result.is_safe {
        let _ = tx.send(StreamEvent::Error {
            kind: "guardrail".into(),
            message: format!("{} finding(s)", guardrail_result.findings.len()),
        });
        return;
    }

    let complexity_verdict = classifier::classify(&user_text);
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
    let decision = prerouter::route(&ctx.config, &ctx.config.pre_router_policy, &decision_input);

    match decision.decision {
        prerouter::Decision::Reject => {
            let _ = tx.send(StreamEvent::Error { kind: "guardrail".into(), message: decision.rationale.into() });
        }
        prerouter::Decision::DirectToVerifier => {
            let _ = tx.send(StreamEvent::Switch { from: None, to: ctx.config.verifier().key() });
            stream_direct(&ctx, &ctx.verifier_client, &messages, &options, Some(complexity_verdict.label), overall_start, true, &tx).await;
        }
        prerouter::Decision::DirectToDrafter => {
            let client = ctx.drafter_client.clone().expect("direct-to-drafter requires a drafter client");
            stream_direct(&ctx, &client, &messages, &options, Some(complexity_verdict.label), overall_start, false, &tx).await;
        }
        prerouter::Decision::Cascade => {
            stream_cascade(&ctx, &user_text, &messages, &options, complexity_verdict.label, &tool_risk_cache, overall_start, &tx).await;
        }
    }
}

struct Accumulated {
    content: String,
    tool_fragments: HashMap<String, (Option<String>, String)>,
    finish_usage: Option<UsageCounts>,
    errored: Option<(ProviderErrorKind, String)>,
}

/// Forward a provider's raw event stream as [`StreamEvent`] chunks/tool-calls,
/// coalescing tool-call fragments per id until finish (spec §4.10: "a
/// partial fragment is never exposed as a final call").
async fn forward_provider_stream(
    client: &Arc<dyn crate::provider::ProviderClient>,
    messages: &[Message],
    options: &RequestOptions,
    cancel: &CancellationToken,
    per_model_timeout: Option<Duration>,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> Accumulated {
    let chat_options = ChatOptions { max_tokens: options.max_tokens, temperature: options.temperature, tools: options.tools.clone() };
    let mut provider_stream = client.stream(messages, &chat_options).await;

    let mut acc = Accumulated {
        content: String::new(),
        tool_fragments: HashMap::new(),
        finish_usage: None,
        errored: None,
    };

    loop {
        if cancel.is_cancelled() {
            acc.errored = Some((ProviderErrorKind::Cancelled, "cancelled".into()));
            break;
        }

        let next = match per_model_timeout {
            Some(d) => match tokio::time::timeout(d, provider_stream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    acc.errored = Some((ProviderErrorKind::Timeout, "provider stream stalled".into()));
                    break;
                }
            },
            None => provider_stream.next().await,
        };
        let Some(event) = next else { break };

        match event {
            ProviderEvent::Delta(text) => {
                acc.content.push_str(&text);
                let _ = tx.send(StreamEvent::Chunk { delta: text });
            }
            ProviderEvent::ToolFragment { id, name_delta, args_delta } => {
                let entry = acc.tool_fragments.entry(id).or_insert((None, String::new()));
                if let Some(n) = name_delta {
                    entry.0 = Some(entry.0.clone().unwrap_or_default() + &n);
                }
                if let Some(a) = args_delta {
                    entry.1.push_str(&a);
                }
            }
            ProviderEvent::Finish { usage, .. } => {
                acc.finish_usage = Some(usage);
            }
            ProviderEvent::Error { kind, message } => {
                acc.errored = Some((kind, message));
            }
        }
    }

    for (id, (name, args)) in &acc.tool_fragments {
        let call = ToolCall {
            id: id.clone(),
            name: name.clone().unwrap_or_default(),
            arguments: serde_json::from_str(args).unwrap_or(serde_json::Value::Null),
        };
        let _ = tx.send(StreamEvent::ToolCall { call });
    }

    acc
}

#[allow(clippy::too_many_arguments)]
async fn stream_direct(
    ctx: &CascadeOwnedContext,
    client: &Arc<dyn crate::provider::ProviderClient>,
    messages: &[Message],
    options: &RequestOptions,
    complexity: Option<Complexity>,
    overall_start: Instant,
    to_verifier: bool,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) {
    let start = Instant::now();
    let acc = forward_provider_stream(client, messages, options, &ctx.cancel, ctx.per_model_timeout, tx).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if let Some((kind, message)) = acc.errored {
        if kind == ProviderErrorKind::Cancelled {
            let _ = tx.send(StreamEvent::Error { kind: "cancelled".into(), message: "request cancelled".into() });
        } else {
            let _ = tx.send(StreamEvent::Error { kind: kind.to_string(), message });
        }
        return;
    }

    let usage = acc.finish_usage.unwrap_or_default();
    let model = if to_verifier { ctx.config.verifier().clone() } else { ctx.config.drafter().clone() };
    let verifier_model = ctx.config.verifier();
    let cost = if to_verifier {
        cost::compute_cost(None, Some((usage, &model)), verifier_model, false)
    } else {
        cost::compute_cost(Some((usage, &model)), None, verifier_model, false)
    };

    let result = crate::types::CascadeResult {
        content: acc.content,
        tool_calls: vec![],
        model_used: model.key(),
        routing_strategy: RoutingStrategy::Direct,
        cascaded: false,
        draft_accepted: !to_verifier,
        complexity,
        quality_verdict: None,
        draft_usage: if to_verifier { None } else { Some(usage) },
        verifier_usage: if to_verifier { Some(usage) } else { None },
        cost,
        latencies: Latencies {
            total_ms: overall_start.elapsed().as_millis() as u64,
            draft_ms: if to_verifier { 0 } else { elapsed_ms },
            verifier_ms: if to_verifier { elapsed_ms } else { 0 },
            cascade_overhead_ms: 0,
        },
    };
    let _ = tx.send(StreamEvent::Complete { result: Box::new(result) });
}

#[allow(clippy::too_many_arguments)]
async fn stream_cascade(
    ctx: &CascadeOwnedContext,
    user_text: &str,
    messages: &[Message],
    options: &RequestOptions,
    complexity: Complexity,
    tool_risk_cache: &HashMap<String, RiskTag>,
    overall_start: Instant,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) {
    let drafter = ctx.config.drafter().clone();
    let drafter_client = ctx.drafter_client.clone().expect("cascade decision requires a drafter client");

    let draft_start = Instant::now();
    let acc = forward_provider_stream(&drafter_client, messages, options, &ctx.cancel, ctx.per_model_timeout, tx).await;
    let draft_ms = draft_start.elapsed().as_millis() as u64;

    if let Some((kind, _)) = &acc.errored {
        if *kind == ProviderErrorKind::Cancelled {
            let _ = tx.send(StreamEvent::Error { kind: "cancelled".into(), message: "request cancelled".into() });
            return;
        }
        // Drafter failure degrades to silent rejection, same as the
        // non-streaming controller.
    }

    let draft_usage = acc.finish_usage.unwrap_or_default();
    let tool_calls: Vec<ToolCall> = acc
        .tool_fragments
        .iter()
        .map(|(id, (name, args))| ToolCall {
            id: id.clone(),
            name: name.clone().unwrap_or_default(),
            arguments: serde_json::from_str(args).unwrap_or(serde_json::Value::Null),
        })
        .collect();
    let tagged_calls: Vec<(ToolCall, RiskTag)> = tool_calls
        .iter()
        .map(|c| (c.clone(), tool_risk_cache.get(&c.name).copied().unwrap_or(RiskTag::Medium)))
        .collect();

    let verdict = if acc.errored.is_some() {
        QualityVerdict { passed: false, score: 0.0, reason: QualityReason::TooShort, signals: Default::default() }
    } else {
        let semantic_score = quality::resolve_semantic_score(
            ctx.embedder.as_ref(),
            &ctx.config.quality_policy,
            user_text,
            &acc.content,
        )
        .await;
        quality::validate(
            &acc.content,
            &tagged_calls,
            Some(complexity),
            &ctx.config.quality_policy,
            None::<&ProviderSignals>,
            semantic_score,
        )
    };
    let forces_escalation = tagged_calls.iter().any(|(_, risk)| risk.forces_escalation());
    let accepted = verdict.passed && !forces_escalation;

    let _ = tx.send(StreamEvent::DraftDecision { accepted, score: verdict.score, confidence: complexity_confidence(&verdict) });

    if accepted {
        let verifier_model = ctx.config.verifier();
        let cost = cost::compute_cost(Some((draft_usage, &drafter)), None, verifier_model, false);
        let result = crate::types::CascadeResult {
            content: acc.content,
            tool_calls,
            model_used: drafter.key(),
            routing_strategy: RoutingStrategy::Cascade,
            cascaded: false,
            draft_accepted: true,
            complexity: Some(complexity),
            quality_verdict: Some(verdict),
            draft_usage: Some(draft_usage),
            verifier_usage: None,
            cost,
            latencies: Latencies {
                total_ms: overall_start.elapsed().as_millis() as u64,
                draft_ms,
                verifier_ms: 0,
                cascade_overhead_ms: 0,
            },
        };
        let _ = tx.send(StreamEvent::Complete { result: Box::new(result) });
        return;
    }

    let verifier = ctx.config.verifier().clone();

    // Budget gate (spec §7 `ErrBudgetExceeded`), mirrored from the
    // non-streaming controller: abort between tiers if the draft cost
    // already incurred plus a projection of the verifier call would exceed
    // the configured per-request ceiling.
    if let Some(max_total_cost) = ctx.config.budget_policy.max_total_cost_per_request {
        let draft_cost_so_far = cost::project_cost(&drafter, draft_usage.prompt_tokens, draft_usage.completion_tokens);
        let projected_completion_tokens =
            options.max_tokens.map(|t| t as u64).unwrap_or_else(|| draft_usage.completion_tokens.max(1));
        let projected_verifier_cost =
            cost::project_cost(&verifier, draft_usage.prompt_tokens, projected_completion_tokens);
        if draft_cost_so_far + projected_verifier_cost > max_total_cost {
            let _ = tx.send(StreamEvent::Error {
                kind: "budget_exceeded".into(),
                message: "projected cost exceeds per-request budget".into(),
            });
            return;
        }
    }

    let _ = tx.send(StreamEvent::Switch { from: Some(drafter.key()), to: verifier.key() });

    let verify_start = Instant::now();
    let verify_acc = forward_provider_stream(&ctx.verifier_client, messages, options, &ctx.cancel, ctx.per_model_timeout, tx).await;
    let verifier_ms = verify_start.elapsed().as_millis() as u64;

    if let Some((kind, message)) = verify_acc.errored {
        let label = if kind == ProviderErrorKind::Cancelled { "cancelled".to_string() } else { kind.to_string() };
        let _ = tx.send(StreamEvent::Error { kind: label, message });
        return;
    }

    let verifier_usage = verify_acc.finish_usage.unwrap_or_default();
    let cost = cost::compute_cost(Some((draft_usage, &drafter)), Some((verifier_usage, &verifier)), &verifier, false);
    let result = crate::types::CascadeResult {
        content: verify_acc.content,
        tool_calls: vec![],
        model_used: verifier.key(),
        routing_strategy: RoutingStrategy::Cascade,
        cascaded: true,
        draft_accepted: false,
        complexity: Some(complexity),
        quality_verdict: Some(verdict),
        draft_usage: Some(draft_usage),
        verifier_usage: Some(verifier_usage),
        cost,
        latencies: Latencies {
            total_ms: overall_start.elapsed().as_millis() as u64,
            draft_ms,
            verifier_ms,
            cascade_overhead_ms: draft_ms,
        },
    };
    let _ = tx.send(StreamEvent::Complete { result: Box::new(result) });
}

fn complexity_confidence(verdict: &QualityVerdict) -> f64 {
    verdict.signals.get("confidence").copied().unwrap_or(verdict.score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityPolicy;
    use crate::provider::testing::StubProvider;
    use std::collections::HashMap;

    fn model(key: &str) -> crate::types::ModelDescriptor {
        crate::types::ModelDescriptor {
            provider: "test".into(),
            model: key.into(),
            input_price_per_m: 0.15,
            output_price_per_m: 0.6,
            quality_threshold_override: None,
            feature_overrides: None,
        }
    }

    fn config() -> CascadeConfig {
        CascadeConfig {
            models: vec![model("draft"), model("verify")],
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
    async fn scenario_s7_streaming_order_on_rejection() {
        let drafter = Arc::new(StubProvider::ok("idk", UsageCounts { prompt_tokens: 5, completion_tokens: 1, reasoning_tokens: None }));
        let verifier = Arc::new(StubProvider::ok(
            "A fuller explanation follows with supporting detail.",
            UsageCounts { prompt_tokens: 10, completion_tokens: 20, reasoning_tokens: None },
        ));
        let ctx = CascadeOwnedContext {
            config: Arc::new(config()),
            registry: Arc::new(Registry::new()),
            drafter_client: Some(drafter),
            verifier_client: verifier,
            embedder: None,
            cancel: CancellationToken::new(),
            per_model_timeout: None,
        };

        let mut stream =
            run(ctx, "Explain quantum entanglement in detail".into(), vec![Message::user("Explain quantum entanglement in detail")], RequestOptions::default());

        let mut kinds = Vec::new();
        while let Some(event) = stream.next().await {
            let is_terminal = matches!(event, StreamEvent::Complete { .. } | StreamEvent::Error { .. });
            kinds.push(match event {
                StreamEvent::Start => "start",
                StreamEvent::Chunk { .. } => "chunk",
                StreamEvent::ToolCall { .. } => "tool-call",
                StreamEvent::DraftDecision { .. } => "draft-decision",
                StreamEvent::Switch { .. } => "switch",
                StreamEvent::Complete { .. } => "complete",
                StreamEvent::Error { .. } => "error",
            });
            if is_terminal {
                break;
            }
        }

        assert_eq!(kinds.first(), Some(&"start"));
        assert!(kinds.contains(&"draft-decision"));
        assert!(kinds.contains(&"switch"));
        assert_eq!(kinds.last(), Some(&"complete"));
    }
}
