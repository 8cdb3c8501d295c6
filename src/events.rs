//! Event/Trace Emitter (C11).
//!
//! An `mpsc::UnboundedSender<TraceEvent>`-based emitter, modeled after the
//! teacher's `TrafficLog` (`examples/electricessence-claw-router/src/traffic.rs`) — an append-only
//! record of what happened per request — but push-based rather than
//! poll-based, since spec §5 requires per-request events to be totally
//! ordered by a monotone sequence number for streaming consumers, which a
//! polled ring buffer can't guarantee.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Which component emitted a [`TraceEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Admission,
    Guardrails,
    PreRouter,
    Classifier,
    Drafter,
    QualityValidator,
    ToolRisk,
    Verifier,
    CostCalculator,
    Cascade,
}

#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub request_id: String,
    pub identity: Option<String>,
    pub component: Component,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Per-request monotone sequence counter plus the channel sender, cloned
/// cheaply into every component that needs to emit (spec §5: "events from
/// C11 are totally ordered by monotone sequence" within one request).
#[derive(Clone)]
pub struct Emitter {
    request_id: String,
    identity: Option<String>,
    sequence: Arc<AtomicU64>,
    sender: Option<mpsc::UnboundedSender<TraceEvent>>,
}

impl Emitter {
    pub fn new(request_id: String, identity: Option<String>, sender: Option<mpsc::UnboundedSender<TraceEvent>>) -> Self {
        Self { request_id, identity, sequence: Arc::new(AtomicU64::new(0)), sender }
    }

    /// An emitter with no attached sink — emissions are silently dropped.
    /// Used for requests that opt out of tracing (`trace: false` per spec §6).
    pub fn disabled(request_id: String) -> Self {
        Self::new(request_id, None, None)
    }

    pub fn emit(&self, component: Component, message: impl Into<String>) {
        let Some(sender) = &self.sender else { return };
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let _ = sender.send(TraceEvent {
            request_id: self.request_id.clone(),
            identity: self.identity.clone(),
            component,
            sequence,
            timestamp: Utc::now(),
            message: message.into(),
        });
    }
}

/// Create a channel + sink pair. The returned [`mpsc::UnboundedReceiver`]
/// is the caller's sink; `Agent` holds the sender side via [`Emitter`].
pub fn channel() -> (mpsc::UnboundedSender<TraceEvent>, mpsc::UnboundedReceiver<TraceEvent>) {
    mpsc::unbounded_channel()
}
