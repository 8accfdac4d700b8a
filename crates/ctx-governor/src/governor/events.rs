//! Events and handlers for observing sessions.
//!
//! A [`Session`](super::session::Session) reports what it decided through
//! [`GovernorEvent`] variants. Implement [`EventHandler`] to forward them to
//! logs, metrics or an orchestrator.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or sessions nobody watches |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures |
//! | [`CompositeEventHandler`] | Compose several handlers in order |

use super::breaker::Action;
use super::checkpoint::Checkpoint;
use crate::context::pressure::PressureTier;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Events emitted by a session.
#[derive(Debug)]
pub enum GovernorEvent<'a> {
    /// A usage report was accepted.
    UsageReported {
        session_id: &'a str,
        usage: u64,
        ratio: f64,
        action: Action,
    },
    /// The pressure tier differs from the previous report's.
    TierChanged {
        session_id: &'a str,
        from: PressureTier,
        to: PressureTier,
    },
    /// The circuit breaker tripped on this report.
    BreakerTripped {
        session_id: &'a str,
        consecutive: u32,
    },
    /// A checkpoint was handed to the sink and is awaiting acknowledgment.
    CheckpointEmitted { checkpoint: &'a Checkpoint },
    /// A pending checkpoint was acknowledged.
    CheckpointAcknowledged { session_id: &'a str, epoch: u64 },
    /// A pending checkpoint outlived the acknowledgment timeout.
    AckTimedOut {
        session_id: &'a str,
        epoch: u64,
        waited: Duration,
    },
    /// Usage, history and breaker were cleared; `epoch` is the new epoch.
    SessionReset { session_id: &'a str, epoch: u64 },
}

/// Handler for session events. The default implementation ignores them.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &GovernorEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```
/// use ctx_governor::governor::events::{FnEventHandler, GovernorEvent};
///
/// let handler = FnEventHandler::new(|event| {
///     if let GovernorEvent::BreakerTripped { session_id, .. } = event {
///         eprintln!("{session_id} needs a fresh worker");
///     }
/// });
/// # let _ = handler;
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&GovernorEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&GovernorEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&GovernorEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &GovernorEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to every inner handler, in registration order.
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Add a handler only when `condition` holds, keeping the builder chain.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &GovernorEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// Logs every event through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &GovernorEvent<'_>) {
        match event {
            GovernorEvent::UsageReported {
                session_id,
                usage,
                ratio,
                action,
            } => {
                debug!(
                    "[{session_id}] usage {usage} ({:.1}%), action {action}",
                    ratio * 100.0
                );
            }
            GovernorEvent::TierChanged {
                session_id,
                from,
                to,
            } => {
                info!("[{session_id}] pressure {from} -> {to}");
            }
            GovernorEvent::BreakerTripped {
                session_id,
                consecutive,
            } => {
                warn!(
                    "[{session_id}] circuit breaker tripped after {consecutive} high-pressure reports"
                );
            }
            GovernorEvent::CheckpointEmitted { checkpoint } => {
                info!(
                    "[{}] checkpoint emitted for epoch {} ({:?})",
                    checkpoint.session_id, checkpoint.epoch, checkpoint.reason
                );
            }
            GovernorEvent::CheckpointAcknowledged { session_id, epoch } => {
                info!("[{session_id}] checkpoint for epoch {epoch} acknowledged");
            }
            GovernorEvent::AckTimedOut {
                session_id,
                epoch,
                waited,
            } => {
                warn!(
                    "[{session_id}] checkpoint for epoch {epoch} unacknowledged after {waited:?}"
                );
            }
            GovernorEvent::SessionReset { session_id, epoch } => {
                info!("[{session_id}] reset; now at epoch {epoch}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn reset_event() -> GovernorEvent<'static> {
        GovernorEvent::SessionReset {
            session_id: "s",
            epoch: 1,
        }
    }

    #[test]
    fn fn_handler_receives_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handler = FnEventHandler::new(move |event| {
            if matches!(event, GovernorEvent::SessionReset { .. }) {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        handler.on_event(&reset_event());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn composite_dispatches_to_all() {
        let count = Arc::new(AtomicUsize::new(0));
        let (a, b) = (count.clone(), count.clone());
        let handler = CompositeEventHandler::new()
            .with(FnEventHandler::new(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            }))
            .with(LoggingHandler)
            .with_if(false, NoopHandler)
            .with(FnEventHandler::new(move |_| {
                b.fetch_add(10, Ordering::SeqCst);
            }));
        handler.on_event(&reset_event());
        assert_eq!(count.load(Ordering::SeqCst), 11);
    }
}
