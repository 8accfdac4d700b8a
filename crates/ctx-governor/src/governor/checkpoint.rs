//! Checkpoint emission and acknowledgment.
//!
//! On an `emergency_reset` decision the [`CheckpointCoordinator`] hands a
//! [`Checkpoint`] to a [`CheckpointSink`] and marks it pending. The session is
//! reset only when the caller later calls `acknowledge(epoch)` after the sink
//! has made the checkpoint durable. Emission and acknowledgment are separate
//! messages, so any persistence backend can sit behind the sink.
//!
//! While a checkpoint is pending no second one is emitted. If the
//! acknowledgment is late, the coordinator logs an advisory once and the
//! caller proceeds; nothing here blocks or sleeps.

use crate::context::pressure::PressureTier;
use crate::error::{GovernorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{info, warn};

// ── Checkpoint ────────────────────────────────────────────────────

/// Why a checkpoint was requested.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointReason {
    /// Usage reached the CRITICAL tier.
    CriticalPressure,
    /// The circuit breaker tripped after sustained high pressure.
    BreakerTripped,
}

/// Snapshot request emitted immediately before a forced reset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub session_id: String,
    pub reason: CheckpointReason,
    pub tier_at_emission: PressureTier,
    /// Epoch the checkpoint belongs to; echo it back in `acknowledge`.
    pub epoch: u64,
    /// Usage at emission.
    pub usage: u64,
    pub ratio: f64,
    /// RFC 3339 emission time.
    pub timestamp: String,
}

// ── Sinks ─────────────────────────────────────────────────────────

/// Destination for emitted checkpoints.
///
/// `save` hands the checkpoint over; durability is confirmed separately by
/// calling `acknowledge` on the session. `load` lets a caller resume after a
/// reset.
pub trait CheckpointSink: Send + Sync {
    fn save(&self, checkpoint: &Checkpoint) -> Result<()>;

    fn load(&self, session_id: &str) -> Option<Checkpoint>;
}

/// In-process sink keeping the latest checkpoint per session.
#[derive(Debug, Default)]
pub struct MemorySink {
    latest: Mutex<HashMap<String, Checkpoint>>,
    saved: Mutex<Vec<Checkpoint>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every checkpoint saved so far, in order.
    pub fn saved(&self) -> Vec<Checkpoint> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl CheckpointSink for MemorySink {
    fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(checkpoint.session_id.clone(), checkpoint.clone());
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(checkpoint.clone());
        Ok(())
    }

    fn load(&self, session_id: &str) -> Option<Checkpoint> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_id)
            .cloned()
    }
}

/// Sink that forwards checkpoints over an unbounded tokio channel.
///
/// The receiving task persists each checkpoint and then acknowledges the
/// originating session. `save` never blocks. `load` serves the latest
/// checkpoint forwarded for a session.
#[derive(Debug)]
pub struct ChannelSink {
    tx: UnboundedSender<Checkpoint>,
    latest: Mutex<HashMap<String, Checkpoint>>,
}

impl ChannelSink {
    /// Create a sink and the receiver the persistence task drains.
    pub fn new() -> (Self, UnboundedReceiver<Checkpoint>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                tx,
                latest: Mutex::new(HashMap::new()),
            },
            rx,
        )
    }
}

impl CheckpointSink for ChannelSink {
    fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.tx
            .send(checkpoint.clone())
            .map_err(|_| GovernorError::Sink("checkpoint receiver dropped".into()))?;
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(checkpoint.session_id.clone(), checkpoint.clone());
        Ok(())
    }

    fn load(&self, session_id: &str) -> Option<Checkpoint> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_id)
            .cloned()
    }
}

// ── Coordinator ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Pending {
    epoch: u64,
    emitted_at: Instant,
    overdue_reported: bool,
}

/// Acknowledgment wait state after [`CheckpointCoordinator::check_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckWait {
    /// Nothing pending.
    Idle,
    /// Pending and within the timeout.
    Waiting,
    /// Pending past the timeout; first time this is observed.
    TimedOut { epoch: u64, waited: Duration },
    /// Pending past the timeout; already reported.
    Overdue,
}

/// Guards checkpoint emission and tracks the pending acknowledgment.
#[derive(Debug, Clone)]
pub struct CheckpointCoordinator {
    pending: Option<Pending>,
    ack_timeout: Duration,
}

impl CheckpointCoordinator {
    pub fn new(ack_timeout: Duration) -> Self {
        Self {
            pending: None,
            ack_timeout,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_epoch(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.epoch)
    }

    /// Whether a checkpoint for `epoch` (or a later one) is pending.
    ///
    /// A checkpoint left over from an earlier epoch does not count: the
    /// session has been reset since, so it no longer blocks emission.
    pub fn is_pending_for(&self, epoch: u64) -> bool {
        self.pending.as_ref().is_some_and(|p| p.epoch >= epoch)
    }

    /// Hand `checkpoint` to `sink` unless one is already pending for its epoch.
    ///
    /// A pending checkpoint from an earlier epoch is superseded. Returns
    /// `Ok(true)` if emitted. A sink failure leaves the pending state as it
    /// was, so the next emergency decision retries.
    pub fn emit(&mut self, checkpoint: &Checkpoint, sink: &dyn CheckpointSink) -> Result<bool> {
        if self.is_pending_for(checkpoint.epoch) {
            return Ok(false);
        }
        sink.save(checkpoint)?;
        if let Some(stale) = self.pending_epoch() {
            info!(
                "checkpoint for epoch {stale} superseded by epoch {}",
                checkpoint.epoch
            );
        }
        warn!(
            "checkpoint requested for session '{}' (epoch {}, {:?} at {:.0}% usage)",
            checkpoint.session_id,
            checkpoint.epoch,
            checkpoint.reason,
            checkpoint.ratio * 100.0
        );
        self.pending = Some(Pending {
            epoch: checkpoint.epoch,
            emitted_at: Instant::now(),
            overdue_reported: false,
        });
        Ok(true)
    }

    /// Clear the pending checkpoint for `epoch`.
    ///
    /// Returns `Ok(false)` when nothing is pending and
    /// [`GovernorError::EpochMismatch`] when `epoch` is not the pending one.
    pub fn acknowledge(&mut self, epoch: u64) -> Result<bool> {
        match &self.pending {
            None => Ok(false),
            Some(p) if p.epoch != epoch => Err(GovernorError::EpochMismatch {
                pending: p.epoch,
                acknowledged: epoch,
            }),
            Some(p) => {
                info!(
                    "checkpoint for epoch {epoch} acknowledged after {:?}",
                    p.emitted_at.elapsed()
                );
                self.pending = None;
                Ok(true)
            }
        }
    }

    /// Whether a pending checkpoint has outlived the timeout at `now`.
    pub fn is_overdue(&self, now: Instant) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.emitted_at) >= self.ack_timeout)
    }

    /// Check the pending acknowledgment against the timeout at `now`.
    pub fn check_overdue(&mut self, now: Instant) -> AckWait {
        let timeout = self.ack_timeout;
        let Some(p) = self.pending.as_mut() else {
            return AckWait::Idle;
        };
        let waited = now.saturating_duration_since(p.emitted_at);
        if waited < timeout {
            return AckWait::Waiting;
        }
        if p.overdue_reported {
            return AckWait::Overdue;
        }
        p.overdue_reported = true;
        warn!(
            "checkpoint for epoch {} not acknowledged after {waited:?}; proceeding without reset",
            p.epoch
        );
        AckWait::TimedOut {
            epoch: p.epoch,
            waited,
        }
    }
}
