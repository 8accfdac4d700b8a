//! Cumulative usage tracking with a bounded sample history.
//!
//! [`UsageTracker`] accepts absolute cumulative totals. Totals may only grow
//! between resets; a lower total is rejected rather than clamped so a real
//! drop in tracked consumption is never masked.

use crate::error::{GovernorError, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One recorded usage reading.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Position of this report within the tracker's lifetime.
    pub seq: u64,
    /// Absolute cumulative usage at this report.
    pub usage: u64,
}

// ── HistoryRing ───────────────────────────────────────────────────

/// Fixed-capacity circular buffer of samples. Once full, each push
/// overwrites the oldest slot.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    slots: Vec<Sample>,
    capacity: usize,
    /// Index the next push writes to.
    head: usize,
}

impl HistoryRing {
    /// Create an empty ring. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.slots.len() < self.capacity {
            self.slots.push(sample);
        } else {
            self.slots[self.head] = sample;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<Sample> {
        if self.slots.is_empty() {
            return None;
        }
        let idx = (self.head + self.capacity - 1) % self.capacity;
        self.slots.get(idx).copied()
    }

    /// Iterate samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        // Until the ring wraps, `head == len` and the oldest entry is slot 0.
        let start = if self.slots.len() < self.capacity {
            0
        } else {
            self.head
        };
        let (newer, older) = self.slots.split_at(start);
        older.iter().chain(newer.iter())
    }

    /// Samples oldest first, collected.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.iter().copied().collect()
    }
}

// ── UsageTracker ──────────────────────────────────────────────────

/// Tracks a session's cumulative consumption against a fixed capacity.
#[derive(Debug, Clone)]
pub struct UsageTracker {
    capacity: u64,
    usage: u64,
    history: HistoryRing,
    epoch: u64,
    next_seq: u64,
}

impl UsageTracker {
    /// Create a tracker. `capacity` must be positive.
    pub fn new(capacity: u64, history_window: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(GovernorError::InvalidCapacity { capacity });
        }
        Ok(Self {
            capacity,
            usage: 0,
            history: HistoryRing::new(history_window),
            epoch: 0,
            next_seq: 0,
        })
    }

    /// Record a new absolute cumulative total.
    ///
    /// Returns [`GovernorError::RegressedUsage`] if `new_total` is below the
    /// current usage; state is unchanged in that case.
    pub fn report(&mut self, new_total: u64) -> Result<Sample> {
        if new_total < self.usage {
            return Err(GovernorError::RegressedUsage {
                current: self.usage,
                reported: new_total,
            });
        }
        let sample = Sample {
            seq: self.next_seq,
            usage: new_total,
        };
        self.next_seq += 1;
        self.usage = new_total;
        self.history.push(sample);
        trace!(
            "usage sample #{} = {} ({:.1}% of {})",
            sample.seq,
            new_total,
            self.ratio() * 100.0,
            self.capacity
        );
        Ok(sample)
    }

    /// Usage as a fraction of capacity. May exceed 1.0.
    pub fn ratio(&self) -> f64 {
        self.usage as f64 / self.capacity as f64
    }

    /// Zero usage, clear history and advance the epoch.
    pub fn reset(&mut self) {
        self.usage = 0;
        self.history.clear();
        self.epoch += 1;
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn usage(&self) -> u64 {
        self.usage
    }

    /// `capacity - usage`; negative once usage overruns capacity.
    ///
    /// Saturates at `i64::MIN` / `i64::MAX` for differences outside `i64`.
    pub fn headroom(&self) -> i64 {
        let diff = i128::from(self.capacity) - i128::from(self.usage);
        i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn history(&self) -> &HistoryRing {
        &self.history
    }
}
