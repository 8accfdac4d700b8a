//! Circuit breaker and the tier-driven response state machine.

use crate::context::pressure::PressureTier;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

// ── States and actions ────────────────────────────────────────────

/// Governor state, one per pressure tier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernorState {
    Normal,
    Watch,
    Constrained,
    Breach,
}

impl GovernorState {
    pub fn from_tier(tier: PressureTier) -> Self {
        match tier {
            PressureTier::Low => GovernorState::Normal,
            PressureTier::Moderate => GovernorState::Watch,
            PressureTier::High => GovernorState::Constrained,
            PressureTier::Critical => GovernorState::Breach,
        }
    }

    pub fn action(self) -> Action {
        match self {
            GovernorState::Normal => Action::Continue,
            GovernorState::Watch => Action::MonitorClosely,
            GovernorState::Constrained => Action::OptimizeProactively,
            GovernorState::Breach => Action::EmergencyReset,
        }
    }
}

/// Recommended next step for the caller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Continue,
    MonitorClosely,
    OptimizeProactively,
    EmergencyReset,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Continue => "continue",
            Action::MonitorClosely => "monitor_closely",
            Action::OptimizeProactively => "optimize_proactively",
            Action::EmergencyReset => "emergency_reset",
        })
    }
}

// ── CircuitBreaker ────────────────────────────────────────────────

/// Trips after `trip_threshold` consecutive HIGH/CRITICAL readings.
///
/// Once tripped it stays tripped until [`reset`](Self::reset), which only the
/// checkpoint acknowledgment path calls.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    consecutive_high_pressure: u32,
    tripped: bool,
    trip_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(trip_threshold: u32) -> Self {
        Self {
            consecutive_high_pressure: 0,
            tripped: false,
            trip_threshold: trip_threshold.max(1),
        }
    }

    /// Record one reading. Returns `true` only on the reading that trips.
    pub fn observe(&mut self, tier: PressureTier) -> bool {
        if tier.is_sustained_pressure() {
            self.consecutive_high_pressure = self.consecutive_high_pressure.saturating_add(1);
        } else {
            self.consecutive_high_pressure = 0;
        }

        if !self.tripped && self.consecutive_high_pressure >= self.trip_threshold {
            self.tripped = true;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.consecutive_high_pressure = 0;
        self.tripped = false;
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    pub fn consecutive_high_pressure(&self) -> u32 {
        self.consecutive_high_pressure
    }

    pub fn trip_threshold(&self) -> u32 {
        self.trip_threshold
    }
}

// ── ResponseGovernor ──────────────────────────────────────────────

/// Outcome of one [`ResponseGovernor::decide`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub state: GovernorState,
    pub action: Action,
    /// The breaker tripped on this call.
    pub tripped_now: bool,
}

/// Maps tiers to actions, with the breaker overriding while tripped.
#[derive(Debug, Clone)]
pub struct ResponseGovernor {
    breaker: CircuitBreaker,
    state: GovernorState,
}

impl ResponseGovernor {
    pub fn new(trip_threshold: u32) -> Self {
        Self {
            breaker: CircuitBreaker::new(trip_threshold),
            state: GovernorState::Normal,
        }
    }

    /// Update the breaker with `tier`, then choose the action.
    ///
    /// While the breaker is tripped the state is pinned to BREACH and the
    /// action to `emergency_reset`, whatever the instantaneous tier.
    pub fn decide(&mut self, tier: PressureTier) -> Decision {
        let tripped_now = self.breaker.observe(tier);
        if tripped_now {
            warn!(
                "circuit breaker tripped after {} consecutive high-pressure readings",
                self.breaker.consecutive_high_pressure()
            );
        }

        let state = self.state_for(tier);
        if state != self.state {
            debug!("governor state {:?} -> {:?} (tier {tier})", self.state, state);
        }
        self.state = state;

        Decision {
            state,
            action: state.action(),
            tripped_now,
        }
    }

    /// State for `tier` given the current breaker, without updating anything.
    pub fn state_for(&self, tier: PressureTier) -> GovernorState {
        if self.breaker.is_tripped() {
            GovernorState::Breach
        } else {
            GovernorState::from_tier(tier)
        }
    }

    /// Clear the breaker and return to NORMAL.
    pub fn reset(&mut self) {
        self.breaker.reset();
        self.state = GovernorState::Normal;
    }

    pub fn state(&self) -> GovernorState {
        self.state
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}
