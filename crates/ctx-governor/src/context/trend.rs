//! Growth-rate projection over a session's usage history.
//!
//! The projector averages the most recent per-sample deltas and estimates how
//! many more reports fit before usage crosses the safe threshold. Projections
//! are advisory: they add warnings to a status but never change the action.

use crate::context::tracker::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fewer turns than this is critical growth.
const CRITICAL_TURNS: f64 = 5.0;
/// Fewer turns than this is high growth.
const HIGH_TURNS: f64 = 10.0;
/// Fewer turns than this is moderate growth.
const MODERATE_TURNS: f64 = 20.0;

/// How urgent a positive growth rate is.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrowthOutlook {
    CriticalGrowth,
    HighGrowth,
    ModerateGrowth,
    SustainableGrowth,
}

impl GrowthOutlook {
    /// Classify a remaining-turns estimate.
    pub fn from_turns(turns_remaining: f64) -> Self {
        if turns_remaining < CRITICAL_TURNS {
            GrowthOutlook::CriticalGrowth
        } else if turns_remaining < HIGH_TURNS {
            GrowthOutlook::HighGrowth
        } else if turns_remaining < MODERATE_TURNS {
            GrowthOutlook::ModerateGrowth
        } else {
            GrowthOutlook::SustainableGrowth
        }
    }
}

impl fmt::Display for GrowthOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GrowthOutlook::CriticalGrowth => "critical_growth",
            GrowthOutlook::HighGrowth => "high_growth",
            GrowthOutlook::ModerateGrowth => "moderate_growth",
            GrowthOutlook::SustainableGrowth => "sustainable_growth",
        })
    }
}

/// Result of projecting a usage history forward.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "trend", rename_all = "snake_case")]
pub enum Projection {
    /// Fewer than two samples.
    InsufficientData,
    /// Non-positive growth; no finite breach point.
    Stable,
    Growing {
        /// Mean units added per report over the window.
        rate: f64,
        /// Reports left before the threshold is crossed. Zero once crossed.
        turns_remaining: f64,
        outlook: GrowthOutlook,
    },
}

impl Projection {
    /// Advisory warning for urgent growth, if any.
    pub fn warning(&self) -> Option<String> {
        match self {
            Projection::Growing {
                rate,
                turns_remaining,
                outlook: outlook @ (GrowthOutlook::CriticalGrowth | GrowthOutlook::HighGrowth),
            } => Some(format!(
                "{outlook}: ~{turns_remaining:.1} reports until the safe threshold at ~{rate:.0} units/report"
            )),
            _ => None,
        }
    }
}

/// Projects turns-to-breach from recent samples.
#[derive(Debug, Clone, Copy)]
pub struct TrendProjector {
    /// Number of most recent deltas averaged.
    window: usize,
}

impl Default for TrendProjector {
    fn default() -> Self {
        Self { window: 5 }
    }
}

impl TrendProjector {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    /// Project `history` (oldest first) against `threshold_ratio * capacity`.
    pub fn project(&self, history: &[Sample], capacity: u64, threshold_ratio: f64) -> Projection {
        if history.len() < 2 {
            return Projection::InsufficientData;
        }

        let start = history.len().saturating_sub(self.window + 1);
        let recent = &history[start..];
        let (Some(first), Some(last)) = (recent.first(), recent.last()) else {
            return Projection::InsufficientData;
        };
        let deltas = (recent.len() - 1) as f64;
        let rate = (last.usage as f64 - first.usage as f64) / deltas;

        if rate <= 0.0 {
            return Projection::Stable;
        }

        let limit = threshold_ratio * capacity as f64;
        let turns_remaining = ((limit - last.usage as f64) / rate).max(0.0);
        Projection::Growing {
            rate,
            turns_remaining,
            outlook: GrowthOutlook::from_turns(turns_remaining),
        }
    }
}
