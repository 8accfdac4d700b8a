//! Safe budgets per task profile and order-preserving batch planning.
//!
//! A profile's safe budget is `capacity * target_ratio[profile]`, independent
//! of the MECW compliance boundary. When a batch of operations does not fit
//! in what remains, [`BudgetPlanner::plan`] splits it into chunks that each
//! fit a fresh safe budget, without ever reordering operations: later
//! operations may depend on the output of earlier ones.

use crate::config::{GovernorConfig, ProfileTable};
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Fixed-point scale for profile ratios.
const RATIO_SCALE: u128 = 1_000_000;

/// A contiguous run of operations planned to execute together.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Index of the first operation (inclusive).
    pub start: usize,
    /// Index one past the last operation.
    pub end: usize,
    /// Sum of the operations' estimates.
    pub units: u64,
    /// A single operation whose estimate alone exceeds the safe budget. The
    /// caller must handle it explicitly, e.g. by isolated delegation.
    pub exceeds_even_alone: bool,
}

impl Chunk {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Whether a batch fits, and how to split it if not.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BudgetDecision {
    /// Sum of all operation estimates.
    pub requested_units: u64,
    pub safe_budget: u64,
    /// `current_usage + requested_units <= safe_budget`.
    pub fits: bool,
    /// Units by which the batch overruns the remaining budget; zero if it fits.
    pub overage: u64,
    /// Ordered chunks covering every operation exactly once.
    pub chunks: Vec<Chunk>,
}

impl BudgetDecision {
    /// Whether any chunk holds an operation too large for any budget.
    pub fn has_oversized(&self) -> bool {
        self.chunks.iter().any(|c| c.exceeds_even_alone)
    }
}

/// Computes profile budgets and plans batches against them.
#[derive(Debug, Clone, Copy)]
pub struct BudgetPlanner {
    profiles: ProfileTable,
}

impl Default for BudgetPlanner {
    fn default() -> Self {
        Self::from_config(&GovernorConfig::default())
    }
}

impl BudgetPlanner {
    pub fn new(profiles: ProfileTable) -> Self {
        Self { profiles }
    }

    pub fn from_config(config: &GovernorConfig) -> Self {
        Self::new(config.profiles)
    }

    /// `capacity * target_ratio[profile]`, rounded down.
    ///
    /// The ratio is taken to millionths and the product computed in integers,
    /// so the result is exact for any capacity. Ratio digits beyond the sixth
    /// decimal place are rounded away.
    pub fn safe_budget(&self, profile: Profile, capacity: u64) -> u64 {
        let micros = (self.profiles.ratio(profile) * RATIO_SCALE as f64).round() as u128;
        let budget = u128::from(capacity).saturating_mul(micros) / RATIO_SCALE;
        u64::try_from(budget).unwrap_or(u64::MAX)
    }

    /// Whether `requested_units` more fit on top of `current_usage`.
    pub fn fits(current_usage: u64, requested_units: u64, safe_budget: u64) -> bool {
        current_usage.saturating_add(requested_units) <= safe_budget
    }

    /// Greedy left-to-right chunking.
    ///
    /// Operations accumulate into the current chunk until the next one would
    /// push its sum past `safe_budget`; that operation then opens a new chunk.
    /// An operation larger than `safe_budget` on its own gets a dedicated
    /// chunk flagged `exceeds_even_alone`. Concatenating the chunk ranges in
    /// order yields `0..operations.len()`.
    pub fn plan(operations: &[u64], safe_budget: u64) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut units: u64 = 0;

        for (idx, &op) in operations.iter().enumerate() {
            if op > safe_budget {
                if idx > start {
                    chunks.push(Chunk {
                        start,
                        end: idx,
                        units,
                        exceeds_even_alone: false,
                    });
                }
                chunks.push(Chunk {
                    start: idx,
                    end: idx + 1,
                    units: op,
                    exceeds_even_alone: true,
                });
                start = idx + 1;
                units = 0;
                continue;
            }

            if idx > start && units.saturating_add(op) > safe_budget {
                chunks.push(Chunk {
                    start,
                    end: idx,
                    units,
                    exceeds_even_alone: false,
                });
                start = idx;
                units = 0;
            }
            units += op;
        }

        if start < operations.len() {
            chunks.push(Chunk {
                start,
                end: operations.len(),
                units,
                exceeds_even_alone: false,
            });
        }
        chunks
    }

    /// Decide whether a batch fits on top of `current_usage`.
    ///
    /// A fitting batch is a single chunk. Otherwise the batch is chunked
    /// against the full safe budget, each chunk being meant for a fresh
    /// context.
    pub fn decide(current_usage: u64, operations: &[u64], safe_budget: u64) -> BudgetDecision {
        let requested_units = operations
            .iter()
            .fold(0u64, |acc, &op| acc.saturating_add(op));
        let fits = Self::fits(current_usage, requested_units, safe_budget);
        let overage = current_usage
            .saturating_add(requested_units)
            .saturating_sub(safe_budget);

        let chunks = if fits && !operations.is_empty() {
            vec![Chunk {
                start: 0,
                end: operations.len(),
                units: requested_units,
                exceeds_even_alone: false,
            }]
        } else {
            Self::plan(operations, safe_budget)
        };

        BudgetDecision {
            requested_units,
            safe_budget,
            fits,
            overage,
            chunks,
        }
    }
}
