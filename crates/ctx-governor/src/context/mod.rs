//! Measurement side of the governor: usage, pressure, trend and budgets.
//!
//! The context window is the scarcest resource an agent has, and quality
//! degrades well before it runs out. These modules turn raw usage reports
//! into the signals the [`governor`](crate::governor) acts on:
//!
//! 1. **[`tracker`]**: [`UsageTracker`] owns cumulative usage and a bounded
//!    [`HistoryRing`] of recent samples.
//!
//! 2. **[`pressure`]**: [`PressureClassifier`] maps a usage ratio to a
//!    [`PressureTier`] (30% / 50% / 80% boundaries), a compliance flag and a
//!    continuous degradation score.
//!
//! 3. **[`trend`]**: [`TrendProjector`] estimates growth per report and how
//!    many reports remain before the safe threshold.
//!
//! 4. **[`budget`]**: [`BudgetPlanner`] computes per-profile safe budgets
//!    and splits oversized batches into ordered chunks.
//!
//! Everything here is synchronous and bounded by the history window.

pub mod budget;
pub mod pressure;
pub mod tracker;
pub mod trend;

pub use budget::{BudgetDecision, BudgetPlanner, Chunk};
pub use pressure::{PressureClassifier, PressureTier};
pub use tracker::{HistoryRing, Sample, UsageTracker};
pub use trend::{GrowthOutlook, Projection, TrendProjector};
