//! Convenience re-exports for common `ctx-governor` types.
//!
//! ```ignore
//! use ctx_governor::prelude::*;
//! ```
//!
//! Pulls in what a typical caller needs: config, sessions, statuses and the
//! event and sink traits. Lower-level pieces (history ring, coordinator,
//! projector internals) stay in their modules.

pub use crate::config::{GovernorConfig, ProfileTable, TierThresholds};
pub use crate::context::{BudgetDecision, BudgetPlanner, Chunk, PressureTier, Projection};
pub use crate::error::{GovernorError, Result};
pub use crate::estimator::{CharRatioEstimator, Estimator};
pub use crate::governor::{
    Action, ChannelSink, Checkpoint, CheckpointSink, EventHandler, GovernorEvent, GovernorState,
    LoggingHandler, MemorySink, PressureStatus, Session, SessionRegistry,
};
pub use crate::profile::Profile;
