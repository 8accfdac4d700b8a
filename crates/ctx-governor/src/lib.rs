//! Context-pressure governor for LLM-driven agents.
//!
//! Agents consume a bounded context window as they work, and output quality
//! degrades non-linearly well before the window is full. `ctx-governor` is the
//! in-band gate an agent consults before and after each unit of work: it
//! tracks cumulative usage per session, classifies pressure into tiers,
//! projects when the safe threshold will be crossed, decides whether upcoming
//! work fits (splitting it into ordered chunks when it does not), and trips a
//! circuit breaker that forces a checkpoint-and-reset after sustained high
//! pressure.
//!
//! The crate is a pure decision engine. It never performs the work, never
//! persists checkpoints itself, and never terminates the caller: every signal
//! is a recommendation returned synchronously.
//!
//! # Getting started
//!
//! ```
//! use ctx_governor::prelude::*;
//! use std::sync::Arc;
//!
//! let config = Arc::new(GovernorConfig::default());
//! let mut session = Session::new("task-1", 100_000, Profile::CodeGeneration, config)?;
//!
//! let status = session.report(20_000)?;
//! assert_eq!(status.tier, PressureTier::Low);
//! assert_eq!(status.action, Action::Continue);
//!
//! // Will three more operations fit in the code-generation budget (40%)?
//! let decision = session.plan(&[8_000, 9_000, 7_000]);
//! assert!(!decision.fits);
//! assert_eq!(decision.chunks.len(), 1);
//!
//! let status = session.report(85_000)?;
//! assert_eq!(status.action, Action::EmergencyReset);
//! assert!(status.checkpoint_pending);
//!
//! // Once the checkpoint is persisted, acknowledge it to reset the session.
//! session.acknowledge(status.epoch)?;
//! assert_eq!(session.usage(), 0);
//! # Ok::<(), ctx_governor::GovernorError>(())
//! ```
//!
//! # Where to find things
//!
//! - **Measure pressure:** [`UsageTracker`](context::UsageTracker),
//!   [`PressureClassifier`](context::PressureClassifier) and
//!   [`TrendProjector`](context::TrendProjector) in [`context`].
//! - **Plan budgets:** [`BudgetPlanner`](context::BudgetPlanner) computes
//!   per-[`Profile`] safe budgets and order-preserving chunk plans.
//! - **Act on pressure:** [`ResponseGovernor`](governor::ResponseGovernor)
//!   and [`CircuitBreaker`](governor::CircuitBreaker) in [`governor`].
//! - **Checkpoint and reset:** [`CheckpointCoordinator`](governor::CheckpointCoordinator)
//!   with a [`CheckpointSink`](governor::CheckpointSink) such as
//!   [`MemorySink`](governor::MemorySink) or [`ChannelSink`](governor::ChannelSink).
//! - **Run many sessions:** [`SessionRegistry`](governor::SessionRegistry).
//! - **Observe decisions:** implement [`EventHandler`](governor::EventHandler)
//!   or use [`LoggingHandler`](governor::LoggingHandler).
//! - **Estimate work:** the [`Estimator`](estimator::Estimator) trait and
//!   [`estimate_or_default`](estimator::estimate_or_default).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`GovernorConfig`](config::GovernorConfig), tier thresholds, profile table, JSON loading |
//! | [`context`] | Usage tracking, pressure tiers, trend projection, budget planning |
//! | [`governor`] | Response state machine, circuit breaker, checkpoints, sessions, events |
//! | [`estimator`] | Estimator seam and per-profile fallbacks |
//! | [`profile`] | The closed set of task [`Profile`]s |

pub mod config;
pub mod context;
pub mod error;
pub mod estimator;
pub mod governor;
pub mod prelude;
pub mod profile;

pub use error::{GovernorError, Result};
pub use profile::Profile;
