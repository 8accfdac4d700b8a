//! Response side of the governor: state machine, breaker, checkpoints, sessions.
//!
//! - [`breaker`]: [`ResponseGovernor`] maps tiers to [`Action`]s and owns the
//!   [`CircuitBreaker`] that pins BREACH after sustained pressure.
//! - [`checkpoint`]: [`CheckpointCoordinator`] emits one [`Checkpoint`] per
//!   epoch to a [`CheckpointSink`] and tracks its acknowledgment.
//! - [`events`]: [`EventHandler`] trait and [`GovernorEvent`] enum for
//!   observing sessions.
//! - [`session`]: [`Session`] ties the pipeline together;
//!   [`SessionRegistry`] hosts many sessions concurrently.

pub mod breaker;
pub mod checkpoint;
pub mod events;
pub mod session;

pub use breaker::{Action, CircuitBreaker, Decision, GovernorState, ResponseGovernor};
pub use checkpoint::{
    ChannelSink, Checkpoint, CheckpointCoordinator, CheckpointReason, CheckpointSink, MemorySink,
};
pub use events::{
    CompositeEventHandler, EventHandler, FnEventHandler, GovernorEvent, LoggingHandler,
    NoopHandler,
};
pub use session::{PressureStatus, Session, SessionHandle, SessionRegistry};
