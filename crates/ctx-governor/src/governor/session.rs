//! Sessions and the session registry.
//!
//! A [`Session`] is one independent unit of agent work. Each `report` runs the
//! full pipeline (tracker, classifier, projector, governor, coordinator) and
//! returns a [`PressureStatus`] synchronously. Calls for one session must be
//! sequential; the [`SessionRegistry`] serializes them with one mutex per
//! session while letting different sessions proceed in parallel.

use super::breaker::{Action, GovernorState, ResponseGovernor};
use super::checkpoint::{
    AckWait, Checkpoint, CheckpointCoordinator, CheckpointReason, CheckpointSink, MemorySink,
};
use super::events::{EventHandler, GovernorEvent, NoopHandler};
use crate::config::GovernorConfig;
use crate::context::budget::{BudgetDecision, BudgetPlanner};
use crate::context::pressure::{PressureClassifier, PressureTier};
use crate::context::tracker::UsageTracker;
use crate::context::trend::{Projection, TrendProjector};
use crate::error::{GovernorError, Result};
use crate::estimator::{Estimator, estimate_batch};
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

// ── PressureStatus ────────────────────────────────────────────────

/// Snapshot returned from every report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PressureStatus {
    pub session_id: String,
    pub epoch: u64,
    pub tier: PressureTier,
    /// `usage / capacity`, not clamped.
    pub ratio: f64,
    pub usage: u64,
    pub capacity: u64,
    /// `capacity - usage`; negative once capacity is overrun.
    pub headroom: i64,
    /// `ratio <= mecw_threshold`.
    pub compliant: bool,
    /// Diagnostic degradation multiplier.
    pub degradation: f64,
    pub state: GovernorState,
    pub action: Action,
    pub projection: Projection,
    pub breaker_tripped: bool,
    pub consecutive_high_pressure: u32,
    pub checkpoint_pending: bool,
    /// The pending checkpoint outlived the acknowledgment timeout.
    pub ack_overdue: bool,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl PressureStatus {
    /// Format as a short log-friendly string.
    pub fn to_log_string(&self) -> String {
        format!(
            "{}: {} ({:.0}% of {}), {}",
            self.session_id,
            self.tier,
            self.ratio * 100.0,
            self.capacity,
            self.action,
        )
    }
}

// ── Session ───────────────────────────────────────────────────────

/// Governor state for one unit of agent work.
pub struct Session {
    id: String,
    profile: Profile,
    config: Arc<GovernorConfig>,
    classifier: PressureClassifier,
    projector: TrendProjector,
    planner: BudgetPlanner,
    tracker: UsageTracker,
    governor: ResponseGovernor,
    coordinator: CheckpointCoordinator,
    sink: Arc<dyn CheckpointSink>,
    handler: Arc<dyn EventHandler>,
    last_tier: Option<PressureTier>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("profile", &self.profile)
            .field("tracker", &self.tracker)
            .field("governor", &self.governor)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session. Fails fast on zero capacity or an invalid config.
    ///
    /// Checkpoints go to a private [`MemorySink`] until
    /// [`with_sink`](Self::with_sink) replaces it.
    pub fn new(
        id: impl Into<String>,
        capacity: u64,
        profile: Profile,
        config: Arc<GovernorConfig>,
    ) -> Result<Self> {
        config.validate()?;
        let tracker = UsageTracker::new(capacity, config.history_window)?;
        Ok(Self {
            id: id.into(),
            profile,
            classifier: PressureClassifier::from_config(&config),
            projector: TrendProjector::new(config.trend_window),
            planner: BudgetPlanner::from_config(&config),
            governor: ResponseGovernor::new(config.trip_threshold),
            coordinator: CheckpointCoordinator::new(config.ack_timeout()),
            tracker,
            config,
            sink: Arc::new(MemorySink::new()),
            handler: Arc::new(NoopHandler),
            last_tier: None,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn CheckpointSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = handler;
        self
    }

    // ── Reporting ──────────────────────────────────────────────────

    /// Report the new absolute cumulative usage and get the decision.
    ///
    /// A total below current usage is rejected with
    /// [`GovernorError::RegressedUsage`] and changes nothing.
    pub fn report(&mut self, new_total: u64) -> Result<PressureStatus> {
        self.tracker.report(new_total)?;
        let ratio = self.tracker.ratio();
        let tier = self.classifier.classify(ratio);

        if let Some(previous) = self.last_tier
            && previous != tier
        {
            info!("[{}] pressure {previous} -> {tier} ({:.1}%)", self.id, ratio * 100.0);
            self.handler.on_event(&GovernorEvent::TierChanged {
                session_id: &self.id,
                from: previous,
                to: tier,
            });
        }
        self.last_tier = Some(tier);

        let decision = self.governor.decide(tier);
        if decision.tripped_now {
            self.handler.on_event(&GovernorEvent::BreakerTripped {
                session_id: &self.id,
                consecutive: self.governor.breaker().consecutive_high_pressure(),
            });
        }

        let mut sink_warning = None;
        if decision.action == Action::EmergencyReset
            && !self.coordinator.is_pending_for(self.tracker.epoch())
        {
            let checkpoint = self.build_checkpoint(tier, ratio);
            match self.coordinator.emit(&checkpoint, self.sink.as_ref()) {
                Ok(true) => self.handler.on_event(&GovernorEvent::CheckpointEmitted {
                    checkpoint: &checkpoint,
                }),
                Ok(false) => {}
                Err(e) => {
                    warn!("[{}] checkpoint emission failed: {e}", self.id);
                    sink_warning = Some(format!("Checkpoint could not be emitted: {e}"));
                }
            }
        }

        let ack_overdue = match self.coordinator.check_overdue(Instant::now()) {
            AckWait::TimedOut { epoch, waited } => {
                self.handler.on_event(&GovernorEvent::AckTimedOut {
                    session_id: &self.id,
                    epoch,
                    waited,
                });
                true
            }
            AckWait::Overdue => true,
            AckWait::Idle | AckWait::Waiting => false,
        };

        self.handler.on_event(&GovernorEvent::UsageReported {
            session_id: &self.id,
            usage: new_total,
            ratio,
            action: decision.action,
        });

        let mut status = self.build_status(tier, decision.state, ack_overdue);
        status.warnings.extend(sink_warning);
        debug!("{}", status.to_log_string());
        Ok(status)
    }

    /// Report an increment instead of an absolute total.
    pub fn report_delta(&mut self, delta: u64) -> Result<PressureStatus> {
        let total = self.tracker.usage().saturating_add(delta);
        self.report(total)
    }

    /// Current status without recording a reading or touching the breaker.
    pub fn status(&self) -> PressureStatus {
        let tier = self.classifier.classify(self.tracker.ratio());
        let state = self.governor.state_for(tier);
        let ack_overdue = self.coordinator.is_overdue(Instant::now());
        self.build_status(tier, state, ack_overdue)
    }

    // ── Checkpoint lifecycle ──────────────────────────────────────

    /// Confirm the checkpoint for `epoch` is durable and reset the session.
    ///
    /// Clears usage and history, advances the epoch and resets the breaker.
    /// Returns `Ok(false)` if no checkpoint is pending.
    ///
    /// If the session was explicitly [`reset`](Self::reset) after the
    /// checkpoint was emitted, usage reported since then was never
    /// checkpointed: only the breaker is cleared and the tracker is kept.
    pub fn acknowledge(&mut self, epoch: u64) -> Result<bool> {
        if !self.coordinator.acknowledge(epoch)? {
            debug!("[{}] acknowledgment for epoch {epoch} with nothing pending", self.id);
            return Ok(false);
        }
        self.handler.on_event(&GovernorEvent::CheckpointAcknowledged {
            session_id: &self.id,
            epoch,
        });
        if epoch < self.tracker.epoch() {
            debug!(
                "[{}] checkpoint for epoch {epoch} predates reset to epoch {}; keeping usage",
                self.id,
                self.tracker.epoch()
            );
            self.governor.reset();
            return Ok(true);
        }
        self.tracker.reset();
        self.governor.reset();
        self.last_tier = None;
        self.handler.on_event(&GovernorEvent::SessionReset {
            session_id: &self.id,
            epoch: self.tracker.epoch(),
        });
        Ok(true)
    }

    /// Explicitly zero usage and history and advance the epoch.
    ///
    /// Lets the caller report a lower total afterwards. The breaker is not
    /// touched: only an acknowledged checkpoint clears a trip.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.last_tier = None;
        self.handler.on_event(&GovernorEvent::SessionReset {
            session_id: &self.id,
            epoch: self.tracker.epoch(),
        });
    }

    /// Latest checkpoint the sink holds for this session.
    pub fn load_checkpoint(&self) -> Option<Checkpoint> {
        self.sink.load(&self.id)
    }

    // ── Budgeting ─────────────────────────────────────────────────

    /// Safe budget for this session's profile and capacity.
    pub fn safe_budget(&self) -> u64 {
        self.planner
            .safe_budget(self.profile, self.tracker.capacity())
    }

    /// Whether `requested_units` more fit in the safe budget.
    pub fn fits(&self, requested_units: u64) -> bool {
        BudgetPlanner::fits(self.tracker.usage(), requested_units, self.safe_budget())
    }

    /// Plan an ordered batch of estimated operations.
    pub fn plan(&self, operations: &[u64]) -> BudgetDecision {
        BudgetPlanner::decide(self.tracker.usage(), operations, self.safe_budget())
    }

    /// Estimate descriptions with `estimator`, then plan them.
    pub fn plan_descriptions(
        &self,
        estimator: &dyn Estimator,
        descriptions: &[&str],
    ) -> BudgetDecision {
        let operations = estimate_batch(estimator, descriptions, self.profile);
        self.plan(&operations)
    }

    // ── Accessors ─────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn capacity(&self) -> u64 {
        self.tracker.capacity()
    }

    pub fn usage(&self) -> u64 {
        self.tracker.usage()
    }

    pub fn ratio(&self) -> f64 {
        self.tracker.ratio()
    }

    pub fn epoch(&self) -> u64 {
        self.tracker.epoch()
    }

    pub fn is_tripped(&self) -> bool {
        self.governor.breaker().is_tripped()
    }

    pub fn checkpoint_pending(&self) -> bool {
        self.coordinator.is_pending()
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    // ── Internals ─────────────────────────────────────────────────

    fn build_checkpoint(&self, tier: PressureTier, ratio: f64) -> Checkpoint {
        let reason = if self.governor.breaker().is_tripped() {
            CheckpointReason::BreakerTripped
        } else {
            CheckpointReason::CriticalPressure
        };
        Checkpoint {
            session_id: self.id.clone(),
            reason,
            tier_at_emission: tier,
            epoch: self.tracker.epoch(),
            usage: self.tracker.usage(),
            ratio,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn build_status(
        &self,
        tier: PressureTier,
        state: GovernorState,
        ack_overdue: bool,
    ) -> PressureStatus {
        let ratio = self.tracker.ratio();
        let history = self.tracker.history().to_vec();
        let projection =
            self.projector
                .project(&history, self.tracker.capacity(), self.config.mecw_threshold);
        let breaker = self.governor.breaker();
        let action = state.action();

        let mut warnings = Vec::new();
        if !self.classifier.compliant(ratio) {
            warnings.push(format!(
                "Usage at {:.0}% exceeds the {:.0}% effective context window; \
                 output quality degrades non-linearly beyond it.",
                ratio * 100.0,
                self.config.mecw_threshold * 100.0
            ));
        }
        if ratio > 1.0 {
            warnings.push(format!(
                "Usage {} exceeds total capacity {}.",
                self.tracker.usage(),
                self.tracker.capacity()
            ));
        }
        warnings.extend(projection.warning());
        if ack_overdue && let Some(epoch) = self.coordinator.pending_epoch() {
            warnings.push(format!(
                "Checkpoint for epoch {epoch} not acknowledged within {}s; continuing without reset.",
                self.config.ack_timeout_secs
            ));
        }

        let mut recommendations = Vec::new();
        if breaker.is_tripped() {
            recommendations.push(format!(
                "Circuit breaker tripped after {} consecutive high-pressure reports: \
                 checkpoint and reset before continuing. Lower readings will not clear it.",
                breaker.trip_threshold()
            ));
        }
        recommendations.push(
            match action {
                Action::Continue => "Continue normally.",
                Action::MonitorClosely => {
                    "Monitor usage closely; prefer compact tool output and avoid speculative reads."
                }
                Action::OptimizeProactively => {
                    "Optimize proactively: summarize or evict stale context, or delegate remaining work."
                }
                Action::EmergencyReset => {
                    "Emergency: checkpoint progress and reset the context before the next operation."
                }
            }
            .to_string(),
        );
        if let Some(epoch) = self.coordinator.pending_epoch() {
            recommendations.push(format!(
                "Acknowledge the checkpoint for epoch {epoch} once it is persisted."
            ));
        }

        PressureStatus {
            session_id: self.id.clone(),
            epoch: self.tracker.epoch(),
            tier,
            ratio,
            usage: self.tracker.usage(),
            capacity: self.tracker.capacity(),
            headroom: self.tracker.headroom(),
            compliant: self.classifier.compliant(ratio),
            degradation: self.classifier.degradation_score(ratio),
            state,
            action,
            projection,
            breaker_tripped: breaker.is_tripped(),
            consecutive_high_pressure: breaker.consecutive_high_pressure(),
            checkpoint_pending: self.coordinator.is_pending(),
            ack_overdue,
            warnings,
            recommendations,
        }
    }
}

// ── SessionRegistry ───────────────────────────────────────────────

/// Shared, lock-guarded session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Sessions keyed by identifier, sharing one config, sink and handler.
pub struct SessionRegistry {
    config: Arc<GovernorConfig>,
    sink: Arc<dyn CheckpointSink>,
    handler: Arc<dyn EventHandler>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    /// Create a registry. The config is validated once here.
    pub fn new(config: Arc<GovernorConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sink: Arc::new(MemorySink::new()),
            handler: Arc::new(NoopHandler),
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Sink handed to sessions created after this call.
    pub fn with_sink(mut self, sink: Arc<dyn CheckpointSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Event handler handed to sessions created after this call.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn config(&self) -> &Arc<GovernorConfig> {
        &self.config
    }

    /// Register a new session.
    pub fn create(
        &self,
        id: impl Into<String>,
        capacity: u64,
        profile: Profile,
    ) -> Result<SessionHandle> {
        let id = id.into();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if sessions.contains_key(&id) {
            return Err(GovernorError::DuplicateSession(id));
        }
        let session = Session::new(id.clone(), capacity, profile, Arc::clone(&self.config))?
            .with_sink(Arc::clone(&self.sink))
            .with_event_handler(Arc::clone(&self.handler));
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id.clone(), Arc::clone(&handle));
        debug!("registered session '{id}' ({profile}, capacity {capacity})");
        Ok(handle)
    }

    pub fn get(&self, id: &str) -> Result<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| GovernorError::UnknownSession(id.to_string()))
    }

    pub fn remove(&self, id: &str) -> Option<SessionHandle> {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Lock the session and report usage.
    pub fn report(&self, id: &str, new_total: u64) -> Result<PressureStatus> {
        let handle = self.get(id)?;
        let mut session = handle.lock().unwrap_or_else(|e| e.into_inner());
        session.report(new_total)
    }

    /// Lock the session and acknowledge its pending checkpoint.
    pub fn acknowledge(&self, id: &str, epoch: u64) -> Result<bool> {
        let handle = self.get(id)?;
        let mut session = handle.lock().unwrap_or_else(|e| e.into_inner());
        session.acknowledge(epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(capacity: u64) -> Session {
        Session::new(
            "test",
            capacity,
            Profile::CodeGeneration,
            Arc::new(GovernorConfig::default()),
        )
        .unwrap()
    }

    #[test]
    fn zero_capacity_fails_fast() {
        let err = Session::new(
            "bad",
            0,
            Profile::Conversation,
            Arc::new(GovernorConfig::default()),
        )
        .unwrap_err();
        assert!(matches!(err, GovernorError::InvalidCapacity { .. }));
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = GovernorConfig::default().with_history_window(0);
        let err = Session::new("bad", 100, Profile::Conversation, Arc::new(config)).unwrap_err();
        assert!(matches!(err, GovernorError::InvalidConfig(_)));
    }

    #[test]
    fn low_usage_status() {
        let mut s = session(100_000);
        let status = s.report(10_000).unwrap();
        assert_eq!(status.tier, PressureTier::Low);
        assert_eq!(status.action, Action::Continue);
        assert!(status.compliant);
        assert_eq!(status.headroom, 90_000);
        assert_eq!(status.projection, Projection::InsufficientData);
        assert!(status.warnings.is_empty());
        assert_eq!(status.recommendations, vec!["Continue normally.".to_string()]);
    }

    #[test]
    fn critical_report_emits_single_checkpoint() {
        let sink = Arc::new(MemorySink::new());
        let mut s = session(100_000).with_sink(sink.clone());
        let status = s.report(85_000).unwrap();
        assert_eq!(status.action, Action::EmergencyReset);
        assert!(status.checkpoint_pending);
        s.report(90_000).unwrap();
        let saved = sink.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].reason, CheckpointReason::CriticalPressure);
        assert_eq!(saved[0].tier_at_emission, PressureTier::Critical);
        assert_eq!(saved[0].epoch, 0);
        assert_eq!(s.load_checkpoint().unwrap().usage, 85_000);
    }

    #[test]
    fn acknowledge_resets_usage_and_advances_epoch() {
        let mut s = session(100_000);
        s.report(85_000).unwrap();
        assert!(s.acknowledge(0).unwrap());
        assert_eq!(s.usage(), 0);
        assert_eq!(s.epoch(), 1);
        assert!(!s.checkpoint_pending());
        assert!(s.tracker().history().is_empty());
        assert_eq!(s.report(5_000).unwrap().action, Action::Continue);
    }

    #[test]
    fn explicit_reset_allows_lower_total_but_keeps_breaker() {
        let mut s = session(100).with_sink(Arc::new(MemorySink::new()));
        for total in [60, 70, 75] {
            s.report(total).unwrap();
        }
        assert!(s.is_tripped());
        s.reset();
        let status = s.report(10).unwrap();
        assert_eq!(status.tier, PressureTier::Low);
        assert_eq!(status.action, Action::EmergencyReset);
        assert!(status.breaker_tripped);
    }

    #[test]
    fn stale_acknowledgment_keeps_post_reset_usage() {
        let sink = Arc::new(MemorySink::new());
        let mut s = session(100).with_sink(sink.clone());
        s.report(90).unwrap();
        s.reset();
        s.report(20).unwrap();
        assert_eq!(s.epoch(), 1);

        assert!(s.acknowledge(0).unwrap());
        assert_eq!(s.epoch(), 1);
        assert_eq!(s.usage(), 20);
        assert_eq!(s.tracker().history().len(), 1);
        assert!(!s.checkpoint_pending());
        assert_eq!(sink.saved().len(), 1);
    }

    #[test]
    fn critical_after_reset_emits_for_new_epoch() {
        let sink = Arc::new(MemorySink::new());
        let mut s = session(100).with_sink(sink.clone());
        s.report(90).unwrap();
        s.reset();
        let status = s.report(95).unwrap();
        assert_eq!(status.epoch, 1);
        assert_eq!(status.action, Action::EmergencyReset);

        let saved = sink.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].epoch, 1);
        assert_eq!(saved[1].usage, 95);
        assert_eq!(s.load_checkpoint().unwrap().epoch, 1);

        assert!(matches!(
            s.acknowledge(0),
            Err(GovernorError::EpochMismatch { pending: 1, .. })
        ));
        assert!(s.acknowledge(1).unwrap());
        assert_eq!(s.usage(), 0);
        assert_eq!(s.epoch(), 2);
    }

    #[test]
    fn report_delta_accumulates() {
        let mut s = session(1_000);
        s.report_delta(100).unwrap();
        let status = s.report_delta(250).unwrap();
        assert_eq!(status.usage, 350);
        assert_eq!(status.tier, PressureTier::Moderate);
    }

    #[test]
    fn status_does_not_advance_breaker() {
        let mut s = session(100);
        s.report(60).unwrap();
        s.report(60).unwrap();
        for _ in 0..5 {
            let status = s.status();
            assert_eq!(status.consecutive_high_pressure, 2);
            assert!(!status.breaker_tripped);
        }
    }

    #[test]
    fn non_compliant_usage_warns() {
        let mut s = session(100);
        let status = s.report(55).unwrap();
        assert!(!status.compliant);
        assert!(status.warnings.iter().any(|w| w.contains("effective context window")));
    }

    #[test]
    fn over_capacity_is_observed_not_clamped() {
        let mut s = session(100);
        let status = s.report(120).unwrap();
        assert!((status.ratio - 1.2).abs() < 1e-9);
        assert_eq!(status.headroom, -20);
        assert!(status.warnings.iter().any(|w| w.contains("exceeds total capacity")));
    }

    #[test]
    fn plan_uses_profile_budget_and_current_usage() {
        let mut s = session(100_000);
        s.report(30_000).unwrap();
        assert_eq!(s.safe_budget(), 40_000);
        assert!(s.fits(10_000));
        assert!(!s.fits(10_001));

        let decision = s.plan(&[6_000, 6_000]);
        assert!(!decision.fits);
        assert_eq!(decision.overage, 2_000);
        assert_eq!(decision.chunks.len(), 1);
    }

    #[test]
    fn registry_rejects_duplicates_and_unknown_ids() {
        let registry = SessionRegistry::new(Arc::new(GovernorConfig::default())).unwrap();
        registry.create("a", 1_000, Profile::CodeReview).unwrap();
        assert!(matches!(
            registry.create("a", 1_000, Profile::CodeReview),
            Err(GovernorError::DuplicateSession(_))
        ));
        assert!(matches!(
            registry.report("missing", 10),
            Err(GovernorError::UnknownSession(_))
        ));
        assert_eq!(registry.ids(), vec!["a".to_string()]);
        assert!(registry.remove("a").is_some());
        assert!(registry.is_empty());
    }
}
