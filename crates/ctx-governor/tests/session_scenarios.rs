//! End-to-end scenarios through the public session API.
//!
//! These drive sessions the way an agent loop would: report cumulative usage
//! after each step, plan batches before starting them, and acknowledge
//! checkpoints once a sink has persisted them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use ctx_governor::context::BudgetPlanner;
use ctx_governor::governor::{CheckpointReason, FnEventHandler};
use ctx_governor::prelude::*;

fn config() -> Arc<GovernorConfig> {
    Arc::new(GovernorConfig::default())
}

// ── Tier progression ─────────────────────────────────────────────────

#[test]
fn sequential_reports_walk_every_tier() {
    let mut session = Session::new("walk", 100_000, Profile::Conversation, config()).unwrap();
    let tiers: Vec<PressureTier> = [20_000, 40_000, 60_000, 80_000]
        .into_iter()
        .map(|total| session.report(total).unwrap().tier)
        .collect();
    assert_eq!(
        tiers,
        vec![
            PressureTier::Low,
            PressureTier::Moderate,
            PressureTier::High,
            PressureTier::Critical,
        ]
    );
}

#[test]
fn actions_follow_states() {
    let mut session = Session::new("acts", 100_000, Profile::Conversation, config()).unwrap();
    let s = session.report(10_000).unwrap();
    assert_eq!((s.state, s.action), (GovernorState::Normal, Action::Continue));
    let s = session.report(35_000).unwrap();
    assert_eq!((s.state, s.action), (GovernorState::Watch, Action::MonitorClosely));
    let s = session.report(55_000).unwrap();
    assert_eq!(
        (s.state, s.action),
        (GovernorState::Constrained, Action::OptimizeProactively)
    );
}

// ── Circuit breaker ──────────────────────────────────────────────────

#[test]
fn breaker_trips_and_survives_low_reading_until_acknowledged() {
    let sink = Arc::new(MemorySink::new());
    let mut session = Session::new("breaker", 100_000, Profile::CodeReview, config())
        .unwrap()
        .with_sink(sink.clone());

    let first = session.report(55_000).unwrap();
    assert!(!first.breaker_tripped);
    session.report(60_000).unwrap();
    let third = session.report(70_000).unwrap();
    assert!(third.breaker_tripped);
    assert_eq!(third.action, Action::EmergencyReset);
    assert!(third.checkpoint_pending);
    assert!(
        third
            .recommendations
            .iter()
            .any(|r| r.contains("Circuit breaker tripped"))
    );

    // The caller resets locally and reports a LOW total: still tripped.
    session.reset();
    let low = session.report(5_000).unwrap();
    assert_eq!(low.tier, PressureTier::Low);
    assert!(low.breaker_tripped);
    assert_eq!(low.state, GovernorState::Breach);
    assert_eq!(low.action, Action::EmergencyReset);

    // One checkpoint when the breaker tripped, and one for the new epoch
    // because the breaker is still tripped after the local reset.
    let saved = sink.saved();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].reason, CheckpointReason::BreakerTripped);
    assert_eq!(saved[0].tier_at_emission, PressureTier::High);
    assert_eq!(saved[0].epoch, 0);
    assert_eq!(saved[1].reason, CheckpointReason::BreakerTripped);
    assert_eq!(saved[1].tier_at_emission, PressureTier::Low);
    assert_eq!(saved[1].epoch, 1);

    assert!(session.acknowledge(saved[0].epoch).is_err());
    assert!(session.acknowledge(saved[1].epoch).unwrap());
    assert!(!session.is_tripped());
    let after = session.report(5_000).unwrap();
    assert!(!after.breaker_tripped);
    assert_eq!(after.action, Action::Continue);
}

#[test]
fn acknowledging_the_wrong_epoch_changes_nothing() {
    let mut session = Session::new("epoch", 1_000, Profile::Conversation, config()).unwrap();
    session.report(900).unwrap();
    let err = session.acknowledge(7).unwrap_err();
    assert!(matches!(err, GovernorError::EpochMismatch { .. }));
    assert_eq!(session.usage(), 900);
    assert!(session.checkpoint_pending());
}

// ── Usage reporting contract ─────────────────────────────────────────

#[test]
fn decrease_without_reset_is_rejected() {
    let mut session = Session::new("regress", 100_000, Profile::Conversation, config()).unwrap();
    session.report(40_000).unwrap();
    let err = session.report(39_999).unwrap_err();
    assert!(matches!(
        err,
        GovernorError::RegressedUsage {
            current: 40_000,
            reported: 39_999
        }
    ));
    assert_eq!(session.usage(), 40_000);
}

#[test]
fn checkpoint_from_before_a_reset_does_not_wipe_new_usage() {
    let sink = Arc::new(MemorySink::new());
    let mut session = Session::new("stale", 100_000, Profile::Conversation, config())
        .unwrap()
        .with_sink(sink.clone());

    assert!(session.report(90_000).unwrap().checkpoint_pending);
    session.reset();
    let status = session.report(20_000).unwrap();
    assert_eq!(status.epoch, 1);
    assert_eq!(status.action, Action::Continue);

    // The persistence task confirms the old checkpoint late.
    assert!(session.acknowledge(0).unwrap());
    assert_eq!(session.epoch(), 1);
    assert_eq!(session.usage(), 20_000);
    assert!(!session.checkpoint_pending());

    // Pressure in the new epoch gets its own checkpoint.
    let status = session.report(85_000).unwrap();
    assert!(status.checkpoint_pending);
    let saved = sink.saved();
    assert_eq!(saved.len(), 2);
    assert_eq!((saved[1].epoch, saved[1].usage), (1, 85_000));
}

#[test]
fn extreme_totals_are_observed_without_overflow() {
    let mut session =
        Session::new("huge", i64::MAX as u64, Profile::Conversation, config()).unwrap();
    let status = session.report(u64::MAX).unwrap();
    assert_eq!(status.headroom, i64::MIN);
    assert_eq!(status.tier, PressureTier::Critical);
    assert!(status.warnings.iter().any(|w| w.contains("exceeds total capacity")));
}

#[test]
fn reset_then_report_round_trip() {
    let mut session = Session::new("round", 100_000, Profile::Conversation, config()).unwrap();
    session.report(70_000).unwrap();
    let epoch = session.epoch();
    session.reset();
    session.report(12_500).unwrap();
    assert!((session.ratio() - 12_500.0 / 100_000.0).abs() < f64::EPSILON);
    assert_eq!(session.epoch(), epoch + 1);
}

// ── Planning ─────────────────────────────────────────────────────────

#[test]
fn chunk_plan_reconstructs_original_order() {
    let ops = [10, 15, 20, 5, 30];
    let chunks = BudgetPlanner::plan(&ops, 30);
    let rebuilt: Vec<u64> = chunks
        .iter()
        .flat_map(|c| ops[c.range()].iter().copied())
        .collect();
    assert_eq!(rebuilt, ops.to_vec());
    for chunk in &chunks {
        assert!(chunk.units <= 30 || chunk.exceeds_even_alone);
    }
}

#[test]
fn oversized_operation_is_flagged_not_dropped() {
    let session = Session::new("big", 100_000, Profile::DataAnalysis, config()).unwrap();
    // data-analysis: 35% of 100_000
    let decision = session.plan(&[10_000, 50_000, 10_000]);
    assert_eq!(decision.safe_budget, 35_000);
    assert!(!decision.fits);
    assert!(decision.has_oversized());
    assert_eq!(decision.chunks.len(), 3);
    assert!(decision.chunks[1].exceeds_even_alone);
}

#[test]
fn estimator_failures_fall_back_to_profile_default() {
    struct Offline;
    impl Estimator for Offline {
        fn estimate(&self, _description: &str) -> std::result::Result<u64, String> {
            Err("estimator offline".into())
        }
    }

    let session = Session::new("est", 100_000, Profile::Documentation, config()).unwrap();
    let decision = session.plan_descriptions(&Offline, &["write intro", "write api docs"]);
    assert_eq!(
        decision.requested_units,
        2 * Profile::Documentation.default_estimate()
    );
    assert!(decision.fits);
}

// ── Registry and concurrency ─────────────────────────────────────────

#[test]
fn independent_sessions_progress_in_parallel() {
    let registry = Arc::new(SessionRegistry::new(config()).unwrap());
    for i in 0..8 {
        registry
            .create(format!("worker-{i}"), 100_000, Profile::CodeGeneration)
            .unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let id = format!("worker-{i}");
                let mut last = None;
                for step in 1..=10u64 {
                    last = Some(registry.report(&id, step * 2_000).unwrap());
                }
                last.unwrap()
            })
        })
        .collect();

    for handle in handles {
        let status = handle.join().unwrap();
        assert_eq!(status.usage, 20_000);
        assert_eq!(status.tier, PressureTier::Low);
    }
    assert_eq!(registry.len(), 8);
}

#[test]
fn registry_shares_handler_across_sessions() {
    let trips = Arc::new(AtomicUsize::new(0));
    let t = trips.clone();
    let handler = FnEventHandler::new(move |event| {
        if matches!(event, GovernorEvent::BreakerTripped { .. }) {
            t.fetch_add(1, Ordering::SeqCst);
        }
    });
    let registry = SessionRegistry::new(config())
        .unwrap()
        .with_event_handler(Arc::new(handler));

    for id in ["a", "b"] {
        registry.create(id, 100, Profile::Conversation).unwrap();
        for total in [60, 61, 62] {
            registry.report(id, total).unwrap();
        }
    }
    assert_eq!(trips.load(Ordering::SeqCst), 2);
}

#[test]
fn events_arrive_in_call_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = log.clone();
    let handler = FnEventHandler::new(move |event| {
        let name = match event {
            GovernorEvent::UsageReported { .. } => "usage",
            GovernorEvent::TierChanged { .. } => "tier",
            GovernorEvent::BreakerTripped { .. } => "trip",
            GovernorEvent::CheckpointEmitted { .. } => "checkpoint",
            GovernorEvent::CheckpointAcknowledged { .. } => "ack",
            GovernorEvent::AckTimedOut { .. } => "timeout",
            GovernorEvent::SessionReset { .. } => "reset",
        };
        l.lock().unwrap().push(name);
    });
    let mut session = Session::new("order", 100, Profile::Conversation, config())
        .unwrap()
        .with_event_handler(Arc::new(handler));

    session.report(10).unwrap();
    session.report(90).unwrap();
    session.acknowledge(0).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["usage", "tier", "checkpoint", "usage", "ack", "reset"]
    );
}

// ── Acknowledgment timeout ───────────────────────────────────────────

#[test]
fn late_acknowledgment_warns_but_never_blocks() {
    let config = Arc::new(GovernorConfig::default().with_ack_timeout_secs(0));
    let mut session = Session::new("late", 100, Profile::Conversation, config).unwrap();

    let status = session.report(85).unwrap();
    assert!(status.checkpoint_pending);
    assert!(status.ack_overdue);
    assert!(
        status
            .warnings
            .iter()
            .any(|w| w.contains("not acknowledged"))
    );

    // The caller keeps going; still exactly one pending checkpoint.
    let status = session.report(86).unwrap();
    assert!(status.ack_overdue);
    assert_eq!(session.load_checkpoint().unwrap().usage, 85);

    assert!(session.acknowledge(0).unwrap());
    assert!(!session.status().ack_overdue);
}

#[tokio::test]
async fn channel_sink_round_trip_through_persistence_task() {
    let (sink, mut rx) = ChannelSink::new();
    let registry = Arc::new(
        SessionRegistry::new(config())
            .unwrap()
            .with_sink(Arc::new(sink)),
    );
    registry.create("agent", 1_000, Profile::CodeGeneration).unwrap();

    let status = registry.report("agent", 850).unwrap();
    assert!(status.checkpoint_pending);

    let persister = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let checkpoint = rx.recv().await.unwrap();
            registry
                .acknowledge(&checkpoint.session_id, checkpoint.epoch)
                .unwrap()
        })
    };
    assert!(persister.await.unwrap());

    let handle = registry.get("agent").unwrap();
    let session = handle.lock().unwrap();
    assert_eq!(session.usage(), 0);
    assert_eq!(session.epoch(), 1);
    assert!(!session.checkpoint_pending());
    assert_eq!(session.load_checkpoint().unwrap().usage, 850);
}
