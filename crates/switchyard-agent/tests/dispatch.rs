// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dispatch through selection, retry, fallback and accounting.

use std::time::Duration;

use chrono::TimeDelta;
use switchyard_core::{Clock, FailureKind, SwitchyardError, Tier};
use switchyard_resilience::RoutingEvent;
use switchyard_router::SelectionRule;
use switchyard_test_utils::{RecordingSink, ScriptedHandler, Step, TestHarness, at};
use tokio_util::sync::CancellationToken;

const RESEARCH: &str = "research the history of container shipping";

async fn wait_for_alerts(h: &TestHarness) -> Vec<String> {
    for _ in 0..100 {
        let delivered = h.sink.delivered().await;
        if !delivered.is_empty() {
            return delivered;
        }
        tokio::task::yield_now().await;
    }
    Vec::new()
}

#[tokio::test]
async fn simple_greeting_is_served_by_l1() {
    let h = TestHarness::new().await.unwrap();
    let outcome = h.dispatch("hi there").await.unwrap();

    assert_eq!(outcome.requested_tier, Tier::L1);
    assert_eq!(outcome.served_tier, Tier::L1);
    assert!(!outcome.downgraded);
    assert_eq!(outcome.content, "l1 ok");
    assert_eq!(h.calls(), [1, 0, 0, 0, 0]);
    assert_eq!(h.log.len().await, 1);
}

#[tokio::test]
async fn request_carries_selection_context() {
    let h = TestHarness::new().await.unwrap();
    let outcome = h.dispatch(RESEARCH).await.unwrap();

    assert_eq!(outcome.served_tier, Tier::L5);
    assert_eq!(outcome.decision.rule, SelectionRule::Classified);
    assert!(matches!(
        outcome.trace.events().first(),
        Some(RoutingEvent::Selected { tier: Tier::L5, .. })
    ));

    let seen = h.handler(Tier::L5).requests().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].request_id, outcome.request_id);
    assert_eq!(seen[0].context["mood"], "neutral");
    assert_eq!(seen[0].context["time_of_day"], "afternoon");
    assert_eq!(seen[0].context["day_kind"], "weekday");
}

#[tokio::test(start_paused = true)]
async fn exhausted_tier_falls_back_and_is_billed_to_the_server() {
    let h = TestHarness::builder()
        .with_handler(Tier::L5, ScriptedHandler::failing("l5", FailureKind::RateLimit))
        .build()
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    let outcome = h.dispatch(RESEARCH).await.unwrap();

    assert_eq!(outcome.requested_tier, Tier::L5);
    assert_eq!(outcome.served_tier, Tier::L4);
    assert!(outcome.downgraded);
    assert_eq!(h.calls(), [0, 0, 0, 1, 4]);
    assert_eq!(started.elapsed(), Duration::from_millis(7000));
    assert_eq!(outcome.trace.retries(Some(Tier::L5)), 3);
    assert_eq!(outcome.trace.fallbacks(), vec![(Tier::L5, Tier::L4)]);

    let date = h.clock.today();
    let records = h.dispatcher.tracker().records_for(date).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tier, Tier::L4);
}

#[tokio::test]
async fn non_retryable_failure_is_surfaced_immediately() {
    let h = TestHarness::builder()
        .with_handler(Tier::L5, ScriptedHandler::failing("l5", FailureKind::Other))
        .build()
        .await
        .unwrap();

    let err = h.dispatch(RESEARCH).await.unwrap_err();
    assert!(matches!(
        err,
        SwitchyardError::NonRetryable {
            tier: Tier::L5,
            attempt: 0,
            ..
        }
    ));
    assert_eq!(h.calls(), [0, 0, 0, 0, 1]);
    assert!(h.log.is_empty().await);
    assert_eq!(h.dispatcher.tracker().today().request_count, 0);
}

#[tokio::test(start_paused = true)]
async fn every_tier_down_ends_at_l1() {
    let mut builder = TestHarness::builder();
    for tier in Tier::ALL {
        builder = builder.with_handler(
            tier,
            ScriptedHandler::failing(tier.to_string(), FailureKind::Overloaded),
        );
    }
    let h = builder.build().await.unwrap();

    let err = h.dispatch(RESEARCH).await.unwrap_err();
    match err {
        SwitchyardError::NoFallbackAvailable { tier, cause } => {
            assert_eq!(tier, Tier::L1);
            assert_eq!(cause.kind, FailureKind::Overloaded);
        }
        other => panic!("expected NoFallbackAvailable, got {other:?}"),
    }
    assert_eq!(h.calls(), [4, 4, 4, 4, 4]);
}

#[tokio::test]
async fn emergency_mode_clamps_and_alerts_once() {
    let h = TestHarness::builder()
        .with_budget(1.0)
        .with_handler(
            Tier::L5,
            ScriptedHandler::new("l5").then_respond("long answer", 0.95),
        )
        .build()
        .await
        .unwrap();

    let first = h.dispatch(RESEARCH).await.unwrap();
    assert_eq!(first.served_tier, Tier::L5);
    assert_eq!(first.alerts.len(), 2);
    assert!(first.budget.emergency_mode);

    let delivered = wait_for_alerts(&h).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].lines().count(), 2);

    let second = h.dispatch(RESEARCH).await.unwrap();
    assert_eq!(second.decision.base_tier, Tier::L5);
    assert_eq!(second.decision.rule, SelectionRule::EmergencyClamp);
    assert_eq!(second.served_tier, Tier::L3);
    assert!(second.alerts.is_empty());
    assert_eq!(h.calls(), [0, 0, 1, 0, 1]);

    // A small request under emergency keeps its tier.
    let third = h.dispatch("quick question about tea").await.unwrap();
    assert_eq!(third.served_tier, Tier::L2);
}

#[tokio::test]
async fn failing_alert_sink_does_not_affect_routing() {
    let h = TestHarness::builder()
        .with_budget(1.0)
        .with_sink(RecordingSink::failing())
        .with_handler(
            Tier::L5,
            ScriptedHandler::new("l5").then_respond("long answer", 0.95),
        )
        .build()
        .await
        .unwrap();

    let first = h.dispatch(RESEARCH).await.unwrap();
    assert_eq!(first.served_tier, Tier::L5);
    assert_eq!(first.alerts.len(), 2);
    assert!(first.persisted);

    // The sink was invoked and returned an error.
    assert_eq!(wait_for_alerts(&h).await.len(), 1);

    let second = h.dispatch(RESEARCH).await.unwrap();
    assert_eq!(second.served_tier, Tier::L3);
    assert_eq!(second.decision.rule, SelectionRule::EmergencyClamp);
    assert_eq!(h.dispatcher.tracker().today().request_count, 2);
    assert_eq!(h.log.len().await, 2);
}

#[tokio::test]
async fn new_day_lifts_emergency_mode() {
    let h = TestHarness::builder()
        .with_budget(1.0)
        .with_handler(
            Tier::L5,
            ScriptedHandler::new("l5").then_respond("long answer", 0.95),
        )
        .build()
        .await
        .unwrap();

    h.dispatch(RESEARCH).await.unwrap();
    assert!(h.dispatcher.governor().emergency_mode());

    h.clock.advance(TimeDelta::days(1));
    let outcome = h.dispatch(RESEARCH).await.unwrap();
    assert_eq!(outcome.served_tier, Tier::L5);
    assert_eq!(outcome.decision.rule, SelectionRule::Classified);
    assert_eq!(outcome.budget.request_count, 1);
}

#[tokio::test]
async fn late_night_softens_heavy_requests() {
    let h = TestHarness::builder()
        .starting_at(at(2026, 3, 4, 23, 30))
        .build()
        .await
        .unwrap();

    let outcome = h.dispatch(RESEARCH).await.unwrap();
    assert_eq!(outcome.decision.rule, SelectionRule::GentleSubstitution);
    assert_eq!(outcome.served_tier, Tier::L4);
}

#[tokio::test]
async fn distress_escalates_to_the_top_tier() {
    let h = TestHarness::new().await.unwrap();
    let outcome = h.dispatch("hi, I'm panicking and can't think").await.unwrap();
    assert_eq!(outcome.decision.base_tier, Tier::L1);
    assert_eq!(outcome.decision.rule, SelectionRule::DistressEscalation);
    assert_eq!(outcome.served_tier, Tier::L5);
}

#[tokio::test(start_paused = true)]
async fn request_timeout_bounds_the_dispatch() {
    let h = TestHarness::builder()
        .with_request_timeout(30)
        .with_handler(Tier::L5, ScriptedHandler::new("l5").otherwise(Step::Hang))
        .build()
        .await
        .unwrap();

    let err = h.dispatch(RESEARCH).await.unwrap_err();
    assert!(matches!(
        err,
        SwitchyardError::Timeout { duration } if duration == Duration::from_secs(30)
    ));
    assert_eq!(h.calls(), [0, 0, 0, 0, 1]);
    assert!(h.log.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_pending_backoff() {
    let h = TestHarness::builder()
        .with_handler(Tier::L5, ScriptedHandler::failing("l5", FailureKind::Network))
        .build()
        .await
        .unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let err = h
        .dispatcher
        .dispatch_with_cancel(RESEARCH, token)
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchyardError::Cancelled));
    assert_eq!(h.calls(), [0, 0, 0, 0, 2]);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.calls(), [0, 0, 0, 0, 2]);
}

#[tokio::test]
async fn concurrent_requests_are_all_accounted() {
    let h = TestHarness::new().await.unwrap();
    let requests = (0..20).map(|_| h.dispatch("hello"));
    let outcomes = futures::future::join_all(requests).await;

    assert!(outcomes.iter().all(Result::is_ok));
    let today = h.dispatcher.tracker().today();
    assert_eq!(today.request_count, 20);
    assert!((today.cost_usd - 0.20).abs() < 1e-9);
    assert_eq!(h.log.len().await, 20);
}
