// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for retry plus fallback across a full handler table.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use switchyard_config::model::FallbackConfig;
use switchyard_core::{FailureKind, SwitchyardError, Tier, TierRequest};
use switchyard_resilience::{
    DecisionTrace, FallbackChain, FallbackEdges, HandlerTable, RetryExecutor, RetryPolicy,
    RoutingEvent,
};
use switchyard_test_utils::{ScriptedHandler, Step};
use tokio::time::Instant;

struct Fixture {
    handlers: [Arc<ScriptedHandler>; 5],
    chain: FallbackChain,
}

fn fixture(handlers: [ScriptedHandler; 5]) -> Fixture {
    let handlers = handlers.map(Arc::new);
    let mut builder = HandlerTable::builder();
    for tier in Tier::ALL {
        builder = builder.handler(tier, handlers[tier.index()].clone());
    }
    let table = Arc::new(builder.build().unwrap());
    let executor = RetryExecutor::new(RetryPolicy::new(3, Duration::from_millis(1000)));
    Fixture {
        handlers,
        chain: FallbackChain::new(FallbackEdges::default(), executor, table),
    }
}

fn healthy() -> [ScriptedHandler; 5] {
    Tier::ALL.map(|t| ScriptedHandler::new(t.to_string()))
}

#[tokio::test(start_paused = true)]
async fn healthy_tier_serves_directly() {
    let f = fixture(healthy());
    let mut trace = DecisionTrace::new();
    let served = f
        .chain
        .run(&TierRequest::new("r1", Tier::L4, "analyze"), &mut trace)
        .await
        .unwrap();

    assert_eq!(served.served_tier, Tier::L4);
    assert!(!served.downgraded());
    assert_eq!(served.response.content, "l4 ok");
    assert_eq!(f.handlers[Tier::L4.index()].calls(), 1);
    assert_eq!(
        trace.events(),
        &[RoutingEvent::Served {
            tier: Tier::L4,
            attempt: 0
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_tier_falls_back_with_fresh_budget() {
    let mut handlers = healthy();
    handlers[Tier::L5.index()] = ScriptedHandler::failing("l5", FailureKind::Overloaded);
    let f = fixture(handlers);

    let start = Instant::now();
    let mut trace = DecisionTrace::new();
    let served = f
        .chain
        .run(&TierRequest::new("r2", Tier::L5, "research"), &mut trace)
        .await
        .unwrap();

    assert_eq!(served.requested_tier, Tier::L5);
    assert_eq!(served.served_tier, Tier::L4);
    assert!(served.downgraded());
    assert_eq!(f.handlers[Tier::L5.index()].calls(), 4);
    assert_eq!(f.handlers[Tier::L4.index()].calls(), 1);
    assert_eq!(start.elapsed(), Duration::from_millis(7000));
    assert_eq!(trace.fallbacks(), vec![(Tier::L5, Tier::L4)]);

    // The L4 handler saw the request retargeted to its own tier.
    let seen = f.handlers[Tier::L4.index()].requests().await;
    assert_eq!(seen[0].tier, Tier::L4);
    assert_eq!(seen[0].request_id, "r2");
}

#[tokio::test(start_paused = true)]
async fn fallback_event_precedes_retries_on_next_tier() {
    let mut handlers = healthy();
    handlers[Tier::L3.index()] = ScriptedHandler::failing("l3", FailureKind::RateLimit);
    handlers[Tier::L2.index()] = ScriptedHandler::new("l2").then_fail(FailureKind::Network);
    let f = fixture(handlers);

    let mut trace = DecisionTrace::new();
    let served = f
        .chain
        .run(&TierRequest::new("r3", Tier::L3, "explain"), &mut trace)
        .await
        .unwrap();
    assert_eq!(served.served_tier, Tier::L2);

    let fallback_at = trace
        .events()
        .iter()
        .position(|e| matches!(e, RoutingEvent::Fallback { .. }))
        .unwrap();
    let l2_retry_at = trace
        .events()
        .iter()
        .position(|e| matches!(e, RoutingEvent::RetryScheduled { tier: Tier::L2, .. }))
        .unwrap();
    assert!(fallback_at < l2_retry_at);
    assert_eq!(trace.retries(Some(Tier::L3)), 3);
    assert_eq!(trace.retries(Some(Tier::L2)), 1);
}

#[tokio::test(start_paused = true)]
async fn everything_down_ends_with_no_fallback() {
    let f = fixture(Tier::ALL.map(|t| ScriptedHandler::failing(t.to_string(), FailureKind::Network)));

    let start = Instant::now();
    let mut trace = DecisionTrace::new();
    let err = f
        .chain
        .run(&TierRequest::new("r4", Tier::L3, "plan"), &mut trace)
        .await
        .unwrap_err();

    match err {
        SwitchyardError::NoFallbackAvailable { tier, cause } => {
            assert_eq!(tier, Tier::L1);
            assert_eq!(cause.kind, FailureKind::Network);
        }
        other => panic!("expected NoFallbackAvailable, got {other:?}"),
    }
    // L3, L2, L1 each spend the full 7 s backoff.
    assert_eq!(start.elapsed(), Duration::from_millis(21_000));
    assert_eq!(trace.fallbacks(), vec![(Tier::L3, Tier::L2), (Tier::L2, Tier::L1)]);
    assert_eq!(f.handlers[Tier::L4.index()].calls(), 0);
    assert!(matches!(
        trace.events().last(),
        Some(RoutingEvent::Failed { tier: Tier::L1, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn non_retryable_skips_fallback() {
    let mut handlers = healthy();
    handlers[Tier::L5.index()] = ScriptedHandler::new("l5").then(Step::Fail(FailureKind::Other));
    let f = fixture(handlers);

    let start = Instant::now();
    let mut trace = DecisionTrace::new();
    let err = f
        .chain
        .run(&TierRequest::new("r5", Tier::L5, "prove it"), &mut trace)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SwitchyardError::NonRetryable {
            tier: Tier::L5,
            attempt: 0,
            ..
        }
    ));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(f.handlers[Tier::L4.index()].calls(), 0);
    assert!(trace.fallbacks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn configured_edges_skip_tiers() {
    let mut handlers = healthy();
    handlers[Tier::L5.index()] = ScriptedHandler::failing("l5", FailureKind::RateLimit);
    let f = fixture(handlers);
    let edges = FallbackEdges::from_config(&FallbackConfig {
        l5: Tier::L2,
        ..FallbackConfig::default()
    })
    .unwrap();
    let table = {
        let mut builder = HandlerTable::builder();
        for tier in Tier::ALL {
            builder = builder.handler(tier, f.handlers[tier.index()].clone());
        }
        Arc::new(builder.build().unwrap())
    };
    let chain = FallbackChain::new(edges, RetryExecutor::new(RetryPolicy::new(0, Duration::ZERO)), table);

    let mut trace = DecisionTrace::new();
    let served = chain
        .run(&TierRequest::new("r6", Tier::L5, "deep dive"), &mut trace)
        .await
        .unwrap();
    assert_eq!(served.served_tier, Tier::L2);
    assert_eq!(f.handlers[Tier::L4.index()].calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_future_cancels_backoff() {
    let mut handlers = healthy();
    handlers[Tier::L2.index()] = ScriptedHandler::failing("l2", FailureKind::RateLimit);
    let f = fixture(handlers);

    let mut trace = DecisionTrace::new();
    let request = TierRequest::new("r7", Tier::L2, "summarize");
    let result =
        tokio::time::timeout(Duration::from_millis(1500), f.chain.run(&request, &mut trace)).await;

    assert!(result.is_err());
    // Attempt 0 and the retry after 1000 ms ran; the 2000 ms backoff was dropped.
    assert_eq!(f.handlers[Tier::L2.index()].calls(), 2);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(f.handlers[Tier::L2.index()].calls(), 2);
    assert_eq!(trace.retries(Some(Tier::L2)), 2);
}

fn tier_strategy() -> impl Strategy<Value = Tier> {
    prop::sample::select(Tier::ALL.to_vec())
}

fn fallback_config() -> impl Strategy<Value = FallbackConfig> {
    (
        prop::sample::select(vec![Tier::L1]),
        prop::sample::select(vec![Tier::L1, Tier::L2]),
        prop::sample::select(vec![Tier::L1, Tier::L2, Tier::L3]),
        prop::sample::select(vec![Tier::L1, Tier::L2, Tier::L3, Tier::L4]),
    )
        .prop_map(|(l2, l3, l4, l5)| FallbackConfig { l2, l3, l4, l5 })
}

proptest! {
    #[test]
    fn fallback_terminates_at_l1_within_four_hops(config in fallback_config(), start in tier_strategy()) {
        let edges = FallbackEdges::from_config(&config).unwrap();
        let path = edges.path_from(start);
        prop_assert!(path.len() <= 5);
        prop_assert_eq!(path.last().copied(), Some(Tier::L1));
        for pair in path.windows(2) {
            prop_assert!(pair[1] < pair[0]);
        }
    }
}
