// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus recording for finished dispatches.

use std::time::Duration;

use switchyard_core::SwitchyardError;
use switchyard_resilience::{DecisionTrace, RoutingEvent};

use crate::DispatchOutcome;

fn trace(trace: &DecisionTrace) {
    for event in trace.events() {
        match event {
            RoutingEvent::RetryScheduled { tier, reason, .. } => {
                switchyard_prometheus::record_retry(*tier, *reason);
            }
            RoutingEvent::Fallback { from, to, .. } => {
                switchyard_prometheus::record_fallback(*from, *to);
            }
            _ => {}
        }
    }
}

pub(crate) fn outcome(outcome: &DispatchOutcome, elapsed: Duration) {
    switchyard_prometheus::record_selection(
        outcome.decision.tier,
        &outcome.decision.rule.to_string(),
    );
    trace(&outcome.trace);
    switchyard_prometheus::record_tokens(
        outcome.served_tier,
        outcome.usage.input,
        outcome.usage.output,
    );
    for alert in &outcome.alerts {
        switchyard_prometheus::record_alert(&alert.severity.to_string());
    }
    switchyard_prometheus::set_budget(
        outcome.budget.cumulative_cost,
        outcome.budget.remaining_usd(),
        outcome.budget.emergency_mode,
    );
    switchyard_prometheus::record_dispatch_latency(elapsed.as_secs_f64(), "served");
}

pub(crate) fn failure(error: &SwitchyardError, decisions: &DecisionTrace, elapsed: Duration) {
    let kind = match error {
        SwitchyardError::NonRetryable { .. } => "non_retryable",
        SwitchyardError::NoFallbackAvailable { .. } => "no_fallback",
        SwitchyardError::Timeout { .. } => "timeout",
        SwitchyardError::Cancelled => "cancelled",
        _ => "internal",
    };
    trace(decisions);
    switchyard_prometheus::record_failure(kind);
    switchyard_prometheus::record_dispatch_latency(elapsed.as_secs_f64(), kind);
}
