// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use switchyard_core::{FailureKind, Tier};

/// Register all Switchyard metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "switchyard_tier_selections_total",
        "Requests routed to each tier, by selection rule"
    );
    describe_counter!(
        "switchyard_retries_total",
        "Retry attempts scheduled after a transient failure"
    );
    describe_counter!(
        "switchyard_fallbacks_total",
        "Transitions to a lower tier after retry exhaustion"
    );
    describe_counter!(
        "switchyard_failures_total",
        "Requests that ended in a terminal error"
    );
    describe_counter!("switchyard_budget_alerts_total", "Budget threshold alerts fired");
    describe_counter!("switchyard_tokens_total", "Total tokens consumed");
    describe_gauge!("switchyard_budget_spent_usd", "Spend so far today in USD");
    describe_gauge!(
        "switchyard_budget_remaining_usd",
        "Remaining daily budget in USD"
    );
    describe_gauge!(
        "switchyard_emergency_mode",
        "1 while budget emergency mode is active"
    );
    describe_histogram!(
        "switchyard_dispatch_latency_seconds",
        "End-to-end dispatch latency in seconds"
    );
}

/// Record the tier chosen for a request.
pub fn record_selection(tier: Tier, rule: &str) {
    metrics::counter!(
        "switchyard_tier_selections_total",
        "tier" => tier.to_string(),
        "rule" => rule.to_string()
    )
    .increment(1);
}

pub fn record_retry(tier: Tier, reason: FailureKind) {
    metrics::counter!(
        "switchyard_retries_total",
        "tier" => tier.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

pub fn record_fallback(from: Tier, to: Tier) {
    metrics::counter!(
        "switchyard_fallbacks_total",
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}

/// Record a terminal error. `kind` is a short label such as `no_fallback`.
pub fn record_failure(kind: &str) {
    metrics::counter!("switchyard_failures_total", "kind" => kind.to_string()).increment(1);
}

pub fn record_alert(severity: &str) {
    metrics::counter!("switchyard_budget_alerts_total", "severity" => severity.to_string())
        .increment(1);
}

/// Record token consumption on the serving tier.
pub fn record_tokens(tier: Tier, input: u64, output: u64) {
    metrics::counter!("switchyard_tokens_total", "tier" => tier.to_string(), "type" => "input")
        .increment(input);
    metrics::counter!("switchyard_tokens_total", "tier" => tier.to_string(), "type" => "output")
        .increment(output);
}

/// Publish the current budget position.
pub fn set_budget(spent_usd: f64, remaining_usd: f64, emergency: bool) {
    metrics::gauge!("switchyard_budget_spent_usd").set(spent_usd);
    metrics::gauge!("switchyard_budget_remaining_usd").set(remaining_usd);
    metrics::gauge!("switchyard_emergency_mode").set(if emergency { 1.0 } else { 0.0 });
}

pub fn record_dispatch_latency(seconds: f64, outcome: &str) {
    metrics::histogram!("switchyard_dispatch_latency_seconds", "outcome" => outcome.to_string())
        .record(seconds);
}
