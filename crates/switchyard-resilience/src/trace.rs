// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request decision trace.
//!
//! Every routing decision, scheduled retry, fallback transition and terminal
//! failure for one request is appended here in order, alongside the matching
//! tracing event.

use serde::Serialize;
use switchyard_core::{FailureKind, Tier};

/// One observable step in a request's routing history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoutingEvent {
    /// The selector picked `tier` (from classifier recommendation `base_tier`).
    Selected {
        tier: Tier,
        base_tier: Tier,
        reason: String,
    },
    /// A retryable failure on `tier`; attempt `attempt` starts after `delay_ms`.
    RetryScheduled {
        tier: Tier,
        attempt: u32,
        delay_ms: u64,
        reason: FailureKind,
        message: String,
    },
    /// `from` exhausted its retries; the request moves to `to`.
    Fallback {
        from: Tier,
        to: Tier,
        reason: FailureKind,
        message: String,
    },
    /// `tier` produced a response on attempt `attempt`.
    Served { tier: Tier, attempt: u32 },
    /// The request ended with an error on `tier`.
    Failed {
        tier: Tier,
        attempt: u32,
        reason: FailureKind,
        message: String,
    },
}

impl std::fmt::Display for RoutingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingEvent::Selected {
                tier,
                base_tier,
                reason,
            } => write!(f, "selected {tier} (base {base_tier}): {reason}"),
            RoutingEvent::RetryScheduled {
                tier,
                attempt,
                delay_ms,
                reason,
                ..
            } => write!(f, "retry {tier} attempt {attempt} in {delay_ms}ms after {reason}"),
            RoutingEvent::Fallback {
                from, to, reason, ..
            } => write!(f, "fallback {from} -> {to} after {reason}"),
            RoutingEvent::Served { tier, attempt } => {
                write!(f, "served by {tier} on attempt {attempt}")
            }
            RoutingEvent::Failed {
                tier,
                attempt,
                reason,
                message,
            } => write!(f, "failed on {tier} attempt {attempt}: {reason}: {message}"),
        }
    }
}

/// Ordered routing events for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionTrace {
    events: Vec<RoutingEvent>,
}

impl DecisionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: RoutingEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[RoutingEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Scheduled retries, optionally restricted to one tier.
    pub fn retries(&self, tier: Option<Tier>) -> usize {
        self.events
            .iter()
            .filter(|e| match e {
                RoutingEvent::RetryScheduled { tier: t, .. } => tier.is_none_or(|want| *t == want),
                _ => false,
            })
            .count()
    }

    /// `(from, to)` pairs of every fallback transition, in order.
    pub fn fallbacks(&self) -> Vec<(Tier, Tier)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RoutingEvent::Fallback { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// The tier the request was last on: the fallback target after a
    /// transition, otherwise the tier of the latest event.
    pub fn current_tier(&self) -> Option<Tier> {
        self.events.last().map(|e| match e {
            RoutingEvent::Selected { tier, .. }
            | RoutingEvent::RetryScheduled { tier, .. }
            | RoutingEvent::Served { tier, .. }
            | RoutingEvent::Failed { tier, .. } => *tier,
            RoutingEvent::Fallback { to, .. } => *to,
        })
    }

    /// Sum of all scheduled backoff delays.
    pub fn total_backoff_ms(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                RoutingEvent::RetryScheduled { delay_ms, .. } => *delay_ms,
                _ => 0,
            })
            .sum()
    }
}

/// Events joined with `; `, for one-line log fields.
impl std::fmt::Display for DecisionTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{event}")?;
        }
        Ok(())
    }
}
