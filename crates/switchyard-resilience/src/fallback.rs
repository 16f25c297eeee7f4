// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Downward fallback across tiers.
//!
//! When a tier exhausts its retries the request moves to the configured next
//! lower tier, which gets a fresh retry budget. L1 is the only terminal tier.

use std::sync::Arc;

use switchyard_config::model::FallbackConfig;
use switchyard_core::{SwitchyardError, Tier, TierRequest, TierResponse};
use tracing::{error, info, warn};

use crate::retry::{RetryError, RetryExecutor};
use crate::table::HandlerTable;
use crate::trace::{DecisionTrace, RoutingEvent};

/// Fallback edges: every tier above L1 points to a strictly lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackEdges {
    next: [Option<Tier>; 5],
}

impl FallbackEdges {
    /// Build edges from config, rejecting any edge that does not point down.
    pub fn from_config(config: &FallbackConfig) -> Result<Self, SwitchyardError> {
        let mut next = [None; 5];
        for tier in Tier::ALL {
            if let Some(to) = config.next(tier) {
                if to >= tier {
                    return Err(SwitchyardError::Config(format!(
                        "fallback edge {tier} -> {to} must point to a lower tier"
                    )));
                }
                next[tier.index()] = Some(to);
            }
        }
        Ok(Self { next })
    }

    pub fn next(&self, tier: Tier) -> Option<Tier> {
        self.next[tier.index()]
    }

    /// The tiers visited starting at `tier`, ending at L1.
    pub fn path_from(&self, tier: Tier) -> Vec<Tier> {
        let mut path = vec![tier];
        let mut current = tier;
        while let Some(next) = self.next(current) {
            path.push(next);
            current = next;
        }
        path
    }
}

impl Default for FallbackEdges {
    fn default() -> Self {
        Self {
            next: Tier::ALL.map(Tier::lower),
        }
    }
}

/// A response together with where it was requested and where it was served.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedResponse {
    pub response: TierResponse,
    pub requested_tier: Tier,
    pub served_tier: Tier,
    /// Zero-based attempt index on the serving tier.
    pub attempt: u32,
}

impl ServedResponse {
    pub fn downgraded(&self) -> bool {
        self.served_tier < self.requested_tier
    }
}

/// Retry-then-fall-back runner over a [`HandlerTable`].
#[derive(Debug, Clone)]
pub struct FallbackChain {
    edges: FallbackEdges,
    executor: RetryExecutor,
    handlers: Arc<HandlerTable>,
}

impl FallbackChain {
    pub fn new(edges: FallbackEdges, executor: RetryExecutor, handlers: Arc<HandlerTable>) -> Self {
        Self {
            edges,
            executor,
            handlers,
        }
    }

    pub fn edges(&self) -> &FallbackEdges {
        &self.edges
    }

    /// Serve `request` starting at `request.tier`.
    ///
    /// Returns the first successful response. A non-retryable failure ends the
    /// request immediately; exhausting L1 yields `NoFallbackAvailable` carrying
    /// the error that exhausted it.
    pub async fn run(
        &self,
        request: &TierRequest,
        trace: &mut DecisionTrace,
    ) -> Result<ServedResponse, SwitchyardError> {
        let requested_tier = request.tier;
        let mut tier = requested_tier;

        loop {
            let handler = self.handlers.get(tier);
            let attempt_request = request.for_tier(tier);

            let outcome = self
                .executor
                .execute(tier, trace, |_| handler.handle(&attempt_request))
                .await;

            match outcome {
                Ok((response, attempt)) => {
                    trace.record(RoutingEvent::Served { tier, attempt });
                    if tier != requested_tier {
                        info!(
                            request_id = %request.request_id,
                            requested = %requested_tier,
                            served = %tier,
                            "request served by fallback tier"
                        );
                    }
                    return Ok(ServedResponse {
                        response,
                        requested_tier,
                        served_tier: tier,
                        attempt,
                    });
                }
                Err(RetryError::NonRetryable {
                    tier,
                    attempt,
                    source,
                }) => {
                    trace.record(RoutingEvent::Failed {
                        tier,
                        attempt,
                        reason: source.kind,
                        message: source.message.clone(),
                    });
                    return Err(SwitchyardError::NonRetryable {
                        tier,
                        attempt,
                        source,
                    });
                }
                Err(RetryError::Exhausted {
                    tier: exhausted,
                    attempts,
                    last,
                }) => match self.edges.next(exhausted) {
                    Some(next) => {
                        warn!(
                            request_id = %request.request_id,
                            from = %exhausted,
                            to = %next,
                            reason = %last.kind,
                            "tier exhausted, falling back"
                        );
                        trace.record(RoutingEvent::Fallback {
                            from: exhausted,
                            to: next,
                            reason: last.kind,
                            message: last.message,
                        });
                        tier = next;
                    }
                    None => {
                        error!(
                            request_id = %request.request_id,
                            tier = %exhausted,
                            attempts,
                            reason = %last.kind,
                            "no fallback tier left"
                        );
                        trace.record(RoutingEvent::Failed {
                            tier: exhausted,
                            attempt: attempts.saturating_sub(1),
                            reason: last.kind,
                            message: last.message.clone(),
                        });
                        return Err(SwitchyardError::NoFallbackAvailable {
                            tier: exhausted,
                            cause: last,
                        });
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_edges_step_down_one_tier() {
        let edges = FallbackEdges::default();
        assert_eq!(
            edges.path_from(Tier::L5),
            vec![Tier::L5, Tier::L4, Tier::L3, Tier::L2, Tier::L1]
        );
        assert_eq!(edges.next(Tier::L1), None);
    }

    #[test]
    fn configured_edges_may_skip_tiers() {
        let config = FallbackConfig {
            l5: Tier::L3,
            ..FallbackConfig::default()
        };
        let edges = FallbackEdges::from_config(&config).unwrap();
        assert_eq!(edges.path_from(Tier::L5), vec![Tier::L5, Tier::L3, Tier::L2, Tier::L1]);
    }

    #[test]
    fn upward_edge_is_rejected() {
        let config = FallbackConfig {
            l2: Tier::L4,
            ..FallbackConfig::default()
        };
        assert!(matches!(
            FallbackEdges::from_config(&config),
            Err(SwitchyardError::Config(_))
        ));
    }
}
