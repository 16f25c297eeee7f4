// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded exponential-backoff retry for a single tier.
//!
//! Attempt 0 runs immediately. Before attempt `n` (1..=max_retries) the
//! executor sleeps `base_delay * 2^(n-1)`. Non-retryable failures return at
//! once. The sleep lives inside the caller's future, so dropping the future
//! (timeout, cancellation) cancels any pending backoff.

use std::future::Future;
use std::time::Duration;

use switchyard_config::model::RetryConfig;
use switchyard_core::{HandlerError, Tier};
use thiserror::Error;
use tracing::{debug, warn};

use crate::trace::{DecisionTrace, RoutingEvent};

/// Why a tier gave up.
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every allowed attempt failed with a retryable error.
    #[error("tier {tier} exhausted after {attempts} attempts: {last}")]
    Exhausted {
        tier: Tier,
        attempts: u32,
        #[source]
        last: HandlerError,
    },

    /// A failure that must not be retried or routed elsewhere.
    #[error("non-retryable failure on tier {tier} (attempt {attempt}): {source}")]
    NonRetryable {
        tier: Tier,
        attempt: u32,
        source: HandlerError,
    },
}

/// Retry count and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.base_delay_ms))
    }

    /// Delay before attempt `attempt`. Zero for attempt 0.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Total time slept when every attempt fails retryably.
    pub fn worst_case_backoff(&self) -> Duration {
        (1..=self.max_retries)
            .map(|a| self.delay_for(a))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Runs one tier's operation under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, fails non-retryably, or runs out of attempts.
    ///
    /// `op` receives the zero-based attempt index. Each scheduled retry is
    /// recorded in `trace` before the backoff sleep starts.
    pub async fn execute<T, F, Fut>(
        &self,
        tier: Tier,
        trace: &mut DecisionTrace,
        mut op: F,
    ) -> Result<(T, u32), RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, HandlerError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    debug!(tier = %tier, attempt, "tier attempt succeeded");
                    return Ok((value, attempt));
                }
                Err(error) if !error.is_retryable() => {
                    warn!(
                        tier = %tier,
                        attempt,
                        reason = %error.kind,
                        error = %error.message,
                        "non-retryable tier failure"
                    );
                    return Err(RetryError::NonRetryable {
                        tier,
                        attempt,
                        source: error,
                    });
                }
                Err(error) if attempt >= self.policy.max_retries => {
                    warn!(
                        tier = %tier,
                        attempts = attempt + 1,
                        reason = %error.kind,
                        error = %error.message,
                        "tier exhausted retries"
                    );
                    return Err(RetryError::Exhausted {
                        tier,
                        attempts: attempt + 1,
                        last: error,
                    });
                }
                Err(error) => {
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt);
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        tier = %tier,
                        attempt,
                        delay_ms,
                        reason = %error.kind,
                        error = %error.message,
                        "retryable tier failure, backing off"
                    );
                    trace.record(RoutingEvent::RetryScheduled {
                        tier,
                        attempt,
                        delay_ms,
                        reason: error.kind,
                        message: error.message,
                    });
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
