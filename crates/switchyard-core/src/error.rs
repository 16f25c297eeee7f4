// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Switchyard.
//!
//! Tier handlers fail with a [`HandlerError`] whose [`FailureKind`] is one of
//! a fixed taxonomy. Everything surfaced to a caller is a [`SwitchyardError`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::tier::Tier;

/// Normalized failure categories every tier handler must report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider is throttling requests.
    RateLimit,
    /// The provider reports it is overloaded or temporarily unavailable.
    Overloaded,
    /// Connection reset, timeout, refused connection, or unresolvable host.
    Network,
    /// Anything else: malformed request, authentication failure, bugs.
    Other,
}

impl FailureKind {
    /// Whether a failure of this kind is worth retrying on the same tier.
    pub fn is_retryable(self) -> bool {
        !matches!(self, FailureKind::Other)
    }
}

/// A failure reported by a tier handler, already normalized.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct HandlerError {
    pub kind: FailureKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(FailureKind::RateLimit, message)
    }

    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Overloaded, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Other, message)
    }

    /// Attach the underlying provider error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// The error type surfaced by Switchyard components and the dispatcher.
#[derive(Debug, Error)]
pub enum SwitchyardError {
    /// Invalid or inconsistent configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Usage log backend failures.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A handler failed in a way retrying cannot fix. No fallback was tried.
    #[error("non-retryable failure on tier {tier} (attempt {attempt}): {source}")]
    NonRetryable {
        tier: Tier,
        attempt: u32,
        source: HandlerError,
    },

    /// Every tier along the fallback chain was exhausted.
    #[error("no fallback available after tier {tier} was exhausted: {cause}")]
    NoFallbackAvailable {
        tier: Tier,
        #[source]
        cause: HandlerError,
    },

    /// The handler table has no entry for a tier.
    #[error("no handler registered for tier {tier}")]
    HandlerNotRegistered { tier: Tier },

    /// The caller-imposed deadline elapsed.
    #[error("request timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The caller abandoned the request.
    #[error("request cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
