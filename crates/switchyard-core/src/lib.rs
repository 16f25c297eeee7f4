// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Switchyard, a tiered request router.
//!
//! This crate provides the shared vocabulary of the workspace: the five
//! ordered [`Tier`]s, the request/response types exchanged with tier
//! handlers, the normalized failure taxonomy, and the traits implemented by
//! external collaborators (tier handlers, alert sinks, clocks).

pub mod budget;
pub mod error;
pub mod tier;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use budget::{BudgetLevel, BudgetSnapshot};
pub use error::{FailureKind, HandlerError, SwitchyardError};
pub use tier::Tier;
pub use traits::{AlertSink, Clock, ManualClock, SystemClock, TierHandler};
pub use types::{TierRequest, TierResponse, TokenUsage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switchyard_error_variants_construct() {
        let _config = SwitchyardError::Config("test".into());
        let _storage = SwitchyardError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _non_retryable = SwitchyardError::NonRetryable {
            tier: Tier::L3,
            attempt: 0,
            source: HandlerError::other("bad request"),
        };
        let _no_fallback = SwitchyardError::NoFallbackAvailable {
            tier: Tier::L1,
            cause: HandlerError::network("ECONNREFUSED"),
        };
        let _missing = SwitchyardError::HandlerNotRegistered { tier: Tier::L2 };
        let _timeout = SwitchyardError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _cancelled = SwitchyardError::Cancelled;
        let _internal = SwitchyardError::Internal("test".into());
    }

    #[test]
    fn all_traits_are_object_safe() {
        fn _handler(_: &dyn TierHandler) {}
        fn _sink(_: &dyn AlertSink) {}
        fn _clock(_: &dyn Clock) {}
    }
}
