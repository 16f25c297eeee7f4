// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for Switchyard.
//!
//! - [`RetryExecutor`]: bounded exponential backoff on one tier.
//! - [`FallbackChain`]: walks the downward fallback edges when a tier is exhausted.
//! - [`HandlerTable`]: the static tier-to-handler mapping.
//! - [`NormalizingHandler`]: adapts provider clients to the failure taxonomy.
//! - [`DecisionTrace`]: per-request record of every routing step.

pub mod fallback;
pub mod normalize;
pub mod retry;
pub mod table;
pub mod trace;

pub use fallback::{FallbackChain, FallbackEdges, ServedResponse};
pub use normalize::{
    DefaultNormalizer, FailureNormalizer, NormalizingHandler, ProviderClient, ProviderFailure,
    classify_message, classify_status,
};
pub use retry::{RetryError, RetryExecutor, RetryPolicy};
pub use table::{HandlerTable, HandlerTableBuilder};
pub use trace::{DecisionTrace, RoutingEvent};
