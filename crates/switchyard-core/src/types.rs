// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response shapes exchanged with tier handlers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Token counts reported by a tier handler for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    /// Build a usage record whose total is the sum of input and output.
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// A normalized request handed to a tier handler.
///
/// The same logical request is replayed unchanged on every retry and on
/// every tier along the fallback chain; only `tier` changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TierRequest {
    /// Identifier shared by every attempt of one logical request.
    pub request_id: String,
    /// Tier the handler is being invoked for.
    pub tier: Tier,
    /// The user's request text.
    pub text: String,
    /// Free-form context forwarded to the provider (mood, time bucket, ...).
    pub context: BTreeMap<String, String>,
}

impl TierRequest {
    pub fn new(request_id: impl Into<String>, tier: Tier, text: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            tier,
            text: text.into(),
            context: BTreeMap::new(),
        }
    }

    /// Attach a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// The same request retargeted at another tier.
    pub fn for_tier(&self, tier: Tier) -> Self {
        Self {
            tier,
            ..self.clone()
        }
    }
}

/// A successful response from a tier handler.
///
/// `content` is opaque to the routing core.
#[derive(Debug, Clone, PartialEq)]
pub struct TierResponse {
    pub content: String,
    pub tokens: TokenUsage,
    /// Cost of the call in the budget currency.
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_new_sums_total() {
        let usage = TokenUsage::new(120, 30);
        assert_eq!(usage.total, 150);
    }

    #[test]
    fn for_tier_keeps_request_identity() {
        let request = TierRequest::new("req-1", Tier::L5, "explain monads")
            .with_context("mood", "neutral");
        let retargeted = request.for_tier(Tier::L4);
        assert_eq!(retargeted.tier, Tier::L4);
        assert_eq!(retargeted.request_id, "req-1");
        assert_eq!(retargeted.text, request.text);
        assert_eq!(retargeted.context, request.context);
    }
}
