// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier handler trait: the seam to the external text-generation providers.

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::types::{TierRequest, TierResponse};

/// Serves requests for one tier.
///
/// Implementations are opaque to the routing core. They must report every
/// failure through the normalized [`HandlerError`] taxonomy so the retry and
/// fallback layers can decide what to do without inspecting provider-specific
/// error shapes.
#[async_trait]
pub trait TierHandler: Send + Sync + 'static {
    /// Human-readable name used in logs (e.g. the provider/model behind the tier).
    fn name(&self) -> &str;

    /// Generate a response for the request.
    async fn handle(&self, request: &TierRequest) -> Result<TierResponse, HandlerError>;
}
