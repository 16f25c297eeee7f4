// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting sink for budget alerts (note vault, dashboard, chat, ...).

use async_trait::async_trait;

use crate::error::SwitchyardError;

/// Receives rendered budget alert lines.
///
/// Callers treat delivery as fire-and-forget: a returned error is logged and
/// never affects routing.
#[async_trait]
pub trait AlertSink: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Deliver one rendered alert message (one or more lines).
    async fn deliver(&self, rendered: &str) -> Result<(), SwitchyardError>;
}
