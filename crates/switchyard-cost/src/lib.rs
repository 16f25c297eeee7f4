// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget governance and usage tracking for Switchyard.
//!
//! This crate provides:
//! - **Budget governor**: the daily cost/token/request counters, threshold
//!   alerts, and the emergency flag, with automatic recovery at day rollover
//! - **Usage tracker**: one immutable record per completed call, fed to the governor
//! - **Usage logs**: capped in-memory and SQLite-backed append-only logs
//! - **Alerts**: single-line rendering, hourly throttling, fire-and-forget sinks

pub mod alerts;
pub mod governor;
pub mod log;
pub mod tracker;

use std::sync::Arc;

use switchyard_config::model::{UsageBackend, UsageConfig};
use switchyard_core::SwitchyardError;

pub use alerts::{AlertDelivery, AlertDispatcher, FileAlertSink, LogAlertSink, render_alert};
pub use governor::{AlertSeverity, BudgetAlert, BudgetGovernor, GovernorUpdate};
pub use log::{DailyTotals, MemoryUsageLog, SqliteUsageLog, UsageLog, UsageRecord};
pub use tracker::{TrackedUsage, UsageSummary, UsageTracker};

/// Open the usage log selected by `[usage]`.
pub async fn open_usage_log(config: &UsageConfig) -> Result<Arc<dyn UsageLog>, SwitchyardError> {
    Ok(match config.backend {
        UsageBackend::Memory => Arc::new(MemoryUsageLog::new(config.max_records)),
        UsageBackend::Sqlite => Arc::new(SqliteUsageLog::open(&config.database_path).await?),
    })
}
