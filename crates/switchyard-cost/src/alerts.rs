// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budget alert rendering, throttling, and fire-and-forget delivery.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use switchyard_config::model::{AlertConfig, AlertSinkKind};
use switchyard_core::{AlertSink, SwitchyardError};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::governor::BudgetAlert;

/// Render one alert as a single line.
///
/// `[CRITICAL] 2026-03-01 daily spend $4.60 of $5.00 (92%) crossed 90% threshold`
pub fn render_alert(alert: &BudgetAlert) -> String {
    format!(
        "[{}] {} daily spend ${:.2} of ${:.2} ({:.0}%) crossed {:.0}% threshold",
        alert.severity,
        alert.date,
        alert.cumulative_cost,
        alert.daily_budget_usd,
        alert.percentage * 100.0,
        alert.threshold * 100.0,
    )
}

/// What happened to a batch of alerts.
#[derive(Debug)]
pub enum AlertDelivery {
    /// Nothing to send.
    Empty,
    /// No sink configured.
    Disabled,
    /// Inside the throttle window; logged only.
    Throttled,
    /// Handed to the sink on a background task.
    Spawned(JoinHandle<()>),
}

/// Throttled, fire-and-forget alert delivery.
pub struct AlertDispatcher {
    sink: Option<Arc<dyn AlertSink>>,
    min_interval: Duration,
    last_delivery: Mutex<Option<Instant>>,
}

impl AlertDispatcher {
    pub fn new(sink: Option<Arc<dyn AlertSink>>, min_interval: Duration) -> Self {
        Self {
            sink,
            min_interval,
            last_delivery: Mutex::new(None),
        }
    }

    /// Build the dispatcher described by `[alerts]`.
    pub fn from_config(config: &AlertConfig) -> Result<Self, SwitchyardError> {
        let sink: Option<Arc<dyn AlertSink>> = match config.sink {
            AlertSinkKind::Log => Some(Arc::new(LogAlertSink)),
            AlertSinkKind::File => {
                let path = config.file_path.as_deref().ok_or_else(|| {
                    SwitchyardError::Config("alerts.file_path is required for the file sink".into())
                })?;
                Some(Arc::new(FileAlertSink::new(path)))
            }
            AlertSinkKind::Disabled => None,
        };
        Ok(Self::new(sink, Duration::from_secs(config.min_interval_secs)))
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Log every alert, then deliver the batch unless throttled.
    ///
    /// Sink failures are logged on the delivery task and never reach the caller.
    pub async fn dispatch(&self, alerts: &[BudgetAlert]) -> AlertDelivery {
        if alerts.is_empty() {
            return AlertDelivery::Empty;
        }

        let lines: Vec<String> = alerts.iter().map(render_alert).collect();
        for line in &lines {
            warn!(alert = %line, "budget alert");
        }

        let Some(sink) = self.sink.as_ref().map(Arc::clone) else {
            return AlertDelivery::Disabled;
        };

        {
            let mut last = self.last_delivery.lock().await;
            let now = Instant::now();
            if let Some(previous) = *last {
                if now.duration_since(previous) < self.min_interval {
                    info!(
                        sink = sink.name(),
                        suppressed = lines.len(),
                        "alert delivery throttled"
                    );
                    return AlertDelivery::Throttled;
                }
            }
            *last = Some(now);
        }

        let rendered = lines.join("\n");
        AlertDelivery::Spawned(tokio::spawn(async move {
            if let Err(e) = sink.deliver(&rendered).await {
                warn!(sink = sink.name(), error = %e, "alert delivery failed");
            }
        }))
    }
}

/// Emits alerts as tracing events on the `switchyard::alerts` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, rendered: &str) -> Result<(), SwitchyardError> {
        for line in rendered.lines() {
            warn!(target: "switchyard::alerts", "{line}");
        }
        Ok(())
    }
}

/// Appends alerts to a markdown file as bullet lines.
#[derive(Debug, Clone)]
pub struct FileAlertSink {
    path: PathBuf,
}

impl FileAlertSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn storage_err(e: std::io::Error) -> SwitchyardError {
    SwitchyardError::Storage {
        source: Box::new(e),
    }
}

#[async_trait]
impl AlertSink for FileAlertSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn deliver(&self, rendered: &str) -> Result<(), SwitchyardError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(storage_err)?;

        let mut body = String::new();
        for line in rendered.lines() {
            body.push_str("- ");
            body.push_str(line);
            body.push('\n');
        }
        file.write_all(body.as_bytes()).await.map_err(storage_err)?;
        file.flush().await.map_err(storage_err)
    }
}
