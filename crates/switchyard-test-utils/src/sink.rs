// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert sink that captures deliveries for assertions.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use switchyard_core::{AlertSink, SwitchyardError};

/// Records every rendered batch it receives.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records the attempt and then returns an error.
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every batch received, in order.
    pub async fn delivered(&self) -> Vec<String> {
        self.delivered.lock().await.clone()
    }

    /// Individual alert lines across all batches.
    pub async fn lines(&self) -> Vec<String> {
        self.delivered
            .lock()
            .await
            .iter()
            .flat_map(|batch| batch.lines().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, rendered: &str) -> Result<(), SwitchyardError> {
        self.delivered.lock().await.push(rendered.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(SwitchyardError::Internal("recording sink set to fail".into()));
        }
        Ok(())
    }
}
