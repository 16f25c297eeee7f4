// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end dispatch tests.
//!
//! `TestHarness` assembles a complete [`Dispatcher`] with scripted tier
//! handlers, a manual clock, an in-memory usage log and a recording alert
//! sink. Every collaborator stays reachable for assertions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use switchyard_agent::{DispatchOutcome, Dispatcher};
use switchyard_config::SwitchyardConfig;
use switchyard_core::{ManualClock, SwitchyardError, Tier};
use switchyard_cost::{AlertDispatcher, MemoryUsageLog};
use switchyard_resilience::HandlerTable;

use crate::scripted::ScriptedHandler;
use crate::sink::RecordingSink;
use crate::weekday_afternoon;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: SwitchyardConfig,
    handlers: [Option<ScriptedHandler>; 5],
    start: DateTime<FixedOffset>,
    sink: RecordingSink,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: SwitchyardConfig::default(),
            handlers: [None, None, None, None, None],
            start: weekday_afternoon(),
            sink: RecordingSink::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: SwitchyardConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the daily budget cap.
    pub fn with_budget(mut self, daily_usd: f64) -> Self {
        self.config.budget.daily_budget_usd = daily_usd;
        self
    }

    /// Bound every dispatch by `secs`.
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.config.retry.request_timeout_secs = Some(secs);
        self
    }

    /// Script the handler for `tier`. Unscripted tiers always succeed.
    pub fn with_handler(mut self, tier: Tier, handler: ScriptedHandler) -> Self {
        self.handlers[tier.index()] = Some(handler);
        self
    }

    /// Start the manual clock at `at`.
    pub fn starting_at(mut self, at: DateTime<FixedOffset>) -> Self {
        self.start = at;
        self
    }

    pub fn with_sink(mut self, sink: RecordingSink) -> Self {
        self.sink = sink;
        self
    }

    /// Build the harness and the dispatcher behind it.
    pub async fn build(self) -> Result<TestHarness, SwitchyardError> {
        let clock = Arc::new(ManualClock::new(self.start));

        let handlers: [Arc<ScriptedHandler>; 5] = {
            let mut scripted = self.handlers.into_iter();
            Tier::ALL.map(|tier| {
                let handler = scripted
                    .next()
                    .flatten()
                    .unwrap_or_else(|| ScriptedHandler::new(tier.to_string()));
                Arc::new(handler)
            })
        };

        let mut table = HandlerTable::builder();
        for tier in Tier::ALL {
            table = table.handler(tier, handlers[tier.index()].clone());
        }

        let log = Arc::new(MemoryUsageLog::new(self.config.usage.max_records));
        let sink = Arc::new(self.sink);
        let alerts = AlertDispatcher::new(
            Some(sink.clone()),
            Duration::from_secs(self.config.alerts.min_interval_secs),
        );

        let dispatcher = Dispatcher::new(
            &self.config,
            table.build()?,
            clock.clone(),
            log.clone(),
            alerts,
        )
        .await?;

        Ok(TestHarness {
            dispatcher,
            clock,
            handlers,
            log,
            sink,
            config: self.config,
        })
    }
}

/// A complete dispatch environment with scripted handlers.
pub struct TestHarness {
    pub dispatcher: Dispatcher,
    pub clock: Arc<ManualClock>,
    /// Scripted handlers indexed by tier.
    pub handlers: [Arc<ScriptedHandler>; 5],
    pub log: Arc<MemoryUsageLog>,
    pub sink: Arc<RecordingSink>,
    pub config: SwitchyardConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default configuration and always-succeeding handlers.
    pub async fn new() -> Result<Self, SwitchyardError> {
        Self::builder().build().await
    }

    pub fn handler(&self, tier: Tier) -> &Arc<ScriptedHandler> {
        &self.handlers[tier.index()]
    }

    pub async fn dispatch(&self, text: &str) -> Result<DispatchOutcome, SwitchyardError> {
        self.dispatcher.dispatch(text).await
    }

    /// Calls received per tier, L1 first.
    pub fn calls(&self) -> [usize; 5] {
        Tier::ALL.map(|tier| self.handler(tier).calls())
    }
}
