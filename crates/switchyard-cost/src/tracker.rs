// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage tracking: record, log, govern, alert.
//!
//! For every completed call the tracker appends an immutable [`UsageRecord`]
//! to the usage log, forwards it to the [`BudgetGovernor`], and hands any
//! newly fired alerts to the [`AlertDispatcher`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::Serialize;
use switchyard_core::{BudgetLevel, BudgetSnapshot, Clock, SwitchyardError, Tier, TokenUsage};
use tracing::{debug, error, info};

use crate::alerts::{AlertDelivery, AlertDispatcher};
use crate::governor::{BudgetAlert, BudgetGovernor, checked_cost};
use crate::log::{UsageLog, UsageRecord};

/// Result of tracking one call.
#[derive(Debug)]
pub struct TrackedUsage {
    pub record: UsageRecord,
    /// False when the usage log rejected the record (already logged at ERROR).
    pub persisted: bool,
    pub alerts: Vec<BudgetAlert>,
    pub snapshot: Arc<BudgetSnapshot>,
    pub delivery: AlertDelivery,
}

/// Read-only aggregate for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub date: NaiveDate,
    pub cost_usd: f64,
    pub tokens: u64,
    pub request_count: u64,
    pub daily_budget_usd: f64,
    /// Spend as a fraction of the daily budget.
    pub percentage: f64,
    pub remaining_usd: f64,
    pub level: BudgetLevel,
    pub emergency_mode: bool,
}

impl From<&BudgetSnapshot> for UsageSummary {
    fn from(snap: &BudgetSnapshot) -> Self {
        Self {
            date: snap.date,
            cost_usd: snap.cumulative_cost,
            tokens: snap.cumulative_tokens,
            request_count: snap.request_count,
            daily_budget_usd: snap.daily_budget_usd,
            percentage: snap.percentage(),
            remaining_usd: snap.remaining_usd(),
            level: snap.level(),
            emergency_mode: snap.emergency_mode,
        }
    }
}

pub struct UsageTracker {
    governor: Arc<BudgetGovernor>,
    log: Arc<dyn UsageLog>,
    alerts: AlertDispatcher,
    clock: Arc<dyn Clock>,
    /// Every Nth event is logged at INFO, the rest at DEBUG.
    log_every: u64,
    events: AtomicU64,
}

impl UsageTracker {
    pub fn new(
        governor: Arc<BudgetGovernor>,
        log: Arc<dyn UsageLog>,
        alerts: AlertDispatcher,
        clock: Arc<dyn Clock>,
        log_every: u32,
    ) -> Self {
        Self {
            governor,
            log,
            alerts,
            clock,
            log_every: u64::from(log_every.max(1)),
            events: AtomicU64::new(0),
        }
    }

    pub fn governor(&self) -> &Arc<BudgetGovernor> {
        &self.governor
    }

    pub fn log(&self) -> &Arc<dyn UsageLog> {
        &self.log
    }

    /// Record one completed call.
    ///
    /// The governor is updated even when the log append fails, so the budget
    /// stays correct for the rest of the run. Invalid costs are zeroed before
    /// the record is built so the log and the governor agree.
    pub async fn track_usage(&self, tier: Tier, tokens: TokenUsage, cost_usd: f64) -> TrackedUsage {
        let cost_usd = checked_cost(tier, cost_usd);
        let record = UsageRecord::new(tier, tokens, cost_usd, self.clock.now());

        let persisted = match self.log.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    id = %record.id,
                    tier = %tier,
                    backend = self.log.backend(),
                    error = %e,
                    "failed to append usage record"
                );
                false
            }
        };

        let update = self.governor.track_usage(tier, &record.tokens, record.cost_usd);
        let delivery = self.alerts.dispatch(&update.alerts).await;

        let n = self.events.fetch_add(1, Ordering::Relaxed) + 1;
        let snap = &update.snapshot;
        if n % self.log_every == 0 {
            info!(
                tier = %tier,
                tokens = record.tokens.total,
                cost_usd = record.cost_usd,
                daily_cost_usd = snap.cumulative_cost,
                percentage = snap.percentage() * 100.0,
                requests = snap.request_count,
                "usage recorded"
            );
        } else {
            debug!(
                tier = %tier,
                tokens = record.tokens.total,
                cost_usd = record.cost_usd,
                daily_cost_usd = snap.cumulative_cost,
                "usage recorded"
            );
        }

        TrackedUsage {
            record,
            persisted,
            alerts: update.alerts,
            snapshot: update.snapshot,
            delivery,
        }
    }

    /// Aggregate for the current day, from the governor's snapshot.
    pub fn today(&self) -> UsageSummary {
        UsageSummary::from(self.governor.snapshot().as_ref())
    }

    /// Records for `date` straight from the usage log.
    pub async fn records_for(&self, date: NaiveDate) -> Result<Vec<UsageRecord>, SwitchyardError> {
        self.log.records_for_date(date).await
    }
}
