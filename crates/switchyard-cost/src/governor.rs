// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily budget governor.
//!
//! Owns the day's cumulative cost, token and request counters, the set of
//! thresholds already fired, and the emergency flag. Writes are serialized
//! through one mutex; after each write an immutable [`BudgetSnapshot`] is
//! published through an `ArcSwap` so readers never block.
//!
//! State resets exactly once per calendar-date change (per the injected
//! [`Clock`]), which is also the only way out of emergency mode.
//!
//! On restart, [`BudgetGovernor::from_log`] rehydrates today's totals from the
//! usage log so thresholds already crossed do not fire a second time.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::Serialize;
use strum::Display;
use switchyard_config::model::BudgetConfig;
use switchyard_core::{BudgetSnapshot, Clock, SwitchyardError, Tier, TokenUsage};
use tracing::{debug, error, info, warn};

use crate::log::UsageLog;

/// Severity of a threshold alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// A threshold crossed for the first time today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetAlert {
    pub date: chrono::NaiveDate,
    pub threshold: f64,
    pub severity: AlertSeverity,
    pub cumulative_cost: f64,
    pub daily_budget_usd: f64,
    pub percentage: f64,
}

/// Result of one `track_usage` call.
#[derive(Debug, Clone)]
pub struct GovernorUpdate {
    /// Alerts newly fired by this call, ascending by threshold.
    pub alerts: Vec<BudgetAlert>,
    pub snapshot: Arc<BudgetSnapshot>,
    /// Whether this call rolled the state over to a new date.
    pub rolled_over: bool,
    /// Whether this call switched emergency mode on.
    pub entered_emergency: bool,
}

/// Validated budget parameters.
#[derive(Debug, Clone, PartialEq)]
struct Limits {
    daily_budget_usd: f64,
    /// Strictly ascending.
    thresholds: Vec<f64>,
    emergency_threshold: f64,
}

impl Limits {
    fn from_config(config: &BudgetConfig) -> Result<Self, SwitchyardError> {
        if !(config.daily_budget_usd.is_finite() && config.daily_budget_usd > 0.0) {
            return Err(SwitchyardError::Config(format!(
                "daily budget must be positive, got {}",
                config.daily_budget_usd
            )));
        }
        let mut thresholds = config.thresholds.clone();
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        if !thresholds
            .iter()
            .any(|t| (t - config.emergency_threshold).abs() < f64::EPSILON)
        {
            return Err(SwitchyardError::Config(format!(
                "emergency threshold {} is not one of the configured thresholds",
                config.emergency_threshold
            )));
        }
        Ok(Self {
            daily_budget_usd: config.daily_budget_usd,
            thresholds,
            emergency_threshold: config.emergency_threshold,
        })
    }

    fn severity(&self, threshold: f64) -> AlertSeverity {
        if threshold >= self.emergency_threshold {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        }
    }

    fn emergency_fired(&self, fired: &[f64]) -> bool {
        fired.iter().any(|t| *t >= self.emergency_threshold)
    }
}

/// The single owner of daily budget state.
pub struct BudgetGovernor {
    limits: Limits,
    clock: Arc<dyn Clock>,
    state: Mutex<BudgetSnapshot>,
    published: ArcSwap<BudgetSnapshot>,
}

/// Negative or non-finite costs count as zero.
pub(crate) fn checked_cost(tier: Tier, cost_usd: f64) -> f64 {
    if cost_usd.is_finite() && cost_usd >= 0.0 {
        cost_usd
    } else {
        warn!(tier = %tier, cost_usd, "ignoring invalid usage cost");
        0.0
    }
}

impl BudgetGovernor {
    pub fn new(config: &BudgetConfig, clock: Arc<dyn Clock>) -> Result<Self, SwitchyardError> {
        let limits = Limits::from_config(config)?;
        let initial = BudgetSnapshot::fresh(clock.today(), limits.daily_budget_usd);
        Ok(Self {
            published: ArcSwap::from_pointee(initial.clone()),
            state: Mutex::new(initial),
            limits,
            clock,
        })
    }

    /// Build a governor with today's totals taken from `log`.
    ///
    /// Thresholds already crossed are marked fired without raising alerts, and
    /// emergency mode is restored if the emergency threshold was among them.
    pub async fn from_log(
        config: &BudgetConfig,
        clock: Arc<dyn Clock>,
        log: &dyn UsageLog,
    ) -> Result<Self, SwitchyardError> {
        let governor = Self::new(config, clock)?;
        let today = governor.clock.today();
        let totals = log.daily_totals(today).await?;

        let mut state = BudgetSnapshot::fresh(today, governor.limits.daily_budget_usd);
        state.cumulative_cost = totals.cost_usd;
        state.cumulative_tokens = totals.tokens;
        state.request_count = totals.requests;
        let percentage = state.percentage();
        state.fired_thresholds = governor
            .limits
            .thresholds
            .iter()
            .copied()
            .filter(|t| percentage >= *t)
            .collect();
        state.emergency_mode = governor.limits.emergency_fired(&state.fired_thresholds);

        info!(
            backend = log.backend(),
            date = %today,
            cost_usd = state.cumulative_cost,
            requests = state.request_count,
            percentage = percentage * 100.0,
            emergency = state.emergency_mode,
            "budget state restored from usage log"
        );

        governor.published.store(Arc::new(state.clone()));
        *governor.lock_state() = state;
        Ok(governor)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BudgetSnapshot> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn daily_budget_usd(&self) -> f64 {
        self.limits.daily_budget_usd
    }

    /// Record one completed call and fire any thresholds it crosses.
    pub fn track_usage(&self, tier: Tier, tokens: &TokenUsage, cost_usd: f64) -> GovernorUpdate {
        let cost_usd = checked_cost(tier, cost_usd);

        let today = self.clock.today();
        let mut state = self.lock_state();

        let rolled_over = state.date != today;
        if rolled_over {
            info!(
                previous = %state.date,
                today = %today,
                previous_cost_usd = state.cumulative_cost,
                was_emergency = state.emergency_mode,
                "new day, budget state reset"
            );
            *state = BudgetSnapshot::fresh(today, self.limits.daily_budget_usd);
        }

        state.cumulative_cost += cost_usd;
        state.cumulative_tokens += tokens.total;
        state.request_count += 1;
        let percentage = state.percentage();

        let mut alerts = Vec::new();
        for threshold in &self.limits.thresholds {
            let already = state.fired_thresholds.contains(threshold);
            if !already && percentage >= *threshold {
                state.fired_thresholds.push(*threshold);
                let alert = BudgetAlert {
                    date: today,
                    threshold: *threshold,
                    severity: self.limits.severity(*threshold),
                    cumulative_cost: state.cumulative_cost,
                    daily_budget_usd: self.limits.daily_budget_usd,
                    percentage,
                };
                match alert.severity {
                    AlertSeverity::Warning => warn!(
                        threshold = threshold * 100.0,
                        cost_usd = state.cumulative_cost,
                        percentage = percentage * 100.0,
                        "budget threshold crossed"
                    ),
                    AlertSeverity::Critical => error!(
                        threshold = threshold * 100.0,
                        cost_usd = state.cumulative_cost,
                        percentage = percentage * 100.0,
                        "critical budget threshold crossed"
                    ),
                }
                alerts.push(alert);
            }
        }

        let entered_emergency =
            !state.emergency_mode && self.limits.emergency_fired(&state.fired_thresholds);
        if entered_emergency {
            state.emergency_mode = true;
            error!(
                cost_usd = state.cumulative_cost,
                daily_budget_usd = self.limits.daily_budget_usd,
                "emergency mode engaged, high tiers capped until tomorrow"
            );
        }

        debug!(
            tier = %tier,
            cost_usd,
            cumulative_cost_usd = state.cumulative_cost,
            requests = state.request_count,
            "budget updated"
        );

        let snapshot = Arc::new(state.clone());
        self.published.store(Arc::clone(&snapshot));

        GovernorUpdate {
            alerts,
            snapshot,
            rolled_over,
            entered_emergency,
        }
    }

    /// Lock-free read of the current state.
    ///
    /// If the date has rolled over since the last write, a fresh NORMAL state
    /// for today is returned; stored state is left untouched until the next
    /// `track_usage`.
    pub fn snapshot(&self) -> Arc<BudgetSnapshot> {
        let current = self.published.load_full();
        let today = self.clock.today();
        if current.date == today {
            current
        } else {
            Arc::new(BudgetSnapshot::fresh(today, self.limits.daily_budget_usd))
        }
    }

    pub fn emergency_mode(&self) -> bool {
        self.snapshot().emergency_mode
    }
}

impl std::fmt::Debug for BudgetGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetGovernor")
            .field("limits", &self.limits)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
