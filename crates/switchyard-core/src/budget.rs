// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of the day's budget state.
//!
//! The budget governor owns and mutates the state; everything else (tier
//! selection, usage queries, metrics) only ever sees a [`BudgetSnapshot`].

use chrono::NaiveDate;
use serde::Serialize;
use strum::Display;

/// Coarse per-day budget state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetLevel {
    Normal,
    Warning,
    Emergency,
}

/// Immutable snapshot of one day's budget counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSnapshot {
    pub date: NaiveDate,
    pub daily_budget_usd: f64,
    pub cumulative_cost: f64,
    pub cumulative_tokens: u64,
    pub request_count: u64,
    /// Threshold fractions already fired today, ascending.
    pub fired_thresholds: Vec<f64>,
    pub emergency_mode: bool,
}

impl BudgetSnapshot {
    /// A zeroed snapshot for `date`.
    pub fn fresh(date: NaiveDate, daily_budget_usd: f64) -> Self {
        Self {
            date,
            daily_budget_usd,
            cumulative_cost: 0.0,
            cumulative_tokens: 0,
            request_count: 0,
            fired_thresholds: Vec::new(),
            emergency_mode: false,
        }
    }

    /// Spend as a fraction of the daily budget (may exceed 1.0).
    pub fn percentage(&self) -> f64 {
        if self.daily_budget_usd > 0.0 {
            self.cumulative_cost / self.daily_budget_usd
        } else {
            0.0
        }
    }

    pub fn remaining_usd(&self) -> f64 {
        (self.daily_budget_usd - self.cumulative_cost).max(0.0)
    }

    pub fn level(&self) -> BudgetLevel {
        if self.emergency_mode {
            BudgetLevel::Emergency
        } else if self.fired_thresholds.is_empty() {
            BudgetLevel::Normal
        } else {
            BudgetLevel::Warning
        }
    }
}
