// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Switchyard integration tests.
//!
//! Provides scripted collaborators and test harness infrastructure for fast,
//! deterministic tests without real providers.
//!
//! # Components
//!
//! - [`ScriptedHandler`] - Tier handler that plays back a queue of steps
//! - [`RecordingSink`] - Alert sink that captures deliveries
//! - [`TestHarness`] - A full dispatcher on a manual clock

pub mod harness;
pub mod scripted;
pub mod sink;

use chrono::{DateTime, FixedOffset, TimeZone};

pub use harness::{TestHarness, TestHarnessBuilder};
pub use scripted::{ScriptedHandler, Step};
pub use sink::RecordingSink;

/// A fixed instant at UTC+0. Panics on an invalid date; test use only.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .and_then(|utc| {
            utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
                .single()
        })
        .unwrap_or_else(|| panic!("invalid test time {year}-{month}-{day} {hour}:{minute}"))
}

/// Wednesday 2026-03-04 14:00: a neutral weekday afternoon.
pub fn weekday_afternoon() -> DateTime<FixedOffset> {
    at(2026, 3, 4, 14, 0)
}
