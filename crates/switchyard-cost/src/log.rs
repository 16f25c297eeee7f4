// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only usage log.
//!
//! Every completed request produces one immutable [`UsageRecord`]. Two
//! backends exist: a capped in-memory log and a SQLite log that survives
//! restarts and feeds [`BudgetGovernor::from_log`](crate::BudgetGovernor::from_log).

use std::collections::VecDeque;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use switchyard_core::{SwitchyardError, Tier, TokenUsage};
use tokio::sync::Mutex;
use tracing::debug;

/// One completed call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRecord {
    /// UUID v4.
    pub id: String,
    pub tier: Tier,
    pub tokens: TokenUsage,
    pub cost_usd: f64,
    pub timestamp: DateTime<FixedOffset>,
}

impl UsageRecord {
    pub fn new(tier: Tier, tokens: TokenUsage, cost_usd: f64, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tier,
            tokens,
            cost_usd,
            timestamp,
        }
    }

    /// Calendar date of the record in its own offset.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Aggregate of one day's records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub cost_usd: f64,
    pub tokens: u64,
    pub requests: u64,
}

impl DailyTotals {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            cost_usd: 0.0,
            tokens: 0,
            requests: 0,
        }
    }

    fn from_records(date: NaiveDate, records: &[UsageRecord]) -> Self {
        records.iter().fold(Self::empty(date), |mut acc, r| {
            acc.cost_usd += r.cost_usd;
            acc.tokens += r.tokens.total;
            acc.requests += 1;
            acc
        })
    }
}

/// Storage for usage records.
#[async_trait]
pub trait UsageLog: Send + Sync + 'static {
    /// Short backend name for logs ("memory", "sqlite").
    fn backend(&self) -> &'static str;

    async fn append(&self, record: &UsageRecord) -> Result<(), SwitchyardError>;

    /// Records dated `date`, oldest first.
    async fn records_for_date(&self, date: NaiveDate) -> Result<Vec<UsageRecord>, SwitchyardError>;

    async fn daily_totals(&self, date: NaiveDate) -> Result<DailyTotals, SwitchyardError> {
        let records = self.records_for_date(date).await?;
        Ok(DailyTotals::from_records(date, &records))
    }
}

/// In-process log keeping at most `max_records` records (oldest dropped first).
pub struct MemoryUsageLog {
    records: Mutex<VecDeque<UsageRecord>>,
    max_records: usize,
}

impl MemoryUsageLog {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            max_records: max_records.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl UsageLog for MemoryUsageLog {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, record: &UsageRecord) -> Result<(), SwitchyardError> {
        let mut records = self.records.lock().await;
        while records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }

    async fn records_for_date(&self, date: NaiveDate) -> Result<Vec<UsageRecord>, SwitchyardError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.date() == date)
            .cloned()
            .collect())
    }
}

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS usage_log (
    id TEXT PRIMARY KEY NOT NULL,
    tier TEXT NOT NULL,
    input_tokens INTEGER NOT NULL DEFAULT 0,
    output_tokens INTEGER NOT NULL DEFAULT 0,
    total_tokens INTEGER NOT NULL DEFAULT 0,
    cost_usd REAL NOT NULL DEFAULT 0.0,
    day TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_usage_log_day ON usage_log(day);";

/// Convert a tokio-rusqlite error into SwitchyardError::Storage.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SwitchyardError {
    SwitchyardError::Storage {
        source: Box::new(e),
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_int(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn conversion_error(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

/// Usage log persisted to SQLite through the tokio-rusqlite background thread.
pub struct SqliteUsageLog {
    conn: tokio_rusqlite::Connection,
}

impl SqliteUsageLog {
    /// Wrap an open connection, creating the `usage_log` table if needed.
    pub async fn new(conn: tokio_rusqlite::Connection) -> Result<Self, SwitchyardError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(CREATE_TABLE)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SwitchyardError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SwitchyardError::Storage {
                    source: Box::new(e),
                })?;
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| SwitchyardError::Storage {
                source: Box::new(e),
            })?;
        Self::new(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, SwitchyardError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| SwitchyardError::Storage {
                source: Box::new(e),
            })?;
        Self::new(conn).await
    }
}

#[async_trait]
impl UsageLog for SqliteUsageLog {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn append(&self, record: &UsageRecord) -> Result<(), SwitchyardError> {
        let id = record.id.clone();
        let tier = record.tier.to_string();
        let input = to_sql_int(record.tokens.input);
        let output = to_sql_int(record.tokens.output);
        let total = to_sql_int(record.tokens.total);
        let cost_usd = record.cost_usd;
        let day = record.date().format("%Y-%m-%d").to_string();
        let created_at = record.timestamp.to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO usage_log (id, tier, input_tokens, output_tokens, \
                     total_tokens, cost_usd, day, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![id, tier, input, output, total, cost_usd, day, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(id = %record.id, tier = %record.tier, "usage record persisted");
        Ok(())
    }

    async fn records_for_date(&self, date: NaiveDate) -> Result<Vec<UsageRecord>, SwitchyardError> {
        let day = date.format("%Y-%m-%d").to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, tier, input_tokens, output_tokens, cost_usd, created_at \
                     FROM usage_log WHERE day = ?1 ORDER BY rowid",
                )?;
                let rows = stmt.query_map(rusqlite::params![day], |row| {
                    let tier: String = row.get(1)?;
                    let created_at: String = row.get(5)?;
                    Ok(UsageRecord {
                        id: row.get(0)?,
                        tier: Tier::from_str(&tier).map_err(|e| conversion_error(1, e))?,
                        tokens: TokenUsage::new(
                            from_sql_int(row.get(2)?),
                            from_sql_int(row.get(3)?),
                        ),
                        cost_usd: row.get(4)?,
                        timestamp: DateTime::parse_from_rfc3339(&created_at)
                            .map_err(|e| conversion_error(5, e))?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn daily_totals(&self, date: NaiveDate) -> Result<DailyTotals, SwitchyardError> {
        let day = date.format("%Y-%m-%d").to_string();
        let (cost_usd, tokens, requests) = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COALESCE(SUM(cost_usd), 0.0), COALESCE(SUM(total_tokens), 0), \
                     COUNT(*) FROM usage_log WHERE day = ?1",
                    rusqlite::params![day],
                    |row| Ok((row.get::<_, f64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
                )
            })
            .await
            .map_err(map_tr_err)?;

        Ok(DailyTotals {
            date,
            cost_usd,
            tokens: from_sql_int(tokens),
            requests: from_sql_int(requests),
        })
    }
}
