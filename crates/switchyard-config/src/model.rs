// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Switchyard.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The configuration is loaded once and treated as
//! immutable for the rest of the run.

use serde::{Deserialize, Serialize};
use switchyard_core::Tier;

/// Top-level Switchyard configuration.
///
/// Every section is optional and defaults to the documented values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Daily budget and alert thresholds.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Per-tier retry and backoff.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Keyword/length complexity heuristic.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Fallback edges between tiers.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Mood and time-of-day nudges.
    #[serde(default)]
    pub mood: MoodConfig,

    /// Budget alert delivery.
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Usage log backend.
    #[serde(default)]
    pub usage: UsageConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "switchyard".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Daily budget configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    /// Daily spending budget in USD.
    #[serde(default = "default_daily_budget_usd")]
    pub daily_budget_usd: f64,

    /// Ascending fractions of the daily budget that raise an alert when crossed.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,

    /// Threshold at or above which alerts are CRITICAL and emergency mode engages.
    /// Must be one of `thresholds`.
    #[serde(default = "default_emergency_threshold")]
    pub emergency_threshold: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_budget_usd: default_daily_budget_usd(),
            thresholds: default_thresholds(),
            emergency_threshold: default_emergency_threshold(),
        }
    }
}

fn default_daily_budget_usd() -> f64 {
    5.0
}

fn default_thresholds() -> Vec<f64> {
    vec![0.70, 0.90]
}

fn default_emergency_threshold() -> f64 {
    0.90
}

/// Retry and backoff configuration, applied independently to every tier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt (total attempts = max_retries + 1).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles for each later retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Optional deadline for a whole dispatch, fallbacks included.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            request_timeout_secs: None,
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

/// Complexity classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Trigger phrases per tier, matched case-insensitively on word boundaries.
    #[serde(default)]
    pub keywords: TierKeywords,

    /// Score contributed by a tier when any of its phrases matches.
    #[serde(default)]
    pub base_weights: TierWeights,

    /// Minimum score for each tier above L1.
    #[serde(default)]
    pub score_thresholds: ScoreThresholds,

    /// Length bonuses, each applied when the text is longer than `min_chars`.
    #[serde(default = "default_length_bonus")]
    pub length_bonus: Vec<LengthBonusRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: TierKeywords::default(),
            base_weights: TierWeights::default(),
            score_thresholds: ScoreThresholds::default(),
            length_bonus: default_length_bonus(),
        }
    }
}

/// Per-tier trigger phrases.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierKeywords {
    #[serde(default = "default_l1_keywords")]
    pub l1: Vec<String>,
    #[serde(default = "default_l2_keywords")]
    pub l2: Vec<String>,
    #[serde(default = "default_l3_keywords")]
    pub l3: Vec<String>,
    #[serde(default = "default_l4_keywords")]
    pub l4: Vec<String>,
    #[serde(default = "default_l5_keywords")]
    pub l5: Vec<String>,
}

impl TierKeywords {
    pub fn for_tier(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::L1 => &self.l1,
            Tier::L2 => &self.l2,
            Tier::L3 => &self.l3,
            Tier::L4 => &self.l4,
            Tier::L5 => &self.l5,
        }
    }
}

impl Default for TierKeywords {
    fn default() -> Self {
        Self {
            l1: default_l1_keywords(),
            l2: default_l2_keywords(),
            l3: default_l3_keywords(),
            l4: default_l4_keywords(),
            l5: default_l5_keywords(),
        }
    }
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_l1_keywords() -> Vec<String> {
    phrases(&[
        "hi", "hello", "hey", "thanks", "thank you", "good morning", "good night",
        "what time", "remind me", "weather",
    ])
}

fn default_l2_keywords() -> Vec<String> {
    phrases(&[
        "summarize", "summary", "translate", "rewrite", "define", "what is",
        "quick question", "list",
    ])
}

fn default_l3_keywords() -> Vec<String> {
    phrases(&[
        "explain", "compare", "plan", "draft", "outline", "recommend",
        "pros and cons", "email",
    ])
}

fn default_l4_keywords() -> Vec<String> {
    phrases(&[
        "analyze", "analyse", "debug", "refactor", "implement", "strategy",
        "architecture", "code review", "step by step",
    ])
}

fn default_l5_keywords() -> Vec<String> {
    phrases(&[
        "research", "in depth", "comprehensive", "prove", "design a system",
        "deep dive", "thesis", "critique",
    ])
}

/// Score contributed by each tier's keyword match.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierWeights {
    #[serde(default = "default_weight_l1")]
    pub l1: i32,
    #[serde(default = "default_weight_l2")]
    pub l2: i32,
    #[serde(default = "default_weight_l3")]
    pub l3: i32,
    #[serde(default = "default_weight_l4")]
    pub l4: i32,
    #[serde(default = "default_weight_l5")]
    pub l5: i32,
}

impl TierWeights {
    pub fn for_tier(&self, tier: Tier) -> i32 {
        match tier {
            Tier::L1 => self.l1,
            Tier::L2 => self.l2,
            Tier::L3 => self.l3,
            Tier::L4 => self.l4,
            Tier::L5 => self.l5,
        }
    }
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            l1: default_weight_l1(),
            l2: default_weight_l2(),
            l3: default_weight_l3(),
            l4: default_weight_l4(),
            l5: default_weight_l5(),
        }
    }
}

fn default_weight_l1() -> i32 {
    1
}

fn default_weight_l2() -> i32 {
    3
}

fn default_weight_l3() -> i32 {
    5
}

fn default_weight_l4() -> i32 {
    7
}

fn default_weight_l5() -> i32 {
    10
}

/// Minimum score needed to recommend each tier. Lower scores map to L1.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreThresholds {
    #[serde(default = "default_weight_l2")]
    pub l2: i32,
    #[serde(default = "default_weight_l3")]
    pub l3: i32,
    #[serde(default = "default_weight_l4")]
    pub l4: i32,
    #[serde(default = "default_weight_l5")]
    pub l5: i32,
}

impl ScoreThresholds {
    /// Highest tier whose threshold the score reaches.
    pub fn tier_for_score(&self, score: i32) -> Tier {
        if score >= self.l5 {
            Tier::L5
        } else if score >= self.l4 {
            Tier::L4
        } else if score >= self.l3 {
            Tier::L3
        } else if score >= self.l2 {
            Tier::L2
        } else {
            Tier::L1
        }
    }
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            l2: default_weight_l2(),
            l3: default_weight_l3(),
            l4: default_weight_l4(),
            l5: default_weight_l5(),
        }
    }
}

/// A length bonus: `bonus` points when the text is longer than `min_chars`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LengthBonusRule {
    pub min_chars: usize,
    pub bonus: i32,
}

fn default_length_bonus() -> Vec<LengthBonusRule> {
    vec![
        LengthBonusRule {
            min_chars: 500,
            bonus: 2,
        },
        LengthBonusRule {
            min_chars: 1000,
            bonus: 2,
        },
    ]
}

/// Tier routing configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Where each tier falls back to once its retries are exhausted.
    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// Fallback edges. `L1` is always terminal and therefore has no entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_l2")]
    pub l2: Tier,
    #[serde(default = "default_fallback_l3")]
    pub l3: Tier,
    #[serde(default = "default_fallback_l4")]
    pub l4: Tier,
    #[serde(default = "default_fallback_l5")]
    pub l5: Tier,
}

impl FallbackConfig {
    /// The configured next tier for `tier`, `None` for L1.
    pub fn next(&self, tier: Tier) -> Option<Tier> {
        match tier {
            Tier::L1 => None,
            Tier::L2 => Some(self.l2),
            Tier::L3 => Some(self.l3),
            Tier::L4 => Some(self.l4),
            Tier::L5 => Some(self.l5),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            l2: default_fallback_l2(),
            l3: default_fallback_l3(),
            l4: default_fallback_l4(),
            l5: default_fallback_l5(),
        }
    }
}

fn default_fallback_l2() -> Tier {
    Tier::L1
}

fn default_fallback_l3() -> Tier {
    Tier::L2
}

fn default_fallback_l4() -> Tier {
    Tier::L3
}

fn default_fallback_l5() -> Tier {
    Tier::L4
}

/// Mood and time-of-day nudge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MoodConfig {
    /// Tier forced for high-distress requests outside emergency mode.
    #[serde(default = "default_distress_tier")]
    pub distress_tier: Tier,

    /// Substitutions applied late at night or when the user is tired.
    /// Tiers without an entry pass through unchanged.
    #[serde(default = "default_gentle_substitutions")]
    pub gentle_substitutions: Vec<TierSubstitution>,

    /// Keyword tables per mood.
    #[serde(default)]
    pub keywords: MoodKeywords,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            distress_tier: default_distress_tier(),
            gentle_substitutions: default_gentle_substitutions(),
            keywords: MoodKeywords::default(),
        }
    }
}

fn default_distress_tier() -> Tier {
    Tier::L5
}

fn default_gentle_substitutions() -> Vec<TierSubstitution> {
    vec![
        TierSubstitution {
            from: Tier::L5,
            to: Tier::L4,
        },
        TierSubstitution {
            from: Tier::L4,
            to: Tier::L3,
        },
    ]
}

/// One `from -> to` tier substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierSubstitution {
    pub from: Tier,
    pub to: Tier,
}

/// Keyword tables mapping request text to a mood.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MoodKeywords {
    #[serde(default = "default_distress_keywords")]
    pub high_distress: Vec<String>,
    #[serde(default = "default_stressed_keywords")]
    pub stressed: Vec<String>,
    #[serde(default = "default_tired_keywords")]
    pub tired: Vec<String>,
    #[serde(default = "default_excited_keywords")]
    pub excited: Vec<String>,
}

impl Default for MoodKeywords {
    fn default() -> Self {
        Self {
            high_distress: default_distress_keywords(),
            stressed: default_stressed_keywords(),
            tired: default_tired_keywords(),
            excited: default_excited_keywords(),
        }
    }
}

fn default_distress_keywords() -> Vec<String> {
    phrases(&[
        "panic", "panicking", "emergency", "crisis", "can't cope", "cannot cope",
        "desperate", "breaking down",
    ])
}

fn default_stressed_keywords() -> Vec<String> {
    phrases(&["stressed", "overwhelmed", "anxious", "deadline", "urgent", "frustrated"])
}

fn default_tired_keywords() -> Vec<String> {
    phrases(&["tired", "exhausted", "sleepy", "worn out", "drained", "can't sleep"])
}

fn default_excited_keywords() -> Vec<String> {
    phrases(&["excited", "amazing", "awesome", "can't wait", "thrilled"])
}

/// Where budget alerts are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSinkKind {
    /// Emit alerts as tracing events only.
    #[default]
    Log,
    /// Append alerts to a markdown file.
    File,
    /// Do not deliver alerts (they are still logged when fired).
    Disabled,
}

/// Budget alert delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AlertConfig {
    #[serde(default)]
    pub sink: AlertSinkKind,

    /// Target file for the `file` sink.
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum seconds between two sink deliveries.
    #[serde(default = "default_alert_interval_secs")]
    pub min_interval_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            sink: AlertSinkKind::default(),
            file_path: None,
            min_interval_secs: default_alert_interval_secs(),
        }
    }
}

fn default_alert_interval_secs() -> u64 {
    3600
}

/// Usage log backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageBackend {
    /// Capped in-process log; totals do not survive restarts.
    #[default]
    Memory,
    /// SQLite file at `usage.database_path`.
    Sqlite,
}

/// Usage log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UsageConfig {
    #[serde(default)]
    pub backend: UsageBackend,

    /// Path to the SQLite usage log.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Maximum records retained by the in-memory log.
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Log every Nth usage event at INFO; the rest go to DEBUG. 1 logs all.
    #[serde(default = "default_log_every")]
    pub log_every: u32,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            backend: UsageBackend::default(),
            database_path: default_database_path(),
            max_records: default_max_records(),
            log_every: default_log_every(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("switchyard").join("usage.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "usage.db".to_string())
}

fn default_max_records() -> usize {
    10_000
}

fn default_log_every() -> u32 {
    1
}
