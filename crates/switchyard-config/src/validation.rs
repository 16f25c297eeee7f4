// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde cannot express: budgets are positive,
//! thresholds ascend, fallback edges only ever point to a lower tier.

use switchyard_core::Tier;

use crate::diagnostic::ConfigError;
use crate::model::{AlertSinkKind, SwitchyardConfig};

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &SwitchyardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_budget(config, &mut errors);
    validate_classifier(config, &mut errors);
    validate_routing(config, &mut errors);
    validate_mood(config, &mut errors);

    if config.alerts.sink == AlertSinkKind::File
        && config
            .alerts
            .file_path
            .as_deref()
            .is_none_or(|p| p.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "alerts.file_path must be set when alerts.sink = \"file\"",
        ));
    }

    if config.usage.log_every == 0 {
        errors.push(ConfigError::validation(
            "usage.log_every must be at least 1",
        ));
    }
    if config.usage.max_records == 0 {
        errors.push(ConfigError::validation(
            "usage.max_records must be at least 1",
        ));
    }
    if config.usage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "usage.database_path must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_budget(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let budget = &config.budget;

    if !(budget.daily_budget_usd.is_finite() && budget.daily_budget_usd > 0.0) {
        errors.push(ConfigError::validation(format!(
            "budget.daily_budget_usd must be positive, got {}",
            budget.daily_budget_usd
        )));
    }

    if budget.thresholds.is_empty() {
        errors.push(ConfigError::validation(
            "budget.thresholds must contain at least one value",
        ));
    }

    for t in &budget.thresholds {
        if !(*t > 0.0 && *t <= 1.0) {
            errors.push(ConfigError::validation(format!(
                "budget.thresholds values must lie in (0, 1], got {t}"
            )));
        }
    }

    if budget.thresholds.windows(2).any(|w| w[0] >= w[1]) {
        errors.push(ConfigError::validation(
            "budget.thresholds must be strictly ascending",
        ));
    }

    if !budget
        .thresholds
        .iter()
        .any(|t| (t - budget.emergency_threshold).abs() < f64::EPSILON)
    {
        errors.push(ConfigError::validation(format!(
            "budget.emergency_threshold {} must be one of budget.thresholds",
            budget.emergency_threshold
        )));
    }
}

fn validate_classifier(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let classifier = &config.classifier;

    for tier in Tier::ALL {
        let keywords = classifier.keywords.for_tier(tier);
        if keywords.iter().any(|k| k.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "classifier.keywords.{tier} must not contain empty phrases"
            )));
        }
        if classifier.base_weights.for_tier(tier) < 0 {
            errors.push(ConfigError::validation(format!(
                "classifier.base_weights.{tier} must not be negative"
            )));
        }
    }

    let s = &classifier.score_thresholds;
    if !(0 < s.l2 && s.l2 < s.l3 && s.l3 < s.l4 && s.l4 < s.l5) {
        errors.push(ConfigError::validation(format!(
            "classifier.score_thresholds must be positive and strictly ascending, got l2={} l3={} l4={} l5={}",
            s.l2, s.l3, s.l4, s.l5
        )));
    }

    if classifier.length_bonus.iter().any(|rule| rule.bonus < 0) {
        errors.push(ConfigError::validation(
            "classifier.length_bonus bonuses must not be negative",
        ));
    }
}

fn validate_routing(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    for tier in Tier::ALL {
        if let Some(next) = config.routing.fallback.next(tier) {
            if next >= tier {
                errors.push(ConfigError::validation(format!(
                    "routing.fallback.{tier} must point to a lower tier, got {next}"
                )));
            }
        }
    }
}

fn validate_mood(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let mood = &config.mood;

    for sub in &mood.gentle_substitutions {
        if sub.to > sub.from {
            errors.push(ConfigError::validation(format!(
                "mood.gentle_substitutions must not raise a tier ({} -> {})",
                sub.from, sub.to
            )));
        }
    }

    for (i, sub) in mood.gentle_substitutions.iter().enumerate() {
        if mood.gentle_substitutions[..i]
            .iter()
            .any(|prev| prev.from == sub.from)
        {
            errors.push(ConfigError::validation(format!(
                "mood.gentle_substitutions lists {} more than once",
                sub.from
            )));
        }
    }

    let tables = [
        ("high_distress", &mood.keywords.high_distress),
        ("stressed", &mood.keywords.stressed),
        ("tired", &mood.keywords.tired),
        ("excited", &mood.keywords.excited),
    ];
    for (name, phrases) in tables {
        if phrases.iter().any(|p| p.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "mood.keywords.{name} must not contain empty phrases"
            )));
        }
    }
}
