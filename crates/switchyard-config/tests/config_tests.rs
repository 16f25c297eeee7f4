// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Switchyard configuration system.

use std::io::Write;

use switchyard_config::diagnostic::ConfigError;
use switchyard_config::model::{AlertSinkKind, UsageBackend};
use switchyard_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use switchyard_core::Tier;

/// A file exercising every section deserializes into the expected values.
#[test]
fn full_config_deserializes() {
    let toml = r#"
[service]
name = "edge-router"
log_level = "debug"

[budget]
daily_budget_usd = 12.5
thresholds = [0.5, 0.8, 0.95]
emergency_threshold = 0.95

[retry]
max_retries = 2
base_delay_ms = 250
request_timeout_secs = 30

[classifier.keywords]
l5 = ["formal proof"]

[classifier.base_weights]
l5 = 12

[[classifier.length_bonus]]
min_chars = 200
bonus = 1

[routing.fallback]
l5 = "l3"
l4 = "l2"

[mood]
distress_tier = "l4"

[alerts]
sink = "file"
file_path = "/tmp/alerts.md"
min_interval_secs = 60

[usage]
backend = "sqlite"
database_path = "/tmp/usage.db"
log_every = 10
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.service.name, "edge-router");
    assert_eq!(config.budget.thresholds, vec![0.5, 0.8, 0.95]);
    assert_eq!(config.retry.max_retries, 2);
    assert_eq!(config.retry.request_timeout_secs, Some(30));
    assert_eq!(config.classifier.keywords.l5, vec!["formal proof"]);
    // Unset tables keep their defaults.
    assert!(config.classifier.keywords.l1.contains(&"hello".to_string()));
    assert_eq!(config.classifier.base_weights.l5, 12);
    assert_eq!(config.classifier.base_weights.l4, 7);
    assert_eq!(config.classifier.length_bonus.len(), 1);
    assert_eq!(config.routing.fallback.next(Tier::L5), Some(Tier::L3));
    assert_eq!(config.routing.fallback.next(Tier::L3), Some(Tier::L2));
    assert_eq!(config.mood.distress_tier, Tier::L4);
    assert_eq!(config.alerts.sink, AlertSinkKind::File);
    assert_eq!(config.usage.backend, UsageBackend::Sqlite);
    assert_eq!(config.usage.log_every, 10);
}

#[test]
fn empty_config_yields_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert!((config.budget.daily_budget_usd - 5.0).abs() < f64::EPSILON);
    assert_eq!(config.alerts.min_interval_secs, 3600);
    assert_eq!(config.usage.backend, UsageBackend::Memory);
}

/// A misspelled key becomes an UnknownKey diagnostic carrying a suggestion.
#[test]
fn typo_produces_suggestion() {
    let toml = "[budget]\ndaily_budjet_usd = 3.0\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "daily_budjet_usd");
            assert_eq!(suggestion.as_deref(), Some("daily_budget_usd"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[providers]\nkey = 1\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn unknown_tier_name_is_a_type_error() {
    let result = load_config_from_str("[routing.fallback]\nl5 = \"l9\"\n");
    assert!(result.is_err());
}

#[test]
fn wrong_type_reports_invalid_type() {
    let errors = load_and_validate_str("[retry]\nmax_retries = \"three\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn semantic_errors_surface_as_validation() {
    let toml = "[routing.fallback]\nl2 = \"l3\"\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn explicit_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[retry]\nbase_delay_ms = 10").unwrap();
    let config = load_and_validate_path(file.path()).expect("valid file");
    assert_eq!(config.retry.base_delay_ms, 10);
}

#[test]
fn explicit_path_typo_points_into_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[retry]\nmax_retrys = 1").unwrap();
    let errors = load_and_validate_path(file.path()).unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey { span, src, .. } => {
            assert!(span.is_some());
            assert!(src.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
