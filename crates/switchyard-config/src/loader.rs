// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order, later layers winning: compiled defaults,
//! `/etc/switchyard/switchyard.toml`, `$XDG_CONFIG_HOME/switchyard/switchyard.toml`,
//! `./switchyard.toml`, then `SWITCHYARD_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SwitchyardConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/switchyard/switchyard.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "switchyard.toml";

/// Config sections that environment variables may target.
const ENV_SECTIONS: &[&str] = &[
    "service",
    "budget",
    "retry",
    "classifier",
    "routing",
    "mood",
    "alerts",
    "usage",
];

/// The per-user config file, if a config directory exists on this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("switchyard").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<SwitchyardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string layered over the defaults only.
///
/// No files or environment variables are consulted; used by tests and tools.
pub fn load_config_from_str(toml_content: &str) -> Result<SwitchyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SwitchyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full Figment before extraction, exposed for diagnostics.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `SWITCHYARD_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `SWITCHYARD_BUDGET_DAILY_BUDGET_USD` maps to `budget.daily_budget_usd`.
fn env_provider() -> Env {
    Env::prefixed("SWITCHYARD_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_first_underscore_only() {
        assert_eq!(map_env_key("budget_daily_budget_usd"), "budget.daily_budget_usd");
        assert_eq!(map_env_key("retry_base_delay_ms"), "retry.base_delay_ms");
        assert_eq!(map_env_key("usage_log_every"), "usage.log_every");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str("[retry]\nmax_retries = 5\n").unwrap();
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }
}
