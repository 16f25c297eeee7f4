// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchyard check`, `classify` and `usage` command implementations.

use std::sync::Arc;

use switchyard_config::SwitchyardConfig;
use switchyard_core::{BudgetLevel, Clock, SwitchyardError, SystemClock, Tier};
use switchyard_cost::{BudgetGovernor, UsageSummary, open_usage_log};
use switchyard_resilience::FallbackEdges;
use switchyard_router::{ComplexityClassifier, EmotionalContextAdviser, TierSelector};

/// Governor rebuilt from today's entries in the configured usage log.
async fn governor(config: &SwitchyardConfig) -> Result<BudgetGovernor, SwitchyardError> {
    let log = open_usage_log(&config.usage).await?;
    BudgetGovernor::from_log(&config.budget, Arc::new(SystemClock), log.as_ref()).await
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn percent_list(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:.0}%", v * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fallback_path(config: &SwitchyardConfig) -> String {
    let edges = match FallbackEdges::from_config(&config.routing.fallback) {
        Ok(edges) => edges,
        Err(e) => return format!("invalid ({e})"),
    };
    edges
        .path_from(Tier::HIGHEST)
        .iter()
        .map(Tier::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Print the effective configuration after a successful load.
pub fn print_check(config: &SwitchyardConfig, use_color: bool) {
    println!();
    println!("  switchyard check");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        println!("    Config:     {} {}", "✓".green(), "valid".green());
    } else {
        println!("    Config:     [OK] valid");
    }

    println!(
        "    Budget:     ${:.2}/day, alerts at {} (emergency at {:.0}%)",
        config.budget.daily_budget_usd,
        percent_list(&config.budget.thresholds),
        config.budget.emergency_threshold * 100.0
    );
    println!(
        "    Retry:      {} retries, base delay {}ms{}",
        config.retry.max_retries,
        config.retry.base_delay_ms,
        config
            .retry
            .request_timeout_secs
            .map(|s| format!(", timeout {s}s"))
            .unwrap_or_default()
    );
    println!("    Fallback:   {}", fallback_path(config));
    println!(
        "    Alerts:     {:?} sink, at most every {}s",
        config.alerts.sink, config.alerts.min_interval_secs
    );
    println!(
        "    Usage log:  {:?} (log every {} events)",
        config.usage.backend, config.usage.log_every
    );
    println!();
}

/// Run `switchyard classify <text>`.
pub async fn run_classify(
    config: &SwitchyardConfig,
    text: &str,
    json: bool,
) -> Result<(), SwitchyardError> {
    let governor = governor(config).await?;
    let budget = governor.snapshot();

    let classification = ComplexityClassifier::new(&config.classifier).classify(text);
    let context = EmotionalContextAdviser::new(&config.mood.keywords).advise(SystemClock.now(), text);
    let decision = TierSelector::new(&config.mood).select(&classification, &context, &budget);

    if json {
        println!(
            "{}",
            to_json(&serde_json::json!({
                "classification": classification,
                "context": context,
                "decision": decision,
                "budget_level": budget.level(),
            }))
        );
        return Ok(());
    }

    println!();
    println!("  score:       {}", classification.score);
    for signal in &classification.signals {
        println!("    + {signal}");
    }
    println!("  recommended: {}", classification.recommended_tier);
    println!("  context:     {context}");
    println!("  budget:      {} ({:.0}%)", budget.level(), budget.percentage() * 100.0);
    println!("  selected:    {} ({})", decision.tier, decision.rule);
    println!("               {}", decision.reason);
    println!();
    Ok(())
}

/// Run `switchyard usage`.
pub async fn run_usage(
    config: &SwitchyardConfig,
    json: bool,
    use_color: bool,
) -> Result<(), SwitchyardError> {
    let governor = governor(config).await?;
    let summary = UsageSummary::from(governor.snapshot().as_ref());

    if json {
        println!("{}", to_json(&summary));
        return Ok(());
    }

    print_usage(&summary, use_color);
    Ok(())
}

fn print_usage(summary: &UsageSummary, use_color: bool) {
    println!();
    println!("  switchyard usage ({})", summary.date);
    println!("  {}", "-".repeat(35));

    let level = summary.level.to_string();
    if use_color {
        use colored::Colorize;
        let level = match summary.level {
            BudgetLevel::Normal => level.green(),
            BudgetLevel::Warning => level.yellow(),
            BudgetLevel::Emergency => level.red(),
        };
        println!("    State:     {level}");
    } else {
        println!("    State:     {level}");
    }

    println!(
        "    Spent:     ${:.4} of ${:.2} ({:.1}%)",
        summary.cost_usd,
        summary.daily_budget_usd,
        summary.percentage * 100.0
    );
    println!("    Remaining: ${:.4}", summary.remaining_usd);
    println!("    Requests:  {}", summary.request_count);
    println!("    Tokens:    {}", summary.tokens);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_list_formats_fractions() {
        assert_eq!(percent_list(&[0.7, 0.9]), "70%, 90%");
    }

    #[test]
    fn default_fallback_path_walks_to_l1() {
        let config = SwitchyardConfig::default();
        assert_eq!(fallback_path(&config), "l5 -> l4 -> l3 -> l2 -> l1");
    }
}
