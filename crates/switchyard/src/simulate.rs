// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchyard simulate` command implementation.
//!
//! Runs one full dispatch against simulated providers, optionally injecting
//! failures on chosen tiers, and prints the outcome with its decision trace.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use clap::Args;
use switchyard_agent::{DispatchOutcome, Dispatcher};
use switchyard_config::SwitchyardConfig;
use switchyard_core::{
    FailureKind, SwitchyardError, SystemClock, Tier, TierRequest, TierResponse, TokenUsage,
};
use switchyard_cost::{AlertDispatcher, MemoryUsageLog};
use switchyard_resilience::{
    DefaultNormalizer, HandlerTable, NormalizingHandler, ProviderClient, ProviderFailure,
};

/// USD per 1k tokens, L1 first.
const PRICE_PER_1K: [f64; 5] = [0.0005, 0.002, 0.01, 0.03, 0.075];
/// Simulated completion length, L1 first.
const OUTPUT_TOKENS: [u64; 5] = [60, 150, 300, 600, 1200];

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Request text to route.
    pub text: String,

    /// Make this tier's provider fail (repeatable).
    #[arg(long = "fail-tier")]
    pub fail_tiers: Vec<Tier>,

    /// Failure kind injected on failing tiers.
    #[arg(long, default_value = "rate_limit")]
    pub fail_kind: FailureKind,

    /// Failures before a failing tier recovers. Unlimited when omitted.
    #[arg(long)]
    pub fail_times: Option<u32>,

    /// Override `retry.base_delay_ms` for this run.
    #[arg(long)]
    pub base_delay_ms: Option<u64>,

    /// Print Prometheus metrics after the run.
    #[arg(long)]
    pub metrics: bool,

    #[arg(long)]
    pub json: bool,
}

/// A provider that prices by tier and fails on demand.
pub struct SimulatedProvider {
    tier: Tier,
    failure: Option<FailureKind>,
    /// Remaining injected failures; `u32::MAX` never runs out.
    failures_left: AtomicU32,
}

impl SimulatedProvider {
    pub fn healthy(tier: Tier) -> Self {
        Self {
            tier,
            failure: None,
            failures_left: AtomicU32::new(0),
        }
    }

    pub fn failing(tier: Tier, kind: FailureKind, times: Option<u32>) -> Self {
        Self {
            tier,
            failure: Some(kind),
            failures_left: AtomicU32::new(times.unwrap_or(u32::MAX)),
        }
    }

    /// Consume one injected failure, if any remain.
    fn take_failure(&self) -> Option<FailureKind> {
        let kind = self.failure?;
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .ok()
            .map(|_| kind)
    }
}

/// The provider-shaped error a real SDK would return for `kind`.
fn provider_failure(kind: FailureKind) -> ProviderFailure {
    match kind {
        FailureKind::RateLimit => ProviderFailure::http(429, "rate limit exceeded"),
        FailureKind::Overloaded => ProviderFailure::http(529, "provider overloaded"),
        FailureKind::Network => ProviderFailure::code("ECONNRESET", "connection reset by peer"),
        FailureKind::Other => ProviderFailure::http(400, "invalid request"),
    }
}

#[async_trait]
impl ProviderClient for SimulatedProvider {
    type Error = ProviderFailure;

    fn name(&self) -> &str {
        "simulated"
    }

    async fn complete(&self, request: &TierRequest) -> Result<TierResponse, ProviderFailure> {
        if let Some(kind) = self.take_failure() {
            return Err(provider_failure(kind));
        }

        let i = self.tier.index();
        let input = (request.text.chars().count() as u64).div_ceil(4).max(1);
        let tokens = TokenUsage::new(input, OUTPUT_TOKENS[i]);
        Ok(TierResponse {
            content: format!(
                "[{}] simulated answer to a {}-character request",
                self.tier,
                request.text.chars().count()
            ),
            tokens,
            cost: tokens.total as f64 / 1000.0 * PRICE_PER_1K[i],
        })
    }
}

fn handler_table(args: &SimulateArgs) -> Result<HandlerTable, SwitchyardError> {
    let mut table = HandlerTable::builder();
    for tier in Tier::ALL {
        let provider = if args.fail_tiers.contains(&tier) {
            SimulatedProvider::failing(tier, args.fail_kind, args.fail_times)
        } else {
            SimulatedProvider::healthy(tier)
        };
        table = table.handler(tier, Arc::new(NormalizingHandler::new(provider, DefaultNormalizer)));
    }
    table.build()
}

/// Run `switchyard simulate`.
pub async fn run_simulate(
    config: &SwitchyardConfig,
    args: SimulateArgs,
    use_color: bool,
) -> Result<(), SwitchyardError> {
    let mut config = config.clone();
    if let Some(ms) = args.base_delay_ms {
        config.retry.base_delay_ms = ms;
    }

    #[cfg(feature = "prometheus")]
    let prometheus = if args.metrics {
        Some(switchyard_prometheus::PrometheusAdapter::install()?)
    } else {
        None
    };
    #[cfg(not(feature = "prometheus"))]
    {
        if args.metrics {
            tracing::warn!("built without the prometheus feature; --metrics ignored");
        }
    }

    let dispatcher = Dispatcher::new(
        &config,
        handler_table(&args)?,
        Arc::new(SystemClock),
        Arc::new(MemoryUsageLog::new(config.usage.max_records)),
        AlertDispatcher::from_config(&config.alerts)?,
    )
    .await?;

    let outcome = dispatcher.dispatch(&args.text).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome_json(&outcome))
                .unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        print_outcome(&outcome, use_color);
    }

    #[cfg(feature = "prometheus")]
    {
        if let Some(prometheus) = prometheus {
            println!("{}", prometheus.render());
        }
    }

    Ok(())
}

fn outcome_json(outcome: &DispatchOutcome) -> serde_json::Value {
    serde_json::json!({
        "request_id": outcome.request_id,
        "content": outcome.content,
        "requested_tier": outcome.requested_tier,
        "served_tier": outcome.served_tier,
        "downgraded": outcome.downgraded,
        "usage": outcome.usage,
        "cost_usd": outcome.cost,
        "classification": outcome.classification,
        "context": outcome.context,
        "decision": outcome.decision,
        "trace": outcome.trace,
        "budget": outcome.budget.as_ref(),
        "alerts": outcome.alerts,
    })
}

fn print_outcome(outcome: &DispatchOutcome, use_color: bool) {
    println!();
    println!("  switchyard simulate");
    println!("  {}", "-".repeat(35));

    let served = if outcome.downgraded {
        format!(
            "{} (requested {}, downgraded)",
            outcome.served_tier, outcome.requested_tier
        )
    } else {
        outcome.served_tier.to_string()
    };
    if use_color {
        use colored::Colorize;
        let served = if outcome.downgraded {
            served.yellow()
        } else {
            served.green()
        };
        println!("    Served:    {served}");
    } else {
        println!("    Served:    {served}");
    }

    println!("    Content:   {}", outcome.content);
    println!(
        "    Usage:     {} tokens, ${:.6}",
        outcome.usage.total, outcome.cost
    );
    println!(
        "    Budget:    {} ({:.2}% of ${:.2})",
        outcome.budget.level(),
        outcome.budget.percentage() * 100.0,
        outcome.budget.daily_budget_usd
    );
    println!();
    println!("  trace:");
    for (i, event) in outcome.trace.events().iter().enumerate() {
        println!("    {:>2}. {event}", i + 1);
    }
    println!();
}
