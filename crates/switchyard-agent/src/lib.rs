// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request dispatch for Switchyard.
//!
//! The [`Dispatcher`] is the central coordinator that:
//! - Classifies the request text and reads the emotional/time context
//! - Selects a tier against the current budget snapshot
//! - Serves the request through retry and the fallback chain
//! - Records usage, updates the budget governor, and dispatches alerts

#[cfg(feature = "prometheus")]
mod observe;

use std::sync::Arc;
use std::time::Duration;

use switchyard_config::SwitchyardConfig;
use switchyard_core::{
    BudgetSnapshot, Clock, SwitchyardError, SystemClock, Tier, TierRequest, TokenUsage,
};
use switchyard_cost::{
    AlertDispatcher, BudgetAlert, BudgetGovernor, UsageLog, UsageTracker, open_usage_log,
};
use switchyard_resilience::{
    DecisionTrace, FallbackChain, FallbackEdges, HandlerTable, RetryExecutor, RetryPolicy,
    RoutingEvent,
};
use switchyard_router::{
    ComplexityClassifier, ComplexityScore, EmotionalContext, EmotionalContextAdviser,
    TierDecision, TierSelector,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Routing decision for a piece of text, without serving it.
#[derive(Debug, Clone)]
pub struct RoutePreview {
    pub classification: ComplexityScore,
    pub context: EmotionalContext,
    pub decision: TierDecision,
    pub budget: Arc<BudgetSnapshot>,
}

/// A request served successfully.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub request_id: String,
    pub content: String,
    pub requested_tier: Tier,
    pub served_tier: Tier,
    /// True when a fallback tier served the request.
    pub downgraded: bool,
    pub usage: TokenUsage,
    pub cost: f64,
    pub classification: ComplexityScore,
    pub context: EmotionalContext,
    pub decision: TierDecision,
    pub trace: DecisionTrace,
    /// Budget state after this request was recorded.
    pub budget: Arc<BudgetSnapshot>,
    /// Thresholds newly crossed by this request.
    pub alerts: Vec<BudgetAlert>,
    /// False when the usage log rejected the record.
    pub persisted: bool,
}

/// Runs one request through selection, resilience, and accounting.
pub struct Dispatcher {
    classifier: ComplexityClassifier,
    adviser: EmotionalContextAdviser,
    selector: TierSelector,
    chain: FallbackChain,
    tracker: UsageTracker,
    clock: Arc<dyn Clock>,
    request_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Assemble a dispatcher from validated configuration and injected collaborators.
    ///
    /// Today's budget state is restored from `log` before the first request.
    pub async fn new(
        config: &SwitchyardConfig,
        handlers: HandlerTable,
        clock: Arc<dyn Clock>,
        log: Arc<dyn UsageLog>,
        alerts: AlertDispatcher,
    ) -> Result<Self, SwitchyardError> {
        let edges = FallbackEdges::from_config(&config.routing.fallback)?;
        let executor = RetryExecutor::new(RetryPolicy::from_config(&config.retry));
        let governor =
            BudgetGovernor::from_log(&config.budget, Arc::clone(&clock), log.as_ref()).await?;
        let tracker = UsageTracker::new(
            Arc::new(governor),
            log,
            alerts,
            Arc::clone(&clock),
            config.usage.log_every,
        );

        info!(
            service = config.service.name.as_str(),
            daily_budget_usd = config.budget.daily_budget_usd,
            max_retries = config.retry.max_retries,
            base_delay_ms = config.retry.base_delay_ms,
            usage_backend = tracker.log().backend(),
            "dispatcher initialized"
        );

        Ok(Self {
            classifier: ComplexityClassifier::new(&config.classifier),
            adviser: EmotionalContextAdviser::new(&config.mood.keywords),
            selector: TierSelector::new(&config.mood),
            chain: FallbackChain::new(edges, executor, Arc::new(handlers)),
            tracker,
            clock,
            request_timeout: config.retry.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// Like [`Dispatcher::new`] with the system clock and the usage log and
    /// alert sink named in the configuration.
    pub async fn open(
        config: &SwitchyardConfig,
        handlers: HandlerTable,
    ) -> Result<Self, SwitchyardError> {
        let log = open_usage_log(&config.usage).await?;
        let alerts = AlertDispatcher::from_config(&config.alerts)?;
        Self::new(config, handlers, Arc::new(SystemClock), log, alerts).await
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    pub fn governor(&self) -> &Arc<BudgetGovernor> {
        self.tracker.governor()
    }

    /// Classify `text` and pick its tier against the current budget.
    pub fn preview(&self, text: &str) -> RoutePreview {
        let classification = self.classifier.classify(text);
        let context = self.adviser.advise(self.clock.now(), text);
        let budget = self.tracker.governor().snapshot();
        let decision = self.selector.select(&classification, &context, &budget);
        RoutePreview {
            classification,
            context,
            decision,
            budget,
        }
    }

    pub async fn dispatch(&self, text: &str) -> Result<DispatchOutcome, SwitchyardError> {
        self.dispatch_with_cancel(text, CancellationToken::new()).await
    }

    /// Serve `text`, giving up when `cancel` fires or the request timeout elapses.
    ///
    /// Dropping the in-flight chain cancels any pending backoff. A response
    /// that was already served is always recorded.
    pub async fn dispatch_with_cancel(
        &self,
        text: &str,
        cancel: CancellationToken,
    ) -> Result<DispatchOutcome, SwitchyardError> {
        #[cfg(feature = "prometheus")]
        let started = tokio::time::Instant::now();

        let mut trace = DecisionTrace::new();
        let result = self.serve(text, &cancel, &mut trace).await;

        #[cfg(feature = "prometheus")]
        {
            match &result {
                Ok(outcome) => observe::outcome(outcome, started.elapsed()),
                Err(e) => observe::failure(e, &trace, started.elapsed()),
            }
        }

        result
    }

    async fn serve(
        &self,
        text: &str,
        cancel: &CancellationToken,
        trace: &mut DecisionTrace,
    ) -> Result<DispatchOutcome, SwitchyardError> {
        let RoutePreview {
            classification,
            context,
            decision,
            ..
        } = self.preview(text);

        let request_id = uuid::Uuid::new_v4().to_string();
        trace.record(RoutingEvent::Selected {
            tier: decision.tier,
            base_tier: decision.base_tier,
            reason: decision.reason.clone(),
        });
        info!(
            request_id = %request_id,
            tier = %decision.tier,
            base_tier = %decision.base_tier,
            rule = %decision.rule,
            score = classification.score,
            context = %context,
            "tier selected"
        );

        let request = TierRequest::new(&request_id, decision.tier, text)
            .with_context("time_of_day", context.time_of_day.to_string())
            .with_context("day_kind", context.day_kind.to_string())
            .with_context("mood", context.mood.to_string())
            .with_context("selection_rule", decision.rule.to_string());

        let served = {
            let run = self.chain.run(&request, trace);
            let bounded = async {
                match self.request_timeout {
                    Some(limit) => match tokio::time::timeout(limit, run).await {
                        Ok(result) => result,
                        Err(_) => Err(SwitchyardError::Timeout { duration: limit }),
                    },
                    None => run.await,
                }
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(SwitchyardError::Cancelled),
                result = bounded => result,
            }
        };

        let served = match served {
            Ok(served) => served,
            Err(e) => {
                let failed_tier = trace.current_tier().unwrap_or(decision.tier);
                warn!(
                    request_id = %request_id,
                    requested_tier = %decision.tier,
                    tier = %failed_tier,
                    error = %e,
                    trace = %trace,
                    "request not served"
                );
                return Err(e);
            }
        };

        let downgraded = served.downgraded();
        let response = served.response;
        let tracked = self
            .tracker
            .track_usage(served.served_tier, response.tokens, response.cost)
            .await;

        Ok(DispatchOutcome {
            request_id,
            content: response.content,
            requested_tier: served.requested_tier,
            served_tier: served.served_tier,
            downgraded,
            usage: response.tokens,
            cost: tracked.record.cost_usd,
            classification,
            context,
            decision,
            trace: std::mem::take(trace),
            budget: tracked.snapshot,
            alerts: tracked.alerts,
            persisted: tracked.persisted,
        })
    }
}
