// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted tier handler for deterministic testing.
//!
//! `ScriptedHandler` plays back a FIFO queue of steps, one per call. When the
//! queue is empty it repeats its `otherwise` step, which by default responds
//! successfully.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use switchyard_core::{
    FailureKind, HandlerError, TierHandler, TierRequest, TierResponse, TokenUsage,
};

/// What the handler does on one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Respond {
        content: String,
        tokens: TokenUsage,
        cost: f64,
    },
    Fail(FailureKind),
    /// Never completes. Used to exercise timeouts and cancellation.
    Hang,
}

impl Step {
    pub fn respond(content: impl Into<String>, cost: f64) -> Self {
        Step::Respond {
            content: content.into(),
            tokens: TokenUsage::new(100, 50),
            cost,
        }
    }
}

/// A tier handler that follows a script.
pub struct ScriptedHandler {
    name: String,
    script: Mutex<VecDeque<Step>>,
    otherwise: Step,
    calls: AtomicUsize,
    seen: Mutex<Vec<TierRequest>>,
}

impl ScriptedHandler {
    /// A handler that answers every call with `"<name> ok"` at $0.01.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            otherwise: Step::respond(format!("{name} ok"), 0.01),
            name,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A handler whose every call fails with `kind`.
    pub fn failing(name: impl Into<String>, kind: FailureKind) -> Self {
        Self::new(name).otherwise(Step::Fail(kind))
    }

    pub fn then(mut self, step: Step) -> Self {
        self.script.get_mut().push_back(step);
        self
    }

    pub fn then_fail(self, kind: FailureKind) -> Self {
        self.then(Step::Fail(kind))
    }

    pub fn then_respond(self, content: impl Into<String>, cost: f64) -> Self {
        self.then(Step::respond(content, cost))
    }

    /// Step repeated once the script runs out.
    pub fn otherwise(mut self, step: Step) -> Self {
        self.otherwise = step;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of `handle` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<TierRequest> {
        self.seen.lock().await.clone()
    }

    /// Append a step at runtime.
    pub async fn push(&self, step: Step) {
        self.script.lock().await.push_back(step);
    }
}

#[async_trait]
impl TierHandler for ScriptedHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, request: &TierRequest) -> Result<TierResponse, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().await.push(request.clone());

        let step = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.otherwise.clone());

        match step {
            Step::Respond {
                content,
                tokens,
                cost,
            } => Ok(TierResponse {
                content,
                tokens,
                cost,
            }),
            Step::Fail(kind) => Err(HandlerError::new(
                kind,
                format!("scripted {kind} from {}", self.name),
            )),
            Step::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use switchyard_core::Tier;

    use super::*;

    #[tokio::test]
    async fn plays_script_then_repeats_fallback_step() {
        let handler = ScriptedHandler::new("l3")
            .then_fail(FailureKind::RateLimit)
            .then_respond("second", 0.02);
        let request = TierRequest::new("r", Tier::L3, "text");

        let first = handler.handle(&request).await.unwrap_err();
        assert_eq!(first.kind, FailureKind::RateLimit);
        assert_eq!(handler.handle(&request).await.unwrap().content, "second");
        assert_eq!(handler.handle(&request).await.unwrap().content, "l3 ok");
        assert_eq!(handler.calls(), 3);
        assert_eq!(handler.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn failing_handler_always_fails() {
        let handler = ScriptedHandler::failing("down", FailureKind::Overloaded);
        let request = TierRequest::new("r", Tier::L1, "text");
        for _ in 0..3 {
            assert!(handler.handle(&request).await.is_err());
        }
    }
}
