// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of provider-specific errors into the normalized failure taxonomy.
//!
//! Each tier handler wraps a [`ProviderClient`] in a [`NormalizingHandler`]
//! together with a [`FailureNormalizer`] for that client's error type.

use async_trait::async_trait;
use switchyard_core::{FailureKind, HandlerError, TierHandler, TierRequest, TierResponse};

/// Message fragments that identify a network-level failure.
const NETWORK_MARKERS: &[&str] = &[
    "econnreset",
    "etimedout",
    "econnrefused",
    "enotfound",
    "eai_again",
    "epipe",
    "timed out",
    "timeout",
    "connection reset",
    "connection refused",
    "connection closed",
    "broken pipe",
    "dns error",
    "failed to lookup address",
];

const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "rate_limit", "too many requests"];

const OVERLOAD_MARKERS: &[&str] = &["overloaded", "service unavailable", "capacity"];

/// Map an HTTP status code to a failure kind.
pub fn classify_status(status: u16) -> FailureKind {
    match status {
        429 => FailureKind::RateLimit,
        503 | 529 => FailureKind::Overloaded,
        408 | 504 => FailureKind::Network,
        _ => FailureKind::Other,
    }
}

/// Map an error message or OS error code to a failure kind.
pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_ascii_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m)) {
        FailureKind::RateLimit
    } else if OVERLOAD_MARKERS.iter().any(|m| lower.contains(m)) {
        FailureKind::Overloaded
    } else if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
        FailureKind::Network
    } else {
        FailureKind::Other
    }
}

/// Generic provider error: an optional HTTP status, an optional error code
/// (`ECONNRESET`, `overloaded_error`, ...) and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl ProviderFailure {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: message.into(),
        }
    }

    pub fn code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.status, &self.code) {
            (Some(status), _) => write!(f, "HTTP {status}: {}", self.message),
            (None, Some(code)) => write!(f, "{code}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderFailure {}

/// A provider SDK client serving one tier.
#[async_trait]
pub trait ProviderClient: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn name(&self) -> &str;

    async fn complete(&self, request: &TierRequest) -> Result<TierResponse, Self::Error>;
}

/// Converts a client's error type into a [`HandlerError`].
pub trait FailureNormalizer<E>: Send + Sync + 'static {
    fn normalize(&self, error: E) -> HandlerError;
}

/// Status-code first, then code, then message classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer;

impl FailureNormalizer<ProviderFailure> for DefaultNormalizer {
    fn normalize(&self, error: ProviderFailure) -> HandlerError {
        let by_status = error.status.map_or(FailureKind::Other, classify_status);
        let kind = [
            Some(by_status),
            error.code.as_deref().map(classify_message),
            Some(classify_message(&error.message)),
        ]
        .into_iter()
        .flatten()
        .find(|k| *k != FailureKind::Other)
        .unwrap_or(FailureKind::Other);

        let message = error.to_string();
        HandlerError::new(kind, message).with_source(error)
    }
}

impl FailureNormalizer<std::io::Error> for DefaultNormalizer {
    fn normalize(&self, error: std::io::Error) -> HandlerError {
        use std::io::ErrorKind;

        let kind = match error.kind() {
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::TimedOut
            | ErrorKind::UnexpectedEof => FailureKind::Network,
            _ => classify_message(&error.to_string()),
        };
        HandlerError::new(kind, error.to_string()).with_source(error)
    }
}

/// A [`TierHandler`] backed by a provider client and a normalizer.
pub struct NormalizingHandler<C, N> {
    client: C,
    normalizer: N,
}

impl<C, N> NormalizingHandler<C, N>
where
    C: ProviderClient,
    N: FailureNormalizer<C::Error>,
{
    pub fn new(client: C, normalizer: N) -> Self {
        Self { client, normalizer }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C, N> TierHandler for NormalizingHandler<C, N>
where
    C: ProviderClient,
    N: FailureNormalizer<C::Error>,
{
    fn name(&self) -> &str {
        self.client.name()
    }

    async fn handle(&self, request: &TierRequest) -> Result<TierResponse, HandlerError> {
        self.client
            .complete(request)
            .await
            .map_err(|e| self.normalizer.normalize(e))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(classify_status(429), FailureKind::RateLimit);
        assert_eq!(classify_status(503), FailureKind::Overloaded);
        assert_eq!(classify_status(529), FailureKind::Overloaded);
        assert_eq!(classify_status(504), FailureKind::Network);
        assert_eq!(classify_status(408), FailureKind::Network);
        assert_eq!(classify_status(400), FailureKind::Other);
        assert_eq!(classify_status(401), FailureKind::Other);
        assert_eq!(classify_status(500), FailureKind::Other);
    }

    #[test]
    fn os_error_codes_are_network() {
        for code in ["ECONNRESET", "ETIMEDOUT", "ECONNREFUSED", "ENOTFOUND", "EAI_AGAIN"] {
            assert_eq!(classify_message(code), FailureKind::Network, "{code}");
        }
        assert_eq!(classify_message("request timed out"), FailureKind::Network);
        assert_eq!(classify_message("invalid api key"), FailureKind::Other);
    }

    #[test]
    fn provider_failure_prefers_status() {
        let err = DefaultNormalizer.normalize(ProviderFailure::http(529, "Overloaded"));
        assert_eq!(err.kind, FailureKind::Overloaded);
        assert!(err.source().is_some());
    }

    #[test]
    fn unhelpful_status_falls_back_to_code_and_message() {
        let err = DefaultNormalizer.normalize(ProviderFailure {
            status: Some(500),
            code: Some("ECONNRESET".into()),
            message: "upstream".into(),
        });
        assert_eq!(err.kind, FailureKind::Network);

        let err = DefaultNormalizer.normalize(ProviderFailure::http(400, "rate limit exceeded"));
        assert_eq!(err.kind, FailureKind::RateLimit);
    }

    #[test]
    fn client_errors_stay_non_retryable() {
        let err = DefaultNormalizer.normalize(ProviderFailure::http(401, "bad key"));
        assert_eq!(err.kind, FailureKind::Other);
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_errors_normalize_by_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(DefaultNormalizer.normalize(io).kind, FailureKind::Network);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(DefaultNormalizer.normalize(io).kind, FailureKind::Other);
    }

    struct EchoClient;

    #[async_trait]
    impl ProviderClient for EchoClient {
        type Error = ProviderFailure;

        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &TierRequest) -> Result<TierResponse, ProviderFailure> {
            if request.text == "fail" {
                Err(ProviderFailure::http(429, "slow down"))
            } else {
                Ok(TierResponse {
                    content: request.text.clone(),
                    tokens: switchyard_core::TokenUsage::new(1, 1),
                    cost: 0.001,
                })
            }
        }
    }

    #[tokio::test]
    async fn normalizing_handler_maps_client_errors() {
        let handler = NormalizingHandler::new(EchoClient, DefaultNormalizer);
        assert_eq!(handler.name(), "echo");

        let ok = handler
            .handle(&TierRequest::new("r1", switchyard_core::Tier::L1, "hi"))
            .await
            .unwrap();
        assert_eq!(ok.content, "hi");

        let err = handler
            .handle(&TierRequest::new("r2", switchyard_core::Tier::L1, "fail"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::RateLimit);
    }
}
