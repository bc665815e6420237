//! Seam between the retry/batch core and whatever actually performs HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;

use crate::Headers;

/// One outbound request as handed to a [`Transport`].
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
    /// Final URL, proxy prefix already applied.
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: Option<String>,
    /// Per-request timeout, enforced by the transport if it supports one.
    pub timeout: Option<Duration>,
}

/// A response read in full by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body: String,
}

/// Partial response information a transport may attach to a failure.
///
/// Every field is optional; callers treat it as enrichment only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Option<Headers>,
    pub body: Option<String>,
}

/// Failure raised by a transport (network, protocol, body read).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<ErrorResponse>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(mut self, response: ErrorResponse) -> Self {
        self.response = Some(response);
        self
    }
}

/// Capability to send a single HTTP request.
///
/// Implementations own proxying, TLS, redirects, cookies and timeouts; the
/// retry and batch logic only sees the resulting response or error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}
