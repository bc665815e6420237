use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;

use crate::{
    options::DEFAULT_USER_AGENT, FailedAttempt, FetchError, HttpResponse, RequestSpec,
    SuccessPredicate, Transport, TransportRequest, TransportResponse,
};

const FALLBACK_STATUS: u16 = 500;
const FALLBACK_STATUS_TEXT: &str = "Request Failed";

/// Client-level settings applied to every outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
    /// Prefix prepended to the request URL, e.g. `http://proxy.local/?url=`.
    pub proxy_url: Option<String>,
    /// Used when the request carries no `User-Agent` of its own.
    pub user_agent: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            proxy_url: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl RequestContext {
    pub fn new(proxy_url: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            proxy_url: proxy_url.filter(|proxy| !proxy.is_empty()),
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        }
    }

    fn prepare(&self, spec: &RequestSpec) -> TransportRequest {
        let url = match &self.proxy_url {
            Some(proxy) => format!("{proxy}{}", spec.url),
            None => spec.url.clone(),
        };

        let mut headers = spec.headers.clone();
        if !headers.contains("user-agent") {
            headers.append("User-Agent", self.user_agent.clone());
        }

        TransportRequest {
            url,
            method: spec.method.clone(),
            headers,
            body: spec.body.clone(),
            timeout: spec.timeout,
        }
    }
}

/// Runs one logical request against a [`Transport`], retrying failed attempts.
#[derive(Clone, Debug)]
pub struct RetryingFetcher<T> {
    transport: T,
    success_status: SuccessPredicate,
}

impl<T: Transport> RetryingFetcher<T> {
    pub fn new(transport: T, success_status: SuccessPredicate) -> Self {
        Self {
            transport,
            success_status,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes `spec` until it succeeds or its retry budget is spent.
    ///
    /// Never fails: once retries are exhausted the returned response is
    /// synthesized from the last error and carries every failed attempt.
    pub async fn execute(&self, spec: RequestSpec, context: &RequestContext) -> HttpResponse {
        let request = context.prepare(&spec);
        let mut attempt = spec.retries;
        let mut failed_attempts = Vec::new();

        loop {
            let error = match self.attempt(request.clone()).await {
                Ok(response) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        url = %request.url,
                        status = response.status,
                        attempts = attempt.saturating_add(1),
                        "request succeeded"
                    );
                    return HttpResponse {
                        status: response.status,
                        status_text: response.status_text,
                        headers: response.headers,
                        body: response.body,
                        attempts: attempt.saturating_add(1),
                        failed_attempts,
                    };
                }
                Err(error) => error,
            };

            failed_attempts.push(FailedAttempt {
                error: error.to_string(),
                timestamp: Utc::now(),
            });

            if attempt < spec.max_retries {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    url = %request.url,
                    attempt = attempt.saturating_add(1),
                    max_retries = spec.max_retries,
                    error = %error,
                    "attempt failed, retrying"
                );
                wait_before_retry(spec.retry_delay).await;
                attempt = attempt.saturating_add(1);
                continue;
            }

            #[cfg(feature = "tracing")]
            tracing::warn!(
                url = %request.url,
                attempts = attempt.saturating_add(1),
                error = %error,
                "retries exhausted"
            );
            return exhausted(&error, attempt.saturating_add(1), failed_attempts);
        }
    }

    async fn attempt(&self, request: TransportRequest) -> Result<TransportResponse, FetchError> {
        let response = self.transport.send(request).await?;
        if !self.success_status.is_success(response.status) {
            return Err(FetchError::InvalidStatus {
                status: response.status,
            });
        }
        Ok(response)
    }
}

async fn wait_before_retry(delay: Option<Duration>) {
    if let Some(delay) = delay.filter(|delay| !delay.is_zero()) {
        sleep(delay).await;
    }
}

fn exhausted(error: &FetchError, attempts: usize, failed_attempts: Vec<FailedAttempt>) -> HttpResponse {
    let embedded = error.embedded_response().cloned().unwrap_or_default();
    HttpResponse {
        status: embedded.status.unwrap_or(FALLBACK_STATUS),
        status_text: embedded
            .status_text
            .unwrap_or_else(|| FALLBACK_STATUS_TEXT.to_owned()),
        headers: embedded.headers.unwrap_or_default(),
        body: embedded.body.unwrap_or_else(|| error.to_string()),
        attempts,
        failed_attempts,
    }
}
