use std::{fmt, sync::Arc};

use crate::{
    BatchRequest, BoundedBatchExecutor, ClientOptions, HttpResponse, ReqwestTransport,
    RequestContext, RequestSpec, Result, RetryingFetcher, Transport,
};

/// HTTP client with per-request retries and bounded-concurrency batches.
#[derive(Clone)]
pub struct FetchClient {
    fetcher: RetryingFetcher<Arc<dyn Transport>>,
    context: RequestContext,
    options: ClientOptions,
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("context", &self.context)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Creates a client backed by reqwest with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(ClientOptions::default())
    }

    /// Creates a reqwest-backed client from `options`.
    pub fn with_options(options: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(&options.transport)?;
        Ok(Self::with_transport(transport, options))
    }

    /// Creates a client on top of a custom [`Transport`].
    ///
    /// `options.transport` is ignored here; the transport is assumed to be
    /// configured already.
    pub fn with_transport(transport: impl Transport + 'static, options: ClientOptions) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        Self {
            fetcher: RetryingFetcher::new(transport, options.success_status.clone()),
            context: RequestContext::new(options.proxy_url.clone(), client_user_agent(&options)),
            options,
        }
    }

    /// Creates a reqwest-backed client configured from environment variables.
    ///
    /// Reads (both optional):
    /// - `BATCHFETCH_PROXY_URL` — prefix prepended to every request URL
    /// - `BATCHFETCH_USER_AGENT` — default `User-Agent`
    ///
    /// Empty values are treated as unset.
    pub fn from_env() -> Result<Self> {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        Self::with_options(ClientOptions {
            proxy_url: read("BATCHFETCH_PROXY_URL"),
            user_agent: read("BATCHFETCH_USER_AGENT"),
            ..ClientOptions::default()
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends one request, retrying per its policy.
    ///
    /// Never fails; a request that exhausts its retries comes back as a
    /// synthesized response with `failed_attempts` filled in.
    pub async fn fetch(&self, request: impl Into<RequestSpec>) -> HttpResponse {
        self.fetcher.execute(request.into(), &self.context).await
    }

    /// Sends a batch of requests; `result[i]` answers `batch.requests[i]`.
    pub async fn fetch_many(&self, batch: BatchRequest) -> Vec<HttpResponse> {
        BoundedBatchExecutor::new(&self.fetcher, &self.context)
            .execute_all(batch.requests, batch.concurrency, batch.request_delay)
            .await
    }
}

/// The client-level user agent; a `User-Agent` among the engine's default
/// headers counts as supplied.
fn client_user_agent(options: &ClientOptions) -> Option<String> {
    options.user_agent.clone().or_else(|| {
        options
            .transport
            .headers
            .get("user-agent")
            .map(str::to_owned)
    })
}
