use std::{fmt, sync::Arc, time::Duration};

use crate::Headers;

/// User agent sent when neither the request nor the client sets one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Decides whether a response status counts as success.
#[derive(Clone)]
pub struct SuccessPredicate(Arc<dyn Fn(u16) -> bool + Send + Sync>);

impl SuccessPredicate {
    pub fn new(predicate: impl Fn(u16) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn is_success(&self, status: u16) -> bool {
        (self.0)(status)
    }
}

impl Default for SuccessPredicate {
    fn default() -> Self {
        Self::new(|status| (200..=299).contains(&status))
    }
}

impl fmt::Debug for SuccessPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SuccessPredicate(..)")
    }
}

/// HTTP protocol preference forwarded to the reqwest client.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HttpVersion {
    /// Negotiate via ALPN.
    #[default]
    Auto,
    Http1Only,
    /// HTTP/2 without negotiation; the server must support it.
    Http2PriorKnowledge,
}

impl HttpVersion {
    pub(crate) fn apply(self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        match self {
            Self::Auto => builder,
            Self::Http1Only => builder.http1_only(),
            Self::Http2PriorKnowledge => builder.http2_prior_knowledge(),
        }
    }
}

/// Options passed through to the underlying HTTP engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportOptions {
    /// Accept invalid TLS certificates.
    pub ignore_tls_errors: bool,
    pub http_version: HttpVersion,
    pub follow_redirects: bool,
    /// Upper bound on redirect hops when `follow_redirects` is set.
    pub max_redirects: usize,
    /// Keep cookies between requests made by the same client.
    pub cookie_store: bool,
    /// Whole-request timeout applied to every request.
    pub timeout: Option<Duration>,
    /// Headers added to every request by the engine.
    pub headers: Headers,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            ignore_tls_errors: false,
            http_version: HttpVersion::Auto,
            follow_redirects: true,
            max_redirects: 20,
            cookie_store: false,
            timeout: None,
            headers: Headers::new(),
        }
    }
}

/// Configures a [`FetchClient`](crate::FetchClient).
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    /// Base prepended verbatim to every request URL.
    pub proxy_url: Option<String>,
    /// Falls back to [`DEFAULT_USER_AGENT`].
    pub user_agent: Option<String>,
    pub success_status: SuccessPredicate,
    pub transport: TransportOptions,
}
