//! `batchfetch-http` is an async HTTP fetch adapter with retries and
//! bounded-concurrency batches.
//!
//! The crate wraps any [`Transport`] (reqwest by default) with:
//! - [`FetchClient::fetch`] — one request, retried per its [`RequestSpec`]
//! - [`FetchClient::fetch_many`] — many requests, at most N in flight,
//!   results in input order
//!
//! Neither call fails: exhausted requests come back as an [`HttpResponse`]
//! with status 500 (or whatever the transport reported) and the list of
//! [`FailedAttempt`]s.

mod batch;
mod client;
mod error;
mod fetcher;
mod headers;
mod options;
mod request;
mod reqwest_transport;
mod transport;
mod types;

#[cfg(test)]
mod test_support;

pub use batch::BoundedBatchExecutor;
pub use client::FetchClient;
pub use error::FetchError;
pub use fetcher::{RequestContext, RetryingFetcher};
pub use headers::Headers;
pub use options::{ClientOptions, HttpVersion, SuccessPredicate, TransportOptions, DEFAULT_USER_AGENT};
pub use request::{BatchRequest, RequestSpec};
pub use reqwest_transport::ReqwestTransport;
pub use transport::{ErrorResponse, Transport, TransportError, TransportRequest, TransportResponse};
pub use types::{FailedAttempt, HttpResponse};

pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, FetchError>;
