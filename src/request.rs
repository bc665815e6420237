use std::time::Duration;

use reqwest::Method;

use crate::Headers;

/// A single logical request, including its retry policy.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: Option<String>,
    /// Maximum number of retries after the first attempt.
    pub max_retries: usize,
    /// Starting value of the attempt counter.
    pub retries: usize,
    /// Wait between attempts. `None` or zero retries immediately.
    pub retry_delay: Option<Duration>,
    /// Per-request timeout handed to the transport.
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Headers::new(),
            body: None,
            max_retries: 0,
            retries: 0,
            retry_delay: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Appends a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<&str> for RequestSpec {
    fn from(url: &str) -> Self {
        Self::get(url)
    }
}

impl From<String> for RequestSpec {
    fn from(url: String) -> Self {
        Self::get(url)
    }
}

/// A batch of requests executed with bounded concurrency.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchRequest {
    pub requests: Vec<RequestSpec>,
    /// Maximum in-flight requests. `None` or `0` means unbounded.
    pub concurrency: Option<usize>,
    /// Wait before each request's first attempt.
    pub request_delay: Option<Duration>,
}

impl BatchRequest {
    pub fn new<I, R>(requests: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RequestSpec>,
    {
        Self {
            requests: requests.into_iter().map(Into::into).collect(),
            concurrency: None,
            request_delay: None,
        }
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }
}
