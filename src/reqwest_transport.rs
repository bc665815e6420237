use std::fmt;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect,
};

use crate::{
    ErrorResponse, FetchError, Headers, Result, Transport, TransportError, TransportOptions,
    TransportRequest, TransportResponse,
};

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Builds a client honoring the given engine options.
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let redirect_policy = if options.follow_redirects {
            redirect::Policy::limited(options.max_redirects)
        } else {
            redirect::Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(options.ignore_tls_errors)
            .redirect(redirect_policy)
            .cookie_store(options.cookie_store)
            .default_headers(to_header_map(&options.headers).map_err(FetchError::Transport)?);

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        builder = options.http_version.apply(builder);

        let http = builder.build().map_err(FetchError::Build)?;
        Ok(Self { http })
    }

    /// Wraps an already configured client.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> std::result::Result<TransportResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(to_header_map(&request.headers)?);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_owned();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        match response.text().await {
            Ok(body) => Ok(TransportResponse {
                status: status.as_u16(),
                status_text,
                headers,
                body,
            }),
            Err(err) => Err(transport_error(err).with_response(ErrorResponse {
                status: Some(status.as_u16()),
                status_text: Some(status_text),
                headers: Some(headers),
                body: None,
            })),
        }
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    TransportError::new(err.to_string())
}

fn to_header_map(headers: &Headers) -> std::result::Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| TransportError::new(format!("invalid header name '{name}': {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| TransportError::new(format!("invalid value for header '{name}': {err}")))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
