use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::Headers;

/// One unsuccessful attempt of a logical request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedAttempt {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Terminal result of a logical request, successful or not.
///
/// A failed request still yields an `HttpResponse`: inspect
/// [`failed_attempts`](Self::failed_attempts) and [`attempts`](Self::attempts)
/// to tell a genuine response from one synthesized after exhausting retries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body: String,
    pub attempts: usize,
    pub failed_attempts: Vec<FailedAttempt>,
}

impl HttpResponse {
    /// Whether the status lies in 200..=299.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}
