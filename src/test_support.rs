use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{Headers, Transport, TransportError, TransportRequest, TransportResponse};

pub(crate) fn ok(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse {
        status,
        status_text: String::new(),
        headers: Headers::from([("Content-Type", "text/plain")]),
        body: body.to_owned(),
    })
}

pub(crate) fn fault(message: &str) -> Result<TransportResponse, TransportError> {
    Err(TransportError::new(message))
}

/// In-memory transport that replays scripted outcomes.
///
/// Once the script runs dry it answers `200` with the request URL as body.
#[derive(Default)]
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    latency: HashMap<String, Duration>,
    requests: Mutex<Vec<TransportRequest>>,
    events: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn scripted(
        outcomes: impl IntoIterator<Item = Result<TransportResponse, TransportError>>,
    ) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn with_latency(mut self, url: &str, latency: Duration) -> Self {
        self.latency.insert(url.to_owned(), latency);
        self
    }

    pub(crate) fn hits(&self) -> usize {
        self.requests.lock().expect("requests mutex").len()
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("requests mutex").clone()
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().expect("events mutex").clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = request.url.clone();
        self.requests.lock().expect("requests mutex").push(request);
        self.events
            .lock()
            .expect("events mutex")
            .push(format!("start {url}"));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency.get(&url) {
            tokio::time::sleep(*latency).await;
        }

        let outcome = self
            .script
            .lock()
            .expect("script mutex")
            .pop_front()
            .unwrap_or_else(|| ok(200, &url));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events
            .lock()
            .expect("events mutex")
            .push(format!("end {url}"));
        outcome
    }
}
