use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::sleep;

use crate::{HttpResponse, RequestContext, RequestSpec, RetryingFetcher, Transport};

/// Runs many requests through a [`RetryingFetcher`] with a cap on how many
/// are in flight at once.
///
/// All requests are driven from the calling task; nothing is spawned.
#[derive(Debug)]
pub struct BoundedBatchExecutor<'a, T> {
    fetcher: &'a RetryingFetcher<T>,
    context: &'a RequestContext,
}

impl<'a, T: Transport> BoundedBatchExecutor<'a, T> {
    pub fn new(fetcher: &'a RetryingFetcher<T>, context: &'a RequestContext) -> Self {
        Self { fetcher, context }
    }

    /// Executes every request and returns responses in input order.
    ///
    /// `concurrency` of `None` or `0` dispatches without limit. When
    /// `request_delay` is set, each dispatch waits that long first; requests
    /// already in flight keep progressing during the wait.
    pub async fn execute_all(
        &self,
        requests: Vec<RequestSpec>,
        concurrency: Option<usize>,
        request_delay: Option<Duration>,
    ) -> Vec<HttpResponse> {
        let limit = concurrency.filter(|&limit| limit > 0);
        let request_delay = request_delay.filter(|delay| !delay.is_zero());
        let mut results: Vec<Option<HttpResponse>> = vec![None; requests.len()];
        let mut in_flight = FuturesUnordered::new();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            requests = requests.len(),
            concurrency = ?limit,
            "dispatching batch"
        );

        for (index, spec) in requests.into_iter().enumerate() {
            if let Some(delay) = request_delay {
                let pause = sleep(delay);
                tokio::pin!(pause);
                loop {
                    tokio::select! {
                        _ = &mut pause => break,
                        Some((done, response)) = in_flight.next(), if !in_flight.is_empty() => {
                            results[done] = Some(response);
                        }
                    }
                }
            }

            in_flight.push(self.run(index, spec));

            if limit.is_some_and(|limit| in_flight.len() >= limit) {
                if let Some((done, response)) = in_flight.next().await {
                    results[done] = Some(response);
                }
            }
        }

        while let Some((done, response)) = in_flight.next().await {
            results[done] = Some(response);
        }

        results.into_iter().flatten().collect()
    }

    async fn run(&self, index: usize, spec: RequestSpec) -> (usize, HttpResponse) {
        #[cfg(feature = "tracing")]
        tracing::debug!(index, url = %spec.url, "request dispatched");
        (index, self.fetcher.execute(spec, self.context).await)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::{
        test_support::{fault, ok, MockTransport},
        BoundedBatchExecutor, RequestContext, RequestSpec, RetryingFetcher, SuccessPredicate,
    };

    fn urls(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("https://item.test/{i}")).collect()
    }

    fn specs(urls: &[String]) -> Vec<RequestSpec> {
        urls.iter().map(|url| RequestSpec::get(url.as_str())).collect()
    }

    #[tokio::test]
    async fn results_follow_input_order_under_varied_latency() {
        let urls = urls(4);
        let transport = MockTransport::default()
            .with_latency(&urls[0], Duration::from_millis(80))
            .with_latency(&urls[1], Duration::from_millis(10))
            .with_latency(&urls[2], Duration::from_millis(50))
            .with_latency(&urls[3], Duration::from_millis(1));
        let fetcher = RetryingFetcher::new(transport, SuccessPredicate::default());
        let context = RequestContext::default();

        let results = BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(specs(&urls), None, None)
            .await;

        assert_eq!(results.len(), 4);
        for (url, res) in urls.iter().zip(&results) {
            assert_eq!(&res.body, url);
        }
        let events = fetcher.transport().events();
        assert_eq!(events.last().map(String::as_str), Some("end https://item.test/0"));
    }

    #[tokio::test]
    async fn concurrency_bound_caps_in_flight_requests() {
        let urls = urls(7);
        let transport = urls.iter().fold(MockTransport::default(), |t, url| {
            t.with_latency(url, Duration::from_millis(20))
        });
        let fetcher = RetryingFetcher::new(transport, SuccessPredicate::default());
        let context = RequestContext::default();

        let results = BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(specs(&urls), Some(3), None)
            .await;

        assert_eq!(results.len(), 7);
        assert_eq!(fetcher.transport().max_in_flight(), 3);
    }

    #[tokio::test]
    async fn unbounded_concurrency_overlaps_all_requests() {
        let urls = urls(5);
        let transport = urls.iter().fold(MockTransport::default(), |t, url| {
            t.with_latency(url, Duration::from_millis(20))
        });
        let fetcher = RetryingFetcher::new(transport, SuccessPredicate::default());
        let context = RequestContext::default();

        BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(specs(&urls), Some(0), None)
            .await;

        assert_eq!(fetcher.transport().max_in_flight(), 5);
    }

    #[tokio::test]
    async fn concurrency_of_one_runs_sequentially() {
        let urls = urls(3);
        let transport = MockTransport::default()
            .with_latency(&urls[0], Duration::from_millis(30))
            .with_latency(&urls[1], Duration::from_millis(5))
            .with_latency(&urls[2], Duration::from_millis(15));
        let fetcher = RetryingFetcher::new(transport, SuccessPredicate::default());
        let context = RequestContext::default();

        BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(specs(&urls), Some(1), None)
            .await;

        let expected: Vec<String> = urls
            .iter()
            .flat_map(|url| [format!("start {url}"), format!("end {url}")])
            .collect();
        assert_eq!(fetcher.transport().events(), expected);
        assert_eq!(fetcher.transport().max_in_flight(), 1);
    }

    #[tokio::test]
    async fn request_delay_paces_dispatch() {
        let urls = urls(3);
        let fetcher = RetryingFetcher::new(MockTransport::default(), SuccessPredicate::default());
        let context = RequestContext::default();
        let started = Instant::now();

        let results = BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(specs(&urls), None, Some(Duration::from_millis(40)))
            .await;

        assert!(started.elapsed() >= Duration::from_millis(120));
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn paced_requests_still_overlap() {
        let urls = urls(3);
        let latency = Duration::from_millis(100);
        let delay = Duration::from_millis(30);
        let transport = urls
            .iter()
            .fold(MockTransport::default(), |t, url| t.with_latency(url, latency));
        let fetcher = RetryingFetcher::new(transport, SuccessPredicate::default());
        let context = RequestContext::default();
        let started = Instant::now();

        let results = BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(specs(&urls), Some(3), Some(delay))
            .await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 3);
        assert!(elapsed >= delay * 3);
        assert!(elapsed < (delay + latency) * 3 - Duration::from_millis(60));
        assert!(fetcher.transport().max_in_flight() > 1);

        let events = fetcher.transport().events();
        let starts: Vec<_> = events[..3].iter().map(String::as_str).collect();
        assert_eq!(
            starts,
            vec![
                "start https://item.test/0",
                "start https://item.test/1",
                "start https://item.test/2"
            ]
        );
        assert!(events[3..].iter().all(|event| event.starts_with("end ")));
    }

    #[tokio::test]
    async fn one_exhausted_request_does_not_abort_siblings() {
        let urls = urls(3);
        let fetcher = RetryingFetcher::new(
            MockTransport::scripted([ok(200, "first"), fault("dns failure"), ok(200, "third")]),
            SuccessPredicate::default(),
        );
        let context = RequestContext::default();

        let results = BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(specs(&urls), Some(1), None)
            .await;

        assert_eq!(results[0].body, "first");
        assert_eq!(results[1].status, 500);
        assert_eq!(results[1].failed_attempts[0].error, "dns failure");
        assert_eq!(results[2].body, "third");
    }

    #[tokio::test]
    async fn empty_batch_returns_nothing() {
        let fetcher = RetryingFetcher::new(MockTransport::default(), SuccessPredicate::default());
        let context = RequestContext::default();

        let results = BoundedBatchExecutor::new(&fetcher, &context)
            .execute_all(Vec::new(), Some(2), Some(Duration::from_millis(5)))
            .await;

        assert!(results.is_empty());
        assert_eq!(fetcher.transport().hits(), 0);
    }
}
