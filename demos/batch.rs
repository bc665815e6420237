use std::time::Duration;

use batchfetch_http::{BatchRequest, FetchClient, RequestSpec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        anyhow::bail!("usage: batch <url>...");
    }

    let client = FetchClient::from_env()?;

    let batch = BatchRequest::new(urls.iter().map(|url| RequestSpec::get(url.as_str()).max_retries(1)))
        .concurrency(4)
        .request_delay(Duration::from_millis(100));

    let results = client.fetch_many(batch).await;

    for (url, res) in urls.iter().zip(&results) {
        if res.failed_attempts.is_empty() {
            println!("{url}: {} ({} bytes)", res.status, res.body.len());
        } else {
            eprintln!(
                "{url}: {} after {} attempt(s), last error: {}",
                res.status,
                res.attempts,
                res.failed_attempts
                    .last()
                    .map(|f| f.error.as_str())
                    .unwrap_or_default()
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
