use std::time::Duration;

use batchfetch_http::{FetchClient, RequestSpec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("BATCHFETCH_URL")?;

    let client = FetchClient::from_env()?;

    let res = client
        .fetch(
            RequestSpec::get(url)
                .header("Accept", "text/html")
                .max_retries(3)
                .retry_delay(Duration::from_millis(500)),
        )
        .await;

    println!("{} {} after {} attempt(s)", res.status, res.status_text, res.attempts);
    for failure in &res.failed_attempts {
        eprintln!("  {} {}", failure.timestamp, failure.error);
    }
    println!("{} bytes", res.body.len());

    Ok(())
}
