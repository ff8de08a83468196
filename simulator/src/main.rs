mod payload;

use std::future::Future;
use std::time::Duration;

use clap::Parser;
use payload::SensorPayload;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Posts synthetic sensor readings to the ingestor on a fixed interval.
#[derive(Debug, Parser)]
#[command(name = "simulator", version)]
struct Args {
    /// Ingestion endpoint
    #[arg(long, env = "SENSOR_URL", default_value = "http://127.0.0.1:8080/sensordata")]
    url: String,

    /// Seconds between readings
    #[arg(long, env = "SEND_INTERVAL", default_value_t = 5)]
    interval_secs: u64,

    /// Stop after this many readings; runs until Ctrl-C otherwise
    #[arg(long)]
    count: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    info!("Starting sensor simulator");
    info!("Endpoint: {}, interval: {}s", args.url, args.interval_secs);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let interval = Duration::from_secs(args.interval_secs.max(1));
    let client = &client;
    let url = args.url.as_str();
    let (sent, failed) = run(interval, args.count, tokio::signal::ctrl_c(), move |reading| async move {
        send(client, url, &reading).await
    })
    .await;

    info!("Stopped after {} sent, {} failed", sent, failed);
}

/// Emits one reading per tick until `count` readings were attempted or
/// `shutdown` resolves. Returns `(sent, failed)`.
async fn run<F, S, Fut>(interval: Duration, count: Option<u64>, shutdown: F, mut deliver: S) -> (u64, u64)
where
    F: Future,
    S: FnMut(SensorPayload) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut ticker = tokio::time::interval(interval);
    let mut sent = 0u64;
    let mut failed = 0u64;

    // One listener for the whole run, so a signal during a send is not lost.
    tokio::pin!(shutdown);

    loop {
        if count.is_some_and(|limit| sent + failed >= limit) {
            break;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
            _ = ticker.tick() => {}
        }

        let reading = SensorPayload::random(&mut rand::thread_rng());
        debug!(?reading, "Sending reading");

        if deliver(reading).await {
            sent += 1;
        } else {
            failed += 1;
        }
    }

    (sent, failed)
}

/// Delivery failures are logged and the next tick proceeds; there is no retry.
async fn send(client: &reqwest::Client, url: &str, reading: &SensorPayload) -> bool {
    match client.post(url).json(reading).send().await {
        Ok(resp) if resp.status().is_success() => {
            info!(
                temperature = reading.temperature,
                humidity = reading.humidity,
                pressure = reading.pressure,
                lux = reading.lux,
                "Reading stored"
            );
            true
        }
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("Server responded with {}: {}", status, body);
            false
        }
        Err(e) if e.is_timeout() => {
            warn!("Request timed out: {}", e);
            false
        }
        Err(e) if e.is_connect() => {
            warn!("Failed to connect to {}: {}", url, e);
            false
        }
        Err(e) => {
            error!("Failed to send reading: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_stops_after_count() {
        let (sent, failed) = run(
            Duration::from_millis(1),
            Some(3),
            std::future::pending::<()>(),
            |_| std::future::ready(true),
        )
        .await;

        assert_eq!((sent, failed), (3, 0));
    }

    #[tokio::test]
    async fn test_failed_sends_are_counted_and_loop_continues() {
        let mut calls = 0;
        let (sent, failed) = run(
            Duration::from_millis(1),
            Some(4),
            std::future::pending::<()>(),
            |_| {
                calls += 1;
                std::future::ready(calls % 2 == 0)
            },
        )
        .await;

        assert_eq!((sent, failed), (2, 2));
    }

    #[tokio::test]
    async fn test_shutdown_during_send_stops_the_loop() {
        let (tx, rx) = oneshot::channel::<()>();
        let mut tx = Some(tx);

        let (sent, failed) = run(Duration::from_millis(1), None, rx, |_| {
            if let Some(tx) = tx.take() {
                let _ = tx.send(());
            }
            std::future::ready(true)
        })
        .await;

        assert_eq!((sent, failed), (1, 0));
    }
}
