use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use sluice_core::{BackoffPolicy, PacingPolicy, QueueConfig, SerializedRetryQueue};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sluice_core=debug")),
        )
        .init();

    // One queue per rate-limited dependency; everything below funnels
    // through the same execution stream. Delays are shortened so the demo
    // finishes in seconds.
    let queue = Arc::new(SerializedRetryQueue::new(QueueConfig {
        backoff: BackoffPolicy {
            base_delay: Duration::from_millis(500),
            ..BackoffPolicy::default()
        },
        pacing: PacingPolicy {
            min: Duration::from_millis(300),
            max: Duration::from_millis(800),
        },
        max_attempts: None,
    }));

    // A flaky call: fails twice before it starts answering.
    let remaining_failures = Arc::new(AtomicU32::new(2));
    let flaky = {
        let remaining = Arc::clone(&remaining_failures);
        queue
            .submit(move || {
                let remaining = Arc::clone(&remaining);
                async move {
                    let left = remaining.load(Ordering::Relaxed);
                    if left > 0 {
                        remaining.fetch_sub(1, Ordering::Relaxed);
                        return Err(format!("upstream unavailable (left={left})"));
                    }
                    Ok::<_, String>("flaky upstream finally answered".to_string())
                }
            })
            .await
    };
    info!(submission = %flaky.id(), "flaky call queued");

    let greeting = queue
        .submit(|| async { Ok::<_, String>("hello".to_string()) })
        .await;
    let farewell = queue
        .submit(|| async { Ok::<_, String>("goodbye".to_string()) })
        .await;

    // Resolution order is submission order: the flaky call's retries keep it
    // at the head, so the two well-behaved calls wait behind it.
    let result = flaky.await.expect("queue outlives this function");
    info!(%result, "flaky call resolved");
    let result = greeting.await.expect("queue outlives this function");
    info!(%result, "greeting resolved");
    let result = farewell.await.expect("queue outlives this function");
    info!(%result, "farewell resolved");

    let stats = queue.stats().await;
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).expect("stats serialize")
    );
}
