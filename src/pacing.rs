//! Request pacing between page fetches.

use std::time::Duration;
use tracing::debug;

/// Suspends the current task for `duration`. A zero duration returns immediately.
///
/// Only the calling task waits; other product pipelines keep running.
pub async fn delay(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    debug!("Delaying {}ms", duration.as_millis());
    tokio::time::sleep(duration).await;
}

/// Returns `base_ms` plus a uniform random jitter in `0..=jitter_ms`.
pub fn jittered(base_ms: u64, jitter_ms: u64) -> Duration {
    let jitter = if jitter_ms > 0 { rand::random_range(0..=jitter_ms) } else { 0 };
    Duration::from_millis(base_ms.saturating_add(jitter))
}
