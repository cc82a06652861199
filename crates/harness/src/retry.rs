//! Explicit retry wrapper
//!
//! Nothing in the harness retries on its own; a test that wants retries
//! wraps the operation here with an attempt count and delay.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::HarnessResult;

/// Run `op` up to `attempts` times, sleeping `delay` between failures.
/// The last error is returned when every attempt fails.
pub async fn retry<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> HarnessResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HarnessResult<T>>,
{
    let attempts = attempts.max(1);
    for attempt in 1..attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(attempt, attempts, error = %err, "attempt failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
    // the final attempt's error propagates as-is
    op().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::error::HarnessError;

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry(3, Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 2 {
                    Err(HarnessError::Bridge("not yet".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_keeps_last_error() {
        let calls = AtomicU32::new(0);
        let result: HarnessResult<()> = retry(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(HarnessError::Bridge("still broken".into())) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(result.unwrap_err().to_string().contains("still broken"));
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let _ = retry(0, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
