use std::future::Future;
use std::time::Duration;

use crate::Result;

pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Run a fallible async operation up to `attempts` times with exponential
/// backoff, returning the first success or the last error.
pub async fn with_retries<T, F, Fut>(what: &str, attempts: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut delay = Duration::from_millis(500);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("{} failed (attempt {}/{}): {}", what, attempt, attempts, e);
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| crate::Error::External(anyhow::anyhow!("{} ran no attempts", what))))
}
