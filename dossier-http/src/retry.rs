use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

const BASE_DELAY_MS: u64 = 200;
const MAX_DOUBLINGS: u32 = 10;
/// Floor for a 429 that came without `Retry-After`.
const RATE_LIMIT_FLOOR: Duration = Duration::from_millis(1100);

pub(crate) fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Exponential delay before retry number `retry` (1-based).
pub(crate) fn backoff(retry: usize) -> Duration {
    let doublings = (retry.saturating_sub(1) as u32).min(MAX_DOUBLINGS);
    Duration::from_millis(BASE_DELAY_MS << doublings)
}

/// Delay before retrying a failed status: the server's `Retry-After`
/// seconds when given, otherwise [`backoff`].
pub(crate) fn delay_for(status: StatusCode, headers: &HeaderMap, retry: usize) -> Duration {
    let advised = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    match advised {
        Some(d) => d,
        None if status == StatusCode::TOO_MANY_REQUESTS => backoff(retry).max(RATE_LIMIT_FLOOR),
        None => backoff(retry),
    }
}
