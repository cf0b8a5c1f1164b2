// src/verifier/retry.rs
// =============================================================================
// Bounded-retry layer under the probe.
//
// Every probe attempt goes through `send_with_retry`, which transparently
// re-sends a request when it fails in a way that might succeed on the next
// try: connection/timeout errors, or a response with one of the retryable
// status codes (429, 500, 502, 503, 504).
//
// Two rules the probe relies on:
// - a retryable status that survives the whole budget is returned as the
//   final response, never as an error;
// - the probe itself never retries above this layer - once the budget is
//   spent it moves on to the next URL variant.
// =============================================================================

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Maximum transparent re-attempts for a single request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base factor for the exponential backoff series (600ms).
const DEFAULT_BACKOFF_FACTOR: Duration = Duration::from_millis(600);

/// Statuses retried before the final response is surfaced to the probe.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Configuration for the transparent retry behavior.
///
/// The delay before the k-th retry (1-indexed) is
/// `backoff_factor * 2^(k-1)`, so with the default factor the series is
/// 0.6s, 1.2s, 2.4s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    // Custom policy; tests use a zero backoff factor to keep the error
    // paths fast.
    pub fn new(max_retries: u32, backoff_factor: Duration) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before the given retry (1-indexed): factor * 2^(retry-1).
    fn backoff_delay(&self, retry: u32) -> Duration {
        self.backoff_factor * 2u32.pow(retry.saturating_sub(1))
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        RETRY_STATUSES.contains(&status.as_u16())
    }

    // Connection and timeout failures may recover on a re-send; anything
    // else (redirect loops, malformed requests) will not.
    fn is_retryable_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }
}

// Sends a GET request, transparently retrying within the policy's budget.
//
// Returns:
//   Ok(response) - the first non-retryable response, or the final response
//                  when a retryable status exhausted the budget
//   Err(error)   - a non-retryable request error, or a retryable one that
//                  exhausted the budget
pub async fn send_with_retry(
    client: &Client,
    policy: &RetryPolicy,
    url: &str,
) -> Result<Response, reqwest::Error> {
    let mut retries_used: u32 = 0;

    loop {
        match client.get(url).send().await {
            Ok(response) => {
                if RetryPolicy::is_retryable_status(response.status())
                    && retries_used < policy.max_retries
                {
                    retries_used += 1;
                    let delay = policy.backoff_delay(retries_used);
                    debug!(
                        url,
                        status = response.status().as_u16(),
                        retry = retries_used,
                        delay_ms = delay.as_millis() as u64,
                        "retryable status, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Ok(response);
            }
            Err(error) => {
                if RetryPolicy::is_retryable_error(&error) && retries_used < policy.max_retries {
                    retries_used += 1;
                    let delay = policy.backoff_delay(retries_used);
                    debug!(
                        url,
                        error = %error,
                        retry = retries_used,
                        delay_ms = delay.as_millis() as u64,
                        "request error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(error);
            }
        }
    }
}
