//! HTTP retry helpers for transient errors.
//!
//! Every spreadsheet and boundary download goes through [`send_text`]
//! instead of calling `reqwest::RequestBuilder::send()` directly, so
//! timeouts, connection resets, rate limiting and server errors are
//! retried with exponential backoff.
//!
//! ```ignore
//! let csv = retry::send_text(|| client.get(&url)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s) the total wait before giving up
/// is 14 seconds.
const MAX_RETRIES: u32 = 3;

/// Sends an HTTP request and returns the response body as a `String`.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`.
///
/// Retries on connection errors, timeouts, HTTP 429 and HTTP 5xx. Does
/// **not** retry other 4xx statuses, which are permanent.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body cannot be read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F) -> Result<String, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, MAX_RETRIES).await?;
    let url = response.url().to_string();

    match response.text().await {
        Ok(text) => Ok(text),
        Err(e) => {
            log::error!("Body read failed for {url}: {e}");
            Err(SourceError::Http(e))
        }
    }
}

/// Core retry loop. Returns the first 2xx/3xx response.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error();

                if retryable && attempt < max_retries {
                    log::warn!("  HTTP {status} from {}", response.url());
                    attempt += 1;
                    continue;
                }

                if retryable || status.is_client_error() {
                    return Err(SourceError::Status {
                        url: response.url().to_string(),
                        status,
                    });
                }

                return Ok(response);
            }
        }
    }
}

/// Delay before the given retry attempt (1-based): 2s, 4s, 8s, ...
const fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
