//! HTTP page fetching with retry for transient failures.
//!
//! [`Fetcher::fetch`] never returns an error: every failure is logged and
//! surfaces to the caller only as `None`. Transient failures (connection
//! errors, timeouts, body read errors and the statuses in
//! [`RETRYABLE_STATUSES`]) are retried with exponential backoff; any other
//! non-2xx status ends the attempt immediately.
//!
//! # Usage
//!
//! ```ignore
//! let client = session::build_client(&headers, &cookies, Duration::from_secs(30))?;
//! let fetcher = Fetcher::new(client);
//!
//! if let Some(html) = fetcher.fetch("https://example.com/reviews").await {
//!     // ...
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use crate::ScrapeError;

/// Default number of attempts per URL.
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Default exponential backoff base; attempt `n` waits `base^n` seconds.
pub const DEFAULT_BACKOFF_BASE: f64 = 1.8;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Statuses worth another attempt. 403 is included because bot walls often
/// clear after a pause.
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504, 403];

/// Something that can produce the HTML body of a page.
///
/// Implemented by [`Fetcher`] for live HTTP and by in-memory fixtures in
/// tests, so the crawl loop can be driven without a network.
pub trait PageSource {
    /// Returns the page body, or `None` if it could not be fetched.
    fn fetch_page(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Fetches pages over HTTP with a fixed retry policy.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    /// Total attempts per URL (including the first).
    max_retries: u32,
    /// Exponential backoff base in seconds.
    backoff_base: f64,
}

impl Fetcher {
    /// Creates a fetcher using `client` with the default retry policy.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }

    /// Sets the total number of attempts per URL (at least one is made).
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the exponential backoff base in seconds.
    #[must_use]
    pub const fn with_backoff_base(mut self, base: f64) -> Self {
        self.backoff_base = base;
        self
    }

    /// Fetches `url`, returning its body text on a 2xx response.
    ///
    /// All failures are logged and mapped to `None`.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.fetch_with_retry(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                log::warn!("giving up on {url}: {e}");
                None
            }
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String, ScrapeError> {
        let attempts = self.max_retries.max(1);
        let mut last_error: Option<ScrapeError> = None;

        for attempt in 1..=attempts {
            match self.client.get(url).send().await {
                Err(e) => {
                    log::warn!("{e} on {url}");
                    last_error = Some(ScrapeError::Http(e));
                }
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(text) => return Ok(text),
                            Err(e) => {
                                log::warn!("failed to read body of {url}: {e}");
                                last_error = Some(ScrapeError::Http(e));
                            }
                        }
                    } else {
                        log::warn!("status {status} for {url}");
                        let error = ScrapeError::Status {
                            status,
                            url: url.to_owned(),
                        };
                        if !is_retryable(status) {
                            return Err(error);
                        }
                        last_error = Some(error);
                    }
                }
            }

            if attempt < attempts {
                let delay = backoff_delay(self.backoff_base, attempt);
                log::debug!("  retry {}/{attempts} for {url} in {delay:?}", attempt + 1);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| ScrapeError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: url.to_owned(),
        }))
    }
}

impl PageSource for Fetcher {
    async fn fetch_page(&self, url: &str) -> Option<String> {
        self.fetch(url).await
    }
}

/// Returns `true` if a response with `status` should be retried.
#[must_use]
pub fn is_retryable(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}

/// Delay before the attempt following attempt number `attempt` (1-based).
#[must_use]
pub fn backoff_delay(base: f64, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let secs = base.powi(exponent);
    if secs.is_finite() && secs >= 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
