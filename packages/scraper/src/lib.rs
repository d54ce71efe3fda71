#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Review scraping over paginated HTML listing pages.
//!
//! A run is a single sequential loop: [`fetch`] a page, [`extract`] review
//! records with a compiled [`selectors::ReviewSelectors`] set, resolve the
//! next page via [`pagination`], and repeat until a stop condition (see
//! [`crawl`]). [`offline`] runs the same extraction over pre-saved HTML files,
//! and [`sink`] writes the accumulated records as JSON or CSV.
//!
//! Fetch and file failures are logged and degrade to "no page" rather than
//! being returned as errors; [`ScrapeError`] is reserved for configuration
//! problems and output failures.

pub mod crawl;
pub mod extract;
pub mod fetch;
pub mod offline;
pub mod pagination;
pub mod profile;
pub mod progress;
pub mod selectors;
pub mod session;
pub mod sink;

pub use review_scrape_models::{OutputFormat, Review, SelectorConfig};

/// Errors that can occur while configuring or finishing a scrape.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request or client construction failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Response status code.
        status: reqwest::StatusCode,
        /// The requested URL.
        url: String,
    },

    /// A CSS selector failed to parse.
    #[error("invalid CSS selector for {field} '{selector}': {message}")]
    Selector {
        /// Which configured selector was invalid (e.g. `"container"`).
        field: &'static str,
        /// The offending selector string.
        selector: String,
        /// Parser error message.
        message: String,
    },

    /// A required selector was not configured.
    #[error("missing required selector: {0}")]
    MissingSelector(&'static str),

    /// An HTTP header name or value from the header file was invalid.
    #[error("invalid header '{name}': {message}")]
    Header {
        /// Header name as read from the header file.
        name: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A site profile could not be found or parsed.
    #[error("profile error: {0}")]
    Profile(String),

    /// A URL failed to parse.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
