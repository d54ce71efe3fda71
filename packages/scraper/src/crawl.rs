//! Online crawl loop.
//!
//! Fetches a page, extracts its reviews, resolves the next page and repeats
//! until the page limit is hit, no next page is found, the next page was
//! already visited, or a fetch fails. Requests are strictly sequential, with
//! a randomized pause between pages.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng as _;
use review_scrape_models::Review;
use scraper::Html;
use url::Url;

use crate::extract::extract_from_document;
use crate::fetch::PageSource;
use crate::pagination::{NextPage, next_page_from_document};
use crate::progress::ProgressCallback;
use crate::selectors::ReviewSelectors;

/// Default number of pages to fetch.
pub const DEFAULT_MAX_PAGES: u32 = 3;

/// Default pause between page fetches.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound of the random extra pause between page fetches.
pub const DEFAULT_JITTER: Duration = Duration::from_millis(600);

/// Settings for an online crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// First page to fetch.
    pub start_url: String,
    /// Maximum number of pages to fetch.
    pub max_pages: u32,
    /// Fixed pause between page fetches.
    pub delay: Duration,
    /// Upper bound of a uniformly random pause added to `delay`.
    pub jitter: Duration,
}

impl CrawlOptions {
    /// Creates options for `start_url` with the default page limit and
    /// pacing.
    #[must_use]
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_owned(),
            max_pages: DEFAULT_MAX_PAGES,
            delay: DEFAULT_DELAY,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Sets the maximum number of pages to fetch.
    #[must_use]
    pub const fn with_max_pages(mut self, max: u32) -> Self {
        self.max_pages = max;
        self
    }

    /// Sets the fixed pause between page fetches.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the upper bound of the random extra pause.
    #[must_use]
    pub const fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured page limit was reached.
    PageLimit,
    /// The last page had no resolvable next page.
    NoNextPage,
    /// The next page had already been fetched in this run.
    AlreadyVisited,
    /// A page could not be fetched.
    FetchFailed,
}

/// Result of an online crawl.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Reviews from every fetched page, in page order.
    pub reviews: Vec<Review>,
    /// Number of pages successfully fetched.
    pub pages_fetched: u32,
    /// Why the loop stopped.
    pub stop_reason: StopReason,
}

/// Crawls from `options.start_url`, following next pages.
///
/// Never fails: fetch errors end the crawl early and whatever was collected
/// so far is returned.
pub async fn crawl<S: PageSource + ?Sized>(
    source: &S,
    selectors: &ReviewSelectors,
    options: &CrawlOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> CrawlSummary {
    let mut reviews: Vec<Review> = Vec::new();
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut pages_fetched: u32 = 0;
    let mut url = Url::parse(&options.start_url)
        .map_or_else(|_| options.start_url.clone(), String::from);

    progress.set_total(u64::from(options.max_pages));

    let stop_reason = loop {
        if pages_fetched >= options.max_pages {
            log::info!("reached page limit ({}); stopping.", options.max_pages);
            break StopReason::PageLimit;
        }
        if !visited.insert(url.clone()) {
            log::info!("no new page or repeated page; stopping.");
            break StopReason::AlreadyVisited;
        }

        let page_number = pages_fetched + 1;
        progress.set_message(format!("page {page_number}: {url}"));

        let Some(html) = source.fetch_page(&url).await else {
            log::warn!("failed to fetch page {page_number}: {url}");
            break StopReason::FetchFailed;
        };
        pages_fetched = page_number;

        let (page_reviews, next) = parse_page(&html, &url, selectors);
        log::info!("parsed {} reviews from page {page_number}.", page_reviews.len());
        reviews.extend(page_reviews);
        progress.inc(1);

        let Some(next) = next else {
            log::info!("no next page link found; stopping.");
            break StopReason::NoNextPage;
        };

        let next_url = String::from(next.url);
        if pages_fetched < options.max_pages && !visited.contains(&next_url) {
            let pause = options.delay + jitter(options.jitter);
            log::debug!("sleeping {pause:?} before {next_url}");
            tokio::time::sleep(pause).await;
        }
        url = next_url;
    };

    progress.finish(format!(
        "crawl complete -- {} reviews from {pages_fetched} pages",
        reviews.len()
    ));

    CrawlSummary {
        reviews,
        pages_fetched,
        stop_reason,
    }
}

/// Parses `html` once for both extraction and next-page resolution.
///
/// Kept synchronous so the non-`Send` [`Html`] never lives across an
/// `.await`.
fn parse_page(
    html: &str,
    page_url: &str,
    selectors: &ReviewSelectors,
) -> (Vec<Review>, Option<NextPage>) {
    let document = Html::parse_document(html);
    let reviews = extract_from_document(&document, page_url, selectors);
    let next = next_page_from_document(&document, page_url, selectors.next.as_ref());
    (reviews, next)
}

/// Uniformly random duration in `[0, max]`, at millisecond resolution.
fn jitter(max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_ms))
}
