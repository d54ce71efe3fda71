//! Command-line arguments and selector resolution.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use review_scrape_models::{OutputFormat, SelectorConfig};
use review_scrape_scraper::ScrapeError;
use review_scrape_scraper::crawl::DEFAULT_MAX_PAGES;
use review_scrape_scraper::fetch::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT};
use review_scrape_scraper::profile::{find_profile, load_profile_file};
use review_scrape_scraper::selectors::ReviewSelectors;

#[derive(Parser, Debug)]
#[command(
    name = "review_scrape",
    about = "Multi-page review scraper with optional offline parsing"
)]
pub struct Cli {
    /// Listing/reviews page URL to start from (ignored with --offline-files)
    pub start_url: Option<String>,

    /// How many pages to scrape when online
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub pages: u32,

    /// Delay in seconds between requests (a random 0-0.6s is added)
    #[arg(long, default_value_t = 1.0)]
    pub delay: f64,

    /// Output file path
    #[arg(long, default_value = "data.json")]
    pub out: PathBuf,

    /// Output format (`json` or `csv`)
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// CSS selector for each review card
    #[arg(long, alias = "review_container")]
    pub review_container: Option<String>,

    /// CSS selector inside a card for the reviewer name
    #[arg(long, alias = "sel_reviewer")]
    pub sel_reviewer: Option<String>,

    /// CSS selector inside a card for the rating
    #[arg(long, alias = "sel_rating")]
    pub sel_rating: Option<String>,

    /// CSS selector inside a card for the review date
    #[arg(long, alias = "sel_date")]
    pub sel_date: Option<String>,

    /// CSS selector inside a card for the review text
    #[arg(long, alias = "sel_text")]
    pub sel_text: Option<String>,

    /// CSS selector for the "next page" link (online mode)
    #[arg(long, alias = "sel_next")]
    pub sel_next: Option<String>,

    /// Built-in site profile supplying default selectors (see --list-profiles)
    #[arg(long)]
    pub profile: Option<String>,

    /// TOML profile file supplying default selectors
    #[arg(long)]
    pub profile_file: Option<PathBuf>,

    /// List built-in site profiles and exit
    #[arg(long)]
    pub list_profiles: bool,

    /// Path to a `Key: Value` headers file
    #[arg(long, default_value = "headers_ua.txt")]
    pub headers: PathBuf,

    /// Path to a Netscape or `name=value` cookies file
    #[arg(long, default_value = "cookies.txt")]
    pub cookies: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Attempts per page before giving up on transient errors
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Parse these local HTML files instead of fetching (globs like `yelp_p*.html`)
    #[arg(long, alias = "offline_files", num_args = 1..)]
    pub offline_files: Vec<String>,

    /// Base URL recorded as `source_url` for offline files
    #[arg(long, alias = "offline_base")]
    pub offline_base: Option<String>,
}

impl Cli {
    /// Selectors given directly on the command line.
    #[must_use]
    pub fn selector_flags(&self) -> SelectorConfig {
        SelectorConfig {
            container: self.review_container.clone(),
            reviewer: self.sel_reviewer.clone(),
            rating: self.sel_rating.clone(),
            date: self.sel_date.clone(),
            text: self.sel_text.clone(),
            next: self.sel_next.clone(),
        }
    }

    /// Merges command-line selectors over the profile file, then the
    /// built-in profile.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if a profile cannot be loaded.
    pub fn selector_config(&self) -> Result<SelectorConfig, ScrapeError> {
        let mut config = self.selector_flags();

        if let Some(path) = &self.profile_file {
            let profile = load_profile_file(path)?;
            log::info!("using selectors from profile file {}", path.display());
            config = config.or(&profile.selectors);
        }
        if let Some(id) = &self.profile {
            let profile = find_profile(id)?;
            log::info!("using selectors from profile '{}'", profile.name);
            config = config.or(&profile.selectors);
        }

        Ok(config)
    }

    /// Resolves and compiles the selector set for this run.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if a profile cannot be loaded, no container
    /// selector is configured, or a selector is invalid.
    pub fn selectors(&self) -> Result<ReviewSelectors, ScrapeError> {
        ReviewSelectors::compile(&self.selector_config()?)
    }

    /// Delay between pages; negative or non-finite values mean none.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    /// Whether this run parses local files instead of crawling.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        !self.offline_files.is_empty()
    }
}
