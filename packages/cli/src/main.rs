#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `review_scrape`: scrape review cards from a paginated site, or from
//! saved HTML files, and write them to JSON or CSV.
//!
//! Uses `indicatif-log-bridge` (via [`review_scrape_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod args;

use std::time::Duration;

use clap::Parser;
use review_scrape_cli_utils::{IndicatifProgress, MultiProgress};
use review_scrape_models::Review;
use review_scrape_scraper::crawl::{CrawlOptions, crawl};
use review_scrape_scraper::fetch::Fetcher;
use review_scrape_scraper::offline::scrape_offline;
use review_scrape_scraper::profile::all_profiles;
use review_scrape_scraper::selectors::ReviewSelectors;
use review_scrape_scraper::session::{build_client, load_cookies, load_headers};
use review_scrape_scraper::sink::write_reviews;
use url::Url;

use crate::args::Cli;

/// Below this many reviews the selectors are probably wrong (or the site
/// served a challenge page).
const LOW_YIELD_THRESHOLD: usize = 15;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = review_scrape_cli_utils::init_logger();
    let cli = Cli::parse();

    if cli.list_profiles {
        for profile in all_profiles() {
            println!("{:<12} {}", profile.id, profile.name);
        }
        return Ok(());
    }

    let selectors = cli.selectors()?;

    let reviews = if cli.is_offline() {
        run_offline(&cli, &selectors, &multi)?
    } else {
        run_online(&cli, &selectors, &multi).await?
    };

    if reviews.len() < LOW_YIELD_THRESHOLD {
        log::info!(
            "only {} reviews collected; the site may need different selectors, \
             cookies, or offline mode.",
            reviews.len()
        );
    }

    write_reviews(&reviews, &cli.out, cli.format)?;
    println!("Saved {} reviews -> {}", reviews.len(), cli.out.display());

    Ok(())
}

fn run_offline(
    cli: &Cli,
    selectors: &ReviewSelectors,
    multi: &MultiProgress,
) -> Result<Vec<Review>, Box<dyn std::error::Error>> {
    let base = cli
        .offline_base
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(Url::parse)
        .transpose()?;

    let progress = IndicatifProgress::files_bar(multi);
    Ok(scrape_offline(
        &cli.offline_files,
        base.as_ref(),
        selectors,
        &progress,
    ))
}

async fn run_online(
    cli: &Cli,
    selectors: &ReviewSelectors,
    multi: &MultiProgress,
) -> Result<Vec<Review>, Box<dyn std::error::Error>> {
    let start_url = cli
        .start_url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or("a start URL is required unless --offline-files is given")?;

    let headers = load_headers(Some(cli.headers.as_path()));
    let cookies = load_cookies(Some(cli.cookies.as_path()));
    log::debug!("{} headers, {} cookies", headers.len(), cookies.len());

    let client = build_client(&headers, &cookies, Duration::from_secs(cli.timeout))?;
    let fetcher = Fetcher::new(client).with_max_retries(cli.max_retries);

    let options = CrawlOptions::new(start_url)
        .with_max_pages(cli.pages)
        .with_delay(cli.delay());

    let progress = IndicatifProgress::pages_bar(multi, cli.pages);
    let summary = crawl(&fetcher, selectors, &options, &progress).await;
    log::info!(
        "crawl finished after {} pages ({:?})",
        summary.pages_fetched,
        summary.stop_reason
    );

    Ok(summary.reviews)
}
