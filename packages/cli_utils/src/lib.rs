#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the `review_scrape` binary.
//!
//! [`init_logger`] routes `log` output through `indicatif-log-bridge`, and
//! [`IndicatifProgress`] renders the scraper's [`ProgressCallback`] updates as
//! `indicatif` bars on the same [`MultiProgress`].

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use review_scrape_scraper::progress::ProgressCallback;

pub use indicatif::MultiProgress;

const TICK: Duration = Duration::from_millis(120);

/// Progress for a crawl or an offline batch, drawn with `indicatif`.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied by `set_total()`; lets a spinner turn into a counted bar.
    counted_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Bar for an online crawl. `max_pages` is only a ceiling: most crawls
    /// stop early when the site runs out of pages.
    #[must_use]
    pub fn pages_bar(multi: &MultiProgress, max_pages: u32) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new(u64::from(max_pages)));
        let counted_style = counted_style("pages", "green");
        bar.set_style(counted_style.clone());
        bar.enable_steady_tick(TICK);

        Arc::new(Self { bar, counted_style })
    }

    /// Spinner for offline parsing; switches to a counted bar once the glob
    /// patterns have been expanded and the file count is known.
    #[must_use]
    pub fn files_bar(multi: &MultiProgress) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::with_template("{spinner:.yellow} expanding file patterns {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(TICK);

        Arc::new(Self {
            bar,
            counted_style: counted_style("files", "yellow"),
        })
    }
}

fn counted_style(unit: &str, color: &str) -> ProgressStyle {
    let template =
        format!("{{spinner:.{color}}} {{pos}}/{{len}} {unit} {{bar:30.{color}/dim}} {{msg}}");
    ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.counted_style.clone());
        self.bar.set_length(total);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge` and returns the
/// [`MultiProgress`] every bar has to be added to.
///
/// The level defaults to `info`; `RUST_LOG` overrides it.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    // A second call (tests, embedding) keeps the first logger.
    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    fn hidden() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn pages_bar_counts_pages() {
        let multi = hidden();
        let progress = IndicatifProgress::pages_bar(&multi, 3);
        progress.inc(1);
        progress.inc(1);
        progress.finish("done".to_string());
    }

    #[test]
    fn files_bar_accepts_late_total() {
        let multi = hidden();
        let progress = IndicatifProgress::files_bar(&multi);
        progress.set_total(2);
        progress.set_message("p1.html".to_string());
        progress.inc(2);
        progress.finish("done".to_string());
    }

    #[test]
    fn init_logger_is_idempotent() {
        let _ = init_logger();
        let _ = init_logger();
    }
}
