//! Offline extraction from pre-saved HTML files.
//!
//! Glob patterns are expanded into files which are parsed in order with the
//! same extractor as the online crawl. No pagination is resolved: the file
//! list is the page order. Each record's source URL is synthesized either as
//! a `file://` URL or, when a base URL is given, as the listing URL with an
//! offset guessed from the trailing page number in the file name.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use review_scrape_models::Review;
use url::Url;

use crate::extract::extract_reviews;
use crate::pagination::{OFFSET_PARAM, page_offset, with_query_param};
use crate::progress::ProgressCallback;
use crate::selectors::ReviewSelectors;

/// Trailing page number of a file stem (`reviews_3` -> `3`,
/// `yelp_p2_saved` -> `2`).
static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)[^0-9]*$").unwrap_or_else(|_| unreachable!()));

/// Expands glob patterns into file paths.
///
/// Patterns are expanded in the order given. Invalid patterns and
/// unreadable directory entries are logged and skipped.
#[must_use]
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        match glob::glob(pattern) {
            Ok(entries) => {
                for entry in entries {
                    match entry {
                        Ok(path) => paths.push(path),
                        Err(e) => log::warn!("skipping {}: {}", e.path().display(), e.error()),
                    }
                }
            }
            Err(e) => log::warn!("invalid file pattern '{pattern}': {e}"),
        }
    }

    paths
}

/// Page number at the end of `path`'s file stem, if any.
///
/// Numbers too large for `u64` saturate to `u64::MAX`.
#[must_use]
pub fn trailing_page_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits = TRAILING_NUMBER_RE.captures(stem)?.get(1)?.as_str();
    Some(digits.parse().unwrap_or_else(|_| {
        log::debug!("page number in '{stem}' overflows; saturating");
        u64::MAX
    }))
}

/// Synthesizes the source URL recorded for reviews parsed from `path`.
///
/// With a `base` URL, its `start` parameter is set to `(N - 1) * 20` for a
/// trailing page number `N` in the file name (0 when there is none).
/// Without one, the absolute `file://` URL of `path` is used.
#[must_use]
pub fn offline_source_url(path: &Path, base: Option<&Url>) -> String {
    if let Some(base) = base {
        let offset = trailing_page_number(path).map_or(0, page_offset);
        return with_query_param(base, OFFSET_PARAM, &offset.to_string()).into();
    }

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute)
        .map_or_else(|()| format!("file://{}", absolute.display()), String::from)
}

/// Parses every readable file in `paths`.
///
/// Unreadable files are logged and skipped. Invalid UTF-8 is replaced
/// rather than rejected, since saved pages are often re-encoded by browsers.
#[must_use]
pub fn parse_files(
    paths: &[PathBuf],
    base: Option<&Url>,
    selectors: &ReviewSelectors,
    progress: &Arc<dyn ProgressCallback>,
) -> Vec<Review> {
    let mut reviews = Vec::new();
    progress.set_total(paths.len() as u64);

    for path in paths {
        progress.set_message(path.display().to_string());

        let html = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                progress.inc(1);
                continue;
            }
        };

        let source_url = offline_source_url(path, base);
        let page_reviews = extract_reviews(&html, &source_url, selectors);
        log::info!(
            "parsed {} reviews from {}.",
            page_reviews.len(),
            path.display()
        );
        reviews.extend(page_reviews);
        progress.inc(1);
    }

    progress.finish(format!(
        "offline parse complete -- {} reviews from {} files",
        reviews.len(),
        paths.len()
    ));
    reviews
}

/// Expands `patterns` and parses the matching files.
#[must_use]
pub fn scrape_offline<S: AsRef<str>>(
    patterns: &[S],
    base: Option<&Url>,
    selectors: &ReviewSelectors,
    progress: &Arc<dyn ProgressCallback>,
) -> Vec<Review> {
    let paths = expand_patterns(patterns);
    if paths.is_empty() {
        log::warn!("no offline files matched; nothing to parse.");
        progress.finish("no offline files matched".to_string());
        return Vec::new();
    }

    log::info!("parsing {} offline files...", paths.len());
    parse_files(&paths, base, selectors, progress)
}

#[cfg(test)]
mod tests {
    use review_scrape_models::SelectorConfig;

    use super::*;
    use crate::progress::null_progress;

    const CARD: &str = r#"<div class="review"><span class="name">Ann</span></div>"#;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("review_scrape_offline_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn selectors() -> ReviewSelectors {
        ReviewSelectors::compile(&SelectorConfig {
            container: Some("div.review".to_string()),
            reviewer: Some(".name".to_string()),
            ..SelectorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn offset_from_trailing_number() {
        let base = Url::parse("https://x.com/biz/y").unwrap();
        let url = offline_source_url(Path::new("saved/reviews_3.html"), Some(&base));
        assert_eq!(url, "https://x.com/biz/y?start=40");
    }

    #[test]
    fn huge_trailing_number_saturates_offset() {
        let base = Url::parse("https://x.com/biz/y").unwrap();
        let expected = format!("https://x.com/biz/y?start={}", u64::MAX);

        let url = offline_source_url(Path::new("reviews_999999999999999999.html"), Some(&base));
        assert_eq!(url, expected);

        let url = offline_source_url(Path::new("reviews_123456789012345678901.html"), Some(&base));
        assert_eq!(url, expected);
    }

    #[test]
    fn offset_overrides_existing_start_and_keeps_other_params() {
        let base = Url::parse("https://x.com/biz/y?hl=en&start=100").unwrap();
        let url = offline_source_url(Path::new("page1.html"), Some(&base));
        assert_eq!(url, "https://x.com/biz/y?hl=en&start=0");
    }

    #[test]
    fn offset_is_zero_without_digits() {
        let base = Url::parse("https://x.com/biz/y").unwrap();
        let url = offline_source_url(Path::new("listing.html"), Some(&base));
        assert_eq!(url, "https://x.com/biz/y?start=0");
    }

    #[test]
    fn trailing_number_ignores_non_digit_suffix() {
        assert_eq!(trailing_page_number(Path::new("yelp_p2_saved.html")), Some(2));
        assert_eq!(trailing_page_number(Path::new("p10.htm")), Some(10));
        assert_eq!(trailing_page_number(Path::new("page.html")), None);
    }

    #[test]
    fn file_url_without_base() {
        let url = offline_source_url(Path::new("/tmp/reviews_1.html"), None);
        assert_eq!(url, "file:///tmp/reviews_1.html");
    }

    #[test]
    fn parses_matched_files_in_pattern_order() {
        let dir = fixture_dir("pattern_order");
        std::fs::write(dir.join("reviews_1.html"), format!("{CARD}{CARD}")).unwrap();
        std::fs::write(dir.join("reviews_2.html"), CARD).unwrap();
        std::fs::write(dir.join("notes.txt"), CARD).unwrap();

        let patterns = vec![
            dir.join("reviews_2.html").display().to_string(),
            dir.join("reviews_1*.html").display().to_string(),
        ];
        let base = Url::parse("https://x.com/biz/y").unwrap();
        let reviews = scrape_offline(&patterns, Some(&base), &selectors(), &null_progress());

        let urls: Vec<&str> = reviews.iter().map(|r| r.source_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.com/biz/y?start=20",
                "https://x.com/biz/y?start=0",
                "https://x.com/biz/y?start=0",
            ]
        );
    }

    #[test]
    fn skips_unreadable_paths() {
        let dir = fixture_dir("unreadable");
        std::fs::write(dir.join("reviews_1.html"), CARD).unwrap();
        let paths = vec![dir.join("missing.html"), dir.join("reviews_1.html")];

        let reviews = parse_files(&paths, None, &selectors(), &null_progress());
        assert_eq!(reviews.len(), 1);
        assert!(reviews[0].source_url.starts_with("file://"));
    }

    #[test]
    fn no_matches_yields_no_reviews() {
        let dir = fixture_dir("empty");
        let patterns = [dir.join("*.html").display().to_string()];
        assert!(scrape_offline(&patterns, None, &selectors(), &null_progress()).is_empty());
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        assert!(expand_patterns(&["[unclosed"]).is_empty());
    }
}
