//! Review extraction.
//!
//! Selects every container matching [`ReviewSelectors::container`] and reads
//! the reviewer, rating, date and text sub-elements from each one. Fields are
//! extracted independently; a missing sub-element only blanks that field.

use std::sync::LazyLock;

use regex::Regex;
use review_scrape_models::Review;
use scraper::{ElementRef, Html, Selector};

use crate::selectors::ReviewSelectors;

/// First integer or decimal number in a string.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)").unwrap_or_else(|_| unreachable!()));

/// Extracts all reviews from an HTML page.
///
/// Containers that yield no reviewer, rating, date or text are dropped.
/// `page_url` is recorded as [`Review::source_url`] on every record.
#[must_use]
pub fn extract_reviews(html: &str, page_url: &str, selectors: &ReviewSelectors) -> Vec<Review> {
    let document = Html::parse_document(html);
    extract_from_document(&document, page_url, selectors)
}

/// Same as [`extract_reviews`] for an already-parsed document.
#[must_use]
pub fn extract_from_document(
    document: &Html,
    page_url: &str,
    selectors: &ReviewSelectors,
) -> Vec<Review> {
    document
        .select(&selectors.container)
        .filter_map(|container| {
            let review = Review {
                reviewer: field_text(container, selectors.reviewer.as_ref()),
                rating: field_rating(container, selectors.rating.as_ref()),
                date: field_text(container, selectors.date.as_ref()),
                text: field_text(container, selectors.text.as_ref()),
                source_url: page_url.to_owned(),
            };
            review.has_content().then_some(review)
        })
        .collect()
}

/// Parses the first number found in `text` as a rating.
///
/// ```
/// use review_scrape_scraper::extract::parse_rating;
///
/// assert_eq!(parse_rating("4.5 star rating"), Some(4.5));
/// assert_eq!(parse_rating("Closed"), None);
/// ```
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    NUMBER_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

fn select_first<'a>(container: ElementRef<'a>, selector: Option<&Selector>) -> Option<ElementRef<'a>> {
    container.select(selector?).next()
}

fn field_text(container: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let node = select_first(container, selector)?;
    let text = node.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// Reads the rating from `aria-label`, then `title`, then the visible text.
/// The first non-empty source wins even if it contains no number.
fn field_rating(container: ElementRef<'_>, selector: Option<&Selector>) -> Option<f64> {
    let node = select_first(container, selector)?;
    let element = node.value();

    let raw = element
        .attr("aria-label")
        .filter(|s| !s.is_empty())
        .or_else(|| element.attr("title").filter(|s| !s.is_empty()))
        .map_or_else(|| visible_text(node), str::to_owned);

    parse_rating(&raw)
}

/// Text pieces of `node`, each trimmed, joined by single spaces.
fn visible_text(node: ElementRef<'_>) -> String {
    node.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use review_scrape_models::SelectorConfig;

    use super::*;

    fn selectors(config: SelectorConfig) -> ReviewSelectors {
        ReviewSelectors::compile(&config).unwrap()
    }

    fn full_selectors() -> ReviewSelectors {
        selectors(SelectorConfig {
            container: Some("div.review".to_string()),
            reviewer: Some(".author".to_string()),
            rating: Some(".stars".to_string()),
            date: Some("time".to_string()),
            text: Some("p.body".to_string()),
            next: None,
        })
    }

    const PAGE: &str = r#"
        <html><body>
          <div class="review">
            <span class="author"> Alice </span>
            <div class="stars" aria-label="4.5 star rating"></div>
            <time>Sep 3, 2025</time>
            <p class="body">Great <b>croissants</b>.</p>
          </div>
          <div class="review">
            <span class="author">Bob</span>
            <div class="stars" title="3 out of 5">ignored</div>
          </div>
          <div class="review">
            <span class="stars"><i>2</i> <i>stars</i></span>
          </div>
          <div class="review">
            <span class="author">   </span>
            <div class="stars">Closed</div>
          </div>
        </body></html>
    "#;

    #[test]
    fn extracts_all_fields() {
        let reviews = extract_reviews(PAGE, "https://example.com/biz/a", &full_selectors());
        assert_eq!(reviews.len(), 3);

        let first = &reviews[0];
        assert_eq!(first.reviewer.as_deref(), Some("Alice"));
        assert_eq!(first.rating, Some(4.5));
        assert_eq!(first.date.as_deref(), Some("Sep 3, 2025"));
        assert_eq!(first.text.as_deref(), Some("Great croissants."));
        assert_eq!(first.source_url, "https://example.com/biz/a");
    }

    #[test]
    fn rating_prefers_title_over_text() {
        let reviews = extract_reviews(PAGE, "u", &full_selectors());
        assert_eq!(reviews[1].reviewer.as_deref(), Some("Bob"));
        assert_eq!(reviews[1].rating, Some(3.0));
        assert_eq!(reviews[1].text, None);
    }

    #[test]
    fn rating_falls_back_to_visible_text() {
        let reviews = extract_reviews(PAGE, "u", &full_selectors());
        assert_eq!(reviews[2].reviewer, None);
        assert_eq!(reviews[2].rating, Some(2.0));
    }

    #[test]
    fn drops_containers_without_content() {
        let reviews = extract_reviews(PAGE, "u", &full_selectors());
        assert!(reviews.iter().all(Review::has_content));
    }

    #[test]
    fn unset_selector_leaves_field_absent_for_every_record() {
        let selectors = selectors(SelectorConfig {
            container: Some("div.review".to_string()),
            reviewer: Some(".author".to_string()),
            text: Some("p.body".to_string()),
            ..SelectorConfig::default()
        });
        let reviews = extract_reviews(PAGE, "u", &selectors);
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.rating.is_none() && r.date.is_none()));
    }

    #[test]
    fn no_container_matches_yields_nothing() {
        let selectors = selectors(SelectorConfig {
            container: Some("article.missing".to_string()),
            reviewer: Some(".author".to_string()),
            ..SelectorConfig::default()
        });
        assert!(extract_reviews(PAGE, "u", &selectors).is_empty());
    }

    #[test]
    fn parses_ratings_from_free_text() {
        assert_eq!(parse_rating("4.5 star rating"), Some(4.5));
        assert_eq!(parse_rating("Rated 5 of 5"), Some(5.0));
        assert_eq!(parse_rating("Closed"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn ignores_non_ascii_digits() {
        assert_eq!(parse_rating("٣ stars, 4 out of 5"), Some(4.0));
        assert_eq!(parse_rating("٣"), None);
    }
}
