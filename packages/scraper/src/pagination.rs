//! Next-page resolution.
//!
//! A page's successor is found by trying each [`NextPageStrategy`] in order
//! and taking the first hit. Link-following strategies resolve an `href`
//! against the current page; [`NextPageStrategy::OffsetSynthesis`] builds the
//! URL itself for known review sites that paginate with an offset query
//! parameter.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Records per page on offset-paginated sites.
pub const OFFSET_PAGE_SIZE: u64 = 20;

/// Query parameter carrying the offset on offset-paginated sites.
pub const OFFSET_PARAM: &str = "start";

static REL_NEXT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[rel~='next'], link[rel~='next']").unwrap_or_else(|_| unreachable!())
});

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").unwrap_or_else(|_| unreachable!()));

static NEXT_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(next|older|more)\b").unwrap_or_else(|_| unreachable!())
});

/// A site that paginates by offset rather than by link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetSite {
    /// Substring the URL host must contain.
    pub host: &'static str,
    /// Substring the URL path must contain.
    pub path: &'static str,
}

/// Sites whose next page is synthesized when no link can be found.
pub const OFFSET_SITES: &[OffsetSite] = &[OffsetSite {
    host: "yelp.com",
    path: "/biz/",
}];

impl OffsetSite {
    /// Returns `true` if `url` belongs to this site's paginated listings.
    #[must_use]
    pub fn matches(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|h| h.contains(self.host)) && url.path().contains(self.path)
    }
}

/// The ways a next page can be discovered, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPageStrategy {
    /// The configured next-page selector matched an element with an `href`.
    ExplicitSelector,
    /// A standard `rel="next"` anchor or link element.
    RelNext,
    /// An anchor whose text reads "Next", "Older" or "More".
    ///
    /// Best-effort: unrelated "More" links can mis-navigate.
    LinkText,
    /// The `start` offset of a known offset-paginated site, advanced by one
    /// page.
    OffsetSynthesis,
}

impl NextPageStrategy {
    /// All strategies in the order they are tried.
    pub const ALL: &[Self] = &[
        Self::ExplicitSelector,
        Self::RelNext,
        Self::LinkText,
        Self::OffsetSynthesis,
    ];

    fn resolve(self, document: &Html, page_url: &Url, next_selector: Option<&Selector>) -> Option<Url> {
        match self {
            Self::ExplicitSelector => {
                let href = document.select(next_selector?).next()?.value().attr("href")?;
                page_url.join(href).ok()
            }
            Self::RelNext => {
                let href = document.select(&REL_NEXT_SELECTOR).next()?.value().attr("href")?;
                page_url.join(href).ok()
            }
            Self::LinkText => document
                .select(&ANCHOR_SELECTOR)
                .filter(|a| NEXT_TEXT_RE.is_match(&a.text().collect::<String>()))
                .find_map(|a| a.value().attr("href"))
                .and_then(|href| page_url.join(href).ok()),
            Self::OffsetSynthesis => {
                OFFSET_SITES.iter().find(|site| site.matches(page_url))?;
                let current = query_offset(page_url).unwrap_or(0);
                Some(with_query_param(
                    page_url,
                    OFFSET_PARAM,
                    &next_offset(current).to_string(),
                ))
            }
        }
    }
}

/// A resolved next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPage {
    /// Absolute URL of the next page.
    pub url: Url,
    /// Which strategy produced it.
    pub strategy: NextPageStrategy,
}

/// Resolves the page that follows `page_url`.
///
/// Returns `None` when no strategy applies (pagination ends) or when
/// `page_url` is not an absolute URL.
#[must_use]
pub fn next_page(html: &str, page_url: &str, next_selector: Option<&Selector>) -> Option<NextPage> {
    let document = Html::parse_document(html);
    next_page_from_document(&document, page_url, next_selector)
}

/// Same as [`next_page`] for an already-parsed document.
#[must_use]
pub fn next_page_from_document(
    document: &Html,
    page_url: &str,
    next_selector: Option<&Selector>,
) -> Option<NextPage> {
    let page_url = match Url::parse(page_url) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("cannot resolve next page of '{page_url}': {e}");
            return None;
        }
    };

    NextPageStrategy::ALL.iter().find_map(|&strategy| {
        let url = strategy.resolve(document, &page_url, next_selector)?;
        log::debug!("next page via {strategy:?}: {url}");
        Some(NextPage { url, strategy })
    })
}

/// Current value of the offset query parameter, if present and numeric.
fn query_offset(url: &Url) -> Option<i64> {
    url.query_pairs()
        .find(|(k, _)| k == OFFSET_PARAM)
        .and_then(|(_, v)| v.trim().parse().ok())
}

/// Offset of the page after one starting at `current`, never negative.
fn next_offset(current: i64) -> u64 {
    let next = current.saturating_add(i64::try_from(OFFSET_PAGE_SIZE).unwrap_or(i64::MAX));
    u64::try_from(next).unwrap_or(0)
}

/// Returns `url` with query parameter `key` set to `value`.
///
/// The first occurrence of `key` is replaced in place (later duplicates are
/// dropped); if absent it is appended. Other parameters keep their order.
#[must_use]
pub fn with_query_param(url: &Url, key: &str, value: &str) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (k, v) in url.query_pairs() {
        if k == key {
            if !replaced {
                pairs.push((k.into_owned(), value.to_owned()));
                replaced = true;
            }
        } else {
            pairs.push((k.into_owned(), v.into_owned()));
        }
    }
    if !replaced {
        pairs.push((key.to_owned(), value.to_owned()));
    }

    let mut url = url.clone();
    url.query_pairs_mut().clear().extend_pairs(&pairs);
    url
}

/// Offset for page `page_number` (1-based) of an offset-paginated listing.
///
/// Saturates at `u64::MAX` for absurdly large page numbers.
#[must_use]
pub const fn page_offset(page_number: u64) -> u64 {
    page_number.saturating_sub(1).saturating_mul(OFFSET_PAGE_SIZE)
}
