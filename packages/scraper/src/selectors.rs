//! Compiled selector set.
//!
//! [`SelectorConfig`] carries raw strings from the command line or a site
//! profile. [`ReviewSelectors::compile`] parses them once at startup so that
//! invalid CSS fails the run before any page is fetched.

use review_scrape_models::SelectorConfig;
use scraper::Selector;

use crate::ScrapeError;

/// Parsed CSS selectors used by the extractor and the pagination resolver.
#[derive(Debug, Clone)]
pub struct ReviewSelectors {
    /// Matches each repeating review element.
    pub container: Selector,
    /// Reviewer name, relative to a container.
    pub reviewer: Option<Selector>,
    /// Rating element, relative to a container.
    pub rating: Option<Selector>,
    /// Review date, relative to a container.
    pub date: Option<Selector>,
    /// Review body, relative to a container.
    pub text: Option<Selector>,
    /// Page-level "next page" link.
    pub next: Option<Selector>,
}

impl ReviewSelectors {
    /// Compiles a [`SelectorConfig`].
    ///
    /// Empty or whitespace-only field selectors are treated as unset.
    ///
    /// # Errors
    ///
    /// * [`ScrapeError::MissingSelector`] if no container selector is set
    /// * [`ScrapeError::Selector`] if any selector is not valid CSS
    pub fn compile(config: &SelectorConfig) -> Result<Self, ScrapeError> {
        let container = parse_optional("container", config.container.as_deref())?
            .ok_or(ScrapeError::MissingSelector("container"))?;

        Ok(Self {
            container,
            reviewer: parse_optional("reviewer", config.reviewer.as_deref())?,
            rating: parse_optional("rating", config.rating.as_deref())?,
            date: parse_optional("date", config.date.as_deref())?,
            text: parse_optional("text", config.text.as_deref())?,
            next: parse_optional("next", config.next.as_deref())?,
        })
    }
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
///
/// # Errors
///
/// Returns [`ScrapeError::Selector`] if `selector` is not valid CSS.
pub fn parse_selector(field: &'static str, selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        field,
        selector: selector.to_owned(),
        message: e.to_string(),
    })
}

fn parse_optional(
    field: &'static str,
    selector: Option<&str>,
) -> Result<Option<Selector>, ScrapeError> {
    match selector.map(str::trim) {
        Some(s) if !s.is_empty() => parse_selector(field, s).map(Some),
        _ => Ok(None),
    }
}
