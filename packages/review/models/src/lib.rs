#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data types for the review scraper.
//!
//! [`Review`] is the single record type every extraction path produces.
//! [`SelectorConfig`] holds the raw CSS selector strings a run is configured
//! with, before they are compiled and validated by the scraper crate.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A single review extracted from a listing page.
///
/// Every content field is optional because third-party markup drifts; only
/// the page the record came from is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Display name of the reviewer.
    pub reviewer: Option<String>,
    /// Numeric rating parsed from the rating element (e.g. `4.5`).
    pub rating: Option<f64>,
    /// Review date exactly as rendered on the page.
    pub date: Option<String>,
    /// Review body text.
    pub text: Option<String>,
    /// URL of the page (or synthesized URL of the local file) the review was
    /// extracted from.
    pub source_url: String,
}

impl Review {
    /// Returns `true` if at least one content field was extracted.
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.reviewer.is_some() || self.rating.is_some() || self.date.is_some() || self.text.is_some()
    }
}

/// Raw CSS selector strings describing where review fields live on a page.
///
/// Field selectors are resolved relative to each container match. An empty
/// string is treated the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Selector matching each repeating review element.
    pub container: Option<String>,
    /// Selector for the reviewer name inside a container.
    pub reviewer: Option<String>,
    /// Selector for the rating element inside a container.
    pub rating: Option<String>,
    /// Selector for the review date inside a container.
    pub date: Option<String>,
    /// Selector for the review body inside a container.
    pub text: Option<String>,
    /// Page-level selector for the "next page" link.
    pub next: Option<String>,
}

impl SelectorConfig {
    /// Fills every unset (or empty) field from `fallback`.
    ///
    /// Fields already set on `self` win, so command-line selectors can be
    /// layered on top of a site profile.
    #[must_use]
    pub fn or(self, fallback: &Self) -> Self {
        fn pick(primary: Option<String>, fallback: Option<&String>) -> Option<String> {
            primary
                .filter(|s| !s.trim().is_empty())
                .or_else(|| fallback.filter(|s| !s.trim().is_empty()).cloned())
        }

        Self {
            container: pick(self.container, fallback.container.as_ref()),
            reviewer: pick(self.reviewer, fallback.reviewer.as_ref()),
            rating: pick(self.rating, fallback.rating.as_ref()),
            date: pick(self.date, fallback.date.as_ref()),
            text: pick(self.text, fallback.text.as_ref()),
            next: pick(self.next, fallback.next.as_ref()),
        }
    }
}

/// Serialization format for the collected reviews.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of review objects.
    #[default]
    Json,
    /// CSV with a fixed `reviewer,rating,date,text,source_url` header.
    Csv,
}
