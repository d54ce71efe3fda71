//! Site profiles: named selector presets.
//!
//! Each `.toml` file in `packages/scraper/profiles/` is baked into the
//! binary at compile time via [`include_str!`]. Users can also point the CLI
//! at their own profile file with the same layout:
//!
//! ```toml
//! id = "my_site"
//! name = "My review site"
//!
//! [selectors]
//! container = "div.review"
//! reviewer = ".author"
//! ```

use std::path::Path;

use review_scrape_models::SelectorConfig;
use serde::Deserialize;

use crate::ScrapeError;

/// Profiles embedded at compile time.
const PROFILE_TOMLS: &[(&str, &str)] = &[
    ("yelp", include_str!("../profiles/yelp.toml")),
    ("schema_org", include_str!("../profiles/schema_org.toml")),
];

/// A named selector preset for a review site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteProfile {
    /// Identifier used on the command line (e.g. `"yelp"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Selectors this profile supplies.
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Parses a profile from TOML.
///
/// # Errors
///
/// Returns [`ScrapeError::Profile`] if the TOML is malformed.
pub fn parse_profile_toml(toml_str: &str) -> Result<SiteProfile, ScrapeError> {
    toml::from_str(toml_str).map_err(|e| ScrapeError::Profile(e.to_string()))
}

/// Returns every embedded profile.
///
/// # Panics
///
/// Panics if an embedded TOML profile is malformed (these ship with the
/// binary and are covered by tests).
#[must_use]
pub fn all_profiles() -> Vec<SiteProfile> {
    PROFILE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_profile_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up an embedded profile by id.
///
/// # Errors
///
/// Returns [`ScrapeError::Profile`] if no profile has that id.
pub fn find_profile(id: &str) -> Result<SiteProfile, ScrapeError> {
    all_profiles()
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| {
            let known: Vec<String> = all_profiles().into_iter().map(|p| p.id).collect();
            ScrapeError::Profile(format!(
                "unknown profile '{id}' (available: {})",
                known.join(", ")
            ))
        })
}

/// Loads a profile from a user-supplied TOML file.
///
/// # Errors
///
/// * [`ScrapeError::Io`] if the file cannot be read
/// * [`ScrapeError::Profile`] if it is not a valid profile
pub fn load_profile_file(path: &Path) -> Result<SiteProfile, ScrapeError> {
    let contents = std::fs::read_to_string(path)?;
    parse_profile_toml(&contents)
        .map_err(|e| ScrapeError::Profile(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::ReviewSelectors;

    #[test]
    fn loads_all_profiles() {
        assert_eq!(all_profiles().len(), PROFILE_TOMLS.len());
    }

    #[test]
    fn profile_ids_match_registry_names() {
        for ((name, _), profile) in PROFILE_TOMLS.iter().zip(all_profiles()) {
            assert_eq!(*name, profile.id);
        }
    }

    #[test]
    fn all_profile_selectors_compile() {
        for profile in &all_profiles() {
            assert!(
                ReviewSelectors::compile(&profile.selectors).is_ok(),
                "{}: selectors do not compile",
                profile.id
            );
        }
    }

    #[test]
    fn finds_profile_by_id() {
        let yelp = find_profile("yelp").unwrap();
        assert!(yelp.selectors.container.is_some());
        assert!(yelp.selectors.next.is_some());
    }

    #[test]
    fn unknown_profile_lists_available_ids() {
        let err = find_profile("tripadvisor").unwrap_err().to_string();
        assert!(err.contains("yelp"), "{err}");
    }

    #[test]
    fn parses_partial_profile() {
        let profile = parse_profile_toml(
            r#"
            id = "custom"
            name = "Custom"

            [selectors]
            container = "article"
            "#,
        )
        .unwrap();
        assert_eq!(profile.selectors.container.as_deref(), Some("article"));
        assert_eq!(profile.selectors.text, None);
    }

    #[test]
    fn rejects_malformed_profile() {
        assert!(matches!(
            parse_profile_toml("id = "),
            Err(ScrapeError::Profile(_))
        ));
    }

    #[test]
    fn extracts_schema_org_microdata() {
        let html = r#"
            <div itemscope itemtype="https://schema.org/Review">
              <span itemprop="author">Dana</span>
              <span itemprop="reviewRating">4 / 5</span>
              <meta itemprop="datePublished" content="2025-01-02">
              <p itemprop="reviewBody">Lovely.</p>
            </div>
        "#;
        let profile = find_profile("schema_org").unwrap();
        let selectors = ReviewSelectors::compile(&profile.selectors).unwrap();
        let reviews = crate::extract::extract_reviews(html, "https://x.com/r", &selectors);

        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].reviewer.as_deref(), Some("Dana"));
        assert_eq!(reviews[0].rating, Some(4.0));
        assert_eq!(reviews[0].date, None);
        assert_eq!(reviews[0].text.as_deref(), Some("Lovely."));
    }
}
