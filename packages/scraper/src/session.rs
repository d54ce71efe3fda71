//! HTTP session setup from header and cookie files.
//!
//! Both files are optional conveniences for getting past bot walls: a
//! missing or unreadable file is logged and replaced by defaults rather than
//! failing the run.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::ScrapeError;

/// Desktop browser user agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Browser-like request headers used when no header file is available.
#[must_use]
pub fn default_headers() -> BTreeMap<String, String> {
    [
        ("User-Agent", DEFAULT_USER_AGENT),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Connection", "keep-alive"),
        ("Referer", "https://www.yelp.com/"),
        ("Upgrade-Insecure-Requests", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect()
}

/// Parses `Key: Value` lines. Lines without a colon are ignored and a
/// `User-Agent` is added if the file does not set one.
#[must_use]
pub fn parse_headers(contents: &str) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = contents
        .lines()
        .filter_map(|line| line.trim().split_once(':'))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .filter(|(k, _)| !k.is_empty())
        .collect();

    if !headers.keys().any(|k| k.eq_ignore_ascii_case("user-agent")) {
        headers.insert("User-Agent".to_owned(), DEFAULT_USER_AGENT.to_owned());
    }
    headers
}

/// Loads request headers from `path`, falling back to [`default_headers`]
/// when no path is given or the file cannot be read.
#[must_use]
pub fn load_headers(path: Option<&Path>) -> BTreeMap<String, String> {
    let Some(path) = path else {
        return default_headers();
    };

    match std::fs::read_to_string(path) {
        Ok(contents) => parse_headers(&contents),
        Err(e) => {
            log::warn!(
                "failed to load headers from {}: {e}; using defaults",
                path.display()
            );
            default_headers()
        }
    }
}

/// Parses a cookie file.
///
/// Accepts Netscape cookie-jar lines (tab separated, at least seven fields,
/// name and value in the last two) and plain `name=value` lines. Blank lines
/// and `#` comments are skipped.
#[must_use]
pub fn parse_cookies(contents: &str) -> BTreeMap<String, String> {
    let mut jar = BTreeMap::new();

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.contains('\t') {
            let fields: Vec<&str> = line.split('\t').collect();
            if let [.., name, value] = fields.as_slice()
                && fields.len() >= 7
            {
                jar.insert(name.trim().to_owned(), value.trim().to_owned());
            }
        } else if let Some((name, value)) = line.split_once('=') {
            jar.insert(name.trim().to_owned(), value.trim().to_owned());
        }
    }

    jar
}

/// Loads cookies from `path`. A missing path means no cookies; an
/// unreadable file is logged and treated the same way.
#[must_use]
pub fn load_cookies(path: Option<&Path>) -> BTreeMap<String, String> {
    let Some(path) = path else {
        return BTreeMap::new();
    };

    match std::fs::read_to_string(path) {
        Ok(contents) => parse_cookies(&contents),
        Err(e) => {
            log::warn!("failed to load cookies from {}: {e}", path.display());
            BTreeMap::new()
        }
    }
}

/// Builds the `Cookie` header value (`a=1; b=2`).
#[must_use]
pub fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builds a [`reqwest::Client`] sending `headers` and `cookies` on every
/// request.
///
/// # Errors
///
/// * [`ScrapeError::Header`] if a header name or value is not valid HTTP
/// * [`ScrapeError::Http`] if the client cannot be constructed
pub fn build_client(
    headers: &BTreeMap<String, String>,
    cookies: &BTreeMap<String, String>,
    timeout: Duration,
) -> Result<reqwest::Client, ScrapeError> {
    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| ScrapeError::Header {
            name: key.clone(),
            message: e.to_string(),
        })?;
        let val = HeaderValue::from_str(value).map_err(|e| ScrapeError::Header {
            name: key.clone(),
            message: e.to_string(),
        })?;
        header_map.insert(name, val);
    }

    if !cookies.is_empty() {
        let val = HeaderValue::from_str(&cookie_header(cookies)).map_err(|e| ScrapeError::Header {
            name: COOKIE.to_string(),
            message: e.to_string(),
        })?;
        header_map.insert(COOKIE, val);
    }

    if !header_map.contains_key(USER_AGENT) {
        header_map.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    }

    reqwest::Client::builder()
        .default_headers(header_map)
        .timeout(timeout)
        .build()
        .map_err(ScrapeError::Http)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_lines() {
        let headers = parse_headers(
            "Accept-Language: de-DE\n\nnot a header\nReferer: https://example.com/a:b\n",
        );
        assert_eq!(headers.get("Accept-Language").map(String::as_str), Some("de-DE"));
        assert_eq!(
            headers.get("Referer").map(String::as_str),
            Some("https://example.com/a:b")
        );
        assert_eq!(
            headers.get("User-Agent").map(String::as_str),
            Some(DEFAULT_USER_AGENT)
        );
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn keeps_configured_user_agent() {
        let headers = parse_headers("user-agent: curl/8.0\n");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("user-agent").map(String::as_str), Some("curl/8.0"));
    }

    #[test]
    fn missing_header_file_uses_defaults() {
        let headers = load_headers(Some(Path::new("/nonexistent/headers_ua.txt")));
        assert_eq!(headers, default_headers());
        assert_eq!(load_headers(None), default_headers());
    }

    #[test]
    fn parses_netscape_and_plain_cookies() {
        let jar = parse_cookies(
            "# Netscape HTTP Cookie File\n\
             .yelp.com\tTRUE\t/\tFALSE\t0\tbse\tabc123\n\
             .yelp.com\tTRUE\t/\tshort\n\
             hl = en_US\n\
             \n",
        );
        assert_eq!(jar.get("bse").map(String::as_str), Some("abc123"));
        assert_eq!(jar.get("hl").map(String::as_str), Some("en_US"));
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn missing_cookie_file_yields_empty_jar() {
        assert!(load_cookies(Some(Path::new("/nonexistent/cookies.txt"))).is_empty());
        assert!(load_cookies(None).is_empty());
    }

    #[test]
    fn joins_cookie_header() {
        let jar = parse_cookies("a=1\nb=2\n");
        assert_eq!(cookie_header(&jar), "a=1; b=2");
    }

    #[test]
    fn rejects_invalid_header_name() {
        let mut headers = default_headers();
        headers.insert("Bad Header".to_owned(), "x".to_owned());
        let result = build_client(&headers, &BTreeMap::new(), Duration::from_secs(1));
        assert!(matches!(result, Err(ScrapeError::Header { .. })));
    }

    #[test]
    fn builds_client_with_cookies() {
        let jar = parse_cookies("a=1\n");
        assert!(build_client(&default_headers(), &jar, Duration::from_secs(1)).is_ok());
    }
}
