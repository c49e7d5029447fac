//! Date and URL Normalization Module
//!
//! Provides best-effort normalizers shared by both scrape paths:
//! - Parse human-entered dates into ISO-8601 timestamps
//! - Derive a slug identifier from a URL path
//! - Resolve relative/protocol-relative hrefs against a page URL
//!
//! URL handling is done by hand (no URL parsing crate); these are heuristic
//! normalizers, never authoritative.

use chrono::{NaiveDate, NaiveTime};

/// Date formats tried in order by `normalize_date`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y"];

/// Try to parse `text` against the known date formats, rendering the first
/// hit as an ISO-8601 timestamp at midnight. On total failure the trimmed
/// input is returned unchanged; this function never errors.
pub fn normalize_date(text: &str) -> String {
    let trimmed = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_time(NaiveTime::MIN)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string();
        }
    }
    trimmed.to_string()
}

/// Derive a slug identifier from the last path segment of `url`.
///
/// A URL with no path (or only "/") falls back to the host with dots
/// replaced by dashes, so the result is still usable as a document key.
pub fn slug_from_url(url: &str) -> String {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let path = path.split(['?', '#']).next().unwrap_or("");
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return host.split(['?', '#']).next().unwrap_or(host).replace('.', "-");
    }
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Resolve `href` against the page URL `base`.
///
/// Protocol-relative URLs are upgraded to https; absolute URLs pass through;
/// root-relative paths join the origin; other relative paths join the base
/// URL's directory.
pub fn resolve_url(base: &str, href: &str) -> String {
    let href = href.trim();
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    let Some(scheme_end) = base.find("://") else {
        return href.to_string();
    };
    let after_scheme = &base[scheme_end + 3..];
    let origin_end = after_scheme
        .find('/')
        .map(|idx| scheme_end + 3 + idx)
        .unwrap_or(base.len());

    if href.starts_with('/') {
        return format!("{}{}", &base[..origin_end], href);
    }

    // Relative path: join against the directory of the base URL's path
    let base_no_query = base.split(['?', '#']).next().unwrap_or(base);
    let dir_end = match base_no_query.rfind('/') {
        Some(idx) if idx >= origin_end => idx,
        _ => origin_end,
    };
    format!(
        "{}/{}",
        base_no_query[..dir_end].trim_end_matches('/'),
        href
    )
}
