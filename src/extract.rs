//! Listing and Detail Extraction Module
//!
//! Heuristic extraction over an already-rendered page source:
//! - Locate listing entries from the Devpost heading marker
//! - Walk bounded ancestor chains for anchors and submission-period blocks
//! - Pull title/date overrides from a detail page
//! - Optional selector-configured mode for arbitrary listing layouts
//!
//! Every structural miss yields an empty or absent value, never an error; a
//! malformed card must not abort the batch.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::normalize::{normalize_date, resolve_url, slug_from_url};
use crate::status::derive_status;
use crate::types::HackathonRecord;

/// Structural marker for entry headings on the Devpost listing page.
pub const LISTING_HEADING_SELECTOR: &str = "h3[data-v-64e017b4]";

/// How many ancestor levels to search for an anchor near a heading.
const ANCHOR_SEARCH_DEPTH: usize = 4;

/// How many ancestor levels to search for a submission-period block.
const PERIOD_SEARCH_DEPTH: usize = 6;

/// One candidate entry extracted from the listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub title: String,
    pub url: String,
    pub submission_period: Option<String>,
    pub begins_iso: Option<String>,
    pub ends_iso: Option<String>,
}

/// Submission-period data extracted from a table-style card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPeriod {
    pub submission_period: Option<String>,
    pub begins_iso: Option<String>,
    pub ends_iso: Option<String>,
}

/// Title/date overrides extracted from an entry's detail page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailOverrides {
    pub title: Option<String>,
    pub begins_iso: Option<String>,
    pub ends_iso: Option<String>,
}

/// Walk up from `start` through at most `max_depth` ancestor elements and
/// return the first one matching `predicate`. Absence is not an error.
pub fn find_ancestor_matching<'a, F>(
    start: ElementRef<'a>,
    max_depth: usize,
    predicate: F,
) -> Option<ElementRef<'a>>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    let mut current = *start;
    for _ in 0..max_depth {
        let parent = current.parent()?;
        if let Some(element) = ElementRef::wrap(parent) {
            if predicate(element) {
                return Some(element);
            }
        }
        current = parent;
    }
    None
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn attr_value(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Extract candidate entries from the listing page source.
///
/// Headings with no resolvable anchor are skipped entirely; URLs are resolved
/// against `page_url` and deduplicated within the pass. A page with zero
/// matching headings yields an empty list, since the layout may have changed.
pub fn extract_listing_entries(html: &str, page_url: &str) -> Vec<ListingEntry> {
    let mut entries = Vec::new();

    let document = Html::parse_document(html);
    let (Ok(heading_sel), Ok(anchor_sel), Ok(href_sel), Ok(period_sel), Ok(date_sel)) = (
        Selector::parse(LISTING_HEADING_SELECTOR),
        Selector::parse("a"),
        Selector::parse("a[href]"),
        Selector::parse("div.submission-period"),
        Selector::parse("[data-iso-date]"),
    ) else {
        return entries;
    };

    let mut seen = HashSet::new();
    for heading in document.select(&heading_sel) {
        let title = trimmed_text(heading);

        // Anchor resolution: child anchor first, then bounded ancestor walk,
        // then any href-bearing anchor in the heading's own subtree.
        let mut href = match heading.select(&anchor_sel).next() {
            Some(anchor) => attr_value(anchor, "href"),
            None => find_ancestor_matching(heading, ANCHOR_SEARCH_DEPTH, |ancestor| {
                ancestor.select(&anchor_sel).next().is_some()
            })
            .and_then(|ancestor| ancestor.select(&anchor_sel).next())
            .and_then(|anchor| attr_value(anchor, "href")),
        };
        if href.is_none() {
            href = heading
                .select(&href_sel)
                .next()
                .and_then(|anchor| attr_value(anchor, "href"));
        }

        // A heading without a link carries no actionable record
        let Some(href) = href else {
            continue;
        };

        let url = resolve_url(page_url, &href);
        if url.is_empty() || !seen.insert(url.clone()) {
            continue;
        }

        let mut submission_period = None;
        let mut begins_iso = None;
        let mut ends_iso = None;
        let period_block = find_ancestor_matching(heading, PERIOD_SEARCH_DEPTH, |ancestor| {
            ancestor.select(&period_sel).next().is_some()
        })
        .and_then(|ancestor| ancestor.select(&period_sel).next());
        if let Some(block) = period_block {
            let text = trimmed_text(block);
            if !text.is_empty() {
                submission_period = Some(text);
            }
            let mut dates = block.select(&date_sel);
            begins_iso = dates.next().and_then(|el| attr_value(el, "data-iso-date"));
            ends_iso = dates.next().and_then(|el| attr_value(el, "data-iso-date"));
        }

        entries.push(ListingEntry {
            title,
            url,
            submission_period,
            begins_iso,
            ends_iso,
        });
    }

    entries
}

/// Extract submission-period info from a table-style card element.
///
/// Strategy A reads `td[data-iso-date]` cells directly; strategy B falls back
/// to a "Submissions" label row. Neither matching yields all-absent fields.
pub fn extract_submission_period(card: ElementRef<'_>) -> SubmissionPeriod {
    let (Ok(dated_cell_sel), Ok(cell_sel)) =
        (Selector::parse("td[data-iso-date]"), Selector::parse("td"))
    else {
        return SubmissionPeriod::default();
    };

    // Strategy A: explicit date-bearing cells
    let dated_cells: Vec<ElementRef<'_>> = card.select(&dated_cell_sel).collect();
    if !dated_cells.is_empty() {
        let begins_iso = attr_value(dated_cells[0], "data-iso-date");
        let ends_iso = dated_cells
            .get(1)
            .and_then(|cell| attr_value(*cell, "data-iso-date"));
        let texts: Vec<String> = dated_cells
            .iter()
            .map(|cell| trimmed_text(*cell))
            .filter(|text| !text.is_empty())
            .collect();
        let submission_period = if texts.is_empty() {
            None
        } else {
            Some(texts.join(" — "))
        };
        return SubmissionPeriod {
            submission_period,
            begins_iso,
            ends_iso,
        };
    }

    // Strategy B: "Submissions" label row with date cells alongside
    let cells: Vec<ElementRef<'_>> = card.select(&cell_sel).take(3).collect();
    if cells.len() >= 3 && trimmed_text(cells[0]).to_lowercase().contains("submissions") {
        let begins_iso = attr_value(cells[1], "data-iso-date");
        let ends_iso = attr_value(cells[2], "data-iso-date");
        let mut submission_period = trimmed_text(cells[1]);
        let end_text = trimmed_text(cells[2]);
        if !end_text.is_empty() {
            submission_period.push_str(" — ");
            submission_period.push_str(&end_text);
        }
        return SubmissionPeriod {
            submission_period: Some(submission_period).filter(|text| !text.is_empty()),
            begins_iso,
            ends_iso,
        };
    }

    SubmissionPeriod::default()
}

/// Extract title/date overrides from a detail page source.
pub fn extract_detail_overrides(html: &str) -> DetailOverrides {
    let document = Html::parse_document(html);
    let (Ok(h1_sel), Ok(dated_cell_sel)) =
        (Selector::parse("h1"), Selector::parse("td[data-iso-date]"))
    else {
        return DetailOverrides::default();
    };

    let title = document
        .select(&h1_sel)
        .next()
        .map(trimmed_text)
        .filter(|text| !text.is_empty());

    let mut dates = document.select(&dated_cell_sel);
    let begins_iso = dates.next().and_then(|el| attr_value(el, "data-iso-date"));
    let ends_iso = dates.next().and_then(|el| attr_value(el, "data-iso-date"));

    DetailOverrides {
        title,
        begins_iso,
        ends_iso,
    }
}

/// CSS selectors for the configurable extraction mode.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub list_selector: String,
    pub name_selector: String,
    pub start_selector: Option<String>,
    pub end_selector: Option<String>,
    pub tag_selector: Option<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            list_selector: "article, .hackathon-tile, li.hackathon".to_string(),
            name_selector: "h1, h2, h3".to_string(),
            start_selector: None,
            end_selector: None,
            tag_selector: None,
        }
    }
}

fn select_first_text(item: ElementRef<'_>, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    item.select(&parsed)
        .map(trimmed_text)
        .find(|text| !text.is_empty())
}

/// Selector-configured extraction for the single-URL path.
///
/// Separate strategy from the listing heuristics: the caller names the item
/// container and field selectors, and each matching item becomes a full
/// `HackathonRecord`. Items with no extractable name are skipped.
pub fn extract_with_selectors(
    html: &str,
    page_url: &str,
    config: &SelectorConfig,
    test_hack: bool,
) -> Vec<HackathonRecord> {
    let mut records = Vec::new();

    let document = Html::parse_document(html);
    let Ok(list_sel) = Selector::parse(&config.list_selector) else {
        eprintln!("Warning: invalid list selector: {}", config.list_selector);
        return records;
    };
    let Ok(href_sel) = Selector::parse("a[href]") else {
        return records;
    };

    let mut seen = HashSet::new();
    for item in document.select(&list_sel) {
        let Some(name) = select_first_text(item, &config.name_selector) else {
            continue;
        };

        let url = item
            .select(&href_sel)
            .next()
            .and_then(|anchor| attr_value(anchor, "href"))
            .map(|href| resolve_url(page_url, &href));

        let id = match &url {
            Some(url) => slug_from_url(url),
            None => name.clone(),
        };
        if id.is_empty() || !seen.insert(id.clone()) {
            continue;
        }

        let start_date = config
            .start_selector
            .as_deref()
            .and_then(|sel| select_first_text(item, sel))
            .map(|text| normalize_date(&text))
            .unwrap_or_default();
        let end_date = config
            .end_selector
            .as_deref()
            .and_then(|sel| select_first_text(item, sel))
            .map(|text| normalize_date(&text))
            .unwrap_or_default();

        let tags = config.tag_selector.as_deref().and_then(|sel| {
            let parsed = Selector::parse(sel).ok()?;
            let found: Vec<String> = item
                .select(&parsed)
                .map(trimmed_text)
                .filter(|text| !text.is_empty())
                .collect();
            if found.is_empty() {
                None
            } else {
                Some(found)
            }
        });

        let status = derive_status(
            Some(start_date.as_str()).filter(|s| !s.is_empty()),
            Some(end_date.as_str()).filter(|s| !s.is_empty()),
        );

        records.push(HackathonRecord {
            id,
            name,
            start_date,
            end_date,
            status,
            test_hack,
            tags,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://devpost.com/hackathons";

    fn first_card(html: &Html, selector: &str) -> bool {
        Selector::parse(selector)
            .map(|sel| html.select(&sel).next().is_some())
            .unwrap_or(false)
    }

    #[test]
    fn test_no_headings_yields_empty_list() {
        let html = "<html><body><h2>Other page</h2></body></html>";
        assert!(extract_listing_entries(html, PAGE_URL).is_empty());
    }

    #[test]
    fn test_anchor_inside_heading() {
        let html = r#"
            <div class="card">
              <h3 data-v-64e017b4><a href="https://ai-jam.devpost.com/">AI Jam</a></h3>
            </div>"#;
        let entries = extract_listing_entries(html, PAGE_URL);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "AI Jam");
        assert_eq!(entries[0].url, "https://ai-jam.devpost.com/");
    }

    #[test]
    fn test_anchor_found_on_ancestor() {
        // Anchor is a sibling elsewhere in the card, not inside the heading
        let html = r#"
            <div class="card">
              <a href="/hackathons/web-week">Visit</a>
              <div><h3 data-v-64e017b4>Web Week</h3></div>
            </div>"#;
        let entries = extract_listing_entries(html, PAGE_URL);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://devpost.com/hackathons/web-week");
    }

    #[test]
    fn test_heading_wrapped_in_anchor_resolves_via_outer_card() {
        // The tile itself is the link; the match is the card containing it
        let html = r#"
            <div class="tile">
              <a href="/hackathons/web-week">
                <div><h3 data-v-64e017b4>Web Week</h3></div>
              </a>
            </div>"#;
        let entries = extract_listing_entries(html, PAGE_URL);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://devpost.com/hackathons/web-week");
    }

    #[test]
    fn test_heading_without_anchor_is_skipped() {
        let html = r#"
            <div><div><div><div><div><div>
              <h3 data-v-64e017b4>Orphan Heading</h3>
            </div></div></div></div></div></div>"#;
        assert!(extract_listing_entries(html, PAGE_URL).is_empty());
    }

    #[test]
    fn test_duplicate_urls_deduplicated() {
        // Same entry rendered twice, once relative and once absolute
        let html = r#"
            <h3 data-v-64e017b4><a href="/hackathons/ai-jam">AI Jam</a></h3>
            <h3 data-v-64e017b4><a href="https://devpost.com/hackathons/ai-jam">AI Jam</a></h3>"#;
        let entries = extract_listing_entries(html, PAGE_URL);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_protocol_relative_url_upgraded() {
        let html = r#"<h3 data-v-64e017b4><a href="//ai-jam.devpost.com/">AI Jam</a></h3>"#;
        let entries = extract_listing_entries(html, PAGE_URL);
        assert_eq!(entries[0].url, "https://ai-jam.devpost.com/");
    }

    #[test]
    fn test_submission_period_found_near_heading() {
        let html = r#"
            <div class="card">
              <div><h3 data-v-64e017b4><a href="/hackathons/ai-jam">AI Jam</a></h3></div>
              <div class="submission-period">
                <span data-iso-date="2030-01-01T00:00:00Z">Jan 01</span> -
                <span data-iso-date="2030-02-01T00:00:00Z">Feb 01</span>
              </div>
            </div>"#;
        let entries = extract_listing_entries(html, PAGE_URL);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].begins_iso.as_deref(),
            Some("2030-01-01T00:00:00Z")
        );
        assert_eq!(entries[0].ends_iso.as_deref(), Some("2030-02-01T00:00:00Z"));
        assert!(entries[0]
            .submission_period
            .as_deref()
            .unwrap()
            .contains("Jan 01"));
    }

    #[test]
    fn test_missing_submission_period_is_not_an_error() {
        let html = r#"<h3 data-v-64e017b4><a href="/hackathons/ai-jam">AI Jam</a></h3>"#;
        let entries = extract_listing_entries(html, PAGE_URL);
        assert_eq!(entries[0].submission_period, None);
        assert_eq!(entries[0].begins_iso, None);
        assert_eq!(entries[0].ends_iso, None);
    }

    #[test]
    fn test_find_ancestor_matching_respects_depth_bound() {
        let html = Html::parse_fragment(
            r#"<div id="far"><div><div><div><span id="leaf">x</span></div></div></div></div>"#,
        );
        assert!(first_card(&html, "#leaf"));
        let leaf_sel = Selector::parse("#leaf").unwrap();
        let leaf = html.select(&leaf_sel).next().unwrap();
        let is_far = |el: ElementRef<'_>| el.value().id() == Some("far");

        assert!(find_ancestor_matching(leaf, 2, is_far).is_none());
        assert!(find_ancestor_matching(leaf, 4, is_far).is_some());
    }

    #[test]
    fn test_submission_period_strategy_a() {
        let html = Html::parse_fragment(
            r#"<table><tr>
                <td data-iso-date="2030-01-01T00:00:00Z">Jan 01, 2030</td>
                <td data-iso-date="2030-02-01T00:00:00Z">Feb 01, 2030</td>
            </tr></table>"#,
        );
        let card = html.root_element();
        let period = extract_submission_period(card);
        assert_eq!(period.begins_iso.as_deref(), Some("2030-01-01T00:00:00Z"));
        assert_eq!(period.ends_iso.as_deref(), Some("2030-02-01T00:00:00Z"));
        assert_eq!(
            period.submission_period.as_deref(),
            Some("Jan 01, 2030 — Feb 01, 2030")
        );
    }

    #[test]
    fn test_submission_period_strategy_b() {
        let html = Html::parse_fragment(
            r#"<table><tr>
                <td>Submissions</td>
                <td data-iso-date="2030-01-01T00:00:00Z">Jan 01, 2030</td>
                <td data-iso-date="2030-02-01T00:00:00Z">Feb 01, 2030</td>
            </tr></table>"#,
        );
        // Strategy A matches the dated cells here, so point strategy B at a
        // row without data-iso-date attributes on its own
        let plain = Html::parse_fragment(
            r#"<table><tr>
                <td>Submissions</td>
                <td>Jan 01, 2030</td>
                <td>Feb 01, 2030</td>
            </tr></table>"#,
        );
        let period = extract_submission_period(plain.root_element());
        assert_eq!(period.begins_iso, None);
        assert_eq!(period.ends_iso, None);
        assert_eq!(
            period.submission_period.as_deref(),
            Some("Jan 01, 2030 — Feb 01, 2030")
        );

        let dated = extract_submission_period(html.root_element());
        assert_eq!(dated.begins_iso.as_deref(), Some("2030-01-01T00:00:00Z"));
    }

    #[test]
    fn test_submission_period_nothing_found() {
        let html = Html::parse_fragment("<div><p>no table here</p></div>");
        assert_eq!(
            extract_submission_period(html.root_element()),
            SubmissionPeriod::default()
        );
    }

    #[test]
    fn test_detail_overrides_title_and_dates() {
        let html = r#"
            <h1>  Canonical Title  </h1>
            <table><tr>
              <td data-iso-date="2030-01-05T00:00:00Z">Jan 05</td>
              <td data-iso-date="2030-02-05T00:00:00Z">Feb 05</td>
            </tr></table>"#;
        let overrides = extract_detail_overrides(html);
        assert_eq!(overrides.title.as_deref(), Some("Canonical Title"));
        assert_eq!(
            overrides.begins_iso.as_deref(),
            Some("2030-01-05T00:00:00Z")
        );
        assert_eq!(overrides.ends_iso.as_deref(), Some("2030-02-05T00:00:00Z"));
    }

    #[test]
    fn test_detail_overrides_empty_h1_ignored() {
        let overrides = extract_detail_overrides("<h1>   </h1><p>body</p>");
        assert_eq!(overrides, DetailOverrides::default());
    }

    #[test]
    fn test_extract_with_selectors_basic() {
        let html = r#"
            <article>
              <h2>AI Jam</h2>
              <a href="/hackathons/ai-jam">details</a>
              <span class="start">2030-01-01</span>
              <span class="end">2030-02-01</span>
              <span class="tag">ai</span>
              <span class="tag">ml</span>
            </article>
            <article><p>no name here</p></article>"#;
        let config = SelectorConfig {
            list_selector: "article".to_string(),
            name_selector: "h2".to_string(),
            start_selector: Some(".start".to_string()),
            end_selector: Some(".end".to_string()),
            tag_selector: Some(".tag".to_string()),
        };
        let records = extract_with_selectors(html, PAGE_URL, &config, true);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "ai-jam");
        assert_eq!(record.name, "AI Jam");
        assert_eq!(record.start_date, "2030-01-01T00:00:00");
        assert_eq!(record.end_date, "2030-02-01T00:00:00");
        assert!(record.test_hack);
        assert_eq!(
            record.tags.as_deref(),
            Some(["ai".to_string(), "ml".to_string()].as_slice())
        );
    }

    #[test]
    fn test_extract_with_selectors_name_fallback_id() {
        let html = "<article><h2>No Link Hack</h2></article>";
        let config = SelectorConfig {
            list_selector: "article".to_string(),
            name_selector: "h2".to_string(),
            ..SelectorConfig::default()
        };
        let records = extract_with_selectors(html, PAGE_URL, &config, false);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "No Link Hack");
        assert_eq!(records[0].start_date, "");
    }
}
