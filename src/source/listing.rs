use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Sortable recency signal for a candidate item link. Items are totally
/// ordered by `sort_value` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankKey {
    /// Parsed timestamp as `YYYYMMDDHHMMSS`.
    Timestamp(u64),
    /// Largest numeric run embedded in the URL path.
    UrlId(u64),
    /// Document position where a site exposes no date or numeric signal;
    /// position 0 is assumed most recent.
    Position(u64),
}

impl RankKey {
    pub fn sort_value(&self) -> u64 {
        match *self {
            RankKey::Timestamp(v) | RankKey::UrlId(v) => v,
            RankKey::Position(i) => u64::MAX - i,
        }
    }
}

/// A candidate item discovered on a listing page. Ephemeral — lives only
/// within one pipeline run.
#[derive(Debug, Clone)]
pub struct DiscoveredItem {
    pub url: Url,
    pub rank_key: RankKey,
}

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static anchor selector"));

static TIME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time").expect("static time selector"));

static CONTAINER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, li, div").expect("static container selector"));

static MIDDLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/-](\d{5,})[/-]").expect("static middle-id pattern"));

static TRAILING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{5,})(?:\.[a-z]{2,5})?/?$").expect("static trailing-id pattern"));

static DATE_SEGMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(\d{4})/(\d{1,2})(?:/(\d{1,2}))?(?:/|$)").expect("static date-segment pattern")
});

/// Anchors resolving to assets, pagination, or taxonomy pages are never
/// content items.
static DENYLIST: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico", ".css", ".js", ".pdf", ".mp4",
    "/tag/", "/tags/", "/category/", "/categories/", "/page/", "/author/", "/wp-content/",
    "/wp-json/", "/feed", "/search", "/login", "/register", "/contact", "/about", "/privacy",
    "/terms", "?page=", "&page=", "javascript:", "mailto:",
];

/// Per-site listing rules for domains whose listing markup carries opaque
/// item ids and no usable date signal. Matched items keep document order.
static SITE_LISTING_RULES: &[(&str, &str)] = &[
    ("greatandhra.com", r#"a[href*="/reviews/"]"#),
    ("gulte.com", r#"a[href*="/moviereviews/"]"#),
];

/// Extract candidate item links from a fetched listing page and rank them
/// by recency, returning at most `limit` items.
///
/// Ranking prefers anchor/timestamp pairs, then numeric ids embedded in
/// URLs, then document order for registered non-standard sites. Zero
/// qualifying anchors yields an empty list — "no content available", not
/// an error.
pub fn discover_recent(html: &str, base_url: &Url, limit: usize) -> Vec<DiscoveredItem> {
    let document = Html::parse_document(html);

    let mut items = if let Some(selector) = site_rule_for(base_url) {
        discover_by_site_rule(&document, base_url, &selector)
    } else {
        Vec::new()
    };

    if items.is_empty() {
        items = discover_by_timestamps(&document, base_url);
    }

    if items.is_empty() {
        items = discover_by_url_ids(&document, base_url);
    }

    let mut items = dedupe_by_url(items);

    // Stable sort: first-seen wins on equal keys.
    items.sort_by(|a, b| b.rank_key.sort_value().cmp(&a.rank_key.sort_value()));
    items.truncate(limit);

    debug!(count = items.len(), base = %base_url, "discovered listing candidates");
    items
}

fn site_rule_for(base_url: &Url) -> Option<Selector> {
    let host = base_url.host_str()?;
    for (domain, selector) in SITE_LISTING_RULES {
        if host_matches(host, domain) {
            return Selector::parse(selector).ok();
        }
    }
    None
}

fn discover_by_site_rule(document: &Html, base_url: &Url, selector: &Selector) -> Vec<DiscoveredItem> {
    let mut items = Vec::new();
    for element in document.select(selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(url) = resolve_candidate(href, base_url) {
            items.push(DiscoveredItem {
                url,
                rank_key: RankKey::Position(items.len() as u64),
            });
        }
    }
    items
}

/// Scan for anchor+timestamp pairs: a `<time>` inside the anchor itself,
/// or an anchor and `<time>` under one block container.
fn discover_by_timestamps(document: &Html, base_url: &Url) -> Vec<DiscoveredItem> {
    let mut items = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(ts) = anchor.select(&TIME_SELECTOR).find_map(time_value)
            && let Some(url) = resolve_candidate(href, base_url)
        {
            items.push(DiscoveredItem {
                url,
                rank_key: RankKey::Timestamp(ts),
            });
        }
    }

    if !items.is_empty() {
        return items;
    }

    for container in document.select(&CONTAINER_SELECTOR) {
        let Some(ts) = container.select(&TIME_SELECTOR).find_map(time_value) else {
            continue;
        };
        let Some(href) = container
            .select(&ANCHOR_SELECTOR)
            .find_map(|a| a.value().attr("href"))
        else {
            continue;
        };
        if let Some(url) = resolve_candidate(href, base_url) {
            items.push(DiscoveredItem {
                url,
                rank_key: RankKey::Timestamp(ts),
            });
        }
    }

    items
}

/// Fallback when no timestamps are present: rank same-domain anchors by
/// the largest numeric run embedded in their URL.
fn discover_by_url_ids(document: &Html, base_url: &Url) -> Vec<DiscoveredItem> {
    let base_category = first_path_segment(base_url);
    let mut items = Vec::new();
    let mut in_category = 0usize;

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_candidate(href, base_url) else {
            continue;
        };
        let Some(id) = numeric_rank(&url) else {
            continue;
        };
        if let Some(category) = base_category
            && first_path_segment(&url) == Some(category)
        {
            in_category += 1;
        }
        items.push(DiscoveredItem {
            url,
            rank_key: RankKey::UrlId(id),
        });
    }

    // When the listing lives under a path category and some candidates
    // share it, off-category anchors are navigation noise.
    if let Some(category) = base_category
        && in_category > 0
    {
        items.retain(|item| first_path_segment(&item.url) == Some(category));
    }

    items
}

fn resolve_candidate(href: &str, base_url: &Url) -> Option<Url> {
    let url = base_url.join(href.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let base_host = base_url.host_str()?;
    let host = url.host_str()?;
    if !host_matches(host, base_host.trim_start_matches("www.")) {
        return None;
    }

    let check = url.as_str().to_lowercase();
    if DENYLIST.iter().any(|denied| check.contains(denied)) {
        return None;
    }

    // The listing page itself is not a candidate.
    if url.path() == base_url.path() {
        return None;
    }

    Some(url)
}

fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_start_matches("www.");
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn first_path_segment(url: &Url) -> Option<&str> {
    url.path_segments()?.find(|s| !s.is_empty())
}

fn time_value(element: scraper::ElementRef<'_>) -> Option<u64> {
    if let Some(datetime) = element.value().attr("datetime")
        && let Some(ts) = parse_rank_timestamp(datetime)
    {
        return Some(ts);
    }
    let text: String = element.text().collect();
    parse_rank_timestamp(text.trim())
}

/// Parse a datetime marker into a sortable `YYYYMMDDHHMMSS` integer.
fn parse_rank_timestamp(raw: &str) -> Option<u64> {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(compact(dt.naive_utc()));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(compact(dt));
        }
    }
    for format in ["%Y-%m-%d", "%B %d, %Y", "%d %B %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(compact);
        }
    }

    None
}

fn compact(dt: chrono::NaiveDateTime) -> u64 {
    use chrono::{Datelike, Timelike};
    dt.year() as u64 * 10_000_000_000
        + dt.month() as u64 * 100_000_000
        + dt.day() as u64 * 1_000_000
        + dt.hour() as u64 * 10_000
        + dt.minute() as u64 * 100
        + dt.second() as u64
}

/// Largest numeric run in the URL path, trying middle, trailing, and date
/// segment positions in that priority.
fn numeric_rank(url: &Url) -> Option<u64> {
    let path = url.path();

    if let Some(id) = largest_capture(&MIDDLE_ID, path) {
        return Some(id);
    }
    if let Some(id) = largest_capture(&TRAILING_ID, path) {
        return Some(id);
    }
    if let Some(captures) = DATE_SEGMENTS.captures(path) {
        let year: u64 = captures.get(1)?.as_str().parse().ok()?;
        let month: u64 = captures.get(2)?.as_str().parse().ok()?;
        let day: u64 = captures
            .get(3)
            .and_then(|d| d.as_str().parse().ok())
            .unwrap_or(1);
        return Some(year * 10_000 + month * 100 + day);
    }

    None
}

fn largest_capture(pattern: &Regex, path: &str) -> Option<u64> {
    pattern
        .captures_iter(path)
        .filter_map(|c| c.get(1)?.as_str().parse::<u64>().ok())
        .max()
}

fn dedupe_by_url(items: Vec<DiscoveredItem>) -> Vec<DiscoveredItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.url.as_str().to_string()))
        .collect()
}
