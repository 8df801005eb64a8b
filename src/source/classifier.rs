use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::source::SourceReference;

/// How a reference URL should be treated. `Auto` defers to the heuristics
/// in [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    Listing,
    Direct,
    #[default]
    Auto,
}

/// Path fragments that mark a URL as an index of items rather than an item.
/// Matched case-insensitively against the URL path.
static LISTING_PATH_FRAGMENTS: &[&str] = &[
    "/reviews",
    "/movie-reviews",
    "/telugu-movie-reviews",
    "/category/",
    "/topic/",
    "/movie-news",
    "/latest",
    "/news",
];

static ARTICLE_SUFFIXES: &[&str] = &[".html", ".htm", ".php", ".asp", ".aspx"];

static DIGIT_RUN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\d{5,}").expect("static digit-run pattern"));

/// Decide whether a reference points at a listing page or a direct item.
///
/// Pure function of the URL string and a small keyword table; no network
/// I/O. An explicit `url_type` always wins. Heuristics fail toward
/// "direct" — mis-treating a listing as one article does less work than
/// mis-scraping a listing's boilerplate as content.
pub fn classify(reference: &SourceReference) -> bool {
    match reference.url_type {
        UrlType::Listing => return true,
        UrlType::Direct => return false,
        UrlType::Auto => {}
    }

    let Ok(url) = Url::parse(&reference.url) else {
        return false;
    };

    let path = url.path().to_lowercase();

    // A long numeric token in the path is an item identifier.
    if DIGIT_RUN.is_match(&path) {
        return false;
    }

    if LISTING_PATH_FRAGMENTS
        .iter()
        .any(|fragment| path.contains(fragment))
    {
        return true;
    }

    // Slug-shaped paths read as articles even without a numeric id.
    if ARTICLE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        return false;
    }

    // Site roots and shallow section paths enumerate items.
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() <= 1 {
        return true;
    }

    false
}
