use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::extract::fields;
use crate::extract::model::ExtractedContent;
use crate::extract::registry::SiteExtractor;

static TITLE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["h1.post-title", "h1.entry-title", "h1"]
        .iter()
        .map(|s| Selector::parse(s).expect("static greatandhra title selector"))
        .collect()
});

// Review headlines are prefixed on this site: "Movie Review: Devara".
static REVIEW_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(movie\s+review|review)\s*[:\-]\s*").expect("static prefix pattern")
});

static RATING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rating\s*[:\-]?\s*(\d(?:\.\d{1,2})?)\s*/\s*(\d{1,2})")
        .expect("static rating-line pattern")
});

pub struct GreatAndhraExtractor;

impl GreatAndhraExtractor {
    fn title(document: &Html) -> String {
        for selector in TITLE_SELECTORS.iter() {
            if let Some(element) = document.select(selector).next() {
                let text: String = element.text().collect();
                if !text.trim().is_empty() {
                    let stripped = REVIEW_PREFIX.replace(text.trim(), "");
                    return fields::clean_title(&stripped);
                }
            }
        }
        String::new()
    }

    /// Rating appears as a labelled "Rating: x/5" line; structured data is
    /// checked first in case the site theme carries it.
    fn rating(document: &Html) -> Option<(f32, f32)> {
        if let Some(found) = fields::extract_rating(document) {
            return Some(found);
        }
        let text: String = document.root_element().text().collect();
        let captures = RATING_LINE.captures(&text)?;
        let rating: f32 = captures.get(1)?.as_str().parse().ok()?;
        let scale: f32 = captures.get(2)?.as_str().parse().ok()?;
        (rating <= scale).then_some((rating, scale))
    }
}

impl SiteExtractor for GreatAndhraExtractor {
    fn name(&self) -> &'static str {
        "greatandhra"
    }

    fn matches(&self, domain: &str) -> bool {
        domain.contains("greatandhra.com")
    }

    fn extract(&self, document: &Html, url: &Url) -> ExtractedContent {
        let mut content = ExtractedContent::new(url.clone(), "GreatAndhra");

        content.title = Self::title(document);

        if let Some((rating, scale)) = Self::rating(document) {
            content.rating = rating;
            content.rating_scale = scale;
        }

        let mut crew = fields::labelled_fields(document);
        content.cast = crew.remove("cast");
        content.director = crew.remove("director");
        content.genre = crew.remove("genre");
        content.runtime = crew.remove("runtime");
        content.release_date = crew.remove("release_date");
        content.production_crew = crew;

        content.poster_image = fields::poster_image(document, url);
        content.trailer_url = fields::trailer_url(document, url);
        content.sections = fields::segment_sections(document);

        content
    }
}
