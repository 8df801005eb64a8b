use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::extract::fields;
use crate::extract::model::ExtractedContent;
use crate::extract::registry::SiteExtractor;

static TITLE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["h1.entry-title", "h1.title", "h1"]
        .iter()
        .map(|s| Selector::parse(s).expect("static 123telugu title selector"))
        .collect()
});

// The site prints its own rating line: "123telugu.com Rating : 3.25/5".
static SITE_RATING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)123telugu(?:\.com)?\s+rating\s*[:\-]?\s*(\d(?:\.\d{1,2})?)\s*/\s*5")
        .expect("static 123telugu rating pattern")
});

pub struct Telugu123Extractor;

impl Telugu123Extractor {
    fn title(document: &Html) -> String {
        for selector in TITLE_SELECTORS.iter() {
            if let Some(element) = document.select(selector).next() {
                let text: String = element.text().collect();
                if !text.trim().is_empty() {
                    return fields::clean_title(&text);
                }
            }
        }
        String::new()
    }

    /// The site's own rating line is authoritative; the generic scan only
    /// runs when it is absent.
    fn rating(document: &Html) -> Option<(f32, f32)> {
        let text: String = document.root_element().text().collect();
        if let Some(captures) = SITE_RATING_LINE.captures(&text) {
            let rating: f32 = captures.get(1)?.as_str().parse().ok()?;
            return Some((rating, 5.0));
        }
        fields::extract_rating(document)
    }
}

impl SiteExtractor for Telugu123Extractor {
    fn name(&self) -> &'static str {
        "123telugu"
    }

    fn matches(&self, domain: &str) -> bool {
        domain.contains("123telugu.com")
    }

    fn extract(&self, document: &Html, url: &Url) -> ExtractedContent {
        let mut content = ExtractedContent::new(url.clone(), "123telugu");

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
