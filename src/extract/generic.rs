use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::extract::fields;
use crate::extract::model::ExtractedContent;
use crate::extract::registry::SiteExtractor;

static OG_TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("static og:title selector")
});

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static title selector"));

static H1_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("static h1 selector"));

static OG_SITE_NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:site_name"]"#).expect("static og:site_name selector")
});

/// Fallback extractor for unregistered domains. Pure regex/markup
/// heuristics: labelled-field detection via bold markup, `x/y` rating
/// scan, first image as poster.
pub struct GenericExtractor;

impl GenericExtractor {
    fn title(document: &Html) -> String {
        if let Some(meta) = document.select(&OG_TITLE_SELECTOR).next()
            && let Some(content) = meta.value().attr("content")
            && !content.trim().is_empty()
        {
            return fields::clean_title(content);
        }

        for selector in [&*H1_SELECTOR, &*TITLE_SELECTOR] {
            if let Some(element) = document.select(selector).next() {
                let text: String = element.text().collect();
                if !text.trim().is_empty() {
                    return fields::clean_title(&text);
                }
            }
        }

        String::new()
    }

    fn site_name(document: &Html, url: &Url) -> String {
        if let Some(meta) = document.select(&OG_SITE_NAME_SELECTOR).next()
            && let Some(content) = meta.value().attr("content")
            && !content.trim().is_empty()
        {
            return content.trim().to_string();
        }
        url.host_str()
            .map(|h| h.trim_start_matches("www.").to_string())
            .unwrap_or_default()
    }
}

impl SiteExtractor for GenericExtractor {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn matches(&self, _domain: &str) -> bool {
        true
    }

    fn extract(&self, document: &Html, url: &Url) -> ExtractedContent {
        let mut content = ExtractedContent::new(url.clone(), Self::site_name(document, url));

        content.title = Self::title(document);

        if let Some((rating, scale)) = fields::extract_rating(document) {
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
