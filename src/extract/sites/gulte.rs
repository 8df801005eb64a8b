use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::extract::fields;
use crate::extract::model::ExtractedContent;
use crate::extract::registry::SiteExtractor;

static TITLE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["h1.post-title", "h1.entry-title", "h1", "h2.title"]
        .iter()
        .map(|s| Selector::parse(s).expect("static gulte title selector"))
        .collect()
});

// Gulte review pages carry the film block in a details table.
static DETAIL_CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("static gulte cell selector"));

pub struct GulteExtractor;

impl GulteExtractor {
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

    /// Film credits on this site sometimes sit in table cells rather than
    /// bold labels: `<td>Director</td><td>Koratala Siva</td>`.
    fn table_fields(document: &Html, content: &mut ExtractedContent) {
        let cells: Vec<String> = document
            .select(&DETAIL_CELL_SELECTOR)
            .map(|cell| fields::normalize_field_text(&cell.text().collect::<String>()))
            .collect();

        for pair in cells.windows(2) {
            let label = pair[0].trim_end_matches(':').trim().to_lowercase();
            let value = pair[1].trim().to_string();
            if value.is_empty() {
                continue;
            }
            match label.as_str() {
                "cast" | "starring" => content.cast.get_or_insert(value),
                "director" | "direction" => content.director.get_or_insert(value),
                "genre" => content.genre.get_or_insert(value),
                "runtime" | "duration" => content.runtime.get_or_insert(value),
                "release date" => content.release_date.get_or_insert(value),
                "music" | "producer" | "banner" | "editor" | "cinematography" => content
                    .production_crew
                    .entry(label.clone())
                    .or_insert(value),
                _ => continue,
            };
        }
    }
}

impl SiteExtractor for GulteExtractor {
    fn name(&self) -> &'static str {
        "gulte"
    }

    fn matches(&self, domain: &str) -> bool {
        domain.contains("gulte.com")
    }

    fn extract(&self, document: &Html, url: &Url) -> ExtractedContent {
        let mut content = ExtractedContent::new(url.clone(), "Gulte");

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

        Self::table_fields(document, &mut content);

        content.poster_image = fields::poster_image(document, url);
        content.trailer_url = fields::trailer_url(document, url);
        content.sections = fields::segment_sections(document);

        content
    }
}
