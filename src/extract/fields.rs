//! Shared extraction heuristics: label→value pairs, rating patterns,
//! section segmentation, and title cleanup. Site extractors compose these;
//! none of them ever fails hard — a field that cannot be found stays empty.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

use crate::extract::model::ReviewSections;

static JSON_LD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static json-ld selector")
});

static LABEL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("b, strong").expect("static label selector"));

static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2, h3, h4, h5, b, strong, p, li").expect("static block selector")
});

static OG_IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:image"]"#).expect("static og:image selector")
});

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src]").expect("static img selector"));

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static anchor selector"));

static RATING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d(?:\.\d{1,2})?)\s*/\s*(\d{1,2})").expect("static rating pattern")
});

static TRAILING_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[\(\[]?(19|20)\d{2}[\)\]]?\s*$").expect("static trailing-year pattern")
});

static REVIEW_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[-:|]?\s*(movie\s+review|review)\s*$").expect("static review-suffix pattern")
});

/// Canonical crew-field vocabulary. Label matching is case-insensitive and
/// ignores a trailing colon.
static LABEL_VOCABULARY: &[(&str, &str)] = &[
    ("cast", "cast"),
    ("starring", "cast"),
    ("star cast", "cast"),
    ("actors", "cast"),
    ("director", "director"),
    ("direction", "director"),
    ("directed by", "director"),
    ("producer", "producer"),
    ("producers", "producer"),
    ("produced by", "producer"),
    ("music", "music"),
    ("music director", "music"),
    ("music composed by", "music"),
    ("cinematography", "cinematography"),
    ("cinematographer", "cinematography"),
    ("dop", "cinematography"),
    ("editor", "editor"),
    ("editing", "editor"),
    ("banner", "banner"),
    ("production company", "banner"),
    ("genre", "genre"),
    ("runtime", "runtime"),
    ("duration", "runtime"),
    ("release date", "release_date"),
    ("released on", "release_date"),
];

/// Strip known suffix noise from a title: "Review"/"Movie Review"
/// trailers, a trailing year, and a " - Site" / " | Site" tail.
pub fn clean_title(raw: &str) -> String {
    let mut title = raw.trim().to_string();

    for separator in [" | ", " - ", " – "] {
        if let Some(pos) = title.rfind(separator) {
            // Only drop the tail when it looks like a site name, not part
            // of the film title.
            let tail = &title[pos + separator.len()..];
            if tail.split_whitespace().count() <= 3 && !tail.chars().any(|c| c.is_ascii_digit()) {
                title.truncate(pos);
            }
        }
    }

    // Year then suffix then year again: both "Devara Review 2024" and
    // "Devara 2024 Review" must reduce to the bare title.
    title = TRAILING_YEAR.replace(&title, "").to_string();
    title = REVIEW_SUFFIX.replace(&title, "").to_string();
    title = TRAILING_YEAR.replace(&title, "").to_string();
    title.trim().trim_end_matches([':', '-', '|']).trim().to_string()
}

/// Locate a rating and its scale, preferring embedded structured data over
/// free text.
pub fn extract_rating(document: &Html) -> Option<(f32, f32)> {
    if let Some(found) = rating_from_json_ld(document) {
        return Some(found);
    }
    rating_from_text(&document.root_element().text().collect::<String>())
}

fn rating_from_json_ld(document: &Html) -> Option<(f32, f32)> {
    for script in document.select(&JSON_LD_SELECTOR) {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        if let Some(found) = rating_from_json_value(&value) {
            return Some(found);
        }
    }
    None
}

fn rating_from_json_value(value: &serde_json::Value) -> Option<(f32, f32)> {
    match value {
        serde_json::Value::Array(entries) => entries.iter().find_map(rating_from_json_value),
        serde_json::Value::Object(map) => {
            for key in ["aggregateRating", "reviewRating"] {
                if let Some(rating_obj) = map.get(key) {
                    let rating = json_number(rating_obj.get("ratingValue")?)?;
                    let scale = rating_obj
                        .get("bestRating")
                        .and_then(json_number)
                        .unwrap_or(5.0);
                    return Some((rating, scale));
                }
            }
            if let Some(graph) = map.get("@graph") {
                return rating_from_json_value(graph);
            }
            map.get("review").and_then(rating_from_json_value)
        }
        _ => None,
    }
}

fn json_number(value: &serde_json::Value) -> Option<f32> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(|v| v as f32),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Free-text `x/y` rating scan. Only scales of 5 or 10 qualify so random
/// fractions in body copy don't read as ratings.
pub fn rating_from_text(text: &str) -> Option<(f32, f32)> {
    for captures in RATING_PATTERN.captures_iter(text) {
        let rating: f32 = captures.get(1)?.as_str().parse().ok()?;
        let scale: f32 = captures.get(2)?.as_str().parse().ok()?;
        if (scale == 5.0 || scale == 10.0) && rating <= scale {
            return Some((rating, scale));
        }
    }
    None
}

/// Collect `label: value` pairs from bold/strong markup, keyed by the
/// canonical vocabulary.
pub fn labelled_fields(document: &Html) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for label_el in document.select(&LABEL_SELECTOR) {
        let label_text: String = label_el.text().collect();
        let label = label_text.trim().trim_end_matches(':').trim().to_lowercase();

        let Some(canonical) = LABEL_VOCABULARY
            .iter()
            .find(|(alias, _)| *alias == label)
            .map(|(_, canonical)| *canonical)
        else {
            continue;
        };

        if let Some(value) = value_after_label(label_el, &label_text)
            && !value.is_empty()
        {
            fields.entry(canonical.to_string()).or_insert(value);
        }
    }

    fields
}

/// The value for a label is whatever text follows it inside the same
/// block-level parent.
fn value_after_label(label_el: ElementRef<'_>, label_text: &str) -> Option<String> {
    let parent = label_el.parent().and_then(ElementRef::wrap)?;
    let parent_text: String = parent.text().collect();

    let after = parent_text.split_once(label_text.trim()).map(|(_, rest)| rest)?;
    let value = after.trim().trim_start_matches([':', '-', '–']).trim();
    if value.is_empty() {
        return None;
    }
    Some(normalize_field_text(value))
}

pub fn normalize_field_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionKind {
    Plot,
    Performances,
    Highlights,
    Drawbacks,
    Technical,
    Verdict,
}

static SECTION_PHRASES: &[(&str, SectionKind)] = &[
    ("story", SectionKind::Plot),
    ("storyline", SectionKind::Plot),
    ("plot", SectionKind::Plot),
    ("what is it about", SectionKind::Plot),
    ("performances", SectionKind::Performances),
    ("artists performance", SectionKind::Performances),
    ("artistes performance", SectionKind::Performances),
    ("acting", SectionKind::Performances),
    ("plus points", SectionKind::Highlights),
    ("plus", SectionKind::Highlights),
    ("positives", SectionKind::Highlights),
    ("highlights", SectionKind::Highlights),
    ("minus points", SectionKind::Drawbacks),
    ("minus", SectionKind::Drawbacks),
    ("negatives", SectionKind::Drawbacks),
    ("drawbacks", SectionKind::Drawbacks),
    ("technical aspects", SectionKind::Technical),
    ("technicalities", SectionKind::Technical),
    ("technical", SectionKind::Technical),
    ("verdict", SectionKind::Verdict),
    ("final verdict", SectionKind::Verdict),
    ("analysis", SectionKind::Verdict),
    ("bottom line", SectionKind::Verdict),
    ("bottomline", SectionKind::Verdict),
];

const MAX_HEADER_LEN: usize = 60;

fn header_kind(text: &str) -> Option<SectionKind> {
    let text = text.trim().trim_end_matches(':').trim().to_lowercase();
    if text.is_empty() || text.len() > MAX_HEADER_LEN {
        return None;
    }
    SECTION_PHRASES
        .iter()
        .find(|(phrase, _)| text == *phrase || text.starts_with(&format!("{phrase} of ")))
        .map(|(_, kind)| *kind)
}

/// Segment the body into the fixed section set by recognizing
/// section-header phrases and collecting block-level text until the next
/// recognized header. Text before any header becomes the plot fallback so
/// plain articles still yield reference content.
pub fn segment_sections(document: &Html) -> ReviewSections {
    let mut sections = ReviewSections::default();
    let mut lead = String::new();
    let mut current: Option<SectionKind> = None;

    for element in document.select(&BLOCK_SELECTOR) {
        let tag = element.value().name();
        let text: String = element.text().collect();
        let text = text.trim();

        if let Some(kind) = header_kind(text) {
            current = Some(kind);
            continue;
        }

        // Headers sometimes share a paragraph with their first sentence:
        // "<p><b>Plus Points:</b> Great acting ...".
        if tag == "p"
            && let Some(label) = element.select(&LABEL_SELECTOR).next()
            && let Some(kind) = header_kind(&label.text().collect::<String>())
        {
            current = Some(kind);
            let label_text: String = label.text().collect();
            if let Some((_, rest)) = text.split_once(label_text.trim()) {
                append_section(&mut sections, kind, rest.trim_start_matches(':').trim());
            }
            continue;
        }

        if tag != "p" && tag != "li" {
            continue;
        }
        if text.is_empty() {
            continue;
        }

        match current {
            Some(kind) => append_section(&mut sections, kind, text),
            None => {
                if !lead.is_empty() {
                    lead.push_str("\n\n");
                }
                lead.push_str(text);
            }
        }
    }

    if sections.plot.is_none() && !lead.is_empty() {
        sections.plot = Some(lead);
    }

    sections
}

fn append_section(sections: &mut ReviewSections, kind: SectionKind, text: &str) {
    if text.is_empty() {
        return;
    }
    let slot = match kind {
        SectionKind::Plot => &mut sections.plot,
        SectionKind::Performances => &mut sections.performances,
        SectionKind::Highlights => &mut sections.highlights,
        SectionKind::Drawbacks => &mut sections.drawbacks,
        SectionKind::Technical => &mut sections.technical,
        SectionKind::Verdict => &mut sections.verdict,
    };
    match slot {
        Some(existing) => {
            existing.push_str("\n\n");
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}

/// Poster lookup: `og:image` first, then the first content `<img>`.
pub fn poster_image(document: &Html, base_url: &Url) -> Option<Url> {
    if let Some(meta) = document.select(&OG_IMAGE_SELECTOR).next()
        && let Some(content) = meta.value().attr("content")
        && let Ok(url) = base_url.join(content)
    {
        return Some(url);
    }

    for img in document.select(&IMG_SELECTOR) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        // Spacer gifs and tracking pixels are not posters.
        if src.contains("data:") || src.contains("blank") || src.contains("pixel") {
            continue;
        }
        if let Ok(url) = base_url.join(src) {
            return Some(url);
        }
    }

    None
}

/// First anchor pointing into a video host.
pub fn trailer_url(document: &Html, base_url: &Url) -> Option<Url> {
    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if href.contains("youtube.com/watch") || href.contains("youtu.be/") {
            if let Ok(url) = base_url.join(href) {
                return Some(url);
            }
        }
    }
    None
}
