use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// The fixed, closed set of review body sections. Downstream templating
/// relies on this being a struct rather than an open map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSections {
    pub plot: Option<String>,
    pub performances: Option<String>,
    pub highlights: Option<String>,
    pub drawbacks: Option<String>,
    pub technical: Option<String>,
    pub verdict: Option<String>,
}

impl ReviewSections {
    pub fn is_empty(&self) -> bool {
        self.plot.is_none()
            && self.performances.is_none()
            && self.highlights.is_none()
            && self.drawbacks.is_none()
            && self.technical.is_none()
            && self.verdict.is_none()
    }
}

/// Canonical record for one scraped item. Produced by an extractor,
/// consumed once by dedupe/generation, then discarded — only the derived
/// content record is persisted.
///
/// Invariant: `rating_scale > 0` whenever `rating > 0`. Optional fields an
/// extractor cannot find are left empty, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub title: String,
    pub rating: f32,
    pub rating_scale: f32,
    pub cast: Option<String>,
    pub director: Option<String>,
    pub production_crew: BTreeMap<String, String>,
    pub genre: Option<String>,
    pub runtime: Option<String>,
    pub release_date: Option<String>,
    pub poster_image: Option<Url>,
    pub trailer_url: Option<Url>,
    pub sections: ReviewSections,
    pub source_url: Url,
    pub source_name: String,
}

impl ExtractedContent {
    pub fn new(source_url: Url, source_name: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            rating: 0.0,
            rating_scale: 0.0,
            cast: None,
            director: None,
            production_crew: BTreeMap::new(),
            genre: None,
            runtime: None,
            release_date: None,
            poster_image: None,
            trailer_url: None,
            sections: ReviewSections::default(),
            source_url,
            source_name: source_name.into(),
        }
    }

    pub fn has_rating(&self) -> bool {
        self.rating > 0.0 && self.rating_scale > 0.0
    }

    /// Flatten the extracted fields into the reference text handed to the
    /// generation prompt.
    pub fn reference_text(&self) -> String {
        let mut out = String::new();

        if !self.title.is_empty() {
            out.push_str(&format!("Title: {}\n", self.title));
        }
        if self.has_rating() {
            out.push_str(&format!("Rating: {}/{}\n", self.rating, self.rating_scale));
        }
        if let Some(cast) = &self.cast {
            out.push_str(&format!("Cast: {cast}\n"));
        }
        if let Some(director) = &self.director {
            out.push_str(&format!("Director: {director}\n"));
        }
        for (role, name) in &self.production_crew {
            out.push_str(&format!("{role}: {name}\n"));
        }
        if let Some(genre) = &self.genre {
            out.push_str(&format!("Genre: {genre}\n"));
        }
        if let Some(runtime) = &self.runtime {
            out.push_str(&format!("Runtime: {runtime}\n"));
        }
        if let Some(release_date) = &self.release_date {
            out.push_str(&format!("Release date: {release_date}\n"));
        }

        let sections = [
            ("Story", &self.sections.plot),
            ("Performances", &self.sections.performances),
            ("Plus points", &self.sections.highlights),
            ("Minus points", &self.sections.drawbacks),
            ("Technical aspects", &self.sections.technical),
            ("Verdict", &self.sections.verdict),
        ];
        for (label, body) in sections {
            if let Some(body) = body {
                out.push_str(&format!("\n{label}:\n{body}\n"));
            }
        }

        out
    }
}
