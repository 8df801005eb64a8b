use scraper::Html;
use tracing::debug;
use url::Url;

use crate::extract::generic::GenericExtractor;
use crate::extract::model::ExtractedContent;
use crate::extract::sites;

/// One strategy per supported source domain. Adding a source means adding
/// an implementation and registering it — no shared code changes.
pub trait SiteExtractor: Send + Sync {
    /// Extractor name, used for logging.
    fn name(&self) -> &'static str;

    /// Whether this extractor handles the given source domain. Matching is
    /// by exact or substring comparison on the host.
    fn matches(&self, domain: &str) -> bool;

    /// Convert raw markup into the canonical record. Must not fail:
    /// unextractable optional fields are left empty.
    fn extract(&self, document: &Html, url: &Url) -> ExtractedContent;
}

/// Dispatch table mapping `(domain, html)` to an extraction strategy.
/// First registered match wins; unmatched domains fall through to the
/// generic heuristics.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn SiteExtractor>>,
    fallback: GenericExtractor,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(sites::GreatAndhraExtractor),
                Box::new(sites::Telugu123Extractor),
                Box::new(sites::GulteExtractor),
            ],
            fallback: GenericExtractor,
        }
    }

    pub fn extractor_for(&self, domain: &str) -> &dyn SiteExtractor {
        for extractor in &self.extractors {
            if extractor.matches(domain) {
                return extractor.as_ref();
            }
        }
        &self.fallback
    }

    /// Extract a canonical record from a fetched page. Pure transform of
    /// the markup — no network I/O, no side effects.
    pub fn extract(&self, html: &str, url: &Url) -> ExtractedContent {
        let domain = url.host_str().unwrap_or_default();
        let extractor = self.extractor_for(domain);
        debug!(extractor = extractor.name(), %url, "extracting content");

        let document = Html::parse_document(html);
        extractor.extract(&document, url)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_domain_substring() {
        let registry = ExtractorRegistry::new();

        assert_eq!(
            registry.extractor_for("www.greatandhra.com").name(),
            "greatandhra"
        );
        assert_eq!(registry.extractor_for("123telugu.com").name(), "123telugu");
        assert_eq!(registry.extractor_for("www.gulte.com").name(), "gulte");
    }

    #[test]
    fn unknown_domain_falls_back_to_generic() {
        let registry = ExtractorRegistry::new();
        assert_eq!(registry.extractor_for("example.org").name(), "generic");
    }

    #[test]
    fn extract_never_fails_on_junk_markup() {
        let registry = ExtractorRegistry::new();
        let url = Url::parse("https://example.org/whatever").unwrap();

        let content = registry.extract("<<<not html at all", &url);
        assert!(!content.has_rating());
        assert_eq!(content.source_url, url);
    }
}
