//! Duplicate suppression. Runs before any LLM call so generation is never
//! paid for content that would be discarded.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};

use crate::entities::ContentFamily;
use crate::store::{ContentStore, StoreError};

static TRAILING_REVIEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(movie\s+review|review)\s*$").expect("static trailing-review pattern")
});

static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(19|20)\d{2}\s*$").expect("static trailing-year pattern"));

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("static punctuation pattern"));

/// Canonical identity form of a title: lower-cased, trailing
/// "review"/year/suffix punctuation stripped, whitespace and punctuation
/// collapsed. "Devara Review" and "devara review 2025" collapse to the
/// same key.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, " ");
    let stripped = TRAILING_YEAR.replace(stripped.trim(), "");
    let stripped = TRAILING_REVIEW.replace(stripped.trim(), "");
    let stripped = TRAILING_YEAR.replace(stripped.trim(), "");

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Outcome of the duplicate check. A `Skip` is an expected result, tallied
/// separately from failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeDecision {
    Proceed,
    Skip,
}

/// Decide whether an extracted title already exists in the store for the
/// given language and content family.
#[instrument(skip(store), fields(key))]
pub async fn check(
    store: &dyn ContentStore,
    title: &str,
    language_code: &str,
    family: ContentFamily,
) -> Result<DedupeDecision, StoreError> {
    let key = normalize_title(title);
    tracing::Span::current().record("key", tracing::field::display(&key));

    let existing = store.find_by_identity(&key, language_code, family).await?;

    match existing {
        Some(id) => {
            debug!(%id, "duplicate found, skipping");
            Ok(DedupeDecision::Skip)
        }
        None => Ok(DedupeDecision::Proceed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockContentStore;
    use uuid::Uuid;

    #[test]
    fn normalize_collapses_review_variants() {
        assert_eq!(normalize_title("Devara Review"), "devara");
        assert_eq!(normalize_title("devara review 2025"), "devara");
        assert_eq!(normalize_title("Devara: Part 1 — Review"), "devara part 1");
        assert_eq!(normalize_title("  DEVARA   Movie Review  "), "devara");
    }

    #[test]
    fn normalize_keeps_distinct_titles_distinct() {
        assert_ne!(normalize_title("Devara Review"), normalize_title("Kalki Review"));
        assert_ne!(
            normalize_title("Devara Part 1"),
            normalize_title("Devara Part 2")
        );
    }

    #[test]
    fn normalize_collapses_whitespace_and_punctuation() {
        assert_eq!(normalize_title("Kalki  2898   AD!!"), "kalki 2898 ad");
    }

    #[tokio::test]
    async fn colliding_titles_skip() {
        let mut store = MockContentStore::new();
        store
            .expect_find_by_identity()
            .withf(|key, lang, family| {
                key == "devara" && lang == "te" && *family == ContentFamily::Review
            })
            .returning(|_, _, _| Ok(Some(Uuid::new_v4())));

        let decision = check(&store, "devara review 2025", "te", ContentFamily::Review)
            .await
            .unwrap();
        assert_eq!(decision, DedupeDecision::Skip);
    }

    #[tokio::test]
    async fn fresh_titles_proceed() {
        let mut store = MockContentStore::new();
        store
            .expect_find_by_identity()
            .returning(|_, _, _| Ok(None));

        let decision = check(&store, "Devara Review", "te", ContentFamily::Review)
            .await
            .unwrap();
        assert_eq!(decision, DedupeDecision::Proceed);
    }
}
