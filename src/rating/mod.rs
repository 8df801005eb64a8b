//! Rating normalization: heterogeneous `x/y` ratings are rescaled to one
//! 0–5 taxonomy and mapped to a verdict tag/phrase used both on the
//! persisted record and inside the generation prompt.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Number of quarter-point buckets spanning 0.00 → 5.00 inclusive.
pub const BUCKET_COUNT: usize = 21;

const BUCKET_STEP: f32 = 0.25;

/// Rescale an arbitrary `rating/scale` to the 0–5 scale, snapped to the
/// nearest quarter point and clamped to `[0, 5]`.
///
/// A non-positive scale yields 0.0 — extractors guarantee
/// `rating_scale > 0` whenever `rating > 0`, so that case only arises for
/// unrated content.
pub fn normalize(rating: f32, scale: f32) -> f32 {
    if scale <= 0.0 {
        return 0.0;
    }
    let scaled = rating / scale * 5.0;
    let snapped = (scaled / BUCKET_STEP).round() * BUCKET_STEP;
    snapped.clamp(0.0, 5.0)
}

/// One verdict bucket: the short tag stored on the record and the phrase
/// substituted into the prompt context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictEntry {
    pub tag: String,
    pub phrase: String,
}

#[derive(Error, Debug)]
pub enum VerdictTableError {
    #[error("verdict table io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("verdict table parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("verdict table must have exactly {BUCKET_COUNT} entries, got {0}")]
    WrongSize(usize),

    #[error("verdict table bucket {0} has an empty tag")]
    EmptyTag(usize),
}

/// 21-bucket lookup table from normalized rating to verdict. Externally
/// configurable; the built-in default covers the house taxonomy from
/// "Disaster" at 0.00 to "Legendary" at 5.00.
#[derive(Debug, Clone)]
pub struct VerdictTable {
    entries: Vec<VerdictEntry>,
}

impl VerdictTable {
    /// Load a replacement table from a JSON array of `{tag, phrase}`
    /// objects, index 0 = 0.00 through index 20 = 5.00.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VerdictTableError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<VerdictEntry> = serde_json::from_str(&raw)?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<VerdictEntry>) -> Result<Self, VerdictTableError> {
        if entries.len() != BUCKET_COUNT {
            return Err(VerdictTableError::WrongSize(entries.len()));
        }
        for (index, entry) in entries.iter().enumerate() {
            if entry.tag.trim().is_empty() {
                return Err(VerdictTableError::EmptyTag(index));
            }
        }
        Ok(Self { entries })
    }

    /// Look up the verdict for a pre-clamped, quarter-snapped value.
    /// Passing an out-of-range value is a caller error; the lookup clamps
    /// the bucket index rather than panicking.
    pub fn lookup(&self, normalized: f32) -> &VerdictEntry {
        let index = ((normalized / BUCKET_STEP).round() as usize).min(BUCKET_COUNT - 1);
        &self.entries[index]
    }
}

impl Default for VerdictTable {
    fn default() -> Self {
        let defaults: [(&str, &str); BUCKET_COUNT] = [
            ("Disaster", "a complete disaster best skipped"),
            ("Abysmal", "an abysmal misfire on every count"),
            ("Terrible", "a terrible outing with nothing to hold on to"),
            ("Very Bad", "a very bad film that tests patience"),
            ("Bad", "a bad film with only stray moments working"),
            ("Poor", "a poor effort that never comes together"),
            ("Below Average", "a below average fare with limited appeal"),
            ("Weak", "a weak film propped up by its lead"),
            ("Average", "a strictly average watch"),
            ("Passable", "a passable film for an idle afternoon"),
            ("Decent", "a decent one-time watch"),
            ("Fair", "a fair attempt that mostly lands"),
            ("Good", "a good film worth your ticket"),
            ("Very Good", "a very good film that delivers"),
            ("Super Hit", "a super hit with broad appeal"),
            ("Impressive", "an impressive film that stays with you"),
            ("Excellent", "an excellent film firing on all cylinders"),
            ("Outstanding", "an outstanding achievement"),
            ("Blockbuster", "a blockbuster that demands the big screen"),
            ("Masterpiece", "a near-flawless masterpiece"),
            ("Legendary", "a legendary film for the ages"),
        ];

        let entries = defaults
            .into_iter()
            .map(|(tag, phrase)| VerdictEntry {
                tag: tag.to_string(),
                phrase: phrase.to_string(),
            })
            .collect();

        Self { entries }
    }
}

/// A normalized rating paired with its verdict, ready for the record and
/// the prompt context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRating {
    pub value: f32,
    pub tag: String,
    pub phrase: String,
}

impl NormalizedRating {
    pub fn compute(rating: f32, scale: f32, table: &VerdictTable) -> Option<Self> {
        if rating <= 0.0 || scale <= 0.0 {
            return None;
        }
        let value = normalize(rating, scale);
        let entry = table.lookup(value);
        Some(Self {
            value,
            tag: entry.tag.clone(),
            phrase: entry.phrase.clone(),
        })
    }
}
