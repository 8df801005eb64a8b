//! Fixed textual cleanup applied after the POLISH stage (and to its
//! passthrough input when the provider call fails). Models habitually leak
//! markdown separators and meta-labels into prose; these are stripped with
//! plain substitutions, never another model call.

use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*([-=_*#]{3,})\s*$").expect("static separator pattern"));

static META_LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*(title|headline|article|introduction|summary|conclusion)\s*:\s*$")
        .expect("static meta-label pattern")
});

static BOLD_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|__").expect("static bold-marker pattern"));

static HEADING_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#{1,6}\s*").expect("static heading-marker pattern"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static newline pattern"));

/// Strip separator artifacts and meta-labels, collapse blank-line runs.
pub fn strip_artifacts(text: &str) -> String {
    let text = SEPARATOR_LINE.replace_all(text, "");
    let text = META_LABEL_LINE.replace_all(&text, "");
    let text = BOLD_MARKERS.replace_all(&text, "");
    let text = HEADING_MARKERS.replace_all(&text, "");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
