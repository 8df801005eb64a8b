//! Prompt templates for the generation stages. Kept together so tone and
//! constraints stay consistent across stages.

use crate::generate::GenerationRequest;

pub const OPTIMIZE_SYSTEM: &str = "You improve content-writing prompts for an entertainment \
news desk. Rewrite the prompt to be clearer and more specific without adding new factual \
claims. Return only the improved prompt.";

// Stated up front so the model does not refuse for lack of browsing
// access: everything it needs is already in the prompt.
pub const GENERATE_SYSTEM: &str = "You are an entertainment journalist for a regional news \
desk covering Telugu cinema. The source material you need is already supplied inside the \
prompt; you do not need web access and must not say you cannot browse. Write original prose \
in your own words. Never copy sentences from the source. Do not invent facts, names, \
ratings, or release dates that are not in the source material.";

pub const POLISH_SYSTEM: &str = "You are a copy editor. Reformat the article into short \
paragraphs of two to four sentences. Fix grammar and flow. Do not add or remove facts. \
Return only the edited article text with no headings or commentary.";

pub const TITLE_SYSTEM: &str = "You write news headlines. Return exactly one headline and \
nothing else: no quotes, no alternatives, no commentary.";

pub const SUMMARY_SYSTEM: &str = "You write article summaries for a news CMS. Return one or \
two plain sentences and nothing else.";

/// Assemble the generation prompt from the request. The fetched reference
/// content, when present, is embedded verbatim under a marker the
/// OPTIMIZE-skip check also keys on.
pub const REFERENCE_MARKER: &str = "SOURCE MATERIAL:";

pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "Write a {category} piece in {language} for readers in {state}, around {words} words.",
        category = request.category,
        language = request.target_language,
        state = request.target_state,
        words = request.word_count,
    );

    if request.split_content {
        prompt.push_str(
            " Structure the piece into titled segments, one blank line between segments.",
        );
    }

    if let Some(rating) = &request.rating_context {
        prompt.push_str(&format!(
            "\n\nThe review carries a rating of {rating}. Keep the prose consistent with that score."
        ));
    }

    if let Some(title) = &request.original_title {
        prompt.push_str(&format!("\n\nThe piece covers: {title}."));
    }

    if let Some(reference) = &request.reference_content {
        prompt.push_str(&format!("\n\n{REFERENCE_MARKER}\n{reference}"));
    }

    prompt
}

pub fn rewrite_title_prompt(original_title: &str) -> String {
    format!(
        "Rewrite this headline so it is fresh but keeps the same subject. \
         Keep it under 125 characters.\n\nOriginal headline: {original_title}"
    )
}

pub fn derive_title_prompt(content: &str) -> String {
    let excerpt: String = content.chars().take(1500).collect();
    format!(
        "Write a headline for this article. Keep it under 125 characters.\n\n{excerpt}"
    )
}

pub fn shorten_title_prompt(title: &str) -> String {
    format!("Shorten this headline to under 125 characters:\n\n{title}")
}

pub fn summary_prompt(content: &str) -> String {
    let excerpt: String = content.chars().take(3000).collect();
    format!("Summarize this article in one or two sentences.\n\n{excerpt}")
}

pub fn polish_prompt(draft: &str) -> String {
    format!("Edit this article:\n\n{draft}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            category: "movie review".to_string(),
            target_state: "Telangana".to_string(),
            target_language: "English".to_string(),
            word_count: 450,
            split_content: false,
            reference_content: Some("Cast: NTR Jr".to_string()),
            original_title: Some("Devara".to_string()),
            rating_context: Some("3.5/5 (Super Hit)".to_string()),
        }
    }

    #[test]
    fn prompt_carries_reference_under_marker() {
        let prompt = build_generation_prompt(&request());
        assert!(prompt.contains("around 450 words"));
        assert!(prompt.contains(REFERENCE_MARKER));
        assert!(prompt.contains("Cast: NTR Jr"));
        assert!(prompt.contains("3.5/5 (Super Hit)"));
    }

    #[test]
    fn split_content_adds_segment_instruction() {
        let mut req = request();
        req.split_content = true;
        let prompt = build_generation_prompt(&req);
        assert!(prompt.contains("titled segments"));
    }

    #[test]
    fn no_reference_no_marker() {
        let mut req = request();
        req.reference_content = None;
        let prompt = build_generation_prompt(&req);
        assert!(!prompt.contains(REFERENCE_MARKER));
    }
}
