use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_LENGTH: usize = 50;

/// Detect the language of extracted text, used when the agent
/// configuration leaves the target language empty.
pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().len() < MIN_TEXT_LENGTH {
        return None;
    }

    if let Some(info) = detect(text)
        && info.confidence() >= MIN_CONFIDENCE
    {
        return Some(lang_to_code(info.lang()));
    }

    None
}

/// ISO 639-1 codes for the languages the desk actually publishes in;
/// anything else falls through to whatlang's debug name.
fn lang_to_code(lang: Lang) -> String {
    match lang {
        Lang::Eng => "en".to_string(),
        Lang::Tel => "te".to_string(),
        Lang::Hin => "hi".to_string(),
        Lang::Tam => "ta".to_string(),
        Lang::Kan => "kn".to_string(),
        Lang::Mal => "ml".to_string(),
        Lang::Mar => "mr".to_string(),
        Lang::Ben => "bn".to_string(),
        _ => format!("{lang:?}").to_lowercase(),
    }
}

/// Human-readable language name for prompt text; the generation prompt
/// reads better as "in Telugu" than "in te".
pub fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "te" => "Telugu",
        "hi" => "Hindi",
        "ta" => "Tamil",
        "kn" => "Kannada",
        "ml" => "Malayalam",
        "mr" => "Marathi",
        "bn" => "Bengali",
        other => other,
    }
}
