//! The generation orchestrator: one fixed pipeline of provider calls per
//! accepted item, `BUILD_PROMPT → OPTIMIZE → GENERATE → POLISH → TITLE →
//! SUMMARY → (IMAGE)`. Optional stages degrade to passthrough; required
//! stages abort the item.

pub mod polish;
pub mod prompts;

use thiserror::Error;
use tracing::{instrument, warn};
use url::Url;

use crate::llm::{LlmClient, LlmError};

const MAX_TITLE_CHARS: usize = 125;
const OPTIMIZE_MAX_TOKENS: u32 = 1024;
const TITLE_MAX_TOKENS: u32 = 128;
const SUMMARY_MAX_TOKENS: u32 = 256;

/// Everything the orchestrator needs for one item. Assembled from agent
/// configuration plus fetched text; immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub category: String,
    pub target_state: String,
    pub target_language: String,
    pub word_count: usize,
    pub split_content: bool,
    pub reference_content: Option<String>,
    pub original_title: Option<String>,
    pub rating_context: Option<String>,
}

/// The finished article handed to the workflow publisher.
#[derive(Debug, Clone)]
pub struct GeneratedArticle {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub poster_image: Option<Url>,
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: LlmError,
    },
}

/// One orchestrator instance per pipeline run. Holds the provider client
/// resolved from configuration; constructed explicitly and passed by
/// reference so runs stay isolated.
pub struct OrchestratorSession {
    client: Box<dyn LlmClient>,
    generate_max_tokens: u32,
}

impl OrchestratorSession {
    pub fn new(client: Box<dyn LlmClient>, word_count: usize) -> Self {
        Self {
            client,
            generate_max_tokens: (word_count as u32).saturating_mul(3).clamp(1024, 8192),
        }
    }

    /// Run the full stage pipeline for one item. `poster` is the
    /// image-acquisition input: the extractor's poster when it found one.
    #[instrument(skip_all)]
    pub async fn generate_article(
        &self,
        request: &GenerationRequest,
        poster: Option<Url>,
    ) -> Result<GeneratedArticle, GenerateError> {
        let prompt = prompts::build_generation_prompt(request);
        let prompt = self.optimize(prompt, request).await;

        let draft = self.generate(&prompt).await?;
        let content = self.polish(draft).await;

        let title = self.title(request, &content).await?;
        let summary = self.summary(&content).await?;

        Ok(GeneratedArticle {
            title,
            content,
            summary,
            poster_image: poster,
        })
    }

    /// OPTIMIZE. Skipped entirely when the prompt carries fetched
    /// reference content — an "improved" prompt tends to drop the real
    /// facts. Provider failure degrades to passthrough.
    async fn optimize(&self, prompt: String, request: &GenerationRequest) -> String {
        if request.reference_content.is_some() {
            return prompt;
        }

        match self
            .client
            .complete(prompts::OPTIMIZE_SYSTEM, &prompt, OPTIMIZE_MAX_TOKENS)
            .await
        {
            Ok(optimized) if !optimized.trim().is_empty() => optimized,
            Ok(_) => prompt,
            Err(err) => {
                warn!(error = %err, "optimize stage failed, using original prompt");
                prompt
            }
        }
    }

    /// GENERATE. Required — there is no safe placeholder for body text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.client
            .complete(prompts::GENERATE_SYSTEM, prompt, self.generate_max_tokens)
            .await
            .map_err(|source| GenerateError::Stage {
                stage: "generate",
                source,
            })
    }

    /// POLISH. Provider failure degrades to passthrough; artifact
    /// stripping applies either way.
    async fn polish(&self, draft: String) -> String {
        match self
            .client
            .complete(
                prompts::POLISH_SYSTEM,
                &prompts::polish_prompt(&draft),
                self.generate_max_tokens,
            )
            .await
        {
            Ok(polished) if !polished.trim().is_empty() => polish::strip_artifacts(&polished),
            Ok(_) => polish::strip_artifacts(&draft),
            Err(err) => {
                warn!(error = %err, "polish stage failed, keeping draft");
                polish::strip_artifacts(&draft)
            }
        }
    }

    /// TITLE. Rewrites the original title when one was extracted rather
    /// than inventing a new subject. Required; over-length results get one
    /// "shorten" escalation before hard truncation at the last whole word.
    async fn title(
        &self,
        request: &GenerationRequest,
        content: &str,
    ) -> Result<String, GenerateError> {
        let prompt = match &request.original_title {
            Some(original) => prompts::rewrite_title_prompt(original),
            None => prompts::derive_title_prompt(content),
        };

        let title = self
            .client
            .complete(prompts::TITLE_SYSTEM, &prompt, TITLE_MAX_TOKENS)
            .await
            .map_err(|source| GenerateError::Stage {
                stage: "title",
                source,
            })?;
        let title = clean_title_response(&title);

        if title.chars().count() <= MAX_TITLE_CHARS {
            return Ok(title);
        }

        let shortened = match self
            .client
            .complete(
                prompts::TITLE_SYSTEM,
                &prompts::shorten_title_prompt(&title),
                TITLE_MAX_TOKENS,
            )
            .await
        {
            Ok(shortened) => clean_title_response(&shortened),
            Err(err) => {
                warn!(error = %err, "title shorten failed, truncating");
                title.clone()
            }
        };

        if shortened.chars().count() <= MAX_TITLE_CHARS {
            return Ok(shortened);
        }
        Ok(truncate_at_word(&shortened, MAX_TITLE_CHARS))
    }

    /// SUMMARY. Required.
    async fn summary(&self, content: &str) -> Result<String, GenerateError> {
        let summary = self
            .client
            .complete(
                prompts::SUMMARY_SYSTEM,
                &prompts::summary_prompt(content),
                SUMMARY_MAX_TOKENS,
            )
            .await
            .map_err(|source| GenerateError::Stage {
                stage: "summary",
                source,
            })?;

        Ok(summary.trim().to_string())
    }
}

/// Models wrap headlines in quotes or return several lines; keep the first
/// line, unquoted.
fn clean_title_response(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .trim_matches(['"', '\'', '“', '”'])
        .trim()
        .to_string()
}

/// Hard cap: cut at the last whole word that fits.
fn truncate_at_word(title: &str, max_chars: usize) -> String {
    let clipped: String = title.chars().take(max_chars).collect();
    let cut = match clipped.rfind(char::is_whitespace) {
        Some(pos) => &clipped[..pos],
        None => &clipped,
    };
    cut.trim_end_matches([',', ';', ':', '-', '—']).trim().to_string()
}
