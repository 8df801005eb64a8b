//! Provider-agnostic LLM access. The orchestrator only ever sees
//! [`LlmClient::complete`]; which wire protocol backs it is decided once
//! per run from the configured model name.

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("provider returned an empty completion")]
    EmptyCompletion,

    #[error("missing api key for {0}")]
    MissingApiKey(&'static str),
}

impl LlmError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// The single completion interface every provider client implements.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

/// The three supported wire protocols, resolved once per run from the
/// model name rather than re-sniffed at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
    Anthropic,
}

impl Provider {
    /// Name-fragment rules: "gemini"/"imagen" → Gemini,
    /// "claude"/"sonnet"/"opus"/"haiku" → Anthropic, anything else →
    /// the OpenAI-compatible protocol.
    pub fn resolve(model: &str) -> Self {
        let model = model.to_lowercase();
        if model.contains("gemini") || model.contains("imagen") {
            Self::Gemini
        } else if ["claude", "sonnet", "opus", "haiku"]
            .iter()
            .any(|fragment| model.contains(fragment))
        {
            Self::Anthropic
        } else {
            Self::OpenAi
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
        }
    }
}

/// Credentials for whichever providers the deployment has configured.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

/// Build the concrete client for a model name. Fails fast when the
/// matching credential is absent, before any item is fetched.
pub fn build_client(
    model: &str,
    credentials: &ProviderCredentials,
) -> Result<Box<dyn LlmClient>, LlmError> {
    match Provider::resolve(model) {
        Provider::OpenAi => {
            let key = credentials
                .openai_api_key
                .as_deref()
                .ok_or(LlmError::MissingApiKey("openai"))?;
            Ok(Box::new(OpenAiClient::new(key, model)))
        }
        Provider::Gemini => {
            let key = credentials
                .gemini_api_key
                .as_deref()
                .ok_or(LlmError::MissingApiKey("gemini"))?;
            Ok(Box::new(GeminiClient::new(key, model)))
        }
        Provider::Anthropic => {
            let key = credentials
                .anthropic_api_key
                .as_deref()
                .ok_or(LlmError::MissingApiKey("anthropic"))?;
            Ok(Box::new(AnthropicClient::new(key, model)))
        }
    }
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::ClientBuilder::new()
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .expect("Failed to build LLM HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_resolution() {
        assert_eq!(Provider::resolve("gemini-2.0-flash"), Provider::Gemini);
        assert_eq!(Provider::resolve("imagen-3"), Provider::Gemini);
        assert_eq!(Provider::resolve("claude-sonnet-4-5"), Provider::Anthropic);
        assert_eq!(Provider::resolve("Claude-Opus"), Provider::Anthropic);
        assert_eq!(Provider::resolve("haiku-latest"), Provider::Anthropic);
        assert_eq!(Provider::resolve("gpt-4o"), Provider::OpenAi);
        assert_eq!(Provider::resolve("llama-3-70b"), Provider::OpenAi);
    }

    #[test]
    fn build_client_requires_matching_credential() {
        let credentials = ProviderCredentials {
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        assert!(build_client("gpt-4o", &credentials).is_ok());
        assert!(matches!(
            build_client("gemini-2.0-flash", &credentials),
            Err(LlmError::MissingApiKey("gemini"))
        ));
    }
}
