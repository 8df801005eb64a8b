//! Agent configuration: the record the surrounding CMS hands to a
//! pipeline run. Read-only to this core.

use serde::{Deserialize, Serialize};

use crate::entities::{ContentFamily, WorkflowMode};
use crate::source::SourceReference;

/// A top-story flag schedules removal from top-story placement
/// `duration_hours` after the record goes live.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TopStoryFlag {
    pub duration_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub reference_urls: Vec<SourceReference>,
    pub category: String,
    #[serde(default = "default_family")]
    pub content_family: ContentFamily,
    #[serde(default)]
    pub target_states: Vec<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default = "default_word_count")]
    pub word_count: usize,
    #[serde(default)]
    pub split_content: bool,
    #[serde(default)]
    pub content_workflow: WorkflowMode,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub top_story: Option<TopStoryFlag>,
}

fn default_family() -> ContentFamily {
    ContentFamily::Article
}

fn default_word_count() -> usize {
    400
}

fn default_max_items() -> usize {
    1
}

impl AgentConfig {
    /// The state used in the generation prompt. Multi-state agents lead
    /// with their first configured state.
    pub fn primary_state(&self) -> &str {
        self.target_states
            .first()
            .map(String::as_str)
            .unwrap_or("Andhra Pradesh and Telangana")
    }
}
