use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// --- Persisted enums ---

/// Publication status of a content record. Set once at creation from the
/// workflow mode; later transitions belong to the CMS editor or the
/// scheduler, never to this pipeline.
#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "content_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    InReview,
    Approved,
    Published,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Published => "published",
        }
    }
}

/// The category of persisted record. Duplicate detection is scoped per
/// family: a review and an article may legitimately share a title.
#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(type_name = "content_family", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentFamily {
    Review,
    Article,
    VideoPost,
}

impl ContentFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Article => "article",
            Self::VideoPost => "video_post",
        }
    }
}

/// The configured publication intent for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    AutoPost,
    Publish,
    ReadyToPublish,
    #[default]
    InReview,
}

/// --- Tables ---

/// The persisted article/review. Created exactly once per accepted item;
/// the pipeline never mutates an existing record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: Uuid,
    pub title: String,
    /// Dedupe identity: the normalized form of the source item's title,
    /// not of the generated headline. Re-scraping the same source must hit
    /// this key.
    pub normalized_title: String,
    pub slug: String,
    pub content: String,
    pub summary: String,
    pub language_code: String,
    pub states: Vec<String>,
    pub category: String,
    pub content_type: ContentFamily,
    pub status: ContentStatus,
    pub is_published: bool,
    pub is_scheduled: bool,
    pub rating: Option<f32>,
    pub verdict_tag: Option<String>,
    pub poster_image: Option<String>,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_url: String,
}
