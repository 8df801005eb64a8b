//! The workflow publisher: maps the configured workflow mode to persisted
//! status fields and performs the pipeline's only store write.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::agent::TopStoryFlag;
use crate::entities::{ContentFamily, ContentRecord, ContentStatus, WorkflowMode};
use crate::generate::GeneratedArticle;
use crate::rating::NormalizedRating;
use crate::store::{ContentStore, StoreError};

/// Map a workflow mode to `(status, is_published)`.
///
/// `publish` and `auto_post` map identically; the CMS historically mapped
/// `publish` differently per call site, which is treated here as a latent
/// bug rather than behavior to keep.
pub fn workflow_fields(mode: WorkflowMode) -> (ContentStatus, bool) {
    match mode {
        WorkflowMode::AutoPost | WorkflowMode::Publish => (ContentStatus::Published, true),
        WorkflowMode::ReadyToPublish => (ContentStatus::Approved, false),
        WorkflowMode::InReview => (ContentStatus::InReview, false),
    }
}

/// Everything the publisher needs besides the generated article itself.
#[derive(Debug, Clone)]
pub struct PublishMeta {
    /// The extracted source title. Its normalized form is the record's
    /// dedupe identity, so re-scraping the same item is caught even though
    /// the generated headline differs.
    pub source_title: String,
    pub language_code: String,
    pub states: Vec<String>,
    pub category: String,
    pub family: ContentFamily,
    pub workflow: WorkflowMode,
    pub rating: Option<NormalizedRating>,
    pub source_url: String,
    pub top_story: Option<TopStoryFlag>,
}

pub struct WorkflowPublisher<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> WorkflowPublisher<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Build and insert exactly one content record. Status and publish
    /// flag are set atomically at creation; the pipeline never mutates
    /// them afterwards.
    #[instrument(skip_all, fields(title = %article.title))]
    pub async fn publish(
        &self,
        article: &GeneratedArticle,
        meta: &PublishMeta,
    ) -> Result<ContentRecord, StoreError> {
        let (status, is_published) = workflow_fields(meta.workflow);

        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let published_at = is_published.then_some(created_at);

        let record = ContentRecord {
            id,
            title: article.title.clone(),
            normalized_title: crate::dedupe::normalize_title(&meta.source_title),
            slug: make_slug(&article.title, id),
            content: article.content.clone(),
            summary: article.summary.clone(),
            language_code: meta.language_code.clone(),
            states: meta.states.clone(),
            category: meta.category.clone(),
            content_type: meta.family,
            status,
            is_published,
            is_scheduled: false,
            rating: meta.rating.as_ref().map(|r| r.value),
            verdict_tag: meta.rating.as_ref().map(|r| r.tag.clone()),
            poster_image: article.poster_image.as_ref().map(|u| u.to_string()),
            checksum: format!("{:x}", md5::compute(article.content.as_bytes())),
            created_at,
            published_at,
            source_url: meta.source_url.clone(),
        };

        self.store.insert(&record).await?;
        info!(%id, status = status.as_str(), is_published, "content record created");

        // The only time-bounded state the pipeline creates: top stories
        // expire `duration_hours` after going live.
        if let Some(flag) = &meta.top_story {
            let baseline = published_at.unwrap_or(created_at);
            let expires_at = baseline + chrono::Duration::hours(flag.duration_hours);
            self.store.schedule_top_story_expiry(id, expires_at).await?;
        }

        Ok(record)
    }
}

/// URL slug from the title plus a short uniquifier so near-identical
/// titles in other languages never collide.
fn make_slug(title: &str, id: Uuid) -> String {
    let base: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();

    let mut slug = String::with_capacity(base.len() + 9);
    let mut last_dash = true;
    for c in base.chars() {
        if c == '-' {
            if !last_dash {
                slug.push('-');
            }
            last_dash = true;
        } else {
            slug.push(c);
            last_dash = false;
        }
    }
    let slug = slug.trim_end_matches('-');

    let simple = id.simple().to_string();
    format!("{slug}-{}", &simple[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryContentStore;
    use url::Url;

    fn article() -> GeneratedArticle {
        GeneratedArticle {
            title: "Devara Opens Strong".to_string(),
            content: "Body text.".to_string(),
            summary: "Summary.".to_string(),
            poster_image: Some(Url::parse("https://example.com/poster.jpg").unwrap()),
        }
    }

    fn meta(workflow: WorkflowMode) -> PublishMeta {
        PublishMeta {
            source_title: "Devara Review".to_string(),
            language_code: "te".to_string(),
            states: vec!["Telangana".to_string()],
            category: "reviews".to_string(),
            family: ContentFamily::Review,
            workflow,
            rating: None,
            source_url: "https://example.com/reviews/devara".to_string(),
            top_story: None,
        }
    }

    #[test]
    fn workflow_mapping() {
        assert_eq!(
            workflow_fields(WorkflowMode::AutoPost),
            (ContentStatus::Published, true)
        );
        assert_eq!(
            workflow_fields(WorkflowMode::Publish),
            (ContentStatus::Published, true)
        );
        assert_eq!(
            workflow_fields(WorkflowMode::ReadyToPublish),
            (ContentStatus::Approved, false)
        );
        assert_eq!(
            workflow_fields(WorkflowMode::InReview),
            (ContentStatus::InReview, false)
        );
    }

    #[tokio::test]
    async fn ready_to_publish_is_never_live() {
        let store = MemoryContentStore::new();
        let publisher = WorkflowPublisher::new(&store);

        let record = publisher
            .publish(&article(), &meta(WorkflowMode::ReadyToPublish))
            .await
            .unwrap();

        assert_eq!(record.status, ContentStatus::Approved);
        assert!(!record.is_published);
        assert!(record.published_at.is_none());
    }

    #[tokio::test]
    async fn auto_post_goes_live_with_published_at() {
        let store = MemoryContentStore::new();
        let publisher = WorkflowPublisher::new(&store);

        let record = publisher
            .publish(&article(), &meta(WorkflowMode::AutoPost))
            .await
            .unwrap();

        assert_eq!(record.status, ContentStatus::Published);
        assert!(record.is_published);
        assert_eq!(record.published_at, Some(record.created_at));
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn top_story_expiry_is_scheduled() {
        let store = MemoryContentStore::new();
        let publisher = WorkflowPublisher::new(&store);

        let mut m = meta(WorkflowMode::AutoPost);
        m.top_story = Some(TopStoryFlag { duration_hours: 12 });

        let record = publisher.publish(&article(), &m).await.unwrap();

        let expiry = store.top_story_expiry(record.id).unwrap();
        assert_eq!(
            expiry,
            record.published_at.unwrap() + chrono::Duration::hours(12)
        );
    }

    #[tokio::test]
    async fn duplicate_insert_surfaces_persist_failure() {
        let store = MemoryContentStore::new();
        let publisher = WorkflowPublisher::new(&store);

        publisher
            .publish(&article(), &meta(WorkflowMode::InReview))
            .await
            .unwrap();
        let err = publisher
            .publish(&article(), &meta(WorkflowMode::InReview))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdentity(_)));
    }

    #[test]
    fn slug_is_hyphenated_and_uniquified() {
        let id = Uuid::new_v4();
        let slug = make_slug("Devara Opens Strong!", id);
        assert!(slug.starts_with("devara-opens-strong-"));
        assert!(!slug.contains("--"));
        assert!(!slug.ends_with('-'));
    }
}
