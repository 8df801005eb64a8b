//! The content-store seam. The pipeline reads it for duplicate detection
//! and writes it exactly once per accepted item (single-writer: only the
//! workflow publisher calls [`ContentStore::insert`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{ContentFamily, ContentRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected the write, e.g. a uniqueness violation racing a
    /// concurrent writer. Surfaced to the caller; never retried.
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Look up an existing record by its dedupe identity.
    async fn find_by_identity(
        &self,
        normalized_title: &str,
        language_code: &str,
        family: ContentFamily,
    ) -> Result<Option<Uuid>, StoreError>;

    /// Persist a new record. Exactly one insert per accepted item.
    async fn insert(&self, record: &ContentRecord) -> Result<(), StoreError>;

    /// Mark a record as a top story until the given expiry.
    async fn schedule_top_story_expiry(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Postgres-backed store used in production.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn find_by_identity(
        &self,
        normalized_title: &str,
        language_code: &str,
        family: ContentFamily,
    ) -> Result<Option<Uuid>, StoreError> {
        let id: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM contents
            WHERE normalized_title = $1
              AND language_code = $2
              AND content_type = $3
            LIMIT 1
            "#,
        )
        .bind(normalized_title)
        .bind(language_code)
        .bind(family)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id.map(|row| row.0))
    }

    async fn insert(&self, record: &ContentRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contents
                (id, title, normalized_title, slug, content, summary,
                 language_code, states, category, content_type, status,
                 is_published, is_scheduled, rating, verdict_tag,
                 poster_image, checksum, created_at, published_at, source_url)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                 $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.normalized_title)
        .bind(&record.slug)
        .bind(&record.content)
        .bind(&record.summary)
        .bind(&record.language_code)
        .bind(&record.states)
        .bind(&record.category)
        .bind(record.content_type)
        .bind(record.status)
        .bind(record.is_published)
        .bind(record.is_scheduled)
        .bind(record.rating)
        .bind(&record.verdict_tag)
        .bind(&record.poster_image)
        .bind(&record.checksum)
        .bind(record.created_at)
        .bind(record.published_at)
        .bind(&record.source_url)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                StoreError::DuplicateIdentity(format!("{} [{}]", record.title, record.language_code)),
            ),
            Err(err) => Err(err.into()),
        }
    }

    async fn schedule_top_story_expiry(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE contents
            SET is_top_story = TRUE,
                top_story_until = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// In-memory store for dry runs and tests. Mirrors the identity
/// uniqueness the Postgres schema enforces.
#[derive(Default)]
pub struct MemoryContentStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    records: Vec<ContentRecord>,
    identities: HashMap<(String, String, ContentFamily), Uuid>,
    top_stories: HashMap<Uuid, DateTime<Utc>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ContentRecord> {
        self.inner.lock().expect("store lock").records.clone()
    }

    pub fn top_story_expiry(&self, id: Uuid) -> Option<DateTime<Utc>> {
        self.inner.lock().expect("store lock").top_stories.get(&id).copied()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn find_by_identity(
        &self,
        normalized_title: &str,
        language_code: &str,
        family: ContentFamily,
    ) -> Result<Option<Uuid>, StoreError> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .identities
            .get(&(normalized_title.to_string(), language_code.to_string(), family))
            .copied())
    }

    async fn insert(&self, record: &ContentRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let key = (
            record.normalized_title.clone(),
            record.language_code.clone(),
            record.content_type,
        );
        if inner.identities.contains_key(&key) {
            return Err(StoreError::DuplicateIdentity(format!(
                "{} [{}]",
                record.title, record.language_code
            )));
        }
        inner.identities.insert(key, record.id);
        inner.records.push(record.clone());
        Ok(())
    }

    async fn schedule_top_story_expiry(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        inner.top_stories.insert(id, expires_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ContentStatus;

    fn record(title: &str, language: &str) -> ContentRecord {
        ContentRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            normalized_title: crate::dedupe::normalize_title(title),
            slug: title.to_lowercase().replace(' ', "-"),
            content: "body".to_string(),
            summary: "summary".to_string(),
            language_code: language.to_string(),
            states: vec!["ts".to_string()],
            category: "reviews".to_string(),
            content_type: ContentFamily::Review,
            status: ContentStatus::InReview,
            is_published: false,
            is_scheduled: false,
            rating: None,
            verdict_tag: None,
            poster_image: None,
            checksum: "abc".to_string(),
            created_at: Utc::now(),
            published_at: None,
            source_url: "https://example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryContentStore::new();
        let rec = record("Devara Review", "te");

        store.insert(&rec).await.unwrap();

        let found = store
            .find_by_identity("devara", "te", ContentFamily::Review)
            .await
            .unwrap();
        assert_eq!(found, Some(rec.id));

        let missing = store
            .find_by_identity("devara", "en", ContentFamily::Review)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn memory_store_rejects_identity_collisions() {
        let store = MemoryContentStore::new();
        store.insert(&record("Devara Review", "te")).await.unwrap();

        let err = store
            .insert(&record("devara review 2025", "te"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdentity(_)));
    }

    #[tokio::test]
    async fn families_are_separate_dedupe_scopes() {
        let store = MemoryContentStore::new();
        store.insert(&record("Devara Review", "te")).await.unwrap();

        let mut article = record("Devara Review", "te");
        article.content_type = ContentFamily::Article;
        store.insert(&article).await.unwrap();
    }

    #[tokio::test]
    async fn top_story_expiry_recorded() {
        let store = MemoryContentStore::new();
        let rec = record("Devara Review", "te");
        store.insert(&rec).await.unwrap();

        let until = Utc::now() + chrono::Duration::hours(12);
        store.schedule_top_story_expiry(rec.id, until).await.unwrap();

        assert_eq!(store.top_story_expiry(rec.id), Some(until));
    }
}
