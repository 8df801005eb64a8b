//! The run loop: classify each reference, resolve listings, then walk the
//! discovered items sequentially through fetch → extract → dedupe →
//! generate → publish. Failures stay local to one item — a run always
//! finishes its list.

pub mod language;
pub mod report;

pub use report::RunReport;

use rand::Rng;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::agent::AgentConfig;
use crate::dedupe::{self, DedupeDecision};
use crate::extract::ExtractorRegistry;
use crate::fetcher;
use crate::generate::{GenerationRequest, OrchestratorSession};
use crate::publish::{PublishMeta, WorkflowPublisher};
use crate::rating::{NormalizedRating, VerdictTable};
use crate::source;
use crate::store::ContentStore;

/// Bulk mode is sequential on purpose: providers rate-limit per minute
/// across items, and the dedupe read-then-write is not transactional. The
/// inter-item pause keeps upstream sites happy too.
const DEFAULT_ITEM_DELAY: Duration = Duration::from_secs(3);

pub struct Pipeline<'a> {
    store: &'a dyn ContentStore,
    session: &'a OrchestratorSession,
    registry: ExtractorRegistry,
    verdicts: VerdictTable,
    item_delay: Duration,
}

enum ItemOutcome {
    Created { id: Uuid, title: String },
    Skipped,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn ContentStore, session: &'a OrchestratorSession) -> Self {
        Self {
            store,
            session,
            registry: ExtractorRegistry::new(),
            verdicts: VerdictTable::default(),
            item_delay: DEFAULT_ITEM_DELAY,
        }
    }

    pub fn with_verdict_table(mut self, verdicts: VerdictTable) -> Self {
        self.verdicts = verdicts;
        self
    }

    pub fn with_item_delay(mut self, item_delay: Duration) -> Self {
        self.item_delay = item_delay;
        self
    }

    /// Run the full pipeline for one agent configuration.
    #[instrument(skip_all, fields(category = %agent.category))]
    pub async fn run(&self, agent: &AgentConfig) -> RunReport {
        let mut report = RunReport::default();
        let max_items = agent.max_items.max(1);

        for reference in &agent.reference_urls {
            let item_urls = if source::classify(reference) {
                match fetcher::fetch(&reference.url).await {
                    Ok(page) => {
                        let items =
                            source::discover_recent(&page.body_utf8, &page.url_final, max_items);
                        if items.is_empty() {
                            // No content available — an empty result, not
                            // an error.
                            info!(url = %reference.url, "listing yielded no candidates");
                        }
                        items.into_iter().map(|item| item.url.to_string()).collect()
                    }
                    Err(err) => {
                        report.record_failed(
                            &reference.url,
                            format!("listing fetch failed: {err}"),
                        );
                        continue;
                    }
                }
            } else {
                vec![reference.url.clone()]
            };

            let mut first = true;
            for url in item_urls {
                if !first {
                    self.pause_between_items().await;
                }
                first = false;

                report.scraped_count += 1;
                match self.process_item(&url, agent).await {
                    Ok(ItemOutcome::Created { id, title }) => report.record_created(id, title),
                    Ok(ItemOutcome::Skipped) => report.record_skipped(),
                    Err(reason) => {
                        warn!(%url, %reason, "item failed");
                        report.record_failed(&url, reason);
                    }
                }
            }
        }

        info!(
            scraped = report.scraped_count,
            created = report.created_count,
            skipped = report.skipped_count,
            failed = report.failed.len(),
            "run complete"
        );
        report
    }

    async fn process_item(&self, url: &str, agent: &AgentConfig) -> Result<ItemOutcome, String> {
        let page = fetcher::fetch(url)
            .await
            .map_err(|err| format!("fetch failed: {err}"))?;

        let extracted = self.registry.extract(&page.body_utf8, &page.url_final);
        if extracted.title.trim().is_empty() {
            return Err("extraction produced no title".to_string());
        }

        let reference_text = extracted.reference_text();
        let language_code = agent
            .target_language
            .clone()
            .or_else(|| language::detect_language(&reference_text))
            .unwrap_or_else(|| "en".to_string());

        // Duplicate check runs before any provider call so generation is
        // never paid for content that gets discarded.
        let decision = dedupe::check(
            self.store,
            &extracted.title,
            &language_code,
            agent.content_family,
        )
        .await
        .map_err(|err| format!("dedupe lookup failed: {err}"))?;

        if decision == DedupeDecision::Skip {
            info!(title = %extracted.title, "already exists, skipping");
            return Ok(ItemOutcome::Skipped);
        }

        let rating =
            NormalizedRating::compute(extracted.rating, extracted.rating_scale, &self.verdicts);

        let request = GenerationRequest {
            category: agent.category.clone(),
            target_state: agent.primary_state().to_string(),
            target_language: language::language_name(&language_code).to_string(),
            word_count: agent.word_count,
            split_content: agent.split_content,
            reference_content: (!reference_text.trim().is_empty()).then_some(reference_text),
            original_title: Some(extracted.title.clone()),
            rating_context: rating
                .as_ref()
                .map(|r| format!("{}/5 ({})", r.value, r.tag)),
        };

        let article = self
            .session
            .generate_article(&request, extracted.poster_image.clone())
            .await
            .map_err(|err| format!("generation failed: {err}"))?;

        let meta = PublishMeta {
            source_title: extracted.title.clone(),
            language_code,
            states: agent.target_states.clone(),
            category: agent.category.clone(),
            family: agent.content_family,
            workflow: agent.content_workflow,
            rating,
            source_url: page.url_final.to_string(),
            top_story: agent.top_story,
        };

        let record = WorkflowPublisher::new(self.store)
            .publish(&article, &meta)
            .await
            .map_err(|err| format!("persist failed: {err}"))?;

        Ok(ItemOutcome::Created {
            id: record.id,
            title: record.title,
        })
    }

    async fn pause_between_items(&self) {
        let jitter = rand::thread_rng().gen_range(0..500);
        tokio::time::sleep(self.item_delay + Duration::from_millis(jitter)).await;
    }
}
