//! End-to-end runs against a mock news site and a mock OpenAI-compatible
//! provider, persisting into the in-memory store.

use std::time::Duration;

use cinewire::{
    agent::AgentConfig,
    entities::{ContentFamily, ContentStatus, WorkflowMode},
    generate::OrchestratorSession,
    llm::OpenAiClient,
    pipeline::Pipeline,
    source::{SourceReference, UrlType},
    store::MemoryContentStore,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, Request, Respond, ResponseTemplate,
    matchers::{method, path},
};

/// Scripted provider: answers each stage based on its system prompt, and
/// echoes the original headline subject back from the title stage so
/// different items yield different headlines.
struct DeskResponder;

impl Respond for DeskResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let system = body["messages"][0]["content"].as_str().unwrap_or_default();
        let user = body["messages"][1]["content"].as_str().unwrap_or_default();

        let reply = if system.contains("news headlines") {
            let subject = user
                .split("Original headline: ")
                .nth(1)
                .unwrap_or("Untitled")
                .trim();
            format!("{subject} Opens To A Thunderous Response")
        } else if system.contains("article summaries") {
            "A quick take on the new release.".to_string()
        } else if system.contains("copy editor") {
            "Polished paragraph one.\n\nPolished paragraph two.".to_string()
        } else {
            "A freshly written article body about the film and its opening weekend.".to_string()
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": reply}}]
        }))
    }
}

fn review_page(film: &str, rating: &str) -> String {
    format!(
        r#"<html>
        <head><title>{film} Review</title></head>
        <body>
            <h1>{film} Review</h1>
            <p><b>Cast:</b> Lead Actor, Supporting Actor</p>
            <p><b>Director:</b> A Director</p>
            <p>Rating: {rating}/5</p>
            <h3>Story</h3>
            <p>{film} anchors an ambitious story told across two timelines.</p>
            <h3>Verdict</h3>
            <p>{film} is worth a watch this weekend.</p>
        </body>
        </html>"#
    )
}

async fn mount_site(site: &MockServer) {
    let listing = r#"<html><body>
        <article><a href="/reviews/devara-review"><time datetime="2024-01-05">Jan 5</time>Devara</a></article>
        <article><a href="/reviews/kalki-review"><time datetime="2024-01-03">Jan 3</time>Kalki</a></article>
        <article><a href="/reviews/salaar-review"><time datetime="2024-01-01">Jan 1</time>Salaar</a></article>
        </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(listing.as_bytes())
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(site)
        .await;

    for (slug, film, rating) in [
        ("devara-review", "Devara", "3"),
        ("kalki-review", "Kalki", "3.5"),
        ("salaar-review", "Salaar", "2.5"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/reviews/{slug}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(review_page(film, rating).into_bytes())
                    .insert_header("Content-Type", "text/html; charset=utf-8"),
            )
            .mount(site)
            .await;
    }
}

async fn mount_provider(provider: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(DeskResponder)
        .mount(provider)
        .await;
}

fn agent(site: &MockServer, workflow: WorkflowMode, max_items: usize) -> AgentConfig {
    AgentConfig {
        reference_urls: vec![SourceReference::new(format!("{}/reviews", site.uri()))],
        category: "movie reviews".to_string(),
        content_family: ContentFamily::Review,
        target_states: vec!["Telangana".to_string()],
        target_language: Some("en".to_string()),
        word_count: 300,
        split_content: false,
        content_workflow: workflow,
        max_items,
        top_story: None,
    }
}

fn session(provider: &MockServer) -> OrchestratorSession {
    let client = OpenAiClient::new("sk-test", "gpt-4o-mini").with_base_url(provider.uri());
    OrchestratorSession::new(Box::new(client), 300)
}

#[tokio::test]
async fn bulk_run_respects_max_items_and_workflow() {
    let site = MockServer::start().await;
    let provider = MockServer::start().await;
    mount_site(&site).await;
    mount_provider(&provider).await;

    let store = MemoryContentStore::new();
    let session = session(&provider);
    let pipeline = Pipeline::new(&store, &session).with_item_delay(Duration::ZERO);

    let report = pipeline
        .run(&agent(&site, WorkflowMode::ReadyToPublish, 2))
        .await;

    assert_eq!(report.scraped_count, 2);
    assert_eq!(report.created_count, 2);
    assert_eq!(report.skipped_count, 0);
    assert!(report.failed.is_empty());
    assert!(report.scraped_count >= report.created_count + report.skipped_count);

    let records = store.records();
    assert_eq!(records.len(), 2);

    // Most recent first: the 2024-01-05 item leads.
    assert!(records[0].title.contains("Devara"));
    assert!(records[1].title.contains("Kalki"));

    for record in &records {
        assert_eq!(record.status, ContentStatus::Approved);
        assert!(!record.is_published);
        assert!(record.published_at.is_none());
        assert_eq!(record.language_code, "en");
        assert_eq!(record.content_type, ContentFamily::Review);
        assert!(!record.content.is_empty());
        assert!(!record.summary.is_empty());
    }

    // Ratings flowed from extraction through normalization.
    assert_eq!(records[0].rating, Some(3.0));
    assert_eq!(records[1].rating, Some(3.5));
    assert_eq!(records[1].verdict_tag.as_deref(), Some("Super Hit"));
}

#[tokio::test]
async fn second_run_skips_already_published_items() {
    let site = MockServer::start().await;
    let provider = MockServer::start().await;
    mount_site(&site).await;
    mount_provider(&provider).await;

    let store = MemoryContentStore::new();
    let session = session(&provider);
    let pipeline = Pipeline::new(&store, &session).with_item_delay(Duration::ZERO);
    let agent = agent(&site, WorkflowMode::AutoPost, 2);

    let first = pipeline.run(&agent).await;
    assert_eq!(first.created_count, 2);

    let second = pipeline.run(&agent).await;
    assert_eq!(second.created_count, 0);
    assert_eq!(second.skipped_count, 2);
    assert!(second.failed.is_empty());

    // Still only the original two records.
    assert_eq!(store.records().len(), 2);
}

#[tokio::test]
async fn direct_reference_processes_exactly_one_item() {
    let site = MockServer::start().await;
    let provider = MockServer::start().await;
    mount_site(&site).await;
    mount_provider(&provider).await;

    let store = MemoryContentStore::new();
    let session = session(&provider);
    let pipeline = Pipeline::new(&store, &session).with_item_delay(Duration::ZERO);

    let mut agent = agent(&site, WorkflowMode::AutoPost, 5);
    agent.reference_urls = vec![SourceReference {
        url: format!("{}/reviews/salaar-review", site.uri()),
        url_type: UrlType::Direct,
    }];

    let report = pipeline.run(&agent).await;

    assert_eq!(report.scraped_count, 1);
    assert_eq!(report.created_count, 1);

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].title.contains("Salaar"));
    assert!(records[0].is_published);
    assert_eq!(records[0].status, ContentStatus::Published);
    assert!(records[0].published_at.is_some());
}

#[tokio::test]
async fn failed_items_do_not_abort_the_run() {
    let site = MockServer::start().await;
    let provider = MockServer::start().await;
    mount_provider(&provider).await;

    // Only one of the two linked items exists; the other 404s.
    let listing = r#"<html><body>
        <article><a href="/reviews/devara-review"><time datetime="2024-01-05">Jan 5</time>Devara</a></article>
        <article><a href="/reviews/missing-review"><time datetime="2024-01-04">Jan 4</time>Missing</a></article>
        </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(listing.as_bytes())
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/reviews/devara-review"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(review_page("Devara", "3").into_bytes())
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/reviews/missing-review"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let store = MemoryContentStore::new();
    let session = session(&provider);
    let pipeline = Pipeline::new(&store, &session).with_item_delay(Duration::ZERO);

    let report = pipeline.run(&agent(&site, WorkflowMode::InReview, 2)).await;

    assert_eq!(report.scraped_count, 2);
    assert_eq!(report.created_count, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].url.contains("missing-review"));
    assert!(report.failed[0].reason.contains("fetch failed"));

    // The surviving item still landed in the store.
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn empty_listing_is_a_clean_empty_run() {
    let site = MockServer::start().await;
    let provider = MockServer::start().await;
    mount_provider(&provider).await;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes("<html><body><p>No reviews yet.</p></body></html>".as_bytes())
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&site)
        .await;

    let store = MemoryContentStore::new();
    let session = session(&provider);
    let pipeline = Pipeline::new(&store, &session).with_item_delay(Duration::ZERO);

    let report = pipeline.run(&agent(&site, WorkflowMode::InReview, 3)).await;

    assert_eq!(report.scraped_count, 0);
    assert_eq!(report.created_count, 0);
    assert!(report.failed.is_empty());
    assert!(store.records().is_empty());
}
