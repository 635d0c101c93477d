//! Full pipeline runs against a temporary store and the scripted backend.

use std::sync::Arc;

use tempfile::TempDir;

use blogforge_core::config::{ConfigOverrides, PipelineConfig};
use blogforge_core::job::{JobStatus, LogLevel, PipelineStage};
use blogforge_core::pipeline::{Pipeline, RunRequest};
use blogforge_core::store::Store;
use blogforge_core::types::{Keyword, KeywordIntent, KeywordStatus, PostStatus, Topic, TopicStatus};
use genai_client::MockBackend;

fn harness(config: PipelineConfig, backend: MockBackend) -> (TempDir, Arc<Store>, Arc<MockBackend>, Pipeline) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("test.redb")).unwrap());
    let backend = Arc::new(backend);
    let pipeline = Pipeline::new(
        store.clone(),
        backend.clone(),
        backend.clone(),
        backend.clone(),
        config,
    );
    (dir, store, backend, pipeline)
}

fn pending_keyword(store: &Store, text: &str) -> Keyword {
    let kw = Keyword::new(text, KeywordIntent::Informational, 10);
    store.insert_keyword(&kw).unwrap();
    kw
}

#[tokio::test]
async fn fresh_keyword_produces_draft_post_and_completed_job() {
    let (_dir, store, backend, pipeline) =
        harness(PipelineConfig::default(), MockBackend::new());
    let kw = pending_keyword(&store, "pickleball");

    let outcome = pipeline.run(RunRequest::default()).await.unwrap();
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert!(outcome.token_usage.total() > 0);

    // Post saved as a draft: autopublish defaults to false.
    let post = store.post(outcome.post_id.unwrap()).unwrap();
    assert_eq!(post.status, PostStatus::Draft);
    assert!(post.published_at.is_none());
    assert!(post.word_count >= 1200);
    assert_eq!(post.faqs.len(), 4);
    assert!(!post.toc.is_empty());
    assert!(post.content_html.contains("<h2"));
    assert!(post
        .seo_title
        .to_lowercase()
        .contains("pickleball"));
    assert!(post.canonical_url.ends_with(&post.slug));
    assert!(post.cover_image_url.is_some());
    assert!(post.og_image_url.is_some());

    // Job run terminal and fully staged.
    let run = store.job_run(outcome.job_run_id).unwrap();
    assert_eq!(run.status, JobStatus::Completed);
    assert_eq!(run.stage, PipelineStage::Done);
    assert_eq!(run.post_id, Some(post.id));
    assert!(run.error.is_none());
    assert!(!run.logs.is_empty());

    // Keyword consumed exactly once.
    let used = store.keyword(kw.id).unwrap();
    assert_eq!(used.status, KeywordStatus::Used);
    assert_eq!(used.usage_count, 1);
    assert!(used.last_used_at.is_some());

    // The four generation calls ran in order after topic ideation.
    let calls = backend.call_log();
    let order: Vec<&str> = calls.iter().map(String::as_str).collect();
    assert_eq!(
        order[..5],
        [
            "generate_topics",
            "generate_outline",
            "generate_article",
            "generate_faq",
            "polish_for_seo"
        ]
    );
}

#[tokio::test]
async fn empty_queue_fails_the_run_without_a_post() {
    let (_dir, store, _backend, pipeline) =
        harness(PipelineConfig::default(), MockBackend::new());

    let outcome = pipeline.run(RunRequest::default()).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.post_id.is_none());
    assert!(outcome.errors[0].contains("no pending keyword"));

    assert!(store.list_posts().unwrap().is_empty());
    let run = store.job_run(outcome.job_run_id).unwrap();
    assert_eq!(run.status, JobStatus::Failed);
    assert!(run.error.as_deref().unwrap().contains("no pending keyword"));
    assert!(run
        .logs
        .iter()
        .any(|l| matches!(l.level, LogLevel::Error)));
}

#[tokio::test]
async fn autopublish_publishes_when_floors_are_met() {
    let (_dir, store, _backend, pipeline) =
        harness(PipelineConfig::default(), MockBackend::new());
    pending_keyword(&store, "pickleball");

    let request = RunRequest {
        overrides: ConfigOverrides {
            autopublish: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let outcome = pipeline.run(request).await.unwrap();
    assert!(outcome.success, "errors: {:?}", outcome.errors);

    let post = store.post(outcome.post_id.unwrap()).unwrap();
    assert_eq!(post.status, PostStatus::Published);
    assert!(post.published_at.is_some());
}

#[tokio::test]
async fn short_article_stays_draft_under_autopublish() {
    let (_dir, store, _backend, pipeline) = harness(
        PipelineConfig::default(),
        MockBackend::new().with_article_words(500),
    );
    pending_keyword(&store, "pickleball");

    let request = RunRequest {
        overrides: ConfigOverrides {
            autopublish: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let outcome = pipeline.run(request).await.unwrap();
    // Gate findings are data, not failures.
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert!(outcome.warnings.iter().any(|w| w.contains("word count")));

    let post = store.post(outcome.post_id.unwrap()).unwrap();
    assert_eq!(post.status, PostStatus::Draft);
}

#[tokio::test]
async fn image_failure_is_a_warning_not_a_failure() {
    let (_dir, store, _backend, pipeline) = harness(
        PipelineConfig::default(),
        MockBackend::new().failing_on("generate_cover_image"),
    );
    pending_keyword(&store, "pickleball");

    let outcome = pipeline.run(RunRequest::default()).await.unwrap();
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert!(outcome.warnings.iter().any(|w| w.contains("cover image")));

    let post = store.post(outcome.post_id.unwrap()).unwrap();
    assert!(post.cover_image_url.is_none());
    assert!(post.og_image_url.is_some());

    let run = store.job_run(outcome.job_run_id).unwrap();
    assert_eq!(run.status, JobStatus::Completed);
    assert!(run
        .logs
        .iter()
        .any(|l| matches!(l.level, LogLevel::Warning)));
}

#[tokio::test]
async fn generation_failure_aborts_without_touching_the_keyword() {
    let (_dir, store, _backend, pipeline) = harness(
        PipelineConfig::default(),
        MockBackend::new().failing_on("generate_article"),
    );
    let kw = pending_keyword(&store, "pickleball");

    let outcome = pipeline.run(RunRequest::default()).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("content generation failed"));

    // Nothing persisted: no post, keyword untouched.
    assert!(store.list_posts().unwrap().is_empty());
    let stored = store.keyword(kw.id).unwrap();
    assert_eq!(stored.status, KeywordStatus::Pending);
    assert_eq!(stored.usage_count, 0);

    let run = store.job_run(outcome.job_run_id).unwrap();
    assert_eq!(run.status, JobStatus::Failed);
}

#[tokio::test]
async fn approved_topic_skips_ideation() {
    let (_dir, store, backend, pipeline) =
        harness(PipelineConfig::default(), MockBackend::new());
    let kw = pending_keyword(&store, "pickleball");
    let topic = Topic {
        id: uuid::Uuid::new_v4(),
        keyword_id: kw.id,
        title: "Approved Pickleball Primer".to_string(),
        angle: "beginner focus".to_string(),
        outline: vec!["Basics".into(), "Gear".into(), "Where to play".into()],
        score: 88,
        status: TopicStatus::Approved,
    };
    store.insert_topic(&topic).unwrap();

    let outcome = pipeline.run(RunRequest::default()).await.unwrap();
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert!(!backend.call_log().contains(&"generate_topics".to_string()));

    let post = store.post(outcome.post_id.unwrap()).unwrap();
    assert_eq!(post.topic_id, topic.id);
    assert_eq!(post.title, "Approved Pickleball Primer");
    assert_eq!(store.topic(topic.id).unwrap().status, TopicStatus::Used);
}

#[tokio::test]
async fn explicit_keyword_id_overrides_queue_order() {
    let (_dir, store, _backend, pipeline) =
        harness(PipelineConfig::default(), MockBackend::new());
    let _high = pending_keyword(&store, "high priority keyword");
    let low = Keyword::new("pickleball", KeywordIntent::Informational, 1);
    store.insert_keyword(&low).unwrap();

    let request = RunRequest {
        keyword_id: Some(low.id),
        ..Default::default()
    };
    let outcome = pipeline.run(request).await.unwrap();
    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert_eq!(store.keyword(low.id).unwrap().status, KeywordStatus::Used);
    assert_eq!(
        store.keyword(_high.id).unwrap().status,
        KeywordStatus::Pending
    );
}

#[tokio::test]
async fn colliding_title_gets_a_suffixed_slug() {
    let (_dir, store, _backend, pipeline) =
        harness(PipelineConfig::default(), MockBackend::new());
    let first_kw = pending_keyword(&store, "pickleball");
    let outcome = pipeline.run(RunRequest::default()).await.unwrap();
    assert!(outcome.success);
    let first = store.post(outcome.post_id.unwrap()).unwrap();
    assert_eq!(store.keyword(first_kw.id).unwrap().status, KeywordStatus::Used);

    // Force a second run onto the same title via an approved topic.
    let second_kw = pending_keyword(&store, "pickleball");
    let topic = Topic {
        id: uuid::Uuid::new_v4(),
        keyword_id: second_kw.id,
        title: first.title.clone(),
        angle: "revisited".to_string(),
        outline: vec!["Basics".into(), "Gear".into(), "Where to play".into()],
        score: 90,
        status: TopicStatus::Approved,
    };
    store.insert_topic(&topic).unwrap();

    let second = pipeline.run(RunRequest::default()).await.unwrap();
    assert!(second.success, "errors: {:?}", second.errors);
    let second_post = store.post(second.post_id.unwrap()).unwrap();
    assert_eq!(second_post.slug, format!("{}-1", first.slug));
    // Duplicate title is a gate finding, so the post lands as a draft.
    assert!(second.warnings.iter().any(|w| w.contains("duplicate")));
    assert_eq!(second_post.status, PostStatus::Draft);
}
