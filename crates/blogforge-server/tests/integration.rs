use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use blogforge_core::config::PipelineConfig;
use blogforge_core::pipeline::Pipeline;
use blogforge_core::store::Store;
use blogforge_core::types::{Keyword, KeywordIntent};
use blogforge_server::{build_router, AppState};
use genai_client::MockBackend;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn harness() -> (TempDir, Arc<Store>, axum::Router) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("test.redb")).unwrap());
    let backend = Arc::new(MockBackend::new());
    let pipeline = Pipeline::new(
        store.clone(),
        backend.clone(),
        backend.clone(),
        backend,
        PipelineConfig::default(),
    );
    let app = build_router(AppState::new(store.clone(), Arc::new(pipeline)));
    (dir, store, app)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot`.
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Poll the job endpoint until the run reaches a terminal status.
async fn wait_for_terminal(app: &axum::Router, job_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (status, body) = get(app.clone(), &format!("/api/jobs/{job_id}")).await;
        assert_eq!(status, StatusCode::OK);
        let state = body["status"].as_str().unwrap_or_default().to_string();
        if state == "completed" || state == "failed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {job_id} never reached a terminal status");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_returns_job_id_then_run_completes() {
    let (_dir, store, app) = harness();
    store
        .insert_keyword(&Keyword::new("pickleball", KeywordIntent::Informational, 5))
        .unwrap();

    let (status, body) = post_json(app.clone(), "/api/pipeline/run", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["job_run_id"].as_str().unwrap().to_string();

    let progress = wait_for_terminal(&app, &job_id).await;
    assert_eq!(progress["status"], "completed");
    assert_eq!(progress["stage"], "done");
    assert!(progress["post_slug"].is_string());
    assert!(progress["logs"].as_array().unwrap().len() > 3);

    // The produced post is visible on the posts surface.
    let (status, posts) = get(app.clone(), "/api/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["status"], "draft");

    let slug = posts[0]["slug"].as_str().unwrap();
    let (status, detail) = get(app, &format!("/api/posts/{slug}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["content_html"].as_str().unwrap().contains("<h2"));
    assert_eq!(detail["article_schema"]["@type"], "Article");
    assert_eq!(detail["faq_schema"]["@type"], "FAQPage");
}

#[tokio::test]
async fn run_with_empty_queue_fails_the_job_not_the_request() {
    let (_dir, _store, app) = harness();

    let (status, body) = post_json(app.clone(), "/api/pipeline/run", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["job_run_id"].as_str().unwrap().to_string();

    let progress = wait_for_terminal(&app, &job_id).await;
    assert_eq!(progress["status"], "failed");
    assert!(progress["error"]
        .as_str()
        .unwrap()
        .contains("no pending keyword"));

    let (_, posts) = get(app, "/api/posts").await;
    assert!(posts.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_job_returns_404() {
    let (_dir, _store, app) = harness();
    let (status, body) = get(
        app,
        "/api/jobs/00000000-0000-0000-0000-000000000000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("job run not found"));
}

#[tokio::test]
async fn unknown_post_returns_404() {
    let (_dir, _store, app) = harness();
    let (status, _) = get(app, "/api/posts/no-such-slug").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn keyword_crud_roundtrip() {
    let (_dir, _store, app) = harness();

    let (status, created) = post_json(
        app.clone(),
        "/api/keywords",
        serde_json::json!({
            "text": "water damage restoration",
            "intent": "commercial",
            "priority": 8,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");

    let (status, list) = get(app, "/api/keywords").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["text"], "water damage restoration");
}

#[tokio::test]
async fn blank_keyword_is_rejected() {
    let (_dir, _store, app) = harness();
    let (status, body) = post_json(
        app,
        "/api/keywords",
        serde_json::json!({ "text": "   ", "intent": "informational" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("must not be empty"));
}

#[tokio::test]
async fn autopublish_override_is_honored() {
    let (_dir, store, app) = harness();
    store
        .insert_keyword(&Keyword::new("pickleball", KeywordIntent::Informational, 5))
        .unwrap();

    let (status, body) = post_json(
        app.clone(),
        "/api/pipeline/run",
        serde_json::json!({ "overrides": { "autopublish": true } }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["job_run_id"].as_str().unwrap().to_string();
    let progress = wait_for_terminal(&app, &job_id).await;
    assert_eq!(progress["status"], "completed");

    let (_, posts) = get(app, "/api/posts").await;
    assert_eq!(posts[0]["status"], "published");
    assert!(posts[0]["published_at"].is_string());
}
