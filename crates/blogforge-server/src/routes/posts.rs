use axum::extract::{Path, State};
use axum::Json;

use blogforge_core::seo;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/posts — post summaries, newest first.
pub async fn list_posts(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let posts = store.list_posts()?;
        let list: Vec<serde_json::Value> = posts
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "title": p.title,
                    "slug": p.slug,
                    "excerpt": p.excerpt,
                    "status": p.status,
                    "word_count": p.word_count,
                    "reading_time_minutes": p.reading_time_minutes,
                    "published_at": p.published_at,
                    "created_at": p.created_at,
                })
            })
            .collect();
        Ok::<_, blogforge_core::BlogError>(serde_json::json!(list))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/posts/{slug} — full post detail plus JSON-LD objects.
pub async fn get_post(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let post = store.post_by_slug(&slug)?;
        let links = store.links_for_post(post.id)?;
        Ok::<_, blogforge_core::BlogError>(serde_json::json!({
            "id": post.id,
            "topic_id": post.topic_id,
            "title": post.title,
            "slug": post.slug,
            "excerpt": post.excerpt,
            "content_markdown": post.content_markdown,
            "content_html": post.content_html,
            "seo_title": post.seo_title,
            "meta_description": post.meta_description,
            "canonical_url": post.canonical_url,
            "cover_image_url": post.cover_image_url,
            "og_image_url": post.og_image_url,
            "faqs": post.faqs,
            "toc": post.toc,
            "reading_time_minutes": post.reading_time_minutes,
            "word_count": post.word_count,
            "status": post.status,
            "published_at": post.published_at,
            "created_at": post.created_at,
            "inserted_links": links,
            "article_schema": seo::article_schema(&post),
            "faq_schema": seo::faq_schema(&post.faqs),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
