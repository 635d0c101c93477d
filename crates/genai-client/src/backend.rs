use async_trait::async_trait;

use crate::error::GenError;
use crate::types::{ArticleSettings, Gen, GeneratedFaq, Outline, Polished, TopicIdea};

pub type Result<T> = std::result::Result<T, GenError>;

// ─── TextGenerator ────────────────────────────────────────────────────────

/// The generative text backend consumed by the pipeline.
///
/// Every method maps to one backend call and returns its payload wrapped in
/// a [`Gen`] envelope carrying token usage. Implementations must not retry
/// internally — failure handling belongs to the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Propose `count` article ideas for a keyword. `existing_titles` lets
    /// the backend avoid duplicating content the site already has.
    async fn generate_topics(
        &self,
        keyword: &str,
        count: usize,
        existing_titles: &[String],
    ) -> Result<Gen<Vec<TopicIdea>>>;

    /// Expand a topic title + angle into a section outline.
    async fn generate_outline(&self, topic: &str, settings: &ArticleSettings)
        -> Result<Gen<Outline>>;

    /// Write the article body (markdown) from an outline.
    async fn generate_article(
        &self,
        outline: &Outline,
        settings: &ArticleSettings,
        keyword: &str,
    ) -> Result<Gen<String>>;

    /// Produce `count` FAQ entries grounded in the article body.
    async fn generate_faq(
        &self,
        body: &str,
        keyword: &str,
        count: usize,
    ) -> Result<Gen<Vec<GeneratedFaq>>>;

    /// Final SEO polish pass over the body.
    async fn polish_for_seo(
        &self,
        body: &str,
        keyword: &str,
        secondary_keywords: &[String],
    ) -> Result<Gen<Polished>>;
}

// ─── ImageGenerator ───────────────────────────────────────────────────────

/// The generative image backend. Both methods return base64-encoded image
/// bytes ready for [`ImageStore::upload`].
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_cover_image(&self, title: &str) -> Result<String>;

    async fn generate_og_image(&self, title: &str, excerpt: &str) -> Result<String>;
}

// ─── ImageStore ───────────────────────────────────────────────────────────

/// Object storage for generated images.
///
/// `upload` returns the public URL, or `None` when the store accepted the
/// request but could not produce a URL. Callers treat both `Err` and `None`
/// as "continue without an image".
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, base64_data: &str, filename: &str) -> Result<Option<String>>;
}
