//! Persistent domain records for the directory site's content pipeline.
//!
//! `Keyword → Topic → Post` is the pipeline's spine: a keyword is imported
//! by an admin, topics are ideated from it, and exactly one post is created
//! per successful run. `InsertedLink` and `PostKeyword` are the join records
//! the run writes alongside the post. `Business` is a read-only snapshot of
//! a directory listing, queried by the internal linker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Keyword
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordIntent {
    Informational,
    Transactional,
    Navigational,
    Commercial,
}

/// Lifecycle of a keyword in the generation queue.
///
/// The pipeline only ever moves `Pending → Used` (on the success path);
/// `Skipped` and `Exhausted` are set by admin tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStatus {
    Pending,
    Used,
    Skipped,
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<Uuid>,
    pub text: String,
    pub intent: KeywordIntent,
    pub priority: i32,
    pub status: KeywordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_count: u32,
}

impl Keyword {
    pub fn new(text: impl Into<String>, intent: KeywordIntent, priority: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_id: None,
            text: text.into(),
            intent,
            priority,
            status: KeywordStatus::Pending,
            last_used_at: None,
            usage_count: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    Pending,
    Approved,
    Rejected,
    Used,
}

/// A concrete article idea derived from a keyword. One keyword may carry
/// many candidates; the pipeline uses the highest-scoring one per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub keyword_id: Uuid,
    pub title: String,
    pub angle: String,
    #[serde(default)]
    pub outline: Vec<String>,
    /// Fit score 0-100 assigned at ideation time.
    pub score: u32,
    pub status: TopicStatus,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Generated article content in flight between the backend calls and the
/// persisted [`Post`]. Never stored on its own.
#[derive(Debug, Clone)]
pub struct ArticleContent {
    pub outline: genai_client::Outline,
    pub body_markdown: String,
    pub faqs: Vec<Faq>,
    pub token_usage: genai_client::TokenUsage,
}

/// One table-of-contents entry, extracted from the final markdown headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// The terminal artifact of a pipeline run. Slug is globally unique;
/// collisions are resolved by numeric suffixing before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content_markdown: String,
    pub content_html: String,
    pub seo_title: String,
    pub meta_description: String,
    pub canonical_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image_url: Option<String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
    pub reading_time_minutes: u32,
    pub word_count: usize,
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Link records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Post,
    Business,
}

/// A candidate internal-link target, recomputed per run and never stored.
/// Links that are actually written become [`InsertedLink`] records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSuggestion {
    pub target_id: Uuid,
    pub target_slug: String,
    pub target_title: String,
    pub anchor_text: String,
    /// 0-100, strategy-specific arithmetic.
    pub relevance_score: u32,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    pub kind: TargetKind,
}

/// One row per hyperlink the linker actually wrote into the markdown.
/// Exactly one of `target_post_id` / `target_business_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertedLink {
    pub id: Uuid,
    pub source_post_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_post_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_business_id: Option<Uuid>,
    pub anchor_text: String,
    /// Byte offset of the link in the final markdown.
    pub position: usize,
}

/// Post ↔ keyword join record; the run's selected keyword is `is_primary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostKeyword {
    pub post_id: Uuid,
    pub keyword_id: Uuid,
    pub is_primary: bool,
}

// ---------------------------------------------------------------------------
// Business
// ---------------------------------------------------------------------------

/// Read-only snapshot of a directory listing. Ingestion is owned by the
/// places scripts; the pipeline only reads these for link discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub city: String,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
