//! `genai-client` — typed interface to the generative text/image backend.
//!
//! The blog pipeline consumes three capabilities: text generation (topics,
//! outlines, article bodies, FAQs, SEO polish), image generation (cover and
//! Open Graph images as base64), and image storage (upload, returning a
//! public URL). Each is a trait here so the orchestrator stays independent
//! of the concrete backend:
//!
//! ```text
//! TextGenerator / ImageGenerator / ImageStore   ← traits (backend.rs)
//!     │
//!     ├── HttpBackend   ← JSON-over-HTTP client (http.rs)
//!     └── MockBackend   ← scripted backend for tests + dry runs (mock.rs)
//! ```
//!
//! Every text call returns a [`Gen`] envelope carrying [`TokenUsage`] so the
//! pipeline can account for cumulative spend per run.

pub mod backend;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use backend::{ImageGenerator, ImageStore, TextGenerator};
pub use error::GenError;
pub use http::HttpBackend;
pub use mock::MockBackend;
pub use types::{
    ArticleSettings, Gen, GeneratedFaq, InternalMention, MentionKind, Outline, Polished,
    TokenUsage, TopicIdea, WordCountRange,
};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, GenError>;
