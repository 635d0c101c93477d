//! Scripted in-process backend for tests and CLI dry runs.
//!
//! [`MockBackend`] implements all three backend traits with deterministic
//! output: a fixed topic list, an article body synthesized to a target word
//! count with the keyword woven in at roughly 1% density, and canned FAQs.
//! Failures can be injected per method name to exercise error paths.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{ImageGenerator, ImageStore, Result, TextGenerator};
use crate::error::GenError;
use crate::types::{
    ArticleSettings, Gen, GeneratedFaq, Outline, Polished, TokenUsage, TopicIdea, WordCountRange,
};

/// Settings used by tests that don't care about the values.
pub fn default_settings() -> ArticleSettings {
    ArticleSettings {
        tone: "professional".into(),
        target_word_count: WordCountRange {
            min: 1200,
            max: 2000,
        },
        brand_voice: "helpful local expert".into(),
        include_examples: true,
        include_tips: true,
        internal_mentions: vec![],
    }
}

// ─── MockBackend ──────────────────────────────────────────────────────────

pub struct MockBackend {
    topics: Vec<TopicIdea>,
    article_words: usize,
    faq_count: usize,
    /// Method names that should return an error when called.
    fail_on: Vec<&'static str>,
    /// Record of backend calls, in order, by method name.
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            topics: (1..=5)
                .map(|i| TopicIdea {
                    title: format!("Generated Topic {i}: A Practical Guide"),
                    angle: format!("angle {i}"),
                    outline: vec![
                        "Why it matters".into(),
                        "Getting started".into(),
                        "Common mistakes".into(),
                        "Next steps".into(),
                    ],
                    score: 60 + i * 5,
                })
                .collect(),
            article_words: 1600,
            faq_count: 4,
            fail_on: vec![],
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_topics(mut self, topics: Vec<TopicIdea>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_article_words(mut self, words: usize) -> Self {
        self.article_words = words;
        self
    }

    pub fn with_faq_count(mut self, count: usize) -> Self {
        self.faq_count = count;
        self
    }

    /// Make the named method (`"generate_article"`, `"generate_cover_image"`,
    /// `"upload"`, ...) return an error.
    pub fn failing_on(mut self, method: &'static str) -> Self {
        self.fail_on.push(method);
        self
    }

    /// Method names called so far, in order.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(method.to_string());
        if self.fail_on.contains(&method) {
            return Err(GenError::Http(format!("injected failure in {method}")));
        }
        Ok(())
    }

    fn usage(tokens: u64) -> TokenUsage {
        TokenUsage {
            input_tokens: tokens,
            output_tokens: tokens / 2,
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Body synthesis ───────────────────────────────────────────────────────

/// Rotating filler vocabulary. Varied enough that no word repeats more than
/// a handful of times per paragraph, which keeps synthesized bodies clear of
/// the repeated-word quality check.
const FILLER: &[&str] = &[
    "players", "visitors", "options", "surface", "local", "guide", "venue", "season", "weather",
    "indoor", "outdoor", "nearby", "budget", "skill", "level", "community", "court", "practice",
    "equipment", "schedule", "booking", "weekend", "morning", "lesson", "beginner", "advanced",
    "friendly", "popular", "quality", "choice",
];

/// Build a markdown article of roughly `target_words` words containing
/// `keyword` early and at about 1% density, with one H2 per outline section.
pub fn synthesize_body(outline: &Outline, keyword: &str, target_words: usize) -> String {
    let sections = if outline.sections.is_empty() {
        vec!["Overview".to_string()]
    } else {
        outline.sections.clone()
    };
    let words_per_section = target_words / sections.len().max(1);

    let mut out = String::new();
    out.push_str(&format!(
        "When it comes to {keyword}, a little local knowledge goes a long way. \
         This guide covers what matters before you commit time or money.\n\n"
    ));

    let mut filler_idx = 0usize;
    let mut sentence_idx = 0usize;

    for section in &sections {
        out.push_str(&format!("## {section}\n\n"));
        let mut written = 0usize;
        while written < words_per_section {
            // Sentences of ~13 words; every 8th opens with the keyword,
            // which lands overall density near 1%.
            let mut sentence = Vec::with_capacity(14);
            if sentence_idx % 8 == 0 {
                sentence.push(format!("For {keyword} enthusiasts,"));
            } else {
                let w = FILLER[filler_idx % FILLER.len()];
                filler_idx += 1;
                sentence.push(format!("The {w}"));
            }
            for _ in 0..12 {
                sentence.push(FILLER[filler_idx % FILLER.len()].to_string());
                filler_idx += 1;
            }
            sentence_idx += 1;
            written += sentence.len();
            let mut line = sentence.join(" ");
            line.push('.');
            line.push(' ');
            out.push_str(&line);
            // Paragraph break every three sentences.
            if sentence_idx % 3 == 0 {
                out.push_str("\n\n");
            }
        }
        out.push_str("\n\n");
    }
    out
}

// ─── Trait impls ──────────────────────────────────────────────────────────

#[async_trait]
impl TextGenerator for MockBackend {
    async fn generate_topics(
        &self,
        _keyword: &str,
        count: usize,
        existing_titles: &[String],
    ) -> Result<Gen<Vec<TopicIdea>>> {
        self.record("generate_topics")?;
        let data: Vec<TopicIdea> = self
            .topics
            .iter()
            .filter(|t| !existing_titles.contains(&t.title))
            .take(count)
            .cloned()
            .collect();
        Ok(Gen {
            data,
            token_usage: Self::usage(200),
        })
    }

    async fn generate_outline(
        &self,
        topic: &str,
        _settings: &ArticleSettings,
    ) -> Result<Gen<Outline>> {
        self.record("generate_outline")?;
        Ok(Gen {
            data: Outline {
                title: topic.to_string(),
                sections: vec![
                    "Why it matters".into(),
                    "Getting started".into(),
                    "Common mistakes".into(),
                    "Next steps".into(),
                ],
            },
            token_usage: Self::usage(300),
        })
    }

    async fn generate_article(
        &self,
        outline: &Outline,
        _settings: &ArticleSettings,
        keyword: &str,
    ) -> Result<Gen<String>> {
        self.record("generate_article")?;
        Ok(Gen {
            data: synthesize_body(outline, keyword, self.article_words),
            token_usage: Self::usage(2000),
        })
    }

    async fn generate_faq(
        &self,
        _body: &str,
        keyword: &str,
        count: usize,
    ) -> Result<Gen<Vec<GeneratedFaq>>> {
        self.record("generate_faq")?;
        let n = self.faq_count.min(count);
        Ok(Gen {
            data: (1..=n)
                .map(|i| GeneratedFaq {
                    question: format!("Question {i} about {keyword}?"),
                    answer: format!(
                        "A short practical answer covering point {i} for {keyword} readers."
                    ),
                })
                .collect(),
            token_usage: Self::usage(400),
        })
    }

    async fn polish_for_seo(
        &self,
        body: &str,
        _keyword: &str,
        _secondary_keywords: &[String],
    ) -> Result<Gen<Polished>> {
        self.record("polish_for_seo")?;
        Ok(Gen {
            data: Polished {
                content: body.to_string(),
            },
            token_usage: Self::usage(500),
        })
    }
}

#[async_trait]
impl ImageGenerator for MockBackend {
    async fn generate_cover_image(&self, _title: &str) -> Result<String> {
        self.record("generate_cover_image")?;
        Ok("bW9jay1jb3Zlcg==".to_string())
    }

    async fn generate_og_image(&self, _title: &str, _excerpt: &str) -> Result<String> {
        self.record("generate_og_image")?;
        Ok("bW9jay1vZw==".to_string())
    }
}

#[async_trait]
impl ImageStore for MockBackend {
    async fn upload(&self, _base64_data: &str, filename: &str) -> Result<Option<String>> {
        self.record("upload")?;
        Ok(Some(format!("https://images.example.com/{filename}")))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
