use serde::{Deserialize, Serialize};

// ─── Token accounting ─────────────────────────────────────────────────────

/// Token usage reported by the text backend for a single call.
///
/// The pipeline sums these across its four generation calls and stores the
/// total on the job run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

// ─── Generation envelope ──────────────────────────────────────────────────

/// Payload + token usage returned by every text-generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gen<T> {
    pub data: T,
    #[serde(default)]
    pub token_usage: TokenUsage,
}

// ─── Topic ideation ───────────────────────────────────────────────────────

/// A candidate article idea produced by `generate_topics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicIdea {
    pub title: String,
    pub angle: String,
    #[serde(default)]
    pub outline: Vec<String>,
    /// Backend's self-assessed fit for the keyword, 0-100.
    #[serde(default)]
    pub score: u32,
}

// ─── Article settings ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCountRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    Post,
    Business,
}

/// An entity the article may naturally mention. Advisory context only —
/// the backend is never required to include these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalMention {
    pub title: String,
    pub kind: MentionKind,
}

/// Settings forwarded to the text backend with every article-body call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSettings {
    pub tone: String,
    pub target_word_count: WordCountRange,
    pub brand_voice: String,
    pub include_examples: bool,
    pub include_tips: bool,
    #[serde(default)]
    pub internal_mentions: Vec<InternalMention>,
}

// ─── Outline / FAQ ────────────────────────────────────────────────────────

/// Section plan for an article body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFaq {
    pub question: String,
    pub answer: String,
}

// ─── Polish result ────────────────────────────────────────────────────────

/// Result of the final SEO polish pass over an article body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polished {
    pub content: String,
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_add_accumulates() {
        let mut total = TokenUsage::default();
        total.add(TokenUsage {
            input_tokens: 100,
            output_tokens: 40,
        });
        total.add(TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        });
        assert_eq!(total.input_tokens, 110);
        assert_eq!(total.output_tokens, 45);
        assert_eq!(total.total(), 155);
    }

    #[test]
    fn gen_envelope_defaults_token_usage() {
        let json = r#"{"data": "hello"}"#;
        let gen: Gen<String> = serde_json::from_str(json).unwrap();
        assert_eq!(gen.data, "hello");
        assert_eq!(gen.token_usage, TokenUsage::default());
    }

    #[test]
    fn topic_idea_roundtrip() {
        let idea = TopicIdea {
            title: "Indoor Pickleball Courts: A Complete Guide".into(),
            angle: "beginner-friendly venue guide".into(),
            outline: vec!["What to look for".into(), "Cost breakdown".into()],
            score: 82,
        };
        let json = serde_json::to_string(&idea).unwrap();
        let parsed: TopicIdea = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.title, idea.title);
        assert_eq!(parsed.score, 82);
        assert_eq!(parsed.outline.len(), 2);
    }

    #[test]
    fn article_settings_json_shape() {
        let settings = ArticleSettings {
            tone: "professional".into(),
            target_word_count: WordCountRange {
                min: 1200,
                max: 2000,
            },
            brand_voice: "helpful local expert".into(),
            include_examples: true,
            include_tips: false,
            internal_mentions: vec![InternalMention {
                title: "Best Paddles 2026".into(),
                kind: MentionKind::Post,
            }],
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"kind\":\"post\""));
        let parsed: ArticleSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.internal_mentions.len(), 1);
        assert_eq!(parsed.target_word_count.min, 1200);
    }
}
