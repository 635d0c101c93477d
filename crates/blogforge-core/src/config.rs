//! Pipeline configuration.
//!
//! Loaded once by the caller (CLI flag or server startup) and passed into
//! the pipeline explicitly — there is no process-global settings cache.
//! Call-time overrides arrive as an all-`Option` [`ConfigOverrides`] and are
//! merged field-by-field over the stored config.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::quality::QualityRequirements;
use genai_client::{ArticleSettings, InternalMention, WordCountRange};

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// When true, a post that meets the publishing floors is created as
    /// `published` instead of `draft`.
    #[serde(default)]
    pub autopublish: bool,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_word_count")]
    pub target_word_count: WordCountRange,
    #[serde(default = "default_brand_voice")]
    pub brand_voice: String,
    #[serde(default = "default_true")]
    pub include_examples: bool,
    #[serde(default = "default_true")]
    pub include_tips: bool,
    /// Cap on inline internal links per article.
    #[serde(default = "default_max_links")]
    pub max_internal_links: usize,
    /// Absolute site origin used for canonical URLs, e.g. `https://example.com`.
    #[serde(default = "default_base_url")]
    pub site_base_url: String,
    #[serde(default)]
    pub quality: QualityRequirements,
}

fn default_tone() -> String {
    "professional".to_string()
}

fn default_word_count() -> WordCountRange {
    WordCountRange {
        min: 1200,
        max: 2000,
    }
}

fn default_brand_voice() -> String {
    "helpful local expert".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_links() -> usize {
    7
}

fn default_base_url() -> String {
    "https://example.com".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            autopublish: false,
            tone: default_tone(),
            target_word_count: default_word_count(),
            brand_voice: default_brand_voice(),
            include_examples: true,
            include_tips: true,
            max_internal_links: default_max_links(),
            site_base_url: default_base_url(),
            quality: QualityRequirements::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Apply call-time overrides on top of this config.
    pub fn merged(&self, overrides: &ConfigOverrides) -> Self {
        let mut cfg = self.clone();
        if let Some(v) = overrides.autopublish {
            cfg.autopublish = v;
        }
        if let Some(v) = &overrides.tone {
            cfg.tone = v.clone();
        }
        if let Some(v) = overrides.target_word_count {
            cfg.target_word_count = v;
        }
        if let Some(v) = &overrides.brand_voice {
            cfg.brand_voice = v.clone();
        }
        if let Some(v) = overrides.include_examples {
            cfg.include_examples = v;
        }
        if let Some(v) = overrides.include_tips {
            cfg.include_tips = v;
        }
        if let Some(v) = overrides.max_internal_links {
            cfg.max_internal_links = v;
        }
        cfg
    }

    /// The settings block forwarded to the text backend, with the advisory
    /// internal-mention context for this run.
    pub fn article_settings(&self, internal_mentions: Vec<InternalMention>) -> ArticleSettings {
        ArticleSettings {
            tone: self.tone.clone(),
            target_word_count: self.target_word_count,
            brand_voice: self.brand_voice.clone(),
            include_examples: self.include_examples,
            include_tips: self.include_tips,
            internal_mentions,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigOverrides
// ---------------------------------------------------------------------------

/// Call-time overrides for a single run. Every field is optional; `None`
/// keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub autopublish: Option<bool>,
    pub tone: Option<String>,
    pub target_word_count: Option<WordCountRange>,
    pub brand_voice: Option<String>,
    pub include_examples: Option<bool>,
    pub include_tips: Option<bool>,
    pub max_internal_links: Option<usize>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
