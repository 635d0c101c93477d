//! Quality gate: scores finished content against measurable rules and
//! decides autopublish eligibility.
//!
//! The evaluator is a pure function of content + metadata. Gate failures are
//! data, not errors: a low score or a failed check never aborts a pipeline
//! run — it only forces the post to land as a draft. The duplicate check is
//! the one store-dependent input, so the caller resolves it up front and
//! passes the result in.

use serde::{Deserialize, Serialize};

use crate::markdown;
use crate::seo::{self, SeoData};
use crate::types::Faq;

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRequirements {
    #[serde(default = "default_min_words")]
    pub min_word_count: usize,
    #[serde(default = "default_max_words")]
    pub max_word_count: usize,
    #[serde(default = "default_min_headings")]
    pub min_headings: usize,
    #[serde(default = "default_min_faqs")]
    pub min_faqs: usize,
    /// Percentage, e.g. 2.5 means 2.5%.
    #[serde(default = "default_max_density")]
    pub max_keyword_density: f64,
    #[serde(default = "default_min_density")]
    pub min_keyword_density: f64,
}

fn default_min_words() -> usize {
    1200
}

fn default_max_words() -> usize {
    3500
}

fn default_min_headings() -> usize {
    3
}

fn default_min_faqs() -> usize {
    3
}

fn default_max_density() -> f64 {
    2.5
}

fn default_min_density() -> f64 {
    0.5
}

impl Default for QualityRequirements {
    fn default() -> Self {
        Self {
            min_word_count: default_min_words(),
            max_word_count: default_max_words(),
            min_headings: default_min_headings(),
            min_faqs: default_min_faqs(),
            max_keyword_density: default_max_density(),
            min_keyword_density: default_min_density(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed scan lists
// ---------------------------------------------------------------------------

const SPAM_PHRASES: &[&str] = &[
    "buy now",
    "click here",
    "limited time offer",
    "act now",
    "100% free",
    "guaranteed results",
    "risk free",
    "make money fast",
    "double your",
    "once in a lifetime",
];

const PLACEHOLDER_PHRASES: &[&str] = &[
    "lorem ipsum",
    "[insert",
    "tbd",
    "to be determined",
    "coming soon",
    "placeholder",
    "fill in",
    "xxx",
];

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of a quality evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// 0-100, starting at 100 with fixed penalties per failed check.
    pub score: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub word_count: usize,
    pub heading_count: usize,
    /// Flesch Reading Ease, clamped to [0, 100].
    pub readability: f64,
}

impl QualityReport {
    /// Hard floors for autopublish, independent of the raw score: no errors,
    /// score at least 60, at least 800 words, at least 2 headings.
    pub fn meets_publishing_requirements(&self) -> bool {
        self.errors.is_empty()
            && self.score >= 60
            && self.word_count >= 800
            && self.heading_count >= 2
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Score `content` against `requirements`. `duplicate_found` is the result
/// of the store's slug/title duplicate lookup, resolved by the caller.
pub fn evaluate(
    content: &str,
    seo_data: &SeoData,
    faqs: &[Faq],
    requirements: &QualityRequirements,
    duplicate_found: bool,
) -> QualityReport {
    let mut score: i64 = 100;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let word_count = markdown::word_count(content);
    let heading_count = markdown::headings(content).len();

    if word_count < requirements.min_word_count {
        errors.push(format!(
            "word count {} below minimum {}",
            word_count, requirements.min_word_count
        ));
        score -= 20;
    } else if word_count > requirements.max_word_count {
        warnings.push(format!(
            "word count {} above maximum {}",
            word_count, requirements.max_word_count
        ));
        score -= 5;
    }

    if heading_count < requirements.min_headings {
        errors.push(format!(
            "only {} headings, need at least {}",
            heading_count, requirements.min_headings
        ));
        score -= 15;
    }

    if faqs.len() < requirements.min_faqs {
        errors.push(format!(
            "only {} FAQs, need at least {}",
            faqs.len(),
            requirements.min_faqs
        ));
        score -= 10;
    } else if faqs.len() > 8 {
        warnings.push(format!("{} FAQs is more than readers need", faqs.len()));
    }

    let density = seo::keyword_density(content, &seo_data.primary_keyword);
    if density > requirements.max_keyword_density {
        errors.push(format!(
            "keyword density {density:.2}% above maximum {:.2}%",
            requirements.max_keyword_density
        ));
        score -= 25;
    } else if density < requirements.min_keyword_density {
        warnings.push(format!(
            "keyword density {density:.2}% below minimum {:.2}%",
            requirements.min_keyword_density
        ));
        score -= 5;
    }

    // SEO validation caps the score but keeps its own error/warning lists.
    let seo_report = seo::validate(content, seo_data);
    score = score.min(seo_report.score as i64);

    let content_lower = content.to_lowercase();
    for phrase in SPAM_PHRASES {
        if content_lower.contains(phrase) {
            errors.push(format!("spam phrase detected: \"{phrase}\""));
            score -= 10;
        }
    }
    if content.matches('!').count() > 5 {
        errors.push("excessive exclamation marks".to_string());
        score -= 10;
    }
    if has_consecutive_caps(content, 3) {
        errors.push("shouting detected (3+ consecutive ALL-CAPS words)".to_string());
        score -= 10;
    }
    for (word, count) in repeated_words_by_paragraph(content) {
        errors.push(format!("word \"{word}\" repeated {count} times in one paragraph"));
        score -= 10;
    }

    for phrase in PLACEHOLDER_PHRASES {
        if content_lower.contains(phrase) {
            errors.push(format!("placeholder text detected: \"{phrase}\""));
            score -= 15;
        }
    }
    if trailing_ellipsis_sentences(content) >= 3 {
        errors.push("3+ sentences trail off with \"...\"".to_string());
        score -= 15;
    }

    if duplicate_found {
        errors.push("duplicate slug or title already exists".to_string());
        score -= 30;
    }

    let readability = flesch_reading_ease(content);
    if readability < 40.0 {
        warnings.push(format!(
            "readability score {readability:.1} is hard to read"
        ));
        score -= 5;
    }

    QualityReport {
        score: score.clamp(0, 100) as u32,
        errors,
        warnings,
        word_count,
        heading_count,
        readability,
    }
}

// ---------------------------------------------------------------------------
// Scan helpers
// ---------------------------------------------------------------------------

/// `run_len` or more consecutive all-uppercase words of 2+ letters.
fn has_consecutive_caps(content: &str, run_len: usize) -> bool {
    let mut run = 0;
    for token in content.split_whitespace() {
        let letters: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase()) {
            run += 1;
            if run >= run_len {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// First word (>3 chars) repeated more than 5 times within a blank-line
/// paragraph of more than 20 words. At most one hit per paragraph.
fn repeated_words_by_paragraph(content: &str) -> Vec<(String, usize)> {
    let mut hits = Vec::new();
    for paragraph in content.split("\n\n") {
        let words: Vec<String> = paragraph
            .split_whitespace()
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .collect();
        if words.len() <= 20 {
            continue;
        }
        for (i, word) in words.iter().enumerate() {
            if word.len() <= 3 {
                continue;
            }
            // Only report at the word's first occurrence.
            if words[..i].contains(word) {
                continue;
            }
            let count = words.iter().filter(|w| *w == word).count();
            if count > 5 {
                hits.push((word.clone(), count));
                break;
            }
        }
    }
    hits
}

/// Count `...` occurrences that end a sentence: followed by end of text, a
/// newline, or whitespace and an uppercase start of the next sentence.
/// Mid-sentence pauses ("wait... and wait") do not count.
fn trailing_ellipsis_sentences(content: &str) -> usize {
    let mut count = 0;
    let mut from = 0;
    while let Some(pos) = content[from..].find("...") {
        let mut end = from + pos + 3;
        while content[end..].starts_with('.') {
            end += 1;
        }
        let rest = &content[end..];
        let ends_sentence = match rest.chars().next() {
            None => true,
            Some('\n') => true,
            Some(c) if c.is_whitespace() => rest
                .trim_start()
                .chars()
                .next()
                .map_or(true, |next| next.is_uppercase()),
            Some(_) => false,
        };
        if ends_sentence {
            count += 1;
        }
        from = end;
    }
    count
}

// ---------------------------------------------------------------------------
// Readability
// ---------------------------------------------------------------------------

/// Vowel-group syllable estimate with silent-e and "-le" adjustments.
fn syllables(word: &str) -> usize {
    let w: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if w.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut prev_vowel = false;
    for c in w.chars() {
        let vowel = "aeiouy".contains(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    // Silent trailing e, except "-le" endings ("table", "little") where the
    // e carries the syllable.
    if w.ends_with('e') && !w.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

/// Simplified Flesch Reading Ease, clamped to [0, 100].
pub fn flesch_reading_ease(content: &str) -> f64 {
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let sentences = content
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let total_syllables: usize = words.iter().map(|w| syllables(w)).sum();
    let avg_sentence_len = words.len() as f64 / sentences as f64;
    let avg_syllables = total_syllables as f64 / words.len() as f64;
    (206.835 - 1.015 * avg_sentence_len - 84.6 * avg_syllables).clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
