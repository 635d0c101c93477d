//! SEO processing: title/meta validation, keyword density, heading
//! structure, slug generation, and schema.org object construction.
//!
//! Keyword density is a deliberately approximate heuristic — substring
//! counting, not NLP — and its exact arithmetic is load-bearing: the quality
//! gate's density bounds are calibrated against it.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::markdown;
use crate::types::{Faq, Post};

pub const TITLE_MIN: usize = 30;
pub const TITLE_MAX: usize = 60;
pub const META_MIN: usize = 70;
pub const META_MAX: usize = 160;
pub const DENSITY_MIN: f64 = 0.5;
pub const DENSITY_MAX: f64 = 2.5;

// ---------------------------------------------------------------------------
// SeoData
// ---------------------------------------------------------------------------

/// The metadata bundle the pipeline computes for a post, evaluated by
/// [`validate`] and the quality gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoData {
    pub seo_title: String,
    pub meta_description: String,
    pub slug: String,
    pub primary_keyword: String,
    pub canonical_url: String,
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub valid: bool,
    pub reason: Option<String>,
}

impl FieldCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

pub fn validate_title(title: &str) -> FieldCheck {
    let len = title.chars().count();
    if title.trim().is_empty() {
        FieldCheck::fail("title is empty")
    } else if len > TITLE_MAX {
        FieldCheck::fail(format!("title is {len} chars, max {TITLE_MAX}"))
    } else if len < TITLE_MIN {
        FieldCheck::fail(format!("title is {len} chars, min {TITLE_MIN}"))
    } else {
        FieldCheck::ok()
    }
}

pub fn validate_meta_description(meta: &str) -> FieldCheck {
    let len = meta.chars().count();
    if meta.trim().is_empty() {
        FieldCheck::fail("meta description is empty")
    } else if len > META_MAX {
        FieldCheck::fail(format!("meta description is {len} chars, max {META_MAX}"))
    } else if len < META_MIN {
        FieldCheck::fail(format!("meta description is {len} chars, min {META_MIN}"))
    } else {
        FieldCheck::ok()
    }
}

// ---------------------------------------------------------------------------
// Keyword density
// ---------------------------------------------------------------------------

/// Approximate keyword density as a percentage of total words.
///
/// Single-word keyword: substring-inclusive occurrence count ÷ total words.
/// Multi-word phrase: phrase matches × phrase word count ÷ total words.
pub fn keyword_density(content: &str, keyword: &str) -> f64 {
    let total_words = markdown::word_count(content);
    if total_words == 0 || keyword.trim().is_empty() {
        return 0.0;
    }
    let content_lower = content.to_lowercase();
    let keyword_lower = keyword.trim().to_lowercase();
    let phrase_words = keyword_lower.split_whitespace().count();
    let matches = content_lower.matches(&keyword_lower).count();
    (matches * phrase_words) as f64 / total_words as f64 * 100.0
}

// ---------------------------------------------------------------------------
// Heading structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeadingIssue {
    /// Literal H1 inside the body — the post title renders as the page H1.
    BodyH1 { text: String },
    /// Heading level jumped, e.g. H2 → H4.
    SkippedLevel { from: u8, to: u8 },
    /// Fewer than two H2 section headings.
    TooFewSections { found: usize },
}

pub fn analyze_headings(body_markdown: &str) -> Vec<HeadingIssue> {
    let headings = markdown::headings(body_markdown);
    let mut issues = Vec::new();

    for (level, text) in &headings {
        if *level == 1 {
            issues.push(HeadingIssue::BodyH1 { text: text.clone() });
        }
    }

    let mut prev: Option<u8> = None;
    for (level, _) in &headings {
        if let Some(p) = prev {
            if *level > p + 1 {
                issues.push(HeadingIssue::SkippedLevel {
                    from: p,
                    to: *level,
                });
            }
        }
        prev = Some(*level);
    }

    let h2_count = headings.iter().filter(|(l, _)| *l == 2).count();
    if h2_count < 2 {
        issues.push(HeadingIssue::TooFewSections { found: h2_count });
    }

    issues
}

// ---------------------------------------------------------------------------
// Full validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoReport {
    /// 0-100; starts at 100 and loses fixed penalties per failed check.
    pub score: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// True iff there are zero hard errors. Warnings never affect validity.
    pub is_valid: bool,
}

/// Aggregate SEO validation over the final content + metadata.
pub fn validate(content: &str, seo: &SeoData) -> SeoReport {
    let mut score: i32 = 100;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let keyword_lower = seo.primary_keyword.to_lowercase();

    let title = validate_title(&seo.seo_title);
    if !title.valid {
        errors.push(title.reason.unwrap_or_else(|| "invalid title".into()));
        score -= 15;
    }

    let meta = validate_meta_description(&seo.meta_description);
    if !meta.valid {
        errors.push(meta.reason.unwrap_or_else(|| "invalid meta description".into()));
        score -= 15;
    }

    if !seo.seo_title.to_lowercase().contains(&keyword_lower) {
        errors.push(format!("keyword '{}' missing from title", seo.primary_keyword));
        score -= 10;
    }

    if !seo.meta_description.to_lowercase().contains(&keyword_lower) {
        warnings.push(format!(
            "keyword '{}' missing from meta description",
            seo.primary_keyword
        ));
        score -= 5;
    }

    let density = keyword_density(content, &seo.primary_keyword);
    if density > DENSITY_MAX {
        errors.push(format!(
            "keyword density {density:.2}% looks like stuffing (max {DENSITY_MAX}%)"
        ));
        score -= 20;
    } else if density < DENSITY_MIN {
        warnings.push(format!(
            "keyword density {density:.2}% is low (min {DENSITY_MIN}%)"
        ));
        score -= 10;
    }

    for issue in analyze_headings(content) {
        warnings.push(match &issue {
            HeadingIssue::BodyH1 { text } => format!("H1 in body: '{text}'"),
            HeadingIssue::SkippedLevel { from, to } => {
                format!("heading level skipped: H{from} → H{to}")
            }
            HeadingIssue::TooFewSections { found } => {
                format!("only {found} H2 heading(s), want at least 2")
            }
        });
        score -= 5;
    }

    if seo.slug.chars().count() < 3 {
        errors.push(format!("slug '{}' is too short", seo.slug));
        score -= 10;
    }

    let first_100: String = content
        .split_whitespace()
        .take(100)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if !first_100.contains(&keyword_lower) {
        warnings.push(format!(
            "keyword '{}' missing from the first 100 words",
            seo.primary_keyword
        ));
        score -= 5;
    }

    SeoReport {
        score: score.clamp(0, 100) as u32,
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Slug generation
// ---------------------------------------------------------------------------

/// Lowercase-hyphen slug from a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Unique slug against an existing set: `water-damage`, then `water-damage-1`,
/// `water-damage-2`, ... until free.
pub fn generate_slug(title: &str, existing: &[String]) -> String {
    let base = slugify(title);
    if !existing.iter().any(|s| s == &base) {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !existing.iter().any(|s| s == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub fn canonical_url(base_url: &str, slug: &str) -> String {
    format!("{}/blog/{slug}", base_url.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Title / description optimization
// ---------------------------------------------------------------------------

fn truncate_at_whitespace(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    // Leave room for the ellipsis.
    let cut: String = text.chars().take(limit.saturating_sub(3)).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) => cut[..idx].trim_end(),
        None => cut.trim_end(),
    };
    format!("{trimmed}...")
}

fn optimize_field(value: &str, keyword: &str, max: usize) -> String {
    let has_keyword = value.to_lowercase().contains(&keyword.to_lowercase());
    if has_keyword && value.chars().count() <= max {
        return value.to_string();
    }
    let candidate = if has_keyword {
        value.to_string()
    } else {
        format!("{keyword} - {value}")
    };
    truncate_at_whitespace(&candidate, max)
}

/// Ensure the keyword appears and the result fits in the title window.
pub fn optimize_title(title: &str, keyword: &str) -> String {
    optimize_field(title, keyword, TITLE_MAX)
}

/// Ensure the keyword appears and the result fits in the meta window.
pub fn optimize_description(description: &str, keyword: &str) -> String {
    optimize_field(description, keyword, META_MAX)
}

// ---------------------------------------------------------------------------
// Schema.org objects
// ---------------------------------------------------------------------------

/// JSON-LD `Article` object for a post.
pub fn article_schema(post: &Post) -> serde_json::Value {
    json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": post.seo_title,
        "description": post.meta_description,
        "url": post.canonical_url,
        "image": post.cover_image_url,
        "datePublished": post.published_at,
        "wordCount": post.word_count,
    })
}

/// JSON-LD `FAQPage` object from the post's FAQ list.
pub fn faq_schema(faqs: &[Faq]) -> serde_json::Value {
    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": faqs.iter().map(|f| json!({
            "@type": "Question",
            "name": f.question,
            "acceptedAnswer": { "@type": "Answer", "text": f.answer },
        })).collect::<Vec<_>>(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn seo(title: &str, meta: &str, slug: &str, keyword: &str) -> SeoData {
        SeoData {
            seo_title: title.to_string(),
            meta_description: meta.to_string(),
            slug: slug.to_string(),
            primary_keyword: keyword.to_string(),
            canonical_url: format!("https://example.com/blog/{slug}"),
        }
    }

    #[test]
    fn title_window_is_30_to_60() {
        assert!(!validate_title("").valid);
        assert!(!validate_title("short title").valid);
        assert!(validate_title("A Perfectly Sized Title About Pickleball Courts").valid);
        assert!(!validate_title(&"x".repeat(61)).valid);
        assert!(validate_title(&"x".repeat(60)).valid);
    }

    #[test]
    fn meta_window_is_70_to_160() {
        assert!(!validate_meta_description("").valid);
        assert!(!validate_meta_description(&"m".repeat(69)).valid);
        assert!(validate_meta_description(&"m".repeat(70)).valid);
        assert!(validate_meta_description(&"m".repeat(160)).valid);
        assert!(!validate_meta_description(&"m".repeat(161)).valid);
    }

    #[test]
    fn single_word_density_is_substring_inclusive() {
        // 2 occurrences / 3 words = 66.67% — the documented approximate
        // arithmetic, not a linguistic definition.
        let density = keyword_density("cat cat dog", "cat");
        assert!((density - 66.666_666).abs() < 0.01, "got {density}");
        // "concatenate" contains "cat" as a substring and counts.
        let density = keyword_density("concatenate dog dog dog", "cat");
        assert!((density - 25.0).abs() < 0.01, "got {density}");
    }

    #[test]
    fn phrase_density_weights_by_phrase_length() {
        // 1 match × 2 words / 4 total = 50%
        let density = keyword_density("water damage is bad", "water damage");
        assert!((density - 50.0).abs() < 0.01, "got {density}");
    }

    #[test]
    fn density_of_empty_content_is_zero() {
        assert_eq!(keyword_density("", "cat"), 0.0);
        assert_eq!(keyword_density("cat", ""), 0.0);
    }

    #[test]
    fn heading_skip_detected_h2_to_h4_but_not_h2_to_h3() {
        let skipped = analyze_headings("## A\n#### B");
        assert!(skipped
            .iter()
            .any(|i| matches!(i, HeadingIssue::SkippedLevel { from: 2, to: 4 })));

        let ok = analyze_headings("## A\n### B\n## C");
        assert!(!ok
            .iter()
            .any(|i| matches!(i, HeadingIssue::SkippedLevel { .. })));
    }

    #[test]
    fn body_h1_and_too_few_h2_flagged() {
        let issues = analyze_headings("# Top\n\nsome text");
        assert!(issues.iter().any(|i| matches!(i, HeadingIssue::BodyH1 { .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, HeadingIssue::TooFewSections { found: 0 })));
    }

    #[test]
    fn generate_slug_suffixes_until_unique() {
        let existing = vec!["water-damage".to_string(), "water-damage-1".to_string()];
        assert_eq!(generate_slug("Water Damage", &existing), "water-damage-2");
        assert_eq!(generate_slug("Water Damage", &[]), "water-damage");
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("What's Next? A Guide!"), "what-s-next-a-guide");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }

    #[test]
    fn optimize_title_keeps_good_titles_unchanged() {
        let title = "Pickleball Court Costs: A Complete Breakdown";
        assert_eq!(optimize_title(title, "pickleball"), title);
    }

    #[test]
    fn optimize_title_prepends_missing_keyword() {
        let out = optimize_title("A Complete Cost Breakdown for 2026", "pickleball");
        assert!(out.to_lowercase().starts_with("pickleball"));
        assert!(out.chars().count() <= TITLE_MAX);
    }

    #[test]
    fn optimize_title_truncates_with_ellipsis() {
        let long = "An Extremely Long Title That Goes On And On About Court Construction Costs";
        let out = optimize_title(long, "court");
        assert!(out.chars().count() <= TITLE_MAX);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn validate_perfect_input_scores_100() {
        // One keyword phrase match in ~150 words keeps density inside the
        // 0.5-2.5% window.
        let filler = "the crew assessed each room and noted moisture readings before \
                      starting any drying equipment placement across affected floors "
            .repeat(6);
        let content = format!(
            "Water damage cleanup starts with a fast assessment of every room.\n\n\
             ## First Steps\n\n{filler}\n\n## Insurance\n\nCall your provider early \
             and keep photos of everything the crew removes from the property."
        );
        let data = seo(
            "Water Damage Cleanup: First Steps That Matter",
            "Learn how water damage cleanup works, what it costs, and how to file \
             an insurance claim without delays or unpleasant surprises.",
            "water-damage-cleanup-first-steps",
            "water damage",
        );
        let report = validate(&content, &data);
        assert!(report.is_valid, "errors: {:?}", report.errors);
        assert_eq!(report.score, 100, "warnings: {:?}", report.warnings);
    }

    #[test]
    fn validate_penalizes_missing_keyword_in_title() {
        let content = "Water damage restoration starts here.\n\n## A\n\nx.\n\n## B\n\ny.";
        let data = seo(
            "A Completely Unrelated Headline For Posts",
            &"d".repeat(100),
            "some-slug",
            "water damage",
        );
        let report = validate(content, &data);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("missing from title")));
    }

    #[test]
    fn validate_score_floor_is_zero() {
        let data = seo("", "", "x", "missing");
        let report = validate("", &data);
        assert!(report.score <= 100);
        assert!(!report.is_valid);
    }

    #[test]
    fn canonical_url_joins_base_and_slug() {
        assert_eq!(
            canonical_url("https://example.com/", "my-post"),
            "https://example.com/blog/my-post"
        );
    }

    #[test]
    fn faq_schema_has_one_entity_per_faq() {
        let faqs = vec![
            Faq {
                question: "Q1?".into(),
                answer: "A1".into(),
            },
            Faq {
                question: "Q2?".into(),
                answer: "A2".into(),
            },
        ];
        let schema = faq_schema(&faqs);
        assert_eq!(schema["@type"], "FAQPage");
        assert_eq!(schema["mainEntity"].as_array().unwrap().len(), 2);
    }
}
