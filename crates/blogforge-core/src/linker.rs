//! Internal link discovery and insertion.
//!
//! Discovery runs three independent strategies (shared keyword taxonomy,
//! raw text overlap, related businesses), each producing `LinkSuggestion`s
//! sorted by relevance. Insertion rewrites the markdown in place: one link
//! per suggestion at the first acceptable anchor match, never inside a
//! heading or an existing link, never the same target URL twice.
//!
//! All functions are pure over their inputs — the pipeline fetches candidate
//! posts and businesses from the store and hands them in.

use regex::Regex;
use uuid::Uuid;

use crate::types::{Business, InsertedLink, LinkSuggestion, TargetKind};

/// Cap on business suggestions per run.
pub const MAX_BUSINESS_SUGGESTIONS: usize = 5;

/// Minimum anchor variant length considered for insertion.
const MIN_ANCHOR_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "their", "there", "these", "those", "which", "while", "with",
    "would", "your", "from", "have", "more", "most", "other", "some", "such", "than", "that",
    "them", "then", "they", "this", "what", "when", "where", "will", "into", "over", "only",
    "also", "been", "best", "each", "here", "just", "like", "make", "many", "much", "need",
    "very", "want", "well", "were", "you",
];

// ---------------------------------------------------------------------------
// Candidate views
// ---------------------------------------------------------------------------

/// The slice of a stored post the linker needs for discovery.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// Texts of the keywords associated with this post.
    pub keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Important-word extraction
// ---------------------------------------------------------------------------

/// Lowercase, strip non-alphanumerics, tokenize, drop short tokens and stop
/// words, dedupe preserving first-seen order.
pub fn important_words(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for raw in text.to_lowercase().split_whitespace() {
        let token: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if token.len() <= 3 || STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// Discovery strategies
// ---------------------------------------------------------------------------

/// Posts sharing keyword associations with the source keyword set.
/// Score: `min(100, matched_count × 20)`.
pub fn by_shared_keywords(
    source_keywords: &[String],
    candidates: &[PostSummary],
) -> Vec<LinkSuggestion> {
    let source_lower: Vec<String> = source_keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut suggestions: Vec<LinkSuggestion> = candidates
        .iter()
        .filter_map(|post| {
            let matched: Vec<String> = post
                .keywords
                .iter()
                .filter(|k| source_lower.contains(&k.to_lowercase()))
                .cloned()
                .collect();
            if matched.is_empty() {
                return None;
            }
            Some(LinkSuggestion {
                target_id: post.id,
                target_slug: post.slug.clone(),
                target_title: post.title.clone(),
                anchor_text: post.title.clone(),
                relevance_score: (matched.len() as u32 * 20).min(100),
                matched_keywords: matched,
                kind: TargetKind::Post,
            })
        })
        .collect();
    suggestions.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    suggestions
}

/// Posts whose `title + excerpt` share important words with the content.
/// Score: `min(100, overlap × 15)`; anchor is the first overlapping word,
/// falling back to the first three title words.
pub fn by_text_overlap(content: &str, candidates: &[PostSummary]) -> Vec<LinkSuggestion> {
    let content_words = important_words(content);
    let mut suggestions: Vec<LinkSuggestion> = candidates
        .iter()
        .filter_map(|post| {
            let candidate_words = important_words(&format!("{} {}", post.title, post.excerpt));
            let overlap: Vec<String> = candidate_words
                .iter()
                .filter(|w| content_words.contains(w))
                .cloned()
                .collect();
            if overlap.is_empty() {
                return None;
            }
            let anchor = overlap
                .first()
                .cloned()
                .unwrap_or_else(|| first_words(&post.title, 3));
            Some(LinkSuggestion {
                target_id: post.id,
                target_slug: post.slug.clone(),
                target_title: post.title.clone(),
                anchor_text: anchor,
                relevance_score: (overlap.len() as u32 * 15).min(100),
                matched_keywords: overlap,
                kind: TargetKind::Post,
            })
        })
        .collect();
    suggestions.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    suggestions
}

/// Businesses mentioned in the content: full name (score 90), name fragment
/// of the first one or two tokens, or city name verbatim (score 70).
pub fn related_businesses(content: &str, businesses: &[Business]) -> Vec<LinkSuggestion> {
    let content_lower = content.to_lowercase();
    let mut suggestions: Vec<LinkSuggestion> = businesses
        .iter()
        .filter_map(|biz| {
            let name_lower = biz.name.to_lowercase();
            let city_lower = biz.city.to_lowercase();
            let two_tokens = first_words(&name_lower, 2);
            let one_token = first_words(&name_lower, 1);

            let (score, matched) = if content_lower.contains(&name_lower) {
                (90, vec![biz.name.clone()])
            } else if two_tokens.len() >= MIN_ANCHOR_LEN && content_lower.contains(&two_tokens) {
                (70, vec![two_tokens.clone()])
            } else if one_token.len() >= MIN_ANCHOR_LEN
                && one_token != two_tokens
                && content_lower.contains(&one_token)
            {
                (70, vec![one_token.clone()])
            } else if !city_lower.is_empty() && content_lower.contains(&city_lower) {
                (70, vec![biz.city.clone()])
            } else {
                return None;
            };
            Some(LinkSuggestion {
                target_id: biz.id,
                target_slug: biz.slug.clone(),
                target_title: biz.name.clone(),
                anchor_text: biz.name.clone(),
                relevance_score: score,
                matched_keywords: matched,
                kind: TargetKind::Business,
            })
        })
        .collect();
    suggestions.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    suggestions.truncate(MAX_BUSINESS_SUGGESTIONS);
    suggestions
}

fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Anchor matching
// ---------------------------------------------------------------------------

/// Produces the literal-text variants tried when anchoring a suggestion.
/// A trait seam so the naive heuristics can be swapped for a real
/// tokenizer/stemmer without touching insertion or the orchestrator.
pub trait AnchorMatcher: Send + Sync {
    fn variants(&self, suggestion: &LinkSuggestion) -> Vec<String>;
}

/// Default matcher: exact anchor, lowercase, naive singular/plural flip,
/// and for businesses the first one and two name tokens.
pub struct HeuristicMatcher;

impl AnchorMatcher for HeuristicMatcher {
    fn variants(&self, suggestion: &LinkSuggestion) -> Vec<String> {
        let anchor = suggestion.anchor_text.trim();
        let mut variants = vec![anchor.to_string(), anchor.to_lowercase()];
        // Naive singular/plural flip.
        if let Some(stripped) = anchor.strip_suffix('s') {
            variants.push(stripped.to_string());
        } else {
            variants.push(format!("{anchor}s"));
        }
        if suggestion.kind == TargetKind::Business {
            variants.push(first_words(&suggestion.target_title, 1));
            variants.push(first_words(&suggestion.target_title, 2));
        }
        variants.retain(|v| v.len() >= MIN_ANCHOR_LEN);
        variants.dedup();
        variants
    }
}

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

fn target_url(suggestion: &LinkSuggestion) -> String {
    match suggestion.kind {
        TargetKind::Post => format!("/blog/{}", suggestion.target_slug),
        TargetKind::Business => format!("/businesses/{}", suggestion.target_slug),
    }
}

/// True if the match at `start` sits on a heading line.
fn on_heading_line(doc: &str, start: usize) -> bool {
    let line_start = doc[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    doc[line_start..].trim_start().starts_with('#')
}

/// True if the match at `start` is already inside `[...]` or `(...)` on its
/// line — i.e. part of an existing markdown link.
fn inside_existing_link(doc: &str, start: usize) -> bool {
    let line_start = doc[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let before = &doc[line_start..start];
    let open_bracket = before.rfind('[');
    let close_bracket = before.rfind(']');
    if open_bracket > close_bracket {
        return true;
    }
    let open_paren = before.rfind('(');
    let close_paren = before.rfind(')');
    open_paren > close_paren
}

/// Insert at most `max_links` links, highest relevance first.
///
/// Per suggestion: try anchor variants in order; the first variant with a
/// word-boundary match decides the location. A rejected location (heading
/// line, existing link) abandons the suggestion — no second location is
/// tried. A target URL already present in the document is never linked
/// again, which makes insertion idempotent.
pub fn insert_links(
    markdown: &str,
    suggestions: &[LinkSuggestion],
    matcher: &dyn AnchorMatcher,
    source_post_id: Uuid,
    max_links: usize,
) -> (String, Vec<InsertedLink>) {
    let mut doc = markdown.to_string();
    let mut inserted = Vec::new();
    let mut ordered: Vec<&LinkSuggestion> = suggestions.iter().collect();
    ordered.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

    for suggestion in ordered {
        if inserted.len() >= max_links {
            break;
        }
        let url = target_url(suggestion);
        if doc.contains(&format!("({url})")) {
            continue;
        }

        'variants: for variant in matcher.variants(suggestion) {
            let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(&variant))) else {
                continue;
            };
            let Some(m) = pattern.find(&doc) else {
                continue;
            };
            if on_heading_line(&doc, m.start()) || inside_existing_link(&doc, m.start()) {
                // First candidate location rejected: abandon the suggestion.
                break 'variants;
            }
            let matched_text = m.as_str().to_string();
            let position = m.start();
            let range = m.range();
            let link = format!("[{matched_text}]({url})");
            doc.replace_range(range, &link);
            inserted.push(InsertedLink {
                id: Uuid::new_v4(),
                source_post_id,
                target_post_id: (suggestion.kind == TargetKind::Post).then_some(suggestion.target_id),
                target_business_id: (suggestion.kind == TargetKind::Business)
                    .then_some(suggestion.target_id),
                anchor_text: matched_text,
                position,
            });
            break 'variants;
        }
    }

    (doc, inserted)
}

// ---------------------------------------------------------------------------
// Related-articles appendix
// ---------------------------------------------------------------------------

pub const RELATED_HEADING: &str = "## Related Articles";

/// Append up to four post-type suggestions as a bullet list. Overlap with
/// inline links is accepted behavior. No-op if the section already exists.
pub fn append_related_articles(markdown: &str, suggestions: &[LinkSuggestion]) -> String {
    if markdown.contains(RELATED_HEADING) {
        return markdown.to_string();
    }
    let related: Vec<&LinkSuggestion> = suggestions
        .iter()
        .filter(|s| s.kind == TargetKind::Post)
        .take(4)
        .collect();
    if related.is_empty() {
        return markdown.to_string();
    }
    let mut out = markdown.trim_end().to_string();
    out.push_str(&format!("\n\n{RELATED_HEADING}\n\n"));
    for s in related {
        out.push_str(&format!("- [{}](/blog/{})\n", s.target_title, s.target_slug));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
