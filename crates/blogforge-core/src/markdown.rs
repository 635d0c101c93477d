//! Markdown helpers shared by the SEO processor, quality gate, and pipeline:
//! word counting, heading/TOC extraction, excerpt derivation, reading time,
//! and a minimal HTML rendering pass covering the constructs the generator
//! emits (headings, paragraphs, bullet lists, inline links).

use crate::types::TocEntry;

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Reading time in minutes at 200 wpm, minimum 1.
pub fn reading_time_minutes(text: &str) -> u32 {
    ((word_count(text) as u32).div_ceil(200)).max(1)
}

/// Headings in document order as `(level, text)`.
pub fn headings(markdown: &str) -> Vec<(u8, String)> {
    markdown
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
            if (1..=6).contains(&hashes) && trimmed.as_bytes().get(hashes) == Some(&b' ') {
                Some((hashes as u8, trimmed[hashes + 1..].trim().to_string()))
            } else {
                None
            }
        })
        .collect()
}

/// GitHub-style anchor for a heading: lowercase, alphanumerics and hyphens.
pub fn heading_anchor(text: &str) -> String {
    let mut anchor = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            anchor.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            if !anchor.ends_with('-') {
                anchor.push('-');
            }
        }
    }
    anchor.trim_matches('-').to_string()
}

/// Table of contents from H2/H3 headings.
pub fn toc(markdown: &str) -> Vec<TocEntry> {
    headings(markdown)
        .into_iter()
        .filter(|(level, _)| (2..=3).contains(level))
        .map(|(level, text)| TocEntry {
            level,
            anchor: heading_anchor(&text),
            text,
        })
        .collect()
}

/// First non-heading paragraph, truncated at the last whitespace before
/// `max_chars` with an ellipsis when needed.
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let para = markdown
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with('#'))
        .unwrap_or("");
    let flat = para.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    match cut.rfind(char::is_whitespace) {
        Some(idx) => format!("{}...", cut[..idx].trim_end()),
        None => format!("{}...", cut.trim_end()),
    }
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Inline pass: markdown links become anchors, everything else is escaped.
fn render_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let Some(mid) = rest[open..].find("](") else {
            break;
        };
        let Some(close) = rest[open + mid..].find(')') else {
            break;
        };
        let label = &rest[open + 1..open + mid];
        let url = &rest[open + mid + 2..open + mid + close];
        out.push_str(&escape_html(&rest[..open]));
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url),
            escape_html(label)
        ));
        rest = &rest[open + mid + close + 1..];
    }
    out.push_str(&escape_html(rest));
    out
}

/// Render the subset of markdown the pipeline produces to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::new();
    for block in markdown.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let hashes = block.bytes().take_while(|&b| b == b'#').count();
        if (1..=6).contains(&hashes) && block.as_bytes().get(hashes) == Some(&b' ') {
            let text = block[hashes + 1..].trim();
            out.push_str(&format!(
                "<h{hashes} id=\"{}\">{}</h{hashes}>\n",
                heading_anchor(text),
                render_inline(text)
            ));
        } else if block.lines().all(|l| l.trim_start().starts_with("- ")) {
            out.push_str("<ul>\n");
            for line in block.lines() {
                let item = line.trim_start().trim_start_matches("- ");
                out.push_str(&format!("<li>{}</li>\n", render_inline(item)));
            }
            out.push_str("</ul>\n");
        } else {
            let flat = block.split_whitespace().collect::<Vec<_>>().join(" ");
            out.push_str(&format!("<p>{}</p>\n", render_inline(&flat)));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(word_count("cat cat dog"), 3);
        assert_eq!(word_count("  a\n b\tc  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn reading_time_rounds_up_with_floor_of_one() {
        assert_eq!(reading_time_minutes("word"), 1);
        let text = vec!["word"; 450].join(" ");
        assert_eq!(reading_time_minutes(&text), 3);
    }

    #[test]
    fn headings_extracts_levels_and_text() {
        let md = "# Title\n\nbody\n\n## Section One\n\n### Sub\n\n#not-a-heading";
        let hs = headings(md);
        assert_eq!(
            hs,
            vec![
                (1, "Title".to_string()),
                (2, "Section One".to_string()),
                (3, "Sub".to_string())
            ]
        );
    }

    #[test]
    fn heading_anchor_is_github_style() {
        assert_eq!(heading_anchor("Section One"), "section-one");
        assert_eq!(heading_anchor("What's Next?"), "whats-next");
        assert_eq!(heading_anchor("  Spaced  Out  "), "spaced-out");
    }

    #[test]
    fn toc_includes_only_h2_and_h3() {
        let md = "# T\n\n## A\n\n### B\n\n#### C";
        let entries = toc(md);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].anchor, "a");
        assert_eq!(entries[1].level, 3);
    }

    #[test]
    fn excerpt_skips_headings_and_truncates_at_whitespace() {
        let md = "## Heading\n\nThe quick brown fox jumps over the lazy dog repeatedly.";
        assert_eq!(
            excerpt(md, 200),
            "The quick brown fox jumps over the lazy dog repeatedly."
        );
        let cut = excerpt(md, 20);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 24);
        assert!(!cut.contains("Heading"));
    }

    #[test]
    fn to_html_renders_headings_lists_links() {
        let md = "## Section One\n\nSee [the guide](https://example.com/g) now.\n\n- first\n- second";
        let html = to_html(md);
        assert!(html.contains("<h2 id=\"section-one\">Section One</h2>"));
        assert!(html.contains("<a href=\"https://example.com/g\">the guide</a>"));
        assert!(html.contains("<li>first</li>"));
    }

    #[test]
    fn to_html_escapes_raw_html() {
        let html = to_html("a <script> & b");
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp;"));
    }
}
