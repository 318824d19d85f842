//! HTML preprocessing: reduce a captured page to a token-bounded prompt body.
//!
//! Captured profile pages arrive as multi-megabyte HTML dumps. Most of it is
//! chrome: scripts, styles, icons, tracking attributes. This module reduces
//! the page in one of two modes:
//!
//! - `PreserveStructure` narrows to the main content container first, so
//!   relevant sections are not lost to size-based truncation later.
//! - `AggressiveReduce` additionally drops navigation landmarks and all
//!   class/data attributes, for tight token budgets.
//!
//! `preprocess` never fails: if any reduction step cannot run, it falls back
//! to a minimal tag-stripping pass that always produces output.

use regex::Regex;

use crate::types::OptimizationMode;

/// Estimated chars per token for plain text.
const CHARS_PER_TOKEN_TEXT: f64 = 4.0;

/// Estimated chars per token when markup remains; tags tokenize much denser
/// than prose, so the ratio drops.
const CHARS_PER_TOKEN_MARKUP: f64 = 2.5;

/// A main-content match below this size is ignored; profile pages whose main
/// region is this small are capture glitches, and narrowing to them would
/// discard the real content.
const MIN_MAIN_CONTENT_BYTES: usize = 2_048;

/// Bounded set of main-content container markers, checked in order. Group 1
/// captures the container's element name so the matching close tag can be
/// found.
const MAIN_CONTENT_MARKERS: &[&str] = &[
    r#"(?i)<(main)\b"#,
    r#"(?i)<([a-z][a-z0-9]*)\b[^>]*\brole="main""#,
    r#"(?i)<([a-z][a-z0-9]*)\b[^>]*\bid="main-content""#,
    r#"(?i)<([a-z][a-z0-9]*)\b[^>]*\bclass="[^"]*(?:scaffold-layout__main|profile-content|core-rail)[^"]*""#,
];

/// Element blocks that never carry profile content.
const NON_CONTENT_BLOCKS: &[&str] = &[
    "script", "style", "noscript", "svg", "iframe", "video", "audio", "canvas", "picture",
    "template",
];

/// Landmark blocks stripped only in aggressive mode.
const LANDMARK_BLOCKS: &[&str] = &["nav", "header", "footer", "aside"];

/// A reduced, token-bounded view of the captured page.
///
/// Derived once per request and discarded after the orchestration run.
#[derive(Debug, Clone)]
pub struct PreprocessedDocument {
    /// Reduced text, possibly still containing markup
    pub text: String,

    /// Byte size of the raw capture
    pub original_size_bytes: usize,

    /// Byte size after reduction
    pub final_size_bytes: usize,

    /// Token estimate for the reduced text
    pub estimated_tokens: usize,
}

/// Reduce captured HTML under the given mode. Never fails.
pub fn preprocess(html: &str, mode: OptimizationMode) -> PreprocessedDocument {
    let original_size_bytes = html.len();

    let text = reduce(html, mode).unwrap_or_else(|| minimal_strip(html));

    let estimated_tokens = estimate_tokens(&text);
    tracing::debug!(
        original_bytes = original_size_bytes,
        final_bytes = text.len(),
        estimated_tokens,
        ?mode,
        "preprocessed captured page"
    );

    PreprocessedDocument {
        final_size_bytes: text.len(),
        estimated_tokens,
        original_size_bytes,
        text,
    }
}

/// Token estimate from a fixed chars-per-token ratio.
pub fn estimate_tokens(text: &str) -> usize {
    let ratio = if text.contains('<') {
        CHARS_PER_TOKEN_MARKUP
    } else {
        CHARS_PER_TOKEN_TEXT
    };
    (text.chars().count() as f64 / ratio).ceil() as usize
}

/// Full reduction pipeline. Any step that cannot run aborts to the caller's
/// strip-only fallback.
fn reduce(html: &str, mode: OptimizationMode) -> Option<String> {
    let mut text = match mode {
        OptimizationMode::PreserveStructure => narrow_to_main_content(html)
            .unwrap_or(html)
            .to_string(),
        OptimizationMode::AggressiveReduce => html.to_string(),
    };

    text = strip_comments(&text)?;
    text = strip_blocks(&text, NON_CONTENT_BLOCKS)?;
    text = strip_void_media(&text)?;
    text = strip_inline_attributes(&text)?;

    if mode == OptimizationMode::AggressiveReduce {
        text = strip_blocks(&text, LANDMARK_BLOCKS)?;
        text = strip_presentation_attributes(&text)?;
    }

    collapse_whitespace(&text)
}

/// Narrow to the main content container when the page has a recognizable one
/// and the match is large enough to plausibly hold the profile.
fn narrow_to_main_content(html: &str) -> Option<&str> {
    for marker in MAIN_CONTENT_MARKERS {
        let pattern = Regex::new(marker).ok()?;
        let Some(caps) = pattern.captures(html) else {
            continue;
        };
        let m = caps.get(0)?;
        let tag = caps.get(1)?.as_str().to_ascii_lowercase();

        // Slice from the container's start tag to its matching close when one
        // exists, otherwise to the end of the document.
        let end = container_end(html, m.end(), &tag).unwrap_or(html.len());

        let candidate = &html[m.start()..end];
        if candidate.len() >= MIN_MAIN_CONTENT_BYTES {
            return Some(candidate);
        }
    }
    None
}

/// Byte offset just past the close tag matching the container whose open tag
/// ends at `from`. Tracks nesting depth, since content containers are often
/// divs with divs inside them. `None` when the container never closes.
fn container_end(html: &str, from: usize, tag: &str) -> Option<usize> {
    let open = Regex::new(&format!(r"(?i)<{tag}\b")).ok()?;
    let close = Regex::new(&format!(r"(?i)</{tag}\s*>")).ok()?;

    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let next_close = close.find_at(html, pos)?;
        match open.find_at(html, pos) {
            Some(next_open) if next_open.start() < next_close.start() => {
                depth += 1;
                pos = next_open.end();
            }
            _ => {
                depth -= 1;
                pos = next_close.end();
                if depth == 0 {
                    return Some(next_close.end());
                }
            }
        }
    }
}

fn strip_comments(html: &str) -> Option<String> {
    let pattern = Regex::new(r"(?s)<!--.*?-->").ok()?;
    Some(pattern.replace_all(html, "").into_owned())
}

/// Remove whole element blocks, open tag through close tag.
fn strip_blocks(html: &str, tags: &[&str]) -> Option<String> {
    let mut text = html.to_string();
    for tag in tags {
        let pattern = Regex::new(&format!(r"(?si)<{tag}\b[^>]*>.*?</{tag}>")).ok()?;
        text = pattern.replace_all(&text, "").into_owned();
    }
    Some(text)
}

/// Remove void media/icon elements that have no close tag.
fn strip_void_media(html: &str) -> Option<String> {
    let img = Regex::new(r"(?i)<(?:img|source|track|embed)\b[^>]*>").ok()?;
    let icon = Regex::new(r#"(?si)<i\b[^>]*\bclass="[^"]*icon[^"]*"[^>]*>.*?</i>"#).ok()?;
    let text = img.replace_all(html, "");
    Some(icon.replace_all(&text, "").into_owned())
}

/// Remove inline styles and event handlers.
fn strip_inline_attributes(html: &str) -> Option<String> {
    let style = Regex::new(r#"(?i)\sstyle\s*=\s*("[^"]*"|'[^']*')"#).ok()?;
    let handlers = Regex::new(r#"(?i)\son[a-z]+\s*=\s*("[^"]*"|'[^']*')"#).ok()?;
    let text = style.replace_all(html, "");
    Some(handlers.replace_all(&text, "").into_owned())
}

/// Remove class and data-* attributes (aggressive mode only).
fn strip_presentation_attributes(html: &str) -> Option<String> {
    let class = Regex::new(r#"(?i)\sclass\s*=\s*("[^"]*"|'[^']*')"#).ok()?;
    let data = Regex::new(r#"(?i)\sdata-[a-z0-9_-]+\s*=\s*("[^"]*"|'[^']*')"#).ok()?;
    let text = class.replace_all(html, "");
    Some(data.replace_all(&text, "").into_owned())
}

/// Collapse inter-tag whitespace and runs of whitespace.
fn collapse_whitespace(html: &str) -> Option<String> {
    let inter_tag = Regex::new(r">\s+<").ok()?;
    let runs = Regex::new(r"\s{2,}").ok()?;
    let text = inter_tag.replace_all(html, "><");
    Some(runs.replace_all(&text, " ").trim().to_string())
}

/// Last-resort pass: drop everything between angle brackets, character by
/// character, and collapse whitespace. Cannot fail.
fn minimal_strip(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut in_tag = false;
    let mut last_was_space = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            }
            _ if in_tag => {}
            c if c.is_whitespace() => {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            }
            c => {
                out.push(c);
                last_was_space = false;
            }
        }
    }

    out.trim().to_string()
}
