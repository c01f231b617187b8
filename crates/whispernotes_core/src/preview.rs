//! Note card preview derivation.
//!
//! Note content is free text that often carries light markdown. Cards show a
//! short plain-text excerpt and, when present, the first image reference.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default excerpt length used by note cards.
pub const CARD_EXCERPT_CHARS: usize = 120;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(#{1,6}|[-*+]|>|\d+\.)\s+|[*_`~]+").expect("valid symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Display projection of a note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePreview {
    /// Single-line plain text, ellipsized past the limit.
    pub excerpt: Option<String>,
    /// First markdown image target.
    pub image: Option<String>,
}

/// Derives the card preview for `content`, keeping at most `max_chars`
/// characters of text before the ellipsis.
pub fn derive_preview(content: &str, max_chars: usize) -> NotePreview {
    let image = MARKDOWN_IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|value| !value.is_empty());

    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();

    let excerpt = if trimmed.is_empty() {
        None
    } else if trimmed.chars().count() > max_chars {
        let mut cut: String = trimmed.chars().take(max_chars).collect();
        cut.truncate(cut.trim_end().len());
        cut.push('…');
        Some(cut)
    } else {
        Some(trimmed.to_string())
    };

    NotePreview { excerpt, image }
}
