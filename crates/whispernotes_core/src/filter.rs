//! Pure note filtering and tag derivation.
//!
//! # Invariants
//! - Functions here never touch storage, clocks or randomness.
//! - Output order always follows input order.

use crate::model::note::Note;

/// Tag value that UIs and query strings use for "no tag constraint".
pub const ALL_TAGS: &str = "all";

/// Search text plus optional tag constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Case-insensitive substring over title or content. Blank means any.
    pub search: String,
    /// Exact tag that must be present. `None` means any.
    pub tag: Option<String>,
}

impl NoteFilter {
    pub fn new(search: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            search: search.into(),
            tag,
        }
    }

    /// Builds a filter from loosely typed query values.
    ///
    /// A missing, blank or `all` tag (any case) maps to no tag constraint.
    pub fn from_query(search: Option<&str>, tag: Option<&str>) -> Self {
        let tag = tag
            .map(str::trim)
            .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case(ALL_TAGS))
            .map(str::to_string);
        Self {
            search: search.unwrap_or_default().to_string(),
            tag,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.search.trim().is_empty() && self.tag.is_none()
    }

    /// Whether one note passes both constraints.
    pub fn matches(&self, note: &Note) -> bool {
        Matcher::new(self).matches(note)
    }
}

struct Matcher<'a> {
    needle: Option<String>,
    tag: Option<&'a str>,
}

impl<'a> Matcher<'a> {
    fn new(filter: &'a NoteFilter) -> Self {
        let trimmed = filter.search.trim();
        Self {
            needle: (!trimmed.is_empty()).then(|| trimmed.to_lowercase()),
            tag: filter.tag.as_deref(),
        }
    }

    fn matches(&self, note: &Note) -> bool {
        let search_ok = match self.needle.as_deref() {
            None => true,
            Some(needle) => {
                note.title.to_lowercase().contains(needle)
                    || note.content.to_lowercase().contains(needle)
            }
        };
        let tag_ok = self.tag.map_or(true, |tag| note.has_tag(tag));
        search_ok && tag_ok
    }
}

/// Returns the notes passing `filter`, in their original relative order.
pub fn filter_notes<'n>(notes: &'n [Note], filter: &NoteFilter) -> Vec<&'n Note> {
    let matcher = Matcher::new(filter);
    notes.iter().filter(|note| matcher.matches(note)).collect()
}

/// Union of all tags, each distinct tag once, in first-seen order.
pub fn tags_of(notes: &[Note]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in notes.iter().flat_map(|note| note.tags.iter()) {
        if !tags.iter().any(|known| known == tag) {
            tags.push(tag.clone());
        }
    }
    tags
}
