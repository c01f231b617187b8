//! Terminal rendering of note cards, the tag bar and theme previews.
//!
//! Colors come from the active theme palette. With color disabled every
//! function returns plain text so output stays stable for tests and pipes.

use chrono::{Local, TimeZone};
use std::fmt::Write as _;
use whispernotes_core::preview::{derive_preview, CARD_EXCERPT_CHARS};
use whispernotes_core::{Note, NoteFilter, Theme, ThemePalette};
use yansi::Paint;

const UNTITLED: &str = "Untitled";
const DATE_FORMAT: &str = "%b %-d, %Y";
const MUTED_RGB: (u8, u8, u8) = (128, 128, 128);

/// Formatting context passed through the render functions.
pub struct FormatContext {
    pub use_color: bool,
    accent: (u8, u8, u8),
}

impl FormatContext {
    pub fn new(use_color: bool, theme: &Theme) -> Self {
        Self {
            use_color,
            accent: hex_to_rgb(&theme.primary_color).unwrap_or(MUTED_RGB),
        }
    }

    pub fn plain() -> Self {
        Self {
            use_color: false,
            accent: MUTED_RGB,
        }
    }

    fn accent(&self, text: &str) -> String {
        self.paint(text, self.accent, true)
    }

    fn muted(&self, text: &str) -> String {
        self.paint(text, MUTED_RGB, false)
    }

    fn paint(&self, text: &str, (r, g, b): (u8, u8, u8), bold: bool) -> String {
        if !self.use_color {
            return text.to_string();
        }
        if bold {
            text.rgb(r, g, b).bold().to_string()
        } else {
            text.rgb(r, g, b).to_string()
        }
    }
}

/// One note card: title, id, excerpt, image reference, tags and date.
pub fn render_note_card(ctx: &FormatContext, note: &Note) -> String {
    let mut out = String::new();
    let title = if note.title.trim().is_empty() {
        UNTITLED
    } else {
        note.title.as_str()
    };
    let _ = writeln!(out, "{}  {}", ctx.accent(title), ctx.muted(&note.id.to_string()));

    let preview = derive_preview(&note.content, CARD_EXCERPT_CHARS);
    if let Some(excerpt) = preview.excerpt {
        let _ = writeln!(out, "  {excerpt}");
    }
    if let Some(image) = preview.image {
        let _ = writeln!(out, "  {}", ctx.muted(&format!("image: {image}")));
    }

    let mut footer = note
        .tags
        .iter()
        .map(|tag| ctx.accent(&format!("#{tag}")))
        .collect::<Vec<_>>();
    footer.push(ctx.muted(&format_date(note.updated_at, &Local)));
    let _ = writeln!(out, "  {}", footer.join(" "));
    out
}

/// `All` plus every known tag, the active one bracketed.
pub fn render_tag_bar(ctx: &FormatContext, tags: &[String], active: Option<&str>) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let mut items = Vec::with_capacity(tags.len() + 1);
    items.push(tag_button(ctx, "All", active.is_none()));
    for tag in tags {
        items.push(tag_button(ctx, tag, active == Some(tag.as_str())));
    }
    format!("{}\n", items.join(" "))
}

fn tag_button(ctx: &FormatContext, label: &str, selected: bool) -> String {
    if selected {
        ctx.accent(&format!("[{label}]"))
    } else {
        format!(" {label} ")
    }
}

/// Message shown when no note passes the filter.
pub fn render_empty_state(ctx: &FormatContext, filter: &NoteFilter) -> String {
    let hint = if filter.is_unconstrained() {
        "Create your first note"
    } else {
        "Clear filters and try again"
    };
    format!("No notes found.\n{}\n", ctx.muted(hint))
}

/// Tag bar followed by the visible cards or the empty state.
pub fn render_note_list(
    ctx: &FormatContext,
    tags: &[String],
    visible: &[&Note],
    filter: &NoteFilter,
) -> String {
    let mut out = render_tag_bar(ctx, tags, filter.tag.as_deref());
    if !out.is_empty() {
        out.push('\n');
    }
    if visible.is_empty() {
        out.push_str(&render_empty_state(ctx, filter));
        return out;
    }
    let cards: Vec<String> = visible
        .iter()
        .map(|note| render_note_card(ctx, note))
        .collect();
    out.push_str(&cards.join("\n"));
    out
}

/// Catalog preview; the active palette is marked with `*`.
pub fn render_theme_list(ctx: &FormatContext, catalog: &[ThemePalette], current: &Theme) -> String {
    let mut out = String::new();
    for palette in catalog {
        let active = palette.name == current.name;
        let marker = if active { "*" } else { " " };
        let tokens = palette.tokens(current.dark_mode);
        let swatch = match hex_to_rgb(palette.primary_color) {
            Some(rgb) if ctx.use_color => ctx.paint("■", rgb, false),
            _ => String::new(),
        };
        let name = if active {
            ctx.accent(palette.name)
        } else {
            palette.name.to_string()
        };
        let _ = writeln!(
            out,
            "{marker} {swatch}{}{name} ({}) {} bg={} fg={}",
            if swatch.is_empty() { "" } else { " " },
            palette.label,
            palette.primary_color,
            tokens.background,
            tokens.foreground,
        );
    }
    let mode = if current.dark_mode { "dark" } else { "light" };
    let _ = writeln!(out, "mode: {mode}");
    out
}

/// Calendar date of an epoch-millisecond timestamp in `tz`.
pub fn format_date<Tz: TimeZone>(epoch_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    tz.timestamp_millis_opt(epoch_ms)
        .single()
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
