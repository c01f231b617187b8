//! Subcommand execution against a remote note store.

use crate::args::{Cli, Command};
use crate::render::{render_note_card, render_note_list, render_theme_list, FormatContext};
use crate::transport::HttpTransport;
use anyhow::{anyhow, Context};
use log::{info, warn};
use std::io::Write;
use whispernotes_core::theme::THEME_CATALOG;
use whispernotes_core::{
    NoteEditor, NoteFilter, NoteId, NotesSession, RemoteSink, ThemeSelection, ThemeStore,
};

/// Runs `cli.command`, writing human-readable output to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&cli.server)?;
    let mut session = NotesSession::new();

    match &cli.command {
        Command::List { search, tag } => {
            let filter = NoteFilter::from_query(Some(search.as_str()), tag.as_deref());
            session.refresh(&transport)?;
            let ctx = format_context(cli, &transport);
            let visible = session.visible(&filter);
            let tags = session.tags();
            write!(out, "{}", render_note_list(&ctx, &tags, &visible, &filter))?;
        }
        Command::Tags => {
            for tag in transport.tags()? {
                writeln!(out, "{tag}")?;
            }
        }
        Command::Add {
            title,
            content,
            tags,
        } => {
            let mut editor = NoteEditor::create();
            editor.set_title(title.as_str());
            editor.set_content(content.as_str());
            editor.set_tags_input(tags.as_str());
            let outcome = editor.submit(&mut RemoteSink::new(&mut session, &transport))?;
            info!("event=cli_add module=cli status=ok id={}", outcome.note().id);
            let ctx = format_context(cli, &transport);
            write!(out, "{}", render_note_card(&ctx, outcome.note()))?;
        }
        Command::Edit {
            id,
            title,
            content,
            tags,
        } => {
            let id = parse_id(id)?;
            session.refresh(&transport)?;
            let note = session
                .get(id)
                .ok_or_else(|| anyhow!("note not found: {id}"))?;
            let mut editor = NoteEditor::edit(note);
            if let Some(title) = title {
                editor.set_title(title.as_str());
            }
            if let Some(content) = content {
                editor.set_content(content.as_str());
            }
            if let Some(tags) = tags {
                editor.set_tags_input(tags.as_str());
            }
            let outcome = editor.submit(&mut RemoteSink::new(&mut session, &transport))?;
            let ctx = format_context(cli, &transport);
            write!(out, "{}", render_note_card(&ctx, outcome.note()))?;
        }
        Command::Rm { id } => {
            let id = parse_id(id)?;
            session.refresh(&transport)?;
            session.remove(&transport, id)?;
            writeln!(out, "Deleted {id}")?;
        }
        Command::Themes {
            select,
            dark,
            light,
        } => {
            let selection = ThemeSelection {
                name: select.clone(),
                dark_mode: match (*dark, *light) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let theme = if selection == ThemeSelection::default() {
                transport.current_theme()?
            } else {
                transport.select_theme(&selection)?
            };
            let ctx = if color_enabled(cli) {
                FormatContext::new(true, &theme)
            } else {
                FormatContext::plain()
            };
            write!(out, "{}", render_theme_list(&ctx, THEME_CATALOG, &theme))?;
        }
    }
    Ok(())
}

fn parse_id(raw: &str) -> anyhow::Result<NoteId> {
    uuid::Uuid::parse_str(raw.trim()).with_context(|| format!("invalid note id `{raw}`"))
}

fn color_enabled(cli: &Cli) -> bool {
    !cli.no_color && std::env::var_os("NO_COLOR").is_none()
}

/// Colors follow the server's active theme; the default palette is used
/// when it cannot be fetched.
fn format_context(cli: &Cli, transport: &HttpTransport) -> FormatContext {
    if !color_enabled(cli) {
        return FormatContext::plain();
    }
    let theme = transport.current_theme().unwrap_or_else(|err| {
        warn!("event=theme_fetch module=cli status=error error={err}");
        ThemeStore::new().current()
    });
    FormatContext::new(true, &theme)
}
