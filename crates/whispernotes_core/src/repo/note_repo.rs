//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist note rows and their ordered tag links.
//! - Replace a note's tag set atomically with its row update.
//!
//! # Invariants
//! - Every write commits before returning `Ok`.
//! - Listing order is `updated_at DESC, id ASC`.
//! - Tags are read back in their stored insertion order.

use crate::model::note::{Note, NoteId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at,
    updated_at
FROM notes";

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts a new note with its tags.
    fn insert_note(&mut self, note: &Note) -> RepoResult<()>;
    /// Overwrites title/content/tags/updated_at of an existing note.
    fn replace_note(&mut self, note: &Note) -> RepoResult<()>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists every note, newest update first.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Deletes a note and its tag links permanently.
    fn delete_note(&mut self, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails when required tables or columns are missing, which means the
    /// connection did not come from [`crate::db::open_db`].
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&mut self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.created_at,
                note.updated_at,
            ],
        )?;
        write_tags(&tx, note)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_note(&mut self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                updated_at = ?4
             WHERE id = ?1;",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }

        tx.execute(
            "DELETE FROM note_tags WHERE note_id = ?1;",
            [note.id.to_string()],
        )?;
        write_tags(&tx, note)?;
        tx.commit()?;
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} ORDER BY updated_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(self.conn, row)?);
        }
        Ok(notes)
    }

    fn delete_note(&mut self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn write_tags(tx: &Transaction<'_>, note: &Note) -> RepoResult<()> {
    let note_id = note.id.to_string();
    for (position, tag) in note.tags.iter().enumerate() {
        tx.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, position, name)
             VALUES (?1, ?2, ?3);",
            params![note_id.as_str(), position as i64, tag.as_str()],
        )?;
    }
    Ok(())
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;

    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;
    if updated_at < created_at {
        return Err(RepoError::InvalidData(format!(
            "note {id_text} has updated_at {updated_at} earlier than created_at {created_at}"
        )));
    }

    Ok(Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        tags: load_tags(conn, &id_text)?,
        created_at,
        updated_at,
    })
}

fn load_tags(conn: &Connection, note_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM note_tags
         WHERE note_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("notes", &["id", "title", "content", "created_at", "updated_at"]),
    ("note_tags", &["note_id", "position", "name"]),
];

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
