//! REST handlers for notes, tags and themes.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use whispernotes_core::{
    NewNote, Note, NoteFilter, NoteId, NotePatch, Theme, ThemePalette, ThemeSelection,
};

pub const BANNER: &str = "WhisperNotes API is running!";

pub async fn root() -> &'static str {
    BANNER
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `?search=&tag=` on the note list.
#[derive(Debug, Default, Deserialize)]
pub struct NotesQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
}

impl NotesQuery {
    fn filter(&self) -> NoteFilter {
        NoteFilter::from_query(self.search.as_deref(), self.tag.as_deref())
    }
}

pub async fn list_notes(
    State(state): State<AppState>,
    query: Result<Query<NotesQuery>, QueryRejection>,
) -> Result<Json<Vec<Note>>, AppError> {
    let Query(query) = query?;
    let filter = query.filter();
    let notes = state.with_notes(|notes| notes.search(&filter))?;
    Ok(Json(notes))
}

pub async fn create_note(
    State(state): State<AppState>,
    payload: Result<Json<NewNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let Json(new_note) = payload?;
    let note = state.with_notes(|notes| notes.add(new_note))?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let id = parse_note_id(&id)?;
    let note = state.with_notes(|notes| notes.get(id))?;
    Ok(Json(note))
}

/// Serves both `PUT` and `PATCH`; absent fields are left untouched.
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<NotePatch>, JsonRejection>,
) -> Result<Json<Note>, AppError> {
    let id = parse_note_id(&id)?;
    let Json(patch) = payload?;
    let note = state.with_notes(|notes| notes.update(id, patch))?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_note_id(&id)?;
    state.with_notes(|notes| notes.remove(id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let tags = state.with_notes(|notes| notes.tags())?;
    Ok(Json(tags))
}

pub async fn list_themes(
    State(state): State<AppState>,
) -> Result<Json<&'static [ThemePalette]>, AppError> {
    let catalog = state.with_themes(|themes| themes.catalog())?;
    Ok(Json(catalog))
}

pub async fn get_theme(State(state): State<AppState>) -> Result<Json<Theme>, AppError> {
    let theme = state.with_themes(|themes| themes.current())?;
    Ok(Json(theme))
}

pub async fn update_theme(
    State(state): State<AppState>,
    payload: Result<Json<ThemeSelection>, JsonRejection>,
) -> Result<Json<Theme>, AppError> {
    let Json(selection) = payload?;
    let theme = state.with_themes(|themes| themes.apply(&selection))??;
    Ok(Json(theme))
}

/// Unmatched routes answer with the same envelope as every other error.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

/// Ids that are not UUIDs can never name a stored note.
fn parse_note_id(raw: &str) -> Result<NoteId, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("note not found: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::{parse_note_id, NotesQuery};
    use crate::error::AppError;

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_note_id("abc"), Err(AppError::NotFound(_))));
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_note_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn query_maps_all_to_no_tag() {
        let query = NotesQuery {
            search: Some("milk".to_string()),
            tag: Some("All".to_string()),
        };
        let filter = query.filter();
        assert_eq!(filter.search, "milk");
        assert_eq!(filter.tag, None);
    }
}
