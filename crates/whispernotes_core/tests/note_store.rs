use rusqlite::{params, Connection};
use whispernotes_core::db::{open_db, open_db_in_memory};
use whispernotes_core::{
    NewNote, NoteEditor, NoteFilter, NotePatch, NoteService, NoteServiceError,
    NoteValidationError, SqliteNoteRepository,
};

#[test]
fn add_assigns_id_and_equal_timestamps() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let created = service
        .add(NewNote::new("Shopping", "milk, eggs").with_tags(["home"]))
        .unwrap();
    assert_eq!(created.created_at, created.updated_at);

    let listed = service.list().unwrap();
    let matching: Vec<_> = listed.iter().filter(|n| n.id == created.id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], &created);
}

#[test]
fn add_rejects_note_without_title_and_content() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let err = service.add(NewNote::new("  ", "")).unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Validation(NoteValidationError::EmptyNote)
    ));
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn add_accepts_title_only_and_content_only() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    service.add(NewNote::new("Title only", "")).unwrap();
    service.add(NewNote::new("", "content only")).unwrap();
    assert_eq!(service.list().unwrap().len(), 2);
}

#[test]
fn update_title_bumps_updated_at_and_keeps_other_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let created = service
        .add(NewNote::new("Plan", "steps").with_tags(["work", "q3"]))
        .unwrap();

    let updated = service
        .update(created.id, NotePatch::title("Final plan"))
        .unwrap();
    assert_eq!(updated.title, "Final plan");
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.content, created.content);
    assert_eq!(updated.tags, created.tags);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn update_replaces_tags_preserving_new_order() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let created = service
        .add(NewNote::new("t", "").with_tags(["b", "a"]))
        .unwrap();

    let updated = service
        .update(
            created.id,
            NotePatch {
                tags: Some(vec!["z".to_string(), " a ".to_string(), "z".to_string()]),
                ..NotePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.tags, vec!["z", "a"]);
    assert_eq!(service.get(created.id).unwrap().tags, vec!["z", "a"]);
}

#[test]
fn update_that_empties_note_is_rejected_and_storage_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let created = service.add(NewNote::new("only title", "")).unwrap();

    let err = service
        .update(created.id, NotePatch::title(""))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::Validation(_)));
    assert_eq!(service.get(created.id).unwrap(), created);
}

#[test]
fn update_and_remove_unknown_id_fail_with_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let missing = uuid::Uuid::new_v4();

    assert!(matches!(
        service.update(missing, NotePatch::title("x")),
        Err(NoteServiceError::NoteNotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.remove(missing),
        Err(NoteServiceError::NoteNotFound(_))
    ));
}

#[test]
fn remove_is_permanent_and_second_remove_fails() {
    let mut conn = open_db_in_memory().unwrap();
    let created_id = {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut service = NoteService::new(repo);
        let created = service
            .add(NewNote::new("gone", "soon").with_tags(["tmp"]))
            .unwrap();
        service.remove(created.id).unwrap();
        assert!(service.list().unwrap().iter().all(|n| n.id != created.id));
        assert!(matches!(
            service.remove(created.id),
            Err(NoteServiceError::NoteNotFound(_))
        ));
        created.id
    };

    let tag_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM note_tags WHERE note_id = ?1;",
            params![created_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tag_rows, 0);
}

#[test]
fn list_orders_by_updated_at_desc() {
    let mut conn = open_db_in_memory().unwrap();
    let (first_id, second_id) = {
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut service = NoteService::new(repo);
        let first = service.add(NewNote::new("first", "")).unwrap();
        let second = service.add(NewNote::new("second", "")).unwrap();
        (first.id.to_string(), second.id.to_string())
    };

    set_updated_at(&conn, &first_id, 2_000);
    set_updated_at(&conn, &second_id, 1_000);

    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);
    let listed = service.list().unwrap();
    assert_eq!(listed[0].id.to_string(), first_id);
    assert_eq!(listed[1].id.to_string(), second_id);
}

#[test]
fn mutations_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");

    let (kept_id, removed_id) = {
        let mut conn = open_db(&path).unwrap();
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let mut service = NoteService::new(repo);
        let kept = service
            .add(NewNote::new("kept", "body").with_tags(["home", "errands"]))
            .unwrap();
        let removed = service.add(NewNote::new("removed", "")).unwrap();
        service
            .update(kept.id, NotePatch::title("kept and renamed"))
            .unwrap();
        service.remove(removed.id).unwrap();
        (kept.id, removed.id)
    };

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);
    let listed = service.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept_id);
    assert_eq!(listed[0].title, "kept and renamed");
    assert_eq!(listed[0].tags, vec!["home", "errands"]);
    assert!(listed.iter().all(|n| n.id != removed_id));
}

#[test]
fn search_and_tags_compose_with_store_order() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    service
        .add(NewNote::new("Shopping", "milk, eggs").with_tags(["home"]))
        .unwrap();
    service
        .add(NewNote::new("Standup", "notes").with_tags(["work", "home"]))
        .unwrap();

    let home = service
        .search(&NoteFilter::new("", Some("home".to_string())))
        .unwrap();
    assert_eq!(home.len(), 2);
    let work = service
        .search(&NoteFilter::new("MILK", Some("work".to_string())))
        .unwrap();
    assert!(work.is_empty());

    let tags = service.tags().unwrap();
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&"home".to_string()));
    assert!(tags.contains(&"work".to_string()));
}

#[test]
fn editor_submits_into_local_store() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let mut editor = NoteEditor::create();
    editor.set_title("Shopping");
    editor.set_content("milk, eggs");
    editor.set_tags_input("home,  , errands");
    let created = editor.submit(&mut service).unwrap().note().clone();
    assert_eq!(created.tags, vec!["home", "errands"]);

    let mut editor = NoteEditor::edit(&created);
    editor.set_tags_input("home");
    let updated = editor.submit(&mut service).unwrap().note().clone();
    assert_eq!(updated.tags, vec!["home"]);
    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn editing_title_keeps_tags_containing_separators() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let created = service
        .add(NewNote::new("Trip", "itinerary").with_tags(["paris, france", "summer"]))
        .unwrap();

    let mut editor = NoteEditor::edit(&created);
    editor.set_title("Trip 2");
    let updated = editor.submit(&mut service).unwrap().note().clone();

    assert_eq!(updated.title, "Trip 2");
    assert_eq!(updated.tags, vec!["paris, france", "summer"]);
    assert_eq!(service.get(created.id).unwrap().tags, created.tags);
}

fn set_updated_at(conn: &Connection, id: &str, updated_at: i64) {
    conn.execute(
        "UPDATE notes SET created_at = 0, updated_at = ?2 WHERE id = ?1;",
        params![id, updated_at],
    )
    .unwrap();
}
