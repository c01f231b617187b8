use clap::Parser;
use std::net::TcpListener;
use whispernotes_cli::{run, Cli, HttpTransport};
use whispernotes_core::db::open_db_in_memory;
use whispernotes_core::{ApiErrorKind, NewNote, NotePatch, NoteTransport, TransportError};
use whispernotes_server::AppState;

/// Starts a server on an ephemeral port in a background thread and returns
/// its base URL. The server lives until the test process exits.
fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let conn = open_db_in_memory().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            whispernotes_server::run(listener, AppState::new(conn), std::future::pending())
                .await
                .unwrap();
        });
    });
    url
}

fn exec(url: &str, args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec!["whispernotes", "--no-color", "--server", url];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    run(&cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn add_then_list_renders_cards_and_tag_bar() {
    let url = spawn_server();

    let empty = exec(&url, &["list"]).unwrap();
    assert!(empty.contains("Create your first note"));

    let card = exec(
        &url,
        &["add", "--title", "Shopping", "--content", "milk, eggs", "--tags", "home, errands"],
    )
    .unwrap();
    assert!(card.starts_with("Shopping"));
    assert!(card.contains("#home #errands"));

    exec(&url, &["add", "--title", "Standup", "--tags", "work"]).unwrap();

    let listed = exec(&url, &["list"]).unwrap();
    assert!(listed.starts_with("[All]"));
    assert!(listed.contains("Shopping"));
    assert!(listed.contains("Standup"));

    let milk = exec(&url, &["list", "--search", "MILK"]).unwrap();
    assert!(milk.contains("Shopping"));
    assert!(!milk.contains("Standup"));

    let none = exec(&url, &["list", "--search", "milk", "--tag", "work"]).unwrap();
    assert!(none.contains("Clear filters and try again"));

    let tags = exec(&url, &["tags"]).unwrap();
    let mut tags: Vec<&str> = tags.lines().collect();
    tags.sort_unstable();
    assert_eq!(tags, vec!["errands", "home", "work"]);
}

#[test]
fn edit_and_remove_by_id() {
    let url = spawn_server();
    let transport = HttpTransport::new(&url).unwrap();
    let note = transport
        .create(&NewNote::new("Plan", "steps").with_tags(["work"]))
        .unwrap();
    let id = note.id.to_string();

    let card = exec(&url, &["edit", &id, "--title", "Final plan"]).unwrap();
    assert!(card.starts_with("Final plan"));
    assert!(card.contains("steps"));
    assert!(card.contains("#work"));

    let stored = transport.list().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].updated_at > note.updated_at);

    let removed = exec(&url, &["rm", &id]).unwrap();
    assert_eq!(removed.trim(), format!("Deleted {id}"));
    assert!(transport.list().unwrap().is_empty());
    assert!(exec(&url, &["rm", &id]).is_err());
}

#[test]
fn empty_note_is_rejected_before_reaching_the_server() {
    let url = spawn_server();
    let err = exec(&url, &["add", "--title", "  "]).unwrap_err();
    assert!(err.to_string().contains("a note needs a title"));

    let transport = HttpTransport::new(&url).unwrap();
    assert!(transport.list().unwrap().is_empty());
}

#[test]
fn themes_select_and_toggle_dark_mode() {
    let url = spawn_server();

    let initial = exec(&url, &["themes"]).unwrap();
    assert!(initial.lines().any(|line| line.starts_with("* totoro")));
    assert!(initial.ends_with("mode: light\n"));

    let selected = exec(&url, &["themes", "--select", "ponyo", "--dark"]).unwrap();
    assert!(selected.lines().any(|line| line.starts_with("* ponyo")));
    assert!(selected.ends_with("mode: dark\n"));

    assert!(exec(&url, &["themes", "--select", "laputa"]).is_err());
    let transport = HttpTransport::new(&url).unwrap();
    assert_eq!(transport.current_theme().unwrap().name, "ponyo");
}

#[test]
fn transport_maps_error_envelope() {
    let url = spawn_server();
    let transport = HttpTransport::new(&url).unwrap();

    let err = transport
        .update(uuid::Uuid::new_v4(), &NotePatch::title("x"))
        .unwrap_err();
    match err {
        TransportError::Rejected { status, kind, .. } => {
            assert_eq!(status, 404);
            assert_eq!(kind, ApiErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = transport.create(&NewNote::default()).unwrap_err();
    assert_eq!(err.kind(), Some(&ApiErrorKind::ValidationError));
}

#[test]
fn unreachable_server_fails_without_output() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    assert!(exec(&url, &["list"]).is_err());
}
