use super::*;
use crate::tree::Nag;

fn id(s: &str) -> SessionId {
    SessionId::new(s)
}

fn annotated_session<B: SessionBackend>(store: &mut SessionStore<B>) {
    store.open(id("tab-1"), GameTree::new()).unwrap();
    store
        .edit(&id("tab-1"), |nav| {
            for san in ["e4", "e5", "Nf3"] {
                nav.play(san)?;
            }
            nav.previous();
            nav.play("Bc4")?;
            nav.toggle_annotation(Nag::SPECULATIVE)?;
            nav.set_comment("Italian")
        })
        .unwrap();
}

#[test]
fn test_restore_reproduces_tree_and_cursor() {
    let backend = MemoryBackend::new();
    let mut store = SessionStore::new(backend.clone());
    annotated_session(&mut store);
    let original = store.get(&id("tab-1")).unwrap().clone();

    let mut fresh = SessionStore::new(backend);
    let restored = fresh.restore(id("tab-1")).unwrap();
    assert_eq!(restored, &original);
    assert_eq!(restored.current().san(), "Bc4");
    assert_eq!(restored.cursor(), &Path::from_indices(vec![0, 0, 1]));
}

#[test]
fn test_every_edit_is_written_through() {
    let backend = MemoryBackend::new();
    let mut store = SessionStore::new(backend.clone());
    store.open(id("t"), GameTree::new()).unwrap();
    assert_eq!(backend.count(), 1);

    store.edit(&id("t"), |nav| nav.play("d4")).unwrap();
    let blob = backend.load(&id("t")).unwrap().unwrap();
    let snapshot = SessionSnapshot::from_json(&blob).unwrap();
    assert_eq!(snapshot.version, SessionSnapshot::VERSION);
    assert!(snapshot.pgn.contains("1. d4"));
    assert_eq!(snapshot.cursor, Path::mainline(1));
}

#[test]
fn test_failed_edit_changes_nothing() {
    let backend = MemoryBackend::new();
    let mut store = SessionStore::new(backend.clone());
    annotated_session(&mut store);
    let before_nav = store.get(&id("tab-1")).unwrap().clone();
    let before_blob = backend.load(&id("tab-1")).unwrap();

    let result = store.edit(&id("tab-1"), |nav| {
        nav.play("Nf6")?;
        nav.play("Qxf7")
    });
    assert!(matches!(result, Err(Error::IllegalMove { .. })));
    assert_eq!(store.get(&id("tab-1")).unwrap(), &before_nav);
    assert_eq!(backend.load(&id("tab-1")).unwrap(), before_blob);
}

#[test]
fn test_header_edits_survive_restore() {
    let backend = MemoryBackend::new();
    let mut store = SessionStore::new(backend.clone());
    store.open(id("t"), GameTree::new()).unwrap();
    store
        .edit(&id("t"), |nav| {
            nav.play("e4")?;
            nav.headers_mut().set("Annotator", "line1\nline2");
            nav.headers_mut().set("Opening name", "King's pawn");
            Ok(())
        })
        .unwrap();
    let edited = store.get(&id("t")).unwrap().clone();
    assert_eq!(edited.tree().headers.get("Annotator"), Some("line1 line2"));

    let mut fresh = SessionStore::new(backend);
    let restored = fresh.restore(id("t")).unwrap();
    assert_eq!(restored, &edited);
    assert_eq!(restored.tree().headers.get("Opening_name"), Some("King's pawn"));
}

#[test]
fn test_root_annotation_is_rejected_and_not_persisted() {
    let backend = MemoryBackend::new();
    let mut store = SessionStore::new(backend.clone());
    store.open(id("t"), GameTree::new()).unwrap();
    let before = backend.load(&id("t")).unwrap();
    let result = store.edit(&id("t"), |nav| nav.toggle_annotation(Nag::GOOD));
    assert!(matches!(result, Err(Error::RootEdit)));
    assert_eq!(backend.load(&id("t")).unwrap(), before);
}

#[test]
fn test_unknown_sessions() {
    let mut store = SessionStore::new(MemoryBackend::new());
    assert!(matches!(
        store.restore(id("nope")),
        Err(Error::SessionNotFound { .. })
    ));
    assert!(matches!(
        store.edit(&id("nope"), |_| Ok(())),
        Err(Error::SessionNotFound { .. })
    ));
    assert!(matches!(store.close(&id("nope")), Err(Error::SessionNotFound { .. })));
}

#[test]
fn test_close_discards_blob() {
    let backend = MemoryBackend::new();
    let mut store = SessionStore::new(backend.clone());
    store.open(id("a"), GameTree::new()).unwrap();
    store.open(id("b"), GameTree::new()).unwrap();
    store.close(&id("a")).unwrap();
    assert!(store.get(&id("a")).is_none());
    assert!(!backend.contains(&id("a")));
    assert!(backend.contains(&id("b")));
    assert_eq!(store.ids().count(), 1);
}

#[test]
fn test_file_backend_round_trip() {
    let dir = std::env::temp_dir().join(format!("game_tree_sessions_{}", std::process::id()));
    let backend = FileBackend::new(&dir);
    let mut store = SessionStore::new(backend.clone());
    annotated_session(&mut store);
    assert!(dir.join("tab-1.json").exists());

    let mut fresh = SessionStore::new(backend);
    let restored = fresh.restore(id("tab-1")).unwrap().clone();
    assert_eq!(&restored, store.get(&id("tab-1")).unwrap());

    fresh.close(&id("tab-1")).unwrap();
    assert!(!dir.join("tab-1.json").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_file_names_are_sanitized() {
    let backend = FileBackend::new("/tmp/sessions");
    assert_eq!(
        backend.file(&id("../x y")),
        PathBuf::from("/tmp/sessions/___x_y.json")
    );
}
