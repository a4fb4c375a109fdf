//! Tests for the SQLite snapshot store.

use kings_valley::{MatchEngine, MatchStatus, Position};
use kings_valley_server::store::{MatchStore, SqliteStore};
use kings_valley_server::{GameService, MatchRegistry};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Creates a temporary database file with migrations applied. The file
/// handle must stay in scope to keep the file alive.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

#[test]
fn test_put_and_get_round_trip() {
    let (_db, store) = setup_test_db();
    let engine = MatchEngine::create("m1".into(), "ABCDEF".into(), "Alice");
    store.put(&engine.snapshot()).expect("Put failed");

    let loaded = store.get("m1").expect("Get failed");
    assert_eq!(loaded, Some(engine.snapshot()));
}

#[test]
fn test_get_missing_is_none() {
    let (_db, store) = setup_test_db();
    assert_eq!(store.get("missing").expect("Get failed"), None);
    assert_eq!(store.get_by_code("ZZZZZZ").expect("Get failed"), None);
}

#[test]
fn test_put_replaces_existing_snapshot() {
    let (_db, store) = setup_test_db();
    let mut engine = MatchEngine::create("m1".into(), "ABCDEF".into(), "Alice");
    store.put(&engine.snapshot()).unwrap();

    let alice = engine.players()[0].id.clone();
    engine.join("Bob").unwrap();
    engine
        .apply_move(&alice, Position::new(4, 0), Position::new(1, 0))
        .unwrap();
    store.put(&engine.snapshot()).unwrap();

    let loaded = store.get("m1").unwrap().unwrap();
    assert_eq!(loaded.status, MatchStatus::InProgress);
    assert_eq!(loaded.move_log.len(), 1);
    assert_eq!(MatchEngine::from_snapshot(loaded).unwrap(), engine);
}

#[test]
fn test_get_by_code_prefers_latest() {
    let (_db, store) = setup_test_db();
    let older = MatchEngine::create("old".into(), "SHARED".into(), "Alice");
    store.put(&older.snapshot()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let newer = MatchEngine::create("new".into(), "SHARED".into(), "Carol");
    store.put(&newer.snapshot()).unwrap();

    let loaded = store.get_by_code("SHARED").unwrap().unwrap();
    assert_eq!(loaded.id, "new");
}

#[test]
fn test_reopen_keeps_data() {
    let db_file = NamedTempFile::new().unwrap();
    let path = db_file.path().to_str().unwrap().to_string();
    let engine = MatchEngine::create("m1".into(), "ABCDEF".into(), "Alice");
    SqliteStore::open(path.clone())
        .unwrap()
        .put(&engine.snapshot())
        .unwrap();

    let reopened = SqliteStore::open(path).unwrap();
    assert!(reopened.get("m1").unwrap().is_some());
}

#[test]
fn test_matches_resume_after_server_restart() {
    let (db, store) = setup_test_db();
    let before = GameService::new(Arc::new(MatchRegistry::new()), Arc::new(store));
    let created = before.create_match("Alice").unwrap();
    let bob = before.join_match(&created.join_code, "Bob").unwrap().player;
    before
        .submit_move(
            &created.match_id,
            &created.player.id,
            Position::new(4, 0),
            Position::new(1, 0),
        )
        .unwrap();
    drop(before);

    let db_path = db.path().to_str().expect("Invalid path").to_string();
    let reopened = SqliteStore::open(db_path).expect("Failed to reopen store");
    let after = GameService::new(Arc::new(MatchRegistry::new()), Arc::new(reopened));
    let outcome = after
        .submit_move(
            &created.match_id,
            &bob.id,
            Position::new(0, 4),
            Position::new(3, 4),
        )
        .expect("Move after restart failed");
    assert_eq!(outcome.state.move_log.len(), 2);
    assert_eq!(outcome.state.status, MatchStatus::InProgress);
}
