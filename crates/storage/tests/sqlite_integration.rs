use storage::repository::{
    CHECKED_STATE_KEY, CheckedStateRepository, KeyValueStore, PROGRESS_RECORD_KEY,
    ProgressRecordRepository, Storage,
};
use storage::sqlite::SqliteRepository;
use study_core::model::{CheckedState, ItemId, ObjectiveId, ProgressRecord};
use study_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_put_replaces_existing_value() {
    let repo = connect("memdb_kv_replace").await;
    assert_eq!(repo.get("k").await.unwrap(), None);

    repo.put("k", "one").await.unwrap();
    repo.put("k", "two").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("two"));

    repo.remove("k").await.unwrap();
    repo.remove("k").await.unwrap();
    assert_eq!(repo.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_round_trips_both_snapshots() {
    let repo = connect("memdb_snapshots").await;

    let mut state = CheckedState::new();
    state.set(ObjectiveId::new("obj-3"), true);
    state.set(ObjectiveId::new("ghost-id"), true);
    repo.save_checked_state(&state).await.unwrap();

    let record = ProgressRecord {
        completed: vec![ItemId::new("obj-0"), ItemId::new("obj-1")],
        needs_review: Vec::new(),
        last_updated: Some(fixed_now()),
    };
    repo.save_progress(&record).await.unwrap();

    assert_eq!(repo.load_checked_state().await.unwrap(), state);
    assert_eq!(repo.load_progress().await.unwrap(), Some(record));
}

#[tokio::test]
async fn sqlite_corrupt_snapshot_surfaces_serialization_error() {
    let repo = connect("memdb_corrupt").await;
    repo.put(CHECKED_STATE_KEY, "[1, 2").await.unwrap();
    repo.put(PROGRESS_RECORD_KEY, "\"just a string\"").await.unwrap();

    assert!(repo.load_checked_state().await.is_err());
    assert!(repo.load_progress().await.is_err());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.put("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn storage_sqlite_builds_working_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    assert!(storage.checked.load_checked_state().await.unwrap().is_empty());

    let mut state = CheckedState::new();
    state.set(ObjectiveId::new("a"), true);
    storage.checked.save_checked_state(&state).await.unwrap();
    assert!(storage.checked.load_checked_state().await.unwrap().is_checked("a"));
}
