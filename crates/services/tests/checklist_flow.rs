mod common;

use std::sync::Arc;

use services::ChecklistService;
use storage::repository::{CHECKED_STATE_KEY, InMemoryRepository, KeyValueStore};
use study_core::NodeKey;
use study_core::model::{ObjectiveId, Progress, SubtopicId};

use common::{ReadOnlyStore, small_curriculum};

fn subtopic() -> NodeKey {
    NodeKey::Subtopic(SubtopicId::new("1.1.1"))
}

#[tokio::test]
async fn toggling_a_sub_objective_updates_every_ancestor_and_persists() {
    let store = InMemoryRepository::new();
    let mut service = ChecklistService::new(Arc::new(store.clone()));
    service.load(small_curriculum()).await;

    assert_eq!(service.progress(&subtopic()), Progress::new(0, 3));

    let outcome = service
        .toggle(&ObjectiveId::new("b.1"))
        .await
        .expect("loaded");
    assert!(outcome.checked);
    assert_eq!(outcome.stale.len(), 4);
    assert_eq!(outcome.stale[0], NodeKey::Objective(ObjectiveId::new("b")));

    let sub = service.progress(&subtopic());
    assert_eq!(sub, Progress::new(1, 3));
    assert_eq!(sub.rounded_percentage(), 33);

    let refreshed = service.refreshed(&outcome);
    assert_eq!(refreshed[0].1, Progress::new(1, 2));
    assert!(refreshed[1..].iter().all(|(_, p)| *p == Progress::new(1, 3)));

    let raw = store.get(CHECKED_STATE_KEY).await.unwrap().unwrap();
    assert_eq!(raw, r#"{"b.1":true}"#);
}

#[tokio::test]
async fn reload_restores_state_and_ignores_ghost_ids() {
    let store = InMemoryRepository::new();
    store
        .put(CHECKED_STATE_KEY, r#"{"a":true,"ghost-id":true}"#)
        .await
        .unwrap();

    let mut service = ChecklistService::new(Arc::new(store));
    service.load(small_curriculum()).await;

    assert!(service.is_checked("a"));
    assert_eq!(service.overall_progress(), Progress::new(1, 3));
    assert_eq!(
        service.progress(&NodeKey::Objective(ObjectiveId::new("a"))),
        Progress::new(1, 1)
    );
}

#[tokio::test]
async fn corrupt_snapshot_starts_empty_and_is_overwritten() {
    let store = InMemoryRepository::new();
    store.put(CHECKED_STATE_KEY, "{not json").await.unwrap();

    let mut service = ChecklistService::new(Arc::new(store.clone()));
    service.load(small_curriculum()).await;
    assert_eq!(service.overall_progress(), Progress::new(0, 3));

    service.toggle(&ObjectiveId::new("a")).await;
    let raw = store.get(CHECKED_STATE_KEY).await.unwrap().unwrap();
    assert_eq!(raw, r#"{"a":true}"#);
}

#[tokio::test]
async fn failed_writes_keep_the_in_memory_change() {
    let mut service = ChecklistService::new(Arc::new(ReadOnlyStore));
    service.load(small_curriculum()).await;

    let outcome = service.toggle(&ObjectiveId::new("b.2")).await.unwrap();
    assert!(outcome.checked);
    assert!(service.is_checked("b.2"));
    assert_eq!(service.overall_progress(), Progress::new(1, 3));
}

#[tokio::test]
async fn set_checked_reports_no_stale_nodes_when_unchanged() {
    let mut service = ChecklistService::new(Arc::new(InMemoryRepository::new()));
    service.load(small_curriculum()).await;

    let first = service
        .set_checked(&ObjectiveId::new("a"), true)
        .await
        .unwrap();
    assert!(first.is_tracked());

    let again = service
        .set_checked(&ObjectiveId::new("a"), true)
        .await
        .unwrap();
    assert!(again.stale.is_empty());
    assert_eq!(service.overall_progress(), Progress::new(1, 3));
}

#[tokio::test]
async fn queries_answer_defaults_before_load() {
    let mut service = ChecklistService::new(Arc::new(InMemoryRepository::new()));
    assert!(!service.is_loaded());
    assert_eq!(service.overall_progress(), Progress::default());
    assert!(!service.is_checked("a"));
    assert!(service.toggle(&ObjectiveId::new("a")).await.is_none());
}
