mod common;

use std::io::Write;

use services::{AppConfig, AppContext, CurriculumOrigin, FileCurriculumSource};
use storage::repository::Storage;
use study_core::model::{ObjectiveId, Progress};
use study_core::time::fixed_clock;

use common::SMALL_CURRICULUM;

#[tokio::test]
async fn assembles_from_a_curriculum_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SMALL_CURRICULUM.as_bytes()).unwrap();
    let source = FileCurriculumSource::new(file.path());

    let config = AppConfig::default();
    let mut context = AppContext::assemble(
        Storage::in_memory(),
        &source,
        config.date_range().unwrap(),
        fixed_clock(),
    )
    .await;

    assert_eq!(
        context.origin(),
        &CurriculumOrigin::Source(file.path().display().to_string())
    );
    assert_eq!(context.checklist().overall_progress(), Progress::new(0, 3));
    // Parents are scheduled as one item; sub-objectives are not flattened.
    assert_eq!(context.revision().stats().total, 2);

    context
        .checklist_mut()
        .toggle(&ObjectiveId::new("a"))
        .await
        .unwrap();
    assert_eq!(context.checklist().overall_progress(), Progress::new(1, 3));
    // The two features keep separate state.
    assert_eq!(context.revision().stats().completed, 0);
}

#[tokio::test]
async fn malformed_curriculum_falls_back_to_sample() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"components\": 42}").unwrap();

    let context = AppContext::assemble(
        Storage::in_memory(),
        &FileCurriculumSource::new(file.path()),
        AppConfig::default().date_range().unwrap(),
        fixed_clock(),
    )
    .await;

    assert_eq!(context.origin(), &CurriculumOrigin::Fallback);
    assert_eq!(context.curriculum().leaf_count(), 10);
    assert_eq!(context.revision().stats().total, 10);
}

#[tokio::test]
async fn bootstrap_opens_sqlite_and_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        curriculum: dir.path().join("missing.json").display().to_string(),
        database_url: "sqlite:file:memdb_context_bootstrap?mode=memory&cache=shared".into(),
        ..AppConfig::default()
    };

    let mut first = AppContext::bootstrap(&config, fixed_clock()).await.unwrap();
    assert_eq!(first.origin(), &CurriculumOrigin::Fallback);
    first
        .checklist_mut()
        .toggle(&ObjectiveId::new("1.1.1.a"))
        .await
        .unwrap();
    first.revision_mut().mark_completed("obj-4").await.unwrap();

    let second = AppContext::bootstrap(&config, fixed_clock()).await.unwrap();
    assert!(second.checklist().is_checked("1.1.1.a"));
    assert_eq!(second.revision().stats().completed, 1);
    drop(first);
}

#[tokio::test]
async fn bootstrap_rejects_inverted_dates() {
    let config = AppConfig {
        start_date: AppConfig::default().end_date,
        end_date: AppConfig::default().start_date,
        ..AppConfig::default()
    };
    assert!(AppContext::bootstrap(&config, fixed_clock()).await.is_err());
}

#[tokio::test]
async fn bundled_curriculum_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../resources/learning-objectives.json");
    let loaded = services::load_or_fallback(&FileCurriculumSource::new(path)).await;
    assert!(matches!(loaded.origin, CurriculumOrigin::Source(_)));
    assert_eq!(loaded.curriculum.objectives().count(), 9);
    assert_eq!(loaded.curriculum.leaf_count(), 15);
}
