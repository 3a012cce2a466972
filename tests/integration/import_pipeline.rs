// tests/integration/import_pipeline.rs
//! Import pipeline against an in-memory bucket and failing mock stores

use super::*;
use aw_importer_ios_fitness::services::{ImportError, ImportSummary, PathOutcome};
use std::fs;
use tempfile::TempDir;

fn write_export(dir: &TempDir, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, export_csv(rows)).unwrap();
    path
}

// ============================================
// End-to-end through the watcher's per-file handling
// ============================================

#[tokio::test]
async fn test_two_rows_imported_and_file_marked() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW, WALK_ROW]);
    let original = fs::read_to_string(&file).unwrap();

    let store = Arc::new(MemoryEventStore::new());
    let mut watcher = create_test_watcher(temp_dir.path().to_path_buf(), store.clone());

    let outcome = watcher.handle_path(&file).await;

    let marked = temp_dir.path().join("Workouts_imported.csv");
    assert_eq!(
        outcome,
        PathOutcome::Imported {
            summary: ImportSummary {
                added: 2,
                duplicates: 0,
                skipped: 0,
            },
            marked: marked.clone(),
        }
    );
    assert!(!file.exists());
    assert_eq!(fs::read_to_string(&marked).unwrap(), original);
    assert!(status_output(&watcher).contains("Added 2 item(s)"));
    assert_eq!(store.insert_calls(), 1);
    assert_eq!(store.events().len(), 2);

    // The marked file never reaches the pipeline again
    let again = watcher.handle_path(&marked).await;
    assert_eq!(again, PathOutcome::Discarded);
    assert_eq!(store.insert_calls(), 1);
    assert!(marked.exists());
}

#[tokio::test]
async fn test_event_payload_matches_row() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW, WALK_ROW]);

    let store = Arc::new(MemoryEventStore::new());
    let processor = create_test_processor(store.clone());
    processor.process_file(&file).await.unwrap();

    let events = store.events();
    let run = &events[0];
    assert_eq!(run.duration, 1815.0);
    assert_eq!(run.timestamp.to_rfc3339(), "2024-01-01T08:00:00+00:00");
    assert_eq!(
        run.identity(),
        Some("2024-01-01 08:00:00 +0000_2024-01-01 08:30:15 +0000_HKWorkoutActivityTypeRunning")
    );
    assert_eq!(run.data["title"], "HKWorkoutActivityTypeRunning");
    assert_eq!(run.data["product_type"], "Watch6,1");
    assert_eq!(run.data["source_name"], "Alice's Apple Watch");
    assert_eq!(run.data["total_distance"], "5.2");
    assert_eq!(run.data["flights_climbed"], "4");
    assert_eq!(run.data["weather_temp"], "45 degF");
    assert_eq!(run.data["weather_humidity"], "81%");

    let walk = &events[1];
    assert_eq!(walk.duration, 2700.0);
    assert_eq!(walk.data["product_type"], "");
    assert_eq!(walk.data["flights_climbed"], "");
    assert_eq!(walk.data["timezone"], "Europe/Paris");
}

// ============================================
// Dedup and idempotence
// ============================================

#[tokio::test]
async fn test_reimport_without_rename_adds_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW, WALK_ROW]);

    let store = Arc::new(MemoryEventStore::new());
    let processor = create_test_processor(store.clone());

    let first = processor.process_file(&file).await.unwrap();
    let second = processor.process_file(&file).await.unwrap();

    assert_eq!(first.added, 2);
    assert_eq!(second.added, 0);
    assert_eq!(second.duplicates, 2);
    assert_eq!(store.events().len(), 2);
    // Nothing new, nothing submitted
    assert_eq!(store.insert_calls(), 1);
}

#[tokio::test]
async fn test_existing_identities_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW, WALK_ROW]);

    let store = Arc::new(MemoryEventStore::with_identities(&[
        "2024-01-02 18:00:00 +0100_2024-01-02 18:45:00 +0100_HKWorkoutActivityTypeWalking",
    ]));
    let processor = create_test_processor(store.clone());

    let summary = processor.process_file(&file).await.unwrap();

    assert_eq!(summary.added, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(store.events().len(), 2);
}

#[tokio::test]
async fn test_same_rows_in_a_second_file_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let first = write_export(&temp_dir, "January.csv", &[RUN_ROW]);
    let second = write_export(&temp_dir, "January-again.csv", &[RUN_ROW, WALK_ROW]);

    let store = Arc::new(MemoryEventStore::new());
    let mut watcher = create_test_watcher(temp_dir.path().to_path_buf(), store.clone());

    watcher.handle_path(&first).await;
    let outcome = watcher.handle_path(&second).await;

    match outcome {
        PathOutcome::Imported { summary, .. } => {
            assert_eq!(summary.added, 1);
            assert_eq!(summary.duplicates, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(store.events().len(), 2);
}

#[tokio::test]
async fn test_repeated_identity_within_file_is_not_filtered() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW, RUN_ROW]);

    let store = Arc::new(MemoryEventStore::new());
    let processor = create_test_processor(store.clone());

    let summary = processor.process_file(&file).await.unwrap();

    // The identity set is only refreshed between files
    assert_eq!(summary.added, 2);
    assert_eq!(store.identities()[0], store.identities()[1]);
}

// ============================================
// Row isolation
// ============================================

#[tokio::test]
async fn test_bad_row_does_not_block_good_rows() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW, BAD_DATE_ROW, WALK_ROW]);

    let store = Arc::new(MemoryEventStore::new());
    let mut watcher = create_test_watcher(temp_dir.path().to_path_buf(), store.clone());

    let outcome = watcher.handle_path(&file).await;

    match outcome {
        PathOutcome::Imported { summary, marked } => {
            assert_eq!(summary.added, 2);
            assert_eq!(summary.skipped, 1);
            assert!(marked.exists());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(store.events().len(), 2);
}

#[tokio::test]
async fn test_missing_distance_column_normalizes_to_empty() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("Minimal.csv");
    fs::write(
        &file,
        "banner\nactivityType,startDate,endDate\n\
         HKWorkoutActivityTypeRowing,2024-05-01 07:00:00 -0700,2024-05-01 07:20:00 -0700\n",
    )
    .unwrap();

    let store = Arc::new(MemoryEventStore::new());
    let processor = create_test_processor(store.clone());
    let summary = processor.process_file(&file).await.unwrap();

    assert_eq!(summary.added, 1);
    let events = store.events();
    let event = &events[0];
    assert_eq!(event.data["total_distance"], "");
    assert_eq!(event.data["source_name"], "");
    assert_eq!(event.duration, 1200.0);
}

#[tokio::test]
async fn test_only_bad_rows_inserts_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[BAD_DATE_ROW]);

    let store = Arc::new(MemoryEventStore::new());
    let mut watcher = create_test_watcher(temp_dir.path().to_path_buf(), store.clone());

    let outcome = watcher.handle_path(&file).await;

    assert!(matches!(outcome, PathOutcome::Imported { .. }));
    assert_eq!(store.insert_calls(), 0);
    assert!(status_output(&watcher).contains("Added 0 item(s)"));
}

// ============================================
// File-level failures leave the file pending
// ============================================

#[tokio::test]
async fn test_unreadable_file_is_a_file_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryEventStore::new());
    let processor = create_test_processor(store);

    let result = processor
        .process_file(&temp_dir.path().join("missing.csv"))
        .await;

    assert!(matches!(result, Err(ImportError::Read { .. })));
}

#[tokio::test]
async fn test_headerless_file_stays_pending() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("Truncated.csv");
    fs::write(&file, "Workouts exported from Health").unwrap();

    let store = Arc::new(MemoryEventStore::new());
    let mut watcher = create_test_watcher(temp_dir.path().to_path_buf(), store);

    assert_eq!(watcher.handle_path(&file).await, PathOutcome::Failed);
    assert!(file.exists());
}

#[tokio::test]
async fn test_list_failure_leaves_file_pending() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW]);

    let mut store = MockStore::new();
    store
        .expect_list_events()
        .times(1)
        .returning(|_| Err(server_error()));
    store.expect_insert_events().never();

    let store: Arc<dyn EventStore> = Arc::new(store);
    let processor = create_test_processor(store.clone());
    let result = processor.process_file(&file).await;
    assert!(matches!(result, Err(ImportError::Store(_))));

    assert!(file.exists());
}

#[tokio::test]
async fn test_insert_failure_leaves_file_pending() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_export(&temp_dir, "Workouts.csv", &[RUN_ROW, WALK_ROW]);

    let mut store = MockStore::new();
    store.expect_list_events().returning(|_| Ok(vec![]));
    store
        .expect_insert_events()
        .withf(|_, events| events.len() == 2)
        .times(1)
        .returning(|_, _| Err(server_error()));

    let mut watcher = create_test_watcher(temp_dir.path().to_path_buf(), Arc::new(store));

    assert_eq!(watcher.handle_path(&file).await, PathOutcome::Failed);
    assert!(file.exists());
    assert!(!temp_dir.path().join("Workouts_imported.csv").exists());
    assert!(status_output(&watcher).is_empty());
}
