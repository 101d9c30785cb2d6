//! Test: Execution - fail-fast pipelines and item dispatch

use crate::helpers::*;
use ecr::core::IoMode;

/// A failing non-final step must prevent every later spawn
#[tokio::test]
async fn test_failing_step_stops_later_spawns() {
    let ws = TestWorkspace::new();
    let item = ws.directory_item("proj", &["exit 1", "touch later.marker"], &[]);

    let ok = ws.session().run(&item, None).await;

    assert!(!ok);
    assert!(!ws.exists("proj/later.marker"));
    assert_eq!(ws.errors(), vec!["(1/2) exit 1 -> 1", "Running failed"]);
}

#[tokio::test]
async fn test_single_exit_codes() {
    let ws = TestWorkspace::new();

    let failed = ws.run_steps(&["exit 1"], IoMode::FISO).await;
    assert_failed_after(&failed, 1);
    assert!(ws.console.contains("(1/1) exit 1 -> 1"));

    let passed = ws.run_steps(&["exit 0"], IoMode::FISO).await;
    assert!(passed.success());
    assert_eq!(passed.attempted(), 1);
}

/// Items without commands succeed and spawn nothing
#[tokio::test]
async fn test_empty_command_lists() {
    let ws = TestWorkspace::new();
    let item = ws.directory_item("proj", &[], &[]);
    let session = ws.session();

    assert!(session.run(&item, None).await);
    assert!(session.test(&item, None, false).await);
    assert!(!ws.console.contains("(1/"));

    let report = ws.run_steps(&[], IoMode::FIFO).await;
    assert!(report.success());
    assert_eq!(report.attempted(), 0);
}

#[tokio::test]
async fn test_file_item_gets_file_variables() {
    let ws = TestWorkspace::with_config(|config| {
        config.executors.insert(
            "shellscript".to_string(),
            steps(&["cp {fileName} {fileNameWithoutExt}.copy", "sh {fileName}"]),
        );
    });
    ws.write("hello.sh", "touch ran.marker\n");

    let session = ws.session();
    let item = session.resolve(Some("hello.sh"), false).unwrap();
    assert!(session.run(&item, Some(IoMode::FISO)).await);

    assert!(ws.exists("hello.copy"));
    assert!(ws.exists("ran.marker"));
    assert!(ws.console.contains("(1/2) cp hello.sh hello.copy"));
    assert!(ws.console.contains("(2/2) sh hello.sh"));
}

/// Directory items have no file variables; using one fails without spawning
#[tokio::test]
async fn test_directory_item_rejects_file_variables() {
    let ws = TestWorkspace::new();
    let item = ws.directory_item("proj", &["touch {fileName}"], &[]);

    assert!(!ws.session().run(&item, None).await);
    assert_eq!(std::fs::read_dir(ws.file("proj")).unwrap().count(), 1);
}

#[tokio::test]
async fn test_directory_item_is_reloaded_from_disk() {
    let ws = TestWorkspace::new();
    ws.directory_item("proj", &["exit 1"], &[]);
    let session = ws.session();

    let item = session.resolve(Some("proj"), true).unwrap();
    assert!(!session.run(&item, None).await);

    ws.directory_item("proj", &["touch fixed.marker"], &[]);
    let item = session.resolve(None, true).unwrap();
    assert!(session.run(&item, None).await);
    assert!(ws.exists("proj/fixed.marker"));
}

#[tokio::test]
async fn test_unknown_language_is_noop() {
    let ws = TestWorkspace::new();
    ws.write("notes.txt", "nothing to run");

    let session = ws.session();
    let item = session.resolve(Some("notes.txt"), false).unwrap();
    assert!(session.run(&item, None).await);
    assert!(!ws.console.contains("(1/"));
}
