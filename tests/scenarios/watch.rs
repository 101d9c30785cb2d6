//! Test: Watch loop - real filesystem events driving dispatch

use crate::helpers::*;
use ecr::{watch, WatchAction};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

async fn shutdown_on(rx: oneshot::Receiver<()>) {
    let _ = rx.await;
}

#[tokio::test]
async fn test_modifying_file_triggers_run() {
    let ws = TestWorkspace::new();
    ws.write("w.sh", "printf x >> runs.log\n");
    let session = ws.session();
    let (stop_tx, stop_rx) = oneshot::channel();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.write("w.sh", "printf y >> runs.log\n");
        let ran = wait_for(Duration::from_secs(5), || {
            std::fs::read_to_string(ws.file("runs.log")).is_ok_and(|log| log == "y")
        })
        .await;
        let _ = stop_tx.send(());
        ran
    };

    let (watched, ran) = tokio::join!(
        watch(&session, "w.sh", false, WatchAction::Execute { io: None }, shutdown_on(stop_rx)),
        driver,
    );

    watched.unwrap();
    assert!(ran, "modification did not trigger a run");
    assert_eq!(std::fs::read_to_string(ws.file("runs.log")).unwrap(), "y");
    assert!(ws.console.contains("Watching w.sh (press ctrl+c to end)"));
    assert!(ws.console.contains("Watching end."));
    assert!(ws.console.clear_count() >= 1);
    assert!(ws.console.lines().iter().any(|l| l.starts_with("M w.sh ")));
}

/// Changes to other files in the directory are ignored
#[tokio::test]
async fn test_other_files_do_not_trigger() {
    let ws = TestWorkspace::new();
    ws.write("w.sh", "touch ran.marker\n");
    let session = ws.session();
    let (stop_tx, stop_rx) = oneshot::channel();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.write("other.sh", "echo unrelated\n");
        tokio::time::sleep(Duration::from_millis(600)).await;
        let _ = stop_tx.send(());
    };

    let (watched, _) = tokio::join!(
        watch(&session, "w.sh", false, WatchAction::Execute { io: None }, shutdown_on(stop_rx)),
        driver,
    );

    watched.unwrap();
    assert!(!ws.exists("ran.marker"));
    assert_eq!(ws.console.clear_count(), 0);
}

#[tokio::test]
async fn test_directory_item_rejudged_on_change() {
    let ws = TestWorkspace::new();
    ws.directory_item("proj", &[], &["touch judged.marker"]);
    let session = ws.session();
    let (stop_tx, stop_rx) = oneshot::channel();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.write("proj/main.c", "int main(void) { return 0; }\n");
        let judged = wait_for(Duration::from_secs(5), || ws.exists("proj/judged.marker")).await;
        let _ = stop_tx.send(());
        judged
    };

    let action = WatchAction::Judge {
        judger: None,
        reexecute: false,
    };
    let (watched, judged) = tokio::join!(
        watch(&session, "proj", true, action, shutdown_on(stop_rx)),
        driver,
    );

    watched.unwrap();
    assert!(judged, "modification did not trigger judging");
    assert!(ws.console.contains("Judging passed"));
}

/// Shutdown terminates an in-flight run and waits for it
#[tokio::test]
async fn test_shutdown_interrupts_in_flight_run() {
    let ws = TestWorkspace::new();
    ws.write("slow.sh", "touch started.marker\nsleep 10\ntouch finished.marker\n");
    let session = ws.session();
    let (stop_tx, stop_rx) = oneshot::channel();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.write("slow.sh", "touch started.marker\nsleep 10\ntouch finished.marker\n\n");
        wait_for(Duration::from_secs(5), || ws.exists("started.marker")).await;
        let _ = stop_tx.send(());
    };

    let started = Instant::now();
    let (watched, _) = tokio::join!(
        watch(&session, "slow.sh", false, WatchAction::Execute { io: None }, shutdown_on(stop_rx)),
        driver,
    );

    watched.unwrap();
    assert!(started.elapsed() < Duration::from_secs(8));
    assert!(ws.exists("started.marker"));
    assert!(!ws.exists("finished.marker"));
    assert!(ws.console.contains("Time out"));
    assert!(ws.console.contains("Watching end."));
}

/// Failures keep the loop alive for later changes
#[tokio::test]
async fn test_failure_is_not_fatal() {
    let ws = TestWorkspace::new();
    ws.write("w.sh", "exit 1\n");
    let session = ws.session();
    let (stop_tx, stop_rx) = oneshot::channel();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.write("w.sh", "exit 2\n");
        wait_for(Duration::from_secs(5), || ws.console.contains("Running failed")).await;
        tokio::time::sleep(Duration::from_millis(400)).await;
        ws.write("w.sh", "touch fixed.marker\n");
        let fixed = wait_for(Duration::from_secs(5), || ws.exists("fixed.marker")).await;
        let _ = stop_tx.send(());
        fixed
    };

    let (watched, fixed) = tokio::join!(
        watch(&session, "w.sh", false, WatchAction::Execute { io: None }, shutdown_on(stop_rx)),
        driver,
    );

    watched.unwrap();
    assert!(fixed, "loop stopped after a failed run");
}

/// Files a directory item writes while running do not trigger it again
#[tokio::test]
async fn test_run_output_does_not_retrigger() {
    let ws = TestWorkspace::new();
    ws.directory_item("proj", &["sleep 0.4; printf x >> runs.log"], &[]);
    let session = ws.session();
    let (stop_tx, stop_rx) = oneshot::channel();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.write("proj/main.c", "int main(void) { return 0; }\n");
        let ran = wait_for(Duration::from_secs(5), || ws.exists("proj/runs.log")).await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        let _ = stop_tx.send(());
        ran
    };

    let (watched, ran) = tokio::join!(
        watch(&session, "proj", true, WatchAction::Execute { io: None }, shutdown_on(stop_rx)),
        driver,
    );

    watched.unwrap();
    assert!(ran, "modification did not trigger a run");
    assert_eq!(std::fs::read_to_string(ws.file("proj/runs.log")).unwrap(), "x");
}

/// Each change re-reads the item's config.yml
#[tokio::test]
async fn test_directory_item_config_reloaded_on_change() {
    let ws = TestWorkspace::new();
    ws.directory_item("proj", &["printf old >> runs.log"], &[]);
    let session = ws.session();
    let (stop_tx, stop_rx) = oneshot::channel();

    let driver = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.directory_item("proj", &["printf new >> runs.log"], &[]);
        let ran = wait_for(Duration::from_secs(5), || {
            std::fs::read_to_string(ws.file("proj/runs.log")).is_ok_and(|log| log.contains("new"))
        })
        .await;
        let _ = stop_tx.send(());
        ran
    };

    let (watched, ran) = tokio::join!(
        watch(&session, "proj", true, WatchAction::Execute { io: None }, shutdown_on(stop_rx)),
        driver,
    );

    watched.unwrap();
    assert!(ran, "rewritten config.yml was not picked up");
    let log = std::fs::read_to_string(ws.file("proj/runs.log")).unwrap();
    assert!(!log.contains("old"));
}
