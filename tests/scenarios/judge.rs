//! Test: Judging - judger resolution, re-execution and verdicts

use crate::helpers::*;

fn workspace_with_marker_judger() -> TestWorkspace {
    TestWorkspace::with_config(|config| {
        config
            .judgers
            .insert("mark".to_string(), steps(&["touch judged.marker"]));
    })
}

/// A failing re-execution returns false without running the judger
#[tokio::test]
async fn test_failed_reexecution_skips_judger() {
    let ws = workspace_with_marker_judger();
    ws.write("bad.sh", "exit 3\n");

    let session = ws.session();
    let item = session.resolve(Some("bad.sh"), false).unwrap();
    assert!(!session.test(&item, Some("mark"), true).await);

    assert!(!ws.exists("judged.marker"));
    assert!(!ws.console.contains("Judging bad.sh"));
    let errors = ws.errors();
    assert_eq!(errors[errors.len() - 2..], ["Running failed", "Judging failed"]);
}

#[tokio::test]
async fn test_matching_output_passes() {
    let ws = TestWorkspace::new();
    ws.write("hello.sh", "echo hello\n");
    ws.set_expected("hello\n");

    let session = ws.session();
    let item = session.resolve(Some("hello.sh"), false).unwrap();
    assert!(session.test(&item, None, true).await);
    assert!(ws.console.contains("Judging passed"));
}

/// `diff -Z` ignores trailing whitespace, `cmp` does not
#[tokio::test]
async fn test_default_and_strict_judgers() {
    let ws = TestWorkspace::new();
    ws.write("hello.sh", "printf 'hello  \\n'\n");
    ws.set_expected("hello\n");

    let session = ws.session();
    let item = session.resolve(Some("hello.sh"), false).unwrap();
    assert!(session.test(&item, None, true).await);
    assert!(!session.test(&item, Some("strict"), false).await);
}

#[tokio::test]
async fn test_mismatch_fails() {
    let ws = TestWorkspace::new();
    ws.write("hello.sh", "echo goodbye\n");
    ws.set_expected("hello\n");

    let session = ws.session();
    let item = session.resolve(Some("hello.sh"), false).unwrap();
    assert!(!session.test(&item, None, true).await);
    assert!(ws.console.contains("Judging failed"));
}

/// Without re-execution the existing output file is judged as is
#[tokio::test]
async fn test_judges_existing_output_without_reexecution() {
    let ws = workspace_with_marker_judger();
    ws.write("never.sh", "touch executed.marker\n");
    ws.set_expected("42\n");
    std::fs::write(ws.paths().output_file(), "42\n").unwrap();

    let session = ws.session();
    let item = session.resolve(Some("never.sh"), false).unwrap();
    assert!(session.test(&item, None, false).await);
    assert!(!ws.exists("executed.marker"));
}

#[tokio::test]
async fn test_unknown_judger_fails() {
    let ws = TestWorkspace::new();
    let session = ws.session();
    let item = session.resolve(Some("a.sh"), false).unwrap();

    assert!(!session.test(&item, Some("fuzzy"), false).await);
    assert!(ws.console.contains("Judger fuzzy not found"));
}

#[tokio::test]
async fn test_judger_variables() {
    let ws = TestWorkspace::with_config(|config| {
        config.judgers.insert(
            "paths".to_string(),
            steps(&["test -d {judgerDir}", "test -f {expectFile}", "test -f {realFile}"]),
        );
        config.settings.default_judger = "paths".to_string();
    });

    let session = ws.session();
    let item = session.resolve(Some("a.sh"), false).unwrap();
    assert!(session.test(&item, None, false).await);
    assert_eq!(ws.console.lines_of(ecr::execution::LineKind::Write).iter().filter(|l| l.starts_with("(")).count(), 3);
}

#[tokio::test]
async fn test_directory_item_runs_its_tests_in_place() {
    let ws = TestWorkspace::new();
    let item = ws.directory_item("proj", &["printf built > build.out"], &["test -f build.out"]);
    let session = ws.session();

    assert!(!session.test(&item, None, false).await);
    assert!(session.test(&item, None, true).await);
    assert!(ws.exists("proj/build.out"));
}
