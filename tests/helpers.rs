//! Test utility functions for ecr
#![allow(dead_code)]

use ecr::core::config::WorkspaceConfig;
use ecr::core::paths::ConfigPaths;
use ecr::core::{CommandList, CommandStep, DataFiles, IoMode, Pipeline, SubstitutionContext, WorkItem, Workspace};
use ecr::execution::{LineKind, MemoryConsole, PipelineEngine, PipelineReport};
use ecr::Session;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Initialized workspace in a scratch directory
pub struct TestWorkspace {
    dir: TempDir,
    pub workspace: Workspace,
    pub console: Arc<MemoryConsole>,
}

impl TestWorkspace {
    /// Workspace with default configuration and `sh` for shell scripts
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Workspace whose saved configuration is adjusted by `configure`
    pub fn with_config(configure: impl FnOnce(&mut WorkspaceConfig)) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        Workspace::initialize(dir.path()).expect("initialize workspace");

        let mut config = WorkspaceConfig::default();
        config.settings.default_shell = None;
        config
            .executors
            .insert("shellscript".to_string(), steps(&["sh {fileName}"]));
        configure(&mut config);
        config.save(&ConfigPaths::new(dir.path())).expect("save config");

        let workspace = Workspace::load_with_global(dir.path(), None)
            .expect("load workspace")
            .expect("workspace initialized");

        Self {
            dir,
            workspace,
            console: Arc::new(MemoryConsole::new()),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> ConfigPaths {
        self.workspace.paths()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.file(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, content).expect("write file");
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file(name).exists()
    }

    pub fn set_input(&self, content: &str) {
        std::fs::write(self.paths().input_file(), content).expect("write input.data");
    }

    pub fn set_expected(&self, content: &str) {
        std::fs::write(self.paths().expected_file(), content).expect("write std.data");
    }

    pub fn output(&self) -> String {
        std::fs::read_to_string(self.paths().output_file()).expect("read output.data")
    }

    /// Create a directory item with persisted run/test commands
    pub fn directory_item(&self, name: &str, run: &[&str], test: &[&str]) -> WorkItem {
        let path = self.file(name);
        std::fs::create_dir_all(&path).expect("create item dir");
        let mut item = WorkItem::directory(&path, name);
        item.run = Some(steps(run));
        item.test = Some(steps(test));
        item.save().expect("save item config");
        item
    }

    /// Session sharing this workspace's console
    pub fn session(&self) -> Session {
        Session::new(self.workspace.clone(), self.console.clone())
    }

    /// Engine writing to this workspace's console
    pub fn engine(&self, interrupt: CancellationToken) -> PipelineEngine {
        PipelineEngine::new(self.console.clone(), interrupt)
    }

    /// Pipeline over the shared data files of this workspace
    pub fn pipeline(&self, steps: CommandList, io: IoMode) -> Pipeline {
        let paths = self.paths();
        Pipeline::new(steps, self.path())
            .with_io(io, DataFiles::new(paths.input_file(), paths.output_file()))
            .with_default_time_limit(self.workspace.config().default_time_limit())
    }

    /// Run raw steps with the given IO mode
    pub async fn run_steps(&self, lines: &[&str], io: IoMode) -> PipelineReport {
        self.engine(CancellationToken::new())
            .run(&self.pipeline(steps(lines), io), &SubstitutionContext::new())
            .await
    }

    pub fn errors(&self) -> Vec<String> {
        self.console.lines_of(LineKind::Error)
    }
}

pub fn steps(lines: &[&str]) -> CommandList {
    lines.iter().map(|line| CommandStep::new(*line)).collect()
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    condition()
}

/// Assert that the pipeline failed after exactly `attempted` steps
pub fn assert_failed_after(report: &PipelineReport, attempted: usize) {
    assert!(!report.success(), "pipeline unexpectedly succeeded");
    assert_eq!(
        report.attempted(),
        attempted,
        "expected {} attempted step(s), got {}",
        attempted,
        report.attempted()
    );
}
