//! Execution and judging dispatch for work items

use crate::{
    core::{
        language::language_for_file, CommandList, DataFiles, IoMode, Pipeline, SubstitutionContext,
        WorkItem, WorkItemKind, Workspace,
    },
    execution::{console::Console, engine::PipelineEngine},
};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Resolves command lists for work items and runs them
pub struct Dispatcher<'a> {
    workspace: &'a Workspace,
    console: Arc<dyn Console>,
    engine: PipelineEngine,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        workspace: &'a Workspace,
        console: Arc<dyn Console>,
        interrupt: CancellationToken,
    ) -> Self {
        Self {
            workspace,
            engine: PipelineEngine::new(console.clone(), interrupt),
            console,
        }
    }

    /// Run an item; `None` uses the configured default IO mode
    ///
    /// Returns true iff every step exited zero. An item without commands
    /// succeeds without spawning anything.
    pub async fn execute(&self, item: &WorkItem, io: Option<IoMode>) -> bool {
        self.console.info(&format!("Running {}", item.name));

        let config = self.workspace.config();
        let io = io.unwrap_or(config.settings.default_io);

        let (commands, context) = match item.kind {
            WorkItemKind::File => {
                let commands = match language_for_file(&item.name) {
                    Some(language) => config.commands_for_language(language),
                    None => {
                        warn!("No language registered for '{}'", item.name);
                        CommandList::new()
                    }
                };
                (commands, SubstitutionContext::for_file(&item.name))
            }
            WorkItemKind::Directory => (
                item.run.clone().unwrap_or_default(),
                SubstitutionContext::new(),
            ),
        };

        if commands.is_empty() {
            debug!("Nothing to run for '{}'", item.name);
            return true;
        }

        let paths = self.workspace.paths();
        let pipeline = self
            .pipeline(commands, &item.path)
            .with_io(io, DataFiles::new(paths.input_file(), paths.output_file()));

        self.engine.run(&pipeline, &context).await.success()
    }

    /// Judge an item, optionally re-running it with file IO first
    ///
    /// `judger` picks a configured judger for file items (the default judger
    /// when `None`). Directory items use their own `test` commands.
    pub async fn judge(&self, item: &WorkItem, judger: Option<&str>, reexecute: bool) -> bool {
        if reexecute && !self.execute(item, Some(IoMode::FIFO)).await {
            self.console.error("Running failed");
            return false;
        }

        self.console.info(&format!("Judging {}", item.name));

        let config = self.workspace.config();
        let commands = match item.kind {
            WorkItemKind::File => {
                let name = judger.unwrap_or(config.settings.default_judger.as_str());
                match config.judger(name) {
                    Some(commands) => commands.clone(),
                    None => {
                        error!("Judger '{}' is not configured", name);
                        self.console.error(&format!("Judger {} not found", name));
                        return false;
                    }
                }
            }
            WorkItemKind::Directory => item.test.clone().unwrap_or_default(),
        };

        if commands.is_empty() {
            debug!("Nothing to judge for '{}'", item.name);
            return true;
        }

        let paths = self.workspace.paths();
        let context = SubstitutionContext::for_judger(
            &paths.judgers_dir(),
            &paths.expected_file(),
            &paths.output_file(),
        );
        let pipeline = self.pipeline(commands, &item.path).with_limited_interactive();

        self.engine.run(&pipeline, &context).await.success()
    }

    fn pipeline(&self, commands: CommandList, working_dir: &Path) -> Pipeline {
        let config = self.workspace.config();
        Pipeline::new(commands, working_dir)
            .with_default_time_limit(config.default_time_limit())
            .with_shell(config.settings.default_shell.clone())
    }
}
