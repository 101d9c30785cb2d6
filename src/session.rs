//! Session - the loaded workspace plus the current work item

use crate::{
    core::{IoMode, WorkItem, Workspace},
    execution::{Console, Dispatcher},
};
use anyhow::{bail, Result};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// State shared by commands and the watch loop
pub struct Session {
    workspace: Workspace,
    current: Mutex<Option<WorkItem>>,
    console: Arc<dyn Console>,
    interrupt: CancellationToken,
}

impl Session {
    pub fn new(workspace: Workspace, console: Arc<dyn Console>) -> Self {
        Self {
            workspace,
            current: Mutex::new(None),
            console,
            interrupt: CancellationToken::new(),
        }
    }

    /// Use an externally owned interrupt token
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn console(&self) -> &Arc<dyn Console> {
        &self.console
    }

    /// Token that terminates in-flight steps when cancelled
    pub fn interrupt(&self) -> &CancellationToken {
        &self.interrupt
    }

    pub fn set_current(&self, item: WorkItem) {
        debug!("Current item set to '{}'", item.name);
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(item);
    }

    pub fn current(&self) -> Option<WorkItem> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Resolve `name` (or the current item's name) freshly from disk
    ///
    /// The resolved item becomes the current one.
    pub fn resolve(&self, name: Option<&str>, is_dir: bool) -> Result<WorkItem> {
        let name = match name {
            Some(name) => name.to_string(),
            None => match self.current() {
                Some(item) => item.name,
                None => bail!("Please set file first"),
            },
        };

        let item = self.workspace.work_item(&name, is_dir)?;
        self.set_current(item.clone());
        Ok(item)
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.workspace, self.console.clone(), self.interrupt.clone())
    }

    /// Execute an item; directory items always use console IO
    pub async fn run(&self, item: &WorkItem, io: Option<IoMode>) -> bool {
        let io = if item.is_directory() { Some(IoMode::SISO) } else { io };
        let ok = self.dispatcher().execute(item, io).await;
        if !ok {
            self.console.error("Running failed");
        }
        ok
    }

    /// Judge an item and report the verdict
    pub async fn test(&self, item: &WorkItem, judger: Option<&str>, reexecute: bool) -> bool {
        let ok = self.dispatcher().judge(item, judger, reexecute).await;
        if ok {
            self.console.ok("Judging passed");
        } else {
            self.console.error("Judging failed");
        }
        ok
    }
}
