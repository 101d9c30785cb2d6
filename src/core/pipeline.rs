//! Pipeline definition - commands plus the IO and time-limit policy applied to them

use crate::core::step::{CommandList, IoMode, Route};
use std::path::PathBuf;
use std::time::Duration;

/// Shared data files the final step may be bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl DataFiles {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// An ordered command list ready to run
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Steps in execution order
    pub steps: CommandList,

    /// Working directory of every step
    pub working_dir: PathBuf,

    /// Routing of the final step's stdin/stdout
    pub io: IoMode,

    /// Files used when `io` binds a stream to a file
    pub data_files: Option<DataFiles>,

    /// Time limit for steps without their own
    pub default_time_limit: Option<Duration>,

    /// Shell prefix commands are handed to
    pub shell: Option<String>,

    /// Keep the time limit on a last step that reads the console
    pub limit_interactive: bool,
}

/// How one step is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    /// Zero-based position
    pub index: usize,
    pub is_last: bool,
    pub stdin: Route,
    pub stdout: Route,
    pub time_limit: Option<Duration>,
}

impl Pipeline {
    /// Console-only pipeline without a default time limit
    pub fn new(steps: CommandList, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            steps,
            working_dir: working_dir.into(),
            io: IoMode::SISO,
            data_files: None,
            default_time_limit: None,
            shell: None,
            limit_interactive: false,
        }
    }

    pub fn with_io(mut self, io: IoMode, data_files: DataFiles) -> Self {
        self.io = io;
        self.data_files = Some(data_files);
        self
    }

    pub fn with_default_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.default_time_limit = limit;
        self
    }

    pub fn with_shell(mut self, shell: Option<String>) -> Self {
        self.shell = shell;
        self
    }

    /// Enforce time limits even when the last step reads the console
    pub fn with_limited_interactive(mut self) -> Self {
        self.limit_interactive = true;
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve routing and time limit of the step at `index`
    ///
    /// Only the last step is routed per the IO mode; earlier steps always
    /// use the console. A last step reading from the console has no limit.
    pub fn plan(&self, index: usize) -> StepPlan {
        let is_last = index + 1 == self.steps.len();
        let time_limit = self
            .steps
            .get(index)
            .and_then(|step| step.effective_time_limit(self.default_time_limit));

        if !is_last {
            return StepPlan {
                index,
                is_last,
                stdin: Route::Console,
                stdout: Route::Console,
                time_limit,
            };
        }

        StepPlan {
            index,
            is_last,
            stdin: self.io.stdin,
            stdout: self.io.stdout,
            time_limit: if self.io.interactive_stdin() && !self.limit_interactive {
                None
            } else {
                time_limit
            },
        }
    }
}
