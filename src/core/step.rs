//! Command step and IO mode models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A single command of a pipeline
///
/// In YAML a step is either a plain template string or a two-element list
/// `[template, seconds]` carrying its own time limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CommandStepRepr", into = "CommandStepRepr")]
pub struct CommandStep {
    /// Command template with `{placeholder}` substitutions
    pub template: String,

    /// Time limit in seconds (overrides the pipeline default)
    pub time_limit_secs: Option<f64>,
}

/// Ordered list of steps; order is execution order
pub type CommandList = Vec<CommandStep>;

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CommandStepRepr {
    Plain(String),
    Limited(String, f64),
}

impl From<CommandStepRepr> for CommandStep {
    fn from(repr: CommandStepRepr) -> Self {
        match repr {
            CommandStepRepr::Plain(template) => CommandStep::new(template),
            CommandStepRepr::Limited(template, secs) => CommandStep::with_time_limit(template, secs),
        }
    }
}

impl From<CommandStep> for CommandStepRepr {
    fn from(step: CommandStep) -> Self {
        match step.time_limit_secs {
            Some(secs) => CommandStepRepr::Limited(step.template, secs),
            None => CommandStepRepr::Plain(step.template),
        }
    }
}

impl CommandStep {
    /// Create a step that uses the pipeline default time limit
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            time_limit_secs: None,
        }
    }

    /// Create a step with its own time limit
    pub fn with_time_limit(template: impl Into<String>, secs: f64) -> Self {
        Self {
            template: template.into(),
            time_limit_secs: Some(secs),
        }
    }

    /// Effective time limit given the pipeline default
    pub fn effective_time_limit(&self, default: Option<Duration>) -> Option<Duration> {
        match self.time_limit_secs {
            Some(secs) => secs_to_duration(secs),
            None => default,
        }
    }
}

impl From<&str> for CommandStep {
    fn from(template: &str) -> Self {
        CommandStep::new(template)
    }
}

/// Convert seconds from config into a duration; non-positive or non-finite
/// values mean "no limit".
pub fn secs_to_duration(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

/// Where one standard stream of the final step goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Inherit the console
    Console,
    /// Bound to the shared input or output data file
    File,
}

/// IO mode code: first char routes stdin, second routes stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IoMode {
    pub stdin: Route,
    pub stdout: Route,
}

/// Error for an IO mode code outside the four valid values
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid IO mode '{0}' (expected one of ss, sf, fs, ff)")]
pub struct ParseIoModeError(pub String);

impl IoMode {
    /// Console in, console out
    pub const SISO: IoMode = IoMode { stdin: Route::Console, stdout: Route::Console };
    /// Console in, file out
    pub const SIFO: IoMode = IoMode { stdin: Route::Console, stdout: Route::File };
    /// File in, console out
    pub const FISO: IoMode = IoMode { stdin: Route::File, stdout: Route::Console };
    /// File in, file out
    pub const FIFO: IoMode = IoMode { stdin: Route::File, stdout: Route::File };

    pub const ALL: [IoMode; 4] = [IoMode::SISO, IoMode::SIFO, IoMode::FISO, IoMode::FIFO];

    /// Two-character code for this mode
    pub fn code(&self) -> &'static str {
        match (self.stdin, self.stdout) {
            (Route::Console, Route::Console) => "ss",
            (Route::Console, Route::File) => "sf",
            (Route::File, Route::Console) => "fs",
            (Route::File, Route::File) => "ff",
        }
    }

    /// Whether stdin of the final step is the console
    pub fn interactive_stdin(&self) -> bool {
        self.stdin == Route::Console
    }
}

impl Default for IoMode {
    fn default() -> Self {
        IoMode::SISO
    }
}

impl FromStr for IoMode {
    type Err = ParseIoModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IoMode::ALL
            .into_iter()
            .find(|mode| mode.code() == s)
            .ok_or_else(|| ParseIoModeError(s.to_string()))
    }
}

impl TryFrom<String> for IoMode {
    type Error = ParseIoModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IoMode> for String {
    fn from(mode: IoMode) -> Self {
        mode.code().to_string()
    }
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
