//! Process execution - step runner, pipeline engine and dispatchers

pub mod console;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod runner;
pub mod shell;

pub use console::{Console, LineKind, MemoryConsole};
pub use dispatcher::Dispatcher;
pub use engine::{PipelineEngine, PipelineReport, StepReport};
pub use error::RunError;
pub use runner::{InputBinding, OutputBinding, RunOutcome, RunStatus, RunnerState, StepRunner};
pub use shell::ShellCommand;
