//! ecr - run source files through configured command pipelines and judge
//! their output

pub mod cli;
pub mod core;
pub mod execution;
pub mod session;
pub mod watch;

// Re-export commonly used types
pub use core::{CommandStep, IoMode, Pipeline, SubstitutionContext, WorkItem, Workspace};
pub use execution::{Console, Dispatcher, MemoryConsole, PipelineEngine, RunError, StepRunner};
pub use session::Session;
pub use watch::{watch, WatchAction};
