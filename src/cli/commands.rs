//! CLI command definitions

use crate::core::IoMode;
use clap::Args;

/// Initialize a workspace
#[derive(Debug, Args, Clone)]
pub struct InitCommand {
    /// Initialize the global workspace in the home directory
    #[arg(short, long)]
    pub global: bool,
}

/// Remove a workspace
#[derive(Debug, Args, Clone)]
pub struct ClearCommand {
    /// Remove the global workspace in the home directory
    #[arg(short, long)]
    pub global: bool,
}

/// Execute a file or directory item
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// File or directory to run
    pub item: Option<String>,

    /// Treat ITEM as a directory item
    #[arg(short, long)]
    pub dir: bool,

    /// IO mode: ss, sf, fs or ff (defaults to the configured mode)
    #[arg(long, value_parser = parse_io_mode)]
    pub io: Option<IoMode>,

    /// Re-run whenever the item changes
    #[arg(short, long)]
    pub watch: bool,
}

/// Judge a file or directory item
#[derive(Debug, Args, Clone)]
pub struct TestCommand {
    /// File or directory to judge
    pub item: Option<String>,

    /// Treat ITEM as a directory item
    #[arg(short, long)]
    pub dir: bool,

    /// Judger to use (defaults to the configured judger)
    #[arg(short, long)]
    pub judger: Option<String>,

    /// Re-run the item with file IO before judging
    #[arg(short, long)]
    pub reexecute: bool,

    /// Re-judge whenever the item changes
    #[arg(short, long)]
    pub watch: bool,
}

/// Show the loaded configuration
#[derive(Debug, Args, Clone)]
pub struct StatusCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse an IO mode code
pub fn parse_io_mode(s: &str) -> Result<IoMode, String> {
    s.parse::<IoMode>().map_err(|e| e.to_string())
}
