//! Command-line interface

pub mod commands;
pub mod output;
pub mod terminal_output;

use clap::{Parser, Subcommand};
use commands::{ClearCommand, InitCommand, RunCommand, StatusCommand, TestCommand};
use std::ffi::OsString;

/// Execute, compare and watch source files
#[derive(Debug, Parser, Clone)]
#[command(name = "ecr")]
#[command(version)]
#[command(about = "Run source files through configured commands and judge their output", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Create the .ecr directory with default configuration
    Init(InitCommand),

    /// Remove the .ecr directory
    Clear(ClearCommand),

    /// Run a file or directory item
    Run(RunCommand),

    /// Judge a file or directory item
    Test(TestCommand),

    /// Delete temporary build files from the working directory
    Clean,

    /// Show the loaded configuration
    Status(StatusCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
