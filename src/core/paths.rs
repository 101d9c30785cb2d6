//! Locations of configuration and shared data files

use std::path::{Path, PathBuf};

/// Name of the per-workspace data directory
pub const MAIN_DIR: &str = ".ecr";

/// Name of a directory item's own config file
pub const ITEM_CONFIG_FILE: &str = "config.yml";

/// Resolves every file below a configuration root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configuration root (working directory or home)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/.ecr`
    pub fn main_dir(&self) -> PathBuf {
        self.root.join(MAIN_DIR)
    }

    pub fn config_file(&self) -> PathBuf {
        self.main_dir().join("config.yml")
    }

    pub fn executor_file(&self) -> PathBuf {
        self.main_dir().join("executor.yml")
    }

    pub fn judger_file(&self) -> PathBuf {
        self.main_dir().join("judger.yml")
    }

    pub fn judgers_dir(&self) -> PathBuf {
        self.main_dir().join("judgers")
    }

    /// Shared stdin data for file-bound input
    pub fn input_file(&self) -> PathBuf {
        self.main_dir().join("input.data")
    }

    /// Shared stdout data for file-bound output
    pub fn output_file(&self) -> PathBuf {
        self.main_dir().join("output.data")
    }

    /// Expected output compared by judgers
    pub fn expected_file(&self) -> PathBuf {
        self.main_dir().join("std.data")
    }
}

/// Base directory of the global configuration
pub fn global_base() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Config file of a directory work item
pub fn item_config_file(item_dir: &Path) -> PathBuf {
    item_dir.join(ITEM_CONFIG_FILE)
}
