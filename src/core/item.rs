//! Work item - a source file or project directory to run and judge

use crate::core::{paths::item_config_file, step::CommandList};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkItemKind {
    File,
    Directory,
}

/// Persisted command lists of a directory item (`<dir>/config.yml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    #[serde(default)]
    pub run: Option<CommandList>,

    #[serde(default)]
    pub test: Option<CommandList>,
}

/// A named file or directory tracked for execution and judging
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    /// Containing directory for files, the item's own directory for directories
    pub path: PathBuf,

    /// Name relative to the working directory
    pub name: String,

    pub kind: WorkItemKind,

    /// Run commands (directory items only)
    pub run: Option<CommandList>,

    /// Judge commands (directory items only)
    pub test: Option<CommandList>,
}

impl WorkItem {
    /// A file item living in `dir`
    pub fn file(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: dir.into(),
            name: name.into(),
            kind: WorkItemKind::File,
            run: None,
            test: None,
        }
    }

    /// A directory item without persisted commands
    pub fn directory(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: WorkItemKind::Directory,
            run: None,
            test: None,
        }
    }

    /// Load a directory item and its `config.yml`
    pub fn load_directory(path: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self> {
        let mut item = Self::directory(path, name);
        let config_path = item_config_file(&item.path);
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: ItemConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        item.run = config.run;
        item.test = config.test;
        Ok(item)
    }

    /// Write an empty `config.yml` into a directory
    pub fn initialize_directory(path: &Path) -> Result<()> {
        let config = ItemConfig {
            run: Some(Vec::new()),
            test: Some(Vec::new()),
        };
        write_item_config(path, &config)
    }

    /// Persist the run/test lists of a directory item
    pub fn save(&self) -> Result<()> {
        if !self.is_directory() {
            anyhow::bail!("Only directory items carry a config file: {}", self.name);
        }
        let config = ItemConfig {
            run: self.run.clone(),
            test: self.test.clone(),
        };
        write_item_config(&self.path, &config)
    }

    pub fn is_directory(&self) -> bool {
        self.kind == WorkItemKind::Directory
    }

    /// Directory to watch and, for file items, the file name to filter on
    pub fn watch_scope(&self) -> (PathBuf, Option<String>) {
        match self.kind {
            WorkItemKind::File => (self.path.clone(), Some(self.name.clone())),
            WorkItemKind::Directory => (self.path.clone(), None),
        }
    }
}

fn write_item_config(dir: &Path, config: &ItemConfig) -> Result<()> {
    let config_path = item_config_file(dir);
    let content = serde_yaml::to_string(config)?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
