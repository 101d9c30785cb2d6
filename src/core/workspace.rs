//! Workspace - working directory plus the configuration it resolved to

use crate::core::{
    config::WorkspaceConfig,
    item::WorkItem,
    language::file_extension,
    paths::{self, ConfigPaths},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the configuration of a workspace came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkspaceState {
    /// `.ecr` found in the working directory
    Loaded,
    /// No local `.ecr`, fell back to the one in the home directory
    LoadedFromGlobal,
}

/// A working directory with its loaded configuration
#[derive(Debug, Clone)]
pub struct Workspace {
    working_dir: PathBuf,
    config_root: PathBuf,
    state: WorkspaceState,
    config: WorkspaceConfig,
}

impl Workspace {
    /// Whether `base` holds a `.ecr` directory
    pub fn has_initialized(base: &Path) -> bool {
        ConfigPaths::new(base).main_dir().is_dir()
    }

    /// Create a fresh `.ecr` directory with default configuration
    pub fn initialize(base: &Path) -> Result<()> {
        Self::clear(base)?;

        let paths = ConfigPaths::new(base);
        info!("Initializing workspace data at {}", paths.main_dir().display());

        std::fs::create_dir_all(paths.judgers_dir())
            .with_context(|| format!("Failed to create {}", paths.judgers_dir().display()))?;
        WorkspaceConfig::default().save(&paths)?;

        for file in [paths.input_file(), paths.output_file(), paths.expected_file()] {
            std::fs::File::create(&file)
                .with_context(|| format!("Failed to create {}", file.display()))?;
        }

        Ok(())
    }

    /// Remove the `.ecr` directory under `base` if present
    pub fn clear(base: &Path) -> Result<()> {
        let main_dir = ConfigPaths::new(base).main_dir();
        if main_dir.is_dir() {
            debug!("Clearing workspace data at {}", main_dir.display());
            std::fs::remove_dir_all(&main_dir)
                .with_context(|| format!("Failed to remove {}", main_dir.display()))?;
        }
        Ok(())
    }

    /// Load the workspace for `working_dir`, falling back to the global one
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        Self::load_with_global(working_dir, paths::global_base().as_deref())
    }

    /// Load with an explicit global base directory
    pub fn load_with_global(working_dir: &Path, global_base: Option<&Path>) -> Result<Option<Self>> {
        if Self::has_initialized(working_dir) {
            let config = WorkspaceConfig::load(&ConfigPaths::new(working_dir))?;
            return Ok(Some(Self {
                working_dir: working_dir.to_path_buf(),
                config_root: working_dir.to_path_buf(),
                state: WorkspaceState::Loaded,
                config,
            }));
        }

        match global_base {
            Some(global) if Self::has_initialized(global) => {
                info!("Loading global configuration from {}", global.display());
                let config = WorkspaceConfig::load(&ConfigPaths::new(global))?;
                Ok(Some(Self {
                    working_dir: working_dir.to_path_buf(),
                    config_root: global.to_path_buf(),
                    state: WorkspaceState::LoadedFromGlobal,
                    config,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Workspace over an in-memory configuration rooted at `working_dir`
    pub fn from_config(working_dir: impl Into<PathBuf>, config: WorkspaceConfig) -> Self {
        let working_dir = working_dir.into();
        Self {
            config_root: working_dir.clone(),
            working_dir,
            state: WorkspaceState::Loaded,
            config,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Directory whose `.ecr` supplies configuration and data files
    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    pub fn state(&self) -> WorkspaceState {
        self.state
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn paths(&self) -> ConfigPaths {
        ConfigPaths::new(&self.config_root)
    }

    /// Resolve a work item by name, re-reading directory config from disk
    pub fn work_item(&self, name: &str, is_dir: bool) -> Result<WorkItem> {
        if !is_dir {
            return Ok(WorkItem::file(&self.working_dir, name));
        }

        let path = self.working_dir.join(name);
        if paths::item_config_file(&path).is_file() {
            WorkItem::load_directory(path, name)
                .with_context(|| format!("Failed to load directory item '{}'", name))
        } else {
            Ok(WorkItem::directory(path, name))
        }
    }

    /// Delete files in the working directory whose extension is filtered
    ///
    /// Returns the names of removed files.
    pub fn clean(&self) -> Result<Vec<String>> {
        let filter = &self.config.settings.temp_file_filter;
        let mut removed = Vec::new();

        let entries = std::fs::read_dir(&self.working_dir)
            .with_context(|| format!("Failed to list {}", self.working_dir.display()))?;

        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !filter.iter().any(|ext| ext == file_extension(&name)) {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed.push(name),
                Err(e) => warn!("Clean failed for {}: {}", name, e),
            }
        }

        removed.sort();
        Ok(removed)
    }
}
