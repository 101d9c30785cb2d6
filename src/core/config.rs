//! Workspace configuration from YAML

use crate::core::{
    paths::ConfigPaths,
    step::{secs_to_duration, CommandList, CommandStep, IoMode},
};
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Language identifier -> run commands (`executor.yml`)
pub type ExecutorMap = BTreeMap<String, CommandList>;

/// Judger identifier -> judge commands (`judger.yml`)
pub type JudgerMap = BTreeMap<String, CommandList>;

/// General settings (`config.yml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Extensions removed by `clean`
    #[serde(rename = "tempFileFilter")]
    pub temp_file_filter: Vec<String>,

    /// Shell prefix commands are passed to, e.g. `powershell -c`
    #[serde(rename = "defaultShell")]
    pub default_shell: Option<String>,

    /// IO mode used when none is given
    #[serde(rename = "defaultIO")]
    pub default_io: IoMode,

    /// Time limit for steps without their own (seconds, null = none)
    #[serde(rename = "defaultTimeLimit")]
    pub default_time_limit: Option<f64>,

    /// Judger used when none is given
    #[serde(rename = "defaultJudger")]
    pub default_judger: String,

    /// Version that wrote the file
    #[serde(rename = "eVersion")]
    pub version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temp_file_filter: ["exe", "o", "class", "out"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_shell: if cfg!(windows) {
                Some("powershell -c".to_string())
            } else {
                None
            },
            default_io: IoMode::SISO,
            default_time_limit: Some(5.0),
            default_judger: "diff".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Everything loaded from a `.ecr` directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub settings: Settings,
    pub executors: ExecutorMap,
    pub judgers: JudgerMap,
}

fn steps(commands: &[&str]) -> CommandList {
    commands.iter().map(|c| CommandStep::new(*c)).collect()
}

/// Built-in run commands per language
pub fn default_executors() -> ExecutorMap {
    let table: &[(&str, &[&str])] = &[
        ("c", &["gcc {fileName} -o {fileNameWithoutExt}", "./{fileNameWithoutExt}"]),
        ("cpp", &["g++ {fileName} -o {fileNameWithoutExt}", "./{fileNameWithoutExt}"]),
        ("java", &["javac {fileName}", "java {fileNameWithoutExt}"]),
        ("python", &["python {fileName}"]),
        ("pascal", &["fpc {fileName}", "./{fileNameWithoutExt}"]),
        (
            "objective-c",
            &["gcc -framework Cocoa {fileName} -o {fileNameWithoutExt}", "./{fileNameWithoutExt}"],
        ),
        ("javascript", &["node {fileName}"]),
        ("ruby", &["ruby {fileName}"]),
        ("go", &["go run {fileName}"]),
        ("shellscript", &["bash {fileName}"]),
        ("powershell", &["powershell -ExecutionPolicy ByPass -File {fileName}"]),
    ];

    table
        .iter()
        .map(|(lang, commands)| (lang.to_string(), steps(commands)))
        .collect()
}

/// Built-in judgers
pub fn default_judgers() -> JudgerMap {
    let mut judgers = JudgerMap::new();
    judgers.insert("diff".to_string(), steps(&["diff -Z {expectFile} {realFile}"]));
    judgers.insert("strict".to_string(), steps(&["cmp -s {expectFile} {realFile}"]));
    judgers
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_yaml::to_string(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            executors: default_executors(),
            judgers: default_judgers(),
        }
    }
}

impl WorkspaceConfig {
    /// Load the three config files below `paths`
    pub fn load(paths: &ConfigPaths) -> Result<Self> {
        let config = Self {
            settings: read_yaml(&paths.config_file())?,
            executors: read_yaml(&paths.executor_file())?,
            judgers: read_yaml(&paths.judger_file())?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Write the three config files below `paths`
    pub fn save(&self, paths: &ConfigPaths) -> Result<()> {
        write_yaml(&paths.config_file(), &self.settings)?;
        write_yaml(&paths.executor_file(), &self.executors)?;
        write_yaml(&paths.judger_file(), &self.judgers)?;
        Ok(())
    }

    /// Parse settings from a YAML string, keeping built-in executors and judgers
    pub fn from_settings_yaml(yaml: &str) -> Result<Self> {
        let config = Self {
            settings: serde_yaml::from_str(yaml)?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.settings.default_time_limit {
            if !secs.is_finite() || secs < 0.0 {
                anyhow::bail!("defaultTimeLimit must be a non-negative number, got {}", secs);
            }
        }

        for (name, commands) in self.executors.iter().chain(self.judgers.iter()) {
            for step in commands {
                if let Some(secs) = step.time_limit_secs {
                    if !secs.is_finite() || secs < 0.0 {
                        anyhow::bail!("Command '{}' of '{}' has an invalid time limit {}", step.template, name, secs);
                    }
                }
            }
        }

        if !self.judgers.contains_key(&self.settings.default_judger) {
            warn!(
                "Default judger '{}' is not defined in judger.yml",
                self.settings.default_judger
            );
        }

        Ok(())
    }

    /// Run commands for a language (empty when the language is not configured)
    pub fn commands_for_language(&self, language: &str) -> CommandList {
        self.executors.get(language).cloned().unwrap_or_default()
    }

    /// Commands of a judger
    pub fn judger(&self, name: &str) -> Option<&CommandList> {
        self.judgers.get(name)
    }

    /// Pipeline-wide default time limit
    pub fn default_time_limit(&self) -> Option<Duration> {
        self.settings.default_time_limit.and_then(secs_to_duration)
    }
}
