//! CLI output formatting

use crate::core::{language::extension_for_language, Workspace, WorkspaceState};
use console::Emoji;
use serde::Serialize;
use std::path::PathBuf;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

/// Snapshot of a loaded workspace for `ecr status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub working_dir: PathBuf,
    pub config_root: PathBuf,
    pub state: WorkspaceState,
    pub default_io: String,
    pub default_time_limit: Option<f64>,
    pub default_judger: String,
    pub default_shell: Option<String>,
    pub languages: Vec<String>,
    pub judgers: Vec<String>,
}

impl StatusReport {
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let config = workspace.config();
        Self {
            working_dir: workspace.working_dir().to_path_buf(),
            config_root: workspace.config_root().to_path_buf(),
            state: workspace.state(),
            default_io: config.settings.default_io.to_string(),
            default_time_limit: config.settings.default_time_limit,
            default_judger: config.settings.default_judger.clone(),
            default_shell: config.settings.default_shell.clone(),
            languages: config.executors.keys().cloned().collect(),
            judgers: config.judgers.keys().cloned().collect(),
        }
    }
}

/// Human readable workspace state
pub fn format_state(state: WorkspaceState) -> String {
    match state {
        WorkspaceState::Loaded => style("local").green().to_string(),
        WorkspaceState::LoadedFromGlobal => style("global").yellow().to_string(),
    }
}

/// Lines printed by `ecr status`
pub fn format_status_report(report: &StatusReport) -> Vec<String> {
    let mut lines = vec![
        format!("{} Working directory: {}", INFO, style(report.working_dir.display()).bold()),
        format!(
            "  Config root: {} ({})",
            style(report.config_root.display()).dim(),
            format_state(report.state)
        ),
        format!("  Default IO: {}", style(&report.default_io).cyan()),
        format!(
            "  Default time limit: {}",
            style(match report.default_time_limit {
                Some(secs) => format!("{}s", secs),
                None => "none".to_string(),
            })
            .cyan()
        ),
        format!("  Default judger: {}", style(&report.default_judger).cyan()),
    ];

    if let Some(shell) = &report.default_shell {
        lines.push(format!("  Shell: {}", style(shell).cyan()));
    }

    lines.push(format!("  Languages ({}):", report.languages.len()));
    for language in &report.languages {
        match extension_for_language(language) {
            Some(ext) => lines.push(format!("    {} {}", language, style(format!(".{}", ext)).dim())),
            None => lines.push(format!("    {}", language)),
        }
    }

    lines.push(format!("  Judgers ({}):", report.judgers.len()));
    for judger in &report.judgers {
        let marker = if *judger == report.default_judger { " *" } else { "" };
        lines.push(format!("    {}{}", judger, marker));
    }

    lines
}
