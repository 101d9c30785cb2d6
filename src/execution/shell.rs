//! Shell invocation of rendered command lines

use tokio::process::Command;

/// A command line wrapped for the configured or platform shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    program: String,
    args: Vec<String>,
    line: String,
}

impl ShellCommand {
    /// Wrap `line` for `shell` (e.g. `powershell -c`), or the platform
    /// default shell when none is configured
    pub fn new(line: &str, shell: Option<&str>) -> Self {
        let mut parts = shell
            .map(|s| s.split_whitespace().map(String::from).collect::<Vec<_>>())
            .unwrap_or_default();

        let (program, mut args) = if parts.is_empty() {
            default_shell()
        } else {
            let program = parts.remove(0);
            (program, parts)
        };
        args.push(line.to_string());

        Self {
            program,
            args,
            line: line.to_string(),
        }
    }

    /// The unwrapped command line
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build a process command
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

#[cfg(unix)]
fn default_shell() -> (String, Vec<String>) {
    ("sh".to_string(), vec!["-c".to_string()])
}

#[cfg(windows)]
fn default_shell() -> (String, Vec<String>) {
    ("cmd".to_string(), vec!["/C".to_string()])
}
