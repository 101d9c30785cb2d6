//! Step runner - spawns and supervises exactly one process

use crate::execution::{error::RunError, shell::ShellCommand};
use std::fs::File;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Lifecycle of a runner; the last three states are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    NotStarted,
    Running,
    Completed,
    TimedOut,
    Cancelled,
}

/// Where the child's stdin comes from
#[derive(Debug)]
pub enum InputBinding {
    /// Inherit the console
    Console,
    /// A pipe fed through [`StepRunner::send_input`]
    Piped,
    /// A file opened for this run
    File(File),
}

/// Where the child's stdout goes
#[derive(Debug)]
pub enum OutputBinding {
    /// Inherit the console
    Console,
    /// A file opened for this run
    File(File),
}

impl From<InputBinding> for Stdio {
    fn from(binding: InputBinding) -> Self {
        match binding {
            InputBinding::Console => Stdio::inherit(),
            InputBinding::Piped => Stdio::piped(),
            InputBinding::File(file) => Stdio::from(file),
        }
    }
}

impl From<OutputBinding> for Stdio {
    fn from(binding: OutputBinding) -> Self {
        match binding {
            OutputBinding::Console => Stdio::inherit(),
            OutputBinding::File(file) => Stdio::from(file),
        }
    }
}

/// Classified result of one process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Exited with code 0
    Success,
    /// Exited otherwise
    Failed { code: Option<i32> },
    /// Exceeded its time limit and was terminated
    TimedOut { code: Option<i32> },
    /// Interrupted by the user and terminated
    Cancelled { code: Option<i32> },
}

/// Outcome of a supervised process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub elapsed: Duration,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Timeouts and user interrupts are reported the same way
    pub fn is_timeout(&self) -> bool {
        matches!(self.status, RunStatus::TimedOut { .. } | RunStatus::Cancelled { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            RunStatus::Success => Some(0),
            RunStatus::Failed { code }
            | RunStatus::TimedOut { code }
            | RunStatus::Cancelled { code } => code,
        }
    }
}

/// Exit code, or the negated signal number for signal deaths
fn exit_code(status: ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.code().or_else(|| status.signal().map(|signal| -signal))
    }
    #[cfg(not(unix))]
    {
        status.code()
    }
}

enum Wait {
    Exited(std::io::Result<ExitStatus>),
    Elapsed,
    Interrupted,
}

/// Put the child in a process group of its own so the whole tree can be killed
///
/// A background group reading the terminal is stopped by SIGTTIN, so a child
/// inheriting an interactive stdin stays in the foreground group. Returns
/// whether the child leads its own group.
#[cfg(unix)]
fn isolate_group(command: &mut Command, stdin: &InputBinding) -> bool {
    use std::io::IsTerminal;

    if matches!(stdin, InputBinding::Console) && std::io::stdin().is_terminal() {
        return false;
    }
    command.process_group(0);
    true
}

#[cfg(not(unix))]
fn isolate_group(_command: &mut Command, _stdin: &InputBinding) -> bool {
    false
}

#[cfg(unix)]
fn kill_group(pgid: u32) -> std::io::Result<()> {
    let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

async fn sleep_or_forever(limit: Option<Duration>) {
    match limit {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending::<()>().await,
    }
}

/// Runs one process under a time limit and an interrupt token
#[derive(Debug)]
pub struct StepRunner {
    child: Option<Child>,
    /// Process group led by the child, if it has one
    group: Option<u32>,
    state: RunnerState,
    time_limit: Option<Duration>,
    started_at: Option<Instant>,
    command: String,
}

impl StepRunner {
    /// Create a runner; `None` means no time limit
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self {
            child: None,
            group: None,
            state: RunnerState::NotStarted,
            time_limit,
            started_at: None,
            command: String::new(),
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunnerState::Running
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// OS process id while running
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(|child| child.id())
    }

    /// Spawn the process
    pub fn start(
        &mut self,
        command: &ShellCommand,
        working_dir: &Path,
        stdin: InputBinding,
        stdout: OutputBinding,
    ) -> Result<(), RunError> {
        if self.state != RunnerState::NotStarted {
            return Err(RunError::AlreadyStarted);
        }

        debug!(
            "Spawning '{}' in {} (limit: {:?})",
            command.line(),
            working_dir.display(),
            self.time_limit
        );

        let mut cmd = command.to_command();
        let isolated = isolate_group(&mut cmd, &stdin);
        let child = cmd
            .current_dir(working_dir)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: command.line().to_string(),
                source,
            })?;

        self.group = if isolated { child.id() } else { None };
        self.child = Some(child);
        self.command = command.line().to_string();
        self.started_at = Some(Instant::now());
        self.state = RunnerState::Running;
        Ok(())
    }

    /// Wait for exit, the time limit, or an interrupt
    ///
    /// On time limit or interrupt the process is killed and reaped before
    /// this returns, so a `TimedOut`/`Cancelled` outcome never leaves a live
    /// child behind.
    pub async fn await_completion(
        &mut self,
        interrupt: &CancellationToken,
    ) -> Result<RunOutcome, RunError> {
        let limit = self.time_limit;
        let child = match (self.state, self.child.as_mut()) {
            (RunnerState::Running, Some(child)) => child,
            _ => return Err(RunError::NotRunning),
        };

        let waited = tokio::select! {
            biased;
            status = child.wait() => Wait::Exited(status),
            _ = interrupt.cancelled() => Wait::Interrupted,
            _ = sleep_or_forever(limit) => Wait::Elapsed,
        };

        let status = match waited {
            Wait::Exited(status) => {
                let status = status?;
                self.child = None;
                self.group = None;
                self.state = RunnerState::Completed;
                match exit_code(status) {
                    Some(0) => RunStatus::Success,
                    code => RunStatus::Failed { code },
                }
            }
            Wait::Elapsed => {
                warn!("'{}' exceeded its time limit of {:?}", self.command, limit);
                let code = self.kill_and_reap().await?;
                self.state = RunnerState::TimedOut;
                RunStatus::TimedOut { code }
            }
            Wait::Interrupted => {
                warn!("'{}' interrupted", self.command);
                let code = self.kill_and_reap().await?;
                self.state = RunnerState::Cancelled;
                RunStatus::Cancelled { code }
            }
        };

        Ok(RunOutcome {
            status,
            elapsed: self.elapsed(),
        })
    }

    /// Kill the process (and its group) and wait until it has exited
    ///
    /// Idempotent: calling it on a runner that is not running does nothing.
    pub async fn terminate(&mut self) -> Result<(), RunError> {
        if self.child.is_some() {
            self.kill_and_reap().await?;
            self.state = RunnerState::Cancelled;
        }
        Ok(())
    }

    /// Write to the child's stdin and flush
    ///
    /// Only valid for runners started with [`InputBinding::Piped`].
    pub async fn send_input(&mut self, data: &[u8]) -> Result<(), RunError> {
        let child = self.child.as_mut().ok_or(RunError::NotRunning)?;
        let stdin = child.stdin.as_mut().ok_or(RunError::StdinNotPiped)?;
        stdin.write_all(data).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Close the piped stdin so the child sees end of input
    pub fn close_input(&mut self) {
        if let Some(child) = self.child.as_mut() {
            child.stdin.take();
        }
    }

    /// Time since the process was started
    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    async fn kill_and_reap(&mut self) -> Result<Option<i32>, RunError> {
        let Some(mut child) = self.child.take() else {
            return Ok(None);
        };

        let group_killed = match self.group.take() {
            #[cfg(unix)]
            Some(pgid) => match kill_group(pgid) {
                Ok(()) => true,
                Err(e) => {
                    debug!("Kill of process group {} failed: {}", pgid, e);
                    false
                }
            },
            _ => false,
        };
        if !group_killed {
            if let Err(e) = child.start_kill() {
                debug!("Kill request for '{}' failed (already exited?): {}", self.command, e);
            }
        }
        let status = child.wait().await?;
        debug!("'{}' terminated with {:?}", self.command, status);
        Ok(exit_code(status))
    }
}
