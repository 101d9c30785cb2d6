use anyhow::{anyhow, Context, Result};
use ecr::cli::commands::{ClearCommand, InitCommand, RunCommand, StatusCommand, TestCommand};
use ecr::cli::output::*;
use ecr::cli::terminal_output::TerminalConsole;
use ecr::cli::{Cli, Command};
use ecr::core::{paths, Workspace};
use ecr::{watch, Session, WatchAction};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    let ok = match &cli.command {
        Command::Init(cmd) => init_workspace(cmd)?,
        Command::Clear(cmd) => clear_workspace(cmd)?,
        Command::Run(cmd) => run_item(cmd).await?,
        Command::Test(cmd) => test_item(cmd).await?,
        Command::Clean => clean_workspace()?,
        Command::Status(cmd) => show_status(cmd)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn base_dir(global: bool) -> Result<PathBuf> {
    if global {
        paths::global_base().ok_or_else(|| anyhow!("Could not determine the home directory"))
    } else {
        std::env::current_dir().context("Failed to read the current directory")
    }
}

fn load_workspace() -> Result<Workspace> {
    let working_dir = base_dir(false)?;
    Workspace::load(&working_dir)?
        .ok_or_else(|| anyhow!("No workspace found, run `ecr init` first"))
}

fn load_session() -> Result<Session> {
    let session = Session::new(load_workspace()?, Arc::new(TerminalConsole::new()));
    debug!(
        "Loaded workspace from {}",
        session.workspace().config_root().display()
    );
    Ok(session)
}

/// Cancel in-flight steps on ctrl+c
fn forward_ctrl_c(session: &Session) {
    let interrupt = session.interrupt().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
}

fn init_workspace(cmd: &InitCommand) -> Result<bool> {
    let base = base_dir(cmd.global)?;
    Workspace::initialize(&base)?;
    println!(
        "{}Initialized workspace at {}",
        CHECK,
        style(base.display()).bold()
    );
    Ok(true)
}

fn clear_workspace(cmd: &ClearCommand) -> Result<bool> {
    let base = base_dir(cmd.global)?;
    if !Workspace::has_initialized(&base) {
        println!("{}No workspace at {}", WARN, style(base.display()).dim());
        return Ok(true);
    }
    Workspace::clear(&base)?;
    println!("{}Cleared workspace at {}", CHECK, style(base.display()).bold());
    Ok(true)
}

async fn run_item(cmd: &RunCommand) -> Result<bool> {
    let session = load_session()?;
    let item = session.resolve(cmd.item.as_deref(), cmd.dir)?;

    if cmd.watch {
        let action = WatchAction::Execute { io: cmd.io };
        watch(&session, &item.name, cmd.dir, action, ctrl_c()).await?;
        return Ok(true);
    }

    forward_ctrl_c(&session);
    Ok(session.run(&item, cmd.io).await)
}

async fn test_item(cmd: &TestCommand) -> Result<bool> {
    let session = load_session()?;
    let item = session.resolve(cmd.item.as_deref(), cmd.dir)?;

    if cmd.watch {
        let action = WatchAction::Judge {
            judger: cmd.judger.clone(),
            reexecute: cmd.reexecute,
        };
        watch(&session, &item.name, cmd.dir, action, ctrl_c()).await?;
        return Ok(true);
    }

    forward_ctrl_c(&session);
    Ok(session.test(&item, cmd.judger.as_deref(), cmd.reexecute).await)
}

fn clean_workspace() -> Result<bool> {
    let workspace = load_workspace()?;
    let removed = workspace.clean()?;

    if removed.is_empty() {
        println!("{}Nothing to clean", INFO);
    }
    for name in &removed {
        println!("{}Removed {}", CHECK, style(name).dim());
    }
    Ok(true)
}

fn show_status(cmd: &StatusCommand) -> Result<bool> {
    let workspace = load_workspace()?;
    let report = StatusReport::from_workspace(&workspace);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_status_report(&report) {
            println!("{}", line);
        }
    }
    Ok(true)
}
