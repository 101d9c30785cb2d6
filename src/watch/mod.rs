//! Watch loop - re-run or re-judge a work item whenever it changes
//!
//! A [`FsSubscription`] feeds modify events into a channel on the watcher's
//! thread. A single consumer filters and debounces them and dispatches one
//! run at a time. Events stamped while a run is in flight, or within one
//! debounce window after it, are dropped: a run that writes into the watched
//! directory must not trigger itself.

pub mod debounce;
pub mod subscription;

pub use debounce::{Debouncer, EventFilter, DEBOUNCE_WINDOW};
pub use subscription::{FsSubscription, WatchEvent};

use crate::{core::IoMode, session::Session};
use anyhow::{Context, Result};
use console::style;
use std::future::Future;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// What to do each time the watched item changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    Execute {
        io: Option<IoMode>,
    },
    Judge {
        judger: Option<String>,
        reexecute: bool,
    },
}

/// Consume watch events until `stop` is cancelled or the channel closes
///
/// Returns how many times `on_trigger` ran.
pub async fn drive<F, Fut>(
    mut events: UnboundedReceiver<WatchEvent>,
    filter: EventFilter,
    mut debouncer: Debouncer,
    stop: CancellationToken,
    mut on_trigger: F,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut triggers = 0;
    let mut busy_until: Option<Instant> = None;

    loop {
        let event = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        if busy_until.is_some_and(|until| event.at <= until) {
            debug!("Ignoring {} changed during a run", event.path.display());
            continue;
        }
        if !filter.accepts(&event.path) || !debouncer.accept(&event.path, event.at) {
            continue;
        }

        on_trigger().await;
        triggers += 1;
        busy_until = Some(Instant::now() + debouncer.window());
    }

    triggers
}

/// Watch `name` and apply `action` on every change until `shutdown` resolves
pub async fn watch<S>(
    session: &Session,
    name: &str,
    is_dir: bool,
    action: WatchAction,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()>,
{
    let item = session.resolve(Some(name), is_dir)?;
    let (root, file_name) = item.watch_scope();

    let (tx, rx) = mpsc::unbounded_channel();
    let mut subscription = FsSubscription::subscribe(&root, false, tx)
        .with_context(|| format!("Failed to watch {}", root.display()))?;

    session
        .console()
        .info(&format!("Watching {} (press ctrl+c to end)", name));
    info!("Watching {} in {}", name, root.display());

    let stop = CancellationToken::new();
    let action = &action;
    let consumer = drive(
        rx,
        EventFilter::new(file_name),
        Debouncer::default(),
        stop.clone(),
        move || on_change(session, name, is_dir, action),
    );
    tokio::pin!(consumer);

    let interrupted = tokio::select! {
        _ = &mut consumer => false,
        _ = shutdown => true,
    };

    if interrupted {
        session.interrupt().cancel();
        stop.cancel();
        let triggers = consumer.await;
        debug!("Watch consumer finished after {} run(s)", triggers);
    }

    subscription.stop();
    session.console().info("Watching end.");
    Ok(())
}

async fn on_change(session: &Session, name: &str, is_dir: bool, action: &WatchAction) {
    let console = session.console();
    console.clear();
    console.write(&format!(
        "{} {} {}",
        style("M").yellow().bold(),
        name,
        style(chrono::Local::now().format("%H:%M:%S")).dim()
    ));

    let item = match session.resolve(Some(name), is_dir) {
        Ok(item) => item,
        Err(e) => {
            error!("Failed to reload '{}': {:#}", name, e);
            console.error(&format!("{:#}", e));
            return;
        }
    };

    match action {
        WatchAction::Execute { io } => {
            session.run(&item, *io).await;
        }
        WatchAction::Judge { judger, reexecute } => {
            session.test(&item, judger.as_deref(), *reexecute).await;
        }
    }
}
