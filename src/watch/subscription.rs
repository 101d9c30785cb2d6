//! Filesystem subscription on top of `notify`

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// A modified path and when the event was observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub at: Instant,
}

type SharedSender = Arc<Mutex<Option<UnboundedSender<WatchEvent>>>>;

/// Live watch on a directory, delivering modify events to a channel
///
/// Events arrive on the watcher's own thread and are sent while holding the
/// sender lock. [`FsSubscription::stop`] takes the sender under that lock, so
/// once it returns no callback is mid-send and none will send again.
pub struct FsSubscription {
    watcher: Option<RecommendedWatcher>,
    sender: SharedSender,
    root: PathBuf,
}

impl FsSubscription {
    pub fn subscribe(
        path: &Path,
        recursive: bool,
        events: UnboundedSender<WatchEvent>,
    ) -> notify::Result<Self> {
        let sender: SharedSender = Arc::new(Mutex::new(Some(events)));
        let callback_sender = sender.clone();
        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_)) {
                        return;
                    }
                    let at = Instant::now();
                    let guard = callback_sender
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    let Some(events) = guard.as_ref() else {
                        return;
                    };
                    for path in event.paths {
                        if events.send(WatchEvent { path, at }).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            },
            notify::Config::default(),
        )?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, mode)?;
        debug!("Subscribed to {} ({:?})", path.display(), mode);

        Ok(Self {
            watcher: Some(watcher),
            sender,
            root: path.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop delivering events and close the channel. Idempotent.
    ///
    /// Blocks until a callback that is currently sending has finished.
    pub fn stop(&mut self) {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.root) {
                debug!("Unwatch of {} failed: {}", self.root.display(), e);
            }
            debug!("Unsubscribed from {}", self.root.display());
        }
    }
}

impl Drop for FsSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
