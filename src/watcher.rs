//! Directory watcher built on notify.
//!
//! The platform backend delivers events on its own thread; a forwarding
//! thread filters arrival events down to regular-file paths and hands them
//! to the intake channel. All pipeline state stays on the intake side.

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Handle for a running watcher.
pub struct WatcherHandle {
    stop_tx: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WatcherHandle {
    /// Stop the forwarding thread and wait for it to finish.
    pub fn stop(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Start watching `watch_dir` (non-recursive) and forward each newly-created
/// regular file's path into `candidates`. Fails fast when the directory
/// cannot be watched; everything after startup is logged, not fatal.
pub fn spawn(watch_dir: &Path, candidates: mpsc::Sender<PathBuf>) -> Result<WatcherHandle> {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let (event_tx, event_rx) = mpsc::channel::<Result<notify::Event, notify::Error>>();

    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res| {
        // best-effort send; a closed receiver just means we are shutting down
        let _ = event_tx.send(res);
    })
    .context("create filesystem watcher")?;

    watcher
        .watch(watch_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("watch directory '{}'", watch_dir.display()))?;

    info!("Watching directory: {}", watch_dir.display());

    let join = thread::spawn(move || {
        // The watcher must live on this thread; dropping it unregisters the watch.
        let _watcher = watcher;
        loop {
            if stop_rx.try_recv().is_ok() {
                debug!("Watcher stop requested");
                break;
            }

            match event_rx.recv_timeout(EVENT_POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    if !is_arrival_event(&event.kind) {
                        continue;
                    }
                    for path in event.paths {
                        if !is_regular_file(&path) {
                            continue;
                        }
                        debug!(path = %path.display(), "Arrival event");
                        if candidates.send(path).is_err() {
                            warn!("Intake channel closed; stopping watcher");
                            return;
                        }
                    }
                }
                Ok(Err(err)) => warn!("Watcher backend error: {err}"),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!("Watcher event channel disconnected");
                    break;
                }
            }
        }
        debug!("Watcher thread finished");
    });

    Ok(WatcherHandle {
        stop_tx,
        join: Some(join),
    })
}

/// Files can arrive by creation or by being renamed into the directory;
/// both count as arrivals. Rename-from paths in coalesced events are dropped
/// later by the regular-file check.
fn is_arrival_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
    )
}

fn is_regular_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(m) => m.is_file(),
        Err(_) => false,
    }
}
