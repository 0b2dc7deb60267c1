//! Serial intake pipeline: pending queue, moved-set, and the drain loop.
//!
//! All pipeline state lives in `IntakeState`, owned by the single loop
//! thread; the watcher only ever talks to it through the candidate channel.
//! Per-file failures are logged and the file is abandoned; nothing that
//! happens after startup terminates the loop except a shutdown request.

use anyhow::Result;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::fs_ops;
use crate::readiness;
use crate::sequence::{self, SequenceCounter};
use crate::shutdown;

/// Fixed delay between drain iterations.
pub const QUEUE_TICK: Duration = Duration::from_millis(500);

/// Owned pipeline state: pending candidates, destinations this process has
/// produced, and the sequence counter.
pub struct IntakeState {
    pending: VecDeque<PathBuf>,
    moved: HashSet<PathBuf>,
    counter: SequenceCounter,
}

impl IntakeState {
    pub fn new(counter: SequenceCounter) -> Self {
        Self {
            pending: VecDeque::new(),
            moved: HashSet::new(),
            counter,
        }
    }

    /// Number of files waiting to be processed.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Current value of the sequence counter.
    pub fn sequence_value(&self) -> u64 {
        self.counter.current()
    }

    /// Offer a watch-event path to the queue. Paths this process already
    /// produced, non-image files, and paths already pending are dropped.
    /// Returns true when the path was queued.
    pub fn enqueue(&mut self, path: PathBuf) -> bool {
        if self.moved.contains(&path) {
            debug!(path = %path.display(), "Ignoring event for a path this process produced");
            return false;
        }
        if !sequence::is_image_path(&path) {
            debug!(path = %path.display(), "Ignoring non-image file");
            return false;
        }
        if self.pending.contains(&path) {
            debug!(path = %path.display(), "Already queued");
            return false;
        }
        info!(path = %path.display(), "New file detected");
        self.pending.push_back(path);
        true
    }

    /// Process at most one pending file: stabilize, name, move, clean up.
    /// Every failure path logs and abandons the file without propagating.
    pub fn process_next(&mut self, cfg: &Config) {
        let Some(src) = self.pending.pop_front() else {
            return;
        };

        if !src.exists() {
            warn!(path = %src.display(), "File disappeared before processing; skipping");
            return;
        }

        if let Err(e) = readiness::wait_for_ready(&src) {
            warn!(path = %src.display(), error = %e, "File never became ready; abandoning");
            return;
        }

        let Some(ext) = src.extension().and_then(|e| e.to_str()) else {
            warn!(path = %src.display(), "File has no usable extension; abandoning");
            return;
        };

        let file_name = self.counter.next_file_name(ext);
        let dest = cfg.dest_dir.join(&file_name);

        // Record the destination before moving so the watch event produced by
        // our own rename is never re-enqueued.
        self.moved.insert(dest.clone());

        match fs_ops::move_into_library(&src, &dest) {
            Ok(dest) => {
                info!(src = %src.display(), dest = %dest.display(), "Filed image");
            }
            Err(e) => {
                error!(src = %src.display(), dest = %dest.display(), error = %e, "Move failed; file abandoned");
            }
        }
    }
}

/// Cooperative drain loop: collect candidates for up to one tick, then
/// process a single pending file. Exits when shutdown is requested or the
/// watcher side of the channel goes away.
pub fn run(cfg: &Config, state: &mut IntakeState, candidates: &mpsc::Receiver<PathBuf>) -> Result<()> {
    info!(
        watch = %cfg.watch_dir.display(),
        dest = %cfg.dest_dir.display(),
        start = state.sequence_value(),
        "Intake loop started"
    );

    loop {
        if shutdown::is_requested() {
            info!("Shutdown requested; stopping intake loop");
            return Ok(());
        }

        match candidates.recv_timeout(QUEUE_TICK) {
            Ok(path) => {
                state.enqueue(path);
                // Drain whatever else arrived within this tick.
                while let Ok(p) = candidates.try_recv() {
                    state.enqueue(p);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                warn!("Watcher channel closed; stopping intake loop");
                return Ok(());
            }
        }

        if shutdown::is_requested() {
            info!("Shutdown requested; stopping intake loop");
            return Ok(());
        }

        state.process_next(cfg);
    }
}
