//! File readiness probing.
//!
//! A candidate is treated as fully written once its size is positive and
//! unchanged between two consecutive polls. The budget covers both the
//! not-yet-visible and the still-growing case; exhausting it abandons that
//! one file without affecting others.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::errors::IntakeError;
use crate::shutdown;

/// Delay between size polls (also the initial grace delay).
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Number of re-checks after the initial poll before giving up.
pub const READY_RETRY_BUDGET: u32 = 10;

/// Wait until `path` looks fully written, with the default budget.
pub fn wait_for_ready(path: &Path) -> Result<(), IntakeError> {
    wait_for_ready_with(path, READY_POLL_INTERVAL, READY_RETRY_BUDGET)
}

/// Probe `path` every `interval` until its size is positive and stable, up to
/// `retries` re-checks. A missing file consumes retries the same way a
/// changing size does. A requested shutdown interrupts the wait promptly.
pub fn wait_for_ready_with(
    path: &Path,
    interval: Duration,
    retries: u32,
) -> Result<(), IntakeError> {
    let mut remaining = retries;
    let mut last_size: Option<u64> = None;

    // Grace period: the watch event usually precedes the first byte on disk.
    pause(interval)?;

    loop {
        if !path.exists() {
            if remaining == 0 {
                return Err(IntakeError::NeverAppeared(path.to_path_buf()));
            }
            remaining -= 1;
            debug!(path = %path.display(), remaining, "File not visible yet");
            pause(interval)?;
            continue;
        }

        let size = fs::metadata(path)
            .map_err(|source| IntakeError::Stat {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if size > 0 && last_size == Some(size) {
            return Ok(());
        }

        last_size = Some(size);
        if remaining == 0 {
            return Err(IntakeError::NeverStabilized(path.to_path_buf()));
        }
        remaining -= 1;
        debug!(path = %path.display(), size, remaining, "File still changing");
        pause(interval)?;
    }
}

fn pause(interval: Duration) -> Result<(), IntakeError> {
    if shutdown::is_requested() {
        return Err(IntakeError::Interrupted);
    }
    thread::sleep(interval);
    if shutdown::is_requested() {
        return Err(IntakeError::Interrupted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::tempdir;

    const FAST: Duration = Duration::from_millis(10);

    #[test]
    #[serial]
    fn ready_when_size_is_stable() {
        shutdown::reset();
        let td = tempdir().unwrap();
        let f = td.path().join("still.png");
        fs::write(&f, b"finished bytes").unwrap();
        wait_for_ready_with(&f, FAST, 3).unwrap();
    }

    #[test]
    #[serial]
    fn missing_file_exhausts_budget() {
        shutdown::reset();
        let td = tempdir().unwrap();
        let f = td.path().join("ghost.png");
        let err = wait_for_ready_with(&f, FAST, 2).unwrap_err();
        assert!(matches!(err, IntakeError::NeverAppeared(_)));
    }

    #[test]
    #[serial]
    fn growing_file_exhausts_budget() {
        shutdown::reset();
        let td = tempdir().unwrap();
        let f = td.path().join("grow.png");
        fs::write(&f, b"seed").unwrap();
        let f2 = f.clone();
        let writer = std::thread::spawn(move || {
            for _ in 0..40 {
                let mut file = fs::OpenOptions::new().append(true).open(&f2).unwrap();
                let _ = file.write_all(b"more bytes arriving");
                std::thread::sleep(Duration::from_millis(4));
            }
        });
        let err = wait_for_ready_with(&f, FAST, 3).unwrap_err();
        assert!(matches!(err, IntakeError::NeverStabilized(_)));
        writer.join().unwrap();
    }

    #[test]
    #[serial]
    fn file_appearing_late_is_accepted() {
        shutdown::reset();
        let td = tempdir().unwrap();
        let f = td.path().join("late.png");
        let f2 = f.clone();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(25));
            fs::write(&f2, b"arrived whole").unwrap();
        });
        wait_for_ready_with(&f, FAST, 10).unwrap();
        writer.join().unwrap();
    }

    #[test]
    #[serial]
    fn shutdown_interrupts_wait() {
        shutdown::reset();
        let td = tempdir().unwrap();
        let f = td.path().join("interrupted.png");
        fs::write(&f, b"x").unwrap();
        std::thread::spawn(|| {
            std::thread::sleep(Duration::from_millis(5));
            shutdown::request();
        });
        let err = wait_for_ready_with(&f, Duration::from_millis(20), 50).unwrap_err();
        assert!(matches!(err, IntakeError::Interrupted));
        shutdown::reset();
    }
}
