//! Move a stabilized image into the library.
//! Attempts atomic rename; on cross-filesystem or other errors, falls back to
//! a copy through a temp file in the destination directory. The original is
//! removed afterwards if the move left it behind.

use anyhow::{Result, anyhow, bail};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::shutdown;

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;

/// Move `src` to `dest`; returns the destination on success.
pub fn move_into_library(src: &Path, dest: &Path) -> Result<PathBuf> {
    if shutdown::is_requested() {
        bail!("shutdown requested");
    }

    if let Some(dest_dir) = dest.parent() {
        fs::create_dir_all(dest_dir)
            .map_err(io_error_with_help("create destination directory", dest_dir))?;
    }

    match try_atomic_move(src, dest) {
        Ok(()) => {
            info!(src = %src.display(), dest = %dest.display(), "Renamed file atomically");
        }
        Err(e) => {
            #[cfg(unix)]
            let hint: &str = match e
                .downcast_ref::<io::Error>()
                .and_then(|ioe| ioe.raw_os_error())
            {
                Some(code) if code == libc::EXDEV => "cross-filesystem; will copy instead",
                Some(code) if code == libc::EACCES || code == libc::EPERM => {
                    "permission denied; check destination perms"
                }
                _ => "falling back to copy",
            };

            #[cfg(not(unix))]
            let hint: &str = match e.downcast_ref::<io::Error>().map(|ioe| ioe.kind()) {
                Some(io::ErrorKind::PermissionDenied) => {
                    "permission denied; check destination perms"
                }
                _ => "falling back to copy",
            };

            warn!(error = %e, hint, "Atomic rename failed, using copy+remove");
            copy_via_temp(src, dest)?;
            fs::remove_file(src).map_err(io_error_with_help("remove original file", src))?;
        }
    }

    remove_original_if_left(src);
    Ok(dest.to_path_buf())
}

/// Copy src into the destination directory under a temp name, then rename
/// into place so readers never observe a half-written library entry.
fn copy_via_temp(src: &Path, dest: &Path) -> Result<()> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
    let tmp = unique_temp_path(dest_dir);

    fs::copy(src, &tmp).map_err(io_error_with_help("copy to temporary file", &tmp))?;
    // Flush the bytes before the rename publishes the entry.
    if let Ok(f) = fs::File::open(&tmp) {
        let _ = f.sync_all();
    }

    if let Err(e) = try_atomic_move(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!(".img_intake.{}.{}.tmp", pid, nanos))
}

/// Defensive cleanup: some filesystems report success while leaving the
/// original in place, so check and remove it after the move.
fn remove_original_if_left(src: &Path) {
    if !src.exists() {
        return;
    }
    match fs::remove_file(src) {
        Ok(()) => info!(path = %src.display(), "Removed original left behind by move"),
        Err(e) => warn!(path = %src.display(), error = %e, "Failed to remove original"),
    }
}
