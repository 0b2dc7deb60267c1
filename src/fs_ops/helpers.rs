//! I/O helper utilities.
//!
//! Small adapter to enrich io::Error with actionable context and hints,
//! usable with map_err in anyhow::Result code paths:
//!
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create dir", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Format a human-friendly message with op/path plus platform-aware hints.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str("; permission denied, check ownership and write permissions");
                }
                libc::EXDEV => {
                    msg.push_str("; cross-filesystem, atomic rename not possible");
                }
                libc::EBUSY => {
                    msg.push_str("; resource busy, ensure no other process is writing");
                }
                libc::ENOENT => {
                    msg.push_str("; path not found, verify it exists");
                }
                libc::ENOSPC => {
                    msg.push_str("; insufficient space on device");
                }
                libc::EROFS => {
                    msg.push_str("; read-only filesystem, cannot write here");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            // Common Win32 errors
            match code {
                5 => msg.push_str("; access denied, check permissions"), // ERROR_ACCESS_DENIED
                17 => msg.push_str("; not same device, cross-filesystem move"), // ERROR_NOT_SAME_DEVICE
                32 => msg.push_str("; sharing violation, file is in use"), // ERROR_SHARING_VIOLATION
                2 | 3 => msg.push_str("; path not found, verify it exists"), // FILE/PATH NOT FOUND
                112 => msg.push_str("; insufficient disk space"),         // ERROR_DISK_FULL
                _ => {}
            }
        }
        // Include OS code for diagnostics
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str("; permission denied, check ownership and write permissions");
            }
            io::ErrorKind::NotFound => {
                msg.push_str("; path not found, verify it exists");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str("; already exists, remove or choose a unique name");
            }
            _ => {}
        }
    }

    msg
}

/// Returns a closure suitable for `.map_err(...)` that converts io::Error
/// into an enriched anyhow::Error.
pub(super) fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}
