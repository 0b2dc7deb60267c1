//! Config validation logic.
//! Verifies the watch directory exists and is readable, creates the
//! destination directory when missing, and probes it for writability.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::types::Config;

impl Config {
    /// Validate existence, readability/writability and distinctness of the
    /// two directories.
    ///
    /// The destination is allowed to live inside the watch directory: the
    /// intake loop suppresses the watch events its own renames generate.
    pub fn validate(&self) -> Result<()> {
        let wd = &self.watch_dir;
        let dd = &self.dest_dir;

        // 1) Watch dir: must exist, be a directory, and be readable.
        ensure_dir_exists_and_is_dir(wd, "watch_dir")?;
        ensure_readable(wd, "watch_dir")?;

        // 2) Dest dir: must be a directory; create if missing; ensure writable.
        ensure_dir_is_or_create(dd, "dest_dir")?;
        ensure_writable(dd, "dest_dir")?;

        // 3) Resolve symlinks and ensure the directories are not the same path.
        let wd_real = fs::canonicalize(wd).unwrap_or_else(|_| wd.clone());
        let dd_real = fs::canonicalize(dd).unwrap_or_else(|_| dd.clone());
        if wd_real == dd_real {
            bail!(
                "watch_dir and dest_dir resolve to the same path: '{}'",
                wd_real.display()
            );
        }

        info!(
            "Config validated: watch='{}' dest='{}' log_file='{}'",
            wd.display(),
            dd.display(),
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into())
        );
        Ok(())
    }
}

/// Ensure path exists and is a directory; emit clear errors with path context.
fn ensure_dir_exists_and_is_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        error!("{name} does not exist: {}", path.display());
        bail!("{name} does not exist: {}", path.display());
    }
    if !path.is_dir() {
        error!("{name} is not a directory: {}", path.display());
        bail!("{name} is not a directory: {}", path.display());
    }
    Ok(())
}

/// Ensure directory is readable by attempting to open its entries.
fn ensure_readable(path: &Path, name: &str) -> Result<()> {
    fs::read_dir(path).with_context(|| {
        format!(
            "Cannot read {name} directory '{}'; check permissions",
            path.display()
        )
    })?;
    debug!("{name} readable: {}", path.display());
    Ok(())
}

/// Ensure directory exists (create if missing). If it exists, it must be a directory.
fn ensure_dir_is_or_create(path: &Path, name: &str) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            error!("{name} exists but isn't a directory: {}", path.display());
            bail!("{name} exists but isn't a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create {name} directory '{}'", path.display()))?;
        info!("Created {name} directory: {}", path.display());
    }
    Ok(())
}

/// Ensure directory is writable using a non-destructive probe file.
fn ensure_writable(path: &Path, name: &str) -> Result<()> {
    let probe = path.join(format!(".img_intake_probe_{}.tmp", std::process::id()));
    let res = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&probe);
    match res {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            debug!("{name} writable: {}", path.display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "Cannot write to {name} '{}'; check permissions",
                path.display()
            )
        }),
    }
}
