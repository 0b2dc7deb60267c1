//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors
//! before anything is created through them.

use anyhow::{Result, anyhow};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Config file path: `$IMG_INTAKE_CONFIG` if set, else the OS config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(p) = env::var_os("IMG_INTAKE_CONFIG") {
        return Ok(PathBuf::from(p));
    }
    let base = config_dir().ok_or_else(|| anyhow!("no OS config directory available"))?;
    Ok(base.join("img_intake").join("config.xml"))
}

/// OS-appropriate default log file path (data dir).
pub fn default_log_path() -> Result<PathBuf> {
    let mut base = data_dir().ok_or_else(|| anyhow!("no OS data directory available"))?;
    base.push("img_intake");
    // ensure dir exists (best-effort)
    let _ = fs::create_dir_all(&base);
    base.push("img_intake.log");
    Ok(base)
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
