//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a commented template if missing (unless IMG_INTAKE_CONFIG is set).
//!
//! This module only reads/writes the config file; directory validation
//! happens in `validate`.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::{DEST_DIR_DEFAULT, WATCH_DIR_DEFAULT};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "watch_dir")]
    watch_dir: Option<String>,
    #[serde(rename = "dest_dir")]
    dest_dir: Option<String>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

// Map XmlConfig -> Config; values are trimmed, blanks treated as unset.
fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    if let Some(s) = parsed.watch_dir.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.watch_dir = PathBuf::from(trimmed);
        }
    }
    if let Some(s) = parsed.dest_dir.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.dest_dir = PathBuf::from(trimmed);
        }
    }
    if let Some(s) = parsed.log_level.as_deref()
        && let Ok(level) = s.trim().parse::<LogLevel>()
    {
        cfg.log_level = level;
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }

    cfg
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_config(parsed))
}

/// If IMG_INTAKE_CONFIG is set, load and return that Config; otherwise Ok(None).
/// An explicitly named file that is missing or malformed is a hard error.
pub fn load_config_from_xml_env() -> Result<Option<Config>> {
    if let Some(p) = env::var_os("IMG_INTAKE_CONFIG") {
        let cfg = load_config_from_xml_path(Path::new(&p))?;
        return Ok(Some(cfg));
    }
    Ok(None)
}

/// Try loading Config from the platform default config.xml path.
/// Returns Ok(Some(cfg)) if the file exists and parses; Ok(None) if missing.
pub fn load_config_from_default_xml() -> Result<Option<Config>> {
    let path = default_config_path().context("resolve default config path")?;
    if !path.exists() {
        return Ok(None);
    }
    let cfg = load_config_from_xml_path(&path)?;
    Ok(Some(cfg))
}

/// Create the commented template config file and its parent directory.
/// Refuses to write through a symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        return Err(anyhow::anyhow!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/img_intake.log".into());

    let content = format!(
        "<!--\n  img_intake configuration (XML)\n\n  Fields:\n    watch_dir  -> drop directory watched for incoming images\n    dest_dir   -> library directory receiving renamed images\n    log_level  -> quiet | normal | info | debug\n    log_file   -> path to log file (optional; stdout is still used)\n\n  Notes:\n    - CLI flags override XML values.\n    - Destination files are named post-img<NN>.<ext>; the counter resumes\n      from the highest number already present in dest_dir.\n-->\n<config>\n  <watch_dir>{}</watch_dir>\n  <dest_dir>{}</dest_dir>\n  <log_level>normal</log_level>\n  <log_file>{}</log_file>\n</config>\n",
        WATCH_DIR_DEFAULT, DEST_DIR_DEFAULT, suggested_log
    );

    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }

    info!("Created template config at {}", path.display());
    Ok(())
}

/// Create the default config if IMG_INTAKE_CONFIG is not set; return the
/// created path so the CLI can tell the user where to edit.
pub fn ensure_default_config_exists() -> Option<PathBuf> {
    if env::var_os("IMG_INTAKE_CONFIG").is_some() {
        return None;
    }

    let cfg_path = match default_config_path() {
        Ok(p) => p,
        Err(_) => return None,
    };

    if cfg_path.exists() {
        return None;
    }

    match create_template_config(&cfg_path) {
        Ok(()) => Some(cfg_path),
        Err(e) => {
            eprintln!(
                "Failed to create template config at {}: {}",
                cfg_path.display(),
                e
            );
            None
        }
    }
}
