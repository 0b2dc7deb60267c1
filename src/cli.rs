//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! CLI flags override config values (which are loaded from XML if present).
//! --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Watch a drop folder and file incoming images into a sequential library"
)]
pub struct Args {
    /// Override the watched drop directory (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the watched drop directory")]
    pub watch_dir: Option<PathBuf>,

    /// Override the destination library directory (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the destination library directory")]
    pub dest_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Print where img_intake will look for the config file (or IMG_INTAKE_CONFIG if set), then exit.
    #[arg(
        long,
        help = "Print the config file location used by img_intake and exit"
    )]
    pub print_config: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(wd) = &self.watch_dir {
            cfg.watch_dir = wd.clone();
        }
        if let Some(dd) = &self.dest_dir {
            cfg.dest_dir = dd.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
