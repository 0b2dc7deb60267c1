//! Core configuration types.
//! - Config holds the two directory paths plus logging settings.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;
use super::{DEST_DIR_DEFAULT, WATCH_DIR_DEFAULT};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for the intake pipeline.
///
/// Only the two directories are configurable; retry budgets, poll intervals,
/// the filename prefix and the extension allow-list are compile-time
/// constants in their owning modules.
#[derive(Debug, Clone)]
pub struct Config {
    /// Drop directory watched for incoming images
    pub watch_dir: PathBuf,
    /// Library directory receiving the renamed images
    pub dest_dir: PathBuf,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from(WATCH_DIR_DEFAULT),
            dest_dir: PathBuf::from(DEST_DIR_DEFAULT),
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path().ok(),
        }
    }
}

impl Config {
    /// Construct a Config with explicit directories; other fields use defaults.
    pub fn new(watch_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            dest_dir: dest_dir.into(),
            ..Default::default()
        }
    }
}
