//! Sequential filename derivation for the image library.
//!
//! Destination files follow `post-img<NN>.<ext>`: a monotonically increasing
//! counter, zero-padded to two digits (wider numbers print unpadded), plus
//! the original extension lowercased. The counter is initialized once per
//! process by scanning the destination directory and is the single source of
//! truth afterwards; it must not be reset without rescanning.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Fixed prefix of every filed image.
pub const FILE_PREFIX: &str = "post-img";

/// Extensions accepted by the pipeline, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "svg", "webp"];

const PAD_WIDTH: usize = 2;

/// True when the path carries one of the allowed image extensions.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lowered = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&lowered.as_str())
        })
        .unwrap_or(false)
}

/// Extract `N` from a `post-img<N>.<ext>` file name. Names with a non-numeric
/// middle or anything between the digits and the dot yield None.
fn sequence_suffix(file_name: &str) -> Option<u64> {
    let rest = file_name.strip_prefix(FILE_PREFIX)?;
    let (digits, _ext) = rest.split_once('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Monotonic sequence counter backing the filename scheme.
#[derive(Debug)]
pub struct SequenceCounter {
    current: u64,
}

impl SequenceCounter {
    pub fn new(start: u64) -> Self {
        Self { current: start }
    }

    /// Initialize the counter from the highest suffix already present in
    /// `dest_dir` (zero when nothing matches). Non-UTF-8 names and names
    /// outside the allow-list are ignored.
    pub fn scan_library(dest_dir: &Path) -> Result<Self> {
        let mut max = 0u64;
        for entry in fs::read_dir(dest_dir)
            .with_context(|| format!("scan library directory '{}'", dest_dir.display()))?
        {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_image_path(Path::new(name)) {
                continue;
            }
            if let Some(n) = sequence_suffix(name) {
                debug!(name, n, "Found existing library entry");
                max = max.max(n);
            }
        }
        Ok(Self { current: max })
    }

    /// Highest sequence number produced or observed so far.
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Advance the counter and derive the next file name. `extension` is
    /// given without the leading dot and is lowercased in the result.
    pub fn next_file_name(&mut self, extension: &str) -> String {
        self.current += 1;
        format!(
            "{FILE_PREFIX}{:0width$}.{}",
            self.current,
            extension.to_ascii_lowercase(),
            width = PAD_WIDTH
        )
    }
}
