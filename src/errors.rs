//! Typed error definitions for img_intake.
//! Names the pipeline's well-known per-file failure modes for logs and tests.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("File never appeared: {0}")]
    NeverAppeared(PathBuf),

    #[error("File size did not stabilize: {0}")]
    NeverStabilized(PathBuf),

    #[error("Cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation interrupted by shutdown")]
    Interrupted,
}
