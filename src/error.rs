//! Error types surfaced to the command-line layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a run before or during synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("no destination directory: pass --dest or set a home directory")]
    NoDestination,

    #[error("invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
