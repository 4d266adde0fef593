//! Optional per-tree manifest (`linkfarm.toml`) at the source root.

use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::classify::ConflictPolicy;
use crate::error::SyncError;
use crate::fsx::Fs;

/// Manifest file name, looked up at the source root only.
pub const MANIFEST_NAME: &str = "linkfarm.toml";

/// Per-tree defaults. CLI flags take precedence over every field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Extra exact-match entry names to exclude, merged with the built-ins.
    pub ignore: Vec<String>,
    /// Default conflict policy for this tree.
    pub mode: Option<ConflictPolicy>,
    /// Link top-level entries only, without descending.
    pub top_level: bool,
}

impl Manifest {
    /// Load the manifest from `source_root`, if one exists.
    ///
    /// A missing manifest is the empty default; an unreadable or malformed
    /// one is an error, never silently ignored.
    pub fn load<F: Fs>(fs: &F, source_root: &Path) -> Result<Self, SyncError> {
        let path = source_root.join(MANIFEST_NAME);
        let bytes = match fs.read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SyncError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };
        let text = String::from_utf8(bytes).map_err(|e| SyncError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| SyncError::Manifest {
            path,
            message: e.to_string(),
        })
    }
}
