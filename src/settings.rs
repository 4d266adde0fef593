//! Resolution of command-line arguments, environment, and manifest into the
//! immutable settings a run executes under.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use crate::classify::ConflictPolicy;
use crate::cli::Args;
use crate::config::Manifest;
use crate::error::SyncError;
use crate::execute::ExecutionMode;
use crate::fsx::{EntryKind, Fs};
use crate::ignore::IgnoreSet;
use crate::walk::Scope;

/// Environment variable consulted for the destination root when `--dest` is
/// not given.
pub const DEST_ENV: &str = "DEST_DIR";

/// Fully resolved configuration of one run. Both roots are canonical.
#[derive(Debug)]
pub struct Settings {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub policy: ConflictPolicy,
    pub mode: ExecutionMode,
    pub scope: Scope,
    pub ignore: IgnoreSet,
}

impl Settings {
    /// Resolve roots and merge configuration layers.
    ///
    /// Precedence per field: CLI flag, then manifest, then built-in default.
    /// The destination is created (with parents) when absent; a missing
    /// source is an error.
    pub fn resolve<F: Fs>(fs: &F, args: &Args) -> Result<Self, SyncError> {
        let source = match &args.source {
            Some(path) => path.clone(),
            None => env::current_dir().map_err(|source| SyncError::Io {
                path: PathBuf::from("."),
                source,
            })?,
        };
        let source = canonical_source(fs, &source)?;
        let manifest = Manifest::load(fs, &source)?;

        let dest = args
            .dest
            .clone()
            .or_else(|| env::var_os(DEST_ENV).map(PathBuf::from))
            .or_else(dirs::home_dir)
            .ok_or(SyncError::NoDestination)?;
        let dest = if args.apply {
            fs.create_dir_all(&dest).map_err(|source| SyncError::Io {
                path: dest.clone(),
                source,
            })?;
            fs.canonicalize(&dest).map_err(|source| SyncError::Io {
                path: dest.clone(),
                source,
            })?
        } else {
            resolve_dest_dry(fs, dest)?
        };

        let mut ignore = IgnoreSet::new();
        for name in manifest.ignore.iter().chain(&args.ignore) {
            ignore.insert(name.clone());
        }

        Ok(Self {
            source,
            dest,
            policy: args.mode.or(manifest.mode).unwrap_or_default(),
            mode: if args.apply {
                ExecutionMode::Apply
            } else {
                ExecutionMode::DryRun
            },
            scope: if args.top_level || manifest.top_level {
                Scope::TopLevelOnly
            } else {
                Scope::Recursive
            },
            ignore,
        })
    }
}

/// Resolve the destination root without touching the filesystem.
///
/// Dry runs must not create anything, including the destination itself; an
/// absent destination resolves to its normalized absolute form so planning
/// and the self-recursion guard still work on canonical-equality terms.
fn resolve_dest_dry<F: Fs>(fs: &F, dest: PathBuf) -> Result<PathBuf, SyncError> {
    match fs.canonicalize(&dest) {
        Ok(canonical) => Ok(canonical),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            std::path::absolute(&dest).map_err(|source| SyncError::Io {
                path: dest,
                source,
            })
        }
        Err(source) => Err(SyncError::Io { path: dest, source }),
    }
}

/// Canonicalize the source root, insisting it is an existing directory.
fn canonical_source<F: Fs>(fs: &F, source: &Path) -> Result<PathBuf, SyncError> {
    let canonical = fs.canonicalize(source).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            SyncError::SourceNotFound {
                path: source.to_path_buf(),
            }
        } else {
            SyncError::Io {
                path: source.to_path_buf(),
                source: e,
            }
        }
    })?;
    match fs.kind(&canonical) {
        Ok(Some(EntryKind::Dir)) => Ok(canonical),
        Ok(_) => Err(SyncError::SourceNotFound { path: canonical }),
        Err(source) => Err(SyncError::Io {
            path: canonical,
            source,
        }),
    }
}
