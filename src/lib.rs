//! Idempotent directory-tree symlink synchronizer.
//!
//! Mirrors a source tree into a destination tree by creating symlinks for
//! leaf entries and plain directories for intermediate ones. Repeated runs
//! converge: entries already in the desired state are reported as no-ops and
//! never touched. Dry-run is the default; `--apply` performs the mutations.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod execute;
pub mod fsx;
pub mod ignore;
pub mod logging;
pub mod report;
pub mod settings;
pub mod sync;
pub mod walk;
