//! Command-line argument surface.

use std::path::PathBuf;

use clap::Parser;

use crate::classify::ConflictPolicy;

/// Version string stamped by the build script, falling back to the crate
/// version for builds outside a git checkout.
#[must_use]
pub fn version() -> &'static str {
    option_env!("LINKFARM_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Mirror a directory tree into another via symlinks.
#[derive(Debug, Parser)]
#[command(name = "linkfarm", version = version(), about, arg_required_else_help = false)]
pub struct Args {
    /// Source tree to mirror (default: current directory).
    pub source: Option<PathBuf>,

    /// Destination root (default: $DEST_DIR, else the home directory).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Conflict policy for entries that already exist at the destination.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub mode: Option<ConflictPolicy>,

    /// Perform the mutations. Without this flag the run only reports.
    #[arg(long)]
    pub apply: bool,

    /// Link top-level entries only, without descending into subdirectories.
    #[arg(long)]
    pub top_level: bool,

    /// Extra entry name to ignore; repeatable.
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Enable per-entry debug diagnostics on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}
