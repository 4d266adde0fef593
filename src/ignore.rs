//! Ignore filtering for tree traversal.

use std::collections::BTreeSet;

use crate::config::MANIFEST_NAME;

/// Entry basenames excluded from synchronization at every tree level.
const DEFAULT_NAMES: &[&str] = &[
    // version-control metadata
    ".git",
    ".hg",
    ".svn",
    // OS metadata
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    // build output
    "dist",
    "node_modules",
    "target",
    // editor state
    ".idea",
    ".vscode",
];

/// Case-sensitive basename prefixes excluded regardless of exact membership.
const DEFAULT_PREFIXES: &[&str] = &["README", "LICENSE"];

/// Decides whether an entry name is excluded from synchronization.
///
/// Pure and stateless: only the basename is consulted, never the full path or
/// file contents, so the same names are ignored at every depth.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
    prefixes: Vec<String>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        let mut names: BTreeSet<String> =
            DEFAULT_NAMES.iter().map(ToString::to_string).collect();
        names.insert(MANIFEST_NAME.to_string());
        Self {
            names,
            prefixes: DEFAULT_PREFIXES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl IgnoreSet {
    /// The built-in rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match name to the set.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether an entry with this basename is excluded.
    #[must_use]
    pub fn should_ignore(&self, name: &str) -> bool {
        self.names.contains(name) || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}
