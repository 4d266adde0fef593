//! Plan execution: interprets classified actions against the filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::classify::{DirAction, LinkAction};
use crate::fsx::Fs;
use crate::report::Report;

/// Whether a run mutates the filesystem or only reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Compute and report every decision; mutate nothing.
    #[default]
    DryRun,
    /// Perform the mutations.
    Apply,
}

/// Applies [`LinkAction`]s and [`DirAction`]s through an [`Fs`].
///
/// Each step of a multi-step action is reported before it is attempted; a
/// failing step aborts the remaining steps for that entry and propagates.
#[derive(Debug)]
pub struct Executor<'a, F: Fs> {
    fs: &'a F,
    mode: ExecutionMode,
}

impl<'a, F: Fs> Executor<'a, F> {
    pub const fn new(fs: &'a F, mode: ExecutionMode) -> Self {
        Self { fs, mode }
    }

    const fn mutate(&self) -> bool {
        matches!(self.mode, ExecutionMode::Apply)
    }

    /// Carry out the action for one leaf entry.
    pub fn perform(
        &self,
        action: LinkAction,
        source: &Path,
        dest: &Path,
        report: &mut Report,
    ) -> Result<()> {
        match action {
            LinkAction::NoopAlreadyLinked => report.noop_already_linked(dest),
            LinkAction::NoopContentIdentical => report.noop_same_content(dest),
            LinkAction::SkipConflict => report.skip(dest),
            LinkAction::CreateLink => self.link(source, dest, report)?,
            LinkAction::BackupThenLink => {
                self.backup(dest, report)?;
                self.link(source, dest, report)?;
            }
            LinkAction::ReplaceThenLink => {
                self.remove(dest, report)?;
                self.link(source, dest, report)?;
            }
        }
        Ok(())
    }

    /// Carry out the action for an intermediate directory.
    ///
    /// Returns `false` when the subtree rooted at `dest` must be abandoned
    /// for this run.
    pub fn perform_dir(
        &self,
        action: DirAction,
        dest: &Path,
        report: &mut Report,
    ) -> Result<bool> {
        match action {
            DirAction::AlreadyDir => {}
            DirAction::Create => self.mkdir(dest, report)?,
            DirAction::SkipSubtree => {
                report.skip(dest);
                return Ok(false);
            }
            DirAction::BackupThenCreate => {
                self.backup(dest, report)?;
                self.mkdir(dest, report)?;
            }
            DirAction::ReplaceThenCreate => {
                self.remove(dest, report)?;
                self.mkdir(dest, report)?;
            }
        }
        Ok(true)
    }

    fn link(&self, source: &Path, dest: &Path, report: &mut Report) -> Result<()> {
        report.link(dest, source);
        if self.mutate() {
            self.fs
                .symlink(source, dest)
                .with_context(|| format!("create link: {}", dest.display()))?;
        }
        Ok(())
    }

    fn mkdir(&self, dest: &Path, report: &mut Report) -> Result<()> {
        report.mkdir(dest);
        if self.mutate() {
            self.fs
                .create_dir_all(dest)
                .with_context(|| format!("create directory: {}", dest.display()))?;
        }
        Ok(())
    }

    fn backup(&self, dest: &Path, report: &mut Report) -> Result<()> {
        let backup = backup_path(dest);
        report.backup(dest, &backup);
        if self.mutate() {
            self.fs
                .rename(dest, &backup)
                .with_context(|| format!("back up: {}", dest.display()))?;
        }
        Ok(())
    }

    fn remove(&self, dest: &Path, report: &mut Report) -> Result<()> {
        report.remove(dest);
        if self.mutate() {
            self.fs
                .remove_all(dest)
                .with_context(|| format!("remove: {}", dest.display()))?;
        }
        Ok(())
    }
}

/// Timestamped sibling path used when backing up a conflicting entry:
/// `<name>.bak-<YYYYMMDD-HHMMSS>`.
fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "backup".to_string(), |n| n.to_string_lossy().into_owned());
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    path.with_file_name(format!("{name}.bak-{stamp}"))
}
