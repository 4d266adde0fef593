//! Conflict classification.
//!
//! Pure decision logic: given the planned link and the current destination
//! state, determine the required action. Nothing here mutates the filesystem;
//! execution is interpreted separately by [`crate::execute`].

use std::io;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

use crate::fsx::{EntryKind, Fs};

/// Uniform strategy applied whenever a destination entry exists but does not
/// already correctly represent the intended link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the conflicting entry exactly as-is.
    Skip,
    /// Rename the conflicting entry to a timestamped sibling, then link.
    #[default]
    Backup,
    /// Recursively remove the conflicting entry, then link.
    Replace,
}

/// Outcome of classifying one leaf entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Destination is already a symlink to the source.
    NoopAlreadyLinked,
    /// Destination content is byte-identical to the source.
    NoopContentIdentical,
    /// Destination is absent; create the link.
    CreateLink,
    /// Conflict left untouched under [`ConflictPolicy::Skip`].
    SkipConflict,
    /// Rename the existing entry aside, then link.
    BackupThenLink,
    /// Remove the existing entry, then link.
    ReplaceThenLink,
}

/// Outcome of classifying an intermediate directory that must exist as a
/// plain directory at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirAction {
    /// Already a real directory; nothing to do.
    AlreadyDir,
    /// Absent; create it.
    Create,
    /// Conflict skipped; the whole subtree is abandoned for this run.
    SkipSubtree,
    /// Rename the conflicting entry aside, then create the directory.
    BackupThenCreate,
    /// Remove the conflicting entry, then create the directory.
    ReplaceThenCreate,
}

/// Classify one planned link. First match wins:
///
/// 1. destination is a symlink whose target equals `source` exactly;
/// 2. both sides exist, are non-directories, and have identical bytes;
/// 3. destination is absent (a dangling symlink still counts as present);
/// 4. otherwise the configured policy decides.
///
/// Type mismatches (directory on one side, file on the other) fall through to
/// the policy rather than getting special handling.
pub fn classify<F: Fs>(
    fs: &F,
    source: &Path,
    dest: &Path,
    policy: ConflictPolicy,
) -> io::Result<LinkAction> {
    let dest_kind = fs.kind(dest)?;

    if dest_kind == Some(EntryKind::Symlink) && fs.read_link(dest)? == source {
        return Ok(LinkAction::NoopAlreadyLinked);
    }

    let Some(dest_kind) = dest_kind else {
        return Ok(LinkAction::CreateLink);
    };

    if dest_kind != EntryKind::Dir
        && fs.kind(source)? != Some(EntryKind::Dir)
        && contents_match(fs, source, dest)?
    {
        return Ok(LinkAction::NoopContentIdentical);
    }

    Ok(match policy {
        ConflictPolicy::Skip => LinkAction::SkipConflict,
        ConflictPolicy::Backup => LinkAction::BackupThenLink,
        ConflictPolicy::Replace => LinkAction::ReplaceThenLink,
    })
}

/// Classify a destination path that must exist as a plain directory before
/// any of its children can be planned.
///
/// A symlink at the site is a conflict even when it points at a directory;
/// the walker only descends through real directories.
pub fn classify_dir<F: Fs>(
    fs: &F,
    dest: &Path,
    policy: ConflictPolicy,
) -> io::Result<DirAction> {
    Ok(match fs.kind(dest)? {
        None => DirAction::Create,
        Some(EntryKind::Dir) => DirAction::AlreadyDir,
        Some(_) => match policy {
            ConflictPolicy::Skip => DirAction::SkipSubtree,
            ConflictPolicy::Backup => DirAction::BackupThenCreate,
            ConflictPolicy::Replace => DirAction::ReplaceThenCreate,
        },
    })
}

/// Byte comparison of two non-directory entries, following symlinks.
///
/// A side that cannot be read as a file (dangling symlink, symlink to a
/// directory) simply fails the comparison; real I/O errors propagate.
fn contents_match<F: Fs>(fs: &F, source: &Path, dest: &Path) -> io::Result<bool> {
    let a = match fs.read(source) {
        Ok(bytes) => bytes,
        Err(e) if not_file_like(&e) => return Ok(false),
        Err(e) => return Err(e),
    };
    let b = match fs.read(dest) {
        Ok(bytes) => bytes,
        Err(e) if not_file_like(&e) => return Ok(false),
        Err(e) => return Err(e),
    };
    Ok(a == b)
}

fn not_file_like(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::IsADirectory | io::ErrorKind::InvalidInput
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fsx::MemFs;

    fn fixture() -> MemFs {
        let fs = MemFs::new();
        fs.add_dir("/src");
        fs.add_dir("/home");
        fs
    }

    #[test]
    fn correct_link_is_noop() {
        let fs = fixture();
        fs.add_file("/src/bashrc", "x");
        fs.add_symlink("/home/bashrc", "/src/bashrc");

        let action = classify(
            &fs,
            Path::new("/src/bashrc"),
            Path::new("/home/bashrc"),
            ConflictPolicy::Backup,
        )
        .unwrap();
        assert_eq!(action, LinkAction::NoopAlreadyLinked);
    }

    #[test]
    fn wrong_link_target_falls_to_policy() {
        let fs = fixture();
        fs.add_file("/src/bashrc", "x");
        fs.add_file("/src/other", "y");
        fs.add_symlink("/home/bashrc", "/src/other");

        let action = classify(
            &fs,
            Path::new("/src/bashrc"),
            Path::new("/home/bashrc"),
            ConflictPolicy::Backup,
        )
        .unwrap();
        assert_eq!(action, LinkAction::BackupThenLink);
    }

    #[test]
    fn identical_content_short_circuits_every_policy() {
        let fs = fixture();
        fs.add_file("/src/profile", "same bytes");
        fs.add_file("/home/profile", "same bytes");

        for policy in [
            ConflictPolicy::Skip,
            ConflictPolicy::Backup,
            ConflictPolicy::Replace,
        ] {
            let action = classify(
                &fs,
                Path::new("/src/profile"),
                Path::new("/home/profile"),
                policy,
            )
            .unwrap();
            assert_eq!(action, LinkAction::NoopContentIdentical, "policy {policy:?}");
        }
    }

    #[test]
    fn identical_content_through_foreign_symlink() {
        // Destination links elsewhere, but the bytes behind it match.
        let fs = fixture();
        fs.add_file("/src/profile", "same");
        fs.add_file("/elsewhere/copy", "same");
        fs.add_symlink("/home/profile", "/elsewhere/copy");

        let action = classify(
            &fs,
            Path::new("/src/profile"),
            Path::new("/home/profile"),
            ConflictPolicy::Backup,
        )
        .unwrap();
        assert_eq!(action, LinkAction::NoopContentIdentical);
    }

    #[test]
    fn absent_destination_creates_link() {
        let fs = fixture();
        fs.add_file("/src/bashrc", "x");

        let action = classify(
            &fs,
            Path::new("/src/bashrc"),
            Path::new("/home/bashrc"),
            ConflictPolicy::Skip,
        )
        .unwrap();
        assert_eq!(action, LinkAction::CreateLink);
    }

    #[test]
    fn dangling_symlink_counts_as_conflict() {
        let fs = fixture();
        fs.add_file("/src/bashrc", "x");
        fs.add_symlink("/home/bashrc", "/gone");

        let action = classify(
            &fs,
            Path::new("/src/bashrc"),
            Path::new("/home/bashrc"),
            ConflictPolicy::Replace,
        )
        .unwrap();
        assert_eq!(action, LinkAction::ReplaceThenLink);
    }

    #[test]
    fn differing_content_follows_policy() {
        let fs = fixture();
        fs.add_file("/src/bashrc", "new");
        fs.add_file("/home/bashrc", "old");

        let skip = classify(
            &fs,
            Path::new("/src/bashrc"),
            Path::new("/home/bashrc"),
            ConflictPolicy::Skip,
        )
        .unwrap();
        assert_eq!(skip, LinkAction::SkipConflict);

        let backup = classify(
            &fs,
            Path::new("/src/bashrc"),
            Path::new("/home/bashrc"),
            ConflictPolicy::Backup,
        )
        .unwrap();
        assert_eq!(backup, LinkAction::BackupThenLink);

        let replace = classify(
            &fs,
            Path::new("/src/bashrc"),
            Path::new("/home/bashrc"),
            ConflictPolicy::Replace,
        )
        .unwrap();
        assert_eq!(replace, LinkAction::ReplaceThenLink);
    }

    #[test]
    fn type_mismatch_falls_through_to_policy() {
        // Destination has a directory where the source has a file.
        let fs = fixture();
        fs.add_file("/src/notes", "file on this side");
        fs.add_dir("/home/notes");

        let action = classify(
            &fs,
            Path::new("/src/notes"),
            Path::new("/home/notes"),
            ConflictPolicy::Backup,
        )
        .unwrap();
        assert_eq!(action, LinkAction::BackupThenLink);
    }

    #[test]
    fn dir_site_absent_creates() {
        let fs = fixture();
        let action = classify_dir(&fs, Path::new("/home/notes"), ConflictPolicy::Skip).unwrap();
        assert_eq!(action, DirAction::Create);
    }

    #[test]
    fn dir_site_existing_dir_is_noop() {
        let fs = fixture();
        fs.add_dir("/home/notes");
        let action = classify_dir(&fs, Path::new("/home/notes"), ConflictPolicy::Skip).unwrap();
        assert_eq!(action, DirAction::AlreadyDir);
    }

    #[test]
    fn dir_site_file_conflict_follows_policy() {
        let fs = fixture();
        fs.add_file("/home/notes", "a file blocks the directory");

        assert_eq!(
            classify_dir(&fs, Path::new("/home/notes"), ConflictPolicy::Skip).unwrap(),
            DirAction::SkipSubtree
        );
        assert_eq!(
            classify_dir(&fs, Path::new("/home/notes"), ConflictPolicy::Backup).unwrap(),
            DirAction::BackupThenCreate
        );
        assert_eq!(
            classify_dir(&fs, Path::new("/home/notes"), ConflictPolicy::Replace).unwrap(),
            DirAction::ReplaceThenCreate
        );
    }

    #[test]
    fn dir_site_symlink_is_a_conflict_even_when_it_points_at_a_dir() {
        let fs = fixture();
        fs.add_dir("/elsewhere/real");
        fs.add_symlink("/home/notes", "/elsewhere/real");

        let action = classify_dir(&fs, Path::new("/home/notes"), ConflictPolicy::Backup).unwrap();
        assert_eq!(action, DirAction::BackupThenCreate);
    }

    #[test]
    fn policy_parses_from_manifest_strings() {
        #[derive(Deserialize)]
        struct Doc {
            mode: ConflictPolicy,
        }
        let doc: Doc = toml::from_str("mode = \"replace\"").unwrap();
        assert_eq!(doc.mode, ConflictPolicy::Replace);
        assert!(toml::from_str::<Doc>("mode = \"merge\"").is_err());
    }
}
