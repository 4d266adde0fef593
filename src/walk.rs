//! Lazy depth-first traversal of the source tree.

use std::io;
use std::path::{Path, PathBuf};

use crate::fsx::{EntryKind, Fs};
use crate::ignore::IgnoreSet;

/// Whether traversal descends into subdirectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Descend into every non-ignored, non-symlink subdirectory.
    #[default]
    Recursive,
    /// Emit only the immediate children of the source root as leaves.
    TopLevelOnly,
}

/// One step of the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    /// A subdirectory about to be descended into; the destination must hold
    /// a plain directory at `rel` before its children can be planned.
    EnsureDir { abs: PathBuf, rel: PathBuf },
    /// An entry to be linked.
    Leaf {
        abs: PathBuf,
        rel: PathBuf,
        kind: EntryKind,
    },
    /// Entry excluded by the ignore rules.
    Ignored { rel: PathBuf },
    /// Subdirectory containing the destination root; never descended into.
    DestinationSkipped { rel: PathBuf },
}

/// Lazy iterator over the source tree.
///
/// Entries come out in per-directory name order and are never revisited.
/// After an [`WalkItem::EnsureDir`] item the caller may invoke
/// [`Walker::skip_current_dir`] to abandon that subtree; otherwise the next
/// call descends into it.
#[derive(Debug)]
pub struct Walker<'a, F: Fs> {
    fs: &'a F,
    dest_root: PathBuf,
    ignore: &'a IgnoreSet,
    scope: Scope,
    /// One frame per open directory; entries are reversed so `pop` yields
    /// name order.
    stack: Vec<Vec<(PathBuf, PathBuf)>>,
    pending: Option<(PathBuf, PathBuf)>,
    skip_pending: bool,
}

impl<'a, F: Fs> Walker<'a, F> {
    /// Start a traversal rooted at `source_root`.
    ///
    /// `dest_root` must already be canonical; it anchors the self-recursion
    /// guard.
    pub fn new(
        fs: &'a F,
        source_root: &Path,
        dest_root: &Path,
        ignore: &'a IgnoreSet,
        scope: Scope,
    ) -> io::Result<Self> {
        let mut walker = Self {
            fs,
            dest_root: dest_root.to_path_buf(),
            ignore,
            scope,
            stack: Vec::new(),
            pending: None,
            skip_pending: false,
        };
        walker.push_frame(source_root, Path::new(""))?;
        Ok(walker)
    }

    /// Do not descend into the directory most recently yielded as
    /// [`WalkItem::EnsureDir`].
    pub fn skip_current_dir(&mut self) {
        if self.pending.is_some() {
            self.skip_pending = true;
        }
    }

    fn push_frame(&mut self, dir_abs: &Path, dir_rel: &Path) -> io::Result<()> {
        let mut frame: Vec<(PathBuf, PathBuf)> = self
            .fs
            .list_dir(dir_abs)?
            .into_iter()
            .filter_map(|abs| {
                abs.file_name()
                    .map(|name| (abs.clone(), dir_rel.join(name)))
            })
            .collect();
        frame.reverse();
        self.stack.push(frame);
        Ok(())
    }
}

impl<F: Fs> Iterator for Walker<'_, F> {
    type Item = io::Result<WalkItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((abs, rel)) = self.pending.take() {
            let skip = std::mem::take(&mut self.skip_pending);
            if !skip && let Err(e) = self.push_frame(&abs, &rel) {
                return Some(Err(e));
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some((abs, rel)) = frame.pop() else {
                self.stack.pop();
                continue;
            };

            let name = rel
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.ignore.should_ignore(&name) {
                return Some(Ok(WalkItem::Ignored { rel }));
            }

            let kind = match self.fs.kind(&abs) {
                Ok(Some(kind)) => kind,
                // Entry vanished between listing and stat; skip it.
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            };

            if self.scope == Scope::TopLevelOnly || kind != EntryKind::Dir {
                return Some(Ok(WalkItem::Leaf { abs, rel, kind }));
            }

            // Self-recursion guard: refuse to descend into any directory the
            // destination root lives in (or is).
            let canonical = match self.fs.canonicalize(&abs) {
                Ok(c) => c,
                Err(e) => return Some(Err(e)),
            };
            if self.dest_root.starts_with(&canonical) {
                return Some(Ok(WalkItem::DestinationSkipped { rel }));
            }

            self.pending = Some((abs.clone(), rel.clone()));
            return Some(Ok(WalkItem::EnsureDir { abs, rel }));
        }
    }
}
