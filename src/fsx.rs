//! Filesystem capability seam.
//!
//! The engine never touches `std::fs` directly; everything goes through the
//! [`Fs`] trait so traversal, classification, and execution can be exercised
//! against the in-memory [`MemFs`] in tests while [`RealFs`] backs production
//! runs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a directory entry, taken from non-following metadata.
///
/// A symlink is always reported as [`EntryKind::Symlink`], even when its
/// target is a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// The filesystem operations the sync engine needs.
pub trait Fs {
    /// Kind of the entry at `path` without following symlinks.
    /// Returns `Ok(None)` when nothing exists at `path`.
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    /// Absolute paths of the entries in directory `path`, sorted by name.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Target of the symlink at `path`.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Contents of the file at `path`, following symlinks.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Absolute, symlink-resolved form of `path`.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create directory `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename `from` to `to` (used for backup-by-rename).
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove the entry at `path`: file, symlink, or directory tree.
    fn remove_all(&self, path: &Path) -> io::Result<()>;

    /// Create a symlink at `link` pointing to `target`.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;
}

/// [`Fs`] implementation backed by the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl Fs for RealFs {
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match std::fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(if meta.is_symlink() {
                EntryKind::Symlink
            } else if meta.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            })),
            // A path whose ancestor is a regular file stats as NotADirectory;
            // for planning purposes such a path holds nothing.
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<_>>()?;
        entries.sort();
        Ok(entries)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_symlink() {
            remove_symlink_entry(path)
        } else if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        create_symlink(target, link)
    }
}

#[cfg(unix)]
fn remove_symlink_entry(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}

/// On Windows, directory symlinks must be removed with `remove_dir`.
/// `symlink_metadata().is_dir()` returns `false` for symlinks, so check the
/// raw `FILE_ATTRIBUTE_DIRECTORY` bit instead.
#[cfg(windows)]
fn remove_symlink_entry(path: &Path) -> io::Result<()> {
    use std::os::windows::fs::MetadataExt;
    let meta = std::fs::symlink_metadata(path)?;
    if meta.file_attributes() & 0x10 != 0 {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// A node in the in-memory filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemNode {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

/// In-memory [`Fs`] implementation for deterministic tests.
///
/// Stores a flat `path -> node` map; directory listings come out sorted for
/// free. Symlinks are resolved at the whole-path level, which is all the
/// engine's fixtures need.
#[derive(Debug, Default)]
pub struct MemFs {
    nodes: RefCell<BTreeMap<PathBuf, MemNode>>,
}

const MAX_LINK_HOPS: usize = 16;

impl MemFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directory at `path`, creating missing ancestors.
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in ancestors_inclusive(&path) {
            nodes.entry(ancestor).or_insert(MemNode::Dir);
        }
    }

    /// Insert a file at `path` with the given contents, creating ancestors.
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path, MemNode::File(contents.into()));
    }

    /// Insert a symlink at `link` pointing to `target`, creating ancestors.
    pub fn add_symlink(&self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        let link = link.into();
        if let Some(parent) = link.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(link, MemNode::Symlink(target.into()));
    }

    /// Full copy of the current state, for before/after comparisons.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PathBuf, MemNode> {
        self.nodes.borrow().clone()
    }

    /// Node at exactly `path`, without following symlinks.
    #[must_use]
    pub fn node(&self, path: impl AsRef<Path>) -> Option<MemNode> {
        self.nodes.borrow().get(path.as_ref()).cloned()
    }

    /// Paths currently present, in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.nodes.borrow().keys().cloned().collect()
    }
}

/// `path` and every ancestor, root first.
fn ancestors_inclusive(path: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = path.ancestors().map(Path::to_path_buf).collect();
    out.reverse();
    out
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such entry: {}", path.display()),
    )
}

impl Fs for MemFs {
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        Ok(self.nodes.borrow().get(path).map(|node| match node {
            MemNode::File(_) => EntryKind::File,
            MemNode::Dir => EntryKind::Dir,
            MemNode::Symlink(_) => EntryKind::Symlink,
        }))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let nodes = self.nodes.borrow();
        match nodes.get(path) {
            Some(MemNode::Dir) => {}
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path.display()),
                ));
            }
            None => return Err(not_found(path)),
        }
        Ok(nodes
            .keys()
            .filter(|k| k.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        match self.nodes.borrow().get(path) {
            Some(MemNode::Symlink(target)) => Ok(target.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let nodes = self.nodes.borrow();
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_HOPS {
            match nodes.get(&current) {
                Some(MemNode::File(contents)) => return Ok(contents.clone()),
                Some(MemNode::Dir) => {
                    return Err(io::Error::new(
                        io::ErrorKind::IsADirectory,
                        format!("is a directory: {}", current.display()),
                    ));
                }
                Some(MemNode::Symlink(target)) => current = target.clone(),
                None => return Err(not_found(&current)),
            }
        }
        Err(io::Error::other("too many levels of symbolic links"))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let nodes = self.nodes.borrow();
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_HOPS {
            match nodes.get(&current) {
                Some(MemNode::Symlink(target)) => current = target.clone(),
                Some(_) => return Ok(current),
                None => return Err(not_found(&current)),
            }
        }
        Err(io::Error::other("too many levels of symbolic links"))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in ancestors_inclusive(path) {
            match nodes.get(&ancestor) {
                Some(MemNode::Dir) => {}
                Some(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("exists and is not a directory: {}", ancestor.display()),
                    ));
                }
                None => {
                    nodes.insert(ancestor, MemNode::Dir);
                }
            }
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(from) {
            return Err(not_found(from));
        }
        if !to.parent().is_some_and(|p| nodes.contains_key(p)) {
            return Err(not_found(to));
        }
        let moved: Vec<PathBuf> = nodes
            .keys()
            .filter(|k| k.as_path() == from || k.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                let new = match old.strip_prefix(from) {
                    Ok(suffix) if suffix.as_os_str().is_empty() => to.to_path_buf(),
                    Ok(suffix) => to.join(suffix),
                    Err(_) => old,
                };
                nodes.insert(new, node);
            }
        }
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(path) {
            return Err(not_found(path));
        }
        nodes.retain(|k, _| k.as_path() != path && !k.starts_with(path));
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes.contains_key(link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("entry exists: {}", link.display()),
            ));
        }
        if !link.parent().is_some_and(|p| nodes.contains_key(p)) {
            return Err(not_found(link));
        }
        nodes.insert(link.to_path_buf(), MemNode::Symlink(target.to_path_buf()));
        Ok(())
    }
}
