//! Directory tree walking.
//!
//! Turns a source directory into a lazy, deterministic sequence of files with
//! their archive names. Traversal is iterative (walkdir keeps an explicit
//! stack of open directories), so deep trees do not grow the call stack.

use crate::ArchiveError;
use crate::Result;
use crate::config::CompressionConfig;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use walkdir::DirEntry;
use walkdir::WalkDir;

/// Canonical absolute path of the directory being archived.
///
/// All archive names are computed against this anchor, so trailing
/// separators, `.` components and symlinked parents in the caller's input do
/// not leak into entry names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot(PathBuf);

impl SourceRoot {
    /// Canonicalizes `path` and checks that it is a directory.
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if the path does not exist or is not a
    /// directory.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let not_found = || ArchiveError::SourceNotFound {
            path: path.to_path_buf(),
        };

        let canonical = std::fs::canonicalize(path).map_err(|_| not_found())?;
        if !canonical.is_dir() {
            return Err(not_found());
        }
        Ok(Self(canonical))
    }

    /// Returns the canonical path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// A regular file and the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute filesystem path of the file.
    pub path: PathBuf,

    /// Name inside the archive: relative to the source root, `/`-separated,
    /// never starting with a separator.
    pub archive_name: String,
}

/// One item produced by [`DirectoryWalker::walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A regular file to archive.
    File(FileEntry),

    /// A symlink that was not followed.
    SkippedSymlink(PathBuf),
}

/// Walks a source directory, yielding files only.
///
/// # Examples
///
/// ```no_run
/// use zipvault_core::CompressionConfig;
/// use zipvault_core::walker::DirectoryWalker;
/// use zipvault_core::walker::SourceRoot;
///
/// let root = SourceRoot::resolve("./project")?;
/// let config = CompressionConfig::default();
/// let walker = DirectoryWalker::new(&root, &config);
///
/// for entry in walker.files() {
///     let entry = entry?;
///     println!("{} <- {}", entry.archive_name, entry.path.display());
/// }
/// # Ok::<(), zipvault_core::ArchiveError>(())
/// ```
pub struct DirectoryWalker<'a> {
    root: &'a SourceRoot,
    config: &'a CompressionConfig,
}

impl<'a> DirectoryWalker<'a> {
    /// Creates a walker over `root`.
    #[must_use]
    pub fn new(root: &'a SourceRoot, config: &'a CompressionConfig) -> Self {
        Self { root, config }
    }

    /// Returns a lazy iterator over the tree.
    ///
    /// Entries within a directory are visited in file-name order, so the
    /// sequence is stable for a fixed filesystem state. Directories are never
    /// yielded. A failure to read one entry is yielded as an `Err` item and
    /// the walk continues with the next one.
    pub fn walk(&self) -> impl Iterator<Item = Result<WalkEntry>> + '_ {
        let include_hidden = self.config.include_hidden;

        WalkDir::new(self.root.as_path())
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .min_depth(1)
            .into_iter()
            .filter_entry(move |entry| include_hidden || !is_hidden(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) => self.classify(&entry).transpose(),
                Err(e) => {
                    let entry = e
                        .path()
                        .map_or_else(String::new, |p| p.display().to_string());
                    Some(Err(ArchiveError::entry_write(entry, e)))
                }
            })
    }

    /// Returns only the files, dropping skipped symlinks.
    pub fn files(&self) -> impl Iterator<Item = Result<FileEntry>> + '_ {
        self.walk().filter_map(|entry| match entry {
            Ok(WalkEntry::File(file)) => Some(Ok(file)),
            Ok(WalkEntry::SkippedSymlink(_)) => None,
            Err(e) => Some(Err(e)),
        })
    }

    fn classify(&self, entry: &DirEntry) -> Result<Option<WalkEntry>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return Ok(None);
        }
        if file_type.is_symlink() {
            return Ok(Some(WalkEntry::SkippedSymlink(entry.path().to_path_buf())));
        }
        if !file_type.is_file() {
            // Sockets, fifos and device nodes have no archivable content.
            return Ok(None);
        }

        let archive_name = archive_name(entry.path(), self.root.as_path())?;
        Ok(Some(WalkEntry::File(FileEntry {
            path: entry.path().to_path_buf(),
            archive_name,
        })))
    }
}

/// Computes the `/`-separated archive name of `path` relative to `root`.
///
/// # Errors
///
/// Returns `EntryWriteFailed` if `path` is not under `root`, resolves to the
/// root itself, or has a component that is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use zipvault_core::walker::archive_name;
///
/// let name = archive_name(Path::new("/data/proj/sub/b.txt"), Path::new("/data/proj"))?;
/// assert_eq!(name, "sub/b.txt");
/// # Ok::<(), zipvault_core::ArchiveError>(())
/// ```
pub fn archive_name(path: &Path, root: &Path) -> Result<String> {
    let display = || path.display().to_string();
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ArchiveError::entry_write(display(), "path is outside the source root"))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| ArchiveError::entry_write(display(), "name is not valid UTF-8"))?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(ArchiveError::entry_write(
                    display(),
                    "unexpected path component",
                ));
            }
        }
    }

    if parts.is_empty() {
        return Err(ArchiveError::entry_write(display(), "empty archive name"));
    }
    Ok(parts.join("/"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
