use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{DirEntry, FileTree};

/// Maps a listed entry to a directory or a regular file.
///
/// Directories are recognised without following symlinks, so a link to a
/// directory never leads back up the tree. Everything else is resolved through
/// its link target and kept only if it is a regular file: FIFOs, sockets and
/// devices would block or never end when read. `Ok(None)` means the entry is
/// skipped.
fn classify(entry: io::Result<fs::DirEntry>) -> io::Result<Option<DirEntry>> {
    let entry = entry?;
    let name = entry.file_name();
    if entry.file_type()?.is_dir() {
        return Ok(Some(DirEntry { name, is_dir: true }));
    }
    if fs::metadata(entry.path())?.is_file() {
        return Ok(Some(DirEntry { name, is_dir: false }));
    }
    trace!("Skipping non-regular entry: {}", entry.path().display());
    Ok(None)
}

/// A scope backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct OsTree {
    root: PathBuf,
}

impl OsTree {
    /// Creates a scope rooted at `root`. Nothing is checked until the scope is listed.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileTree for OsTree {
    type Reader = File;

    fn read_dir(&self) -> io::Result<Vec<DirEntry>> {
        let entries = fs::read_dir(&self.root)?
            .filter_map(|entry| match classify(entry) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping entry in {}: {}", self.root.display(), e);
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    fn sub(&self, name: &OsStr) -> io::Result<Self> {
        let path = self.root.join(name);
        if !fs::metadata(&path)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", path.display()),
            ));
        }
        Ok(Self { root: path })
    }

    fn open(&self, name: &OsStr) -> io::Result<File> {
        File::open(self.root.join(name))
    }

    fn location(&self) -> PathBuf {
        self.root.clone()
    }
}
