use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

use super::{DirEntry, FileTree};

/// In-memory tree keyed by slash-separated paths.
///
/// Parent directories are created implicitly when a file is added. Paths can be
/// marked as denied (every access fails with `PermissionDenied`) or as failing
/// reads (contents are returned, then the stream errors), which makes the
/// engine's silent-failure paths reproducible without touching the real
/// filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    nodes: Arc<Nodes>,
    /// Empty for the root, otherwise the scope's path followed by `/`
    prefix: String,
}

#[derive(Debug, Clone, Default)]
struct Nodes {
    files: BTreeMap<String, Arc<[u8]>>,
    dirs: BTreeSet<String>,
    denied: BTreeSet<String>,
    failing_reads: BTreeSet<String>,
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn parents(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(idx, _)| &path[..idx])
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating its parent directories
    pub fn with_file(mut self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        let path = normalize(path);
        let nodes = Arc::make_mut(&mut self.nodes);
        nodes.dirs.extend(parents(&path).map(str::to_owned));
        nodes.files.insert(path, Arc::from(contents.as_ref()));
        self
    }

    /// Adds an empty directory, creating its parents
    pub fn with_dir(mut self, path: &str) -> Self {
        let path = normalize(path);
        let nodes = Arc::make_mut(&mut self.nodes);
        nodes.dirs.extend(parents(&path).map(str::to_owned));
        nodes.dirs.insert(path);
        self
    }

    /// Makes every access to `path` fail with `PermissionDenied`. An empty path denies the root.
    pub fn deny(mut self, path: &str) -> Self {
        Arc::make_mut(&mut self.nodes).denied.insert(normalize(path));
        self
    }

    /// Makes reads of the file at `path` fail once its contents are exhausted
    pub fn fail_reads(mut self, path: &str) -> Self {
        Arc::make_mut(&mut self.nodes)
            .failing_reads
            .insert(normalize(path));
        self
    }

    fn current(&self) -> &str {
        self.prefix.trim_end_matches('/')
    }

    fn child_path(&self, name: &OsStr) -> io::Result<String> {
        let name = name.to_str().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "entry name is not valid UTF-8")
        })?;
        Ok(format!("{}{}", self.prefix, name))
    }

    fn check_access(&self, path: &str) -> io::Result<()> {
        if self.nodes.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {path}"),
            ));
        }
        Ok(())
    }
}

/// Reader over a shared in-memory file
#[derive(Debug)]
pub struct MemoryReader {
    data: Cursor<Arc<[u8]>>,
    fail_at_end: bool,
}

impl Read for MemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 && self.fail_at_end && !buf.is_empty() {
            return Err(io::Error::other("simulated read failure"));
        }
        Ok(n)
    }
}

impl FileTree for MemoryTree {
    type Reader = MemoryReader;

    fn read_dir(&self) -> io::Result<Vec<DirEntry>> {
        let current = self.current();
        self.check_access(current)?;
        if !current.is_empty() && !self.nodes.dirs.contains(current) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {current}"),
            ));
        }

        let is_child = |path: &&String| {
            path.strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        };
        let name = |path: &String| path[self.prefix.len()..].to_owned();

        let dirs = self
            .nodes
            .dirs
            .iter()
            .filter(is_child)
            .map(|path| DirEntry::dir(name(path)));
        let files = self
            .nodes
            .files
            .keys()
            .filter(is_child)
            .map(|path| DirEntry::file(name(path)));

        Ok(dirs.chain(files).collect())
    }

    fn sub(&self, name: &OsStr) -> io::Result<Self> {
        let path = self.child_path(name)?;
        self.check_access(&path)?;
        if !self.nodes.dirs.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {path}"),
            ));
        }
        Ok(Self {
            nodes: Arc::clone(&self.nodes),
            prefix: format!("{path}/"),
        })
    }

    fn open(&self, name: &OsStr) -> io::Result<MemoryReader> {
        let path = self.child_path(name)?;
        self.check_access(&path)?;
        let data = self.nodes.files.get(&path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {path}"),
            )
        })?;
        Ok(MemoryReader {
            data: Cursor::new(Arc::clone(data)),
            fail_at_end: self.nodes.failing_reads.contains(&path),
        })
    }

    fn location(&self) -> PathBuf {
        match self.current() {
            "" => PathBuf::from("."),
            current => PathBuf::from(current),
        }
    }
}
