//! Tree-shaped filesystem abstraction consumed by the search engine.
//!
//! A [`FileTree`] value is a *scope*: it can list its own entries, narrow itself
//! to one of its child directories, and open one of its files. The engine never
//! sees absolute paths, only scopes and the relative path it accumulates while
//! descending, which keeps the engine independent of where the data lives.
//!
//! Two implementations ship with the crate:
//!
//! - [`OsTree`] reads a real directory through `std::fs`
//! - [`MemoryTree`] is an in-memory fixture for tests and benchmarks
//!
//! ```rust,ignore
//! let tree = MemoryTree::new()
//!     .with_file("greeting.txt", "Hello world")
//!     .with_file("subdirectory/greeting2.txt", "Hello gophers");
//!
//! for path in find_files(tree, "Hello")? {
//!     println!("{}", path.display());
//! }
//! ```

use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::PathBuf;

mod memory;
mod os;

pub use memory::{MemoryReader, MemoryTree};
pub use os::OsTree;

/// One immediate child of a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// The entry's own name, without any leading directory
    pub name: OsString,
    /// Whether the entry should be descended into rather than scanned
    pub is_dir: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// A directory scope the search engine can list, narrow and read from.
///
/// Scopes are moved into worker tasks, hence the `Send + Sync + 'static` bound.
pub trait FileTree: Send + Sync + Sized + 'static {
    /// Stream returned by [`FileTree::open`]
    type Reader: Read + Send;

    /// Lists the entries directly below this scope, in no particular order
    fn read_dir(&self) -> io::Result<Vec<DirEntry>>;

    /// Narrows this scope to the child directory `name`
    fn sub(&self, name: &OsStr) -> io::Result<Self>;

    /// Opens the file `name` located directly in this scope
    fn open(&self, name: &OsStr) -> io::Result<Self::Reader>;

    /// Human readable location of this scope, used in error messages
    fn location(&self) -> PathBuf;
}
