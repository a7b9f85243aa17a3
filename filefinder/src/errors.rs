//! Error types for filefinder.
//!
//! Only one failure is ever surfaced by a search: the root scope could not be
//! listed. Everything below the root (a subdirectory that cannot be entered, a
//! file that cannot be opened or read) is absorbed by the engine and only shows
//! up in the run's metrics.
//!
//! ```rust,ignore
//! match find_files(OsTree::new("/missing"), "needle") {
//!     Ok(matches) => matches.for_each(|path| println!("{}", path.display())),
//!     Err(SearchError::NotFound(path)) => eprintln!("no such root: {}", path.display()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while starting a search or loading its configuration
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Root not found: {0}")]
    NotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to start completion waiter: {0}")]
    Spawn(#[source] io::Error),
}

impl SearchError {
    /// Classifies an I/O error raised while listing `path`
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
