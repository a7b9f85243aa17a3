pub mod config;
pub mod errors;
pub mod metrics;
pub mod search;
pub mod tree;

pub use self::config::{CliOverrides, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use metrics::MetricsSnapshot;
pub use search::{find_files, find_files_in, find_files_sequential, Finder, Matches};
pub use tree::{DirEntry, FileTree, MemoryTree, OsTree};
