//! Concurrent traversal and content search.
//!
//! The engine is split into three cooperating parts:
//!
//! 1. **Dispatcher**: lists a scope and spawns one task per entry on a rayon
//!    pool. Directory tasks narrow the scope and recurse; file tasks hand the
//!    file to the scanner.
//! 2. **Scanner**: opens a single file, reads it line by line and sends its
//!    relative path to the shared sink on the first line containing the word.
//! 3. **Completion**: a counter with one guard per spawned task. A background
//!    waiter blocks until every guard has been dropped, then releases the last
//!    sink sender so the consumer's iteration ends.
//!
//! ```rust,ignore
//! let matches = find_files(OsTree::new("."), "TODO")?;
//! for path in matches {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! Only a failure to list the root is reported as an error. Subdirectories
//! that cannot be entered and files that cannot be opened or read are skipped
//! and counted in [`Matches::stats`].

pub mod completion;
mod dispatcher;
pub mod engine;
pub mod scanner;
pub mod sequential;

pub use completion::{CompletionCounter, TaskGuard};
pub use engine::{find_files, find_files_in, Finder, Matches};
pub use scanner::{ScanOutcome, WordMatcher};
pub use sequential::find_files_sequential;
