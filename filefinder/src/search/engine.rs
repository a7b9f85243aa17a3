use crossbeam_channel::{unbounded, Receiver};
use rayon::ThreadPoolBuilder;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

use super::completion::CompletionCounter;
use super::dispatcher::{Dispatcher, Executor};
use super::scanner::{ContentScanner, WordMatcher};
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::metrics::{MetricsSnapshot, SearchMetrics};
use crate::tree::{FileTree, OsTree};

/// Searches `tree` for files containing `word` on rayon's global pool.
///
/// Returns as soon as the root has been listed. Matches are delivered through
/// the returned [`Matches`] while the traversal is still running.
pub fn find_files<T: FileTree>(tree: T, word: &str) -> SearchResult<Matches> {
    Finder::new().find(tree, word)
}

/// [`find_files`] over a directory of the local filesystem
pub fn find_files_in(root: impl AsRef<Path>, word: &str) -> SearchResult<Matches> {
    find_files(OsTree::new(root.as_ref()), word)
}

/// Runs searches on a configurable thread pool
#[derive(Debug, Clone, Default)]
pub struct Finder {
    executor: Executor,
}

impl Finder {
    /// A finder that runs its tasks on rayon's global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// A finder with its own pool of `threads` workers
    pub fn with_threads(threads: NonZeroUsize) -> SearchResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|i| format!("filefinder-{i}"))
            .build()?;
        Ok(Self {
            executor: Executor::Pool(Arc::new(pool)),
        })
    }

    pub fn from_config(config: &SearchConfig) -> SearchResult<Self> {
        Self::with_threads(config.thread_count)
    }

    /// Searches `tree` for files with at least one line containing `word`.
    ///
    /// Fails only if the root of `tree` cannot be listed. Failures further down
    /// (subdirectories that cannot be entered, files that cannot be opened or
    /// read) are skipped silently and show up in [`Matches::stats`].
    pub fn find<T: FileTree>(&self, tree: T, word: &str) -> SearchResult<Matches> {
        info!("Starting search for {:?} in {}", word, tree.location().display());

        let (sender, receiver) = unbounded();
        let metrics = SearchMetrics::new();
        let counter = CompletionCounter::new();
        let scanner = ContentScanner::new(
            Arc::new(WordMatcher::new(word)),
            sender,
            metrics.clone(),
        );
        let dispatcher = Dispatcher::new(
            self.executor.clone(),
            scanner,
            counter.clone(),
            metrics.clone(),
        );

        let root = tree.location();
        dispatcher
            .traverse(tree, PathBuf::new())
            .map_err(|e| SearchError::io(root, e))?;

        // The waiter must not run on the pool: blocking a worker there could
        // starve the tasks it waits for.
        let waiter_metrics = metrics.clone();
        thread::Builder::new()
            .name("filefinder-waiter".to_string())
            .spawn(move || {
                counter.wait();
                waiter_metrics.log_stats();
                let stats = waiter_metrics.snapshot();
                info!(
                    "Search complete. Found {} matching files out of {} scanned",
                    stats.files_matched, stats.files_scanned
                );
                // the last sender goes away here, which ends the consumer's iteration
                drop(dispatcher);
                debug!("Result sink closed");
            })
            .map_err(SearchError::Spawn)?;

        Ok(Matches { receiver, metrics })
    }
}

/// Lazy, single-pass sequence of matching paths relative to the search root.
///
/// `next` blocks until a match arrives or every task has finished; the
/// iterator ends exactly when the traversal is complete. Paths arrive in no
/// particular order.
#[derive(Debug)]
pub struct Matches {
    receiver: Receiver<PathBuf>,
    metrics: SearchMetrics,
}

impl Matches {
    /// Counters of the run; final once the iterator has been exhausted
    pub fn stats(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Iterator for Matches {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        self.receiver.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MemoryTree;
    use std::collections::HashSet;

    #[test]
    fn test_find_with_metrics() {
        let tree = MemoryTree::new()
            .with_file("test.txt", "test line\ntest line 2\n")
            .with_file("other.txt", "nothing");

        let mut matches = find_files(tree, "test").unwrap();
        let found: Vec<PathBuf> = matches.by_ref().collect();
        assert_eq!(found, vec![PathBuf::from("test.txt")]);

        let stats = matches.stats();
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_matched, 1);
    }

    #[test]
    fn test_finder_with_threads() {
        let finder = Finder::with_threads(NonZeroUsize::new(2).unwrap()).unwrap();
        let tree = MemoryTree::new()
            .with_file("a/one.txt", "word")
            .with_file("b/two.txt", "word")
            .with_file("b/c/three.txt", "no");

        let found: HashSet<PathBuf> = finder.find(tree, "word").unwrap().collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&PathBuf::from("a").join("one.txt")));
        assert!(found.contains(&PathBuf::from("b").join("two.txt")));
    }

    #[test]
    fn test_empty_root_closes_immediately() {
        let matches = find_files(MemoryTree::new(), "anything").unwrap();
        assert_eq!(matches.count(), 0);
    }

    #[test]
    fn test_root_error_is_classified() {
        let err = find_files(MemoryTree::new().deny(""), "x").unwrap_err();
        assert!(matches!(err, SearchError::PermissionDenied(_)));
    }
}
