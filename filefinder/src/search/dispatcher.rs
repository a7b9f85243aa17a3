use rayon::ThreadPool;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::completion::CompletionCounter;
use super::scanner::ContentScanner;
use crate::metrics::SearchMetrics;
use crate::tree::{DirEntry, FileTree};

/// Where per-entry tasks run
#[derive(Debug, Clone, Default)]
pub(crate) enum Executor {
    /// rayon's global pool
    #[default]
    Global,
    Pool(Arc<ThreadPool>),
}

impl Executor {
    fn spawn<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Self::Global => rayon::spawn(task),
            Self::Pool(pool) => pool.spawn(task),
        }
    }
}

/// Fans a traversal out into one task per directory entry.
///
/// Cloned into every task; all clones share the sink, the completion counter
/// and the metrics.
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    executor: Executor,
    scanner: ContentScanner,
    counter: CompletionCounter,
    metrics: SearchMetrics,
}

impl Dispatcher {
    pub(crate) fn new(
        executor: Executor,
        scanner: ContentScanner,
        counter: CompletionCounter,
        metrics: SearchMetrics,
    ) -> Self {
        Self {
            executor,
            scanner,
            counter,
            metrics,
        }
    }

    /// Lists `tree` and spawns a task for each of its entries.
    ///
    /// Only the listing of `tree` itself can fail; everything that happens
    /// inside the spawned tasks is absorbed there.
    pub(crate) fn traverse<T: FileTree>(&self, tree: T, dir: PathBuf) -> io::Result<()> {
        let entries = tree.read_dir()?;
        self.metrics.record_dir();

        let tree = Arc::new(tree);
        for entry in entries {
            let guard = self.counter.enter();
            let task = self.clone();
            let tree = Arc::clone(&tree);
            let dir = dir.clone();
            self.executor.spawn(move || {
                // dropped last, after this task's sink sender and scope
                let _guard = guard;
                let task = task;
                let tree = tree;
                task.visit(&*tree, dir, entry);
            });
        }
        Ok(())
    }

    fn visit<T: FileTree>(&self, tree: &T, dir: PathBuf, entry: DirEntry) {
        if !entry.is_dir {
            self.scanner.scan_file(tree, &dir, &entry.name);
            return;
        }

        let path = dir.join(&entry.name);
        let result = tree
            .sub(&entry.name)
            .and_then(|sub| self.traverse(sub, path.clone()));
        if let Err(e) = result {
            debug!("Skipping subtree {}: {}", path.display(), e);
            self.metrics.record_subtree_failure();
        }
    }
}
