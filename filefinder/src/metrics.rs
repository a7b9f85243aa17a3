use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters shared by every task of one search
#[derive(Debug, Clone, Default)]
pub struct SearchMetrics {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    dirs_traversed: AtomicU64,
    subtree_failures: AtomicU64,
    files_scanned: AtomicU64,
    files_matched: AtomicU64,
    open_failures: AtomicU64,
    read_failures: AtomicU64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a directory whose entries were listed
    pub fn record_dir(&self) {
        self.inner.dirs_traversed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a subdirectory that could not be entered or listed
    pub fn record_subtree_failure(&self) {
        self.inner.subtree_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file that was opened and read until a match or its end
    pub fn record_scanned(&self, matched: bool) {
        self.inner.files_scanned.fetch_add(1, Ordering::Relaxed);
        if matched {
            self.inner.files_matched.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_open_failure(&self) {
        self.inner.open_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self) {
        self.inner.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dirs_traversed: self.inner.dirs_traversed.load(Ordering::Relaxed),
            subtree_failures: self.inner.subtree_failures.load(Ordering::Relaxed),
            files_scanned: self.inner.files_scanned.load(Ordering::Relaxed),
            files_matched: self.inner.files_matched.load(Ordering::Relaxed),
            open_failures: self.inner.open_failures.load(Ordering::Relaxed),
            read_failures: self.inner.read_failures.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counter values
    pub fn log_stats(&self) {
        let stats = self.snapshot();
        info!(
            "Search stats:\n\
             Directories traversed: {}\n\
             Subtrees skipped: {}\n\
             Files scanned/matched: {}/{}\n\
             Open/read failures: {}/{}",
            stats.dirs_traversed,
            stats.subtree_failures,
            stats.files_scanned,
            stats.files_matched,
            stats.open_failures,
            stats.read_failures
        );
    }
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub dirs_traversed: u64,
    pub subtree_failures: u64,
    pub files_scanned: u64,
    pub files_matched: u64,
    pub open_failures: u64,
    pub read_failures: u64,
}

impl MetricsSnapshot {
    /// Files that were skipped because they could not be opened or read
    pub fn files_failed(&self) -> u64 {
        self.open_failures + self.read_failures
    }
}
