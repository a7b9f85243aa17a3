use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Counts outstanding tasks of a dynamically growing task tree.
///
/// Every increment is represented by a [`TaskGuard`], and the matching
/// decrement happens when that guard is dropped, so the count can never go
/// negative and a task that unwinds still settles its slot. A parent must
/// obtain the guards of its children before releasing its own, which keeps the
/// count above zero until the whole subtree has finished.
#[derive(Debug, Clone, Default)]
pub struct CompletionCounter {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicUsize,
    lock: Mutex<()>,
    settled: Condvar,
}

/// One outstanding task; dropping it marks the task as finished
#[derive(Debug)]
#[must_use = "the task is considered finished as soon as the guard is dropped"]
pub struct TaskGuard {
    inner: Arc<Inner>,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new outstanding task
    pub fn enter(&self) -> TaskGuard {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        TaskGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of tasks whose guard is still alive
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Blocks until no task is outstanding.
    ///
    /// Returns immediately if nothing was ever registered.
    pub fn wait(&self) {
        let mut lock = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while self.inner.pending.load(Ordering::Acquire) != 0 {
            lock = self
                .inner
                .settled
                .wait(lock)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            // taking the lock orders this notification after a waiter's check
            let _lock = self
                .inner
                .lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.settled.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_without_tasks_returns() {
        let counter = CompletionCounter::new();
        counter.wait();
        assert_eq!(counter.pending(), 0);
    }

    #[test]
    fn test_guards_track_pending() {
        let counter = CompletionCounter::new();
        let first = counter.enter();
        let second = counter.enter();
        assert_eq!(counter.pending(), 2);

        drop(first);
        assert_eq!(counter.pending(), 1);
        drop(second);
        assert_eq!(counter.pending(), 0);
    }

    #[test]
    fn test_wait_blocks_until_nested_tasks_finish() {
        let counter = CompletionCounter::new();
        let finished = Arc::new(AtomicBool::new(false));

        let parent = counter.enter();
        let handle = {
            let counter = counter.clone();
            let finished = Arc::clone(&finished);
            thread::spawn(move || {
                // child registered before the parent releases its slot
                let child = counter.enter();
                drop(parent);
                thread::sleep(Duration::from_millis(50));
                finished.store(true, Ordering::SeqCst);
                drop(child);
            })
        };

        counter.wait();
        assert!(finished.load(Ordering::SeqCst));
        handle.join().unwrap();
    }

    #[test]
    fn test_many_concurrent_guards() {
        let counter = CompletionCounter::new();
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let guard = counter.enter();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5));
                    drop(guard);
                })
            })
            .collect();

        counter.wait();
        assert_eq!(counter.pending(), 0);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_guard_released_on_panic() {
        let counter = CompletionCounter::new();
        let guard = counter.enter();
        let result = thread::spawn(move || {
            let _guard = guard;
            panic!("task failed");
        })
        .join();

        assert!(result.is_err());
        counter.wait();
        assert_eq!(counter.pending(), 0);
    }
}
