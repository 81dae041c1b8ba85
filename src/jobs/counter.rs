use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Outstanding-job count shared between the thread that enqueues a group of
/// jobs and the workers that run them.
///
/// A counter is created by the first enqueue into an empty `Option<Counter>`
/// slot and consumed by [`JobSystem::wait_and_free_counter`]. It is never
/// reused across unrelated job groups.
///
/// [`JobSystem::wait_and_free_counter`]: super::JobSystem::wait_and_free_counter
#[derive(Clone)]
pub struct Counter {
    inner: Arc<CounterInner>,
}

struct CounterInner {
    remaining: AtomicUsize,
    lock: Mutex<()>,
    zero: Condvar,
}

impl Counter {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(CounterInner {
                remaining: AtomicUsize::new(0),
                lock: Mutex::new(()),
                zero: Condvar::new(),
            }),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }

    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    // Must be called before the jobs it accounts for are visible to workers.
    pub(crate) fn add(&self, count: usize) {
        self.inner.remaining.fetch_add(count, Ordering::AcqRel);
    }

    pub(crate) fn complete_one(&self) {
        let previous = self.inner.remaining.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "job counter underflow");
        if previous == 1 {
            // Taking the lock orders this notify after any waiter's check.
            let _guard = self
                .inner
                .lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.zero.notify_all();
        }
    }

    pub(crate) fn wait(&self) {
        if self.is_done() {
            return;
        }

        let mut guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !self.is_done() {
            guard = self
                .inner
                .zero
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn new_counter_is_done() {
        let counter = Counter::new();
        assert!(counter.is_done());
        counter.wait();
    }

    #[test]
    fn wait_returns_once_all_completions_arrive() {
        let counter = Counter::new();
        counter.add(3);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || counter.complete_one())
            })
            .collect();

        counter.wait();
        assert_eq!(counter.remaining(), 0);

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
