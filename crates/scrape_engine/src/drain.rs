use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Counts units of work that were enqueued but not yet acknowledged.
///
/// Producers call [`DrainTracker::add`] per enqueued item, consumers call
/// [`DrainTracker::done`] once per item whatever its outcome, and
/// [`DrainTracker::wait`] blocks until the two balance.
#[derive(Debug, Clone, Default)]
pub struct DrainTracker {
    inner: Arc<(Mutex<usize>, Condvar)>,
}

impl DrainTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        *self.count() += n;
    }

    pub fn done(&self) {
        let mut outstanding = self.count();
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.inner.1.notify_all();
        }
    }

    pub fn outstanding(&self) -> usize {
        *self.count()
    }

    pub fn wait(&self) {
        let mut outstanding = self.count();
        while *outstanding > 0 {
            outstanding = self
                .inner
                .1
                .wait(outstanding)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    fn count(&self) -> MutexGuard<'_, usize> {
        self.inner
            .0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
