use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::{Condvar, Mutex};

/// Shared counter used to report how far along a long running operation is.
/// Cloning gives another handle to the same counter.
#[derive(Clone)]
pub struct Progress(Arc<ProgressInner>);

struct ProgressInner {
    complete: AtomicU64,
    total: AtomicU64,

    notify: Condvar,
    last_complete: Mutex<u64>,
}

impl Progress {
    pub fn new() -> Self {
        Self(Arc::new(ProgressInner {
            complete: AtomicU64::new(0),
            total: AtomicU64::new(0),

            notify: Condvar::new(),
            last_complete: Mutex::new(0),
        }))
    }

    /// Fraction of the work that is done, in `0..=1`.
    pub fn progress(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        self.completed() as f32 / total as f32
    }

    pub fn complete(&self) -> bool {
        let total = self.total();
        total != 0 && self.completed() >= total
    }

    pub fn completed(&self) -> u64 {
        self.0.complete.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.0.total.load(Ordering::Relaxed)
    }

    /// Starts a new operation of `total` steps.
    pub fn reset(&self, total: u64) {
        self.0.complete.store(0, Ordering::Relaxed);
        self.0.total.store(total, Ordering::Relaxed);
        *self.0.last_complete.lock() = 0;
    }

    pub fn add_complete(&self, count: u64) {
        self.0.complete.fetch_add(count, Ordering::Relaxed);
        self.notify();
    }

    pub fn set_finished(&self) {
        let total = self.total();
        self.0.complete.store(total, Ordering::Relaxed);
        self.notify();
    }

    // Taking the lock orders the notification after any waiter's check.
    fn notify(&self) {
        let _guard = self.0.last_complete.lock();
        self.0.notify.notify_all();
    }

    /// Blocks until more steps have completed than the last time this was
    /// called, returning the current count.
    pub fn wait(&self) -> u64 {
        let mut last_complete = self.0.last_complete.lock();
        while self.completed() <= *last_complete && !self.complete() {
            self.0.notify.wait(&mut last_complete);
        }

        let current = self.completed();
        *last_complete = current;
        current
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}
