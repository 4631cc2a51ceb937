use std::fmt;

use log::warn;

type Listener = Box<dyn FnMut(usize)>;

/// Saturating, disposable count of outstanding build obligations.
///
/// Observers subscribe with [`TaskCounter::on_change`] to learn when a
/// representation becomes busy or idle. After [`TaskCounter::dispose`] the
/// count is zero and further changes are ignored.
#[derive(Default)]
pub struct TaskCounter {
    count: usize,
    disposed: bool,
    listeners: Vec<Listener>,
}

impl TaskCounter {
    /// Idle counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Whether no obligations are outstanding.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.count == 0
    }

    /// Whether the counter has been disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Register an observer called with the new count after every change.
    pub fn on_change(&mut self, listener: impl FnMut(usize) + 'static) {
        if !self.disposed {
            self.listeners.push(Box::new(listener));
        }
    }

    /// Add one obligation.
    pub fn increment(&mut self) {
        self.change(1);
    }

    /// Remove one obligation.
    pub fn decrement(&mut self) {
        self.change(-1);
    }

    /// Apply a signed delta. Going below zero is a programming error: debug
    /// builds assert, release builds clamp to zero.
    pub fn change(&mut self, delta: isize) {
        if self.disposed || delta == 0 {
            return;
        }
        let next = self.count.checked_add_signed(delta);
        debug_assert!(
            next.is_some(),
            "task counter underflow: {} {delta:+}",
            self.count
        );
        let next = next.unwrap_or_else(|| {
            warn!("task counter underflow: {} {delta:+}", self.count);
            0
        });
        if next == self.count {
            return;
        }
        self.count = next;
        for listener in &mut self.listeners {
            listener(next);
        }
    }

    /// Reset to zero, notify observers one last time and ignore all further
    /// changes.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if self.count != 0 {
            self.count = 0;
            for listener in &mut self.listeners {
                listener(0);
            }
        }
        self.disposed = true;
        self.listeners.clear();
    }
}

impl fmt::Debug for TaskCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCounter")
            .field("count", &self.count)
            .field("disposed", &self.disposed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
