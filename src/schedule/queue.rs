use log::trace;

use super::TaskCounter;

/// Requests that can be collapsed into one when a newer one arrives while
/// an older one is still waiting.
pub trait Coalesce: Sized {
    /// Merge `newer` into `self`, which was queued first.
    #[must_use]
    fn coalesce(self, newer: Self) -> Self;
}

/// What the caller must do with a submitted request.
#[derive(Debug, PartialEq)]
pub enum Submitted<T> {
    /// Nothing was running: execute this request now, then call
    /// [`BuildQueue::complete`].
    Run(T),
    /// Another request is executing; this one waits in the pending slot.
    Deferred,
}

/// Single-slot coalescing build queue.
///
/// At most one request executes at a time and at most one waits behind it.
/// A request submitted while another is waiting replaces (coalesces with)
/// the waiting one instead of queueing after it. The owned [`TaskCounter`]
/// always equals the number of executing plus waiting requests.
#[derive(Debug)]
pub struct BuildQueue<T> {
    tasks: TaskCounter,
    executing: bool,
    pending: Option<T>,
}

impl<T> Default for BuildQueue<T> {
    fn default() -> Self {
        Self {
            tasks: TaskCounter::new(),
            executing: false,
            pending: None,
        }
    }
}

impl<T: Coalesce> BuildQueue<T> {
    /// Idle queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding obligations (executing plus waiting).
    #[must_use]
    pub const fn tasks(&self) -> &TaskCounter {
        &self.tasks
    }

    /// Mutable access to the counter, for subscribing observers.
    pub fn tasks_mut(&mut self) -> &mut TaskCounter {
        &mut self.tasks
    }

    /// Whether a request is executing.
    #[must_use]
    pub const fn is_executing(&self) -> bool {
        self.executing
    }

    /// Number of waiting requests (zero or one).
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.pending.is_some() {
            1
        } else {
            0
        }
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// The waiting request, if any.
    pub fn pending_mut(&mut self) -> Option<&mut T> {
        self.pending.as_mut()
    }

    /// Submit a request.
    pub fn submit(&mut self, request: T) -> Submitted<T> {
        if !self.executing && self.pending.is_none() {
            self.tasks.increment();
            self.executing = true;
            return Submitted::Run(request);
        }
        // Collapse whatever waits into exactly one obligation.
        self.tasks.change(1 - self.len() as isize);
        self.pending = Some(match self.pending.take() {
            Some(older) => {
                trace!("coalescing waiting build request");
                older.coalesce(request)
            }
            None => request,
        });
        Submitted::Deferred
    }

    /// Finish the executing request. Returns the next request to execute
    /// (which is then executing) or `None` when the queue goes idle.
    pub fn complete(&mut self) -> Option<T> {
        debug_assert!(self.executing, "completing an idle build queue");
        if !self.executing {
            return None;
        }
        self.tasks.decrement();
        let next = self.pending.take();
        self.executing = next.is_some();
        next
    }

    /// Discard the waiting request. The executing obligation, if any, is
    /// left to [`complete`](Self::complete).
    pub fn kill(&mut self) {
        if self.pending.take().is_some() {
            trace!("discarding waiting build request");
            self.tasks.decrement();
        }
    }

    /// Terminal shutdown: drop everything and dispose the counter.
    pub fn dispose(&mut self) {
        self.kill();
        self.executing = false;
        self.tasks.dispose();
    }
}
