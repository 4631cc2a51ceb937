//! Cancellable asynchronous precomputation.
//!
//! A style adapter may need slow work (surface extraction, remote
//! computation) before its data can be created. It reports that work as a
//! [`PrepareTask`] which the representation polls from the host's frame
//! loop; the kernel never learns whether the task runs inline, on a worker
//! thread or elsewhere.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::task::Poll;

use crate::error::AdapterError;

/// An outstanding precomputation with a single completion signal.
pub trait PrepareTask {
    /// Check for completion without blocking. Must report `Ready` exactly
    /// once; the task is dropped afterwards.
    fn poll(&mut self) -> Poll<Result<(), AdapterError>>;

    /// The result is no longer wanted. Completion after cancellation must
    /// not touch any representation state.
    fn cancel(&mut self);
}

/// Outcome of an adapter's prepare step.
pub enum Prepare {
    /// Data can be created right away.
    Ready,
    /// Wait for the task before creating or updating data.
    Pending(Box<dyn PrepareTask>),
}

impl fmt::Debug for Prepare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Create a linked completion handle and receiver.
///
/// The [`Completion`] goes to whoever does the work (possibly another
/// thread); the [`Pending`] stays with the adapter and is polled.
#[must_use]
pub fn completion<T>() -> (Completion<T>, Pending<T>) {
    let (tx, rx) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    (
        Completion {
            tx: Some(tx),
            cancelled: Arc::clone(&cancelled),
        },
        Pending { rx, cancelled },
    )
}

/// Single-use completion signal.
///
/// Consumed by [`complete`](Self::complete). Dropping it without completing
/// signals [`AdapterError::PrepareAbandoned`], so a receiver never waits
/// forever.
pub struct Completion<T> {
    tx: Option<mpsc::Sender<Result<T, AdapterError>>>,
    cancelled: Arc<AtomicBool>,
}

impl<T> Completion<T> {
    /// Deliver the result. A cancelled or dropped receiver is not an error.
    pub fn complete(mut self, result: Result<T, AdapterError>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(result);
        }
    }

    /// Whether the receiver gave up; long-running work may stop early.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(AdapterError::PrepareAbandoned));
        }
    }
}

/// Receiving side of [`completion`].
pub struct Pending<T> {
    rx: mpsc::Receiver<Result<T, AdapterError>>,
    cancelled: Arc<AtomicBool>,
}

impl<T> Pending<T> {
    /// Take the result if it has arrived.
    pub fn try_take(&mut self) -> Poll<Result<T, AdapterError>> {
        match self.rx.try_recv() {
            Ok(result) => Poll::Ready(result),
            Err(mpsc::TryRecvError::Empty) => Poll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => {
                Poll::Ready(Err(AdapterError::PrepareAbandoned))
            }
        }
    }

    /// Tell the worker the result is no longer wanted.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl PrepareTask for Pending<()> {
    fn poll(&mut self) -> Poll<Result<(), AdapterError>> {
        self.try_take()
    }

    fn cancel(&mut self) {
        Self::cancel(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_once() {
        let (done, mut pending) = completion::<u32>();
        assert_eq!(pending.try_take(), Poll::Pending);
        done.complete(Ok(7));
        assert_eq!(pending.try_take(), Poll::Ready(Ok(7)));
    }

    #[test]
    fn dropped_handle_reports_abandoned() {
        let (done, mut pending) = completion::<()>();
        drop(done);
        assert_eq!(
            pending.try_take(),
            Poll::Ready(Err(AdapterError::PrepareAbandoned))
        );
    }

    #[test]
    fn cancellation_is_visible_to_worker() {
        let (done, mut pending) = completion::<()>();
        let worker = std::thread::spawn(move || {
            while !done.is_cancelled() {
                std::thread::yield_now();
            }
            done.complete(Err(AdapterError::Prepare("cancelled".into())));
        });
        PrepareTask::cancel(&mut pending);
        worker.join().unwrap();
        assert!(pending.is_cancelled());
        assert!(matches!(pending.poll(), Poll::Ready(Err(_))));
    }
}
