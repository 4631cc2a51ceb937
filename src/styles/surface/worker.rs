//! Background thread for surface extraction.
//!
//! Keeps triangulation off the frame loop. The representation waits on the
//! job's [`Completion`] through its prepare step; a job whose receiver was
//! cancelled before the thread reached it is skipped.

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use log::{debug, trace, warn};

use super::{insert_mesh, SurfaceCache, SurfaceExtractor, SurfaceInput};
use crate::error::ReprError;
use crate::schedule::Completion;

/// One batch of surfaces to extract for a build.
pub(crate) struct ExtractJob {
    /// Cache keys with their inputs.
    pub inputs: Vec<(u64, SurfaceInput)>,
    pub extractor: Arc<dyn SurfaceExtractor>,
    pub cache: SurfaceCache,
    pub done: Completion<()>,
}

enum WorkerRequest {
    Extract(ExtractJob),
    Shutdown,
}

/// Background thread that extracts surfaces into a shared cache.
pub struct SurfaceWorker {
    request_tx: mpsc::Sender<WorkerRequest>,
    thread: Option<JoinHandle<()>>,
}

impl SurfaceWorker {
    /// Spawn the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`ReprError::ThreadSpawn`] if the thread fails to spawn.
    pub fn new(thread_name: &str) -> Result<Self, ReprError> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let thread = std::thread::Builder::new()
            .name(thread_name.to_owned())
            .spawn(move || Self::thread_loop(request_rx))
            .map_err(ReprError::ThreadSpawn)?;
        debug!("spawned surface worker {thread_name:?}");
        Ok(Self {
            request_tx,
            thread: Some(thread),
        })
    }

    /// Queue a job (non-blocking). If the thread is gone the job's
    /// completion is dropped, which fails the waiting build.
    pub(crate) fn submit(&self, job: ExtractJob) {
        if self.request_tx.send(WorkerRequest::Extract(job)).is_err() {
            warn!("surface worker is gone, dropping job");
        }
    }

    /// Shut down the background thread and wait for it to finish.
    pub fn shutdown(&mut self) {
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    #[allow(clippy::needless_pass_by_value)]
    fn thread_loop(request_rx: mpsc::Receiver<WorkerRequest>) {
        while let Ok(request) = request_rx.recv() {
            match request {
                WorkerRequest::Shutdown => break,
                WorkerRequest::Extract(job) => run(job),
            }
        }
        trace!("surface worker exiting");
    }
}

fn run(job: ExtractJob) {
    let ExtractJob {
        inputs,
        extractor,
        cache,
        done,
    } = job;
    if done.is_cancelled() {
        trace!("surface job cancelled before start");
        return;
    }
    for (key, input) in inputs {
        if done.is_cancelled() {
            trace!("surface job cancelled");
            return;
        }
        match extractor.extract(&input) {
            Ok(mesh) => insert_mesh(&cache, key, mesh),
            Err(e) => {
                done.complete(Err(e));
                return;
            }
        }
    }
    done.complete(Ok(()));
}

impl Drop for SurfaceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SurfaceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceWorker")
            .field("running", &self.thread.is_some())
            .finish_non_exhaustive()
    }
}
