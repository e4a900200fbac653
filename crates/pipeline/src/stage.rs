//! Core definitions for pipeline stages: the worker thread, the
//! attach/place_work/wait_finished/fini contract, and the sentinel
//! propagation protocol.

use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, trace};

use crate::error::StageError;
use crate::latch::Latch;
use crate::queue::BoundedQueue;
use crate::transform::{Transform, TransformOutput};

/// The record that terminates the stream. Never transformed; forwarded
/// verbatim by every stage, in order, before that stage's worker exits.
pub const SENTINEL: &str = "<END>";

/// The downstream enqueue operation a stage holds as an opaque forwarder,
/// the Rust analog of a `next_place_work` function pointer.
type Forwarder = Arc<dyn Fn(&str) -> Result<(), StageError> + Send + Sync>;

/// One processing element: an input queue, a dedicated worker thread
/// running a [`Transform`], and an optional forwarder to the next stage.
///
/// Lifecycle: `new` (queue allocated, thread spawned) -> `attach`
/// (optional, at most once) -> records flow -> sentinel drains the
/// worker -> `wait_finished` returns -> `fini` joins the thread.
pub struct Stage {
    name: String,
    queue: Arc<BoundedQueue>,
    forwarder: Arc<OnceLock<Forwarder>>,
    drain_complete: Arc<Latch>,
    worker: Option<JoinHandle<()>>,
}

impl Stage {
    /// Allocates the stage's queue, spawns its worker thread, and returns
    /// immediately: the worker starts looping right away, dequeuing
    /// nothing until the orchestrator (or a test) calls `place_work`.
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        mut transform: Box<dyn Transform>,
    ) -> Result<Self, StageError> {
        let name = name.into();
        let queue = Arc::new(BoundedQueue::new(capacity).map_err(|source| StageError::Queue {
            stage: name.clone(),
            source,
        })?);
        let forwarder: Arc<OnceLock<Forwarder>> = Arc::new(OnceLock::new());
        let drain_complete = Arc::new(Latch::new());

        let worker = {
            let queue = Arc::clone(&queue);
            let forwarder = Arc::clone(&forwarder);
            let drain_complete = Arc::clone(&drain_complete);
            let name = name.clone();
            thread::Builder::new()
                .name(format!("stage-{name}"))
                .spawn(move || run_worker(&name, &queue, &forwarder, &drain_complete, transform.as_mut()))
                .map_err(|_| StageError::SpawnFailed { stage: name })?
        };

        Ok(Self {
            name,
            queue,
            forwarder,
            drain_complete,
            worker: Some(worker),
        })
    }

    /// This stage's diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches this stage to `next`, meaning every record this stage
    /// forwards lands in `next`'s input queue. At most once per stage;
    /// must be called before any record has been enqueued downstream.
    pub fn attach(&self, next: &Stage) -> Result<(), StageError> {
        let queue = Arc::clone(&next.queue);
        let next_name = next.name.clone();
        self.forwarder
            .set(Arc::new(move |record: &str| {
                queue
                    .enqueue(record.to_string())
                    .map_err(|source| StageError::Queue {
                        stage: next_name.clone(),
                        source,
                    })
            }))
            .map_err(|_| StageError::AlreadyAttached {
                stage: self.name.clone(),
            })
    }

    /// External entry point: enqueues a copy of `record` into this
    /// stage's input queue, blocking if it is full.
    pub fn place_work(&self, record: impl Into<String>) -> Result<(), StageError> {
        self.queue
            .enqueue(record.into())
            .map_err(|source| StageError::Queue {
                stage: self.name.clone(),
                source,
            })
    }

    /// Blocks until this stage's worker loop has exited, via either the
    /// terminal marker or sentinel propagation.
    pub fn wait_finished(&self) {
        self.drain_complete.wait();
    }

    /// Joins the worker thread. Must be called after `wait_finished` has
    /// returned on this stage and on every upstream stage. Calling this
    /// more than once returns [`StageError::NotInitialized`] on the
    /// second call, since there is no thread left to join.
    pub fn fini(&mut self) -> Result<(), StageError> {
        match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| StageError::WorkerPanicked {
                stage: self.name.clone(),
            }),
            None => Err(StageError::NotInitialized {
                stage: self.name.clone(),
            }),
        }
    }
}

/// The worker thread body shared by every stage: dequeue, check for the
/// terminal marker or sentinel, transform, forward, repeat.
fn run_worker(
    name: &str,
    queue: &BoundedQueue,
    forwarder: &OnceLock<Forwarder>,
    drain_complete: &Latch,
    transform: &mut dyn Transform,
) {
    debug!(stage = name, "worker started");
    loop {
        let record = match queue.dequeue() {
            Some(record) => record,
            None => {
                trace!(stage = name, "queue drained, no sentinel seen");
                break;
            }
        };

        if record == SENTINEL {
            if let Some(forward) = forwarder.get() {
                if let Err(err) = forward(&record) {
                    tracing::warn!(stage = name, error = %err, "failed to forward sentinel");
                }
            }
            debug!(stage = name, "sentinel forwarded, worker exiting");
            break;
        }

        match transform.apply(&record) {
            TransformOutput::Forward(out) => {
                if let Some(forward) = forwarder.get() {
                    if let Err(err) = forward(&out) {
                        tracing::warn!(stage = name, error = %err, "failed to forward record");
                    }
                }
            }
            TransformOutput::PassThrough => {
                if let Some(forward) = forwarder.get() {
                    if let Err(err) = forward(&record) {
                        tracing::warn!(stage = name, error = %err, "failed to forward record");
                    }
                }
            }
            TransformOutput::Drop => {
                trace!(stage = name, "record dropped by transform");
            }
        }
    }
    info!(stage = name, "worker drained");
    drain_complete.set();
}
