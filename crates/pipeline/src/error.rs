//! Error types for the pipeline system

use thiserror::Error;

use crate::queue::QueueError;

/// Errors a single stage can return from its public operations.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage's queue rejected an enqueue (see [`QueueError`]).
    #[error("queue error in stage '{stage}': {source}")]
    Queue {
        stage: String,
        #[source]
        source: QueueError,
    },

    /// An operation was attempted on a stage that never finished `new`
    /// successfully (see the Open Question resolution in DESIGN.md).
    #[error("stage '{stage}' is not initialized")]
    NotInitialized { stage: String },

    /// `attach` was called a second time on the same stage.
    #[error("stage '{stage}' already has a forwarder attached")]
    AlreadyAttached { stage: String },

    /// The worker thread failed to spawn.
    #[error("failed to spawn worker thread for stage '{stage}'")]
    SpawnFailed { stage: String },

    /// The worker thread panicked instead of exiting its loop normally.
    #[error("worker thread for stage '{stage}' panicked")]
    WorkerPanicked { stage: String },
}

/// Errors surfaced by the pipeline orchestrator and the CLI that drives
/// it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad CLI arguments (exit code 1).
    #[error("usage error: {0}")]
    Usage(String),

    /// A named stage could not be resolved in the registry (exit code 1).
    #[error("unknown stage '{name}' (known stages: {known})")]
    UnknownStage { name: String, known: String },

    /// A stage's `new` failed (exit code 2).
    #[error("failed to initialize stage '{stage}': {source}")]
    Init {
        stage: String,
        #[source]
        source: StageError,
    },

    /// A stage reported an error at runtime, e.g. while forwarding.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// An underlying synchronization primitive failed irrecoverably
    /// (a poisoned mutex from a prior panic). Treated as fatal.
    #[error("fatal synchronization error: {0}")]
    Fatal(String),
}

/// The process exit code a [`PipelineError`] maps to, per the CLI
/// surface's exit-code table.
pub fn exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::Usage(_) | PipelineError::UnknownStage { .. } => 1,
        PipelineError::Init { .. } => 2,
        PipelineError::Stage(_) | PipelineError::Fatal(_) => 2,
    }
}
