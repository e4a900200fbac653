//! The pipeline orchestrator: wires N stages into a linear chain, feeds
//! input, waits for drain, and tears the chain down in order.
//!
//! The topology supported here is a linear chain only: no DAG, no
//! reconfiguration, no metrics channel.

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::registry::StageRegistry;
use crate::stage::{Stage, SENTINEL};

/// An ordered chain of stages, each attached to the next.
///
/// Invariant: for every `i < len - 1`, stage `i`'s forwarder is stage
/// `i + 1`'s `place_work`; the last stage is left unattached (terminal).
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Builds a pipeline: one stage per entry in `stage_names`, each with
    /// capacity `queue_capacity`, resolved through `registry`. Attaches
    /// every stage to the next before returning, so the chain is ready
    /// for `feed`.
    pub fn build(
        registry: &StageRegistry,
        queue_capacity: usize,
        stage_names: &[String],
    ) -> Result<Self, PipelineError> {
        if stage_names.is_empty() {
            return Err(PipelineError::Usage(
                "at least one stage name must be given".into(),
            ));
        }

        let mut stages = Vec::with_capacity(stage_names.len());
        for name in stage_names {
            let transform = registry.create(name).ok_or_else(|| PipelineError::UnknownStage {
                name: name.clone(),
                known: registry.names().join(", "),
            })?;
            let stage = Stage::new(name.clone(), queue_capacity, transform)
                .map_err(|source| PipelineError::Init {
                    stage: name.clone(),
                    source,
                })?;
            stages.push(stage);
        }

        for i in 0..stages.len().saturating_sub(1) {
            let (left, right) = stages.split_at(i + 1);
            left[i].attach(&right[0]).map_err(PipelineError::Stage)?;
        }

        info!(stages = stage_names.join(" -> "), "pipeline built");
        Ok(Self { stages })
    }

    /// Feeds a single record into stage 0. If `record` is the sentinel,
    /// the caller must stop feeding after this call, see `finish_feed`.
    pub fn feed(&self, record: impl Into<String>) -> Result<(), PipelineError> {
        self.stages[0]
            .place_work(record)
            .map_err(PipelineError::Stage)
    }

    /// Enqueues the sentinel into stage 0. Idempotent from the caller's
    /// perspective in that a second call simply fails with `QueueError`
    /// once the queue is finished downstream of the first sentinel, but
    /// the orchestrator contract is to call this at most once.
    pub fn finish_feed(&self) -> Result<(), PipelineError> {
        self.feed(SENTINEL)
    }

    /// Waits for every stage to drain, in order, then joins every
    /// worker thread, in order. After this returns, the pipeline has
    /// shut down cleanly and must not be fed further input.
    pub fn quiesce_and_teardown(mut self) -> Result<(), PipelineError> {
        for stage in &self.stages {
            stage.wait_finished();
        }
        for stage in &mut self.stages {
            if let Err(err) = stage.fini() {
                warn!(stage = stage.name(), error = %err, "error during stage teardown");
                return Err(PipelineError::Stage(err));
            }
        }
        Ok(())
    }

    /// The stage names in chain order, for diagnostics.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }
}
