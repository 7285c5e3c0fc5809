//! Asynchronous ingestion worker
//!
//! A single background task owns the belief sampler and drains an unbounded
//! command channel, so sequences are sampled one at a time and in the order
//! they were enqueued. Callers only pay for the channel send.
//!
//! Failures abort the affected sequence only: they are logged, counted and
//! broadcast as [`FaultReport`]s while the worker moves on to the next one.
//! On shutdown the channel is closed and every queued sequence is still
//! processed before the task exits.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use beliefpool_common::{BeliefPoolError, FaultKind, RawSequence, Result};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::buffer::CircularExperienceBuffer;
use crate::metrics::IngestMetrics;
use crate::sampling::{BeliefStateSampler, SequenceFailure};

/// Report of a sequence whose belief sampling was aborted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultReport {
    pub sequence_id: Uuid,
    pub kind: FaultKind,
    pub message: String,
    /// Samples appended before the abort; they remain valid
    pub samples_appended: usize,
    pub occurred_at: DateTime<Utc>,
}

impl FaultReport {
    fn from_failure(failure: &SequenceFailure) -> Self {
        Self {
            sequence_id: failure.sequence_id,
            kind: failure.error.kind(),
            message: failure.error.to_string(),
            samples_appended: failure.samples_appended,
            occurred_at: Utc::now(),
        }
    }
}

enum Command {
    Ingest {
        id: Uuid,
        sequence: Arc<RawSequence>,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the background belief sampling task
pub struct IngestionWorker {
    tx: mpsc::UnboundedSender<Command>,
    faults: broadcast::Sender<FaultReport>,
    handle: JoinHandle<()>,
}

impl IngestionWorker {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(
        sampler: BeliefStateSampler,
        buffer: Arc<CircularExperienceBuffer>,
        metrics: Arc<IngestMetrics>,
        fault_capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (faults, _) = broadcast::channel(fault_capacity.max(1));

        let handle = tokio::spawn(Self::run(sampler, buffer, metrics, faults.clone(), rx));

        Self { tx, faults, handle }
    }

    /// Queue `sequence` for sampling and return its ticket immediately
    pub fn enqueue(&self, sequence: Arc<RawSequence>) -> Result<Uuid> {
        let id = Uuid::now_v7();
        self.tx
            .send(Command::Ingest { id, sequence })
            .map_err(|_| BeliefPoolError::WorkerStopped)?;
        Ok(id)
    }

    /// Wait until every sequence enqueued before this call is processed
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(done_tx))
            .map_err(|_| BeliefPoolError::WorkerStopped)?;
        done_rx.await.map_err(|_| BeliefPoolError::WorkerStopped)
    }

    /// New receiver for fault reports published from now on
    pub fn subscribe_faults(&self) -> broadcast::Receiver<FaultReport> {
        self.faults.subscribe()
    }

    /// Stop accepting work, drain the queue and wait for the task to exit
    pub async fn shutdown(self) -> Result<()> {
        drop(self.tx);
        self.handle
            .await
            .map_err(|e| BeliefPoolError::Internal(format!("ingestion worker failed: {e}")))
    }

    async fn run(
        mut sampler: BeliefStateSampler,
        buffer: Arc<CircularExperienceBuffer>,
        metrics: Arc<IngestMetrics>,
        faults: broadcast::Sender<FaultReport>,
        mut rx: mpsc::UnboundedReceiver<Command>,
    ) {
        info!(
            posterior = sampler.posterior().name(),
            prior = sampler.prior().map(|p| p.name()),
            sample_size = sampler.sample_size(),
            "Belief ingestion worker started"
        );

        while let Some(command) = rx.recv().await {
            match command {
                Command::Ingest { id, sequence } => {
                    Self::ingest(&mut sampler, &buffer, &metrics, &faults, id, &sequence).await;
                }
                Command::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }

        info!("Ingestion channel closed, worker exiting");
    }

    #[instrument(skip_all, fields(sequence_id = %id, steps = sequence.len()))]
    async fn ingest(
        sampler: &mut BeliefStateSampler,
        buffer: &CircularExperienceBuffer,
        metrics: &IngestMetrics,
        faults: &broadcast::Sender<FaultReport>,
        id: Uuid,
        sequence: &RawSequence,
    ) {
        let result = AssertUnwindSafe(sampler.process(id, sequence, buffer))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                // appends made before the panic are not tracked
                Err(SequenceFailure {
                    sequence_id: id,
                    samples_appended: 0,
                    error: BeliefPoolError::Internal("belief sampling panicked".into()),
                })
            });

        match result {
            Ok(outcome) => {
                metrics.record_processed(outcome.samples_appended as u64);
                debug!(
                    samples = outcome.samples_appended,
                    buffer_len = buffer.len(),
                    "Sequence sampled"
                );
            }
            Err(failure) => {
                metrics.record_failed(failure.samples_appended as u64);
                error!(
                    error = %failure.error,
                    samples = failure.samples_appended,
                    "Belief sampling aborted for sequence"
                );
                if faults.send(FaultReport::from_failure(&failure)).is_err() {
                    debug!("No fault subscribers");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SyntheticModel;
    use crate::sampling::GaussianSampler;
    use beliefpool_common::{RawTransition, Vector};

    type Harness = (
        IngestionWorker,
        Arc<CircularExperienceBuffer>,
        Arc<IngestMetrics>,
    );

    fn worker(capacity: usize, sample_size: usize) -> Harness {
        let sampler = BeliefStateSampler::new(
            2,
            sample_size,
            &[1],
            Arc::new(SyntheticModel::posterior(2)),
            None,
            GaussianSampler::seeded(1),
        )
        .unwrap();
        let buffer = Arc::new(CircularExperienceBuffer::new(capacity).unwrap());
        let metrics = Arc::new(IngestMetrics::default());
        let worker = IngestionWorker::spawn(sampler, buffer.clone(), metrics.clone(), 8);
        (worker, buffer, metrics)
    }

    /// Terminal episode whose rewards all equal `tag`
    fn tagged(tag: f32, len: usize) -> Arc<RawSequence> {
        let mut transitions: Vec<RawTransition> = (0..len)
            .map(|_| {
                RawTransition::new(Vector::zeros(1), Vector::zeros(1), Vector::zeros(1), tag)
            })
            .collect();
        if let Some(last) = transitions.pop() {
            transitions.push(last.terminal());
        }
        Arc::new(RawSequence::new(transitions))
    }

    #[tokio::test]
    async fn test_sequences_processed_in_order() {
        let (worker, buffer, _) = worker(100, 2);
        for tag in 0..5 {
            worker.enqueue(tagged(tag as f32, 3)).unwrap();
        }
        worker.flush().await.unwrap();

        let rewards: Vec<f32> = buffer.snapshot().iter().map(|s| s.reward()).collect();
        let expected: Vec<f32> = (0..5).flat_map(|t| std::iter::repeat(t as f32).take(6)).collect();
        assert_eq!(rewards, expected);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let (worker, buffer, metrics) = worker(100, 1);
        for tag in 0..4 {
            worker.enqueue(tagged(tag as f32, 2)).unwrap();
        }
        worker.shutdown().await.unwrap();

        assert_eq!(buffer.len(), 8);
        assert_eq!(metrics.snapshot().sequences_processed, 4);
    }

    #[tokio::test]
    async fn test_fault_reported_and_worker_continues() {
        let (worker, buffer, metrics) = worker(100, 1);
        let mut faults = worker.subscribe_faults();

        // cut episode without look-ahead cannot be sampled without a prior
        let bad = Arc::new(RawSequence::new(vec![RawTransition::new(
            Vector::zeros(1),
            Vector::zeros(1),
            Vector::zeros(1),
            0.0,
        )]));
        let bad_id = worker.enqueue(bad).unwrap();
        worker.enqueue(tagged(1.0, 3)).unwrap();
        worker.flush().await.unwrap();

        let report = faults.recv().await.unwrap();
        assert_eq!(report.sequence_id, bad_id);
        assert_eq!(report.kind, FaultKind::Shape);
        assert_eq!(report.samples_appended, 0);

        assert_eq!(buffer.len(), 3);
        let snap = metrics.snapshot();
        assert_eq!(snap.sequences_failed, 1);
        assert_eq!(snap.sequences_processed, 1);
    }
}
