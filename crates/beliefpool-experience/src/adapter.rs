//! State belief adapter
//!
//! Wraps a raw replay source and exposes belief samples instead of raw
//! observations. New episodes are recorded in the source synchronously and
//! converted into belief samples by the background ingestion worker.

use std::sync::Arc;

use beliefpool_common::{
    BeliefBatch, BeliefPoolError, BeliefSample, DatasetDescriptor, DatasetSample, RawSequence,
    Result, STATE_INPUT_TYPE,
};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::buffer::CircularExperienceBuffer;
use crate::config::ExperienceSettings;
use crate::metrics::IngestMetrics;
use crate::model::InferenceModel;
use crate::sampling::{BeliefStateSampler, GaussianSampler};
use crate::source::ExperiencePool;
use crate::worker::{FaultReport, IngestionWorker};

/// Dataset of sampled belief states built on top of a raw replay source
pub struct StateBeliefAdapter {
    settings: ExperienceSettings,
    state_size: usize,
    pool: Arc<dyn ExperiencePool>,
    posterior: Arc<dyn InferenceModel>,
    prior: Option<Arc<dyn InferenceModel>>,
    buffer: Arc<CircularExperienceBuffer>,
    metrics: Arc<IngestMetrics>,
    worker: IngestionWorker,
}

impl StateBeliefAdapter {
    /// Validate settings and start the ingestion worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        settings: ExperienceSettings,
        pool: Arc<dyn ExperiencePool>,
        posterior: Arc<dyn InferenceModel>,
        prior: Option<Arc<dyn InferenceModel>>,
    ) -> Result<Self> {
        let state_size = settings.state_size()?;

        let sampler = BeliefStateSampler::new(
            state_size,
            settings.sample_size,
            &pool.action_dims(),
            posterior.clone(),
            prior.clone(),
            GaussianSampler::from_seed(settings.seed),
        )?;

        let buffer = Arc::new(CircularExperienceBuffer::new(settings.max_size)?);
        let metrics = Arc::new(IngestMetrics::default());
        let worker = IngestionWorker::spawn(
            sampler,
            buffer.clone(),
            metrics.clone(),
            settings.fault_capacity,
        );

        info!(
            name = %settings.name,
            source = %pool.name(),
            state_size,
            max_size = settings.max_size,
            sample_size = settings.sample_size,
            with_prior = prior.is_some(),
            "State belief adapter started"
        );

        Ok(Self {
            settings,
            state_size,
            pool,
            posterior,
            prior,
            buffer,
            metrics,
            worker,
        })
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn input_dims(&self) -> Vec<usize> {
        vec![self.state_size]
    }

    pub fn input_type(&self) -> &'static str {
        STATE_INPUT_TYPE
    }

    pub fn target_dims(&self) -> Vec<usize> {
        self.pool.target_dims()
    }

    pub fn target_type(&self) -> String {
        self.pool.target_type()
    }

    pub fn labels(&self) -> Vec<String> {
        self.pool.labels()
    }

    /// Number of belief samples currently available
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Shared handle for readers that outlive a borrow of the adapter
    pub fn buffer(&self) -> Arc<CircularExperienceBuffer> {
        self.buffer.clone()
    }

    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }

    pub fn get_sample(&self, index: usize) -> Result<BeliefSample> {
        self.buffer.get(index)
    }

    pub fn get_sample_into(&self, index: usize, out: &mut BeliefSample) -> Result<()> {
        self.buffer.get_into(index, out)
    }

    /// Belief sample as a plain input/target pair
    pub fn get_dataset_sample(&self, index: usize) -> Result<DatasetSample> {
        self.buffer.get(index).map(|s| s.to_dataset_sample())
    }

    pub fn get_batch(&self, indices: &[usize]) -> Result<BeliefBatch> {
        let mut batch = BeliefBatch::new(indices.len(), self.state_size);
        self.get_batch_into(&mut batch, indices)?;
        Ok(batch)
    }

    /// Refill `batch` with the samples at `indices`, reusing its storage
    pub fn get_batch_into(&self, batch: &mut BeliefBatch, indices: &[usize]) -> Result<()> {
        batch.resize(indices.len());
        for (slot, &index) in batch.samples_mut().iter_mut().zip(indices) {
            self.buffer.get_into(index, slot)?;
        }
        Ok(())
    }

    /// Belief samples are not grouped into sequences
    pub fn sequences(&self) -> usize {
        0
    }

    pub fn sequence_length(&self, _sequence: usize) -> usize {
        0
    }

    pub fn get_sequence(
        &self,
        _sequence: usize,
        _index: usize,
        _length: usize,
    ) -> Result<Vec<BeliefSample>> {
        Err(BeliefPoolError::Unsupported(
            "belief samples are not stored as sequences".into(),
        ))
    }

    /// Record `sequence` in the base source and queue it for belief sampling
    ///
    /// Returns once the source has accepted the sequence; sampling happens
    /// in the background. The returned id appears in fault reports.
    pub async fn add_sequence(&self, sequence: RawSequence) -> Result<Uuid> {
        let sequence = Arc::new(sequence);
        self.pool.add_sequence(sequence.clone()).await?;
        self.metrics.record_received();
        self.worker.enqueue(sequence)
    }

    /// Reset the base source; already sampled beliefs age out by overwrite
    pub async fn reset(&self) -> Result<()> {
        self.pool.reset().await
    }

    /// Persist the base source
    pub async fn dump(&self) -> Result<()> {
        self.pool.dump().await
    }

    pub fn descriptor(&self) -> DatasetDescriptor {
        DatasetDescriptor {
            name: self.settings.name.clone(),
            input_dims: self.input_dims(),
            input_type: self.input_type().to_string(),
            target_dims: self.target_dims(),
            target_type: self.target_type(),
            size: self.len(),
            labels: self.labels(),
            properties: self.settings.properties(),
        }
    }

    pub fn subscribe_faults(&self) -> broadcast::Receiver<FaultReport> {
        self.worker.subscribe_faults()
    }

    /// Wait until every sequence added so far has been sampled
    pub async fn flush(&self) -> Result<()> {
        self.worker.flush().await
    }

    /// Drain queued sequences, stop the worker and release the models
    pub async fn shutdown(self) -> Result<()> {
        self.worker.shutdown().await?;

        for model in std::iter::once(&self.posterior).chain(self.prior.as_ref()) {
            if let Err(e) = model.release().await {
                warn!(model = model.name(), error = %e, "Failed to release inference model");
            }
        }

        info!(
            name = %self.settings.name,
            samples = self.buffer.len(),
            "State belief adapter stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SyntheticModel;
    use crate::source::MockExperiencePool;
    use beliefpool_common::{RawTransition, Vector};

    fn mock_pool() -> MockExperiencePool {
        let mut pool = MockExperiencePool::new();
        pool.expect_name().return_const("mock".to_string());
        pool.expect_action_dims().return_const(vec![1usize]);
        pool.expect_target_dims().return_const(vec![1usize]);
        pool.expect_target_type().return_const("q".to_string());
        pool.expect_labels()
            .return_const(vec!["left".to_string(), "right".to_string()]);
        pool
    }

    fn adapter(pool: MockExperiencePool) -> Result<StateBeliefAdapter> {
        StateBeliefAdapter::new(
            ExperienceSettings::new(3)
                .with_name("beliefs")
                .with_max_size(16)
                .with_sample_size(2)
                .with_seed(4),
            Arc::new(pool),
            Arc::new(SyntheticModel::posterior(3)),
            None,
        )
    }

    fn episode() -> RawSequence {
        RawSequence::new(vec![
            RawTransition::new(Vector::zeros(2), Vector::zeros(1), Vector::zeros(1), 0.0),
            RawTransition::new(Vector::zeros(2), Vector::zeros(1), Vector::zeros(1), 1.0)
                .terminal(),
        ])
    }

    #[tokio::test]
    async fn test_metadata_delegates_to_pool() {
        let adapter = adapter(mock_pool()).unwrap();

        assert_eq!(adapter.name(), "beliefs");
        assert_eq!(adapter.input_dims(), vec![3]);
        assert_eq!(adapter.input_type(), "state");
        assert_eq!(adapter.target_dims(), vec![1]);
        assert_eq!(adapter.target_type(), "q");
        assert_eq!(adapter.labels(), vec!["left", "right"]);
        assert_eq!(adapter.sequences(), 0);
        assert_eq!(adapter.sequence_length(3), 0);

        let descriptor = adapter.descriptor();
        assert_eq!(descriptor.size, 0);
        assert_eq!(
            descriptor.properties.get("sampleSize").map(String::as_str),
            Some("2")
        );
    }

    #[tokio::test]
    async fn test_missing_state_size_refuses_to_start() {
        let result = StateBeliefAdapter::new(
            ExperienceSettings::default(),
            Arc::new(mock_pool()),
            Arc::new(SyntheticModel::posterior(3)),
            None,
        );
        assert!(matches!(result, Err(BeliefPoolError::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_action_dims_refuses_to_start() {
        let mut pool = MockExperiencePool::new();
        pool.expect_name().return_const("mock".to_string());
        pool.expect_action_dims().return_const(Vec::<usize>::new());

        let result = adapter(pool);
        assert!(matches!(result, Err(BeliefPoolError::Shape(_))));
    }

    #[tokio::test]
    async fn test_add_sequence_samples_in_background() {
        let mut pool = mock_pool();
        pool.expect_add_sequence().times(1).returning(|_| Ok(()));
        let adapter = adapter(pool).unwrap();

        adapter.add_sequence(episode()).await.unwrap();
        adapter.flush().await.unwrap();

        assert_eq!(adapter.len(), 4);
        assert_eq!(adapter.metrics().snapshot().sequences_received, 1);
        assert_eq!(adapter.get_dataset_sample(0).unwrap().input.len(), 3);
    }

    #[tokio::test]
    async fn test_pool_failure_skips_sampling() {
        let mut pool = mock_pool();
        pool.expect_add_sequence()
            .returning(|_| Err(BeliefPoolError::Io("disk full".into())));
        let adapter = adapter(pool).unwrap();

        let err = adapter.add_sequence(episode()).await.unwrap_err();
        assert!(matches!(err, BeliefPoolError::Io(_)));

        adapter.flush().await.unwrap();
        assert!(adapter.is_empty());
        assert_eq!(adapter.metrics().snapshot().sequences_received, 0);
    }

    #[tokio::test]
    async fn test_dump_and_reset_delegate() {
        let mut pool = mock_pool();
        pool.expect_add_sequence().returning(|_| Ok(()));
        pool.expect_reset().times(1).returning(|| Ok(()));
        pool.expect_dump()
            .times(1)
            .returning(|| Err(BeliefPoolError::Io("read-only".into())));
        let adapter = adapter(pool).unwrap();

        adapter.add_sequence(episode()).await.unwrap();
        adapter.flush().await.unwrap();

        adapter.reset().await.unwrap();
        assert!(matches!(adapter.dump().await, Err(BeliefPoolError::Io(_))));
        // reset leaves sampled beliefs in place
        assert_eq!(adapter.len(), 4);
    }

    #[tokio::test]
    async fn test_batches() {
        let mut pool = mock_pool();
        pool.expect_add_sequence().returning(|_| Ok(()));
        let adapter = adapter(pool).unwrap();

        adapter.add_sequence(episode()).await.unwrap();
        adapter.flush().await.unwrap();

        let batch = adapter.get_batch(&[3, 0, 1]).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.state_size(), 3);
        assert_eq!(batch.get(0).unwrap(), &adapter.get_sample(3).unwrap());

        let mut reused = batch;
        adapter.get_batch_into(&mut reused, &[2]).unwrap();
        assert_eq!(reused.len(), 1);

        assert!(matches!(
            adapter.get_batch(&[0, 99]),
            Err(BeliefPoolError::Index { index: 99, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_sequence_unsupported() {
        let adapter = adapter(mock_pool()).unwrap();
        assert!(matches!(
            adapter.get_sequence(0, 0, 1),
            Err(BeliefPoolError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_shutdown() {
        let mut pool = mock_pool();
        pool.expect_add_sequence().returning(|_| Ok(()));
        let adapter = adapter(pool).unwrap();
        let buffer = adapter.buffer();

        adapter.add_sequence(episode()).await.unwrap();
        adapter.shutdown().await.unwrap();

        assert_eq!(buffer.len(), 4);
    }
}
