//! In-memory replay source
//!
//! Keeps recorded episodes in a bounded deque and dumps them as JSON.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use beliefpool_common::{BeliefPoolError, RawSequence, Result};
use parking_lot::RwLock;
use tracing::{debug, info};

use super::ExperiencePool;

/// Bounded in-memory episode store
pub struct InMemoryPool {
    name: String,
    action_dims: Vec<usize>,
    target_dims: Vec<usize>,
    target_type: String,
    labels: Vec<String>,
    max_sequences: usize,
    dump_path: Option<PathBuf>,
    sequences: RwLock<VecDeque<Arc<RawSequence>>>,
}

impl InMemoryPool {
    /// Create a pool for actions of shape `action_dims`
    pub fn new(name: impl Into<String>, action_dims: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            action_dims,
            target_dims: vec![1],
            target_type: "q".to_string(),
            labels: Vec::new(),
            max_sequences: usize::MAX,
            dump_path: None,
            sequences: RwLock::new(VecDeque::new()),
        }
    }

    pub fn with_target(mut self, dims: Vec<usize>, target_type: impl Into<String>) -> Self {
        self.target_dims = dims;
        self.target_type = target_type.into();
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Keep at most `max` episodes, dropping the oldest first
    pub fn with_max_sequences(mut self, max: usize) -> Self {
        self.max_sequences = max.max(1);
        self
    }

    /// File written by [`ExperiencePool::dump`]
    pub fn with_dump_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_path = Some(path.into());
        self
    }

    /// Episode at position `i`, oldest first
    pub fn get_sequence(&self, i: usize) -> Option<Arc<RawSequence>> {
        self.sequences.read().get(i).cloned()
    }
}

#[async_trait]
impl ExperiencePool for InMemoryPool {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn add_sequence(&self, sequence: Arc<RawSequence>) -> Result<()> {
        let mut sequences = self.sequences.write();
        while sequences.len() >= self.max_sequences {
            sequences.pop_front();
        }
        sequences.push_back(sequence);
        Ok(())
    }

    fn action_dims(&self) -> Vec<usize> {
        self.action_dims.clone()
    }

    fn target_dims(&self) -> Vec<usize> {
        self.target_dims.clone()
    }

    fn target_type(&self) -> String {
        self.target_type.clone()
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    async fn sequences(&self) -> usize {
        self.sequences.read().len()
    }

    async fn reset(&self) -> Result<()> {
        let dropped = {
            let mut sequences = self.sequences.write();
            let n = sequences.len();
            sequences.clear();
            n
        };
        debug!(pool = %self.name, dropped, "Reset replay pool");
        Ok(())
    }

    async fn dump(&self) -> Result<()> {
        let path = self
            .dump_path
            .as_ref()
            .ok_or_else(|| BeliefPoolError::Config(format!("pool {} has no dump path", self.name)))?;

        let bytes = {
            let sequences = self.sequences.read();
            let all: Vec<&RawSequence> = sequences.iter().map(|s| s.as_ref()).collect();
            serde_json::to_vec(&all)?
        };
        tokio::fs::write(path, bytes).await?;

        info!(pool = %self.name, path = %path.display(), "Dumped replay pool");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beliefpool_common::{RawTransition, Vector};

    fn episode(len: usize) -> Arc<RawSequence> {
        Arc::new(
            (0..len)
                .map(|i| {
                    RawTransition::new(
                        Vector::from(vec![i as f32]),
                        Vector::zeros(2),
                        Vector::zeros(1),
                        1.0,
                    )
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let pool = InMemoryPool::new("test", vec![2]);
        pool.add_sequence(episode(3)).await.unwrap();
        pool.add_sequence(episode(2)).await.unwrap();
        assert_eq!(pool.sequences().await, 2);
        assert_eq!(pool.get_sequence(1).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bounded_eviction() {
        let pool = InMemoryPool::new("test", vec![2]).with_max_sequences(2);
        for len in 1..=3 {
            pool.add_sequence(episode(len)).await.unwrap();
        }
        assert_eq!(pool.sequences().await, 2);
        assert_eq!(pool.get_sequence(0).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reset() {
        let pool = InMemoryPool::new("test", vec![2]);
        pool.add_sequence(episode(3)).await.unwrap();
        pool.reset().await.unwrap();
        assert_eq!(pool.sequences().await, 0);
    }

    #[tokio::test]
    async fn test_dump_without_path() {
        let pool = InMemoryPool::new("test", vec![2]);
        assert!(matches!(pool.dump().await, Err(BeliefPoolError::Config(_))));
    }

    #[tokio::test]
    async fn test_dump_writes_json() {
        let path = std::env::temp_dir().join(format!("beliefpool-dump-{}.json", uuid::Uuid::now_v7()));
        let pool = InMemoryPool::new("test", vec![2]).with_dump_path(&path);
        pool.add_sequence(episode(2)).await.unwrap();

        pool.dump().await.unwrap();

        let written: Vec<RawSequence> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].len(), 2);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_dump_io_failure() {
        let path = std::env::temp_dir()
            .join(format!("beliefpool-missing-{}", uuid::Uuid::now_v7()))
            .join("dump.json");
        let pool = InMemoryPool::new("test", vec![2]).with_dump_path(path);
        assert!(matches!(pool.dump().await, Err(BeliefPoolError::Io(_))));
    }
}
