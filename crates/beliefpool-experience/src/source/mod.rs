//! Base replay sources
//!
//! The base source durably records raw episodes; the belief adapter layers
//! on top of it and only forwards sequences and metadata queries.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use beliefpool_common::{RawSequence, Result};

pub use memory::InMemoryPool;

/// Trait for raw experience sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExperiencePool: Send + Sync {
    /// Source name
    fn name(&self) -> String;

    /// Record a new episode
    async fn add_sequence(&self, sequence: Arc<RawSequence>) -> Result<()>;

    /// Shape of a single action
    fn action_dims(&self) -> Vec<usize>;

    /// Shape of a single target
    fn target_dims(&self) -> Vec<usize>;

    /// Kind of target, e.g. `"q"` or `"label"`
    fn target_type(&self) -> String;

    /// Human readable target labels
    fn labels(&self) -> Vec<String>;

    /// Number of recorded episodes
    async fn sequences(&self) -> usize;

    /// Drop all recorded episodes
    async fn reset(&self) -> Result<()>;

    /// Persist recorded episodes
    async fn dump(&self) -> Result<()>;
}
