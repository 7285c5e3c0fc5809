//! Inference model port
//!
//! Posterior and prior models are black boxes mapping a list of input
//! vectors to one output vector. For belief sampling the output is a
//! `[mean | stdev]` parameter vector of length `2 * state_size`.

pub mod synthetic;

use async_trait::async_trait;
use beliefpool_common::{ModelError, Vector};

pub use synthetic::SyntheticModel;

/// Forward-only inference model
///
/// Inputs are positional: the posterior receives `[state, action,
/// observation]`, the prior `[state, action]`. Implementations doing
/// blocking work should move it off the async executor.
#[async_trait]
pub trait InferenceModel: Send + Sync {
    /// Name used in logs and fault reports
    fn name(&self) -> &str;

    /// Run one forward pass
    async fn forward(&self, inputs: &[&Vector]) -> Result<Vector, ModelError>;

    /// Release any resources held by the model (e.g. undeploy it)
    async fn release(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
