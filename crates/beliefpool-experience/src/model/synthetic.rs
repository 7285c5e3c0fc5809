//! Synthetic inference model
//!
//! A parameter-free stand-in for trained posterior/prior networks, used by
//! the demo binary and benchmarks. The mean follows a damped copy of the
//! previous state nudged by the average of the remaining inputs; the
//! standard deviation is constant.

use std::time::Duration;

use async_trait::async_trait;
use beliefpool_common::{ModelError, ShapeError, Vector};

use super::InferenceModel;

/// Deterministic `[mean | stdev]` generator
#[derive(Debug, Clone)]
pub struct SyntheticModel {
    name: String,
    state_size: usize,
    arity: usize,
    decay: f32,
    noise: f32,
    latency: Option<Duration>,
}

impl SyntheticModel {
    /// Posterior stand-in taking `[state, action, observation]`
    pub fn posterior(state_size: usize) -> Self {
        Self::new("synthetic-posterior", state_size, 3)
    }

    /// Prior stand-in taking `[state, action]`
    pub fn prior(state_size: usize) -> Self {
        Self::new("synthetic-prior", state_size, 2)
    }

    fn new(name: &str, state_size: usize, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            state_size,
            arity,
            decay: 0.9,
            noise: 0.1,
            latency: None,
        }
    }

    /// Constant standard deviation of every output dimension
    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    /// Simulated inference time per forward pass
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn params(&self, inputs: &[&Vector]) -> Result<Vector, ModelError> {
        if inputs.len() != self.arity {
            return Err(ShapeError::LengthMismatch {
                expected: self.arity,
                actual: inputs.len(),
            }
            .into());
        }
        let state = inputs[0];
        if state.len() != self.state_size {
            return Err(ShapeError::LengthMismatch {
                expected: self.state_size,
                actual: state.len(),
            }
            .into());
        }

        let (sum, count) = inputs[1..]
            .iter()
            .flat_map(|v| v.as_slice())
            .fold((0.0f32, 0usize), |(s, n), x| (s + x, n + 1));
        let drive = if count > 0 { sum / count as f32 } else { 0.0 };

        let mut params = Vec::with_capacity(2 * self.state_size);
        params.extend(
            state
                .as_slice()
                .iter()
                .map(|s| (self.decay * s + (1.0 - self.decay) * drive).tanh()),
        );
        params.extend(std::iter::repeat(self.noise).take(self.state_size));
        Ok(Vector::from(params))
    }
}

#[async_trait]
impl InferenceModel for SyntheticModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn forward(&self, inputs: &[&Vector]) -> Result<Vector, ModelError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.params(inputs)
    }
}
