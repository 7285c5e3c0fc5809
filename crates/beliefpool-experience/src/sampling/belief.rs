//! Belief state sampler
//!
//! Turns one raw episode into belief samples by ancestral sampling of the
//! latent state chain. Each of the `sample_size` rollouts starts from a zero
//! state and zero action, then for every step:
//!
//! ```text
//! params   = posterior(state, action, observation)
//! belief  ~ N(params)
//! action   = step action
//! next    ~ N(prior(belief, action))                      with a prior
//! next    ~ N(posterior(belief, action, next observation)) without one
//! state    = next (non-terminal) | belief (terminal)
//! ```
//!
//! and appends `(belief, next, target, reward, terminal)` to the buffer.

use std::sync::Arc;

use beliefpool_common::{BeliefPoolError, BeliefSample, RawSequence, ShapeError, Vector};
use tracing::trace;
use uuid::Uuid;

use super::gaussian::GaussianSampler;
use crate::buffer::CircularExperienceBuffer;
use crate::model::InferenceModel;

/// Result of a fully processed sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub sequence_id: Uuid,
    pub rollouts: usize,
    pub samples_appended: usize,
}

/// A sequence whose processing was aborted
///
/// Samples appended before the failure stay in the buffer.
#[derive(Debug)]
pub struct SequenceFailure {
    pub sequence_id: Uuid,
    pub samples_appended: usize,
    pub error: BeliefPoolError,
}

/// Ancestral sampler over posterior/prior inference models
pub struct BeliefStateSampler {
    state_size: usize,
    sample_size: usize,
    action_len: usize,
    posterior: Arc<dyn InferenceModel>,
    prior: Option<Arc<dyn InferenceModel>>,
    gaussian: GaussianSampler,
}

impl BeliefStateSampler {
    pub fn new(
        state_size: usize,
        sample_size: usize,
        action_dims: &[usize],
        posterior: Arc<dyn InferenceModel>,
        prior: Option<Arc<dyn InferenceModel>>,
        gaussian: GaussianSampler,
    ) -> Result<Self, ShapeError> {
        if action_dims.is_empty() || action_dims.contains(&0) {
            return Err(ShapeError::EmptyDims(action_dims.to_vec()));
        }
        if state_size == 0 {
            return Err(ShapeError::EmptyDims(vec![state_size]));
        }
        Ok(Self {
            state_size,
            sample_size,
            action_len: action_dims.iter().product(),
            posterior,
            prior,
            gaussian,
        })
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn has_prior(&self) -> bool {
        self.prior.is_some()
    }

    pub fn posterior(&self) -> &Arc<dyn InferenceModel> {
        &self.posterior
    }

    pub fn prior(&self) -> Option<&Arc<dyn InferenceModel>> {
        self.prior.as_ref()
    }

    /// Sample `sample_size` rollouts of `sequence` into `buffer`
    pub async fn process(
        &mut self,
        sequence_id: Uuid,
        sequence: &RawSequence,
        buffer: &CircularExperienceBuffer,
    ) -> Result<IngestOutcome, SequenceFailure> {
        let mut appended = 0;

        if let Err(e) = self.validate(sequence) {
            return Err(SequenceFailure {
                sequence_id,
                samples_appended: 0,
                error: e.into(),
            });
        }

        for rollout in 0..self.sample_size {
            if let Err(error) = self.rollout(sequence, buffer, &mut appended).await {
                return Err(SequenceFailure {
                    sequence_id,
                    samples_appended: appended,
                    error,
                });
            }
            trace!(%sequence_id, rollout, "Rollout complete");
        }

        Ok(IngestOutcome {
            sequence_id,
            rollouts: self.sample_size,
            samples_appended: appended,
        })
    }

    /// Check action shapes and look-ahead before any model call
    fn validate(&self, sequence: &RawSequence) -> Result<(), ShapeError> {
        for step in sequence.steps() {
            let t = step.transition;
            if t.action.len() != self.action_len {
                return Err(ShapeError::ActionLength {
                    step: step.index,
                    expected: self.action_len,
                    actual: t.action.len(),
                });
            }
            if self.prior.is_none() && !t.terminal && step.next_observation.is_none() {
                return Err(ShapeError::MissingNextObservation { step: step.index });
            }
        }
        Ok(())
    }

    async fn rollout(
        &mut self,
        sequence: &RawSequence,
        buffer: &CircularExperienceBuffer,
        appended: &mut usize,
    ) -> Result<(), BeliefPoolError> {
        let mut state = Vector::zeros(self.state_size);
        let mut action = Vector::zeros(self.action_len);
        let mut belief = Vector::zeros(self.state_size);

        for step in sequence.steps() {
            let t = step.transition;

            let params = self
                .posterior
                .forward(&[&state, &action, &t.observation])
                .await?;
            self.gaussian
                .sample_params_into(&mut belief, &params, self.state_size)?;

            action.copy_from(&t.action);

            let sample = if t.terminal {
                state.copy_from(&belief);
                BeliefSample::terminal(belief.clone(), t.target.clone(), t.reward)
            } else {
                let params = match &self.prior {
                    Some(prior) => prior.forward(&[&belief, &action]).await?,
                    None => {
                        let next_observation = step
                            .next_observation
                            .ok_or(ShapeError::MissingNextObservation { step: step.index })?;
                        self.posterior
                            .forward(&[&belief, &action, next_observation])
                            .await?
                    }
                };
                self.gaussian
                    .sample_params_into(&mut state, &params, self.state_size)?;
                BeliefSample::transition(belief.clone(), state.clone(), t.target.clone(), t.reward)?
            };

            buffer.append(&sample);
            *appended += 1;
        }

        Ok(())
    }
}
