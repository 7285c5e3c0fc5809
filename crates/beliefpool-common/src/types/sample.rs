//! Belief samples - the unit stored in the experience buffer
//!
//! A belief sample pairs a sampled latent state with the target, reward and
//! terminal flag of the raw transition it was inferred from. Non-terminal
//! samples also carry the sampled successor state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::vector::Vector;
use crate::error::ShapeError;

/// Sampled belief for one transition
///
/// `next_state` storage is kept across overwrites so that refilling a slot
/// does not reallocate, but it is only ever exposed for non-terminal samples.
#[derive(Debug, Clone, Default)]
pub struct BeliefSample {
    state: Vector,
    next_state: Vector,
    target: Vector,
    reward: f32,
    terminal: bool,
}

impl BeliefSample {
    /// Sample for a non-terminal transition
    pub fn transition(
        state: Vector,
        next_state: Vector,
        target: Vector,
        reward: f32,
    ) -> Result<Self, ShapeError> {
        if state.len() != next_state.len() {
            return Err(ShapeError::LengthMismatch {
                expected: state.len(),
                actual: next_state.len(),
            });
        }
        Ok(Self {
            state,
            next_state,
            target,
            reward,
            terminal: false,
        })
    }

    /// Sample for the last transition of an episode
    pub fn terminal(state: Vector, target: Vector, reward: f32) -> Self {
        Self {
            state,
            next_state: Vector::default(),
            target,
            reward,
            terminal: true,
        }
    }

    pub fn state(&self) -> &Vector {
        &self.state
    }

    /// Successor belief, absent for terminal samples
    pub fn next_state(&self) -> Option<&Vector> {
        (!self.terminal).then_some(&self.next_state)
    }

    pub fn target(&self) -> &Vector {
        &self.target
    }

    pub fn reward(&self) -> f32 {
        self.reward
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Overwrite this sample with `other`, reusing vector storage
    pub fn copy_from(&mut self, other: &BeliefSample) {
        self.state.copy_from(&other.state);
        self.target.copy_from(&other.target);
        self.reward = other.reward;
        self.terminal = other.terminal;
        if !other.terminal {
            self.next_state.copy_from(&other.next_state);
        }
    }

    /// Plain `(input, target)` view for generic dataset consumers
    pub fn to_dataset_sample(&self) -> DatasetSample {
        DatasetSample {
            input: self.state.clone(),
            target: self.target.clone(),
        }
    }
}

impl PartialEq for BeliefSample {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.target == other.target
            && self.reward == other.reward
            && self.terminal == other.terminal
            && self.next_state() == other.next_state()
    }
}

/// Input/target pair as seen by a generic training loop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSample {
    pub input: Vector,
    pub target: Vector,
}

/// Reusable batch of belief samples
#[derive(Debug, Clone, Default)]
pub struct BeliefBatch {
    samples: Vec<BeliefSample>,
    state_size: usize,
}

impl BeliefBatch {
    /// Create a batch with `size` empty slots
    pub fn new(size: usize, state_size: usize) -> Self {
        Self {
            samples: vec![BeliefSample::default(); size],
            state_size,
        }
    }

    /// Grow or shrink to exactly `size` slots, keeping existing storage
    pub fn resize(&mut self, size: usize) {
        self.samples.resize_with(size, BeliefSample::default);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn samples(&self) -> &[BeliefSample] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [BeliefSample] {
        &mut self.samples
    }

    pub fn get(&self, i: usize) -> Option<&BeliefSample> {
        self.samples.get(i)
    }
}

/// Published metadata of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    pub input_dims: Vec<usize>,
    pub input_type: String,
    pub target_dims: Vec<usize>,
    pub target_type: String,
    pub size: usize,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, String>,
}
