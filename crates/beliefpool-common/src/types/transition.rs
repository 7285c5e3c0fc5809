//! Raw transitions and episode sequences produced by the base replay source
//!
//! A [`RawSequence`] is immutable once built. Belief sampling walks it
//! through [`RawSequence::steps`], which pairs each transition with the
//! observation that follows it.

use serde::{Deserialize, Serialize};

use super::vector::Vector;

/// One observed state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransition {
    /// Observation the agent received at this step
    pub observation: Vector,
    /// Action taken after receiving the observation
    pub action: Vector,
    /// Task-specific label or return
    pub target: Vector,
    /// Reward for taking `action`
    pub reward: f32,
    /// Whether the episode ended after this step
    pub terminal: bool,
}

impl RawTransition {
    pub fn new(observation: Vector, action: Vector, target: Vector, reward: f32) -> Self {
        Self {
            observation,
            action,
            target,
            reward,
            terminal: false,
        }
    }

    /// Mark this transition as the last one of its episode
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Ordered, finite episode of transitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSequence {
    transitions: Vec<RawTransition>,
    /// Observation reached after the last transition, for episodes cut short
    /// without a terminal flag
    final_observation: Option<Vector>,
}

/// A transition together with its position and successor observation
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub index: usize,
    pub transition: &'a RawTransition,
    pub next_observation: Option<&'a Vector>,
}

impl RawSequence {
    pub fn new(transitions: Vec<RawTransition>) -> Self {
        Self {
            transitions,
            final_observation: None,
        }
    }

    /// Attach the observation that follows the last transition
    pub fn with_final_observation(mut self, observation: Vector) -> Self {
        self.final_observation = Some(observation);
        self
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn transitions(&self) -> &[RawTransition] {
        &self.transitions
    }

    pub fn final_observation(&self) -> Option<&Vector> {
        self.final_observation.as_ref()
    }

    /// Iterate transitions in order with one step of look-ahead
    pub fn steps(&self) -> impl Iterator<Item = Step<'_>> + '_ {
        self.transitions
            .iter()
            .enumerate()
            .map(move |(index, transition)| Step {
                index,
                transition,
                next_observation: self
                    .transitions
                    .get(index + 1)
                    .map(|next| &next.observation)
                    .or(self.final_observation.as_ref()),
            })
    }
}

impl FromIterator<RawTransition> for RawSequence {
    fn from_iter<I: IntoIterator<Item = RawTransition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
