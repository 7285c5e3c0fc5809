//! Belief sampling
//!
//! - GaussianSampler: reparameterized draws from diagonal Gaussians
//! - BeliefStateSampler: ancestral sampling of episodes into the buffer

pub mod belief;
pub mod gaussian;

pub use belief::{BeliefStateSampler, IngestOutcome, SequenceFailure};
pub use gaussian::GaussianSampler;
