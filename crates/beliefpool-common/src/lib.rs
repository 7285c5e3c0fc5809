//! # BeliefPool Common
//!
//! Shared types and errors for the BeliefPool experience pipeline.
//!
//! ## Core Types
//!
//! - [`Vector`]: fixed-length `f32` array with in-place arithmetic
//! - [`RawTransition`]/[`RawSequence`]: observed episodes from the base source
//! - [`BeliefSample`]: sampled latent state stored in the experience buffer
//! - [`BeliefBatch`]/[`DatasetSample`]/[`DatasetDescriptor`]: consumer views
//!
//! ## Errors
//!
//! - [`BeliefPoolError`]: unified error with [`ShapeError`] and [`ModelError`]

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{BeliefPoolError, FaultKind, ModelError, Result, ShapeError};
pub use types::{
    sample::{BeliefBatch, BeliefSample, DatasetDescriptor, DatasetSample},
    transition::{RawSequence, RawTransition, Step},
    vector::Vector,
};

/// BeliefPool version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default experience buffer capacity
pub const DEFAULT_MAX_SIZE: usize = 100_000;

/// Default number of rollouts sampled per incoming sequence
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Input type reported for belief-state datasets
pub const STATE_INPUT_TYPE: &str = "state";
