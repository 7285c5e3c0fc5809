//! # BeliefPool Experience
//!
//! Turns raw episodes into a continuously refreshed buffer of latent
//! belief-state samples.
//!
//! ## Key Concepts
//!
//! - **Posterior model**: belief over the hidden state given the previous
//!   belief, the last action and a new observation
//! - **Prior model**: belief over the next hidden state from belief and action
//!   alone (optional)
//! - **Ancestral sampling**: each step's state is drawn conditioned on the
//!   previous draw, repeated `sample_size` times per episode
//! - **Ring buffer**: fixed capacity, oldest samples overwritten first
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   StateBeliefAdapter                     │
//! │  add_sequence ──► ExperiencePool (raw episodes)          │
//! │       │                                                  │
//! │       ▼ mpsc                                             │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │ IngestionWorker (single task)                  │      │
//! │  │   BeliefStateSampler ──► InferenceModel(s)     │      │
//! │  │          │             ──► GaussianSampler     │      │
//! │  └──────────┼─────────────────────────────────────┘      │
//! │             ▼ append                                     │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │ CircularExperienceBuffer ◄── get / get_batch   │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod buffer;
pub mod config;
pub mod metrics;
pub mod model;
pub mod sampling;
pub mod source;
pub mod worker;

// Re-export core types
pub use adapter::StateBeliefAdapter;
pub use buffer::CircularExperienceBuffer;
pub use config::ExperienceSettings;
pub use metrics::{IngestMetrics, MetricsSnapshot};
pub use model::{InferenceModel, SyntheticModel};
pub use sampling::{BeliefStateSampler, GaussianSampler, IngestOutcome, SequenceFailure};
pub use source::{ExperiencePool, InMemoryPool};
pub use worker::{FaultReport, IngestionWorker};
