//! Core data types for BeliefPool

pub mod sample;
pub mod transition;
pub mod vector;
