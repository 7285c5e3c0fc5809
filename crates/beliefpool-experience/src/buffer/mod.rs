//! Experience buffer module

pub mod ring;

pub use ring::CircularExperienceBuffer;
