//! Gaussian reparameterization sampler
//!
//! Draws `x = eps * stdev + mean` with `eps ~ N(0, I)` from an owned,
//! seedable random source.

use beliefpool_common::{ShapeError, Vector};
use rand::{rngs::StdRng, SeedableRng};

/// Diagonal Gaussian sampler with an explicit random source
#[derive(Debug, Clone)]
pub struct GaussianSampler {
    rng: StdRng,
}

impl GaussianSampler {
    /// Reproducible sampler
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_entropy)
    }

    /// Draw a new vector from `N(mean, diag(stdev^2))`
    pub fn sample(&mut self, mean: &[f32], stdev: &[f32]) -> Result<Vector, ShapeError> {
        let mut out = Vector::zeros(mean.len());
        self.sample_into(&mut out, mean, stdev)?;
        Ok(out)
    }

    /// Draw into `out`, which must already have the length of `mean`
    pub fn sample_into(
        &mut self,
        out: &mut Vector,
        mean: &[f32],
        stdev: &[f32],
    ) -> Result<(), ShapeError> {
        if mean.len() != stdev.len() {
            return Err(ShapeError::LengthMismatch {
                expected: mean.len(),
                actual: stdev.len(),
            });
        }
        out.randn(&mut self.rng);
        out.cmul(stdev)?;
        out.add(mean)
    }

    /// Draw into `out` from a `[mean | stdev]` parameter vector of length
    /// `2 * state_size`
    pub fn sample_params_into(
        &mut self,
        out: &mut Vector,
        params: &Vector,
        state_size: usize,
    ) -> Result<(), ShapeError> {
        if params.len() != 2 * state_size {
            return Err(ShapeError::ParamLength {
                expected: 2 * state_size,
                actual: params.len(),
            });
        }
        let mean = params.narrow(0, state_size)?;
        let stdev = params.narrow(state_size, state_size)?;
        self.sample_into(out, mean, stdev)
    }
}
