//! Vector - fixed-length `f32` array used for states, actions and observations
//!
//! Mutating operations work in place so that long-lived buffers (belief
//! slots, rollout scratch state) are refilled rather than reallocated.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// Dense numeric vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Vector of `len` zeros
    pub fn zeros(len: usize) -> Self {
        Self::filled(len, 0.0)
    }

    /// Vector of `len` copies of `value`
    pub fn filled(len: usize, value: f32) -> Self {
        Self {
            data: vec![value; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Set every element to `value`
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Overwrite every element with an independent standard-normal draw
    pub fn randn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for x in self.data.iter_mut() {
            *x = rng.sample(StandardNormal);
        }
    }

    /// Element-wise `self += other`
    pub fn add(&mut self, other: &[f32]) -> Result<(), ShapeError> {
        self.check_len(other.len())?;
        for (x, y) in self.data.iter_mut().zip(other) {
            *x += y;
        }
        Ok(())
    }

    /// Element-wise `self *= other`
    pub fn cmul(&mut self, other: &[f32]) -> Result<(), ShapeError> {
        self.check_len(other.len())?;
        for (x, y) in self.data.iter_mut().zip(other) {
            *x *= y;
        }
        Ok(())
    }

    /// Borrow `len` elements starting at `start`
    pub fn narrow(&self, start: usize, len: usize) -> Result<&[f32], ShapeError> {
        let end = start.saturating_add(len);
        self.data
            .get(start..end)
            .ok_or(ShapeError::LengthMismatch {
                expected: end,
                actual: self.data.len(),
            })
    }

    /// Replace the contents with `other`, reusing the existing allocation
    pub fn copy_from(&mut self, other: &Vector) {
        self.copy_from_slice(other.as_slice());
    }

    /// Replace the contents with `values`, reusing the existing allocation
    pub fn copy_from_slice(&mut self, values: &[f32]) {
        self.data.clear();
        self.data.extend_from_slice(values);
    }

    fn check_len(&self, actual: usize) -> Result<(), ShapeError> {
        if actual != self.data.len() {
            return Err(ShapeError::LengthMismatch {
                expected: self.data.len(),
                actual,
            });
        }
        Ok(())
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self { data }
    }
}

impl From<&[f32]> for Vector {
    fn from(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl AsRef<[f32]> for Vector {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_zeros_and_fill() {
        let mut v = Vector::zeros(3);
        assert_eq!(v.as_slice(), &[0.0, 0.0, 0.0]);
        v.fill(2.5);
        assert_eq!(v.as_slice(), &[2.5, 2.5, 2.5]);
    }

    #[test]
    fn test_elementwise_ops() {
        let mut v = Vector::from(vec![1.0, 2.0, 3.0]);
        v.cmul(&[2.0, 0.5, -1.0]).unwrap();
        v.add(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(v.as_slice(), &[3.0, 2.0, -2.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let mut v = Vector::zeros(2);
        let err = v.add(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::LengthMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_narrow() {
        let v = Vector::from(vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(v.narrow(2, 2).unwrap(), &[2.0, 3.0]);
        assert!(v.narrow(3, 2).is_err());
    }

    #[test]
    fn test_copy_from_reuses_storage() {
        let mut dst = Vector::zeros(8);
        let cap = dst.data.capacity();
        dst.copy_from(&Vector::from(vec![1.0, 2.0]));
        assert_eq!(dst.as_slice(), &[1.0, 2.0]);
        assert_eq!(dst.data.capacity(), cap);
    }

    #[test]
    fn test_randn_seeded() {
        let mut a = Vector::zeros(16);
        let mut b = Vector::zeros(16);
        a.randn(&mut StdRng::seed_from_u64(7));
        b.randn(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.as_slice().iter().any(|x| *x != 0.0));
    }

    #[test]
    fn test_serde_transparent() {
        let v = Vector::from(vec![1.0, 0.5]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1.0,0.5]");
    }
}
