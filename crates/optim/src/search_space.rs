//! Discrete hyperparameter search space.
//!
//! A space is an ordered list of dimension sizes. A point picks one index per
//! dimension; translating indices into concrete values is up to the evaluator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{OptimError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpace {
    dims: Vec<usize>,
}

impl SearchSpace {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// Number of distinct points, the product of all dimension sizes.
    ///
    /// Saturates at `u64::MAX` for spaces too large to count.
    pub fn size(&self) -> u64 {
        self.dims
            .iter()
            .fold(1u64, |acc, &size| acc.saturating_mul(size as u64))
    }

    /// Check that `point` has one in-range index per dimension.
    pub fn validate(&self, point: &[usize]) -> Result<()> {
        if point.len() != self.dims.len() {
            return Err(OptimError::DimensionMismatch {
                expected: self.dims.len(),
                actual: point.len(),
            });
        }
        for (dimension, (&value, &size)) in point.iter().zip(&self.dims).enumerate() {
            if value >= size {
                return Err(OptimError::PointOutOfRange { dimension, value, size });
            }
        }
        Ok(())
    }

    /// Draw a point uniformly at random.
    ///
    /// Returns `None` when some dimension is empty.
    pub fn sample_point<R: Rng>(&self, rng: &mut R) -> Option<Vec<usize>> {
        self.dims
            .iter()
            .map(|&size| (size > 0).then(|| rng.gen_range(0..size)))
            .collect()
    }
}
