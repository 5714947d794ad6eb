//! Randomness used for landmark selection, topology generation and the walk itself.

use crate::coordinates::NodeId;
use crate::error::{LandmarkError, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sampling primitives the core consumes.
///
/// Implementations must be deterministic for a fixed seed so that landmark
/// sets and walk trajectories can be reproduced.
pub trait RandomSource {
    /// Pick `count` distinct elements of `population` uniformly at random.
    ///
    /// Fails with `InvalidConfiguration` if `count > population.len()`.
    fn sample_without_replacement(
        &mut self,
        population: &[NodeId],
        count: usize,
    ) -> Result<Vec<NodeId>>;

    /// Draw an index with probability proportional to `weights[i]`.
    ///
    /// Fails with `DegenerateWeights` unless the weights are finite,
    /// non-negative and sum to a strictly positive value.
    fn weighted_choice(&mut self, weights: &[f64]) -> Result<usize>;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn uniform_index(&mut self, len: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

/// `RandomSource` backed by a seeded `StdRng`
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn sample_without_replacement(
        &mut self,
        population: &[NodeId],
        count: usize,
    ) -> Result<Vec<NodeId>> {
        if count > population.len() {
            return Err(LandmarkError::InvalidConfiguration(format!(
                "cannot sample {} items from a population of {}",
                count,
                population.len()
            )));
        }
        let picked = rand::seq::index::sample(&mut self.rng, population.len(), count);
        Ok(picked.iter().map(|i| population[i].clone()).collect())
    }

    fn weighted_choice(&mut self, weights: &[f64]) -> Result<usize> {
        let total: f64 = weights.iter().sum();
        if weights.is_empty()
            || !total.is_finite()
            || total <= 0.0
            || weights.iter().any(|w| w.is_nan() || *w < 0.0)
        {
            return Err(LandmarkError::DegenerateWeights);
        }
        let dist = WeightedIndex::new(weights).map_err(|_| LandmarkError::DegenerateWeights)?;
        Ok(dist.sample(&mut self.rng))
    }

    fn uniform_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
