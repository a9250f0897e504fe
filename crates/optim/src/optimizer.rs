//! Random-search optimizer.
//!
//! Samples distinct points from an evaluator's search space, scores each one
//! and ranks the results. Small spaces are enumerated exhaustively.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    arena::Score,
    error::{OptimError, Result},
    evaluator::Evaluator,
    search_space::SearchSpace,
};

/// Give up looking for an unseen point after this many duplicate draws.
const MAX_RESAMPLES: usize = 100;

/// One evaluated point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub point: Vec<usize>,
    pub description: String,
    pub score: Score,
}

#[derive(Clone, Debug)]
pub struct RandomSearch {
    iterations: usize,
    n_samples: usize,
    seed: u64,
}

impl RandomSearch {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            n_samples: 1,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sample count passed to every evaluation.
    pub fn with_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Evaluate up to `iterations` distinct points.
    ///
    /// Trials are sorted best first: by win rate, then by mean value.
    pub fn run<E: Evaluator + ?Sized>(&self, evaluator: &E) -> Result<Vec<Trial>> {
        let space = evaluator.search_space();
        if space.size() == 0 {
            return Err(OptimError::EmptySearchSpace);
        }

        let points = if space.size() <= self.iterations as u64 {
            all_points(space)
        } else {
            self.sample_points(space)?
        };
        info!(
            evaluator = evaluator.name(),
            points = points.len(),
            space = space.size(),
            "random search started"
        );

        let mut trials = Vec::with_capacity(points.len());
        for (i, point) in points.into_iter().enumerate() {
            let score = evaluator.evaluate(&point, self.n_samples)?;
            let description = evaluator.print_point(&point)?;
            info!(
                trial = i + 1,
                %description,
                mean_value = score.mean_value,
                win_rate = score.win_rate,
                "trial finished"
            );
            trials.push(Trial {
                point,
                description,
                score,
            });
        }

        trials.sort_by(|a, b| {
            b.score
                .win_rate
                .total_cmp(&a.score.win_rate)
                .then(b.score.mean_value.total_cmp(&a.score.mean_value))
        });
        Ok(trials)
    }

    fn sample_points(&self, space: &SearchSpace) -> Result<Vec<Vec<usize>>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut seen = HashSet::new();
        let mut points = Vec::with_capacity(self.iterations);

        while points.len() < self.iterations {
            let mut fresh = None;
            for _ in 0..MAX_RESAMPLES {
                let point = space.sample_point(&mut rng).ok_or(OptimError::EmptySearchSpace)?;
                if seen.insert(point.clone()) {
                    fresh = Some(point);
                    break;
                }
            }
            match fresh {
                Some(point) => points.push(point),
                None => {
                    debug!(sampled = points.len(), "no unseen point found, stopping early");
                    break;
                }
            }
        }
        Ok(points)
    }
}

/// Every point of `space` in lexicographic order.
fn all_points(space: &SearchSpace) -> Vec<Vec<usize>> {
    let dims = space.dims();
    let mut points = Vec::with_capacity(usize::try_from(space.size()).unwrap_or(0));
    let mut point = vec![0; dims.len()];
    loop {
        points.push(point.clone());

        // Odometer increment from the last dimension
        let mut d = dims.len();
        loop {
            if d == 0 {
                return points;
            }
            d -= 1;
            point[d] += 1;
            if point[d] < dims[d] {
                break;
            }
            point[d] = 0;
        }
    }
}
