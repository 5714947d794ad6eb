//! Biased random-walk routing
//!
//! The walker only ever looks at the coordinates of the node it stands on,
//! of that node's neighbours, and of the destination. At each step every
//! neighbour gets weight `base ^ (cur - new)`, where `cur` is the observed
//! distance from the current node to the destination and `new` the one from
//! the neighbour. Neighbours that look closer are exponentially preferred;
//! `base = 1` degrades to an unbiased walk.
//!
//! The walk stops only when it lands on the destination. There is no hop
//! ceiling in [`RandomWalkRouter::route`]; callers that need one use
//! [`RandomWalkRouter::route_with_ceiling`].

use crate::coordinates::NodeId;
use crate::error::{LandmarkError, Result};
use crate::landmark_index::LandmarkCoordinateIndex;
use crate::metric::{max_difference, CoordinateMetric};
use crate::random_source::RandomSource;
use crate::statistics::VisitationCounter;
use crate::telemetry::WalkTrace;
use crate::topology::TopologyProvider;

/// Default walk bias
pub const DEFAULT_BASE: f64 = 150.0;

/// State of a single walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Walking,
    Arrived,
}

/// Unnormalised weight `base ^ (cur_dist - new_dist)` for every candidate.
pub fn step_weights(cur_dist: u32, candidate_dists: &[u32], base: f64) -> Vec<f64> {
    candidate_dists
        .iter()
        .map(|&new_dist| {
            let exponent = (cur_dist as i64 - new_dist as i64)
                .clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            base.powi(exponent)
        })
        .collect()
}

/// Probability of moving to each candidate neighbour.
///
/// When a weight or the weight sum overflows, the weights are recomputed
/// relative to the largest one in log space, so the closest candidates keep
/// their exact ratios. Fails with `DegenerateWeights` when the weight sum is
/// not strictly positive (every weight underflowed).
pub fn step_distribution(cur_dist: u32, candidate_dists: &[u32], base: f64) -> Result<Vec<f64>> {
    let mut weights = step_weights(cur_dist, candidate_dists, base);
    let mut total: f64 = weights.iter().sum();

    if total.is_infinite() {
        weights = rescaled_weights(cur_dist, candidate_dists, base);
        total = weights.iter().sum();
    }

    if total.is_nan() || total <= 0.0 {
        return Err(LandmarkError::DegenerateWeights);
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// `base ^ (e - e_top)` for every candidate, where `e_top` is the exponent of
/// the heaviest candidate. The heaviest weight is exactly 1.
fn rescaled_weights(cur_dist: u32, candidate_dists: &[u32], base: f64) -> Vec<f64> {
    let ln_base = base.ln();
    let logs: Vec<f64> = candidate_dists
        .iter()
        .map(|&new_dist| (cur_dist as f64 - new_dist as f64) * ln_base)
        .collect();
    let top = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    logs.iter().map(|l| (l - top).exp()).collect()
}

fn validate_base(base: f64) -> Result<()> {
    if base.is_finite() && base > 0.0 {
        Ok(())
    } else {
        Err(LandmarkError::InvalidConfiguration(format!(
            "walk base must be finite and positive, got {}",
            base
        )))
    }
}

/// Random-walk router over a topology addressed by landmark coordinates
pub struct RandomWalkRouter<'a, T: TopologyProvider + ?Sized> {
    metric: CoordinateMetric<'a>,
    topology: &'a T,
}

impl<'a, T: TopologyProvider + ?Sized> RandomWalkRouter<'a, T> {
    pub fn new(index: &'a LandmarkCoordinateIndex, topology: &'a T) -> Self {
        Self {
            metric: CoordinateMetric::new(index),
            topology,
        }
    }

    pub fn topology(&self) -> &'a T {
        self.topology
    }

    pub fn index(&self) -> &'a LandmarkCoordinateIndex {
        self.metric.index()
    }

    pub fn metric(&self) -> CoordinateMetric<'a> {
        self.metric
    }

    /// Walk from `src` to `dst` and return the number of hops.
    ///
    /// Every node landed on, the source included, is counted in `visits`.
    pub fn route<R: RandomSource + ?Sized>(
        &self,
        src: &NodeId,
        dst: &NodeId,
        visits: &mut VisitationCounter,
        base: f64,
        random: &mut R,
    ) -> Result<u32> {
        self.walk(src, dst, visits, base, random, None, None)
    }

    /// Like [`route`](Self::route), but gives up with `HopLimitExceeded`
    /// after `max_hops` moves.
    pub fn route_with_ceiling<R: RandomSource + ?Sized>(
        &self,
        src: &NodeId,
        dst: &NodeId,
        visits: &mut VisitationCounter,
        base: f64,
        max_hops: u32,
        random: &mut R,
    ) -> Result<u32> {
        self.walk(src, dst, visits, base, random, Some(max_hops), None)
    }

    /// Like [`route`](Self::route), and also return the path taken.
    pub fn route_traced<R: RandomSource + ?Sized>(
        &self,
        src: &NodeId,
        dst: &NodeId,
        visits: &mut VisitationCounter,
        base: f64,
        random: &mut R,
    ) -> Result<WalkTrace> {
        let mut trace = WalkTrace::new(src.clone(), dst.clone());
        self.walk(src, dst, visits, base, random, None, Some(&mut trace))?;
        Ok(trace)
    }

    fn check_node(&self, node: &NodeId) -> Result<()> {
        if self.topology.contains(node) && self.metric.index().contains(node) {
            Ok(())
        } else {
            Err(LandmarkError::UnknownNode(node.clone()))
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn walk<R: RandomSource + ?Sized>(
        &self,
        src: &NodeId,
        dst: &NodeId,
        visits: &mut VisitationCounter,
        base: f64,
        random: &mut R,
        max_hops: Option<u32>,
        mut trace: Option<&mut WalkTrace>,
    ) -> Result<u32> {
        validate_base(base)?;
        self.check_node(src)?;
        self.check_node(dst)?;

        let index = self.metric.index();
        let target = index.coordinate_slice(dst)?;

        let mut current = src.clone();
        let mut cur_dist = max_difference(index.coordinate_slice(src)?, target);
        let mut hops = 0u32;
        let mut state = if current == *dst {
            WalkState::Arrived
        } else {
            WalkState::Walking
        };

        visits.record(&current);
        if let Some(t) = trace.as_deref_mut() {
            t.record(current.clone(), cur_dist);
        }

        while state == WalkState::Walking {
            if let Some(limit) = max_hops {
                if hops >= limit {
                    return Err(LandmarkError::HopLimitExceeded { max_hops: limit });
                }
            }

            let neighbors = self.topology.neighbors(&current);
            if neighbors.is_empty() {
                return Err(LandmarkError::IsolatedNode(current));
            }

            let candidate_dists = neighbors
                .iter()
                .map(|nei| {
                    index
                        .coordinate_slice(nei)
                        .map(|coord| max_difference(coord, target))
                })
                .collect::<Result<Vec<u32>>>()?;

            let drawn = step_distribution(cur_dist, &candidate_dists, base)
                .and_then(|probs| random.weighted_choice(&probs));
            let choice = match drawn {
                Ok(choice) => choice,
                Err(LandmarkError::DegenerateWeights) => {
                    tracing::warn!(
                        node = %current,
                        base,
                        "walk weights underflowed, choosing a neighbour uniformly"
                    );
                    if let Some(t) = trace.as_deref_mut() {
                        t.uniform_fallbacks += 1;
                    }
                    random.uniform_index(neighbors.len())
                }
                Err(e) => return Err(e),
            };

            current = neighbors[choice].clone();
            cur_dist = candidate_dists[choice];
            hops += 1;

            visits.record(&current);
            if let Some(t) = trace.as_deref_mut() {
                t.record(current.clone(), cur_dist);
            }

            if current == *dst {
                state = WalkState::Arrived;
            }
        }

        tracing::trace!(%src, %dst, hops, "walk arrived");
        Ok(hops)
    }
}
