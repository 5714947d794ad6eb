//! Observed distance between two nodes, derived from coordinates only.
//!
//! For every landmark `ld`, the triangle inequality gives
//! `|d(ld,x) - d(ld,y)| <= d(x,y)`. The maximum over all landmarks is the
//! tightest lower bound available without knowing any path, and it is the
//! only distance signal the router is allowed to use.

use crate::coordinates::{Coordinate, NodeId};
use crate::error::Result;
use crate::landmark_index::LandmarkCoordinateIndex;

/// Pure function of a constructed [`LandmarkCoordinateIndex`]
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMetric<'a> {
    index: &'a LandmarkCoordinateIndex,
}

impl<'a> CoordinateMetric<'a> {
    pub fn new(index: &'a LandmarkCoordinateIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a LandmarkCoordinateIndex {
        self.index
    }

    /// `|d(ld,x) - d(ld,y)|` for every landmark, in landmark order.
    pub fn per_landmark_differences(&self, x: &NodeId, y: &NodeId) -> Result<Vec<u32>> {
        let cx = self.index.coordinate_slice(x)?;
        let cy = self.index.coordinate_slice(y)?;
        Ok(cx.iter().zip(cy).map(|(&a, &b)| a.abs_diff(b)).collect())
    }

    /// Maximum per-landmark difference. Never exceeds the true distance.
    pub fn observed_distance(&self, x: &NodeId, y: &NodeId) -> Result<u32> {
        let cx = self.index.coordinate_slice(x)?;
        let cy = self.index.coordinate_slice(y)?;
        Ok(max_difference(cx, cy))
    }

    /// Observed distance between two raw coordinates.
    pub fn observed_distance_coords(a: &Coordinate, b: &Coordinate) -> u32 {
        a.max_difference(b)
    }
}

pub(crate) fn max_difference(a: &[u32], b: &[u32]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}
