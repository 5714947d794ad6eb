//! Landmark coordinate index
//!
//! Picks `k` landmarks uniformly at random, asks the distance oracle for the
//! distance from every landmark to every node, and serves per-node
//! coordinates out of the resulting table. The table is computed exactly
//! once; a live router must never see distances change underneath it.

use crate::coordinates::{Coordinate, NodeId};
use crate::error::{LandmarkError, Result};
use crate::oracle::DistanceOracle;
use crate::random_source::RandomSource;
use crate::topology::TopologyProvider;
use std::collections::HashMap;

/// Landmark count used when none is configured: `(log2 n)^2`, capped at `n - 1`.
pub fn suggested_landmark_count(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let log = (n as f64).log2().ceil().max(1.0) as usize;
    (log * log).min(n - 1)
}

/// `(landmark, node) -> distance` for every landmark and every indexed node
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    landmarks: Vec<NodeId>,
    positions: HashMap<NodeId, usize>,
    rows: HashMap<NodeId, Vec<u32>>,
}

impl DistanceTable {
    /// Distance between `landmark` and `node`, if both are indexed.
    pub fn get(&self, landmark: &NodeId, node: &NodeId) -> Option<u32> {
        let slot = *self.positions.get(landmark)?;
        self.rows.get(node).map(|row| row[slot])
    }

    /// All distances of `node`, in landmark order.
    pub fn row(&self, node: &NodeId) -> Option<&[u32]> {
        self.rows.get(node).map(|row| row.as_slice())
    }

    /// Number of `(landmark, node)` entries.
    pub fn len(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn landmarks(&self) -> &[NodeId] {
        &self.landmarks
    }

    /// Position of `landmark` inside every coordinate.
    pub fn slot_of(&self, landmark: &NodeId) -> Option<usize> {
        self.positions.get(landmark).copied()
    }

    pub fn node_count(&self) -> usize {
        self.rows.len()
    }
}

/// Landmark set plus distance table, built once
#[derive(Debug, Clone, Default)]
pub struct LandmarkCoordinateIndex {
    table: Option<DistanceTable>,
}

impl LandmarkCoordinateIndex {
    /// Unconstructed index; every lookup fails until [`construct`](Self::construct) succeeds.
    pub fn new() -> Self {
        Self { table: None }
    }

    /// `new()` followed by `construct()`.
    pub fn build<T, O, R>(topology: &T, oracle: &O, k: usize, random: &mut R) -> Result<Self>
    where
        T: TopologyProvider + ?Sized,
        O: DistanceOracle + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut index = Self::new();
        index.construct(topology, oracle, k, random)?;
        Ok(index)
    }

    /// Select `k` landmarks and populate the distance table.
    ///
    /// Fails with `AlreadyInitialized` on a second call, with
    /// `InvalidConfiguration` unless `0 < k < node_count`, and with
    /// `Unreachable` if some node cannot be reached from a landmark. On
    /// failure the index stays unconstructed.
    pub fn construct<T, O, R>(
        &mut self,
        topology: &T,
        oracle: &O,
        k: usize,
        random: &mut R,
    ) -> Result<()>
    where
        T: TopologyProvider + ?Sized,
        O: DistanceOracle + ?Sized,
        R: RandomSource + ?Sized,
    {
        if self.table.is_some() {
            return Err(LandmarkError::AlreadyInitialized);
        }

        let n = topology.node_count();
        if k == 0 || k >= n {
            return Err(LandmarkError::InvalidConfiguration(format!(
                "landmark count must satisfy 0 < k < {}, got {}",
                n, k
            )));
        }

        let landmarks = random.sample_without_replacement(topology.nodes(), k)?;

        let mut rows: HashMap<NodeId, Vec<u32>> = topology
            .nodes()
            .iter()
            .map(|node| (node.clone(), vec![0; k]))
            .collect();

        for (slot, landmark) in landmarks.iter().enumerate() {
            let lengths = oracle.shortest_path_lengths_from(landmark)?;
            for node in topology.nodes() {
                let dist = lengths
                    .get(node)
                    .copied()
                    .ok_or_else(|| LandmarkError::Unreachable {
                        from: landmark.clone(),
                        to: node.clone(),
                    })?;
                if let Some(row) = rows.get_mut(node) {
                    row[slot] = dist;
                }
            }
        }

        let positions = landmarks
            .iter()
            .enumerate()
            .map(|(slot, ld)| (ld.clone(), slot))
            .collect();

        let table = DistanceTable {
            landmarks,
            positions,
            rows,
        };
        tracing::debug!(
            landmarks = ?table.landmarks,
            entries = table.len(),
            "landmark distance table built"
        );
        self.table = Some(table);
        Ok(())
    }

    pub fn is_constructed(&self) -> bool {
        self.table.is_some()
    }

    /// Landmarks in coordinate order; empty before construction.
    pub fn landmarks(&self) -> &[NodeId] {
        self.table.as_ref().map(|t| t.landmarks()).unwrap_or(&[])
    }

    /// Number of landmarks, `k`.
    pub fn k(&self) -> usize {
        self.landmarks().len()
    }

    pub fn node_count(&self) -> usize {
        self.table.as_ref().map(|t| t.node_count()).unwrap_or(0)
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.table
            .as_ref()
            .map(|t| t.rows.contains_key(node))
            .unwrap_or(false)
    }

    pub fn is_landmark(&self, node: &NodeId) -> bool {
        self.table
            .as_ref()
            .map(|t| t.positions.contains_key(node))
            .unwrap_or(false)
    }

    pub fn table(&self) -> Option<&DistanceTable> {
        self.table.as_ref()
    }

    /// Borrow the coordinate components of `node` without allocating.
    pub fn coordinate_slice(&self, node: &NodeId) -> Result<&[u32]> {
        self.table
            .as_ref()
            .and_then(|t| t.row(node))
            .ok_or_else(|| LandmarkError::UnknownNode(node.clone()))
    }

    /// Coordinate of `node`: its distance to each landmark, in landmark order.
    pub fn coordinate_of(&self, node: &NodeId) -> Result<Coordinate> {
        self.coordinate_slice(node)
            .map(|row| Coordinate::new(row.to_vec()))
    }

    /// Distance from `landmark` to `node`.
    pub fn distance(&self, landmark: &NodeId, node: &NodeId) -> Result<u32> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| LandmarkError::UnknownLandmark(landmark.clone()))?;
        let slot = table
            .slot_of(landmark)
            .ok_or_else(|| LandmarkError::UnknownLandmark(landmark.clone()))?;
        table
            .row(node)
            .map(|row| row[slot])
            .ok_or_else(|| LandmarkError::UnknownNode(node.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::BfsOracle;
    use crate::random_source::SeededRandom;
    use crate::topology::{grid_id, Topology, TopologyProvider};

    fn grid_index(k: usize, seed: u64) -> (Topology, LandmarkCoordinateIndex) {
        let grid = Topology::grid(4, 4, false);
        let index = LandmarkCoordinateIndex::build(
            &grid,
            &BfsOracle::new(&grid),
            k,
            &mut SeededRandom::new(seed),
        )
        .unwrap();
        (grid, index)
    }

    #[test]
    fn test_table_size() {
        let (_, index) = grid_index(2, 1);
        let table = index.table().unwrap();
        assert_eq!(table.len(), 32);
        assert_eq!(table.node_count(), 16);
        assert_eq!(index.k(), 2);
    }

    #[test]
    fn test_landmarks_are_distinct() {
        let (_, index) = grid_index(6, 3);
        let mut landmarks = index.landmarks().to_vec();
        landmarks.sort();
        landmarks.dedup();
        assert_eq!(landmarks.len(), 6);
    }

    #[test]
    fn test_landmark_has_zero_in_own_slot() {
        let (_, index) = grid_index(3, 5);
        for (slot, landmark) in index.landmarks().iter().enumerate() {
            let coord = index.coordinate_of(landmark).unwrap();
            assert_eq!(coord.components()[slot], 0);
            assert_eq!(index.distance(landmark, landmark).unwrap(), 0);
        }
    }

    #[test]
    fn test_coordinate_matches_oracle() {
        let (grid, index) = grid_index(2, 8);
        let oracle = BfsOracle::new(&grid);
        for node in grid.nodes() {
            let coord = index.coordinate_of(node).unwrap();
            assert_eq!(coord.len(), 2);
            for (slot, landmark) in index.landmarks().iter().enumerate() {
                let expected = oracle.shortest_path_length(landmark, node).unwrap();
                assert_eq!(coord.components()[slot], expected);
                assert_eq!(index.distance(landmark, node).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_k_bounds() {
        let grid = Topology::grid(4, 4, false);
        let oracle = BfsOracle::new(&grid);
        let mut random = SeededRandom::new(0);

        assert!(LandmarkCoordinateIndex::build(&grid, &oracle, 15, &mut random).is_ok());
        assert!(matches!(
            LandmarkCoordinateIndex::build(&grid, &oracle, 16, &mut random),
            Err(LandmarkError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            LandmarkCoordinateIndex::build(&grid, &oracle, 0, &mut random),
            Err(LandmarkError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_construct_only_once() {
        let grid = Topology::grid(3, 3, false);
        let oracle = BfsOracle::new(&grid);
        let mut random = SeededRandom::new(2);
        let mut index = LandmarkCoordinateIndex::new();
        assert!(!index.is_constructed());
        index.construct(&grid, &oracle, 2, &mut random).unwrap();
        let before = index.landmarks().to_vec();

        assert!(matches!(
            index.construct(&grid, &oracle, 2, &mut random),
            Err(LandmarkError::AlreadyInitialized)
        ));
        assert_eq!(index.landmarks(), before.as_slice());
    }

    #[test]
    fn test_unknown_lookups() {
        let (grid, index) = grid_index(2, 4);
        let stranger = NodeId::new("9,9");
        assert!(matches!(
            index.coordinate_of(&stranger),
            Err(LandmarkError::UnknownNode(_))
        ));

        let non_landmark = grid
            .nodes()
            .iter()
            .find(|n| !index.is_landmark(n))
            .unwrap()
            .clone();
        assert!(matches!(
            index.distance(&non_landmark, &grid_id(0, 0)),
            Err(LandmarkError::UnknownLandmark(_))
        ));
        let landmark = index.landmarks()[0].clone();
        assert!(matches!(
            index.distance(&landmark, &stranger),
            Err(LandmarkError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_unconstructed_lookups_fail() {
        let index = LandmarkCoordinateIndex::new();
        assert!(index.landmarks().is_empty());
        assert!(matches!(
            index.coordinate_of(&grid_id(0, 0)),
            Err(LandmarkError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_disconnected_topology_aborts() {
        let mut topology = Topology::cycle(5);
        topology.add_node(NodeId::new("island"));
        let oracle = BfsOracle::new(&topology);
        let mut index = LandmarkCoordinateIndex::new();
        let result = index.construct(&topology, &oracle, 2, &mut SeededRandom::new(1));
        assert!(matches!(result, Err(LandmarkError::Unreachable { .. })));
        assert!(!index.is_constructed());
    }

    #[test]
    fn test_seeded_construction_is_repeatable() {
        let (_, a) = grid_index(3, 77);
        let (grid, b) = grid_index(3, 77);
        assert_eq!(a.landmarks(), b.landmarks());
        for node in grid.nodes() {
            assert_eq!(a.coordinate_of(node).unwrap(), b.coordinate_of(node).unwrap());
        }
    }

    #[test]
    fn test_suggested_landmark_count() {
        assert_eq!(suggested_landmark_count(1), 0);
        assert_eq!(suggested_landmark_count(2), 1);
        assert_eq!(suggested_landmark_count(16), 15);
        assert_eq!(suggested_landmark_count(1 << 10), 100);
    }
}
