//! Network topologies
//!
//! The router and the coordinate index only see a [`TopologyProvider`]. The
//! [`Topology`] adjacency list and its generators cover the graph families
//! used in the experiments: plain and periodic grids, grids with random
//! long-range links, G(n, p) random graphs and rings.

use crate::coordinates::NodeId;
use crate::error::Result;
use crate::oracle::{BfsOracle, DistanceOracle};
use crate::random_source::RandomSource;
use std::collections::HashMap;

/// Largest exponent accepted by the `2^exponent` sized generators
pub const MAX_SIZE_EXPONENT: u32 = 30;

/// Read-only view of a graph's node set and adjacency.
pub trait TopologyProvider {
    /// All nodes, in a stable order.
    fn nodes(&self) -> &[NodeId];

    /// Neighbours of `node`; empty for unknown or isolated nodes.
    fn neighbors(&self, node: &NodeId) -> &[NodeId];

    fn contains(&self, node: &NodeId) -> bool;

    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    fn has_edge(&self, a: &NodeId, b: &NodeId) -> bool {
        self.neighbors(a).contains(b)
    }
}

/// Undirected simple graph stored as adjacency lists
#[derive(Debug, Clone, Default)]
pub struct Topology {
    order: Vec<NodeId>,
    adjacency: HashMap<NodeId, Vec<NodeId>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an edge list. Endpoints are added as nodes in order of
    /// first appearance.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut topology = Self::new();
        for (a, b) in edges {
            topology.add_node(a.clone());
            topology.add_node(b.clone());
            topology.add_edge(&a, &b);
        }
        topology
    }

    /// Add a node; no-op if it already exists.
    pub fn add_node(&mut self, node: NodeId) {
        if !self.adjacency.contains_key(&node) {
            self.adjacency.insert(node.clone(), Vec::new());
            self.order.push(node);
        }
    }

    /// Add an undirected edge between two existing nodes.
    ///
    /// Self loops, duplicate edges and unknown endpoints are ignored.
    /// Returns true if a new edge was inserted.
    pub fn add_edge(&mut self, a: &NodeId, b: &NodeId) -> bool {
        if a == b || !self.adjacency.contains_key(a) || !self.adjacency.contains_key(b) {
            return false;
        }
        if self.has_edge(a, b) {
            return false;
        }
        if let Some(neighbors) = self.adjacency.get_mut(a) {
            neighbors.push(b.clone());
        }
        if let Some(neighbors) = self.adjacency.get_mut(b) {
            neighbors.push(a.clone());
        }
        true
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    pub fn degree(&self, node: &NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// True if every node is reachable from the first one.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.order.first() else {
            return true;
        };
        BfsOracle::new(self)
            .shortest_path_lengths_from(first)
            .map(|lengths| lengths.len() == self.order.len())
            .unwrap_or(false)
    }

    /// 4-connected `rows x cols` grid with nodes named `"r,c"`.
    ///
    /// With `periodic` the borders wrap around (a torus).
    pub fn grid(rows: usize, cols: usize, periodic: bool) -> Self {
        let mut topology = Self::new();
        for r in 0..rows {
            for c in 0..cols {
                topology.add_node(grid_id(r, c));
            }
        }
        for r in 0..rows {
            for c in 0..cols {
                let here = grid_id(r, c);
                if c + 1 < cols {
                    topology.add_edge(&here, &grid_id(r, c + 1));
                } else if periodic {
                    topology.add_edge(&here, &grid_id(r, 0));
                }
                if r + 1 < rows {
                    topology.add_edge(&here, &grid_id(r + 1, c));
                } else if periodic {
                    topology.add_edge(&here, &grid_id(0, c));
                }
            }
        }
        topology
    }

    /// Square grid with about `2^exponent` nodes.
    ///
    /// `exponent` must not exceed [`MAX_SIZE_EXPONENT`].
    pub fn sized_grid(exponent: u32) -> Self {
        let n = 1usize << exponent;
        let side = (n as f64).sqrt() as usize;
        Self::grid(side, side, false)
    }

    /// Periodic grid where every node is also linked to `extra` random nodes.
    ///
    /// A sampled node equal to the node itself is skipped, so a node may end
    /// up with fewer than `extra` new links.
    pub fn geo_grid<R: RandomSource + ?Sized>(
        rows: usize,
        cols: usize,
        extra: usize,
        random: &mut R,
    ) -> Result<Self> {
        let mut topology = Self::grid(rows, cols, true);
        let nodes = topology.order.clone();
        let count = extra.min(nodes.len());
        for node in &nodes {
            for other in random.sample_without_replacement(&nodes, count)? {
                topology.add_edge(node, &other);
            }
        }
        Ok(topology)
    }

    /// Erdős–Rényi G(n, p): every pair is linked independently with probability `p`.
    pub fn gnp<R: RandomSource + ?Sized>(n: usize, p: f64, random: &mut R) -> Self {
        let mut topology = Self::numbered(n);
        for i in 0..n {
            for j in (i + 1)..n {
                if random.unit() < p {
                    let (a, b) = (topology.order[i].clone(), topology.order[j].clone());
                    topology.add_edge(&a, &b);
                }
            }
        }
        topology
    }

    /// G(n, p) with `n = 2^exponent` and `p = 2 * exponent / n`.
    ///
    /// `exponent` must not exceed [`MAX_SIZE_EXPONENT`].
    pub fn sized_gnp<R: RandomSource + ?Sized>(exponent: u32, random: &mut R) -> Self {
        let n = 1usize << exponent;
        let p = 2.0 * exponent as f64 / n as f64;
        Self::gnp(n, p, random)
    }

    /// Every node proposes `degree` uniformly random links.
    pub fn random_links<R: RandomSource + ?Sized>(n: usize, degree: usize, random: &mut R) -> Self {
        let mut topology = Self::numbered(n);
        if n == 0 {
            return topology;
        }
        for v in 0..n {
            for _ in 0..degree {
                let u = random.uniform_index(n);
                let (a, b) = (topology.order[v].clone(), topology.order[u].clone());
                topology.add_edge(&a, &b);
            }
        }
        topology
    }

    /// Ring of `n` nodes.
    pub fn cycle(n: usize) -> Self {
        let mut topology = Self::numbered(n);
        for i in 0..n {
            let (a, b) = (topology.order[i].clone(), topology.order[(i + 1) % n].clone());
            topology.add_edge(&a, &b);
        }
        topology
    }

    fn numbered(n: usize) -> Self {
        let mut topology = Self::new();
        for i in 0..n {
            topology.add_node(NodeId::new(format!("node_{}", i)));
        }
        topology
    }
}

impl TopologyProvider for Topology {
    fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    fn neighbors(&self, node: &NodeId) -> &[NodeId] {
        self.adjacency
            .get(node)
            .map(|n| n.as_slice())
            .unwrap_or(&[])
    }

    fn contains(&self, node: &NodeId) -> bool {
        self.adjacency.contains_key(node)
    }
}

/// Identifier of the grid node at row `r`, column `c`.
pub fn grid_id(r: usize, c: usize) -> NodeId {
    NodeId::new(format!("{},{}", r, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LandmarkError;
    use crate::random_source::SeededRandom;

    #[test]
    fn test_grid_shape() {
        let grid = Topology::grid(4, 4, false);
        assert_eq!(grid.node_count(), 16);
        // 2 * rows * (cols - 1)
        assert_eq!(grid.edge_count(), 24);
        assert_eq!(grid.degree(&grid_id(0, 0)), 2);
        assert_eq!(grid.degree(&grid_id(1, 1)), 4);
        assert!(grid.has_edge(&grid_id(0, 0), &grid_id(0, 1)));
        assert!(!grid.has_edge(&grid_id(0, 0), &grid_id(1, 1)));
        assert!(grid.is_connected());
    }

    #[test]
    fn test_periodic_grid_wraps() {
        let torus = Topology::grid(4, 5, true);
        assert_eq!(torus.edge_count(), 40);
        assert!(torus.has_edge(&grid_id(0, 0), &grid_id(0, 4)));
        assert!(torus.has_edge(&grid_id(0, 0), &grid_id(3, 0)));
        for node in torus.nodes() {
            assert_eq!(torus.degree(node), 4);
        }
    }

    #[test]
    fn test_add_edge_rejects_loops_and_duplicates() {
        let mut topology = Topology::new();
        topology.add_node(NodeId::new("a"));
        topology.add_node(NodeId::new("b"));
        assert!(topology.add_edge(&NodeId::new("a"), &NodeId::new("b")));
        assert!(!topology.add_edge(&NodeId::new("b"), &NodeId::new("a")));
        assert!(!topology.add_edge(&NodeId::new("a"), &NodeId::new("a")));
        assert!(!topology.add_edge(&NodeId::new("a"), &NodeId::new("zz")));
        assert_eq!(topology.edge_count(), 1);
    }

    #[test]
    fn test_from_edges_keeps_order() {
        let topology = Topology::from_edges(vec![
            (NodeId::new("c"), NodeId::new("a")),
            (NodeId::new("a"), NodeId::new("b")),
        ]);
        let names: Vec<&str> = topology.nodes().iter().map(|n| n.0.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert!(topology.neighbors(&NodeId::new("missing")).is_empty());
    }

    #[test]
    fn test_cycle() {
        let ring = Topology::cycle(6);
        assert_eq!(ring.edge_count(), 6);
        for node in ring.nodes() {
            assert_eq!(ring.degree(node), 2);
        }
    }

    #[test]
    fn test_sized_grid() {
        assert_eq!(Topology::sized_grid(4).node_count(), 16);
        assert_eq!(Topology::sized_grid(5).node_count(), 25);
    }

    #[test]
    fn test_geo_grid_adds_links() {
        let mut random = SeededRandom::new(3);
        let geo = Topology::geo_grid(5, 5, 2, &mut random).unwrap();
        assert_eq!(geo.node_count(), 25);
        assert!(geo.edge_count() > 50);
        assert!(geo.is_connected());
    }

    struct ShortSampler;

    impl RandomSource for ShortSampler {
        fn sample_without_replacement(
            &mut self,
            population: &[NodeId],
            count: usize,
        ) -> Result<Vec<NodeId>> {
            Err(LandmarkError::InsufficientNodes {
                required: count,
                available: population.len(),
            })
        }

        fn weighted_choice(&mut self, _weights: &[f64]) -> Result<usize> {
            Ok(0)
        }

        fn uniform_index(&mut self, _len: usize) -> usize {
            0
        }

        fn unit(&mut self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_geo_grid_propagates_sampling_error() {
        assert!(matches!(
            Topology::geo_grid(3, 3, 2, &mut ShortSampler),
            Err(LandmarkError::InsufficientNodes { .. })
        ));
    }

    #[test]
    fn test_gnp_extremes() {
        let mut random = SeededRandom::new(9);
        assert_eq!(Topology::gnp(10, 0.0, &mut random).edge_count(), 0);
        assert_eq!(Topology::gnp(10, 1.0, &mut random).edge_count(), 45);
        assert!(!Topology::gnp(10, 0.0, &mut random).is_connected());
    }

    #[test]
    fn test_random_links_deterministic() {
        let a = Topology::random_links(40, 3, &mut SeededRandom::new(5));
        let b = Topology::random_links(40, 3, &mut SeededRandom::new(5));
        assert_eq!(a.edge_count(), b.edge_count());
        for node in a.nodes() {
            assert_eq!(a.neighbors(node), b.neighbors(node));
        }
    }
}
