//! Shortest-path distance oracles
//!
//! The coordinate index never computes shortest paths itself; it asks a
//! [`DistanceOracle`]. Two interchangeable oracles are provided:
//!
//! - [`BfsOracle`]: breadth-first search, one source at a time
//! - [`RelaxationOracle`]: synchronous rounds in which every node adopts the
//!   best distance offered by a neighbour plus one, until nothing changes.
//!   This is how nodes would learn their coordinates by talking only to
//!   their neighbours.

use crate::coordinates::NodeId;
use crate::error::{LandmarkError, Result};
use crate::topology::TopologyProvider;
use std::collections::{HashMap, VecDeque};

/// Shortest-path distances on an unweighted topology.
pub trait DistanceOracle {
    /// Distance from `source` to every node reachable from it (0 for `source`).
    fn shortest_path_lengths_from(&self, source: &NodeId) -> Result<HashMap<NodeId, u32>>;

    /// Distance between `a` and `b`; `Unreachable` if there is no path.
    fn shortest_path_length(&self, a: &NodeId, b: &NodeId) -> Result<u32> {
        let lengths = self.shortest_path_lengths_from(a)?;
        lengths
            .get(b)
            .copied()
            .ok_or_else(|| LandmarkError::Unreachable {
                from: a.clone(),
                to: b.clone(),
            })
    }
}

/// Breadth-first search oracle
pub struct BfsOracle<'a, T: TopologyProvider + ?Sized> {
    topology: &'a T,
}

impl<'a, T: TopologyProvider + ?Sized> BfsOracle<'a, T> {
    pub fn new(topology: &'a T) -> Self {
        Self { topology }
    }
}

impl<'a, T: TopologyProvider + ?Sized> DistanceOracle for BfsOracle<'a, T> {
    fn shortest_path_lengths_from(&self, source: &NodeId) -> Result<HashMap<NodeId, u32>> {
        if !self.topology.contains(source) {
            return Err(LandmarkError::UnknownNode(source.clone()));
        }

        let mut distances = HashMap::new();
        let mut queue = VecDeque::new();
        distances.insert(source.clone(), 0);
        queue.push_back((source.clone(), 0u32));

        while let Some((current, dist)) = queue.pop_front() {
            for neighbor in self.topology.neighbors(&current) {
                if !distances.contains_key(neighbor) {
                    distances.insert(neighbor.clone(), dist + 1);
                    queue.push_back((neighbor.clone(), dist + 1));
                }
            }
        }

        Ok(distances)
    }

    fn shortest_path_length(&self, a: &NodeId, b: &NodeId) -> Result<u32> {
        if !self.topology.contains(b) {
            return Err(LandmarkError::UnknownNode(b.clone()));
        }
        if !self.topology.contains(a) {
            return Err(LandmarkError::UnknownNode(a.clone()));
        }
        if a == b {
            return Ok(0);
        }

        let mut distances: HashMap<&NodeId, u32> = HashMap::new();
        let mut queue = VecDeque::new();
        distances.insert(a, 0);
        queue.push_back((a, 0u32));

        while let Some((current, dist)) = queue.pop_front() {
            for neighbor in self.topology.neighbors(current) {
                if neighbor == b {
                    return Ok(dist + 1);
                }
                if !distances.contains_key(neighbor) {
                    distances.insert(neighbor, dist + 1);
                    queue.push_back((neighbor, dist + 1));
                }
            }
        }

        Err(LandmarkError::Unreachable {
            from: a.clone(),
            to: b.clone(),
        })
    }
}

/// Neighbour-relaxation oracle
pub struct RelaxationOracle<'a, T: TopologyProvider + ?Sized> {
    topology: &'a T,
}

impl<'a, T: TopologyProvider + ?Sized> RelaxationOracle<'a, T> {
    pub fn new(topology: &'a T) -> Self {
        Self { topology }
    }

    /// Run relaxation rounds from `source` until a round changes nothing.
    ///
    /// Returns the distances and the number of rounds that changed at least
    /// one entry.
    pub fn relax_from(&self, source: &NodeId) -> Result<(HashMap<NodeId, u32>, usize)> {
        if !self.topology.contains(source) {
            return Err(LandmarkError::UnknownNode(source.clone()));
        }

        let mut distances: HashMap<NodeId, u32> = HashMap::new();
        distances.insert(source.clone(), 0);
        let mut rounds = 0;

        loop {
            let mut changed = false;
            for node in self.topology.nodes() {
                let offered = self
                    .topology
                    .neighbors(node)
                    .iter()
                    .filter_map(|nei| distances.get(nei))
                    .map(|d| d + 1)
                    .min();
                let Some(offered) = offered else {
                    continue;
                };
                let entry = distances.entry(node.clone()).or_insert(u32::MAX);
                if offered < *entry {
                    *entry = offered;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            rounds += 1;
        }

        Ok((distances, rounds))
    }
}

impl<'a, T: TopologyProvider + ?Sized> DistanceOracle for RelaxationOracle<'a, T> {
    fn shortest_path_lengths_from(&self, source: &NodeId) -> Result<HashMap<NodeId, u32>> {
        self.relax_from(source).map(|(distances, _)| distances)
    }
}

/// Largest shortest-path distance over all node pairs.
///
/// Fails with `Unreachable` on a disconnected topology.
pub fn diameter<T, O>(topology: &T, oracle: &O) -> Result<u32>
where
    T: TopologyProvider + ?Sized,
    O: DistanceOracle + ?Sized,
{
    let mut best = 0;
    for source in topology.nodes() {
        let lengths = oracle.shortest_path_lengths_from(source)?;
        for node in topology.nodes() {
            match lengths.get(node) {
                Some(&d) => best = best.max(d),
                None => {
                    return Err(LandmarkError::Unreachable {
                        from: source.clone(),
                        to: node.clone(),
                    })
                }
            }
        }
    }
    Ok(best)
}
