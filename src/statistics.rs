//! Routing quality statistics
//!
//! Runs many walks between random node pairs and aggregates hop counts and
//! per-node load, and tallies coordinate collisions. All accumulators are
//! plain values owned by the caller; nothing here keeps global state, so
//! independent runs can be executed in parallel and merged afterwards.

use crate::coordinates::{Coordinate, NodeId};
use crate::error::{LandmarkError, Result};
use crate::landmark_index::LandmarkCoordinateIndex;
use crate::oracle::DistanceOracle;
use crate::random_source::RandomSource;
use crate::topology::TopologyProvider;
use crate::walk::RandomWalkRouter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Default number of walks per estimate
pub const DEFAULT_TRIALS: usize = 48;

/// Number of times each node was landed on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitationCounter {
    counts: HashMap<NodeId, u64>,
}

impl VisitationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, node: &NodeId) {
        *self.counts.entry(node.clone()).or_insert(0) += 1;
    }

    pub fn count(&self, node: &NodeId) -> u64 {
        self.counts.get(node).copied().unwrap_or(0)
    }

    /// Sum of all visits.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct nodes visited at least once.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Add every count of `other` into `self`.
    pub fn merge(&mut self, other: &VisitationCounter) {
        for (node, count) in &other.counts {
            *self.counts.entry(node.clone()).or_insert(0) += count;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, u64)> {
        self.counts.iter().map(|(node, count)| (node, *count))
    }

    /// The `n` busiest nodes, busiest first, ties broken by node id.
    pub fn most_visited(&self, n: usize) -> Vec<(NodeId, u64)> {
        let mut entries: Vec<(NodeId, u64)> = self
            .counts
            .iter()
            .map(|(node, count)| (node.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}

/// Concentration of visits over the nodes of a topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub total_visits: u64,
    pub nodes_visited: usize,
    pub max_load: u64,
    pub mean_load: f64,
    pub p95: u64,
    pub gini: f64,
    pub top_1_share: f64,
    pub top_10_share: f64,
}

impl LoadSummary {
    /// Summarise `visits` over `node_count` nodes; unvisited nodes count as zero load.
    pub fn from_visits(visits: &VisitationCounter, node_count: usize) -> Self {
        let mut loads: Vec<u64> = visits.counts.values().copied().collect();
        let missing = node_count.saturating_sub(loads.len());
        loads.extend(std::iter::repeat(0).take(missing));
        loads.sort_unstable();

        let total: u64 = loads.iter().sum();
        let mean = if loads.is_empty() {
            0.0
        } else {
            total as f64 / loads.len() as f64
        };
        let desc: Vec<u64> = loads.iter().rev().copied().collect();

        Self {
            total_visits: total,
            nodes_visited: visits.len(),
            max_load: loads.last().copied().unwrap_or(0),
            mean_load: mean,
            p95: percentile(&loads, 0.95),
            gini: gini_coefficient(&loads),
            top_1_share: top_share(&desc, 0.01),
            top_10_share: top_share(&desc, 0.10),
        }
    }
}

fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn gini_coefficient(sorted: &[u64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len() as f64;
    let sum: f64 = sorted.iter().map(|v| *v as f64).sum();
    if sum == 0.0 {
        return 0.0;
    }
    let cum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64 + 1.0) * (*v as f64))
        .sum();
    (2.0 * cum) / (n * sum) - (n + 1.0) / n
}

/// Share of all visits taken by the busiest `fraction` of nodes (at least one node).
fn top_share(sorted_desc: &[u64], fraction: f64) -> f64 {
    let total: u64 = sorted_desc.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let take = ((sorted_desc.len() as f64 * fraction).ceil() as usize).max(1);
    let top: u64 = sorted_desc.iter().take(take).sum();
    top as f64 / total as f64
}

/// Result of [`RoutingStatistics::estimate_average_hops`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopEstimate {
    pub average_hops: f64,
    pub hop_counts: Vec<u32>,
    pub visits: VisitationCounter,
}

impl HopEstimate {
    pub fn max_hops(&self) -> u32 {
        self.hop_counts.iter().copied().max().unwrap_or(0)
    }

    pub fn load(&self, node_count: usize) -> LoadSummary {
        LoadSummary::from_visits(&self.visits, node_count)
    }
}

/// Walk length compared with the shortest path, over random pairs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StretchEstimate {
    pub mean_stretch: f64,
    pub max_stretch: f64,
    pub average_hops: f64,
    pub average_shortest: f64,
    pub trials: usize,
}

/// How many nodes share each coordinate
#[derive(Debug, Clone, Default)]
pub struct CollisionTally {
    members: HashMap<Coordinate, Vec<NodeId>>,
}

impl CollisionTally {
    pub fn count(&self, coordinate: &Coordinate) -> usize {
        self.members.get(coordinate).map(|m| m.len()).unwrap_or(0)
    }

    pub fn counts(&self) -> impl Iterator<Item = (&Coordinate, usize)> {
        self.members.iter().map(|(coord, m)| (coord, m.len()))
    }

    /// Number of distinct coordinates.
    pub fn distinct(&self) -> usize {
        self.members.len()
    }

    pub fn total_nodes(&self) -> usize {
        self.members.values().map(|m| m.len()).sum()
    }

    /// True if no two nodes share a coordinate.
    pub fn is_unique(&self) -> bool {
        self.members.values().all(|m| m.len() == 1)
    }

    /// Coordinates held by more than one node, most crowded first.
    pub fn collisions(&self) -> Vec<(Coordinate, usize)> {
        let mut crowded: Vec<(Coordinate, usize)> = self
            .members
            .iter()
            .filter(|(_, m)| m.len() > 1)
            .map(|(coord, m)| (coord.clone(), m.len()))
            .collect();
        crowded.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0 .0.cmp(&b.0 .0)));
        crowded
    }

    /// Every node whose coordinate is shared, sorted.
    pub fn colliding_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .members
            .values()
            .filter(|m| m.len() > 1)
            .flat_map(|m| m.iter().cloned())
            .collect();
        nodes.sort();
        nodes
    }

    /// Fraction of nodes whose coordinate is shared with another node.
    pub fn collision_rate(&self) -> f64 {
        let total = self.total_nodes();
        if total == 0 {
            return 0.0;
        }
        self.colliding_nodes().len() as f64 / total as f64
    }

    /// `multiplicity -> number of coordinates held by exactly that many nodes`
    pub fn multiplicity_histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for m in self.members.values() {
            *histogram.entry(m.len()).or_insert(0) += 1;
        }
        histogram
    }
}

/// Tally how many nodes of `topology` map to each coordinate.
pub fn count_coordinate_collisions<T>(
    index: &LandmarkCoordinateIndex,
    topology: &T,
) -> Result<CollisionTally>
where
    T: TopologyProvider + ?Sized,
{
    let mut tally = CollisionTally::default();
    for node in topology.nodes() {
        let coordinate = index.coordinate_of(node)?;
        tally
            .members
            .entry(coordinate)
            .or_default()
            .push(node.clone());
    }
    Ok(tally)
}

/// Repeated-trial driver around a [`RandomWalkRouter`]
pub struct RoutingStatistics<'r, 'a, T: TopologyProvider + ?Sized> {
    router: &'r RandomWalkRouter<'a, T>,
    hop_ceiling: Option<u32>,
}

impl<'r, 'a, T: TopologyProvider + ?Sized> RoutingStatistics<'r, 'a, T> {
    pub fn new(router: &'r RandomWalkRouter<'a, T>) -> Self {
        Self {
            router,
            hop_ceiling: None,
        }
    }

    /// Abort any walk longer than `max_hops` with `HopLimitExceeded`.
    pub fn with_hop_ceiling(mut self, max_hops: Option<u32>) -> Self {
        self.hop_ceiling = max_hops;
        self
    }

    fn sample_pair<R: RandomSource + ?Sized>(&self, random: &mut R) -> Result<(NodeId, NodeId)> {
        let mut pair = random
            .sample_without_replacement(self.router.topology().nodes(), 2)?
            .into_iter();
        match (pair.next(), pair.next()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(LandmarkError::InsufficientNodes {
                required: 2,
                available: self.router.topology().node_count(),
            }),
        }
    }

    fn check_trials(&self, num_trials: usize) -> Result<()> {
        let available = self.router.topology().node_count();
        if available < 2 {
            return Err(LandmarkError::InsufficientNodes {
                required: 2,
                available,
            });
        }
        if num_trials == 0 {
            return Err(LandmarkError::InvalidConfiguration(
                "number of trials must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn walk<R: RandomSource + ?Sized>(
        &self,
        src: &NodeId,
        dst: &NodeId,
        visits: &mut VisitationCounter,
        base: f64,
        random: &mut R,
    ) -> Result<u32> {
        match self.hop_ceiling {
            Some(max_hops) => self
                .router
                .route_with_ceiling(src, dst, visits, base, max_hops, random),
            None => self.router.route(src, dst, visits, base, random),
        }
    }

    /// Average hop count over `num_trials` walks between distinct random
    /// nodes, with the visits of all walks accumulated in one counter.
    pub fn estimate_average_hops<R: RandomSource + ?Sized>(
        &self,
        num_trials: usize,
        base: f64,
        random: &mut R,
    ) -> Result<HopEstimate> {
        self.check_trials(num_trials)?;

        let mut visits = VisitationCounter::new();
        let mut hop_counts = Vec::with_capacity(num_trials);
        for _ in 0..num_trials {
            let (src, dst) = self.sample_pair(random)?;
            let hops = self.walk(&src, &dst, &mut visits, base, random)?;
            hop_counts.push(hops);
        }

        let average_hops =
            hop_counts.iter().map(|&h| h as f64).sum::<f64>() / hop_counts.len() as f64;
        tracing::debug!(
            trials = num_trials,
            base,
            average_hops,
            "estimated average hop count"
        );

        Ok(HopEstimate {
            average_hops,
            hop_counts,
            visits,
        })
    }

    /// Ratio of walk length to shortest-path length over random pairs.
    pub fn estimate_stretch<O, R>(
        &self,
        oracle: &O,
        num_trials: usize,
        base: f64,
        random: &mut R,
    ) -> Result<StretchEstimate>
    where
        O: DistanceOracle + ?Sized,
        R: RandomSource + ?Sized,
    {
        self.check_trials(num_trials)?;

        let mut visits = VisitationCounter::new();
        let mut stretches = Vec::with_capacity(num_trials);
        let mut total_hops = 0u64;
        let mut total_shortest = 0u64;
        for _ in 0..num_trials {
            let (src, dst) = self.sample_pair(random)?;
            let shortest = oracle.shortest_path_length(&src, &dst)?;
            let hops = self.walk(&src, &dst, &mut visits, base, random)?;
            total_hops += hops as u64;
            total_shortest += shortest as u64;
            stretches.push(hops as f64 / shortest.max(1) as f64);
        }

        let trials = stretches.len() as f64;
        Ok(StretchEstimate {
            mean_stretch: stretches.iter().sum::<f64>() / trials,
            max_stretch: stretches.iter().copied().fold(0.0, f64::max),
            average_hops: total_hops as f64 / trials,
            average_shortest: total_shortest as f64 / trials,
            trials: stretches.len(),
        })
    }
}
