//! Node identities and landmark coordinates
//!
//! A node's coordinate is the tuple of its shortest-path distances to each
//! landmark, in landmark order. Coordinates act as compact network addresses;
//! two distinct nodes may share one (a collision).

use serde::{Deserialize, Serialize};

/// Node identifier (grid position, index, host name, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Landmark coordinate: one hop distance per landmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate(pub Vec<u32>);

impl Coordinate {
    pub fn new(distances: Vec<u32>) -> Self {
        Self(distances)
    }

    /// Number of landmarks this coordinate was measured against
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// `|a_i - b_i|` for every landmark position.
    ///
    /// Both coordinates must come from the same index; extra components of
    /// the longer one are ignored.
    pub fn differences(&self, other: &Self) -> Vec<u32> {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| a.abs_diff(b))
            .collect()
    }

    /// Largest per-landmark difference, 0 for identical coordinates.
    pub fn max_difference(&self, other: &Self) -> u32 {
        crate::metric::max_difference(&self.0, &other.0)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, ")")
    }
}
