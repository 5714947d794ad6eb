//! Walk tracing and log setup
//!
//! [`WalkTrace`] records the path taken by a single random walk, with the
//! observed distance to the destination at every hop, so that individual
//! walks can be inspected or exported as JSON.

use crate::coordinates::NodeId;
use serde::{Deserialize, Serialize};

/// One node on a walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopTrace {
    pub node: NodeId,
    /// Observed distance from `node` to the destination
    pub observed_distance: u32,
}

/// Full trajectory of one walk, source included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkTrace {
    pub source: NodeId,
    pub destination: NodeId,
    pub path: Vec<HopTrace>,
    /// Steps where every weight underflowed and a uniform draw was used
    pub uniform_fallbacks: u32,
}

impl WalkTrace {
    pub fn new(source: NodeId, destination: NodeId) -> Self {
        Self {
            source,
            destination,
            path: Vec::new(),
            uniform_fallbacks: 0,
        }
    }

    pub fn record(&mut self, node: NodeId, observed_distance: u32) {
        self.path.push(HopTrace {
            node,
            observed_distance,
        });
    }

    /// Number of moves; the source itself is not a hop.
    pub fn hop_count(&self) -> u32 {
        self.path.len().saturating_sub(1) as u32
    }

    pub fn arrived(&self) -> bool {
        self.path
            .last()
            .map(|hop| hop.node == self.destination)
            .unwrap_or(false)
    }

    /// Nodes visited, in order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.path.iter().map(|hop| hop.node.clone()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Install a global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Does nothing if
/// a subscriber is already installed.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .try_init();
    }
}
