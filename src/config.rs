//! Experiment configuration
//!
//! Loaded from a JSON file by the simulator; every field has a default so a
//! partial file (or none at all) is valid.

use crate::error::{LandmarkError, Result};
use crate::landmark_index::suggested_landmark_count;
use crate::random_source::RandomSource;
use crate::statistics::DEFAULT_TRIALS;
use crate::topology::{Topology, MAX_SIZE_EXPONENT};
use crate::walk::DEFAULT_BASE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Graph family to simulate on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyKind {
    Grid {
        rows: usize,
        cols: usize,
        #[serde(default)]
        periodic: bool,
    },
    /// Periodic grid plus `extra` random links per node
    GeoGrid {
        rows: usize,
        cols: usize,
        extra: usize,
    },
    Gnp {
        nodes: usize,
        p: f64,
    },
    /// Square grid with about `2^exponent` nodes
    SizedGrid {
        exponent: u32,
    },
    /// G(n, p) with `n = 2^exponent`, `p = 2 * exponent / n`
    SizedGnp {
        exponent: u32,
    },
    Cycle {
        nodes: usize,
    },
}

impl TopologyKind {
    pub fn build<R: RandomSource + ?Sized>(&self, random: &mut R) -> Result<Topology> {
        let topology = match *self {
            TopologyKind::Grid {
                rows,
                cols,
                periodic,
            } => Topology::grid(rows, cols, periodic),
            TopologyKind::GeoGrid { rows, cols, extra } => {
                Topology::geo_grid(rows, cols, extra, random)?
            }
            TopologyKind::Gnp { nodes, p } => Topology::gnp(nodes, p, random),
            TopologyKind::SizedGrid { exponent } => Topology::sized_grid(exponent),
            TopologyKind::SizedGnp { exponent } => Topology::sized_gnp(exponent, random),
            TopologyKind::Cycle { nodes } => Topology::cycle(nodes),
        };
        Ok(topology)
    }

    pub fn label(&self) -> String {
        match self {
            TopologyKind::Grid {
                rows,
                cols,
                periodic,
            } => format!("grid{}x{}{}", rows, cols, if *periodic { "-periodic" } else { "" }),
            TopologyKind::GeoGrid { rows, cols, extra } => {
                format!("geo{}x{}+{}", rows, cols, extra)
            }
            TopologyKind::Gnp { nodes, p } => format!("gnp{}-p{}", nodes, p),
            TopologyKind::SizedGrid { exponent } => format!("grid-2^{}", exponent),
            TopologyKind::SizedGnp { exponent } => format!("gnp-2^{}", exponent),
            TopologyKind::Cycle { nodes } => format!("cycle{}", nodes),
        }
    }
}

impl Default for TopologyKind {
    fn default() -> Self {
        TopologyKind::Grid {
            rows: 4,
            cols: 4,
            periodic: false,
        }
    }
}

/// Parameters of one landmark routing experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub topology: TopologyKind,
    /// Landmark count; `None` picks `(log2 n)^2` capped at `n - 1`
    pub landmarks: Option<usize>,
    /// Walk bias
    pub base: f64,
    pub num_trials: usize,
    pub seed: u64,
    /// Optional hop ceiling per walk
    pub max_hops: Option<u32>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            topology: TopologyKind::default(),
            landmarks: None,
            base: DEFAULT_BASE,
            num_trials: DEFAULT_TRIALS,
            seed: 42,
            max_hops: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Landmark count to use on a topology of `n` nodes.
    pub fn effective_landmark_count(&self, n: usize) -> usize {
        match self.landmarks {
            Some(k) => k,
            None => suggested_landmark_count(n),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base.is_finite() && self.base > 0.0) {
            return Err(LandmarkError::InvalidConfiguration(format!(
                "base must be finite and positive, got {}",
                self.base
            )));
        }
        if self.num_trials == 0 {
            return Err(LandmarkError::InvalidConfiguration(
                "num_trials must be positive".to_string(),
            ));
        }
        if self.landmarks == Some(0) {
            return Err(LandmarkError::InvalidConfiguration(
                "landmarks must be positive".to_string(),
            ));
        }
        match self.topology {
            TopologyKind::Gnp { p, .. } if !(0.0..=1.0).contains(&p) => {
                return Err(LandmarkError::InvalidConfiguration(format!(
                    "edge probability must lie in [0, 1], got {}",
                    p
                )));
            }
            TopologyKind::SizedGrid { exponent } | TopologyKind::SizedGnp { exponent }
                if exponent > MAX_SIZE_EXPONENT =>
            {
                return Err(LandmarkError::InvalidConfiguration(format!(
                    "size exponent must be at most {}, got {}",
                    MAX_SIZE_EXPONENT, exponent
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random_source::SeededRandom;
    use crate::topology::TopologyProvider;

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.base, 150.0);
        assert_eq!(config.num_trials, 48);
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_landmark_count(16), 15);
    }

    #[test]
    fn test_partial_json() {
        let config = ExperimentConfig::from_json_str(
            r#"{"topology": {"kind": "geo_grid", "rows": 8, "cols": 8, "extra": 1}, "landmarks": 5}"#,
        )
        .unwrap();
        assert_eq!(config.landmarks, Some(5));
        assert_eq!(config.num_trials, DEFAULT_TRIALS);
        let topology = config
            .topology
            .build(&mut SeededRandom::new(config.seed))
            .unwrap();
        assert_eq!(topology.node_count(), 64);
        assert_eq!(config.topology.label(), "geo8x8+1");
    }

    #[test]
    fn test_grid_periodic_defaults_false() {
        let config =
            ExperimentConfig::from_json_str(r#"{"topology": {"kind": "grid", "rows": 2, "cols": 3}}"#)
                .unwrap();
        assert_eq!(
            config.topology,
            TopologyKind::Grid {
                rows: 2,
                cols: 3,
                periodic: false
            }
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{"base": 0.0}"#),
            Err(LandmarkError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{"num_trials": 0}"#),
            Err(LandmarkError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{"topology": {"kind": "gnp", "nodes": 10, "p": 1.5}}"#),
            Err(LandmarkError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{"topology": {"kind": "sized_grid", "exponent": 64}}"#),
            Err(LandmarkError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ExperimentConfig::from_json_str(r#"{"topology": {"kind": "sized_gnp", "exponent": 31}}"#),
            Err(LandmarkError::InvalidConfiguration(_))
        ));
        assert!(ExperimentConfig::from_json_str(
            r#"{"topology": {"kind": "sized_grid", "exponent": 30}}"#
        )
        .is_ok());
        assert!(matches!(
            ExperimentConfig::from_json_str("{not json"),
            Err(LandmarkError::Config(_))
        ));
    }
}
