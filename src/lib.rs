//! landmark_walk: landmark coordinates and biased random-walk routing
//!
//! Every node of a graph is addressed by its shortest-path distances to a
//! small random set of landmark nodes. A message is routed by a random walk
//! that only compares the coordinates of the current node, its neighbours
//! and the destination, favouring neighbours that look closer.
//!
//! ```no_run
//! use landmark_walk::oracle::BfsOracle;
//! use landmark_walk::random_source::SeededRandom;
//! use landmark_walk::statistics::RoutingStatistics;
//! use landmark_walk::topology::Topology;
//! use landmark_walk::walk::{RandomWalkRouter, DEFAULT_BASE};
//! use landmark_walk::LandmarkCoordinateIndex;
//!
//! let grid = Topology::grid(8, 8, false);
//! let mut random = SeededRandom::new(42);
//! let index = LandmarkCoordinateIndex::build(&grid, &BfsOracle::new(&grid), 4, &mut random)?;
//! let router = RandomWalkRouter::new(&index, &grid);
//! let estimate = RoutingStatistics::new(&router).estimate_average_hops(48, DEFAULT_BASE, &mut random)?;
//! println!("average hops: {:.2}", estimate.average_hops);
//! # Ok::<(), landmark_walk::LandmarkError>(())
//! ```

pub mod config;
pub mod coordinates;
pub mod error;
pub mod landmark_index;
pub mod metric;
pub mod oracle;
pub mod random_source;
pub mod statistics;
pub mod telemetry;
pub mod topology;
pub mod walk;

pub use coordinates::{Coordinate, NodeId};
pub use error::{LandmarkError, Result};
pub use landmark_index::{DistanceTable, LandmarkCoordinateIndex};
pub use metric::CoordinateMetric;
pub use statistics::{count_coordinate_collisions, RoutingStatistics, VisitationCounter};
pub use walk::RandomWalkRouter;
