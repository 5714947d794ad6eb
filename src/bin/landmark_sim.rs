//! Landmark routing simulator
//!
//! Builds a topology, addresses it with landmark coordinates and measures
//! how well the biased random walk routes between random node pairs.

use landmark_walk::config::{ExperimentConfig, TopologyKind};
use landmark_walk::oracle::BfsOracle;
use landmark_walk::random_source::SeededRandom;
use landmark_walk::statistics::{count_coordinate_collisions, LoadSummary, RoutingStatistics};
use landmark_walk::telemetry::init_tracing;
use landmark_walk::topology::TopologyProvider;
use landmark_walk::walk::RandomWalkRouter;
use landmark_walk::{LandmarkCoordinateIndex, NodeId, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
struct ExperimentReport {
    topology: String,
    nodes: usize,
    edges: usize,
    landmarks: usize,
    base: f64,
    trials: usize,
    seed: u64,
    average_hops: f64,
    max_hops: u32,
    mean_stretch: f64,
    max_stretch: f64,
    distinct_coordinates: usize,
    colliding_nodes: usize,
    collision_rate: f64,
    load: LoadSummary,
    busiest: Vec<(NodeId, u64)>,
    elapsed_ms: u128,
}

/// A sweep point that did not produce a report
#[derive(Debug, Clone, Serialize)]
struct SweepFailure {
    exponent: u32,
    topology: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct SimulationOutput {
    generated_at: String,
    reports: Vec<ExperimentReport>,
    failures: Vec<SweepFailure>,
}

fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentReport> {
    config.validate()?;
    let start = Instant::now();
    let mut random = SeededRandom::new(config.seed);

    let topology = config.topology.build(&mut random)?;
    let oracle = BfsOracle::new(&topology);
    let k = config.effective_landmark_count(topology.node_count());
    let index = LandmarkCoordinateIndex::build(&topology, &oracle, k, &mut random)?;
    let tally = count_coordinate_collisions(&index, &topology)?;

    let router = RandomWalkRouter::new(&index, &topology);
    let stats = RoutingStatistics::new(&router).with_hop_ceiling(config.max_hops);
    let estimate = stats.estimate_average_hops(config.num_trials, config.base, &mut random)?;
    let stretch = stats.estimate_stretch(&oracle, config.num_trials, config.base, &mut random)?;

    tracing::info!(
        topology = %config.topology.label(),
        nodes = topology.node_count(),
        landmarks = k,
        average_hops = estimate.average_hops,
        "experiment finished"
    );

    Ok(ExperimentReport {
        topology: config.topology.label(),
        nodes: topology.node_count(),
        edges: topology.edge_count(),
        landmarks: k,
        base: config.base,
        trials: config.num_trials,
        seed: config.seed,
        average_hops: estimate.average_hops,
        max_hops: estimate.max_hops(),
        mean_stretch: stretch.mean_stretch,
        max_stretch: stretch.max_stretch,
        distinct_coordinates: tally.distinct(),
        colliding_nodes: tally.colliding_nodes().len(),
        collision_rate: tally.collision_rate(),
        load: estimate.load(topology.node_count()),
        busiest: estimate.visits.most_visited(5),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

/// Configurations for a size sweep over `from..=to`, one seed per exponent.
fn sweep_points(
    config: &ExperimentConfig,
    family: &str,
    from: u32,
    to: u32,
) -> Vec<(u32, ExperimentConfig)> {
    (from..=to)
        .map(|exponent| {
            let mut point = config.clone();
            point.topology = match family {
                "gnp" => TopologyKind::SizedGnp { exponent },
                _ => TopologyKind::SizedGrid { exponent },
            };
            point.seed = config.seed.wrapping_add(exponent as u64);
            (exponent, point)
        })
        .collect()
}

/// Run every sweep point in parallel. Reports and failures come back sorted
/// by exponent.
fn run_sweep(points: &[(u32, ExperimentConfig)]) -> (Vec<ExperimentReport>, Vec<SweepFailure>) {
    let mut outcomes: Vec<(u32, std::result::Result<ExperimentReport, SweepFailure>)> = points
        .par_iter()
        .map(|(exponent, point)| {
            let outcome = run_experiment(point).map_err(|e| {
                tracing::warn!(exponent = *exponent, error = %e, "sweep point failed");
                SweepFailure {
                    exponent: *exponent,
                    topology: point.topology.label(),
                    error: e.to_string(),
                }
            });
            (*exponent, outcome)
        })
        .collect();
    outcomes.sort_by_key(|(exponent, _)| *exponent);

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (_, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(failure) => failures.push(failure),
        }
    }
    (reports, failures)
}

fn parse_range(input: &str) -> Option<(u32, u32)> {
    let (from, to) = input.split_once("..")?;
    let from = from.trim().parse().ok()?;
    let to = to.trim().parse().ok()?;
    if from <= to {
        Some((from, to))
    } else {
        None
    }
}

fn print_usage() {
    println!("Usage: landmark_sim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config FILE       JSON experiment config");
    println!("  -k, --landmarks NUM     Number of landmarks (default: (log2 n)^2)");
    println!("  -b, --base NUM          Walk bias (default: 150)");
    println!("  -t, --trials NUM        Walks per estimate (default: 48)");
    println!("  --seed NUM              Random seed (default: 42)");
    println!("  --max-hops NUM          Abort walks longer than NUM hops");
    println!("  --sweep FROM..TO        Run sized topologies with 2^FROM..2^TO nodes");
    println!("  --family grid|gnp       Topology family for --sweep (default: grid)");
    println!("  -o, --output FILE       Write a JSON report");
    println!("  --json-logs             Emit logs as JSON");
    println!("  -h, --help              Show this help");
}

fn print_row(report: &ExperimentReport) {
    println!(
        "{:<16} {:<7} {:<6} {:<10.2} {:<8} {:<9.2} {:<10.3} {:<8} {:<6.3}",
        report.topology,
        report.nodes,
        report.landmarks,
        report.average_hops,
        report.max_hops,
        report.mean_stretch,
        report.collision_rate,
        report.load.max_load,
        report.load.gini
    );
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<String> = None;
    let mut landmarks: Option<usize> = None;
    let mut base: Option<f64> = None;
    let mut trials: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut max_hops: Option<u32> = None;
    let mut sweep: Option<(u32, u32)> = None;
    let mut family = "grid".to_string();
    let mut output_file: Option<String> = None;
    let mut json_logs = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--landmarks" | "-k" => {
                if i + 1 < args.len() {
                    landmarks = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--base" | "-b" => {
                if i + 1 < args.len() {
                    base = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--trials" | "-t" => {
                if i + 1 < args.len() {
                    trials = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--seed" => {
                if i + 1 < args.len() {
                    seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--max-hops" => {
                if i + 1 < args.len() {
                    max_hops = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--sweep" => {
                if i + 1 < args.len() {
                    sweep = parse_range(&args[i + 1]);
                    if sweep.is_none() {
                        eprintln!("Invalid sweep range: {}", args[i + 1]);
                        std::process::exit(2);
                    }
                    i += 1;
                }
            }
            "--family" => {
                if i + 1 < args.len() {
                    family = args[i + 1].clone();
                    i += 1;
                }
            }
            "--output" | "-o" => {
                if i + 1 < args.len() {
                    output_file = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--json-logs" => json_logs = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(2);
            }
        }
        i += 1;
    }

    init_tracing(json_logs);

    let mut config = match &config_path {
        Some(path) => match ExperimentConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ExperimentConfig::default(),
    };
    if landmarks.is_some() {
        config.landmarks = landmarks;
    }
    if let Some(base) = base {
        config.base = base;
    }
    if let Some(trials) = trials {
        config.num_trials = trials;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if max_hops.is_some() {
        config.max_hops = max_hops;
    }
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    println!("Landmark Random-Walk Routing Simulator");
    println!("======================================\n");
    println!(
        "{:<16} {:<7} {:<6} {:<10} {:<8} {:<9} {:<10} {:<8} {:<6}",
        "Topology", "Nodes", "k", "AvgHops", "MaxHops", "Stretch", "Collision", "MaxLoad", "Gini"
    );
    println!("{}", "-".repeat(90));

    let (reports, failures) = match sweep {
        Some((from, to)) => run_sweep(&sweep_points(&config, &family, from, to)),
        None => match run_experiment(&config) {
            Ok(report) => (vec![report], Vec::new()),
            Err(e) => {
                eprintln!("Experiment failed: {}", e);
                std::process::exit(1);
            }
        },
    };

    for report in &reports {
        print_row(report);
    }
    for failure in &failures {
        println!("{:<16} failed: {}", failure.topology, failure.error);
    }

    if let Some(path) = output_file {
        let output = SimulationOutput {
            generated_at: chrono::Utc::now().to_rfc3339(),
            reports,
            failures,
        };
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Failed to create {}: {}", parent.display(), e);
                    std::process::exit(1);
                }
            }
        }
        let json = match serde_json::to_string_pretty(&output) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        };
        match File::create(&path).and_then(|mut file| file.write_all(json.as_bytes())) {
            Ok(()) => println!("\nReport written to {}", path),
            Err(e) => {
                eprintln!("Failed to write {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_records_failed_points() {
        let config = ExperimentConfig {
            num_trials: 4,
            ..ExperimentConfig::default()
        };
        let mut points = sweep_points(&config, "grid", 4, 5);
        // Exponent past the generator limit fails validation
        points.push((64, {
            let mut point = config.clone();
            point.topology = TopologyKind::SizedGrid { exponent: 64 };
            point
        }));

        let (reports, failures) = run_sweep(&points);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].nodes, 16);
        assert_eq!(reports[1].nodes, 25);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].exponent, 64);
        assert_eq!(failures[0].topology, "grid-2^64");
        assert!(!failures[0].error.is_empty());

        let output = SimulationOutput {
            generated_at: String::new(),
            reports,
            failures,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["failures"][0]["exponent"], 64);
    }

    #[test]
    fn test_sweep_points_seeds() {
        let config = ExperimentConfig::default();
        let points = sweep_points(&config, "gnp", 3, 5);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].1.topology, TopologyKind::SizedGnp { exponent: 3 });
        assert_eq!(points[2].1.seed, config.seed + 5);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("4..8"), Some((4, 8)));
        assert_eq!(parse_range("8..4"), None);
        assert_eq!(parse_range("x..4"), None);
    }
}
