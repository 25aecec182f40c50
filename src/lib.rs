//! Whale Route Library
//! 
//! Population-based search for low-cost routes between two nodes of a small
//! weighted road network, loosely inspired by the Whale Optimization Algorithm.
//! 
//! # Features
//! 
//! - Road networks from JSON files or the built-in Baja California network
//! - Candidate generation by shuffling the interior of a shortest path
//! - Whale population search with per-iteration convergence history
//! - Multi-seed benchmarking and SVG visualization
//! 
//! # Example
//! 
//! ```no_run
//! use whale_route::graph::Graph;
//! use whale_route::heuristics::whale::{optimize, WhaleConfig};
//! 
//! let graph = Graph::baja_california();
//! let start = graph.node_id("Tijuana").unwrap();
//! let end = graph.node_id("San Felipe").unwrap();
//! 
//! let config = WhaleConfig { seed: 7, ..Default::default() };
//! let solution = optimize(&graph, start, end, &config).unwrap();
//! 
//! println!("{} ({:.0} km)", solution.route_string(&graph), solution.cost);
//! ```

pub mod error;
pub mod graph;
pub mod solution;
pub mod heuristics;
pub mod benchmark;
pub mod visualization;

pub use error::{Error, Result};
pub use graph::Graph;
pub use solution::Solution;
