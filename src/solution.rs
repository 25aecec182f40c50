//! Result of a route search.
//!
//! A `Solution` carries the best path found, its cost and the best-cost
//! trace of the run, plus the run metadata needed for reporting.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};

/// Best route found by a search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Best path as node ids, from start to end
    pub path: Vec<usize>,
    /// Cost of the best path
    pub cost: f64,
    /// Best cost after the initial population and after every iteration
    pub history: Vec<f64>,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Seed of the random source used by the run
    pub seed: u64,
    /// Number of completed iterations
    pub iterations: usize,
    /// Computation time in seconds
    pub computation_time: f64,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            path: Vec::new(),
            cost: f64::INFINITY,
            history: Vec::new(),
            algorithm: String::new(),
            seed: 0,
            iterations: 0,
            computation_time: 0.0,
        }
    }

    /// Whether the path connects `start` to `end` through existing edges
    /// and the recorded cost matches a fresh evaluation.
    pub fn is_consistent(&self, graph: &Graph, start: usize, end: usize) -> bool {
        if self.path.first() != Some(&start) || self.path.last() != Some(&end) {
            return false;
        }
        match graph.path_cost(&self.path) {
            Ok(cost) => (cost - self.cost).abs() < 1e-9,
            Err(_) => false,
        }
    }

    /// Node names along the best path
    pub fn route_names<'g>(&self, graph: &'g Graph) -> Vec<&'g str> {
        graph.path_names(&self.path)
    }

    /// Route rendered as "A -> B -> C"
    pub fn route_string(&self, graph: &Graph) -> String {
        self.route_names(graph).join(" -> ")
    }

    /// First iteration at which the final best cost was reached (0 = initial population)
    pub fn converged_at(&self) -> Option<usize> {
        self.history.iter().position(|&c| c <= self.cost)
    }

    /// Number of iterations in which the best cost strictly improved
    pub fn improvements(&self) -> usize {
        self.history.windows(2).filter(|w| w[1] < w[0]).count()
    }

    /// Check that the best-cost trace never goes up
    pub fn history_is_monotone(&self) -> bool {
        self.history.windows(2).all(|w| w[1] <= w[0])
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Seed: {}", self.seed)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Path: {:?}", self.path)
    }
}
