//! Benchmarking and experimentation module for the whale search.
//!
//! Runs the search over many seeds, compares each run against the exact
//! shortest distance, and aggregates the results into statistics, CSV files
//! and a text report.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::heuristics::shortest_path::shortest_distance;
use crate::heuristics::whale::{WhaleConfig, WhaleOptimization};
use crate::solution::Solution;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::path::Path;

/// Result of a single seeded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Seed of the run
    pub seed: u64,
    /// Start node name
    pub start: String,
    /// End node name
    pub end: String,
    /// Best cost found
    pub cost: f64,
    /// Exact shortest distance
    pub optimum: f64,
    /// Gap to the optimum in percent
    pub gap: f64,
    /// Whether the run found a shortest route
    pub optimal: bool,
    /// First iteration holding the final best cost (0 = initial population)
    pub converged_at: usize,
    /// Iterations with a strict improvement of the best cost
    pub improvements: usize,
    /// Completed iterations
    pub iterations: usize,
    /// Computation time in seconds
    pub time: f64,
}

impl RunResult {
    fn from_solution(graph: &Graph, start: usize, end: usize, optimum: f64, solution: &Solution) -> Self {
        let gap = if optimum > 0.0 { (solution.cost - optimum) / optimum * 100.0 } else { 0.0 };

        RunResult {
            seed: solution.seed,
            start: graph.node_name(start).to_string(),
            end: graph.node_name(end).to_string(),
            cost: solution.cost,
            optimum,
            gap,
            optimal: (solution.cost - optimum).abs() < 1e-9,
            converged_at: solution.converged_at().unwrap_or(0),
            improvements: solution.improvements(),
            iterations: solution.iterations,
            time: solution.computation_time,
        }
    }
}

/// Aggregated statistics over all runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    /// Number of runs
    pub num_runs: usize,
    /// Runs that reached the optimum
    pub num_optimal: usize,
    /// Average cost
    pub avg_cost: f64,
    /// Standard deviation of cost
    pub std_cost: f64,
    /// Best cost
    pub best_cost: f64,
    /// Worst cost
    pub worst_cost: f64,
    /// Exact shortest distance
    pub optimum: f64,
    /// Average gap to the optimum in percent
    pub avg_gap: f64,
    /// Average iteration at which the final best cost was reached
    pub avg_converged_at: f64,
    /// Average time
    pub avg_time: f64,
    /// Total time
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of seeded runs
    pub num_runs: usize,
    /// Seed of the first run; run i uses `first_seed + i`
    pub first_seed: u64,
    /// Run seeds in parallel
    pub parallel: bool,
    /// Show a progress bar
    pub show_progress: bool,
    /// Search parameters shared by every run (the seed is overridden)
    pub whale: WhaleConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 30,
            first_seed: 0,
            parallel: true,
            show_progress: true,
            whale: WhaleConfig::default(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Run every seed from `start` to `end` and record the results.
    ///
    /// Configuration and no-route errors are the same for every seed, so the
    /// first one aborts the benchmark.
    pub fn run(&mut self, graph: &Graph, start: usize, end: usize) -> Result<()> {
        if self.config.num_runs == 0 {
            return Err(Error::config("benchmark needs at least one run"));
        }
        let last_seed = self.config.first_seed.checked_add(self.config.num_runs as u64 - 1);
        if last_seed.is_none() {
            return Err(Error::config(format!(
                "{} runs starting at seed {} overflow the seed range",
                self.config.num_runs, self.config.first_seed
            )));
        }
        if !graph.contains(start) || !graph.contains(end) {
            return Err(Error::config(format!("route ({}, {}) references an unknown node id", start, end)));
        }

        log::info!(
            "Benchmarking {} runs on {} ({} -> {})",
            self.config.num_runs,
            graph.name,
            graph.node_name(start),
            graph.node_name(end)
        );

        let optimum = shortest_distance(graph, start, end);
        let seeds: Vec<u64> = (0..self.config.num_runs as u64)
            .map(|i| self.config.first_seed + i)
            .collect();

        let progress = if self.config.show_progress {
            ProgressBar::new(seeds.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} runs") {
            progress.set_style(style);
        }

        let run_seed = |seed: u64| -> Result<Solution> {
            let config = WhaleConfig { seed, ..self.config.whale.clone() };
            let solution = WhaleOptimization::new(graph, start, end, config)?.run();
            progress.inc(1);
            solution
        };

        let solutions: Vec<Result<Solution>> = if self.config.parallel {
            seeds.par_iter().map(|&seed| run_seed(seed)).collect()
        } else {
            seeds.iter().map(|&seed| run_seed(seed)).collect()
        };
        progress.finish_and_clear();

        for solution in solutions {
            let solution = solution?;
            self.results.push(RunResult::from_solution(graph, start, end, optimum, &solution));
        }

        Ok(())
    }

    /// Compute statistics over the recorded runs
    pub fn compute_statistics(&self) -> Option<BenchmarkStatistics> {
        if self.results.is_empty() {
            return None;
        }

        let costs: Vec<f64> = self.results.iter().map(|r| r.cost).collect();
        let gaps: Vec<f64> = self.results.iter().map(|r| r.gap).collect();
        let times: Vec<f64> = self.results.iter().map(|r| r.time).collect();
        let converged: Vec<f64> = self.results.iter().map(|r| r.converged_at as f64).collect();

        let std_cost = if costs.len() > 1 { costs.iter().std_dev() } else { 0.0 };

        Some(BenchmarkStatistics {
            num_runs: self.results.len(),
            num_optimal: self.results.iter().filter(|r| r.optimal).count(),
            avg_cost: costs.iter().mean(),
            std_cost,
            best_cost: costs.iter().cloned().fold(f64::INFINITY, f64::min),
            worst_cost: costs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            optimum: self.results[0].optimum,
            avg_gap: gaps.iter().mean(),
            avg_converged_at: converged.iter().mean(),
            avg_time: times.iter().mean(),
            total_time: times.iter().sum(),
        })
    }

    /// Export per-run results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export aggregated statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        if let Some(stats) = self.compute_statistics() {
            writer.serialize(stats)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       Whale Route Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));

        let Some(stats) = self.compute_statistics() else {
            report.push_str("No runs recorded.\n");
            return report;
        };

        let first = &self.results[0];
        report.push_str(&format!("Route: {} -> {}\n", first.start, first.end));
        report.push_str(&format!(
            "Whales: {} | Iterations: {}\n",
            self.config.whale.num_whales, self.config.whale.max_iterations
        ));
        report.push_str("-".repeat(60).as_str());
        report.push('\n');
        report.push_str(&format!("{:<28} {:>12}\n", "Runs", stats.num_runs));
        report.push_str(&format!("{:<28} {:>12}\n", "Optimal runs", format!("{}/{}", stats.num_optimal, stats.num_runs)));
        report.push_str(&format!("{:<28} {:>12.2}\n", "Exact optimum", stats.optimum));
        report.push_str(&format!("{:<28} {:>12.2}\n", "Best cost", stats.best_cost));
        report.push_str(&format!("{:<28} {:>12.2}\n", "Average cost", stats.avg_cost));
        report.push_str(&format!("{:<28} {:>12.2}\n", "Worst cost", stats.worst_cost));
        report.push_str(&format!("{:<28} {:>12.2}\n", "Std dev", stats.std_cost));
        report.push_str(&format!("{:<28} {:>11.2}%\n", "Average gap", stats.avg_gap));
        report.push_str(&format!("{:<28} {:>12.2}\n", "Average convergence iter.", stats.avg_converged_at));
        report.push_str(&format!("{:<28} {:>11.4}s\n", "Average time", stats.avg_time));
        report.push_str("-".repeat(60).as_str());
        report.push('\n');

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}
