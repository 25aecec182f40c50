//! Whale-inspired population search for low-cost routes.
//!
//! Each whale holds one candidate path. Every iteration, each whale draws a
//! fresh candidate from the path generator and keeps it only if it is strictly
//! cheaper (independent hill climbing per slot). The best path seen across the
//! whole run is tracked together with its per-iteration cost trace.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::heuristics::path_generator::{PathGenerator, ShuffledShortestPath};
use crate::solution::Solution;
use ordered_float::OrderedFloat;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Whale search configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhaleConfig {
    /// Number of whales (population size)
    pub num_whales: usize,
    /// Number of iterations
    pub max_iterations: usize,
    /// Random seed
    pub seed: u64,
    /// Shuffles tried per candidate before falling back to the plain shortest path
    pub max_shuffle_attempts: usize,
    /// Optional wall-clock cap in seconds
    pub time_limit: Option<f64>,
}

impl Default for WhaleConfig {
    fn default() -> Self {
        WhaleConfig {
            num_whales: 50,
            max_iterations: 100,
            seed: 42,
            max_shuffle_attempts: 16,
            time_limit: None,
        }
    }
}

/// A candidate path and its cost
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub path: Vec<usize>,
    pub cost: f64,
}

impl Candidate {
    /// Evaluate a path. Paths with a missing edge cost infinity so they are
    /// never selected.
    pub fn evaluate(graph: &Graph, path: Vec<usize>) -> Self {
        let cost = match graph.path_cost(&path) {
            Ok(cost) => cost,
            Err(e) => {
                log::warn!("Discarding candidate {:?}: {}", path, e);
                f64::INFINITY
            }
        };
        Candidate { path, cost }
    }

    pub fn is_valid(&self) -> bool {
        self.cost.is_finite()
    }
}

/// State of the population after one iteration, passed to observers
#[derive(Debug, Clone, Copy)]
pub struct IterationSnapshot<'a> {
    /// 0 for the initial population, then 1..=max_iterations
    pub iteration: usize,
    pub population: &'a [Candidate],
    pub best: &'a Candidate,
    /// Slots replaced by a cheaper candidate during this iteration
    pub replacements: usize,
}

/// Whale search solver
pub struct WhaleOptimization<'g, G: PathGenerator = ShuffledShortestPath> {
    config: WhaleConfig,
    graph: &'g Graph,
    start: usize,
    end: usize,
    generator: G,
    rng: ChaCha8Rng,
}

impl<'g> WhaleOptimization<'g, ShuffledShortestPath> {
    pub fn new(graph: &'g Graph, start: usize, end: usize, config: WhaleConfig) -> Result<Self> {
        let generator = ShuffledShortestPath::with_attempts(config.max_shuffle_attempts);
        Self::with_generator(graph, start, end, config, generator)
    }
}

impl<'g, G: PathGenerator> WhaleOptimization<'g, G> {
    /// Create a solver with a custom candidate generator
    pub fn with_generator(
        graph: &'g Graph,
        start: usize,
        end: usize,
        config: WhaleConfig,
        generator: G,
    ) -> Result<Self> {
        validate(graph, start, end, &config)?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(WhaleOptimization {
            config,
            graph,
            start,
            end,
            generator,
            rng,
        })
    }

    pub fn config(&self) -> &WhaleConfig {
        &self.config
    }

    /// Run the search
    pub fn run(&mut self) -> Result<Solution> {
        self.run_with_observer(|_| {})
    }

    /// Run the search, reporting the population after initialization and
    /// after every iteration
    pub fn run_with_observer<F>(&mut self, mut observer: F) -> Result<Solution>
    where
        F: FnMut(&IterationSnapshot<'_>),
    {
        let start_time = Instant::now();
        let graph = self.graph;

        log::info!(
            "Whale search {} -> {} ({} whales, {} iterations, seed {})",
            graph.node_name(self.start),
            graph.node_name(self.end),
            self.config.num_whales,
            self.config.max_iterations,
            self.config.seed
        );

        let mut population = self.initial_population()?;
        let mut best = match best_of(&population) {
            Some(candidate) => candidate.clone(),
            None => return Err(self.no_route()),
        };
        let mut history = Vec::with_capacity(self.config.max_iterations + 1);
        history.push(best.cost);

        observer(&IterationSnapshot {
            iteration: 0,
            population: &population,
            best: &best,
            replacements: 0,
        });

        let mut iteration = 0;
        while iteration < self.config.max_iterations {
            if let Some(limit) = self.config.time_limit {
                if start_time.elapsed().as_secs_f64() >= limit {
                    log::warn!("Time limit of {:.2}s reached after {} iterations", limit, iteration);
                    break;
                }
            }

            let mut replacements = 0;
            for whale in population.iter_mut() {
                let Some(path) = self.generator.generate(graph, self.start, self.end, &mut self.rng) else {
                    continue;
                };
                let candidate = Candidate::evaluate(graph, path);
                if candidate.cost < whale.cost {
                    *whale = candidate;
                    replacements += 1;
                }
            }

            if let Some(current) = best_of(&population) {
                if current.cost < best.cost {
                    log::debug!(
                        "Iteration {}: best cost {:.2} -> {:.2}",
                        iteration + 1, best.cost, current.cost
                    );
                    best = current.clone();
                }
            }
            history.push(best.cost);
            iteration += 1;

            observer(&IterationSnapshot {
                iteration,
                population: &population,
                best: &best,
                replacements,
            });
        }

        let solution = Solution {
            path: best.path,
            cost: best.cost,
            history,
            algorithm: format!("WOA[{}]", self.generator.name()),
            seed: self.config.seed,
            iterations: iteration,
            computation_time: start_time.elapsed().as_secs_f64(),
        };

        log::info!(
            "Best cost {:.2} after {} iterations ({:.4}s)",
            solution.cost, solution.iterations, solution.computation_time
        );

        Ok(solution)
    }

    /// Seed the population, dropping missing routes and invalid candidates
    fn initial_population(&mut self) -> Result<Vec<Candidate>> {
        let graph = self.graph;
        let mut population = Vec::with_capacity(self.config.num_whales);

        for _ in 0..self.config.num_whales {
            if let Some(path) = self.generator.generate(graph, self.start, self.end, &mut self.rng) {
                let candidate = Candidate::evaluate(graph, path);
                if candidate.is_valid() {
                    population.push(candidate);
                }
            }
        }

        if population.is_empty() {
            return Err(self.no_route());
        }
        if population.len() < self.config.num_whales {
            log::warn!(
                "Only {}/{} whales received a valid initial route",
                population.len(), self.config.num_whales
            );
        }

        Ok(population)
    }

    fn no_route(&self) -> Error {
        Error::NoRoute {
            start: self.graph.node_name(self.start).to_string(),
            end: self.graph.node_name(self.end).to_string(),
        }
    }
}

/// First minimum-cost candidate
fn best_of(population: &[Candidate]) -> Option<&Candidate> {
    population.iter().min_by_key(|c| OrderedFloat(c.cost))
}

fn validate(graph: &Graph, start: usize, end: usize, config: &WhaleConfig) -> Result<()> {
    if config.num_whales == 0 {
        return Err(Error::config("population size must be positive"));
    }
    if !graph.contains(start) {
        return Err(Error::config(format!("start node id {} is not in the graph", start)));
    }
    if !graph.contains(end) {
        return Err(Error::config(format!("end node id {} is not in the graph", end)));
    }
    if start == end {
        return Err(Error::config(format!(
            "start and end must differ (both are '{}')",
            graph.node_name(start)
        )));
    }
    if let Some(limit) = config.time_limit {
        if !(limit > 0.0) {
            return Err(Error::config(format!("time limit must be positive, got {}", limit)));
        }
    }
    Ok(())
}

/// Run a whale search from `start` to `end`
pub fn optimize(graph: &Graph, start: usize, end: usize, config: &WhaleConfig) -> Result<Solution> {
    WhaleOptimization::new(graph, start, end, config.clone())?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> Graph {
        let mut graph = Graph::new("test");
        for name in ["A", "B", "C"] {
            graph.add_node(name).unwrap();
        }
        graph.connect("A", "B", 1.0).unwrap();
        graph.connect("B", "C", 1.0).unwrap();
        graph
    }

    /// Alternates between a path with a missing edge and a valid one
    struct Flaky {
        calls: std::cell::Cell<usize>,
    }

    impl PathGenerator for Flaky {
        fn generate(&self, _graph: &Graph, start: usize, end: usize, _rng: &mut ChaCha8Rng) -> Option<Vec<usize>> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if call % 2 == 0 {
                Some(vec![start, end])
            } else {
                Some(vec![start, 1, end])
            }
        }

        fn name(&self) -> &str {
            "Flaky"
        }
    }

    #[test]
    fn test_whale_search() {
        let graph = create_test_graph();
        let config = WhaleConfig {
            num_whales: 5,
            max_iterations: 2,
            ..Default::default()
        };

        let solution = optimize(&graph, 0, 2, &config).unwrap();

        assert_eq!(solution.path, vec![0, 1, 2]);
        assert!((solution.cost - 2.0).abs() < 1e-10);
        assert_eq!(solution.history.len(), 3);
        assert_eq!(solution.iterations, 2);
    }

    #[test]
    fn test_zero_iterations() {
        let graph = create_test_graph();
        let config = WhaleConfig { num_whales: 3, max_iterations: 0, ..Default::default() };

        let solution = optimize(&graph, 2, 0, &config).unwrap();
        assert_eq!(solution.history, vec![2.0]);
        assert_eq!(solution.path, vec![2, 1, 0]);
    }

    #[test]
    fn test_configuration_errors() {
        let graph = create_test_graph();

        let empty = WhaleConfig { num_whales: 0, ..Default::default() };
        assert!(matches!(optimize(&graph, 0, 2, &empty), Err(Error::Configuration(_))));

        let config = WhaleConfig::default();
        assert!(matches!(optimize(&graph, 1, 1, &config), Err(Error::Configuration(_))));
        assert!(matches!(optimize(&graph, 0, 5, &config), Err(Error::Configuration(_))));
        assert!(matches!(optimize(&graph, 5, 0, &config), Err(Error::Configuration(_))));

        let bad_limit = WhaleConfig { time_limit: Some(0.0), ..Default::default() };
        assert!(matches!(optimize(&graph, 0, 2, &bad_limit), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_no_route() {
        let mut graph = create_test_graph();
        graph.add_node("D").unwrap();

        let result = optimize(&graph, 0, 3, &WhaleConfig::default());
        assert!(matches!(result, Err(Error::NoRoute { .. })));
    }

    #[test]
    fn test_invalid_candidates_never_selected() {
        let graph = create_test_graph();
        let config = WhaleConfig { num_whales: 4, max_iterations: 10, seed: 5, ..Default::default() };

        let flaky = Flaky { calls: std::cell::Cell::new(0) };
        let mut woa = WhaleOptimization::with_generator(&graph, 0, 2, config, flaky).unwrap();
        let mut sizes = Vec::new();
        let solution = woa.run_with_observer(|s| sizes.push(s.population.len())).unwrap();

        // Broken seeds are filtered out at initialization
        assert!(sizes.iter().all(|&n| n == 2));

        assert_eq!(solution.path, vec![0, 1, 2]);
        assert!(solution.history.iter().all(|c| c.is_finite()));
        assert_eq!(solution.algorithm, "WOA[Flaky]");
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let graph = create_test_graph();
        let config = WhaleConfig { num_whales: 3, max_iterations: 4, ..Default::default() };

        let mut seen = Vec::new();
        let mut woa = WhaleOptimization::new(&graph, 0, 2, config).unwrap();
        woa.run_with_observer(|snapshot| {
            assert_eq!(snapshot.population.len(), 3);
            seen.push(snapshot.iteration);
        })
        .unwrap();

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_time_limit_stops_early() {
        let graph = Graph::baja_california();
        let config = WhaleConfig {
            num_whales: 5,
            max_iterations: 1_000_000,
            time_limit: Some(1e-9),
            ..Default::default()
        };

        let solution = optimize(&graph, 0, 7, &config).unwrap();
        assert!(solution.iterations < config.max_iterations);
        assert_eq!(solution.history.len(), solution.iterations + 1);
        assert!(solution.is_consistent(&graph, 0, 7));
    }
}
