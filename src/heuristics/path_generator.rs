//! Candidate path generation.
//!
//! The whale search proposes candidates by taking a shortest path and
//! visiting its interior nodes in a random order. Only permutations whose
//! hops all exist in the graph are accepted.

use crate::graph::Graph;
use crate::heuristics::shortest_path::shortest_path;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

pub trait PathGenerator {
    /// Propose a start→end path, or `None` when no route exists
    fn generate(&self, graph: &Graph, start: usize, end: usize, rng: &mut ChaCha8Rng) -> Option<Vec<usize>>;
    fn name(&self) -> &str;
}

/// Shortest path with its interior nodes shuffled.
///
/// A shuffled order is kept only if every hop is an edge of the graph.
/// After `max_attempts` rejected shuffles the unshuffled shortest path is
/// returned, so every emitted path is valid.
pub struct ShuffledShortestPath {
    pub max_attempts: usize,
}

impl ShuffledShortestPath {
    pub fn new() -> Self {
        ShuffledShortestPath { max_attempts: 16 }
    }

    pub fn with_attempts(max_attempts: usize) -> Self {
        ShuffledShortestPath { max_attempts }
    }
}

impl Default for ShuffledShortestPath {
    fn default() -> Self {
        Self::new()
    }
}

impl PathGenerator for ShuffledShortestPath {
    fn generate(&self, graph: &Graph, start: usize, end: usize, rng: &mut ChaCha8Rng) -> Option<Vec<usize>> {
        let base = shortest_path(graph, start, end)?;

        // Nothing to permute with fewer than two interior nodes
        if base.len() < 4 {
            return Some(base);
        }

        let last = base.len() - 1;
        let mut candidate = base.clone();
        for attempt in 0..self.max_attempts {
            candidate[1..last].shuffle(rng);
            if graph.is_valid_path(&candidate) {
                return Some(candidate);
            }
            log::trace!(
                "Rejected permutation {:?} (attempt {}/{})",
                candidate, attempt + 1, self.max_attempts
            );
            candidate.copy_from_slice(&base);
        }

        Some(base)
    }

    fn name(&self) -> &str {
        "ShuffledShortestPath"
    }
}
