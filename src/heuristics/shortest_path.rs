//! Dijkstra shortest paths over a road network.

use crate::graph::Graph;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Shortest-path tree rooted at a source node
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    source: usize,
    dist: Vec<f64>,
    prev: Vec<Option<usize>>,
}

impl ShortestPaths {
    /// Run Dijkstra from `source`.
    ///
    /// Ties are broken by node id (heap order) and then by edge insertion
    /// order (a predecessor is only replaced on a strictly shorter distance),
    /// so the resulting tree depends on the graph alone.
    pub fn from_source(graph: &Graph, source: usize) -> Self {
        let n = graph.num_nodes();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev = vec![None; n];
        let mut heap = BinaryHeap::new();

        if source < n {
            dist[source] = 0.0;
            heap.push(Reverse((OrderedFloat(0.0), source)));
        }

        while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
            if cost > dist[node] {
                continue;
            }

            for &(next, weight) in graph.neighbors(node) {
                let next_cost = cost + weight;
                if next_cost < dist[next] {
                    dist[next] = next_cost;
                    prev[next] = Some(node);
                    heap.push(Reverse((OrderedFloat(next_cost), next)));
                }
            }
        }

        ShortestPaths { source, dist, prev }
    }

    /// Distance from the source, infinite when unreachable
    pub fn distance(&self, target: usize) -> f64 {
        self.dist.get(target).copied().unwrap_or(f64::INFINITY)
    }

    /// Path from the source to `target`, or `None` when unreachable
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        if !self.distance(target).is_finite() {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.prev[current]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// One shortest path from `start` to `end`, or `None` when no route exists
pub fn shortest_path(graph: &Graph, start: usize, end: usize) -> Option<Vec<usize>> {
    if !graph.contains(start) || !graph.contains(end) {
        return None;
    }
    ShortestPaths::from_source(graph, start).path_to(end)
}

/// Exact optimum cost from `start` to `end`, infinite when unreachable
pub fn shortest_distance(graph: &Graph, start: usize, end: usize) -> f64 {
    if !graph.contains(start) {
        return f64::INFINITY;
    }
    ShortestPaths::from_source(graph, start).distance(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_path_prefers_lower_weight() {
        let mut graph = Graph::new("triangle");
        for name in ["A", "B", "C"] {
            graph.add_node(name).unwrap();
        }
        graph.connect("A", "C", 10.0).unwrap();
        graph.connect("A", "B", 3.0).unwrap();
        graph.connect("B", "C", 4.0).unwrap();

        assert_eq!(shortest_path(&graph, 0, 2), Some(vec![0, 1, 2]));
        assert!((shortest_distance(&graph, 0, 2) - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_unreachable_target() {
        let mut graph = Graph::new("split");
        for name in ["A", "B", "C"] {
            graph.add_node(name).unwrap();
        }
        graph.connect("A", "B", 1.0).unwrap();

        assert_eq!(shortest_path(&graph, 0, 2), None);
        assert!(shortest_distance(&graph, 0, 2).is_infinite());
        assert_eq!(shortest_path(&graph, 0, 9), None);
    }

    #[test]
    fn test_baja_california_routes() {
        let graph = Graph::baja_california();
        let tijuana = graph.node_id("Tijuana").unwrap();
        let guerrero = graph.node_id("Guerrero Negro").unwrap();

        let path = shortest_path(&graph, tijuana, guerrero).unwrap();
        assert_eq!(
            graph.path_names(&path),
            vec!["Tijuana", "Rosarito", "Ensenada", "San Quintín", "Guerrero Negro"]
        );
        assert!((graph.path_cost(&path).unwrap() - 715.0).abs() < 1e-10);
    }

    #[test]
    fn test_tie_breaking_is_stable() {
        let mut graph = Graph::new("diamond");
        for name in ["A", "B", "C", "D"] {
            graph.add_node(name).unwrap();
        }
        graph.connect("A", "B", 1.0).unwrap();
        graph.connect("B", "D", 1.0).unwrap();
        graph.connect("A", "C", 1.0).unwrap();
        graph.connect("C", "D", 1.0).unwrap();

        let first = shortest_path(&graph, 0, 3).unwrap();
        for _ in 0..5 {
            assert_eq!(shortest_path(&graph, 0, 3).unwrap(), first);
        }
        assert_eq!(first, vec![0, 1, 3]);
    }
}
