//! Module for building and representing weighted road networks.
//!
//! A network is a set of named nodes joined by undirected, positively weighted
//! edges. Networks are built in code or loaded from JSON definitions, and are
//! only read once handed to the search.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One undirected edge in a graph file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

/// Serialized form of a network, as stored in JSON graph files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Name of the network
    #[serde(default)]
    pub name: String,
    /// Node names; their order defines node ids and the menu numbering
    pub nodes: Vec<String>,
    /// Undirected weighted edges between named nodes
    pub edges: Vec<EdgeDefinition>,
}

/// Weighted undirected graph with named nodes.
///
/// Node ids are dense indices in insertion order. Neighbor lists keep edge
/// insertion order, which keeps shortest-path tie breaking reproducible.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Name of the network
    pub name: String,
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
    edges: Vec<(usize, usize, f64)>,
}

impl Graph {
    /// Create an empty graph
    pub fn new(name: &str) -> Self {
        Graph {
            name: name.to_string(),
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node and return its id
    pub fn add_node(&mut self, name: &str) -> Result<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::config("node names must not be empty"));
        }
        if self.index.contains_key(name) {
            return Err(Error::config(format!("duplicate node '{}'", name)));
        }

        let id = self.nodes.len();
        self.nodes.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        Ok(id)
    }

    /// Add an undirected edge between two existing nodes
    pub fn add_edge(&mut self, a: usize, b: usize, weight: f64) -> Result<()> {
        if a >= self.nodes.len() || b >= self.nodes.len() {
            return Err(Error::config(format!("edge ({}, {}) references an unknown node id", a, b)));
        }
        if a == b {
            return Err(Error::config(format!("self loop on '{}'", self.nodes[a])));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::config(format!(
                "edge '{}'-'{}' has non-positive weight {}",
                self.nodes[a], self.nodes[b], weight
            )));
        }
        if self.weight(a, b).is_some() {
            return Err(Error::config(format!(
                "duplicate edge '{}'-'{}'",
                self.nodes[a], self.nodes[b]
            )));
        }

        self.adjacency[a].push((b, weight));
        self.adjacency[b].push((a, weight));
        self.edges.push((a, b, weight));
        Ok(())
    }

    /// Add an undirected edge between two nodes given by name
    pub fn connect(&mut self, from: &str, to: &str, weight: f64) -> Result<()> {
        let a = self.node_id(from)?;
        let b = self.node_id(to)?;
        self.add_edge(a, b, weight)
    }

    /// Build and validate a graph from its serialized definition
    pub fn from_definition(definition: &GraphDefinition) -> Result<Self> {
        let mut graph = Graph::new(&definition.name);
        for name in &definition.nodes {
            graph.add_node(name)?;
        }
        for edge in &definition.edges {
            graph.connect(&edge.from, &edge.to, edge.weight).map_err(|e| match e {
                Error::UnknownNode(name) => Error::config(format!(
                    "edge '{}'-'{}' references unknown node '{}'",
                    edge.from, edge.to, name
                )),
                other => other,
            })?;
        }
        Ok(graph)
    }

    /// Load a graph from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let definition: GraphDefinition = serde_json::from_reader(BufReader::new(file))?;
        let mut graph = Self::from_definition(&definition)?;
        if graph.name.is_empty() {
            graph.name = path.as_ref()
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
        }
        Ok(graph)
    }

    /// Serialized form of this graph
    pub fn to_definition(&self) -> GraphDefinition {
        GraphDefinition {
            name: self.name.clone(),
            nodes: self.nodes.clone(),
            edges: self.edges.iter()
                .map(|&(a, b, weight)| EdgeDefinition {
                    from: self.nodes[a].clone(),
                    to: self.nodes[b].clone(),
                    weight,
                })
                .collect(),
        }
    }

    /// Road network of northern Baja California, distances in km
    pub fn baja_california() -> Self {
        const CITIES: [&str; 8] = [
            "Tijuana", "Rosarito", "Ensenada", "Tecate",
            "Mexicali", "San Felipe", "San Quintín", "Guerrero Negro",
        ];
        const ROADS: [(usize, usize, f64); 10] = [
            (0, 3, 52.0),
            (0, 1, 20.0),
            (1, 2, 85.0),
            (3, 4, 135.0),
            (4, 5, 197.0),
            (2, 6, 185.0),
            (2, 5, 246.0),
            (6, 7, 425.0),
            (5, 7, 394.0),
            (2, 3, 100.0),
        ];

        let mut graph = Graph::new("Baja California");
        for city in CITIES {
            graph.nodes.push(city.to_string());
            graph.index.insert(city.to_string(), graph.adjacency.len());
            graph.adjacency.push(Vec::new());
        }
        for (a, b, weight) in ROADS {
            graph.adjacency[a].push((b, weight));
            graph.adjacency[b].push((a, weight));
            graph.edges.push((a, b, weight));
        }
        graph
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Node names in id order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Edges as (a, b, weight) in insertion order
    pub fn edges(&self) -> &[(usize, usize, f64)] {
        &self.edges
    }

    #[inline]
    pub fn contains(&self, id: usize) -> bool {
        id < self.nodes.len()
    }

    /// Name of a node. Panics on an out-of-range id.
    #[inline]
    pub fn node_name(&self, id: usize) -> &str {
        &self.nodes[id]
    }

    /// Look up a node id by name
    pub fn node_id(&self, name: &str) -> Result<usize> {
        self.index.get(name.trim())
            .copied()
            .ok_or_else(|| Error::UnknownNode(name.to_string()))
    }

    /// Neighbors of a node with the connecting edge weight
    #[inline]
    pub fn neighbors(&self, id: usize) -> &[(usize, f64)] {
        &self.adjacency[id]
    }

    /// Weight of the edge between two nodes, if any
    pub fn weight(&self, a: usize, b: usize) -> Option<f64> {
        self.adjacency.get(a)?
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, w)| w)
    }

    /// Sum of edge weights along consecutive pairs of a path
    pub fn path_cost(&self, path: &[usize]) -> Result<f64> {
        if path.len() < 2 {
            return Err(Error::InvalidPath(format!(
                "a path needs at least two nodes, got {}",
                path.len()
            )));
        }
        if let Some(&bad) = path.iter().find(|&&n| !self.contains(n)) {
            return Err(Error::InvalidPath(format!("node id {} is not in the graph", bad)));
        }

        let mut cost = 0.0;
        for pair in path.windows(2) {
            let weight = self.weight(pair[0], pair[1]).ok_or_else(|| Error::InvalidEdge {
                from: self.nodes[pair[0]].clone(),
                to: self.nodes[pair[1]].clone(),
            })?;
            cost += weight;
        }
        Ok(cost)
    }

    /// Check that every consecutive pair of a path is joined by an edge
    pub fn is_valid_path(&self, path: &[usize]) -> bool {
        path.len() >= 2
            && path.iter().all(|&n| self.contains(n))
            && path.windows(2).all(|pair| self.weight(pair[0], pair[1]).is_some())
    }

    /// Node names along a path
    pub fn path_names(&self, path: &[usize]) -> Vec<&str> {
        path.iter().map(|&n| self.node_name(n)).collect()
    }

    /// Whether every node can be reached from node 0
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        while let Some(node) = queue.pop_front() {
            for &(next, _) in &self.adjacency[node] {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Get statistics about the graph
    pub fn statistics(&self) -> GraphStatistics {
        let degrees: Vec<usize> = self.adjacency.iter().map(|a| a.len()).collect();
        let weights: Vec<f64> = self.edges.iter().map(|&(_, _, w)| w).collect();

        let n = self.nodes.len();
        let avg_degree = if n > 0 {
            degrees.iter().sum::<usize>() as f64 / n as f64
        } else {
            0.0
        };
        let total_weight: f64 = weights.iter().sum();
        let avg_weight = if weights.is_empty() { 0.0 } else { total_weight / weights.len() as f64 };
        let density = if n > 1 {
            2.0 * self.edges.len() as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };

        GraphStatistics {
            name: self.name.clone(),
            num_nodes: n,
            num_edges: self.edges.len(),
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            avg_degree,
            min_weight: if weights.is_empty() {
                0.0
            } else {
                weights.iter().cloned().fold(f64::INFINITY, f64::min)
            },
            max_weight: weights.iter().cloned().fold(0.0, f64::max),
            avg_weight,
            total_weight,
            density,
            connected: self.is_connected(),
        }
    }
}

/// Statistics about a road network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub name: String,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub min_degree: usize,
    pub max_degree: usize,
    pub avg_degree: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    pub avg_weight: f64,
    pub total_weight: f64,
    pub density: f64,
    pub connected: bool,
}

impl std::fmt::Display for GraphStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph: {}", self.name)?;
        writeln!(f, "  Nodes: {}", self.num_nodes)?;
        writeln!(f, "  Edges: {} (density {:.3})", self.num_edges, self.density)?;
        writeln!(f, "  Degree: min {} / avg {:.2} / max {}", self.min_degree, self.avg_degree, self.max_degree)?;
        writeln!(f, "  Weight: min {:.2} / avg {:.2} / max {:.2}", self.min_weight, self.avg_weight, self.max_weight)?;
        writeln!(f, "  Total weight: {:.2}", self.total_weight)?;
        writeln!(f, "  Connected: {}", self.connected)
    }
}
