//! Heuristics module for route search.
//! 
//! This module exports the shortest-path routine, the candidate generators
//! and the whale population search built on top of them.

pub mod shortest_path;
pub mod path_generator;
pub mod whale;

pub use shortest_path::*;
pub use path_generator::*;
pub use whale::*;
