//! Error types for route search.

use thiserror::Error;

/// Result type alias for route search operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No path connects the two endpoints.
    #[error("no feasible route from '{start}' to '{end}'")]
    NoRoute { start: String, end: String },

    /// Two consecutive path nodes are not joined by an edge.
    #[error("missing edge between '{from}' and '{to}'")]
    InvalidEdge { from: String, to: String },

    /// A path that cannot be evaluated at all (e.g. fewer than two nodes).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Bad run parameters or an inconsistent graph definition.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}
