//! Error types for taxa

use thiserror::Error;

/// Result type alias for taxa operations
pub type Result<T> = std::result::Result<T, TaxaError>;

/// Main error type for taxa
#[derive(Error, Debug)]
pub enum TaxaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Delimited file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Graft rejected: {0}")]
    Graft(#[from] GraftError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TaxaError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Validation failures of a custom taxonomy graft.
///
/// Any of these aborts the whole graft before a single row is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraftError {
    /// A connected component has zero or several nodes without a parent
    #[error("component containing '{component}' has {} roots {roots:?}, expected exactly one", .roots.len())]
    AmbiguousRoot { component: String, roots: Vec<String> },

    /// The attachment point is not a single live taxon in the store
    #[error("root '{root}' is not an existing taxon")]
    UnknownRoot { root: String },

    /// The component below the root is not an arborescence
    #[error("component rooted at '{root}' is not a tree: {reason}")]
    NotATree { root: String, reason: String },
}
