//! Error types for the simulator engine.
//!
//! Errors are split into two layers so a transport can map them to status
//! codes without string matching: [`TopologyError`] covers violations of
//! graph invariants (reject the topology), while [`SimError`] adds the
//! malformed-input class (bad JSON/YAML, out-of-range parameters).

use thiserror::Error;

/// Violations of the topology invariants.
///
/// A topology that parses cleanly can still be rejected here: edges must
/// reference declared blocks and the graph must be acyclic.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// An edge references a block id that was never declared.
    #[error("unknown block {id:?} referenced by edge")]
    UnknownEndpoint {
        /// The undeclared block id.
        id: String,
    },

    /// The graph contains a cycle (self-loops included).
    #[error("cycle detected in topology")]
    Cycle,
}

/// Top-level error type for engine operations.
#[derive(Debug, Error)]
pub enum SimError {
    /// IO error while loading a topology file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Topology file with an extension that is neither JSON nor YAML.
    #[error("unknown topology file format: {0:?}")]
    UnknownFormat(String),

    /// `read_ratio` outside `[0, 1]`.
    #[error("read_ratio {value} is out of range [0, 1]")]
    ReadRatioOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// A block id declared more than once.
    #[error("duplicate block id {id:?}")]
    DuplicateBlockId {
        /// The repeated id.
        id: String,
    },

    /// A graph invariant was violated.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl SimError {
    /// True for malformed input: the request itself is unparseable or
    /// carries out-of-range values (maps to 400).
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Json(_)
                | Self::Yaml(_)
                | Self::UnknownFormat(_)
                | Self::ReadRatioOutOfRange { .. }
                | Self::DuplicateBlockId { .. }
        )
    }

    /// True for well-formed input that violates a graph invariant
    /// (maps to 422).
    #[must_use]
    pub const fn is_topology(&self) -> bool {
        matches!(self, Self::Topology(_))
    }
}

/// Result type alias for engine operations.
pub type SimResult<T> = Result<T, SimError>;
