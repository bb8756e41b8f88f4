//! Topology input: the declarative description of an architecture.
//!
//! A [`Topology`] is what clients submit: a list of blocks, a list of
//! weighted edges, and the synthetic load (`rps`, `read_ratio`). It can be
//! deserialized from JSON or YAML (with format auto-detection for files)
//! or built programmatically with [`TopologyBuilder`].
//!
//! ```
//! use archsim::topology::Topology;
//!
//! let topo = Topology::from_json(r#"{
//!     "blocks": [
//!         {"id": "u", "kind": "user"},
//!         {"id": "api", "kind": "service", "name": "checkout"}
//!     ],
//!     "edges": [{"from": "u", "to": "api"}],
//!     "rps": 1000,
//!     "read_ratio": 0.9
//! }"#).unwrap();
//! assert_eq!(topo.blocks.len(), 2);
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// One block instance in a topology.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopoBlock {
    /// Stable instance id, unique within the topology.
    pub id: String,

    /// Kind identifier. Unregistered kinds are accepted and behave as
    /// infinite passthrough.
    pub kind: String,

    /// Optional display name; falls back to the kind's catalog name.
    #[serde(default)]
    pub name: Option<String>,

    /// Replica count, defaulting to 1.
    #[serde(default)]
    pub replicas: Option<u32>,

    /// Shard count, defaulting to 1.
    #[serde(default)]
    pub shards: Option<u32>,

    /// Core-count override; 0 or absent uses the kind's profile.
    #[serde(default)]
    pub cpu_cores: Option<u32>,
}

/// A weighted directed edge between two blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopoEdge {
    /// Source block id.
    pub from: String,
    /// Destination block id.
    pub to: String,
    /// Relative traffic share; values ≤ 0 (and absent) normalize to 1.0.
    #[serde(default)]
    pub weight: Option<f64>,
}

/// A complete topology submission.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Topology {
    /// Block instances.
    #[serde(default)]
    pub blocks: Vec<TopoBlock>,

    /// Directed edges.
    #[serde(default)]
    pub edges: Vec<TopoEdge>,

    /// Source request rate in requests per second.
    #[serde(default)]
    pub rps: f64,

    /// Fraction of traffic that is reads, in `[0, 1]`.
    #[serde(default)]
    pub read_ratio: f64,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a topology from a JSON string and validates it.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let topo: Self = serde_json::from_str(json)?;
        topo.validate()?;
        Ok(topo)
    }

    /// Parses a topology from a YAML string and validates it.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let topo: Self = serde_yaml::from_str(yaml)?;
        topo.validate()?;
        Ok(topo)
    }

    /// Loads a topology from a file, auto-detecting the format from the
    /// extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext.to_lowercase().as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            other => Err(SimError::UnknownFormat(other.to_string())),
        }
    }

    /// Checks the input-level invariants: unique block ids and a read
    /// ratio inside `[0, 1]`. Graph-level invariants (edge endpoints,
    /// cycles) are checked when the graph is built.
    pub fn validate(&self) -> SimResult<()> {
        if !(0.0..=1.0).contains(&self.read_ratio) {
            return Err(SimError::ReadRatioOutOfRange {
                value: self.read_ratio,
            });
        }

        let mut seen = HashSet::new();
        for block in &self.blocks {
            if !seen.insert(block.id.as_str()) {
                return Err(SimError::DuplicateBlockId {
                    id: block.id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Fluent builder for constructing topologies in code.
#[derive(Default)]
pub struct TopologyBuilder {
    topo: Topology,
}

impl TopologyBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block of the given kind.
    pub fn block(mut self, id: impl Into<String>, kind: impl Into<String>) -> Self {
        self.topo.blocks.push(TopoBlock {
            id: id.into(),
            kind: kind.into(),
            name: None,
            replicas: None,
            shards: None,
            cpu_cores: None,
        });
        self
    }

    /// Adds a named block.
    pub fn named_block(
        mut self,
        id: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.topo.blocks.push(TopoBlock {
            id: id.into(),
            kind: kind.into(),
            name: Some(name.into()),
            replicas: None,
            shards: None,
            cpu_cores: None,
        });
        self
    }

    /// Adds an unweighted edge.
    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.topo.edges.push(TopoEdge {
            from: from.into(),
            to: to.into(),
            weight: None,
        });
        self
    }

    /// Adds a weighted edge.
    pub fn weighted_edge(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.topo.edges.push(TopoEdge {
            from: from.into(),
            to: to.into(),
            weight: Some(weight),
        });
        self
    }

    /// Sets the source load.
    pub fn load(mut self, rps: f64, read_ratio: f64) -> Self {
        self.topo.rps = rps;
        self.topo.read_ratio = read_ratio;
        self
    }

    /// Validates and returns the topology.
    pub fn build(self) -> SimResult<Topology> {
        self.topo.validate()?;
        Ok(self.topo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_parsing_defaults() {
        let topo = Topology::from_json(
            r#"{
                "blocks": [{"id": "a", "kind": "service"}],
                "edges": [],
                "rps": 500,
                "read_ratio": 1.0
            }"#,
        )
        .unwrap();
        assert_eq!(topo.blocks[0].replicas, None);
        assert_eq!(topo.rps, 500.0);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
blocks:
  - id: u
    kind: user
  - id: db
    kind: sql_datastore
    cpu_cores: 16
edges:
  - from: u
    to: db
    weight: 1.0
rps: 2000
read_ratio: 0.7
"#;
        let topo = Topology::from_yaml(yaml).unwrap();
        assert_eq!(topo.blocks.len(), 2);
        assert_eq!(topo.blocks[1].cpu_cores, Some(16));
        assert_eq!(topo.edges[0].weight, Some(1.0));
    }

    #[test]
    fn test_read_ratio_range_rejected() {
        let result = Topology::from_json(
            r#"{"blocks": [], "edges": [], "rps": 0, "read_ratio": 1.5}"#,
        );
        assert!(matches!(
            result,
            Err(SimError::ReadRatioOutOfRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_block_id_rejected() {
        let result = TopologyBuilder::new()
            .block("a", "service")
            .block("a", "redis")
            .build();
        assert!(matches!(result, Err(SimError::DuplicateBlockId { .. })));
    }

    #[test]
    fn test_builder() {
        let topo = TopologyBuilder::new()
            .block("u", "user")
            .named_block("svc", "service", "checkout")
            .weighted_edge("u", "svc", 0.5)
            .load(1000.0, 0.9)
            .build()
            .unwrap();

        assert_eq!(topo.blocks.len(), 2);
        assert_eq!(topo.blocks[1].name.as_deref(), Some("checkout"));
        assert_eq!(topo.edges[0].weight, Some(0.5));
        assert_eq!(topo.read_ratio, 0.9);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let topo = TopologyBuilder::new()
            .block("u", "user")
            .block("svc", "service")
            .edge("u", "svc")
            .load(100.0, 0.5)
            .build()
            .unwrap();

        let json = serde_json::to_string(&topo).unwrap();
        let restored = Topology::from_json(&json).unwrap();
        assert_eq!(restored.blocks.len(), topo.blocks.len());
        assert_eq!(restored.read_ratio, topo.read_ratio);
    }
}
