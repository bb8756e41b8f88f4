//! The topology graph: block instances connected by weighted edges.
//!
//! Building a graph normalizes the raw topology (replicas/shards default
//! to 1, non-positive edge weights to 1.0) and rejects edges whose
//! endpoints were never declared. Topological ordering uses Kahn's
//! algorithm and rejects cycles; the emitted order is the traversal order
//! of the simulator.

use std::collections::HashMap;

use crate::error::TopologyError;
use crate::topology::Topology;

/// A weighted outgoing edge.
#[derive(Clone, Debug, PartialEq)]
pub struct OutEdge {
    /// Destination node id.
    pub to: String,
    /// Normalized weight (> 0).
    pub weight: f64,
}

/// One block instance in the graph.
#[derive(Clone, Debug)]
pub struct Node {
    /// Stable instance id.
    pub id: String,
    /// Kind identifier.
    pub kind: String,
    /// Display name; empty means "use the catalog name".
    pub name: String,
    /// Replica count (≥ 1).
    pub replicas: u32,
    /// Shard count (≥ 1).
    pub shards: u32,
    /// Core-count override; 0 means use the kind's profile.
    pub cpu_cores_override: u32,
    /// Outgoing edges in declaration order.
    pub outgoing: Vec<OutEdge>,
}

impl Node {
    /// Sum of outgoing edge weights. Zero for sinks.
    pub fn total_out_weight(&self) -> f64 {
        self.outgoing.iter().map(|e| e.weight).sum()
    }
}

/// A directed graph of block instances, insertion-ordered so that source
/// discovery and topological ordering are deterministic.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    in_degree: Vec<usize>,
}

impl Graph {
    /// Builds a graph from a topology, normalizing instance knobs and
    /// edge weights. Fails if an edge references an undeclared block.
    pub fn build(topo: &Topology) -> Result<Self, TopologyError> {
        let mut graph = Self {
            nodes: Vec::with_capacity(topo.blocks.len()),
            index: HashMap::with_capacity(topo.blocks.len()),
            in_degree: vec![0; topo.blocks.len()],
        };

        for block in &topo.blocks {
            let idx = graph.nodes.len();
            graph.nodes.push(Node {
                id: block.id.clone(),
                kind: block.kind.clone(),
                name: block.name.clone().unwrap_or_default(),
                replicas: block.replicas.unwrap_or(1).max(1),
                shards: block.shards.unwrap_or(1).max(1),
                cpu_cores_override: block.cpu_cores.unwrap_or(0),
                outgoing: Vec::new(),
            });
            graph.index.insert(block.id.clone(), idx);
        }

        for edge in &topo.edges {
            let from = *graph
                .index
                .get(edge.from.as_str())
                .ok_or_else(|| TopologyError::UnknownEndpoint {
                    id: edge.from.clone(),
                })?;
            let to = *graph
                .index
                .get(edge.to.as_str())
                .ok_or_else(|| TopologyError::UnknownEndpoint { id: edge.to.clone() })?;

            let weight = match edge.weight {
                Some(w) if w > 0.0 => w,
                _ => 1.0,
            };
            graph.nodes[from].outgoing.push(OutEdge {
                to: edge.to.clone(),
                weight,
            });
            graph.in_degree[to] += 1;
        }

        Ok(graph)
    }

    /// Returns a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Iterates over all nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes with zero in-degree, in declaration order. These receive the
    /// source request rate.
    pub fn sources(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| self.in_degree[*i] == 0)
            .map(|(_, n)| n)
            .collect()
    }

    /// Outgoing edges of a node in declaration order.
    pub fn downstream(&self, id: &str) -> &[OutEdge] {
        self.node(id).map(|n| n.outgoing.as_slice()).unwrap_or(&[])
    }

    /// Topological order over node ids (Kahn's algorithm). The queue is
    /// seeded with zero-in-degree nodes in declaration order, so the
    /// result is deterministic. Fails if the graph has a cycle;
    /// self-loops count.
    pub fn topo_order(&self) -> Result<Vec<&str>, TopologyError> {
        let mut in_degree = self.in_degree.clone();
        let mut queue: std::collections::VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(idx) = queue.pop_front() {
            order.push(self.nodes[idx].id.as_str());
            for edge in &self.nodes[idx].outgoing {
                let next = self.index[edge.to.as_str()];
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(TopologyError::Cycle);
        }
        Ok(order)
    }
}
