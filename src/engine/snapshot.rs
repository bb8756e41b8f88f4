//! Stateless propagation for one-shot topology queries.
//!
//! Traffic flows through the graph in topological order; each node's
//! outgoing edges split its rate by normalized weight. No queues, no
//! per-kind dynamics — this answers "what would utilization look like at
//! this rate" without running a simulation.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::engine::capacity::compute_block;
use crate::engine::BlockResult;
use crate::error::{SimResult, TopologyError};
use crate::graph::Graph;
use crate::topology::Topology;

/// Response wrapper for snapshot queries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotResult {
    /// Per-node results in topological order.
    pub blocks: Vec<BlockResult>,
}

/// Propagates `rps` from every source through the graph and computes
/// per-node utilization. Each source receives the full rate.
pub fn simulate(
    catalog: &Catalog,
    graph: &Graph,
    rps: f64,
    read_ratio: f64,
) -> Result<Vec<BlockResult>, TopologyError> {
    let order = graph.topo_order()?;

    let mut incoming: std::collections::HashMap<&str, f64> =
        std::collections::HashMap::with_capacity(graph.len());
    for src in graph.sources() {
        incoming.insert(src.id.as_str(), rps);
    }

    let mut results = Vec::with_capacity(order.len());
    for id in order {
        let node = graph.node(id).expect("topo order yields known nodes");
        let node_rps = incoming.get(id).copied().unwrap_or(0.0);

        results.push(compute_block(catalog, node, node_rps, read_ratio));

        let total_weight = node.total_out_weight();
        for edge in &node.outgoing {
            *incoming.entry(edge.to.as_str()).or_insert(0.0) +=
                node_rps * edge.weight / total_weight;
        }
    }
    Ok(results)
}

/// Validates a topology, builds its graph, and runs the stateless
/// simulator — the whole snapshot-query surface in one call.
pub fn snapshot(catalog: &Catalog, topo: &Topology) -> SimResult<SnapshotResult> {
    topo.validate()?;
    let graph = Graph::build(topo)?;
    let blocks = simulate(catalog, &graph, topo.rps, topo.read_ratio)?;
    Ok(SnapshotResult { blocks })
}
