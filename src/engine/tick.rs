//! The stateful tick simulator.
//!
//! One tick advances every node by `TICK_DT` seconds of simulated time:
//! queued plus arriving requests are served up to the node's effective
//! capacity, the remainder queues, and the processed share (minus cache
//! absorption) flows downstream along normalized edge weights.
//!
//! Effective capacity is the raw capacity degraded twice: a global
//! contention gate past 60% utilization (lock waits, context switches),
//! then the kind's own tick effect (cache warmup, pool exhaustion,
//! compaction pressure).

use std::collections::HashMap;

use crate::block::{TickContext, TickEffect};
use crate::catalog::Catalog;
use crate::engine::capacity::{compute_block, node_capacity};
use crate::engine::{BlockResult, SimState};
use crate::error::TopologyError;
use crate::graph::Graph;

/// Simulated seconds per tick.
pub const TICK_DT: f64 = 0.1;

/// Utilization past which the contention gate engages.
const CONTENTION_KNEE: f64 = 0.6;

/// Quadratic contention: gentle at 70% utilization, steep past 90%.
fn contention(util: f64) -> f64 {
    if util <= CONTENTION_KNEE {
        return 1.0;
    }
    let t = (util - CONTENTION_KNEE) / (1.0 - CONTENTION_KNEE);
    1.0 - 0.5 * t * t
}

/// Advances the simulation by one tick, mutating `state` and returning
/// per-node results in topological order.
pub fn simulate_tick(
    catalog: &Catalog,
    graph: &Graph,
    rps: f64,
    read_ratio: f64,
    state: &mut SimState,
) -> Result<Vec<BlockResult>, TopologyError> {
    let order = graph.topo_order()?;
    state.tick += 1;
    let tick = state.tick;
    let write_ratio = 1.0 - read_ratio;

    let mut arriving: HashMap<&str, f64> = HashMap::with_capacity(graph.len());
    for src in graph.sources() {
        arriving.insert(src.id.as_str(), rps * TICK_DT);
    }

    let mut results = Vec::with_capacity(order.len());
    for id in order {
        let node = graph.node(id).expect("topo order yields known nodes");
        let bs = state
            .blocks
            .get_mut(node.id.as_str())
            .expect("state covers every node");

        let total = bs.queue + arriving.get(id).copied().unwrap_or(0.0);
        let raw_cap = node_capacity(catalog, node, read_ratio) * TICK_DT;

        let util = (total / raw_cap).min(1.0);
        let mut effective_cap = raw_cap * contention(util);

        let effect = match catalog.by_kind(&node.kind) {
            Some(block) => block.tick(TickContext {
                reads: total * read_ratio,
                writes: total * write_ratio,
                raw_cap,
                dt: TICK_DT,
                state: &mut bs.extra,
                tick,
            }),
            None => TickEffect::default(),
        };
        effective_cap *= effect.cap_multiplier;

        let processed = total.min(effective_cap);
        bs.queue = total - processed;

        let outgoing_flow = processed * (1.0 - effect.absorb_ratio);
        let total_weight = node.total_out_weight();
        for edge in &node.outgoing {
            *arriving.entry(edge.to.as_str()).or_insert(0.0) +=
                outgoing_flow * edge.weight / total_weight;
        }

        let mut br = compute_block(catalog, node, processed / TICK_DT, read_ratio);
        br.queue_depth = bs.queue;
        br.latency_ms = effect.latency;
        br.saturated = effect.saturated;
        br.metrics = effect.metrics;
        results.push(br);
    }

    Ok(results)
}
