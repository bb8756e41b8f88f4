//! The simulation engine.
//!
//! Three layers, leaves first:
//!
//! - [`capacity`]: per-kind capacity and utilization math.
//! - [`snapshot`]: stateless topological propagation for one-shot queries.
//! - [`tick`]: stateful 100 ms steps with queues, contention, and
//!   per-kind dynamic effects.
//! - [`driver`]: the long-running loop that advances the tick simulator
//!   on a wall-clock cadence and streams results to subscribers.

pub mod capacity;
pub mod driver;
pub mod snapshot;
pub mod tick;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::block::StateMap;
use crate::catalog::Catalog;
use crate::graph::Graph;

pub use capacity::{block_capacity, compute_block};
pub use driver::{Sim, TickResult, TickStream};
pub use snapshot::{simulate, snapshot, SnapshotResult};
pub use tick::{simulate_tick, TICK_DT};

/// Health band of a block, derived from its bottleneck utilization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    /// Bottleneck below 60%.
    Green,
    /// Bottleneck in `[60%, 90%)`.
    Yellow,
    /// Bottleneck at 90% or above.
    Red,
}

impl Health {
    /// Maps a bottleneck utilization to its health band.
    pub fn from_bottleneck(bottleneck: f64) -> Self {
        if bottleneck < 0.6 {
            Self::Green
        } else if bottleneck < 0.9 {
            Self::Yellow
        } else {
            Self::Red
        }
    }
}

/// Per-node, per-tick observation emitted by the simulator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockResult {
    /// Node id.
    pub id: String,
    /// Kind identifier.
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Requests per second processed this tick.
    pub rps: f64,
    /// CPU utilization.
    pub cpu_util: f64,
    /// Memory utilization.
    pub mem_util: f64,
    /// Disk utilization.
    pub disk_util: f64,
    /// Max of the three utilizations.
    pub bottleneck: f64,
    /// Health band derived from the bottleneck.
    pub health: Health,
    /// Requests waiting in the node's queue after this tick.
    pub queue_depth: f64,
    /// Observable latency in milliseconds.
    pub latency_ms: f64,
    /// The block hit its saturation point this tick.
    pub saturated: bool,
    /// Kind-specific metrics.
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
}

/// Dynamic state of one node for the duration of a run.
#[derive(Clone, Debug, Default)]
pub struct BlockState {
    /// Requests waiting to be served.
    pub queue: f64,
    /// Kind-specific state, seeded by the kind's `init_state`.
    pub extra: StateMap,
}

/// Dynamic state of a whole run: one [`BlockState`] per node plus the
/// tick counter.
#[derive(Clone, Debug, Default)]
pub struct SimState {
    blocks: HashMap<String, BlockState>,
    tick: u64,
}

impl SimState {
    /// Creates fresh state for a graph, seeding each node's state map
    /// through its kind's initializer.
    pub fn new(graph: &Graph, catalog: &Catalog) -> Self {
        let mut blocks = HashMap::with_capacity(graph.len());
        for node in graph.nodes() {
            let mut bs = BlockState::default();
            if let Some(block) = catalog.by_kind(&node.kind) {
                block.init_state(&mut bs.extra);
            }
            blocks.insert(node.id.clone(), bs);
        }
        Self { blocks, tick: 0 }
    }

    /// Returns the state of one node.
    pub fn block(&self, id: &str) -> Option<&BlockState> {
        self.blocks.get(id)
    }

    /// Mutable access to one node's state.
    pub fn block_mut(&mut self, id: &str) -> Option<&mut BlockState> {
        self.blocks.get_mut(id)
    }

    /// Number of ticks applied to this state.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// True when every queue has converged to (near) empty.
    pub fn all_drained(&self) -> bool {
        self.blocks.values().all(|bs| bs.queue <= 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::TopologyBuilder;

    #[test]
    fn test_health_bands() {
        assert_eq!(Health::from_bottleneck(0.0), Health::Green);
        assert_eq!(Health::from_bottleneck(0.599), Health::Green);
        assert_eq!(Health::from_bottleneck(0.6), Health::Yellow);
        assert_eq!(Health::from_bottleneck(0.899), Health::Yellow);
        assert_eq!(Health::from_bottleneck(0.9), Health::Red);
        assert_eq!(Health::from_bottleneck(2.5), Health::Red);
    }

    #[test]
    fn test_health_serde_tokens() {
        assert_eq!(serde_json::to_string(&Health::Green).unwrap(), "\"green\"");
        assert_eq!(serde_json::to_string(&Health::Yellow).unwrap(), "\"yellow\"");
        assert_eq!(serde_json::to_string(&Health::Red).unwrap(), "\"red\"");
    }

    #[test]
    fn test_sim_state_seeds_kind_state() {
        let topo = TopologyBuilder::new()
            .block("edge", "cdn")
            .block("svc", "service")
            .build()
            .unwrap();
        let graph = Graph::build(&topo).unwrap();
        let catalog = Catalog::builtin();

        let state = SimState::new(&graph, &catalog);
        assert_eq!(state.block("edge").unwrap().extra.get("hit_ratio"), Some(&0.0));
        assert!(state.all_drained());
        assert_eq!(state.tick(), 0);
    }
}
