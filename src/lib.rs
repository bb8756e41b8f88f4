//! # Archsim
//!
//! An interactive architecture simulator engine. Users compose a directed
//! graph of infrastructure components (load balancers, services, caches,
//! queues, datastores, workers, analytics engines, CDNs, object stores),
//! inject a synthetic request rate with a read/write mix, and observe how
//! each component utilizes CPU, memory, and disk — and where queues build
//! up — over time.
//!
//! ## Design Principles
//!
//! - **Catalog-Driven**: Block kinds are registered once at startup; each
//!   declares a static resource profile and, optionally, a stateful
//!   per-tick behavior (cache warmup, pool exhaustion, compaction
//!   pressure).
//! - **Graph as Source of Truth**: Topologies are directed acyclic graphs
//!   of block instances with weighted edges; traffic propagates in
//!   topological order with per-node weight normalization.
//! - **Two Simulation Modes**: a stateless snapshot for one-shot "what
//!   would utilization look like" queries, and a stateful 100 ms tick
//!   loop with queues, contention, and per-kind dynamics.
//! - **Bounded Streaming**: subscribers each own a depth-1 channel; slow
//!   consumers lose ticks instead of growing buffers.
//!
//! ## Example
//!
//! ```
//! use archsim::catalog::Catalog;
//! use archsim::engine::snapshot;
//! use archsim::topology::TopologyBuilder;
//!
//! let catalog = Catalog::builtin();
//! let topo = TopologyBuilder::new()
//!     .block("users", "user")
//!     .block("api", "service")
//!     .block("db", "sql_datastore")
//!     .edge("users", "api")
//!     .edge("api", "db")
//!     .load(1000.0, 0.9)
//!     .build()
//!     .unwrap();
//!
//! let result = snapshot(&catalog, &topo).unwrap();
//! assert_eq!(result.blocks.len(), 3);
//! ```

pub mod block;
pub mod blocks;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod graph;
pub mod profile;
pub mod topology;

// Re-export commonly used types.
pub use block::{Block, StateMap, TickContext, TickEffect};
pub use catalog::{Catalog, CatalogEntry};
pub use engine::{
    block_capacity, compute_block, simulate, simulate_tick, snapshot, BlockResult, BlockState,
    Health, Sim, SimState, SnapshotResult, TickResult, TickStream, TICK_DT,
};
pub use error::{SimError, SimResult, TopologyError};
pub use graph::{Graph, Node, OutEdge};
pub use profile::{Durability, OpCost, Profile, HDD_DISK_IOPS, SSD_DISK_IOPS};
pub use topology::{TopoBlock, TopoEdge, Topology, TopologyBuilder};
