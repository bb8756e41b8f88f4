//! The `Block` trait and the stateful-tick interface.
//!
//! A block kind declares a static [`Profile`] and may additionally carry a
//! per-tick behavior: `init_state` seeds a per-node state map and `tick`
//! turns the traffic arriving in one tick into a [`TickEffect`]. Kinds
//! without dynamic behavior keep the default no-op implementations and are
//! transparent to the tick loop.

use std::collections::HashMap;

use crate::profile::Profile;

/// Per-node state: an open mapping from metric names to values, private to
/// one node instance and persisted across ticks.
pub type StateMap = HashMap<String, f64>;

/// Everything a block's tick behavior can observe for one tick.
pub struct TickContext<'a> {
    /// Read requests arriving this tick (not per-second).
    pub reads: f64,
    /// Write requests arriving this tick.
    pub writes: f64,
    /// Base capacity for this tick (`block_capacity · dt`).
    pub raw_cap: f64,
    /// Tick duration in seconds.
    pub dt: f64,
    /// Mutable per-node state.
    pub state: &'a mut StateMap,
    /// Current tick number.
    pub tick: u64,
}

impl TickContext<'_> {
    /// Fraction of this tick's traffic that is reads (0 when idle).
    pub fn read_fraction(&self) -> f64 {
        let total = self.reads + self.writes;
        if total > 0.0 {
            self.reads / total
        } else {
            0.0
        }
    }
}

/// The outcome of one tick of a block's dynamic behavior.
#[derive(Clone, Debug)]
pub struct TickEffect {
    /// Multiplier on this tick's effective capacity.
    pub cap_multiplier: f64,
    /// Fraction of processed traffic not forwarded downstream
    /// (cache absorption), in `[0, 1]`.
    pub absorb_ratio: f64,
    /// Observable latency in milliseconds.
    pub latency: f64,
    /// The block is at its saturation point.
    pub saturated: bool,
    /// Kind-specific observable metrics.
    pub metrics: HashMap<String, f64>,
}

impl Default for TickEffect {
    fn default() -> Self {
        Self {
            cap_multiplier: 1.0,
            absorb_ratio: 0.0,
            latency: 0.0,
            saturated: false,
            metrics: HashMap::new(),
        }
    }
}

impl TickEffect {
    /// Single-metric constructor; most tickers export exactly one gauge.
    pub fn with_metric(name: impl Into<String>, value: f64) -> Self {
        let mut effect = Self::default();
        effect.metrics.insert(name.into(), value);
        effect
    }
}

/// A block kind: identity, display name, static profile, and an optional
/// stateful tick behavior via the default methods.
pub trait Block: Send + Sync {
    /// Stable kind identifier (e.g. `"sql_datastore"`).
    fn kind(&self) -> &'static str;

    /// Human-readable name (e.g. `"SQL Datastore"`).
    fn display_name(&self) -> &'static str;

    /// Static resource envelope.
    fn profile(&self) -> Profile;

    /// Seeds the per-node state map. No-op for stateless kinds.
    fn init_state(&self, _state: &mut StateMap) {}

    /// Advances the per-node state by one tick. The identity effect keeps
    /// stateless kinds transparent.
    fn tick(&self, _ctx: TickContext<'_>) -> TickEffect {
        TickEffect::default()
    }
}
