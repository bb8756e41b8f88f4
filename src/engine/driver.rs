//! The tick driver: a long-running loop over the stateful simulator.
//!
//! One [`Sim`] owns at most one active run. `play` swaps in a new graph
//! and starts a 100 ms loop on a dedicated thread; `pause` zeroes the
//! source rate and lets queues drain, after which the loop emits a final
//! `done` result and stops. Subscribers each own a depth-1 channel: a
//! consumer that cannot keep up silently loses ticks rather than growing
//! a buffer.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use crate::catalog::Catalog;
use crate::engine::tick::simulate_tick;
use crate::engine::{BlockResult, SimState};
use crate::error::SimResult;
use crate::graph::Graph;
use crate::topology::Topology;

/// Wall-clock cadence of the tick loop.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// One tick's worth of results, as streamed to subscribers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TickResult {
    /// Tick number, starting at 1 for the first tick of a run.
    pub tick: u64,
    /// Per-node results in topological order.
    pub blocks: Vec<BlockResult>,
    /// True exactly once, on the final result of a drained run.
    #[serde(default, skip_serializing_if = "is_false")]
    pub done: bool,
}

fn is_false(b: &bool) -> bool {
    !b
}

/// A subscription to a sim's tick results.
///
/// The channel holds a single result; when the consumer falls behind,
/// newer ticks replace nothing — they are dropped. Results arrive
/// strictly in tick order with no duplicates.
pub struct TickStream {
    id: u64,
    rx: Receiver<TickResult>,
}

impl TickStream {
    /// Blocks until the next result or disconnection.
    pub fn recv(&self) -> Option<TickResult> {
        self.rx.recv().ok()
    }

    /// Waits up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<TickResult> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Non-blocking poll.
    pub fn try_recv(&self) -> Option<TickResult> {
        self.rx.try_recv().ok()
    }

    /// Iterates until the stream disconnects.
    pub fn iter(&self) -> impl Iterator<Item = TickResult> + '_ {
        self.rx.iter()
    }
}

struct Subscriber {
    id: u64,
    tx: Sender<TickResult>,
}

#[derive(Default)]
struct Inner {
    graph: Option<Graph>,
    state: SimState,
    rps: f64,
    read_ratio: f64,
    running: bool,
    paused: bool,
    /// Bumped on every play/stop so a superseded loop can tell it has
    /// been replaced.
    generation: u64,
    subs: Vec<Subscriber>,
    next_sub_id: u64,
    stop_tx: Option<Sender<()>>,
    dropped_results: u64,
}

impl Inner {
    fn stop_locked(&mut self) {
        self.stop_tx = None;
        self.running = false;
        self.generation += 1;
    }

    fn broadcast(&mut self, result: &TickResult) {
        for sub in &self.subs {
            match sub.tx.try_send(result.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                    self.dropped_results += 1;
                }
            }
        }
    }
}

/// A named-singleton simulation: one topology, one loop, many
/// subscribers. All public operations serialize on one internal lock and
/// return without blocking on I/O.
pub struct Sim {
    catalog: Arc<Catalog>,
    inner: Arc<Mutex<Inner>>,
}

impl Sim {
    /// Creates a sim over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(Catalog::builtin()))
    }

    /// Creates a sim over a caller-provided catalog.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Validates the topology, resets run state, and starts the loop.
    /// Replaces (and stops) any prior run; on validation failure nothing
    /// changes.
    pub fn play(&self, topo: &Topology) -> SimResult<()> {
        topo.validate()?;
        let graph = Graph::build(topo)?;
        graph.topo_order()?;

        let state = SimState::new(&graph, &self.catalog);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let mut inner = self.inner.lock();
        if inner.running {
            inner.stop_locked();
        }

        inner.graph = Some(graph);
        inner.state = state;
        inner.rps = topo.rps;
        inner.read_ratio = topo.read_ratio;
        inner.running = true;
        inner.paused = false;
        inner.stop_tx = Some(stop_tx);
        let generation = inner.generation;
        drop(inner);

        info!(rps = topo.rps, read_ratio = topo.read_ratio, "starting tick loop");
        let catalog = Arc::clone(&self.catalog);
        let shared = Arc::clone(&self.inner);
        std::thread::Builder::new()
            .name("archsim-tick".to_string())
            .spawn(move || tick_loop(catalog, shared, generation, stop_rx))
            .expect("failed to spawn tick loop thread");

        Ok(())
    }

    /// Zeroes the source rate and marks the run as draining. The loop
    /// keeps ticking until every queue empties, then emits `done` and
    /// stops. No-op when idle.
    pub fn pause(&self) {
        let mut inner = self.inner.lock();
        if inner.running && !inner.paused {
            inner.rps = 0.0;
            inner.paused = true;
            info!("pausing: draining queues");
        }
    }

    /// Updates the source rate and read ratio live.
    pub fn update_rate(&self, rps: f64, read_ratio: f64) -> SimResult<()> {
        if !(0.0..=1.0).contains(&read_ratio) {
            return Err(crate::error::SimError::ReadRatioOutOfRange { value: read_ratio });
        }
        let mut inner = self.inner.lock();
        inner.rps = rps;
        inner.read_ratio = read_ratio;
        Ok(())
    }

    /// Registers a new subscriber. Subscribers persist across runs.
    pub fn subscribe(&self) -> TickStream {
        let (tx, rx) = bounded(1);
        let mut inner = self.inner.lock();
        let id = inner.next_sub_id;
        inner.next_sub_id += 1;
        inner.subs.push(Subscriber { id, tx });
        TickStream { id, rx }
    }

    /// Removes a subscriber; its stream disconnects.
    pub fn unsubscribe(&self, stream: &TickStream) {
        let mut inner = self.inner.lock();
        inner.subs.retain(|s| s.id != stream.id);
    }

    /// True while a run's loop is active (including the drain phase).
    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    /// True while a run is draining after `pause`.
    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    /// Ticks dropped because a subscriber's buffer was full.
    pub fn dropped_results(&self) -> u64 {
        self.inner.lock().dropped_results
    }
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sim {
    fn drop(&mut self) {
        self.inner.lock().stop_locked();
    }
}

fn tick_loop(
    catalog: Arc<Catalog>,
    shared: Arc<Mutex<Inner>>,
    generation: u64,
    stop_rx: Receiver<()>,
) {
    let ticker = crossbeam_channel::tick(TICK_INTERVAL);

    loop {
        select! {
            recv(stop_rx) -> _ => return,
            recv(ticker) -> _ => {
                let mut inner = shared.lock();
                if !inner.running || inner.generation != generation {
                    return;
                }

                let Inner { graph, state, rps, read_ratio, .. } = &mut *inner;
                let Some(graph) = graph.as_ref() else { return };

                match simulate_tick(&catalog, graph, *rps, *read_ratio, state) {
                    Ok(blocks) => {
                        let done = inner.paused && inner.state.all_drained();
                        let result = TickResult {
                            tick: inner.state.tick(),
                            blocks,
                            done,
                        };
                        trace!(tick = result.tick, done, "tick");
                        inner.broadcast(&result);

                        if done {
                            info!(tick = result.tick, "drain complete, stopping loop");
                            inner.stop_locked();
                            return;
                        }
                    }
                    Err(err) => {
                        // Cannot happen once the graph validated at play
                        // time; skip the tick and keep the loop alive.
                        warn!(%err, "tick failed, skipping");
                    }
                }
            }
        }
    }
}
