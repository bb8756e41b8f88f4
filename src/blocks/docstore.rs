//! Document datastore.
//!
//! The storage engine keeps a fixed-size cache (70% of RAM). Writes dirty
//! it, background checkpointing reclaims a little per tick, and once the
//! cache runs hot, eviction and checkpoint I/O fight queries for CPU.

use crate::block::{Block, StateMap, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const CONN_POOL: u32 = 500;
/// Write amplification from journaling and the replication log.
const WRITE_AMP_IOS: f64 = 4.0;
/// 70% of the 16 GB instance is storage-engine cache.
const CACHE_MEM_MB: f64 = 11_468.8;
/// MB dirtied per write.
const MB_PER_WRITE: f64 = 0.5;
/// Fraction of the cache checkpointed per tick.
const CHECKPOINT_RATE: f64 = 0.02;
const CACHE_KNEE: f64 = 0.6;
const BASE_READ_LATENCY_MS: f64 = 0.3;

/// The document store kind.
pub struct DocStore;

impl Block for DocStore {
    fn kind(&self) -> &'static str {
        "docstore"
    }

    fn display_name(&self) -> &'static str {
        "Document Store"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 4,
            memory_mb: 16_384,
            disk_iops: crate::profile::SSD_DISK_IOPS,
            read: OpCost::new(0.3, 0.5).with_disk(2.0),
            write: OpCost::new(1.0, 0.5).with_disk(WRITE_AMP_IOS),
            max_concurrency: CONN_POOL,
            buffer_pool_ratio: 0.70,
            durability: crate::profile::Durability::Batch,
            ..Profile::default()
        }
    }

    fn init_state(&self, state: &mut StateMap) {
        state.insert("cache_used_mb".to_string(), 0.0);
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let mut used = ctx.state.get("cache_used_mb").copied().unwrap_or(0.0);
        used += ctx.writes * MB_PER_WRITE - used * CHECKPOINT_RATE;
        used = used.clamp(0.0, CACHE_MEM_MB);
        ctx.state.insert("cache_used_mb".to_string(), used);

        let pressure = used / CACHE_MEM_MB;
        let mut effect = TickEffect::with_metric("cache_pressure", pressure);
        effect.latency = BASE_READ_LATENCY_MS;

        if pressure > CACHE_KNEE {
            let severity = (pressure - CACHE_KNEE) / (1.0 - CACHE_KNEE);
            effect.cap_multiplier = 1.0 - 0.4 * severity;
            effect.latency = BASE_READ_LATENCY_MS * (1.0 + 5.0 * severity);
        }
        effect.saturated = pressure > 0.95;
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::testutil::ctx;
    use approx::assert_relative_eq;

    #[test]
    fn test_writes_dirty_the_cache() {
        let mut state = StateMap::new();
        DocStore.init_state(&mut state);

        DocStore.tick(ctx(0.0, 1000.0, 1e6, &mut state));
        assert_relative_eq!(state["cache_used_mb"], 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hot_cache_throttles() {
        let mut state = StateMap::new();
        // Land on 80% after this tick's checkpoint: severity 0.5.
        state.insert("cache_used_mb".to_string(), 0.8 * CACHE_MEM_MB / 0.98);

        let effect = DocStore.tick(ctx(0.0, 0.0, 1e6, &mut state));
        assert_relative_eq!(effect.cap_multiplier, 0.8, epsilon = 1e-6);
        assert_relative_eq!(effect.latency, 0.3 * 3.5, epsilon = 1e-6);
    }

    #[test]
    fn test_cool_cache_is_transparent() {
        let mut state = StateMap::new();
        DocStore.init_state(&mut state);

        let effect = DocStore.tick(ctx(1000.0, 100.0, 1e6, &mut state));
        assert_eq!(effect.cap_multiplier, 1.0);
        assert_relative_eq!(effect.latency, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut state = StateMap::new();
        DocStore.init_state(&mut state);

        for _ in 0..1000 {
            DocStore.tick(ctx(0.0, 100_000.0, 1e6, &mut state));
        }
        assert!(state["cache_used_mb"] <= CACHE_MEM_MB);
    }
}
