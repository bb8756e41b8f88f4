//! Wide-column / key-value store.
//!
//! Scales until traffic skews: heavy writes concentrate on hot
//! partitions, building hotspot pressure that throttles the whole table.
//! Pressure builds with write intensity relative to capacity and decays
//! slowly at rest.

use crate::block::{Block, StateMap, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const CONN_POOL: u32 = 10_000;
/// Pressure gained per tick at full write intensity.
const HOTSPOT_BUILDUP: f64 = 0.03;
/// Fraction of pressure decayed per tick.
const HOTSPOT_DECAY: f64 = 0.01;
const HOTSPOT_KNEE: f64 = 0.3;
const BASE_LATENCY_MS: f64 = 0.1;

/// The KV store kind.
pub struct KvStore;

impl Block for KvStore {
    fn kind(&self) -> &'static str {
        "kv_store"
    }

    fn display_name(&self) -> &'static str {
        "KV Store"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 4,
            memory_mb: 16_384,
            disk_iops: crate::profile::SSD_DISK_IOPS,
            read: OpCost::new(0.1, 0.01).with_disk(1.0),
            write: OpCost::new(0.3, 0.01).with_disk(2.0),
            max_concurrency: CONN_POOL,
            buffer_pool_ratio: 0.90,
            durability: crate::profile::Durability::Batch,
            ..Profile::default()
        }
    }

    fn init_state(&self, state: &mut StateMap) {
        state.insert("hotspot_pressure".to_string(), 0.0);
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let mut pressure = ctx.state.get("hotspot_pressure").copied().unwrap_or(0.0);

        if ctx.writes > 0.0 {
            let write_intensity = (ctx.writes / ctx.raw_cap).min(1.0);
            pressure += HOTSPOT_BUILDUP * write_intensity;
        }
        pressure -= HOTSPOT_DECAY * pressure;
        pressure = pressure.clamp(0.0, 1.0);
        ctx.state.insert("hotspot_pressure".to_string(), pressure);

        let mut effect = TickEffect::with_metric("hotspot_pressure", pressure);
        effect.latency = BASE_LATENCY_MS;

        if pressure > HOTSPOT_KNEE {
            // Hot partitions throttle writes and spill onto reads.
            let severity = (pressure - HOTSPOT_KNEE) / (1.0 - HOTSPOT_KNEE);
            effect.cap_multiplier = 1.0 - 0.5 * severity;
            effect.latency = BASE_LATENCY_MS * (1.0 + 10.0 * severity);
        }
        effect.saturated = pressure > 0.9;
        effect
    }
}
