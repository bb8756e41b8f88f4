//! In-memory cache.
//!
//! Single-threaded and extremely fast until memory fills. Writes grow the
//! keyspace, expiry reclaims a little each tick, and past 80% memory the
//! eviction path starts stealing cycles from the hot loop. A filled cache
//! also serves more reads itself, absorbing them before downstream.

use crate::block::{Block, StateMap, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const CPU_PER_OP_MS: f64 = 0.01;
const TOTAL_MEM_MB: f64 = 16_384.0;
/// MB added to the keyspace per write.
const MB_PER_WRITE: f64 = 0.001;
/// Fraction of used memory reclaimed by expiry per tick.
const EXPIRY_RATE: f64 = 0.01;
const EVICTION_KNEE: f64 = 0.80;

/// The Redis kind.
pub struct Redis;

impl Block for Redis {
    fn kind(&self) -> &'static str {
        "redis"
    }

    fn display_name(&self) -> &'static str {
        "Redis"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 1,
            memory_mb: 16_384,
            read: OpCost::new(CPU_PER_OP_MS, 0.001),
            write: OpCost::new(CPU_PER_OP_MS, 0.001),
            max_concurrency: 1,
            ..Profile::default()
        }
    }

    fn init_state(&self, state: &mut StateMap) {
        state.insert("memory_used_mb".to_string(), 0.0);
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let mut used = ctx.state.get("memory_used_mb").copied().unwrap_or(0.0);
        used += ctx.writes * MB_PER_WRITE;
        used -= used * EXPIRY_RATE;
        used = used.clamp(0.0, TOTAL_MEM_MB);
        ctx.state.insert("memory_used_mb".to_string(), used);

        let mem_pct = used / TOTAL_MEM_MB;
        let mut effect = TickEffect::with_metric("mem_pct", mem_pct);

        if mem_pct > EVICTION_KNEE {
            let pressure = (mem_pct - EVICTION_KNEE) / (1.0 - EVICTION_KNEE);
            effect.cap_multiplier = 1.0 - 0.5 * pressure;
            effect.latency = CPU_PER_OP_MS * 1000.0 * (1.0 + 3.0 * pressure);
            effect.metrics.insert("evicting".to_string(), 1.0);
        }
        effect.saturated = mem_pct > 0.95;

        // A fuller cache answers more reads itself.
        effect.absorb_ratio = (mem_pct / EVICTION_KNEE).min(0.95) * ctx.read_fraction();
        effect
    }
}
