//! Content delivery network.
//!
//! The cache hit ratio warms under traffic and cools when idle. A warm
//! edge multiplies capacity, absorbs read traffic before it reaches the
//! origin, and serves hits faster than misses.

use crate::block::{Block, StateMap, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const CDN_CPU_PER_REQ_MS: f64 = 0.005;
const CDN_EDGE_POOL: u32 = 200_000;
const CDN_CACHE_MEM_MB: u32 = 8192;
/// Cache warms 2% of the remaining distance per tick under load.
const WARMUP_RATE: f64 = 0.02;
/// Cache cools 0.5% per tick without traffic.
const DECAY_RATE: f64 = 0.005;

/// The CDN kind.
pub struct Cdn;

impl Block for Cdn {
    fn kind(&self) -> &'static str {
        "cdn"
    }

    fn display_name(&self) -> &'static str {
        "CDN"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 1,
            memory_mb: CDN_CACHE_MEM_MB,
            read: OpCost::new(CDN_CPU_PER_REQ_MS, 0.001),
            write: OpCost::new(CDN_CPU_PER_REQ_MS, 0.001),
            max_concurrency: CDN_EDGE_POOL,
            ..Profile::default()
        }
    }

    fn init_state(&self, state: &mut StateMap) {
        state.insert("hit_ratio".to_string(), 0.0);
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let mut ratio = ctx.state.get("hit_ratio").copied().unwrap_or(0.0);

        let total = ctx.reads + ctx.writes;
        if total > 0.0 {
            ratio += WARMUP_RATE * (1.0 - ratio);
        } else {
            ratio -= DECAY_RATE * ratio;
        }
        ratio = ratio.clamp(0.0, 1.0);
        ctx.state.insert("hit_ratio".to_string(), ratio);

        // Only reads can be cache hits; a warm edge both widens the pipe
        // and keeps hits from reaching the origin.
        let read_frac = ctx.reads / total.max(1.0);
        let mut effect = TickEffect::with_metric("hit_ratio", ratio);
        effect.cap_multiplier = 1.0 + 4.0 * ratio;
        effect.absorb_ratio = ratio * read_frac;
        effect.latency = CDN_CPU_PER_REQ_MS * 1000.0 * (1.0 - 0.8 * ratio);
        effect
    }
}
