//! Analytics / OLAP engine.
//!
//! The opposite of most blocks: reads are the expensive side. An
//! aggregation query holds a thread for 100 ms and 200 MB of buffers;
//! ingesting a log line is nearly free.

use crate::block::{Block, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const QUERY_POOL: f64 = 100.0;
const READ_HOLD_SEC: f64 = 0.100;
const WRITE_HOLD_SEC: f64 = 0.005;
const READ_MEM_MB: f64 = 200.0;
const WRITE_MEM_MB: f64 = 0.2;
const TOTAL_MEM_MB: f64 = 32_768.0;
const POOL_KNEE: f64 = 0.7;

/// The analytics kind.
pub struct Analytics;

impl Block for Analytics {
    fn kind(&self) -> &'static str {
        "analytics"
    }

    fn display_name(&self) -> &'static str {
        "Analytics"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 8,
            memory_mb: 32_768,
            read: OpCost::new(10.0, READ_MEM_MB),
            write: OpCost::new(0.5, WRITE_MEM_MB),
            max_concurrency: 100,
            ..Profile::default()
        }
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let read_rps = ctx.reads / ctx.dt;
        let write_rps = ctx.writes / ctx.dt;
        let active = (read_rps * READ_HOLD_SEC + write_rps * WRITE_HOLD_SEC).min(QUERY_POOL);
        ctx.state.insert("active_queries".to_string(), active);

        let rr = ctx.read_fraction();
        let mem_pressure = active * (READ_MEM_MB * rr + WRITE_MEM_MB * (1.0 - rr)) / TOTAL_MEM_MB;

        let pool_util = active / QUERY_POOL;
        let mut effect = TickEffect::with_metric("query_pool_util", pool_util);
        effect.metrics.insert("mem_pressure".to_string(), mem_pressure);

        if pool_util > POOL_KNEE {
            let t = (pool_util - POOL_KNEE) / (1.0 - POOL_KNEE);
            effect.cap_multiplier = 1.0 - 0.4 * t * t;
            effect.latency = READ_HOLD_SEC * 1000.0 * (1.0 + 2.0 * t * t);
        }
        effect.saturated = pool_util >= 0.99;
        effect
    }
}
