//! Layer-4 load balancer.
//!
//! Forwarding is nearly free; the limit is the connection table. As the
//! table fills past 75%, lookups and conntrack churn eat into throughput.

use crate::block::{Block, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const LB_CPU_PER_REQ_MS: f64 = 0.01;
const LB_POOL: u32 = 100_000;
const CONN_TABLE_LIMIT: f64 = 80_000.0;
const CONN_TABLE_KNEE: f64 = 0.75;

/// The load balancer kind.
pub struct LoadBalancer;

impl Block for LoadBalancer {
    fn kind(&self) -> &'static str {
        "load_balancer"
    }

    fn display_name(&self) -> &'static str {
        "Load Balancer"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 1,
            memory_mb: 1024,
            read: OpCost::new(LB_CPU_PER_REQ_MS, 0.001),
            write: OpCost::new(LB_CPU_PER_REQ_MS, 0.001),
            max_concurrency: LB_POOL,
            ..Profile::default()
        }
    }

    // Connection table: every in-flight request holds an entry.
    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let total_rps = (ctx.reads + ctx.writes) / ctx.dt;
        let conn_util = (total_rps / CONN_TABLE_LIMIT).min(1.0);
        ctx.state.insert("conn_table_util".to_string(), conn_util);

        let mut effect = TickEffect::with_metric("conn_table_util", conn_util);
        if conn_util > CONN_TABLE_KNEE {
            let pressure = (conn_util - CONN_TABLE_KNEE) / (1.0 - CONN_TABLE_KNEE);
            effect.cap_multiplier = 1.0 - 0.3 * pressure;
            effect.latency = LB_CPU_PER_REQ_MS * 1000.0 * (1.0 + 2.0 * pressure);
        }
        effect.saturated = conn_util > 0.95;
        effect
    }
}
