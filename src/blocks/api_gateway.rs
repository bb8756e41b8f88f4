//! API gateway.
//!
//! Request routing, auth checks, and rate limiting. The rate limiter
//! itself becomes the bottleneck near its configured ceiling.

use crate::block::{Block, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const GW_CPU_PER_REQ_MS: f64 = 0.05;
const GW_POOL: u32 = 50_000;
const RATE_LIMIT_RPS: f64 = 40_000.0;
const RATE_KNEE: f64 = 0.8;

/// The API gateway kind.
pub struct ApiGateway;

impl Block for ApiGateway {
    fn kind(&self) -> &'static str {
        "api_gateway"
    }

    fn display_name(&self) -> &'static str {
        "API Gateway"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 2,
            memory_mb: 2048,
            read: OpCost::new(GW_CPU_PER_REQ_MS, 0.01),
            write: OpCost::new(GW_CPU_PER_REQ_MS, 0.01),
            max_concurrency: GW_POOL,
            ..Profile::default()
        }
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let total_rps = (ctx.reads + ctx.writes) / ctx.dt;
        let rate_util = (total_rps / RATE_LIMIT_RPS).min(1.0);
        ctx.state.insert("rate_util".to_string(), rate_util);

        let mut effect = TickEffect::with_metric("rate_util", rate_util);
        if rate_util > RATE_KNEE {
            let pressure = (rate_util - RATE_KNEE) / (1.0 - RATE_KNEE);
            effect.cap_multiplier = 1.0 - 0.5 * pressure;
            effect.latency = GW_CPU_PER_REQ_MS * 1000.0 * (1.0 + 2.0 * pressure);
        }
        effect.saturated = rate_util > 0.95;
        effect
    }
}
