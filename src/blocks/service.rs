//! Stateless application service.
//!
//! Request handlers run on a large thread pool. Reads are quick lookups,
//! writes do real work and hold both a thread and working memory for
//! longer. Past 70% pool occupancy, scheduling overhead bends throughput
//! down quadratically.

use crate::block::{Block, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const THREAD_POOL: f64 = 10_000.0;
/// Seconds a read holds a thread.
const READ_HOLD_SEC: f64 = 0.005;
/// Seconds a write holds a thread.
const WRITE_HOLD_SEC: f64 = 0.020;
const READ_MEM_MB: f64 = 2.0;
const WRITE_MEM_MB: f64 = 10.0;
const TOTAL_MEM_MB: f64 = 2048.0;
const POOL_KNEE: f64 = 0.7;

/// The service kind.
pub struct Service;

impl Block for Service {
    fn kind(&self) -> &'static str {
        "service"
    }

    fn display_name(&self) -> &'static str {
        "Service"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 2,
            memory_mb: 2048,
            read: OpCost::new(0.3, 2.0),
            write: OpCost::new(2.0, 10.0),
            max_concurrency: 10_000,
            ..Profile::default()
        }
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let read_rps = ctx.reads / ctx.dt;
        let write_rps = ctx.writes / ctx.dt;
        let active = (read_rps * READ_HOLD_SEC + write_rps * WRITE_HOLD_SEC).min(THREAD_POOL);
        ctx.state.insert("active_threads".to_string(), active);

        let rr = ctx.read_fraction();
        let mem_pressure = active * (READ_MEM_MB * rr + WRITE_MEM_MB * (1.0 - rr)) / TOTAL_MEM_MB;

        let pool_util = active / THREAD_POOL;
        let mut effect = TickEffect::with_metric("thread_pool_util", pool_util);
        effect.metrics.insert("mem_pressure".to_string(), mem_pressure);

        if pool_util > POOL_KNEE {
            let t = (pool_util - POOL_KNEE) / (1.0 - POOL_KNEE);
            effect.cap_multiplier = 1.0 - 0.4 * t * t;
            effect.latency = WRITE_HOLD_SEC * 1000.0 * (1.0 + 2.0 * t * t);
        }
        effect.saturated = pool_util >= 0.99;
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::StateMap;
    use crate::blocks::testutil::ctx;
    use approx::assert_relative_eq;

    #[test]
    fn test_light_load_is_transparent() {
        let mut state = StateMap::new();
        // 1000 rps of reads holds 5 threads of 10k.
        let effect = Service.tick(ctx(100.0, 0.0, 1000.0, &mut state));
        assert_eq!(effect.cap_multiplier, 1.0);
        assert_eq!(effect.latency, 0.0);
        assert_relative_eq!(state["active_threads"], 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pool_knee() {
        let mut state = StateMap::new();
        // Writes at 350k rps hold exactly 7000 threads: at the knee,
        // still transparent.
        let effect = Service.tick(ctx(0.0, 35_000.0, 1e9, &mut state));
        assert_eq!(effect.cap_multiplier, 1.0);

        // 425k write rps -> 8500 threads -> t = 0.5.
        let effect = Service.tick(ctx(0.0, 42_500.0, 1e9, &mut state));
        assert_relative_eq!(effect.cap_multiplier, 1.0 - 0.4 * 0.25, epsilon = 1e-9);
        assert_relative_eq!(effect.latency, 20.0 * 1.5, epsilon = 1e-9);
        assert!(!effect.saturated);
    }

    #[test]
    fn test_saturation() {
        let mut state = StateMap::new();
        // Enough writes to pin all 10k threads.
        let effect = Service.tick(ctx(0.0, 60_000.0, 1e9, &mut state));
        assert!(effect.saturated);
        assert_relative_eq!(effect.metrics["thread_pool_util"], 1.0, epsilon = 1e-9);
        assert_relative_eq!(effect.cap_multiplier, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn test_mem_pressure_metric() {
        let mut state = StateMap::new();
        // Pure writes: 2000 active threads at 10 MB each over 2048 MB.
        let effect = Service.tick(ctx(0.0, 10_000.0, 1e9, &mut state));
        assert_relative_eq!(
            effect.metrics["mem_pressure"],
            2000.0 * 10.0 / 2048.0,
            epsilon = 1e-9
        );
    }
}
