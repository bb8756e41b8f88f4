//! Background job worker.
//!
//! A small pool of heavyweight threads. Status checks are cheap; job
//! executions hold a thread for 50 ms each, so the pool fills fast under
//! write load — the main bottleneck for workers.

use crate::block::{Block, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const THREAD_POOL: f64 = 50.0;
const READ_HOLD_SEC: f64 = 0.005;
const WRITE_HOLD_SEC: f64 = 0.050;
const READ_MEM_MB: f64 = 1.0;
const WRITE_MEM_MB: f64 = 10.0;
const TOTAL_MEM_MB: f64 = 8192.0;
const POOL_KNEE: f64 = 0.7;

/// The worker kind.
pub struct Worker;

impl Block for Worker {
    fn kind(&self) -> &'static str {
        "worker"
    }

    fn display_name(&self) -> &'static str {
        "Worker"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 4,
            memory_mb: 8192,
            disk_iops: crate::profile::SSD_DISK_IOPS,
            read: OpCost::new(0.5, 1.0),
            write: OpCost::new(5.0, 10.0).with_disk(2.0),
            max_concurrency: 50,
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
    fn test_pool_fills_under_job_load() {
        let mut state = StateMap::new();
        // 700 jobs/sec hold 35 of 50 threads: at the knee.
        let effect = Worker.tick(ctx(0.0, 70.0, 1000.0, &mut state));
        assert_relative_eq!(state["active_threads"], 35.0, epsilon = 1e-9);
        assert_eq!(effect.cap_multiplier, 1.0);

        // 1000 jobs/sec pins all 50: saturated, capacity down 40%.
        let effect = Worker.tick(ctx(0.0, 100.0, 1000.0, &mut state));
        assert!(effect.saturated);
        assert_relative_eq!(effect.cap_multiplier, 0.6, epsilon = 1e-9);
        assert_relative_eq!(effect.latency, 50.0 * 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_status_checks_barely_register() {
        let mut state = StateMap::new();
        // 1000 reads/sec hold 5 threads.
        let effect = Worker.tick(ctx(100.0, 0.0, 1000.0, &mut state));
        assert_relative_eq!(effect.metrics["thread_pool_util"], 0.1, epsilon = 1e-9);
        assert!(!effect.saturated);
    }
}
