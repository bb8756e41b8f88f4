//! Relational datastore.
//!
//! B-tree reads mostly hit the buffer pool; writes pay full index
//! maintenance I/O and an fsync per commit. The connection pool is the
//! dynamic bottleneck: writes hold a connection 5x longer than reads.

use crate::block::{Block, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const BTREE_READ_IOS: f64 = 2.0;
const BTREE_WRITE_IOS: f64 = 6.0;
const BUFFER_POOL: f64 = 0.85;
const MAX_CONNS: f64 = 200.0;
/// Seconds a read holds a connection.
const READ_HOLD_SEC: f64 = 0.002;
/// Seconds a write (with commit) holds a connection.
const WRITE_HOLD_SEC: f64 = 0.010;
const POOL_KNEE: f64 = 0.7;

/// The SQL datastore kind.
pub struct SqlDatastore;

impl Block for SqlDatastore {
    fn kind(&self) -> &'static str {
        "sql_datastore"
    }

    fn display_name(&self) -> &'static str {
        "SQL Datastore"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 8,
            memory_mb: 32_768,
            disk_iops: crate::profile::SSD_DISK_IOPS,
            read: OpCost::new(0.5, 0.5).with_disk(BTREE_READ_IOS),
            write: OpCost::new(1.0, 0.5).with_disk(BTREE_WRITE_IOS),
            max_concurrency: 200,
            buffer_pool_ratio: BUFFER_POOL,
            durability: crate::profile::Durability::PerWrite,
            default_read_ratio: Some(0.7),
        }
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let read_rps = ctx.reads / ctx.dt;
        let write_rps = ctx.writes / ctx.dt;
        let active = (read_rps * READ_HOLD_SEC + write_rps * WRITE_HOLD_SEC).min(MAX_CONNS);
        ctx.state.insert("active_conns".to_string(), active);

        let pool_util = active / MAX_CONNS;
        let mut effect = TickEffect::with_metric("conn_pool_util", pool_util);

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
    fn test_reads_hold_connections_briefly() {
        let mut state = StateMap::new();
        // 50k reads/sec hold 100 of 200 connections.
        let effect = SqlDatastore.tick(ctx(5000.0, 0.0, 10_000.0, &mut state));
        assert_relative_eq!(effect.metrics["conn_pool_util"], 0.5, epsilon = 1e-9);
        assert_eq!(effect.cap_multiplier, 1.0);
    }

    #[test]
    fn test_writes_exhaust_the_pool() {
        let mut state = StateMap::new();
        // 14k writes/sec hold 140 connections: at the knee.
        let effect = SqlDatastore.tick(ctx(0.0, 1400.0, 10_000.0, &mut state));
        assert_eq!(effect.cap_multiplier, 1.0);

        // 17k writes/sec -> 170 conns -> t = 0.5.
        let effect = SqlDatastore.tick(ctx(0.0, 1700.0, 10_000.0, &mut state));
        assert_relative_eq!(effect.cap_multiplier, 0.9, epsilon = 1e-9);
        assert_relative_eq!(effect.latency, 10.0 * 1.5, epsilon = 1e-9);

        // 20k writes/sec pins the pool.
        let effect = SqlDatastore.tick(ctx(0.0, 2000.0, 10_000.0, &mut state));
        assert!(effect.saturated);
    }
}
