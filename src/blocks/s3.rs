//! Object storage.
//!
//! A managed service: IOPS are effectively unlimited and the latency
//! floor is network round-trip plus service overhead. The real ceiling is
//! egress/ingress bandwidth; past 70% of it, congestion stacks latency on
//! top of the floor.

use crate::block::{Block, StateMap, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const REQUEST_RATE_LIMIT: u32 = 5000;
/// Average object size for reads, MB.
const READ_MB: f64 = 0.5;
/// Average object size for writes, MB.
const WRITE_MB: f64 = 1.0;
/// Throughput cap, MB/s (~4 Gbps).
const BANDWIDTH_MBPS: f64 = 500.0;
/// Latency floor: network plus service overhead.
const BASE_LATENCY_MS: f64 = 50.0;
const BANDWIDTH_KNEE: f64 = 0.7;

/// The object storage kind.
pub struct S3;

impl Block for S3 {
    fn kind(&self) -> &'static str {
        "s3"
    }

    fn display_name(&self) -> &'static str {
        "Object Storage"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 8,
            memory_mb: 65_536,
            disk_iops: 50_000,
            read: OpCost::new(0.1, READ_MB).with_disk(1.0),
            write: OpCost::new(0.2, WRITE_MB).with_disk(1.0),
            max_concurrency: REQUEST_RATE_LIMIT,
            durability: crate::profile::Durability::PerWrite,
            default_read_ratio: Some(0.6),
            ..Profile::default()
        }
    }

    fn init_state(&self, state: &mut StateMap) {
        state.insert("bandwidth_util".to_string(), 0.0);
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let mbps = (ctx.reads * READ_MB + ctx.writes * WRITE_MB) / ctx.dt;
        let bw_util = (mbps / BANDWIDTH_MBPS).min(1.0);
        ctx.state.insert("bandwidth_util".to_string(), bw_util);

        let mut effect = TickEffect::with_metric("bandwidth_util", bw_util);
        effect.latency = BASE_LATENCY_MS;

        if bw_util > BANDWIDTH_KNEE {
            let pressure = (bw_util - BANDWIDTH_KNEE) / (1.0 - BANDWIDTH_KNEE);
            effect.cap_multiplier = 1.0 - 0.4 * pressure;
            effect.latency = BASE_LATENCY_MS * (1.0 + 3.0 * pressure);
        }
        effect.saturated = bw_util > 0.95;
        effect
    }
}
