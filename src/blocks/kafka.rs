//! Distributed log / message queue.
//!
//! Appends are sequential and batched, so the disk is rarely the limit.
//! The broker leans on the OS page cache; a write-heavy tail of
//! un-flushed segments fills it and drags consumers onto cold reads.

use crate::block::{Block, StateMap, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const CPU_PER_OP_MS: f64 = 0.02;
const APPEND_LOG_IOS: f64 = 1.0;
const BROKER_CONNS: u32 = 10_000;
const PAGE_CACHE_MB: f64 = 32_768.0;
/// MB of page cache consumed per produced message.
const MB_PER_WRITE: f64 = 0.01;
/// Fraction of the cache flushed to segments per tick.
const FLUSH_RATE: f64 = 0.02;
const CACHE_KNEE: f64 = 0.7;

/// The Kafka kind.
pub struct Kafka;

impl Block for Kafka {
    fn kind(&self) -> &'static str {
        "kafka"
    }

    fn display_name(&self) -> &'static str {
        "Kafka"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 4,
            memory_mb: 32_768,
            disk_iops: crate::profile::SSD_DISK_IOPS,
            read: OpCost::new(CPU_PER_OP_MS, 0.01).with_sequential_disk(APPEND_LOG_IOS),
            write: OpCost::new(CPU_PER_OP_MS, 0.01).with_sequential_disk(APPEND_LOG_IOS),
            max_concurrency: BROKER_CONNS,
            durability: crate::profile::Durability::Batch,
            ..Profile::default()
        }
    }

    fn init_state(&self, state: &mut StateMap) {
        state.insert("page_cache_used_mb".to_string(), 0.0);
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let mut used = ctx.state.get("page_cache_used_mb").copied().unwrap_or(0.0);
        used += ctx.writes * MB_PER_WRITE - used * FLUSH_RATE;
        used = used.clamp(0.0, PAGE_CACHE_MB);
        ctx.state.insert("page_cache_used_mb".to_string(), used);

        let cache_util = used / PAGE_CACHE_MB;
        let mut effect = TickEffect::with_metric("cache_util", cache_util);
        effect.latency = CPU_PER_OP_MS * 1000.0;

        if cache_util > CACHE_KNEE {
            let pressure = (cache_util - CACHE_KNEE) / (1.0 - CACHE_KNEE);
            effect.cap_multiplier = 1.0 - 0.3 * pressure;
            effect.latency = CPU_PER_OP_MS * 1000.0 * (1.0 + 5.0 * pressure);
        }
        effect.saturated = cache_util > 0.95;
        effect
    }
}
