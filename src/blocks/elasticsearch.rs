//! Search engine.
//!
//! Inverted-index reads are cheap; indexing writes create segments that
//! must be merged. Segment count builds under write load and merges
//! reclaim it; past 40% of the merge budget, merges compete with queries
//! for CPU and I/O.

use crate::block::{Block, StateMap, TickContext, TickEffect};
use crate::profile::{OpCost, Profile};

const INDEX_READ_IOS: f64 = 2.0;
const INDEX_WRITE_IOS: f64 = 5.0;
const BUFFER_POOL: f64 = 0.50;
const THREAD_POOL: u32 = 1000;
const MAX_SEGMENTS: f64 = 100.0;
/// Segments created per indexed document.
const SEGMENTS_PER_WRITE: f64 = 0.01;
/// Fraction of segments merged away per tick.
const MERGE_RATE: f64 = 0.05;
const MERGE_KNEE: f64 = 0.4;
const BASE_READ_LATENCY_MS: f64 = 1.0;

/// The Elasticsearch kind.
pub struct Elasticsearch;

impl Block for Elasticsearch {
    fn kind(&self) -> &'static str {
        "elasticsearch"
    }

    fn display_name(&self) -> &'static str {
        "Elasticsearch"
    }

    fn profile(&self) -> Profile {
        Profile {
            cpu_cores: 8,
            memory_mb: 32_768,
            disk_iops: crate::profile::SSD_DISK_IOPS,
            read: OpCost::new(1.0, 1.0).with_disk(INDEX_READ_IOS),
            write: OpCost::new(2.0, 1.0).with_disk(INDEX_WRITE_IOS),
            max_concurrency: THREAD_POOL,
            buffer_pool_ratio: BUFFER_POOL,
            durability: crate::profile::Durability::Batch,
            default_read_ratio: Some(0.8),
        }
    }

    fn init_state(&self, state: &mut StateMap) {
        state.insert("segments".to_string(), 0.0);
    }

    fn tick(&self, ctx: TickContext<'_>) -> TickEffect {
        let mut segments = ctx.state.get("segments").copied().unwrap_or(0.0);
        segments += ctx.writes * SEGMENTS_PER_WRITE - segments * MERGE_RATE;
        segments = segments.clamp(0.0, MAX_SEGMENTS);
        ctx.state.insert("segments".to_string(), segments);

        let pressure = segments / MAX_SEGMENTS;
        let mut effect = TickEffect::with_metric("segment_pressure", pressure);
        effect.latency = BASE_READ_LATENCY_MS;

        if pressure > MERGE_KNEE {
            let severity = (pressure - MERGE_KNEE) / (1.0 - MERGE_KNEE);
            effect.cap_multiplier = 1.0 - 0.4 * severity;
            effect.latency = BASE_READ_LATENCY_MS * (1.0 + 4.0 * severity);
        }
        effect.saturated = pressure > 0.95;
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::testutil::ctx;
    use approx::assert_relative_eq;

    #[test]
    fn test_indexing_builds_segments() {
        let mut state = StateMap::new();
        Elasticsearch.init_state(&mut state);

        Elasticsearch.tick(ctx(0.0, 1000.0, 1e6, &mut state));
        assert_relative_eq!(state["segments"], 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_merges_reclaim_segments() {
        let mut state = StateMap::new();
        state.insert("segments".to_string(), 100.0);

        Elasticsearch.tick(ctx(0.0, 0.0, 1e6, &mut state));
        assert_relative_eq!(state["segments"], 95.0, epsilon = 1e-9);
    }

    #[test]
    fn test_merge_pressure_degrades_queries() {
        let mut state = StateMap::new();
        // Land on 70 segments after this tick's merge: severity 0.5.
        state.insert("segments".to_string(), 70.0 / 0.95);

        let effect = Elasticsearch.tick(ctx(0.0, 0.0, 1e6, &mut state));
        assert_relative_eq!(effect.cap_multiplier, 0.8, epsilon = 1e-6);
        assert_relative_eq!(effect.latency, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_quiet_index_fast_queries() {
        let mut state = StateMap::new();
        Elasticsearch.init_state(&mut state);

        let effect = Elasticsearch.tick(ctx(1000.0, 0.0, 1e6, &mut state));
        assert_eq!(effect.cap_multiplier, 1.0);
        assert_relative_eq!(effect.latency, 1.0, epsilon = 1e-9);
        assert!(!effect.saturated);
    }
}
