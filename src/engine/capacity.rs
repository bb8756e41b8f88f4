//! Capacity and per-request utilization math.
//!
//! [`block_capacity`] solves for the peak rps a profile can sustain given
//! a read/write mix; [`compute_block`] computes the observable
//! utilizations at an actual rate. Memory and concurrency never bound
//! capacity here — they show up as utilization and drive contention and
//! queueing in the tick simulator.

use crate::catalog::Catalog;
use crate::engine::{BlockResult, Health};
use crate::graph::Node;
use crate::profile::Profile;

/// Maximum requests per second a profile can sustain at the given read
/// ratio (`read_ratio` reads, `1 - read_ratio` writes). Infinite when
/// neither CPU nor disk bounds apply.
pub fn block_capacity(profile: &Profile, read_ratio: f64) -> f64 {
    let write_ratio = 1.0 - read_ratio;
    let mut cap = f64::INFINITY;

    // CPU: weighted cost per request.
    let weighted_cpu_ms = profile.read.cpu_ms * read_ratio + profile.write.cpu_ms * write_ratio;
    if weighted_cpu_ms > 0.0 && profile.cpu_cores > 0 {
        cap = cap.min(f64::from(profile.cpu_cores) * 1000.0 / weighted_cpu_ms);
    }

    // Disk: reads benefit from the buffer pool, writes don't.
    // Sequential IO counts as a tenth of a random IOPS.
    if profile.disk_iops > 0 {
        let mut weighted_ios = 0.0;

        if profile.read.disk_ios > 0.0 {
            let mut read_ios =
                profile.read.disk_ios * (1.0 - profile.buffer_pool_ratio) * read_ratio;
            if profile.read.sequential {
                read_ios /= 10.0;
            }
            weighted_ios += read_ios;
        }

        if profile.write.disk_ios > 0.0 {
            let mut write_ios = profile.write.disk_ios * write_ratio;
            if profile.write.sequential {
                write_ios /= 10.0;
            }
            weighted_ios += write_ios;
        }

        if weighted_ios > 0.0 {
            cap = cap.min(f64::from(profile.disk_iops) / weighted_ios);
        }
    }

    cap
}

/// Profile of a node with its per-instance core override applied, or
/// `None` for `user` and unregistered kinds (infinite passthrough).
pub(crate) fn node_profile(catalog: &Catalog, node: &Node) -> Option<Profile> {
    if node.kind == "user" {
        return None;
    }
    let mut profile = catalog.by_kind(&node.kind)?.profile();
    if node.cpu_cores_override > 0 {
        profile.cpu_cores = node.cpu_cores_override;
    }
    Some(profile)
}

/// Capacity of a node, honoring the core override. Infinite for `user`
/// and unregistered kinds.
pub(crate) fn node_capacity(catalog: &Catalog, node: &Node, read_ratio: f64) -> f64 {
    match node_profile(catalog, node) {
        Some(profile) => block_capacity(&profile, read_ratio),
        None => f64::INFINITY,
    }
}

fn result_name(catalog: &Catalog, node: &Node) -> String {
    if !node.name.is_empty() {
        return node.name.clone();
    }
    catalog
        .by_kind(&node.kind)
        .map(|b| b.display_name().to_string())
        .unwrap_or_else(|| node.kind.clone())
}

/// Observable utilizations of a node at an actual request rate.
///
/// `user` and unregistered kinds short-circuit to zeroed utilization and
/// green health.
pub fn compute_block(catalog: &Catalog, node: &Node, rps: f64, read_ratio: f64) -> BlockResult {
    let mut br = BlockResult {
        id: node.id.clone(),
        kind: node.kind.clone(),
        name: result_name(catalog, node),
        rps,
        cpu_util: 0.0,
        mem_util: 0.0,
        disk_util: 0.0,
        bottleneck: 0.0,
        health: Health::Green,
        queue_depth: 0.0,
        latency_ms: 0.0,
        saturated: false,
        metrics: Default::default(),
    };

    let Some(profile) = node_profile(catalog, node) else {
        return br;
    };

    let write_ratio = 1.0 - read_ratio;
    let read_rps = rps * read_ratio;
    let write_rps = rps * write_ratio;

    // CPU utilization, weighted by read and write costs.
    if profile.cpu_cores > 0 {
        let cpu_cap = f64::from(profile.cpu_cores) * 1000.0;
        br.cpu_util = (read_rps * profile.read.cpu_ms + write_rps * profile.write.cpu_ms) / cpu_cap;
    }

    // Memory: in-flight requests hold memory. The in-flight count follows
    // Little's law with CPU time as the service time, bounded by the
    // concurrency limit.
    let weighted_cpu_ms = profile.read.cpu_ms * read_ratio + profile.write.cpu_ms * write_ratio;
    let weighted_mem_mb =
        profile.read.memory_mb * read_ratio + profile.write.memory_mb * write_ratio;
    let concurrent = (rps * weighted_cpu_ms / 1000.0).min(f64::from(profile.max_concurrency));
    if profile.memory_mb > 0 {
        br.mem_util = concurrent * weighted_mem_mb / f64::from(profile.memory_mb);
    }

    // Disk: same shape as the capacity bound, at the actual rates.
    if profile.disk_iops > 0 {
        let mut ios_per_sec = 0.0;

        if profile.read.disk_ios > 0.0 {
            let mut read_ios = read_rps * profile.read.disk_ios * (1.0 - profile.buffer_pool_ratio);
            if profile.read.sequential {
                read_ios /= 10.0;
            }
            ios_per_sec += read_ios;
        }

        if profile.write.disk_ios > 0.0 {
            let mut write_ios = write_rps * profile.write.disk_ios;
            if profile.write.sequential {
                write_ios /= 10.0;
            }
            ios_per_sec += write_ios;
        }

        br.disk_util = ios_per_sec / f64::from(profile.disk_iops);
    }

    br.bottleneck = br.cpu_util.max(br.mem_util).max(br.disk_util);
    br.health = Health::from_bottleneck(br.bottleneck);
    br
}
