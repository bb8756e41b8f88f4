//! Static resource profiles for block kinds.
//!
//! A [`Profile`] is the fixed resource envelope of a kind: core count,
//! memory, disk IOPS, per-operation costs, and a concurrency limit. The
//! capacity and utilization math in the engine is driven entirely by
//! these numbers.

use serde::{Deserialize, Serialize};

/// IOPS of the SSD tier assigned to disk-backed kinds.
pub const SSD_DISK_IOPS: u32 = 50_000;

/// IOPS of the HDD tier.
pub const HDD_DISK_IOPS: u32 = 200;

/// How a kind persists writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Durability {
    /// No durability guarantees (in-memory, stateless).
    #[default]
    None,
    /// Writes are batched before hitting stable storage.
    Batch,
    /// Every write is individually flushed.
    PerWrite,
}

/// Cost of a single read or write operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpCost {
    /// CPU time per operation, in milliseconds.
    pub cpu_ms: f64,
    /// Memory held per in-flight operation, in MB.
    pub memory_mb: f64,
    /// Disk I/Os per operation.
    pub disk_ios: f64,
    /// Sequential I/O pattern (counts as a tenth of a random I/O).
    pub sequential: bool,
}

impl OpCost {
    /// Creates a CPU/memory-only cost with no disk component.
    pub const fn new(cpu_ms: f64, memory_mb: f64) -> Self {
        Self {
            cpu_ms,
            memory_mb,
            disk_ios: 0.0,
            sequential: false,
        }
    }

    /// Adds a random-access disk component.
    pub const fn with_disk(mut self, ios: f64) -> Self {
        self.disk_ios = ios;
        self
    }

    /// Adds a sequential disk component.
    pub const fn with_sequential_disk(mut self, ios: f64) -> Self {
        self.disk_ios = ios;
        self.sequential = true;
        self
    }
}

/// Static resource envelope of a block kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Number of CPU cores. Zero means the kind is not CPU-modeled.
    pub cpu_cores: u32,
    /// Total memory, in MB.
    pub memory_mb: u32,
    /// Disk IOPS budget. Zero means the kind is not disk-modeled.
    pub disk_iops: u32,
    /// Cost of one read.
    pub read: OpCost,
    /// Cost of one write.
    pub write: OpCost,
    /// Concurrency limit (threads, connections, in-flight requests).
    pub max_concurrency: u32,
    /// Fraction of reads served from the buffer pool instead of disk.
    pub buffer_pool_ratio: f64,
    /// Durability class.
    pub durability: Durability,
    /// Suggested read ratio for this kind, surfaced to clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_read_ratio: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_cost_builders() {
        let read = OpCost::new(0.5, 0.5).with_disk(2.0);
        assert_eq!(read.cpu_ms, 0.5);
        assert_eq!(read.disk_ios, 2.0);
        assert!(!read.sequential);

        let log_append = OpCost::new(0.02, 0.01).with_sequential_disk(1.0);
        assert!(log_append.sequential);
    }

    #[test]
    fn test_durability_serde_tokens() {
        assert_eq!(serde_json::to_string(&Durability::None).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&Durability::Batch).unwrap(), "\"batch\"");
        assert_eq!(
            serde_json::to_string(&Durability::PerWrite).unwrap(),
            "\"per-write\""
        );
    }

    #[test]
    fn test_default_profile_is_inert() {
        let p = Profile::default();
        assert_eq!(p.cpu_cores, 0);
        assert_eq!(p.disk_iops, 0);
        assert_eq!(p.durability, Durability::None);
        assert!(p.default_read_ratio.is_none());
    }
}
