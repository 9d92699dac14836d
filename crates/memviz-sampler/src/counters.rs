use std::collections::HashMap;

pub type Pid = u32;

/// System-wide cumulative CPU time, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub steal: u64,
}

/// System-wide memory totals, in KiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCounters {
    pub total_kib: u64,
    pub free_kib: u64,
    pub buffers_kib: u64,
    pub cached_kib: u64,
}

impl MemoryCounters {
    /// Memory not accounted for by free, buffers or page cache.
    pub fn used_kib(&self) -> u64 {
        self.total_kib
            .saturating_sub(self.free_kib)
            .saturating_sub(self.buffers_kib)
            .saturating_sub(self.cached_kib)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemCounters {
    pub cpu: CpuTimes,
    pub memory: MemoryCounters,
}

/// One process as read at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCounters {
    pub command: String,
    /// utime + stime, in clock ticks.
    pub cpu_ticks: u64,
    pub resident_pages: u64,
    pub shared_pages: u64,
    /// Effective uid.
    pub uid: u32,
}

/// Every process readable during one capture.
pub type ProcessTable = HashMap<Pid, ProcessCounters>;
