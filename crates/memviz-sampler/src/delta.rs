//! Arithmetic over two counter snapshots.

use crate::counters::{CpuTimes, MemoryCounters};

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Total system CPU ticks elapsed between two snapshots.
///
/// Counts user, nice, system, idle, iowait and steal. Goes negative if the
/// counters went backwards; callers treat that as "no data".
pub fn total_delta(before: &CpuTimes, after: &CpuTimes) -> f64 {
    busy_and_idle(after) - busy_and_idle(before)
}

fn busy_and_idle(t: &CpuTimes) -> f64 {
    [t.user, t.nice, t.system, t.idle, t.iowait, t.steal]
        .into_iter()
        .map(|ticks| ticks as f64)
        .sum()
}

/// Share of the interval one process spent on CPU, in `[0, 100]`.
///
/// Zero when the interval is empty or unusable, or when the process
/// counter ran backwards.
pub fn cpu_percent(before_ticks: u64, after_ticks: u64, total_delta: f64) -> f64 {
    if total_delta.is_nan() || total_delta <= 0.0 || after_ticks < before_ticks {
        return 0.0;
    }
    let delta = (after_ticks - before_ticks) as f64;
    (delta / total_delta * 100.0).clamp(0.0, 100.0)
}

/// Resident memory not shared with other processes, in MiB.
pub fn private_mib(resident_pages: u64, shared_pages: u64, page_size: u64) -> f64 {
    let pages = resident_pages.saturating_sub(shared_pages);
    pages as f64 * page_size as f64 / BYTES_PER_MIB
}

/// Used RAM as a percentage of the total, in `[0, 100]`.
pub fn memory_used_percent(memory: &MemoryCounters) -> f64 {
    if memory.total_kib == 0 {
        return 0.0;
    }
    let pct = memory.used_kib() as f64 / memory.total_kib as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}
