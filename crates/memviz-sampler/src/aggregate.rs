use std::collections::HashMap;

use crate::counters::{Pid, ProcessTable};
use crate::delta::{cpu_percent, private_mib};
use crate::owners::OwnerDirectory;

/// One process's share of a sampling interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: Pid,
    pub command: String,
    pub owner: String,
    pub cpu_percent: f64,
    pub private_mib: f64,
}

/// Every process sharing a command name, folded together.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessAggregate {
    pub owner: String,
    pub command: String,
    pub cpu_percent: f64,
    pub private_mib: f64,
    pub count: usize,
}

/// Turn two captures into per-process samples, in ascending pid order.
///
/// Every process in `after` yields a sample unless its owner cannot be
/// resolved. Each uid is asked of `owners` at most once per call. A process
/// absent from `before` started mid-interval and is charged 0% CPU.
pub fn derive_samples(
    before: &ProcessTable,
    after: &ProcessTable,
    total_delta: f64,
    page_size: u64,
    owners: &dyn OwnerDirectory,
) -> Vec<ProcessSample> {
    let mut pids: Vec<Pid> = after.keys().copied().collect();
    pids.sort_unstable();

    let mut names: HashMap<u32, Option<String>> = HashMap::new();
    let mut samples = Vec::with_capacity(pids.len());
    for pid in pids {
        let now = &after[&pid];
        let owner = names
            .entry(now.uid)
            .or_insert_with(|| owners.username(now.uid))
            .clone();
        let Some(owner) = owner else {
            tracing::trace!(pid, uid = now.uid, "dropping process with unknown owner");
            continue;
        };
        let cpu = match before.get(&pid) {
            Some(then) => cpu_percent(then.cpu_ticks, now.cpu_ticks, total_delta),
            None => 0.0,
        };
        samples.push(ProcessSample {
            pid,
            command: now.command.clone(),
            owner,
            cpu_percent: cpu,
            private_mib: private_mib(now.resident_pages, now.shared_pages, page_size),
        });
    }
    samples
}

/// Fold samples by command name into a fresh map.
///
/// The first sample seen for a command decides the aggregate's owner.
pub fn aggregate(samples: &[ProcessSample]) -> HashMap<String, ProcessAggregate> {
    let mut by_command: HashMap<String, ProcessAggregate> = HashMap::new();
    for s in samples {
        let entry = by_command
            .entry(s.command.clone())
            .or_insert_with(|| ProcessAggregate {
                owner: s.owner.clone(),
                command: s.command.clone(),
                cpu_percent: 0.0,
                private_mib: 0.0,
                count: 0,
            });
        entry.cpu_percent += s.cpu_percent;
        entry.private_mib += s.private_mib;
        entry.count += 1;
    }
    by_command
}
