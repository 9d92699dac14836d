//! One complete sampling pass.

use crate::aggregate::{aggregate, derive_samples, ProcessAggregate};
use crate::delta::{memory_used_percent, total_delta};
use crate::error::SourceError;
use crate::owners::OwnerDirectory;
use crate::rank::rank_by_memory;
use crate::source::CounterSource;

/// Result of [`sample_processes`].
#[derive(Debug, Clone, Default)]
pub struct ProcessPass {
    /// Aggregates ranked by private memory, largest first.
    pub aggregates: Vec<ProcessAggregate>,
    /// Processes that made it into an aggregate.
    pub processes: usize,
    /// Processes listed in the second enumeration but not sampled (exited,
    /// unreadable, or owned by an unknown uid).
    pub skipped: usize,
    pub total_delta: f64,
}

/// Capture every process twice and fold the result into ranked aggregates.
///
/// Order: system totals, enumerate + capture "before", enumerate again,
/// system totals, capture "after". The captures run back to back; the
/// interval between them is whatever the reads took.
pub fn sample_processes(
    source: &dyn CounterSource,
    owners: &dyn OwnerDirectory,
    page_size: u64,
) -> Result<ProcessPass, SourceError> {
    let t1 = source.system_totals()?;
    let first = source.process_ids()?;
    let before = source.capture_processes(&first);

    let second = source.process_ids()?;
    let t2 = source.system_totals()?;
    let after = source.capture_processes(&second);

    let total = total_delta(&t1.cpu, &t2.cpu);
    let samples = derive_samples(&before, &after, total, page_size, owners);
    let processes = samples.len();
    let aggregates = rank_by_memory(aggregate(&samples));

    Ok(ProcessPass {
        aggregates,
        processes,
        skipped: second.len().saturating_sub(processes),
        total_delta: total,
    })
}

/// Used RAM percentage right now.
pub fn sample_memory(source: &dyn CounterSource) -> Result<f64, SourceError> {
    Ok(memory_used_percent(&source.memory()?))
}
