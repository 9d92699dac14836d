use crate::counters::{MemoryCounters, Pid, ProcessCounters, ProcessTable, SystemCounters};
use crate::error::SourceError;

/// Read-only access to cumulative OS counters.
///
/// Processes may exit between any two calls. Per-process failures are the
/// caller's to skip; a failing system-wide read fails the whole pass.
pub trait CounterSource {
    fn system_totals(&self) -> Result<SystemCounters, SourceError>;

    /// Memory totals only. Sources that can read memory more cheaply than
    /// the full system snapshot should override this.
    fn memory(&self) -> Result<MemoryCounters, SourceError> {
        Ok(self.system_totals()?.memory)
    }

    fn process_ids(&self) -> Result<Vec<Pid>, SourceError>;

    fn read_process(&self, pid: Pid) -> Result<ProcessCounters, SourceError>;

    /// Read every listed process, leaving out the ones that fail.
    fn capture_processes(&self, pids: &[Pid]) -> ProcessTable {
        let mut table = ProcessTable::with_capacity(pids.len());
        for &pid in pids {
            match self.read_process(pid) {
                Ok(counters) => {
                    table.insert(pid, counters);
                }
                Err(err) => {
                    tracing::trace!(pid, error = %err, "skipping unreadable process");
                }
            }
        }
        table
    }
}
