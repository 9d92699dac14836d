//! The sampling-and-aggregation engine.
//!
//! Reads cumulative OS counters through a [`CounterSource`], turns two
//! back-to-back captures into per-process CPU shares and private memory,
//! folds them into per-command aggregates and ranks those for display.
//! Nothing here knows about terminals or timing; panels decide when a pass
//! runs.

pub mod aggregate;
pub mod counters;
pub mod delta;
pub mod error;
pub mod format;
pub mod owners;
pub mod pass;
pub mod procfs;
pub mod rank;
pub mod source;

pub use aggregate::{aggregate, derive_samples, ProcessAggregate, ProcessSample};
pub use counters::{CpuTimes, MemoryCounters, Pid, ProcessCounters, ProcessTable, SystemCounters};
pub use error::SourceError;
pub use owners::{OwnerDirectory, SystemUsers};
pub use pass::{sample_memory, sample_processes, ProcessPass};
pub use procfs::ProcFs;
pub use rank::{rank_by_memory, ProcessRow, COLUMNS};
pub use source::CounterSource;
