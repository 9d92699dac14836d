use std::collections::HashMap;

use crate::aggregate::ProcessAggregate;
use crate::format::{format_count, format_mib, format_percent};

/// Column headers, in [`ProcessRow::cells`] order.
pub const COLUMNS: [&str; 5] = ["USER", "NAME", "COUNT", "CPU (%)", "MEM (MiB)"];

/// Order aggregates by summed private memory, largest first.
///
/// Ties are left in whatever order they come out of the map.
pub fn rank_by_memory(aggregates: HashMap<String, ProcessAggregate>) -> Vec<ProcessAggregate> {
    let mut ranked: Vec<ProcessAggregate> = aggregates.into_values().collect();
    ranked.sort_unstable_by(|a, b| b.private_mib.total_cmp(&a.private_mib));
    ranked
}

/// One aggregate rendered as display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRow {
    pub user: String,
    pub command: String,
    pub count: String,
    pub cpu: String,
    pub memory: String,
}

impl ProcessRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.user,
            &self.command,
            &self.count,
            &self.cpu,
            &self.memory,
        ]
    }
}

impl From<&ProcessAggregate> for ProcessRow {
    fn from(agg: &ProcessAggregate) -> Self {
        Self {
            user: agg.owner.clone(),
            command: agg.command.clone(),
            count: format_count(agg.count),
            cpu: format_percent(agg.cpu_percent),
            memory: format_mib(agg.private_mib),
        }
    }
}
