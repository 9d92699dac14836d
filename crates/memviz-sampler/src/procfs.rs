//! [`CounterSource`] backed by a Linux `/proc` tree.
//!
//! Parsers are plain functions over file contents so they can be tested
//! without a live system; [`ProcFs`] only joins paths and maps I/O errors.

use std::fs;
use std::path::{Path, PathBuf};

use crate::counters::{CpuTimes, MemoryCounters, Pid, ProcessCounters, SystemCounters};
use crate::error::SourceError;
use crate::source::CounterSource;

/// Aggregate `cpu` line of `/proc/stat`.
///
/// `cpu  user nice system idle iowait irq softirq steal guest guest_nice`;
/// fields after `idle` are optional on old kernels and default to 0.
pub fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse().ok())
        .collect::<Option<_>>()?;
    if fields.len() < 4 {
        return None;
    }
    let at = |i: usize| fields.get(i).copied().unwrap_or(0);
    Some(CpuTimes {
        user: at(0),
        nice: at(1),
        system: at(2),
        idle: at(3),
        iowait: at(4),
        steal: at(7),
    })
}

/// `MemTotal`, `MemFree`, `Buffers` and `Cached` from `/proc/meminfo`.
pub fn parse_meminfo(meminfo: &str) -> Option<MemoryCounters> {
    let mut total = None;
    let mut free = None;
    let mut buffers = None;
    let mut cached = None;
    for line in meminfo.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match key {
            "MemTotal" => &mut total,
            "MemFree" => &mut free,
            "Buffers" => &mut buffers,
            "Cached" => &mut cached,
            _ => continue,
        };
        *slot = rest.split_whitespace().next().and_then(|v| v.parse().ok());
    }
    Some(MemoryCounters {
        total_kib: total?,
        free_kib: free?,
        buffers_kib: buffers.unwrap_or(0),
        cached_kib: cached.unwrap_or(0),
    })
}

/// Command name and utime + stime from `/proc/<pid>/stat`.
///
/// The command sits between the first `(` and the *last* `)`, since it may
/// itself contain spaces and parentheses.
pub fn parse_pid_stat(line: &str) -> Option<(String, u64)> {
    let l = line.find('(')?;
    let r = line.rfind(')')?;
    if r <= l {
        return None;
    }

    let comm = line[l + 1..r].to_string();
    let rest: Vec<&str> = line[r + 1..].split_whitespace().collect();

    // rest[0] is field 3 (state); utime and stime are fields 14 and 15.
    let utime: u64 = rest.get(11)?.parse().ok()?;
    let stime: u64 = rest.get(12)?.parse().ok()?;
    Some((comm, utime.saturating_add(stime)))
}

/// Resident and shared page counts from `/proc/<pid>/statm`.
pub fn parse_statm(statm: &str) -> Option<(u64, u64)> {
    let mut fields = statm.split_whitespace().skip(1);
    let resident = fields.next()?.parse().ok()?;
    let shared = fields.next()?.parse().ok()?;
    Some((resident, shared))
}

/// Effective uid from the `Uid:` line of `/proc/<pid>/status`.
pub fn parse_effective_uid(status: &str) -> Option<u32> {
    let line = status.lines().find(|l| l.starts_with("Uid:"))?;
    line.split_whitespace().nth(2)?.parse().ok()
}

/// Reader for a `/proc`-shaped directory.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    /// Open the tree at `root`, verifying that system-wide counters can be
    /// read. Failure here means sampling can never work.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let procfs = Self { root: root.into() };
        if !procfs.root.is_dir() {
            return Err(SourceError::Unavailable {
                path: procfs.root.clone(),
                reason: "not a directory".into(),
            });
        }
        procfs.system_totals().map_err(|err| SourceError::Unavailable {
            path: procfs.root.clone(),
            reason: err.to_string(),
        })?;
        Ok(procfs)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: PathBuf) -> Result<(PathBuf, String), SourceError> {
        match fs::read_to_string(&path) {
            Ok(text) => Ok((path, text)),
            Err(err) => Err(SourceError::read(path, err)),
        }
    }

    fn cpu_times(&self) -> Result<CpuTimes, SourceError> {
        let (path, text) = self.read(self.root.join("stat"))?;
        parse_cpu_times(&text).ok_or_else(|| SourceError::parse(path, "cpu line"))
    }
}

impl CounterSource for ProcFs {
    fn system_totals(&self) -> Result<SystemCounters, SourceError> {
        Ok(SystemCounters {
            cpu: self.cpu_times()?,
            memory: self.memory()?,
        })
    }

    fn memory(&self) -> Result<MemoryCounters, SourceError> {
        let (path, text) = self.read(self.root.join("meminfo"))?;
        parse_meminfo(&text).ok_or_else(|| SourceError::parse(path, "meminfo"))
    }

    fn process_ids(&self) -> Result<Vec<Pid>, SourceError> {
        let entries =
            fs::read_dir(&self.root).map_err(|err| SourceError::read(self.root.clone(), err))?;
        let mut pids: Vec<Pid> = entries
            .flatten()
            .filter_map(|e| e.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn read_process(&self, pid: Pid) -> Result<ProcessCounters, SourceError> {
        let dir = self.root.join(pid.to_string());

        let (path, stat) = self.read(dir.join("stat"))?;
        let (command, cpu_ticks) =
            parse_pid_stat(&stat).ok_or_else(|| SourceError::parse(path, "stat line"))?;

        let (path, status) = self.read(dir.join("status"))?;
        let uid =
            parse_effective_uid(&status).ok_or_else(|| SourceError::parse(path, "Uid line"))?;

        // A vanished or odd statm costs the process its memory figure, not
        // its place in the table.
        let (resident_pages, shared_pages) = fs::read_to_string(dir.join("statm"))
            .ok()
            .and_then(|text| parse_statm(&text))
            .unwrap_or((0, 0));

        Ok(ProcessCounters {
            command,
            cpu_ticks,
            resident_pages,
            shared_pages,
            uid,
        })
    }
}
