use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MEMVIZ_CONFIG";

const DEFAULT_INTERVAL_MS: u64 = 1000;
const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Runtime settings loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Root of the process accounting filesystem.
    pub proc_root: PathBuf,
    /// Bytes per memory page, used to convert page counts.
    pub page_size: u64,
    pub processes: ProcessesSettings,
    pub ram: RamSettings,
}

/// Processes panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProcessesSettings {
    pub interval_ms: u64,
}

/// RAM panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RamSettings {
    pub interval_ms: u64,
    /// Points kept for the usage chart.
    pub history_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            page_size: 4096,
            processes: ProcessesSettings::default(),
            ram: RamSettings::default(),
        }
    }
}

impl Default for ProcessesSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl Default for RamSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl ProcessesSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl RamSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Settings {
    /// Parse and validate settings TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: Self = toml::from_str(input).context("failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;

        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid settings at {}", path.display()))
    }

    /// Resolve settings for this run.
    ///
    /// Precedence: `MEMVIZ_CONFIG` (must exist) > `<config_dir>/memviz/config.toml`
    /// (if present) > built-in defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.proc_root.as_os_str().is_empty() {
            bail!("proc_root must not be empty");
        }
        if self.page_size == 0 {
            bail!("page_size must be greater than zero");
        }
        validate_interval("processes.interval_ms", self.processes.interval_ms)?;
        validate_interval("ram.interval_ms", self.ram.interval_ms)?;
        if self.ram.history_capacity == 0 {
            bail!("ram.history_capacity must be at least 1");
        }
        Ok(())
    }
}

/// `<config_dir>/memviz/config.toml`, when the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("memviz").join("config.toml"))
}

fn validate_interval(field: &str, ms: u64) -> Result<()> {
    if ms == 0 {
        bail!("{field} must be greater than zero");
    }
    Ok(())
}
