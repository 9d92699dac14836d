//! Log setup: a daily file under the state directory, plus the most recent
//! warning or error kept in memory for the dashboard footer.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use chrono::{DateTime, Local};
use tracing::field::{Field, Visit};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, layer::Context, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
    Layer,
};

/// Daily files kept before the appender prunes the oldest.
const LOG_FILES_KEPT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        })
    }
}

/// A warning or error worth surfacing in the footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub severity: Severity,
    pub target: String,
    pub message: String,
    pub at: DateTime<Local>,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.at.format("%H:%M:%S"),
            self.severity,
            self.target,
            self.message
        )
    }
}

/// Shared slot holding the latest [`Problem`]; cloning shares the slot.
#[derive(Debug, Clone, Default)]
pub struct ProblemLog {
    latest: Arc<Mutex<Option<Problem>>>,
}

impl ProblemLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Problem> {
        self.latest.lock().ok()?.clone()
    }

    fn record(&self, problem: Problem) {
        if let Ok(mut slot) = self.latest.lock() {
            *slot = Some(problem);
        }
    }
}

/// Where the daily log files go: `MEMVIZ_LOG_DIR`, else the user's state
/// directory (`~/.local/state/memviz` on Linux).
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEMVIZ_LOG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("memviz")
}

/// Records WARN and ERROR events into a [`ProblemLog`].
struct ProblemLayer {
    log: ProblemLog,
}

impl<S: tracing::Subscriber> Layer<S> for ProblemLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let severity = match *meta.level() {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warn,
            _ => return,
        };
        let mut text = EventText::default();
        event.record(&mut text);
        self.log.record(Problem {
            severity,
            target: meta.target().to_string(),
            message: text.finish(),
            at: Local::now(),
        });
    }
}

/// Flattens an event into `message key=value ...`.
#[derive(Default)]
struct EventText {
    message: String,
    fields: String,
}

impl EventText {
    fn push(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        let _ = if field.name() == "message" {
            write!(self.message, "{value}")
        } else {
            write!(self.fields, " {}={value}", field.name())
        };
    }

    fn finish(self) -> String {
        let mut line = self.message;
        line.push_str(&self.fields);
        line.trim_start().to_string()
    }
}

impl Visit for EventText {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, format_args!("{value}"));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format_args!("{value:?}"));
    }
}

/// `MEMVIZ_LOG`, then `RUST_LOG`, then `info`.
fn env_filter() -> EnvFilter {
    let directives = ["MEMVIZ_LOG", "RUST_LOG"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_default();
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

fn file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("memviz")
        .filename_suffix("log")
        .max_log_files(LOG_FILES_KEPT)
        .build(dir)
        .with_context(|| format!("opening log file in {}", dir.display()))
}

/// Install the global subscriber and return the footer's problem slot.
///
/// Nothing is written to the terminal, which belongs to the dashboard. If the
/// log directory is unusable the app runs without a log file.
pub fn init() -> ProblemLog {
    let problems = ProblemLog::new();

    let dir = log_dir();
    let file_layer = match file_appender(&dir) {
        Ok(appender) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(appender)
                .with_ansi(false),
        ),
        Err(err) => {
            eprintln!("memviz: logging to file disabled: {err:#}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(ProblemLayer {
            log: problems.clone(),
        })
        .init();

    problems
}
