use std::any::Any;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use memviz_core::{
    event::{Event, PanelId, Scheduled},
    module::{Module, StatusContribution},
    tick::TickGate,
};
use memviz_sampler::{sample_processes, CounterSource, OwnerDirectory, ProcessRow};

mod render;

/// Ranked per-command process table.
///
/// Each accepted tick runs one two-capture pass over the counter source and
/// replaces the rows wholesale. A failed pass leaves the previous rows on
/// screen.
pub struct ProcessesModule {
    gate: TickGate,
    source: Box<dyn CounterSource>,
    owners: Box<dyn OwnerDirectory>,
    page_size: u64,
    rows: Vec<ProcessRow>,
    selected: Option<usize>,
    paused: bool,
    passes: u64,
    last_pass: Option<PassSummary>,
}

#[derive(Debug, Clone, Copy)]
struct PassSummary {
    processes: usize,
    skipped: usize,
    elapsed: Duration,
}

impl ProcessesModule {
    pub fn new(
        id: PanelId,
        interval: Duration,
        source: Box<dyn CounterSource>,
        owners: Box<dyn OwnerDirectory>,
        page_size: u64,
    ) -> Self {
        Self {
            gate: TickGate::new(id, interval),
            source,
            owners,
            page_size,
            rows: Vec::new(),
            selected: None,
            paused: false,
            passes: 0,
            last_pass: None,
        }
    }

    pub fn rows(&self) -> &[ProcessRow] {
        &self.rows
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Accepted ticks so far, including ones whose pass failed.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    fn on_tick(&mut self, id: PanelId, tag: u64) -> Option<Scheduled> {
        if self.paused || !self.gate.accepts(id, tag) {
            tracing::trace!(panel = %self.gate.id(), %id, tag, "ignoring stale tick");
            return None;
        }
        self.passes += 1;
        self.run_pass();
        Some(self.gate.rearm())
    }

    fn run_pass(&mut self) {
        let started = Instant::now();
        match sample_processes(self.source.as_ref(), self.owners.as_ref(), self.page_size) {
            Ok(pass) => {
                self.rows = pass.aggregates.iter().map(ProcessRow::from).collect();
                self.clamp_selection();
                let summary = PassSummary {
                    processes: pass.processes,
                    skipped: pass.skipped,
                    elapsed: started.elapsed(),
                };
                tracing::debug!(
                    panel = %self.gate.id(),
                    rows = self.rows.len(),
                    processes = summary.processes,
                    skipped = summary.skipped,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "process pass complete"
                );
                self.last_pass = Some(summary);
            }
            Err(err) => {
                tracing::warn!(panel = %self.gate.id(), error = %err, "process pass failed");
            }
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = match (self.selected, self.rows.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), n) => Some(i.min(n - 1)),
        };
    }

    fn on_key(&mut self, key: &KeyEvent) -> Option<Scheduled> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let last = self.rows.len().checked_sub(1);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = match (self.selected, last) {
                    (Some(i), Some(last)) => Some((i + 1).min(last)),
                    (None, Some(_)) => Some(0),
                    _ => None,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.map(|i| i.saturating_sub(1));
            }
            KeyCode::Home => self.selected = last.map(|_| 0),
            KeyCode::End => self.selected = last,
            KeyCode::Char('p') => return self.toggle_pause(),
            _ => {}
        }
        None
    }

    fn toggle_pause(&mut self) -> Option<Scheduled> {
        self.paused = !self.paused;
        if self.paused {
            self.gate.park();
            tracing::info!(panel = %self.gate.id(), "processes paused");
            None
        } else {
            tracing::info!(panel = %self.gate.id(), "processes resumed");
            Some(Scheduled::after(Duration::ZERO, self.gate.first_tick()))
        }
    }
}

impl Module for ProcessesModule {
    fn id(&self) -> &'static str {
        "procs"
    }

    fn title(&self) -> &'static str {
        "Processes"
    }

    fn init(&mut self) -> Option<Event> {
        Some(self.gate.first_tick())
    }

    fn update(&mut self, ev: &Event) -> Option<Scheduled> {
        match ev {
            Event::Tick { id, tag } => self.on_tick(*id, *tag),
            Event::Key(key) => self.on_key(key),
            Event::Quit => {
                self.gate.park();
                None
            }
            Event::Resize { .. } => None,
        }
    }

    fn status(&self) -> StatusContribution {
        let mut readings = vec![format!("{} commands", self.rows.len())];
        if let Some(pass) = self.last_pass {
            readings.push(format!(
                "{} procs ({} skipped) in {}ms",
                pass.processes,
                pass.skipped,
                pass.elapsed.as_millis()
            ));
        }
        if self.paused {
            readings.push("paused".into());
        }
        StatusContribution {
            hints: vec!["j/k select".into(), "p pause".into()],
            readings,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    use crossterm::event::KeyModifiers;
    use memviz_sampler::{Pid, ProcessCounters, SourceError, SystemCounters};

    /// Fixed process table; CPU totals advance 1000 ticks per read.
    struct StaticSource {
        procs: HashMap<Pid, ProcessCounters>,
        clock: Cell<u64>,
        fail: std::rc::Rc<Cell<bool>>,
    }

    impl CounterSource for StaticSource {
        fn system_totals(&self) -> Result<SystemCounters, SourceError> {
            if self.fail.get() {
                return Err(SourceError::Unavailable {
                    path: "/fixture/stat".into(),
                    reason: "gone".into(),
                });
            }
            let mut totals = SystemCounters::default();
            totals.cpu.idle = self.clock.get();
            self.clock.set(self.clock.get() + 1000);
            Ok(totals)
        }

        fn process_ids(&self) -> Result<Vec<Pid>, SourceError> {
            Ok(self.procs.keys().copied().collect())
        }

        fn read_process(&self, pid: Pid) -> Result<ProcessCounters, SourceError> {
            self.procs.get(&pid).cloned().ok_or(SourceError::Unavailable {
                path: "/fixture".into(),
                reason: "exited".into(),
            })
        }
    }

    fn counters(command: &str, resident: u64) -> ProcessCounters {
        ProcessCounters {
            command: command.into(),
            cpu_ticks: 0,
            resident_pages: resident,
            shared_pages: 0,
            uid: 0,
        }
    }

    fn module_with_fail() -> (ProcessesModule, std::rc::Rc<Cell<bool>>) {
        let fail = std::rc::Rc::new(Cell::new(false));
        let source = StaticSource {
            procs: [
                (1, counters("init", 256)),
                (2, counters("postgres", 2560)),
                (3, counters("postgres", 2560)),
                (4, counters("bash", 512)),
            ]
            .into(),
            clock: Cell::new(0),
            fail: fail.clone(),
        };
        let owners: HashMap<u32, String> = [(0, "root".to_string())].into();
        let module = ProcessesModule::new(
            PanelId::from(5),
            Duration::from_secs(1),
            Box::new(source),
            Box::new(owners),
            4096,
        );
        (module, fail)
    }

    fn module() -> ProcessesModule {
        module_with_fail().0
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn tick(id: u64, tag: u64) -> Event {
        Event::Tick {
            id: PanelId::from(id),
            tag,
        }
    }

    #[test]
    fn init_seeds_first_tick() {
        let mut m = module();
        match m.init() {
            Some(Event::Tick { id, tag }) => {
                assert_eq!(id, PanelId::from(5));
                assert_eq!(tag, 0);
            }
            other => panic!("unexpected seed: {other:?}"),
        }
    }

    #[test]
    fn accepted_tick_ranks_rows_and_rearms() {
        let mut m = module();
        m.init();
        let next = m.update(&tick(5, 0)).expect("follow-up");
        assert_eq!(next.delay, Duration::from_secs(1));
        assert!(matches!(next.event, Event::Tick { tag: 1, .. }));

        let names: Vec<&str> = m.rows().iter().map(|r| r.command.as_str()).collect();
        assert_eq!(names, vec!["postgres", "bash", "init"]);
        assert_eq!(m.rows()[0].count, "2x");
        assert_eq!(m.rows()[0].memory, "20.00 MiB");
        assert_eq!(m.selected(), Some(0));
    }

    #[test]
    fn stale_and_foreign_ticks_change_nothing() {
        let mut m = module();
        m.init();
        m.update(&tick(5, 0));
        m.update(&tick(5, 1));
        assert_eq!(m.passes(), 2);

        assert!(m.update(&tick(5, 1)).is_none());
        assert!(m.update(&tick(7, 2)).is_none());
        assert_eq!(m.passes(), 2);

        assert!(m.update(&tick(5, 2)).is_some());
        assert_eq!(m.passes(), 3);
    }

    #[test]
    fn unscoped_tick_is_accepted() {
        let mut m = module();
        assert!(m.update(&Event::unscoped_tick()).is_some());
        assert_eq!(m.passes(), 1);
    }

    #[test]
    fn failed_pass_keeps_rows_and_rearms() {
        let (mut m, fail) = module_with_fail();
        m.update(&tick(5, 0));
        assert_eq!(m.rows().len(), 3);

        fail.set(true);
        let next = m.update(&tick(5, 1));
        assert!(next.is_some());
        assert_eq!(m.rows().len(), 3);
    }

    #[test]
    fn selection_moves_and_clamps() {
        let mut m = module();
        m.update(&tick(5, 0));

        m.update(&key(KeyCode::Char('j')));
        m.update(&key(KeyCode::Down));
        m.update(&key(KeyCode::Down));
        assert_eq!(m.selected(), Some(2));

        m.update(&key(KeyCode::Char('k')));
        assert_eq!(m.selected(), Some(1));
        m.update(&key(KeyCode::Home));
        assert_eq!(m.selected(), Some(0));
        m.update(&key(KeyCode::Up));
        assert_eq!(m.selected(), Some(0));
        m.update(&key(KeyCode::End));
        assert_eq!(m.selected(), Some(2));
    }

    #[test]
    fn selection_without_rows_is_none() {
        let mut m = module();
        m.update(&key(KeyCode::Down));
        m.update(&key(KeyCode::End));
        assert_eq!(m.selected(), None);
    }

    #[test]
    fn pause_filters_outstanding_tick_and_resume_rearms() {
        let mut m = module();
        let next = m.update(&tick(5, 0)).unwrap();

        assert!(m.update(&key(KeyCode::Char('p'))).is_none());
        assert!(m.is_paused());
        assert!(m.update(&next.event).is_none());
        assert_eq!(m.passes(), 1);

        let resumed = m.update(&key(KeyCode::Char('p'))).expect("resume tick");
        assert_eq!(resumed.delay, Duration::ZERO);
        assert!(m.update(&resumed.event).is_some());
        assert_eq!(m.passes(), 2);
    }

    #[test]
    fn status_lists_hints_and_readings() {
        let mut m = module();
        m.update(&tick(5, 0));
        let status = m.status();
        assert!(status.hints.iter().any(|h| h == "p pause"));
        assert_eq!(status.readings[0], "3 commands");
    }
}
