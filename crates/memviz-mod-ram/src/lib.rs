use std::any::Any;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use memviz_core::{
    event::{Event, PanelId, Scheduled},
    history::{BoundedHistory, TimePoint},
    module::{Module, StatusContribution},
    tick::TickGate,
};
use memviz_sampler::{format::format_percent, sample_memory, CounterSource};

mod render;

const MAX_GAUGE_WIDTH: u16 = 80;
const PADDING: u16 = 2;

/// Used-RAM gauge plus a bounded chart of recent readings.
pub struct RamModule {
    gate: TickGate,
    source: Box<dyn CounterSource>,
    history: BoundedHistory<TimePoint>,
    gauge_width: u16,
    paused: bool,
}

impl RamModule {
    pub fn new(
        id: PanelId,
        interval: Duration,
        source: Box<dyn CounterSource>,
        history_capacity: usize,
    ) -> Self {
        Self {
            gate: TickGate::new(id, interval),
            source,
            history: BoundedHistory::new(history_capacity),
            gauge_width: MAX_GAUGE_WIDTH,
            paused: false,
        }
    }

    pub fn history(&self) -> &BoundedHistory<TimePoint> {
        &self.history
    }

    /// Most recent used-RAM percentage.
    pub fn latest(&self) -> Option<f64> {
        self.history.latest().map(|p| p.value)
    }

    pub fn gauge_width(&self) -> u16 {
        self.gauge_width
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn on_tick(&mut self, id: PanelId, tag: u64) -> Option<Scheduled> {
        if self.paused || !self.gate.accepts(id, tag) {
            return None;
        }
        match sample_memory(self.source.as_ref()) {
            Ok(pct) => {
                self.history.push(TimePoint::new(Local::now(), pct));
                tracing::debug!(panel = %self.gate.id(), used = pct, "ram sample");
            }
            Err(err) => {
                tracing::warn!(panel = %self.gate.id(), error = %err, "ram sample failed");
            }
        }
        Some(self.gate.rearm())
    }

    fn on_resize(&mut self, cols: u16) {
        self.gauge_width = cols
            .saturating_sub(PADDING * 2 + 4)
            .min(MAX_GAUGE_WIDTH);
    }

    fn on_key(&mut self, key: &KeyEvent) -> Option<Scheduled> {
        if key.kind != KeyEventKind::Press || key.code != KeyCode::Char('p') {
            return None;
        }
        self.paused = !self.paused;
        if self.paused {
            self.gate.park();
            None
        } else {
            Some(Scheduled::after(Duration::ZERO, self.gate.first_tick()))
        }
    }
}

impl Module for RamModule {
    fn id(&self) -> &'static str {
        "ram"
    }

    fn title(&self) -> &'static str {
        "RAM"
    }

    fn init(&mut self) -> Option<Event> {
        Some(self.gate.first_tick())
    }

    fn update(&mut self, ev: &Event) -> Option<Scheduled> {
        match ev {
            Event::Tick { id, tag } => self.on_tick(*id, *tag),
            Event::Resize { cols, .. } => {
                self.on_resize(*cols);
                None
            }
            Event::Key(key) => self.on_key(key),
            Event::Quit => {
                self.gate.park();
                None
            }
        }
    }

    fn status(&self) -> StatusContribution {
        let used = self.latest().map_or_else(|| "--%".to_string(), format_percent);
        let mut readings = vec![format!("RAM {used}")];
        if self.paused {
            readings.push("paused".into());
        }
        StatusContribution {
            hints: vec!["p pause".into()],
            readings,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
