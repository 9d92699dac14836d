use std::any::Any;
use std::collections::HashMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};

use memviz_config::Settings;
use memviz_core::{
    bus::EventBus,
    event::{Event, PanelIds},
    logging::{self, ProblemLog},
    module::Module,
    registry::ModuleRegistry,
    state::AppState,
    timer::TimerQueue,
};
use memviz_sampler::{format::format_uptime, CounterSource, OwnerDirectory, ProcFs, SystemUsers};
use memviz_ui::{
    layout::{dashboard_layout, panel_columns},
    renderer::PanelRenderer,
    shell::{render_shell, ShellView, FOOTER_HEIGHT},
};

use memviz_mod_procs::ProcessesModule;
use memviz_mod_ram::RamModule;

/// Upper bound on how long one input poll may block.
const FRAME_BUDGET: Duration = Duration::from_millis(16);

/// A type-erased render function that downcasts a panel via `Any` and draws
/// it into its slot.
type RenderFn = Box<dyn Fn(&dyn Any, &mut Frame, Rect, bool)>;

/// Everything a panel needs to sample, supplied by the composition root.
struct Sources {
    processes: Box<dyn CounterSource>,
    memory: Box<dyn CounterSource>,
    owners: Box<dyn OwnerDirectory>,
}

/// Work only the owner of the terminal can carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostAction {
    Suspend,
}

struct App {
    state: AppState,
    registry: ModuleRegistry,
    bus: EventBus,
    timers: TimerQueue,
    problems: ProblemLog,
    render_map: HashMap<String, RenderFn>,
}

/// Register a panel that also implements `PanelRenderer`.
///
/// Inserts the panel into the registry and captures a type-aware render
/// closure in `render_map` so the app can call `render_panel` without
/// knowing the concrete panel type.
fn register_module<M: Module + PanelRenderer + 'static>(
    registry: &mut ModuleRegistry,
    render_map: &mut HashMap<String, RenderFn>,
    module: M,
) -> Result<()> {
    let id = module.id().to_string();
    render_map.insert(
        id,
        Box::new(|any, f, area, focused| {
            if let Some(m) = any.downcast_ref::<M>() {
                m.render_panel(f, area, focused);
            }
        }),
    );
    registry.register(Box::new(module))
}

impl App {
    fn new(settings: &Settings, sources: Sources, problems: ProblemLog) -> Result<Self> {
        let ids = PanelIds::new();
        let mut registry = ModuleRegistry::new();
        let mut render_map: HashMap<String, RenderFn> = HashMap::new();

        register_module(
            &mut registry,
            &mut render_map,
            ProcessesModule::new(
                ids.next(),
                settings.processes.interval(),
                sources.processes,
                sources.owners,
                settings.page_size,
            ),
        )?;
        register_module(
            &mut registry,
            &mut render_map,
            RamModule::new(
                ids.next(),
                settings.ram.interval(),
                sources.memory,
                settings.ram.history_capacity,
            ),
        )?;

        let mut bus = EventBus::new();
        for seed in registry.init_all() {
            bus.publish(seed);
        }

        Ok(Self {
            state: AppState::new(),
            registry,
            bus,
            timers: TimerQueue::new(),
            problems,
            render_map,
        })
    }

    /// How long the next input poll may block.
    fn poll_timeout(&self, now: Instant) -> Duration {
        if self.bus.has_pending() {
            return Duration::ZERO;
        }
        self.timers
            .time_until_next(now)
            .map_or(FRAME_BUDGET, |d| d.min(FRAME_BUDGET))
    }

    /// Translate one terminal event into bus traffic or a host action.
    fn handle_terminal_event(&mut self, ev: CEvent) -> Option<HostAction> {
        match ev {
            CEvent::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            CEvent::Resize(cols, rows) => {
                self.state.terminal_size = (cols, rows);
                self.bus.publish(Event::Resize { cols, rows });
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<HostAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => self.bus.publish(Event::Quit),
            KeyCode::Char('c') if ctrl => self.bus.publish(Event::Quit),
            KeyCode::Char('z') if ctrl => return Some(HostAction::Suspend),
            KeyCode::Tab => {
                self.registry.cycle_next();
                self.sync_status_line();
            }
            KeyCode::BackTab => {
                self.registry.cycle_prev();
                self.sync_status_line();
            }
            _ => self.bus.publish(Event::Key(key)),
        }
        None
    }

    fn sync_status_line(&mut self) {
        if let Some(m) = self.registry.focused() {
            self.state.status_line = format!("focus: {}", m.title());
        }
    }

    /// Move due timers onto the bus, then drain and broadcast. Returns
    /// `true` once a quit has been delivered.
    fn pump(&mut self, now: Instant) -> bool {
        for ev in self.timers.pop_due(now) {
            self.bus.publish(ev);
        }

        for ev in self.bus.drain() {
            let quit = matches!(ev, Event::Quit);
            for follow_up in self.registry.broadcast(&ev) {
                self.timers.schedule(now, follow_up);
            }
            if quit {
                tracing::info!(uptime_s = self.state.uptime().as_secs(), "quit requested");
                return true;
            }
        }
        false
    }

    fn draw(&self, f: &mut Frame) {
        let rects = dashboard_layout(f.area(), FOOTER_HEIGHT);
        let focused_id = self.registry.focused_id();
        let status = self
            .registry
            .focused()
            .map(|m| m.status())
            .unwrap_or_default();

        let view = ShellView {
            focused_title: self.registry.focused().map_or("", |m| m.title()),
            status_line: &self.state.status_line,
            uptime: format_uptime(self.state.uptime().as_secs()),
            hints: status.hints,
            readings: status.readings,
            warning: self.problems.latest().map(|p| p.to_string()),
        };

        render_shell(f, rects, view, |f, area| {
            let slots = panel_columns(area, self.registry.len());
            for (m, slot) in self.registry.iter().zip(slots) {
                if let Some(render_fn) = self.render_map.get(m.id()) {
                    render_fn(m.as_any(), f, slot, Some(m.id()) == focused_id);
                }
            }
        });
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Hand the terminal back to the shell and stop until `SIGCONT`.
#[cfg(unix)]
fn suspend(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    use nix::sys::signal::{raise, Signal};

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    tracing::info!("suspending");
    raise(Signal::SIGTSTP).context("failed to stop for job control")?;

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    tracing::info!("resumed");
    Ok(())
}

#[cfg(not(unix))]
fn suspend(_terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    Ok(())
}

fn main() -> Result<()> {
    let problems = logging::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "memviz starting up");

    let settings = Settings::load().context("failed to load settings")?;
    let procfs = ProcFs::open(&settings.proc_root)
        .with_context(|| format!("cannot sample {}", settings.proc_root.display()))?;
    let users = SystemUsers::load();
    tracing::info!(
        proc_root = %procfs.root().display(),
        users = users.len(),
        "process accounting ready"
    );

    let sources = Sources {
        processes: Box::new(procfs.clone()),
        memory: Box::new(procfs),
        owners: Box::new(users),
    };
    let mut app = App::new(&settings, sources, problems)?;

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(terminal)?;
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.handle_terminal_event(CEvent::Resize(size.width, size.height));

    loop {
        // ── Render ──
        terminal.draw(|f| app.draw(f))?;

        // ── Poll → Publish ──
        if event::poll(app.poll_timeout(Instant::now()))? {
            if let Some(HostAction::Suspend) = app.handle_terminal_event(event::read()?) {
                suspend(terminal)?;
                // The window may have changed while we were stopped.
                let size = terminal.size()?;
                app.handle_terminal_event(CEvent::Resize(size.width, size.height));
            }
        }

        // ── Timers → Drain → Broadcast ──
        if app.pump(Instant::now()) {
            return Ok(());
        }
    }
}
