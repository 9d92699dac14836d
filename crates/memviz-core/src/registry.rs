use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::event::{Event, Scheduled};
use crate::module::Module;

/// Ordered set of panels plus the index of the focused one.
pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
    focused_idx: Option<usize>,
    index: HashMap<String, usize>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            focused_idx: None,
            index: HashMap::new(),
        }
    }

    pub fn register(&mut self, module: Box<dyn Module>) -> Result<()> {
        let id = module.id().to_string();
        if self.index.contains_key(&id) {
            bail!("duplicate module id: {}", id);
        }
        let idx = self.modules.len();
        self.index.insert(id, idx);
        self.modules.push(module);
        if self.focused_idx.is_none() {
            self.focused_idx = Some(0);
        }
        Ok(())
    }

    /// Collect the seed event of every panel, in registration order.
    pub fn init_all(&mut self) -> Vec<Event> {
        self.modules.iter_mut().filter_map(|m| m.init()).collect()
    }

    pub fn focused(&self) -> Option<&dyn Module> {
        self.focused_idx.map(|i| &*self.modules[i])
    }

    pub fn focused_mut(&mut self) -> Option<&mut (dyn Module + 'static)> {
        self.focused_idx.map(|i| &mut *self.modules[i])
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focused_idx.map(|i| self.modules[i].id())
    }

    pub fn cycle_next(&mut self) {
        if self.modules.is_empty() {
            return;
        }
        let cur = self.focused_idx.unwrap_or(0);
        self.focused_idx = Some((cur + 1) % self.modules.len());
    }

    pub fn cycle_prev(&mut self) {
        if self.modules.is_empty() {
            return;
        }
        let cur = self.focused_idx.unwrap_or(0);
        self.focused_idx = Some(if cur == 0 {
            self.modules.len() - 1
        } else {
            cur - 1
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Module> {
        self.modules.iter().map(|m| &**m)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Deliver an event and gather the follow-ups panels ask for.
    ///
    /// Ticks and resizes go to every panel (each tick is filtered by the
    /// panel's own gate); keys go to the focused panel only.
    pub fn broadcast(&mut self, event: &Event) -> Vec<Scheduled> {
        match event {
            Event::Key(_) => self
                .focused_mut()
                .and_then(|m| m.update(event))
                .into_iter()
                .collect(),
            Event::Tick { .. } | Event::Resize { .. } | Event::Quit => self
                .modules
                .iter_mut()
                .filter_map(|m| m.update(event))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PanelId;
    use std::any::Any;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct FakeModule {
        id: &'static str,
        title: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl FakeModule {
        fn new(id: &'static str, title: &'static str) -> Self {
            Self {
                id,
                title,
                events: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn with_log(id: &'static str, title: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                id,
                title,
                events: log,
            }
        }
    }

    impl Module for FakeModule {
        fn id(&self) -> &'static str {
            self.id
        }
        fn title(&self) -> &'static str {
            self.title
        }
        fn init(&mut self) -> Option<Event> {
            Some(Event::unscoped_tick())
        }
        fn update(&mut self, ev: &Event) -> Option<Scheduled> {
            let tag = match ev {
                Event::Tick { .. } => "tick",
                Event::Key(_) => "key",
                Event::Resize { .. } => "resize",
                Event::Quit => "quit",
            };
            self.events.lock().unwrap().push(format!("{}:{}", self.id, tag));
            matches!(ev, Event::Tick { .. }).then(|| {
                Scheduled::after(
                    Duration::from_secs(1),
                    Event::Tick {
                        id: PanelId::from(1),
                        tag: 1,
                    },
                )
            })
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn register_adds_module() {
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::new("a", "Alpha"))).unwrap();
        assert_eq!(reg.len(), 1);
        let titles: Vec<&str> = reg.iter().map(|m| m.title()).collect();
        assert_eq!(titles, vec!["Alpha"]);
    }

    #[test]
    fn duplicate_id_returns_error() {
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::new("a", "Alpha"))).unwrap();
        let err = reg.register(Box::new(FakeModule::new("a", "Alpha2")));
        assert!(err.unwrap_err().to_string().contains("duplicate module id"));
    }

    #[test]
    fn first_register_takes_focus() {
        let mut reg = ModuleRegistry::new();
        assert!(reg.focused().is_none());
        reg.register(Box::new(FakeModule::new("a", "Alpha"))).unwrap();
        assert_eq!(reg.focused_id(), Some("a"));
    }

    #[test]
    fn iter_follows_registration_order() {
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::new("b", "Beta"))).unwrap();
        reg.register(Box::new(FakeModule::new("a", "Alpha"))).unwrap();
        let ids: Vec<&str> = reg.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(reg.focused().unwrap().title(), "Beta");
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::new("a", "Alpha"))).unwrap();
        reg.register(Box::new(FakeModule::new("b", "Beta"))).unwrap();
        reg.register(Box::new(FakeModule::new("c", "Gamma"))).unwrap();

        reg.cycle_next();
        reg.cycle_next();
        assert_eq!(reg.focused_id(), Some("c"));
        reg.cycle_next();
        assert_eq!(reg.focused_id(), Some("a"));
        reg.cycle_prev();
        assert_eq!(reg.focused_id(), Some("c"));
    }

    #[test]
    fn cycle_on_empty_is_noop() {
        let mut reg = ModuleRegistry::new();
        reg.cycle_next();
        reg.cycle_prev();
        assert!(reg.focused().is_none());
    }

    #[test]
    fn init_all_collects_seed_events() {
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::new("a", "Alpha"))).unwrap();
        reg.register(Box::new(FakeModule::new("b", "Beta"))).unwrap();
        assert_eq!(reg.init_all().len(), 2);
    }

    #[test]
    fn broadcast_tick_goes_to_all_and_collects_followups() {
        let log_a = Arc::new(Mutex::new(Vec::new()));
        let log_b = Arc::new(Mutex::new(Vec::new()));
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::with_log("a", "Alpha", log_a.clone())))
            .unwrap();
        reg.register(Box::new(FakeModule::with_log("b", "Beta", log_b.clone())))
            .unwrap();

        let follow_ups = reg.broadcast(&Event::unscoped_tick());
        assert_eq!(follow_ups.len(), 2);
        assert_eq!(log_a.lock().unwrap().as_slice(), &["a:tick"]);
        assert_eq!(log_b.lock().unwrap().as_slice(), &["b:tick"]);
    }

    #[test]
    fn broadcast_key_goes_to_focused_only() {
        let log_a = Arc::new(Mutex::new(Vec::new()));
        let log_b = Arc::new(Mutex::new(Vec::new()));
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::with_log("a", "Alpha", log_a.clone())))
            .unwrap();
        reg.register(Box::new(FakeModule::with_log("b", "Beta", log_b.clone())))
            .unwrap();

        let key = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('x'),
            crossterm::event::KeyModifiers::NONE,
        );
        let follow_ups = reg.broadcast(&Event::Key(key));
        assert!(follow_ups.is_empty());
        assert_eq!(log_a.lock().unwrap().as_slice(), &["a:key"]);
        assert!(log_b.lock().unwrap().is_empty());
    }

    #[test]
    fn broadcast_resize_goes_to_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg = ModuleRegistry::new();
        reg.register(Box::new(FakeModule::with_log("a", "Alpha", log.clone())))
            .unwrap();
        reg.register(Box::new(FakeModule::with_log("b", "Beta", log.clone())))
            .unwrap();
        reg.broadcast(&Event::Resize { cols: 100, rows: 30 });
        assert_eq!(log.lock().unwrap().as_slice(), &["a:resize", "b:resize"]);
    }
}
