use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Process-unique identity of a panel instance.
///
/// `PanelId::UNSCOPED` (zero) marks an event that is not addressed to any
/// particular panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

impl PanelId {
    pub const UNSCOPED: PanelId = PanelId(0);

    pub fn is_scoped(self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for PanelId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out panel ids. Owned by the composition root; ids start at 1 and
/// are never repeated for the lifetime of the allocator.
#[derive(Debug, Default)]
pub struct PanelIds {
    last: AtomicU64,
}

impl PanelIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> PanelId {
        PanelId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Sampling tick. `tag == 0` is unscoped, like `PanelId::UNSCOPED`.
    Tick { id: PanelId, tag: u64 },
    Key(crossterm::event::KeyEvent),
    Resize { cols: u16, rows: u16 },
    Quit,
}

impl Event {
    /// A tick addressed to nobody in particular; every panel accepts it.
    pub fn unscoped_tick() -> Self {
        Event::Tick {
            id: PanelId::UNSCOPED,
            tag: 0,
        }
    }
}

/// A follow-up event the host should publish after `delay` has elapsed.
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub delay: Duration,
    pub event: Event,
}

impl Scheduled {
    pub fn after(delay: Duration, event: Event) -> Self {
        Self { delay, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let ids = PanelIds::new();
        assert_eq!(ids.next(), PanelId::from(1));
        assert_eq!(ids.next(), PanelId::from(2));
        assert_eq!(ids.next(), PanelId::from(3));
    }

    #[test]
    fn separate_allocators_are_independent() {
        let a = PanelIds::new();
        let b = PanelIds::new();
        a.next();
        assert_eq!(b.next(), PanelId::from(1));
    }

    #[test]
    fn unscoped_id_is_zero() {
        assert!(!PanelId::UNSCOPED.is_scoped());
        assert!(PanelId::from(7).is_scoped());
        assert_eq!(PanelId::from(7).to_string(), "#7");
    }
}
