//! Per-panel tick coordination.
//!
//! Every panel owns a [`TickGate`]. The gate stamps each scheduled tick with
//! the panel's id and its current tag, and on delivery accepts only a tick
//! that carries both. Ticks meant for another panel instance, delayed
//! duplicates, and ticks issued before the last accepted one all fall
//! through as no-ops. Nothing is ever cancelled: a panel that stops
//! re-arming simply leaves its outstanding tick to be filtered.

use std::time::Duration;

use crate::event::{Event, PanelId, Scheduled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    /// No tick outstanding.
    Idle,
    /// One tick outstanding, stamped with the gate's current tag.
    Awaiting,
}

#[derive(Debug, Clone)]
pub struct TickGate {
    id: PanelId,
    tag: u64,
    interval: Duration,
    state: TickState,
}

impl TickGate {
    pub fn new(id: PanelId, interval: Duration) -> Self {
        Self {
            id,
            tag: 0,
            interval,
            state: TickState::Idle,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn state(&self) -> TickState {
        self.state
    }

    /// The immediate tick that seeds scheduling.
    pub fn first_tick(&mut self) -> Event {
        self.state = TickState::Awaiting;
        Event::Tick {
            id: self.id,
            tag: self.tag,
        }
    }

    /// Whether a tick carrying `(id, tag)` belongs to this gate right now.
    ///
    /// Zero in either position means "unscoped" and matches anything.
    pub fn accepts(&self, id: PanelId, tag: u64) -> bool {
        if id.is_scoped() && id != self.id {
            return false;
        }
        if tag > 0 && tag != self.tag {
            return false;
        }
        true
    }

    /// Consume the current tag and schedule the next tick.
    ///
    /// Call exactly once per accepted tick, after the sampling pass.
    pub fn rearm(&mut self) -> Scheduled {
        self.tag += 1;
        self.state = TickState::Awaiting;
        Scheduled::after(
            self.interval,
            Event::Tick {
                id: self.id,
                tag: self.tag,
            },
        )
    }

    /// Stop re-arming. Any tick still in flight will fail [`accepts`] once
    /// the tag has moved on, so this only records intent.
    ///
    /// [`accepts`]: TickGate::accepts
    pub fn park(&mut self) {
        self.tag += 1;
        self.state = TickState::Idle;
    }
}
