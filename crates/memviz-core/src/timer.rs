use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::event::{Event, Scheduled};

struct Pending {
    due: Instant,
    seq: u64,
    event: Event,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Delayed events waiting to be published on the bus.
///
/// The host loop pushes every [`Scheduled`] follow-up returned by a module
/// and, once per iteration, moves whatever is due onto the
/// [`EventBus`](crate::bus::EventBus). Events with the same deadline come out
/// in the order they were scheduled.
#[derive(Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Pending>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, scheduled: Scheduled) {
        self.seq += 1;
        self.heap.push(Pending {
            due: now + scheduled.delay,
            seq: self.seq,
            event: scheduled.event,
        });
    }

    /// Remove and return every event due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Event> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|p| p.due <= now) {
            if let Some(p) = self.heap.pop() {
                due.push(p.event);
            }
        }
        due
    }

    /// Time left until the earliest deadline, `None` when nothing is pending.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.heap
            .peek()
            .map(|p| p.due.saturating_duration_since(now))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PanelId;

    fn tick(id: u64, tag: u64) -> Event {
        Event::Tick {
            id: PanelId::from(id),
            tag,
        }
    }

    fn tags(events: &[Event]) -> Vec<u64> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Tick { tag, .. } => Some(*tag),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        q.schedule(t0, Scheduled::after(Duration::from_secs(1), tick(1, 1)));
        assert!(q.pop_due(t0).is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn due_events_come_out_earliest_first() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        q.schedule(t0, Scheduled::after(Duration::from_millis(300), tick(1, 3)));
        q.schedule(t0, Scheduled::after(Duration::from_millis(100), tick(1, 1)));
        q.schedule(t0, Scheduled::after(Duration::from_millis(200), tick(1, 2)));
        let due = q.pop_due(t0 + Duration::from_millis(250));
        assert_eq!(tags(&due), vec![1, 2]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn equal_deadlines_keep_schedule_order() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        for tag in 1..=4 {
            q.schedule(t0, Scheduled::after(Duration::ZERO, tick(1, tag)));
        }
        assert_eq!(tags(&q.pop_due(t0)), vec![1, 2, 3, 4]);
        assert!(q.is_empty());
    }

    #[test]
    fn time_until_next_reports_earliest() {
        let mut q = TimerQueue::new();
        let t0 = Instant::now();
        assert_eq!(q.time_until_next(t0), None);
        q.schedule(t0, Scheduled::after(Duration::from_millis(500), tick(1, 1)));
        q.schedule(t0, Scheduled::after(Duration::from_millis(40), tick(2, 1)));
        assert_eq!(q.time_until_next(t0), Some(Duration::from_millis(40)));
        assert_eq!(
            q.time_until_next(t0 + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
