use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Default number of points kept for a time-series panel.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// One sample of a time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePoint {
    pub at: DateTime<Local>,
    pub value: f64,
}

impl TimePoint {
    pub fn new(at: DateTime<Local>, value: f64) -> Self {
        Self { at, value }
    }
}

/// Fixed-capacity, insertion-ordered sample window.
///
/// Appending past capacity evicts from the front, so the buffer always holds
/// the most recent `capacity` points in chronological order.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    points: VecDeque<T>,
    capacity: usize,
}

impl<T> Default for BoundedHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: T) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.points.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.points.front()
    }
}
