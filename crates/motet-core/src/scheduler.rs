//! Time-ordered event queue.
//!
//! Events are kept sorted ascending by time; events at the same time keep
//! the order in which they were scheduled. Most scheduling is monotonic, so
//! insertion first tries to append and only scans when that fails.

use crate::context::Context;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// One-shot callback run by the dispatcher. Receives the event's own time.
pub type EventCallback = Box<dyn FnOnce(&mut Context, f64) + Send>;

/// Callback queued with [`Context::next_tick`]. Receives the cycle's
/// playback time.
pub type TickCallback = Box<dyn FnOnce(&mut Context, f64) + Send>;

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`Context::sched`]. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EventId(u64);

impl EventId {
    /// Returned when nothing was scheduled.
    pub const NONE: EventId = EventId(0);

    pub(crate) fn next() -> Self {
        EventId(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct ScheduledEvent {
    pub id: EventId,
    pub time: f64,
    pub callback: EventCallback,
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("id", &self.id)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<ScheduledEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Insert keeping time order; ties go after existing events.
    pub fn push(&mut self, time: f64, callback: EventCallback) -> EventId {
        let id = EventId::next();
        let event = ScheduledEvent { id, time, callback };

        match self.events.back() {
            Some(last) if time < last.time => {
                let index = self
                    .events
                    .iter()
                    .position(|e| time < e.time)
                    .unwrap_or(self.events.len());
                self.events.insert(index, event);
            }
            _ => self.events.push_back(event),
        }
        id
    }

    /// Remove the event with `id`. Returns whether something was removed.
    pub fn remove(&mut self, id: EventId) -> bool {
        match self.events.iter().position(|e| e.id == id) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.events.iter().any(|e| e.id == id)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.events.front().map(|e| e.time)
    }

    /// Pop the head when it is due at or before `boundary`.
    pub fn pop_due(&mut self, boundary: f64) -> Option<ScheduledEvent> {
        match self.events.front() {
            Some(head) if head.time <= boundary => self.events.pop_front(),
            _ => None,
        }
    }

    /// Event times in queue order.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().map(|e| e.time)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
