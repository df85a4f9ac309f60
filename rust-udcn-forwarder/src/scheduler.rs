//! Cancellable one-shot timers.
//!
//! The scheduler never runs callbacks itself: the owner polls it for due
//! events and dispatches them, so every timer firing is a run-to-completion
//! turn just like a packet arrival.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

/// Handle to a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BinaryHeap<Reverse<(Instant, u64)>>,
    live: HashMap<u64, E>,
    next_id: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            live: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, at: Instant, event: E) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Reverse((at, id)));
        self.live.insert(id, event);
        TimerId(id)
    }

    /// Cancels a timer. Cancelling a fired or already cancelled timer is a no-op.
    pub fn cancel(&mut self, id: TimerId) {
        self.live.remove(&id.0);
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.live.contains_key(&id.0)
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Deadline of the earliest armed timer.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_cancelled();
        self.queue.peek().map(|Reverse((at, _))| *at)
    }

    /// Removes and returns the earliest event due at or before `now`.
    ///
    /// Events with equal deadlines come out in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, E)> {
        self.discard_cancelled();
        let due = matches!(self.queue.peek(), Some(Reverse((at, _))) if *at <= now);
        if !due {
            return None;
        }
        let Reverse((_, id)) = self.queue.pop()?;
        self.live.remove(&id).map(|event| (TimerId(id), event))
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, id))) = self.queue.peek() {
            if self.live.contains_key(id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
