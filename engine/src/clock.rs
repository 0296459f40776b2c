use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Repeating timers never fire more often than this, even if asked for a zero period.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<E> {
    pub id: TimerId,
    pub at: Duration,
    pub event: E,
}

#[derive(Debug)]
struct Timer<E> {
    event: E,
    period: Option<Duration>,
    seq: u64,
}

/// A virtual-time timer queue.
///
/// Nothing here sleeps or spawns: callers move time forward with [`Scheduler::pop_due`]
/// (one event at a time, so a handler may schedule or cancel before the next one is
/// delivered) and [`Scheduler::advance_to`]. Events sharing a deadline are delivered in
/// the order their timers were first scheduled; re-arming keeps a timer's place.
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    // Keyed by deadline, then timer id (scheduling order); `seq` only marks stale entries.
    queue: BinaryHeap<Reverse<(Duration, TimerId, u64)>>,
    timers: HashMap<TimerId, Timer<E>>,
    halted: bool,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
            timers: HashMap::new(),
            halted: false,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of live timers (one-shot or repeating).
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn schedule_after(&mut self, delay: Duration, event: E) -> TimerId {
        self.insert(delay, None, event)
    }

    /// Fires every `period`, first at `now + period`.
    pub fn schedule_every(&mut self, period: Duration, event: E) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(period, Some(period), event)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    /// Cancels everything and refuses new timers from now on.
    pub fn halt(&mut self) {
        self.cancel_all();
        self.halted = true;
    }

    /// Deadline of the earliest live timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue
            .iter()
            .filter(|Reverse((_, id, seq))| self.timers.get(id).is_some_and(|t| t.seq == *seq))
            .map(|Reverse((due, _, _))| *due)
            .min()
    }

    /// Moves the clock forward without delivering anything. Never moves it backwards.
    pub fn advance_to(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        if self.halted {
            log::debug!("scheduler halted; dropping timer {}", id.0);
            return id;
        }
        let seq = self.bump_seq();
        let due = self.now.saturating_add(delay);
        self.queue.push(Reverse((due, id, seq)));
        self.timers.insert(id, Timer { event, period, seq });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<E: Clone> Scheduler<E> {
    /// Delivers the earliest live timer whose deadline is at or before `until`.
    ///
    /// The clock jumps to that deadline. Repeating timers are re-armed one period after
    /// the deadline they just fired at.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<E>> {
        while let Some(&Reverse((due, id, seq))) = self.queue.peek() {
            if due > until {
                return None;
            }
            self.queue.pop();

            let period = match self.timers.get(&id) {
                Some(timer) if timer.seq == seq => timer.period,
                // Cancelled or already re-armed under a newer sequence number.
                _ => continue,
            };
            self.now = self.now.max(due);

            let event = match period {
                Some(period) => {
                    let next_seq = self.bump_seq();
                    let next_due = due.saturating_add(period);
                    let Some(timer) = self.timers.get_mut(&id) else {
                        continue;
                    };
                    timer.seq = next_seq;
                    self.queue.push(Reverse((next_due, id, next_seq)));
                    timer.event.clone()
                }
                None => match self.timers.remove(&id) {
                    Some(timer) => timer.event,
                    None => continue,
                },
            };

            return Some(Fired {
                id,
                at: due,
                event,
            });
        }
        None
    }
}
