pub mod clock;
pub mod editor;

use std::time::Duration;

pub use clock::{Fired, Scheduler, TimerId};

/// Monotonic run counter used to tell current scheduled work apart from superseded work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Something that reacts to timer events.
///
/// Handlers get the scheduler back so they can arm follow-up timers or cancel their own.
pub trait Simulation {
    type Event: Clone;

    fn on_event(&mut self, event: Self::Event, clock: &mut Scheduler<Self::Event>);
}

/// Owns a simulation and its clock, and feeds due events to it one at a time.
///
/// Every handler runs to completion before the next event is popped, so nothing here
/// needs locking.
#[derive(Debug)]
pub struct HeadlessRunner<S: Simulation> {
    sim: S,
    clock: Scheduler<S::Event>,
    dispatched: u64,
}

impl<S: Simulation> HeadlessRunner<S> {
    pub fn new(sim: S) -> Self {
        Self {
            sim,
            clock: Scheduler::new(),
            dispatched: 0,
        }
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn clock(&self) -> &Scheduler<S::Event> {
        &self.clock
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Total number of events delivered since construction.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Runs `f` with mutable access to both halves, for commands that arm or cancel timers.
    pub fn with<T>(&mut self, f: impl FnOnce(&mut S, &mut Scheduler<S::Event>) -> T) -> T {
        f(&mut self.sim, &mut self.clock)
    }

    /// Moves virtual time forward by `dt`, delivering every event that falls due on the way.
    ///
    /// Returns how many events were delivered.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let target = self.clock.now().saturating_add(dt);
        let mut delivered = 0;
        while let Some(fired) = self.clock.pop_due(target) {
            self.sim.on_event(fired.event, &mut self.clock);
            delivered += 1;
        }
        self.clock.advance_to(target);
        self.dispatched += delivered as u64;
        delivered
    }

    /// Cancels all outstanding timers and stops accepting new ones.
    pub fn halt(&mut self) {
        self.clock.halt();
    }

    pub fn is_halted(&self) -> bool {
        self.clock.is_halted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ping {
        Once(u32),
        Chain(u32),
    }

    #[derive(Default)]
    struct Collector {
        seen: Vec<u32>,
    }

    impl Simulation for Collector {
        type Event = Ping;

        fn on_event(&mut self, event: Ping, clock: &mut Scheduler<Ping>) {
            match event {
                Ping::Once(v) => self.seen.push(v),
                Ping::Chain(v) => {
                    self.seen.push(v);
                    if v < 3 {
                        clock.schedule_after(Duration::from_millis(10), Ping::Chain(v + 1));
                    }
                }
            }
        }
    }

    #[test]
    fn generation_counts_up() {
        let g = Generation::default();
        assert_eq!(g.raw(), 0);
        assert_eq!(g.next().next().raw(), 2);
        assert!(g.next() > g);
    }

    #[test]
    fn runner_delivers_events_up_to_target() {
        let mut runner = HeadlessRunner::new(Collector::default());
        runner.with(|_, clock| {
            clock.schedule_after(Duration::from_millis(5), Ping::Once(1));
            clock.schedule_after(Duration::from_millis(50), Ping::Once(2));
        });

        assert_eq!(runner.advance(Duration::from_millis(10)), 1);
        assert_eq!(runner.sim().seen, vec![1]);
        assert_eq!(runner.now(), Duration::from_millis(10));

        assert_eq!(runner.advance(Duration::from_millis(100)), 1);
        assert_eq!(runner.sim().seen, vec![1, 2]);
        assert_eq!(runner.dispatched(), 2);
    }

    #[test]
    fn handlers_can_chain_follow_up_timers() {
        let mut runner = HeadlessRunner::new(Collector::default());
        runner.with(|_, clock| {
            clock.schedule_after(Duration::from_millis(10), Ping::Chain(1));
        });

        runner.advance(Duration::from_millis(25));
        assert_eq!(runner.sim().seen, vec![1, 2]);

        runner.advance(Duration::from_millis(5));
        assert_eq!(runner.sim().seen, vec![1, 2, 3]);
        assert_eq!(runner.clock().pending(), 0);
    }

    #[test]
    fn halted_runner_delivers_nothing() {
        let mut runner = HeadlessRunner::new(Collector::default());
        runner.with(|_, clock| {
            clock.schedule_every(Duration::from_millis(10), Ping::Once(7));
        });
        runner.advance(Duration::from_millis(10));
        runner.halt();

        assert_eq!(runner.advance(Duration::from_secs(1)), 0);
        assert_eq!(runner.sim().seen, vec![7]);
        assert!(runner.is_halted());
    }
}
