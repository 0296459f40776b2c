use std::time::Duration;

use engine::{HeadlessRunner, Scheduler, Simulation, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Beat {
    Fast,
    Slow,
    StopFast,
}

#[derive(Default)]
struct Metronome {
    fast_timer: Option<TimerId>,
    log: Vec<(u64, Beat)>,
}

impl Simulation for Metronome {
    type Event = Beat;

    fn on_event(&mut self, event: Beat, clock: &mut Scheduler<Beat>) {
        self.log.push((clock.now().as_millis() as u64, event));
        if event == Beat::StopFast {
            if let Some(id) = self.fast_timer.take() {
                clock.cancel(id);
            }
        }
    }
}

fn metronome() -> HeadlessRunner<Metronome> {
    let mut runner = HeadlessRunner::new(Metronome::default());
    runner.with(|m, clock| {
        m.fast_timer = Some(clock.schedule_every(Duration::from_secs(1), Beat::Fast));
        clock.schedule_every(Duration::from_secs(2), Beat::Slow);
    });
    runner
}

#[test]
fn independent_cadences_fire_at_their_own_rates() {
    let mut runner = metronome();
    runner.advance(Duration::from_secs(6));

    let fast = runner.sim().log.iter().filter(|(_, b)| *b == Beat::Fast).count();
    let slow = runner.sim().log.iter().filter(|(_, b)| *b == Beat::Slow).count();
    assert_eq!(fast, 6);
    assert_eq!(slow, 3);
}

#[test]
fn simultaneous_deadlines_fire_in_scheduling_order() {
    let mut runner = metronome();
    runner.advance(Duration::from_secs(2));

    assert_eq!(
        runner.sim().log,
        vec![(1000, Beat::Fast), (2000, Beat::Fast), (2000, Beat::Slow)]
    );
}

#[test]
fn small_steps_and_one_big_step_agree() {
    let mut stepped = metronome();
    for _ in 0..120 {
        stepped.advance(Duration::from_millis(50));
    }

    let mut jumped = metronome();
    jumped.advance(Duration::from_secs(6));

    assert_eq!(stepped.sim().log, jumped.sim().log);
    assert_eq!(stepped.now(), jumped.now());
}

#[test]
fn handler_can_cancel_another_repeating_timer() {
    let mut runner = metronome();
    runner.with(|_, clock| {
        clock.schedule_after(Duration::from_millis(2500), Beat::StopFast);
    });
    runner.advance(Duration::from_secs(10));

    let last_fast = runner
        .sim()
        .log
        .iter()
        .filter(|(_, b)| *b == Beat::Fast)
        .map(|(at, _)| *at)
        .max();
    assert_eq!(last_fast, Some(2000));
    assert_eq!(runner.clock().pending(), 1);
}

#[test]
fn halt_drops_timers_armed_afterwards() {
    let mut runner = metronome();
    runner.halt();
    runner.with(|_, clock| {
        clock.schedule_after(Duration::from_millis(1), Beat::Fast);
    });

    assert_eq!(runner.advance(Duration::from_secs(5)), 0);
    assert!(runner.sim().log.is_empty());
    assert_eq!(runner.clock().pending(), 0);
}
