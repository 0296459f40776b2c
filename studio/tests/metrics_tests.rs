use std::time::Duration;

use studio::metrics::{
    CPU_BOUNDS, FPS_BOUNDS, MetricsSimulator, PerformanceSample, ScriptedRandom, StdRandom,
};
use studio::surface::RecordingSurface;
use studio::{RuntimeConfig, RuntimeSession};

#[test]
fn seeded_walk_never_leaves_bounds() {
    let mut sim = MetricsSimulator::new(StdRandom::seeded(7));
    for _ in 0..10_000 {
        let sample = sim.step();
        assert!(sample.in_bounds(), "out of bounds: {sample:?}");
    }
    assert_eq!(sim.steps(), 10_000);
}

#[test]
fn same_seed_same_walk() {
    let mut a = MetricsSimulator::new(StdRandom::seeded(42));
    let mut b = MetricsSimulator::new(StdRandom::seeded(42));
    for _ in 0..50 {
        assert_eq!(a.step(), b.step());
    }
}

#[test]
fn extremes_pin_to_the_edges() {
    let mut high = MetricsSimulator::new(ScriptedRandom::constant(1.0));
    let mut low = MetricsSimulator::new(ScriptedRandom::constant(0.0));
    for _ in 0..100 {
        high.step();
        low.step();
    }
    assert_eq!(high.sample().fps, FPS_BOUNDS.max);
    assert_eq!(high.sample().cpu_percent, CPU_BOUNDS.max);
    assert_eq!(low.sample().fps, FPS_BOUNDS.min);
    assert_eq!(low.sample().cpu_percent, CPU_BOUNDS.min);
}

#[test]
fn session_steps_metrics_every_two_seconds_regardless_of_play_state() {
    let mut s = RuntimeSession::new(
        RuntimeConfig::default(),
        RecordingSurface::default(),
        ScriptedRandom::constant(1.0),
    );
    assert_eq!(s.current_metrics(), PerformanceSample::default());

    s.advance(Duration::from_millis(1999));
    assert_eq!(s.current_metrics(), PerformanceSample::default());

    s.advance(Duration::from_millis(1));
    assert_eq!(
        s.current_metrics(),
        PerformanceSample {
            fps: 60.0,
            cpu_percent: 25.0,
            gpu_percent: 15.5,
            memory_percent: 50.0,
        }
    );
}
