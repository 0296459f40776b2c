use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Where the telemetry walk gets its noise. Draws are expected in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Default noise: `StdRng`, seeded from the OS unless a seed is given.
#[derive(Debug, Clone)]
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_os()
    }
}

impl RandomSource for StdRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.5;
        }
        let v = self.draws[self.cursor % self.draws.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBounds {
    pub min: f64,
    pub max: f64,
    pub amplitude: f64,
}

impl MetricBounds {
    pub const fn new(min: f64, max: f64, amplitude: f64) -> Self {
        Self {
            min,
            max,
            amplitude,
        }
    }

    pub fn clamp(self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// One random-walk step: `clamp(prev + (u - 0.5) * amplitude)`.
    pub fn step(self, prev: f64, unit: f64) -> f64 {
        self.clamp(prev + (unit - 0.5) * self.amplitude)
    }
}

pub const FPS_BOUNDS: MetricBounds = MetricBounds::new(30.0, 60.0, 10.0);
pub const CPU_BOUNDS: MetricBounds = MetricBounds::new(5.0, 80.0, 20.0);
pub const GPU_BOUNDS: MetricBounds = MetricBounds::new(2.0, 60.0, 15.0);
pub const MEMORY_BOUNDS: MetricBounds = MetricBounds::new(20.0, 80.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub fps: f64,
    pub cpu_percent: f64,
    pub gpu_percent: f64,
    pub memory_percent: f64,
}

impl Default for PerformanceSample {
    fn default() -> Self {
        Self {
            fps: 60.0,
            cpu_percent: 15.0,
            gpu_percent: 8.0,
            memory_percent: 45.0,
        }
    }
}

impl PerformanceSample {
    pub fn clamped(self) -> Self {
        Self {
            fps: FPS_BOUNDS.clamp(self.fps),
            cpu_percent: CPU_BOUNDS.clamp(self.cpu_percent),
            gpu_percent: GPU_BOUNDS.clamp(self.gpu_percent),
            memory_percent: MEMORY_BOUNDS.clamp(self.memory_percent),
        }
    }

    pub fn in_bounds(&self) -> bool {
        FPS_BOUNDS.contains(self.fps)
            && CPU_BOUNDS.contains(self.cpu_percent)
            && GPU_BOUNDS.contains(self.gpu_percent)
            && MEMORY_BOUNDS.contains(self.memory_percent)
    }
}

/// Bounded random walk over the four readouts.
#[derive(Debug, Clone)]
pub struct MetricsSimulator<R> {
    sample: PerformanceSample,
    rng: R,
    steps: u64,
}

impl<R: RandomSource> MetricsSimulator<R> {
    pub fn new(rng: R) -> Self {
        Self::with_sample(PerformanceSample::default(), rng)
    }

    pub fn with_sample(sample: PerformanceSample, rng: R) -> Self {
        Self {
            sample: sample.clamped(),
            rng,
            steps: 0,
        }
    }

    pub fn sample(&self) -> PerformanceSample {
        self.sample
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Each metric draws independently, in fps, cpu, gpu, memory order.
    pub fn step(&mut self) -> PerformanceSample {
        let prev = self.sample;
        self.sample = PerformanceSample {
            fps: FPS_BOUNDS.step(prev.fps, self.rng.next_unit()),
            cpu_percent: CPU_BOUNDS.step(prev.cpu_percent, self.rng.next_unit()),
            gpu_percent: GPU_BOUNDS.step(prev.gpu_percent, self.rng.next_unit()),
            memory_percent: MEMORY_BOUNDS.step(prev.memory_percent, self.rng.next_unit()),
        };
        self.steps = self.steps.saturating_add(1);
        self.sample
    }
}
