use std::time::Duration;

use crate::pipeline::DEFAULT_STAGES;

pub const DEFAULT_SESSION_TICK: Duration = Duration::from_secs(1);
pub const DEFAULT_METRICS_TICK: Duration = Duration::from_secs(2);
pub const DEFAULT_STAGE_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_FRAME_STEP: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Cadence of the elapsed-time counter while playing.
    pub session_tick: Duration,
    /// Cadence of the synthetic telemetry walk.
    pub metrics_tick: Duration,
    /// Delay before each build stage reports.
    pub stage_delay: Duration,
    /// How far a real-time driver moves the clock per frame.
    pub frame_step: Duration,
    pub stages: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            session_tick: DEFAULT_SESSION_TICK,
            metrics_tick: DEFAULT_METRICS_TICK,
            stage_delay: DEFAULT_STAGE_DELAY,
            frame_step: DEFAULT_FRAME_STEP,
            stages: DEFAULT_STAGES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            session_tick: duration_from_lookup(
                &mut lookup,
                "STUDIO_SESSION_TICK_MS",
                defaults.session_tick,
            ),
            metrics_tick: duration_from_lookup(
                &mut lookup,
                "STUDIO_METRICS_TICK_MS",
                defaults.metrics_tick,
            ),
            stage_delay: duration_from_lookup(
                &mut lookup,
                "STUDIO_STAGE_DELAY_MS",
                defaults.stage_delay,
            ),
            frame_step: duration_from_lookup(&mut lookup, "STUDIO_FRAME_MS", defaults.frame_step),
            stages: defaults.stages,
        }
    }

    pub fn with_stages<I, T>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.stages = stages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    /// Clock time a build needs from trigger to completion.
    pub fn build_duration(&self) -> Duration {
        self.stage_delay
            .saturating_mul(u32::try_from(self.stages.len()).unwrap_or(u32::MAX))
    }
}

fn duration_from_lookup<F>(lookup: &mut F, key: &str, default: Duration) -> Duration
where
    F: FnMut(&str) -> Option<String>,
{
    parse_override_ms(lookup(key))
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn parse_override_ms(raw: Option<String>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
