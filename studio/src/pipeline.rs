//! The simulated build: a fixed list of stages that each "finish" after a delay.
//!
//! Stages always succeed. There is no failure state; a real build backend would need
//! one (e.g. `BuildStatus::Failed { reason }`) before this could drive actual work.

use std::time::Duration;

use engine::{Generation, Scheduler, TimerId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STAGES: &[&str] = &[
    "parse",
    "design-doc",
    "codegen",
    "type-check",
    "bundle",
    "asset bake",
];

pub const LOG_MARKER: &str = "▶";

pub fn stage_log_line(stage: &str) -> String {
    format!("{LOG_MARKER} {stage}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStatus {
    #[default]
    Idle,
    Running,
    Complete,
}

impl BuildStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildRun {
    status: BuildStatus,
    log: Vec<String>,
    generation: Generation,
}

impl BuildRun {
    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// A stage timer payload: which run it belongs to and which stage it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTick {
    pub generation: Generation,
    pub index: usize,
}

/// What happened when a stage timer was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The timer belonged to a superseded run and was dropped.
    Stale,
    Logged { index: usize },
    /// The last stage logged and the run is now complete.
    Completed,
}

#[derive(Debug, Clone)]
pub struct BuildPipeline {
    stages: Vec<String>,
    stage_delay: Duration,
    run: BuildRun,
    pending: Option<TimerId>,
}

impl BuildPipeline {
    pub fn new(stages: Vec<String>, stage_delay: Duration) -> Self {
        Self {
            stages,
            stage_delay,
            run: BuildRun::default(),
            pending: None,
        }
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn stage_delay(&self) -> Duration {
        self.stage_delay
    }

    pub fn run(&self) -> &BuildRun {
        &self.run
    }

    pub fn status(&self) -> BuildStatus {
        self.run.status
    }

    pub fn log(&self) -> &[String] {
        &self.run.log
    }

    /// Starts a fresh run, superseding any run still in flight.
    ///
    /// Returns `true` when the run completed immediately (no stages configured); the
    /// caller owns the completion notice either way.
    pub fn trigger<E>(
        &mut self,
        clock: &mut Scheduler<E>,
        wrap: impl FnOnce(StageTick) -> E,
    ) -> bool {
        if let Some(stale) = self.pending.take() {
            clock.cancel(stale);
        }
        if self.run.status == BuildStatus::Running {
            log::debug!(
                "build run {} superseded at {}/{} stages",
                self.run.generation.raw(),
                self.run.log.len(),
                self.stages.len()
            );
        }

        self.run.generation = self.run.generation.next();
        self.run.log.clear();
        self.run.status = BuildStatus::Running;

        if self.stages.is_empty() {
            self.run.status = BuildStatus::Complete;
            return true;
        }

        let tick = StageTick {
            generation: self.run.generation,
            index: 0,
        };
        self.pending = Some(clock.schedule_after(self.stage_delay, wrap(tick)));
        false
    }

    /// Handles a delivered stage timer and arms the next stage if there is one.
    pub fn on_stage<E>(
        &mut self,
        tick: StageTick,
        clock: &mut Scheduler<E>,
        wrap: impl FnOnce(StageTick) -> E,
    ) -> StageOutcome {
        let expected = self.run.log.len();
        if tick.generation != self.run.generation
            || self.run.status != BuildStatus::Running
            || tick.index != expected
        {
            log::debug!(
                "dropping stale stage {} of run {} (current run {})",
                tick.index,
                tick.generation.raw(),
                self.run.generation.raw()
            );
            return StageOutcome::Stale;
        }
        self.pending = None;

        let Some(stage) = self.stages.get(tick.index) else {
            return StageOutcome::Stale;
        };
        self.run.log.push(stage_log_line(stage));

        let next = tick.index + 1;
        if next == self.stages.len() {
            self.run.status = BuildStatus::Complete;
            return StageOutcome::Completed;
        }

        let follow_up = StageTick {
            generation: self.run.generation,
            index: next,
        };
        self.pending = Some(clock.schedule_after(self.stage_delay, wrap(follow_up)));
        StageOutcome::Logged { index: tick.index }
    }

    /// Drops the in-flight schedule without touching the log.
    pub fn cancel<E>(&mut self, clock: &mut Scheduler<E>) {
        if let Some(pending) = self.pending.take() {
            clock.cancel(pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_pipeline() -> BuildPipeline {
        BuildPipeline::new(
            DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
            Duration::from_millis(300),
        )
    }

    fn pump(
        pipeline: &mut BuildPipeline,
        clock: &mut Scheduler<StageTick>,
        until: Duration,
    ) -> Vec<StageOutcome> {
        let mut out = Vec::new();
        while let Some(fired) = clock.pop_due(until) {
            out.push(pipeline.on_stage(fired.event, clock, |t| t));
        }
        clock.advance_to(until);
        out
    }

    #[test]
    fn full_run_logs_every_stage_in_order() {
        let mut pipeline = default_pipeline();
        let mut clock = Scheduler::new();
        assert!(!pipeline.trigger(&mut clock, |t| t));
        assert_eq!(pipeline.status(), BuildStatus::Running);

        let outcomes = pump(&mut pipeline, &mut clock, Duration::from_millis(1800));
        assert_eq!(outcomes.last(), Some(&StageOutcome::Completed));
        assert_eq!(
            pipeline.log(),
            &[
                "▶ parse",
                "▶ design-doc",
                "▶ codegen",
                "▶ type-check",
                "▶ bundle",
                "▶ asset bake",
            ]
        );
        assert_eq!(pipeline.status(), BuildStatus::Complete);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn one_entry_per_stage_delay() {
        let mut pipeline = default_pipeline();
        let mut clock = Scheduler::new();
        pipeline.trigger(&mut clock, |t| t);

        pump(&mut pipeline, &mut clock, Duration::from_millis(299));
        assert!(pipeline.log().is_empty());
        pump(&mut pipeline, &mut clock, Duration::from_millis(900));
        assert_eq!(pipeline.log().len(), 3);
        assert_eq!(pipeline.status(), BuildStatus::Running);
    }

    #[test]
    fn retrigger_supersedes_in_flight_run() {
        let mut pipeline = default_pipeline();
        let mut clock = Scheduler::new();
        pipeline.trigger(&mut clock, |t| t);
        let first = pipeline.run().generation();
        pump(&mut pipeline, &mut clock, Duration::from_millis(700));
        assert_eq!(pipeline.log().len(), 2);

        pipeline.trigger(&mut clock, |t| t);
        assert!(pipeline.log().is_empty());
        assert!(pipeline.run().generation() > first);

        pump(&mut pipeline, &mut clock, Duration::from_millis(700 + 1800));
        assert_eq!(pipeline.log().len(), 6);
        assert_eq!(pipeline.log()[0], "▶ parse");
        assert_eq!(pipeline.status(), BuildStatus::Complete);
    }

    #[test]
    fn stale_tick_is_dropped() {
        let mut pipeline = default_pipeline();
        let mut clock = Scheduler::new();
        pipeline.trigger(&mut clock, |t| t);
        let stale = StageTick {
            generation: pipeline.run().generation(),
            index: 0,
        };
        pipeline.trigger(&mut clock, |t| t);

        assert_eq!(
            pipeline.on_stage(stale, &mut clock, |t| t),
            StageOutcome::Stale
        );
        assert!(pipeline.log().is_empty());
    }

    #[test]
    fn out_of_order_tick_is_dropped() {
        let mut pipeline = default_pipeline();
        let mut clock = Scheduler::new();
        pipeline.trigger(&mut clock, |t| t);
        let skip_ahead = StageTick {
            generation: pipeline.run().generation(),
            index: 3,
        };
        assert_eq!(
            pipeline.on_stage(skip_ahead, &mut clock, |t| t),
            StageOutcome::Stale
        );
    }

    #[test]
    fn empty_pipeline_completes_immediately() {
        let mut pipeline = BuildPipeline::new(Vec::new(), Duration::from_millis(300));
        let mut clock: Scheduler<StageTick> = Scheduler::new();
        assert!(pipeline.trigger(&mut clock, |t| t));
        assert_eq!(pipeline.status(), BuildStatus::Complete);
        assert!(pipeline.log().is_empty());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn cancel_stops_the_schedule() {
        let mut pipeline = default_pipeline();
        let mut clock = Scheduler::new();
        pipeline.trigger(&mut clock, |t| t);
        pipeline.cancel(&mut clock);
        assert!(pump(&mut pipeline, &mut clock, Duration::from_secs(10)).is_empty());
        assert_eq!(pipeline.status(), BuildStatus::Running);
    }
}
