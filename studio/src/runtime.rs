//! The runtime page's session: the one object the presentation layer drives.
//!
//! All state lives behind a [`HeadlessRunner`], so timer callbacks (session ticks,
//! telemetry ticks, build stages) and user commands interleave on one logical thread
//! and each runs to completion before the next.

use std::time::Duration;

use engine::editor::EditorStat;
use engine::{HeadlessRunner, Scheduler, Simulation, TimerId};
use serde::{Deserialize, Serialize};

use crate::actions::RuntimeAction;
use crate::catalog::{GameMetadata, selection_label};
use crate::config::RuntimeConfig;
use crate::metrics::{MetricsSimulator, PerformanceSample, RandomSource, StdRandom};
use crate::pipeline::{BuildPipeline, BuildStatus, StageOutcome, StageTick};
use crate::prompt::StudioSettings;
use crate::session::{SessionClock, SessionEvent, SessionState, format_elapsed};
use crate::surface::{LogSurface, Notification, Route, Surface};
use crate::upload::{DropOutcome, classify_drop};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    SessionTick,
    MetricsTick,
    Stage(StageTick),
}

pub struct RuntimeCore<S, R> {
    session: SessionClock,
    session_tick: Duration,
    session_timer: Option<TimerId>,
    metrics: MetricsSimulator<R>,
    metrics_tick: Duration,
    metrics_timer: Option<TimerId>,
    pipeline: BuildPipeline,
    current_game: Option<GameMetadata>,
    muted: bool,
    fullscreen: bool,
    studio: StudioSettings,
    surface: S,
}

impl<S: Surface, R: RandomSource> RuntimeCore<S, R> {
    fn new(config: RuntimeConfig, surface: S, rng: R) -> Self {
        Self {
            session: SessionClock::new(),
            session_tick: config.session_tick,
            session_timer: None,
            metrics: MetricsSimulator::new(rng),
            metrics_tick: config.metrics_tick,
            metrics_timer: None,
            pipeline: BuildPipeline::new(config.stages, config.stage_delay),
            current_game: None,
            muted: false,
            fullscreen: false,
            studio: StudioSettings::default(),
            surface,
        }
    }

    fn start_metrics(&mut self, clock: &mut Scheduler<RuntimeEvent>) {
        if let Some(old) = self.metrics_timer.take() {
            clock.cancel(old);
        }
        self.metrics_timer =
            Some(clock.schedule_every(self.metrics_tick, RuntimeEvent::MetricsTick));
    }

    fn apply_session(&mut self, event: SessionEvent, clock: &mut Scheduler<RuntimeEvent>) {
        if clock.is_halted() {
            log::warn!("ignoring {event:?}: session is shut down");
            return;
        }
        let transition = self.session.apply(event);
        if transition.from != transition.to {
            log::info!(
                "session {} -> {}",
                transition.from.label(),
                transition.to.label()
            );
        }

        if transition.stopped_playing() {
            if let Some(timer) = self.session_timer.take() {
                clock.cancel(timer);
            }
        }
        if transition.started_playing() {
            // Fresh interval boundary on every resume; suspended time is not credited.
            if let Some(stale) = self.session_timer.take() {
                clock.cancel(stale);
            }
            self.session_timer =
                Some(clock.schedule_every(self.session_tick, RuntimeEvent::SessionTick));
        }
    }

    fn run_build(&mut self, clock: &mut Scheduler<RuntimeEvent>) {
        if clock.is_halted() {
            log::warn!("ignoring build request: session is shut down");
            return;
        }
        log::info!(
            "build triggered ({} stages, {:?} apart)",
            self.pipeline.stages().len(),
            self.pipeline.stage_delay()
        );
        if self.pipeline.trigger(clock, RuntimeEvent::Stage) {
            self.finish_build();
        }
    }

    fn finish_build(&mut self) {
        log::info!(
            "build run {} complete ({} entries)",
            self.pipeline.run().generation().raw(),
            self.pipeline.log().len()
        );
        self.surface.notify(Notification::info("Build complete"));
    }

    fn teardown(&mut self, clock: &mut Scheduler<RuntimeEvent>) {
        self.session_timer = None;
        self.metrics_timer = None;
        self.pipeline.cancel(clock);
        clock.halt();
    }
}

impl<S: Surface, R: RandomSource> Simulation for RuntimeCore<S, R> {
    type Event = RuntimeEvent;

    fn on_event(&mut self, event: RuntimeEvent, clock: &mut Scheduler<RuntimeEvent>) {
        match event {
            RuntimeEvent::SessionTick => {
                if self.session.tick() {
                    log::debug!("session tick -> {}s", self.session.elapsed_ticks());
                }
            }
            RuntimeEvent::MetricsTick => {
                let sample = self.metrics.step();
                log::debug!(
                    "metrics fps={:.1} cpu={:.1} gpu={:.1} mem={:.1}",
                    sample.fps,
                    sample.cpu_percent,
                    sample.gpu_percent,
                    sample.memory_percent
                );
            }
            RuntimeEvent::Stage(tick) => {
                if self.pipeline.on_stage(tick, clock, RuntimeEvent::Stage)
                    == StageOutcome::Completed
                {
                    self.finish_build();
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSnapshot {
    pub status: BuildStatus,
    pub log: Vec<String>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSnapshot {
    pub clock_ms: u64,
    pub state: SessionState,
    pub play_label: String,
    pub elapsed_seconds: u64,
    pub elapsed_label: String,
    pub muted: bool,
    pub fullscreen: bool,
    pub metrics: PerformanceSample,
    pub current_game: Option<GameMetadata>,
    pub selection_label: String,
    pub build: BuildSnapshot,
    pub studio: StudioSettings,
    pub stats: Vec<EditorStat>,
}

pub struct RuntimeSession<S: Surface = LogSurface, R: RandomSource = StdRandom> {
    runner: HeadlessRunner<RuntimeCore<S, R>>,
}

impl<S: Surface, R: RandomSource> RuntimeSession<S, R> {
    /// Creates an idle session; the telemetry walk starts ticking right away.
    pub fn new(config: RuntimeConfig, surface: S, rng: R) -> Self {
        let mut runner = HeadlessRunner::new(RuntimeCore::new(config, surface, rng));
        runner.with(|core, clock| core.start_metrics(clock));
        Self { runner }
    }

    fn core(&self) -> &RuntimeCore<S, R> {
        self.runner.sim()
    }

    fn with<T>(
        &mut self,
        f: impl FnOnce(&mut RuntimeCore<S, R>, &mut Scheduler<RuntimeEvent>) -> T,
    ) -> T {
        self.runner.with(f)
    }

    pub fn now(&self) -> Duration {
        self.runner.now()
    }

    /// Moves the session clock forward, firing whatever falls due.
    pub fn advance(&mut self, dt: Duration) -> usize {
        self.runner.advance(dt)
    }

    /// Cancels every timer family. Nothing fires afterwards, and later play or build
    /// requests are ignored.
    pub fn shutdown(&mut self) {
        if self.runner.is_halted() {
            return;
        }
        log::info!("runtime session shutting down at {:?}", self.now());
        self.with(|core, clock| core.teardown(clock));
    }

    pub fn is_shut_down(&self) -> bool {
        self.runner.is_halted()
    }

    pub fn pending_timers(&self) -> usize {
        self.runner.clock().pending()
    }

    pub fn state(&self) -> SessionState {
        self.core().session.state()
    }

    pub fn elapsed_time(&self) -> Duration {
        Duration::from_secs(self.core().session.elapsed_ticks())
    }

    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.elapsed_time())
    }

    pub fn play(&mut self) {
        self.with(|core, clock| core.apply_session(SessionEvent::Play, clock));
    }

    pub fn pause(&mut self) {
        self.with(|core, clock| core.apply_session(SessionEvent::Pause, clock));
    }

    pub fn toggle(&mut self) {
        self.with(|core, clock| core.apply_session(SessionEvent::TogglePlayPause, clock));
    }

    pub fn reset(&mut self) {
        self.with(|core, clock| core.apply_session(SessionEvent::Reset, clock));
    }

    pub fn current_game(&self) -> Option<&GameMetadata> {
        self.core().current_game.as_ref()
    }

    /// Switches games. Always stops the current session first.
    pub fn select_game(&mut self, game: GameMetadata) {
        self.with(|core, clock| {
            core.apply_session(SessionEvent::Reset, clock);
            log::info!("selected game {} ({})", game.id, game.label());
            core.surface.notify(
                Notification::info(format!("Loading {}", game.title))
                    .with_body("Game is being loaded into the runtime..."),
            );
            core.current_game = Some(game);
        });
    }

    pub fn is_muted(&self) -> bool {
        self.core().muted
    }

    pub fn mute(&mut self, muted: bool) {
        self.with(|core, _| core.muted = muted);
    }

    pub fn toggle_mute(&mut self) {
        let muted = !self.is_muted();
        self.mute(muted);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.core().fullscreen
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.with(|core, _| core.fullscreen = fullscreen);
    }

    pub fn toggle_fullscreen(&mut self) {
        let fullscreen = !self.is_fullscreen();
        self.set_fullscreen(fullscreen);
    }

    pub fn current_metrics(&self) -> PerformanceSample {
        self.core().metrics.sample()
    }

    pub fn run_build(&mut self) {
        self.with(|core, clock| core.run_build(clock));
    }

    pub fn build_log(&self) -> &[String] {
        self.core().pipeline.log()
    }

    pub fn build_status(&self) -> BuildStatus {
        self.core().pipeline.status()
    }

    pub fn build_generation(&self) -> u64 {
        self.core().pipeline.run().generation().raw()
    }

    pub fn studio(&self) -> &StudioSettings {
        &self.core().studio
    }

    pub fn set_studio(&mut self, settings: StudioSettings) {
        self.with(|core, _| core.studio = settings);
    }

    pub fn generate(&mut self) {
        self.run_build();
    }

    pub fn refine(&mut self) {
        self.with(|core, clock| {
            core.studio.mark_refined();
            core.run_build(clock);
        });
    }

    pub fn regenerate(&mut self) {
        self.run_build();
    }

    pub fn save_version(&mut self) {
        self.notify(Notification::info("Version saved"));
    }

    pub fn export_zip(&mut self) {
        self.notify(Notification::info("Exported zip"));
    }

    pub fn deploy(&mut self) {
        self.notify(Notification::info("Deployment started"));
    }

    pub fn drop_files<I, T>(&mut self, names: I) -> DropOutcome
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let outcome = classify_drop(names);
        if !outcome.is_accepted() {
            log::warn!("rejected drop: no {} archive", crate::upload::ACCEPTED_EXTENSION);
        }
        self.notify(outcome.notification());
        outcome
    }

    pub fn go_home(&mut self) {
        self.with(|core, _| core.surface.navigate_to(Route::Landing));
    }

    /// The landing page's "Try it" entry point.
    pub fn open_runtime(&mut self) {
        self.with(|core, _| core.surface.navigate_to(Route::Runtime));
    }

    fn notify(&mut self, notification: Notification) {
        self.with(|core, _| core.surface.notify(notification));
    }

    pub fn surface(&self) -> &S {
        &self.core().surface
    }

    pub fn apply(&mut self, action: RuntimeAction) {
        match action {
            RuntimeAction::Play => self.play(),
            RuntimeAction::Pause => self.pause(),
            RuntimeAction::Toggle => self.toggle(),
            RuntimeAction::Reset => self.reset(),
            RuntimeAction::Mute => self.mute(true),
            RuntimeAction::Unmute => self.mute(false),
            RuntimeAction::ToggleMute => self.toggle_mute(),
            RuntimeAction::Fullscreen => self.set_fullscreen(true),
            RuntimeAction::ExitFullscreen => self.set_fullscreen(false),
            RuntimeAction::ToggleFullscreen => self.toggle_fullscreen(),
            RuntimeAction::Generate => self.generate(),
            RuntimeAction::Refine => self.refine(),
            RuntimeAction::Regenerate => self.regenerate(),
            RuntimeAction::SaveVersion => self.save_version(),
            RuntimeAction::ExportZip => self.export_zip(),
            RuntimeAction::Deploy => self.deploy(),
            RuntimeAction::Home => self.go_home(),
            RuntimeAction::TryIt => self.open_runtime(),
        }
    }

    pub fn snapshot(&self) -> RuntimeSnapshot {
        let core = self.core();
        let metrics = core.metrics.sample();
        let elapsed_label = self.elapsed_label();
        let stats = vec![
            EditorStat::new("fps", format!("{:.0}", metrics.fps)),
            EditorStat::new("cpu", format!("{:.0}%", metrics.cpu_percent)),
            EditorStat::new("gpu", format!("{:.0}%", metrics.gpu_percent)),
            EditorStat::new("memory", format!("{:.0}%", metrics.memory_percent)),
            EditorStat::new("time", &elapsed_label),
        ];

        RuntimeSnapshot {
            clock_ms: u64::try_from(self.now().as_millis()).unwrap_or(u64::MAX),
            state: core.session.state(),
            play_label: core.session.state().action_label().to_string(),
            elapsed_seconds: core.session.elapsed_ticks(),
            elapsed_label,
            muted: core.muted,
            fullscreen: core.fullscreen,
            metrics,
            current_game: core.current_game.clone(),
            selection_label: selection_label(core.current_game.as_ref()),
            build: BuildSnapshot {
                status: core.pipeline.status(),
                log: core.pipeline.log().to_vec(),
                generation: core.pipeline.run().generation().raw(),
            },
            studio: core.studio.clone(),
            stats,
        }
    }
}

impl<S: Surface, R: RandomSource> Drop for RuntimeSession<S, R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, StaticCatalog};
    use crate::metrics::ScriptedRandom;
    use crate::surface::RecordingSurface;

    fn session() -> RuntimeSession<RecordingSurface, ScriptedRandom> {
        RuntimeSession::new(
            RuntimeConfig::default(),
            RecordingSurface::default(),
            ScriptedRandom::constant(1.0),
        )
    }

    fn secs(v: u64) -> Duration {
        Duration::from_secs(v)
    }

    #[test]
    fn new_session_is_idle_with_zero_elapsed() {
        let s = session();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.elapsed_time(), Duration::ZERO);
        assert_eq!(s.build_status(), BuildStatus::Idle);
        assert!(s.current_game().is_none());
        assert_eq!(s.pending_timers(), 1);
    }

    #[test]
    fn ticks_accumulate_only_while_playing() {
        let mut s = session();
        s.advance(secs(3));
        assert_eq!(s.elapsed_time(), Duration::ZERO);

        s.play();
        s.advance(secs(3));
        assert_eq!(s.elapsed_time(), secs(3));

        s.pause();
        s.advance(secs(10));
        assert_eq!(s.elapsed_time(), secs(3));
    }

    #[test]
    fn resume_starts_a_fresh_interval() {
        let mut s = session();
        s.play();
        s.advance(Duration::from_millis(1500));
        assert_eq!(s.elapsed_time(), secs(1));

        s.pause();
        s.toggle();
        s.advance(Duration::from_millis(900));
        assert_eq!(s.elapsed_time(), secs(1));
        s.advance(Duration::from_millis(100));
        assert_eq!(s.elapsed_time(), secs(2));
    }

    #[test]
    fn metrics_walk_runs_regardless_of_state() {
        let mut s = session();
        s.advance(secs(2));
        let m = s.current_metrics();
        assert_eq!(m.fps, 60.0);
        assert_eq!(m.cpu_percent, 25.0);
        assert_eq!(m.gpu_percent, 15.5);
        assert_eq!(m.memory_percent, 50.0);
    }

    #[test]
    fn select_game_resets_the_session() {
        let mut s = session();
        s.play();
        s.advance(secs(5));

        let game = StaticCatalog::sample().find("pixel-platformer").unwrap();
        s.select_game(game.clone());
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.elapsed_time(), Duration::ZERO);
        assert_eq!(s.current_game(), Some(&game));
        assert_eq!(s.surface().titles(), ["Loading Pixel Platformer"]);

        s.advance(secs(5));
        assert_eq!(s.elapsed_time(), Duration::ZERO);
    }

    #[test]
    fn apply_routes_home_through_surface() {
        let mut s = session();
        s.apply(RuntimeAction::Home);
        assert_eq!(s.surface().routes, [Route::Landing]);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut s = session();
        s.play();
        s.advance(secs(61));
        s.apply(RuntimeAction::ToggleMute);

        let snap = s.snapshot();
        assert_eq!(snap.state, SessionState::Playing);
        assert_eq!(snap.play_label, "Pause");
        assert_eq!(snap.elapsed_seconds, 61);
        assert_eq!(snap.elapsed_label, "00:01:01");
        assert!(snap.muted);
        assert_eq!(snap.selection_label, "Select Game");
        assert_eq!(snap.clock_ms, 61_000);
        assert_eq!(snap.stats[4].value, "00:01:01");
    }

    #[test]
    fn shutdown_stops_every_timer_family() {
        let mut s = session();
        s.play();
        s.run_build();
        s.advance(Duration::from_millis(400));
        s.shutdown();

        let before = s.snapshot();
        assert_eq!(s.advance(secs(60)), 0);
        assert_eq!(s.pending_timers(), 0);
        assert_eq!(s.snapshot().build, before.build);
        assert_eq!(s.snapshot().elapsed_seconds, before.elapsed_seconds);
        assert!(s.is_shut_down());

        s.play();
        s.run_build();
        assert_eq!(s.advance(secs(60)), 0);
    }
}
