use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Play,
    Pause,
    TogglePlayPause,
    Reset,
}

impl SessionState {
    /// Pure transition function. Every event is accepted from every state.
    pub fn handle(self, event: SessionEvent) -> SessionState {
        match (self, event) {
            (_, SessionEvent::Play) => SessionState::Playing,
            (SessionState::Playing, SessionEvent::Pause) => SessionState::Paused,
            (state, SessionEvent::Pause) => state,
            (SessionState::Playing, SessionEvent::TogglePlayPause) => SessionState::Paused,
            (_, SessionEvent::TogglePlayPause) => SessionState::Playing,
            (_, SessionEvent::Reset) => SessionState::Idle,
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, SessionState::Playing)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    /// Caption for the play/pause control in this state.
    pub fn action_label(self) -> &'static str {
        if self.is_playing() { "Pause" } else { "Play" }
    }
}

/// Result of applying an event, so the tick driver knows whether to arm or drop its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
}

impl Transition {
    pub fn started_playing(self) -> bool {
        !self.from.is_playing() && self.to.is_playing()
    }

    pub fn stopped_playing(self) -> bool {
        self.from.is_playing() && !self.to.is_playing()
    }
}

/// Session state plus the whole-tick elapsed counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionClock {
    state: SessionState,
    elapsed_ticks: u64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        let from = self.state;
        self.state = from.handle(event);
        if event == SessionEvent::Reset {
            self.elapsed_ticks = 0;
        }
        Transition {
            from,
            to: self.state,
        }
    }

    pub fn toggle_play_pause(&mut self) -> Transition {
        self.apply(SessionEvent::TogglePlayPause)
    }

    pub fn reset(&mut self) -> Transition {
        self.apply(SessionEvent::Reset)
    }

    /// Counts one tick if playing; returns whether it counted.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
        true
    }
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
