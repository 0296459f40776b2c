use engine::editor::{EditorAction, EditorManifest};

const MANIFEST_TITLE: &str = "GameEngine Runtime";

/// Every command the runtime page can issue without arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeAction {
    Play,
    Pause,
    Toggle,
    Reset,
    Mute,
    Unmute,
    ToggleMute,
    Fullscreen,
    ExitFullscreen,
    ToggleFullscreen,
    Generate,
    Refine,
    Regenerate,
    SaveVersion,
    ExportZip,
    Deploy,
    Home,
    TryIt,
}

const ACTION_SPECS: &[(&str, &str, RuntimeAction)] = &[
    ("play", "Play", RuntimeAction::Play),
    ("pause", "Pause", RuntimeAction::Pause),
    ("toggle", "Play/Pause", RuntimeAction::Toggle),
    ("reset", "Reset", RuntimeAction::Reset),
    ("mute", "Mute", RuntimeAction::Mute),
    ("unmute", "Unmute", RuntimeAction::Unmute),
    ("toggleMute", "Toggle Mute", RuntimeAction::ToggleMute),
    ("fullscreen", "Fullscreen", RuntimeAction::Fullscreen),
    ("exitFullscreen", "Exit Fullscreen", RuntimeAction::ExitFullscreen),
    ("toggleFullscreen", "Toggle Fullscreen", RuntimeAction::ToggleFullscreen),
    ("generate", "Generate", RuntimeAction::Generate),
    ("refine", "Refine", RuntimeAction::Refine),
    ("regenerate", "Regenerate", RuntimeAction::Regenerate),
    ("saveVersion", "Save Version", RuntimeAction::SaveVersion),
    ("exportZip", "Export Zip", RuntimeAction::ExportZip),
    ("deploy", "Deploy", RuntimeAction::Deploy),
    ("home", "Home", RuntimeAction::Home),
    ("tryIt", "Try It", RuntimeAction::TryIt),
];

pub fn default_manifest() -> EditorManifest {
    EditorManifest {
        title: MANIFEST_TITLE.to_string(),
        actions: ACTION_SPECS
            .iter()
            .map(|(id, label, _)| EditorAction {
                id: (*id).to_string(),
                label: (*label).to_string(),
            })
            .collect(),
    }
}

pub fn action_from_id(id: &str) -> Option<RuntimeAction> {
    ACTION_SPECS
        .iter()
        .find_map(|(action_id, _, action)| (*action_id == id).then_some(*action))
}

impl RuntimeAction {
    pub fn id(self) -> &'static str {
        ACTION_SPECS
            .iter()
            .find_map(|(id, _, action)| (*action == self).then_some(*id))
            .unwrap_or("unknown")
    }
}
