use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    #[default]
    Blank,
    Endless,
    BossFight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "platformer")]
    Platformer,
    #[serde(rename = "runner")]
    Runner,
    #[serde(rename = "shooter")]
    Shooter,
    #[serde(rename = "RPG")]
    Rpg,
    #[serde(rename = "puzzle")]
    Puzzle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtStyle {
    #[default]
    Pixel,
    Flat,
    LowPoly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Prompt studio form state. None of it changes what the simulated build logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSettings {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub template: Template,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub art_style: ArtStyle,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    #[serde(default = "default_true")]
    pub sfx_enabled: bool,
    #[serde(default)]
    pub seed: String,
    #[serde(default = "default_camera")]
    pub camera: String,
    #[serde(default = "default_physics")]
    pub physics: String,
    #[serde(default = "default_input_scheme")]
    pub input_scheme: String,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            template: Template::default(),
            genre: None,
            art_style: ArtStyle::default(),
            difficulty: Difficulty::default(),
            audio_enabled: true,
            sfx_enabled: true,
            seed: String::new(),
            camera: default_camera(),
            physics: default_physics(),
            input_scheme: default_input_scheme(),
        }
    }
}

impl StudioSettings {
    /// Refining re-runs the build on the same prompt with a trailing newline.
    pub fn mark_refined(&mut self) {
        self.prompt.push('\n');
    }
}

fn default_true() -> bool {
    true
}

fn default_camera() -> String {
    "side".to_string()
}

fn default_physics() -> String {
    "arcade".to_string()
}

fn default_input_scheme() -> String {
    "keyboard".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: StudioSettings =
            serde_json::from_str(r#"{"prompt":"a cat platformer","genre":"RPG"}"#)
                .expect("settings JSON should parse");
        assert_eq!(parsed.prompt, "a cat platformer");
        assert_eq!(parsed.genre, Some(Genre::Rpg));
        assert_eq!(parsed.template, Template::Blank);
        assert_eq!(parsed.difficulty, Difficulty::Normal);
        assert!(parsed.audio_enabled && parsed.sfx_enabled);
        assert_eq!(parsed.camera, "side");
        assert_eq!(parsed.input_scheme, "keyboard");
    }

    #[test]
    fn enum_wire_names_match_form_values() {
        assert_eq!(
            serde_json::to_value(Template::BossFight).unwrap(),
            "boss-fight"
        );
        assert_eq!(serde_json::to_value(ArtStyle::LowPoly).unwrap(), "low-poly");
        assert_eq!(serde_json::to_value(Genre::Platformer).unwrap(), "platformer");
    }

    #[test]
    fn unknown_template_is_rejected() {
        assert!(serde_json::from_str::<StudioSettings>(r#"{"template":"sandbox"}"#).is_err());
    }

    #[test]
    fn refine_appends_newline() {
        let mut s = StudioSettings {
            prompt: "space".to_string(),
            ..StudioSettings::default()
        };
        s.mark_refined();
        s.mark_refined();
        assert_eq!(s.prompt, "space\n\n");
    }
}
