use serde::{Deserialize, Serialize};

use crate::surface::Notification;

pub const ACCEPTED_EXTENSION: &str = ".zip";

/// Verdict on a set of dropped file names. Nothing is opened or unpacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DropOutcome {
    Accepted { archive: String },
    Rejected,
}

impl DropOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn notification(&self) -> Notification {
        match self {
            Self::Accepted { archive } => {
                Notification::info("Game Upload").with_body(format!("Processing {archive}..."))
            }
            Self::Rejected => Notification::error("Invalid file type")
                .with_body("Please upload a .zip file containing your game."),
        }
    }
}

/// Accepts when at least one name ends in `.zip`; reports the first such name.
pub fn classify_drop<I, S>(names: I) -> DropOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .find(|name| name.as_ref().ends_with(ACCEPTED_EXTENSION))
        .map_or(DropOutcome::Rejected, |name| DropOutcome::Accepted {
            archive: name.as_ref().to_string(),
        })
}
