use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorAction {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorManifest {
    pub title: String,
    pub actions: Vec<EditorAction>,
}

impl EditorManifest {
    pub fn find(&self, id: &str) -> Option<&EditorAction> {
        self.actions.iter().find(|action| action.id == id)
    }
}

/// One label/value pair for a heads-up readout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorStat {
    pub label: String,
    pub value: String,
}

impl EditorStat {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_request_uses_camel_case() {
        let req: ActionRequest = serde_json::from_str(r#"{"actionId":"play"}"#).unwrap();
        assert_eq!(req.action_id, "play");
    }

    #[test]
    fn manifest_find_matches_by_id() {
        let manifest = EditorManifest {
            title: "t".to_string(),
            actions: vec![EditorAction {
                id: "reset".to_string(),
                label: "Reset".to_string(),
            }],
        };
        assert_eq!(manifest.find("reset").map(|a| a.label.as_str()), Some("Reset"));
        assert!(manifest.find("nope").is_none());
    }

    #[test]
    fn stat_stringifies_value() {
        let stat = EditorStat::new("fps", 60);
        assert_eq!(stat.value, "60");
    }
}
