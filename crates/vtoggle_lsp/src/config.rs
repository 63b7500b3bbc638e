use serde::Deserialize;

pub(super) const DEFAULT_SET_SELECTION_COMMAND: &str = "vtoggle.action.setSelection";

/// Effective settings for the toggle code action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ToggleBindingSettings {
    pub(super) enabled: bool,
    /// Client command that receives the caret position after an edit.
    pub(super) set_selection_command: String,
}

impl Default for ToggleBindingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            set_selection_command: DEFAULT_SET_SELECTION_COMMAND.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VtoggleConfig {
    toggle_binding: Option<ToggleBindingConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleBindingConfig {
    enabled: Option<bool>,
    set_selection_command: Option<String>,
}

impl VtoggleConfig {
    /// Reads settings sent either bare or nested under a `vtoggle` section.
    pub(super) fn from_settings(settings: serde_json::Value) -> serde_json::Result<Self> {
        let settings = match settings {
            serde_json::Value::Null => return Ok(Self::default()),
            serde_json::Value::Object(mut map) if map.contains_key("vtoggle") => {
                map.remove("vtoggle").unwrap_or_default()
            }
            other => other,
        };
        if settings.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(settings)
    }

    /// Overrides the fields present in this config, keeping the others.
    pub(super) fn apply_to(self, settings: &mut ToggleBindingSettings) {
        let Some(toggle) = self.toggle_binding else {
            return;
        };
        if let Some(enabled) = toggle.enabled {
            settings.enabled = enabled;
        }
        if let Some(command) = toggle.set_selection_command {
            let command = command.trim();
            if !command.is_empty() {
                settings.set_selection_command = command.to_string();
            }
        }
    }
}
