use serde::{Deserialize, Serialize};

use crate::units::Scale;

fn default_celsius() -> bool {
    true
}

fn default_set_temperature() -> f64 {
    21.0
}

fn default_modes() -> Vec<String> {
    vec!["Off".into(), "Heat".into()]
}

fn default_mode_set() -> String {
    "Off".into()
}

/// Device configuration as last reported by the backend.
///
/// `set_temperature` is always degrees Celsius, whatever `celsius` says about
/// the display scale. Missing fields take the backend's schema defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default = "default_celsius")]
    pub celsius: bool,
    #[serde(default = "default_set_temperature")]
    pub set_temperature: f64,
    #[serde(default = "default_mode_set")]
    pub mode_set: String,
    #[serde(default = "default_modes")]
    pub modes: Vec<String>,
    #[serde(default)]
    pub modes_available: Vec<(String, bool)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<f64>>,
}

impl ConfigSnapshot {
    pub fn scale(&self) -> Scale {
        Scale::from_celsius_flag(self.celsius)
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        ConfigSnapshot {
            celsius: default_celsius(),
            set_temperature: default_set_temperature(),
            mode_set: default_mode_set(),
            modes: default_modes(),
            modes_available: Vec::new(),
            location_label: None,
            location: None,
        }
    }
}

/// Body of a `set_config` request. Only the present fields are sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celsius: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes_available: Option<Vec<(String, bool)>>,
}

impl ConfigPatch {
    pub fn modes_available(modes: Vec<(String, bool)>) -> Self {
        ConfigPatch {
            modes_available: Some(modes),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ConfigPatch::default()
    }
}

/// Reply of `get_config` and `set_config`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigReply {
    #[serde(default)]
    pub config: Option<ConfigSnapshot>,
    #[serde(default)]
    pub config_required: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
