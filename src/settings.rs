use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LAYOUT_ID: &str = "default";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "Light"),
            Theme::Dark => write!(f, "Dark"),
            Theme::System => write!(f, "System"),
        }
    }
}

/// Connection settings for the OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Stored in plain text inside the snapshot file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

impl ChatSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Id of the layout rendered on start-up.
    #[serde(default = "default_layout_id")]
    pub default_layout: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub chat: ChatSettings,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Show toast notifications for saves and chat failures.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
}

fn default_layout_id() -> String {
    DEFAULT_LAYOUT_ID.into()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_layout: default_layout_id(),
            theme: Theme::System,
            chat: ChatSettings::default(),
            debug_logging: false,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
        }
    }
}

impl Settings {
    /// Read only the settings section of a snapshot file.
    ///
    /// Used before logging is initialised, so failures fall back to defaults
    /// instead of being reported.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let loaded = crate::store::snapshot::Snapshot::parse(&content)?;
        Ok(loaded.snapshot.settings)
    }

    pub fn apply_theme(&self, ctx: &eframe::egui::Context) {
        match self.theme {
            Theme::Light => ctx.set_visuals(eframe::egui::Visuals::light()),
            Theme::Dark => ctx.set_visuals(eframe::egui::Visuals::dark()),
            Theme::System => {}
        }
    }
}
