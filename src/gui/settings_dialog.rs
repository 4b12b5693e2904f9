use crate::chat::{spawn_connection_test, PendingRequest};
use crate::common::validation::{error_for, FieldError};
use crate::settings::{ChatSettings, Settings, Theme};
use crate::store::Store;
use eframe::egui;
use std::time::Duration;

/// Editable copy of [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDraft {
    pub default_layout: String,
    pub theme: Theme,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub debug_logging: bool,
    pub enable_toasts: bool,
    pub toast_duration: f32,
}

impl SettingsDraft {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_layout: settings.default_layout.clone(),
            theme: settings.theme,
            api_key: settings.chat.api_key.clone().unwrap_or_default(),
            base_url: settings.chat.base_url.clone(),
            model: settings.chat.model.clone(),
            debug_logging: settings.debug_logging,
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
        }
    }

    pub fn chat(&self) -> ChatSettings {
        let key = self.api_key.trim();
        ChatSettings {
            api_key: (!key.is_empty()).then(|| key.to_string()),
            base_url: self.base_url.trim().trim_end_matches('/').to_string(),
            model: self.model.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<Settings, Vec<FieldError>> {
        let mut errors = Vec::new();
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(FieldError::new(
                "base_url",
                "Must start with http:// or https://",
            ));
        }
        if self.model.trim().is_empty() {
            errors.push(FieldError::new("model", "This field is required"));
        }
        if !(self.toast_duration > 0.0) {
            errors.push(FieldError::new("toast_duration", "Must be greater than zero"));
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Settings {
            default_layout: self.default_layout.clone(),
            theme: self.theme,
            chat: self.chat(),
            debug_logging: self.debug_logging,
            enable_toasts: self.enable_toasts,
            toast_duration: self.toast_duration,
        })
    }
}

enum TestState {
    Idle,
    Running(PendingRequest),
    Done(Result<String, String>),
}

pub struct SettingsDialog {
    pub open: bool,
    draft: SettingsDraft,
    errors: Vec<FieldError>,
    test: TestState,
}

impl Default for SettingsDialog {
    fn default() -> Self {
        Self {
            open: false,
            draft: SettingsDraft::from_settings(&Settings::default()),
            errors: Vec::new(),
            test: TestState::Idle,
        }
    }
}

impl SettingsDialog {
    pub fn open(&mut self, settings: &Settings) {
        self.draft = SettingsDraft::from_settings(settings);
        self.errors.clear();
        self.test = TestState::Idle;
        self.open = true;
    }

    /// Returns the saved settings.
    pub fn ui(&mut self, ctx: &egui::Context, store: &mut Store) -> Option<Settings> {
        if !self.open {
            return None;
        }
        if let TestState::Running(pending) = &self.test {
            match pending.poll() {
                Some(result) => self.test = TestState::Done(result),
                None => ctx.request_repaint_after(Duration::from_millis(100)),
            }
        }
        let layouts: Vec<(String, String)> = store
            .layouts()
            .iter()
            .map(|l| (l.id.clone(), l.name.clone()))
            .collect();
        let mut open = self.open;
        let mut close = false;
        let mut saved = None;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                let err_color = ui.visuals().error_fg_color;
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Default layout");
                        let selected = layouts
                            .iter()
                            .find(|(id, _)| id == &self.draft.default_layout)
                            .map(|(_, name)| name.clone())
                            .unwrap_or_else(|| self.draft.default_layout.clone());
                        egui::ComboBox::from_id_source("default_layout")
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                for (id, name) in &layouts {
                                    ui.selectable_value(
                                        &mut self.draft.default_layout,
                                        id.clone(),
                                        name,
                                    );
                                }
                            });
                        ui.end_row();

                        ui.label("Theme");
                        ui.horizontal(|ui| {
                            for theme in [Theme::Light, Theme::Dark, Theme::System] {
                                ui.radio_value(&mut self.draft.theme, theme, theme.to_string());
                            }
                        });
                        ui.end_row();

                        ui.label("API key");
                        ui.add(egui::TextEdit::singleline(&mut self.draft.api_key).password(true));
                        ui.end_row();

                        ui.label("Base URL");
                        ui.vertical(|ui| {
                            ui.text_edit_singleline(&mut self.draft.base_url);
                            if let Some(err) = error_for(&self.errors, "base_url") {
                                ui.colored_label(err_color, err);
                            }
                        });
                        ui.end_row();

                        ui.label("Model");
                        ui.vertical(|ui| {
                            ui.text_edit_singleline(&mut self.draft.model);
                            if let Some(err) = error_for(&self.errors, "model") {
                                ui.colored_label(err_color, err);
                            }
                        });
                        ui.end_row();

                        ui.label("Notifications");
                        ui.checkbox(&mut self.draft.enable_toasts, "Show toasts");
                        ui.end_row();

                        ui.label("Toast duration");
                        ui.vertical(|ui| {
                            ui.add(
                                egui::DragValue::new(&mut self.draft.toast_duration)
                                    .clamp_range(0.5..=30.0)
                                    .speed(0.1)
                                    .suffix(" s"),
                            );
                            if let Some(err) = error_for(&self.errors, "toast_duration") {
                                ui.colored_label(err_color, err);
                            }
                        });
                        ui.end_row();

                        ui.label("Debug logging");
                        ui.checkbox(&mut self.draft.debug_logging, "Takes effect on restart");
                        ui.end_row();
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    let running = matches!(self.test, TestState::Running(_));
                    let label = if running { "Testing..." } else { "Test connection" };
                    if ui.add_enabled(!running, egui::Button::new(label)).clicked() {
                        self.test = TestState::Running(spawn_connection_test(self.draft.chat()));
                    }
                    match &self.test {
                        TestState::Done(Ok(_)) => {
                            ui.colored_label(egui::Color32::from_rgb(0x22, 0xc5, 0x5e), "Connected");
                        }
                        TestState::Done(Err(e)) => {
                            ui.colored_label(err_color, e);
                        }
                        _ => {}
                    }
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        match self.draft.validate() {
                            Ok(settings) => {
                                saved = Some(settings);
                                close = true;
                            }
                            Err(errors) => self.errors = errors,
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        if let Some(settings) = &saved {
            let settings = settings.clone();
            store.update_settings(|s| *s = settings);
        }
        self.open = open && !close;
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_round_trips_settings() {
        let mut settings = Settings::default();
        settings.chat.api_key = Some("sk-test".into());
        let draft = SettingsDraft::from_settings(&settings);
        assert_eq!(draft.validate().unwrap(), settings);
    }

    #[test]
    fn blank_key_is_stored_as_none() {
        let draft = SettingsDraft {
            api_key: "   ".into(),
            base_url: "https://example.com/v1/".into(),
            ..SettingsDraft::from_settings(&Settings::default())
        };
        let chat = draft.chat();
        assert_eq!(chat.api_key, None);
        assert_eq!(chat.base_url, "https://example.com/v1");
    }

    #[test]
    fn invalid_fields_are_reported_inline() {
        let draft = SettingsDraft {
            base_url: "example.com".into(),
            model: " ".into(),
            toast_duration: 0.0,
            ..SettingsDraft::from_settings(&Settings::default())
        };
        let errors = draft.validate().unwrap_err();
        assert!(error_for(&errors, "base_url").is_some());
        assert!(error_for(&errors, "model").is_some());
        assert!(error_for(&errors, "toast_duration").is_some());
    }
}
