use crate::common::validation::{error_for, FieldError};
use crate::dashboard::model::WidgetPatch;
use crate::dashboard::widgets::{WidgetContent, WidgetSettingsContext};
use crate::gui::widget_dialog::{TitleRule, WidgetDraft};
use crate::store::Store;
use eframe::egui;

/// Edits the title and content of one widget. Changes are applied on save.
#[derive(Default)]
pub struct WidgetEditDialog {
    pub open: bool,
    layout_id: String,
    widget_id: String,
    draft: WidgetDraft,
    content: Option<WidgetContent>,
    /// JSON text of content this build cannot edit field by field.
    raw_text: String,
    errors: Vec<FieldError>,
    content_error: Option<String>,
}

impl WidgetEditDialog {
    pub fn open_for(&mut self, store: &Store, layout_id: &str, widget_id: &str) {
        let Some(widget) = store
            .layout(layout_id)
            .ok()
            .and_then(|l| l.widget(widget_id))
        else {
            tracing::debug!(layout_id, widget_id, "edit requested for missing widget");
            return;
        };
        self.layout_id = layout_id.to_string();
        self.widget_id = widget_id.to_string();
        self.draft = WidgetDraft {
            title: widget.display_title(),
            kind: widget.content.kind(),
        };
        self.raw_text = match &widget.content {
            WidgetContent::Unsupported { raw, .. } => {
                serde_json::to_string_pretty(raw).unwrap_or_default()
            }
            _ => String::new(),
        };
        self.content = Some(widget.content.clone());
        self.errors.clear();
        self.content_error = None;
        self.open = true;
    }

    /// Returns a message to show once the widget has been saved.
    pub fn ui(&mut self, ctx: &egui::Context, store: &mut Store) -> Option<String> {
        if !self.open {
            return None;
        }
        let mut open = self.open;
        let mut close = false;
        let mut saved = None;
        egui::Window::new("Edit widget")
            .open(&mut open)
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Title");
                    ui.text_edit_singleline(&mut self.draft.title);
                });
                if let Some(err) = error_for(&self.errors, "title") {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
                ui.separator();
                if let Some(content) = self.content.as_mut() {
                    let settings_ctx = WidgetSettingsContext {
                        goals: store.goals(),
                    };
                    egui::ScrollArea::vertical()
                        .max_height(360.0)
                        .show(ui, |ui| {
                            match store.registry().render_settings_ui(ui, content, &settings_ctx) {
                                Some(result) => {
                                    if result.changed || result.error.is_some() {
                                        self.content_error = result.error;
                                    }
                                }
                                None => {
                                    let raw_tag = match &*content {
                                        WidgetContent::Unsupported { type_tag, .. } => {
                                            Some(type_tag.clone())
                                        }
                                        _ => None,
                                    };
                                    if let Some(type_tag) = raw_tag {
                                        ui.weak(format!("Raw '{type_tag}' content (JSON)"));
                                        let resp = ui.add(
                                            egui::TextEdit::multiline(&mut self.raw_text)
                                                .code_editor()
                                                .desired_rows(8),
                                        );
                                        if resp.changed() {
                                            self.content_error =
                                                apply_raw_edit(content, &self.raw_text).err();
                                        }
                                    } else {
                                        ui.weak("This widget has no editable content.");
                                    }
                                }
                            }
                        });
                }
                if let Some(err) = &self.content_error {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        match self.draft.validate(TitleRule::MinTwoChars) {
                            Err(errors) => self.errors = errors,
                            Ok(_) if self.content_error.is_some() => {}
                            Ok((title, _)) => {
                                let patch = WidgetPatch {
                                    title: Some(Some(title)),
                                    content: self.content.clone(),
                                    layout: None,
                                };
                                match store.update_widget(&self.layout_id, &self.widget_id, patch) {
                                    Ok(_) => {
                                        saved = Some("Widget updated".to_string());
                                        close = true;
                                    }
                                    Err(e) => {
                                        self.errors = vec![FieldError::new("title", e.to_string())]
                                    }
                                }
                            }
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        self.open = open && !close;
        saved
    }
}

/// Replace unsupported content with the edited JSON. Text that now matches a
/// known content shape becomes typed content again.
fn apply_raw_edit(content: &mut WidgetContent, text: &str) -> Result<(), String> {
    let WidgetContent::Unsupported { type_tag, .. } = content else {
        return Ok(());
    };
    let raw: serde_json::Value =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {e}"))?;
    *content = WidgetContent::from_parts(type_tag, raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::widgets::PomodoroContent;
    use serde_json::json;

    fn broken_pomodoro() -> WidgetContent {
        WidgetContent::from_parts("pomodoro", json!({"duration": "soon"}))
    }

    #[test]
    fn malformed_known_kind_has_no_typed_editor() {
        let registry = crate::dashboard::widgets::WidgetRegistry::with_defaults();
        let mut content = broken_pomodoro();
        assert!(matches!(content, WidgetContent::Unsupported { .. }));
        let ctx = WidgetSettingsContext::empty();
        let mut result = Some(Default::default());
        egui::__run_test_ui(|ui| {
            result = registry.render_settings_ui(ui, &mut content, &ctx);
        });
        assert_eq!(result, None);
    }

    #[test]
    fn fixed_raw_json_becomes_typed_content() {
        let mut content = broken_pomodoro();
        apply_raw_edit(&mut content, r#"{"duration": 40}"#).unwrap();
        assert_eq!(
            content,
            WidgetContent::Pomodoro(PomodoroContent { duration: Some(40.0) })
        );
    }

    #[test]
    fn invalid_raw_json_is_reported_and_content_kept() {
        let mut content = WidgetContent::from_parts("weather", json!({"city": "Oslo"}));
        let before = content.clone();
        let err = apply_raw_edit(&mut content, "{ city").unwrap_err();
        assert!(err.starts_with("Invalid JSON"));
        assert_eq!(content, before);

        apply_raw_edit(&mut content, r#"{"city": "Bergen"}"#).unwrap();
        assert_eq!(
            content,
            WidgetContent::Unsupported {
                type_tag: "weather".into(),
                raw: json!({"city": "Bergen"}),
            }
        );
    }
}
