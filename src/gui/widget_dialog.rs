use crate::common::validation::{error_for, require_min_chars, FieldError};
use crate::dashboard::widgets::{WidgetKind, WidgetMetadata};
use crate::store::Store;
use eframe::egui;

/// Which rule the title has to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// Adding a widget: any non-blank title.
    NonEmpty,
    /// Editing a widget: at least two characters.
    MinTwoChars,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDraft {
    pub title: String,
    pub kind: Option<WidgetKind>,
}

impl Default for WidgetDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            kind: Some(WidgetKind::Avatar),
        }
    }
}

impl WidgetDraft {
    /// Trimmed title and kind, or the problems to show next to the fields.
    pub fn validate(&self, rule: TitleRule) -> Result<(String, Option<WidgetKind>), Vec<FieldError>> {
        let mut errors = Vec::new();
        match rule {
            TitleRule::NonEmpty => require_min_chars(&mut errors, "title", &self.title, 1),
            TitleRule::MinTwoChars => require_min_chars(&mut errors, "title", &self.title, 2),
        }
        if rule == TitleRule::NonEmpty && self.kind.is_none() {
            errors.push(FieldError::new("type", "Choose a widget type"));
        }
        if errors.is_empty() {
            Ok((self.title.trim().to_string(), self.kind))
        } else {
            Err(errors)
        }
    }
}

#[derive(Default)]
pub struct AddWidgetDialog {
    pub open: bool,
    draft: WidgetDraft,
    errors: Vec<FieldError>,
}

impl AddWidgetDialog {
    pub fn open(&mut self) {
        self.open = true;
        self.draft = WidgetDraft::default();
        self.errors.clear();
    }

    /// Returns the id of the widget that was added.
    pub fn ui(&mut self, ctx: &egui::Context, store: &mut Store, layout_id: &str) -> Option<String> {
        if !self.open {
            return None;
        }
        let metadata: Vec<WidgetMetadata> = store.registry().metadata();
        let mut open = self.open;
        let mut close = false;
        let mut added = None;
        egui::Window::new("Add widget")
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Title");
                    ui.text_edit_singleline(&mut self.draft.title);
                });
                if let Some(err) = error_for(&self.errors, "title") {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
                ui.separator();
                for meta in &metadata {
                    let kind = WidgetKind::from_tag(&meta.name);
                    ui.radio_value(&mut self.draft.kind, kind, &meta.label)
                        .on_hover_text(&meta.description);
                }
                if let Some(err) = error_for(&self.errors, "type") {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() {
                        match self.draft.validate(TitleRule::NonEmpty) {
                            Ok((title, Some(kind))) => {
                                match store.append_widget(layout_id, kind, Some(title)) {
                                    Ok(widgets) => {
                                        added = widgets.last().map(|w| w.id.clone());
                                        close = true;
                                    }
                                    Err(e) => {
                                        self.errors = vec![FieldError::new("type", e.to_string())];
                                    }
                                }
                            }
                            Ok((_, None)) => {}
                            Err(errors) => self.errors = errors,
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        self.open = open && !close;
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_requires_non_blank_title() {
        let draft = WidgetDraft {
            title: "   ".into(),
            kind: Some(WidgetKind::Chat),
        };
        let errors = draft.validate(TitleRule::NonEmpty).unwrap_err();
        assert_eq!(error_for(&errors, "title"), Some("This field is required"));

        let draft = WidgetDraft {
            title: " A ".into(),
            ..draft
        };
        assert_eq!(
            draft.validate(TitleRule::NonEmpty).unwrap(),
            ("A".to_string(), Some(WidgetKind::Chat))
        );
    }

    #[test]
    fn edit_requires_two_chars() {
        let draft = WidgetDraft {
            title: "A".into(),
            kind: None,
        };
        let errors = draft.validate(TitleRule::MinTwoChars).unwrap_err();
        assert_eq!(
            error_for(&errors, "title"),
            Some("Must be at least 2 characters")
        );
        assert!(error_for(&errors, "type").is_none());
    }

    #[test]
    fn add_requires_a_kind() {
        let draft = WidgetDraft {
            title: "Timer".into(),
            kind: None,
        };
        let errors = draft.validate(TitleRule::NonEmpty).unwrap_err();
        assert!(error_for(&errors, "type").is_some());
    }
}
