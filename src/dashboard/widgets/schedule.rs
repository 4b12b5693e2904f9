use super::{WidgetContent, WidgetSettingsContext, WidgetSettingsUiResult};
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleContent {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

impl Default for ScheduleContent {
    fn default() -> Self {
        Self {
            title: "Schedule".into(),
            description: None,
            schedule: Vec::new(),
        }
    }
}

pub fn render(ui: &mut egui::Ui, widget_id: &str, content: &ScheduleContent) {
    if let Some(desc) = content.description.as_deref().filter(|d| !d.is_empty()) {
        ui.weak(desc);
    }
    if content.schedule.is_empty() {
        ui.weak("Nothing scheduled");
        return;
    }
    ui.push_id(("schedule", widget_id), |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(48.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Time");
                });
                header.col(|ui| {
                    ui.strong("Activity");
                });
                header.col(|ui| {
                    ui.strong("Notes");
                });
            })
            .body(|mut body| {
                for entry in &content.schedule {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.monospace(&entry.time);
                        });
                        row.col(|ui| {
                            ui.label(&entry.activity);
                        });
                        row.col(|ui| {
                            ui.weak(entry.description.as_deref().unwrap_or_default());
                        });
                    });
                }
            });
    });
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    _ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::Schedule(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label("Heading");
        changed |= ui.text_edit_singleline(&mut cfg.title).changed();
    });
    ui.separator();
    let mut remove = None;
    for (idx, entry) in cfg.schedule.iter_mut().enumerate() {
        ui.push_id(idx, |ui| {
            ui.horizontal(|ui| {
                changed |= ui
                    .add(egui::TextEdit::singleline(&mut entry.time).desired_width(60.0))
                    .changed();
                changed |= ui
                    .add(egui::TextEdit::singleline(&mut entry.activity).hint_text("Activity"))
                    .changed();
                let mut notes = entry.description.clone().unwrap_or_default();
                if ui
                    .add(egui::TextEdit::singleline(&mut notes).hint_text("Notes"))
                    .changed()
                {
                    entry.description = (!notes.is_empty()).then_some(notes);
                    changed = true;
                }
                if ui.small_button("Remove").clicked() {
                    remove = Some(idx);
                }
            });
        });
    }
    if let Some(idx) = remove {
        cfg.schedule.remove(idx);
        changed = true;
    }
    if ui.button("Add entry").clicked() {
        cfg.schedule.push(ScheduleEntry {
            time: "09:00".into(),
            activity: String::new(),
            description: None,
        });
        changed = true;
    }
    WidgetSettingsUiResult::changed(changed)
}
