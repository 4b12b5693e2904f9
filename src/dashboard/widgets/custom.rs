use super::{
    DashboardContext, RenderCaches, WidgetAction, WidgetContent, WidgetSettingsContext,
    WidgetSettingsUiResult,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use eframe::egui;
use egui_commonmark::CommonMarkViewer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form content: the `type` tag selects how `data` is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CustomContent {
    Markdown(String),
    /// Image URL.
    Image(String),
    /// Target date, RFC 3339 or `YYYY-MM-DD`.
    Countdown(String),
    Stats(BTreeMap<String, f64>),
}

impl Default for CustomContent {
    fn default() -> Self {
        CustomContent::Markdown(String::new())
    }
}

impl CustomContent {
    pub const TYPES: [&'static str; 4] = ["markdown", "image", "countdown", "stats"];

    pub fn type_name(&self) -> &'static str {
        match self {
            CustomContent::Markdown(_) => "markdown",
            CustomContent::Image(_) => "image",
            CustomContent::Countdown(_) => "countdown",
            CustomContent::Stats(_) => "stats",
        }
    }

    /// Switch to another content type, carrying text over where it fits.
    fn converted(&self, type_name: &str) -> Self {
        let text = match self {
            CustomContent::Markdown(s) | CustomContent::Image(s) | CustomContent::Countdown(s) => {
                s.clone()
            }
            CustomContent::Stats(_) => String::new(),
        };
        match type_name {
            "image" => CustomContent::Image(text),
            "countdown" => CustomContent::Countdown(text),
            "stats" => CustomContent::Stats(BTreeMap::new()),
            _ => CustomContent::Markdown(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining { days: i64, hours: i64, minutes: i64 },
    Ended,
}

pub fn parse_target(target: &str) -> Option<DateTime<Utc>> {
    let target = target.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(target) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(target, "%Y-%m-%dT%H:%M") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(target, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
    let diff = target - now;
    if diff < chrono::Duration::zero() {
        return Countdown::Ended;
    }
    Countdown::Remaining {
        days: diff.num_days(),
        hours: diff.num_hours() % 24,
        minutes: diff.num_minutes() % 60,
    }
}

pub fn render(
    ui: &mut egui::Ui,
    widget_id: &str,
    content: &CustomContent,
    ctx: &DashboardContext<'_>,
    caches: &mut RenderCaches,
) -> Option<WidgetAction> {
    match content {
        CustomContent::Markdown(text) => {
            egui::ScrollArea::vertical()
                .id_source(("custom_markdown", widget_id))
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    CommonMarkViewer::new(("custom_markdown", widget_id)).show(
                        ui,
                        &mut caches.markdown,
                        text,
                    );
                });
            None
        }
        CustomContent::Image(url) => {
            let mut action = None;
            ui.vertical_centered(|ui| {
                ui.weak(url);
                if ui.button("Open image").clicked() && !url.trim().is_empty() {
                    action = Some(WidgetAction::OpenUrl(url.clone()));
                }
            });
            action
        }
        CustomContent::Countdown(target) => {
            countdown_view(ui, target, ctx.now);
            None
        }
        CustomContent::Stats(stats) => {
            stats_view(ui, widget_id, stats);
            None
        }
    }
}

fn countdown_view(ui: &mut egui::Ui, target: &str, now: DateTime<Utc>) {
    let Some(date) = parse_target(target) else {
        ui.weak(format!("Invalid date '{target}'"));
        return;
    };
    ui.vertical_centered(|ui| match countdown(date, now) {
        Countdown::Ended => {
            ui.heading("Ended");
            ui.weak(date.format("%Y-%m-%d").to_string());
        }
        Countdown::Remaining {
            days,
            hours,
            minutes,
        } => {
            ui.columns(3, |cols| {
                for (col, (value, unit)) in cols
                    .iter_mut()
                    .zip([(days, "days"), (hours, "hours"), (minutes, "min")])
                {
                    col.vertical_centered(|ui| {
                        ui.heading(value.to_string());
                        ui.weak(unit);
                    });
                }
            });
            ui.weak(format!("Until {}", date.format("%Y-%m-%d")));
        }
    });
}

fn stats_view(ui: &mut egui::Ui, widget_id: &str, stats: &BTreeMap<String, f64>) {
    egui::Grid::new(("custom_stats", widget_id))
        .num_columns(2)
        .spacing([24.0, 8.0])
        .show(ui, |ui| {
            for (i, (label, value)) in stats.iter().enumerate() {
                ui.vertical(|ui| {
                    ui.heading(format_number(*value));
                    ui.weak(label);
                });
                if i % 2 == 1 {
                    ui.end_row();
                }
            }
        });
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    _ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::Custom(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let mut changed = false;
    let mut selected = cfg.type_name();
    egui::ComboBox::from_label("Content type")
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for name in CustomContent::TYPES {
                ui.selectable_value(&mut selected, name, name);
            }
        });
    if selected != cfg.type_name() {
        *cfg = cfg.converted(selected);
        changed = true;
    }

    let mut error = None;
    match cfg {
        CustomContent::Markdown(text) => {
            changed |= ui
                .add(egui::TextEdit::multiline(text).desired_rows(6).code_editor())
                .changed();
        }
        CustomContent::Image(url) => {
            ui.label("Image URL");
            changed |= ui.text_edit_singleline(url).changed();
        }
        CustomContent::Countdown(target) => {
            ui.label("Target date (YYYY-MM-DD)");
            changed |= ui.text_edit_singleline(target).changed();
            if !target.trim().is_empty() && parse_target(target).is_none() {
                error = Some("Unrecognised date".to_string());
            }
        }
        CustomContent::Stats(stats) => {
            changed |= stats_editor(ui, stats);
        }
    }
    WidgetSettingsUiResult { changed, error }
}

fn stats_editor(ui: &mut egui::Ui, stats: &mut BTreeMap<String, f64>) -> bool {
    let mut changed = false;
    let mut remove = None;
    for (label, value) in stats.iter_mut() {
        ui.horizontal(|ui| {
            ui.label(label.as_str());
            changed |= ui.add(egui::DragValue::new(value)).changed();
            if ui.small_button("Remove").clicked() {
                remove = Some(label.clone());
            }
        });
    }
    if let Some(label) = remove {
        stats.remove(&label);
        changed = true;
    }
    let new_id = ui.id().with("new_stat");
    let mut new_label = ui
        .ctx()
        .data(|d| d.get_temp::<String>(new_id))
        .unwrap_or_default();
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut new_label);
        if ui.button("Add stat").clicked() && !new_label.trim().is_empty() {
            stats.insert(new_label.trim().to_string(), 0.0);
            new_label.clear();
            changed = true;
        }
    });
    ui.ctx().data_mut(|d| d.insert_temp(new_id, new_label));
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn adjacent_tag_shape() {
        let content: CustomContent =
            serde_json::from_value(json!({"type": "stats", "data": {"Books": 12, "Runs": 3.5}}))
                .unwrap();
        let CustomContent::Stats(stats) = &content else {
            panic!("expected stats");
        };
        assert_eq!(stats["Books"], 12.0);
        assert_eq!(
            serde_json::to_value(CustomContent::Countdown("2030-01-01".into())).unwrap(),
            json!({"type": "countdown", "data": "2030-01-01"})
        );
    }

    #[test]
    fn unknown_custom_type_is_unsupported() {
        let content =
            WidgetContent::from_parts("custom", json!({"type": "video", "data": "x.mp4"}));
        assert!(matches!(content, WidgetContent::Unsupported { .. }));
    }

    #[test]
    fn countdown_splits_days_hours_minutes() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let target = parse_target("2024-01-03").unwrap();
        assert_eq!(
            countdown(target, now),
            Countdown::Remaining {
                days: 1,
                hours: 14,
                minutes: 0
            }
        );
        let past = parse_target("2023-12-31T08:00:00Z").unwrap();
        assert_eq!(countdown(past, now), Countdown::Ended);
    }

    #[test]
    fn target_formats() {
        assert!(parse_target("2024-05-01").is_some());
        assert!(parse_target("2024-05-01T10:30").is_some());
        assert!(parse_target("2024-05-01T10:30:00+02:00").is_some());
        assert!(parse_target("May 1st").is_none());
    }

    #[test]
    fn switching_type_keeps_text() {
        let content = CustomContent::Markdown("2030-01-01".into());
        assert_eq!(
            content.converted("countdown"),
            CustomContent::Countdown("2030-01-01".into())
        );
        assert_eq!(
            content.converted("stats"),
            CustomContent::Stats(BTreeMap::new())
        );
    }

    #[test]
    fn formats_whole_numbers_without_decimals() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(3.5), "3.50");
    }
}
