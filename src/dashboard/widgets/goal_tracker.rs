use super::{
    progress_row, DashboardContext, WidgetContent, WidgetSettingsContext, WidgetSettingsUiResult,
};
use crate::goals::{calculate_progress, Goal, GoalType};
use eframe::egui;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerMode {
    #[default]
    Single,
    Multiple,
    Type,
}

impl TrackerMode {
    pub const ALL: [TrackerMode; 3] = [TrackerMode::Single, TrackerMode::Multiple, TrackerMode::Type];

    pub fn label(&self) -> &'static str {
        match self {
            TrackerMode::Single => "Single goal",
            TrackerMode::Multiple => "Several goals",
            TrackerMode::Type => "All goals of a type",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTrackerContent {
    #[serde(rename = "type", default)]
    pub mode: TrackerMode,
    #[serde(default)]
    pub goal_ids: Vec<String>,
    /// Type filter for [`TrackerMode::Type`]. Older content stores the type
    /// as the first entry of `goal_ids` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
}

impl GoalTrackerContent {
    pub fn type_filter(&self) -> Option<GoalType> {
        self.goal_type.or_else(|| {
            self.goal_ids
                .first()
                .and_then(|tag| GoalType::from_tag(tag))
        })
    }

    /// Goals this tracker follows, in store order.
    pub fn tracked<'a>(&self, goals: &'a [Goal]) -> Vec<&'a Goal> {
        match self.mode {
            TrackerMode::Single => goals
                .iter()
                .filter(|g| self.goal_ids.first() == Some(&g.id))
                .collect(),
            TrackerMode::Multiple => goals
                .iter()
                .filter(|g| self.goal_ids.contains(&g.id))
                .collect(),
            TrackerMode::Type => match self.type_filter() {
                Some(kind) => goals.iter().filter(|g| g.kind == kind).collect(),
                None => Vec::new(),
            },
        }
    }
}

pub fn render(ui: &mut egui::Ui, content: &GoalTrackerContent, ctx: &DashboardContext<'_>) {
    let tracked = content.tracked(ctx.goals);
    if content.mode == TrackerMode::Type {
        if let Some(kind) = content.type_filter() {
            ui.strong(kind.label());
        }
    }
    progress_row(ui, f32::from(calculate_progress(tracked.iter().copied())));
    ui.separator();
    if tracked.is_empty() {
        ui.weak("No goals tracked yet");
        return;
    }
    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for goal in tracked {
                ui.horizontal(|ui| {
                    ui.label(&goal.title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(goal.kind.label());
                    });
                });
                progress_row(ui, f32::from(goal.progress));
                ui.add_space(4.0);
            }
        });
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::GoalTracker(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let mut changed = false;
    let before = cfg.mode;
    egui::ComboBox::from_label("Track")
        .selected_text(cfg.mode.label())
        .show_ui(ui, |ui| {
            for mode in TrackerMode::ALL {
                ui.selectable_value(&mut cfg.mode, mode, mode.label());
            }
        });
    if cfg.mode != before {
        cfg.goal_ids.clear();
        changed = true;
    }

    match cfg.mode {
        TrackerMode::Single => {
            let current = cfg.goal_ids.first().cloned();
            let title = current
                .as_deref()
                .and_then(|id| ctx.goals.iter().find(|g| g.id == id))
                .map(|g| g.title.clone())
                .unwrap_or_else(|| "Choose a goal".into());
            egui::ComboBox::from_label("Goal")
                .selected_text(title)
                .show_ui(ui, |ui| {
                    for goal in ctx.goals {
                        let selected = current.as_deref() == Some(goal.id.as_str());
                        if ui.selectable_label(selected, &goal.title).clicked() && !selected {
                            cfg.goal_ids = vec![goal.id.clone()];
                            changed = true;
                        }
                    }
                });
        }
        TrackerMode::Multiple => {
            if ctx.goals.is_empty() {
                ui.weak("No goals to choose from");
            }
            for goal in ctx.goals {
                let mut on = cfg.goal_ids.contains(&goal.id);
                if ui.checkbox(&mut on, &goal.title).changed() {
                    if on {
                        cfg.goal_ids.push(goal.id.clone());
                    } else {
                        cfg.goal_ids.retain(|id| id != &goal.id);
                    }
                    changed = true;
                }
            }
        }
        TrackerMode::Type => {
            let mut kind = cfg.type_filter().unwrap_or_default();
            let before = kind;
            egui::ComboBox::from_label("Goal type")
                .selected_text(kind.label())
                .show_ui(ui, |ui| {
                    for t in GoalType::ALL {
                        ui.selectable_value(&mut kind, t, t.label());
                    }
                });
            if kind != before || cfg.goal_type.is_none() {
                cfg.goal_type = Some(kind);
                cfg.goal_ids = vec![kind.as_str().to_string()];
                changed = true;
            }
        }
    }
    WidgetSettingsUiResult::changed(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn goals() -> Vec<Goal> {
        let mut a = Goal::new("a", "Run", GoalType::Weekly);
        a.progress = 40;
        let mut b = Goal::new("b", "Read", GoalType::Yearly);
        b.progress = 80;
        let mut c = Goal::new("c", "Walk", GoalType::Weekly);
        c.progress = 60;
        vec![a, b, c]
    }

    #[test]
    fn single_tracks_first_id_only() {
        let content = GoalTrackerContent {
            mode: TrackerMode::Single,
            goal_ids: vec!["b".into(), "a".into()],
            goal_type: None,
        };
        let goals = goals();
        let tracked: Vec<&str> = content.tracked(&goals).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(tracked, vec!["b"]);
    }

    #[test]
    fn type_mode_reads_legacy_first_id() {
        let content: GoalTrackerContent =
            serde_json::from_value(json!({"type": "type", "goalIds": ["weekly"]})).unwrap();
        let goals = goals();
        let tracked = content.tracked(&goals);
        assert_eq!(tracked.len(), 2);
        assert_eq!(calculate_progress(tracked.iter().copied()), 50);
    }

    #[test]
    fn missing_ids_track_nothing() {
        let content = GoalTrackerContent {
            mode: TrackerMode::Multiple,
            goal_ids: vec!["zzz".into()],
            goal_type: None,
        };
        assert!(content.tracked(&goals()).is_empty());
    }
}
