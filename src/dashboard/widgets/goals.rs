use super::{progress_row, WidgetContent, WidgetSettingsContext, WidgetSettingsUiResult};
use eframe::egui;
use serde::{Deserialize, Serialize};

/// One entry of the free-form goals list. Independent of the goal store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalNode {
    pub title: String,
    #[serde(default)]
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subgoals: Vec<GoalNode>,
}

impl GoalNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            progress: 0.0,
            description: None,
            subgoals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsContent {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub goals: Vec<GoalNode>,
}

impl Default for GoalsContent {
    fn default() -> Self {
        Self {
            title: "Goals".into(),
            description: None,
            goals: Vec::new(),
        }
    }
}

pub fn render(ui: &mut egui::Ui, content: &GoalsContent) {
    if let Some(desc) = content.description.as_deref().filter(|d| !d.is_empty()) {
        ui.weak(desc);
    }
    if content.goals.is_empty() {
        ui.weak("No goals yet");
        return;
    }
    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for goal in &content.goals {
                goal_node(ui, goal, 0);
            }
        });
}

fn goal_node(ui: &mut egui::Ui, goal: &GoalNode, depth: usize) {
    ui.horizontal(|ui| {
        ui.add_space(depth as f32 * 12.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(&goal.title).strong());
            progress_row(ui, goal.progress);
            if let Some(desc) = goal.description.as_deref() {
                ui.weak(desc);
            }
        });
    });
    for sub in &goal.subgoals {
        goal_node(ui, sub, depth + 1);
    }
    if depth == 0 {
        ui.add_space(6.0);
    }
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    _ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::Goals(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label("Heading");
        changed |= ui.text_edit_singleline(&mut cfg.title).changed();
    });
    let mut description = cfg.description.clone().unwrap_or_default();
    ui.horizontal(|ui| {
        ui.label("Description");
        if ui.text_edit_singleline(&mut description).changed() {
            cfg.description = (!description.is_empty()).then(|| description.clone());
            changed = true;
        }
    });
    ui.separator();
    let mut remove = None;
    for (idx, goal) in cfg.goals.iter_mut().enumerate() {
        ui.push_id(idx, |ui| {
            ui.horizontal(|ui| {
                changed |= ui.text_edit_singleline(&mut goal.title).changed();
                changed |= ui
                    .add(egui::Slider::new(&mut goal.progress, 0.0..=100.0).suffix("%"))
                    .changed();
                if ui.small_button("Remove").clicked() {
                    remove = Some(idx);
                }
            });
        });
    }
    if let Some(idx) = remove {
        cfg.goals.remove(idx);
        changed = true;
    }
    if ui.button("Add goal").clicked() {
        cfg.goals.push(GoalNode::new("New goal"));
        changed = true;
    }
    WidgetSettingsUiResult::changed(changed)
}
