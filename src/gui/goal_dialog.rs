use crate::common::validation::{error_for, FieldError};
use crate::goals::form::GoalDraft;
use crate::goals::{build_hierarchy, GoalStatus, GoalTreeNode, GoalType};
use crate::store::Store;
use eframe::egui;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Editing {
    New,
    Existing(String),
}

/// Goal list with an inline editor.
#[derive(Default)]
pub struct GoalDialog {
    pub open: bool,
    editing: Option<Editing>,
    draft: GoalDraft,
    parent: Option<String>,
    tags: Vec<String>,
    errors: Vec<FieldError>,
    new_tag: String,
}

enum ListAction {
    Edit(String),
    Delete(String),
}

impl GoalDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn start_new(&mut self) {
        self.editing = Some(Editing::New);
        self.draft = GoalDraft::default();
        self.parent = None;
        self.tags.clear();
        self.errors.clear();
        self.open = true;
    }

    fn start_edit(&mut self, store: &Store, id: &str) {
        let Some(goal) = store.goal(id) else {
            return;
        };
        self.draft = GoalDraft::from_goal(goal);
        self.parent = goal.parent_id.clone();
        self.tags = goal.tags.clone();
        self.editing = Some(Editing::Existing(id.to_string()));
        self.errors.clear();
    }

    /// Returns a message to show after a goal was saved or deleted.
    pub fn ui(&mut self, ctx: &egui::Context, store: &mut Store) -> Option<Result<String, String>> {
        if !self.open {
            return None;
        }
        let mut open = self.open;
        let mut outcome = None;
        let mut list_action = None;
        egui::Window::new("Goals")
            .open(&mut open)
            .default_width(520.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("New goal").clicked() {
                        self.start_new();
                    }
                    ui.weak(format!("{} goals", store.goals().len()));
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_source("goal_list")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        let forest = build_hierarchy(store.goals());
                        if forest.is_empty() {
                            ui.weak("No goals yet");
                        }
                        for node in &forest {
                            goal_row(ui, node, 0, &mut list_action);
                        }
                    });
                if self.editing.is_some() {
                    ui.separator();
                    outcome = self.editor(ui, store);
                }
            });
        match list_action {
            Some(ListAction::Edit(id)) => self.start_edit(store, &id),
            Some(ListAction::Delete(id)) => {
                let title = store.goal(&id).map(|g| g.title.clone()).unwrap_or_default();
                outcome = Some(
                    store
                        .delete_goal(&id)
                        .map(|_| format!("Deleted '{title}'"))
                        .map_err(|e| e.to_string()),
                );
                if self.editing == Some(Editing::Existing(id)) {
                    self.editing = None;
                }
            }
            None => {}
        }
        self.open = open;
        outcome
    }

    fn editor(&mut self, ui: &mut egui::Ui, store: &mut Store) -> Option<Result<String, String>> {
        let err_color = ui.visuals().error_fg_color;
        let editing_id = match &self.editing {
            Some(Editing::Existing(id)) => Some(id.clone()),
            _ => None,
        };
        egui::Grid::new("goal_editor")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Title");
                ui.vertical(|ui| {
                    ui.text_edit_singleline(&mut self.draft.title);
                    if let Some(err) = error_for(&self.errors, "title") {
                        ui.colored_label(err_color, err);
                    }
                });
                ui.end_row();

                ui.label("Description");
                ui.add(egui::TextEdit::multiline(&mut self.draft.description).desired_rows(2));
                ui.end_row();

                ui.label("Type");
                egui::ComboBox::from_id_source("goal_type")
                    .selected_text(self.draft.kind.label())
                    .show_ui(ui, |ui| {
                        for kind in GoalType::ALL {
                            ui.selectable_value(&mut self.draft.kind, kind, kind.label());
                        }
                    });
                ui.end_row();

                ui.label("Status");
                egui::ComboBox::from_id_source("goal_status")
                    .selected_text(self.draft.status.label())
                    .show_ui(ui, |ui| {
                        for status in GoalStatus::ALL {
                            ui.selectable_value(&mut self.draft.status, status, status.label());
                        }
                    });
                ui.end_row();

                ui.label("Progress");
                ui.add(egui::Slider::new(&mut self.draft.progress, 0..=100).suffix("%"));
                ui.end_row();

                ui.label("Start date");
                ui.vertical(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut self.draft.start_date).hint_text("YYYY-MM-DD"));
                    if let Some(err) = error_for(&self.errors, "start_date") {
                        ui.colored_label(err_color, err);
                    }
                });
                ui.end_row();

                ui.label("End date");
                ui.vertical(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut self.draft.end_date).hint_text("YYYY-MM-DD"));
                    if let Some(err) = error_for(&self.errors, "end_date") {
                        ui.colored_label(err_color, err);
                    }
                });
                ui.end_row();

                ui.label("Parent");
                let parent_title = self
                    .parent
                    .as_deref()
                    .and_then(|id| store.goal(id))
                    .map(|g| g.title.clone())
                    .unwrap_or_else(|| "None".into());
                egui::ComboBox::from_id_source("goal_parent")
                    .selected_text(parent_title)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.parent, None, "None");
                        for goal in store.goals() {
                            if editing_id.as_deref() == Some(goal.id.as_str()) {
                                continue;
                            }
                            ui.selectable_value(&mut self.parent, Some(goal.id.clone()), &goal.title);
                        }
                    });
                if let Some(err) = error_for(&self.errors, "parent") {
                    ui.colored_label(err_color, err);
                }
                ui.end_row();

                ui.label("Tags");
                ui.horizontal_wrapped(|ui| {
                    for tag in store.tags() {
                        let mut on = self.tags.contains(&tag.id);
                        if ui.checkbox(&mut on, &tag.name).changed() {
                            if on {
                                self.tags.push(tag.id.clone());
                            } else {
                                self.tags.retain(|t| t != &tag.id);
                            }
                        }
                    }
                });
                ui.end_row();

                ui.label("Notes");
                ui.add(egui::TextEdit::multiline(&mut self.draft.notes).desired_rows(2));
                ui.end_row();
            });

        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.new_tag).hint_text("New tag"));
            if ui.button("Add tag").clicked() && !self.new_tag.trim().is_empty() {
                if let Ok(tags) = store.add_tag(&self.new_tag, "#3b82f6") {
                    if let Some(tag) = tags.last() {
                        self.tags.push(tag.id.clone());
                    }
                }
                self.new_tag.clear();
            }
        });

        let mut outcome = None;
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                outcome = self.save(store);
            }
            if ui.button("Cancel").clicked() {
                self.editing = None;
            }
        });
        outcome
    }

    fn save(&mut self, store: &mut Store) -> Option<Result<String, String>> {
        let valid = match self.draft.validate() {
            Ok(valid) => valid,
            Err(errors) => {
                self.errors = errors;
                return None;
            }
        };
        let title = valid.title.clone();
        let result = match self.editing.clone()? {
            Editing::New => {
                let mut goal = valid.into_goal(store.new_goal_id());
                goal.parent_id = self.parent.clone();
                goal.tags = self.tags.clone();
                store.add_goal(goal).map(|_| format!("Added '{title}'"))
            }
            Editing::Existing(id) => {
                let mut patch = valid.into_patch();
                patch.tags = Some(self.tags.clone());
                let current_parent = store.goal(&id).and_then(|g| g.parent_id.clone());
                store
                    .update_goal(&id, patch)
                    .map(|_| ())
                    .and_then(|_| {
                        if current_parent != self.parent {
                            store.set_goal_parent(&id, self.parent.as_deref()).map(|_| ())
                        } else {
                            Ok(())
                        }
                    })
                    .map(|_| format!("Saved '{title}'"))
            }
        };
        match result {
            Ok(msg) => {
                self.editing = None;
                self.errors.clear();
                Some(Ok(msg))
            }
            Err(e) => {
                self.errors = vec![FieldError::new("parent", e.to_string())];
                None
            }
        }
    }
}

fn goal_row(ui: &mut egui::Ui, node: &GoalTreeNode<'_>, depth: usize, action: &mut Option<ListAction>) {
    let goal = node.goal;
    ui.horizontal(|ui| {
        ui.add_space(depth as f32 * 16.0);
        ui.label(&goal.title);
        ui.weak(goal.kind.label());
        ui.add(
            egui::ProgressBar::new(f32::from(goal.progress) / 100.0)
                .desired_width(80.0)
                .text(format!("{}%", goal.progress)),
        );
        if ui.small_button("Edit").clicked() {
            *action = Some(ListAction::Edit(goal.id.clone()));
        }
        if ui.small_button("Delete").clicked() {
            *action = Some(ListAction::Delete(goal.id.clone()));
        }
    });
    for child in &node.children {
        goal_row(ui, child, depth + 1, action);
    }
}
