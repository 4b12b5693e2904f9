mod goal_dialog;
mod settings_dialog;
mod widget_dialog;
mod widget_edit_dialog;

pub use goal_dialog::GoalDialog;
pub use settings_dialog::{SettingsDialog, SettingsDraft};
pub use widget_dialog::{AddWidgetDialog, TitleRule, WidgetDraft};
pub use widget_edit_dialog::WidgetEditDialog;

use crate::dashboard::model::WidgetPatch;
use crate::dashboard::widgets::NoticeKind;
use crate::dashboard::{
    Dashboard, DashboardContext, DashboardEvent, RenderCaches, WidgetAction,
};
use crate::goals::stats;
use crate::store::Store;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};

fn toast_kind(kind: NoticeKind) -> ToastKind {
    match kind {
        NoticeKind::Info => ToastKind::Info,
        NoticeKind::Success => ToastKind::Success,
        NoticeKind::Warning => ToastKind::Warning,
        NoticeKind::Error => ToastKind::Error,
    }
}

pub struct DashboardApp {
    store: Store,
    dashboard: Dashboard,
    caches: RenderCaches,
    current_layout: String,
    toasts: Toasts,
    goal_dialog: GoalDialog,
    add_widget_dialog: AddWidgetDialog,
    edit_widget_dialog: WidgetEditDialog,
    settings_dialog: SettingsDialog,
    new_layout_name: String,
    rename_layout: Option<String>,
}

impl DashboardApp {
    pub fn new(ctx: &egui::Context, store: Store) -> Self {
        store.settings().apply_theme(ctx);
        let current_layout = store
            .default_layout()
            .map(|l| l.id.clone())
            .unwrap_or_default();
        tracing::info!(layout = %current_layout, "dashboard started");
        Self {
            store,
            dashboard: Dashboard::default(),
            caches: RenderCaches::default(),
            current_layout,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            goal_dialog: GoalDialog::default(),
            add_widget_dialog: AddWidgetDialog::default(),
            edit_widget_dialog: WidgetEditDialog::default(),
            settings_dialog: SettingsDialog::default(),
            new_layout_name: String::new(),
            rename_layout: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn current_layout(&self) -> &str {
        &self.current_layout
    }

    fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        if kind == NoticeKind::Error {
            tracing::warn!("{text}");
        }
        if !self.store.settings().enable_toasts && kind != NoticeKind::Error {
            return;
        }
        self.toasts.add(Toast {
            text: text.into(),
            kind: toast_kind(kind),
            options: ToastOptions::default()
                .duration_in_seconds(self.store.settings().toast_duration as f64),
        });
    }

    /// Apply one event from the grid view to the store.
    pub fn handle_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Widget(action) => self.handle_action(action),
            DashboardEvent::LayoutChanged(changes) => {
                let result = self
                    .store
                    .reposition(&self.current_layout, &changes)
                    .map(|_| ());
                if let Err(e) = result {
                    self.notify(NoticeKind::Error, e.to_string());
                }
            }
            DashboardEvent::EditWidget(id) => {
                self.edit_widget_dialog
                    .open_for(&self.store, &self.current_layout, &id);
            }
            DashboardEvent::RemoveWidget(id) => {
                let result = self
                    .store
                    .remove_widget(&self.current_layout, &id)
                    .map(|_| ());
                match result {
                    Ok(()) => self.notify(NoticeKind::Info, "Widget removed"),
                    Err(e) => self.notify(NoticeKind::Error, e.to_string()),
                }
            }
        }
    }

    pub fn handle_action(&mut self, action: WidgetAction) {
        match action {
            WidgetAction::UpdateContent { widget_id, content } => {
                let result = self
                    .store
                    .update_widget(&self.current_layout, &widget_id, WidgetPatch::content(content))
                    .map(|_| ());
                if let Err(e) = result {
                    tracing::debug!(error = %e, "dropping update for widget");
                }
            }
            WidgetAction::Notify { kind, text } => self.notify(kind, text),
            WidgetAction::OpenUrl(url) => {
                if let Err(e) = open::that(&url) {
                    self.notify(NoticeKind::Error, format!("Failed to open {url}: {e}"));
                }
            }
            WidgetAction::OpenSettings => {
                self.settings_dialog.open(self.store.settings());
            }
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.heading("OKR Dashboard");
            ui.separator();

            let current_name = self
                .store
                .layout(&self.current_layout)
                .map(|l| l.name.clone())
                .unwrap_or_default();
            let mut selected = self.current_layout.clone();
            egui::ComboBox::from_id_source("layout_select")
                .selected_text(current_name)
                .show_ui(ui, |ui| {
                    for layout in self.store.layouts() {
                        ui.selectable_value(&mut selected, layout.id.clone(), &layout.name);
                    }
                });
            if selected != self.current_layout {
                tracing::debug!(layout = %selected, "switched layout");
                self.current_layout = selected;
                self.rename_layout = None;
            }

            ui.menu_button("Layout", |ui| {
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.new_layout_name)
                            .hint_text("New layout name")
                            .desired_width(140.0),
                    );
                    if ui.button("Create").clicked() && !self.new_layout_name.trim().is_empty() {
                        self.current_layout = self.store.add_layout(&self.new_layout_name);
                        self.new_layout_name.clear();
                        ui.close_menu();
                    }
                });
                if ui.button("Rename").clicked() {
                    self.rename_layout = self
                        .store
                        .layout(&self.current_layout)
                        .ok()
                        .map(|l| l.name.clone());
                    ui.close_menu();
                }
                if ui.button("Set as default").clicked() {
                    if let Err(e) = self.store.set_default_layout(&self.current_layout) {
                        self.notify(NoticeKind::Error, e.to_string());
                    }
                    ui.close_menu();
                }
                if ui.button("Delete").clicked() {
                    match self.store.remove_layout(&self.current_layout) {
                        Ok(()) => {
                            self.current_layout = self
                                .store
                                .default_layout()
                                .map(|l| l.id.clone())
                                .unwrap_or_default();
                        }
                        Err(e) => self.notify(NoticeKind::Warning, e.to_string()),
                    }
                    ui.close_menu();
                }
            });

            if let Some(name) = self.rename_layout.as_mut() {
                ui.text_edit_singleline(name);
                if ui.button("OK").clicked() {
                    let name = name.clone();
                    if !name.trim().is_empty() {
                        if let Err(e) = self.store.rename_layout(&self.current_layout, &name) {
                            self.notify(NoticeKind::Error, e.to_string());
                        }
                    }
                    self.rename_layout = None;
                }
            }

            ui.separator();
            if ui.button("Add widget").clicked() {
                self.add_widget_dialog.open();
            }
            ui.toggle_value(&mut self.dashboard.editable, "Edit layout");
            if ui.button("Compact").clicked() {
                let result = self
                    .store
                    .compact_layout(&self.current_layout, self.dashboard.cols)
                    .map(|_| ());
                if let Err(e) = result {
                    self.notify(NoticeKind::Error, e.to_string());
                }
            }
            ui.separator();
            if ui.button("Goals").clicked() {
                self.goal_dialog.open();
            }
            if ui.button("Settings").clicked() {
                self.settings_dialog.open(self.store.settings());
            }
        });
    }

    fn summary_cards(&self, ui: &mut egui::Ui) {
        let summary = stats::summary(self.store.goals());
        let cards = [
            ("Active goals", summary.active.to_string()),
            ("Weekly goals", summary.weekly.to_string()),
            ("Completed", summary.completed.to_string()),
            ("Overall progress", format!("{}%", summary.overall_progress)),
        ];
        ui.columns(cards.len(), |cols| {
            for (col, (label, value)) in cols.iter_mut().zip(cards) {
                egui::Frame::group(col.style()).show(col, |ui| {
                    ui.set_width(ui.available_width());
                    ui.weak(label);
                    ui.heading(value);
                });
            }
        });
    }

    fn run_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(id) = self
            .add_widget_dialog
            .ui(ctx, &mut self.store, &self.current_layout)
        {
            tracing::debug!(%id, "widget added from dialog");
            self.notify(NoticeKind::Success, "Widget added");
        }
        if let Some(msg) = self.edit_widget_dialog.ui(ctx, &mut self.store) {
            self.notify(NoticeKind::Success, msg);
        }
        match self.goal_dialog.ui(ctx, &mut self.store) {
            Some(Ok(msg)) => self.notify(NoticeKind::Success, msg),
            Some(Err(e)) => self.notify(NoticeKind::Error, e),
            None => {}
        }
        if let Some(settings) = self.settings_dialog.ui(ctx, &mut self.store) {
            settings.apply_theme(ctx);
            self.notify(NoticeKind::Success, "Settings saved");
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.store.layout(&self.current_layout).is_err() {
            self.current_layout = self
                .store
                .default_layout()
                .map(|l| l.id.clone())
                .unwrap_or_default();
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| self.top_bar(ui));

        let mut events = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.summary_cards(ui);
            ui.add_space(8.0);
            egui::ScrollArea::vertical()
                .id_source("dashboard_scroll")
                .auto_shrink([false; 2])
                .drag_to_scroll(false)
                .show(ui, |ui| {
                    let widgets = self
                        .store
                        .layout(&self.current_layout)
                        .map(|l| l.widgets.as_slice())
                        .unwrap_or_default();
                    let dash_ctx =
                        DashboardContext::new(self.store.goals(), self.store.settings());
                    events = self.dashboard.ui(ui, widgets, &dash_ctx, &mut self.caches);
                });
        });
        for event in events {
            self.handle_event(event);
        }

        self.run_dialogs(ctx);

        if let Some(err) = self.store.take_persist_error() {
            self.notify(NoticeKind::Error, format!("Failed to save: {err}"));
        }
        self.toasts.show(ctx);
    }
}
