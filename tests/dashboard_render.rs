use eframe::egui;
use okr_dashboard::dashboard::widgets::{default_content, default_size};
use okr_dashboard::dashboard::{
    render_widget, Dashboard, DashboardContext, GridRect, RenderCaches, Widget, WidgetContent,
    WidgetKind,
};
use okr_dashboard::goals::{Goal, GoalType};
use okr_dashboard::settings::Settings;
use okr_dashboard::store::snapshot::Snapshot;
use serde_json::json;

fn every_kind() -> Vec<Widget> {
    let mut y = 0;
    let mut widgets = Vec::new();
    for kind in WidgetKind::ALL {
        let size = default_size(kind);
        widgets.push(Widget::new(
            kind.as_str(),
            default_content(kind),
            GridRect::at(0, y, size),
        ));
        y += size.h;
    }
    widgets
}

fn sample_goals() -> Vec<Goal> {
    let mut read = Goal::new("g1", "Read 24 books", GoalType::Yearly);
    read.progress = 40;
    let mut run = Goal::new("g2", "Run a half marathon", GoalType::Quarterly);
    run.progress = 75;
    vec![read, run]
}

#[test]
fn every_kind_renders_headless() {
    let goals = sample_goals();
    let settings = Settings::default();
    let ctx = DashboardContext::new(&goals, &settings);
    let mut caches = RenderCaches::default();
    for widget in every_kind() {
        let mut action = None;
        egui::__run_test_ui(|ui| {
            action = render_widget(ui, &widget, &ctx, &mut caches);
        });
        assert_eq!(action, None, "{} requested an action", widget.id);
    }
}

#[test]
fn starter_layout_renders_in_grid() {
    let snapshot = Snapshot::first_run();
    let settings = Settings::default();
    let ctx = DashboardContext::new(&snapshot.goals, &settings);
    let mut caches = RenderCaches::default();
    let mut dashboard = Dashboard::default();
    let mut events = Vec::new();
    egui::__run_test_ui(|ui| {
        events = dashboard.ui(ui, &snapshot.layouts[0].widgets, &ctx, &mut caches);
    });
    assert!(events.is_empty());
    assert!(!dashboard.is_dragging());
}

#[test]
fn unsupported_widget_renders_fallback() {
    let widget = Widget::new(
        "wx",
        WidgetContent::from_parts("weather", json!({"city": "Lisbon"})),
        GridRect::new(0, 0, 2, 2),
    );
    assert_eq!(widget.display_title(), "weather");
    let goals: Vec<Goal> = Vec::new();
    let settings = Settings::default();
    let ctx = DashboardContext::new(&goals, &settings);
    let mut caches = RenderCaches::default();
    let mut action = None;
    egui::__run_test_ui(|ui| {
        action = render_widget(ui, &widget, &ctx, &mut caches);
    });
    assert_eq!(action, None);
}
