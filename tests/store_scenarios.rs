use okr_dashboard::dashboard::{
    GridRect, LayoutChange, Widget, WidgetContent, WidgetKind, WidgetPatch,
};
use okr_dashboard::dashboard::widgets::PomodoroContent;
use okr_dashboard::settings::DEFAULT_LAYOUT_ID;
use okr_dashboard::store::snapshot::Snapshot;
use okr_dashboard::store::storage::{FileStorage, MemoryStorage};
use okr_dashboard::store::{Store, StoreError};
use serde_json::json;

fn pomodoro(minutes: f64) -> WidgetContent {
    WidgetContent::Pomodoro(PomodoroContent {
        duration: Some(minutes),
    })
}

fn memory_store() -> (Store, MemoryStorage) {
    let handle = MemoryStorage::new();
    let store = Store::with_snapshot(Snapshot::default(), Box::new(handle.clone()));
    (store, handle)
}

#[test]
fn add_then_reposition_pomodoro() {
    let (mut store, _) = memory_store();
    store
        .add_widget(
            DEFAULT_LAYOUT_ID,
            Widget::new("w1", pomodoro(25.0), GridRect::new(0, 0, 3, 2)),
        )
        .unwrap();
    let widgets = store
        .reposition(
            DEFAULT_LAYOUT_ID,
            &[LayoutChange::new("w1", GridRect::new(2, 1, 3, 2))],
        )
        .unwrap();
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].id, "w1");
    assert_eq!(widgets[0].layout, GridRect::new(2, 1, 3, 2));
    assert_eq!(widgets[0].content, pomodoro(25.0));
}

#[test]
fn updated_content_reads_back_exactly() {
    let (mut store, handle) = memory_store();
    store
        .add_widget(
            DEFAULT_LAYOUT_ID,
            Widget::new("w1", pomodoro(25.0), GridRect::new(0, 0, 3, 2)),
        )
        .unwrap();
    store
        .update_widget(DEFAULT_LAYOUT_ID, "w1", WidgetPatch::content(pomodoro(50.0)))
        .unwrap();
    let widget = store.layout(DEFAULT_LAYOUT_ID).unwrap().widget("w1").unwrap();
    assert_eq!(widget.content, pomodoro(50.0));
    assert_eq!(widget.layout, GridRect::new(0, 0, 3, 2));

    let saved: serde_json::Value = serde_json::from_str(&handle.contents().unwrap()).unwrap();
    assert_eq!(
        saved["layouts"][0]["widgets"][0]["content"],
        json!({"duration": 50})
    );
}

#[test]
fn add_then_remove_restores_collection() {
    let (mut store, _) = memory_store();
    store
        .append_widget(DEFAULT_LAYOUT_ID, WidgetKind::Avatar, None)
        .unwrap();
    let before = store.widgets(DEFAULT_LAYOUT_ID).unwrap().to_vec();
    store
        .add_widget(
            DEFAULT_LAYOUT_ID,
            Widget::new("temp", pomodoro(25.0), GridRect::new(0, 9, 1, 1)),
        )
        .unwrap();
    let after = store.remove_widget(DEFAULT_LAYOUT_ID, "temp").unwrap();
    assert_eq!(after, before.as_slice());
}

#[test]
fn reposition_ignores_absent_ids() {
    let (mut store, _) = memory_store();
    store
        .add_widget(
            DEFAULT_LAYOUT_ID,
            Widget::new("w1", pomodoro(25.0), GridRect::new(0, 0, 3, 2)),
        )
        .unwrap();
    let before = store.widgets(DEFAULT_LAYOUT_ID).unwrap().to_vec();
    let after = store
        .reposition(
            DEFAULT_LAYOUT_ID,
            &[LayoutChange::new("other", GridRect::new(4, 4, 1, 1))],
        )
        .unwrap();
    assert_eq!(after, before.as_slice());
}

#[test]
fn unknown_widget_type_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("okr-kanban-storage.json");
    std::fs::write(
        &path,
        json!({
            "version": 2,
            "layouts": [{
                "id": "default",
                "name": "Default Layout",
                "widgets": [{
                    "id": "wx",
                    "type": "weather",
                    "content": {"city": "Lisbon", "units": "metric"},
                    "layout": {"x": 0, "y": 0, "w": 2, "h": 2}
                }]
            }]
        })
        .to_string(),
    )
    .unwrap();

    let mut store = Store::open(Box::new(FileStorage::new(&path))).unwrap();
    store
        .append_widget(DEFAULT_LAYOUT_ID, WidgetKind::Pomodoro, None)
        .unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let widget = &saved["layouts"][0]["widgets"][0];
    assert_eq!(widget["type"], "weather");
    assert_eq!(widget["content"], json!({"city": "Lisbon", "units": "metric"}));
    assert_eq!(saved["layouts"][0]["widgets"][1]["layout"]["y"], 2);
}

#[test]
fn first_open_writes_starter_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("okr-kanban-storage.json");
    let store = Store::open(Box::new(FileStorage::new(&path))).unwrap();
    assert_eq!(store.default_layout().unwrap().widgets.len(), 4);
    assert!(path.exists());
}

#[test]
fn corrupt_file_is_backed_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("okr-kanban-storage.json");
    std::fs::write(&path, "{ this is not json").unwrap();
    let store = Store::open(Box::new(FileStorage::new(&path))).unwrap();
    assert_eq!(store.layouts().len(), 1);
    let backup = dir.path().join("okr-kanban-storage.json.corrupt");
    assert_eq!(
        std::fs::read_to_string(backup).unwrap(),
        "{ this is not json"
    );
}

#[test]
fn newer_snapshot_is_refused_and_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("okr-kanban-storage.json");
    let text = r#"{"version": 99, "goals": []}"#;
    std::fs::write(&path, text).unwrap();
    let err = Store::open(Box::new(FileStorage::new(&path))).unwrap_err();
    assert!(format!("{err:#}").contains("newer than the supported version"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn missing_layout_is_reported_for_every_widget_operation() {
    let (mut store, _) = memory_store();
    let missing = StoreError::LayoutNotFound("nope".into());
    assert_eq!(
        store
            .append_widget("nope", WidgetKind::Chat, None)
            .unwrap_err(),
        missing
    );
    assert_eq!(store.remove_widget("nope", "w").unwrap_err(), missing);
    assert_eq!(
        store
            .update_widget("nope", "w", WidgetPatch::default())
            .unwrap_err(),
        missing
    );
}
