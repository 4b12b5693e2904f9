use okr_dashboard::dashboard::widgets::{GoalsContent, WidgetContent, WidgetKind};
use okr_dashboard::dashboard::GridRect;
use okr_dashboard::goals::{GoalStatus, GoalType};
use okr_dashboard::settings::Theme;
use okr_dashboard::store::snapshot::{Snapshot, CURRENT_VERSION};
use okr_dashboard::store::storage::MemoryStorage;
use okr_dashboard::store::Store;
use serde_json::json;

/// Shape written by the browser build: a persist wrapper around the state,
/// widgets placed with `position` + `size`, the title at the top level and
/// the chat settings flattened into `settings`.
fn v0_fixture() -> serde_json::Value {
    json!({
        "state": {
            "goals": [{
                "id": "g1",
                "title": "Read 24 books",
                "description": "",
                "type": "yearly",
                "status": "in_progress",
                "progress": 37.5,
                "tags": [],
                "children": []
            }],
            "tags": [{"id": "t1", "name": "health", "color": "#22c55e"}],
            "settings": {
                "defaultLayout": "default",
                "theme": "dark",
                "openaiKey": "sk-old",
                "openaiBaseUrl": "https://proxy.example/v1",
                "openaiModel": "gpt-4",
                "layouts": [{
                    "id": "default",
                    "name": "Default Layout",
                    "widgets": [
                        {
                            "id": "goals",
                            "title": "2024 Goals",
                            "type": "goals",
                            "position": {"x": 0, "y": 2},
                            "size": {"w": 4, "h": 4},
                            "content": {"goals": []}
                        },
                        {
                            "id": "chat",
                            "title": "Assistant",
                            "type": "chat",
                            "position": {"x": 0, "y": null},
                            "size": {"w": 3, "h": 4},
                            "content": {"messages": []}
                        },
                        {
                            "id": "notes",
                            "title": "Notes",
                            "type": "custom_content",
                            "position": {"x": 4},
                            "content": {"type": "markdown", "data": "# hi"}
                        }
                    ]
                }]
            }
        },
        "version": 0
    })
}

#[test]
fn v0_snapshot_is_migrated() {
    let loaded = Snapshot::parse(&v0_fixture().to_string()).unwrap();
    assert_eq!(loaded.migrated_from, Some(0));
    let snapshot = loaded.snapshot;
    assert_eq!(snapshot.version, CURRENT_VERSION);

    assert_eq!(snapshot.settings.theme, Theme::Dark);
    assert_eq!(snapshot.settings.chat.api_key.as_deref(), Some("sk-old"));
    assert_eq!(snapshot.settings.chat.base_url, "https://proxy.example/v1");
    assert_eq!(snapshot.settings.chat.model, "gpt-4");

    let goal = &snapshot.goals[0];
    assert_eq!(goal.kind, GoalType::Yearly);
    assert_eq!(goal.status, GoalStatus::InProgress);
    assert_eq!(goal.progress, 38);
    assert_eq!(snapshot.tags[0].name, "health");

    let widgets = &snapshot.layouts[0].widgets;
    assert_eq!(widgets.len(), 3);

    assert_eq!(widgets[0].layout, GridRect::new(0, 2, 4, 4));
    assert_eq!(widgets[0].title.as_deref(), Some("2024 Goals"));
    let WidgetContent::Goals(GoalsContent { title, .. }) = &widgets[0].content else {
        panic!("expected goals content");
    };
    assert_eq!(title, "2024 Goals");

    // `y: Infinity` became the first free row below the goals widget.
    assert_eq!(widgets[1].layout, GridRect::new(0, 6, 3, 4));

    assert_eq!(widgets[2].content.kind(), Some(WidgetKind::Custom));
    assert_eq!(widgets[2].layout.x, 4);
    assert_eq!(widgets[2].layout.size(), okr_dashboard::dashboard::widgets::default_size(WidgetKind::Custom));
}

#[test]
fn unwrapped_v0_object_is_accepted() {
    let state = v0_fixture()["state"].clone();
    let loaded = Snapshot::parse(&state.to_string()).unwrap();
    assert_eq!(loaded.migrated_from, Some(0));
    assert_eq!(loaded.snapshot.layouts[0].widgets.len(), 3);
}

#[test]
fn v1_snapshot_gets_widget_titles() {
    let v1 = json!({
        "version": 1,
        "goals": [],
        "tags": [],
        "layouts": [{
            "id": "default",
            "name": "Default Layout",
            "widgets": [{
                "id": "s",
                "type": "schedule",
                "content": {"title": "Workday", "schedule": [{"time": "09:00", "activity": "Deep work"}]},
                "layout": {"x": 4, "y": 0, "w": 3, "h": 6}
            }]
        }],
        "settings": {"default_layout": "default"}
    });
    let loaded = Snapshot::parse(&v1.to_string()).unwrap();
    assert_eq!(loaded.migrated_from, Some(1));
    let widget = &loaded.snapshot.layouts[0].widgets[0];
    assert_eq!(widget.title.as_deref(), Some("Workday"));
    assert_eq!(widget.display_title(), "Workday");
}

#[test]
fn migrated_snapshot_is_written_back() {
    let storage = MemoryStorage::with_contents(v0_fixture().to_string());
    let store = Store::open(Box::new(storage.clone())).unwrap();
    assert_eq!(store.layouts()[0].widgets.len(), 3);
    let saved: serde_json::Value = serde_json::from_str(&storage.contents().unwrap()).unwrap();
    assert_eq!(saved["version"], json!(CURRENT_VERSION));
    assert!(saved.get("state").is_none());
    assert_eq!(saved["layouts"][0]["widgets"][2]["type"], "custom");
}

fn v1_with_open_row() -> serde_json::Value {
    json!({
        "version": 1,
        "goals": [{
            "id": "g1",
            "title": "Ship the app",
            "type": "quarterly",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }],
        "tags": [],
        "layouts": [{
            "id": "default",
            "name": "Default Layout",
            "widgets": [
                {"id": "a", "type": "avatar", "content": {"seed": "ada"}, "layout": {"x": 0, "y": 0, "w": 2, "h": 2}},
                {"id": "b", "type": "pomodoro", "content": {"duration": 30}, "layout": {"x": 0, "y": null, "w": 3, "h": 2}}
            ]
        }],
        "settings": {"default_layout": "default"}
    })
}

#[test]
fn open_row_in_layout_object_is_placed() {
    let loaded = Snapshot::parse(&v1_with_open_row().to_string()).unwrap();
    assert_eq!(loaded.placed_rows, 1);
    let widgets = &loaded.snapshot.layouts[0].widgets;
    assert_eq!(widgets[1].layout, GridRect::new(0, 2, 3, 2));
}

#[test]
fn open_row_keeps_user_state_on_open() {
    let storage = MemoryStorage::with_contents(v1_with_open_row().to_string());
    let store = Store::open(Box::new(storage.clone())).unwrap();
    let ids: Vec<&str> = store.layouts()[0].widgets.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(store.goals()[0].title, "Ship the app");

    let saved: serde_json::Value = serde_json::from_str(&storage.contents().unwrap()).unwrap();
    assert_eq!(saved["layouts"][0]["widgets"][1]["layout"]["y"], 2);
}

#[test]
fn unversioned_layout_object_with_open_row_loads() {
    let mut state = v1_with_open_row();
    state.as_object_mut().unwrap().remove("version");
    let loaded = Snapshot::parse(&state.to_string()).unwrap();
    assert_eq!(loaded.migrated_from, Some(0));
    let widgets = &loaded.snapshot.layouts[0].widgets;
    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets[1].layout.y, 2);
}
