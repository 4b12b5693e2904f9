//! Snapshot migration registry.
//!
//! Each entry upgrades a snapshot from `version - 1` to `version`. Entries
//! must stay in strictly increasing order.

use super::snapshot::SnapshotError;
use crate::dashboard::widgets::WidgetRegistry;
use chrono::Utc;
use serde_json::{json, Map, Value};

type MigrationFn = fn(Value) -> Result<Value, String>;

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    apply: MigrationFn,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        apply: v0_to_v1,
    },
    Migration {
        version: 2,
        apply: v1_to_v2,
    },
];

/// Latest snapshot version this binary can read and write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Version of a raw snapshot. The browser-era wrapper `{state, version}` and
/// objects without a `version` field are version 0.
pub fn detect_version(value: &Value) -> u32 {
    if value.get("state").is_some() {
        return 0;
    }
    value
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Run every migration newer than `from`.
pub fn migrate(mut value: Value, from: u32) -> Result<Value, SnapshotError> {
    let latest = latest_version();
    if from > latest {
        return Err(SnapshotError::UnsupportedVersion {
            found: from,
            supported: latest,
        });
    }
    for migration in MIGRATIONS {
        if migration.version <= from {
            continue;
        }
        value = (migration.apply)(value).map_err(|reason| SnapshotError::Migration {
            version: migration.version,
            reason,
        })?;
        tracing::info!(version = migration.version, "migrated snapshot");
    }
    Ok(value)
}

fn take_array(obj: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match obj.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Unwrap the persisted-store wrapper, move layouts out of settings, convert
/// `position` + `size` into a `layout` rect and rename the chat settings.
fn v0_to_v1(value: Value) -> Result<Value, String> {
    let root = match value {
        Value::Object(mut obj) => match obj.remove("state") {
            Some(Value::Object(state)) => state,
            Some(_) => return Err("`state` is not an object".into()),
            None => obj,
        },
        _ => return Err("snapshot is not an object".into()),
    };
    let mut root = root;
    let goals: Vec<Value> = take_array(&mut root, "goals")
        .into_iter()
        .map(upgrade_goal_v0)
        .collect();
    let tags = take_array(&mut root, "tags");
    let mut settings_in = match root.remove("settings") {
        Some(Value::Object(s)) => s,
        _ => Map::new(),
    };

    let registry = WidgetRegistry::with_defaults();
    let mut raw_layouts = take_array(&mut settings_in, "layouts");
    if raw_layouts.is_empty() {
        raw_layouts = take_array(&mut root, "layouts");
    }
    let layouts: Vec<Value> = raw_layouts
        .into_iter()
        .map(|layout| upgrade_layout_v0(layout, &registry))
        .collect::<Result<_, _>>()?;

    let mut settings = Map::new();
    if let Some(v) = settings_in.remove("defaultLayout") {
        settings.insert("default_layout".into(), v);
    }
    if let Some(v) = settings_in.remove("theme") {
        settings.insert("theme".into(), v);
    }
    let mut chat = Map::new();
    for (from, to) in [
        ("openaiKey", "api_key"),
        ("openaiBaseUrl", "base_url"),
        ("openaiModel", "model"),
    ] {
        if let Some(v) = settings_in.remove(from).filter(|v| !v.is_null()) {
            chat.insert(to.into(), v);
        }
    }
    if !chat.is_empty() {
        settings.insert("chat".into(), Value::Object(chat));
    }
    // Keys already in the current shape are kept.
    for (key, value) in settings_in {
        settings.entry(key).or_insert(value);
    }

    Ok(json!({
        "version": 1,
        "goals": goals,
        "tags": tags,
        "layouts": layouts,
        "settings": settings,
    }))
}

fn upgrade_goal_v0(goal: Value) -> Value {
    let Value::Object(mut obj) = goal else {
        return goal;
    };
    let now = Value::String(Utc::now().to_rfc3339());
    obj.entry("createdAt").or_insert_with(|| now.clone());
    obj.entry("updatedAt").or_insert(now);
    if let Some(p) = obj.get("progress").and_then(Value::as_f64) {
        obj.insert("progress".into(), json!(p.round().clamp(0.0, 100.0) as u64));
    }
    Value::Object(obj)
}

fn upgrade_layout_v0(layout: Value, registry: &WidgetRegistry) -> Result<Value, String> {
    let Value::Object(mut obj) = layout else {
        return Err("layout is not an object".into());
    };
    let mut bottom = 0i64;
    let mut widgets = Vec::new();
    for widget in take_array(&mut obj, "widgets") {
        let widget = upgrade_widget_v0(widget, registry, bottom)?;
        let y = widget["layout"]["y"].as_i64().unwrap_or(0);
        let h = widget["layout"]["h"].as_i64().unwrap_or(1);
        bottom = bottom.max(y + h);
        widgets.push(widget);
    }
    obj.insert("widgets".into(), Value::Array(widgets));
    Ok(Value::Object(obj))
}

/// `next_row` replaces a `y` that was stored as `Infinity` (serialised as
/// `null`) by the browser grid.
fn upgrade_widget_v0(
    widget: Value,
    registry: &WidgetRegistry,
    next_row: i64,
) -> Result<Value, String> {
    let Value::Object(mut obj) = widget else {
        return Err("widget is not an object".into());
    };
    if obj.contains_key("layout") {
        return Ok(Value::Object(obj));
    }
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let position = obj.remove("position").unwrap_or(Value::Null);
    let size = obj.remove("size").unwrap_or(Value::Null);
    let default_size = registry.default_size_for_tag(&kind);
    let x = position.get("x").and_then(Value::as_i64).unwrap_or(0);
    let y = position
        .get("y")
        .and_then(Value::as_i64)
        .unwrap_or(next_row);
    let w = size
        .get("w")
        .and_then(Value::as_i64)
        .unwrap_or(i64::from(default_size.w));
    let h = size
        .get("h")
        .and_then(Value::as_i64)
        .unwrap_or(i64::from(default_size.h));
    obj.insert("layout".into(), json!({ "x": x, "y": y, "w": w, "h": h }));

    let title = obj.remove("title");
    let content = obj
        .entry("content")
        .or_insert_with(|| Value::Object(Map::new()));
    if content.is_null() {
        *content = Value::Object(Map::new());
    }
    if let (Some(Value::String(title)), Value::Object(content)) = (title, content) {
        content
            .entry("title")
            .or_insert_with(|| Value::String(title));
    }
    Ok(Value::Object(obj))
}

fn grid_number(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        .map(|n| n.clamp(0, i64::from(i32::MAX)))
}

/// Give every widget of every layout a numeric `layout` rect.
///
/// The browser grid stored "below everything" as `y: Infinity`, which JSON
/// turns into `null`. A missing or non-numeric `y` becomes the first row under
/// the widgets before it; missing sizes come from the registry. Runs on every
/// snapshot after migration. Returns how many rows had to be placed.
pub fn place_open_rows(value: &mut Value, registry: &WidgetRegistry) -> usize {
    let mut placed = 0;
    let Some(Value::Array(layouts)) = value.get_mut("layouts") else {
        return 0;
    };
    for layout in layouts {
        let Some(Value::Array(widgets)) = layout.get_mut("widgets") else {
            continue;
        };
        let mut bottom = 0i64;
        for widget in widgets.iter_mut().filter_map(Value::as_object_mut) {
            let kind = widget
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let size = registry.default_size_for_tag(&kind);
            let rect = widget.get("layout").filter(|l| l.is_object());
            let x = grid_number(rect.and_then(|r| r.get("x"))).unwrap_or(0);
            let w = grid_number(rect.and_then(|r| r.get("w"))).unwrap_or(i64::from(size.w));
            let h = grid_number(rect.and_then(|r| r.get("h"))).unwrap_or(i64::from(size.h));
            let y = match grid_number(rect.and_then(|r| r.get("y"))) {
                Some(y) => y,
                None => {
                    placed += 1;
                    tracing::debug!(widget = ?widget.get("id"), row = bottom, "placing widget on first free row");
                    bottom
                }
            };
            bottom = bottom.max(y + h.max(1));
            widget.insert("layout".into(), json!({ "x": x, "y": y, "w": w, "h": h }));
        }
    }
    placed
}

/// Lift `content.title` to an optional widget-level `title`.
fn v1_to_v2(value: Value) -> Result<Value, String> {
    let Value::Object(mut root) = value else {
        return Err("snapshot is not an object".into());
    };
    if let Some(Value::Array(layouts)) = root.get_mut("layouts") {
        for layout in layouts {
            let Some(Value::Array(widgets)) = layout.get_mut("widgets") else {
                continue;
            };
            for widget in widgets.iter_mut().filter_map(Value::as_object_mut) {
                if widget.contains_key("title") {
                    continue;
                }
                let title = widget
                    .get("content")
                    .and_then(|c| c.get("title"))
                    .and_then(Value::as_str)
                    .filter(|t| !t.trim().is_empty())
                    .map(str::to_string);
                if let Some(title) = title {
                    widget.insert("title".into(), Value::String(title));
                }
            }
        }
    }
    root.insert("version".into(), json!(2));
    Ok(Value::Object(root))
}
