use crate::dashboard::widgets::WidgetContent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Size of a widget in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub w: i32,
    pub h: i32,
}

impl GridSize {
    pub const MIN: GridSize = GridSize { w: 1, h: 1 };

    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// Largest coordinate or extent a stored rect keeps.
pub const MAX_GRID_CELLS: i32 = 10_000;

/// Position and size of a widget on the dashboard grid.
///
/// `w` and `h` are always at least one cell and `x`/`y` are never negative.
/// Every field is capped at [`MAX_GRID_CELLS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl GridRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x: x.clamp(0, MAX_GRID_CELLS),
            y: y.clamp(0, MAX_GRID_CELLS),
            w: w.clamp(1, MAX_GRID_CELLS),
            h: h.clamp(1, MAX_GRID_CELLS),
        }
    }

    pub fn at(x: i32, y: i32, size: GridSize) -> Self {
        Self::new(x, y, size.w, size.h)
    }

    pub fn size(&self) -> GridSize {
        GridSize::new(self.w, self.h)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn overlaps(&self, other: &GridRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    fn normalized(self) -> Self {
        Self::new(self.x, self.y, self.w, self.h)
    }
}

/// A widget placed on a layout.
///
/// The JSON form is `{id, type, title?, content, layout}`. The `type` tag and
/// `content` object are folded into [`WidgetContent`] on load; a tag or
/// content shape that is not understood is kept verbatim as
/// [`WidgetContent::Unsupported`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWidget", into = "RawWidget")]
pub struct Widget {
    pub id: String,
    pub title: Option<String>,
    pub content: WidgetContent,
    pub layout: GridRect,
}

impl Widget {
    pub fn new(id: impl Into<String>, content: WidgetContent, layout: GridRect) -> Self {
        Self {
            id: id.into(),
            title: None,
            content,
            layout,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn type_tag(&self) -> &str {
        self.content.type_tag()
    }

    /// Title shown in the widget header: explicit title, then a title inside
    /// the content, then the type label.
    pub fn display_title(&self) -> String {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.content.inner_title())
            .map(str::to_string)
            .unwrap_or_else(|| match self.content.kind() {
                Some(kind) => kind.label().to_string(),
                None => self.type_tag().to_string(),
            })
    }
}

#[derive(Serialize, Deserialize)]
struct RawWidget {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    content: Value,
    layout: GridRect,
}

impl From<RawWidget> for Widget {
    fn from(raw: RawWidget) -> Self {
        let content = WidgetContent::from_parts(&raw.kind, raw.content);
        Self {
            id: raw.id,
            title: raw.title,
            content,
            layout: raw.layout.normalized(),
        }
    }
}

impl From<Widget> for RawWidget {
    fn from(widget: Widget) -> Self {
        Self {
            id: widget.id,
            kind: widget.content.type_tag().to_string(),
            title: widget.title,
            content: widget.content.to_value(),
            layout: widget.layout,
        }
    }
}

/// Top-level field replacement for a widget. Fields left `None` are kept.
///
/// `content` replaces the whole content value; callers that want to change a
/// single content field read the current content, modify it and pass the
/// result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetPatch {
    pub title: Option<Option<String>>,
    pub content: Option<WidgetContent>,
    pub layout: Option<GridRect>,
}

impl WidgetPatch {
    pub fn content(content: WidgetContent) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn title(title: Option<String>) -> Self {
        Self {
            title: Some(title),
            ..Self::default()
        }
    }

    pub fn layout(layout: GridRect) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    pub fn apply(self, widget: &mut Widget) {
        if let Some(title) = self.title {
            widget.title = title;
        }
        if let Some(content) = self.content {
            widget.content = content;
        }
        if let Some(layout) = self.layout {
            widget.layout = layout.normalized();
        }
    }
}

/// A named arrangement of widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Layout {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            widgets: Vec::new(),
        }
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widget(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::widgets::pomodoro::PomodoroContent;
    use serde_json::json;

    #[test]
    fn rect_clamps_degenerate_sizes() {
        let rect = GridRect::new(-3, -1, 0, -5);
        assert_eq!(rect, GridRect::new(0, 0, 1, 1));
    }

    #[test]
    fn huge_coordinates_are_capped() {
        let rect = GridRect::new(i32::MAX, i32::MAX, i32::MAX, 2);
        assert_eq!(rect, GridRect::new(MAX_GRID_CELLS, MAX_GRID_CELLS, MAX_GRID_CELLS, 2));
        assert_eq!(rect.bottom(), MAX_GRID_CELLS + 2);

        let raw = GridRect { x: 0, y: i32::MAX, w: 1, h: 2 };
        assert_eq!(raw.bottom(), i32::MAX);
        assert!(!raw.overlaps(&GridRect::new(0, 0, 1, 1)));

        let widget: Widget = serde_json::from_value(json!({
            "id": "far",
            "type": "avatar",
            "content": {},
            "layout": { "x": 0, "y": 2147483647, "w": 2, "h": 2 }
        }))
        .unwrap();
        assert_eq!(widget.layout.y, MAX_GRID_CELLS);
    }

    #[test]
    fn overlap_is_exclusive_at_edges() {
        let a = GridRect::new(0, 0, 2, 2);
        assert!(!a.overlaps(&GridRect::new(2, 0, 2, 2)));
        assert!(!a.overlaps(&GridRect::new(0, 2, 2, 2)));
        assert!(a.overlaps(&GridRect::new(1, 1, 2, 2)));
    }

    #[test]
    fn widget_json_keeps_stored_shape() {
        let value = json!({
            "id": "w1",
            "type": "pomodoro",
            "content": { "duration": 25 },
            "layout": { "x": 0, "y": 0, "w": 3, "h": 2 }
        });
        let widget: Widget = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(
            widget.content,
            WidgetContent::Pomodoro(PomodoroContent { duration: Some(25.0) })
        );
        assert_eq!(serde_json::to_value(&widget).unwrap(), value);
    }

    #[test]
    fn unknown_type_is_preserved_verbatim() {
        let value = json!({
            "id": "w9",
            "type": "weather",
            "title": "Weather",
            "content": { "city": "Oslo", "units": ["c"] },
            "layout": { "x": 1, "y": 2, "w": 2, "h": 2 }
        });
        let widget: Widget = serde_json::from_value(value.clone()).unwrap();
        assert!(matches!(
            &widget.content,
            WidgetContent::Unsupported { type_tag, .. } if type_tag == "weather"
        ));
        assert_eq!(serde_json::to_value(&widget).unwrap(), value);
    }

    #[test]
    fn zero_sized_layout_is_normalized_on_load() {
        let widget: Widget = serde_json::from_value(json!({
            "id": "w1",
            "type": "avatar",
            "content": {},
            "layout": { "x": 0, "y": 0, "w": 0, "h": 0 }
        }))
        .unwrap();
        assert_eq!(widget.layout.size(), GridSize::MIN);
    }

    #[test]
    fn display_title_falls_back_to_content_then_label() {
        let widget: Widget = serde_json::from_value(json!({
            "id": "s",
            "type": "schedule",
            "content": { "title": "Workday", "schedule": [] },
            "layout": { "x": 0, "y": 0, "w": 3, "h": 6 }
        }))
        .unwrap();
        assert_eq!(widget.display_title(), "Workday");
        let avatar = Widget::new(
            "a",
            WidgetContent::from_parts("avatar", json!({})),
            GridRect::new(0, 0, 2, 2),
        );
        assert_eq!(avatar.display_title(), "Avatar");
    }

    #[test]
    fn patch_replaces_only_given_fields() {
        let mut widget = Widget::new(
            "w1",
            WidgetContent::Pomodoro(PomodoroContent { duration: Some(25.0) }),
            GridRect::new(0, 0, 3, 2),
        )
        .with_title("Focus");
        WidgetPatch::layout(GridRect::new(4, 1, 3, 2)).apply(&mut widget);
        assert_eq!(widget.title.as_deref(), Some("Focus"));
        assert_eq!(widget.layout, GridRect::new(4, 1, 3, 2));
    }
}
