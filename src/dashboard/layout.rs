use crate::dashboard::model::{GridRect, GridSize, Widget};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the change list emitted by the grid after a drag or resize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutChange {
    #[serde(alias = "i")]
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl LayoutChange {
    pub fn new(id: impl Into<String>, rect: GridRect) -> Self {
        Self {
            id: id.into(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }
}

/// Where a new widget goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    At { x: i32, y: i32 },
    /// Column zero of the first row below every existing widget.
    Append,
}

/// First row not covered by any widget; `0` for an empty layout.
pub fn next_free_row(widgets: &[Widget]) -> i32 {
    widgets
        .iter()
        .map(|w| w.layout.bottom())
        .max()
        .unwrap_or(0)
        .max(0)
}

pub fn resolve_placement(widgets: &[Widget], placement: Placement, size: GridSize) -> GridRect {
    match placement {
        Placement::At { x, y } => GridRect::at(x, y, size),
        Placement::Append => GridRect::at(0, next_free_row(widgets), size),
    }
}

/// Merge a change list into `widgets`.
///
/// Only `layout` of widgets whose id appears in `changes` is replaced; order
/// and every other field stay as they were. Returns how many widgets moved.
pub fn apply_layout_changes(widgets: &mut [Widget], changes: &[LayoutChange]) -> usize {
    let by_id: HashMap<&str, GridRect> = changes
        .iter()
        .map(|c| (c.id.as_str(), c.rect()))
        .collect();
    for change in changes {
        if !widgets.iter().any(|w| w.id == change.id) {
            tracing::debug!(id = %change.id, "ignoring layout change for unknown widget");
        }
    }
    let mut updated = 0;
    for widget in widgets.iter_mut() {
        if let Some(rect) = by_id.get(widget.id.as_str()) {
            if widget.layout != *rect {
                widget.layout = *rect;
                updated += 1;
            }
        }
    }
    updated
}

/// Move each widget up as far as it goes without overlapping the widgets
/// before it, and pull widgets wider than `cols` back inside the grid.
pub fn compact(widgets: &mut [Widget], cols: i32) {
    let cols = cols.max(1);
    let mut order: Vec<usize> = (0..widgets.len()).collect();
    order.sort_by_key(|&i| (widgets[i].layout.y, widgets[i].layout.x));
    let mut placed: Vec<GridRect> = Vec::with_capacity(widgets.len());
    for i in order {
        let mut rect = widgets[i].layout;
        rect.w = rect.w.min(cols);
        rect.x = rect.x.min(cols - rect.w);
        while rect.y > 0 {
            let candidate = GridRect { y: rect.y - 1, ..rect };
            if placed.iter().any(|p| p.overlaps(&candidate)) {
                break;
            }
            rect = candidate;
        }
        while placed.iter().any(|p| p.overlaps(&rect)) {
            rect.y += 1;
        }
        widgets[i].layout = rect;
        placed.push(rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::widgets::{default_content, WidgetKind};

    fn widget(id: &str, rect: GridRect) -> Widget {
        Widget::new(id, default_content(WidgetKind::Pomodoro), rect)
    }

    #[test]
    fn change_replaces_only_layout() {
        let mut widgets = vec![widget("a", GridRect::new(0, 0, 3, 2)).with_title("Focus")];
        let before = widgets[0].clone();
        let n = apply_layout_changes(&mut widgets, &[LayoutChange::new("a", GridRect::new(2, 1, 3, 2))]);
        assert_eq!(n, 1);
        assert_eq!(widgets[0].layout, GridRect::new(2, 1, 3, 2));
        assert_eq!(widgets[0].title, before.title);
        assert_eq!(widgets[0].content, before.content);
    }

    #[test]
    fn unknown_ids_and_absent_widgets_are_untouched() {
        let mut widgets = vec![
            widget("a", GridRect::new(0, 0, 1, 1)),
            widget("b", GridRect::new(1, 0, 1, 1)),
        ];
        let before = widgets.clone();
        let n = apply_layout_changes(&mut widgets, &[LayoutChange::new("zzz", GridRect::new(5, 5, 1, 1))]);
        assert_eq!(n, 0);
        assert_eq!(widgets, before);
    }

    #[test]
    fn incoming_sizes_are_clamped() {
        let mut widgets = vec![widget("a", GridRect::new(0, 0, 2, 2))];
        let change = LayoutChange {
            id: "a".into(),
            x: -4,
            y: 3,
            w: 0,
            h: -1,
        };
        apply_layout_changes(&mut widgets, &[change]);
        assert_eq!(widgets[0].layout, GridRect::new(0, 3, 1, 1));
    }

    #[test]
    fn order_is_preserved() {
        let mut widgets = vec![
            widget("a", GridRect::new(0, 0, 1, 1)),
            widget("b", GridRect::new(1, 0, 1, 1)),
        ];
        apply_layout_changes(
            &mut widgets,
            &[
                LayoutChange::new("b", GridRect::new(0, 0, 1, 1)),
                LayoutChange::new("a", GridRect::new(1, 0, 1, 1)),
            ],
        );
        let ids: Vec<&str> = widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn change_list_accepts_grid_engine_id_key() {
        let json = r#"[{"i":"a","x":1,"y":2,"w":3,"h":4}]"#;
        let changes: Vec<LayoutChange> = serde_json::from_str(json).unwrap();
        assert_eq!(changes[0].id, "a");
        assert_eq!(changes[0].rect(), GridRect::new(1, 2, 3, 4));
    }

    #[test]
    fn append_goes_below_lowest_widget() {
        assert_eq!(next_free_row(&[]), 0);
        let widgets = vec![
            widget("a", GridRect::new(0, 0, 2, 2)),
            widget("b", GridRect::new(2, 1, 2, 4)),
        ];
        assert_eq!(next_free_row(&widgets), 5);
        assert_eq!(
            resolve_placement(&widgets, Placement::Append, GridSize::new(3, 2)),
            GridRect::new(0, 5, 3, 2)
        );
        assert_eq!(
            resolve_placement(&widgets, Placement::At { x: 4, y: 1 }, GridSize::new(1, 1)),
            GridRect::new(4, 1, 1, 1)
        );
    }

    #[test]
    fn next_free_row_survives_extreme_rows() {
        let far = Widget {
            layout: GridRect { x: 0, y: i32::MAX, w: 1, h: 2 },
            ..widget("far", GridRect::new(0, 0, 1, 1))
        };
        assert_eq!(next_free_row(&[far]), i32::MAX);

        let mut widgets = vec![widget("a", GridRect::new(0, 0, 1, 1))];
        apply_layout_changes(
            &mut widgets,
            &[LayoutChange { id: "a".into(), x: 0, y: i32::MAX, w: 1, h: i32::MAX }],
        );
        assert_eq!(widgets[0].layout.y, crate::dashboard::model::MAX_GRID_CELLS);
        assert!(next_free_row(&widgets) > 0);
    }

    #[test]
    fn compact_closes_vertical_gaps() {
        let mut widgets = vec![
            widget("a", GridRect::new(0, 0, 2, 2)),
            widget("b", GridRect::new(0, 7, 2, 1)),
            widget("c", GridRect::new(4, 3, 2, 2)),
        ];
        compact(&mut widgets, 8);
        assert_eq!(widgets[0].layout, GridRect::new(0, 0, 2, 2));
        assert_eq!(widgets[1].layout, GridRect::new(0, 2, 2, 1));
        assert_eq!(widgets[2].layout, GridRect::new(4, 0, 2, 2));
    }

    #[test]
    fn compact_keeps_widgets_inside_columns() {
        let mut widgets = vec![widget("a", GridRect::new(7, 0, 4, 1))];
        compact(&mut widgets, 8);
        assert_eq!(widgets[0].layout, GridRect::new(4, 0, 4, 1));
    }
}
