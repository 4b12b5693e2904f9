use crate::dashboard::layout::LayoutChange;
use crate::dashboard::model::{GridRect, Widget};
use crate::dashboard::widgets::{render_widget, DashboardContext, RenderCaches, WidgetAction};
use eframe::egui;

/// Number of grid columns.
pub const GRID_COLS: i32 = 8;
/// Height of one grid row in points.
pub const ROW_HEIGHT: f32 = 100.0;
const HANDLE_SIZE: f32 = 14.0;

/// Something the grid view asks the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    Widget(WidgetAction),
    /// Full change list of every visible widget after a move or resize.
    LayoutChanged(Vec<LayoutChange>),
    EditWidget(String),
    RemoveWidget(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragMode {
    Move,
    Resize,
}

#[derive(Clone, Debug)]
struct DragState {
    id: String,
    mode: DragMode,
    origin: GridRect,
    delta: egui::Vec2,
}

/// Grid view over the widgets of one layout.
pub struct Dashboard {
    pub cols: i32,
    pub row_height: f32,
    /// When false the move and resize handles are hidden.
    pub editable: bool,
    drag: Option<DragState>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            row_height: ROW_HEIGHT,
            editable: true,
            drag: None,
        }
    }
}

/// Grid rect a drag turns `origin` into, snapped to whole cells and kept
/// inside `cols`.
fn dragged_rect(
    origin: GridRect,
    mode: DragMode,
    delta: egui::Vec2,
    cell: egui::Vec2,
    cols: i32,
) -> GridRect {
    let dx = (delta.x / cell.x.max(1.0)).round() as i32;
    let dy = (delta.y / cell.y.max(1.0)).round() as i32;
    match mode {
        DragMode::Move => {
            let w = origin.w.min(cols);
            GridRect::new(
                origin.x.saturating_add(dx).clamp(0, cols - w),
                origin.y.saturating_add(dy),
                w,
                origin.h,
            )
        }
        DragMode::Resize => GridRect::new(
            origin.x,
            origin.y,
            origin.w.saturating_add(dx).clamp(1, (cols - origin.x).max(1)),
            origin.h.saturating_add(dy),
        ),
    }
}

/// Change list after `id` moved to `target`. Widgets that would overlap are
/// pushed down below it; everything else keeps its rect.
pub fn change_list(widgets: &[Widget], id: &str, target: GridRect) -> Vec<LayoutChange> {
    let mut placed: Vec<GridRect> = vec![target];
    let mut order: Vec<usize> = (0..widgets.len()).filter(|&i| widgets[i].id != id).collect();
    order.sort_by_key(|&i| (widgets[i].layout.y, widgets[i].layout.x));
    let mut rects: Vec<Option<GridRect>> = vec![None; widgets.len()];
    for i in order {
        let mut rect = widgets[i].layout;
        while let Some(bottom) = placed
            .iter()
            .filter(|p| p.overlaps(&rect))
            .map(|p| p.bottom())
            .max()
        {
            rect.y = bottom;
        }
        placed.push(rect);
        rects[i] = Some(rect);
    }
    widgets
        .iter()
        .zip(rects)
        .map(|(w, rect)| LayoutChange::new(w.id.clone(), rect.unwrap_or(target)))
        .collect()
}

impl Dashboard {
    pub fn new(cols: i32, row_height: f32) -> Self {
        Self {
            cols: cols.max(1),
            row_height,
            ..Self::default()
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        widgets: &[Widget],
        ctx: &DashboardContext<'_>,
        caches: &mut RenderCaches,
    ) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        if widgets.is_empty() {
            ui.weak("This layout has no widgets yet. Use \"Add widget\" to place one.");
            return events;
        }

        let rows = widgets.iter().map(|w| w.layout.bottom()).max().unwrap_or(1).max(1);
        let col_width = ui.available_width() / self.cols as f32;
        let cell = egui::vec2(col_width, self.row_height);
        let size = egui::vec2(ui.available_width(), self.row_height * rows as f32);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let mut child = ui.child_ui(rect, egui::Layout::top_down(egui::Align::LEFT));

        let to_screen = |r: GridRect| {
            egui::Rect::from_min_size(
                rect.min + egui::vec2(cell.x * r.x as f32, cell.y * r.y as f32),
                egui::vec2(cell.x * r.w as f32, cell.y * r.h as f32),
            )
        };

        for widget in widgets {
            let slot_rect = to_screen(widget.layout).shrink(4.0);
            let slot_clip = slot_rect.intersect(child.clip_rect());
            let inner = child.allocate_ui_at_rect(slot_rect, |slot_ui| {
                slot_ui.set_clip_rect(slot_clip);
                slot_ui.set_min_size(slot_rect.size());
                self.render_slot(widget, slot_rect, slot_ui, ctx, caches)
            });
            events.extend(inner.inner);
            if self.editable {
                self.resize_handle(&mut child, widget, slot_rect);
            }
        }

        if let Some(drag) = &self.drag {
            let preview = dragged_rect(drag.origin, drag.mode, drag.delta, cell, self.cols);
            let painter = ui.painter_at(rect);
            painter.rect_stroke(
                to_screen(preview).shrink(4.0),
                4.0,
                (2.0, ui.visuals().selection.stroke.color),
            );
        }

        if ui.input(|i| i.pointer.any_released()) {
            if let Some(drag) = self.drag.take() {
                let target = dragged_rect(drag.origin, drag.mode, drag.delta, cell, self.cols);
                if target != drag.origin {
                    tracing::debug!(id = %drag.id, ?target, "widget dragged");
                    events.push(DashboardEvent::LayoutChanged(change_list(
                        widgets, &drag.id, target,
                    )));
                }
            }
        }
        events
    }

    fn render_slot(
        &mut self,
        widget: &Widget,
        slot_rect: egui::Rect,
        ui: &mut egui::Ui,
        ctx: &DashboardContext<'_>,
        caches: &mut RenderCaches,
    ) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.vertical(|ui| {
                let header_rect = ui
                    .horizontal(|ui| {
                        if self.editable {
                            let handle = ui
                                .add(egui::Label::new("⠿").sense(egui::Sense::drag()))
                                .on_hover_text("Drag to move");
                            self.track_drag(&handle, widget, DragMode::Move);
                        }
                        let resp = ui.strong(widget.display_title());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                                events.push(DashboardEvent::RemoveWidget(widget.id.clone()));
                            }
                            if ui.small_button("✏").on_hover_text("Edit").clicked() {
                                events.push(DashboardEvent::EditWidget(widget.id.clone()));
                            }
                        });
                        resp.rect
                    })
                    .inner;
                let body_height = (slot_rect.height()
                    - header_rect.height()
                    - ui.spacing().item_spacing.y * 3.0)
                    .max(0.0);
                egui::ScrollArea::both()
                    .id_source(("widget-scroll", &widget.id))
                    .auto_shrink([false; 2])
                    .max_height(body_height)
                    .show(ui, |ui| {
                        if let Some(action) = render_widget(ui, widget, ctx, caches) {
                            events.push(DashboardEvent::Widget(action));
                        }
                    });
            });
        });
        events
    }

    fn resize_handle(&mut self, ui: &mut egui::Ui, widget: &Widget, slot_rect: egui::Rect) {
        let handle_rect = egui::Rect::from_min_size(
            slot_rect.max - egui::vec2(HANDLE_SIZE, HANDLE_SIZE),
            egui::vec2(HANDLE_SIZE, HANDLE_SIZE),
        );
        let response = ui
            .interact(
                handle_rect,
                ui.id().with(("resize", &widget.id)),
                egui::Sense::drag(),
            )
            .on_hover_cursor(egui::CursorIcon::ResizeNwSe);
        let color = if response.hovered() || response.dragged() {
            ui.visuals().selection.stroke.color
        } else {
            ui.visuals().weak_text_color()
        };
        let painter = ui.painter();
        for offset in [4.0, 8.0, 12.0] {
            painter.line_segment(
                [
                    egui::pos2(handle_rect.right() - offset, handle_rect.bottom()),
                    egui::pos2(handle_rect.right(), handle_rect.bottom() - offset),
                ],
                (1.0, color),
            );
        }
        self.track_drag(&response, widget, DragMode::Resize);
    }

    fn track_drag(&mut self, response: &egui::Response, widget: &Widget, mode: DragMode) {
        if response.drag_started() {
            self.drag = Some(DragState {
                id: widget.id.clone(),
                mode,
                origin: widget.layout,
                delta: egui::Vec2::ZERO,
            });
        }
        if response.dragged() {
            if let Some(drag) = self.drag.as_mut().filter(|d| d.id == widget.id && d.mode == mode)
            {
                drag.delta += response.drag_delta();
            }
        }
    }
}
