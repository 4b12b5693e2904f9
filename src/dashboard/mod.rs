pub mod dashboard;
pub mod layout;
pub mod model;
pub mod widgets;

pub use dashboard::{Dashboard, DashboardEvent, GRID_COLS, ROW_HEIGHT};
pub use layout::{LayoutChange, Placement};
pub use model::{GridRect, GridSize, Layout, Widget, WidgetPatch};
pub use widgets::{
    render_widget, DashboardContext, RenderCaches, WidgetAction, WidgetContent, WidgetKind,
    WidgetRegistry,
};
