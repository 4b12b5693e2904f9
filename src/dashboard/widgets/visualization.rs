use super::{DashboardContext, WidgetContent, WidgetSettingsContext, WidgetSettingsUiResult};
use crate::goals::stats::{self, Bucket};
use crate::goals::Goal;
use eframe::egui::{self, Color32};
use serde::{Deserialize, Serialize};

const PALETTE: [Color32; 6] = [
    Color32::from_rgb(0x00, 0x88, 0xFE),
    Color32::from_rgb(0x00, 0xC4, 0x9F),
    Color32::from_rgb(0xFF, 0xBB, 0x28),
    Color32::from_rgb(0xFF, 0x80, 0x42),
    Color32::from_rgb(0x88, 0x84, 0xD8),
    Color32::from_rgb(0x82, 0xCA, 0x9D),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Pie,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSource {
    #[default]
    Type,
    Status,
    Progress,
}

impl ChartSource {
    pub fn label(&self) -> &'static str {
        match self {
            ChartSource::Type => "By type",
            ChartSource::Status => "By status",
            ChartSource::Progress => "By progress",
        }
    }

    pub fn buckets(&self, goals: &[Goal]) -> Vec<Bucket> {
        match self {
            ChartSource::Type => stats::by_type(goals),
            ChartSource::Status => stats::by_status(goals),
            ChartSource::Progress => stats::by_progress(goals),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationContent {
    #[serde(rename = "type", default)]
    pub chart: ChartKind,
    #[serde(default)]
    pub data_type: ChartSource,
}

pub fn render(ui: &mut egui::Ui, content: &VisualizationContent, ctx: &DashboardContext<'_>) {
    let buckets = content.data_type.buckets(ctx.goals);
    let total: usize = buckets.iter().map(|b| b.value).sum();
    if total == 0 {
        ui.weak("No goals to chart");
        return;
    }
    match content.chart {
        ChartKind::Bar => bar_chart(ui, &buckets),
        ChartKind::Pie => share_chart(ui, &buckets, total),
    }
}

fn bar_chart(ui: &mut egui::Ui, buckets: &[Bucket]) {
    let max = buckets.iter().map(|b| b.value).max().unwrap_or(0).max(1) as f32;
    let height = (ui.available_height() - 24.0).max(40.0);
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let slot = rect.width() / buckets.len().max(1) as f32;
    let text_color = ui.visuals().text_color();
    for (i, bucket) in buckets.iter().enumerate() {
        let bar_h = (rect.height() - 32.0).max(0.0) * bucket.value as f32 / max;
        let left = rect.left() + slot * i as f32 + slot * 0.15;
        let bottom = rect.bottom() - 16.0;
        let bar = egui::Rect::from_min_max(
            egui::pos2(left, bottom - bar_h),
            egui::pos2(left + slot * 0.7, bottom),
        );
        painter.rect_filled(bar, 3.0, PALETTE[0]);
        painter.text(
            egui::pos2(bar.center().x, bar.top() - 2.0),
            egui::Align2::CENTER_BOTTOM,
            bucket.value.to_string(),
            egui::FontId::proportional(11.0),
            text_color,
        );
        painter.text(
            egui::pos2(bar.center().x, rect.bottom()),
            egui::Align2::CENTER_BOTTOM,
            &bucket.label,
            egui::FontId::proportional(10.0),
            text_color,
        );
    }
}

/// Proportional stacked bar with a legend, standing in for a pie chart.
fn share_chart(ui: &mut egui::Ui, buckets: &[Bucket], total: usize) {
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), 20.0),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let mut x = rect.left();
    for (i, bucket) in buckets.iter().enumerate() {
        let w = rect.width() * bucket.value as f32 / total as f32;
        let seg = egui::Rect::from_min_max(egui::pos2(x, rect.top()), egui::pos2(x + w, rect.bottom()));
        painter.rect_filled(seg, 0.0, PALETTE[i % PALETTE.len()]);
        x += w;
    }
    ui.add_space(4.0);
    for (i, bucket) in buckets.iter().enumerate().filter(|(_, b)| b.value > 0) {
        ui.horizontal(|ui| {
            let (swatch, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
            ui.painter().rect_filled(swatch, 2.0, PALETTE[i % PALETTE.len()]);
            ui.label(format!("{} ({})", bucket.label, bucket.value));
        });
    }
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    _ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::Visualization(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let before = cfg.clone();
    ui.horizontal(|ui| {
        ui.label("Chart");
        ui.radio_value(&mut cfg.chart, ChartKind::Pie, "Pie");
        ui.radio_value(&mut cfg.chart, ChartKind::Bar, "Bar");
    });
    egui::ComboBox::from_label("Data")
        .selected_text(cfg.data_type.label())
        .show_ui(ui, |ui| {
            for source in [ChartSource::Type, ChartSource::Status, ChartSource::Progress] {
                ui.selectable_value(&mut cfg.data_type, source, source.label());
            }
        });
    WidgetSettingsUiResult::changed(*cfg != before)
}
