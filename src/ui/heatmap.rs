use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Ui};

use aqi_dashboard::data::aggregate::CorrelationMatrix;

use crate::color;

const CELL: f32 = 52.0;
const LABEL_GUTTER: f32 = 56.0;

/// Paint the correlation matrix as a grid of coloured cells.
///
/// Undefined cells (constant columns) are grey and labelled "n/a".
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.metrics.len();
    let size = egui::vec2(LABEL_GUTTER + CELL * n as f32, LABEL_GUTTER + CELL * n as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + egui::vec2(LABEL_GUTTER, LABEL_GUTTER);
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(12.0);

    for (i, metric) in matrix.metrics.iter().enumerate() {
        let offset = CELL * i as f32 + CELL / 2.0;
        painter.text(
            origin + egui::vec2(offset, -8.0),
            Align2::CENTER_BOTTOM,
            metric.label(),
            font.clone(),
            text_color,
        );
        painter.text(
            origin + egui::vec2(-8.0, offset),
            Align2::RIGHT_CENTER,
            metric.label(),
            font.clone(),
            text_color,
        );
    }

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let min = origin + egui::vec2(CELL * j as f32, CELL * i as f32);
            let cell = Rect::from_min_size(min, egui::vec2(CELL, CELL)).shrink(1.0);
            painter.rect_filled(cell, 2.0, color::correlation_color(r));

            let label = if r.is_nan() {
                "n/a".to_string()
            } else {
                format!("{r:.2}")
            };
            let ink = if r.abs() > 0.6 {
                Color32::WHITE
            } else {
                Color32::BLACK
            };
            painter.text(cell.center(), Align2::CENTER_CENTER, label, font.clone(), ink);
        }
    }
}
