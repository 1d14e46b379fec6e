use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};

use aqi_dashboard::data::aggregate::HealthStatus;
use aqi_dashboard::data::national::CityAverage;

use crate::color;

/// Longitude/latitude scatter of every mapped city, coloured by the health
/// band of its full-history mean AQI and sized by that mean.
pub fn national_map(ui: &mut Ui, averages: &[CityAverage]) {
    if averages.is_empty() {
        ui.label("None of the dataset's cities have map coordinates.");
        return;
    }

    Plot::new("national_map")
        .height(420.0)
        .data_aspect(1.0)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .include_x(68.0)
        .include_x(90.0)
        .include_y(8.0)
        .include_y(34.0)
        .show(ui, |plot_ui| {
            // one series per band keeps the legend meaningful
            for status in HealthStatus::ALL {
                let members = averages
                    .iter()
                    .filter(|c| HealthStatus::from_aqi(c.mean_aqi) == status);
                for city in members {
                    let radius = (4.0 + city.mean_aqi / 25.0).min(18.0) as f32;
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[city.longitude, city.latitude]]))
                            .name(status.label())
                            .shape(MarkerShape::Circle)
                            .filled(true)
                            .radius(radius)
                            .color(color::health_color(status)),
                    );
                }
            }
            for city in averages {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(city.longitude, city.latitude + 0.6),
                        RichText::new(format!("{} ({:.0})", city.city, city.mean_aqi)).size(11.0),
                    )
                    .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}
