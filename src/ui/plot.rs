use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, LineStyle, Plot, PlotPoints, PlotUi, Points,
};

use aqi_dashboard::data::aggregate::PeriodMean;
use aqi_dashboard::data::forecast::Forecast;
use aqi_dashboard::data::model::Metric;

use crate::color;
use crate::state::AppState;
use crate::ui::{heatmap, map};

const CHART_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Date axis helpers
// ---------------------------------------------------------------------------

fn date_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn date_label(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn date_plot(ui: &mut Ui, id: &str, build: impl FnOnce(&mut PlotUi)) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(date_label)
        .allow_scroll(false)
        .show(ui, build);
}

// ---------------------------------------------------------------------------
// Chart section (central panel)
// ---------------------------------------------------------------------------

/// Render every chart for the current selection, followed by the national map.
pub fn charts(ui: &mut Ui, state: &AppState) {
    if state.filtered.is_empty() {
        ui.label("Charts need at least one measurement in the selected range.");
    } else {
        ui.heading("AQI Trend Over Time");
        aqi_trend(ui, state);

        ui.heading("Pollutant Levels");
        pollutant_lines(ui, state);

        ui.heading("AQI Category Distribution");
        category_bars(ui, state);

        ui.heading("Monthly Average AQI");
        period_chart(ui, "monthly_aqi", &state.monthly, 20.0);

        ui.heading("Yearly Average AQI");
        period_chart(ui, "yearly_aqi", &state.yearly, 240.0);

        ui.heading("Pollutant Correlation");
        if let Ok(summary) = &state.summary {
            heatmap::correlation_heatmap(ui, &summary.correlation);
        }
    }

    ui.heading("7-Day AQI Forecast");
    forecast_chart(ui, state);

    ui.heading("National AQI Map (full history)");
    map::national_map(ui, &state.city_averages);
}

fn aqi_trend(ui: &mut Ui, state: &AppState) {
    let points: PlotPoints = state
        .filtered
        .rows()
        .iter()
        .map(|m| [date_x(m.date), m.aqi])
        .collect();
    date_plot(ui, "aqi_trend", |plot_ui| {
        plot_ui.line(Line::new(points).name("AQI").width(1.5));
    });
}

fn pollutant_lines(ui: &mut Ui, state: &AppState) {
    let palette = color::generate_palette(Metric::POLLUTANTS.len());
    date_plot(ui, "pollutants", |plot_ui| {
        for (metric, colour) in Metric::POLLUTANTS.iter().zip(palette) {
            let points: PlotPoints = state
                .filtered
                .rows()
                .iter()
                .map(|m| [date_x(m.date), metric.value(m)])
                .collect();
            plot_ui.line(Line::new(points).name(metric.label()).color(colour).width(1.2));
        }
    });
}

fn category_bars(ui: &mut Ui, state: &AppState) {
    let bars: Vec<Bar> = state
        .categories
        .iter()
        .enumerate()
        .map(|(i, (category, count))| {
            Bar::new(i as f64, *count as f64)
                .name(category)
                .fill(color::category_color(category))
                .width(0.7)
        })
        .collect();
    let names: Vec<String> = state.categories.iter().map(|(c, _)| c.clone()).collect();

    Plot::new("categories")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("days"));
        });
}

fn period_chart(ui: &mut Ui, id: &str, periods: &[PeriodMean], bar_width_days: f64) {
    let bars: Vec<Bar> = periods
        .iter()
        .map(|p| {
            Bar::new(date_x(p.period_start), p.mean_aqi)
                .name(format!("{} ({} days)", p.period_start.format("%Y-%m"), p.observations))
                .width(bar_width_days)
        })
        .collect();
    date_plot(ui, id, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).name("mean AQI"));
    });
}

fn forecast_chart(ui: &mut Ui, state: &AppState) {
    match &state.forecast {
        Forecast::Unavailable {
            observations,
            required,
        } => {
            ui.colored_label(
                Color32::YELLOW,
                RichText::new(format!(
                    "Not enough data to forecast: {observations} observation(s), at least {required} needed."
                )),
            );
        }
        Forecast::Available { trend, points } => {
            ui.label(format!("Trend: {:+.2} AQI per observation", trend.slope));
            let history: PlotPoints = state
                .filtered
                .rows()
                .iter()
                .map(|m| [date_x(m.date), m.aqi])
                .collect();
            let predicted: Vec<[f64; 2]> = points.iter().map(|p| [date_x(p.date), p.aqi]).collect();

            date_plot(ui, "forecast", |plot_ui| {
                plot_ui.line(Line::new(history).name("observed").width(1.2));
                plot_ui.line(
                    Line::new(PlotPoints::from(predicted.clone()))
                        .name("forecast")
                        .color(Color32::from_rgb(230, 120, 40))
                        .style(LineStyle::dashed_loose())
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(predicted))
                        .name("forecast")
                        .color(Color32::from_rgb(230, 120, 40))
                        .radius(3.0),
                );
            });
        }
    }
}
