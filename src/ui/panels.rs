use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use aqi_dashboard::data::national;

use crate::color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("AQI Dashboard Filters");
    ui.separator();

    let Some(selection) = state.selection.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- City selector ----
    ui.strong("Select City");
    let mut chosen_city = None;
    egui::ComboBox::from_id_salt("city_select")
        .selected_text(&selection.city)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for city in &state.cities {
                if ui.selectable_label(selection.city == *city, city).clicked() {
                    chosen_city = Some(city.clone());
                }
            }
        });
    if let Some(city) = chosen_city {
        state.set_city(&city);
    }
    ui.add_space(8.0);

    // ---- Date range ----
    ui.strong("Select Date Range");
    let mut start = selection.start;
    let mut end = selection.end;
    let mut range_changed = false;
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        range_changed |= ui
            .add(DatePickerButton::new(&mut start).id_salt("start_date"))
            .changed();
        ui.end_row();
        ui.label("To");
        range_changed |= ui
            .add(DatePickerButton::new(&mut end).id_salt("end_date"))
            .changed();
        ui.end_row();
    });
    if range_changed {
        state.set_range(start, end);
    }
    if start > end {
        ui.colored_label(Color32::YELLOW, "Start is after end: nothing selected.");
    }
    if ui.button("Full range").clicked() {
        state.reset_range();
    }

    ui.separator();
    ui.label(format!("{} rows selected", state.filtered.len()));
    if ui.button("Download Filtered Data").clicked() {
        save_export_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                save_export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(source)) = (&state.dataset, &state.source) {
            ui.label(format!(
                "{} measurements, {} cities  ({})",
                ds.len(),
                state.cities.len(),
                source.path().display()
            ));
        }

        ui.separator();

        let theme_label = format!("Theme: {}", state.theme.label());
        if ui.selectable_label(false, theme_label).clicked() {
            state.toggle_theme();
        }

        if let Some(msg) = &state.status_message {
            let tint = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().weak_text_color()
            };
            ui.label(RichText::new(msg).color(tint));
        }
    });
}

// ---------------------------------------------------------------------------
// Header, KPIs and insights
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui, state: &AppState) {
    let Some(selection) = &state.selection else {
        return;
    };
    ui.heading(RichText::new("India Air Quality Analytics Dashboard").size(24.0));
    ui.label(
        RichText::new(format!(
            "{}  ·  {}",
            selection.city,
            national::landmark(&selection.city)
        ))
        .size(18.0)
        .strong(),
    );
    ui.label(format!("{} to {}", selection.start, selection.end));
    ui.add_space(8.0);
}

/// Four metric tiles: city, mean, max, min.  Without data the numbers are
/// replaced by "no data", never by zero.
pub fn kpis(ui: &mut Ui, state: &AppState) {
    let city = state
        .selection
        .as_ref()
        .map_or(String::new(), |s| s.city.clone());
    let (mean, max, min) = match &state.summary {
        Ok(s) => (
            format!("{:.2}", s.mean_aqi),
            format!("{:.0}", s.max_aqi),
            format!("{:.0}", s.min_aqi),
        ),
        Err(_) => ("no data".into(), "no data".into(), "no data".into()),
    };

    ui.columns(4, |cols| {
        metric(&mut cols[0], "City", &city);
        metric(&mut cols[1], "Avg AQI", &mean);
        metric(&mut cols[2], "Max AQI", &max);
        metric(&mut cols[3], "Min AQI", &min);
    });
    ui.add_space(8.0);
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

pub fn insights(ui: &mut Ui, state: &AppState) {
    ui.heading("Key Insights");
    match &state.summary {
        Ok(s) => {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(format!(
                    "Best Air Quality Day: {} (AQI: {})",
                    s.best_day.date, s.best_day.aqi
                ));
                ui.label(format!(
                    "Worst Air Quality Day: {} (AQI: {})",
                    s.worst_day.date, s.worst_day.aqi
                ));
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Most Common Category:");
                    ui.colored_label(color::category_color(&s.modal_category), &s.modal_category);
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Health Status:");
                    ui.colored_label(
                        color::health_color(s.health_status),
                        RichText::new(s.health_status.label()).strong(),
                    );
                });
                ui.label(RichText::new(s.health_status.advice()).italics());
            });
        }
        Err(e) => {
            ui.colored_label(
                Color32::YELLOW,
                format!("No data for this selection ({e}). Widen the date range or pick another city."),
            );
        }
    }
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open air-quality data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn save_export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(state.export_name())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(path);
    }
}
