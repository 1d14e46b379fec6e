use eframe::egui;

use aqi_dashboard::config::{AppConfig, Theme};

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AqiDashboardApp {
    pub state: AppState,
    applied_theme: Option<Theme>,
}

impl AqiDashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        Self {
            state: AppState::new(config),
            applied_theme: None,
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        if self.applied_theme == Some(self.state.theme) {
            return;
        }
        let visuals = match self.state.theme {
            Theme::Light => egui::Visuals::light(),
            Theme::Dark => egui::Visuals::dark(),
        };
        ctx.set_visuals(visuals);
        self.applied_theme = Some(self.state.theme);
    }
}

impl eframe::App for AqiDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, insights, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if self.state.dataset.is_none() {
                        ui.centered_and_justified(|ui| {
                            ui.heading("Open a dataset to begin  (File → Open…)");
                        });
                        return;
                    }
                    panels::header(ui, &self.state);
                    panels::kpis(ui, &self.state);
                    panels::insights(ui, &self.state);
                    plot::charts(ui, &self.state);
                });
        });
    }
}
