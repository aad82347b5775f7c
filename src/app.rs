use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and metal tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and downloads ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, chart, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(metal) = self.state.active_metal() else {
                ui.centered_and_justified(|ui| {
                    ui.heading("No metals configured");
                });
                return;
            };
            if panels::source_banner(ui, metal) {
                return;
            }
            let Some(view) = &metal.view else {
                return;
            };

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(format!("📈 {} Price Analysis", metal.source.name));
                ui.add_space(6.0);
                panels::metrics_row(ui, &view.summary);
                ui.separator();

                plot::price_chart(ui, &metal.source.name, metal.color, &view.table);
                ui.separator();

                ui.heading("📊 Data Table");
                table::data_table(ui, &metal.source.name, &view.table);
            });
        });
    }
}
