use eframe::egui;

use crate::state::AppState;
use crate::ui::dashboard::{self, InsightTab, MainTab};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    main_tab: MainTab,
    insight_tab: InsightTab,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            main_tab: MainTab::default(),
            insight_tab: InsightTab::default(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and row counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: detailed insights ----
        egui::SidePanel::right("insight_panel")
            .default_width(340.0)
            .resizable(true)
            .show(ctx, |ui| {
                dashboard::insights(ui, self.state.snapshot(), &mut self.insight_tab);
            });

        // ---- Central panel: summary and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    dashboard::summary(ui, self.state.snapshot());
                    ui.separator();
                    dashboard::visualizations(ui, &mut self.state, &mut self.main_tab);
                });
        });
    }
}
