use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot;
use crate::state::AppState;
use crate::view::{
    ChartPanel, HistogramSeries, MetricCard, RenderSnapshot, TableData, ViewStatus,
    NO_DATA_MESSAGE, NO_SEX_DATA_MESSAGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainTab {
    #[default]
    Age,
    Fare,
    Heatmap,
    GroupSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsightTab {
    #[default]
    TopGroups,
    Embarked,
    About,
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

pub fn summary(ui: &mut Ui, snapshot: &RenderSnapshot) {
    ui.heading("Summary Statistics");

    let cards = &snapshot.cards;
    ui.columns(4, |cols| {
        metric_tile(&mut cols[0], &cards.total);
        metric_tile(&mut cols[1], &cards.survival_rate);
        metric_tile(&mut cols[2], &cards.survived);
        metric_tile(&mut cols[3], &cards.died);
    });

    ui.add_space(6.0);
    ui.strong("Sex-wise Survival Rate");
    if snapshot.sex_rates.is_empty() {
        warning(ui, NO_SEX_DATA_MESSAGE);
    } else {
        ui.horizontal(|ui: &mut Ui| {
            for card in &snapshot.sex_rates {
                metric_tile(ui, card);
            }
        });
    }
}

fn metric_tile(ui: &mut Ui, card: &MetricCard) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(120.0);
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(&card.label).strong());
            ui.label(RichText::new(&card.value).size(28.0));
            if let Some(delta) = &card.delta {
                let color = if delta.starts_with('-') {
                    Color32::from_rgb(0xc6, 0x28, 0x28)
                } else {
                    Color32::from_rgb(0x2e, 0x7d, 0x32)
                };
                ui.label(RichText::new(delta).color(color));
            }
        });
    });
}

fn warning(ui: &mut Ui, message: &str) {
    ui.label(RichText::new(format!("⚠ {message}")).color(Color32::from_rgb(0xb2, 0x6a, 0x00)));
}

fn info(ui: &mut Ui, message: &str) {
    ui.group(|ui: &mut Ui| {
        ui.label(RichText::new(message).color(Color32::from_rgb(0x15, 0x65, 0xc0)));
    });
}

// ---------------------------------------------------------------------------
// Central panel: exploratory visualizations
// ---------------------------------------------------------------------------

pub fn visualizations(ui: &mut Ui, state: &mut AppState, tab: &mut MainTab) {
    ui.heading("Exploratory Visualizations");

    if state.snapshot().status == ViewStatus::NoData {
        info(ui, NO_DATA_MESSAGE);
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(tab, MainTab::Age, "Age Distribution");
        ui.selectable_value(tab, MainTab::Fare, "Fare Distribution");
        ui.selectable_value(tab, MainTab::Heatmap, "Survival Heatmap");
        ui.selectable_value(tab, MainTab::GroupSummary, "Group Summary");
    });
    ui.separator();

    match tab {
        MainTab::Age => {
            ui.label("Age distribution by outcome (normalised stacked histogram)");
            histogram_panel(ui, "age_histogram", &state.snapshot().age_chart);
        }
        MainTab::Fare => {
            ui.label("Fare distribution by outcome");
            let mut log_scale = state.options().fare_log_scale;
            if ui
                .checkbox(&mut log_scale, "Use log scale on x (Fare)")
                .changed()
            {
                state.set_fare_log_scale(log_scale);
            }
            histogram_panel(ui, "fare_histogram", &state.snapshot().fare_chart);
        }
        MainTab::Heatmap => {
            ui.label("Mean survival rate (%) per Pclass × Embarked");
            match &state.snapshot().heatmap {
                ChartPanel::Chart(heat) => plot::heatmap(ui, heat),
                ChartPanel::Message(msg) => warning(ui, msg),
            }
        }
        MainTab::GroupSummary => {
            ui.label("Sex × Pclass summary: passengers, survivors, survival rate (%)");
            data_table(ui, "group_summary", &state.snapshot().group_summary);
        }
    }
}

fn histogram_panel(ui: &mut Ui, id: &str, panel: &ChartPanel<HistogramSeries>) {
    match panel {
        ChartPanel::Chart(series) => plot::outcome_histogram(ui, id, series),
        ChartPanel::Message(msg) => warning(ui, msg),
    }
}

// ---------------------------------------------------------------------------
// Right panel: detailed insights
// ---------------------------------------------------------------------------

pub fn insights(ui: &mut Ui, snapshot: &RenderSnapshot, tab: &mut InsightTab) {
    ui.heading("Detailed Insights");

    if snapshot.status == ViewStatus::NoData {
        info(ui, NO_DATA_MESSAGE);
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(tab, InsightTab::TopGroups, "Top Groups");
        ui.selectable_value(tab, InsightTab::Embarked, "Embarked Details");
        ui.selectable_value(tab, InsightTab::About, "About");
    });
    ui.separator();

    match tab {
        InsightTab::TopGroups => {
            ui.label("Groups with the highest and lowest survival rates.");
            ui.strong("Survival Top 3");
            data_table(ui, "top_groups", &snapshot.top_groups);
            ui.add_space(8.0);
            ui.strong("Survival Bottom 3");
            data_table(ui, "bottom_groups", &snapshot.bottom_groups);
        }
        InsightTab::Embarked => {
            ui.label("Passengers, survivors, survival rate and mean fare per port.");
            data_table(ui, "port_summary", &snapshot.port_summary);
        }
        InsightTab::About => {
            ui.strong("About this dashboard");
            ui.label("• Dataset: Titanic passenger list (Kaggle)");
            ui.label("• Columns: Pclass, Sex, Age, Fare, Embarked, Survived");
            ui.label("• Metrics: survival rate, top/bottom groups, port details");
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub fn data_table(ui: &mut Ui, id: &str, table: &TableData) {
    if table.is_empty() {
        warning(ui, "No groups to display.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(56.0), table.columns.len())
            .header(20.0, |mut header| {
                for column in &table.columns {
                    header.col(|ui| {
                        ui.strong(column);
                    });
                }
            })
            .body(|mut body| {
                for row in &table.rows {
                    body.row(18.0, |mut tr| {
                        for cell in row {
                            tr.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}
