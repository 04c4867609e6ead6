use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use super::{color32, contrast_text};
use crate::color::{DIED_COLOR, SURVIVED_COLOR};
use crate::view::{Heatmap, HistogramSeries};

// ---------------------------------------------------------------------------
// Outcome histogram (normalised, stacked)
// ---------------------------------------------------------------------------

pub fn outcome_histogram(ui: &mut Ui, id: &str, series: &HistogramSeries) {
    let died: Vec<Bar> = series
        .bars
        .iter()
        .map(|b| {
            Bar::new(b.center, b.died_share)
                .width(b.width * 0.95)
                .name(format!("{}  died: {}", b.label, b.died))
        })
        .collect();
    let survived: Vec<Bar> = series
        .bars
        .iter()
        .map(|b| {
            Bar::new(b.center, b.survived_share)
                .width(b.width * 0.95)
                .name(format!("{}  survived: {}", b.label, b.survived))
        })
        .collect();

    let died_chart = BarChart::new(died)
        .name("Died (0)")
        .color(color32(DIED_COLOR));
    let survived_chart = BarChart::new(survived)
        .name("Survived (1)")
        .color(color32(SURVIVED_COLOR))
        .stack_on(&[&died_chart]);

    Plot::new(id)
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label(series.x_title.clone())
        .y_axis_label("Proportion")
        .include_y(0.0)
        .include_y(1.0)
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(died_chart);
            plot_ui.bar_chart(survived_chart);
        });
}

// ---------------------------------------------------------------------------
// Class × port heatmap
// ---------------------------------------------------------------------------

const CELL_SIZE: egui::Vec2 = egui::vec2(84.0, 40.0);
const EMPTY_CELL: Color32 = Color32::from_gray(235);

pub fn heatmap(ui: &mut Ui, heat: &Heatmap) {
    egui::Grid::new("class_port_heatmap")
        .spacing([3.0, 3.0])
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new("Embarked \\ Pclass").weak());
            for x_label in &heat.x_labels {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.strong(x_label);
                });
            }
            ui.end_row();

            for (y, y_label) in heat.y_labels.iter().enumerate() {
                ui.strong(y_label);
                for (x, x_label) in heat.x_labels.iter().enumerate() {
                    let (rect, response) = ui.allocate_exact_size(CELL_SIZE, Sense::hover());
                    match heat.cells.iter().find(|c| c.x == x && c.y == y) {
                        Some(cell) => {
                            let painter = ui.painter();
                            painter.rect_filled(rect, 3.0, color32(cell.color));
                            painter.text(
                                rect.center(),
                                Align2::CENTER_CENTER,
                                &cell.label,
                                FontId::proportional(14.0),
                                contrast_text(cell.color),
                            );
                            response.on_hover_text(format!(
                                "Pclass {x_label}, Embarked {y_label}: {:.1} %",
                                cell.rate
                            ));
                        }
                        None => {
                            ui.painter().rect_filled(rect, 3.0, EMPTY_CELL);
                        }
                    }
                }
                ui.end_row();
            }
        });

    // ---- Colour legend ----
    ui.add_space(6.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Survival Rate (%)");
        for stop in &heat.legend {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 14.0), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, color32(stop.color));
            ui.label(RichText::new(format!("{:.0}", stop.value)).small());
        }
    });
}
