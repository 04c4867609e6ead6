use std::collections::BTreeSet;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color::ColorTheme;
use crate::data::filter::RangeFilter;
use crate::state::AppState;
use crate::view::format_count;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// One edit to a multi-select category filter.
enum CategoryEdit<T> {
    Toggle(T),
    All,
    None,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Titanic Passenger Dashboard");
    ui.label("Changing a filter refreshes every chart.");
    ui.separator();

    // Clone what we need so we can mutate state inside the panel.
    let dataset = state.dataset();
    let all_classes = dataset.classes.clone();
    let all_sexes = dataset.sexes.clone();
    let all_ports = dataset.ports.clone();
    let defaults = state.defaults().clone();
    let filters = state.filters().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Colour theme ----
            ui.strong("Color theme");
            egui::ComboBox::from_id_salt("color_theme")
                .selected_text(filters.color_theme.name())
                .show_ui(ui, |ui: &mut Ui| {
                    for theme in ColorTheme::ALL {
                        if ui
                            .selectable_label(filters.color_theme == theme, theme.name())
                            .clicked()
                        {
                            state.set_color_theme(theme);
                        }
                    }
                });
            ui.separator();

            ui.heading("Filters");

            // ---- Categories ----
            match category_filter(ui, "Pclass", &all_classes, &filters.classes, |c| {
                format!("Class {c}")
            }) {
                Some(CategoryEdit::Toggle(c)) => state.toggle_class(c),
                Some(CategoryEdit::All) => state.select_all_classes(),
                Some(CategoryEdit::None) => state.select_no_classes(),
                None => {}
            }

            match category_filter(ui, "Sex", &all_sexes, &filters.sexes, |s| {
                s.label().to_string()
            }) {
                Some(CategoryEdit::Toggle(s)) => state.toggle_sex(s),
                Some(CategoryEdit::All) => state.select_all_sexes(),
                Some(CategoryEdit::None) => state.select_no_sexes(),
                None => {}
            }

            match category_filter(ui, "Embarked", &all_ports, &filters.ports, |p| {
                p.code().to_string()
            }) {
                Some(CategoryEdit::Toggle(p)) => state.toggle_port(p),
                Some(CategoryEdit::All) => state.select_all_ports(),
                Some(CategoryEdit::None) => state.select_no_ports(),
                None => {}
            }

            ui.separator();

            // ---- Age ----
            ui.strong("Age range");
            if let Some((lo, hi)) = range_sliders(ui, filters.age, defaults.age, 1.0) {
                state.set_age_range(lo, hi);
            }
            let mut include_age = filters.age.include_missing;
            if ui
                .checkbox(&mut include_age, "Include unknown Age")
                .changed()
            {
                state.set_include_missing_age(include_age);
            }

            ui.add_space(6.0);

            // ---- Fare ----
            ui.strong("Fare range");
            if let Some((lo, hi)) = range_sliders(ui, filters.fare, defaults.fare, 0.0) {
                state.set_fare_range(lo, hi);
            }
            let mut include_fare = filters.fare.include_missing;
            if ui
                .checkbox(&mut include_fare, "Include unknown Fare")
                .changed()
            {
                state.set_include_missing_fare(include_fare);
            }

            ui.separator();

            ui.label("Rows after filter");
            ui.label(
                RichText::new(format_count(state.snapshot().rows_after_filter))
                    .size(26.0)
                    .strong(),
            );
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

/// Collapsible checkbox list with All / None buttons.
fn category_filter<T: Copy + Ord>(
    ui: &mut Ui,
    title: &str,
    all_values: &BTreeSet<T>,
    selected: &BTreeSet<T>,
    label: impl Fn(T) -> String,
) -> Option<CategoryEdit<T>> {
    let mut edit = None;
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    edit = Some(CategoryEdit::All);
                }
                if ui.small_button("None").clicked() {
                    edit = Some(CategoryEdit::None);
                }
            });

            for &value in all_values {
                let mut checked = selected.contains(&value);
                if ui.checkbox(&mut checked, label(value)).changed() {
                    edit = Some(CategoryEdit::Toggle(value));
                }
            }
        });

    edit
}

/// "from" / "to" sliders bounded by the load-time range. Returns the new
/// range when either slider moved; `lo <= hi` is kept.
fn range_sliders(
    ui: &mut Ui,
    current: RangeFilter,
    bounds: RangeFilter,
    step: f64,
) -> Option<(f64, f64)> {
    let mut lo = current.lo;
    let mut hi = current.hi;
    let range = bounds.lo..=bounds.hi;

    let mut lo_slider = egui::Slider::new(&mut lo, range.clone()).text("from");
    let mut hi_slider = egui::Slider::new(&mut hi, range).text("to");
    if step > 0.0 {
        lo_slider = lo_slider.step_by(step);
        hi_slider = hi_slider.step_by(step);
    }
    let lo_changed = ui.add(lo_slider).changed();
    let hi_changed = ui.add(hi_slider).changed();

    if !(lo_changed || hi_changed) {
        return None;
    }
    if lo > hi {
        if lo_changed {
            hi = lo;
        } else {
            lo = hi;
        }
    }
    Some((lo, hi))
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top title bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Titanic Passenger Dashboard");
        ui.separator();

        let snapshot = state.snapshot();
        ui.label(format!(
            "{} passengers loaded, {} after filter",
            format_count(snapshot.dataset_rows),
            format_count(snapshot.rows_after_filter)
        ));

        ui.separator();

        let mut log_scale = state.options().fare_log_scale;
        if ui
            .selectable_label(log_scale, "Log-scale Fare")
            .clicked()
        {
            log_scale = !log_scale;
            state.set_fare_log_scale(log_scale);
        }
    });
}
