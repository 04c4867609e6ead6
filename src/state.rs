use crate::color::ColorTheme;
use crate::data::aggregate::{AggregateReport, DistributionOptions};
use crate::data::filter::{self, FilterState, RangeFilter};
use crate::data::model::{Dataset, PassengerClass, Port, Sex};
use crate::view::RenderSnapshot;

/// Run the full pipeline: filter → aggregate → present.
pub fn recompute(
    dataset: &Dataset,
    filters: &FilterState,
    options: DistributionOptions,
) -> RenderSnapshot {
    let view = filter::apply(dataset, filters);
    let report = AggregateReport::compute(&view, options);
    log::debug!(
        "recomputed dashboard: {} of {} rows pass filters",
        view.len(),
        dataset.len()
    );
    RenderSnapshot::build(dataset.len(), report, filters.color_theme, options)
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Owns the dataset and the only mutable input, the [`FilterState`]. Every
/// change goes through [`AppState::update`], which replaces the state and
/// rebuilds the snapshot from the full dataset.
pub struct AppState {
    dataset: Dataset,
    /// Load-time defaults; also the slider bounds.
    defaults: FilterState,
    filters: FilterState,
    options: DistributionOptions,
    snapshot: RenderSnapshot,
}

impl AppState {
    /// Ingest the loaded dataset and compute the initial snapshot.
    pub fn new(dataset: Dataset) -> Self {
        let defaults = FilterState::for_dataset(&dataset);
        let filters = defaults.clone();
        let options = DistributionOptions::default();
        let snapshot = recompute(&dataset, &filters, options);
        AppState {
            dataset,
            defaults,
            filters,
            options,
            snapshot,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn defaults(&self) -> &FilterState {
        &self.defaults
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn options(&self) -> DistributionOptions {
        self.options
    }

    pub fn snapshot(&self) -> &RenderSnapshot {
        &self.snapshot
    }

    /// Replace the filter state wholesale and recompute.
    pub fn update(&mut self, filters: FilterState) -> &RenderSnapshot {
        self.filters = filters;
        self.snapshot = recompute(&self.dataset, &self.filters, self.options);
        &self.snapshot
    }

    pub fn set_options(&mut self, options: DistributionOptions) -> &RenderSnapshot {
        self.options = options;
        self.snapshot = recompute(&self.dataset, &self.filters, self.options);
        &self.snapshot
    }

    pub fn set_fare_log_scale(&mut self, fare_log_scale: bool) {
        self.set_options(DistributionOptions { fare_log_scale });
    }

    /// Restore the load-time defaults.
    pub fn reset_filters(&mut self) {
        let theme = self.filters.color_theme;
        self.update(self.defaults.clone().with_color_theme(theme));
    }

    // -- category selections --

    pub fn toggle_class(&mut self, class: PassengerClass) {
        let mut classes = self.filters.classes.clone();
        if !classes.remove(&class) {
            classes.insert(class);
        }
        self.update(self.filters.clone().with_classes(classes));
    }

    pub fn toggle_sex(&mut self, sex: Sex) {
        let mut sexes = self.filters.sexes.clone();
        if !sexes.remove(&sex) {
            sexes.insert(sex);
        }
        self.update(self.filters.clone().with_sexes(sexes));
    }

    pub fn toggle_port(&mut self, port: Port) {
        let mut ports = self.filters.ports.clone();
        if !ports.remove(&port) {
            ports.insert(port);
        }
        self.update(self.filters.clone().with_ports(ports));
    }

    pub fn select_all_classes(&mut self) {
        let all = self.dataset.classes.clone();
        self.update(self.filters.clone().with_classes(all));
    }

    pub fn select_no_classes(&mut self) {
        self.update(self.filters.clone().with_classes(Vec::<PassengerClass>::new()));
    }

    pub fn select_all_sexes(&mut self) {
        let all = self.dataset.sexes.clone();
        self.update(self.filters.clone().with_sexes(all));
    }

    pub fn select_no_sexes(&mut self) {
        self.update(self.filters.clone().with_sexes(Vec::<Sex>::new()));
    }

    pub fn select_all_ports(&mut self) {
        let all = self.dataset.ports.clone();
        self.update(self.filters.clone().with_ports(all));
    }

    pub fn select_no_ports(&mut self) {
        self.update(self.filters.clone().with_ports(Vec::<Port>::new()));
    }

    // -- ranges --

    pub fn set_age_range(&mut self, lo: f64, hi: f64) {
        let age = RangeFilter {
            lo,
            hi,
            ..self.filters.age
        };
        self.update(self.filters.clone().with_age(age));
    }

    pub fn set_include_missing_age(&mut self, include_missing: bool) {
        let age = RangeFilter {
            include_missing,
            ..self.filters.age
        };
        self.update(self.filters.clone().with_age(age));
    }

    pub fn set_fare_range(&mut self, lo: f64, hi: f64) {
        let fare = RangeFilter {
            lo,
            hi,
            ..self.filters.fare
        };
        self.update(self.filters.clone().with_fare(fare));
    }

    pub fn set_include_missing_fare(&mut self, include_missing: bool) {
        let fare = RangeFilter {
            include_missing,
            ..self.filters.fare
        };
        self.update(self.filters.clone().with_fare(fare));
    }

    pub fn set_color_theme(&mut self, theme: ColorTheme) {
        self.update(self.filters.clone().with_color_theme(theme));
    }
}
