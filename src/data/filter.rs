use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{Dataset, Passenger, PassengerClass, Port, Sex};
use crate::color::ColorTheme;

/// Slider range used when the dataset has no ages at all.
pub const FALLBACK_AGE_RANGE: (f64, f64) = (0.0, 80.0);
/// Slider range used when the dataset has no fares at all.
pub const FALLBACK_FARE_RANGE: (f64, f64) = (0.0, 520.0);

// ---------------------------------------------------------------------------
// Range predicate over an optional numeric column
// ---------------------------------------------------------------------------

/// Inclusive `[lo, hi]` range plus the policy for missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeFilter {
    pub lo: f64,
    pub hi: f64,
    pub include_missing: bool,
}

impl RangeFilter {
    pub fn new(lo: f64, hi: f64) -> Self {
        RangeFilter {
            lo,
            hi,
            include_missing: true,
        }
    }

    pub fn admits(&self, value: Option<f64>) -> bool {
        match value {
            Some(v) => self.lo <= v && v <= self.hi,
            None => self.include_missing,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state: the user's current selections
// ---------------------------------------------------------------------------

/// Current filter selections. Replaced wholesale on every interaction.
///
/// An empty category set selects nothing and therefore hides every row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    pub classes: BTreeSet<PassengerClass>,
    pub sexes: BTreeSet<Sex>,
    /// Matches observed ports only; rows with a missing port never pass.
    pub ports: BTreeSet<Port>,
    pub age: RangeFilter,
    pub fare: RangeFilter,
    /// Cosmetic only, never consulted by the predicate.
    pub color_theme: ColorTheme,
}

impl FilterState {
    /// Defaults derived from the dataset: every observed category selected,
    /// ranges spanning the observed values, missing values included.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let (age_lo, age_hi) = dataset
            .age_bounds
            .map(|b| (b.min.floor(), b.max.ceil()))
            .unwrap_or(FALLBACK_AGE_RANGE);
        let (fare_lo, fare_hi) = dataset
            .fare_bounds
            .map(|b| (b.min, b.max))
            .unwrap_or(FALLBACK_FARE_RANGE);

        FilterState {
            classes: dataset.classes.clone(),
            sexes: dataset.sexes.clone(),
            ports: dataset.ports.clone(),
            age: RangeFilter::new(age_lo, age_hi),
            fare: RangeFilter::new(fare_lo, fare_hi),
            color_theme: ColorTheme::default(),
        }
    }

    pub fn with_classes(self, classes: impl IntoIterator<Item = PassengerClass>) -> Self {
        FilterState {
            classes: classes.into_iter().collect(),
            ..self
        }
    }

    pub fn with_sexes(self, sexes: impl IntoIterator<Item = Sex>) -> Self {
        FilterState {
            sexes: sexes.into_iter().collect(),
            ..self
        }
    }

    pub fn with_ports(self, ports: impl IntoIterator<Item = Port>) -> Self {
        FilterState {
            ports: ports.into_iter().collect(),
            ..self
        }
    }

    pub fn with_age(self, age: RangeFilter) -> Self {
        FilterState { age, ..self }
    }

    pub fn with_fare(self, fare: RangeFilter) -> Self {
        FilterState { fare, ..self }
    }

    pub fn with_color_theme(self, color_theme: ColorTheme) -> Self {
        FilterState {
            color_theme,
            ..self
        }
    }

    /// Row predicate: every criterion must hold.
    pub fn matches(&self, p: &Passenger) -> bool {
        self.classes.contains(&p.class)
            && self.sexes.contains(&p.sex)
            && p.port.is_some_and(|port| self.ports.contains(&port))
            && self.age.admits(p.age)
            && self.fare.admits(p.fare)
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Ordered subsequence of the dataset rows that pass a [`FilterState`].
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Every row, missing values included.
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Positions in the dataset, strictly increasing.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Passenger> + '_ {
        let passengers = &self.dataset.passengers;
        self.indices.iter().map(move |&i| &passengers[i])
    }
}

/// Return the rows that pass the filter, preserving dataset order.
pub fn apply<'a>(dataset: &'a Dataset, filters: &FilterState) -> FilteredView<'a> {
    let indices = dataset
        .passengers
        .iter()
        .enumerate()
        .filter(|(_, p)| filters.matches(p))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn passenger(
        id: i64,
        class: PassengerClass,
        sex: Sex,
        age: Option<f64>,
        fare: Option<f64>,
        port: Option<Port>,
        survived: bool,
    ) -> Passenger {
        Passenger {
            id,
            class,
            sex,
            age,
            fare,
            port,
            survived,
        }
    }

    fn sample() -> Dataset {
        use PassengerClass::*;
        Dataset::from_passengers(vec![
            passenger(1, First, Sex::Female, Some(29.0), Some(100.0), Some(Port::Southampton), true),
            passenger(2, Third, Sex::Male, None, Some(8.0), Some(Port::Southampton), false),
            passenger(3, First, Sex::Male, Some(40.0), Some(50.0), None, false),
            passenger(4, Second, Sex::Female, Some(22.0), Some(30.0), Some(Port::Cherbourg), true),
            passenger(5, Third, Sex::Female, Some(2.5), None, Some(Port::Queenstown), false),
        ])
    }

    #[test]
    fn defaults_cover_observed_values() {
        let ds = sample();
        let f = FilterState::for_dataset(&ds);
        assert_eq!(f.classes.len(), 3);
        assert_eq!(f.ports.len(), 3);
        assert_eq!((f.age.lo, f.age.hi), (2.0, 40.0));
        assert_eq!((f.fare.lo, f.fare.hi), (8.0, 100.0));
        assert!(f.age.include_missing && f.fare.include_missing);
    }

    #[test]
    fn default_filter_only_drops_missing_ports() {
        let ds = sample();
        let view = apply(&ds, &FilterState::for_dataset(&ds));
        assert_eq!(view.indices(), &[0, 1, 3, 4]);
    }

    #[test]
    fn fallback_ranges_without_numeric_values() {
        let ds = Dataset::from_passengers(vec![passenger(
            1,
            PassengerClass::First,
            Sex::Male,
            None,
            None,
            Some(Port::Cherbourg),
            true,
        )]);
        let f = FilterState::for_dataset(&ds);
        assert_eq!((f.age.lo, f.age.hi), FALLBACK_AGE_RANGE);
        assert_eq!((f.fare.lo, f.fare.hi), FALLBACK_FARE_RANGE);
        assert_eq!(apply(&ds, &f).len(), 1);
    }

    #[rstest]
    #[case::classes("class")]
    #[case::sexes("sex")]
    #[case::ports("port")]
    fn empty_selection_hides_everything(#[case] dimension: &str) {
        let ds = sample();
        let wide = FilterState::for_dataset(&ds)
            .with_age(RangeFilter::new(f64::MIN, f64::MAX))
            .with_fare(RangeFilter::new(f64::MIN, f64::MAX));
        let cleared = match dimension {
            "class" => wide.with_classes(Vec::<PassengerClass>::new()),
            "sex" => wide.with_sexes(Vec::<Sex>::new()),
            _ => wide.with_ports(Vec::<Port>::new()),
        };
        assert!(apply(&ds, &cleared).is_empty());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let ds = sample();
        let f = FilterState::for_dataset(&ds).with_age(RangeFilter {
            lo: 22.0,
            hi: 29.0,
            include_missing: false,
        });
        let ids: Vec<i64> = apply(&ds, &f).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn include_missing_flags() {
        let ds = sample();
        let base = FilterState::for_dataset(&ds);

        let no_missing_age = base.clone().with_age(RangeFilter {
            include_missing: false,
            ..base.age
        });
        let ids: Vec<i64> = apply(&ds, &no_missing_age).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 4, 5]);

        let no_missing_fare = base.clone().with_fare(RangeFilter {
            include_missing: false,
            ..base.fare
        });
        let ids: Vec<i64> = apply(&ds, &no_missing_fare).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn color_theme_does_not_affect_rows() {
        let ds = sample();
        let f = FilterState::for_dataset(&ds);
        let themed = f.clone().with_color_theme(ColorTheme::Magma);
        assert_eq!(apply(&ds, &f).indices(), apply(&ds, &themed).indices());
    }

    #[test]
    fn view_preserves_dataset_order() {
        let ds = sample();
        let f = FilterState::for_dataset(&ds).with_sexes([Sex::Female]);
        let view = apply(&ds, &f);
        assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
        assert!(view.len() <= ds.len());
        assert_eq!(view.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 4, 5]);
    }
}
