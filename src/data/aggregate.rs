use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{Passenger, PassengerClass, PortBucket, Sex};

/// Number of groups shown in the top / bottom survival tables.
pub const TOP_N: usize = 3;
pub const AGE_MAX_BINS: usize = 30;
pub const FARE_MAX_BINS: usize = 40;

/// Round to 2 decimals, ties to even.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// `survived / total` as a percentage rounded to 2 decimals; 0 when `total == 0`.
pub fn rate_percent(survived: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(survived as f64 / total as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Group accumulator
// ---------------------------------------------------------------------------

/// Running counts for one group of passengers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupStats {
    pub count: usize,
    pub survived: usize,
    fare_sum: f64,
    fare_count: usize,
}

impl GroupStats {
    fn push(&mut self, p: &Passenger) {
        self.count += 1;
        self.survived += usize::from(p.survived);
        if let Some(fare) = p.fare {
            self.fare_sum += fare;
            self.fare_count += 1;
        }
    }

    pub fn died(&self) -> usize {
        self.count - self.survived
    }

    pub fn survival_rate(&self) -> f64 {
        rate_percent(self.survived, self.count)
    }

    /// Mean over non-missing fares; `None` if the group has none.
    pub fn mean_fare(&self) -> Option<f64> {
        (self.fare_count > 0).then(|| round2(self.fare_sum / self.fare_count as f64))
    }
}

/// Partition rows by `key`. Groups come out in ascending key order and only
/// keys that occur in `rows` are present.
pub fn group_by<'a, K, F>(rows: impl IntoIterator<Item = &'a Passenger>, key: F) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    F: Fn(&Passenger) -> K,
{
    let mut groups: BTreeMap<K, GroupStats> = BTreeMap::new();
    for p in rows {
        groups.entry(key(p)).or_default().push(p);
    }
    groups
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub survived: usize,
    pub died: usize,
    pub survival_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupRate<K> {
    pub key: K,
    pub count: usize,
    pub survival_rate: f64,
}

pub type SexClass = (Sex, PassengerClass);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub class: PassengerClass,
    pub port: PortBucket,
    pub count: usize,
    pub survival_rate: f64,
}

/// Class × port survival rates; only combinations present in the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossTab {
    pub cells: Vec<CrossTabCell>,
}

impl CrossTab {
    pub fn rate(&self, class: PassengerClass, port: PortBucket) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.class == class && c.port == port)
            .map(|c| c.survival_rate)
    }

    pub fn classes(&self) -> Vec<PassengerClass> {
        let mut classes: Vec<_> = self.cells.iter().map(|c| c.class).collect();
        classes.dedup();
        classes
    }

    pub fn ports(&self) -> Vec<PortBucket> {
        let mut ports: Vec<_> = self.cells.iter().map(|c| c.port).collect();
        ports.sort();
        ports.dedup();
        ports
    }

    /// Lowest and highest rate present, for colour scaling.
    pub fn rate_extent(&self) -> Option<(f64, f64)> {
        self.cells.iter().fold(None, |acc, c| {
            let r = c.survival_rate;
            Some(acc.map_or((r, r), |(lo, hi): (f64, f64)| (lo.min(r), hi.max(r))))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummaryRow {
    pub sex: Sex,
    pub class: PassengerClass,
    pub count: usize,
    pub survived: usize,
    pub survival_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortSummaryRow {
    pub port: PortBucket,
    pub passengers: usize,
    pub survived: usize,
    pub survival_rate: f64,
    pub mean_fare: Option<f64>,
}

// ---------------------------------------------------------------------------
// Aggregations over a filtered view
// ---------------------------------------------------------------------------

pub fn summary(view: &FilteredView<'_>) -> Summary {
    let mut all = GroupStats::default();
    for p in view.iter() {
        all.push(p);
    }
    Summary {
        total: all.count,
        survived: all.survived,
        died: all.died(),
        survival_rate: all.survival_rate(),
    }
}

/// Survival rate per distinct value of `key`.
pub fn grouped_rate<K, F>(view: &FilteredView<'_>, key: F) -> Vec<GroupRate<K>>
where
    K: Ord,
    F: Fn(&Passenger) -> K,
{
    group_by(view.iter(), key)
        .into_iter()
        .map(|(key, stats)| GroupRate {
            key,
            count: stats.count,
            survival_rate: stats.survival_rate(),
        })
        .collect()
}

pub fn survival_by_sex(view: &FilteredView<'_>) -> Vec<GroupRate<Sex>> {
    grouped_rate(view, |p| p.sex)
}

pub fn survival_by_class(view: &FilteredView<'_>) -> Vec<GroupRate<PassengerClass>> {
    grouped_rate(view, |p| p.class)
}

pub fn survival_by_sex_class(view: &FilteredView<'_>) -> Vec<GroupRate<SexClass>> {
    grouped_rate(view, |p| (p.sex, p.class))
}

/// Missing ports are grouped under [`PortBucket::Unknown`].
pub fn class_port_crosstab(view: &FilteredView<'_>) -> CrossTab {
    let cells = group_by(view.iter(), |p| (p.class, p.port_bucket()))
        .into_iter()
        .map(|((class, port), stats)| CrossTabCell {
            class,
            port,
            count: stats.count,
            survival_rate: stats.survival_rate(),
        })
        .collect();
    CrossTab { cells }
}

/// Sex × class table, sorted by sex then class.
pub fn sex_class_summary(view: &FilteredView<'_>) -> Vec<GroupSummaryRow> {
    group_by(view.iter(), |p| (p.sex, p.class))
        .into_iter()
        .map(|((sex, class), stats)| GroupSummaryRow {
            sex,
            class,
            count: stats.count,
            survived: stats.survived,
            survival_rate: stats.survival_rate(),
        })
        .collect()
}

pub fn port_summary(view: &FilteredView<'_>) -> Vec<PortSummaryRow> {
    group_by(view.iter(), Passenger::port_bucket)
        .into_iter()
        .map(|(port, stats)| PortSummaryRow {
            port,
            passengers: stats.count,
            survived: stats.survived,
            survival_rate: stats.survival_rate(),
            mean_fare: stats.mean_fare(),
        })
        .collect()
}

/// The `n` highest-rate groups. Ties keep their grouping order.
pub fn top_n<K: Clone>(groups: &[GroupRate<K>], n: usize) -> Vec<GroupRate<K>> {
    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| b.survival_rate.total_cmp(&a.survival_rate));
    sorted.truncate(n);
    sorted
}

/// The `n` lowest-rate groups. Ties keep their grouping order.
pub fn bottom_n<K: Clone>(groups: &[GroupRate<K>], n: usize) -> Vec<GroupRate<K>> {
    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| a.survival_rate.total_cmp(&b.survival_rate));
    sorted.truncate(n);
    sorted
}

// ---------------------------------------------------------------------------
// Outcome histograms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub survived: usize,
    pub died: usize,
}

impl HistogramBin {
    pub fn total(&self) -> usize {
        self.survived + self.died
    }

    /// Fraction of the bin that survived, in `[0, 1]`; 0 for an empty bin.
    pub fn survived_share(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.survived as f64 / self.total() as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub step: f64,
    pub bins: Vec<HistogramBin>,
}

/// Smallest step of the form {1, 2, 5} × 10^k that covers `span` in at
/// most `max_bins` bins.
pub fn nice_step(span: f64, max_bins: usize) -> f64 {
    let raw = span / max_bins.max(1) as f64;
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Bin `(value, survived)` pairs; `None` when there are no finite values.
pub fn outcome_histogram(points: &[(f64, bool)], max_bins: usize) -> Option<Histogram> {
    let finite = || points.iter().filter(|(v, _)| v.is_finite());
    let min = finite().map(|(v, _)| *v).reduce(f64::min)?;
    let max = finite().map(|(v, _)| *v).reduce(f64::max)?;

    let max_bins = max_bins.max(1);
    let mut step = nice_step(max - min, max_bins);
    // The maximum closes the last bin. Flooring `start` can push the extent
    // past `max_bins`; widen to the next nice step when it does.
    let (start, n_bins) = loop {
        let start = (min / step).floor() * step;
        let n_bins = (((max - start) / step - 1e-9).ceil() as usize).max(1);
        if n_bins <= max_bins {
            break (start, n_bins);
        }
        step = nice_step(step * 1.01, 1);
    };

    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            start: start + i as f64 * step,
            end: start + (i + 1) as f64 * step,
            survived: 0,
            died: 0,
        })
        .collect();

    for &(v, survived) in finite() {
        let idx = (((v - start) / step).floor() as usize).min(n_bins - 1);
        if survived {
            bins[idx].survived += 1;
        } else {
            bins[idx].died += 1;
        }
    }

    Some(Histogram { step, bins })
}

/// Presentation options that change derived outputs but not the row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DistributionOptions {
    /// Bin fares on a log10 axis (positive fares only).
    pub fare_log_scale: bool,
}

pub fn age_histogram(view: &FilteredView<'_>) -> Option<Histogram> {
    let points: Vec<(f64, bool)> = view
        .iter()
        .filter_map(|p| p.age.map(|a| (a, p.survived)))
        .collect();
    outcome_histogram(&points, AGE_MAX_BINS)
}

pub fn fare_histogram(view: &FilteredView<'_>, log_scale: bool) -> Option<Histogram> {
    let points: Vec<(f64, bool)> = view
        .iter()
        .filter_map(|p| p.fare.map(|f| (f, p.survived)))
        .filter(|(f, _)| !log_scale || *f > 0.0)
        .map(|(f, s)| if log_scale { (f.log10(), s) } else { (f, s) })
        .collect();
    outcome_histogram(&points, FARE_MAX_BINS)
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

/// Every aggregate the dashboard shows, computed from one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub summary: Summary,
    pub by_sex: Vec<GroupRate<Sex>>,
    pub by_class: Vec<GroupRate<PassengerClass>>,
    pub class_port: CrossTab,
    pub sex_class: Vec<GroupSummaryRow>,
    pub top_groups: Vec<GroupRate<SexClass>>,
    pub bottom_groups: Vec<GroupRate<SexClass>>,
    pub ports: Vec<PortSummaryRow>,
    pub age_histogram: Option<Histogram>,
    pub fare_histogram: Option<Histogram>,
}

impl AggregateReport {
    pub fn compute(view: &FilteredView<'_>, options: DistributionOptions) -> Self {
        let group_rates = survival_by_sex_class(view);
        AggregateReport {
            summary: summary(view),
            by_sex: survival_by_sex(view),
            by_class: survival_by_class(view),
            class_port: class_port_crosstab(view),
            sex_class: sex_class_summary(view),
            top_groups: top_n(&group_rates, TOP_N),
            bottom_groups: bottom_n(&group_rates, TOP_N),
            ports: port_summary(view),
            age_histogram: age_histogram(view),
            fare_histogram: fare_histogram(view, options.fare_log_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::data::filter::{apply, FilterState};
    use crate::data::model::{Dataset, Port};

    fn p(
        id: i64,
        class: PassengerClass,
        sex: Sex,
        fare: Option<f64>,
        port: Option<Port>,
        survived: bool,
    ) -> Passenger {
        Passenger {
            id,
            class,
            sex,
            age: Some(30.0),
            fare,
            port,
            survived,
        }
    }

    fn everything(ds: &Dataset) -> FilteredView<'_> {
        FilteredView::all(ds)
    }

    fn mixed() -> Dataset {
        use PassengerClass::*;
        use Sex::*;
        Dataset::from_passengers(vec![
            p(1, First, Female, Some(80.0), Some(Port::Cherbourg), true),
            p(2, First, Male, Some(50.0), Some(Port::Southampton), false),
            p(3, Third, Male, Some(8.0), None, false),
            p(4, Third, Female, None, None, true),
            p(5, Second, Female, Some(13.0), Some(Port::Southampton), true),
            p(6, Second, Male, Some(13.0), Some(Port::Southampton), false),
            p(7, Third, Male, Some(7.0), Some(Port::Southampton), true),
        ])
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(rate_percent(2, 3), 66.67);
        assert_eq!(rate_percent(1, 3), 33.33);
        assert_eq!(rate_percent(0, 0), 0.0);
    }

    #[test]
    fn summary_counts() {
        let ds = mixed();
        let s = summary(&everything(&ds));
        assert_eq!((s.total, s.survived, s.died), (7, 4, 3));
        assert_eq!(s.survival_rate, 57.14);
    }

    #[test]
    fn empty_view_yields_zero_results() {
        let ds = mixed();
        let view = apply(&ds, &FilterState::for_dataset(&ds).with_sexes(Vec::<Sex>::new()));
        let report = AggregateReport::compute(&view, DistributionOptions::default());

        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.survival_rate, 0.0);
        assert!(report.by_sex.is_empty());
        assert!(report.class_port.cells.is_empty());
        assert!(report.top_groups.is_empty() && report.bottom_groups.is_empty());
        assert!(report.ports.is_empty());
        assert!(report.age_histogram.is_none());
    }

    #[test]
    fn grouped_rate_has_no_ghost_groups() {
        let ds = mixed();
        let view = apply(
            &ds,
            &FilterState::for_dataset(&ds).with_sexes([Sex::Female]),
        );
        let by_sex = survival_by_sex(&view);
        assert_eq!(by_sex.len(), 1);
        assert_eq!(by_sex[0].key, Sex::Female);
        assert_eq!(by_sex[0].survival_rate, 100.0);

        let by_class = survival_by_class(&view);
        assert_eq!(
            by_class.iter().map(|g| g.key).collect::<Vec<_>>(),
            vec![PassengerClass::First, PassengerClass::Second]
        );
    }

    #[test]
    fn crosstab_buckets_missing_ports() {
        let ds = mixed();
        let tab = class_port_crosstab(&everything(&ds));
        assert_eq!(tab.rate(PassengerClass::Third, PortBucket::Unknown), Some(50.0));
        assert_eq!(
            tab.rate(PassengerClass::Third, PortBucket::Known(Port::Southampton)),
            Some(100.0)
        );
        assert_eq!(tab.rate(PassengerClass::Second, PortBucket::Known(Port::Cherbourg)), None);
        assert_eq!(tab.ports().last(), Some(&PortBucket::Unknown));
        assert_eq!(tab.rate_extent(), Some((0.0, 100.0)));
    }

    #[test]
    fn sex_class_table_is_sorted() {
        let ds = mixed();
        let rows = sex_class_summary(&everything(&ds));
        let keys: Vec<_> = rows.iter().map(|r| (r.sex, r.class)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let third_male = rows
            .iter()
            .find(|r| r.sex == Sex::Male && r.class == PassengerClass::Third)
            .unwrap();
        assert_eq!((third_male.count, third_male.survived), (2, 1));
        assert_eq!(third_male.survival_rate, 50.0);
    }

    #[test]
    fn top_and_bottom_break_ties_by_group_order() {
        let rates: Vec<GroupRate<&str>> = [("a", 50.0), ("b", 100.0), ("c", 50.0), ("d", 0.0), ("e", 100.0)]
            .into_iter()
            .map(|(key, survival_rate)| GroupRate {
                key,
                count: 1,
                survival_rate,
            })
            .collect();

        let top: Vec<_> = top_n(&rates, 3).into_iter().map(|g| g.key).collect();
        assert_eq!(top, vec!["b", "e", "a"]);
        let bottom: Vec<_> = bottom_n(&rates, 3).into_iter().map(|g| g.key).collect();
        assert_eq!(bottom, vec!["d", "a", "c"]);
    }

    #[test]
    fn top_n_with_few_groups_overlaps() {
        let rates = vec![
            GroupRate { key: 1, count: 2, survival_rate: 10.0 },
            GroupRate { key: 2, count: 2, survival_rate: 90.0 },
        ];
        assert_eq!(top_n(&rates, TOP_N).len(), 2);
        assert_eq!(bottom_n(&rates, TOP_N).len(), 2);
    }

    #[test]
    fn port_summary_mean_fare_is_absent_without_fares() {
        let ds = mixed();
        let ports = port_summary(&everything(&ds));
        let unknown = ports.last().unwrap();
        assert_eq!(unknown.port, PortBucket::Unknown);
        assert_eq!(unknown.passengers, 2);
        assert_eq!(unknown.mean_fare, Some(8.0));

        let only_missing = Dataset::from_passengers(vec![p(
            9,
            PassengerClass::First,
            Sex::Male,
            None,
            Some(Port::Queenstown),
            false,
        )]);
        let ports = port_summary(&everything(&only_missing));
        assert_eq!(ports[0].mean_fare, None);

        let southampton = port_summary(&everything(&ds))
            .into_iter()
            .find(|r| r.port == PortBucket::Known(Port::Southampton))
            .unwrap();
        assert_eq!(southampton.passengers, 4);
        assert_eq!(southampton.mean_fare, Some(20.75));
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(80.0, 30), 5.0);
        assert_eq!(nice_step(512.0, 40), 20.0);
        assert_eq!(nice_step(10.0, 10), 1.0);
        assert_eq!(nice_step(0.0, 30), 1.0);
    }

    #[test]
    fn histogram_counts_every_point_once() {
        let points = vec![(0.42, true), (4.0, false), (22.0, true), (80.0, false), (80.0, true)];
        let hist = outcome_histogram(&points, AGE_MAX_BINS).unwrap();
        assert_eq!(hist.step, 5.0);
        assert_eq!(hist.bins.first().unwrap().start, 0.0);
        assert_eq!(hist.bins.iter().map(HistogramBin::total).sum::<usize>(), points.len());
        let last = hist.bins.last().unwrap();
        assert_eq!((last.survived, last.died), (1, 1));
        assert_eq!(last.survived_share(), 0.5);
    }

    #[rstest]
    #[case::fare_extent(&[(0.0, true), (40.0, false)], FARE_MAX_BINS, 40)]
    #[case::age_extent(&[(0.0, true), (30.0, false)], AGE_MAX_BINS, 30)]
    #[case::offset_start(&[(3.5, true), (43.5, false)], FARE_MAX_BINS, 21)]
    fn maximum_closes_the_last_bin(
        #[case] points: &[(f64, bool)],
        #[case] max_bins: usize,
        #[case] expected_bins: usize,
    ) {
        let hist = outcome_histogram(points, max_bins).unwrap();
        assert!(hist.bins.len() <= max_bins);
        assert_eq!(hist.bins.len(), expected_bins);
        let last = hist.bins.last().unwrap();
        assert_eq!(last.total(), 1);
        assert_eq!(last.died, 1);
    }

    #[test]
    fn titanic_age_extent_has_no_lone_top_bin() {
        let points = [(0.42, true), (80.0, true), (79.0, false)];
        let hist = outcome_histogram(&points, AGE_MAX_BINS).unwrap();
        assert_eq!(hist.bins.len(), 16);
        assert_eq!(hist.bins.last().unwrap().end, 80.0);
        assert_eq!(hist.bins.last().unwrap().total(), 2);
    }

    #[test]
    fn histogram_of_a_single_value() {
        let hist = outcome_histogram(&[(7.0, true), (7.0, false)], FARE_MAX_BINS).unwrap();
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].total(), 2);
        assert!(outcome_histogram(&[], FARE_MAX_BINS).is_none());
    }

    #[test]
    fn log_fare_histogram_skips_free_tickets() {
        let ds = Dataset::from_passengers(vec![
            p(1, PassengerClass::Third, Sex::Male, Some(0.0), Some(Port::Southampton), false),
            p(2, PassengerClass::First, Sex::Female, Some(100.0), Some(Port::Southampton), true),
            p(3, PassengerClass::Third, Sex::Male, Some(10.0), Some(Port::Southampton), false),
        ]);
        let view = everything(&ds);
        let linear = fare_histogram(&view, false).unwrap();
        let log = fare_histogram(&view, true).unwrap();
        assert_eq!(linear.bins.iter().map(HistogramBin::total).sum::<usize>(), 3);
        assert_eq!(log.bins.iter().map(HistogramBin::total).sum::<usize>(), 2);
        assert!((log.bins.first().unwrap().start - 1.0).abs() < 1e-9);
    }
}
