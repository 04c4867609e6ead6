//! Presentation adapter: shapes an [`AggregateReport`] into chart- and
//! table-ready records. No statistics are computed here.

use serde::Serialize;

use crate::color::{ColorTheme, Rgb8};
use crate::data::aggregate::{
    round2, AggregateReport, CrossTab, DistributionOptions, GroupRate, Histogram, SexClass,
};

pub const NO_DATA_MESSAGE: &str =
    "No rows match the selected filters. Adjust the sidebar filters.";
pub const NO_SEX_DATA_MESSAGE: &str = "No data for the selected filters.";
pub const AGE_ONLY_MISSING_MESSAGE: &str = "Only rows with unknown Age are selected.";
pub const FARE_ONLY_MISSING_MESSAGE: &str = "Only rows with unknown Fare are selected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewStatus {
    Ready,
    /// The filtered view is empty; the UI shows an explicit empty state.
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
}

impl MetricCard {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        MetricCard {
            label: label.into(),
            value: value.into(),
            delta: None,
        }
    }

    fn with_delta(self, delta: impl Into<String>) -> Self {
        MetricCard {
            delta: Some(delta.into()),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub total: MetricCard,
    pub survival_rate: MetricCard,
    pub survived: MetricCard,
    pub died: MetricCard,
}

/// A chart slot: either something to draw, or a message explaining why not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartPanel<T> {
    Chart(T),
    Message(String),
}

impl<T> ChartPanel<T> {
    pub fn chart(&self) -> Option<&T> {
        match self {
            ChartPanel::Chart(c) => Some(c),
            ChartPanel::Message(_) => None,
        }
    }
}

/// One stacked bar, normalised so survived + died shares sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBar {
    pub center: f64,
    pub width: f64,
    pub label: String,
    pub survived: usize,
    pub died: usize,
    pub survived_share: f64,
    pub died_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub x_title: String,
    pub bars: Vec<StackedBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    /// Column index into `Heatmap::x_labels`.
    pub x: usize,
    /// Row index into `Heatmap::y_labels`.
    pub y: usize,
    pub rate: f64,
    pub label: String,
    pub color: Rgb8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendStop {
    pub value: f64,
    pub color: Rgb8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub cells: Vec<HeatmapCell>,
    /// Colour scale from the lowest to the highest rate present.
    pub legend: Vec<LegendStop>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    fn new(columns: &[&str]) -> Self {
        TableData {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the rendering layer needs for one recomputation cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub status: ViewStatus,
    pub dataset_rows: usize,
    pub rows_after_filter: usize,
    pub color_theme: ColorTheme,
    pub options: DistributionOptions,
    pub report: AggregateReport,
    pub cards: SummaryCards,
    /// Empty when no sex group is present.
    pub sex_rates: Vec<MetricCard>,
    pub age_chart: ChartPanel<HistogramSeries>,
    pub fare_chart: ChartPanel<HistogramSeries>,
    pub heatmap: ChartPanel<Heatmap>,
    pub group_summary: TableData,
    pub top_groups: TableData,
    pub bottom_groups: TableData,
    pub port_summary: TableData,
}

impl RenderSnapshot {
    pub fn build(
        dataset_rows: usize,
        report: AggregateReport,
        color_theme: ColorTheme,
        options: DistributionOptions,
    ) -> Self {
        let status = if report.summary.total == 0 {
            ViewStatus::NoData
        } else {
            ViewStatus::Ready
        };
        let fare_title = if options.fare_log_scale {
            "Fare (log10)"
        } else {
            "Fare"
        };

        let age_chart = distribution(status, report.age_histogram.as_ref(), "Age", AGE_ONLY_MISSING_MESSAGE);
        let fare_chart = distribution(
            status,
            report.fare_histogram.as_ref(),
            fare_title,
            FARE_ONLY_MISSING_MESSAGE,
        );
        let heatmap = match status {
            ViewStatus::NoData => ChartPanel::Message(NO_DATA_MESSAGE.to_string()),
            ViewStatus::Ready => ChartPanel::Chart(heatmap(&report.class_port, color_theme)),
        };

        RenderSnapshot {
            status,
            dataset_rows,
            rows_after_filter: report.summary.total,
            color_theme,
            options,
            cards: summary_cards(&report),
            sex_rates: report
                .by_sex
                .iter()
                .map(|g| MetricCard::new(g.key.label(), format_percent(g.survival_rate)))
                .collect(),
            age_chart,
            fare_chart,
            heatmap,
            group_summary: group_summary_table(&report),
            top_groups: group_rate_table(&report.top_groups),
            bottom_groups: group_rate_table(&report.bottom_groups),
            port_summary: port_table(&report),
            report,
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_percent(rate: f64) -> String {
    format!("{rate:.2} %")
}

fn summary_cards(report: &AggregateReport) -> SummaryCards {
    let s = &report.summary;
    SummaryCards {
        total: MetricCard::new("Total Passengers", format_count(s.total)),
        survival_rate: MetricCard::new("Survival Rate", format_percent(s.survival_rate)),
        survived: MetricCard::new("Survived", format_count(s.survived))
            .with_delta(format!("+{:.2}%", s.survival_rate)),
        died: MetricCard::new("Died", format_count(s.died))
            .with_delta(format!("-{:.2}%", round2(100.0 - s.survival_rate))),
    }
}

fn distribution(
    status: ViewStatus,
    histogram: Option<&Histogram>,
    x_title: &str,
    only_missing: &str,
) -> ChartPanel<HistogramSeries> {
    match (status, histogram) {
        (ViewStatus::NoData, _) => ChartPanel::Message(NO_DATA_MESSAGE.to_string()),
        (ViewStatus::Ready, None) => ChartPanel::Message(only_missing.to_string()),
        (ViewStatus::Ready, Some(h)) => ChartPanel::Chart(HistogramSeries {
            x_title: x_title.to_string(),
            bars: h
                .bins
                .iter()
                .map(|bin| {
                    let share = bin.survived_share();
                    StackedBar {
                        center: (bin.start + bin.end) / 2.0,
                        width: h.step,
                        label: format!("[{}, {})", trim_float(bin.start), trim_float(bin.end)),
                        survived: bin.survived,
                        died: bin.died,
                        survived_share: share,
                        died_share: if bin.total() == 0 { 0.0 } else { 1.0 - share },
                    }
                })
                .collect(),
        }),
    }
}

fn trim_float(v: f64) -> String {
    format!("{}", round2(v))
}

const LEGEND_STOPS: usize = 5;

fn heatmap(tab: &CrossTab, theme: ColorTheme) -> Heatmap {
    let classes = tab.classes();
    let ports = tab.ports();
    let (lo, hi) = tab.rate_extent().unwrap_or((0.0, 100.0));

    let cells = tab
        .cells
        .iter()
        .filter_map(|c| {
            let x = classes.iter().position(|k| *k == c.class)?;
            let y = ports.iter().position(|k| *k == c.port)?;
            let t = if hi > lo {
                (c.survival_rate - lo) / (hi - lo)
            } else {
                0.5
            };
            Some(HeatmapCell {
                x,
                y,
                rate: c.survival_rate,
                label: format!("{:.1}", c.survival_rate),
                color: theme.sample(t),
            })
        })
        .collect();

    let legend = (0..LEGEND_STOPS)
        .map(|i| {
            let t = i as f64 / (LEGEND_STOPS - 1) as f64;
            LegendStop {
                value: lo + t * (hi - lo),
                color: theme.sample(t),
            }
        })
        .collect();

    Heatmap {
        x_labels: classes.iter().map(|c| c.to_string()).collect(),
        y_labels: ports.iter().map(|p| p.to_string()).collect(),
        cells,
        legend,
    }
}

fn group_summary_table(report: &AggregateReport) -> TableData {
    let mut table = TableData::new(&["Sex", "Pclass", "count", "survived", "survival_rate"]);
    table.rows = report
        .sex_class
        .iter()
        .map(|r| {
            vec![
                r.sex.to_string(),
                r.class.to_string(),
                r.count.to_string(),
                r.survived.to_string(),
                format!("{:.2}", r.survival_rate),
            ]
        })
        .collect();
    table
}

fn group_rate_table(groups: &[GroupRate<SexClass>]) -> TableData {
    let mut table = TableData::new(&["Sex", "Pclass", "SurvivalRate"]);
    table.rows = groups
        .iter()
        .map(|g| {
            let (sex, class) = g.key;
            vec![
                sex.to_string(),
                class.to_string(),
                format!("{:.2}", g.survival_rate),
            ]
        })
        .collect();
    table
}

fn port_table(report: &AggregateReport) -> TableData {
    let mut table = TableData::new(&[
        "Embarked",
        "passengers",
        "survived",
        "survival_rate",
        "avg_fare",
    ]);
    table.rows = report
        .ports
        .iter()
        .map(|r| {
            vec![
                r.port.to_string(),
                r.passengers.to_string(),
                r.survived.to_string(),
                format!("{:.2}", r.survival_rate),
                r.mean_fare
                    .map_or_else(|| "n/a".to_string(), |f| format!("{f:.2}")),
            ]
        })
        .collect();
    table
}
