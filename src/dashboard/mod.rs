//! Domain assemblers.
//!
//! Each assembler asks the aggregator for its domain's indicators, derives
//! the usual ratios and packages everything into a [`Dashboard`]. A figure
//! that could not be measured is replaced by the documented default of its
//! indicator and tagged as such, both on the KPI and in every insight line
//! that quotes it. Nothing here ever reports a missing value as a zero.

pub mod accounts;
pub mod format;
pub mod labour;
pub mod options;
pub mod overview;
pub mod prices;
pub mod trade;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::aggregate::Aggregator;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::registry::{Indicator, Lookup};

pub use accounts::accounts_snapshot;
pub use labour::labour_snapshot;
pub use overview::overview_snapshot;
pub use prices::prices_snapshot;
pub use trade::trade_snapshot;

/// Appended to an insight that quotes a defaulted figure.
pub const DEFAULT_NOTE: &str = " (default estimate)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Measured,
    Derived,
    Default,
}

/// A number together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Figure {
    pub value: f64,
    pub source: Source,
}
impl Figure {
    pub fn measured(value: f64) -> Self {
        Self { value, source: Source::Measured }
    }
    pub fn defaulted(value: f64) -> Self {
        Self { value, source: Source::Default }
    }
    pub fn is_default(&self) -> bool {
        self.source == Source::Default
    }
    /// A figure computed from `inputs`. It becomes `default`, tagged as a
    /// default, when any input was defaulted or `compute` has no answer.
    pub fn derive(inputs: &[Figure], default: f64, compute: impl FnOnce() -> Option<f64>) -> Self {
        if inputs.iter().any(Figure::is_default) {
            return Self::defaulted(default);
        }
        match compute().filter(|v| v.is_finite()) {
            Some(value) => Self { value, source: Source::Derived },
            None => Self::defaulted(default),
        }
    }
}

/// `numerator / denominator` as a percentage; `None` for a zero denominator.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator * 100.0)
    }
}

/// Percentage change from `previous` to `current`, or `default` when there
/// is no previous value to compare with.
pub fn growth(current: Figure, previous: Option<Figure>, default: f64) -> Figure {
    match previous {
        Some(previous) => Figure::derive(&[current, previous], default, || {
            ratio(current.value - previous.value, previous.value)
        }),
        None => Figure::defaulted(default),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    pub raw: f64,
    pub source: Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub source: Source,
}
impl Chart {
    /// Measured points, or `fallback` tagged as a default when there are none.
    pub fn from_points(
        title: &str,
        kind: ChartKind,
        points: Vec<(String, f64)>,
        fallback: &[(&str, f64)],
    ) -> Self {
        if points.is_empty() {
            return Self::fixed(title, kind, fallback);
        }
        let (labels, data) = points.into_iter().unzip();
        Self { title: title.to_string(), kind, labels, data, source: Source::Measured }
    }
    /// Illustrative values that no table backs.
    pub fn fixed(title: &str, kind: ChartKind, points: &[(&str, f64)]) -> Self {
        Self {
            title: title.to_string(),
            kind,
            labels: points.iter().map(|(l, _)| l.to_string()).collect(),
            data: points.iter().map(|(_, v)| *v).collect(),
            source: Source::Default,
        }
    }
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.data.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub main: Chart,
    pub side: Chart,
    pub extra: Option<Chart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}
impl TableView {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
    /// Cells are paired with the columns in order.
    pub fn push(&mut self, cells: Vec<String>) {
        let row = self.columns.iter().cloned().zip(cells).collect();
        self.rows.push(row);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Labour,
    Accounts,
    Prices,
    Trade,
    Overview,
}
impl Domain {
    /// `None` for a domain no assembler serves. An absent domain is the
    /// overview.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "labour" | "labor" => Some(Domain::Labour),
            "accounts" | "gdp" => Some(Domain::Accounts),
            "prices" | "cpi" => Some(Domain::Prices),
            "trade" => Some(Domain::Trade),
            "" | "dashboard" | "overview" => Some(Domain::Overview),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub domain: Option<Domain>,
    pub kpis: Vec<Kpi>,
    pub charts: Charts,
    pub table: TableView,
    pub insights: Vec<String>,
    /// labels of every KPI and chart showing a default
    pub defaults_used: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
impl Dashboard {
    pub fn kpi(&self, label: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.label == label)
    }
}

/// Collects KPIs and insights while remembering which ones were defaulted.
#[derive(Debug, Default)]
pub(crate) struct Board {
    kpis: Vec<Kpi>,
    insights: Vec<String>,
    defaults_used: Vec<String>,
}
impl Board {
    pub(crate) fn kpi(&mut self, label: &str, figure: Figure, value: String) {
        if figure.is_default() {
            self.note_default(label);
        }
        self.kpis.push(Kpi {
            label: label.to_string(),
            value,
            raw: figure.value,
            source: figure.source,
        });
    }
    pub(crate) fn insight(&mut self, text: String, figures: &[Figure]) {
        if figures.iter().any(Figure::is_default) {
            self.insights.push(format!("{text}{DEFAULT_NOTE}"));
        } else {
            self.insights.push(text);
        }
    }
    fn note_default(&mut self, label: &str) {
        if !self.defaults_used.iter().any(|l| l == label) {
            self.defaults_used.push(label.to_string());
        }
    }
    pub(crate) fn finish(
        mut self,
        title: &str,
        domain: Domain,
        charts: Charts,
        table: TableView,
    ) -> Dashboard {
        let defaulted: Vec<String> = [Some(&charts.main), Some(&charts.side), charts.extra.as_ref()]
            .into_iter()
            .flatten()
            .filter(|c| c.source == Source::Default)
            .map(|c| c.title.clone())
            .collect();
        for title in defaulted {
            self.note_default(&title);
        }
        Dashboard {
            title: title.to_string(),
            domain: Some(domain),
            kpis: self.kpis,
            charts,
            table,
            insights: self.insights,
            defaults_used: self.defaults_used,
            generated_at: Utc::now(),
        }
    }
}

// ------------- Aggregator calls in display units -------------
/// One indicator in display units, or its default when no table has it.
pub fn measure(agg: &Aggregator, indicator: &Indicator, filters: &FilterSet) -> Result<Figure> {
    let keywords = indicator.keyword_groups();
    let aliases = indicator.indicator_aliases();
    let result = match indicator.lookup {
        Lookup::Sum => agg.aggregate(&keywords, &aliases, filters, indicator.mode)?,
        Lookup::Latest => agg.latest(&keywords, &aliases, filters, indicator.mode)?,
    };
    Ok(match result.total {
        Some(total) => Figure::measured(total / indicator.unit),
        None => {
            debug!(indicator = indicator.name, default = indicator.default, "indicator not found");
            Figure::defaulted(indicator.default)
        }
    })
}

/// Period series of an indicator in display units, oldest first.
pub fn trend(
    agg: &Aggregator,
    indicator: &Indicator,
    filters: &FilterSet,
    limit: usize,
) -> Result<Vec<(String, f64)>> {
    let series = agg.series(
        &indicator.keyword_groups(),
        &indicator.indicator_aliases(),
        filters,
        indicator.mode,
        limit,
    )?;
    Ok(in_units(series.points, indicator.unit))
}

/// Category breakdown of an indicator in display units, largest first.
pub fn breakdown(
    agg: &Aggregator,
    indicator: &Indicator,
    category_hints: &[&str],
    filters: &FilterSet,
    limit: usize,
) -> Result<Vec<(String, f64)>> {
    let series = agg.breakdown(
        &indicator.keyword_groups(),
        &indicator.indicator_aliases(),
        category_hints,
        filters,
        indicator.mode,
        limit,
    )?;
    Ok(in_units(series.points, indicator.unit))
}

fn in_units(points: Vec<(String, f64)>, unit: f64) -> Vec<(String, f64)> {
    points.into_iter().map(|(label, v)| (label, v / unit)).collect()
}

/// The indicator now and one period earlier.
///
/// With a year filter this is the filtered year and the year before it.
/// Without one, or when the filtered year has no data, the two latest
/// periods of the indicator's series are used. When the tables carry no
/// period column at all only the plain measure is returned.
pub fn current_and_previous(
    agg: &Aggregator,
    indicator: &Indicator,
    filters: &FilterSet,
) -> Result<(Figure, Option<Figure>)> {
    if let Some(year) = filters.year {
        let current = measure(agg, indicator, filters)?;
        if !current.is_default() {
            let previous = measure(agg, indicator, &filters.clone().with_year(year - 1))?;
            return Ok((current, (!previous.is_default()).then_some(previous)));
        }
        debug!(indicator = indicator.name, year, "no data for year, using the latest period");
    }
    let points = trend(agg, indicator, filters, 2)?;
    match points.as_slice() {
        [.., (_, previous), (_, current)] => {
            Ok((Figure::measured(*current), Some(Figure::measured(*previous))))
        }
        [(_, current)] => Ok((Figure::measured(*current), None)),
        [] => Ok((measure(agg, indicator, filters)?, None)),
    }
}

/// Dashboard for `domain`; `None` gives the "Data not found" payload.
pub fn snapshot(
    agg: &Aggregator,
    domain: Option<Domain>,
    filters: &FilterSet,
) -> Result<Dashboard> {
    match domain {
        Some(Domain::Labour) => labour_snapshot(agg, filters),
        Some(Domain::Accounts) => accounts_snapshot(agg, filters),
        Some(Domain::Prices) => prices_snapshot(agg, filters),
        Some(Domain::Trade) => trade_snapshot(agg, filters),
        Some(Domain::Overview) => overview_snapshot(agg, filters),
        None => Ok(not_found()),
    }
}

pub fn not_found() -> Dashboard {
    let empty = |kind| Chart {
        title: "No data".to_string(),
        kind,
        labels: Vec::new(),
        data: Vec::new(),
        source: Source::Default,
    };
    let placeholder = Kpi {
        label: "No data".to_string(),
        value: "0".to_string(),
        raw: 0.0,
        source: Source::Default,
    };
    Dashboard {
        title: "Data not found".to_string(),
        domain: None,
        kpis: vec![placeholder; 4],
        charts: Charts {
            main: empty(ChartKind::Line),
            side: empty(ChartKind::Doughnut),
            extra: None,
        },
        table: TableView::new(&["No data"]),
        insights: vec!["No insights available".to_string()],
        defaults_used: Vec::new(),
        generated_at: Utc::now(),
    }
}
