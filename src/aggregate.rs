//! The aggregator.
//!
//! Best-effort sums across heterogeneous tables whose schemas are only known
//! at query time. Each candidate table is classified, compiled and queried on
//! its own; a table that cannot take part is recorded as skipped and the rest
//! carry on. Only a failure of the store itself aborts a call.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::catalog::columns_of;
use crate::error::Result;
use crate::filter::{compile, CompiledQuery, FilterSet};
use crate::layout::{
    detect, find_column, find_column_containing, IndicatorAliases, Layout, LayoutKind,
};
use crate::matcher::{find_tables, KeywordGroup, MatchMode};
use crate::persist::{quote_identifier, Database};

// labels are not Things, so a fast non-cryptographic hasher will do
pub type LabelHasher = std::hash::BuildHasherDefault<seahash::SeaHasher>;

lazy_static! {
    static ref YEAR_TOKEN: Regex = Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").unwrap();
    static ref NUMERIC_MONTH: Regex = Regex::new(r"^\d{4}[-/.](\d{1,2})(?:\D|$)").unwrap();
}
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

// year token, then month, then the label itself
fn period_key(label: &str) -> (Option<i64>, Option<u32>, String) {
    let year = YEAR_TOKEN
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());
    let lower = label.trim().to_lowercase();
    let month = match NUMERIC_MONTH.captures(&lower).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().parse().ok(),
        None => lower
            .split(|c: char| !c.is_ascii_alphabetic())
            .find(|word| word.len() >= 3)
            .and_then(|word| MONTHS.iter().position(|m| word.starts_with(m)))
            .map(|i| i as u32 + 1),
    };
    (year, month, lower)
}

/// Chronological order for period labels: numeric when every label is a
/// number, otherwise by year token, then month, then text.
pub fn sort_periods(points: &mut [(String, f64)]) {
    let numeric = |label: &str| label.trim().parse::<f64>().ok();
    if points.iter().all(|(label, _)| numeric(label).is_some()) {
        points.sort_by(|a, b| {
            let (a, b) = (numeric(&a.0).unwrap_or(0.0), numeric(&b.0).unwrap_or(0.0));
            a.total_cmp(&b)
        });
    } else {
        points.sort_by_cached_key(|(label, _)| period_key(label));
    }
}

/// Guards against the per-request table scan growing without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// candidate tables considered per call
    pub max_tables: usize,
    /// wall-clock budget shared by every call made through one aggregator
    pub time_budget: Option<Duration>,
}
impl Default for Limits {
    fn default() -> Self {
        Self { max_tables: 256, time_budget: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoColumns,
    Unrecognized,
    GenderUnavailable,
    NoRows,
    QueryFailed(String),
    BudgetExhausted,
}
impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoColumns => write!(f, "table could not be introspected"),
            SkipReason::Unrecognized => write!(f, "neither wide nor long for this indicator"),
            SkipReason::GenderUnavailable => write!(f, "no column for the requested gender"),
            SkipReason::NoRows => write!(f, "no rows survive the filters"),
            SkipReason::QueryFailed(e) => write!(f, "query failed: {e}"),
            SkipReason::BudgetExhausted => write!(f, "table or time budget exhausted"),
        }
    }
}

/// What one candidate table did for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TableOutcome {
    Contributed { table: String, layout: LayoutKind, value: f64 },
    Skipped { table: String, reason: SkipReason },
}
impl TableOutcome {
    pub fn table(&self) -> &str {
        match self {
            TableOutcome::Contributed { table, .. } | TableOutcome::Skipped { table, .. } => table,
        }
    }
}

/// `total == None` means no candidate table yielded data, which is not the
/// same as a measured zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub total: Option<f64>,
    pub outcomes: Vec<TableOutcome>,
}
impl Aggregation {
    pub fn found(&self) -> bool {
        self.total.is_some()
    }
    pub fn value_or(&self, default: f64) -> f64 {
        self.total.unwrap_or(default)
    }
    pub fn contributors(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TableOutcome::Contributed { .. }))
            .map(TableOutcome::table)
            .collect()
    }
    fn contribute(&mut self, table: String, layout: LayoutKind, value: f64) {
        self.total = Some(self.total.unwrap_or(0.0) + value);
        self.outcomes.push(TableOutcome::Contributed { table, layout, value });
    }
    fn skip(&mut self, table: String, reason: SkipReason) {
        debug!(%table, %reason, "table skipped");
        self.outcomes.push(TableOutcome::Skipped { table, reason });
    }
}

/// Labelled points from a grouped query, merged across tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub points: Vec<(String, f64)>,
    pub outcomes: Vec<TableOutcome>,
}
impl Series {
    pub fn found(&self) -> bool {
        !self.points.is_empty()
    }
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|(l, _)| l.clone()).collect()
    }
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }
}

// accumulates labelled sums keeping first-seen order
#[derive(Default)]
struct Accumulator {
    order: Vec<String>,
    sums: HashMap<String, f64, LabelHasher>,
}
impl Accumulator {
    fn add(&mut self, label: String, value: f64) {
        match self.sums.get_mut(&label) {
            Some(sum) => *sum += value,
            None => {
                self.sums.insert(label.clone(), value);
                self.order.push(label);
            }
        }
    }
    fn into_points(self) -> Vec<(String, f64)> {
        let Accumulator { order, mut sums } = self;
        order
            .into_iter()
            .filter_map(|label| sums.remove(&label).map(|v| (label, v)))
            .collect()
    }
}

pub struct Aggregator<'db> {
    db: &'db Database,
    limits: Limits,
    deadline: Option<Instant>,
}

impl<'db> Aggregator<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self::with_limits(db, Limits::default())
    }
    /// The time budget starts counting now.
    pub fn with_limits(db: &'db Database, limits: Limits) -> Self {
        Self {
            db,
            limits,
            deadline: limits.time_budget.map(|budget| Instant::now() + budget),
        }
    }
    pub fn database(&self) -> &'db Database {
        self.db
    }
    pub fn limits(&self) -> Limits {
        self.limits
    }

    fn exhausted(&self, visited: usize) -> bool {
        visited >= self.limits.max_tables
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Introspect, classify and compile one table.
    fn prepare(
        &self,
        table: &str,
        aliases: &IndicatorAliases,
        filters: &FilterSet,
    ) -> std::result::Result<(Vec<String>, CompiledQuery), SkipReason> {
        let columns = columns_of(self.db, table);
        if columns.is_empty() {
            return Err(SkipReason::NoColumns);
        }
        let layout = detect(&columns, aliases);
        if layout == Layout::Unrecognized {
            return Err(SkipReason::Unrecognized);
        }
        debug!(table, ?layout, "layout detected");
        let compiled =
            compile(&columns, &layout, aliases, filters).ok_or(SkipReason::GenderUnavailable)?;
        Ok((columns, compiled))
    }

    /// Sum the indicator over every candidate table.
    ///
    /// Wide tables contribute the sum of their matched columns, long tables
    /// the sum of `value` over rows tagged with one of the aliases. A table
    /// whose filtered query yields SQL null contributes nothing; a table
    /// whose query fails is skipped. The result is not found only when no
    /// table contributed.
    pub fn aggregate(
        &self,
        keywords: &[KeywordGroup],
        aliases: &IndicatorAliases,
        filters: &FilterSet,
        mode: MatchMode,
    ) -> Result<Aggregation> {
        let mut result = Aggregation::default();
        for (visited, table) in find_tables(self.db, keywords, mode)?.into_iter().enumerate() {
            if self.exhausted(visited) {
                result.skip(table, SkipReason::BudgetExhausted);
                continue;
            }
            let compiled = match self.prepare(&table, aliases, filters) {
                Ok((_, compiled)) => compiled,
                Err(reason) => {
                    result.skip(table, reason);
                    continue;
                }
            };
            let sql = format!(
                "select sum({}) from {}{}",
                compiled.value_expr,
                quote_identifier(&table),
                compiled.predicate.where_clause()
            );
            let outcome = self.db.persistor()?.execute_scalar(&sql, compiled.predicate.params());
            match outcome {
                Ok(Some(value)) => result.contribute(table, compiled.layout, value),
                Ok(None) => result.skip(table, SkipReason::NoRows),
                Err(e) => {
                    warn!(%table, error = %e, "table query failed, skipping");
                    result.skip(table, SkipReason::QueryFailed(e.to_string()));
                }
            }
        }
        self.report_budget(&result.outcomes);
        debug!(found = result.found(), total = ?result.total, "aggregation complete");
        Ok(result)
    }

    /// Single-valued lookup: the last surviving row (by rowid) of the first
    /// structurally matching candidate that has one. Later candidates are
    /// not consulted once a value is found.
    pub fn latest(
        &self,
        keywords: &[KeywordGroup],
        aliases: &IndicatorAliases,
        filters: &FilterSet,
        mode: MatchMode,
    ) -> Result<Aggregation> {
        let mut result = Aggregation::default();
        for (visited, table) in find_tables(self.db, keywords, mode)?.into_iter().enumerate() {
            if self.exhausted(visited) {
                result.skip(table, SkipReason::BudgetExhausted);
                continue;
            }
            let compiled = match self.prepare(&table, aliases, filters) {
                Ok((_, compiled)) => compiled,
                Err(reason) => {
                    result.skip(table, reason);
                    continue;
                }
            };
            let present = compiled
                .value_columns
                .iter()
                .map(|c| format!("{} is not null", quote_identifier(c)))
                .collect::<Vec<_>>()
                .join(" or ");
            let predicate = compiled.predicate.clone().and(format!("({present})"), Vec::new());
            let sql = format!(
                "select {} from {}{} order by rowid desc limit 1",
                compiled.value_expr,
                quote_identifier(&table),
                predicate.where_clause()
            );
            let outcome = self.db.persistor()?.execute_scalar(&sql, predicate.params());
            match outcome {
                Ok(Some(value)) => {
                    result.contribute(table, compiled.layout, value);
                    break;
                }
                Ok(None) => result.skip(table, SkipReason::NoRows),
                Err(e) => {
                    warn!(%table, error = %e, "latest lookup failed, skipping");
                    result.skip(table, SkipReason::QueryFailed(e.to_string()));
                }
            }
        }
        self.report_budget(&result.outcomes);
        Ok(result)
    }

    /// Sum the indicator grouped by a category column (the first column whose
    /// normalized name contains one of `category_hints`), merged across
    /// tables, narrowed by `filters.search`, largest first, at most `limit`.
    pub fn breakdown(
        &self,
        keywords: &[KeywordGroup],
        aliases: &IndicatorAliases,
        category_hints: &[&str],
        filters: &FilterSet,
        mode: MatchMode,
        limit: usize,
    ) -> Result<Series> {
        let mut series = Series::default();
        let mut accumulator = Accumulator::default();
        for (visited, table) in find_tables(self.db, keywords, mode)?.into_iter().enumerate() {
            if self.exhausted(visited) {
                series
                    .outcomes
                    .push(TableOutcome::Skipped { table, reason: SkipReason::BudgetExhausted });
                continue;
            }
            let (columns, compiled) = match self.prepare(&table, aliases, filters) {
                Ok(prepared) => prepared,
                Err(reason) => {
                    series.outcomes.push(TableOutcome::Skipped { table, reason });
                    continue;
                }
            };
            let category =
                find_column_containing(&columns, category_hints, &compiled.value_columns);
            let Some(category) = category else {
                series
                    .outcomes
                    .push(TableOutcome::Skipped { table, reason: SkipReason::Unrecognized });
                continue;
            };
            let outcome = self.grouped(&table, category, &compiled)?;
            self.record_grouped(&mut series, &mut accumulator, table, compiled.layout, outcome);
        }
        let mut points = accumulator.into_points();
        if let Some(search) = &filters.search {
            let needle = search.to_lowercase();
            points.retain(|(label, _)| label.to_lowercase().contains(&needle));
        }
        points.sort_by(|a, b| b.1.total_cmp(&a.1));
        points.truncate(limit);
        series.points = points;
        self.report_budget(&series.outcomes);
        Ok(series)
    }

    /// Sum the indicator per year/date/period value, merged across tables,
    /// in period order (see [`sort_periods`]), keeping the latest `limit`
    /// points. The year filter is ignored: a trend spans years by definition.
    pub fn series(
        &self,
        keywords: &[KeywordGroup],
        aliases: &IndicatorAliases,
        filters: &FilterSet,
        mode: MatchMode,
        limit: usize,
    ) -> Result<Series> {
        let filters = filters.without_year();
        let mut series = Series::default();
        let mut accumulator = Accumulator::default();
        for (visited, table) in find_tables(self.db, keywords, mode)?.into_iter().enumerate() {
            if self.exhausted(visited) {
                series
                    .outcomes
                    .push(TableOutcome::Skipped { table, reason: SkipReason::BudgetExhausted });
                continue;
            }
            let (columns, compiled) = match self.prepare(&table, aliases, &filters) {
                Ok(prepared) => prepared,
                Err(reason) => {
                    series.outcomes.push(TableOutcome::Skipped { table, reason });
                    continue;
                }
            };
            let Some(period) = find_column(&columns, &["year", "date", "period"]) else {
                series
                    .outcomes
                    .push(TableOutcome::Skipped { table, reason: SkipReason::Unrecognized });
                continue;
            };
            let outcome = self.grouped(&table, period, &compiled)?;
            self.record_grouped(&mut series, &mut accumulator, table, compiled.layout, outcome);
        }
        let mut points = accumulator.into_points();
        sort_periods(&mut points);
        if points.len() > limit {
            points.drain(..points.len() - limit);
        }
        series.points = points;
        self.report_budget(&series.outcomes);
        Ok(series)
    }

    fn grouped(
        &self,
        table: &str,
        group: &str,
        compiled: &CompiledQuery,
    ) -> Result<rusqlite::Result<Vec<(String, f64)>>> {
        let group = quote_identifier(group);
        let sql = format!(
            "select {group}, sum({}) from {}{} group by {group} order by min(rowid)",
            compiled.value_expr,
            quote_identifier(table),
            compiled.predicate.where_clause()
        );
        let rows = self.db.persistor()?.execute_rows(&sql, compiled.predicate.params());
        Ok(rows.map(|rows| {
            rows.into_iter()
                .filter_map(|row| match row.as_slice() {
                    [label, value] => Some((label.label()?, value.as_f64()?)),
                    _ => None,
                })
                .collect()
        }))
    }

    fn record_grouped(
        &self,
        series: &mut Series,
        accumulator: &mut Accumulator,
        table: String,
        layout: LayoutKind,
        outcome: rusqlite::Result<Vec<(String, f64)>>,
    ) {
        match outcome {
            Ok(points) if points.is_empty() => {
                series.outcomes.push(TableOutcome::Skipped { table, reason: SkipReason::NoRows });
            }
            Ok(points) => {
                let value: f64 = points.iter().map(|(_, v)| v).sum();
                for (label, v) in points {
                    accumulator.add(label, v);
                }
                series.outcomes.push(TableOutcome::Contributed { table, layout, value });
            }
            Err(e) => {
                warn!(%table, error = %e, "grouped query failed, skipping");
                let reason = SkipReason::QueryFailed(e.to_string());
                series.outcomes.push(TableOutcome::Skipped { table, reason });
            }
        }
    }

    fn report_budget(&self, outcomes: &[TableOutcome]) {
        let skipped = outcomes
            .iter()
            .filter(|o| {
                matches!(o, TableOutcome::Skipped { reason: SkipReason::BudgetExhausted, .. })
            })
            .count();
        if skipped > 0 {
            warn!(skipped, max_tables = self.limits.max_tables, "aggregation budget exhausted");
        }
    }
}
