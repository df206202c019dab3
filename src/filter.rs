//! Filter sets and the filter compiler.
//!
//! A [`FilterSet`] is layout-agnostic; [`compile`] turns it into SQL
//! predicate fragments for one table once its layout is known. Uploaded
//! tables disagree on types (the year may be `2025`, `2025.0` or
//! `"Jan-2025"`), so every fragment is written to tolerate that.

use rusqlite::types::Value;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::layout::{find_column, normalize, IndicatorAliases, Layout, LayoutKind};
use crate::persist::quote_identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
}
impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
    /// Lower-case token as it appears in normalized column names and cells.
    pub fn token(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
    /// Gender a column name refers to, judged by whole words so that
    /// "female" is never read as "male".
    pub fn of_column(column: &str) -> Option<Self> {
        normalize(column).split_whitespace().find_map(Gender::parse)
    }
}

/// Per-request filters, immutable for the duration of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub year: Option<i64>,
    /// `None` means all regions
    pub region: Option<String>,
    pub gender: Option<Gender>,
    pub search: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_year(mut self, year: i64) -> Self {
        self.year = Some(year);
        self
    }
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = coerce_region(region);
        self
    }
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = coerce_text(search);
        self
    }
    pub fn without_year(&self) -> Self {
        Self { year: None, ..self.clone() }
    }

    /// Coerce the flat string map arriving from the HTTP boundary. Unknown
    /// keys (`age`, `domain`) are ignored here; unusable values become
    /// "no filter" rather than errors.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let year = params.get("year").and_then(|raw| {
            let year = coerce_year(raw);
            if year.is_none() && !raw.trim().is_empty() {
                debug!(raw = %raw, "ignoring unparseable year filter");
            }
            year
        });
        Self {
            year,
            region: params.get("region").and_then(|r| coerce_region(r)),
            gender: params.get("gender").and_then(|g| Gender::parse(g)),
            search: params.get("search").and_then(|s| coerce_text(s)),
        }
    }
}

/// `"2025"` and `"2025.0"` are both the year 2025.
pub fn coerce_year(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Empty or the `All` sentinel mean no region filter.
pub fn coerce_region(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(raw.to_string())
    }
}

fn coerce_text(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

// ------------- Predicates -------------
/// Conjunction of SQL fragments with their positional parameters, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<String>,
    params: Vec<Value>,
}
impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, clause: String, params: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause);
        self.params.extend(params);
    }
    pub fn and(mut self, clause: String, params: impl IntoIterator<Item = Value>) -> Self {
        self.push(clause, params);
        self
    }
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }
    pub fn params(&self) -> &[Value] {
        &self.params
    }
    /// `" where a and b"`, or an empty string when unconstrained.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" where {}", self.clauses.join(" and "))
        }
    }
}

/// SQL mirror of [`normalize`] for a cell.
pub fn normalized_cell(column: &str) -> String {
    let spaced = format!(
        "replace(replace(lower(cast({} as text)), '_', ' '), '.', ' ')",
        quote_identifier(column)
    );
    let spaced = ["char(9)", "char(10)", "char(13)"]
        .iter()
        .fold(spaced, |sql, ws| format!("replace({sql}, {ws}, ' ')"));
    // a run of spaces becomes a run of marker pairs whose inner joints vanish
    format!(
        "trim(replace(replace(replace({spaced}, ' ', char(1) || char(2)), \
         char(2) || char(1), ''), char(1) || char(2), ' '))"
    )
}

pub fn region_clause(column: &str, region: &str) -> (String, Vec<Value>) {
    (
        format!("lower(trim(cast({} as text))) = ?", quote_identifier(column)),
        vec![Value::Text(region.trim().to_lowercase())],
    )
}

/// Year test with two branches: the year as a leading token of the text
/// form (`2025`, `2025.0`, `2025-03`, `Jan-2025`) or numeric equality.
pub fn year_clause(column: &str, year: i64) -> (String, Vec<Value>) {
    let quoted = quote_identifier(column);
    (
        format!(
            "(' ' || replace(replace(cast({quoted} as text), '-', ' '), '/', ' ') like ? \
             or {quoted} = ?)"
        ),
        vec![Value::Text(format!("% {year}%")), Value::Integer(year)],
    )
}

pub fn gender_clause(column: &str, gender: Gender) -> (String, Vec<Value>) {
    (
        format!("lower(trim(cast({} as text))) = ?", quote_identifier(column)),
        vec![Value::Text(gender.token().to_string())],
    )
}

/// Keep only the wide columns for the requested gender. Columns that carry
/// no gender word are all kept when none of them do; `None` means the table
/// splits by gender but not into the requested one.
pub fn restrict_to_gender(columns: &[String], gender: Gender) -> Option<Vec<String>> {
    if columns.iter().all(|c| Gender::of_column(c).is_none()) {
        return Some(columns.to_vec());
    }
    let chosen: Vec<String> = columns
        .iter()
        .filter(|c| Gender::of_column(c) == Some(gender))
        .cloned()
        .collect();
    if chosen.is_empty() {
        None
    } else {
        Some(chosen)
    }
}

/// A table's query, ready to be wrapped in an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub layout: LayoutKind,
    /// columns holding the quantity
    pub value_columns: Vec<String>,
    /// per-row numeric expression over `value_columns`
    pub value_expr: String,
    pub predicate: Predicate,
}

/// Compile `filters` against one table.
///
/// Returns `None` when the layout is unrecognized, or when a gender filter
/// cannot be honoured by a table whose value columns are split by gender.
pub fn compile(
    columns: &[String],
    layout: &Layout,
    aliases: &IndicatorAliases,
    filters: &FilterSet,
) -> Option<CompiledQuery> {
    let mut predicate = Predicate::new();
    let (kind, value_columns, value_expr) = match layout {
        Layout::Wide { columns: matched } => {
            let selected = match filters.gender {
                Some(gender) => restrict_to_gender(matched, gender)?,
                None => matched.clone(),
            };
            let expr = selected
                .iter()
                .map(|c| format!("ifnull({}, 0)", quote_identifier(c)))
                .collect::<Vec<_>>()
                .join(" + ");
            (LayoutKind::Wide, selected, expr)
        }
        Layout::Long { indicator, value } => {
            let placeholders = vec!["?"; aliases.normalized().len()].join(", ");
            predicate.push(
                format!("{} in ({placeholders})", normalized_cell(indicator)),
                aliases.normalized().iter().map(|a| Value::Text(a.clone())),
            );
            (LayoutKind::Long, vec![value.clone()], quote_identifier(value))
        }
        Layout::Unrecognized => return None,
    };

    if let Some(region) = &filters.region {
        if let Some(column) = find_column(columns, &["province", "region"]) {
            let (clause, params) = region_clause(column, region);
            predicate.push(clause, params);
        }
    }
    if let Some(year) = filters.year {
        if let Some(column) = find_column(columns, &["year", "date", "period"]) {
            let (clause, params) = year_clause(column, year);
            predicate.push(clause, params);
        }
    }
    if let Some(gender) = filters.gender {
        if let Some(column) = find_column(columns, &["sex", "gender"]) {
            if !value_columns.contains(column) {
                let (clause, params) = gender_clause(column, gender);
                predicate.push(clause, params);
            }
        }
    }

    Some(CompiledQuery {
        layout: kind,
        value_columns,
        value_expr,
        predicate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn boundary_values_are_coerced() {
        let filters = FilterSet::from_params(&params(&[
            ("year", "2025.0"),
            ("region", "All"),
            ("gender", "female"),
            ("search", "  "),
            ("age", "15-24"),
        ]));
        assert_eq!(filters.year, Some(2025));
        assert_eq!(filters.region, None);
        assert_eq!(filters.gender, Some(Gender::Female));
        assert_eq!(filters.search, None);
    }

    #[test]
    fn unparseable_year_is_no_filter() {
        let filters = FilterSet::from_params(&params(&[("year", "last year")]));
        assert_eq!(filters.year, None);
    }

    #[test]
    fn gender_words_are_matched_whole() {
        assert_eq!(Gender::of_column("Female Youth Neet"), Some(Gender::Female));
        assert_eq!(Gender::of_column("Male"), Some(Gender::Male));
        assert_eq!(Gender::of_column("Females"), None);
    }

    #[test]
    fn gender_restriction_keeps_ungendered_columns() {
        let cols = vec!["GDP".to_string()];
        assert_eq!(restrict_to_gender(&cols, Gender::Male), Some(cols.clone()));
        let cols = vec!["Male".to_string(), "Female".to_string()];
        assert_eq!(restrict_to_gender(&cols, Gender::Female), Some(vec!["Female".to_string()]));
        let cols = vec!["Male Youth Neet".to_string(), "Total".to_string()];
        assert_eq!(restrict_to_gender(&cols, Gender::Female), None);
    }
}
