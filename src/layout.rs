//! Layout detection.
//!
//! A table either spreads its categories across columns (*wide*: `Male`,
//! `Female`, `Total.Exports`) or stacks them in rows under an indicator
//! column with a single value column (*long*). Detection is always scoped to
//! one set of indicator aliases, since the same table can be wide for one
//! quantity and unrecognized for another.

use serde::Serialize;

/// Canonical comparison form of a column name, alias or indicator cell:
/// lower-cased, `_` and `.` read as spaces, whitespace collapsed.
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
        .replace(|c: char| c == '_' || c == '.', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The accepted names of one semantic quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorAliases {
    raw: Vec<String>,
    normalized: Vec<String>,
}
impl IndicatorAliases {
    pub fn new<S: AsRef<str>>(aliases: &[S]) -> Self {
        let raw: Vec<String> = aliases.iter().map(|a| a.as_ref().to_string()).collect();
        let mut normalized: Vec<String> = Vec::new();
        for alias in &raw {
            let n = normalize(alias);
            if !n.is_empty() && !normalized.contains(&n) {
                normalized.push(n);
            }
        }
        Self { raw, normalized }
    }
    pub fn raw(&self) -> &[String] {
        &self.raw
    }
    pub fn normalized(&self) -> &[String] {
        &self.normalized
    }
    pub fn contains(&self, name: &str) -> bool {
        let name = normalize(name);
        self.normalized.iter().any(|n| *n == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Wide,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// the listed columns each hold the indicator and are summed together
    Wide { columns: Vec<String> },
    /// rows tagged by `indicator` carry their number in `value`
    Long { indicator: String, value: String },
    Unrecognized,
}
impl Layout {
    pub fn kind(&self) -> Option<LayoutKind> {
        match self {
            Layout::Wide { .. } => Some(LayoutKind::Wide),
            Layout::Long { .. } => Some(LayoutKind::Long),
            Layout::Unrecognized => None,
        }
    }
}

/// Wide first; a table that reads as wide is never also read as long.
pub fn detect(columns: &[String], aliases: &IndicatorAliases) -> Layout {
    detect_wide(columns, aliases)
        .or_else(|| detect_long(columns))
        .unwrap_or(Layout::Unrecognized)
}

pub fn detect_wide(columns: &[String], aliases: &IndicatorAliases) -> Option<Layout> {
    let matched: Vec<String> = columns
        .iter()
        .filter(|c| aliases.contains(c))
        .cloned()
        .collect();
    if matched.is_empty() {
        None
    } else {
        Some(Layout::Wide { columns: matched })
    }
}

pub fn detect_long(columns: &[String]) -> Option<Layout> {
    let indicator = find_column(columns, &["indicator", "item"])?;
    let value = find_column(columns, &["value"])?;
    Some(Layout::Long {
        indicator: indicator.clone(),
        value: value.clone(),
    })
}

/// First column whose normalized name equals one of `names`, trying the
/// names in the order given.
pub fn find_column<'c>(columns: &'c [String], names: &[&str]) -> Option<&'c String> {
    names
        .iter()
        .find_map(|name| columns.iter().find(|c| normalize(c) == *name))
}

/// First column (in table order) whose normalized name contains one of
/// `hints`, ignoring the columns in `exclude`.
pub fn find_column_containing<'c>(
    columns: &'c [String],
    hints: &[&str],
    exclude: &[String],
) -> Option<&'c String> {
    columns.iter().find(|c| {
        if exclude.contains(c) {
            return false;
        }
        let n = normalize(c);
        hints.iter().any(|h| n.contains(h))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_and_case_fold_together() {
        assert_eq!(normalize("Total.Exports"), "total exports");
        assert_eq!(normalize("total_exports"), "total exports");
        assert_eq!(normalize("  Total   Exports "), "total exports");
    }

    #[test]
    fn duplicate_spellings_collapse() {
        let aliases = IndicatorAliases::new(&["GDP", "gdp", "Gdp_At_Market_Prices_Usd"]);
        assert_eq!(aliases.normalized(), &["gdp", "gdp at market prices usd"]);
        assert_eq!(aliases.raw().len(), 3);
    }
}
