use super::format::{percent, thousands};
use super::{
    breakdown, current_and_previous, growth, measure, trend, Board, Chart, ChartKind, Charts,
    Dashboard, Domain, Figure, TableView,
};
use crate::aggregate::Aggregator;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::registry::{AGRICULTURE_SHARE, GDP, GDP_BY_SECTOR};

/// Population estimate behind the per-capita figure.
pub const POPULATION: f64 = 15.0e6;
const GROWTH_DEFAULT: f64 = 2.3;

const SECTOR_FALLBACK: &[(&str, f64)] = &[
    ("Services", 52.0),
    ("Agriculture", 11.0),
    ("Manufacturing", 14.0),
    ("Mining", 12.0),
    ("Construction", 11.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountsFigures {
    /// US$ billions
    pub gdp: Figure,
    pub previous_gdp: Option<Figure>,
    pub growth: Figure,
    /// US$
    pub per_capita: Figure,
    pub agriculture_share: Figure,
}

pub fn accounts_figures(agg: &Aggregator, filters: &FilterSet) -> Result<AccountsFigures> {
    let (gdp, previous_gdp) = current_and_previous(agg, &GDP, filters)?;
    let per_capita = Figure::derive(&[gdp], GDP.default * 1e9 / POPULATION, || {
        Some(gdp.value * 1e9 / POPULATION)
    });
    Ok(AccountsFigures {
        gdp,
        previous_gdp,
        growth: growth(gdp, previous_gdp, GROWTH_DEFAULT),
        per_capita,
        agriculture_share: measure(agg, &AGRICULTURE_SHARE, filters)?,
    })
}

/// GDP per period in US$ billions, with a flat illustrative path ending at
/// the current figure when no table carries a period column.
pub fn gdp_trend(agg: &Aggregator, filters: &FilterSet, gdp: Figure) -> Result<Chart> {
    let points = trend(agg, &GDP, filters, 12)?;
    let fallback = [
        ("2020", 32.0),
        ("2021", 33.5),
        ("2022", 34.2),
        ("2023", 35.1),
        ("2024", gdp.value),
    ];
    Ok(Chart::from_points("GDP Trend (US$ Billions)", ChartKind::Line, points, &fallback))
}

pub fn accounts_snapshot(agg: &Aggregator, filters: &FilterSet) -> Result<Dashboard> {
    let f = accounts_figures(agg, filters)?;
    let main = gdp_trend(agg, filters, f.gdp)?;
    let sectors = breakdown(agg, &GDP_BY_SECTOR, &["sector", "industry"], filters, 8)?;
    let side = Chart::from_points("GDP by sector", ChartKind::Doughnut, sectors, SECTOR_FALLBACK);

    let mut board = Board::default();
    board.kpi("GDP (current US$ B)", f.gdp, thousands(f.gdp.value, 1));
    board.kpi("GDP per capita (US$)", f.per_capita, thousands(f.per_capita.value, 0));
    board.kpi("GDP growth (annual)", f.growth, percent(f.growth.value, 1));
    board.kpi("Agriculture share", f.agriculture_share, percent(f.agriculture_share.value, 1));
    if let Some(previous) = f.previous_gdp {
        board.kpi("GDP previous period (US$ B)", previous, thousands(previous.value, 1));
    }
    let arrow = if f.growth.value > 0.0 { "↑" } else { "↓" };
    board.kpi("GDP trend", f.growth, arrow.to_string());

    board.insight(
        format!("GDP: US$ {} billion (current prices)", thousands(f.gdp.value, 1)),
        &[f.gdp],
    );
    board.insight(format!("Annual growth rate: {}", percent(f.growth.value, 1)), &[f.growth]);
    board.insight(
        format!("GDP per capita: US$ {}", thousands(f.per_capita.value, 0)),
        &[f.per_capita],
    );
    board.insight(
        format!("Agriculture contributes {} to GDP", percent(f.agriculture_share.value, 1)),
        &[f.agriculture_share],
    );

    let mut table = TableView::new(&["Sector", "Value", "Share (%)"]);
    let total: f64 = side.data.iter().sum();
    for (sector, value) in side.points() {
        let share = if total == 0.0 { 0.0 } else { value / total * 100.0 };
        table.push(vec![sector.to_string(), thousands(value, 0), thousands(share, 1)]);
    }

    let charts = Charts { main, side, extra: None };
    Ok(board.finish("National Accounts & GDP", Domain::Accounts, charts, table))
}
