use super::accounts::{accounts_figures, gdp_trend};
use super::format::{percent, thousands};
use super::labour::{employment_by_province, labour_figures};
use super::prices::price_figures;
use super::trade::trade_figures;
use super::{Board, Charts, Dashboard, Domain, TableView};
use crate::aggregate::Aggregator;
use crate::error::Result;
use crate::filter::FilterSet;

/// Headline figures of every domain on one page.
pub fn overview_snapshot(agg: &Aggregator, filters: &FilterSet) -> Result<Dashboard> {
    let labour = labour_figures(agg, filters)?;
    let accounts = accounts_figures(agg, filters)?;
    let prices = price_figures(agg, filters)?;
    let trade = trade_figures(agg, filters)?;

    let mut board = Board::default();
    board.kpi("Employed (thousands)", labour.employed, thousands(labour.employed.value, 0));
    board.kpi(
        "Unemployment rate",
        labour.unemployment_rate,
        percent(labour.unemployment_rate.value, 1),
    );
    board.kpi("GDP growth", accounts.growth, percent(accounts.growth.value, 1));
    board.kpi("Inflation (YoY)", prices.annual, percent(prices.annual.value, 1));
    board.kpi("Informal sector", labour.informal_share, percent(labour.informal_share.value, 1));
    board.kpi("Youth NEET rate", labour.neet_rate, percent(labour.neet_rate.value, 1));
    board.kpi("Trade balance (US$ M)", trade.balance, thousands(trade.balance.value, 0));
    board.kpi("GDP per capita (US$)", accounts.per_capita, thousands(accounts.per_capita.value, 0));

    board.insight(
        format!("Total employment: {} thousand people", thousands(labour.employed.value, 0)),
        &[labour.employed],
    );
    board.insight(
        format!(
            "GDP growth rate: {} (GDP: US$ {} B)",
            percent(accounts.growth.value, 1),
            thousands(accounts.gdp.value, 1)
        ),
        &[accounts.growth, accounts.gdp],
    );
    board.insight(
        format!("Inflation rate: {} year-on-year", percent(prices.annual.value, 1)),
        &[prices.annual],
    );
    board.insight(
        format!(
            "Informal sector accounts for {} of employment",
            percent(labour.informal_share.value, 1)
        ),
        &[labour.informal_share],
    );
    board.insight(
        format!("Youth NEET rate: {}", percent(labour.neet_rate.value, 1)),
        &[labour.neet_rate],
    );
    board.insight(
        format!("Trade balance: US$ {} million", thousands(trade.balance.value, 0)),
        &[trade.balance],
    );

    let na = || "N/A".to_string();
    let mut table = TableView::new(&["Indicator", "Current", "Previous", "Change"]);
    table.push(vec!["Employed (k)".to_string(), thousands(labour.employed.value, 0), na(), na()]);
    table.push(vec![
        "Unemployment rate".to_string(),
        percent(labour.unemployment_rate.value, 1),
        na(),
        na(),
    ]);
    table.push(vec![
        "GDP (US$B)".to_string(),
        thousands(accounts.gdp.value, 1),
        accounts.previous_gdp.map(|p| thousands(p.value, 1)).unwrap_or_else(na),
        percent(accounts.growth.value, 1),
    ]);
    table.push(vec!["Inflation (YoY)".to_string(), percent(prices.annual.value, 1), na(), na()]);
    table.push(vec![
        "Exports (US$M)".to_string(),
        thousands(trade.exports.value, 0),
        na(),
        percent(trade.export_growth.value, 1),
    ]);
    table.push(vec![
        "Trade balance (US$M)".to_string(),
        thousands(trade.balance.value, 0),
        na(),
        na(),
    ]);

    let charts = Charts {
        main: gdp_trend(agg, filters, accounts.gdp)?,
        side: employment_by_province(agg, filters)?,
        extra: None,
    };
    Ok(board.finish("National Statistics Overview", Domain::Overview, charts, table))
}
