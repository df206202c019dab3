use std::collections::HashMap;

use super::format::{percent, thousands};
use super::{
    breakdown, current_and_previous, growth, ratio, trend, Board, Chart, ChartKind, Charts,
    Dashboard, Domain, Figure, TableView,
};
use crate::aggregate::Aggregator;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::registry::{EXPORTS, IMPORTS, IMPORTS_BY_PROVINCE};

const COVER_DEFAULT: f64 = 71.5;

const DESTINATIONS: &[(&str, f64)] = &[
    ("SA", 45.0),
    ("UAE", 18.0),
    ("China", 15.0),
    ("EU", 12.0),
    ("Other", 10.0),
];
const PROVINCE_FALLBACK: &[(&str, f64)] = &[
    ("Harare", 1800.0),
    ("Bulawayo", 620.0),
    ("Manicaland", 450.0),
    ("Mash West", 380.0),
    ("Other", 2640.0),
];

/// US$ millions and percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeFigures {
    pub exports: Figure,
    pub imports: Figure,
    pub balance: Figure,
    pub cover: Figure,
    pub export_growth: Figure,
    pub import_growth: Figure,
}

pub fn trade_figures(agg: &Aggregator, filters: &FilterSet) -> Result<TradeFigures> {
    let (exports, previous_exports) = current_and_previous(agg, &EXPORTS, filters)?;
    let (imports, previous_imports) = current_and_previous(agg, &IMPORTS, filters)?;
    Ok(TradeFigures {
        exports,
        imports,
        balance: Figure::derive(&[exports, imports], EXPORTS.default - IMPORTS.default, || {
            Some(exports.value - imports.value)
        }),
        cover: Figure::derive(&[exports, imports], COVER_DEFAULT, || {
            ratio(exports.value, imports.value)
        }),
        export_growth: growth(exports, previous_exports, 0.0),
        import_growth: growth(imports, previous_imports, 0.0),
    })
}

pub fn trade_snapshot(agg: &Aggregator, filters: &FilterSet) -> Result<Dashboard> {
    let f = trade_figures(agg, filters)?;
    let exports_trend = trend(agg, &EXPORTS, filters, 12)?;
    let imports_trend: HashMap<String, f64> =
        trend(agg, &IMPORTS, filters, usize::MAX)?.into_iter().collect();
    let provinces = breakdown(agg, &IMPORTS_BY_PROVINCE, &["province", "region"], filters, 5)?;
    let deficit = Figure::derive(&[f.balance], 0.0, || Some((-f.balance.value).max(0.0)));

    let mut board = Board::default();
    board.kpi("Exports (US$ M)", f.exports, thousands(f.exports.value, 0));
    board.kpi("Imports (US$ M)", f.imports, thousands(f.imports.value, 0));
    board.kpi("Trade balance (US$ M)", f.balance, thousands(f.balance.value, 0));
    board.kpi("Cover ratio", f.cover, percent(f.cover.value, 1));
    board.kpi("Export growth", f.export_growth, percent(f.export_growth.value, 1));
    board.kpi("Import growth", f.import_growth, percent(f.import_growth.value, 1));
    board.kpi("Trade deficit (US$ M)", deficit, thousands(deficit.value, 0));

    board.insight(
        format!("Total exports: US$ {} million", thousands(f.exports.value, 0)),
        &[f.exports],
    );
    board.insight(
        format!("Total imports: US$ {} million", thousands(f.imports.value, 0)),
        &[f.imports],
    );
    board.insight(
        format!("Trade balance: US$ {} million", thousands(f.balance.value, 0)),
        &[f.balance],
    );
    board.insight(format!("Export coverage ratio: {}", percent(f.cover.value, 1)), &[f.cover]);
    board.insight(
        format!("Export growth: {} period-over-period", percent(f.export_growth.value, 1)),
        &[f.export_growth],
    );

    let mut table =
        TableView::new(&["Period", "Exports (US$M)", "Imports (US$M)", "Balance (US$M)"]);
    if exports_trend.is_empty() {
        table.push(vec![
            "Latest".to_string(),
            thousands(f.exports.value, 0),
            thousands(f.imports.value, 0),
            thousands(f.balance.value, 0),
        ]);
    }
    for (period, exports) in &exports_trend {
        let (imports, balance) = match imports_trend.get(period) {
            Some(&imports) => (thousands(imports, 0), thousands(exports - imports, 0)),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        table.push(vec![period.clone(), thousands(*exports, 0), imports, balance]);
    }

    let fallback = [
        ("2021", 3500.0),
        ("2022", 3800.0),
        ("2023", 4100.0),
        ("2024", 4300.0),
        ("2025", f.exports.value),
    ];
    let charts = Charts {
        main: Chart::from_points("Exports Trend", ChartKind::Line, exports_trend, &fallback),
        side: Chart::fixed("Export destinations", ChartKind::Doughnut, DESTINATIONS),
        extra: Some(Chart::from_points(
            "Imports by province",
            ChartKind::Bar,
            provinces,
            PROVINCE_FALLBACK,
        )),
    };
    Ok(board.finish("International Trade Statistics", Domain::Trade, charts, table))
}
