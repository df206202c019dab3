use std::collections::HashMap;

use super::format::{percent, thousands};
use super::{
    breakdown, measure, ratio, Board, Chart, ChartKind, Charts, Dashboard, Domain, Figure,
    TableView,
};
use crate::aggregate::Aggregator;
use crate::error::Result;
use crate::filter::FilterSet;
use crate::registry::{EMPLOYED, INFORMAL_EMPLOYMENT, LABOUR_FORCE, UNEMPLOYED, YOUTH_NEET};

const UNEMPLOYMENT_RATE_DEFAULT: f64 = 8.7;
const PARTICIPATION_DEFAULT: f64 = 62.3;
const EMPLOYMENT_RATE_DEFAULT: f64 = 91.4;

const SECTOR_FALLBACK: &[(&str, f64)] = &[
    ("Agriculture", 1900.0),
    ("Manufacturing", 620.0),
    ("Services", 1450.0),
    ("Mining", 450.0),
    ("Construction", 380.0),
];
const PROVINCE_FALLBACK: &[(&str, f64)] = &[
    ("Harare", 28.0),
    ("Bulawayo", 12.0),
    ("Manicaland", 15.0),
    ("Mash East", 14.0),
    ("Other", 31.0),
];

/// Headline labour figures, in thousands of persons or percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabourFigures {
    pub employed: Figure,
    pub unemployed: Figure,
    pub labour_force: Figure,
    pub unemployment_rate: Figure,
    pub participation_rate: Figure,
    pub employment_rate: Figure,
    pub informal_share: Figure,
    pub youth_neet: Figure,
    pub neet_rate: Figure,
}

pub fn labour_figures(agg: &Aggregator, filters: &FilterSet) -> Result<LabourFigures> {
    let employed = measure(agg, &EMPLOYED, filters)?;
    let unemployed = measure(agg, &UNEMPLOYED, filters)?;
    let mut labour_force = measure(agg, &LABOUR_FORCE, filters)?;
    if labour_force.is_default() {
        labour_force = Figure::derive(&[employed, unemployed], LABOUR_FORCE.default, || {
            Some(employed.value + unemployed.value)
        });
    }
    let youth_neet = measure(agg, &YOUTH_NEET, filters)?;
    let informal = measure(agg, &INFORMAL_EMPLOYMENT, filters)?;

    let unemployment_rate =
        Figure::derive(&[unemployed, labour_force], UNEMPLOYMENT_RATE_DEFAULT, || {
            ratio(unemployed.value, labour_force.value)
        });
    let employment_rate = Figure::derive(&[employed, labour_force], EMPLOYMENT_RATE_DEFAULT, || {
        ratio(employed.value, labour_force.value)
    });
    let participation_rate = Figure::derive(&[labour_force, youth_neet], PARTICIPATION_DEFAULT, || {
        ratio(labour_force.value, labour_force.value + youth_neet.value)
    });
    let neet_rate = Figure::derive(&[labour_force, youth_neet], 0.0, || {
        ratio(youth_neet.value, labour_force.value + youth_neet.value)
    });
    let informal_share =
        Figure::derive(&[informal, employed], 0.0, || ratio(informal.value, employed.value));

    Ok(LabourFigures {
        employed,
        unemployed,
        labour_force,
        unemployment_rate,
        participation_rate,
        employment_rate,
        informal_share,
        youth_neet,
        neet_rate,
    })
}

/// Employment by province, largest first.
pub fn employment_by_province(agg: &Aggregator, filters: &FilterSet) -> Result<Chart> {
    let provinces = breakdown(agg, &EMPLOYED, &["province", "region"], filters, 10)?;
    Ok(Chart::from_points(
        "Employment by province",
        ChartKind::Doughnut,
        provinces,
        PROVINCE_FALLBACK,
    ))
}

pub fn labour_snapshot(agg: &Aggregator, filters: &FilterSet) -> Result<Dashboard> {
    let f = labour_figures(agg, filters)?;
    let sectors = breakdown(agg, &EMPLOYED, &["industry", "sector"], filters, 5)?;
    let side = employment_by_province(agg, filters)?;
    let unemployed_by_province: HashMap<String, f64> =
        breakdown(agg, &UNEMPLOYED, &["province", "region"], filters, usize::MAX)?
            .into_iter()
            .collect();

    let mut board = Board::default();
    board.kpi("Labour force (thousands)", f.labour_force, thousands(f.labour_force.value, 0));
    board.kpi("Employment (thousands)", f.employed, thousands(f.employed.value, 0));
    board.kpi("Unemployment rate", f.unemployment_rate, percent(f.unemployment_rate.value, 1));
    board.kpi("LFPR", f.participation_rate, percent(f.participation_rate.value, 1));
    board.kpi("Informal sector", f.informal_share, percent(f.informal_share.value, 1));
    board.kpi("Youth NEET", f.youth_neet, thousands(f.youth_neet.value, 0));
    board.kpi("Unemployed", f.unemployed, thousands(f.unemployed.value, 0));
    board.kpi("Employment rate", f.employment_rate, percent(f.employment_rate.value, 1));

    board.insight(
        format!("Total employed: {} thousand people", thousands(f.employed.value, 0)),
        &[f.employed],
    );
    board.insight(
        format!("Unemployment rate: {}", percent(f.unemployment_rate.value, 1)),
        &[f.unemployment_rate],
    );
    board.insight(
        format!(
            "Informal sector accounts for {} of total employment",
            percent(f.informal_share.value, 1)
        ),
        &[f.informal_share],
    );
    board.insight(
        format!("Youth NEET population: {}", thousands(f.youth_neet.value, 0)),
        &[f.youth_neet],
    );
    board.insight(
        format!("Labour force participation rate: {}", percent(f.participation_rate.value, 1)),
        &[f.participation_rate],
    );

    let mut table = TableView::new(&["Province", "Employed", "Unemployed", "Unemployment Rate"]);
    for (province, employed) in side.points() {
        let (unemployed, rate) = match unemployed_by_province.get(province) {
            Some(&unemployed) => (
                thousands(unemployed, 0),
                ratio(unemployed, employed + unemployed)
                    .map(|r| percent(r, 1))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        table.push(vec![province.to_string(), thousands(employed, 0), unemployed, rate]);
    }

    let charts = Charts {
        main: Chart::from_points(
            "Employment by industry sector",
            ChartKind::Bar,
            sectors,
            SECTOR_FALLBACK,
        ),
        side,
        extra: None,
    };
    Ok(board.finish("Labour Market Statistics", Domain::Labour, charts, table))
}
