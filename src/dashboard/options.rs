//! Filter choices offered to the dashboard, read from whatever tables exist.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::catalog::distinct_values;
use crate::error::Result;
use crate::filter::coerce_year;
use crate::persist::Database;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"^\d{4}$").unwrap();
}

const DEFAULT_YEARS: &[&str] = &["2025", "2024", "2023"];
const DEFAULT_REGIONS: &[&str] = &[
    "Harare",
    "Bulawayo",
    "Manicaland",
    "Mashonaland East",
    "Mashonaland West",
    "Mashonaland Central",
    "Matabeleland North",
    "Matabeleland South",
    "Midlands",
    "Masvingo",
];
const DEFAULT_GENDERS: &[&str] = &["Male", "Female"];
const DEFAULT_AGES: &[&str] = &["15-24", "25-34", "35-44", "45-54", "55+"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub regions: Vec<String>,
    pub genders: Vec<String>,
    pub ages: Vec<String>,
}

fn or_defaults(found: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if found.is_empty() {
        defaults.iter().map(|d| d.to_string()).collect()
    } else {
        found
    }
}

/// Years are shown newest first and as plain four digit numbers, whichever
/// way the tables store them.
fn years(db: &Database) -> Result<Vec<String>> {
    let mut years: Vec<String> = distinct_values(db, &["Year", "year", "YEAR"], None)?
        .iter()
        .filter_map(|raw| coerce_year(raw))
        .map(|year| year.to_string())
        .filter(|year| YEAR.is_match(year))
        .collect();
    years.sort_by(|a, b| b.cmp(a));
    years.dedup();
    Ok(years)
}

pub fn filter_options(db: &Database) -> Result<FilterOptions> {
    Ok(FilterOptions {
        years: or_defaults(years(db)?, DEFAULT_YEARS),
        regions: or_defaults(
            distinct_values(db, &["Province", "PROVINCE", "province", "Region"], None)?,
            DEFAULT_REGIONS,
        ),
        genders: or_defaults(
            distinct_values(db, &["Sex", "sex", "Gender", "gender"], None)?,
            DEFAULT_GENDERS,
        ),
        ages: or_defaults(
            distinct_values(db, &["Age Group", "AgeGroup", "age_group", "Age"], None)?,
            DEFAULT_AGES,
        ),
    })
}
