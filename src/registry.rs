//! Indicator registry.
//!
//! Every quantity the dashboards show is declared once here: which table
//! names may hold it, under which column or indicator spellings, how it is
//! looked up, what unit it is displayed in and which documented value stands
//! in when nothing is found. Detection itself stays heuristic; the registry
//! only keeps those heuristics in one versioned place.

use crate::layout::IndicatorAliases;
use crate::matcher::{groups, KeywordGroup, MatchMode};

/// Bumped whenever an entry's keywords, aliases, unit or default change.
pub const REGISTRY_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// sum over every candidate table
    Sum,
    /// last row of the first candidate that has one
    Latest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    /// table-name fragments that rule a table out even when a keyword matches
    pub excludes: &'static [&'static str],
    pub mode: MatchMode,
    pub aliases: &'static [&'static str],
    pub lookup: Lookup,
    /// stored units per display unit (1e9 shows US$ as US$ billions)
    pub unit: f64,
    /// display-unit value reported when no table yields data
    pub default: f64,
}
impl Indicator {
    /// Keyword groups followed by one excluding group per `excludes` entry.
    pub fn keyword_groups(&self) -> Vec<KeywordGroup> {
        let mut keywords = groups(self.keywords);
        keywords.extend(self.excludes.iter().map(|e| KeywordGroup::excluding(e)));
        keywords
    }
    pub fn indicator_aliases(&self) -> IndicatorAliases {
        IndicatorAliases::new(self.aliases)
    }
}

// ------------- Labour -------------
/// Thousands of employed persons; wide tables split by sex.
pub const EMPLOYED: Indicator = Indicator {
    name: "employed",
    keywords: &["employment"],
    // "empl" also names the informal and unemployment table families
    excludes: &["informal", "unemploy", "neet"],
    mode: MatchMode::Any,
    aliases: &["Male", "Female", "Employed", "Total Employed"],
    lookup: Lookup::Sum,
    unit: 1.0,
    default: 5821.0,
};
pub const UNEMPLOYED: Indicator = Indicator {
    name: "unemployed",
    keywords: &["qlfs", "employment"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["unemployed", "Unemployed Persons"],
    lookup: Lookup::Sum,
    unit: 1.0,
    default: 550.0,
};
/// Default is the employed and unemployed defaults combined.
pub const LABOUR_FORCE: Indicator = Indicator {
    name: "labour_force",
    keywords: &["qlfs", "employment"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["labour_force", "Labor Force"],
    lookup: Lookup::Sum,
    unit: 1.0,
    default: 6371.0,
};
pub const YOUTH_NEET: Indicator = Indicator {
    name: "youth_neet",
    keywords: &["youth", "neet"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Male Youth Neet", "Female Youth Neet", "Youth Neet"],
    lookup: Lookup::Sum,
    unit: 1.0,
    default: 0.0,
};
pub const INFORMAL_EMPLOYMENT: Indicator = Indicator {
    name: "informal_employment",
    keywords: &["informal"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Male", "Female", "Informal Employment"],
    lookup: Lookup::Sum,
    unit: 1.0,
    default: 0.0,
};

// ------------- National accounts -------------
/// US$ billions.
pub const GDP: Indicator = Indicator {
    name: "gdp",
    keywords: &["gdp"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Gdp At Market Prices Usd", "gdp_at_market_prices_usd", "GDP"],
    lookup: Lookup::Sum,
    unit: 1e9,
    default: 32.4,
};
/// Sector values for the composition chart; grouped by a sector column.
pub const GDP_BY_SECTOR: Indicator = Indicator {
    name: "gdp_by_sector",
    keywords: &["gdp", "sector", "industry"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Value", "Gross Value Added", "Share"],
    lookup: Lookup::Sum,
    unit: 1.0,
    default: 0.0,
};
/// Percent of GDP.
pub const AGRICULTURE_SHARE: Indicator = Indicator {
    name: "agriculture_share",
    keywords: &["gdp", "sector"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Agriculture Share", "agriculture_share_percent"],
    lookup: Lookup::Latest,
    unit: 1.0,
    default: 11.2,
};

// ------------- Prices -------------
pub const CPI_ALL_ITEMS: Indicator = Indicator {
    name: "cpi_all_items",
    keywords: &["cpi"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["all_items", "CPI All Items"],
    lookup: Lookup::Latest,
    unit: 1.0,
    default: 105.2,
};
pub const INFLATION_ANNUAL: Indicator = Indicator {
    name: "inflation_annual",
    keywords: &["cpi"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Inflation.Rate.Percent.Annual", "Annual Inflation"],
    lookup: Lookup::Latest,
    unit: 1.0,
    default: 12.1,
};
pub const INFLATION_MONTHLY: Indicator = Indicator {
    name: "inflation_monthly",
    keywords: &["cpi"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Inflation.Rate.Percent.Monthly", "Monthly Inflation"],
    lookup: Lookup::Latest,
    unit: 1.0,
    default: 0.8,
};
pub const FOOD_INFLATION: Indicator = Indicator {
    name: "food_inflation",
    keywords: &["cpi"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Food Inflation", "food_and_non_alcoholic_beverages"],
    lookup: Lookup::Latest,
    unit: 1.0,
    default: 13.5,
};

// ------------- Trade -------------
/// US$ millions.
pub const EXPORTS: Indicator = Indicator {
    name: "exports",
    keywords: &["trade"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Total.Exports", "Exports"],
    lookup: Lookup::Sum,
    unit: 1e6,
    default: 4210.0,
};
/// US$ millions.
pub const IMPORTS: Indicator = Indicator {
    name: "imports",
    keywords: &["trade"],
    excludes: &[],
    mode: MatchMode::Any,
    aliases: &["Imports", "Total Imports"],
    lookup: Lookup::Sum,
    unit: 1e6,
    default: 5890.0,
};
/// Provincial import values, US$ millions.
pub const IMPORTS_BY_PROVINCE: Indicator = Indicator {
    name: "imports_by_province",
    keywords: &["import", "province"],
    excludes: &[],
    mode: MatchMode::All,
    aliases: &["Value", "Imports"],
    lookup: Lookup::Sum,
    unit: 1e6,
    default: 0.0,
};

pub const ALL: &[&Indicator] = &[
    &EMPLOYED,
    &UNEMPLOYED,
    &LABOUR_FORCE,
    &YOUTH_NEET,
    &INFORMAL_EMPLOYMENT,
    &GDP,
    &GDP_BY_SECTOR,
    &AGRICULTURE_SHARE,
    &CPI_ALL_ITEMS,
    &INFLATION_ANNUAL,
    &INFLATION_MONTHLY,
    &FOOD_INFLATION,
    &EXPORTS,
    &IMPORTS,
    &IMPORTS_BY_PROVINCE,
];

pub fn lookup(name: &str) -> Option<&'static Indicator> {
    ALL.iter().copied().find(|indicator| indicator.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_found() {
        for indicator in ALL {
            assert_eq!(lookup(indicator.name), Some(*indicator));
            assert_eq!(ALL.iter().filter(|i| i.name == indicator.name).count(), 1);
        }
        assert_eq!(lookup("tourist_arrivals"), None);
    }

    #[test]
    fn aliases_survive_normalization() {
        for indicator in ALL {
            assert!(!indicator.indicator_aliases().normalized().is_empty(), "{}", indicator.name);
            assert!(indicator.unit > 0.0);
        }
    }
}
