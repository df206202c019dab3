use std::time::Duration;

use statdash::aggregate::{Aggregator, Limits, SkipReason, TableOutcome};
use statdash::filter::{FilterSet, Gender};
use statdash::layout::{IndicatorAliases, LayoutKind};
use statdash::matcher::{groups, MatchMode};
use statdash::persist::{Database, PersistenceMode};
use statdash::registry::{EMPLOYED, GDP, INFORMAL_EMPLOYMENT};

fn database(sql: &str) -> Database {
    let db = Database::new(PersistenceMode::InMemory).unwrap();
    db.execute_batch(sql).unwrap();
    db
}

fn two_wide_tables() -> Database {
    database(
        r#"
        create table employment_q1 ("Province" text, "Male" real, "Female" real, "Year" integer);
        insert into employment_q1 values ('Harare', 1000, 1500, 2025);
        insert into employment_q1 values ('Bulawayo', 300, 200, 2025);
        create table labour_q2 ("Province" text, "Male" real, "Female" real, "Year" integer);
        insert into labour_q2 values ('Harare', 500, 500, 2025);
        insert into labour_q2 values ('Harare', 50, 50, 2024);
        "#,
    )
}

fn employed(agg: &Aggregator, filters: &FilterSet) -> statdash::aggregate::Aggregation {
    agg.aggregate(&EMPLOYED.keyword_groups(), &EMPLOYED.indicator_aliases(), filters, EMPLOYED.mode)
        .unwrap()
}

#[test]
fn wide_tables_sum_across_tables() {
    let db = two_wide_tables();
    let agg = Aggregator::new(&db);
    let filters = FilterSet::new().with_year(2025).with_region("Harare");
    let result = employed(&agg, &filters);
    assert_eq!(result.total, Some(3500.0));
    assert!(result.found());
    assert_eq!(result.contributors(), vec!["employment_q1", "labour_q2"]);
}

#[test]
fn unfiltered_wide_sum_is_every_column_total() {
    let db = two_wide_tables();
    let result = employed(&Aggregator::new(&db), &FilterSet::new());
    assert_eq!(result.total, Some(1000.0 + 1500.0 + 300.0 + 200.0 + 500.0 + 500.0 + 50.0 + 50.0));
}

#[test]
fn gender_keeps_only_its_columns() {
    let db = two_wide_tables();
    let filters = FilterSet::new()
        .with_year(2025)
        .with_region("Harare")
        .with_gender(Gender::Female);
    let result = employed(&Aggregator::new(&db), &filters);
    assert_eq!(result.total, Some(2000.0));
}

#[test]
fn long_table_scaled_to_billions() {
    let db = database(
        r#"
        create table gdp_long ("Date" integer, "indicator" text, "value" real);
        insert into gdp_long values (2025, 'Gdp At Market Prices Usd', 50000000000);
        insert into gdp_long values (2024, 'gdp_at_market_prices_usd', 45000000000);
        insert into gdp_long values (2025, 'Population', 15000000);
        "#,
    );
    let agg = Aggregator::new(&db);
    let filters = FilterSet::new().with_year(2025);
    let result = agg
        .aggregate(&GDP.keyword_groups(), &GDP.indicator_aliases(), &filters, GDP.mode)
        .unwrap();
    assert_eq!(result.total.map(|t| t / GDP.unit), Some(50.0));
    match &result.outcomes[0] {
        TableOutcome::Contributed { layout, .. } => assert_eq!(*layout, LayoutKind::Long),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn long_indicator_spelling_variants_are_one_indicator() {
    let db = database(
        r#"
        create table cpi_long ("Item" text, "Value" real);
        insert into cpi_long values ('Food.And.Beverages', 1);
        insert into cpi_long values ('food_and_beverages', 2);
        insert into cpi_long values (' FOOD AND BEVERAGES ', 4);
        insert into cpi_long values ('Transport', 8);
        "#,
    );
    let aliases = IndicatorAliases::new(&["Food and Beverages"]);
    let result = Aggregator::new(&db)
        .aggregate(&groups(&["cpi"]), &aliases, &FilterSet::new(), MatchMode::Any)
        .unwrap();
    assert_eq!(result.total, Some(7.0));
}

#[test]
fn wide_and_long_tables_add_up() {
    let db = database(
        r#"
        create table trade_wide ("Period" text, "Exports" real);
        insert into trade_wide values ('Jan-2025', 100);
        create table trade_long ("Period" text, "Indicator" text, "Value" real);
        insert into trade_long values ('Feb-2025', 'exports', 25);
        insert into trade_long values ('Feb-2025', 'imports', 1000);
        "#,
    );
    let aliases = IndicatorAliases::new(&["Exports"]);
    let result = Aggregator::new(&db)
        .aggregate(&groups(&["trade"]), &aliases, &FilterSet::new().with_year(2025), MatchMode::Any)
        .unwrap();
    assert_eq!(result.total, Some(125.0));
}

#[test]
fn nothing_matching_is_not_found() {
    let db = two_wide_tables();
    let aliases = IndicatorAliases::new(&["Tourist Arrivals"]);
    let result = Aggregator::new(&db)
        .aggregate(&groups(&["tourism"]), &aliases, &FilterSet::new(), MatchMode::Any)
        .unwrap();
    assert_eq!(result.total, None);
    assert!(!result.found());
    assert!(result.outcomes.is_empty());
    assert_eq!(result.value_or(42.0), 42.0);
}

#[test]
fn measured_zero_is_found() {
    let db = database(
        r#"
        create table employment_zero ("Male" real, "Female" real);
        insert into employment_zero values (0, 0);
        "#,
    );
    let result = employed(&Aggregator::new(&db), &FilterSet::new());
    assert_eq!(result.total, Some(0.0));
    assert!(result.found());
}

#[test]
fn filtered_out_table_does_not_contribute() {
    let db = two_wide_tables();
    let result = employed(&Aggregator::new(&db), &FilterSet::new().with_region("Midlands"));
    assert!(!result.found());
    assert!(result
        .outcomes
        .iter()
        .all(|o| matches!(o, TableOutcome::Skipped { reason: SkipReason::NoRows, .. })));
}

#[test]
fn failing_table_is_skipped_and_others_count() {
    let db = database(
        r#"
        create table employment_overflow ("Male" integer);
        insert into employment_overflow values (9223372036854775807);
        insert into employment_overflow values (1);
        create table employment_ok ("Male" integer, "Female" integer);
        insert into employment_ok values (10, 20);
        create table employment_notes ("Comment" text);
        "#,
    );
    let result = employed(&Aggregator::new(&db), &FilterSet::new());
    assert_eq!(result.total, Some(30.0));
    assert!(matches!(
        &result.outcomes[0],
        TableOutcome::Skipped { reason: SkipReason::QueryFailed(_), .. }
    ));
    assert!(matches!(
        &result.outcomes[2],
        TableOutcome::Skipped { reason: SkipReason::Unrecognized, .. }
    ));
}

#[test]
fn table_budget_caps_the_scan() {
    let db = two_wide_tables();
    let limits = Limits { max_tables: 1, time_budget: None };
    let agg = Aggregator::with_limits(&db, limits);
    let result = employed(&agg, &FilterSet::new().with_year(2025).with_region("Harare"));
    assert_eq!(result.total, Some(2500.0));
    assert!(matches!(
        &result.outcomes[1],
        TableOutcome::Skipped { reason: SkipReason::BudgetExhausted, .. }
    ));
}

#[test]
fn spent_time_budget_skips_everything() {
    let db = two_wide_tables();
    let limits = Limits { max_tables: 256, time_budget: Some(Duration::ZERO) };
    let result = employed(&Aggregator::with_limits(&db, limits), &FilterSet::new());
    assert!(!result.found());
    assert_eq!(result.outcomes.len(), 2);
}

#[test]
fn latest_takes_the_last_row_of_the_first_table() {
    let db = database(
        r#"
        create table cpi_annual ("Month" text, "Annual Inflation" real);
        insert into cpi_annual values ('2025-01', 10.5);
        insert into cpi_annual values ('2025-02', 11.0);
        insert into cpi_annual values ('2025-03', null);
        create table cpi_other ("Annual Inflation" real);
        insert into cpi_other values (99);
        "#,
    );
    let aliases = IndicatorAliases::new(&["Annual Inflation"]);
    let result = Aggregator::new(&db)
        .latest(&groups(&["cpi"]), &aliases, &FilterSet::new(), MatchMode::Any)
        .unwrap();
    assert_eq!(result.total, Some(11.0));
    assert_eq!(result.outcomes.len(), 1);
}

#[test]
fn breakdown_groups_by_category_largest_first() {
    let db = database(
        r#"
        create table employment_industry ("Industry" text, "Male" real, "Female" real);
        insert into employment_industry values ('Agriculture', 900, 1000);
        insert into employment_industry values ('Mining', 400, 50);
        insert into employment_industry values ('Services', 700, 750);
        create table labour_industry ("Industry" text, "Employed" real);
        insert into labour_industry values ('Mining', 100);
        "#,
    );
    let agg = Aggregator::new(&db);
    let series = agg
        .breakdown(
            &EMPLOYED.keyword_groups(),
            &EMPLOYED.indicator_aliases(),
            &["industry", "sector"],
            &FilterSet::new(),
            EMPLOYED.mode,
            2,
        )
        .unwrap();
    assert_eq!(series.labels(), vec!["Agriculture".to_string(), "Services".to_string()]);
    assert_eq!(series.values(), vec![1900.0, 1450.0]);

    let searched = agg
        .breakdown(
            &EMPLOYED.keyword_groups(),
            &EMPLOYED.indicator_aliases(),
            &["industry"],
            &FilterSet::new().with_search("min"),
            EMPLOYED.mode,
            10,
        )
        .unwrap();
    assert_eq!(searched.points, vec![("Mining".to_string(), 550.0)]);
}

#[test]
fn series_is_in_period_order_and_ignores_year() {
    let db = database(
        r#"
        create table gdp_provincial ("Date" real, "Province" text, "GDP" real);
        insert into gdp_provincial values (2021.0, 'Harare', 10);
        insert into gdp_provincial values (2021.0, 'Bulawayo', 5);
        insert into gdp_provincial values (2022.0, 'Harare', 12);
        insert into gdp_provincial values (2023.0, 'Harare', 14);
        "#,
    );
    let aliases = IndicatorAliases::new(&["GDP"]);
    let series = Aggregator::new(&db)
        .series(&groups(&["gdp"]), &aliases, &FilterSet::new().with_year(2022), MatchMode::Any, 2)
        .unwrap();
    assert_eq!(series.points, vec![("2022".to_string(), 12.0), ("2023".to_string(), 14.0)]);
}

#[test]
fn series_sorts_newest_first_storage_into_period_order() {
    let db = database(
        r#"
        create table gdp_long ("Date" integer, "indicator" text, "value" real);
        insert into gdp_long values (2025, 'GDP', 50);
        insert into gdp_long values (2023, 'GDP', 30);
        insert into gdp_long values (2024, 'GDP', 40);
        "#,
    );
    let aliases = IndicatorAliases::new(&["GDP"]);
    let series = Aggregator::new(&db)
        .series(&groups(&["gdp"]), &aliases, &FilterSet::new(), MatchMode::Any, 2)
        .unwrap();
    assert_eq!(series.points, vec![("2024".to_string(), 40.0), ("2025".to_string(), 50.0)]);
}

#[test]
fn month_periods_sort_by_year_then_month() {
    let db = database(
        r#"
        create table trade_monthly ("Period" text, "Exports" real);
        insert into trade_monthly values ('Mar-2025', 3);
        insert into trade_monthly values ('Jan-2025', 1);
        insert into trade_monthly values ('Dec-2024', 12);
        insert into trade_monthly values ('Feb-2025', 2);
        "#,
    );
    let aliases = IndicatorAliases::new(&["Exports"]);
    let series = Aggregator::new(&db)
        .series(&groups(&["trade"]), &aliases, &FilterSet::new(), MatchMode::Any, 12)
        .unwrap();
    assert_eq!(series.labels(), vec!["Dec-2024", "Jan-2025", "Feb-2025", "Mar-2025"]);
}

#[test]
fn employed_leaves_informal_and_unemployment_tables_alone() {
    let db = database(
        r#"
        create table employment_province ("Province" text, "Male" real, "Female" real);
        insert into employment_province values ('Harare', 1000, 1500);
        create table informal_employment_province ("Province" text, "Male" real, "Female" real);
        insert into informal_employment_province values ('Harare', 600, 400);
        create table unemployment_by_sex ("Province" text, "Male" real, "Female" real);
        insert into unemployment_by_sex values ('Harare', 100, 150);
        "#,
    );
    let agg = Aggregator::new(&db);
    let result = employed(&agg, &FilterSet::new());
    assert_eq!(result.total, Some(2500.0));
    assert_eq!(result.contributors(), vec!["employment_province"]);
    assert_eq!(result.outcomes.len(), 1);

    let informal = agg
        .aggregate(
            &INFORMAL_EMPLOYMENT.keyword_groups(),
            &INFORMAL_EMPLOYMENT.indicator_aliases(),
            &FilterSet::new(),
            INFORMAL_EMPLOYMENT.mode,
        )
        .unwrap();
    assert_eq!(informal.total, Some(1000.0));
}
