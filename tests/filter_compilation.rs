use statdash::filter::{compile, FilterSet, Gender};
use statdash::layout::{detect, IndicatorAliases, LayoutKind};
use statdash::persist::{Database, PersistenceMode};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn setup() -> Database {
    let db = Database::new(PersistenceMode::InMemory).unwrap();
    db.execute_batch(
        r#"
        create table trade_monthly ("Period" text, "Province" text, "Exports" real);
        insert into trade_monthly values ('Jan-2025', 'harare', 10);
        insert into trade_monthly values ('Feb-2025', 'HARARE ', 20);
        insert into trade_monthly values ('Dec-2024', 'harare', 40);
        insert into trade_monthly values ('2025-03', 'Bulawayo', 80);
        insert into trade_monthly values ('2025.0', 'Bulawayo', 160);
        "#,
    )
    .unwrap();
    db
}

fn filtered_sum(db: &Database, filters: &FilterSet) -> Option<f64> {
    let cols = columns(&["Period", "Province", "Exports"]);
    let aliases = IndicatorAliases::new(&["Exports"]);
    let layout = detect(&cols, &aliases);
    let compiled = compile(&cols, &layout, &aliases, filters).expect("compiles");
    let sql = format!(
        "select sum({}) from trade_monthly{}",
        compiled.value_expr,
        compiled.predicate.where_clause()
    );
    db.persistor().unwrap().execute_scalar(&sql, compiled.predicate.params()).unwrap()
}

#[test]
fn year_matches_composite_period_strings() {
    let db = setup();
    assert_eq!(filtered_sum(&db, &FilterSet::new().with_year(2025)), Some(270.0));
    assert_eq!(filtered_sum(&db, &FilterSet::new().with_year(2024)), Some(40.0));
}

#[test]
fn region_is_trimmed_and_case_insensitive() {
    let db = setup();
    assert_eq!(filtered_sum(&db, &FilterSet::new().with_region(" Harare ")), Some(70.0));
    assert_eq!(
        filtered_sum(&db, &FilterSet::new().with_region("harare").with_year(2025)),
        Some(30.0)
    );
}

#[test]
fn all_region_is_no_filter() {
    let db = setup();
    assert_eq!(filtered_sum(&db, &FilterSet::new().with_region("All")), Some(310.0));
}

#[test]
fn no_surviving_rows_is_null() {
    let db = setup();
    assert_eq!(filtered_sum(&db, &FilterSet::new().with_year(1999)), None);
}

#[test]
fn numeric_year_column_matches_by_equality() {
    let db = Database::new(PersistenceMode::InMemory).unwrap();
    db.execute_batch(
        r#"
        create table gdp_provincial ("Date" real, "GDP" real);
        insert into gdp_provincial values (2025.0, 5);
        insert into gdp_provincial values (2024.0, 7);
        insert into gdp_provincial values (12025, 100);
        "#,
    )
    .unwrap();
    let cols = columns(&["Date", "GDP"]);
    let aliases = IndicatorAliases::new(&["GDP"]);
    let layout = detect(&cols, &aliases);
    let compiled = compile(&cols, &layout, &aliases, &FilterSet::new().with_year(2025)).unwrap();
    let sql = format!(
        "select sum({}) from gdp_provincial{}",
        compiled.value_expr,
        compiled.predicate.where_clause()
    );
    let total = db.persistor().unwrap().execute_scalar(&sql, compiled.predicate.params()).unwrap();
    assert_eq!(total, Some(5.0));
}

#[test]
fn long_tables_constrain_the_indicator_cell() {
    let cols = columns(&["Date", "indicator", "value"]);
    let aliases = IndicatorAliases::new(&["Gdp_At_Market_Prices_Usd", "GDP"]);
    let compiled = compile(&cols, &detect(&cols, &aliases), &aliases, &FilterSet::new()).unwrap();
    assert_eq!(compiled.layout, LayoutKind::Long);
    assert_eq!(compiled.value_columns, vec!["value".to_string()]);
    assert_eq!(compiled.predicate.clauses().len(), 1);
    assert_eq!(compiled.predicate.params().len(), 2);
}

#[test]
fn gender_selects_wide_columns() {
    let cols = columns(&["Province", "Male", "Female"]);
    let aliases = IndicatorAliases::new(&["Male", "Female"]);
    let layout = detect(&cols, &aliases);
    let filters = FilterSet::new().with_gender(Gender::Female);
    let compiled = compile(&cols, &layout, &aliases, &filters).unwrap();
    assert_eq!(compiled.value_columns, vec!["Female".to_string()]);
    assert_eq!(compiled.value_expr, "ifnull(\"Female\", 0)");
}

#[test]
fn gender_column_filters_rows() {
    let cols = columns(&["Sex", "Employed"]);
    let aliases = IndicatorAliases::new(&["Employed"]);
    let layout = detect(&cols, &aliases);
    let filters = FilterSet::new().with_gender(Gender::Male);
    let compiled = compile(&cols, &layout, &aliases, &filters).unwrap();
    assert_eq!(
        compiled.predicate.clauses(),
        &["lower(trim(cast(\"Sex\" as text))) = ?".to_string()]
    );
}

#[test]
fn ungendered_split_cannot_serve_a_gender() {
    let cols = columns(&["Male Youth Neet", "Youth Neet"]);
    let aliases = IndicatorAliases::new(&["Male Youth Neet", "Youth Neet"]);
    let layout = detect(&cols, &aliases);
    let filters = FilterSet::new().with_gender(Gender::Female);
    assert!(compile(&cols, &layout, &aliases, &filters).is_none());
}

#[test]
fn hostile_values_stay_parameters() {
    let db = setup();
    let filters = FilterSet::new().with_region("x' or '1'='1");
    assert_eq!(filtered_sum(&db, &filters), None);
}

#[test]
fn long_indicator_cells_collapse_inner_whitespace() {
    let db = Database::new(PersistenceMode::InMemory).unwrap();
    db.execute_batch(
        "create table gdp_long (\"Date\" integer, \"indicator\" text, \"value\" real);
         insert into gdp_long values (2025, 'Gdp  At Market Prices Usd', 1);
         insert into gdp_long values (2025, 'gdp_at_market__prices_usd', 2);
         insert into gdp_long values (2025, ' Gdp At\tMarket   Prices Usd ', 4);
         insert into gdp_long values (2025, 'Gdp At Market Prices', 8);",
    )
    .unwrap();
    let cols = columns(&["Date", "indicator", "value"]);
    let aliases = IndicatorAliases::new(&["Gdp At Market Prices Usd"]);
    let compiled = compile(&cols, &detect(&cols, &aliases), &aliases, &FilterSet::new()).unwrap();
    let sql = format!(
        "select sum({}) from gdp_long{}",
        compiled.value_expr,
        compiled.predicate.where_clause()
    );
    let total = db.persistor().unwrap().execute_scalar(&sql, compiled.predicate.params()).unwrap();
    assert_eq!(total, Some(7.0));
}
