use statdash::layout::{detect, find_column, IndicatorAliases, Layout, LayoutKind};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn matching_columns_make_a_wide_table() {
    let aliases = IndicatorAliases::new(&["Male", "Female", "Employed"]);
    let layout = detect(&columns(&["Province", "Male", "Female", "Year"]), &aliases);
    assert_eq!(
        layout,
        Layout::Wide { columns: columns(&["Male", "Female"]) }
    );
    assert_eq!(layout.kind(), Some(LayoutKind::Wide));
}

#[test]
fn separators_do_not_hide_a_wide_column() {
    let aliases = IndicatorAliases::new(&["Total Exports"]);
    let layout = detect(&columns(&["Period", "Total.Exports", "Imports"]), &aliases);
    assert_eq!(layout, Layout::Wide { columns: columns(&["Total.Exports"]) });
}

#[test]
fn indicator_and_value_make_a_long_table() {
    let aliases = IndicatorAliases::new(&["Gdp At Market Prices Usd"]);
    let layout = detect(&columns(&["Date", "indicator", "value"]), &aliases);
    assert_eq!(
        layout,
        Layout::Long { indicator: "indicator".into(), value: "value".into() }
    );
}

#[test]
fn item_column_also_marks_a_long_table() {
    let aliases = IndicatorAliases::new(&["all items"]);
    let layout = detect(&columns(&["Category", "Item", "VALUE"]), &aliases);
    assert_eq!(layout, Layout::Long { indicator: "Item".into(), value: "VALUE".into() });
}

#[test]
fn wide_wins_over_long() {
    let aliases = IndicatorAliases::new(&["Male"]);
    let layout = detect(&columns(&["Indicator", "Value", "Male"]), &aliases);
    assert_eq!(layout.kind(), Some(LayoutKind::Wide));
}

#[test]
fn anything_else_is_unrecognized() {
    let aliases = IndicatorAliases::new(&["Male"]);
    assert_eq!(detect(&columns(&["Province", "Count"]), &aliases), Layout::Unrecognized);
    assert_eq!(detect(&[], &aliases), Layout::Unrecognized);
    assert_eq!(Layout::Unrecognized.kind(), None);
}

#[test]
fn column_lookup_follows_name_priority() {
    let cols = columns(&["Region", "Period", "Province", "YEAR"]);
    assert_eq!(find_column(&cols, &["province", "region"]).map(String::as_str), Some("Province"));
    assert_eq!(find_column(&cols, &["year", "date", "period"]).map(String::as_str), Some("YEAR"));
    assert_eq!(find_column(&cols, &["sex"]), None);
}
