//! Table catalog.
//!
//! Enumerates the tables present in storage and their columns. Nothing is
//! cached: uploads may add tables between two requests, so every call reads
//! the storage metadata afresh.

use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::Result;
use crate::persist::{quote_identifier, Database};

/// A table name with its ordered column names, derived fresh on every scan.
/// The column list is empty when the table could not be introspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<String>,
}
impl TableDescriptor {
    pub fn can_participate(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// All table identifiers in storage enumeration order.
///
/// This is the one catalog call that fails loudly: if the store cannot be
/// enumerated at all, nothing downstream can degrade gracefully.
pub fn list_tables(db: &Database) -> Result<Vec<String>> {
    db.persistor()?.enumerate_tables()
}

/// Column names of `table`, or an empty list when it is missing or unreadable.
pub fn columns_of(db: &Database, table: &str) -> Vec<String> {
    let persistor = match db.persistor() {
        Ok(persistor) => persistor,
        Err(e) => {
            debug!(table, error = %e, "storage handle unavailable for introspection");
            return Vec::new();
        }
    };
    match persistor.describe_columns(table) {
        Ok(columns) => columns,
        Err(e) => {
            debug!(table, error = %e, "table cannot be introspected");
            Vec::new()
        }
    }
}

pub fn describe(db: &Database) -> Result<Vec<TableDescriptor>> {
    let descriptors = list_tables(db)?
        .into_iter()
        .map(|name| {
            let columns = columns_of(db, &name);
            TableDescriptor { name, columns }
        })
        .collect();
    Ok(descriptors)
}

/// Distinct values found under any column named exactly like one of
/// `column_hints`, across every table (or only those whose name matches
/// `table_pattern`). Values are trimmed, empty ones dropped, result sorted.
pub fn distinct_values(
    db: &Database,
    column_hints: &[&str],
    table_pattern: Option<&Regex>,
) -> Result<Vec<String>> {
    let mut values = BTreeSet::new();
    for table in list_tables(db)? {
        if let Some(pattern) = table_pattern {
            if !pattern.is_match(&table) {
                continue;
            }
        }
        let columns = columns_of(db, &table);
        for hint in column_hints {
            if !columns.iter().any(|c| c == hint) {
                continue;
            }
            let column = quote_identifier(hint);
            let sql = format!(
                "select distinct {column} from {} where {column} is not null",
                quote_identifier(&table)
            );
            let rows = db.persistor()?.execute_rows(&sql, &[]);
            match rows {
                Ok(rows) => {
                    values.extend(
                        rows.iter().filter_map(|row| row.first().and_then(|c| c.label())),
                    );
                }
                Err(e) => debug!(table, column = hint, error = %e, "distinct scan skipped"),
            }
        }
    }
    Ok(values.into_iter().collect())
}
