// used for persistence
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::datatype::Cell;
use crate::error::{Result, StatdashError};

/// Where the statistics live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}
impl PersistenceMode {
    /// `:memory:` selects the in-memory mode, anything else is a file path.
    pub fn from_path(path: &str) -> Self {
        if path == ":memory:" {
            PersistenceMode::InMemory
        } else {
            PersistenceMode::File(path.to_string())
        }
    }
}

/// Double-quote an identifier, doubling any embedded quotes. Table and column
/// names come from uploaded spreadsheets and may contain anything.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// ------------- Persistence -------------
/// Owns the connection and implements the storage primitives the engine needs.
///
/// The per-table primitives return `rusqlite::Result` so that callers can
/// decide whether a failure is fatal or only disqualifies one table.
pub struct Persistor {
    connection: Connection,
}
impl Persistor {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
    /// All user tables in storage enumeration order.
    pub fn enumerate_tables(&self) -> Result<Vec<String>> {
        let mut statement = self.connection.prepare(
            "
            select name
                from sqlite_master
                where type = 'table'
                and name not like 'sqlite!_%' escape '!'
        ",
        )?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
    pub fn describe_columns(&self, table: &str) -> rusqlite::Result<Vec<String>> {
        let statement = self
            .connection
            .prepare(&format!("select * from {} limit 0", quote_identifier(table)))?;
        Ok(statement.column_names().into_iter().map(String::from).collect())
    }
    /// First column of the first row as a number; `None` for SQL null or no rows.
    pub fn execute_scalar(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Option<f64>> {
        debug!(%sql, params = params.len(), "scalar query");
        let mut statement = self.connection.prepare(sql)?;
        let mut rows = statement.query(params_from_iter(params.iter()))?;
        let scalar = match rows.next()? {
            Some(row) => row.get::<_, Cell>(0)?.as_f64(),
            None => None,
        };
        Ok(scalar)
    }
    pub fn execute_rows(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Vec<Cell>>> {
        debug!(%sql, params = params.len(), "rows query");
        let mut statement = self.connection.prepare(sql)?;
        let width = statement.column_count();
        let rows = statement.query_map(params_from_iter(params.iter()), |row| {
            (0..width).map(|i| row.get::<_, Cell>(i)).collect::<rusqlite::Result<Vec<_>>>()
        })?;
        rows.collect()
    }
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql)?;
        Ok(())
    }
}

/// The explicit storage handle passed to every engine call.
///
/// The persistor sits behind a mutex, so schema-mutating work (creating
/// tables, adding columns) is serialized with everything else.
pub struct Database {
    persistor: Mutex<Persistor>,
    mode: PersistenceMode,
}
impl Database {
    pub fn new(mode: PersistenceMode) -> Result<Self> {
        let connection = match &mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => Connection::open(path)?,
        };
        debug!(?mode, "database opened");
        Ok(Self {
            persistor: Mutex::new(Persistor::new(connection)),
            mode,
        })
    }
    /// Wrap a connection opened elsewhere (tests, tooling).
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            persistor: Mutex::new(Persistor::new(connection)),
            mode: PersistenceMode::InMemory,
        }
    }
    pub fn mode(&self) -> &PersistenceMode {
        &self.mode
    }
    pub fn persistor(&self) -> Result<MutexGuard<'_, Persistor>> {
        self.persistor
            .lock()
            .map_err(|e| StatdashError::Lock(e.to_string()))
    }
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.persistor()?.execute_batch(sql)
    }
}
