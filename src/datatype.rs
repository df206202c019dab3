// used when reading cells back from row queries
use rusqlite::types::{FromSql, FromSqlResult, ValueRef};

// used to print out readable forms of a cell
use std::fmt;

/// A single cell as SQLite handed it back. Uploaded tables carry no reliable
/// column types, so the same logical field may arrive as an integer, a real
/// or a string depending on the table it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl FromSql for Cell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        })
    }
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric reading of the cell. Text is accepted when it parses as a
    /// number after trimming and dropping thousands separators.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(f) if f.is_finite() => Some(*f),
            Cell::Text(t) => {
                t.trim().replace(',', "").parse::<f64>().ok().filter(|f| f.is_finite())
            }
            _ => None,
        }
    }

    /// Display label of the cell, used for category and period keys.
    /// Whole reals print without a fraction so that a `Date` column stored
    /// as `2025.0` labels the same as an integer `2025`.
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Null | Cell::Blob(_) => None,
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Real(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{f:.0}"))
            }
            Cell::Real(f) => Some(f.to_string()),
            Cell::Text(t) => {
                let trimmed = t.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "null"),
            Cell::Blob(b) => write!(f, "<{} bytes>", b.len()),
            other => write!(f, "{}", other.label().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_is_read_as_number() {
        assert_eq!(Cell::Text(" 1,250.5 ".into()).as_f64(), Some(1250.5));
        assert_eq!(Cell::Text("n/a".into()).as_f64(), None);
        assert_eq!(Cell::Null.as_f64(), None);
    }

    #[test]
    fn whole_reals_label_like_integers() {
        assert_eq!(Cell::Real(2025.0).label().as_deref(), Some("2025"));
        assert_eq!(Cell::Integer(2025).label().as_deref(), Some("2025"));
        assert_eq!(Cell::Real(2.5).label().as_deref(), Some("2.5"));
        assert_eq!(Cell::Text("   ".into()).label(), None);
    }
}
