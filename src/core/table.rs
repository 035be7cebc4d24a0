//! Purpose: In-memory tabular model shared by loading, merging, and writing.
//! Exports: `Cell`, `Table`.
//! Role: Plain data; no I/O happens here.
//! Invariants: Every row holds exactly one cell per column.
//! Invariants: Column names within one table are unique.
use std::collections::HashSet;

/// One scalar value. Field text is kept verbatim so values survive a round-trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Missing,
}

impl Cell {
    /// An empty CSV field loads as `Missing`.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(field.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            Cell::Missing => None,
        }
    }

    /// Field text as written to CSV.
    pub fn as_field(&self) -> &str {
        self.as_str().unwrap_or("")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Builds a table, making duplicate column names unique (`x`, `x.1`, `x.2`).
    /// Rows shorter than the header are padded with `Missing`.
    ///
    /// Callers are responsible for rejecting rows wider than the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let columns = dedupe_column_names(columns);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }
}

fn dedupe_column_names(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(columns.len());
    let mut names = Vec::with_capacity(columns.len());
    for name in columns {
        let mut candidate = name.clone();
        let mut suffix = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::{Cell, Table};

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    #[test]
    fn empty_field_is_missing() {
        assert_eq!(Cell::from_field(""), Cell::Missing);
        assert_eq!(Cell::from_field("0"), text("0"));
        assert_eq!(Cell::Missing.as_field(), "");
    }

    #[test]
    fn duplicate_headers_get_numeric_suffixes() {
        let table = Table::new(
            vec!["a".into(), "b".into(), "a".into(), "a".into(), "a.1".into()],
            Vec::new(),
        );
        assert_eq!(table.columns(), ["a", "b", "a.1", "a.2", "a.1.1"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = Table::new(
            vec!["id".into(), "name".into()],
            vec![vec![text("1")], vec![text("2"), text("bo")]],
        );
        assert_eq!(table.rows()[0], vec![text("1"), Cell::Missing]);
        let names: Vec<_> = table.column("name").expect("column").collect();
        assert_eq!(names, vec![&Cell::Missing, &text("bo")]);
        assert!(table.column("email").is_none());
    }
}
