//! Purpose: Count, per column name, how many input tables contain it.
//! Exports: `ColumnCensus`.
//! Role: First pass over the inputs; feeds the coverage summary.
//! Invariants: A table contributes at most one to any column's count.
//! Invariants: Keys keep first-seen order; counts are independent of table order.
use std::collections::{HashMap, HashSet};

use super::error::Error;
use super::table::Table;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnCensus {
    entries: Vec<(String, usize)>,
    tables: usize,
}

impl ColumnCensus {
    /// Folds a fallible table sequence; the first error aborts the census.
    pub fn from_tables<I>(tables: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Result<Table, Error>>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();
        let mut count = 0usize;

        for table in tables {
            let table = table?;
            count += 1;
            let mut seen = HashSet::new();
            for column in table.columns() {
                if !seen.insert(column.as_str()) {
                    continue;
                }
                match index.get(column) {
                    Some(&slot) => entries[slot].1 += 1,
                    None => {
                        index.insert(column.clone(), entries.len());
                        entries.push((column.clone(), 1));
                    }
                }
            }
        }

        Ok(Self {
            entries,
            tables: count,
        })
    }

    /// Number of tables folded into the census.
    pub fn tables(&self) -> usize {
        self.tables
    }

    pub fn count(&self, column: &str) -> usize {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
    }
}
