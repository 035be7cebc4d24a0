//! Purpose: Turn a column census into per-column coverage fractions.
//! Exports: `CoverageRow`, `CoverageSummary`, `coverage_fraction`.
//! Role: Read-only report consumed by the merge policy and printed on request.
//! Invariants: fraction = round(count / total_files, 2) and lies in [0.0, 1.0].
//! Invariants: Row order follows census key order.
use serde::Serialize;
use serde_json::{Value, json};

use super::census::ColumnCensus;
use super::error::{Error, ErrorKind};
use crate::text_table::render_table;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoverageRow {
    pub column: String,
    pub count_files: usize,
    pub pct_contains_col: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoverageSummary {
    total_files: usize,
    rows: Vec<CoverageRow>,
}

/// Rounds the exact quotient to two decimals; exact ties go to even (1/8 -> 0.12).
pub fn coverage_fraction(count: usize, total_files: usize) -> f64 {
    let fraction = count as f64 / total_files as f64;
    format!("{fraction:.2}").parse().unwrap_or(fraction)
}

impl CoverageSummary {
    pub fn new(census: &ColumnCensus, total_files: usize) -> Result<Self, Error> {
        if total_files == 0 {
            return Err(Error::new(ErrorKind::Internal)
                .with_message("coverage summary needs at least one input file"));
        }
        let rows = census
            .iter()
            .map(|(column, count)| CoverageRow {
                column: column.to_string(),
                count_files: count,
                pct_contains_col: coverage_fraction(count, total_files),
            })
            .collect();
        Ok(Self { total_files, rows })
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn rows(&self) -> &[CoverageRow] {
        &self.rows
    }

    pub fn fraction(&self, column: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.column == column)
            .map(|row| row.pct_contains_col)
    }

    /// Columns whose fraction meets `level`, in census order.
    pub fn columns_at_least(&self, level: f64) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.pct_contains_col >= level)
            .map(|row| row.column.clone())
            .collect()
    }

    pub fn all_columns(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.column.clone()).collect()
    }

    pub fn render_human(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.column.clone(),
                    row.count_files.to_string(),
                    format!("{:.2}", row.pct_contains_col),
                ]
            })
            .collect();
        render_table(&["COLUMN", "COUNT_FILES", "PCT_CONTAINS_COL"], &rows)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "total_files": self.total_files,
            "columns": self.rows,
        })
    }
}
