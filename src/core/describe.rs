//! Purpose: Describe a combined table column by column before it is written.
//! Exports: `Dtype`, `ColumnDescription`, `TableDescription`, `describe`.
//! Invariants: Dtype inference looks only at non-missing cells.
use std::fmt;

use super::table::Table;
use crate::text_table::render_table;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Dtype {
    Int64,
    Float64,
    Bool,
    Object,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dtype::Int64 => "int64",
            Dtype::Float64 => "float64",
            Dtype::Bool => "bool",
            Dtype::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub non_null: usize,
    pub dtype: Dtype,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableDescription {
    pub rows: usize,
    pub columns: Vec<ColumnDescription>,
}

pub fn describe(table: &Table) -> TableDescription {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<&str> = table
                .rows()
                .iter()
                .filter_map(|row| row[idx].as_str())
                .collect();
            ColumnDescription {
                name: name.clone(),
                non_null: values.len(),
                dtype: infer_dtype(&values, table.row_count()),
            }
        })
        .collect();
    TableDescription {
        rows: table.row_count(),
        columns,
    }
}

// Integers with gaps, like all-missing columns, read back as floats.
fn infer_dtype(values: &[&str], rows: usize) -> Dtype {
    let complete = !values.is_empty() && values.len() == rows;
    if complete && values.iter().all(|v| v.trim().parse::<i64>().is_ok()) {
        Dtype::Int64
    } else if values.iter().all(|v| v.trim().parse::<f64>().is_ok()) {
        Dtype::Float64
    } else if values.iter().all(|v| matches!(*v, "True" | "False")) {
        Dtype::Bool
    } else {
        Dtype::Object
    }
}

impl TableDescription {
    pub fn render_human(&self) -> String {
        let mut lines = Vec::new();
        if self.rows == 0 {
            lines.push("RangeIndex: 0 entries".to_string());
        } else {
            lines.push(format!(
                "RangeIndex: {} entries, 0 to {}",
                self.rows,
                self.rows - 1
            ));
        }
        lines.push(format!(
            "Data columns (total {} columns):",
            self.columns.len()
        ));
        let rows: Vec<Vec<String>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                vec![
                    idx.to_string(),
                    column.name.clone(),
                    format!("{} non-null", column.non_null),
                    column.dtype.to_string(),
                ]
            })
            .collect();
        if !rows.is_empty() {
            lines.push(render_table(&["#", "Column", "Non-Null Count", "Dtype"], &rows));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::{Dtype, describe, infer_dtype};
    use crate::core::loader::read_table;

    #[test]
    fn dtype_inference() {
        assert_eq!(infer_dtype(&["1", "-2", "30"], 3), Dtype::Int64);
        assert_eq!(infer_dtype(&["1", "2.5"], 2), Dtype::Float64);
        assert_eq!(infer_dtype(&[], 4), Dtype::Float64);
        assert_eq!(infer_dtype(&["True", "False"], 2), Dtype::Bool);
        assert_eq!(infer_dtype(&["1", "x"], 2), Dtype::Object);
    }

    #[test]
    fn counts_non_null_cells_per_column() {
        let table = read_table("id,name,email\n1,ann,\n2,,b@x\n3,,\n".as_bytes()).expect("table");
        let description = describe(&table);

        assert_eq!(description.rows, 3);
        let counts: Vec<_> = description
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.non_null, c.dtype))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("id", 3, Dtype::Int64),
                ("name", 1, Dtype::Object),
                ("email", 1, Dtype::Object),
            ]
        );

        let text = description.render_human();
        assert!(text.starts_with("RangeIndex: 3 entries, 0 to 2"));
        assert!(text.contains("Data columns (total 3 columns):"));
        assert!(text.contains("3 non-null"));
    }

    #[test]
    fn integer_column_with_gaps_is_float() {
        let table = read_table("id,score\n1,10\n2,\n3,30\n".as_bytes()).expect("table");
        let dtypes: Vec<_> = describe(&table).columns.iter().map(|c| c.dtype).collect();
        assert_eq!(dtypes, vec![Dtype::Int64, Dtype::Float64]);
    }

    #[test]
    fn empty_table_description() {
        let table = read_table("a\n".as_bytes()).expect("table");
        let text = describe(&table).render_human();
        assert!(text.starts_with("RangeIndex: 0 entries"));
        assert!(text.contains("0 non-null"));
    }
}
