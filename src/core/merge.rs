//! Purpose: Choose the output schema from coverage and stack tables onto it.
//! Exports: `Level`, `ColumnPolicy`, `MergePlan`, `concat_tables`.
//! Role: Second pass over the inputs; produces the combined table.
//! Invariants: Output rows follow input file order, then row order within a file.
//! Invariants: Cells for columns a source table lacks are `Missing`.
//! Invariants: Under `ColumnPolicy::Apply` the schema is exactly the columns meeting the level.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use super::error::{Error, ErrorKind};
use super::summary::CoverageSummary;
use super::table::{Cell, Table};

/// Minimum coverage fraction, validated to lie in [0.0, 1.0].
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Level(f64);

impl Level {
    pub const INTERSECTION: Level = Level(1.0);
    pub const UNION: Level = Level(0.0);

    pub fn new(value: f64) -> Result<Self, Error> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("level must be between 0.0 and 1.0, got {value}"))
                .with_hint("Use a fraction such as --level 0.5."));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }

    /// Printed label for the two named levels.
    pub fn label(self) -> Option<&'static str> {
        if self == Self::INTERSECTION {
            Some("column intersection")
        } else if self == Self::UNION {
            Some("column union")
        } else {
            None
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::INTERSECTION
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value = input.trim().parse::<f64>().map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid level `{input}`"))
                .with_hint("Use a fraction such as --level 0.5.")
                .with_source(err)
        })?;
        Level::new(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ColumnPolicy {
    /// Keep only columns whose coverage meets the level.
    #[default]
    Apply,
    /// Keep every column; the level is reported but not enforced.
    Informational,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergePlan {
    level: Level,
    schema: Vec<String>,
    dropped: Vec<String>,
}

impl MergePlan {
    pub fn new(summary: &CoverageSummary, level: Level, policy: ColumnPolicy) -> Self {
        let all = summary.all_columns();
        let schema = match policy {
            ColumnPolicy::Apply => summary.columns_at_least(level.value()),
            ColumnPolicy::Informational => all.clone(),
        };
        let kept: HashSet<&str> = schema.iter().map(String::as_str).collect();
        let dropped = all
            .iter()
            .filter(|column| !kept.contains(column.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        if schema.is_empty() {
            warn!(level = level.value(), "no column meets the coverage level");
        }
        debug!(kept = schema.len(), dropped = dropped.len(), ?policy, "planned merge schema");
        Self {
            level,
            schema,
            dropped,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }
}

/// Stacks tables onto `schema`, consuming them one at a time.
///
/// An empty schema yields an empty table: rows with no columns carry nothing.
pub fn concat_tables<I>(tables: I, schema: &[String]) -> Result<Table, Error>
where
    I: IntoIterator<Item = Result<Table, Error>>,
{
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for table in tables {
        let table = table?;
        if schema.is_empty() {
            continue;
        }
        let positions: HashMap<&str, usize> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();
        let projection: Vec<Option<usize>> = schema
            .iter()
            .map(|column| positions.get(column.as_str()).copied())
            .collect();

        rows.reserve(table.row_count());
        for row in table.into_rows() {
            let mut row: Vec<Option<Cell>> = row.into_iter().map(Some).collect();
            rows.push(
                projection
                    .iter()
                    .map(|slot| {
                        slot.and_then(|idx| row[idx].take())
                            .unwrap_or(Cell::Missing)
                    })
                    .collect(),
            );
        }
    }
    Ok(Table::new(schema.to_vec(), rows))
}

#[cfg(test)]
mod tests {
    use super::{ColumnPolicy, Level, MergePlan, concat_tables};
    use crate::core::census::ColumnCensus;
    use crate::core::error::ErrorKind;
    use crate::core::summary::CoverageSummary;
    use crate::core::table::{Cell, Table};

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Cell::from_field(v)).collect())
                .collect(),
        )
    }

    fn id_name_email() -> Vec<Table> {
        vec![
            table(&["id", "name"], &[&["1", "ann"]]),
            table(&["id", "email"], &[&["2", "b@x"], &["3", "c@x"]]),
        ]
    }

    fn plan(tables: &[Table], level: f64, policy: ColumnPolicy) -> MergePlan {
        let census = ColumnCensus::from_tables(tables.iter().cloned().map(Ok)).expect("census");
        let summary = CoverageSummary::new(&census, tables.len()).expect("summary");
        MergePlan::new(&summary, Level::new(level).expect("level"), policy)
    }

    #[test]
    fn level_parsing_rejects_out_of_range() {
        assert_eq!("0.5".parse::<Level>().expect("level").value(), 0.5);
        assert_eq!("1".parse::<Level>().expect("level"), Level::INTERSECTION);
        for bad in ["-0.1", "1.01", "NaN", "inf", "half"] {
            let err = bad.parse::<Level>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Usage, "{bad}");
        }
    }

    #[test]
    fn labels_only_for_named_levels() {
        assert_eq!(Level::new(1.0).unwrap().label(), Some("column intersection"));
        assert_eq!(Level::new(0.0).unwrap().label(), Some("column union"));
        assert_eq!(Level::new(0.5).unwrap().label(), None);
        assert_eq!(Level::default().percent(), 100.0);
    }

    #[test]
    fn intersection_keeps_only_shared_columns() {
        let tables = id_name_email();
        let plan = plan(&tables, 1.0, ColumnPolicy::Apply);
        assert_eq!(plan.schema(), ["id"]);
        assert_eq!(plan.dropped(), ["name", "email"]);

        let combined = concat_tables(tables.into_iter().map(Ok), plan.schema()).expect("concat");
        assert_eq!(combined.columns(), ["id"]);
        assert_eq!(
            combined.rows(),
            [vec![text("1")], vec![text("2")], vec![text("3")]]
        );
    }

    #[test]
    fn informational_policy_keeps_union_with_missing_cells() {
        let tables = id_name_email();
        let plan = plan(&tables, 1.0, ColumnPolicy::Informational);
        assert_eq!(plan.schema(), ["id", "name", "email"]);
        assert!(plan.dropped().is_empty());

        let combined = concat_tables(tables.into_iter().map(Ok), plan.schema()).expect("concat");
        assert_eq!(
            combined.rows(),
            [
                vec![text("1"), text("ann"), Cell::Missing],
                vec![text("2"), Cell::Missing, text("b@x")],
                vec![text("3"), Cell::Missing, text("c@x")],
            ]
        );
    }

    #[test]
    fn rounding_tie_decides_inclusion() {
        let mut tables = Vec::new();
        for idx in 0..8 {
            let columns: &[&str] = if idx < 5 { &["id", "flag"] } else { &["id"] };
            tables.push(table(columns, &[]));
        }

        let strict = plan(&tables, 0.63, ColumnPolicy::Apply);
        assert_eq!(strict.schema(), ["id"]);
        assert_eq!(strict.dropped(), ["flag"]);

        let at_tie = plan(&tables, 0.62, ColumnPolicy::Apply);
        assert_eq!(at_tie.schema(), ["id", "flag"]);
    }

    #[test]
    fn union_level_applies_as_full_union() {
        let tables = id_name_email();
        let applied = plan(&tables, 0.0, ColumnPolicy::Apply);
        let observed = plan(&tables, 0.0, ColumnPolicy::Informational);
        assert_eq!(applied.schema(), observed.schema());
    }

    #[test]
    fn row_count_is_sum_of_inputs_and_order_follows_files() {
        let tables = vec![
            table(&["id", "name"], &[&["1", "a"], &["2", "b"]]),
            table(&["id", "name"], &[&["3", "c"], &["4", "d"], &["5", "e"]]),
        ];
        let schema = vec!["id".to_string(), "name".to_string()];
        let combined = concat_tables(tables.into_iter().map(Ok), &schema).expect("concat");
        assert_eq!(combined.row_count(), 5);
        let ids: Vec<_> = combined
            .column("id")
            .expect("id")
            .map(|cell| cell.as_field().to_string())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn reordered_columns_are_aligned_by_name() {
        let tables = vec![
            table(&["a", "b"], &[&["1", "2"]]),
            table(&["b", "a"], &[&["4", "3"]]),
        ];
        let schema = vec!["a".to_string(), "b".to_string()];
        let combined = concat_tables(tables.into_iter().map(Ok), &schema).expect("concat");
        assert_eq!(combined.rows()[1], vec![text("3"), text("4")]);
    }

    #[test]
    fn empty_schema_yields_empty_table() {
        let tables = vec![table(&["a"], &[&["1"]]), table(&["b"], &[&["2"]])];
        let plan = plan(&tables, 1.0, ColumnPolicy::Apply);
        assert!(plan.schema().is_empty());

        let combined = concat_tables(tables.into_iter().map(Ok), plan.schema()).expect("concat");
        assert!(combined.columns().is_empty());
        assert_eq!(combined.row_count(), 0);
    }
}
