//! Purpose: Serialize a combined table as `<output_name>.csv`.
//! Exports: `write_table`, `output_path`.
//! Invariants: Header row first, no index column, `Missing` as an empty field.
//! Invariants: An existing file at the output path is replaced.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::debug;

use super::error::{Error, ErrorKind};
use super::table::Table;

pub fn output_path(outdir: &Path, output_name: &str) -> PathBuf {
    outdir.join(format!("{output_name}.csv"))
}

pub fn write_table(table: &Table, outdir: &Path, output_name: &str) -> Result<PathBuf, Error> {
    let path = output_path(outdir, output_name);
    let file = File::create(&path)
        .map_err(|err| Error::from_io(err, "failed to create output file").with_path(&path))?;
    write_csv(table, file).map_err(|err| err.with_path(&path))?;
    debug!(path = %path.display(), rows = table.row_count(), "wrote combined csv");
    Ok(path)
}

pub(crate) fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), Error> {
    // A zero-column table has no header line to write.
    if table.columns().is_empty() {
        return Ok(());
    }
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(table.columns()).map_err(write_error)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.as_field()))
            .map_err(write_error)?;
    }
    writer
        .flush()
        .map_err(|err| Error::from_io(err, "failed to flush output file"))
}

fn write_error(err: csv::Error) -> Error {
    let kind = if err.is_io_error() {
        ErrorKind::Io
    } else {
        ErrorKind::Internal
    };
    Error::new(kind)
        .with_message("failed to write csv record")
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::{write_csv, write_table};
    use crate::core::error::ErrorKind;
    use crate::core::loader::{load_table, read_table};
    use crate::core::table::{Cell, Table};

    #[test]
    fn missing_cells_are_written_as_empty_fields() {
        let table = Table::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![Cell::Text("1".into()), Cell::Missing],
                vec![Cell::Text("2".into()), Cell::Text("a, b".into())],
            ],
        );
        let mut out = Vec::new();
        write_csv(&table, &mut out).expect("write");
        assert_eq!(String::from_utf8(out).unwrap(), "id,name\n1,\n2,\"a, b\"\n");
    }

    #[test]
    fn written_table_reloads_identically() {
        let source = "id,name,note\n1,ann,\"multi\nline\"\n2,,\"quote \"\"x\"\"\"\n";
        let table = read_table(source.as_bytes()).expect("table");

        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_table(&table, temp.path(), "merged").expect("write");
        assert!(path.ends_with("merged.csv"));

        let reloaded = load_table(&path).expect("reload");
        assert_eq!(reloaded, table);
    }

    #[test]
    fn zero_column_table_writes_empty_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_table(&Table::default(), temp.path(), "empty").expect("write");
        assert_eq!(std::fs::read(&path).expect("read").len(), 0);
    }

    #[test]
    fn missing_output_dir_propagates() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = write_table(&Table::default(), &temp.path().join("nope"), "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
