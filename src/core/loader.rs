//! Purpose: Lazily load CSV files into `Table`s, one file per iteration step.
//! Exports: `TableLoader`, `load_table`, `read_table`.
//! Role: Both the census and the merge pass pull tables through this loader.
//! Invariants: Yields tables in the order of the given file names.
//! Invariants: Nothing is cached; each new loader re-reads storage.
//! Invariants: The first row is the header; wider-than-header rows are parse errors.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use super::error::{Error, ErrorKind};
use super::table::{Cell, Table};

pub struct TableLoader<'a> {
    dir: &'a Path,
    files: std::slice::Iter<'a, String>,
}

impl<'a> TableLoader<'a> {
    pub fn new(dir: &'a Path, files: &'a [String]) -> Self {
        Self {
            dir,
            files: files.iter(),
        }
    }
}

impl Iterator for TableLoader<'_> {
    type Item = Result<Table, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.files.next()?;
        Some(load_table(&self.dir.join(name)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

pub fn load_table(path: &Path) -> Result<Table, Error> {
    let file = File::open(path)
        .map_err(|err| Error::from_io(err, "failed to open csv file").with_path(path))?;
    let table = read_table(file).map_err(|err| err.with_path(path))?;
    debug!(
        path = %path.display(),
        columns = table.columns().len(),
        rows = table.row_count(),
        "loaded csv file"
    );
    Ok(table)
}

/// Parses CSV text from any reader. Errors carry no path; `load_table` adds it.
pub fn read_table<R: Read>(reader: R) -> Result<Table, Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|err| csv_error(err, "failed to read csv header"))?
        .clone();
    if headers.is_empty() {
        return Err(Error::new(ErrorKind::Parse).with_message("no columns to parse from file"));
    }
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => return Err(csv_error(err, "failed to parse csv row")),
        }
        if record.len() > columns.len() {
            let mut err = Error::new(ErrorKind::Parse).with_message(format!(
                "expected {} fields, saw {}",
                columns.len(),
                record.len()
            ));
            if let Some(position) = record.position() {
                err = err.with_line(position.line());
            }
            return Err(err);
        }
        rows.push(record.iter().map(Cell::from_field).collect());
    }

    Ok(Table::new(columns, rows))
}

fn csv_error(err: csv::Error, message: &str) -> Error {
    let kind = if err.is_io_error() {
        ErrorKind::Io
    } else {
        ErrorKind::Parse
    };
    let line = err.position().map(|position| position.line());
    let mut out = Error::new(kind).with_message(message).with_source(err);
    if let Some(line) = line {
        out = out.with_line(line);
    }
    out
}
