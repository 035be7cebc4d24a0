//! Purpose: Validate input/output directories and list candidate CSV files.
//! Exports: `DirRole`, `ensure_directory`, `discover_files`, `CSV_EXTENSION`.
//! Invariants: Listing order is the directory's own order; nothing is sorted.
//! Invariants: Extension matching is exact and case-sensitive on the last dot suffix.
use std::path::Path;

use tracing::debug;

use super::error::{Error, ErrorKind};

pub const CSV_EXTENSION: &str = "csv";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DirRole {
    Input,
    Output,
}

impl DirRole {
    fn not_a_directory_message(self) -> &'static str {
        match self {
            DirRole::Input => "input path is not a directory",
            DirRole::Output => "output dir is not a directory",
        }
    }
}

pub fn ensure_directory(path: &Path, role: DirRole) -> Result<(), Error> {
    if path.is_dir() {
        return Ok(());
    }
    Err(Error::new(ErrorKind::NotADirectory)
        .with_message(role.not_a_directory_message())
        .with_path(path))
}

/// Returns file names in `dir` whose final dot-delimited suffix equals `extension`.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<String>, Error> {
    let entries = std::fs::read_dir(dir).map_err(|err| {
        Error::from_io(err, "failed to read input directory").with_path(dir)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            Error::from_io(err, "failed to read input directory entry").with_path(dir)
        })?;
        let Ok(name) = entry.file_name().into_string() else {
            debug!(path = %entry.path().display(), "skipping non-utf8 file name");
            continue;
        };
        if has_extension(&name, extension) {
            files.push(name);
        }
    }
    debug!(count = files.len(), dir = %dir.display(), "discovered input files");
    Ok(files)
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.rsplit('.').next() == Some(extension)
}
