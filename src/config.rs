//! Purpose: Resolved settings for one merge run.
//! Exports: `MergeConfig`.
//! Role: Built from CLI arguments; the pipeline reads nothing else.
use std::path::PathBuf;

use crate::core::discover::CSV_EXTENSION;
use crate::core::merge::{ColumnPolicy, Level};

#[derive(Clone, Debug, PartialEq)]
pub struct MergeConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub extension: String,
    pub level: Level,
    pub policy: ColumnPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            output_name: "merged".to_string(),
            extension: CSV_EXTENSION.to_string(),
            level: Level::default(),
            policy: ColumnPolicy::default(),
        }
    }
}
