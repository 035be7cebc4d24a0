//! Purpose: Library crate backing the `concatcsv` CLI and its tests.
//! Exports: `core` (discovery, loading, census, merge, output), `config`, `notice`, `text_table`.
//! Role: Keeps the pipeline stages testable without spawning the binary.
//! Invariants: Stages take explicit inputs and return values; no hidden global state.
pub mod config;
pub mod core;
pub mod notice;
pub mod text_table;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
