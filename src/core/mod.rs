// Core modules implementing discovery, loading, census, merging, and output.
pub mod census;
pub mod describe;
pub mod discover;
pub mod error;
pub mod loader;
pub mod merge;
pub mod summary;
pub mod table;
pub mod writer;
