//! Companion crate for `autocomplete-rs`: a naive baseline to compare the
//! index against, deterministic sample data, and criterion benchmarks.

pub mod flat_list;
pub mod sample;

pub use flat_list::{FlatList, FlatListError};
