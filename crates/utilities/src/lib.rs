#![deny(
    rust_2018_compatibility,
    rust_2018_idioms,
    nonstandard_style,
    unused,
    future_incompatible
)]
#![warn(clippy::doc_markdown)]

//! Occupancy data sets shared by tests and benches.
//!
//! Everything here produces plain `(LevelShapes, Vec<Vec<u8>>)` buffers instead of storage types, so that the storage crate's own
//! unit tests can use it without linking a second copy of that crate.

pub mod data_sets;
