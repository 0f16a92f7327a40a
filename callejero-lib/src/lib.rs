#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for callejero
//!
//! This library consolidates all functionality for the callejero tool, which turns the
//! INE street directory (a fixed-width, Latin-1 encoded dataset republished twice a year)
//! into a read-only snapshot and answers address lookups against it.
//!
//! # Module Organization
//!
//! - [`layout`]: Field specifications, fixed-width decoding and value coercion
//! - [`entities`]: Per-entity parsers producing deduplicated tables
//! - [`snapshot`]: Binary table files, snapshot building, publication and loading
//! - [`archive`]: Archive discovery, download, extraction and the optional mirror
//! - [`query`]: Address lookups against a loaded snapshot
//! - [`reference`]: Constant region and province tables
//! - [`reports`]: Output of query results in multiple formats
//! - [`commands`]: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;
pub(crate) type HashSet<T> = std::collections::HashSet<T, rustc_hash::FxBuildHasher>;

#[must_use]
pub(crate) fn hash_map_with_capacity<K, V>(capacity: usize) -> HashMap<K, V> {
    HashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[must_use]
pub(crate) fn hash_set_with_capacity<T>(capacity: usize) -> HashSet<T> {
    HashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

pub mod archive;
pub mod entities;
pub mod layout;
pub mod progress;
pub mod query;
pub mod reference;
pub mod snapshot;

mod path_utils;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
