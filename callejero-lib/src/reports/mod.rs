//! Output of query results in multiple formats.
//!
//! Three generators are provided, each accessed through a `generate` function:
//! - **Console**: an aligned table with an optional bold header
//! - **CSV**: one header row followed by one row per record
//! - **JSON**: a pretty-printed array of objects
//!
//! All generators accept any slice of [`Record`](crate::query::Record) values, so the same
//! code prints localities, streets, population units, regions and provinces.

mod console;
mod csv;
mod json;

pub use console::generate as generate_console;
pub use csv::generate as generate_csv;
pub use json::generate as generate_json;
