//! Command-line interface for callejero
//!
//! This module implements the CLI commands and ties the archive, snapshot, and query layers
//! together. It handles argument parsing, configuration, and output.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **build**: Find the newest archive, download and extract it, parse every source file,
//!   and publish a new snapshot. A directory of already extracted files can be given instead.
//! - **query**: Answer one lookup against the published snapshot
//! - **regions**, **provinces**: Print the static reference tables
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the matching
//! handler. Arguments shared by every command (configuration path, data directory, color,
//! and log level) live in [`common::GlobalArgs`].
//!
//! Query handlers print their records through `common::emit`, which also maps any outcome
//! other than found records to the process exit code:
//!
//! | Outcome        | Exit code |
//! |----------------|-----------|
//! | records found  | 0         |
//! | invalid input  | 2         |
//! | query too short| 3         |
//! | nothing found  | 4         |
//!
//! Any other failure ends the process with exit code 1.

mod build;
mod common;
mod config;
mod host;
mod init;
mod progress_reporter;
mod query;
mod run;
mod validate;

pub use config::Config;

pub use build::{BuildArgs, build};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use query::{ProvincesArgs, QueryArgs, QueryRequest, StreetsArgs, run_provinces, run_query, run_regions};
pub use run::run;
pub use validate::validate_config;
