//! Binary table files and the serving snapshot.
//!
//! # Implementation Model
//!
//! A build parses every source file, writes one binary table per entity into the output
//! directory, then assembles a snapshot from the street and address tract tables:
//!
//! ```text
//! <snapshots_root>/
//!     CURRENT                 name of the published version
//!     build.lock              advisory lock held while a build runs
//!     <version>/
//!         VIAS.table
//!         TRAM.table
//!         manifest.json
//! ```
//!
//! A version directory is written under a hidden staging name and renamed into place once
//! complete. `CURRENT` is then replaced through a temporary file and a rename, so a reader
//! always sees either the old or the new version.
//!
//! Table files start with a fixed 24-byte header (magic, row count, creation time), followed
//! by the schema and the rows. Rows are read back through a memory map.

mod builder;
mod manifest;
mod row_reader;
mod row_writer;
mod rows;
#[expect(clippy::module_inception, reason = "The snapshot type lives in the snapshot module")]
mod snapshot;
mod source_files;
mod staging;
mod store;
mod table_file;

pub use builder::{BuildOptions, BuildReport, EntityReport, build_snapshot};
pub use manifest::{MANIFEST_FILE_NAME, Manifest};
pub use row_reader::RowReader;
pub use row_writer::RowWriter;
pub use rows::{StreetKey, StreetRow, TractRow};
pub use snapshot::Snapshot;
pub use source_files::locate_sources;
pub use staging::{BUILD_LOCK_FILE_NAME, BuildStage};
pub use store::{CURRENT_FILE_NAME, SnapshotStore, list_versions, prune_versions, read_current_version, write_current_version};
pub use table_file::{RowIter, TABLE_HEADER_SIZE, TableFile, write_table};
