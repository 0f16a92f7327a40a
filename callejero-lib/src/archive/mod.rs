//! Retrieval of the street directory archive.
//!
//! The archive is republished twice a year as `caj_esp_MMYYYY.zip`. Since the publication
//! date of the newest one is not known in advance, [`ArchiveSource::find_latest`] probes the
//! current half-year period and then the previous one. The archive is streamed to disk and
//! extracted with [`extract_archive`].
//!
//! An optional [`HttpMirror`] keeps a remote copy of the latest snapshot tagged with the
//! name of the archive it was built from, which lets a build be skipped when nothing changed.

mod channel_reader;
mod download;
mod extract;
mod mirror;
mod period;

pub use channel_reader::ChannelReader;
pub use download::ArchiveSource;
pub use extract::extract_archive;
pub use mirror::{HttpMirror, SOURCE_HEADER, pack_snapshot};
pub use period::Period;
