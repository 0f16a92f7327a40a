//! Per-entity parsers.
//!
//! Each entity kind of the street directory (sections, pseudo-streets, streets, address
//! tracts and population units) is read from its own source file. A parser streams the file
//! line by line, decodes each line from the single-byte Western-European encoding, slices it
//! with the entity's [`Layout`](crate::layout::Layout), coerces the slices into values and
//! finally removes exact-duplicate rows.
//!
//! Parsing is lenient: unmappable bytes, short lines and unparsable numbers never fail a
//! file. They are tallied in [`DecodeStats`] and reported once per file.

mod entity_kind;
mod entity_table;
mod line_reader;
mod parser;

pub use entity_kind::EntityKind;
pub use entity_table::{DecodedRow, EntityTable};
pub use line_reader::{LineReader, RawRecord};
pub use parser::{DecodeStats, ParsedEntity, decode_row, parse_entity, parse_reader};
