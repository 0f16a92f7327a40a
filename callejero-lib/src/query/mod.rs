//! Address lookups against a loaded snapshot.
//!
//! # Implementation Model
//!
//! [`QueryEngine`] borrows one immutable [`Snapshot`](crate::snapshot::Snapshot) and answers
//! each request by walking the snapshot indexes. Nothing is cached between requests.
//!
//! Every operation returns a [`QueryOutcome`]. Malformed input, inputs too short to answer
//! and empty results are outcomes, not errors, so callers can tell them apart cheaply.
//! Found records are deduplicated and sorted before they are returned.
//!
//! Region and province listings are served from [`reference`](crate::reference) and do not
//! need a snapshot.

mod engine;
mod outcome;
mod postal_code;
mod records;
mod title_case;

pub use engine::{MIN_STREET_NAME_CHARS, QueryEngine, StreetScope, list_provinces, list_regions};
pub use outcome::QueryOutcome;
pub use postal_code::{MIN_POSTAL_PREFIX_DIGITS, POSTAL_CODE_DIGITS, PostalCodeQuery};
pub use records::{Locality, PopulationUnit, Record, StreetMatch, UnitLocality};
pub use title_case::title_case;
