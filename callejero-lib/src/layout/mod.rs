//! Fixed-width record layouts and decoding.
//!
//! The INE street directory ships one text file per entity kind. Every line of a file is a
//! record made of fields sitting at fixed character positions. This module describes those
//! positions declaratively and turns a line into typed values.
//!
//! # Implementation Model
//!
//! - A [`FieldSpec`] names a `[start, end)` character range and its [`FieldType`].
//! - A [`Layout`] is an ordered list of field specs for one entity kind. Layouts are plain
//!   constant values (see [`layouts`]), so adding an entity never requires a new type.
//! - [`decode_fixed_width`] slices a line according to a layout, padding short lines with
//!   spaces so that missing trailing characters decode to blanks instead of failing.
//! - [`Value::coerce`] trims each slice and converts it to a string, an integer, or null.
//!
//! Decoding and coercion never fail. Malformed input degrades to null values, which callers
//! count for auditing.

mod decoder;
mod field_spec;
pub mod layouts;
mod value;

pub use decoder::{DecodedField, decode_fixed_width};
pub use field_spec::{FieldSpec, FieldType, Layout};
pub use value::Value;
