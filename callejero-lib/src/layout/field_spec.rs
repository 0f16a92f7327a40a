use strum::{Display, EnumString, IntoStaticStr};

/// Semantic type of a fixed-width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
}

impl FieldType {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::String)
    }

    /// Stable one-byte tag used in persisted table schemas.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::String => 0,
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 3,
            Self::Int64 => 4,
        }
    }

    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::String),
            1 => Some(Self::Int8),
            2 => Some(Self::Int16),
            3 => Some(Self::Int32),
            4 => Some(Self::Int64),
            _ => None,
        }
    }
}

/// A named `[start, end)` character range within a fixed-width record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub field_type: FieldType,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str, start: usize, end: usize, field_type: FieldType) -> Self {
        Self {
            name,
            start,
            end,
            field_type,
        }
    }

    #[must_use]
    pub const fn string(name: &'static str, start: usize, end: usize) -> Self {
        Self::new(name, start, end, FieldType::String)
    }

    #[must_use]
    pub const fn int8(name: &'static str, start: usize, end: usize) -> Self {
        Self::new(name, start, end, FieldType::Int8)
    }

    #[must_use]
    pub const fn int16(name: &'static str, start: usize, end: usize) -> Self {
        Self::new(name, start, end, FieldType::Int16)
    }

    #[must_use]
    pub const fn int32(name: &'static str, start: usize, end: usize) -> Self {
        Self::new(name, start, end, FieldType::Int32)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.end - self.start
    }
}

/// An ordered list of field specs describing one entity kind.
///
/// Offsets need not be contiguous, and two fields may cover the same characters.
#[derive(Debug)]
pub struct Layout {
    name: &'static str,
    fields: &'static [FieldSpec],
    max_end: usize,
}

impl Layout {
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        let mut max_end = 0;
        let mut i = 0;
        while i < fields.len() {
            if fields[i].end > max_end {
                max_end = fields[i].end;
            }
            i += 1;
        }

        Self { name, fields, max_end }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// The largest end offset declared by any field; lines are padded to at least this length.
    #[must_use]
    pub const fn max_end(&self) -> usize {
        self.max_end
    }

    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
