use super::FieldType;
use compact_str::CompactString;

/// A coerced field value.
///
/// Ordering and hashing are derived so rows can be deduplicated and grouped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Str(CompactString),
}

impl Value {
    /// Coerce a raw fixed-width slice into a typed value.
    ///
    /// The slice is trimmed first and blank text becomes [`Value::Null`]. Integer fields accept
    /// an optionally signed base-10 number that fits the declared width; anything else becomes
    /// [`Value::Null`]. This function never fails.
    #[must_use]
    pub fn coerce(raw: &str, field_type: FieldType) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }

        let parsed = match field_type {
            FieldType::String => return Self::Str(CompactString::from(trimmed)),
            FieldType::Int8 => trimmed.parse::<i8>().ok().map(i64::from),
            FieldType::Int16 => trimmed.parse::<i16>().ok().map(i64::from),
            FieldType::Int32 => trimmed.parse::<i32>().ok().map(i64::from),
            FieldType::Int64 => trimmed.parse::<i64>().ok(),
        };

        parsed.map_or(Self::Null, Self::Int)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer narrowed to `T`, or `None` for nulls, strings and out-of-range values.
    #[must_use]
    pub fn as_int<T: TryFrom<i64>>(&self) -> Option<T> {
        self.as_i64().and_then(|v| T::try_from(v).ok())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_compact_str(&self) -> Option<&CompactString> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(CompactString::from(value))
    }
}
