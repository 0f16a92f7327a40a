use core::fmt::{Display, Formatter};

/// The result of an address query.
///
/// Bad input and empty results are ordinary outcomes rather than errors, so callers can map
/// each one to its own status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome<T> {
    /// One or more matching records.
    Found(Vec<T>),

    /// The request was well-formed but too short to be worth answering.
    NoContent,

    /// The request was valid and matched nothing.
    NotFound,

    /// The request was rejected before touching any data.
    InvalidInput(String),
}

impl<T> QueryOutcome<T> {
    /// Wraps collected records, turning an empty collection into [`QueryOutcome::NotFound`].
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let records: Vec<T> = records.into_iter().collect();
        if records.is_empty() { Self::NotFound } else { Self::Found(records) }
    }

    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// The matched records, or an empty slice for every other outcome.
    #[must_use]
    pub fn records(&self) -> &[T] {
        match self {
            Self::Found(records) => records,
            _ => &[],
        }
    }

    /// Process exit code reported by the command line for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Found(_) => 0,
            Self::InvalidInput(_) => 2,
            Self::NoContent => 3,
            Self::NotFound => 4,
        }
    }
}

impl<T> Display for QueryOutcome<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Found(records) => write!(f, "found {} record(s)", records.len()),
            Self::NoContent => write!(f, "query too short, nothing to return"),
            Self::NotFound => write!(f, "no matching records"),
            Self::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
        }
    }
}
