use chrono::{Datelike, NaiveDate};
use core::fmt::{Display, Formatter, Result as FmtResult};

/// A half-year publication period of the street directory (January or July).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u8,
}

impl Period {
    /// The period in effect on `date`: July from July onwards, January otherwise.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let month = if date.month() >= 7 { 7 } else { 1 };
        Self { year: date.year(), month }
    }

    /// The period published immediately before this one.
    #[must_use]
    pub const fn previous(self) -> Self {
        if self.month == 7 {
            Self { year: self.year, month: 1 }
        } else {
            Self {
                year: self.year - 1,
                month: 7,
            }
        }
    }

    /// Periods worth probing on `date`, most recent first.
    #[must_use]
    pub fn candidates(date: NaiveDate) -> [Self; 2] {
        let current = Self::containing(date);
        [current, current.previous()]
    }

    /// Parses an `MMYYYY` code.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let month = code[..2].parse().ok()?;
        let year = code[2..].parse().ok()?;
        matches!(month, 1 | 7).then_some(Self { year, month })
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// The `MMYYYY` code, e.g. `072025`.
    #[must_use]
    pub fn code(self) -> String {
        self.to_string()
    }

    /// File name of the archive published for this period.
    #[must_use]
    pub fn archive_name(self) -> String {
        format!("caj_esp_{}.zip", self.code())
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:02}{:04}", self.month, self.year)
    }
}
