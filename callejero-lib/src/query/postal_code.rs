use super::QueryOutcome;

/// Number of digits in a Spanish postal code.
pub const POSTAL_CODE_DIGITS: usize = 5;

/// Shortest prefix that is expanded into a range.
pub const MIN_POSTAL_PREFIX_DIGITS: usize = 3;

/// A validated postal code request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostalCodeQuery {
    Exact(i32),

    /// Inclusive range produced by a 3 or 4 digit prefix.
    Range { low: i32, high: i32 },
}

impl PostalCodeQuery {
    /// Validates a postal code or postal code prefix.
    ///
    /// Non-digit input and input longer than five digits are invalid. Fewer than three digits
    /// yield [`QueryOutcome::NoContent`]. A prefix is right-padded with `0` for the lower bound
    /// and with `9` for the upper bound, so `"280"` covers `28000..=28099`.
    pub fn parse<T>(code: &str) -> Result<Self, QueryOutcome<T>> {
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryOutcome::invalid(format!("postal code '{code}' must contain only digits")));
        }

        if code.len() < MIN_POSTAL_PREFIX_DIGITS {
            return Err(QueryOutcome::NoContent);
        }

        if code.len() > POSTAL_CODE_DIGITS {
            return Err(QueryOutcome::invalid(format!(
                "postal code '{code}' has more than {POSTAL_CODE_DIGITS} digits"
            )));
        }

        if code.len() == POSTAL_CODE_DIGITS {
            return Ok(Self::Exact(parse_digits(code)));
        }

        let low = parse_digits(&format!("{code:0<width$}", width = POSTAL_CODE_DIGITS));
        let high = parse_digits(&format!("{code:9<width$}", width = POSTAL_CODE_DIGITS));
        Ok(Self::Range { low, high })
    }

    /// Parses an exact five digit postal code, as required to scope a street search.
    pub fn parse_exact<T>(code: &str) -> Result<i32, QueryOutcome<T>> {
        if code.len() != POSTAL_CODE_DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryOutcome::invalid(format!("postal code '{code}' must be exactly {POSTAL_CODE_DIGITS} digits")));
        }
        Ok(parse_digits(code))
    }

    #[must_use]
    pub const fn bounds(self) -> (i32, i32) {
        match self {
            Self::Exact(code) => (code, code),
            Self::Range { low, high } => (low, high),
        }
    }
}

/// Folds at most five ASCII digits into a number; never overflows.
fn parse_digits(digits: &str) -> i32 {
    digits.bytes().fold(0, |acc, b| acc * 10 + i32::from(b - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Result<PostalCodeQuery, QueryOutcome<()>> {
        PostalCodeQuery::parse(code)
    }

    #[test]
    fn test_exact_code() {
        assert_eq!(parse("28001"), Ok(PostalCodeQuery::Exact(28001)));
        assert_eq!(parse("01001"), Ok(PostalCodeQuery::Exact(1001)));
    }

    #[test]
    fn test_prefix_expansion() {
        assert_eq!(parse("280"), Ok(PostalCodeQuery::Range { low: 28000, high: 28099 }));
        assert_eq!(parse("2800"), Ok(PostalCodeQuery::Range { low: 28000, high: 28009 }));
        assert_eq!(parse("010"), Ok(PostalCodeQuery::Range { low: 1000, high: 1099 }));
    }

    #[test]
    fn test_short_prefix_is_no_content() {
        assert_eq!(parse("28"), Err(QueryOutcome::NoContent));
        assert_eq!(parse("2"), Err(QueryOutcome::NoContent));
    }

    #[test]
    fn test_invalid_input() {
        for code in ["2a8", "9x9", "", " 2800", "28-00", "280011", "２８００１"] {
            assert!(matches!(parse(code), Err(QueryOutcome::InvalidInput(_))), "{code:?}");
        }
    }

    #[test]
    fn test_parse_exact() {
        assert_eq!(PostalCodeQuery::parse_exact::<()>("28001"), Ok(28001));
        assert!(matches!(PostalCodeQuery::parse_exact::<()>("280"), Err(QueryOutcome::InvalidInput(_))));
        assert!(matches!(PostalCodeQuery::parse_exact::<()>("2800a"), Err(QueryOutcome::InvalidInput(_))));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(PostalCodeQuery::Exact(28001).bounds(), (28001, 28001));
        assert_eq!(PostalCodeQuery::Range { low: 28000, high: 28099 }.bounds(), (28000, 28099));
    }
}
