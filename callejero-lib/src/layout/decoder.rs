use super::{FieldSpec, Layout};
use std::borrow::Cow;

/// One field sliced out of a record, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField<'a> {
    pub spec: &'static FieldSpec,
    pub text: Cow<'a, str>,
}

impl DecodedField<'_> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.spec.name
    }
}

/// Slice a record into the fields declared by `layout`, in layout order.
///
/// The line is treated as if right-padded with spaces to `layout.max_end()`, so a short line
/// yields blank trailing fields rather than an error. Positions count characters, which for
/// the single-byte source encoding are the original byte offsets.
#[must_use]
pub fn decode_fixed_width<'a>(line: &'a str, layout: &Layout) -> Vec<DecodedField<'a>> {
    let positions = CharPositions::new(line, layout.max_end());
    layout
        .fields()
        .iter()
        .map(|spec| DecodedField {
            spec,
            text: positions.slice(line, spec.start, spec.end),
        })
        .collect()
}

/// Maps character positions to byte offsets for the first `limit` characters of a line.
enum CharPositions {
    /// Pure ASCII lines: character position == byte offset.
    Ascii { len: usize },

    /// Byte offset of each character, followed by the offset just past the last one seen.
    Mapped(Vec<usize>),
}

impl CharPositions {
    fn new(line: &str, limit: usize) -> Self {
        if line.is_ascii() {
            return Self::Ascii { len: line.len() };
        }

        let mut offsets: Vec<usize> = line.char_indices().map(|(i, _)| i).take(limit + 1).collect();
        if offsets.len() <= limit {
            offsets.push(line.len());
        }
        Self::Mapped(offsets)
    }

    /// Number of characters available (capped at the limit for mapped lines).
    fn available(&self) -> usize {
        match self {
            Self::Ascii { len } => *len,
            Self::Mapped(offsets) => offsets.len() - 1,
        }
    }

    fn offset(&self, position: usize) -> usize {
        match self {
            Self::Ascii { .. } => position,
            Self::Mapped(offsets) => offsets[position],
        }
    }

    fn slice<'a>(&self, line: &'a str, start: usize, end: usize) -> Cow<'a, str> {
        let available = self.available();

        if end <= available {
            return Cow::Borrowed(&line[self.offset(start)..self.offset(end)]);
        }

        if start >= available {
            return Cow::Owned(" ".repeat(end - start));
        }

        let mut padded = String::with_capacity(end - start);
        padded.push_str(&line[self.offset(start)..self.offset(available)]);
        padded.extend(core::iter::repeat_n(' ', end - available));
        Cow::Owned(padded)
    }
}
