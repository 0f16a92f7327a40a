use crate::Result;
use encoding_rs::WINDOWS_1252;
use ohno::IntoAppError;
use std::borrow::Cow;
use std::io::BufRead;

/// One source line, decoded and stripped of its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub text: Cow<'a, str>,

    /// Set when at least one byte could not be mapped and was replaced by U+FFFD.
    pub had_errors: bool,
}

/// Reads Latin-1 / Windows-1252 lines from a buffered byte source.
///
/// Lines end at `\n`; any trailing run of `\r` and `\n` characters is removed. A final line
/// without a terminator is still returned.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub const fn new(reader: R) -> Self {
        Self { reader, buffer: Vec::new() }
    }

    /// Returns the next line, or `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<RawRecord<'_>>> {
        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .into_app_err("unable to read line from source file")?;

        if read == 0 {
            return Ok(None);
        }

        while let Some(b'\n' | b'\r') = self.buffer.last() {
            let _ = self.buffer.pop();
        }

        let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(&self.buffer);
        Ok(Some(RawRecord { text, had_errors }))
    }
}
