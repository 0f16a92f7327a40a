use super::row_writer::zigzag_decode;
use crate::Result;
use crate::layout::{FieldType, Value};
use compact_str::CompactString;
use ohno::{IntoAppError, app_err, bail};

/// Sequential decoder over the row section of a table file.
///
/// Every read is bounds-checked, so a truncated or corrupted file produces an error rather
/// than a panic.
#[derive(Debug)]
pub struct RowReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> RowReader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.position)
            .ok_or_else(|| app_err!("unexpected end of table data at offset {}", self.position))?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let remaining = self.data.get(self.position..).unwrap_or_default();
        let (value, bytes) =
            vlen::decode::<u64>(remaining).map_err(|_e| app_err!("invalid variable-length integer at offset {}", self.position))?;
        self.position += bytes;
        Ok(value)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(zigzag_decode(self.read_u64()?))
    }

    pub fn read_str(&mut self) -> Result<&'a str> {
        let len = usize::try_from(self.read_u64()?).into_app_err("string length does not fit in usize")?;
        let end = self
            .position
            .checked_add(len)
            .ok_or_else(|| app_err!("string length overflow at offset {}", self.position))?;
        let bytes = self
            .data
            .get(self.position..end)
            .ok_or_else(|| app_err!("string at offset {} runs past the end of the table", self.position))?;
        self.position = end;
        core::str::from_utf8(bytes).into_app_err("invalid UTF-8 in table string")
    }

    /// Reads a value written by [`RowWriter::write_value`](super::RowWriter::write_value).
    pub fn read_value(&mut self, field_type: FieldType) -> Result<Value> {
        match self.read_byte()? {
            0 => Ok(Value::Null),
            1 if field_type.is_integer() => Ok(Value::Int(self.read_i64()?)),
            1 => Ok(Value::Str(CompactString::from(self.read_str()?))),
            other => bail!("invalid presence marker {other} at offset {}", self.position - 1),
        }
    }
}
