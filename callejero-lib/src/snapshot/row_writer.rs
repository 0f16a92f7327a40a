use crate::Result;
use crate::layout::{FieldType, Value};
use ohno::{app_err, bail};
use std::io::Write;

/// Buffers the encoding of one row and hands it to the underlying writer when complete.
#[derive(Debug)]
pub struct RowWriter<'a, W: Write> {
    buffer: Vec<u8>,
    writer: &'a mut W,
    row_count: u64,
}

impl<'a, W: Write> RowWriter<'a, W> {
    pub const fn new(writer: &'a mut W) -> Self {
        Self {
            buffer: Vec::new(),
            writer,
            row_count: 0,
        }
    }

    #[must_use]
    pub const fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn row_done(&mut self) -> Result<()> {
        self.writer.write_all(&self.buffer)?;
        self.buffer.clear();
        self.row_count += 1;
        Ok(())
    }

    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        let mut buf = [0u8; 17];
        let bytes_written = vlen::encode(&mut buf[..], value).map_err(|e| app_err!("unable to encode vlen u64: {e}"))?;
        self.buffer.extend_from_slice(&buf[..bytes_written]);
        Ok(())
    }

    /// Signed values are zigzag-mapped so small negatives stay short.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_u64(zigzag_encode(value))
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_u64(s.len() as u64)?;
        self.buffer.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Writes a value of a column declared as `field_type`, preceded by a presence byte.
    pub fn write_value(&mut self, value: &Value, field_type: FieldType) -> Result<()> {
        match (value, field_type) {
            (Value::Null, _) => {
                self.write_byte(0);
                Ok(())
            }
            (Value::Str(s), FieldType::String) => {
                self.write_byte(1);
                self.write_str(s)
            }
            (Value::Int(v), ty) if ty.is_integer() => {
                self.write_byte(1);
                self.write_i64(*v)
            }
            (value, ty) => bail!("value {value:?} does not match column type {ty}"),
        }
    }
}

const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)).cast_unsigned()
}

pub(super) const fn zigzag_decode(value: u64) -> i64 {
    (value >> 1).cast_signed() ^ -((value & 1).cast_signed())
}
