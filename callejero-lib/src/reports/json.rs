use crate::Result;
use crate::query::Record;
use core::fmt::Write;

/// Writes records as a pretty-printed JSON array.
pub fn generate<W: Write, R: Record>(records: &[R], writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(records)?)?;
    Ok(())
}
