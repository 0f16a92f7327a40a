use crate::Result;
use crate::query::Record;
use std::io::Write;

/// Writes records as CSV with a header row taken from the record fields.
pub fn generate<W: Write, R: Record>(records: &[R], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
