use super::{RowReader, RowWriter};
use crate::Result;
use crate::entities::{DecodedRow, EntityTable};
use crate::layout::{FieldType, Layout};
use chrono::{DateTime, TimeZone, Utc};
use compact_str::CompactString;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use mmap_rs::{Mmap, MmapFlags, MmapOptions};
use ohno::{IntoAppError, app_err, bail};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

const FORMAT_MAGIC: u64 = 0xCA11_E7E0_7AB1_0001;

pub const TABLE_HEADER_SIZE: usize = 24; // 8 bytes magic + 8 bytes count + 8 bytes timestamp

/// Writes `table` to `path` in the binary table format and returns the number of rows written.
///
/// Layout: fixed header, then the schema (field count followed by each field's name and type
/// tag), then one record per row where each value is a presence byte optionally followed by
/// a vlen-encoded integer or a length-prefixed string.
pub fn write_table(path: &Path, table: &EntityTable, now: DateTime<Utc>) -> Result<u64> {
    let layout = table.layout();

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .into_app_err_with(|| format!("unable to create table file: {}", path.display()))?;

    // Use a 1MB buffer for better performance with large tables
    let mut buf_writer = BufWriter::with_capacity(1024 * 1024, file);

    // Write header placeholder
    buf_writer.write_all(&[0u8; TABLE_HEADER_SIZE])?;

    let mut schema_writer = RowWriter::new(&mut buf_writer);
    schema_writer.write_u64(layout.fields().len() as u64)?;
    for spec in layout.fields() {
        schema_writer.write_str(spec.name)?;
        schema_writer.write_byte(spec.field_type.tag());
    }
    schema_writer.row_done()?;

    let mut row_writer = RowWriter::new(&mut buf_writer);
    for row in table.rows() {
        for (value, spec) in row.values().iter().zip(layout.fields()) {
            row_writer.write_value(value, spec.field_type)?;
        }
        row_writer.row_done()?;
    }

    let count = row_writer.row_count();
    let timestamp = now.timestamp().max(0).cast_unsigned();

    // padding to ensure vlen never tries to read past EOF
    buf_writer.write_all(&[0u8; 10])?;

    // Go back and write the header
    let _ = buf_writer.seek(SeekFrom::Start(0))?;
    buf_writer.write_all(&FORMAT_MAGIC.to_le_bytes())?;
    buf_writer.write_all(&count.to_le_bytes())?;
    buf_writer.write_all(&timestamp.to_le_bytes())?;
    buf_writer.flush()?;

    let file = buf_writer.into_inner().into_app_err("unable to flush table file")?;
    file.sync_all()?;
    Ok(count)
}

/// A memory-mapped table file.
pub struct TableFile {
    mmap: Mmap,
    count: u64,
    timestamp: DateTime<Utc>,
    fields: Vec<(CompactString, FieldType)>,
    rows_start: usize,
}

impl TableFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).into_app_err_with(|| format!("unable to open table file: {}", path.display()))?;

        let metadata = file.metadata().into_app_err("unable to get file metadata")?;
        let file_size = usize::try_from(metadata.len()).into_app_err("table file too large to map")?;
        if file_size < TABLE_HEADER_SIZE {
            bail!("invalid table '{}': file too short (need at least {TABLE_HEADER_SIZE} bytes for header)", path.display());
        }

        // SAFETY: We have read-only access to the file for the duration of the mmap.
        // Published table files are immutable; a rebuild writes new files in a new directory.
        let mmap = unsafe {
            MmapOptions::new(file_size)
                .into_app_err("unable to create mmap options")?
                .with_flags(MmapFlags::TRANSPARENT_HUGE_PAGES | MmapFlags::SEQUENTIAL)
                .with_file(&file, 0)
                .map()
                .into_app_err_with(|| format!("unable to memory-map table file: {}", path.display()))?
        };

        Self::from_mmap(mmap).into_app_err_with(|| format!("unable to open table file: {}", path.display()))
    }

    fn from_mmap(mmap: Mmap) -> Result<Self> {
        let (count, timestamp) = validate_table_header(&mmap)?;

        let mut reader = RowReader::new(&mmap[TABLE_HEADER_SIZE..]);
        let field_count = reader.read_u64()?;
        let mut fields = Vec::new();
        for _ in 0..field_count {
            let name = CompactString::from(reader.read_str()?);
            let tag = reader.read_byte()?;
            let field_type = FieldType::from_tag(tag).ok_or_else(|| app_err!("unknown field type tag {tag} for column '{name}'"))?;
            fields.push((name, field_type));
        }
        let rows_start = TABLE_HEADER_SIZE + reader.position();

        Ok(Self {
            mmap,
            count,
            timestamp,
            fields,
            rows_start,
        })
    }

    /// Fails unless the stored schema has exactly the fields of `layout`, in order.
    pub fn check_layout(&self, layout: &Layout) -> Result<()> {
        let expected = layout.fields().iter().map(|spec| (spec.name, spec.field_type));
        let actual = self.fields.iter().map(|(name, ty)| (name.as_str(), *ty));
        if !expected.eq(actual) {
            bail!("table schema does not match the {} layout", layout.name());
        }
        Ok(())
    }

    #[must_use]
    pub fn fields(&self) -> &[(CompactString, FieldType)] {
        &self.fields
    }

    #[expect(clippy::cast_possible_truncation, reason = "Tables won't exceed usize::MAX entries in practice")]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn rows(&self) -> RowIter<'_> {
        RowIter {
            reader: RowReader::new(&self.mmap[self.rows_start..]),
            fields: &self.fields,
            rows_remaining: self.count,
        }
    }
}

impl Debug for TableFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TableFile")
            .field("count", &self.count)
            .field("timestamp", &self.timestamp)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Iterates the rows of a [`TableFile`]. Stops after the first decoding error.
#[derive(Debug)]
pub struct RowIter<'a> {
    reader: RowReader<'a>,
    fields: &'a [(CompactString, FieldType)],
    rows_remaining: u64,
}

impl RowIter<'_> {
    fn read_row(&mut self) -> Result<DecodedRow> {
        let mut values = Vec::with_capacity(self.fields.len());
        for (_, field_type) in self.fields {
            values.push(self.reader.read_value(*field_type)?);
        }
        Ok(DecodedRow::new(values))
    }
}

impl Iterator for RowIter<'_> {
    type Item = Result<DecodedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rows_remaining == 0 {
            return None;
        }

        let row = self.read_row();
        self.rows_remaining = if row.is_ok() { self.rows_remaining - 1 } else { 0 };
        Some(row)
    }

    #[expect(clippy::cast_possible_truncation, reason = "Tables won't exceed usize::MAX entries in practice")]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.rows_remaining as usize))
    }
}

fn validate_table_header(mmap: &[u8]) -> Result<(u64, DateTime<Utc>)> {
    let header = mmap
        .get(..TABLE_HEADER_SIZE)
        .ok_or_else(|| app_err!("invalid table: file too short (need at least {TABLE_HEADER_SIZE} bytes for header)"))?;

    let word = |i: usize| -> Result<u64> {
        let bytes = <[u8; 8]>::try_from(&header[i * 8..(i + 1) * 8]).into_app_err("malformed table header")?;
        Ok(u64::from_le_bytes(bytes))
    };

    // Validate format magic identifier
    let magic = word(0)?;
    if magic != FORMAT_MAGIC {
        bail!("invalid table format: expected magic 0x{FORMAT_MAGIC:016X}, found 0x{magic:016X}. The snapshot may need rebuilding.");
    }

    let count = word(1)?;
    let table_timestamp = word(2)?;

    let dt = Utc
        .timestamp_opt(i64::try_from(table_timestamp).into_app_err("timestamp out of range for i64")?, 0)
        .single()
        .ok_or_else(|| app_err!("invalid or out-of-range timestamp"))?;

    Ok((count, dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityKind;
    use crate::layout::Value;

    fn sample_table() -> EntityTable {
        let rows = vec![
            DecodedRow::new(vec![Value::Int(28), Value::Int(79), Value::Int(5), Value::from("CALLE"), Value::from("MAYOR")]),
            DecodedRow::new(vec![Value::Int(8), Value::Null, Value::Int(-3), Value::Null, Value::from("PEÑA")]),
        ];
        EntityTable::deduplicated(EntityKind::Streets, rows).0
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_rows_read_back_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VIAS.table");
        let table = sample_table();
        let now = Utc.timestamp_opt(1_760_000_000, 0).unwrap();

        assert_eq!(write_table(&path, &table, now).unwrap(), 2);

        let file = TableFile::open(&path).unwrap();
        assert_eq!(file.len(), 2);
        file.check_layout(EntityKind::Streets.layout()).unwrap();

        let rows: Vec<_> = file.rows().collect::<Result<_>>().unwrap();
        assert_eq!(rows, table.rows());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("UP.table");
        let (table, _) = EntityTable::deduplicated(EntityKind::PopulationUnits, Vec::new());

        assert_eq!(write_table(&path, &table, Utc::now()).unwrap(), 0);

        let file = TableFile::open(&path).unwrap();
        assert!(file.is_empty());
        assert_eq!(file.fields().len(), EntityKind::PopulationUnits.layout().fields().len());
        assert_eq!(file.rows().count(), 0);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_schema_mismatch_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VIAS.table");
        let _ = write_table(&path, &sample_table(), Utc::now()).unwrap();

        let file = TableFile::open(&path).unwrap();
        let _ = file.check_layout(EntityKind::AddressTracts.layout()).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_bad_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.table");
        std::fs::write(&path, [0xFFu8; 64]).unwrap();

        let _ = TableFile::open(&path).unwrap_err();

        let mut header = vec![0u8; TABLE_HEADER_SIZE];
        header[..8].copy_from_slice(&0xDEAD_BEEFu64.to_le_bytes());
        let _ = validate_table_header(&header).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_short_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.table");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let _ = TableFile::open(&path).unwrap_err();
    }

    #[test]
    fn test_header_validation() {
        let mut header = Vec::new();
        header.extend_from_slice(&FORMAT_MAGIC.to_le_bytes());
        header.extend_from_slice(&7u64.to_le_bytes());
        header.extend_from_slice(&1_700_000_000u64.to_le_bytes());

        let (count, ts) = validate_table_header(&header).unwrap();
        assert_eq!(count, 7);
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }
}
