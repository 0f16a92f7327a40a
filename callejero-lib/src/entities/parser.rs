use super::{DecodedRow, EntityKind, EntityTable, LineReader};
use crate::Result;
use crate::layout::{Layout, Value, decode_fixed_width};
use ohno::IntoAppError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

/// Log target for entity parsers
const LOG_TARGET: &str = "  entities";

/// Leniency counters collected while parsing one file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    /// Lines read from the source.
    pub lines: u64,

    /// Lines holding at least one byte that could not be mapped.
    pub lines_with_unmappable_bytes: u64,

    /// Values that were non-blank in the source but coerced to null.
    pub degraded_values: u64,

    /// Rows dropped because an identical row appeared earlier.
    pub duplicate_rows: u64,
}

impl DecodeStats {
    #[must_use]
    pub const fn has_leniency(&self) -> bool {
        self.lines_with_unmappable_bytes > 0 || self.degraded_values > 0
    }
}

/// The outcome of parsing one source file.
#[derive(Debug, Clone)]
pub struct ParsedEntity {
    pub table: EntityTable,
    pub stats: DecodeStats,
}

/// Parses the source file of `kind`, reading at most `max_lines` lines when given.
pub fn parse_entity(kind: EntityKind, path: &Path, max_lines: Option<u64>) -> Result<ParsedEntity> {
    let start = Instant::now();
    let file = File::open(path).into_app_err_with(|| format!("unable to open {kind} source file '{}'", path.display()))?;

    log::info!(target: LOG_TARGET, "Parsing {kind} from '{}'", path.display());
    let parsed = parse_reader(kind, BufReader::with_capacity(1024 * 1024, file), max_lines)
        .into_app_err_with(|| format!("unable to parse {kind} source file '{}'", path.display()))?;

    log::debug!(
        target: LOG_TARGET,
        "Finished parsing {kind}: {} lines, {} rows in {:.3}s",
        parsed.stats.lines,
        parsed.table.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(parsed)
}

/// Parses `kind` records from any buffered byte source.
pub fn parse_reader(kind: EntityKind, reader: impl BufRead, max_lines: Option<u64>) -> Result<ParsedEntity> {
    let layout = kind.layout();
    let mut lines = LineReader::new(reader);
    let mut stats = DecodeStats::default();
    let mut rows = Vec::new();

    while max_lines.is_none_or(|max| stats.lines < max) {
        let Some(record) = lines.next_record()? else {
            break;
        };

        stats.lines += 1;
        if record.had_errors {
            stats.lines_with_unmappable_bytes += 1;
        }

        rows.push(decode_row(&record.text, layout, &mut stats));
    }

    let (table, duplicates) = EntityTable::deduplicated(kind, rows);
    stats.duplicate_rows = duplicates;

    if stats.has_leniency() {
        log::warn!(
            target: LOG_TARGET,
            "{kind}: {} line(s) with unmappable bytes, {} value(s) degraded to null",
            stats.lines_with_unmappable_bytes,
            stats.degraded_values
        );
    }

    if duplicates > 0 {
        log::debug!(target: LOG_TARGET, "{kind}: removed {duplicates} duplicate row(s)");
    }

    Ok(ParsedEntity { table, stats })
}

/// Decodes one line into a row, counting values that degrade to null.
pub fn decode_row(line: &str, layout: &Layout, stats: &mut DecodeStats) -> DecodedRow {
    decode_fixed_width(line, layout)
        .into_iter()
        .map(|field| {
            let value = Value::coerce(&field.text, field.spec.field_type);
            if value.is_null() && !field.text.trim().is_empty() {
                stats.degraded_values += 1;
            }
            value
        })
        .collect::<Vec<_>>()
        .into()
}
