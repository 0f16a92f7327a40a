use crate::Result;
use crate::query::Record;
use core::fmt::Write;
use owo_colors::OwoColorize;

/// Renders records as an aligned table with a header row.
pub fn generate<W: Write, R: Record>(records: &[R], use_colors: bool, writer: &mut W) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    let headers: Vec<&str> = first.fields().into_iter().map(|(name, _)| name).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| record.fields().into_iter().map(|(_, value)| value).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let header_line = join_padded(headers.iter().copied(), &widths);
    if use_colors {
        writeln!(writer, "{}", header_line.bold())?;
    } else {
        writeln!(writer, "{header_line}")?;
    }

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    writeln!(writer, "{}", rule.join("  "))?;

    for row in &rows {
        writeln!(writer, "{}", join_padded(row.iter().map(String::as_str), &widths))?;
    }

    let summary = format!("{} record(s)", rows.len());
    if use_colors {
        writeln!(writer, "{}", summary.dimmed())?;
    } else {
        writeln!(writer, "{summary}")?;
    }

    Ok(())
}

/// Width in characters, so accented names line up.
fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn join_padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        line.extend(core::iter::repeat_n(' ', width.saturating_sub(display_width(cell))));
    }
    line.trim_end().to_string()
}
