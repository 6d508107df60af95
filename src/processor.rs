//! High-level helpers over [`DbfReader`]: bulk loading, per-row callbacks,
//! plain-text export and table information.
//!
//! Everything here drives the reader's public iteration surface and applies
//! no decoding of its own.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use crate::dbf::{DbfHeader, DbfReader, DbfRow};

const INDEX_WIDTH: usize = 4;
const NAME_WIDTH: usize = 16;
const TYPE_WIDTH: usize = 8;
const LENGTH_WIDTH: usize = 8;
const DECIMAL_WIDTH: usize = 8;

/// Drain the reader, mapping every live row into a `Vec`.
pub fn load_rows<T, F>(reader: &mut DbfReader, mut map: F) -> Result<Vec<T>>
where
    F: FnMut(DbfRow) -> T,
{
    let mut result = Vec::with_capacity(reader.record_count() as usize);
    while let Some(row) = reader.next_row()? {
        result.push(map(row));
    }
    Ok(result)
}

/// Run a fallible callback over every live row.
pub fn process_rows<F>(reader: &mut DbfReader, mut process: F) -> Result<()>
where
    F: FnMut(DbfRow) -> Result<()>,
{
    while let Some(row) = reader.next_row()? {
        process(row)?;
    }
    Ok(())
}

/// Export all live rows as a column-aligned text table.
///
/// The first line holds the column names; every value is right-padded to
/// its field's declared byte length. Character data is rendered as lossy
/// UTF-8. Returns the number of rows written.
pub fn write_to_txt<W: Write>(reader: &mut DbfReader, mut out: W) -> Result<u64> {
    let mut titles = String::new();
    for field in reader.header().fields() {
        titles.push_str(&right_pad(field.name(), field.length()));
    }
    writeln!(out, "{}", titles)?;

    let mut rows_written = 0u64;
    while let Some(row) = reader.next_row()? {
        let mut line = String::new();
        for (field, value) in row.header().fields().iter().zip(row.values()) {
            line.push_str(&right_pad(&value.to_string(), field.length()));
        }
        writeln!(out, "{}", line)?;
        rows_written += 1;
    }
    Ok(rows_written)
}

/// Build a human-readable summary of a Dbf file: creation date, record
/// count, header length and the column table.
pub fn table_info<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let reader = DbfReader::open(path)
        .with_context(|| format!("cannot read header of {}", path.display()))?;
    Ok(format_info(reader.header()))
}

/// Format the summary for an already-parsed header.
pub fn format_info(header: &DbfHeader) -> String {
    let mut info = String::with_capacity(512);
    let _ = writeln!(
        info,
        "Created at: {}-{}-{}",
        header.year(),
        header.month(),
        header.day()
    );
    let _ = writeln!(info, "Total records: {}", header.record_count());
    let _ = writeln!(info, "Header length: {}", header.header_length());
    let _ = writeln!(info, "Columns:");

    let _ = writeln!(
        info,
        "  {}{}{}{}{}",
        right_pad("#", INDEX_WIDTH),
        right_pad("Name", NAME_WIDTH),
        right_pad("Type", TYPE_WIDTH),
        right_pad("Length", LENGTH_WIDTH),
        right_pad("Decimal", DECIMAL_WIDTH),
    );

    let total_width = INDEX_WIDTH + NAME_WIDTH + TYPE_WIDTH + LENGTH_WIDTH + DECIMAL_WIDTH + 2;
    info.extend(std::iter::repeat('-').take(total_width));

    for field in header.fields() {
        let _ = write!(
            info,
            "\n  {}{}{}{}{}",
            right_pad(&field.index().to_string(), INDEX_WIDTH),
            right_pad(field.name(), NAME_WIDTH),
            right_pad(&(field.data_type().tag() as char).to_string(), TYPE_WIDTH),
            right_pad(&field.length().to_string(), LENGTH_WIDTH),
            right_pad(&field.decimal_count().to_string(), DECIMAL_WIDTH),
        );
    }
    info
}

/// Pad with trailing spaces up to `width`; longer strings pass through.
fn right_pad(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width.max(text.len()));
    out.push_str(text);
    for _ in text.chars().count()..width {
        out.push(' ');
    }
    out
}
