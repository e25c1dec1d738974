//! CSV output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::Table;
use crate::error::{ChatcastError, Result};

/// Writes a table to a CSV file.
///
/// # Format
/// - Delimiter: `,`
/// - First line: the table header
/// - Encoding: UTF-8
pub fn write_csv<T: Table>(table: &T, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    write_records(table, file)
}

/// Converts a table to a CSV string.
///
/// Same format as [`write_csv`], but returns a String instead of writing to a file.
pub fn to_csv<T: Table>(table: &T) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ChatcastError::InvalidFormat {
        format: "CSV",
        message: e.to_string(),
    })
}

fn write_records<T: Table, W: Write>(table: &T, sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(sink);
    writer.write_record(table.header())?;
    for row in table.rows() {
        writer.write_record(T::cells(&row))?;
    }
    writer.flush()?;
    Ok(())
}
