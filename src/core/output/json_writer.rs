//! JSON output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::Table;
use crate::error::Result;

/// Writes a table to a JSON file as an array of row objects.
///
/// # Format
/// ```json
/// [
///   {"hour": "2024-06-15 12:00:00", "count": 4},
///   {"hour": "2024-06-15 13:00:00", "count": 0}
/// ]
/// ```
pub fn write_json<T: Table>(table: &T, output_path: &Path) -> Result<()> {
    let json = to_json(table)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts a table to a pretty-printed JSON array.
///
/// Same format as [`write_json`], but returns a String instead of writing to a file.
pub fn to_json<T: Table>(table: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&table.rows())?)
}
