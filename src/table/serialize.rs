use csv::WriterBuilder;

use crate::error::ProcessError;
use crate::table::RawTable;

/// Serialize a table back to comma-delimited text, quoting only where a cell
/// embeds a delimiter, quote, or newline.
///
/// A zero-cell row is written as a bare line terminator; the csv writer would
/// render it as a lone quoted empty field, which is not a blank line.
pub fn serialize(table: &RawTable) -> Result<String, ProcessError> {
    let mut out = String::new();

    for row in &table.rows {
        if row.is_empty() {
            out.push('\n');
            continue;
        }

        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(row).map_err(ProcessError::Serialize)?;
        let buf = writer
            .into_inner()
            .map_err(|e| ProcessError::Serialize(e.into_error().into()))?;
        out.push_str(&String::from_utf8_lossy(&buf));
    }

    Ok(out)
}
