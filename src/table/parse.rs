use csv::ReaderBuilder;
use tracing::trace;

use crate::error::ProcessError;
use crate::table::RawTable;

/// Parse raw upload bytes as comma-delimited rows.
///
/// Blank lines are skipped and ragged rows are kept as-is. The only hard
/// failure is input that cannot be tokenized as delimited rows at all, e.g.
/// invalid UTF-8 inside a record.
pub fn parse(bytes: &[u8]) -> Result<RawTable, ProcessError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(ProcessError::MalformedInput)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    trace!(rows = rows.len(), "parsed upload");
    Ok(RawTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ragged_rows() -> Result<(), ProcessError> {
        let table = parse(b"a,b,c\nd\ne,f\n")?;
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["a", "b", "c"]);
        assert_eq!(table.rows[1], vec!["d"]);
        assert_eq!(table.column_count(), 3);
        Ok(())
    }

    #[test]
    fn skips_blank_lines() -> Result<(), ProcessError> {
        let table = parse(b"a,b\n\n\nc,d\n")?;
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["c", "d"]);
        Ok(())
    }

    #[test]
    fn handles_crlf_line_endings() -> Result<(), ProcessError> {
        let table = parse(b"a,b\r\nc,d\r\n")?;
        assert_eq!(table.rows, vec![vec!["a", "b"], vec!["c", "d"]]);
        Ok(())
    }

    #[test]
    fn keeps_quoted_fields_with_embedded_commas() -> Result<(), ProcessError> {
        let table = parse(b"\"a,b\",c\n")?;
        assert_eq!(table.rows[0], vec!["a,b", "c"]);
        Ok(())
    }

    #[test]
    fn rejects_bytes_that_are_not_delimited_text() {
        let err = parse(&[0xff, 0xfe, 0x00, 0x01, b'\n', 0xff]).unwrap_err();
        assert!(matches!(err, ProcessError::MalformedInput(_)));
    }
}
