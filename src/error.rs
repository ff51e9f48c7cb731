use thiserror::Error;

/// Failures of the parse → aggregate → serialize pipeline.
///
/// Per-cell numeric coercion failures are deliberately absent: a cell that does
/// not parse as a number contributes zero to its column (the upstream exports
/// are noisy and a stray marker must not sink the whole file).
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The upload could not be tokenized as delimited rows at all.
    #[error("input is not valid delimited text: {0}")]
    MalformedInput(#[source] csv::Error),

    /// The table ends before the device-name header row.
    #[error("table has {rows} rows, need at least {min}")]
    InsufficientRows { rows: usize, min: usize },

    /// A fixed row offset required by the output layout is past the end of the
    /// table.
    #[error("row {index} is required by the output layout but the table has {rows} rows")]
    OutOfRange { index: usize, rows: usize },

    #[error("failed to serialize summary: {0}")]
    Serialize(#[source] csv::Error),
}
