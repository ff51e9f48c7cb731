mod aggregate;
mod summary;

pub use aggregate::{aggregate, validate_shape, ColumnSums, DeviceNames};
pub use summary::shape_output;

use std::str::FromStr;

use tracing::instrument;

use crate::error::ProcessError;
use crate::table;

/// Row/column offsets tying the aggregation to one spreadsheet layout.
///
/// The defaults match the A/C meter export this service was built for; a
/// differently shaped export only needs different offsets, not code changes.
#[derive(Debug, Clone)]
pub struct Layout {
    /// First row included in summation.
    pub data_row_start: usize,
    /// First column included in summation; everything before it is the
    /// timestamp/label region.
    pub data_col_start: usize,
    /// Row holding one device name per data column.
    pub device_name_row: usize,
    /// Row whose first cell holds the start date of the reading period.
    pub start_date_row: usize,
    /// Row whose first cell holds the end date of the reading period.
    pub end_date_row: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            data_row_start: 10,
            data_col_start: 1,
            device_name_row: 6,
            start_date_row: 8,
            end_date_row: 293,
        }
    }
}

impl Layout {
    /// Minimum row count needed to reach the device-name header row.
    pub fn min_rows(&self) -> usize {
        self.device_name_row + 1
    }
}

/// How aggregated sums are reshaped into the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One row per device plus start/end date metadata.
    PerDevice,
    /// The input table with a single summary row appended.
    AppendSummary,
}

impl FromStr for OutputMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-device" => Ok(Self::PerDevice),
            "append-summary" => Ok(Self::AppendSummary),
            other => anyhow::bail!(
                "unknown output mode {other:?}, expected per-device or append-summary"
            ),
        }
    }
}

/// Run the full transform on one upload: parse, validate, aggregate, shape,
/// serialize. Pure; no state survives across calls.
#[instrument(level = "info", skip(bytes, layout), fields(input_bytes = bytes.len()))]
pub fn process_data(
    bytes: &[u8],
    layout: &Layout,
    mode: OutputMode,
) -> Result<String, ProcessError> {
    let input = table::parse(bytes)?;
    validate_shape(&input, layout)?;
    let (sums, names) = aggregate(&input, layout);
    let summary = shape_output(&sums, &names, &input, layout, mode)?;
    table::serialize(&summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal export in the default layout: 7 header rows, filler up to the
    /// data region, then `rows` data rows of `t,1,2`.
    fn export_csv(rows: usize) -> String {
        let layout = Layout::default();
        let mut lines = Vec::new();
        for i in 0..layout.data_row_start {
            if i == layout.device_name_row {
                lines.push("Time,D1,D2".to_string());
            } else if i == layout.start_date_row {
                lines.push("2024/01/01 00:00,,".to_string());
            } else {
                lines.push(format!("meta{i},,"));
            }
        }
        for _ in 0..rows {
            lines.push("t,1,2".to_string());
        }
        lines.join("\n") + "\n"
    }

    /// Like [`export_csv`] but tall enough for per-device mode to reach the
    /// end-date row.
    fn full_export_csv() -> String {
        let layout = Layout::default();
        let mut lines = Vec::new();
        for i in 0..=layout.end_date_row {
            if i == layout.device_name_row {
                lines.push("Time,D1,D2".to_string());
            } else if i == layout.start_date_row {
                lines.push("2024/01/01 00:00,,".to_string());
            } else if i == layout.end_date_row {
                lines.push("2024/01/31 23:55,1,2".to_string());
            } else if i >= layout.data_row_start {
                lines.push("t,1,2".to_string());
            } else {
                lines.push(format!("meta{i},,"));
            }
        }
        lines.join("\n") + "\n"
    }

    #[test]
    fn per_device_pipeline_keeps_blank_separator_line() -> Result<(), ProcessError> {
        let input = full_export_csv();
        let output = process_data(input.as_bytes(), &Layout::default(), OutputMode::PerDevice)?;
        assert!(output.starts_with("A/C Unit No.,Device Name,Sum\n"));
        // the separator between device rows and the date block is a truly
        // blank line, not a quoted empty field
        assert!(output.contains("\n\nStart Date,2024/01/01 00:00\n"));
        assert!(output.ends_with("End Date,2024/01/31 23:55\n"));
        Ok(())
    }

    #[test]
    fn append_summary_pipeline_end_to_end() -> Result<(), ProcessError> {
        let input = export_csv(3);
        let output = process_data(input.as_bytes(), &Layout::default(), OutputMode::AppendSummary)?;
        assert!(output.ends_with(",Sum,3,6\n"));
        Ok(())
    }

    #[test]
    fn pipeline_is_deterministic() -> Result<(), ProcessError> {
        let input = export_csv(5);
        let first = process_data(input.as_bytes(), &Layout::default(), OutputMode::AppendSummary)?;
        let second = process_data(input.as_bytes(), &Layout::default(), OutputMode::AppendSummary)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn short_table_fails_validation() {
        let err = process_data(b"a,b\nc,d\n", &Layout::default(), OutputMode::PerDevice)
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::InsufficientRows { rows: 2, min: 7 }
        ));
    }

    #[test]
    fn output_mode_parses_from_config_strings() {
        assert_eq!("per-device".parse::<OutputMode>().unwrap(), OutputMode::PerDevice);
        assert_eq!(
            "append-summary".parse::<OutputMode>().unwrap(),
            OutputMode::AppendSummary
        );
        assert!("csv".parse::<OutputMode>().is_err());
    }
}
